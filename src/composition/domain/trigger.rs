use crate::composition::domain::compute::{ComputeTarget, EntryPoint};
use crate::composition::domain::variant::ComputeKind;
use crate::shared::error::ComposeError;
use crate::shared::Result;

/// External stimulus that invokes a compute target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerKind {
    /// Fixed-interval schedule
    Schedule { rate_minutes: u32 },
    /// Subscription to events emitted by an upstream service
    EventPattern {
        source: String,
        detail_types: Vec<String>,
    },
}

impl TriggerKind {
    pub fn every_minutes(rate_minutes: u32) -> Self {
        TriggerKind::Schedule { rate_minutes }
    }

    pub fn events_from(source: &str) -> Self {
        TriggerKind::EventPattern {
            source: source.to_string(),
            detail_types: Vec::new(),
        }
    }

    /// Schedule expression understood by the event bus, e.g. `rate(5 minutes)`
    pub fn schedule_expression(&self) -> Option<String> {
        match self {
            TriggerKind::Schedule { rate_minutes: 1 } => Some("rate(1 minute)".to_string()),
            TriggerKind::Schedule { rate_minutes } => {
                Some(format!("rate({} minutes)", rate_minutes))
            }
            TriggerKind::EventPattern { .. } => None,
        }
    }
}

/// A trigger bound to exactly one compute target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSpec {
    logical_id: String,
    kind: TriggerKind,
    target_id: String,
    entry_point: EntryPoint,
}

impl TriggerSpec {
    /// Binds `kind` to an already created compute target.
    ///
    /// # Errors
    /// Only function targets can be invoked by a trigger; services schedule
    /// themselves. A zero-minute schedule is rejected.
    pub fn bind(logical_id: &str, kind: TriggerKind, target: &ComputeTarget) -> Result<Self> {
        if target.kind() != ComputeKind::Function {
            return Err(ComposeError::Validation {
                message: format!(
                    "trigger '{}' cannot invoke '{}': only function targets accept triggers",
                    logical_id, target.logical_id
                ),
            }
            .into());
        }
        if let TriggerKind::Schedule { rate_minutes: 0 } = kind {
            return Err(ComposeError::Validation {
                message: format!("trigger '{}' has a zero-minute schedule", logical_id),
            }
            .into());
        }

        Ok(Self {
            logical_id: logical_id.to_string(),
            kind,
            target_id: target.logical_id.clone(),
            entry_point: target.entry_point,
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn kind(&self) -> &TriggerKind {
        &self.kind
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn entry_point(&self) -> EntryPoint {
        self.entry_point
    }

    pub fn is_schedule(&self) -> bool {
        matches!(self.kind, TriggerKind::Schedule { .. })
    }
}

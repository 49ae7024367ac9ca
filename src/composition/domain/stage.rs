use crate::shared::error::ComposeError;
use crate::shared::Result;
use std::fmt;

/// Stages of a single composition pass, in the only order they may occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CompositionStage {
    Unconfigured,
    ConfigResolved,
    AccessScoped,
    NetworkResolved,
    ComputeTargetCreated,
    TriggersBound,
}

impl CompositionStage {
    pub const ALL: [CompositionStage; 6] = [
        CompositionStage::Unconfigured,
        CompositionStage::ConfigResolved,
        CompositionStage::AccessScoped,
        CompositionStage::NetworkResolved,
        CompositionStage::ComputeTargetCreated,
        CompositionStage::TriggersBound,
    ];

    /// The stage that must follow this one, if any.
    pub fn next(self) -> Option<CompositionStage> {
        let idx = self.index();
        Self::ALL.get(idx + 1).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CompositionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompositionStage::Unconfigured => "unconfigured",
            CompositionStage::ConfigResolved => "config-resolved",
            CompositionStage::AccessScoped => "access-scoped",
            CompositionStage::NetworkResolved => "network-resolved",
            CompositionStage::ComputeTargetCreated => "compute-target-created",
            CompositionStage::TriggersBound => "triggers-bound",
        };
        f.write_str(name)
    }
}

/// Tracks the current stage and refuses anything but a single forward step.
#[derive(Debug)]
pub struct StageTracker {
    current: CompositionStage,
}

impl StageTracker {
    pub fn new() -> Self {
        Self {
            current: CompositionStage::Unconfigured,
        }
    }

    pub fn current(&self) -> CompositionStage {
        self.current
    }

    /// Moves to `to`, which must be the immediate successor of the current stage.
    ///
    /// # Errors
    /// Returns [`ComposeError::DependencyOrdering`] when a stage is skipped,
    /// repeated, or revisited.
    pub fn advance(&mut self, to: CompositionStage) -> Result<()> {
        match self.current.next() {
            Some(expected) if expected == to => {
                self.current = to;
                Ok(())
            }
            Some(expected) => Err(ComposeError::DependencyOrdering {
                expected,
                found: to,
            }
            .into()),
            None => Err(ComposeError::DependencyOrdering {
                expected: self.current,
                found: to,
            }
            .into()),
        }
    }

    /// Fails unless `stage` has already been reached. Called before a stage
    /// consumes what an earlier one produced.
    pub fn require(&self, stage: CompositionStage) -> Result<()> {
        if self.current < stage {
            return Err(ComposeError::DependencyOrdering {
                expected: stage,
                found: self.current,
            }
            .into());
        }
        Ok(())
    }
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

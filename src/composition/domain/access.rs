use crate::composition::domain::variant::ComputeKind;
use crate::shared::error::ComposeError;
use crate::shared::Result;
use std::fmt;

/// Actions that hand back credential material. Statements granting any of
/// these must carry a condition.
pub const CREDENTIAL_RETURNING_ACTIONS: [&str; 1] = ["secretsmanager:GetSecretValue"];

/// Resource a statement applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourcePattern {
    /// Every resource (`*`)
    Any,
    /// One concrete resource identity
    Arn(String),
}

impl ResourcePattern {
    pub fn is_wildcard(&self) -> bool {
        match self {
            ResourcePattern::Any => true,
            ResourcePattern::Arn(arn) => arn.contains('*'),
        }
    }
}

impl fmt::Display for ResourcePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourcePattern::Any => f.write_str("*"),
            ResourcePattern::Arn(arn) => f.write_str(arn),
        }
    }
}

/// `StringEquals` condition on a single key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub operator: String,
    pub key: String,
    pub value: String,
}

impl Condition {
    pub fn string_equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            operator: "StringEquals".to_string(),
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One allow statement of the access scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyStatement {
    sid: String,
    actions: Vec<String>,
    resources: Vec<ResourcePattern>,
    condition: Option<Condition>,
}

impl PolicyStatement {
    pub fn new(sid: &str, actions: &[&str], resources: Vec<ResourcePattern>) -> Self {
        Self {
            sid: sid.to_string(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
            resources,
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn resources(&self) -> &[ResourcePattern] {
        &self.resources
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn grants(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }

    fn returns_credentials(&self) -> bool {
        self.actions
            .iter()
            .any(|a| CREDENTIAL_RETURNING_ACTIONS.contains(&a.as_str()))
    }
}

/// Provider-managed policy attached by ARN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedPolicy {
    pub name: String,
    pub arn: String,
}

impl ManagedPolicy {
    pub fn aws(name: &str) -> Self {
        Self {
            name: name.to_string(),
            arn: format!("arn:aws:iam::aws:policy/{}", name),
        }
    }
}

/// Statements and managed policies collected for one identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessScope {
    statements: Vec<PolicyStatement>,
    managed_policies: Vec<ManagedPolicy>,
}

impl AccessScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a statement.
    ///
    /// # Errors
    /// Rejects a statement that grants a credential-returning action without
    /// a condition, or one that reuses an existing statement id.
    pub fn push(&mut self, statement: PolicyStatement) -> Result<()> {
        if statement.returns_credentials() && statement.condition.is_none() {
            return Err(ComposeError::Validation {
                message: format!(
                    "statement '{}' grants credential retrieval without an opt-in condition",
                    statement.sid
                ),
            }
            .into());
        }
        if self.statements.iter().any(|s| s.sid == statement.sid) {
            return Err(ComposeError::Validation {
                message: format!("duplicate statement id '{}'", statement.sid),
            }
            .into());
        }
        self.statements.push(statement);
        Ok(())
    }

    pub fn attach(&mut self, policy: ManagedPolicy) {
        if !self.managed_policies.contains(&policy) {
            self.managed_policies.push(policy);
        }
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    pub fn managed_policies(&self) -> &[ManagedPolicy] {
        &self.managed_policies
    }

    /// Statements granting `action`.
    pub fn statements_granting<'a>(
        &'a self,
        action: &'a str,
    ) -> impl Iterator<Item = &'a PolicyStatement> + 'a {
        self.statements.iter().filter(move |s| s.grants(action))
    }

    pub fn grants(&self, action: &str) -> bool {
        self.statements_granting(action).next().is_some()
    }
}

/// Service allowed to assume the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServicePrincipal {
    Lambda,
    EcsTasks,
}

impl ServicePrincipal {
    /// Principal that runs targets of `kind`
    pub fn for_compute(kind: ComputeKind) -> Self {
        match kind {
            ComputeKind::Function => ServicePrincipal::Lambda,
            ComputeKind::ContainerService => ServicePrincipal::EcsTasks,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServicePrincipal::Lambda => "lambda.amazonaws.com",
            ServicePrincipal::EcsTasks => "ecs-tasks.amazonaws.com",
        }
    }
}

/// Assumable role sealed from a finished scope. Read-only from here on.
/// Trusts every service that runs a target under it, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessIdentity {
    logical_id: String,
    principals: Vec<ServicePrincipal>,
    scope: AccessScope,
}

impl AccessIdentity {
    pub fn new(logical_id: &str, principals: Vec<ServicePrincipal>, scope: AccessScope) -> Self {
        let mut unique = Vec::with_capacity(principals.len());
        for principal in principals {
            if !unique.contains(&principal) {
                unique.push(principal);
            }
        }
        Self {
            logical_id: logical_id.to_string(),
            principals: unique,
            scope,
        }
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn principals(&self) -> &[ServicePrincipal] {
        &self.principals
    }

    pub fn trusts(&self, principal: ServicePrincipal) -> bool {
        self.principals.contains(&principal)
    }

    pub fn scope(&self) -> &AccessScope {
        &self.scope
    }
}

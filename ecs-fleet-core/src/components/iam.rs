//! IAM roles and inline policies

use crate::resource::{Resource, Value};

pub const ROLE: &str = "iam_role";
pub const POLICY: &str = "iam_policy";

pub const POLICY_VERSION: &str = "2012-10-17";
pub const ECS_TASKS_PRINCIPAL: &str = "ecs-tasks.amazonaws.com";

const ALLOW: &str = "Allow";

/// Allow statement
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyStatement {
    pub actions: Vec<String>,
    pub resources: Vec<String>,
}

impl PolicyStatement {
    /// Allow `actions` on every resource
    pub fn allow_all<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
            resources: vec!["*".to_string()],
        }
    }

    pub fn to_value(&self) -> Value {
        Value::map([
            ("action", Value::strings(self.actions.iter().cloned())),
            ("effect", Value::string(ALLOW)),
            ("resource", Value::strings(self.resources.iter().cloned())),
        ])
    }
}

/// Role assumable by a service principal
#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    pub logical_id: String,
    pub role_name: Option<String>,
    pub service_principal: String,
}

impl Role {
    pub fn new(logical_id: impl Into<String>, service_principal: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            role_name: None,
            service_principal: service_principal.into(),
        }
    }

    pub fn with_role_name(mut self, name: impl Into<String>) -> Self {
        self.role_name = Some(name.into());
        self
    }

    pub fn arn(&self) -> Value {
        Value::ResourceRef(self.logical_id.clone(), "Arn".to_string())
    }

    pub fn to_resource(&self) -> Resource {
        let trust = Value::map([
            ("version", Value::string(POLICY_VERSION)),
            (
                "statement",
                Value::List(vec![Value::map([
                    ("action", Value::string("sts:AssumeRole")),
                    ("effect", Value::string(ALLOW)),
                    (
                        "principal",
                        Value::map([("service", Value::string(&self.service_principal))]),
                    ),
                ])]),
            ),
        ]);

        Resource::new(ROLE, &self.logical_id)
            .with_attribute("assume_role_policy_document", trust)
            .with_optional("role_name", self.role_name.clone().map(Value::String))
    }
}

/// Inline policy attached to a single role
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub logical_id: String,
    pub policy_name: String,
    /// Logical id of the role the policy is attached to
    pub role: String,
    pub statements: Vec<PolicyStatement>,
}

impl Policy {
    pub fn new(
        logical_id: impl Into<String>,
        policy_name: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            logical_id: logical_id.into(),
            policy_name: policy_name.into(),
            role: role.into(),
            statements: Vec::new(),
        }
    }

    pub fn add_statement(&mut self, statement: PolicyStatement) {
        self.statements.push(statement);
    }

    pub fn to_resource(&self) -> Resource {
        let document = Value::map([
            ("version", Value::string(POLICY_VERSION)),
            (
                "statement",
                Value::List(self.statements.iter().map(PolicyStatement::to_value).collect()),
            ),
        ]);

        Resource::new(POLICY, &self.logical_id)
            .with_attribute("policy_name", self.policy_name.as_str())
            .with_attribute("policy_document", document)
            .with_attribute("roles", Value::List(vec![Value::Ref(self.role.clone())]))
    }
}

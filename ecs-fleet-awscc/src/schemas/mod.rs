//! CloudFormation resource schema definitions
//!
//! One config per resource type a fleet is declared with. Attribute names are
//! snake_case; `provider_name` carries the CloudFormation property name.

pub mod ec2;
pub mod ecs;
pub mod elbv2;
pub mod iam;
pub mod logs;

use ecs_fleet_core::schema::{AttributeType, ResourceSchema};

/// CloudFormation schema configuration
///
/// Combines the ResourceSchema with the CloudFormation type it renders to.
pub struct AwsccSchemaConfig {
    /// AWS CloudFormation type name (e.g., "AWS::ECS::Service")
    pub aws_type_name: &'static str,
    /// Resource type name used in the declared graph (e.g., "ecs_service")
    pub resource_type_name: &'static str,
    /// The resource schema with attribute definitions
    pub schema: ResourceSchema,
}

/// Enum type from a fixed list of values
pub fn enum_type(values: &[&str]) -> AttributeType {
    AttributeType::Enum(values.iter().map(|v| v.to_string()).collect())
}

/// List of strings (ids, ARNs, names)
pub fn string_list() -> AttributeType {
    AttributeType::List(Box::new(AttributeType::String))
}

/// List of nested property documents
pub fn document_list() -> AttributeType {
    AttributeType::List(Box::new(AttributeType::Document))
}

/// Returns all schema configs
pub fn configs() -> Vec<AwsccSchemaConfig> {
    vec![
        ec2::security_group_config(),
        ec2::security_group_ingress_config(),
        ec2::security_group_egress_config(),
        iam::role_config(),
        iam::policy_config(),
        logs::log_group_config(),
        elbv2::load_balancer_config(),
        elbv2::listener_config(),
        elbv2::target_group_config(),
        elbv2::listener_rule_config(),
        ecs::task_definition_config(),
        ecs::service_config(),
    ]
}

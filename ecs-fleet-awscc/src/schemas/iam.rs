//! IAM role and inline policy schemas

use ecs_fleet_core::components::iam::{POLICY, ROLE};
use ecs_fleet_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use super::{AwsccSchemaConfig, string_list};

pub fn role_config() -> AwsccSchemaConfig {
    AwsccSchemaConfig {
        aws_type_name: "AWS::IAM::Role",
        resource_type_name: ROLE,
        schema: ResourceSchema::new(ROLE)
            .with_description("IAM role assumable by a principal")
            .attribute(
                AttributeSchema::new("assume_role_policy_document", AttributeType::Document)
                    .required()
                    .with_description("The trust policy that is associated with this role.")
                    .with_provider_name("AssumeRolePolicyDocument"),
            )
            .attribute(
                AttributeSchema::new("role_name", AttributeType::String)
                    .with_description("A name for the IAM role, up to 64 characters in length.")
                    .with_provider_name("RoleName"),
            )
            .attribute(
                AttributeSchema::new("managed_policy_arns", string_list())
                    .with_provider_name("ManagedPolicyArns"),
            ),
    }
}

pub fn policy_config() -> AwsccSchemaConfig {
    AwsccSchemaConfig {
        aws_type_name: "AWS::IAM::Policy",
        resource_type_name: POLICY,
        schema: ResourceSchema::new(POLICY)
            .with_description("Inline policy embedded in roles")
            .attribute(
                AttributeSchema::new("policy_name", AttributeType::String)
                    .required()
                    .with_provider_name("PolicyName"),
            )
            .attribute(
                AttributeSchema::new("policy_document", AttributeType::Document)
                    .required()
                    .with_provider_name("PolicyDocument"),
            )
            .attribute(
                AttributeSchema::new("roles", string_list())
                    .with_description("The name of the role to associate the policy with.")
                    .with_provider_name("Roles"),
            ),
    }
}

//! CloudWatch Logs log group schema

use ecs_fleet_core::components::logs::LOG_GROUP;
use ecs_fleet_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::AwsccSchemaConfig;

pub fn log_group_config() -> AwsccSchemaConfig {
    AwsccSchemaConfig {
        aws_type_name: "AWS::Logs::LogGroup",
        resource_type_name: LOG_GROUP,
        schema: ResourceSchema::new(LOG_GROUP)
            .with_description("Log group receiving container output")
            .attribute(
                AttributeSchema::new("log_group_name", AttributeType::String)
                    .with_provider_name("LogGroupName"),
            )
            .attribute(
                AttributeSchema::new("retention_in_days", types::positive_int())
                    .with_description("The number of days to retain the log events in the specified log group.")
                    .with_provider_name("RetentionInDays"),
            ),
    }
}

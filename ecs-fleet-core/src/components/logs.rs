//! CloudWatch Logs group and the `awslogs` container log driver

use crate::resource::{Resource, Value};

pub const LOG_GROUP: &str = "logs_log_group";

#[derive(Debug, Clone, PartialEq)]
pub struct LogGroup {
    pub logical_id: String,
    /// `None` keeps log events forever
    pub retention_in_days: Option<u32>,
}

impl LogGroup {
    pub fn new(logical_id: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            retention_in_days: None,
        }
    }

    pub fn to_resource(&self) -> Resource {
        Resource::new(LOG_GROUP, &self.logical_id).with_optional(
            "retention_in_days",
            self.retention_in_days.map(|d| Value::Int(d.into())),
        )
    }
}

/// Log configuration shared by every container in the fleet
#[derive(Debug, Clone, PartialEq)]
pub struct LogDriver {
    /// Logical id of the log group
    pub log_group: String,
    pub stream_prefix: String,
}

impl LogDriver {
    pub fn aws_logs(log_group: impl Into<String>, stream_prefix: impl Into<String>) -> Self {
        Self {
            log_group: log_group.into(),
            stream_prefix: stream_prefix.into(),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::map([
            ("log_driver", Value::string("awslogs")),
            (
                "options",
                Value::map([
                    ("awslogs-group", Value::Ref(self.log_group.clone())),
                    ("awslogs-stream-prefix", Value::string(&self.stream_prefix)),
                    ("awslogs-region", Value::Ref("AWS::Region".to_string())),
                ]),
            ),
        ])
    }
}

//! Case conversion from attribute names to CloudFormation property names
//!
//! Declared resources use snake_case (e.g., `health_check_path`,
//! `awsvpc_configuration`), CloudFormation uses PascalCase
//! (`HealthCheckPath`, `AwsvpcConfiguration`).
//!
//! Keys that are not plain snake_case identifiers are provider-defined
//! strings (log driver options such as `awslogs-group`) and pass through as-is.

use heck::ToPascalCase;

/// Whether `key` is a snake_case identifier that maps onto a property name
pub fn is_snake_case_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {
            chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        }
        _ => false,
    }
}

/// Convert an attribute key to its CloudFormation property name
/// e.g., "target_group_arn" -> "TargetGroupArn", "awslogs-group" -> "awslogs-group"
pub fn to_property_name(key: &str) -> String {
    if is_snake_case_key(key) {
        key.to_pascal_case()
    } else {
        key.to_string()
    }
}

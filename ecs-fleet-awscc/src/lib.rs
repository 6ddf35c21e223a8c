//! ECS Fleet AWS support
//!
//! CloudFormation knowledge for declared fleets.
//!
//! ## Module Structure
//!
//! - `schemas` - CloudFormation resource schemas and property names
//! - `case_convert` - Attribute name to property name conversion
//! - `template` - Template rendering
//! - `ssm` - Parameter store backed by AWS Systems Manager

pub mod case_convert;
pub mod schemas;
pub mod ssm;
pub mod template;

pub use ssm::SsmParameterStore;
pub use template::{TemplateError, TemplateRenderer, render_template, to_json_string};

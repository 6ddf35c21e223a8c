//! Fleet configuration - The declared application and its services
//!
//! Files are JSON or YAML with camelCase keys:
//!
//! ```yaml
//! appName: demo
//! services:
//!   - serviceName: api
//!     imageUri: repo/img:tag
//!     containerPort: 8080
//!     desiredCount: 2
//!     hostName: api.example.com
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::schema::validate_elb_name;

/// Load balancer and target group names are capped by the provider
pub const MAX_ELB_NAME_LEN: usize = 32;

static SERVICE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?$").unwrap());

// Host-header conditions accept `*` and `?` wildcards
static HOST_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9*?]([A-Za-z0-9*?.-]*[A-Za-z0-9*?])?$").unwrap());

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("File {0} not found")]
    FileNotFound(String),

    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Validation errors:\n  {}", .0.join("\n  "))]
    Validation(Vec<String>),
}

/// One containerized service of the fleet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServiceDescriptor {
    pub service_name: String,
    pub image_uri: String,
    pub container_port: u16,
    pub desired_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ServiceDescriptor {
    pub fn new(
        service_name: impl Into<String>,
        image_uri: impl Into<String>,
        container_port: u16,
        desired_count: u32,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            image_uri: image_uri.into(),
            container_port,
            desired_count,
            host_name: None,
            path: None,
        }
    }

    pub fn with_host_name(mut self, host_name: impl Into<String>) -> Self {
        self.host_name = Some(host_name.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn target_group_name(&self) -> String {
        format!("TG-{}", self.service_name)
    }

    pub fn ecs_service_name(&self) -> String {
        format!("ecs-{}", self.service_name)
    }

    /// Path probed by the target group health check
    pub fn health_check_path(&self) -> &str {
        self.path.as_deref().unwrap_or("/")
    }

    /// Whether the listener rule for this service has no distinguishing condition
    ///
    /// Routing on a path requires a host as well, so a path alone does not
    /// make a service reachable by path.
    pub fn is_catch_all(&self) -> bool {
        self.host_name.is_none()
    }

    fn validate(&self, index: usize, errors: &mut Vec<String>) {
        let label = if self.service_name.is_empty() {
            format!("services[{}]", index)
        } else {
            format!("services[{}] ({})", index, self.service_name)
        };

        if self.service_name.is_empty() {
            errors.push(format!("{}: serviceName must not be empty", label));
        } else if !SERVICE_NAME.is_match(&self.service_name) {
            errors.push(format!(
                "{}: serviceName may only contain alphanumerics and hyphens, and must not start or end with a hyphen",
                label
            ));
        } else if self.target_group_name().len() > MAX_ELB_NAME_LEN {
            errors.push(format!(
                "{}: target group name '{}' exceeds {} characters",
                label,
                self.target_group_name(),
                MAX_ELB_NAME_LEN
            ));
        }

        if self.image_uri.trim().is_empty() {
            errors.push(format!("{}: imageUri must not be empty", label));
        }
        if self.container_port == 0 {
            errors.push(format!("{}: containerPort must be between 1 and 65535", label));
        }
        if self.desired_count < 1 {
            errors.push(format!("{}: desiredCount must be at least 1", label));
        }

        if let Some(host) = &self.host_name {
            if host.is_empty() {
                errors.push(format!("{}: hostName must not be empty when given", label));
            } else if !HOST_NAME.is_match(host) {
                errors.push(format!("{}: hostName '{}' is not a valid host", label, host));
            }
        }
        if let Some(path) = &self.path
            && !path.starts_with('/')
        {
            errors.push(format!("{}: path '{}' must start with '/'", label, path));
        }
    }
}

/// Fleet definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FleetConfig {
    pub app_name: String,
    pub services: Vec<ServiceDescriptor>,
}

impl FleetConfig {
    pub fn new(app_name: impl Into<String>, services: Vec<ServiceDescriptor>) -> Self {
        Self {
            app_name: app_name.into(),
            services,
        }
    }

    /// Load a fleet file, YAML unless the extension is `.json`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound(path.display().to_string()),
            _ => ConfigError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            },
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            Self::from_json(&contents)?
        } else {
            Self::from_yaml(&contents)?
        };
        log::debug!(
            "Loaded fleet '{}' with {} service(s) from {}",
            config.app_name,
            config.services.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load_balancer_name(&self) -> String {
        format!("alb-{}", self.app_name)
    }

    /// Check every rule and report all violations together
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("appName must not be empty".to_string());
        } else if let Err(e) = validate_elb_name(&self.load_balancer_name()) {
            errors.push(format!("appName '{}': {}", self.app_name, e));
        }

        if self.services.is_empty() {
            errors.push("services must contain at least one service".to_string());
        }

        let mut seen = HashSet::new();
        let mut catch_all = Vec::new();
        for (i, service) in self.services.iter().enumerate() {
            service.validate(i, &mut errors);

            if !service.service_name.is_empty() && !seen.insert(service.service_name.as_str()) {
                errors.push(format!(
                    "services[{}]: duplicate serviceName '{}'",
                    i, service.service_name
                ));
            }
            if service.is_catch_all() {
                catch_all.push((i, service.service_name.as_str()));
            }
        }

        // Rule priorities follow list order, so a catch-all must come last
        match catch_all.as_slice() {
            [] => {}
            [(i, name)] => {
                if i + 1 != self.services.len() {
                    errors.push(format!(
                        "services[{}] ({}): a service without hostName must be listed last",
                        i, name
                    ));
                }
            }
            many => {
                let names: Vec<_> = many.iter().map(|(_, name)| *name).collect();
                errors.push(format!(
                    "at most one service may omit hostName, found {}: {}",
                    names.len(),
                    names.join(", ")
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

//! AWS Systems Manager Parameter Store backend

use std::collections::HashMap;

use aws_config::Region;
use aws_sdk_ssm::Client as SsmClient;
use aws_sdk_ssm::error::DisplayErrorContext;
use ecs_fleet_core::parameter::{BoxFuture, ParameterError, ParameterResult, ParameterStore};

/// `GetParameters` accepts at most this many names per call
const MAX_NAMES_PER_CALL: usize = 10;

/// Parameter store reading from SSM
pub struct SsmParameterStore {
    client: SsmClient,
}

impl SsmParameterStore {
    /// Create a store for `region`, or the region of the default provider chain
    pub async fn new(region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        let config = loader.load().await;
        log::debug!(
            "SSM parameter store in region {}",
            config
                .region()
                .map(|r| r.as_ref().to_string())
                .unwrap_or_else(|| "<unset>".to_string())
        );

        Self {
            client: SsmClient::new(&config),
        }
    }

    fn backend_error(message: String) -> ParameterError {
        ParameterError::Backend {
            store: "ssm".to_string(),
            message,
        }
    }

    async fn get_parameter(&self, key: &str) -> ParameterResult<Option<String>> {
        let result = self.client.get_parameter().name(key).send().await;
        match result {
            Ok(output) => Ok(output
                .parameter()
                .and_then(|p| p.value())
                .map(str::to_string)),
            Err(e) => {
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_parameter_not_found())
                {
                    Ok(None)
                } else {
                    Err(Self::backend_error(format!(
                        "Failed to get parameter {}: {}",
                        key,
                        DisplayErrorContext(&e)
                    )))
                }
            }
        }
    }

    async fn get_parameters(&self, keys: &[String]) -> ParameterResult<HashMap<String, String>> {
        let mut found = HashMap::new();
        let mut missing = Vec::new();

        for chunk in keys.chunks(MAX_NAMES_PER_CALL) {
            log::debug!("GetParameters for {} key(s)", chunk.len());
            let output = self
                .client
                .get_parameters()
                .set_names(Some(chunk.to_vec()))
                .send()
                .await
                .map_err(|e| {
                    Self::backend_error(format!(
                        "Failed to get parameters: {}",
                        DisplayErrorContext(&e)
                    ))
                })?;

            for parameter in output.parameters() {
                if let (Some(name), Some(value)) = (parameter.name(), parameter.value()) {
                    found.insert(name.to_string(), value.to_string());
                }
            }
            missing.extend(output.invalid_parameters().iter().cloned());
        }

        if missing.is_empty() {
            Ok(found)
        } else {
            log::warn!("{} parameter(s) not found in SSM", missing.len());
            Err(ParameterError::Missing(missing))
        }
    }
}

impl ParameterStore for SsmParameterStore {
    fn name(&self) -> &str {
        "ssm"
    }

    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, ParameterResult<Option<String>>> {
        Box::pin(self.get_parameter(key))
    }

    fn get_all<'a>(
        &'a self,
        keys: &'a [String],
    ) -> BoxFuture<'a, ParameterResult<HashMap<String, String>>> {
        Box::pin(self.get_parameters(keys))
    }
}

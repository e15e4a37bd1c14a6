pub mod config;
pub mod dynamo_adapter;
pub mod prompt_loader;

use alexa_gpt_core::Dispatcher;
use alexa_gpt_core::secrets::{EnvSecretStore, SecretStore};
use alexa_gpt_types::{RequestEnvelope, ResponseEnvelope};
use config::{Config, SecretBackend};
use dynamo_adapter::DynamoSecretStore;
use lambda_runtime::{Error, LambdaEvent};
use std::sync::Arc;

/// Handles one Lambda invocation carrying a skill request.
pub async fn function_handler(
    dispatcher: &Dispatcher,
    event: LambdaEvent<RequestEnvelope>,
) -> Result<ResponseEnvelope, Error> {
    tracing::debug!("invocation {}", event.context.request_id);
    Ok(dispatcher.dispatch(&event.payload).await)
}

/// Constructs the secret store selected by the configuration.
pub async fn secret_store(config: &Config) -> anyhow::Result<Arc<dyn SecretStore>> {
    match config.secret_backend {
        SecretBackend::DynamoDb => {
            let (Some(region), Some(table)) = (&config.dynamodb_region, &config.dynamodb_table)
            else {
                anyhow::bail!("DynamoDB backend selected without region and table");
            };
            tracing::info!("Reading secrets from DynamoDB table '{}' in {}", table, region);
            Ok(Arc::new(DynamoSecretStore::new(region, table).await))
        }
        SecretBackend::Env => {
            tracing::info!("Reading secrets from the environment");
            Ok(Arc::new(EnvSecretStore::new()))
        }
    }
}

use alexa_gpt_core::secrets::{SecretError, SecretStore};
use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use secrecy::SecretString;
use std::collections::HashMap;

/// Partition key of the secrets table.
const ID_ATTRIBUTE: &str = "id";
/// Attribute holding the secret itself.
const VALUE_ATTRIBUTE: &str = "value";

/// An adapter that implements `SecretStore` on top of a DynamoDB table whose
/// items look like `{ "id": <key>, "value": <secret> }`.
pub struct DynamoSecretStore {
    client: Client,
    table_name: String,
}

impl DynamoSecretStore {
    pub async fn new(region: &str, table_name: &str) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        Self::with_client(Client::new(&sdk_config), table_name)
    }

    pub fn with_client(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }
}

#[async_trait]
impl SecretStore for DynamoSecretStore {
    async fn get_value(&self, key: &str) -> Result<SecretString, SecretError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ID_ATTRIBUTE, AttributeValue::S(key.to_string()))
            .send()
            .await
            .map_err(|e| SecretError::Backend {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        value_from_item(key, output.item())
    }
}

/// Extracts the string `value` attribute of a fetched item.
fn value_from_item(
    key: &str,
    item: Option<&HashMap<String, AttributeValue>>,
) -> Result<SecretString, SecretError> {
    item.and_then(|item| item.get(VALUE_ATTRIBUTE))
        .and_then(|value| value.as_s().ok())
        .map(|value| SecretString::from(value.clone()))
        .ok_or_else(|| SecretError::NotFound(key.to_string()))
}

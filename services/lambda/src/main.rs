use alexa_gpt_core::chat::{ChatConfig, OpenAiChatClient};
use alexa_gpt_core::{skill_dispatcher, speech};
use alexa_gpt_lambda::config::Config;
use alexa_gpt_lambda::{function_handler, prompt_loader, secret_store};
use alexa_gpt_types::RequestEnvelope;
use anyhow::Context;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use std::sync::Arc;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    // CloudWatch does not render ANSI colors.
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .with_ansi(false)
        .init();

    tracing::info!("Configuration loaded successfully. Starting skill handler...");

    // --- 3. Load Prompts ---
    let system_prompt = match &config.system_prompt_path {
        Some(path) => prompt_loader::load_system_prompt(path).context("Failed to load system prompt")?,
        None => speech::system_prompt().to_string(),
    };

    // --- 4. Initialize API Clients ---
    let secrets = secret_store(&config)
        .await
        .context("Failed to initialize secret store")?;
    let chat_config = ChatConfig::builder()
        .with_base_url(&config.openai_base_url)
        .with_model(&config.chat_model)
        .with_max_tokens(config.max_tokens)
        .build();
    let chat = Arc::new(OpenAiChatClient::new(secrets, chat_config));
    tracing::info!(
        "Chat client ready: model {} at {}",
        chat.config().model(),
        chat.config().completions_url()
    );

    // --- 5. Serve Invocations ---
    let dispatcher = Arc::new(skill_dispatcher(chat, &system_prompt));
    tracing::info!("Registered handlers: {:?}", dispatcher.handler_names());

    lambda_runtime::run(service_fn(move |event: LambdaEvent<RequestEnvelope>| {
        let dispatcher = dispatcher.clone();
        async move { function_handler(&dispatcher, event).await }
    }))
    .await
}

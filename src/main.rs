use std::{net::TcpListener, path::PathBuf, sync::Arc};

use env_logger::Env;
use thriftscout::{
    configuration::get_configuration,
    services::{
        ElevenLabsNarrator, GeminiAgent, PriceExtractor, ProductDataTool, ToolRegistry,
    },
    startup::run,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration()?;

    let extractor = PriceExtractor::from_settings(&configuration.browser, &configuration.marketplace)?;
    let tools = ToolRegistry::new().register(Arc::new(ProductDataTool::new(Arc::new(extractor))));

    let agent = GeminiAgent::new(
        &configuration.agent,
        configuration.api_keys.gemini.clone(),
        tools,
    )?;
    let narrator = ElevenLabsNarrator::new(
        &configuration.narration,
        configuration.api_keys.elevenlabs.clone(),
    )?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    log::info!(
        "Listening on http://{} | WebDriver at {} | {} browser session(s)",
        address,
        configuration.browser.webdriver_url,
        configuration.browser.max_sessions
    );

    run(
        listener,
        Arc::new(agent),
        Arc::new(narrator),
        PathBuf::from(&configuration.application.static_dir),
        configuration.upload.max_size_bytes,
    )?
    .await?;

    Ok(())
}

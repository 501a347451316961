use std::sync::Arc;

use common::HttpFetcher;
use dotenv::dotenv;
use linkbot::console::{self, ConsoleHost};
use linkbot::{AppConfig, LinkDispatcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    let fetcher = HttpFetcher::new(config.http_timeout)?;
    let dispatcher = LinkDispatcher::with_default_processors(Arc::new(fetcher));

    log::info!(
        "LinkBot started with processors: {}",
        dispatcher.processor_names().join(", ")
    );

    let host = ConsoleHost::new(config.launcher.clone(), config.pipeline_config());
    console::run(&dispatcher, &host).await
}

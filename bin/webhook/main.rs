//! Drone Navigation Webhook Server
//!
//! Runs the s0404 webhook as a standalone HTTP server.

use aidevs_tasks::llm::openai::{OpenAiChat, OpenAiConfig, GPT_4O_MINI};
use aidevs_tasks::webhook::{self, DEFAULT_PORT};
use aidevs_tasks::Env;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tasks-webhook")]
#[command(about = "Drone navigation webhook for the s0404 exercise")]
struct Args {
    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "WEBHOOK_PORT")]
    port: u16,

    /// Server host
    #[arg(long, default_value = "0.0.0.0", env = "WEBHOOK_HOST")]
    host: String,

    /// Env file with the OpenAI key
    #[arg(long, env = "TASKS_ENV_FILE")]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("aidevs_tasks=debug".parse().unwrap())
                .add_directive("tower_http=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let env = Env::load(args.env_file.as_deref())?;

    let model = OpenAiChat::new(OpenAiConfig::from_env(&env, GPT_4O_MINI)?)?;
    info!("Starting drone webhook with model {}", GPT_4O_MINI);

    webhook::run_server(Arc::new(model), &args.host, args.port).await
}

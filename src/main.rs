use std::path::PathBuf;

use anyhow::Context;
use model_dialogue::config::{Backend, Environment, FileConfig, Overrides, Settings};
use structopt::StructOpt;
use strum::{Display, EnumString};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
enum OutputFormat {
    Text,
    Json,
}

#[derive(StructOpt, Debug)]
#[structopt(
    name = "model-dialogue",
    about = "Make two language models talk to each other"
)]
struct Args {
    /// Initial prompt to start the conversation
    topic: String,

    /// Name of the first model [default: llama2]
    #[structopt(long)]
    model_a: Option<String>,

    /// Name of the second model [default: llama2]
    #[structopt(long)]
    model_b: Option<String>,

    /// Number of turns in the conversation [default: 4]
    #[structopt(short, long)]
    turns: Option<usize>,

    /// Model backend (ollama or openai) [default: ollama]
    #[structopt(short, long)]
    backend: Option<Backend>,

    /// Path to a TOML config file
    #[structopt(short, long)]
    config: Option<PathBuf>,

    /// Output format (text or json)
    #[structopt(short, long, default_value = "text")]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenv::dotenv().ok();
    let environment = Environment::from_env()?;
    let args = Args::from_args();

    let file = FileConfig::discover(args.config.as_deref()).await?;
    let settings = Settings::resolve(
        Overrides {
            model_a: args.model_a,
            model_b: args.model_b,
            turns: args.turns,
            backend: args.backend,
        },
        environment,
        file,
    );

    let client = settings
        .client()
        .context("Failed to set up the model backend")?;
    let conversation = settings.conversation(args.topic);

    info!(
        backend = %settings.backend,
        model_a = %conversation.model_a,
        model_b = %conversation.model_b,
        turns = conversation.turns,
        "Starting conversation"
    );

    let transcript = conversation
        .run(client.as_ref())
        .await
        .context("Conversation aborted")?;

    match args.format {
        OutputFormat::Text => println!("{}", transcript.to_lines()),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&transcript)?);
        }
    }

    Ok(())
}

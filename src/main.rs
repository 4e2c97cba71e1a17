//! Screener - applicant answer scoring and a Gemini chat front-end
//!
//! Subcommands:
//! - `score`: classify every answer in a CSV and write applicant_scores.csv
//! - `classify`: classify a single piece of text
//! - `serve`: HTTP upload/download of the same scoring
//! - `chat`: interactive Gemini chat

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt};

use screener::chat::{ChatSession, GeminiChatProvider};
use screener::cli::{self, ClassifierOptions, score::Output};
use screener::config::{self, Config, DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_URL, DEFAULT_HOST, DEFAULT_PORT};
use screener::repl::Repl;
use screener::table::RESULT_FILE_NAME;

#[derive(Parser)]
#[command(name = "screener")]
#[command(about = "Score applicant answers as AI- or human-written, or chat with Gemini")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Hugging Face API token
    #[arg(long, global = true, env = "HF_API_TOKEN", hide_env_values = true)]
    hf_api_token: Option<String>,

    /// Inference API base URL
    #[arg(long, global = true, env = "SCREENER_CLASSIFIER_URL")]
    classifier_url: Option<String>,

    /// Zero-shot classification model
    #[arg(long, global = true, env = "SCREENER_CLASSIFIER_MODEL")]
    classifier_model: Option<String>,

    /// Classifier request timeout in seconds
    #[arg(long, global = true)]
    classifier_timeout: Option<u64>,

    /// File whose contents replace the built-in rubric
    #[arg(long, global = true, env = "SCREENER_RUBRIC")]
    rubric: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every applicant in a CSV file
    Score {
        /// Input CSV with columns email,a,b,c,d,e
        input: PathBuf,

        /// Output path ("-" for stdout)
        #[arg(long, short = 'o', default_value = RESULT_FILE_NAME)]
        output: String,

        /// Only report failures
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Classify a single text and print its label
    Classify {
        /// Text to classify
        text: String,
    },

    /// Serve the scoring pipeline over HTTP
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },

    /// Chat with Gemini
    Chat {
        /// Gemini API key
        #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Gemini model
        #[arg(long, env = "SCREENER_GEMINI_MODEL")]
        model: Option<String>,

        /// Optional system instruction
        #[arg(long)]
        system: Option<String>,

        /// Send one message, print the reply and exit
        #[arg(long, short = 'm')]
        message: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from ~/.screener/.env or current dir)
    config::load_dotenv();

    // Initialize logging
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Load config file (~/.screener/config.toml)
    let config = Config::load();

    // Resolve values: CLI args > env vars (handled by clap) > config file > defaults
    let options = ClassifierOptions {
        url: args.classifier_url.unwrap_or_else(|| config.classifier_url()),
        model: args.classifier_model.unwrap_or_else(|| config.classifier_model()),
        api_token: args.hf_api_token.or(config.hf_api_token.clone()),
        timeout: args
            .classifier_timeout
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.classifier_timeout()),
        rubric_path: args.rubric.or(config.rubric_path.clone()),
    };

    match args.command {
        Commands::Score { input, output, quiet } => {
            let evaluator = cli::build_evaluator(&options)?;
            cli::score::run(evaluator, &input, &Output::parse(&output), quiet).await?;
        }
        Commands::Classify { text } => {
            let evaluator = cli::build_evaluator(&options)?;
            let result = evaluator.evaluate(&text).await;
            println!("Answer Type: {}, Confidence: {:.2}", result.label, result.confidence);
        }
        Commands::Serve { host, port } => {
            let evaluator = cli::build_evaluator(&options)?;
            let host = host
                .or(config.host.clone())
                .unwrap_or_else(|| DEFAULT_HOST.to_string());
            let port = port.or(config.port).unwrap_or(DEFAULT_PORT);
            cli::serve::run(evaluator, &host, port).await?;
        }
        Commands::Chat { api_key, model, system, message } => {
            let api_key = api_key
                .or(config.gemini_api_key.clone())
                .or_else(|| std::env::var("GEMINI_API_KEY").ok())
                .ok_or_else(|| {
                    anyhow!("GOOGLE_API_KEY required (set via --api-key, env var, or ~/.screener/config.toml)")
                })?;
            let model = model
                .or(config.gemini_model.clone())
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
            let base_url = config
                .gemini_url
                .clone()
                .unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string());

            let provider = GeminiChatProvider::new(api_key)
                .with_model(&model)
                .with_base_url(&base_url);

            tracing::info!("Chat model: {}", model);

            let mut session = ChatSession::new(Arc::new(provider));
            if let Some(system) = system {
                session = session.with_system(system);
            }

            match message {
                Some(message) => println!("{}", session.send(&message).await?),
                None => Repl::new(session)?.run().await?,
            }
        }
    }

    Ok(())
}

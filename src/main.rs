//! `review-lens [PATH]` - score a JSON array of reviews read from PATH or stdin.

use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use review_lens::adapters::input::{input_path_from_args, load_reviews, ReviewFileError};
use review_lens::adapters::{OpenAIConfig, OpenAIProvider, TracingObserver};
use review_lens::application::{AnalyzeReviewsCommand, AnalyzeReviewsHandler, ChunkDispatcher};
use review_lens::config::{AppConfig, ConfigError};
use review_lens::domain::scoring::AnalysisError;
use review_lens::ports::{AIError, AIProvider};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not start the scoring client: {0}")]
    Provider(#[from] AIError),
    #[error(transparent)]
    Input(#[from] ReviewFileError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("failed to write result: {0}")]
    Output(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let CliError::Analysis(analysis) = &err {
                tracing::error!(class = analysis.class(), "analysis failed");
            }
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), CliError> {
    let config = AppConfig::load()?;
    config.validate().map_err(ConfigError::from)?;

    let provider = OpenAIProvider::new(openai_config(&config))?;
    let info = provider.provider_info();
    let dispatcher = ChunkDispatcher::from_config(Arc::new(provider), &config.scoring)
        .with_observer(Arc::new(TracingObserver::new()));
    let handler = AnalyzeReviewsHandler::new(dispatcher);

    let path = input_path_from_args(std::env::args());
    let reviews = load_reviews(path.as_deref())?;
    tracing::info!(
        reviews = reviews.len(),
        provider = %info.name,
        model = %info.model,
        "scoring reviews"
    );

    let result = handler.handle(AnalyzeReviewsCommand::new(reviews)).await?;
    if !result.is_complete() {
        tracing::warn!(
            unscored = result.summary.unscored_ids.len(),
            "some reviews received no score"
        );
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn openai_config(config: &AppConfig) -> OpenAIConfig {
    OpenAIConfig::new(config.ai.api_key.clone().unwrap_or_default())
        .with_model(config.ai.model.clone())
        .with_base_url(config.ai.base_url.clone())
        .with_connect_timeout(config.ai.connect_timeout())
}

/// Logs go to stderr so stdout carries only the result.
/// `REVIEW_LENS_LOG_FORMAT=json` switches to structured output.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("review_lens=info"));
    let json = std::env::var("REVIEW_LENS_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if installed.is_err() {
        eprintln!("tracing subscriber already set; skipping re-initialization");
    }
}

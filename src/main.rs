mod classify;
mod cli;
mod error;
mod model;
mod probe;
mod provider;
mod report;
mod session;
mod table;

use clap::Parser;
use cli::CliArgs;
use error::Result;
use report::Summary;

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

async fn run(args: &CliArgs) -> Result<Summary> {
    let profile = args.provider.profile();
    let models = args.resolve_models(profile);
    let session = session::ApiSession::new(&args.session_config(profile)?)?;

    if !args.models.is_empty() {
        println!("Testing specific models: {}", models.join(", "));
    }
    println!("Testing {} model(s)...", models.len());

    let outcomes = probe::probe_all(&session, &models, args.concurrency()).await;
    let table = model::ModelTable::builtin();
    let verdicts = outcomes
        .into_iter()
        .map(|outcome| classify::classify(outcome, table, profile.match_policy))
        .collect();
    let summary = Summary::from_verdicts(verdicts);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary.to_json())?);
    } else {
        println!("\n{}", report::render_report(&summary));
    }

    if let Some(path) = &args.summary_file {
        report::append_summary_file(path, &summary.counts())?;
    }

    Ok(summary)
}

#[tokio::main]
async fn main() {
    init_tracing();
    let args = CliArgs::parse();

    match run(&args).await {
        Ok(summary) if summary.all_available() => {
            println!("\nAll models are available!");
        }
        Ok(summary) => {
            println!(
                "\nWarning: {} model(s) unavailable",
                summary.counts().unavailable_count
            );
            std::process::exit(1);
        }
        Err(error) => {
            tracing::error!("{error:?}");
            std::process::exit(2);
        }
    }
}

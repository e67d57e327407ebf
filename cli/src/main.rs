use clap::{ArgAction, Args, Parser, Subcommand};
use common::{
    CreateJobRequest, FastfoldClient, JobId, OutputTarget, Overrides, PollOutcome, Settings,
    Summary,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about = "Client for the FastFold protein folding API", long_about = None)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Connection flags shared by every command.
#[derive(Args, Clone, Default)]
struct ApiArgs {
    /// API key (default: FASTFOLD_API_KEY)
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,
    /// API base URL (default: https://api.fastfold.ai)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new fold job and print its ID
    CreateJob {
        /// Job name
        #[arg(long)]
        name: String,
        /// Protein sequence (one-letter codes)
        #[arg(long)]
        sequence: String,
        /// Model name
        #[arg(long, default_value = common::DEFAULT_MODEL)]
        model: String,
        /// Print the full response JSON instead of the job ID
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Poll a job until it completes, fails or the timeout runs out
    Wait {
        /// FastFold job ID (UUID)
        job_id: String,
        /// Time between polls, in seconds or with a unit (default 5)
        #[arg(long, value_parser = common::parse_duration)]
        poll_interval: Option<Duration>,
        /// Maximum time to wait, in seconds or with a unit (default 900)
        #[arg(long, value_parser = common::parse_duration)]
        timeout: Option<Duration>,
        /// Print the final results JSON to stdout
        #[arg(long)]
        json: bool,
        /// Do not print status lines
        #[arg(long)]
        quiet: bool,
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Fetch job results as JSON or a short summary
    FetchResults {
        /// FastFold job ID (UUID)
        job_id: String,
        /// Print the full results JSON (default)
        #[arg(long, conflicts_with = "summary")]
        json: bool,
        /// Print status and artifact summary
        #[arg(long)]
        summary: bool,
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Download the CIF structure file(s) of a completed job
    DownloadCif {
        /// FastFold job ID (UUID)
        job_id: String,
        /// Output CIF path (complex or single-sequence jobs only)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Output directory
        #[arg(long, value_name = "DIR", default_value = ".")]
        dir: PathBuf,
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Print the cloud viewer URL for a job
    ViewerLink {
        /// FastFold job ID (UUID)
        job_id: String,
        /// Verify the job exists via the API before printing the URL
        #[arg(long)]
        check: bool,
        #[command(flatten)]
        api: ApiArgs,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(cli.verbose) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<ExitCode> {
    match command {
        Commands::CreateJob { name, sequence, model, json, api } => {
            let settings = resolve_settings(&api, None, None)?;
            let client = connect(&settings)?;

            let request = CreateJobRequest::protein(&name, &sequence, &model);
            let created = client.create_job(&request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&created)?);
            } else if let Some(job_id) = created.job_id {
                println!("{}", job_id);
            }
        },
        Commands::Wait { job_id, poll_interval, timeout, json, quiet, api } => {
            let settings = resolve_settings(&api, poll_interval, timeout)?;
            let client = connect(&settings)?;
            let job_id = JobId(job_id);

            let shutdown = async {
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            };
            let outcome = common::wait_for_completion(
                &client,
                &job_id,
                &settings.poll,
                shutdown,
                |status| {
                    if !quiet {
                        eprintln!("[FastFold] job {} status: {}", job_id, status);
                    }
                },
            )
            .await?;

            if json {
                if let Some(results) = outcome.results() {
                    println!("{}", results.to_pretty_json()?);
                }
            }
            match &outcome {
                PollOutcome::TimedOut { last_status } => {
                    eprintln!("Timed out waiting for job {} (last status: {})", job_id, last_status);
                }
                PollOutcome::Interrupted { .. } => eprintln!("Interrupted."),
                _ => {}
            }
            return Ok(ExitCode::from(outcome.exit_code()));
        },
        Commands::FetchResults { job_id, json: _, summary, api } => {
            let settings = resolve_settings(&api, None, None)?;
            let client = connect(&settings)?;

            let results = client.fetch_results(&JobId(job_id)).await?;
            if summary {
                println!("{}", Summary(&results));
            } else {
                println!("{}", results.to_pretty_json()?);
            }
        },
        Commands::DownloadCif { job_id, out, dir, api } => {
            let settings = resolve_settings(&api, None, None)?;
            let client = connect(&settings)?;

            let target = OutputTarget { out, dir };
            for path in common::download_structures(&client, &JobId(job_id), &target).await? {
                println!("{}", path.display());
            }
        },
        Commands::ViewerLink { job_id, check, api } => {
            let job_id = JobId(job_id);
            if check {
                let settings = resolve_settings(&api, None, None)?;
                let client = connect(&settings)?;
                client.fetch_results(&job_id).await?;
            }
            println!("{}", common::viewer_link(&job_id));
        },
    }

    Ok(ExitCode::SUCCESS)
}

/// Flags, then environment (including `.env`), then config file.
fn resolve_settings(
    api: &ApiArgs,
    poll_interval: Option<Duration>,
    timeout: Option<Duration>,
) -> anyhow::Result<Settings> {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("Ignoring .env file: {}", e),
    }

    let env = |key: &str| std::env::var(key).ok();
    let cwd = std::env::current_dir()?;
    let file = common::config::load_config(env, &cwd)?;

    let flags = Overrides {
        api_key: api.api_key.clone(),
        base_url: api.base_url.clone(),
        poll_interval,
        timeout,
    };
    Ok(Settings::resolve(flags, env, file))
}

fn connect(settings: &Settings) -> anyhow::Result<FastfoldClient> {
    let client = FastfoldClient::new(&settings.base_url, settings.api_key()?)?;
    log::info!("Using FastFold API at {}", client.base_url());
    Ok(client)
}

fn setup_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match std::env::var("FASTFOLD_LOG").ok().and_then(|l| l.parse::<log::LevelFilter>().ok()) {
        Some(level) if verbose == 0 => level,
        _ => match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        },
    };

    // stdout carries command output, so logs only ever go to stderr
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                chrono::Local::now().format("%Y-%m-%d][%H:%M:%S"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .level_for("hyper_util", log::LevelFilter::Warn)
        .level_for("reqwest", log::LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()?;

    Ok(())
}

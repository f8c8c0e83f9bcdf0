use clap::{Args as ClapArgs, Parser, Subcommand};
use parley_engine::config::{ConfigLoader, ParleyConfig, TimingConfig};
use parley_engine::dom::MemoryPage;
use parley_engine::formatter::format_report;
use parley_engine::protocol::{ReplyJob, ReplySteps};
use parley_engine::sequencer::ReplySequencer;
use parley_h::backend::HeadlessBackend;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parley-h", version, about = "Reply to a comment thread in Chromium")]
struct Args {
    #[command(subcommand)]
    mode: Mode,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Open the URL in Chromium and post the reply
    Run {
        /// Comment permalink carrying comment_id / reply_comment_id
        #[arg(long)]
        url: String,

        #[command(flatten)]
        job: JobArgs,

        /// Launch browser in visible mode (not headless)
        #[arg(long)]
        visible: bool,

        /// Config file (defaults to ./parley.yaml, then ~/.parley/config.yaml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run against a saved HTML page without a browser
    DryRun {
        /// HTML file to load
        #[arg(long)]
        html: PathBuf,

        /// Address the page pretends to be at
        #[arg(long)]
        url: String,

        #[command(flatten)]
        job: JobArgs,
    },
}

#[derive(ClapArgs)]
struct JobArgs {
    /// Reply text
    #[arg(long)]
    message: String,

    #[arg(long)]
    skip_reply_click: bool,

    #[arg(long)]
    skip_input: bool,

    #[arg(long)]
    skip_submit: bool,

    /// Image to attach (repeatable)
    #[arg(long = "image")]
    images: Vec<PathBuf>,
}

impl JobArgs {
    fn into_job(self) -> ReplyJob {
        let steps = ReplySteps {
            click_reply: !self.skip_reply_click,
            input_text: !self.skip_input,
            upload_images: !self.images.is_empty(),
            submit_reply: !self.skip_submit,
        };
        let mut job = ReplyJob::new(self.message, steps);
        job.images = self.images;
        job
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // stdout carries the outcome JSON only
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.mode {
        Mode::Run {
            url,
            job,
            visible,
            config,
        } => run(url, job.into_job(), visible, config).await,
        Mode::DryRun { html, url, job } => dry_run(html, url, job.into_job()).await,
    }
}

async fn load_config(path: Option<PathBuf>) -> Result<ParleyConfig, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => ConfigLoader::load_from(&path).await?,
        None => ConfigLoader::load_default().await?,
    })
}

async fn run(
    url: String,
    job: ReplyJob,
    visible: bool,
    config: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let sequencer = ReplySequencer::new(load_config(config).await?);

    let mut backend = HeadlessBackend::new_with_visibility(visible);
    if let Err(e) = backend.launch().await {
        eprintln!("Failed to launch backend: {}", e);
        return Err(e.into());
    }

    let result = async {
        let landed = backend.navigate(&url).await?;
        info!("Page loaded at {}", landed);
        let mut page = backend.page()?;
        Ok::<_, Box<dyn std::error::Error>>(sequencer.run_detailed(&mut page, &job).await)
    }
    .await;

    backend.close().await?;
    let (outcome, report) = result?;

    eprintln!("{}", format_report(&outcome, &report));
    println!("{}", serde_json::to_string(&outcome)?);
    Ok(())
}

async fn dry_run(
    html: PathBuf,
    url: String,
    job: ReplyJob,
) -> Result<(), Box<dyn std::error::Error>> {
    let markup = tokio::fs::read_to_string(&html).await?;
    let mut page = MemoryPage::new(url, &markup);

    // A static page never reacts, so waiting only slows the run down.
    let config = ParleyConfig {
        timings: TimingConfig::immediate(),
        ..ParleyConfig::default()
    };
    let (outcome, report) = ReplySequencer::new(config)
        .run_detailed(&mut page, &job)
        .await;

    eprintln!("{}", format_report(&outcome, &report));
    eprintln!("Events:");
    for event in page.journal() {
        eprintln!("- {:?}", event);
    }
    println!("{}", serde_json::to_string(&outcome)?);
    Ok(())
}

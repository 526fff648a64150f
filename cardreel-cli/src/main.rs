use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use cardreel::{FontSet, FrameIndex, PreparedProject, Project, RenderOptions};
use cardreel_service::{
    AssetFetcher, AssetPolicy, LogProgress, ServiceConfig, TtsAudio, TtsRequest, TtsSettings,
    TtsVendor, VideoProducer, provider_from_settings,
};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "cardreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a project and print every problem found.
    Validate(ValidateArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render a project to MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Synthesize narration with the configured TTS provider.
    Tts(TtsArgs),
    /// Run the HTTP API and the render workers.
    Serve(ServeArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Base directory for relative asset paths; defaults to the project's directory.
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Extra fonts loaded next to the system fonts.
    #[arg(long)]
    fonts_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Frames rendered per batch.
    #[arg(long, default_value_t = 32)]
    chunk_size: usize,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Render every frame even when it repeats the previous one.
    #[arg(long, default_value_t = false)]
    no_elision: bool,

    #[arg(long, default_value = "lenient")]
    asset_policy: AssetPolicy,

    /// Base directory for relative asset paths; defaults to the project's directory.
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    #[arg(long)]
    fonts_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct TtsArgs {
    /// Text to speak.
    #[arg(long)]
    text: String,

    /// Output audio path.
    #[arg(long)]
    out: PathBuf,

    /// Vendor-specific voice name or id.
    #[arg(long)]
    voice: Option<String>,

    /// Speaking rate, 1.0 is normal.
    #[arg(long)]
    speed: Option<f32>,

    #[command(flatten)]
    provider: ProviderArgs,
}

/// TTS vendor selection and credentials.
#[derive(Args, Debug)]
struct ProviderArgs {
    #[arg(long, env = "TTS_PROVIDER")]
    tts_provider: Option<TtsVendor>,

    #[arg(long, env = "GOOGLE_TTS_API_KEY", hide_env_values = true)]
    google_api_key: Option<String>,

    #[arg(long, env = "ELEVENLABS_API_KEY", hide_env_values = true)]
    elevenlabs_api_key: Option<String>,

    #[arg(long, env = "ELEVENLABS_VOICE_ID")]
    elevenlabs_voice_id: Option<String>,

    #[arg(long, env = "ELEVENLABS_MODEL_ID")]
    elevenlabs_model_id: Option<String>,

    #[arg(long, env = "TYPECAST_API_KEY", hide_env_values = true)]
    typecast_api_key: Option<String>,

    #[arg(long, env = "TYPECAST_ACTOR_ID")]
    typecast_actor_id: Option<String>,
}

impl From<ProviderArgs> for TtsSettings {
    fn from(a: ProviderArgs) -> Self {
        Self {
            provider: a.tts_provider,
            google_api_key: a.google_api_key,
            elevenlabs_api_key: a.elevenlabs_api_key,
            elevenlabs_voice_id: a.elevenlabs_voice_id,
            elevenlabs_model_id: a.elevenlabs_model_id,
            typecast_api_key: a.typecast_api_key,
            typecast_actor_id: a.typecast_actor_id,
        }
    }
}

#[derive(Parser, Debug)]
struct ServeArgs {
    #[arg(long, env = "HTTP_ADDR", default_value = "0.0.0.0:3000")]
    http_addr: SocketAddr,

    /// Parent of the per-job scratch directories; defaults to the system temp dir.
    #[arg(long, env = "WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Published videos go to `<output-dir>/videos`.
    #[arg(long, env = "OUTPUT_DIR", default_value = "./output")]
    output_dir: PathBuf,

    #[arg(long, env = "PUBLIC_BASE_URL", default_value = "http://localhost:3000/videos")]
    public_base_url: String,

    #[arg(long, env = "RENDER_WORKERS", default_value_t = 1)]
    workers: usize,

    #[arg(long, env = "RENDER_QUEUE_CAPACITY", default_value_t = 64)]
    queue_capacity: usize,

    #[arg(long, env = "JOB_TIMEOUT_SECS", default_value_t = 1800)]
    job_timeout_secs: u64,

    #[arg(long, env = "JOB_MAX_ATTEMPTS", default_value_t = 2)]
    max_attempts: u32,

    #[arg(long, env = "RETRY_BACKOFF_MS", default_value_t = 2000)]
    retry_backoff_ms: u64,

    #[arg(long, env = "ASSET_POLICY", default_value = "lenient")]
    asset_policy: AssetPolicy,

    #[arg(long, env = "FONTS_DIR")]
    fonts_dir: Option<PathBuf>,

    #[command(flatten)]
    provider: ProviderArgs,
}

impl From<ServeArgs> for ServiceConfig {
    fn from(a: ServeArgs) -> Self {
        Self {
            http_addr: a.http_addr,
            work_dir: a.work_dir.unwrap_or_else(std::env::temp_dir),
            output_dir: a.output_dir,
            public_base_url: a.public_base_url,
            workers: a.workers.max(1),
            queue_capacity: a.queue_capacity.max(1),
            job_timeout: Duration::from_secs(a.job_timeout_secs),
            max_attempts: a.max_attempts.max(1),
            retry_backoff: Duration::from_millis(a.retry_backoff_ms),
            asset_policy: a.asset_policy,
            fonts_dir: a.fonts_dir,
            tts: a.provider.into(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Frame(args) => cmd_frame(args).await,
        Command::Render(args) => cmd_render(args).await,
        Command::Tts(args) => cmd_tts(args).await,
        Command::Serve(args) => cardreel_service::serve(args.into())
            .await
            .context("render service stopped"),
    }
}

fn load_project(path: &Path) -> anyhow::Result<Project> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("open project '{}'", path.display()))?;
    Project::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("parse project '{}'", path.display()))
}

fn assets_base(in_path: &Path, assets_dir: Option<PathBuf>) -> PathBuf {
    assets_dir.unwrap_or_else(|| {
        in_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf()
    })
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let project = load_project(&args.in_path)?;
    match cardreel::validate_project(&project) {
        Ok(()) => {
            eprintln!(
                "{}: ok ({} cards, {:.2}s)",
                args.in_path.display(),
                project.script_cards.len(),
                project.total_duration_secs()
            );
            Ok(())
        }
        Err(errs) => {
            for e in &errs.errors {
                eprintln!("{e}");
            }
            anyhow::bail!("{} problem(s) in '{}'", errs.errors.len(), args.in_path.display())
        }
    }
}

async fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let project = load_project(&args.in_path)?;
    let fetcher = AssetFetcher::new(AssetFetcher::http_client()?, AssetPolicy::Lenient)
        .with_base_dir(assets_base(&args.in_path, args.assets_dir));
    let scratch = tempfile::tempdir().context("create scratch dir")?;
    let fetched = fetcher.fetch_project(&project, scratch.path()).await?;
    for w in &fetched.warnings {
        tracing::warn!("{w}");
    }

    let fonts_dir = args.fonts_dir;
    let frame = args.frame;
    let out = args.out;
    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let fonts = FontSet::load(fonts_dir.as_deref());
        let prepared = PreparedProject::prepare(&project, &fetched.assets, &fonts)?;
        let rgba = cardreel::render_frame(&prepared, FrameIndex(frame))?;
        ensure_parent(&out)?;
        cardreel::frame_to_png(&rgba, &out)
            .with_context(|| format!("write png '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
        Ok(())
    })
    .await?
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let project = Arc::new(load_project(&args.in_path)?);
    let fetcher = AssetFetcher::new(AssetFetcher::http_client()?, args.asset_policy)
        .with_base_dir(assets_base(&args.in_path, args.assets_dir));
    let fonts_dir = args.fonts_dir;
    let fonts = tokio::task::spawn_blocking(move || FontSet::load(fonts_dir.as_deref())).await?;
    let producer = VideoProducer::new(fetcher, fonts).with_render_options(RenderOptions {
        chunk_size: args.chunk_size.max(1),
        threads: args.threads,
        static_frame_elision: !args.no_elision,
        ..RenderOptions::default()
    });

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, stopping render");
                cancel.cancel();
            }
        }
    });

    ensure_parent(&args.out)?;
    let scratch = tempfile::tempdir().context("create scratch dir")?;
    let warnings = producer
        .produce(project, scratch.path(), &args.out, Arc::new(LogProgress), &cancel)
        .await
        .with_context(|| format!("render '{}'", args.in_path.display()))?;

    if !warnings.is_empty() {
        eprintln!("{} asset(s) left out of the video", warnings.len());
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

async fn cmd_tts(args: TtsArgs) -> anyhow::Result<()> {
    let client = AssetFetcher::http_client()?;
    let settings = TtsSettings::from(args.provider);
    let provider = provider_from_settings(&settings, client.clone())?
        .context("no TTS provider configured (set TTS_PROVIDER)")?;

    let req = TtsRequest {
        text: args.text,
        voice: args.voice,
        speed: args.speed,
    };
    req.check()?;
    let audio = provider
        .synthesize(&req)
        .await
        .with_context(|| format!("synthesize with {}", provider.name()))?;

    ensure_parent(&args.out)?;
    match audio {
        TtsAudio::Inline { bytes, .. } => tokio::fs::write(&args.out, bytes)
            .await
            .with_context(|| format!("write audio '{}'", args.out.display()))?,
        TtsAudio::Url(url) => {
            let scratch = tempfile::tempdir().context("create scratch dir")?;
            let fetched = AssetFetcher::new(client, AssetPolicy::Strict)
                .fetch(&url, scratch.path(), "speech")
                .await?;
            tokio::fs::copy(&fetched, &args.out)
                .await
                .with_context(|| format!("write audio '{}'", args.out.display()))?;
        }
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

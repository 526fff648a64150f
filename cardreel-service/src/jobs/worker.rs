use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cardreel::{
    AudioMixPlan, EncodeOptions, FfmpegSink, FontSet, LocalAssets, PreparedProject, Project,
    RenderOptions, RenderProgress, mix_to_file, render_to_sink,
};
use tokio_util::sync::CancellationToken;

use crate::error::{ServiceError, ServiceResult};
use crate::fetch::AssetFetcher;
use crate::jobs::queue::{JobContext, JobHandler, JobOutcome, ProgressReporter};
use crate::storage::VideoStore;

/// Progress milestones, in percent.
pub mod milestone {
    pub const SETUP: u8 = 5;
    pub const ASSETS: u8 = 10;
    pub const AUDIO: u8 = 20;
    pub const FRAMES_DONE: u8 = 90;
    pub const PUBLISH: u8 = 95;
}

/// Receives progress of one video production.
pub trait ProgressObserver: Send + Sync {
    fn progress(&self, percent: u8, message: &str);

    fn warnings(&self, _warnings: &[String]) {}
}

impl ProgressObserver for ProgressReporter {
    fn progress(&self, percent: u8, message: &str) {
        self.report(percent, message);
    }

    fn warnings(&self, warnings: &[String]) {
        self.warn(warnings);
    }
}

/// Logs progress with `tracing`; used outside the job queue.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn progress(&self, percent: u8, message: &str) {
        tracing::info!(percent, "{message}");
    }

    fn warnings(&self, warnings: &[String]) {
        for w in warnings {
            tracing::warn!("{w}");
        }
    }
}

/// Fetches, mixes, renders and encodes one project into an MP4 file.
#[derive(Clone)]
pub struct VideoProducer {
    fetcher: AssetFetcher,
    fonts: FontSet,
    render: RenderOptions,
}

impl VideoProducer {
    pub fn new(fetcher: AssetFetcher, fonts: FontSet) -> Self {
        Self {
            fetcher,
            fonts,
            render: RenderOptions::default(),
        }
    }

    /// Chunking and threading used for every render; `range` and `audio` are overridden.
    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Fetch assets into `scratch`, mix audio and encode `out_path`.
    ///
    /// Returns the warnings collected on the way (assets left out of the video). After
    /// `cancel` fires this still waits for the blocking stages to notice and stop, so nothing
    /// touches `scratch` once it returns.
    pub async fn produce(
        &self,
        project: Arc<Project>,
        scratch: &Path,
        out_path: &Path,
        observer: Arc<dyn ProgressObserver>,
        cancel: &CancellationToken,
    ) -> ServiceResult<Vec<String>> {
        let assets_dir = scratch.join("assets");
        let fetched = tokio::select! {
            _ = cancel.cancelled() => return Err(ServiceError::Cancelled),
            res = self.fetcher.fetch_project(&project, &assets_dir) => res?,
        };
        observer.warnings(&fetched.warnings);
        observer.progress(milestone::ASSETS, "assets fetched");

        let flag = Arc::new(AtomicBool::new(cancel.is_cancelled()));
        let watcher = tokio::spawn({
            let flag = flag.clone();
            let cancel = cancel.clone();
            async move {
                cancel.cancelled().await;
                flag.store(true, Ordering::Relaxed);
            }
        });

        let task = {
            let this = self.clone();
            let assets = fetched.assets;
            let scratch = scratch.to_path_buf();
            let out_path = out_path.to_path_buf();
            let flag = flag.clone();
            tokio::task::spawn_blocking(move || {
                let observer = observer.as_ref();
                this.encode_blocking(&project, &assets, &scratch, &out_path, observer, &flag)
            })
        };
        let res = task.await;
        watcher.abort();
        res??;

        Ok(fetched.warnings)
    }

    /// The blocking half of [`Self::produce`]: mix, prepare, render.
    ///
    /// `cancel` is checked between stages, kills the audio mix and stops rendering between
    /// chunks.
    fn encode_blocking(
        &self,
        project: &Project,
        assets: &LocalAssets,
        scratch: &Path,
        out_path: &Path,
        observer: &dyn ProgressObserver,
        cancel: &AtomicBool,
    ) -> ServiceResult<()> {
        let check = || {
            if cancel.load(Ordering::Relaxed) {
                Err(ServiceError::Cancelled)
            } else {
                Ok(())
            }
        };

        check()?;
        let plan = AudioMixPlan::from_project(project, assets);
        let audio = mix_to_file(&plan, &scratch.join("audio.m4a"), cancel)
            .map_err(|e| ServiceError::from(e).normalize())?;
        observer.progress(milestone::AUDIO, "audio mixed");

        check()?;
        let prepared = PreparedProject::prepare(project, assets, &self.fonts)?;
        check()?;

        let mut sink =
            FfmpegSink::new(EncodeOptions::new(out_path).with_background(prepared.background()));
        let opts = RenderOptions {
            range: None,
            audio,
            ..self.render.clone()
        };
        let span = f64::from(milestone::FRAMES_DONE - milestone::AUDIO);
        render_to_sink(
            &prepared,
            &mut sink,
            &opts,
            &mut |p: RenderProgress| {
                let percent = milestone::AUDIO + (span * p.fraction()).round() as u8;
                observer.progress(
                    percent,
                    &format!("rendering frames {}/{}", p.frames_done, p.frames_total),
                );
            },
            cancel,
        )
        .map_err(|e| ServiceError::from(e).normalize())?;
        Ok(())
    }
}

/// [`JobHandler`] of the service: produce the video in a per-attempt scratch dir, then publish.
pub struct RenderWorker {
    producer: VideoProducer,
    videos: Arc<dyn VideoStore>,
    work_dir: PathBuf,
}

impl RenderWorker {
    pub fn new(
        producer: VideoProducer,
        videos: Arc<dyn VideoStore>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            producer,
            videos,
            work_dir: work_dir.into(),
        }
    }
}

#[async_trait::async_trait]
impl JobHandler for RenderWorker {
    async fn run(&self, ctx: JobContext) -> ServiceResult<JobOutcome> {
        ctx.progress
            .report(milestone::SETUP, "setting up render environment");
        tokio::fs::create_dir_all(&self.work_dir).await?;
        let scratch = tempfile::Builder::new()
            .prefix(&format!("cardreel-{}-", ctx.job_id))
            .tempdir_in(&self.work_dir)?;
        let out = scratch.path().join("output.mp4");
        tracing::debug!(dir = %scratch.path().display(), attempt = ctx.attempt, "job scratch dir created");

        let observer: Arc<dyn ProgressObserver> = Arc::new(ctx.progress.clone());
        self.producer
            .produce(ctx.project.clone(), scratch.path(), &out, observer, &ctx.cancel)
            .await?;

        ctx.progress.report(milestone::PUBLISH, "publishing video");
        let video_url = self
            .videos
            .publish(&ctx.job_id, ctx.project.title(), &out)
            .await?;
        Ok(JobOutcome { video_url })
    }
}

use std::path::Path as FsPath;
use std::sync::Arc;

use cardreel::{FontSet, Project};
use poem::endpoint::StaticFilesEndpoint;
use poem::listener::TcpListener;
use poem::middleware::{Cors, Tracing};
use poem::{Endpoint, EndpointExt, Route, Server};
use poem_openapi::param::Path;
use poem_openapi::payload::{Json, PlainText};
use poem_openapi::{ApiResponse, Object, OpenApi, OpenApiService};

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::fetch::AssetFetcher;
use crate::jobs::{JobRecord, JobStore, QueueConfig, RenderQueue, RenderWorker, VideoProducer};
use crate::storage::LocalVideoStore;
use crate::tts::{TtsProvider, TtsRequest, provider_from_settings};

/// Shared state behind the HTTP handlers.
#[derive(Clone)]
pub struct ApiState {
    pub queue: RenderQueue,
    pub tts: Option<Arc<dyn TtsProvider>>,
}

#[derive(Debug, Object)]
#[oai(rename_all = "camelCase")]
struct SubmitReply {
    success: bool,
    message: String,
    #[oai(skip_serializing_if = "Option::is_none")]
    job_id: Option<String>,
}

#[derive(Debug, Object)]
struct MessageReply {
    message: String,
}

#[derive(Debug, Object)]
struct TtsBody {
    #[oai(default)]
    text: String,
    voice: Option<String>,
    /// A number or a numeric string.
    speed: Option<serde_json::Value>,
}

/// `1.2`, `"1.2"`, `null` and `""`; anything else is a bad request.
fn lenient_speed(v: Option<serde_json::Value>) -> ServiceResult<Option<f32>> {
    match v {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64().map(|f| f as f32)),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f32>()
            .map(Some)
            .map_err(|_| ServiceError::bad_request(format!("speed must be a number, got \"{s}\""))),
        Some(other) => Err(ServiceError::bad_request(format!(
            "speed must be a number, got {other}"
        ))),
    }
}

#[derive(Debug, Object)]
#[oai(rename_all = "camelCase")]
struct TtsReply {
    audio_url: String,
}

#[derive(Debug, Object)]
struct ErrorReply {
    error: String,
}

#[derive(ApiResponse)]
#[oai(bad_request_handler = "submit_bad_request")]
enum SubmitResponse {
    /// The job was queued.
    #[oai(status = 202)]
    Accepted(Json<SubmitReply>),
    #[oai(status = 400)]
    BadRequest(Json<SubmitReply>),
    #[oai(status = 500)]
    Internal(Json<SubmitReply>),
}

#[derive(ApiResponse)]
enum JobResponse {
    #[oai(status = 200)]
    Ok(Json<JobRecord>),
    #[oai(status = 404)]
    NotFound(Json<MessageReply>),
    /// The job already finished.
    #[oai(status = 409)]
    Conflict(Json<MessageReply>),
}

#[derive(ApiResponse)]
#[oai(bad_request_handler = "tts_bad_request")]
enum TtsResponse {
    #[oai(status = 200)]
    Ok(Json<TtsReply>),
    #[oai(status = 400)]
    BadRequest(Json<ErrorReply>),
    #[oai(status = 500)]
    Failed(Json<ErrorReply>),
}

fn submit_reply(success: bool, message: impl Into<String>, job_id: Option<String>) -> Json<SubmitReply> {
    Json(SubmitReply {
        success,
        message: message.into(),
        job_id,
    })
}

// Unparseable bodies never reach the handlers; these keep the JSON envelopes.
fn submit_bad_request(err: poem::Error) -> SubmitResponse {
    SubmitResponse::BadRequest(submit_reply(false, err.to_string(), None))
}

fn tts_bad_request(err: poem::Error) -> TtsResponse {
    TtsResponse::BadRequest(Json(ErrorReply {
        error: err.to_string(),
    }))
}

fn message(msg: impl Into<String>) -> Json<MessageReply> {
    Json(MessageReply {
        message: msg.into(),
    })
}

fn tts_error(err: &ServiceError) -> TtsResponse {
    let body = Json(ErrorReply {
        error: err.to_string(),
    });
    match err {
        ServiceError::BadRequest(_) => TtsResponse::BadRequest(body),
        _ => TtsResponse::Failed(body),
    }
}

pub struct RenderApi {
    state: ApiState,
}

#[OpenApi]
impl RenderApi {
    /// Liveness check.
    #[oai(path = "/healthz", method = "get")]
    async fn healthz(&self) -> PlainText<&'static str> {
        PlainText("cardreel worker is alive")
    }

    /// Queue a project for rendering.
    #[oai(path = "/render-video", method = "post")]
    async fn render_video(&self, body: Json<serde_json::Value>) -> SubmitResponse {
        let project = match Project::from_value(body.0) {
            Ok(p) => p,
            Err(e) => return SubmitResponse::BadRequest(submit_reply(false, e.to_string(), None)),
        };
        if project.script_cards.is_empty() {
            return SubmitResponse::BadRequest(submit_reply(false, "there are no script cards to render", None));
        }

        match self.state.queue.submit(project).await {
            Ok(job_id) => SubmitResponse::Accepted(submit_reply(true, "render job accepted", Some(job_id))),
            Err(ServiceError::BadRequest(msg)) => SubmitResponse::BadRequest(submit_reply(false, msg, None)),
            Err(e) => {
                tracing::error!(error = %e, "failed to accept render job");
                SubmitResponse::Internal(submit_reply(false, "internal server error", None))
            }
        }
    }

    /// Current state of a job.
    #[oai(path = "/render-status/:job_id", method = "get")]
    async fn render_status(&self, job_id: Path<String>) -> JobResponse {
        match self.state.queue.store().get(&job_id.0) {
            Some(record) => JobResponse::Ok(Json(record)),
            None => JobResponse::NotFound(message(format!("job '{}' not found", job_id.0))),
        }
    }

    /// Every known job, newest first.
    #[oai(path = "/render-jobs", method = "get")]
    async fn render_jobs(&self) -> Json<Vec<JobRecord>> {
        Json(self.state.queue.store().list())
    }

    /// Cancel a pending or running job.
    #[oai(path = "/render-jobs/:job_id/cancel", method = "post")]
    async fn cancel_job(&self, job_id: Path<String>) -> JobResponse {
        match self.state.queue.cancel(&job_id.0) {
            Ok(record) => JobResponse::Ok(Json(record)),
            Err(ServiceError::Conflict(msg)) => JobResponse::Conflict(message(msg)),
            Err(e) => JobResponse::NotFound(message(e.to_string())),
        }
    }

    /// Synthesize narration with the configured vendor.
    #[oai(path = "/api/create-tts", method = "post")]
    async fn create_tts(&self, body: Json<TtsBody>) -> TtsResponse {
        let Json(body) = body;
        let speed = match lenient_speed(body.speed) {
            Ok(speed) => speed,
            Err(e) => return tts_error(&e),
        };
        let req = TtsRequest {
            text: body.text,
            voice: body.voice.filter(|v| !v.trim().is_empty()),
            speed,
        };
        if let Err(e) = req.check() {
            return tts_error(&e);
        }
        let Some(provider) = self.state.tts.as_ref() else {
            return tts_error(&ServiceError::config("no TTS provider is configured"));
        };

        match provider.synthesize(&req).await {
            Ok(audio) => TtsResponse::Ok(Json(TtsReply {
                audio_url: audio.into_audio_url(),
            })),
            Err(e) => {
                tracing::warn!(provider = provider.name(), error = %e, "tts synthesis failed");
                tts_error(&e)
            }
        }
    }
}

/// HTTP routes: the API at `/`, Swagger UI at `/docs`, published videos at `/videos`.
pub fn build_app(state: ApiState, videos_dir: &FsPath) -> impl Endpoint + 'static {
    let service = OpenApiService::new(RenderApi { state }, "cardreel", env!("CARGO_PKG_VERSION"));
    let ui = service.swagger_ui();
    let spec = service.spec();

    Route::new()
        .nest("/docs", ui)
        .at("/openapi.json", poem::endpoint::make_sync(move |_| spec.clone()))
        .nest("/videos", StaticFilesEndpoint::new(videos_dir))
        .nest("/", service)
        .with(Cors::new())
        .with(Tracing)
}

/// Run the render service until the listener fails.
pub async fn serve(config: ServiceConfig) -> ServiceResult<()> {
    let client = AssetFetcher::http_client()?;
    let tts = provider_from_settings(&config.tts, client.clone())?;
    let fetcher = AssetFetcher::new(client, config.asset_policy);
    let videos_dir = config.videos_dir();
    tokio::fs::create_dir_all(&videos_dir).await?;
    let videos = Arc::new(LocalVideoStore::new(&videos_dir, config.public_base_url.clone()));

    let fonts_dir = config.fonts_dir.clone();
    let fonts = tokio::task::spawn_blocking(move || FontSet::load(fonts_dir.as_deref())).await?;
    let worker = RenderWorker::new(
        VideoProducer::new(fetcher, fonts),
        videos,
        config.work_dir.clone(),
    );

    let store = Arc::new(JobStore::new());
    let (queue, _workers) = RenderQueue::start(QueueConfig::from(&config), store, Arc::new(worker));
    let app = build_app(ApiState { queue: queue.clone(), tts }, &videos_dir);

    tracing::info!(addr = %config.http_addr, videos = %videos_dir.display(), "cardreel service listening");
    let res = Server::new(TcpListener::bind(config.http_addr)).run(app).await;
    queue.shutdown();
    res?;
    Ok(())
}

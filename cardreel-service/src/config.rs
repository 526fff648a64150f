use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// What the fetcher does when one asset cannot be materialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AssetPolicy {
    /// The first failure fails the attempt.
    Strict,
    /// Failures become job warnings and the asset is left out of the render.
    #[default]
    Lenient,
}

impl FromStr for AssetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!("unknown asset policy '{other}' (expected strict or lenient)")),
        }
    }
}

/// Supported speech vendors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TtsVendor {
    Google,
    ElevenLabs,
    Typecast,
}

impl FromStr for TtsVendor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "elevenlabs" => Ok(Self::ElevenLabs),
            "typecast" => Ok(Self::Typecast),
            other => Err(format!(
                "unknown tts provider '{other}' (expected google, elevenlabs or typecast)"
            )),
        }
    }
}

/// Vendor selection and credentials for `/api/create-tts`.
#[derive(Clone, Debug, Default)]
pub struct TtsSettings {
    /// `None` disables the TTS endpoint.
    pub provider: Option<TtsVendor>,
    pub google_api_key: Option<String>,
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_voice_id: Option<String>,
    /// Defaults to `eleven_multilingual_v2` when unset.
    pub elevenlabs_model_id: Option<String>,
    pub typecast_api_key: Option<String>,
    pub typecast_actor_id: Option<String>,
}

/// Everything the service needs to run; built by the binary from flags and environment.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub http_addr: SocketAddr,
    /// Parent of the per-job temp directories.
    pub work_dir: PathBuf,
    /// Published videos land in `output_dir/videos`.
    pub output_dir: PathBuf,
    /// URL prefix under which `output_dir/videos` is reachable.
    pub public_base_url: String,
    pub workers: usize,
    pub queue_capacity: usize,
    pub job_timeout: Duration,
    pub max_attempts: u32,
    pub retry_backoff: Duration,
    pub asset_policy: AssetPolicy,
    pub fonts_dir: Option<PathBuf>,
    pub tts: TtsSettings,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            work_dir: std::env::temp_dir(),
            output_dir: PathBuf::from("./output"),
            public_base_url: "http://localhost:3000/videos".to_owned(),
            workers: 1,
            queue_capacity: 64,
            job_timeout: Duration::from_secs(1800),
            max_attempts: 2,
            retry_backoff: Duration::from_millis(2000),
            asset_policy: AssetPolicy::Lenient,
            fonts_dir: None,
            tts: TtsSettings::default(),
        }
    }
}

impl ServiceConfig {
    /// Directory served at `/videos`.
    pub fn videos_dir(&self) -> PathBuf {
        self.output_dir.join("videos")
    }
}

use std::path::{Path, PathBuf};
use std::time::Duration;

use cardreel::assets::local::abbreviate;
use cardreel::assets::source::ext_for_mime;
use cardreel::{AssetSource, LocalAssets, Project};
use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;

use crate::config::AssetPolicy;
use crate::error::{ServiceError, ServiceResult};

/// Per-request timeout for asset downloads.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Largest remote asset accepted by default.
pub const MAX_DOWNLOAD_BYTES: u64 = 512 * 1024 * 1024;

/// Local copies of a project's assets plus what could not be fetched.
#[derive(Debug, Default)]
pub struct FetchedAssets {
    pub assets: LocalAssets,
    pub warnings: Vec<String>,
}

/// Materializes project URLs (remote, data URI or local path) into a job directory.
#[derive(Clone, Debug)]
pub struct AssetFetcher {
    client: reqwest::Client,
    policy: AssetPolicy,
    base_dir: Option<PathBuf>,
    max_download_bytes: u64,
}

impl AssetFetcher {
    pub fn new(client: reqwest::Client, policy: AssetPolicy) -> Self {
        Self {
            client,
            policy,
            base_dir: None,
            max_download_bytes: MAX_DOWNLOAD_BYTES,
        }
    }

    /// HTTP client with the download timeout applied.
    pub fn http_client() -> ServiceResult<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .user_agent(concat!("cardreel/", env!("CARGO_PKG_VERSION")))
            .build()?)
    }

    /// Resolve relative local paths against `dir` instead of the working directory.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn with_max_download_bytes(mut self, limit: u64) -> Self {
        self.max_download_bytes = limit;
        self
    }

    pub fn policy(&self) -> AssetPolicy {
        self.policy
    }

    /// Fetch every URL of `project` into `dir`, concurrently.
    ///
    /// Under [`AssetPolicy::Lenient`] failed URLs are reported in `warnings` and left out of
    /// the map; under [`AssetPolicy::Strict`] the first failure (in URL order) is returned.
    pub async fn fetch_project(&self, project: &Project, dir: &Path) -> ServiceResult<FetchedAssets> {
        tokio::fs::create_dir_all(dir).await?;

        let urls: Vec<String> = project.asset_urls().into_iter().map(str::to_owned).collect();
        let mut set = JoinSet::new();
        for (i, url) in urls.iter().cloned().enumerate() {
            let this = self.clone();
            let dir = dir.to_path_buf();
            set.spawn(async move {
                let res = this.fetch(&url, &dir, &format!("asset_{i:03}")).await;
                (i, res)
            });
        }

        let mut results: Vec<Option<ServiceResult<PathBuf>>> = urls.iter().map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            let (i, res) = joined?;
            results[i] = Some(res);
        }

        let mut out = FetchedAssets::default();
        for (url, res) in urls.iter().zip(results) {
            let res = res.unwrap_or_else(|| Err(ServiceError::fetch("download task vanished")));
            match res {
                Ok(path) => out.assets.insert(url.as_str(), path),
                Err(e) => match self.policy {
                    AssetPolicy::Strict => return Err(e),
                    AssetPolicy::Lenient => {
                        let w = format!("asset {} skipped: {e}", abbreviate(url));
                        tracing::warn!("{w}");
                        out.warnings.push(w);
                    }
                },
            }
        }
        tracing::debug!(
            fetched = out.assets.len(),
            skipped = out.warnings.len(),
            "project assets fetched"
        );
        Ok(out)
    }

    /// Materialize one URL as `dir/{stem}.{ext}`.
    pub async fn fetch(&self, url: &str, dir: &Path, stem: &str) -> ServiceResult<PathBuf> {
        let source = AssetSource::parse(url)?;
        let url_ext = source.extension();
        match source {
            src @ AssetSource::Data { .. } => {
                let bytes = src.decode_data()?;
                let path = dir.join(format!("{stem}.{}", url_ext.as_deref().unwrap_or("bin")));
                tokio::fs::write(&path, bytes).await?;
                Ok(path)
            }
            AssetSource::Local(p) => {
                let p = match &self.base_dir {
                    Some(base) if p.is_relative() => base.join(p),
                    _ => p,
                };
                if !tokio::fs::try_exists(&p).await.unwrap_or(false) {
                    return Err(ServiceError::fetch(format!(
                        "local asset '{}' does not exist",
                        p.display()
                    )));
                }
                let path = dir.join(format!("{stem}.{}", url_ext.as_deref().unwrap_or("bin")));
                tokio::fs::copy(&p, &path).await?;
                Ok(path)
            }
            AssetSource::Remote(remote) => {
                let mut resp = self.client.get(remote).send().await?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(ServiceError::fetch(format!(
                        "GET {} returned {status}",
                        abbreviate(remote)
                    )));
                }
                let limit = self.max_download_bytes;
                let too_large = || {
                    ServiceError::TooLarge(format!(
                        "GET {} exceeds the {limit} byte download limit",
                        abbreviate(remote)
                    ))
                };
                if resp.content_length().is_some_and(|len| len > limit) {
                    return Err(too_large());
                }
                let mime_ext = resp
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| ext_for_mime(v.split(';').next().unwrap_or(v)));
                let ext = url_ext.as_deref().or(mime_ext).unwrap_or("bin");

                let path = dir.join(format!("{stem}.{ext}"));
                let mut file = tokio::fs::File::create(&path).await?;
                let mut written = 0u64;
                while let Some(chunk) = resp.chunk().await? {
                    written += chunk.len() as u64;
                    if written > limit {
                        drop(file);
                        let _ = tokio::fs::remove_file(&path).await;
                        return Err(too_large());
                    }
                    file.write_all(&chunk).await?;
                }
                file.flush().await?;
                tracing::debug!(url = %abbreviate(remote), bytes = written, "asset downloaded");
                Ok(path)
            }
        }
    }
}

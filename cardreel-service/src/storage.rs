use std::path::{Path, PathBuf};

use crate::error::ServiceResult;

const FALLBACK_NAME: &str = "cardreel-video";

/// Where finished videos go and how they are addressed afterwards.
#[async_trait::async_trait]
pub trait VideoStore: Send + Sync {
    /// Persist `file` for `job_id` and return its public URL.
    async fn publish(&self, job_id: &str, title: Option<&str>, file: &Path) -> ServiceResult<String>;
}

/// Copies videos into a directory the HTTP server exposes at `/videos`.
#[derive(Clone, Debug)]
pub struct LocalVideoStore {
    root: PathBuf,
    base_url: String,
}

impl LocalVideoStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait::async_trait]
impl VideoStore for LocalVideoStore {
    async fn publish(&self, job_id: &str, title: Option<&str>, file: &Path) -> ServiceResult<String> {
        let name = format!("{}.mp4", file_stem_for(title));
        let dir = self.root.join(job_id);
        tokio::fs::create_dir_all(&dir).await?;
        let dest = dir.join(&name);
        tokio::fs::copy(file, &dest).await?;

        let url = format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(job_id),
            urlencoding::encode(&name)
        );
        tracing::info!(job_id, path = %dest.display(), %url, "video published");
        Ok(url)
    }
}

/// File-name-safe version of a project title.
///
/// Letters and digits of any script are kept, whitespace runs become `-`, everything else is
/// dropped.
pub fn file_stem_for(title: Option<&str>) -> String {
    let mut out = String::new();
    let mut gap = false;
    for c in title.unwrap_or_default().trim().chars() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            if gap && !out.is_empty() {
                out.push('-');
            }
            gap = false;
            out.push(c);
        } else if c.is_whitespace() {
            gap = true;
        }
    }
    let out: String = out.chars().take(80).collect();
    if out.is_empty() {
        FALLBACK_NAME.to_owned()
    } else {
        out
    }
}

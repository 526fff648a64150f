use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assets::source::AssetSource;
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::project::Project;

/// Project URL → local file path.
///
/// The engine never touches the network; everything it reads goes through this map. URLs
/// without an entry are treated as unavailable and their layers/tracks are skipped.
#[derive(Clone, Debug, Default)]
pub struct LocalAssets {
    paths: HashMap<String, PathBuf>,
}

impl LocalAssets {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the local copy of `url`.
    pub fn insert(&mut self, url: impl Into<String>, path: impl Into<PathBuf>) {
        self.paths.insert(url.into(), path.into());
    }

    /// Local path for `url`, if it was materialized.
    pub fn get(&self, url: &str) -> Option<&Path> {
        self.paths.get(url).map(PathBuf::as_path)
    }

    /// Number of registered assets.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Materialize what can be reached without a network.
    ///
    /// Data URIs are decoded into `scratch_dir`; relative local paths resolve against
    /// `base_dir`. Remote URLs are left unresolved and reported in the returned list.
    pub fn materialize_offline(
        project: &Project,
        base_dir: &Path,
        scratch_dir: &Path,
    ) -> ReelResult<(Self, Vec<String>)> {
        std::fs::create_dir_all(scratch_dir)
            .with_context(|| format!("create scratch dir '{}'", scratch_dir.display()))?;

        let mut out = Self::new();
        let mut unresolved = Vec::new();
        for (i, url) in project.asset_urls().into_iter().enumerate() {
            match AssetSource::parse(url)? {
                src @ AssetSource::Data { .. } => {
                    let bytes = src.decode_data()?;
                    let ext = src.extension().unwrap_or_else(|| "bin".to_owned());
                    let path = scratch_dir.join(format!("inline_{i:03}.{ext}"));
                    std::fs::write(&path, bytes)
                        .with_context(|| format!("write '{}'", path.display()))?;
                    out.insert(url, path);
                }
                AssetSource::Local(p) => {
                    let path = if p.is_absolute() { p } else { base_dir.join(p) };
                    if path.is_file() {
                        out.insert(url, path);
                    } else {
                        unresolved.push(url.to_owned());
                    }
                }
                AssetSource::Remote(_) => unresolved.push(url.to_owned()),
            }
        }
        Ok((out, unresolved))
    }

    /// Fail when any URL of `project` is missing from the map.
    pub fn require_all(&self, project: &Project) -> ReelResult<()> {
        let missing: Vec<&str> = project
            .asset_urls()
            .into_iter()
            .filter(|u| !self.paths.contains_key(*u))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(ReelError::asset(format!(
            "missing local copies for {} asset(s): {}",
            missing.len(),
            missing
                .iter()
                .map(|u| abbreviate(u))
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}

/// Shorten data URIs for log and error output.
pub fn abbreviate(url: &str) -> String {
    if url.len() > 64 {
        let cut = (0..=48).rev().find(|&i| url.is_char_boundary(i)).unwrap_or(0);
        format!("{}…({} bytes)", &url[..cut], url.len())
    } else {
        url.to_owned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/local.rs"]
mod tests;

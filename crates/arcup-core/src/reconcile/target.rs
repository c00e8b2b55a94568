//! Where the artifact lives locally and remotely.

use crate::config::{ArcupConfig, ConfigError};
use std::path::{Path, PathBuf};
use url::Url;

/// Local path of the installed artifact plus the URLs of the published
/// artifact and its `.md5sum` sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactTarget {
    path: PathBuf,
    artifact_url: Url,
    sidecar_url: Url,
}

impl ArtifactTarget {
    /// `base_url` is treated as a directory whether or not it ends in `/`.
    pub fn new(
        path: impl Into<PathBuf>,
        base_url: &str,
        artifact_name: &str,
    ) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        Ok(Self {
            path: path.into(),
            artifact_url: base.join(artifact_name)?,
            sidecar_url: base.join(&format!("{}.md5sum", artifact_name))?,
        })
    }

    pub fn from_config(cfg: &ArcupConfig) -> Result<Self, ConfigError> {
        Self::new(
            cfg.target_path(),
            &cfg.advanced.arcdps_url,
            &cfg.advanced.artifact_name,
        )
        .map_err(|source| ConfigError::BadUrl {
            url: cfg.advanced.arcdps_url.clone(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn artifact_url(&self) -> &Url {
        &self.artifact_url
    }

    pub fn sidecar_url(&self) -> &Url {
        &self.sidecar_url
    }
}

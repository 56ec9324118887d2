use crate::config::OutputConfig;
use crate::{HarvestError, Result};
use std::path::{Path, PathBuf};

/// Suffix for in-flight writes; never matches an artifact name
const PARTIAL_SUFFIX: &str = "part";

/// Checks that a slug is usable as a single path component
///
/// Rejects empty slugs, `.`/`..`, path separators, and NUL.
pub fn validate_slug(slug: &str) -> Result<()> {
    let unsafe_slug = slug.is_empty()
        || slug == "."
        || slug == ".."
        || slug.contains(['/', '\\', '\0']);

    if unsafe_slug {
        return Err(HarvestError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

/// Addresses and writes artifacts under a root directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    extension: String,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.root_dir, &config.extension)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every artifact of one collection
    pub fn output_directory(&self, collection_slug: &str) -> PathBuf {
        self.root.join(collection_slug)
    }

    /// File name of an item's artifact
    pub fn file_name(&self, item_slug: &str) -> String {
        format!("{}.{}", item_slug, self.extension)
    }

    pub fn artifact_path(&self, output_directory: &Path, item_slug: &str) -> PathBuf {
        output_directory.join(self.file_name(item_slug))
    }

    /// Creates the directory and its parents
    ///
    /// Safe to call concurrently for the same directory: an already existing
    /// directory is success.
    pub async fn ensure_directory(&self, directory: &Path) -> Result<()> {
        tokio::fs::create_dir_all(directory).await?;
        Ok(())
    }

    /// Writes normalized text as UTF-8
    pub async fn write_text(&self, path: &Path, text: &str) -> Result<()> {
        self.write_atomic(path, text.as_bytes()).await
    }

    /// Writes a zero-length negative-cache marker
    pub async fn write_marker(&self, path: &Path) -> Result<()> {
        self.write_atomic(path, &[]).await
    }

    /// Writes next to the target and renames into place, so a failed write
    /// never leaves something that looks like a finished artifact
    async fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let partial = partial_path(path);

        if let Err(e) = tokio::fs::write(&partial, contents).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }

        if let Err(e) = tokio::fs::rename(&partial, path).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }

        Ok(())
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

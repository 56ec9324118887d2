use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Snapshot of which artifacts already exist
///
/// Built from one directory listing per output directory. A directory that
/// does not exist yet lists as empty; a directory that cannot be listed falls
/// back to per-file existence checks.
#[derive(Debug, Default)]
pub struct ArtifactIndex {
    listed: HashMap<PathBuf, HashSet<OsString>>,
    unlisted: HashSet<PathBuf>,
}

impl ArtifactIndex {
    /// Lists every given directory once; duplicates are listed once
    pub async fn load<'a, I>(directories: I) -> Self
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let mut index = Self::default();

        for directory in directories {
            if index.listed.contains_key(directory) || index.unlisted.contains(directory) {
                continue;
            }

            match list_directory(directory).await {
                Ok(names) => {
                    index.listed.insert(directory.to_path_buf(), names);
                }
                Err(e) => {
                    tracing::warn!(
                        "Cannot list {}, checking its artifacts one by one: {}",
                        directory.display(),
                        e
                    );
                    index.unlisted.insert(directory.to_path_buf());
                }
            }
        }

        index
    }

    /// True if `<directory>/<file_name>` exists
    pub fn contains(&self, directory: &Path, file_name: &str) -> bool {
        match self.listed.get(directory) {
            Some(names) => names.contains(std::ffi::OsStr::new(file_name)),
            None => directory.join(file_name).exists(),
        }
    }

    /// Number of directories served from a listing
    pub fn listed_directories(&self) -> usize {
        self.listed.len()
    }
}

async fn list_directory(directory: &Path) -> std::io::Result<HashSet<OsString>> {
    let mut names = HashSet::new();

    let mut entries = match tokio::fs::read_dir(directory).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(names),
        Err(e) => return Err(e),
    };

    while let Some(entry) = entries.next_entry().await? {
        names.insert(entry.file_name());
    }

    Ok(names)
}

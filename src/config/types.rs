use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the harvester
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub workers: WorkerConfig,
    pub output: OutputConfig,
}

/// Remote content server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SourceConfig {
    /// Base URL of the content server
    pub base_url: String,

    /// Corpus language sent with every catalog lookup
    pub corpus_language: String,

    /// Discovery buckets, one catalog lookup each
    pub partitions: Vec<String>,

    /// Browser-like identification header
    pub user_agent: String,

    /// Timeout applied to each individual remote call (seconds)
    pub timeout_secs: u64,

    /// Floor for the membership listing page size
    pub min_page_size: u64,
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://oshoworld.com".to_string(),
            corpus_language: "hindi".to_string(),
            partitions: ('A'..='Z').map(|c| c.to_string()).collect(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                         AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36"
                .to_string(),
            timeout_secs: 30,
            min_page_size: 100,
        }
    }
}

/// Worker pool widths, one pool per pipeline stage
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Concurrent partition lookups
    pub discovery: usize,

    /// Concurrent collection resolutions (two calls each)
    pub resolution: usize,

    /// Concurrent item fetches; must be the widest pool
    pub fetch: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            discovery: 10,
            resolution: 10,
            fetch: 20,
        }
    }
}

/// Output layout configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Root directory; artifacts land in `<root>/<collection>/<item>.<ext>`
    pub root_dir: String,

    /// Artifact file extension (without the dot)
    pub extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root_dir: "transcripts".to_string(),
            extension: "txt".to_string(),
        }
    }
}

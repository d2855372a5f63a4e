//! Configuration types for media-dl

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use utoipa::ToSchema;

/// Download behavior configuration (directories, concurrency, transcode targets)
///
/// Groups settings related to how jobs are fetched, stored, and transcoded.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Root directory holding one working directory per job (default: "./downloads")
    #[serde(default = "default_download_root")]
    pub download_root: PathBuf,

    /// Maximum concurrent fetch jobs (default: 3)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_jobs: usize,

    /// Target codec for audio-only jobs (default: "mp3")
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Target quality for audio-only jobs, passed to the transcoder (default: "192K")
    #[serde(default = "default_audio_quality")]
    pub audio_quality: String,

    /// Container that video+audio selections are merged into (default: "mp4")
    #[serde(default = "default_merge_container")]
    pub merge_container: String,

    /// How long shutdown waits for in-flight jobs before giving up (default: 30s)
    ///
    /// There is no way to cancel an in-flight fetch, so this bound is what
    /// keeps a stuck fetch from hanging process exit.
    #[serde(default = "default_shutdown_grace", with = "duration_secs")]
    #[schema(value_type = u64)]
    pub shutdown_grace: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_root: default_download_root(),
            max_concurrent_jobs: default_max_concurrent(),
            audio_codec: default_audio_codec(),
            audio_quality: default_audio_quality(),
            merge_container: default_merge_container(),
            shutdown_grace: default_shutdown_grace(),
        }
    }
}

/// Network identity configuration forwarded to the fetch tool
///
/// Groups the per-request network knobs the fetcher recognizes.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct NetworkConfig {
    /// User-Agent override for outbound requests (default: tool default)
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Netscape-format cookie file handed to the fetch tool
    #[serde(default)]
    pub cookie_file: Option<PathBuf>,

    /// Local address to bind outbound connections to
    #[serde(default)]
    pub source_address: Option<IpAddr>,
}

/// External tool paths (yt-dlp) and discovery behavior
///
/// Groups settings for the external binary both collaborators shell out to.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolsConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for the binary if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
        }
    }
}

/// Main configuration for media-dl
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Download behavior settings (directories, concurrency, transcode targets)
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// Network identity settings forwarded to the fetch tool
    #[serde(flatten)]
    pub network: NetworkConfig,

    /// External tool paths and discovery behavior
    #[serde(flatten)]
    pub tools: ToolsConfig,

    /// API server integration
    #[serde(flatten)]
    pub server: ServerIntegrationConfig,
}

// Convenience accessors — allow call sites to use `config.download_root()`
// without reaching through the sub-config structs.
impl Config {
    /// Root directory holding per-job working directories
    pub fn download_root(&self) -> &PathBuf {
        &self.download.download_root
    }

    /// The working directory owned exclusively by one job
    pub fn job_dir(&self, id: crate::types::JobId) -> PathBuf {
        self.download.download_root.join(id.to_string())
    }
}

/// API and external server integration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:8750)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

fn default_download_root() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_max_concurrent() -> usize {
    3
}

fn default_audio_codec() -> String {
    "mp3".to_string()
}

fn default_audio_quality() -> String {
    "192K".to_string()
}

fn default_merge_container() -> String {
    "mp4".to_string()
}

fn default_shutdown_grace() -> Duration {
    Duration::from_secs(30)
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    "127.0.0.1:8750"
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8750)))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

/// Serialize/deserialize a Duration as whole seconds
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

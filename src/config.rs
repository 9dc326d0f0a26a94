use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_secs(30);

// read once from the environment at startup and handed to the gateway;
// handlers never consult env vars themselves.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
  // extractor executable, name or absolute path
  pub bin: String,
  // passed to the tool via --cookies for sites needing authenticated access
  pub cookie_file: Option<PathBuf>,
  // passed via --proxy; may carry credentials, so redact before logging
  pub proxy: Option<String>,
  // wall-clock bound for buffered metadata runs only. streamed fetches are
  // bounded by client disconnect instead.
  pub metadata_timeout: Duration,
  pub port: u16,
}

impl Default for GatewayConfig {
  fn default() -> Self {
    Self {
      bin: "yt-dlp".to_string(),
      cookie_file: None,
      proxy: None,
      metadata_timeout: DEFAULT_METADATA_TIMEOUT,
      port: 8080,
    }
  }
}

impl GatewayConfig {
  pub fn from_env() -> Self {
    let defaults = Self::default();

    Self {
      bin: env_var("YTDLP_BIN").unwrap_or(defaults.bin),
      cookie_file: env_var("YTDLP_COOKIES").map(PathBuf::from),
      proxy: env_var("YTDLP_PROXY"),
      metadata_timeout: env_var("YTDLP_TIMEOUT_SECS")
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(defaults.metadata_timeout),
      port: env_var("PORT")
        .and_then(|s| s.parse().ok())
        .unwrap_or(defaults.port),
    }
  }
}

fn env_var(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|s| !s.is_empty())
}

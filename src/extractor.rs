mod ytdlp;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

pub use ytdlp::Ytdlp;

use crate::Result;

// media bytes as produced by the tool, plus the container they are muxed in
pub struct MediaStream {
  pub stream: BoxStream<'static, Result<Bytes>>,
  pub container: &'static str,
}

// Narrow seam around the external extraction tool: spawn with an argv,
// consume stdout/stderr, observe the exit code. Handlers depend on this
// trait so tests can substitute canned output for the real binary.
#[async_trait]
pub trait Extractor: Send + Sync {
  // buffered metadata query; resolves to the tool's raw json document
  async fn metadata(&self, url: &str) -> Result<String>;

  // streaming fetch; resolves as soon as the process is spawned
  async fn fetch(&self, url: &str) -> Result<MediaStream>;
}

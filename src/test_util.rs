use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::extractor::{Extractor, MediaStream};
use crate::{Error, Result};

// canned extractor for handler tests: replays configured outcomes and
// records invocations, so no test ever touches the real binary.
pub struct StubExtractor {
  pub calls: AtomicUsize,
  pub urls: Mutex<Vec<String>>,
  metadata: Box<dyn Fn() -> Result<String> + Send + Sync>,
  fetch: Box<dyn Fn() -> Result<MediaStream> + Send + Sync>,
}

impl StubExtractor {
  pub fn with_metadata(
    f: impl Fn() -> Result<String> + Send + Sync + 'static,
  ) -> Self {
    Self {
      calls: AtomicUsize::new(0),
      urls: Mutex::new(Vec::new()),
      metadata: Box::new(f),
      fetch: Box::new(|| Err(Error::Parse("fetch not stubbed".to_string()))),
    }
  }

  pub fn with_fetch(
    f: impl Fn() -> Result<MediaStream> + Send + Sync + 'static,
  ) -> Self {
    Self {
      calls: AtomicUsize::new(0),
      urls: Mutex::new(Vec::new()),
      metadata: Box::new(|| {
        Err(Error::Parse("metadata not stubbed".to_string()))
      }),
      fetch: Box::new(f),
    }
  }

  // for tests asserting that validation failures never reach the extractor
  pub fn unreachable() -> Self {
    Self::with_metadata(|| Err(Error::Parse("extractor must not run".into())))
  }
}

#[async_trait]
impl Extractor for StubExtractor {
  async fn metadata(&self, url: &str) -> Result<String> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    self.urls.lock().unwrap().push(url.to_string());
    (self.metadata)()
  }

  async fn fetch(&self, url: &str) -> Result<MediaStream> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    self.urls.lock().unwrap().push(url.to_string());
    (self.fetch)()
  }
}

use http_types::Url;

use crate::{Error, Result};

// Accepts any non-empty http(s) url with a host, returning the trimmed form
// that callers must hand to the extractor. The extractor tool supports 1000+
// sites, so there is no per-host allow-list here; the tool itself is the
// authority on site support. Anything that cannot be a remote address at all
// is rejected before a process is ever spawned.
pub fn recognized_url(raw: &str) -> Result<&str> {
  let raw = raw.trim();
  if raw.is_empty() {
    return Err(Error::MissingUrl);
  }

  let url: Url = raw
    .parse()
    .map_err(|_| Error::UnsupportedUrl(raw.to_string()))?;

  if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
    return Err(Error::UnsupportedUrl(raw.to_string()));
  }

  Ok(raw)
}

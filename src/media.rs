use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// Normalized metadata for one video, as served by /info. Field names are
// part of the HTTP surface. availableFormats keeps the exact order the
// extractor reported; clients rely on the tool's own ranking.
#[derive(Debug, PartialEq, Serialize)]
pub struct MediaInfo {
  pub id: String,
  pub title: String,
  pub thumbnail: Option<String>,
  pub duration: Option<f64>,
  #[serde(rename = "availableFormats")]
  pub available_formats: Vec<FormatDescriptor>,
  pub source: Option<String>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct FormatDescriptor {
  pub id: String,
  pub label: String,
  pub quality: String,
  pub format: String,
  pub size: String,
}

#[derive(Deserialize)]
struct RawInfo {
  #[serde(default)]
  id: String,
  #[serde(default)]
  title: String,
  thumbnail: Option<String>,
  duration: Option<f64>,
  formats: Vec<RawFormat>,
  extractor: Option<String>,
}

#[derive(Deserialize)]
struct RawFormat {
  #[serde(default)]
  format_id: String,
  #[serde(default)]
  ext: String,
  #[serde(default)]
  format_note: String,
  filesize: Option<u64>,
}

// Raw `-J` output to MediaInfo. A document without a top-level object or a
// `formats` sequence is a parse failure, reported distinctly from the tool
// itself failing.
pub fn normalize(raw: &str) -> Result<MediaInfo> {
  let info: RawInfo =
    serde_json::from_str(raw).map_err(|e| Error::Parse(e.to_string()))?;

  let available_formats = info
    .formats
    .into_iter()
    .map(FormatDescriptor::from)
    .collect();

  Ok(MediaInfo {
    id: info.id,
    title: info.title,
    thumbnail: info.thumbnail,
    duration: info.duration,
    available_formats,
    source: info.extractor,
  })
}

impl From<RawFormat> for FormatDescriptor {
  fn from(f: RawFormat) -> Self {
    let size = match f.filesize {
      Some(bytes) => format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0),
      // unknown, not zero: the tool reports no size for e.g. live formats
      None => "Unknown".to_string(),
    };

    Self {
      id: f.format_id,
      label: format!("{} - {}", f.ext, f.format_note),
      quality: f.format_note,
      format: f.ext,
      size,
    }
  }
}

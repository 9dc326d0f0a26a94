use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("url parameter is required")]
  MissingUrl,

  #[error("unsupported url: {0}")]
  UnsupportedUrl(String),

  #[error("failed to launch {0}: {1}")]
  Spawn(String, #[source] std::io::Error),

  #[error("extractor exited with status {code:?}: {stderr}")]
  ProcessFailed { code: Option<i32>, stderr: String },

  #[error("metadata query timed out after {0:?}")]
  Timeout(Duration),

  #[error("unreadable extractor output: {0}")]
  Parse(String),

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Http(#[from] axum::http::Error),
}

impl Error {
  fn status(&self) -> StatusCode {
    match self {
      Error::MissingUrl | Error::UnsupportedUrl(_) => StatusCode::BAD_REQUEST,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  // stable short codes; the specifics go into "details". clients rely on
  // these to tell "tool rejected the url" apart from "tool output was
  // gibberish".
  fn code(&self) -> &'static str {
    match self {
      Error::MissingUrl => "url parameter is required",
      Error::UnsupportedUrl(_) => "unsupported url",
      Error::Spawn(..) => "failed to launch extractor",
      Error::ProcessFailed { .. } => "extractor failed",
      Error::Timeout(_) => "metadata query timed out",
      Error::Parse(_) => "unreadable extractor output",
      Error::Io(_) | Error::Http(_) => "internal error",
    }
  }

  fn details(&self) -> String {
    match self {
      // surface the tool's own diagnostics verbatim
      Error::ProcessFailed { stderr, .. } => stderr.clone(),
      other => other.to_string(),
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = if status.is_client_error() {
      json!({ "error": self.to_string() })
    } else {
      json!({ "error": self.code(), "details": self.details() })
    };

    (status, Json(body)).into_response()
  }
}

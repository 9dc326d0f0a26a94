use axum::body::StreamBody;
use axum::extract::{Query, State};
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use serde::Deserialize;
use tracing::info;

use crate::{validate, Gateway, Result};

#[derive(Deserialize)]
pub struct DownloadParams {
  #[serde(default)]
  url: String,
}

// GET /download?url=...  streamed fetch. The process's stdout is piped to
// the response body as it arrives; the whole payload is never buffered.
#[axum::debug_handler]
pub async fn get_download(
  State(gateway): State<Gateway>,
  Query(params): Query<DownloadParams>,
) -> Result<impl IntoResponse> {
  let url = validate::recognized_url(&params.url)?;

  let media = gateway.extractor.fetch(url).await?;
  info!("streaming download for {url}");

  // headers commit before the first byte. past this point a failure can
  // only end the connection; no error body may follow a partial stream.
  // a client disconnect drops the body, which kills the child process.
  let resp = Response::builder()
    .status(StatusCode::OK)
    .header(header::CONTENT_TYPE, format!("video/{}", media.container))
    .header(
      header::CONTENT_DISPOSITION,
      format!("attachment; filename=\"video.{}\"", media.container),
    )
    .body(StreamBody::new(media.stream))?;

  Ok(resp)
}

#[cfg(test)]
mod test {
  use std::sync::atomic::Ordering;
  use std::sync::Arc;

  use axum::body::Body;
  use axum::http::{header, Request, StatusCode};
  use bytes::Bytes;
  use futures::StreamExt;
  use serde_json::Value;
  use tower::ServiceExt;

  use crate::extractor::MediaStream;
  use crate::test_util::StubExtractor;
  use crate::{router, Error, Gateway};

  fn app(stub: Arc<StubExtractor>) -> axum::Router {
    router(Gateway { extractor: stub })
  }

  fn canned_stream(chunks: Vec<crate::Result<Bytes>>) -> MediaStream {
    MediaStream {
      stream: futures::stream::iter(chunks).boxed(),
      container: "mp4",
    }
  }

  async fn get(
    app: axum::Router,
    uri: &str,
  ) -> axum::http::Response<axum::body::BoxBody> {
    app
      .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
      .await
      .unwrap()
  }

  #[tokio::test]
  async fn test_download_sets_headers_and_streams_body() {
    let stub = Arc::new(StubExtractor::with_fetch(|| {
      Ok(canned_stream(vec![
        Ok(Bytes::from_static(b"vid")),
        Ok(Bytes::from_static(b"eo bytes")),
      ]))
    }));

    let resp = get(app(stub), "/download?url=https://example.com/v").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(
      resp.headers()[header::CONTENT_DISPOSITION],
      "attachment; filename=\"video.mp4\""
    );

    let body = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    assert_eq!(&body[..], b"video bytes");
  }

  #[tokio::test]
  async fn test_download_missing_url_is_400_and_spawns_nothing() {
    let stub = Arc::new(StubExtractor::unreachable());

    let resp = get(app(stub.clone()), "/download").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_download_spawn_failure_is_json_500() {
    let stub = Arc::new(StubExtractor::with_fetch(|| {
      Err(Error::Spawn(
        "yt-dlp".to_string(),
        std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
      ))
    }));

    let resp = get(app(stub), "/download?url=https://example.com/v").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "failed to launch extractor");
    assert!(body["details"].as_str().unwrap().contains("no such file"));
  }

  #[tokio::test]
  async fn test_midstream_failure_aborts_the_body() {
    let stub = Arc::new(StubExtractor::with_fetch(|| {
      Ok(canned_stream(vec![
        Ok(Bytes::from_static(b"partial")),
        Err(Error::ProcessFailed {
          code: Some(1),
          stderr: "ERROR: network".to_string(),
        }),
      ]))
    }));

    // headers are already committed, so the stream error can only
    // terminate the body
    let resp = get(app(stub), "/download?url=https://example.com/v").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(hyper::body::to_bytes(resp.into_body()).await.is_err());
  }
}

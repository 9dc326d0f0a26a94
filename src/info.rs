use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::media::{self, MediaInfo};
use crate::{validate, Gateway, Result};

#[derive(Deserialize)]
pub struct InfoParams {
  #[serde(default)]
  url: String,
}

// GET /info?url=...  buffered metadata query
#[axum::debug_handler]
pub async fn get_info(
  State(gateway): State<Gateway>,
  Query(params): Query<InfoParams>,
) -> Result<Json<MediaInfo>> {
  let url = validate::recognized_url(&params.url)?;

  let raw = gateway.extractor.metadata(url).await?;
  let media_info = media::normalize(&raw)?;

  info!(
    "served metadata for {url} ({} formats)",
    media_info.available_formats.len()
  );

  Ok(Json(media_info))
}

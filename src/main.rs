use std::net::SocketAddr;
use std::sync::Arc;

use axum::{response::IntoResponse, routing::get, Router};
use tracing::info;

mod config;
mod download;
mod error;
mod extractor;
mod info;
mod media;
mod util;
mod validate;

#[cfg(test)]
mod test_util;

pub use error::{Error, Result};

use config::GatewayConfig;
use extractor::{Extractor, Ytdlp};

// everything a handler needs: the extraction tool behind its trait seam.
// cloning is cheap; each request shares the same extractor.
#[derive(Clone)]
pub struct Gateway {
  pub extractor: Arc<dyn Extractor>,
}

pub fn router(gateway: Gateway) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/info", get(info::get_info))
    .route("/download", get(download::get_download))
    .with_state(gateway)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let config = Arc::new(GatewayConfig::from_env());
  if let Some(proxy) = &config.proxy {
    info!("using proxy: {}", util::redact_credentials(proxy));
  }
  if let Some(cookie_file) = &config.cookie_file {
    info!("using cookie file: {}", cookie_file.display());
  }

  let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse().unwrap();
  let gateway = Gateway {
    extractor: Arc::new(Ytdlp::new(config)),
  };

  info!("listening on {addr}");

  axum::Server::bind(&addr)
    .serve(router(gateway).into_make_service())
    .await
    .expect("failed to start server");

  Ok(())
}

async fn health() -> impl IntoResponse {
  "ok".to_owned()
}

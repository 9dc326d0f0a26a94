use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::process::{Child, Command};
use tracing::debug;

use crate::config::GatewayConfig;
use crate::util::ProcessStream;
use crate::{Error, Result};

use super::{Extractor, MediaStream};

// container handed to --merge-output-format; also determines the
// content-type and attachment filename on /download
pub const MERGE_CONTAINER: &str = "mp4";

// run the yt-dlp command line. requires the configured executable to be
// reachable through PATH (or YTDLP_BIN set to an absolute path).
pub struct Ytdlp {
  config: Arc<GatewayConfig>,
}

impl Ytdlp {
  pub fn new(config: Arc<GatewayConfig>) -> Self {
    Self { config }
  }
}

#[async_trait]
impl Extractor for Ytdlp {
  async fn metadata(&self, url: &str) -> Result<String> {
    let args = metadata_args(url, &self.config);
    debug!("running {} {:?}", self.config.bin, args);
    run_buffered(&self.config.bin, &args, self.config.metadata_timeout).await
  }

  async fn fetch(&self, url: &str) -> Result<MediaStream> {
    let args = fetch_args(url, &self.config);

    let mut cmd = Command::new(&self.config.bin);
    cmd.args(&args);
    let stream = ProcessStream::spawn(cmd, &self.config.bin)?;
    debug!(
      "spawned {} {:?} (pid {:?})",
      self.config.bin,
      args,
      stream.id()
    );

    Ok(MediaStream {
      stream: stream.boxed(),
      container: MERGE_CONTAINER,
    })
  }
}

// -J emits a single json document on stdout and touches nothing on disk
pub fn metadata_args(url: &str, config: &GatewayConfig) -> Vec<OsString> {
  let mut args: Vec<OsString> = vec!["-J".into()];
  push_common_args(&mut args, config);
  args.push(url.into());
  args
}

// best available video+audio, merged and written to stdout. the url stays a
// single argv token at the end; it is never spliced into a shell string.
pub fn fetch_args(url: &str, config: &GatewayConfig) -> Vec<OsString> {
  let mut args: Vec<OsString> = vec![
    "-f".into(),
    "b".into(),
    "--merge-output-format".into(),
    MERGE_CONTAINER.into(),
    "--no-progress".into(),
    "-o".into(),
    "-".into(),
  ];
  push_common_args(&mut args, config);
  args.push(url.into());
  args
}

fn push_common_args(args: &mut Vec<OsString>, config: &GatewayConfig) {
  if let Some(cookie_file) = &config.cookie_file {
    args.push("--cookies".into());
    args.push(cookie_file.as_os_str().to_owned());
  }
  if let Some(proxy) = &config.proxy {
    args.push("--proxy".into());
    args.push(proxy.into());
  }
}

// collect stdout fully, bounded by `timeout`. kill_on_drop covers both the
// timeout branch and a caller dropping the future mid-run, so the child is
// reaped on every path.
pub(crate) async fn run_buffered(
  bin: &str,
  args: &[OsString],
  timeout: Duration,
) -> Result<String> {
  let child = command(bin, args)
    .spawn()
    .map_err(|e| Error::Spawn(bin.to_string(), e))?;
  wait_buffered(child, timeout).await
}

fn command(bin: &str, args: &[OsString]) -> Command {
  let mut cmd = Command::new(bin);
  cmd
    .args(args)
    .stdin(std::process::Stdio::null())
    .stdout(std::process::Stdio::piped())
    .stderr(std::process::Stdio::piped())
    .kill_on_drop(true);
  cmd
}

// hitting the timeout drops wait_with_output, which kills the child via
// kill_on_drop; tokio reaps it in the background
async fn wait_buffered(child: Child, timeout: Duration) -> Result<String> {
  let output = tokio::time::timeout(timeout, child.wait_with_output())
    .await
    .map_err(|_| Error::Timeout(timeout))??;

  if !output.status.success() {
    return Err(Error::ProcessFailed {
      code: output.status.code(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    });
  }

  String::from_utf8(output.stdout)
    .map_err(|_| Error::Parse("stdout is not valid utf-8".to_string()))
}

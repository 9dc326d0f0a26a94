use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::{FutureExt, Stream};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tokio_util::io::ReaderStream;

use crate::{Error, Result};

// Exposes a child process's stdout as a live byte stream. The child is owned
// by the stream: dropping it mid-flight (the HTTP client went away) kills
// the process via kill_on_drop and tokio reaps it in the background, so no
// zombie survives an abandoned download. After stdout reaches EOF the exit
// status is checked, and a failed run surfaces as a terminal Err item
// instead of a silently truncated stream.
pub struct ProcessStream {
  id: Option<u32>,
  state: State,
}

enum State {
  Streaming {
    child: Child,
    stdout: ReaderStream<ChildStdout>,
    stderr: JoinHandle<Vec<u8>>,
  },
  Draining(BoxFuture<'static, Result<()>>),
  Done,
}

impl ProcessStream {
  pub fn spawn(mut cmd: Command, program: &str) -> Result<Self> {
    let mut child = cmd
      .stdin(std::process::Stdio::null())
      .stdout(std::process::Stdio::piped())
      .stderr(std::process::Stdio::piped())
      .kill_on_drop(true)
      .spawn()
      .map_err(|e| Error::Spawn(program.to_string(), e))?;

    let stdout = child.stdout.take().expect("stdout not opened");
    let mut stderr = child.stderr.take().expect("stderr not opened");

    // drain stderr concurrently so the child never blocks on a full pipe
    let stderr = tokio::spawn(async move {
      let mut buf = Vec::new();
      let _ = stderr.read_to_end(&mut buf).await;
      buf
    });

    Ok(Self {
      id: child.id(),
      state: State::Streaming {
        child,
        stdout: ReaderStream::new(stdout),
        stderr,
      },
    })
  }

  pub fn id(&self) -> Option<u32> {
    self.id
  }
}

// reap the child and map a non-zero exit to its captured stderr
fn drain(
  mut child: Child,
  stderr: JoinHandle<Vec<u8>>,
) -> BoxFuture<'static, Result<()>> {
  async move {
    let status = child.wait().await?;
    if status.success() {
      return Ok(());
    }

    let stderr = stderr.await.unwrap_or_default();
    Err(Error::ProcessFailed {
      code: status.code(),
      stderr: String::from_utf8_lossy(&stderr).into_owned(),
    })
  }
  .boxed()
}

impl Stream for ProcessStream {
  type Item = Result<Bytes>;

  fn poll_next(
    mut self: Pin<&mut Self>,
    cx: &mut Context<'_>,
  ) -> Poll<Option<Self::Item>> {
    let this = &mut *self;
    loop {
      match &mut this.state {
        State::Streaming { stdout, .. } => {
          match Pin::new(stdout).poll_next(cx) {
            Poll::Ready(Some(Ok(bytes))) => {
              return Poll::Ready(Some(Ok(bytes)));
            }
            Poll::Ready(Some(Err(e))) => {
              this.state = State::Done;
              return Poll::Ready(Some(Err(e.into())));
            }
            Poll::Ready(None) => {
              let State::Streaming { child, stderr, .. } =
                std::mem::replace(&mut this.state, State::Done)
              else {
                unreachable!()
              };
              this.state = State::Draining(drain(child, stderr));
            }
            Poll::Pending => return Poll::Pending,
          }
        }
        State::Draining(wait) => {
          return match wait.as_mut().poll(cx) {
            Poll::Ready(Ok(())) => {
              this.state = State::Done;
              Poll::Ready(None)
            }
            Poll::Ready(Err(e)) => {
              this.state = State::Done;
              Poll::Ready(Some(Err(e)))
            }
            Poll::Pending => Poll::Pending,
          };
        }
        State::Done => return Poll::Ready(None),
      }
    }
  }
}

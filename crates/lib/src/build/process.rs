//! A running compiler invocation.

use std::fmt;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::BuildError;

/// Which pipe an output chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
  Stdout,
  Stderr,
}

#[derive(Debug)]
struct OutputChunk {
  stream: OutputStream,
  text: String,
}

/// Exit status and everything the compiler printed.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
  pub status: ExitStatus,
  pub stdout: String,
  pub stderr: String,
}

impl BuildOutcome {
  pub fn success(&self) -> bool {
    self.status.success()
  }
}

/// Handle to a spawned compiler.
///
/// Both output pipes are drained in the background from the moment the process starts, so
/// the compiler never blocks on a full pipe even if nobody calls [`BuildProcess::wait`].
pub struct BuildProcess {
  command_line: String,
  child: Child,
  stdin: Option<ChildStdin>,
  events: mpsc::UnboundedReceiver<OutputChunk>,
  stdout: Arc<Mutex<String>>,
  stderr: Arc<Mutex<String>>,
  readers: Vec<JoinHandle<()>>,
}

impl BuildProcess {
  /// Spawn `program` with `args`. With `keep_input`, stdin stays open until
  /// [`BuildProcess::close_input`].
  pub(crate) fn spawn(program: &std::path::Path, args: &[String], keep_input: bool) -> Result<Self, BuildError> {
    let command_line = render_command_line(program, args);

    let mut command = Command::new(program);
    command
      .args(args)
      .stdin(if keep_input { Stdio::piped() } else { Stdio::null() })
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true);

    let mut child = command.spawn().map_err(|source| BuildError::Spawn {
      program: program.to_path_buf(),
      source,
    })?;
    debug!(pid = ?child.id(), command = %command_line, "spawned Sass process");

    let (tx, events) = mpsc::unbounded_channel();
    let stdout = Arc::new(Mutex::new(String::new()));
    let stderr = Arc::new(Mutex::new(String::new()));

    let mut readers = Vec::with_capacity(2);
    if let Some(pipe) = child.stdout.take() {
      readers.push(spawn_reader(pipe, OutputStream::Stdout, stdout.clone(), tx.clone()));
    }
    if let Some(pipe) = child.stderr.take() {
      readers.push(spawn_reader(pipe, OutputStream::Stderr, stderr.clone(), tx));
    }

    Ok(Self {
      command_line,
      stdin: child.stdin.take(),
      child,
      events,
      stdout,
      stderr,
      readers,
    })
  }

  pub fn command_line(&self) -> &str {
    &self.command_line
  }

  /// OS process id, or `None` once the process has been reaped.
  pub fn id(&self) -> Option<u32> {
    self.child.id()
  }

  /// Close stdin. A compiler in watch mode exits when its input closes.
  pub fn close_input(&mut self) {
    if self.stdin.take().is_some() {
      debug!(pid = ?self.child.id(), "closed Sass input");
    }
  }

  /// Everything read from stdout so far.
  pub fn captured_stdout(&self) -> String {
    snapshot(&self.stdout)
  }

  /// Everything read from stderr so far.
  pub fn captured_stderr(&self) -> String {
    snapshot(&self.stderr)
  }

  /// Forward output to `on_output` as it arrives, then wait for the process to exit.
  ///
  /// Cancelling the returned future loses no output: chunks not yet forwarded remain in
  /// the captured buffers.
  pub async fn wait<F>(&mut self, mut on_output: F) -> Result<BuildOutcome, BuildError>
  where
    F: FnMut(OutputStream, &str),
  {
    while let Some(chunk) = self.events.recv().await {
      on_output(chunk.stream, &chunk.text);
    }

    let status = self.child.wait().await.map_err(BuildError::Process)?;
    self.finish(status).await
  }

  /// Close input, give the process `grace` to exit, then kill it.
  pub async fn terminate(&mut self, grace: Duration) -> Result<BuildOutcome, BuildError> {
    self.close_input();

    let status = match tokio::time::timeout(grace, self.child.wait()).await {
      Ok(status) => status.map_err(BuildError::Process)?,
      Err(_) => {
        warn!(pid = ?self.child.id(), "Sass did not exit after input closed, killing it");
        self.child.kill().await.map_err(BuildError::Process)?;
        self.child.wait().await.map_err(BuildError::Process)?
      }
    };

    self.finish(status).await
  }

  async fn finish(&mut self, status: ExitStatus) -> Result<BuildOutcome, BuildError> {
    for reader in self.readers.drain(..) {
      reader.await?;
    }
    debug!(status = %status, "Sass process exited");

    Ok(BuildOutcome {
      status,
      stdout: self.captured_stdout(),
      stderr: self.captured_stderr(),
    })
  }
}

impl fmt::Debug for BuildProcess {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BuildProcess")
      .field("command_line", &self.command_line)
      .field("pid", &self.child.id())
      .finish_non_exhaustive()
  }
}

fn snapshot(buffer: &Mutex<String>) -> String {
  buffer.lock().map(|b| b.clone()).unwrap_or_default()
}

fn spawn_reader<R>(
  pipe: R,
  stream: OutputStream,
  capture: Arc<Mutex<String>>,
  tx: mpsc::UnboundedSender<OutputChunk>,
) -> JoinHandle<()>
where
  R: AsyncRead + Unpin + Send + 'static,
{
  tokio::spawn(async move {
    let mut reader = BufReader::new(pipe);
    let mut line = Vec::new();

    loop {
      line.clear();
      match reader.read_until(b'\n', &mut line).await {
        Ok(0) => break,
        Ok(_) => {
          let text = String::from_utf8_lossy(&line).into_owned();
          if let Ok(mut captured) = capture.lock() {
            captured.push_str(&text);
          }
          // The receiver may be gone once nobody is waiting; capture still happens
          let _ = tx.send(OutputChunk { stream, text });
        }
        Err(err) => {
          warn!(error = %err, ?stream, "failed to read Sass output");
          break;
        }
      }
    }
  })
}

/// Shell-style rendering of an invocation, for display only.
pub(crate) fn render_command_line(program: &std::path::Path, args: &[String]) -> String {
  let program = program.to_string_lossy();
  std::iter::once(program.as_ref())
    .chain(args.iter().map(String::as_str))
    .map(quote_arg)
    .collect::<Vec<_>>()
    .join(" ")
}

fn quote_arg(arg: &str) -> String {
  if !arg.is_empty() && !arg.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
    return arg.to_string();
  }
  format!("'{}'", arg.replace('\'', r"'\''"))
}

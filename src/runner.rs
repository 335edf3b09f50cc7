//! Runs a hook executable and turns its exit status into a decision.
//!
//! The child gets the ref changes on stdin, one `<from> <to> <ref>` line
//! each, followed by EOF. Its stdout and stderr share one pipe whose content
//! becomes the rejection detail. Feeding stdin and draining the output run
//! on separate threads so a child that interleaves reads and writes can
//! never stall on a full pipe buffer.

use std::io::{self, PipeReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use crate::domain::RefChange;
use crate::protocol::{Environment, ExecutionResult};

/// Maximum number of output bytes kept as rejection detail.
pub const OUTPUT_LIMIT: usize = 65_000;

pub const TRUNCATION_NOTICE: &str =
    "\nHook response exceeds 65K length limit.\nFurther output will be trimmed.\n";

pub const NO_DETAIL: &str = "Specified executable provides no additional information,\n\
    contact your Administrator for help.";

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Everything needed to start one hook process.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub executable: &'a Path,
    pub args: &'a [String],
    pub working_dir: &'a Path,
    pub env: &'a Environment,
    pub ref_changes: &'a [RefChange],
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("failed to start {}: {source}", executable.display())]
    Spawn {
        executable: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O error while talking to the hook: {0}")]
    Io(#[from] io::Error),
    #[error("interrupted while waiting for the hook to exit")]
    Interrupted,
    #[error("hook did not exit within {0:?}")]
    TimedOut(Duration),
}

/// Spawns hook processes. One call to [`HookRunner::run`] is one invocation.
#[derive(Debug, Clone)]
pub struct HookRunner {
    output_limit: usize,
    timeout: Option<Duration>,
}

impl Default for HookRunner {
    fn default() -> Self {
        Self {
            output_limit: OUTPUT_LIMIT,
            timeout: None,
        }
    }
}

impl HookRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the child and fail with [`RunnerError::TimedOut`] after `timeout`.
    /// `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_output_limit(mut self, limit: usize) -> Self {
        self.output_limit = limit;
        self
    }

    /// Run the hook. Exit code 0 accepts; anything else rejects with
    /// `summary` and the captured output as detail.
    ///
    /// Errors are logged here with the executable and working directory;
    /// callers only decide how to present them.
    pub fn run(
        &self,
        invocation: &Invocation<'_>,
        summary: &str,
    ) -> Result<ExecutionResult, RunnerError> {
        self.execute(invocation, summary).inspect_err(|e| {
            error!(
                executable = %invocation.executable.display(),
                working_dir = %invocation.working_dir.display(),
                error = %e,
                "error running hook"
            );
        })
    }

    fn execute(
        &self,
        invocation: &Invocation<'_>,
        summary: &str,
    ) -> Result<ExecutionResult, RunnerError> {
        let (reader, writer) = io::pipe()?;

        let mut command = Command::new(invocation.executable);
        command
            .args(invocation.args)
            .current_dir(invocation.working_dir)
            .envs(invocation.env)
            .stdin(Stdio::piped())
            .stdout(writer.try_clone()?)
            .stderr(writer);
        // Own process group, so a timeout can take down everything the hook
        // started along with it.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command.spawn().map_err(|source| RunnerError::Spawn {
            executable: invocation.executable.to_path_buf(),
            source,
        })?;
        // The command still owns write ends of the output pipe; the drain
        // only sees EOF once every copy is closed.
        drop(command);
        debug!(
            pid = child.id(),
            executable = %invocation.executable.display(),
            "hook started"
        );

        let payload = encode_ref_changes(invocation.ref_changes);
        let stdin = child.stdin.take();
        let limit = self.output_limit;

        let (fed, drained, status) = thread::scope(|s| {
            let payload = payload.as_slice();
            let feeder = s.spawn(move || feed(stdin, payload));
            let drainer = s.spawn(move || drain(reader, limit));
            let status = self.wait(&mut child);
            if status.is_err() {
                kill_tree(&mut child);
            }
            (join(feeder), join(drainer), status)
        });

        let status = status?;
        fed?;
        let output = drained?;
        debug!(?status, bytes = output.len(), "hook finished");
        Ok(decide(status, output, summary))
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, RunnerError> {
        // A timeout too large to represent never expires.
        let deadline = self.timeout.and_then(|t| Instant::now().checked_add(t));
        let (Some(timeout), Some(deadline)) = (self.timeout, deadline) else {
            return child.wait().map_err(wait_error);
        };

        loop {
            if let Some(status) = child.try_wait().map_err(wait_error)? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                warn!(pid = child.id(), ?timeout, "hook timed out, killing it");
                return Err(RunnerError::TimedOut(timeout));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Kill the hook's process group, or just the hook where groups are not
/// available, then reap it. Descendants still holding the output pipe die
/// with the group so the drain sees EOF.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        let pgid = Pid::from_raw(child.id() as i32);
        if let Err(e) = killpg(pgid, Signal::SIGKILL) {
            warn!(
                pid = child.id(),
                error = %e,
                "failed to kill process group, killing hook only"
            );
            let _ = child.kill();
        }
    }
    #[cfg(not(unix))]
    let _ = child.kill();

    let _ = child.wait();
}

fn wait_error(e: io::Error) -> RunnerError {
    if e.kind() == io::ErrorKind::Interrupted {
        RunnerError::Interrupted
    } else {
        RunnerError::Io(e)
    }
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, io::Result<T>>) -> io::Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("hook I/O thread panicked")))
}

/// Bytes written to the hook's stdin for `changes`, in order.
pub fn encode_ref_changes(changes: &[RefChange]) -> Vec<u8> {
    changes
        .iter()
        .map(RefChange::protocol_line)
        .collect::<String>()
        .into_bytes()
}

/// Write the payload and close stdin. A child that exits without reading
/// its input is not an error.
fn feed(stdin: Option<ChildStdin>, payload: &[u8]) -> io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(payload).and_then(|()| stdin.flush()) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

/// Read the combined output to EOF, keeping at most `limit` bytes.
fn drain(mut reader: PipeReader, limit: usize) -> io::Result<String> {
    let mut capture = OutputCapture::new(limit);
    let mut buf = [0u8; 8192];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => capture.push(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(capture.finish())
}

fn decide(status: ExitStatus, output: String, summary: &str) -> ExecutionResult {
    if status.success() {
        return ExecutionResult::accepted();
    }
    let detail = if output.is_empty() {
        NO_DETAIL.to_string()
    } else {
        output
    };
    ExecutionResult::rejected(summary, detail)
}

/// Output accumulator enforcing the byte cap as data arrives.
#[derive(Debug)]
struct OutputCapture {
    bytes: Vec<u8>,
    limit: usize,
    truncated: bool,
}

impl OutputCapture {
    fn new(limit: usize) -> Self {
        Self {
            bytes: Vec::new(),
            limit,
            truncated: false,
        }
    }

    fn push(&mut self, chunk: &[u8]) {
        let room = self.limit - self.bytes.len();
        if chunk.len() > room {
            self.bytes.extend_from_slice(&chunk[..room]);
            self.truncated = true;
        } else {
            self.bytes.extend_from_slice(chunk);
        }
    }

    /// Decode as UTF-8. A character cut in half by the cap is dropped
    /// rather than replaced.
    fn finish(mut self) -> String {
        if self.truncated {
            if let Err(e) = std::str::from_utf8(&self.bytes) {
                if e.error_len().is_none() {
                    self.bytes.truncate(e.valid_up_to());
                }
            }
        }
        let mut text = String::from_utf8(self.bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
        if self.truncated {
            text.push_str(TRUNCATION_NOTICE);
        }
        text
    }
}

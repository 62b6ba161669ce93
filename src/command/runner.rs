use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

use crate::buffer::{OutputBuffer, OutputKind, OutputLine};

/// Exit code reported when the process was killed by a signal
pub const SIGNAL_EXIT_CODE: i32 = -1;

/// Output event from a command
#[derive(Debug)]
pub enum CommandEvent {
    Output(OutputLine),
}

/// Handle for managing a running command
pub struct CommandHandle {
    child: Child,
    receiver: mpsc::Receiver<CommandEvent>,
}

impl CommandHandle {
    /// Kill the process with SIGKILL
    pub async fn kill(&mut self) -> std::io::Result<()> {
        self.child.kill().await
    }

    /// Wait for the process to exit and return the exit code
    pub async fn wait(&mut self) -> std::io::Result<i32> {
        let status = self.child.wait().await?;
        Ok(status.code().unwrap_or(SIGNAL_EXIT_CODE))
    }

    /// Receive the next event; `None` once both streams are closed
    pub async fn next_event(&mut self) -> Option<CommandEvent> {
        self.receiver.recv().await
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Read all output into a buffer of `max_lines`, then wait for the exit code
    pub async fn collect(mut self, max_lines: usize) -> std::io::Result<(i32, OutputBuffer)> {
        let mut buffer = OutputBuffer::new(max_lines);
        while let Some(CommandEvent::Output(line)) = self.next_event().await {
            buffer.push(line);
        }
        let exit_code = self.wait().await?;
        Ok((exit_code, buffer))
    }
}

/// Command execution manager
pub struct CommandRunner;

impl CommandRunner {
    /// Spawn a shell command with extra environment variables
    ///
    /// Executes the command using `sh -c "command"` format, capturing
    /// stdout/stderr asynchronously. The child is killed when the handle is
    /// dropped.
    pub fn spawn<I, K, V>(command: &str, envs: I) -> std::io::Result<CommandHandle>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<std::ffi::OsStr>,
        V: AsRef<std::ffi::OsStr>,
    {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .envs(envs)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let (tx, rx) = mpsc::channel(1000);

        if let Some(stdout) = child.stdout.take() {
            forward_lines(stdout, OutputKind::Stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(stderr, OutputKind::Stderr, tx.clone());
        }

        // Channel closes when both stream readers finish
        drop(tx);

        Ok(CommandHandle {
            child,
            receiver: rx,
        })
    }
}

fn forward_lines<R>(stream: R, kind: OutputKind, tx: mpsc::Sender<CommandEvent>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx
                .send(CommandEvent::Output(OutputLine::new(kind, line)))
                .await
                .is_err()
            {
                break;
            }
        }
    });
}

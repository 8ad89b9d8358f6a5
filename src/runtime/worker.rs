//! Lifecycle of the depth worker process.
//!
//! The worker is launched as
//! `program [args..] --depth-port <P> --sync-port <Q>` with piped stdin and
//! stdout. Once both endpoints are bound its first stdout line must be a
//! [`WorkerReady`] JSON object. Later stdout lines are forwarded to `debug!`.
//! Closing its stdin is the shutdown request.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::WorkerConfig;
use crate::runtime::error::WorkerError;
use crate::runtime::protocol::WorkerReady;

/// How long to wait for the exit status of a worker that closed its stdout
/// before reporting ready.
const EXIT_PROBE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// Nothing to do; the worker was already stopped by an earlier call.
    AlreadyStopped,
    /// The worker exited on its own after its stdin was closed.
    Exited(ExitStatus),
    /// The worker outlived the grace period and was killed.
    Killed,
}

/// Owned handle to a running depth worker.
///
/// Dropping the handle without calling [`WorkerProcess::shutdown`] still
/// kills the process, but without waiting for it.
#[derive(Debug)]
pub struct WorkerProcess {
    program: PathBuf,
    pid: Option<u32>,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    ready: WorkerReady,
    grace: Duration,
}

impl WorkerProcess {
    pub async fn spawn(config: &WorkerConfig) -> Result<Self, WorkerError> {
        let mut command = Command::new(&config.program);
        command
            .args(&config.args)
            .arg("--depth-port")
            .arg(config.depth_port.to_string())
            .arg("--sync-port")
            .arg(config.sync_port.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| WorkerError::Spawn {
            program: config.program.clone(),
            source,
        })?;
        let pid = child.id();
        info!(program = ?config.program, ?pid, "depth worker spawned");

        let mut stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let grace = config.shutdown_grace();

        let (ready, rest) = match await_ready(&mut child, stdout, config.startup_timeout()).await {
            Ok(handshake) => handshake,
            Err(err) => {
                warn!(?pid, error = %err, "depth worker failed to start");
                terminate(&mut child, stdin.take(), grace).await;
                return Err(err);
            }
        };
        info!(?pid, depth_port = ready.depth_port, sync_port = ready.sync_port, "depth worker ready");
        tokio::spawn(drain_stdout(rest, pid));

        Ok(Self {
            program: config.program.clone(),
            pid,
            child: Some(child),
            stdin,
            ready,
            grace,
        })
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn endpoints(&self) -> WorkerReady {
        self.ready
    }

    pub fn depth_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, self.ready.depth_port))
    }

    pub fn sync_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, self.ready.sync_port))
    }

    pub fn is_stopped(&self) -> bool {
        self.child.is_none()
    }

    /// Stops the worker and waits until it is gone.
    ///
    /// Idempotent: every call after the first returns
    /// [`Shutdown::AlreadyStopped`] without touching the process.
    pub async fn shutdown(&mut self) -> Shutdown {
        let Some(mut child) = self.child.take() else {
            return Shutdown::AlreadyStopped;
        };

        let outcome = terminate(&mut child, self.stdin.take(), self.grace).await;
        info!(program = ?self.program, pid = ?self.pid, ?outcome, "depth worker stopped");
        outcome
    }
}

impl Drop for WorkerProcess {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            warn!(pid = ?self.pid, "depth worker dropped without shutdown; killing");
            let _ = child.start_kill();
        }
    }
}

async fn await_ready(
    child: &mut Child,
    stdout: Option<ChildStdout>,
    wait: Duration,
) -> Result<(WorkerReady, Lines<BufReader<ChildStdout>>), WorkerError> {
    let stdout =
        stdout.ok_or_else(|| WorkerError::Handshake("worker stdout was not captured".into()))?;
    let mut lines = BufReader::new(stdout).lines();

    let line = match timeout(wait, lines.next_line()).await {
        Ok(line) => line?,
        Err(_) => return Err(WorkerError::StartupTimeout(wait)),
    };
    let Some(line) = line else {
        let status = timeout(EXIT_PROBE, child.wait()).await.ok().and_then(Result::ok);
        return Err(WorkerError::ExitedBeforeReady(status));
    };

    debug!(line = %line.trim(), "depth worker handshake");
    let ready = serde_json::from_str(line.trim())
        .map_err(|e| WorkerError::Handshake(format!("{e}: {line:?}")))?;
    Ok((ready, lines))
}

/// Keeps the stdout pipe open after the handshake so a chatty worker does not
/// hit a broken pipe.
async fn drain_stdout(mut lines: Lines<BufReader<ChildStdout>>, pid: Option<u32>) {
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => debug!(?pid, line = %line.trim_end(), "depth worker stdout"),
            Ok(None) => break,
            Err(e) => {
                debug!(?pid, error = %e, "depth worker stdout closed");
                break;
            }
        }
    }
}

async fn terminate(child: &mut Child, stdin: Option<ChildStdin>, grace: Duration) -> Shutdown {
    // EOF on stdin is the worker's cue to exit.
    drop(stdin);

    match timeout(grace, child.wait()).await {
        Ok(Ok(status)) => return Shutdown::Exited(status),
        Ok(Err(e)) => warn!(error = %e, "waiting on depth worker failed; killing"),
        Err(_) => warn!(?grace, "depth worker ignored shutdown request; killing"),
    }

    if let Err(e) = child.kill().await {
        warn!(error = %e, "failed to kill depth worker");
    }
    Shutdown::Killed
}

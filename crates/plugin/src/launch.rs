//! Starting and stopping backend processes.
//!
//! Launch sequence:
//!
//! 1. Split the command on whitespace and spawn it with the magic cookie in
//!    its environment. stdout carries the announcement line; stderr is
//!    forwarded to `tracing`.
//! 2. Wait up to `start_timeout` for the announcement and validate it.
//! 3. Connect and exchange `Hello`.
//!
//! If any step fails the child is killed and reaped before the error is
//! returned. There is no retry.

use std::io::{BufRead, BufReader};
use std::net::{Shutdown, TcpStream};
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use nosql_core::{Error, Result};
use tracing::{debug, info, warn};

use crate::client::RemoteStore;
use crate::config::LaunchConfig;
use crate::handshake::HandshakeLine;

const EXIT_POLLS: u32 = 20;
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Starts backends with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Launcher {
    config: LaunchConfig,
}

impl Launcher {
    /// Launcher using `config`.
    pub fn new(config: LaunchConfig) -> Self {
        Launcher { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Start `command` and connect to it.
    pub fn launch(&self, command: &str) -> Result<(BackendProcess, RemoteStore)> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| Error::Config("empty backend command".to_string()))?;

        let handshake = &self.config.handshake;
        let mut child = Command::new(program)
            .args(parts)
            .env(&handshake.magic_cookie_key, &handshake.magic_cookie_value)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Launch(format!("failed to start {}: {}", program, e)))?;

        let pid = child.id();
        info!(pid, command, "backend started");

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let mut process = BackendProcess::new(child);
        if let Some(stderr) = stderr {
            forward_stderr(pid, stderr);
        }

        match self.connect(&mut process, stdout) {
            Ok(store) => Ok((process, store)),
            Err(e) => {
                warn!(pid, error = %e, "backend launch failed");
                let _ = process.kill();
                Err(e)
            }
        }
    }

    fn connect(
        &self,
        process: &mut BackendProcess,
        stdout: Option<ChildStdout>,
    ) -> Result<RemoteStore> {
        let stdout =
            stdout.ok_or_else(|| Error::Launch("backend stdout not captured".to_string()))?;
        let line = self.await_announcement(process, stdout)?;
        let announced = HandshakeLine::parse(&line)?;
        announced.validate(&self.config.handshake)?;
        debug!(pid = process.pid, address = %announced.address, "backend announced");

        let store = RemoteStore::connect(announced.address, &self.config)?;
        process.channel = Some(store.control_handle()?);
        Ok(store)
    }

    fn await_announcement(
        &self,
        process: &mut BackendProcess,
        stdout: ChildStdout,
    ) -> Result<String> {
        let (tx, rx) = mpsc::channel();
        let pid = process.pid;
        thread::Builder::new()
            .name(format!("backend-{}-stdout", pid))
            .spawn(move || {
                let mut lines = BufReader::new(stdout).lines();
                let _ = tx.send(lines.next().transpose());
                // Keep draining so the backend never blocks on a full pipe.
                for line in lines.map_while(|line| line.ok()) {
                    debug!(pid, "backend stdout: {}", line);
                }
            })?;

        match rx.recv_timeout(self.config.start_timeout) {
            Ok(Ok(Some(line))) => Ok(line),
            Ok(Err(e)) => Err(Error::Launch(format!("failed to read handshake: {}", e))),
            Ok(Ok(None)) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                let status = process.wait_exit();
                Err(Error::Launch(format!(
                    "backend exited before completing the handshake{}",
                    status
                )))
            }
            Err(mpsc::RecvTimeoutError::Timeout) => Err(Error::Launch(format!(
                "timed out after {:?} waiting for backend handshake",
                self.config.start_timeout
            ))),
        }
    }
}

fn forward_stderr(pid: u32, stderr: ChildStderr) {
    let spawned = thread::Builder::new()
        .name(format!("backend-{}-stderr", pid))
        .spawn(move || {
            for line in BufReader::new(stderr).lines().map_while(|line| line.ok()) {
                info!(target: "nosql::backend", pid, "{}", line);
            }
        });
    if let Err(e) = spawned {
        warn!(pid, error = %e, "cannot forward backend stderr");
    }
}

/// A running backend. Killed on [`kill`](BackendProcess::kill) or drop.
#[derive(Debug)]
pub struct BackendProcess {
    child: Option<Child>,
    pid: u32,
    channel: Option<TcpStream>,
}

impl BackendProcess {
    fn new(child: Child) -> Self {
        BackendProcess {
            pid: child.id(),
            child: Some(child),
            channel: None,
        }
    }

    /// OS process id.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Check whether the process has not exited yet.
    pub fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Close the channel, kill the process and reap it.
    ///
    /// Once the process is reaped, calling it again is a no-op. If killing
    /// fails the process is kept so a later call can retry.
    pub fn kill(&mut self) -> Result<()> {
        if let Some(channel) = self.channel.take() {
            let _ = channel.shutdown(Shutdown::Both);
        }
        let Some(child) = self.child.as_mut() else {
            return Ok(());
        };
        if let Ok(None) = child.try_wait() {
            if let Err(e) = child.kill() {
                // The process may have exited between the check and the signal.
                if !matches!(child.try_wait(), Ok(Some(_))) {
                    return Err(e.into());
                }
            }
        }
        let status = child.wait()?;
        self.child = None;
        info!(pid = self.pid, %status, "backend stopped");
        Ok(())
    }

    /// Suffix describing how the process exited, if it does so shortly.
    fn wait_exit(&mut self) -> String {
        let Some(child) = self.child.as_mut() else {
            return String::new();
        };
        for _ in 0..EXIT_POLLS {
            match child.try_wait() {
                Ok(Some(status)) => return format!(" ({})", status),
                Ok(None) => thread::sleep(EXIT_POLL_INTERVAL),
                Err(_) => break,
            }
        }
        String::new()
    }
}

impl Drop for BackendProcess {
    fn drop(&mut self) {
        if let Err(e) = self.kill() {
            warn!(pid = self.pid, error = %e, "failed to stop backend");
        }
    }
}

//! Long-lived runner subprocess plumbing.
//!
//! The concrete engines front Python inference stacks that cannot run
//! in-process. Each loaded engine owns one runner child that keeps the
//! model hot in memory; `load` maps to spawning it, `release` to
//! tearing it down. The wire protocol is one JSON line per request and
//! one per response over the child's stdio.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::application::ports::EngineError;

#[derive(Debug, Serialize)]
pub struct RunnerRequest<'a> {
    pub audio: &'a str,
    pub language: &'a str,
    pub with_timestamp: bool,
}

/// A segment as the runner emits it. Times are optional on purpose:
/// some upstream models occasionally produce entries without
/// timestamps, and the sanitizer drops those before anything else
/// sees them.
#[derive(Debug, Deserialize)]
pub struct RawSegment {
    pub spk: Option<u32>,
    pub start: Option<f64>,
    pub end: Option<f64>,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct RunnerReply {
    #[serde(default)]
    pub text: String,
    pub duration: Option<f64>,
    pub language: Option<String>,
    pub segments: Option<Vec<RawSegment>>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunnerHandshake {
    event: String,
}

pub struct RunnerProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    program: String,
}

impl RunnerProcess {
    /// Spawn the runner and wait for its `{"event":"ready"}` handshake,
    /// which the runner emits only after the model is in memory.
    pub fn spawn(program: &str, model_id: &str) -> Result<Self, EngineError> {
        let mut child = Command::new(program)
            .args(["--model", model_id])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                EngineError::LoadFailed(format!("failed to spawn runner '{}': {}", program, e))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::LoadFailed("runner stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::LoadFailed("runner stdout unavailable".to_string()))?;
        let mut stdout = BufReader::new(stdout);

        let mut line = String::new();
        stdout
            .read_line(&mut line)
            .map_err(|e| EngineError::LoadFailed(format!("runner handshake read: {}", e)))?;
        if line.is_empty() {
            let _ = child.wait();
            return Err(EngineError::LoadFailed(format!(
                "runner '{}' exited before becoming ready",
                program
            )));
        }
        let handshake: RunnerHandshake = serde_json::from_str(line.trim_end()).map_err(|e| {
            EngineError::LoadFailed(format!("malformed runner handshake: {}", e))
        })?;
        if handshake.event != "ready" {
            return Err(EngineError::LoadFailed(format!(
                "unexpected runner handshake event: {}",
                handshake.event
            )));
        }

        Ok(Self {
            child,
            stdin,
            stdout,
            program: program.to_string(),
        })
    }

    pub fn request(&mut self, request: &RunnerRequest<'_>) -> Result<RunnerReply, EngineError> {
        let payload = serde_json::to_string(request)
            .map_err(|e| EngineError::InferenceFailed(format!("encode request: {}", e)))?;
        self.stdin
            .write_all(payload.as_bytes())
            .and_then(|_| self.stdin.write_all(b"\n"))
            .and_then(|_| self.stdin.flush())
            .map_err(|e| EngineError::InferenceFailed(format!("runner write: {}", e)))?;

        let mut line = String::new();
        self.stdout
            .read_line(&mut line)
            .map_err(|e| EngineError::InferenceFailed(format!("runner read: {}", e)))?;
        if line.is_empty() {
            return Err(EngineError::InferenceFailed(format!(
                "runner '{}' closed its output mid-request",
                self.program
            )));
        }

        let reply: RunnerReply = serde_json::from_str(line.trim_end())
            .map_err(|e| EngineError::InferenceFailed(format!("malformed runner reply: {}", e)))?;
        if let Some(error) = reply.error {
            return Err(EngineError::InferenceFailed(error));
        }
        Ok(reply)
    }

    /// Close stdin so the runner exits, then reap it. Best-effort: a
    /// runner that refuses to die is logged and abandoned.
    pub fn shutdown(self) {
        let Self {
            mut child,
            stdin,
            program,
            ..
        } = self;
        drop(stdin);
        match child.wait() {
            Ok(status) if status.success() => {
                tracing::debug!(program = %program, "runner exited cleanly");
            }
            Ok(status) => {
                tracing::warn!(program = %program, status = %status, "runner exited with error");
            }
            Err(e) => {
                tracing::warn!(program = %program, error = %e, "failed to reap runner");
            }
        }
    }
}

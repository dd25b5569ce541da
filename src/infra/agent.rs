use std::ffi::OsString;
use std::io;
use std::process::{Command, Stdio};
use thiserror::Error;

pub const DEFAULT_AGENT_BIN: &str = "codex";

/// Exit code reported when the agent binary cannot be found.
pub const AGENT_NOT_FOUND_EXIT_CODE: i32 = 127;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AgentInvocation {
    pub subcommand: Option<&'static str>,
    pub session_id: Option<String>,
    pub prompt: Option<String>,
}

impl AgentInvocation {
    pub fn resume(session_id: &str, prompt: Option<String>) -> Self {
        Self {
            subcommand: Some("resume"),
            session_id: Some(session_id.to_string()),
            prompt,
        }
    }

    pub fn new_session(prompt: Option<String>) -> Self {
        Self {
            subcommand: None,
            session_id: None,
            prompt,
        }
    }

    pub fn args(&self) -> Vec<String> {
        self.subcommand
            .map(str::to_string)
            .into_iter()
            .chain(self.session_id.clone())
            .chain(self.prompt.clone().filter(|prompt| !prompt.trim().is_empty()))
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum LaunchAgentError {
    #[error("agent binary not found: {bin}\nHint: install codex or point CXS_CODEX_BIN at it.")]
    NotFound { bin: String },

    #[error("failed to launch {bin}: {source}")]
    Spawn { bin: String, source: io::Error },
}

impl LaunchAgentError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => AGENT_NOT_FOUND_EXIT_CODE,
            Self::Spawn { .. } => 1,
        }
    }
}

pub fn resolve_agent_bin() -> OsString {
    std::env::var_os("CXS_CODEX_BIN")
        .filter(|bin| !bin.is_empty())
        .unwrap_or_else(|| OsString::from(DEFAULT_AGENT_BIN))
}

/// Runs the agent in the foreground with the terminal inherited and returns
/// its exit code. A child killed by a signal reports 1.
pub fn run_agent(bin: &OsString, invocation: &AgentInvocation) -> Result<i32, LaunchAgentError> {
    let args = invocation.args();
    tracing::info!(bin = %bin.to_string_lossy(), ?args, "launching agent");

    let status = Command::new(bin)
        .args(&args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| {
            let bin = bin.to_string_lossy().to_string();
            if source.kind() == io::ErrorKind::NotFound {
                LaunchAgentError::NotFound { bin }
            } else {
                LaunchAgentError::Spawn { bin, source }
            }
        })?;
    Ok(status.code().unwrap_or(1))
}

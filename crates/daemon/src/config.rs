// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration.
//!
//! The daemon is configured by its one positional argument (the target
//! repository) and environment variables; there is no config file.

use std::path::PathBuf;
use std::time::Duration;

/// Default agent launch command, overridable via `$CLAUDE_CMD`.
pub const DEFAULT_AGENT_CMD: &str =
    "claude --dangerously-skip-permissions --allowedTools Bash,Edit --add-dir .";

/// Default multiplexer session name, overridable via `$TMUX_SESSION`.
pub const DEFAULT_SESSION: &str = "cc";

/// Name of the state directory placed inside the target repository.
pub const STATE_DIR_NAME: &str = ".ai-app-studio";

#[derive(Debug, Clone)]
pub struct Config {
    /// The repository the root agent works on.
    pub target_repo: PathBuf,
    /// Daemon root: mailboxes, logs and state live below here.
    pub root: PathBuf,
    /// Multiplexer session hosting all panes.
    pub session: String,
    /// Command line that launches the interactive agent in a pane.
    pub agent_cmd: String,
    /// Install root of the orchestrator; `frames/` and `bin/` live here.
    pub studio_root: PathBuf,
    /// Mailbox poll interval.
    pub poll_interval: Duration,
    /// Cosmetic delay between multiplexer operations.
    pub mux_delay: Duration,
    /// Agent warm-up pause before the initial instruction. Load-bearing:
    /// the agent program offers no readiness signal.
    pub warmup: Duration,
}

impl Config {
    /// Build from the environment. `target_repo` comes from the command
    /// line (falling back to the current directory in `main`).
    pub fn from_env(target_repo: PathBuf) -> Self {
        let root = match std::env::var_os("ROOT") {
            Some(root) => PathBuf::from(root),
            None => target_repo.join(STATE_DIR_NAME),
        };
        let session =
            std::env::var("TMUX_SESSION").unwrap_or_else(|_| DEFAULT_SESSION.to_string());
        let agent_cmd =
            std::env::var("CLAUDE_CMD").unwrap_or_else(|_| DEFAULT_AGENT_CMD.to_string());
        let studio_root = match std::env::var_os("STUDIO_ROOT") {
            Some(dir) => PathBuf::from(dir),
            None => default_studio_root(),
        };

        Self {
            target_repo,
            root,
            session,
            agent_cmd,
            studio_root,
            poll_interval: env_ms("BUSD_POLL_MS", 500),
            mux_delay: env_ms("BUSD_MUX_DELAY_MS", 100),
            warmup: env_ms("BUSD_WARMUP_MS", 5_000),
        }
    }

    pub fn mbox_dir(&self) -> PathBuf {
        self.root.join("mbox")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn raw_logs_dir(&self) -> PathBuf {
        self.logs_dir().join("raw")
    }

    pub fn raw_log_path(&self, unit_id: &str) -> PathBuf {
        self.raw_logs_dir().join(format!("{}.raw", unit_id))
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join("state")
    }

    pub fn journal_path(&self) -> PathBuf {
        self.logs_dir().join("bus.jsonl")
    }

    /// Directory prepended to the agents' PATH so they can run the poster.
    pub fn bin_dir(&self) -> PathBuf {
        self.studio_root.join("bin")
    }

    /// Frame prompt for a unit: `frames/root/CLAUDE.md` for root-synonym
    /// units, `frames/unit/CLAUDE.md` otherwise.
    pub fn frame_path(&self, unit_id: &str) -> PathBuf {
        let kind = if studio_core::is_root_unit(unit_id) {
            "root"
        } else {
            "unit"
        };
        self.studio_root.join("frames").join(kind).join("CLAUDE.md")
    }

    /// Create the directory layout under the daemon root.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.mbox_dir())?;
        std::fs::create_dir_all(self.raw_logs_dir())?;
        std::fs::create_dir_all(self.state_dir())?;
        Ok(())
    }
}

/// Install root: the parent of the directory holding the executable
/// (`<install>/bin/busd` -> `<install>`), falling back to the current
/// directory.
fn default_studio_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| Some(exe.parent()?.parent()?.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn env_ms(key: &str, default_ms: u64) -> Duration {
    let ms = std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}

/// Test constructor with short pauses and an explicit install root.
#[cfg(test)]
impl Config {
    pub fn for_tests(
        target_repo: &std::path::Path,
        root: &std::path::Path,
        studio_root: &std::path::Path,
    ) -> Self {
        Self {
            target_repo: target_repo.to_path_buf(),
            root: root.to_path_buf(),
            session: "cc".to_string(),
            agent_cmd: DEFAULT_AGENT_CMD.to_string(),
            studio_root: studio_root.to_path_buf(),
            poll_interval: Duration::from_millis(1),
            mux_delay: Duration::ZERO,
            warmup: Duration::ZERO,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

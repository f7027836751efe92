// dbrestore/src/utils/process.rs
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::errors::{AppError, Result};
use crate::utils::find_executable;

/// An external program invocation, with optional file redirections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<OsString>,
    pub envs: Vec<(String, String)>,
    pub stdin: Option<PathBuf>,
    pub stdout: Option<PathBuf>,
}

impl ShellCommand {
    pub fn new(program: impl Into<String>) -> Self {
        ShellCommand {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn stdin_from(mut self, path: &Path) -> Self {
        self.stdin = Some(path.to_path_buf());
        self
    }

    pub fn stdout_to(mut self, path: &Path) -> Self {
        self.stdout = Some(path.to_path_buf());
        self
    }
}

// Environment values are left out; they carry passwords.
impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        if let Some(stdin) = &self.stdin {
            write!(f, " < {}", stdin.display())?;
        }
        if let Some(stdout) = &self.stdout {
            write!(f, " > {}", stdout.display())?;
        }
        Ok(())
    }
}

/// Capability to run external processes.
pub trait CommandRunner {
    /// Runs `command` to completion. `Ok(false)` means the process ran but
    /// exited unsuccessfully; `Err` means it could not be started at all.
    fn run(&self, command: &ShellCommand) -> Result<bool>;
}

/// Runs commands with `std::process`, resolving programs through PATH.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ShellCommand) -> Result<bool> {
        let program_path = find_executable(&command.program)?;
        log::debug!("Running: {}", command);

        let mut process = Command::new(&program_path);
        process.args(&command.args);
        for (key, value) in &command.envs {
            process.env(key, value);
        }

        match &command.stdin {
            Some(path) => process.stdin(Stdio::from(File::open(path)?)),
            None => process.stdin(Stdio::null()),
        };
        match &command.stdout {
            Some(path) => process.stdout(Stdio::from(File::create(path)?)),
            None => process.stdout(Stdio::piped()),
        };
        process.stderr(Stdio::piped());

        let output = process.output().map_err(|e| AppError::Command {
            program: command.program.clone(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            log::error!(
                "{} failed with status: {}\nStdout: {}\nStderr: {}",
                command.program,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
            return Ok(false);
        }

        Ok(true)
    }
}

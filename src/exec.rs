//! Process execution seam.
//!
//! Every version-control operation is expressed as an [`ScmCommand`] carrying
//! its own working directory, and handed to a [`CommandRunner`]. The process
//! wide current directory is never changed.

use crate::errors::ScmError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScmCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; `None` inherits the caller's.
    pub dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl ScmCommand {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            dir: None,
            env: Vec::new(),
        }
    }

    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.dir = Some(dir.to_path_buf());
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    /// `program arg1 arg2 ...`
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for ScmCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

pub trait CommandRunner {
    fn run(&self, command: &ScmCommand) -> Result<(), ScmError>;
}

/// Runs commands as real subprocesses, blocking until they exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ScmCommand) -> Result<(), ScmError> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        if let Some(dir) = &command.dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &command.env {
            cmd.env(key, value);
        }

        tracing::debug!(command = %command, dir = ?command.dir, "running");
        let output = cmd.output().map_err(|source| ScmError::Spawn {
            command: command.to_string(),
            source,
        })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ScmError::CommandFailed {
                command: command.to_string(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_argv() {
        let cmd = ScmCommand::new("git", ["clone", "https://x/y.git", "/tmp/y"]);
        assert_eq!(cmd.to_string(), "git clone https://x/y.git /tmp/y");
        assert!(cmd.dir.is_none());
    }

    #[test]
    fn test_builder_sets_dir_and_env() {
        let cmd = ScmCommand::new("go", ["get"])
            .in_dir(Path::new("/work"))
            .with_env("GOPATH", "/work/.gopack/vendor");
        assert_eq!(cmd.dir.as_deref(), Some(Path::new("/work")));
        assert_eq!(
            cmd.env,
            vec![("GOPATH".to_string(), "/work/.gopack/vendor".to_string())]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_failure() {
        let runner = SystemRunner;
        assert!(runner.run(&ScmCommand::new("true", Vec::<String>::new())).is_ok());

        let err = runner
            .run(&ScmCommand::new("false", Vec::<String>::new()))
            .unwrap_err();
        assert!(matches!(err, ScmError::CommandFailed { status: Some(1), .. }));
    }

    #[test]
    fn test_system_runner_missing_program() {
        let err = SystemRunner
            .run(&ScmCommand::new("gopack-no-such-program", ["x"]))
            .unwrap_err();
        assert!(matches!(err, ScmError::Spawn { .. }));
    }
}

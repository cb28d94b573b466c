use std::process::{Command, ExitStatus, Stdio};

use anyhow::{Context as _, Error, Result};
use camino::Utf8Path;
use thiserror::Error;

/// What to do about a child process exiting unsuccessfully.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum ExitPolicy {
    /// Log and carry on. The output is still returned.
    #[default]
    Ignore,
    /// Fail with a [`ToolError`].
    Check,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ToolError {
    #[error("\"{cmdline}\" exited with code {code}")]
    Exit { cmdline: String, code: i32 },
    #[error("\"{cmdline}\" probably killed by signal")]
    Signal { cmdline: String },
}

/// A single synchronous invocation of an external program.
#[derive(Builder, Debug, Clone)]
#[builder(setter(into))]
pub struct ToolCmd<'a> {
    binary: &'a str,

    #[builder(default)]
    args: Vec<&'a str>,

    #[builder(setter(strip_option), default = "None")]
    working_dir: Option<&'a Utf8Path>,

    #[builder(default)]
    exit_policy: ExitPolicy,
}

/// Captured result of a [`ToolCmd`].
#[derive(Debug)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
}

impl<'a> ToolCmd<'a> {
    pub fn cmdline(&self) -> String {
        let mut argv = vec![self.binary];
        argv.extend(self.args.iter());
        shell_words::join(argv)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(self.binary);
        cmd.args(&self.args).stdin(Stdio::null());

        if let Some(dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        cmd
    }

    /// Runs the command to completion, capturing stdout. Stderr is passed
    /// through.
    pub fn run(&self) -> Result<ToolOutput, Error> {
        let cmdline = self.cmdline();
        match self.working_dir {
            Some(dir) => log::debug!("running \"{cmdline}\" in \"{dir}\""),
            None => log::debug!("running \"{cmdline}\""),
        }

        let output = self
            .command()
            .stderr(Stdio::inherit())
            .output()
            .with_context(|| format!("launching \"{cmdline}\""))?;

        self.check_status(output.status)?;

        Ok(ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }

    fn check_status(&self, status: ExitStatus) -> Result<(), ToolError> {
        if status.success() {
            return Ok(());
        }

        let cmdline = self.cmdline();
        let err = match status.code() {
            Some(code) => ToolError::Exit { cmdline, code },
            None => ToolError::Signal { cmdline },
        };

        match self.exit_policy {
            ExitPolicy::Check => Err(err),
            ExitPolicy::Ignore => {
                log::warn!("{err}, continuing");
                Ok(())
            }
        }
    }
}

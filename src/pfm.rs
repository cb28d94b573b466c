//! Access to the libpfm4 example tools.

use anyhow::{Context as _, Error, Result};
use camino::{Utf8Path, Utf8PathBuf};

use crate::cmd::{ExitPolicy, ToolCmdBuilder};

pub const SHOWEVTINFO: &str = "examples/showevtinfo";
pub const CHECK_EVENTS: &str = "examples/check_events";

/// The two text producing tools event extraction and code resolution need.
pub trait EventTool {
    /// Full `showevtinfo` output.
    fn show_event_info(&self) -> Result<String, Error>;

    /// `check_events` output for a single event label.
    fn check_event(&self, label: &str) -> Result<String, Error>;
}

/// The example binaries inside a built libpfm4 checkout.
#[derive(Debug, Clone)]
pub struct Libpfm {
    checkout: Utf8PathBuf,
}

impl Libpfm {
    /// The checkout path is made absolute, as the tools are started with
    /// the checkout as working directory.
    pub fn new(checkout: &Utf8Path) -> Result<Self, Error> {
        let checkout = checkout
            .canonicalize_utf8()
            .with_context(|| format!("canonicalizing {checkout}"))?;
        Ok(Libpfm { checkout })
    }

    fn run(&self, tool: &str, args: Vec<&str>) -> Result<String, Error> {
        // a failing check_events just means "not an event here", and
        // showevtinfo's output is used as-is
        let cmd = ToolCmdBuilder::default()
            .binary(tool)
            .args(args)
            .working_dir(self.checkout.as_path())
            .exit_policy(ExitPolicy::Ignore)
            .build()?;

        Ok(cmd.run()?.stdout)
    }
}

impl EventTool for Libpfm {
    fn show_event_info(&self) -> Result<String, Error> {
        let binary = self.checkout.join(SHOWEVTINFO);
        self.run(binary.as_str(), Vec::new())
    }

    fn check_event(&self, label: &str) -> Result<String, Error> {
        let binary = self.checkout.join(CHECK_EVENTS);
        self.run(binary.as_str(), vec![label])
    }
}

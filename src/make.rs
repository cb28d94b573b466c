use anyhow::{Error, Result};
use camino::Utf8Path;

use crate::cmd::{ExitPolicy, ToolCmdBuilder};

/// Builds libpfm4 and its example tools inside `checkout`.
///
/// With [`ExitPolicy::Ignore`], a failed build is only logged; the missing
/// example tools then fail to launch during event extraction.
pub fn build(checkout: &Utf8Path, make: &str, exit_policy: ExitPolicy) -> Result<(), Error> {
    let cmd = ToolCmdBuilder::default()
        .binary(make)
        .working_dir(checkout)
        .exit_policy(exit_policy)
        .build()?;

    println!("perflist: building in {checkout}");
    let output = cmd.run()?;
    log::debug!("{} exited with {}", cmd.cmdline(), output.status);
    log::trace!("{}", output.stdout);

    Ok(())
}

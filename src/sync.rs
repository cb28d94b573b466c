use anyhow::{Error, Result};
use camino::Utf8Path;

use crate::cmd::{ExitPolicy, ToolCmd, ToolCmdBuilder};
use crate::config::Repository;

/// The git invocation that brings `checkout` up to date.
fn git_cmd<'a>(
    checkout: &'a Utf8Path,
    repository: &'a Repository,
    git: &'a str,
    exit_policy: ExitPolicy,
) -> Result<ToolCmd<'a>, Error> {
    let mut cmd = ToolCmdBuilder::default();
    cmd.binary(git).exit_policy(exit_policy);

    if checkout.exists() {
        cmd.args(vec!["pull"]).working_dir(checkout);
    } else {
        cmd.args(vec![
            "clone",
            "-b",
            repository.branch.as_str(),
            "--single-branch",
            repository.url.as_str(),
            checkout.as_str(),
        ]);
    }

    Ok(cmd.build()?)
}

/// Clones `repository` into `checkout`, or pulls if it is already there.
pub fn sync(
    checkout: &Utf8Path,
    repository: &Repository,
    git: &str,
    exit_policy: ExitPolicy,
) -> Result<(), Error> {
    let cmd = git_cmd(checkout, repository, git, exit_policy)?;
    println!("perflist: {}", cmd.cmdline());
    cmd.run()?;
    Ok(())
}

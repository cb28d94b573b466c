use anyhow::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::parser::ValueSource;
use clap::ArgMatches;

use crate::cmd::ExitPolicy;

pub const DEFAULT_URL: &str = "https://github.com/wcohen/libpfm4.git";
pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_CHECKOUT: &str = "libpfm4";
pub const OUTPUT_FILENAME: &str = "perf_list.csv";

/// Where libpfm4 comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub url: String,
    pub branch: String,
}

impl Default for Repository {
    fn default() -> Self {
        Repository {
            url: DEFAULT_URL.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
        }
    }
}

/// Settings of a `generate` run.
#[derive(Builder, Debug, Clone)]
#[builder(setter(into))]
pub struct Config {
    #[builder(default = "Utf8PathBuf::from(DEFAULT_CHECKOUT)")]
    pub checkout: Utf8PathBuf,
    #[builder(setter(strip_option), default = "None")]
    output: Option<Utf8PathBuf>,
    #[builder(default)]
    pub repository: Repository,
    #[builder(default = "String::from(\"git\")")]
    pub git: String,
    #[builder(default = "String::from(\"make\")")]
    pub make: String,
    #[builder(default)]
    pub skip_sync: bool,
    #[builder(default)]
    pub skip_build: bool,
    #[builder(default)]
    pub exit_policy: ExitPolicy,
}

impl Config {
    /// The output file, `perf_list.csv` next to the checkout unless set.
    pub fn output(&self) -> Utf8PathBuf {
        match &self.output {
            Some(output) => output.clone(),
            None => checkout_parent(&self.checkout).join(OUTPUT_FILENAME),
        }
    }

    /// Collects the settings of a `generate` run.
    ///
    /// `outer` holds the matches of the top level command when `matches`
    /// belongs to the `generate` subcommand. Options given on the command
    /// line before the subcommand then apply too, unless the subcommand
    /// repeats them.
    pub fn from_matches(matches: &ArgMatches, outer: Option<&ArgMatches>) -> Result<Config, Error> {
        let given = |id: &str| given_at(matches, outer, id);
        let mut builder = ConfigBuilder::default();

        if let Some(checkout) = given("checkout").get_one::<Utf8PathBuf>("checkout") {
            builder.checkout(checkout.clone());
        }
        if let Some(output) = given("output").get_one::<Utf8PathBuf>("output") {
            builder.output(output.clone());
        }
        if let Some(git) = given("git").get_one::<String>("git") {
            builder.git(git.clone());
        }
        if let Some(make) = given("make").get_one::<String>("make") {
            builder.make(make.clone());
        }

        let mut repository = Repository::default();
        if let Some(url) = given("url").get_one::<String>("url") {
            repository.url = url.clone();
        }
        if let Some(branch) = given("branch").get_one::<String>("branch") {
            repository.branch = branch.clone();
        }

        let exit_policy = match given("strict").get_flag("strict") {
            true => ExitPolicy::Check,
            false => ExitPolicy::Ignore,
        };

        Ok(builder
            .repository(repository)
            .skip_sync(given("no-sync").get_flag("no-sync"))
            .skip_build(given("no-build").get_flag("no-build"))
            .exit_policy(exit_policy)
            .build()?)
    }
}

/// The matches to read `id` from: `outer` only if the option was typed
/// there and not in `matches`.
fn given_at<'a>(matches: &'a ArgMatches, outer: Option<&'a ArgMatches>, id: &str) -> &'a ArgMatches {
    let on_command_line = |m: &ArgMatches| m.value_source(id) == Some(ValueSource::CommandLine);
    match outer {
        Some(outer) if !on_command_line(matches) && on_command_line(outer) => outer,
        _ => matches,
    }
}

/// The directory containing `checkout`. For a plain relative name, that is
/// the current directory. Paths ending in `.` or `..` are resolved first.
pub fn checkout_parent(checkout: &Utf8Path) -> Utf8PathBuf {
    let resolved;
    let checkout = match checkout.file_name() {
        Some(_) => checkout,
        None => {
            resolved = checkout
                .canonicalize_utf8()
                .unwrap_or_else(|_| checkout.to_owned());
            resolved.as_path()
        }
    };

    match checkout.parent() {
        Some(parent) => parent.to_owned(),
        None => Utf8PathBuf::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ConfigBuilder::default().build().unwrap();
        assert_eq!(config.checkout, "libpfm4");
        assert_eq!(config.output(), "perf_list.csv");
        assert_eq!(config.repository.url, DEFAULT_URL);
        assert_eq!(config.repository.branch, "master");
        assert_eq!(config.git, "git");
        assert_eq!(config.make, "make");
        assert!(!config.skip_sync);
        assert!(!config.skip_build);
        assert_eq!(config.exit_policy, ExitPolicy::Ignore);
    }

    #[test]
    fn output_next_to_checkout() {
        let config = ConfigBuilder::default()
            .checkout("/tmp/deps/libpfm4")
            .build()
            .unwrap();
        assert_eq!(config.output(), "/tmp/deps/perf_list.csv");
    }

    #[test]
    fn explicit_output() {
        let config = ConfigBuilder::default()
            .checkout("/tmp/deps/libpfm4")
            .output("counters.csv")
            .build()
            .unwrap();
        assert_eq!(config.output(), "counters.csv");
    }

    #[test]
    fn from_command_line() {
        let matches = crate::cli::clap().get_matches_from([
            "perflist",
            "generate",
            "--checkout",
            "deps/pfm",
            "--branch",
            "v4.13",
            "--strict",
            "--no-sync",
        ]);
        let (_, matches) = matches.subcommand().unwrap();
        let config = Config::from_matches(matches, None).unwrap();
        assert_eq!(config.checkout, "deps/pfm");
        assert_eq!(config.output(), "deps/perf_list.csv");
        assert_eq!(config.repository.branch, "v4.13");
        assert_eq!(config.repository.url, DEFAULT_URL);
        assert_eq!(config.exit_policy, ExitPolicy::Check);
        assert!(config.skip_sync);
        assert!(!config.skip_build);
    }

    #[test]
    fn output_for_dot_checkout() {
        let cwd = Utf8PathBuf::try_from(std::env::current_dir().unwrap())
            .unwrap()
            .canonicalize_utf8()
            .unwrap();
        let expected = cwd.parent().unwrap().join(OUTPUT_FILENAME);

        let config = ConfigBuilder::default().checkout(".").build().unwrap();
        assert_eq!(config.output(), expected);
    }

    #[test]
    fn output_for_dotdot_checkout() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path())
            .unwrap()
            .canonicalize_utf8()
            .unwrap();
        std::fs::create_dir_all(root.join("deps/libpfm4/lib")).unwrap();

        let config = ConfigBuilder::default()
            .checkout(root.join("deps/libpfm4/lib/.."))
            .build()
            .unwrap();
        assert_eq!(config.output(), root.join("deps/perf_list.csv"));
    }

    #[test]
    fn output_for_missing_dotdot_checkout() {
        // nothing to resolve, falls back to the path as given
        assert_eq!(
            checkout_parent(Utf8Path::new("/nonexistent/libpfm4/..")),
            "/nonexistent/libpfm4"
        );
    }
}

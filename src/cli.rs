use camino::Utf8PathBuf;

use clap::{crate_version, value_parser, Arg, ArgAction, Command, ValueHint};

use crate::config::{DEFAULT_BRANCH, DEFAULT_CHECKOUT, DEFAULT_URL};

fn generate_args() -> Vec<Arg> {
    vec![
        Arg::new("checkout")
            .help("libpfm4 checkout directory")
            .short('d')
            .long("checkout")
            .env("PERFLIST_CHECKOUT")
            .num_args(1)
            .value_name("DIR")
            .default_value(DEFAULT_CHECKOUT)
            .value_parser(value_parser!(Utf8PathBuf))
            .value_hint(ValueHint::DirPath),
        Arg::new("output")
            .help("output file [default: perf_list.csv next to the checkout]")
            .short('o')
            .long("output")
            .env("PERFLIST_OUTPUT")
            .num_args(1)
            .value_name("FILE")
            .value_parser(value_parser!(Utf8PathBuf))
            .value_hint(ValueHint::FilePath),
        Arg::new("url")
            .help("libpfm4 repository url")
            .long("url")
            .env("PERFLIST_URL")
            .num_args(1)
            .value_name("URL")
            .default_value(DEFAULT_URL)
            .value_hint(ValueHint::Url),
        Arg::new("branch")
            .help("libpfm4 branch to clone")
            .long("branch")
            .env("PERFLIST_BRANCH")
            .num_args(1)
            .value_name("BRANCH")
            .default_value(DEFAULT_BRANCH),
        Arg::new("git")
            .help("git binary used to clone or pull")
            .long("git")
            .env("PERFLIST_GIT")
            .num_args(1)
            .value_name("BIN")
            .default_value("git")
            .value_hint(ValueHint::CommandName),
        Arg::new("make")
            .help("command used to build libpfm4")
            .long("make")
            .env("PERFLIST_MAKE")
            .num_args(1)
            .value_name("BIN")
            .default_value("make")
            .value_hint(ValueHint::CommandName),
        Arg::new("no-sync")
            .help("don't clone or pull the checkout")
            .long("no-sync")
            .action(ArgAction::SetTrue),
        Arg::new("no-build")
            .help("don't run make in the checkout")
            .long("no-build")
            .action(ArgAction::SetTrue),
        Arg::new("strict")
            .help("fail if git or make exit unsuccessfully")
            .long("strict")
            .env("PERFLIST_STRICT")
            .action(ArgAction::SetTrue),
    ]
}

pub fn clap() -> clap::Command {
    Command::new("perflist")
        .version(crate_version!())
        .about("Generate a list of hardware performance counter codes from libpfm4")
        .infer_subcommands(true)
        .arg(
            Arg::new("chdir")
                .short('C')
                .long("chdir")
                .help("change working directory before doing anything else")
                .global(true)
                .required(false)
                .value_parser(value_parser!(Utf8PathBuf))
                .value_hint(ValueHint::DirPath)
                .num_args(1),
        )
        .arg(
            Arg::new("verbose")
                .help("be verbose (e.g., show command lines)")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .help("only log errors")
                .short('q')
                .long("quiet")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .args(generate_args())
        .subcommand(
            Command::new("generate")
                .about("clone, build and query libpfm4, write the counter list (default)")
                .args(generate_args()),
        )
        .subcommand(
            Command::new("parse")
                .about("print the event labels found in saved showevtinfo output")
                .arg(
                    Arg::new("file")
                        .help("file containing showevtinfo output")
                        .required(true)
                        .value_parser(value_parser!(Utf8PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("lookup")
                .about("look up counters in a generated counter list")
                .arg(
                    Arg::new("file")
                        .help("counter list file")
                        .required(true)
                        .value_parser(value_parser!(Utf8PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("names")
                        .help("counter names")
                        .required(true)
                        .num_args(1..),
                ),
        )
        .subcommand(
            Command::new("completion")
                .about("Generate perflist shell completions.")
                .arg(
                    Arg::new("generator")
                        .help("shell to generate completions for")
                        .long("generate")
                        .value_parser(value_parser!(clap_complete::Shell)),
                )
                .hide(true),
        )
        .subcommand(
            Command::new("manpages")
                .about("Generate perflist manpages.")
                .arg(
                    Arg::new("outdir")
                        .help("directory in which to create manpage files")
                        .value_parser(value_parser!(Utf8PathBuf))
                        .value_hint(ValueHint::DirPath)
                        .required(true),
                )
                .hide(true),
        )
}

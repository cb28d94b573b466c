extern crate clap;

#[macro_use]
extern crate derive_builder;

use std::env;

use anyhow::{Context as _, Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;

mod cli;
mod cmd;
mod config;
mod counters;
mod generate;
mod make;
mod parse;
mod pfm;
mod resolve;
mod sync;

use config::Config;
use counters::{find_counter, read_counters};

fn main() {
    let result = try_main();
    match result {
        Err(e) => {
            eprintln!("perflist: error: {e:#}");
            std::process::exit(1);
        }
        Ok(code) => std::process::exit(code),
    };
}

fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "perflist: {}: {}",
                record.level().as_str().to_lowercase(),
                record.args()
            )
        })
        .init();
}

fn write_completions<G: clap_complete::Generator>(gen: G, buf: &mut dyn std::io::Write) {
    let mut cmd = cli::clap();
    let name = cmd.get_name().to_string();
    clap_complete::generate(gen, &mut cmd, name, buf);
}

/// Writes `perflist.1` and one page per visible subcommand into `outdir`.
fn write_manpages(outdir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, Error> {
    fn create_manpage(cmd: clap::Command, outfile: &Utf8Path) -> Result<(), Error> {
        let man = clap_mangen::Man::new(cmd);
        let mut buffer: Vec<u8> = Default::default();
        man.render(&mut buffer)?;

        std::fs::write(outfile, buffer).with_context(|| format!("writing {outfile}"))?;
        Ok(())
    }

    let cmd = cli::clap();
    let mut written = Vec::new();

    let outfile = outdir.join("perflist.1");
    create_manpage(cmd.clone(), &outfile)?;
    written.push(outfile);

    for subcommand in cmd.get_subcommands() {
        if subcommand.is_hide_set() {
            continue;
        }
        let name = subcommand.get_name();
        let outfile = outdir.join(format!("perflist-{name}.1"));
        create_manpage(subcommand.clone(), &outfile)?;
        written.push(outfile);
    }

    Ok(written)
}

fn try_main() -> Result<i32> {
    let matches = cli::clap().get_matches();

    init_logging(matches.get_count("verbose"), matches.get_flag("quiet"));

    // handle completion subcommand here, so the working directory
    // is left alone
    match matches.subcommand() {
        Some(("completion", matches)) => {
            if let Some(generator) = matches
                .get_one::<clap_complete::Shell>("generator")
                .copied()
            {
                eprintln!("Generating completion file for {}...", generator);
                write_completions(generator, &mut std::io::stdout());
            }
            return Ok(0);
        }
        Some(("manpages", matches)) => {
            let outdir = matches
                .get_one::<Utf8PathBuf>("outdir")
                .context("missing outdir")?;
            write_manpages(outdir)?;
            return Ok(0);
        }
        _ => (),
    }

    if let Some(dir) = matches.get_one::<Utf8PathBuf>("chdir") {
        env::set_current_dir(dir).context(format!("cannot change to directory \"{dir}\""))?;
    }

    match matches.subcommand() {
        Some(("parse", parse_matches)) => {
            let file = parse_matches
                .get_one::<Utf8PathBuf>("file")
                .context("missing file")?;
            let text = std::fs::read_to_string(file).with_context(|| format!("reading {file}"))?;
            let labels = parse::extract_labels(&text);
            if !labels.is_empty() {
                println!("{}", labels.iter().join("\n"));
            }
            log::info!("{} event labels in {file}", labels.len());
        }
        Some(("lookup", lookup_matches)) => {
            let file = lookup_matches
                .get_one::<Utf8PathBuf>("file")
                .context("missing file")?;
            let counters = read_counters(file)?;
            for name in lookup_matches.get_many::<String>("names").into_iter().flatten() {
                let counter = find_counter(&counters, name, file)?;
                println!("{counter}");
            }
        }
        Some(("generate", generate_matches)) => {
            generate::generate(&Config::from_matches(generate_matches, Some(&matches))?)?;
        }
        _ => {
            generate::generate(&Config::from_matches(&matches, None)?)?;
        }
    };

    Ok(0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn manpages() {
        let dir = tempfile::tempdir().unwrap();
        let outdir = Utf8Path::from_path(dir.path()).unwrap();

        let written = write_manpages(outdir).unwrap();
        let names: Vec<&str> = written.iter().filter_map(|path| path.file_name()).collect();
        assert_eq!(
            names,
            vec![
                "perflist.1",
                "perflist-generate.1",
                "perflist-parse.1",
                "perflist-lookup.1"
            ]
        );

        let page = std::fs::read_to_string(outdir.join("perflist-lookup.1")).unwrap();
        assert!(page.contains("lookup"));
    }

    #[test]
    fn manpages_into_missing_dir() {
        assert!(write_manpages(Utf8Path::new("/nonexistent/man")).is_err());
    }

    #[test]
    fn completions() {
        let mut buffer: Vec<u8> = Vec::new();
        write_completions(clap_complete::Shell::Bash, &mut buffer);
        let script = String::from_utf8(buffer).unwrap();
        assert!(script.contains("perflist"));
        assert!(script.contains("--checkout"));
        assert!(script.contains("lookup"));
    }
}

use anyhow::{Error, Result};
use camino::Utf8Path;

use crate::config::Config;
use crate::counters::write_counters;
use crate::pfm::{EventTool, Libpfm};
use crate::resolve::{extract, resolve};
use crate::{make, sync};

/// Extracts all labels from `tool`, resolves their codes and writes them to
/// `output`. Returns the number of counters written.
pub fn write_counter_list<T: EventTool>(tool: &T, output: &Utf8Path) -> Result<usize, Error> {
    let labels = extract(tool)?;
    let records = resolve(&labels, tool)?;
    write_counters(output, &records)
}

/// Runs the whole pipeline: sync, build, extract, resolve, write.
pub fn generate(config: &Config) -> Result<usize, Error> {
    let checkout = config.checkout.as_path();

    if config.skip_sync {
        log::info!("not syncing {checkout}");
    } else {
        sync::sync(checkout, &config.repository, &config.git, config.exit_policy)?;
    }

    if config.skip_build {
        log::info!("not building {checkout}");
    } else {
        make::build(checkout, &config.make, config.exit_policy)?;
    }

    let tool = Libpfm::new(checkout)?;
    let output = config.output();
    let count = write_counter_list(&tool, &output)?;

    println!("perflist: wrote {count} counter definitions to \"{output}\"");

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::pfm::{CHECK_EVENTS, SHOWEVTINFO};
    use std::os::unix::fs::PermissionsExt;

    const EVENT_INFO: &str = concat!(
        "Supported PMU models:\n",
        "\t[18, ix86arch, \"Intel X86 architectural PMU\"]\n",
        "#-----------------------------\n",
        "IDX\t : 37748736\n",
        "PMU name : ix86arch (Intel X86 architectural PMU)\n",
        "Name     : UNHALTED_CORE_CYCLES\n",
        "Equiv\t : None\n",
        "Flags    : None\n",
        "Desc     : count core clock cycles whenever the clock signal on the specific core is running (not halted)\n",
        "Code     : 0x3c\n",
        "#-----------------------------\n",
        "IDX\t : 37748738\n",
        "Name     : BRANCH_INSTRUCTIONS_RETIRED\n",
        "Umask-00 : 0x00 : PMU : [ALL] : [default]\n",
        "Umask-01 : 0x20 : PMU : [NOT TAKEN] : None : not taken\n",
        "#-----------------------------\n",
        "IDX\t : 37748739\n",
        "Name     : MISSING_EVENT\n",
    );

    fn install(path: &Utf8Path, script: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, format!("#!/bin/sh\n{script}\n")).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn fake_checkout(root: &Utf8Path) -> camino::Utf8PathBuf {
        let checkout = root.join("libpfm4");
        std::fs::write(root.join("showevtinfo.txt"), EVENT_INFO).unwrap();
        install(
            &checkout.join(SHOWEVTINFO),
            &format!("cat {}", root.join("showevtinfo.txt")),
        );
        install(
            &checkout.join(CHECK_EVENTS),
            concat!(
                "case \"$1\" in\n",
                "UNHALTED_CORE_CYCLES) echo 'Codes          : 0x53003c' ;;\n",
                "BRANCH_INSTRUCTIONS_RETIRED.ALL) echo 'Codes          : 0x5300c4' ;;\n",
                "BRANCH_INSTRUCTIONS_RETIRED.NOT_TAKEN) echo 'Codes          : 0x5320c4' ;;\n",
                "*) echo \"cannot encode event $1\"; exit 1 ;;\n",
                "esac",
            ),
        );
        checkout
    }

    #[test]
    fn offline_run() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        let checkout = fake_checkout(root);

        let config = ConfigBuilder::default()
            .checkout(checkout)
            .skip_sync(true)
            .skip_build(true)
            .build()
            .unwrap();

        assert_eq!(generate(&config).unwrap(), 3);

        let output = root.join("perf_list.csv");
        let content = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            content,
            concat!(
                "UNHALTED_CORE_CYCLES,0x53003c\n",
                "BRANCH_INSTRUCTIONS_RETIRED.ALL,0x5300c4\n",
                "BRANCH_INSTRUCTIONS_RETIRED.NOT_TAKEN,0x5320c4\n",
            )
        );
        assert_eq!(content.lines().count(), 3);

        // same tool output, same file
        assert_eq!(generate(&config).unwrap(), 3);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), content);
    }

    #[test]
    fn missing_tools_abort() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        std::fs::create_dir(root.join("libpfm4")).unwrap();

        let config = ConfigBuilder::default()
            .checkout(root.join("libpfm4"))
            .skip_sync(true)
            .skip_build(true)
            .build()
            .unwrap();

        assert!(generate(&config).is_err());
        assert!(!root.join("perf_list.csv").exists());
    }
}

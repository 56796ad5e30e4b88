//! Command-line parsing and the file-level driver around the translator.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Parser};

use crate::parser::is_symbol;
use crate::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "vm-translator",
    version,
    about = "Translates a stack VM program (.vm) into Hack assembly (.asm)"
)]
pub struct Cli {
    #[arg(value_name = "INFILE", help = "VM source file; must end with .vm")]
    pub infile: PathBuf,
    #[arg(
        short = 'o',
        long = "outfile",
        value_name = "FILE",
        help = "Output file. Defaults to INFILE with an .asm extension"
    )]
    pub outfile: Option<PathBuf>,
    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        help = "Only report warnings and errors"
    )]
    pub quiet: bool,
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub infile: PathBuf,
    pub outfile: PathBuf,
    /// Translation unit name, used to scope static cells.
    pub unit: String,
}

impl Cli {
    pub fn config(&self) -> Result<Config> {
        let infile = self.infile.clone();
        if infile.is_dir() {
            bail!(
                "{}: directory translation is not supported",
                infile.display()
            );
        }
        if infile.extension().and_then(|e| e.to_str()) != Some("vm") {
            bail!("file must be a .vm file (provided: {})", infile.display());
        }

        let unit = unit_name(&infile)?;
        if !is_symbol(&unit) {
            warn!(
                "unit name `{}` is not a valid assembler symbol; static labels may not assemble",
                unit
            );
        }

        let outfile = self
            .outfile
            .clone()
            .unwrap_or_else(|| infile.with_extension("asm"));

        Ok(Config {
            infile,
            outfile,
            unit,
        })
    }
}

fn unit_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("cannot derive a unit name from {}", path.display()))
}

/// Reads, translates and writes one unit. The output file is only created
/// once the whole translation has succeeded. Returns the number of lines
/// written.
pub fn run(config: &Config) -> Result<usize> {
    info!("translating {}", config.infile.display());
    let source = fs::read_to_string(&config.infile)
        .with_context(|| format!("failed to read {}", config.infile.display()))?;

    let lines = crate::translate(&config.unit, &source)
        .with_context(|| format!("failed to translate {}", config.infile.display()))?;

    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(&config.outfile, text)
        .with_context(|| format!("failed to write {}", config.outfile.display()))?;
    info!("wrote {} lines to {}", lines.len(), config.outfile.display());

    Ok(lines.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn cli_parses_arguments() {
        let cli = Cli::parse_from(["vm-translator", "prog/Main.vm", "-o", "out.asm", "-q"]);
        assert_eq!(cli.infile, PathBuf::from("prog/Main.vm"));
        assert_eq!(cli.outfile, Some(PathBuf::from("out.asm")));
        assert!(cli.quiet);
    }

    #[test]
    fn config_defaults_outfile_and_unit() {
        let cli = Cli::parse_from(["vm-translator", "prog/Main.vm"]);
        let config = cli.config().expect("valid config");
        assert_eq!(config.outfile, PathBuf::from("prog/Main.asm"));
        assert_eq!(config.unit, "Main");
    }

    #[test]
    fn config_rejects_other_extensions() {
        let cli = Cli::parse_from(["vm-translator", "Main.asm"]);
        let err = cli.config().unwrap_err();
        assert_eq!(err.to_string(), "file must be a .vm file (provided: Main.asm)");
    }

    #[test]
    fn config_rejects_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cli = Cli::parse_from([
            OsString::from("vm-translator"),
            dir.path().as_os_str().to_owned(),
        ]);
        let err = cli.config().unwrap_err();
        assert!(err.to_string().contains("directory translation is not supported"));
    }
}

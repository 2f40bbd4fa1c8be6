//! Build script for stratus-cli.
//!
//! This script generates man pages at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Build scripts cannot depend on the crate being built, so the command
//! structure is declared here a second time.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// Keep this structure synchronized with src/cli.rs.
fn build_cli() -> Command {
    Command::new("stratus")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reconcile network reservations and talk to CPI providers")
        .long_about(
            "Operator tooling for director network reservations and external CPI providers",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Director configuration file (defaults to ~/.stratus/director.yaml)")
                .value_name("PATH")
                .global(true)
                .env("STRATUS_CONFIG"),
        )
        .subcommands(vec![
            Command::new("reconcile")
                .about("Classify desired and existing reservations into plans")
                .long_about(
                    "Compare desired reservations with the ones held from the previous pass \
                     and print which are reused, reserved or released",
                ),
            Command::new("cpi")
                .about("Invoke one CPI method through the configured provider")
                .long_about(
                    "Run the configured CPI executable for a single method, adapting the \
                     request and response to the configured API version",
                ),
            Command::new("validate")
                .about("Validate a director configuration file")
                .long_about("Check a director configuration file for errors"),
        ])
}

fn main() {
    // Generate man pages at build time
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    let app = build_cli();
    let man = Man::new(app);
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();

    fs::write(man_dir.join("stratus.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}

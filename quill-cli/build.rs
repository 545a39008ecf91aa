use clap::{Arg, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the views from src/inspect.rs
// We need to duplicate this here since build scripts can't access src/ modules
const AVAILABLE_VIEWS: &[&str] = &["treeviz", "events", "json", "json-legacy"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let input = || {
        Arg::new("input")
            .help("Input file path")
            .required(true)
            .index(1)
            .value_hint(ValueHint::FilePath)
    };

    let mut cmd = Command::new("quill")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert, normalize and check quill documents")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("max-depth")
                .long("max-depth")
                .value_name("N")
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .arg(input())
                .arg(Arg::new("from").long("from").value_hint(ValueHint::Other))
                .arg(
                    Arg::new("to")
                        .long("to")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(Command::new("normalize").arg(input()))
        .subcommand(
            Command::new("check")
                .arg(input())
                .arg(Arg::new("from").long("from").value_hint(ValueHint::Other)),
        )
        .subcommand(
            Command::new("inspect")
                .arg(input())
                .arg(
                    Arg::new("view")
                        .index(2)
                        .value_parser(clap::builder::PossibleValuesParser::new(AVAILABLE_VIEWS))
                        .value_hint(ValueHint::Other),
                )
                .arg(Arg::new("from").long("from").value_hint(ValueHint::Other)),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "quill", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "quill", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "quill", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}

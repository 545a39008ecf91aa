// Command-line interface for quill
//
// This binary converts documents between editor JSON and the stored markup dialect, rewrites
// legacy editor JSON into the canonical shape and checks that stored markup survives a round trip.
// All of the work happens in quill-babel; this crate only reads files, applies configuration and
// reports errors.
//
// Converting:
//
// The conversion needs a to and from pair. The from format is auto-detected from the file
// extension, while being overwrittable by an explicit --from flag.
// Usage:
//  quill <input> --to <format> [--from <format>] [-o <file>]          - Convert between formats (default)
//  quill convert <input> --to <format> [--from <format>] [-o <file>]  - Same as above (explicit)
//  quill normalize <input.json>           - Rewrite legacy disclosures into the canonical shape
//  quill check <input>                    - Verify the round-trip laws for a document
//  quill inspect <input> [<view>]         - Show a pipeline stage (defaults to "treeviz")
//  quill --list-formats                   - List available formats and views
//
// Global options --config <path> and --max-depth <n> apply to every command.
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix and passes the parameters to the format/view.
// Example:
//  quill inspect post.md --extra-inlines false
//
// Logging goes to stderr and is controlled by QUILL_LOG (an EnvFilter directive, default "warn").

mod inspect;

use clap::{Arg, ArgAction, Command, ValueHint};
use quill_babel::ir::nodes::Document;
use quill_babel::ir::wire::{parse_wire_json, to_wire_json};
use quill_babel::roundtrip::{check_document, check_markup, RoundTripReport};
use quill_babel::{
    load_for_display, normalize, BabelError, Format, FormatRegistry, MarkupOptions, Rendered,
};
use quill_config::{Loader, QuillConfig};
use std::collections::HashMap;
use std::fs;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if let Some(key) = arg.strip_prefix("--extra-") {
            let has_value = args
                .get(i + 1)
                .is_some_and(|next| !next.starts_with('-'));

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn input_arg() -> Arg {
    Arg::new("input")
        .help("Input file path")
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn from_arg() -> Arg {
    Arg::new("from")
        .long("from")
        .help("Source format (auto-detected from file extension if not specified)")
        .value_hint(ValueHint::Other)
}

fn build_cli() -> Command {
    Command::new("quill")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert, normalize and check quill documents")
        .long_about(
            "quill converts rich documents between editor JSON and stored markup.\n\n\
            Commands:\n  \
            - convert:   Transform between document formats (markup, json, json-legacy, treeviz)\n  \
            - normalize: Rewrite legacy editor JSON into the canonical disclosure shape\n  \
            - check:     Verify that a document survives a markup round trip\n  \
            - inspect:   View a pipeline stage (tree, events, editor JSON)\n\n\
            Examples:\n  \
            quill post.json --to markup             # Store editor JSON as markup\n  \
            quill post.md --to json -o post.json    # Load stored markup for the editor\n  \
            quill normalize old.json                # Canonical JSON on stdout\n  \
            quill check post.md                     # Exit 1 if the round trip drifts",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats and inspection views")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a quill.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("max-depth")
                .long("max-depth")
                .value_name("N")
                .help("Deepest allowed disclosure nesting (overrides configuration)")
                .value_parser(clap::value_parser!(usize))
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between different formats.\n\n\
                    Supported formats:\n  \
                    - markup:      Stored markup (.md, .markdown, .quill)\n  \
                    - json:        Editor JSON, summary as disclosure attribute (.json)\n  \
                    - json-legacy: Editor JSON, summary as first disclosure child\n  \
                    - treeviz:     Tree visualization (output only)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.",
                )
                .arg(input_arg())
                .arg(from_arg())
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("normalize")
                .about("Rewrite legacy editor JSON into the canonical shape")
                .long_about(
                    "Reads editor JSON in which disclosures may carry their summary as a\n\
                    leading child node and writes it back with the summary as an attribute.\n\
                    Canonical input comes back unchanged.",
                )
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("check")
                .about("Verify the round-trip laws for a document")
                .long_about(
                    "For markup input, checks that serialize(parse(x)) is a fixed point.\n\
                    For JSON input, checks that the tree survives serialize then parse,\n\
                    allowing for the dialect's documented losses.\n\n\
                    Exits with status 1 and reports the first divergence otherwise.",
                )
                .arg(input_arg())
                .arg(from_arg()),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect a document at a pipeline stage")
                .arg(input_arg())
                .arg(
                    Arg::new("view")
                        .help("View to show. Defaults to 'treeviz'")
                        .required(false)
                        .index(2)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            inspect::AVAILABLE_VIEWS,
                        ))
                        .value_hint(ValueHint::Other),
                )
                .arg(from_arg()),
        )
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, extra_params) = parse_extra_args(&args);

    // If no subcommand is provided, inject "convert"
    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !["convert", "normalize", "check", "inspect", "help"]
                    .contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    let config = load_cli_config(
        matches.get_one::<String>("config").map(|s| s.as_str()),
        matches.get_one::<usize>("max-depth").copied(),
    );
    let options = MarkupOptions::from(&config.parser);
    let registry = FormatRegistry::with_options(&options);

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let to = sub_matches.get_one::<String>("to").expect("to is required");
            let from = resolve_from(&registry, input, sub_matches.get_one::<String>("from"));
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(
                &registry,
                input,
                &from,
                to,
                output,
                &extra_params,
                &config,
                &options,
            );
        }
        Some(("normalize", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            handle_normalize_command(input);
        }
        Some(("check", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let from = resolve_from(&registry, input, sub_matches.get_one::<String>("from"));
            handle_check_command(&registry, input, &from, &options);
        }
        Some(("inspect", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let view = sub_matches
                .get_one::<String>("view")
                .map(|s| s.as_str())
                .unwrap_or("treeviz");
            let from = resolve_from(&registry, input, sub_matches.get_one::<String>("from"));
            handle_inspect_command(&registry, input, &from, view, &extra_params, &options);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("QUILL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn read_input(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| fail(format!("could not read '{path}': {e}")))
}

/// Explicit `--from`, or the format claimed by the file extension.
fn resolve_from(registry: &FormatRegistry, input: &str, explicit: Option<&String>) -> String {
    if let Some(from) = explicit {
        return from.to_string();
    }
    registry
        .detect_format_from_filename(input)
        .unwrap_or_else(|| {
            fail(format!(
                "could not detect format from filename '{input}'; please specify --from explicitly"
            ))
        })
}

/// Handle the convert command
#[allow(clippy::too_many_arguments)]
fn handle_convert_command(
    registry: &FormatRegistry,
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    extra_params: &HashMap<String, String>,
    config: &QuillConfig,
    options: &MarkupOptions,
) {
    // Validate formats exist
    if let Err(e) = registry.get(from) {
        fail(e);
    }
    if let Err(e) = registry.get(to) {
        fail(e);
    }

    let source = read_input(input);
    let cache = config.cache.build();

    let doc = match (&cache, from) {
        (Some(cache), "markup") => cache.parse(&source, options),
        _ => registry.parse(&source, from),
    }
    .unwrap_or_else(|e| fail(format!("parse failed: {e}")));

    let result = match (&cache, to) {
        (Some(cache), "markup") => cache.serialize(&doc, options),
        _ => registry.serialize_with_options(&doc, to, extra_params),
    }
    .unwrap_or_else(|e| fail(format!("serialization failed: {e}")));

    if let Some(cache) = &cache {
        let stats = cache.stats();
        debug!(hits = stats.hits, misses = stats.misses, "conversion cache");
    }

    match output {
        Some(path) => {
            fs::write(path, result)
                .unwrap_or_else(|e| fail(format!("could not write '{path}': {e}")));
        }
        None => print!("{result}"),
    }
}

/// Handle the normalize command
fn handle_normalize_command(input: &str) {
    let source = read_input(input);
    let nodes = parse_wire_json(&source).unwrap_or_else(|e| fail(e));
    let json = to_wire_json(&normalize(nodes)).unwrap_or_else(|e| fail(e));
    println!("{json}");
}

/// Handle the check command
fn handle_check_command(
    registry: &FormatRegistry,
    input: &str,
    from: &str,
    options: &MarkupOptions,
) {
    let source = read_input(input);
    let report = run_check(registry, &source, from, options).unwrap_or_else(|e| fail(e));

    match report.divergence {
        None => println!("stable"),
        Some(divergence) => fail(format!("round trip diverges at {divergence}")),
    }
}

fn run_check(
    registry: &FormatRegistry,
    source: &str,
    from: &str,
    options: &MarkupOptions,
) -> Result<RoundTripReport, BabelError> {
    if from == "markup" {
        return check_markup(source, options);
    }
    let doc = registry.parse(source, from)?;
    check_document(&doc, options)
}

/// Handle the inspect command
fn handle_inspect_command(
    registry: &FormatRegistry,
    input: &str,
    from: &str,
    view: &str,
    extra_params: &HashMap<String, String>,
    options: &MarkupOptions,
) {
    let source = read_input(input);

    let doc: Document = if from == "markup" {
        match load_for_display(&source, options) {
            Rendered::Tree(doc) => doc,
            Rendered::Raw(text) => {
                eprintln!("Warning: could not load '{input}', showing the stored text");
                print!("{text}");
                return;
            }
        }
    } else {
        registry
            .parse(&source, from)
            .unwrap_or_else(|e| fail(format!("parse failed: {e}")))
    };

    let output = inspect::render_view(&doc, view, options.max_depth, extra_params)
        .unwrap_or_else(|e| fail(e));
    print!("{output}");
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    let registry = FormatRegistry::default();

    println!("Conversion formats:");
    for format_name in registry.list_formats() {
        let description = registry
            .get(&format_name)
            .map(|format| format.description().to_string())
            .unwrap_or_default();
        println!("  {format_name:<12} {description}");
    }

    println!("\nInspection views:");
    for view in inspect::AVAILABLE_VIEWS {
        println!("  {view}");
    }
}

fn load_cli_config(explicit_path: Option<&str>, max_depth: Option<usize>) -> QuillConfig {
    let loader = Loader::new().with_optional_file("quill.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };
    let loader = match max_depth {
        Some(depth) => loader
            .set_override("parser.max_depth", i64::try_from(depth).unwrap_or(i64::MAX))
            .unwrap_or_else(|err| fail(format!("invalid --max-depth: {err}"))),
        None => loader,
    };

    loader
        .build()
        .unwrap_or_else(|err| fail(format!("failed to load configuration: {err}")))
}

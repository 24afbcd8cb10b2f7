// Command-line interface for notemark
//
// This binary converts notes between Markdown and the notemark document model, normalizes
// Markdown the way the editor saves it, and replays typing through the shortcut engine.
//
// The inspect command is an internal tool to look at what a Markdown file imports to.
//
// Converting:
//
// The conversion needs a to and from pair. The from can be auto-detected from the file extension, while being overwrittable by an explicit --from flag.
// Usage:
//  notemark <input> --to <format> [--from <format>] [--output <file>]  - Convert between formats (default)
//  notemark convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above (explicit)
//  notemark format <input>               - Re-export Markdown as the editor would save it
//  notemark inspect <path> [<transform>] - Execute a transform (defaults to "doc-treeviz")
//  notemark type <path|->                - Type the file's text through the shortcut engine
//  notemark --list-formats               - List formats and transforms
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix. Keys matching a configuration setting override
// it; the rest are passed to the format/transform.
// Example:
//  notemark format note.md --extra-bullet '*' --extra-trailing-newline

use notemark_cli::transforms;

use clap::{Arg, ArgAction, Command, ValueHint};
use notemark_babel::formats::markdown::{ExportRules, MarkdownFormat};
use notemark_babel::shortcut::ShortcutRules;
use notemark_babel::transforms::{normalize_markdown_with_rules, replay_keystrokes_with_rules};
use notemark_babel::{FormatRegistry, Note};
use notemark_config::{Loader, NotemarkConfig, PROJECT_CONFIG_FILE};
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &["convert", "format", "inspect", "type", "help"];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut args = args.iter().peekable();

    while let Some(arg) = args.next() {
        let key = arg
            .strip_prefix("--extra-")
            .or_else(|| arg.strip_prefix("--extras-"));
        let Some(key) = key else {
            cleaned_args.push(arg.clone());
            continue;
        };

        // a bare marker character such as `-` or `*` is a value, not a flag
        let value = args
            .next_if(|next| !next.starts_with('-') || next.len() == 1)
            .cloned()
            .unwrap_or_else(|| "true".to_string());
        extra_params.insert(key.to_string(), value);
    }

    (cleaned_args, extra_params)
}

fn input_arg(help: &'static str) -> Arg {
    Arg::new("input")
        .help(help)
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn build_cli() -> Command {
    Command::new("notemark")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert, normalize and inspect Markdown notes")
        .long_about(
            "notemark works with the Markdown files behind a rich-text note editor.\n\n\
            Commands:\n  \
            - convert: Transform between formats (markdown, json, treeviz)\n  \
            - format:  Re-export Markdown the way the editor saves it\n  \
            - inspect: View the document model a file imports to\n  \
            - type:    Replay text through the live shortcut engine\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass format options or override settings.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            notemark note.md --to json                  # Document model as JSON\n  \
            notemark format note.md --extra-bullet '*'  # Normalize with * bullets\n  \
            notemark inspect note.md --extra-show-runs  # Tree with inline runs\n  \
            notemark type keystrokes.txt                # What typing this produces",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats and inspect transforms")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a notemark.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between formats (default command)")
                .long_about(
                    "Convert notes between formats.\n\n\
                    Supported formats:\n  \
                    - markdown: Markdown (.md), read and written\n  \
                    - json:     The document model (.json), read and written\n  \
                    - treeviz:  Tree view (.tree), written only\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\n\
                    Examples:\n  \
                    notemark convert note.md --to json -o note.json  # Markdown to JSON file\n  \
                    notemark convert note.json --to markdown         # And back\n  \
                    notemark note.md --to treeviz                    # 'convert' is optional",
                )
                .arg(input_arg("Input file path"))
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
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
            Command::new("format")
                .about("Re-export a Markdown file as the editor would save it")
                .long_about(
                    "Imports the Markdown file and exports it again with the configured\n\
                    export rules ([export] in notemark.toml).\n\n\
                    Output is always written to stdout.\n\n\
                    Examples:\n  \
                    notemark format note.md              # Format to stdout\n  \
                    notemark format note.md > clean.md   # Redirect to file",
                )
                .arg(input_arg("Input file path")),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect the document model of a Markdown file")
                .arg(
                    Arg::new("path")
                        .help("Path to the Markdown file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply. Defaults to 'doc-treeviz'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("type")
                .about("Type a file's text through the shortcut engine")
                .long_about(
                    "Types the input one character at a time into an empty note, running\n\
                    the block and inline shortcuts after every character, then writes the\n\
                    resulting note. Use '-' to read from stdin.\n\n\
                    Examples:\n  \
                    printf '# Title\\n- **milk**' | notemark type -\n  \
                    notemark type keys.txt --to treeviz",
                )
                .arg(input_arg("Input file path, or '-' for stdin"))
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Output format (defaults to markdown)")
                        .value_hint(ValueHint::Other),
                ),
        )
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("NOTEMARK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();

    // Parse extra-* arguments before clap processing
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    // First, try normal parsing with cleaned args
    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A file as first argument means the convert subcommand was left out
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&cleaned_args[1].as_str())
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

    let mut config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    apply_config_overrides(&mut config, &mut extra_params);

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = required(sub_matches, "input");
            let to = required(sub_matches, "to");
            let registry = registry_from_config(&config);

            // Auto-detect --from if not provided
            let from = match sub_matches.get_one::<String>("from") {
                Some(from) => from.to_string(),
                None => registry
                    .detect_format_from_filename(input)
                    .unwrap_or_else(|| {
                        eprintln!("Error: Could not detect format from filename '{input}'");
                        eprintln!("Please specify --from explicitly");
                        std::process::exit(1);
                    }),
            };

            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(&registry, input, &from, to, output, &extra_params);
        }
        Some(("format", sub_matches)) => {
            let input = required(sub_matches, "input");
            handle_format_command(input, &extra_params, &config);
        }
        Some(("inspect", sub_matches)) => {
            let path = required(sub_matches, "path");
            let transform = sub_matches
                .get_one::<String>("transform")
                .map(|s| s.as_str())
                .unwrap_or(transforms::DEFAULT_TRANSFORM);
            handle_inspect_command(path, transform, &extra_params, &config);
        }
        Some(("type", sub_matches)) => {
            let input = required(sub_matches, "input");
            let to = sub_matches
                .get_one::<String>("to")
                .map(|s| s.as_str())
                .unwrap_or("markdown");
            handle_type_command(input, to, &extra_params, &config);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn required<'a>(matches: &'a clap::ArgMatches, name: &str) -> &'a str {
    match matches.get_one::<String>(name) {
        Some(value) => value.as_str(),
        None => {
            eprintln!("Error: missing required argument '{name}'");
            std::process::exit(2);
        }
    }
}

fn read_input(input: &str) -> String {
    let result = if input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer).map(|_| buffer)
    } else {
        fs::read_to_string(input)
    };
    result.unwrap_or_else(|e| {
        eprintln!("Error reading file '{input}': {e}");
        std::process::exit(1);
    })
}

fn write_output(output: Option<&str>, text: &str) {
    match output {
        Some(path) => fs::write(path, text).unwrap_or_else(|e| {
            eprintln!("Error writing file '{path}': {e}");
            std::process::exit(1);
        }),
        None => print!("{text}"),
    }
}

/// Registry whose Markdown format exports with the configured rules.
fn registry_from_config(config: &NotemarkConfig) -> FormatRegistry {
    let mut registry = FormatRegistry::with_defaults();
    registry.register(MarkdownFormat::with_rules(ExportRules::from(&config.export)));
    registry
}

/// Handle the convert command
fn handle_convert_command(
    registry: &FormatRegistry,
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    extra_params: &HashMap<String, String>,
) {
    // Validate formats exist
    for name in [from, to] {
        if let Err(e) = registry.get(name) {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    let source = read_input(input);
    let note = registry.parse(&source, from).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    });
    debug!(from, to, lines = note.document.len(), "converting");

    let text = registry
        .serialize_with_options(&note, to, extra_params)
        .unwrap_or_else(|e| {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        });
    write_output(output, &terminated(text, to));
}

/// Markdown output keeps the configured trailing newline; other formats end with one.
fn terminated(mut text: String, format: &str) -> String {
    if format != "markdown" && !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// Handle the format command
fn handle_format_command(
    input: &str,
    extra_params: &HashMap<String, String>,
    config: &NotemarkConfig,
) {
    reject_leftover_params(extra_params);
    let source = read_input(input);
    let rules = ExportRules::from(&config.export);
    print!("{}", normalize_markdown_with_rules(&source, &rules));
}

/// Handle the inspect command
fn handle_inspect_command(
    path: &str,
    transform: &str,
    extra_params: &HashMap<String, String>,
    config: &NotemarkConfig,
) {
    let source = read_input(path);
    let params = build_inspect_params(config, extra_params);

    let output = transforms::execute_transform(&source, transform, &params).unwrap_or_else(|e| {
        eprintln!("Execution error: {e}");
        std::process::exit(1);
    });

    print!("{output}");
}

/// Handle the type command
fn handle_type_command(
    input: &str,
    to: &str,
    extra_params: &HashMap<String, String>,
    config: &NotemarkConfig,
) {
    let keystrokes = read_input(input);
    let rules = ShortcutRules::from(&config.shortcuts);
    let document = replay_keystrokes_with_rules(&keystrokes, &rules);
    debug!(lines = document.len(), "replayed keystrokes");

    let registry = registry_from_config(config);
    let text = registry
        .serialize_with_options(&Note::new(document, None), to, extra_params)
        .unwrap_or_else(|e| {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        });
    print!("{}", terminated(text, to));
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    println!("Conversion formats:");
    let registry = FormatRegistry::default();
    for format_name in registry.list_formats() {
        if let Ok(format) = registry.get(&format_name) {
            let direction = match (format.supports_parsing(), format.supports_serialization()) {
                (true, true) => "in/out",
                (true, false) => "in",
                (false, true) => "out",
                (false, false) => "-",
            };
            println!(
                "  {format_name:<10} {direction:<7} {}",
                format.description()
            );
        }
    }

    println!("\nInspect transforms:");
    for transform_name in transforms::AVAILABLE_TRANSFORMS {
        println!("  {transform_name}");
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> NotemarkConfig {
    let loader = Loader::new().with_optional_file(PROJECT_CONFIG_FILE);
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

/// Moves `--extra-*` keys that name a setting into the configuration.
fn apply_config_overrides(config: &mut NotemarkConfig, extra_params: &mut HashMap<String, String>) {
    if let Some(raw) = extra_params.remove("bullet") {
        config.export.unordered_marker = parse_char_arg("bullet", &raw, &['-', '*', '+']);
    }
    if let Some(raw) = extra_params.remove("emphasis") {
        config.export.emphasis_marker = parse_char_arg("emphasis", &raw, &['*', '_']);
    }
    if let Some(raw) = extra_params.remove("list-indent") {
        config.export.list_indent = match raw.parse::<usize>() {
            Ok(indent) if (1..=8).contains(&indent) => indent,
            _ => {
                eprintln!("Invalid value '{raw}' for --extra-list-indent (expected 1 to 8)");
                std::process::exit(1);
            }
        };
    }
    if let Some(raw) = extra_params.remove("trailing-newline") {
        config.export.trailing_newline = parse_bool_arg("trailing-newline", &raw);
    }

    if let Some(raw) = take_override(extra_params, &["block-shortcuts", "block"]) {
        config.shortcuts.block = parse_bool_arg("block-shortcuts", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["inline-shortcuts", "inline"]) {
        config.shortcuts.inline = parse_bool_arg("inline-shortcuts", &raw);
    }
    if let Some(raw) = extra_params.remove("trigger-on-space") {
        config.shortcuts.trigger_on_space = parse_bool_arg("trigger-on-space", &raw);
    }

    if let Some(raw) = extra_params.remove("show-runs") {
        config.inspect.treeviz.show_runs = parse_bool_arg("show-runs", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["show-linum", "show-line-numbers"]) {
        config.inspect.treeviz.show_line_numbers = parse_bool_arg("show-linum", &raw);
    }
}

fn build_inspect_params(
    config: &NotemarkConfig,
    overrides: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut params = config.inspect.treeviz.as_options();
    for (key, value) in overrides {
        params.insert(key.clone(), value.clone());
    }
    params
}

fn reject_leftover_params(extra_params: &HashMap<String, String>) {
    if let Some(key) = extra_params.keys().next() {
        eprintln!("Unknown parameter '--extra-{key}'");
        std::process::exit(1);
    }
}

fn take_override(map: &mut HashMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| map.remove(*key))
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => {
            eprintln!("Invalid boolean value '{other}' for --extra-{flag}");
            std::process::exit(1);
        }
    }
}

fn parse_char_arg(flag: &str, raw: &str, allowed: &[char]) -> char {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if allowed.contains(&ch) => ch,
        _ => {
            eprintln!("Invalid value '{raw}' for --extra-{flag} (expected one of {allowed:?})");
            std::process::exit(1);
        }
    }
}

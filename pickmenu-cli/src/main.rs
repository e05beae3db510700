//! Command-line interface for pickmenu
//! Converts a pick menu CSV export into a nested JSON (or YAML) tree.
//!
//! Usage:
//!   pickmenu [`<input>`] [-o `<output>`] [-c `<config>`]   - Convert using configured paths
//!   pickmenu `<input>` --stdout                            - Print the tree instead of writing it
//!
//! Outcomes are logged to a rotating log file (default `logs/app.log`). A failed
//! conversion still exits with status 0 unless `--strict` is given, so callers
//! must check the log or opt into strict exit codes.

mod logging;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use pickmenu_config::{LoadError, Loader, PickmenuConfig, LOCAL_CONFIG_FILE};
use pickmenu_tree::Converter;
use tracing::{error, info};

/// Exit status for configuration and log sink problems.
const SETUP_ERROR_EXIT_CODE: i32 = 2;

fn main() {
    let matches = Command::new("pickmenu")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Converts a pick menu CSV table into a nested JSON tree")
        .arg(
            Arg::new("input")
                .help("Path to the CSV file (default: paths.input from the configuration)")
                .index(1),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Where to write the tree (default: paths.output from the configuration)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format")
                .value_parser(["json", "yaml"]),
        )
        .arg(
            Arg::new("strategy")
                .long("strategy")
                .help("How deep rows find their parent")
                .value_parser(["active-branch", "exact-path"]),
        )
        .arg(
            Arg::new("indent")
                .long("indent")
                .help("Spaces per JSON indentation level")
                .value_parser(value_parser!(u8)),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Rotating log file (default: logging.file from the configuration)"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help("Log filter, e.g. 'info' or 'pickmenu_tree=trace'"),
        )
        .arg(
            Arg::new("stdout")
                .long("stdout")
                .help("Print the tree to stdout instead of writing the output file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Exit with status 1 when the conversion fails")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    std::process::exit(run(&matches));
}

fn run(matches: &ArgMatches) -> i32 {
    let config = match load_config(matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return SETUP_ERROR_EXIT_CODE;
        }
    };

    let subscriber = match logging::file_subscriber(&config.logging) {
        Ok(subscriber) => subscriber,
        Err(e) => {
            eprintln!("Logging error: {}", e);
            return SETUP_ERROR_EXIT_CODE;
        }
    };

    let to_stdout = matches.get_flag("stdout");
    let succeeded =
        tracing::subscriber::with_default(subscriber, || handle_convert(&config, to_stdout));

    if succeeded || !config.process.strict_exit {
        0
    } else {
        1
    }
}

/// Defaults, then `--config` (or `pickmenu.toml` if present), then flags.
fn load_config(matches: &ArgMatches) -> Result<PickmenuConfig, LoadError> {
    let mut loader = match matches.get_one::<String>("config") {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new().with_optional_file(LOCAL_CONFIG_FILE),
    };

    let string_overrides = [
        ("input", "paths.input"),
        ("output", "paths.output"),
        ("format", "output.format"),
        ("strategy", "build.strategy"),
        ("log-file", "logging.file"),
        ("log-level", "logging.level"),
    ];
    for (arg, key) in string_overrides {
        if let Some(value) = matches.get_one::<String>(arg) {
            loader = loader.set_override(key, value.as_str())?;
        }
    }
    if let Some(indent) = matches.get_one::<u8>("indent") {
        loader = loader.set_override("output.indent", i64::from(*indent))?;
    }
    if matches.get_flag("strict") {
        loader = loader.set_override("process.strict_exit", true)?;
    }

    loader.build()
}

/// Runs one conversion and logs its outcome. Returns whether it succeeded.
fn handle_convert(config: &PickmenuConfig, to_stdout: bool) -> bool {
    let converter = Converter::new(config.convert_options());
    let input = &config.paths.input;

    info!(
        input = %input.display(),
        strategy = %config.build.strategy,
        format = %config.output.format,
        "starting conversion"
    );

    let outcome = if to_stdout {
        converter.render_path(input).map(|(text, summary)| {
            print!("{}", text);
            summary
        })
    } else {
        converter.run(input, &config.paths.output)
    };

    match outcome {
        Ok(summary) => {
            info!(rows = summary.rows, nodes = summary.nodes, "Success");
            true
        }
        Err(e) => {
            error!(error = %e, "conversion failed");
            false
        }
    }
}

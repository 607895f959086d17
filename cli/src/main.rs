mod config;
mod error;
mod render;
mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use log::debug;

use crate::config::Config;
use crate::error::CliError;
use crate::render::Format;

const SUBCOMMANDS: &[&str] = &["parse", "test", "help"];

/// Global flags followed by a separate value argument.
const VALUE_FLAGS: &[&str] = &["--config"];

#[derive(Parser)]
#[command(name = "cook", version, about = "Cooklang recipe parser")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Configuration file (defaults to ./cook.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logging from the parser
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a recipe and print it
    Parse(ParseArgs),

    /// Run a canonical YAML test corpus
    Test(TestArgs),
}

#[derive(clap::Args)]
struct ParseArgs {
    /// Recipe file to parse
    file: String,

    /// Output format (overrides the config file)
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Parse only, print nothing (exit 0 if valid)
    #[arg(long)]
    check: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a corpus .yaml file or a directory containing them
    path: String,

    /// Run only tests whose name contains this text
    #[arg(short, long)]
    filter: Option<String>,

    /// List test names and exit
    #[arg(long)]
    list: bool,
}

fn main() {
    let mut args: Vec<String> = std::env::args().collect();
    inject_parse_subcommand(&mut args);

    let cli = Cli::parse_from(&args);
    init_logging(cli.verbose);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    let no_color = cli.no_color || config.no_color;

    match cli.command {
        Command::Parse(parse_args) => {
            let format = parse_args.format.unwrap_or(config.format);
            do_parse(parse_args, format, no_color);
        }
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list {
                if let Err(e) = test_runner::list_tests(path) {
                    fail(&e);
                }
                return;
            }
            match test_runner::run_tests(path, no_color, test_args.filter.as_deref()) {
                Ok(exit_code) => process::exit(exit_code),
                Err(e) => fail(&e),
            }
        }
    }
}

/// `cook recipe.cook` is shorthand for `cook parse recipe.cook`. The first
/// positional argument decides; the value of `--config <FILE>` is skipped.
fn inject_parse_subcommand(args: &mut Vec<String>) {
    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        if VALUE_FLAGS.contains(&arg) {
            i += 2;
        } else if arg.starts_with('-') {
            i += 1;
        } else {
            if !SUBCOMMANDS.contains(&arg) {
                args.insert(i, "parse".to_string());
            }
            return;
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn fail(error: &CliError) -> ! {
    eprintln!("error: {}", error);
    process::exit(1);
}

fn do_parse(args: ParseArgs, format: Format, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(source) => fail(&CliError::Read {
            path: PathBuf::from(&args.file),
            source,
        }),
    };

    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.clone(), source.clone());

    let parser = cooklang::Parser::with_file_id(file_id);
    let document = match parser.parse_string(&source) {
        Ok(doc) => doc,
        Err(error) => {
            let writer = StandardStream::stderr(color_choice);
            let config = term::Config::default();
            let diagnostic = error.to_diagnostic();
            let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
            process::exit(1);
        }
    };
    debug!("parsed {} into {} sections", args.file, document.sections.len());

    if args.check {
        eprintln!("ok: {} parsed successfully", args.file);
        return;
    }

    match render::render(&document, format) {
        Ok(output) => println!("{}", output),
        Err(e) => fail(&e),
    }
}

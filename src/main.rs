use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, FromArgMatches, Parser};
use tracing_subscriber::EnvFilter;

use i18n_dom::core::{print_error_message, translate_html, TranslateOptions};
use i18n_dom::env::generate_env_docs;
use i18n_dom::i18n::error::{helpers, I18nError, I18nResult};
use i18n_dom::i18n::{ConfigManager, ResourceTable};

/// Translate the text of an HTML document in place using a positional resource table
#[derive(Parser, Debug)]
#[command(name = "i18n-dom", version, about)]
struct Cli {
    /// Input HTML file, `-` reads from stdin
    input: String,

    /// JSON resource table: {"en": [...], "es": [...]}
    #[arg(short = 'r', long, value_name = "FILE")]
    resource: Option<PathBuf>,

    /// Target language
    #[arg(short = 'l', long)]
    language: Option<String>,

    /// Language the document is written in (defaults to <html lang>)
    #[arg(long, value_name = "LANGUAGE")]
    html_language: Option<String>,

    /// Language used when the target is not in the resource table
    #[arg(long, value_name = "LANGUAGE")]
    fallback: Option<String>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Input encoding; a charset declared in the document takes precedence
    #[arg(short = 'e', long)]
    encoding: Option<String>,

    /// Output file, `-` or absent writes to stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<String>,

    /// Only log errors
    #[arg(short = 's', long)]
    silent: bool,
}

fn main() {
    let matches = Cli::command().after_help(generate_env_docs()).get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    if let Err(e) = run(cli) {
        print_error_message(&e.to_string());
        process::exit(1);
    }
}

fn run(cli: Cli) -> I18nResult<()> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::from_path(path)?,
        None => ConfigManager::new()?,
    };
    let mut config = manager.into_config();

    let log_level = if cli.silent { "error" } else { config.log_level.as_str() };
    init_logging(log_level);

    if let Some(language) = cli.language {
        config.language = Some(language);
    }
    if let Some(language) = cli.html_language {
        config.html_language = Some(language);
    }
    if let Some(language) = cli.fallback {
        config.fallback_lng = Some(language);
    }
    if let Some(encoding) = cli.encoding {
        config.encoding = encoding;
    }

    let resource = match cli.resource {
        Some(path) => ResourceTable::from_json_file(path)?,
        None if config.resource.is_some() => config.load_resource()?,
        None => {
            return Err(helpers::config_error(
                "no resource table given, use --resource or set I18N_DOM_RESOURCE",
            ))
        }
    };

    let input = read_input(&cli.input)?;
    let output = translate_html(&input, &resource, &TranslateOptions::from(&config))?;
    tracing::info!(
        language = %output.language,
        translated = output.stats.translated,
        "translation finished"
    );

    write_output(cli.output.as_deref(), &output.data)
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(target: &str) -> I18nResult<Vec<u8>> {
    if target == "-" {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        return Ok(data);
    }

    fs::read(target).map_err(|e| I18nError::from(e).with_context(target))
}

fn write_output(target: Option<&str>, data: &[u8]) -> I18nResult<()> {
    match target {
        None | Some("-") => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
        }
        Some(path) => fs::write(path, data)?,
    }
    Ok(())
}

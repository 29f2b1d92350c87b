//! reportkit CLI - render serialized documents to PDF, spreadsheets, Word, CSV and HTML

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Deserialize;

use reportkit::model::{ItemKind, TableRow};
use reportkit::{
    Document, Formatter, FormatterContext, FormatterFactory, OutputSink, Style, StyleCondition,
};

#[derive(Parser)]
#[command(name = "reportkit")]
#[command(version)]
#[command(about = "Render reportkit documents to PDF, XLSX, XLS, DOCX, DOC, CSV and HTML", long_about = None)]
struct Cli {
    /// Print debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON document to one output format
    Render {
        /// Input document (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output format extension (pdf, xlsx, xls, docx, doc, csv, html)
        #[arg(short, long, default_value = "pdf")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output character encoding
        #[arg(long, env = "REPORTKIT_ENCODING", default_value = "UTF-8")]
        encoding: String,

        /// Locale used for number formatting and fonts
        #[arg(long, env = "REPORTKIT_LOCALE", default_value = "en")]
        locale: String,

        /// CSV field delimiter
        #[arg(long, default_value = ";")]
        delimiter: char,

        /// Style rules (JSON list)
        #[arg(long, value_name = "FILE")]
        styles: Option<PathBuf>,
    },

    /// List supported output formats
    Formats,
}

/// One entry of a `--styles` file.
#[derive(Deserialize)]
struct StyleRule {
    /// Kind the rule applies to
    kind: ItemKind,

    /// Restrict a table row rule to even row indexes
    #[serde(default)]
    even_rows: bool,

    style: Style,
}

impl StyleRule {
    fn into_style(self) -> Style {
        let condition = if self.even_rows {
            StyleCondition::when::<TableRow, _>(|row| row.row_index() % 2 == 0)
        } else {
            StyleCondition::of_kind(self.kind)
        };
        self.style.with_condition(condition)
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    let result = match cli.command {
        Commands::Render {
            input,
            format,
            output,
            encoding,
            locale,
            delimiter,
            styles,
        } => {
            let context = FormatterContext::new()
                .with_encoding(encoding)
                .with_locale(locale)
                .with_delimiter(delimiter);
            cmd_render(
                &input,
                &format,
                output.as_deref(),
                context,
                styles.as_deref(),
            )
        }
        Commands::Formats => cmd_formats(),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_styles(path: &Path) -> Result<Vec<Arc<Style>>, Box<dyn std::error::Error>> {
    let rules: Vec<StyleRule> = serde_json::from_str(&fs::read_to_string(path)?)?;
    Ok(rules
        .into_iter()
        .map(|rule| Arc::new(rule.into_style()))
        .collect())
}

fn cmd_render(
    input: &Path,
    format: &str,
    output: Option<&Path>,
    context: FormatterContext,
    styles: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let document: Document = serde_json::from_str(&fs::read_to_string(input)?)?;
    log::debug!("loaded {} top-level items from {}", document.items.len(), input.display());

    let factory = FormatterFactory::with_defaults();
    let mut formatter = factory.create_formatter(format, context)?;

    if let Some(path) = styles {
        let styles = load_styles(path)?;
        log::debug!("registering {} style rules", styles.len());
        formatter.style_service_mut()?.add_styles(styles);
    }

    match output {
        Some(path) => {
            formatter.set_output(OutputSink::file(path))?;
            let mut holder = formatter.handle(&document)?;
            holder.close()?;
            eprintln!(
                "{} {} ({})",
                "Wrote".green(),
                path.display(),
                holder.media_type()
            );
        }
        None => {
            formatter.set_output(OutputSink::Memory)?;
            let holder = formatter.handle(&document)?;
            let bytes = holder
                .into_bytes()
                .ok_or("formatter produced no in-memory output")?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

fn cmd_formats() -> Result<(), Box<dyn std::error::Error>> {
    let factory = FormatterFactory::with_defaults();
    println!("{}", "Supported formats:".bold());
    for extension in factory.supported_extensions() {
        let formatter = factory.create_formatter(extension, FormatterContext::default())?;
        println!("  {:<6} {}", extension.cyan(), formatter.content_media_type());
    }
    Ok(())
}

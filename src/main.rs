//! # Tagprint CLI
//!
//! Command-line interface for rendering and printing tagged templates.
//!
//! ## Usage
//!
//! ```bash
//! # Render a template as text at 32 columns
//! tagprint render receipt.txt --width 32
//!
//! # Same, using the 58mm paper preset
//! tagprint render receipt.txt --paper 58mm
//!
//! # Inspect the ESC/POS bytes
//! tagprint render receipt.txt --format hex
//!
//! # Print through a configured printer
//! tagprint print receipt.txt --printer printers.json --name kitchen
//!
//! # List configured printers, probing network ones
//! tagprint printers --printer printers.json --check
//! ```
//!
//! Logging goes to stderr; set `RUST_LOG=tagprint=debug` for per-command
//! detail.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;

use tagprint::{
    Document, PrinterDescriptor, TagprintError, TransportKind, create_sink,
    ir::{FsAssets, Planner},
    markup::to_repaired,
    printer::{self, PaperPreset, config::DEFAULT_CHARS_PER_LINE},
    protocol::codepage::Codepage,
    rich::RichDocument,
    sink::{SinkOptions, print_template},
    transport::network,
};

/// Tagprint - tagged receipt templates for thermal printers
#[derive(Parser, Debug)]
#[command(name = "tagprint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a template to stdout
    Render {
        /// Template file, one directive line per line
        template: PathBuf,

        /// Characters per line
        #[arg(long, default_value_t = DEFAULT_CHARS_PER_LINE)]
        width: usize,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Codepage for protocol output
        #[arg(long, default_value_t = 437)]
        codepage: u16,

        /// Raster width in dots for protocol output
        #[arg(long, default_value_t = 576)]
        max_dots: usize,

        /// Paper preset (80mm, 80mm-b, 58mm); overrides --width and --max-dots
        #[arg(long)]
        paper: Option<String>,
    },

    /// Print a template through a configured printer
    Print {
        /// Template file
        template: PathBuf,

        /// Printer configuration (JSON)
        #[arg(long, value_name = "CONFIG")]
        printer: PathBuf,

        /// Printer name (defaults to the first configured)
        #[arg(long)]
        name: Option<String>,

        /// Job timeout in milliseconds (overrides the configuration)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// List configured printers
    Printers {
        /// Printer configuration (JSON)
        #[arg(long, value_name = "CONFIG")]
        printer: PathBuf,

        /// Try to connect to each network printer
        #[arg(long)]
        check: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Flattened plain text
    Text,
    /// Repaired HTML page
    Html,
    /// Hex dump of the protocol bytes
    Hex,
    /// Raw protocol bytes
    Bytes,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tagprint=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), TagprintError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            template,
            width,
            format,
            codepage,
            mut max_dots,
            paper,
        } => {
            let mut width = width;
            if let Some(name) = paper {
                let preset = PaperPreset::by_name(&name).ok_or_else(|| {
                    TagprintError::Config(format!("unknown paper preset: {}", name))
                })?;
                width = preset.chars_per_line;
                max_dots = preset.max_dots;
            }
            let lines = read_template(&template)?;
            let doc = Document::build(&lines, width);
            report_diagnostics(&doc);

            match format {
                OutputFormat::Text => println!("{}", doc.flatten()),
                OutputFormat::Html => {
                    let repaired = to_repaired(&doc);
                    let title = template
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    print!("{}", RichDocument::from_markup(&repaired.root).to_html(&title));
                }
                OutputFormat::Hex | OutputFormat::Bytes => {
                    let assets = FsAssets::new(asset_root(&template));
                    let plan = Planner::new(Codepage::from_id(codepage), max_dots, &assets).plan(&doc);
                    let job = plan.encode();
                    for skipped in plan.skipped.iter().chain(&job.skipped) {
                        warn!(%skipped, "directive skipped");
                    }
                    let bytes = job.to_bytes();
                    let mut stdout = std::io::stdout().lock();
                    if format == OutputFormat::Bytes {
                        stdout.write_all(&bytes)?;
                    } else {
                        stdout.write_all(hex_dump(&bytes).as_bytes())?;
                    }
                    stdout.flush()?;
                }
            }
        }

        Commands::Print {
            template,
            printer,
            name,
            timeout_ms,
        } => {
            let printers = PrinterDescriptor::from_json_file(&printer)?;
            let mut descriptor = printer::select(&printers, name.as_deref())?.clone();
            if let Some(ms) = timeout_ms {
                descriptor.timeout_ms = ms;
            }

            let options = SinkOptions {
                asset_root: asset_root(&template),
                ..Default::default()
            };
            let sink = create_sink(&descriptor, &options)?;
            let lines = read_template(&template)?;
            let report = print_template(sink.as_ref(), &lines).await?;
            for skipped in &report.skipped {
                warn!(%skipped, "directive skipped");
            }
            eprintln!(
                "Sent {} bytes to {} ({})",
                report.bytes, report.destination, descriptor.name
            );
        }

        Commands::Printers { printer, check } => {
            let printers = PrinterDescriptor::from_json_file(&printer)?;
            println!(
                "{:<16} {:<9} {:>5} {:>5} {:>5} {:<7}  ADDRESS",
                "NAME", "TRANSPORT", "CHARS", "CP", "DOTS", "STATUS"
            );
            for p in &printers {
                let status = if check && p.transport == TransportKind::Network {
                    let online = network::is_online(p.address.trim(), p.timeout()).await;
                    if online { "online" } else { "offline" }
                } else {
                    "-"
                };
                println!(
                    "{:<16} {:<9} {:>5} {:>5} {:>5} {:<7}  {}",
                    p.name, p.transport, p.chars_per_line, p.codepage, p.max_dots, status, p.address
                );
            }
        }
    }

    Ok(())
}

fn read_template(path: &Path) -> Result<Vec<String>, TagprintError> {
    let text = std::fs::read_to_string(path)?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Bitmaps are resolved next to the template.
fn asset_root(template: &Path) -> PathBuf {
    template
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn report_diagnostics(doc: &Document) {
    for diagnostic in doc.diagnostics() {
        warn!(%diagnostic, "layout issue");
    }
}

/// 16 bytes per row with an offset column.
fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(16).enumerate() {
        out.push_str(&format!("{:08x}  ", row * 16));
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
        out.push_str(&hex.join(" "));
        out.push('\n');
    }
    out
}

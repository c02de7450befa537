//! docshift CLI - table-preserving document conversion

mod server;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docshift::{
    ConversionKind, ConvertOptions, Converter, ExtractOptions, HeaderPolicy, Orientation,
};

#[derive(Parser)]
#[command(name = "docshift")]
#[command(version)]
#[command(about = "Convert tables between PDF, DOCX, PPTX and XLSX", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document
    Convert {
        /// Input document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Conversion kind, e.g. "pdf to excel" (see `docshift kinds`)
        #[arg(short, long)]
        kind: String,

        /// Output file (next to the input if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Page orientation of PDF output
        #[arg(long, value_enum, default_value = "portrait")]
        orientation: OrientationArg,

        /// Treat the first table row as data, not as a header
        #[arg(long)]
        no_header: bool,

        /// Skip unreadable pages instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// List the supported conversion kinds
    Kinds,

    /// Print the tables of a document as JSON
    Inspect {
        /// Input document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Serve conversions over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, env = "DOCSHIFT_BIND", default_value = "127.0.0.1:8000")]
        bind: String,

        /// Directory for uploads and produced files (OS temp dir if not specified)
        #[arg(long, env = "DOCSHIFT_WORK_DIR", value_name = "DIR")]
        work_dir: Option<PathBuf>,

        /// Maximum upload size in megabytes
        #[arg(long, env = "DOCSHIFT_MAX_UPLOAD_MB", default_value_t = 50)]
        max_upload_mb: usize,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Orientation::Portrait,
            OrientationArg::Landscape => Orientation::Landscape,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            kind,
            output,
            orientation,
            no_header,
            lenient,
        } => cmd_convert(
            &input,
            &kind,
            output.as_deref(),
            orientation,
            no_header,
            lenient,
        ),
        Commands::Kinds => {
            cmd_kinds();
            Ok(())
        }
        Commands::Inspect {
            input,
            output,
            compact,
        } => cmd_inspect(&input, output.as_deref(), compact),
        Commands::Serve {
            bind,
            work_dir,
            max_upload_mb,
        } => cmd_serve(bind, work_dir, max_upload_mb),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_convert(
    input: &Path,
    kind: &str,
    output: Option<&Path>,
    orientation: OrientationArg,
    no_header: bool,
    lenient: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let kind: ConversionKind = kind.parse()?;

    let mut extract = ExtractOptions::new();
    if no_header {
        extract = extract.with_header(HeaderPolicy::None);
    }
    if lenient {
        extract = extract.lenient();
    }
    let options = ConvertOptions::new()
        .with_orientation(orientation.into())
        .with_extract_options(extract);

    let destination = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension(kind.target().extension()));

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Converting {} ({})...", input.display(), kind));

    let work_dir = tempfile::tempdir()?;
    let converter = Converter::new(work_dir.path()).with_options(options);
    let produced = match converter.convert(kind, input) {
        Ok(path) => path,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };
    fs::copy(&produced, &destination)?;

    pb.finish_and_clear();
    println!("{} {}", "Saved to".green(), destination.display());
    Ok(())
}

fn cmd_kinds() {
    println!("{}", "Supported conversions".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for kind in ConversionKind::ALL {
        let aliases = &kind.names()[1..];
        if aliases.is_empty() {
            println!("  {}", kind.as_str().bold());
        } else {
            println!(
                "  {} {}",
                kind.as_str().bold(),
                format!("(also: {})", aliases.join(", ")).dimmed()
            );
        }
    }
}

fn cmd_inspect(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (format, workbook) = docshift::inspect(input)?;
    let json = workbook.to_json(!compact)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!(
            "{} {} ({}, {} tables)",
            "Saved to".green(),
            path.display(),
            format,
            workbook.sheet_count()
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_serve(
    bind: String,
    work_dir: Option<PathBuf>,
    max_upload_mb: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let work_dir = work_dir.unwrap_or_else(std::env::temp_dir);
    fs::create_dir_all(&work_dir)?;

    let config = server::ServerConfig {
        work_dir,
        max_upload_bytes: max_upload_mb * 1024 * 1024,
    };

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(bind.as_str()).await?;
        println!("{} http://{}", "Listening on".green(), bind);
        axum::serve(listener, server::router(config)).await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

use clap::{Parser, Subcommand, ValueEnum};
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use strait_core::{round_trip, CompressionAlgorithm, Frame, FrameConfig, Literal, LiteralAdapter};
use strait_sql::{LowerContext, SqlAdapter};

#[derive(Parser)]
#[command(name = "strait")]
#[command(about = "Typed literals for portable query plans")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON list of literals into a frame file
    Encode {
        /// Input JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output frame file
        #[arg(short, long)]
        output: PathBuf,

        /// Payload compression
        #[arg(long, value_enum, default_value_t = Compression::Zstd)]
        compression: Compression,

        /// Zstd level (1-22)
        #[arg(long, default_value_t = 3)]
        level: i32,
    },
    /// Decode a frame file back into JSON
    Decode {
        /// Input frame file
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSON file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the header and literals of a frame or JSON file
    Info {
        /// Input file
        file: PathBuf,
    },
    /// Lower every literal into the SQL model and lift it back
    Check {
        /// Input file
        file: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Compression {
    None,
    Zstd,
}

/// JSON file layout: a bare list of literals
#[derive(Serialize, Deserialize, Debug)]
#[serde(transparent)]
struct JsonLiterals {
    literals: Vec<Literal>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Encode {
            input,
            output,
            compression,
            level,
        } => {
            encode_file(input, output, frame_config(*compression, *level)?)?;
        }
        Commands::Decode { input, output } => {
            decode_file(input, output.as_deref())?;
        }
        Commands::Info { file } => {
            show_info(file)?;
        }
        Commands::Check { file } => {
            check_file(file)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn frame_config(compression: Compression, level: i32) -> Result<FrameConfig> {
    let compression = match compression {
        Compression::None => CompressionAlgorithm::None,
        Compression::Zstd => {
            if !(1..=22).contains(&level) {
                eyre::bail!("zstd level must be between 1 and 22, got {level}");
            }
            CompressionAlgorithm::Zstd { level }
        }
    };
    Ok(FrameConfig { compression })
}

fn is_frame_file(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("strait")
}

fn read_json(path: &Path) -> Result<Vec<Literal>> {
    let content =
        fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    let json: JsonLiterals = serde_json::from_str(&content)
        .wrap_err_with(|| format!("parsing literals from {}", path.display()))?;
    Ok(json.literals)
}

/// Literals from either a `.strait` frame or a JSON list
fn read_literals(path: &Path) -> Result<Vec<Literal>> {
    if is_frame_file(path) {
        let bytes = fs::read(path).wrap_err_with(|| format!("reading {}", path.display()))?;
        Ok(Frame::from_bytes(&bytes)?.into_literals())
    } else {
        read_json(path)
    }
}

fn encode_file(input: &Path, output: &Path, config: FrameConfig) -> Result<()> {
    println!("Encoding {} -> {}", input.display(), output.display());

    let literals = read_json(input)?;
    let count = literals.len();
    tracing::debug!(count, ?config, "encoding frame");
    let frame = Frame::new(literals);

    let mut file = fs::File::create(output)?;
    let header = frame.write_to(&mut file, &config)?;
    println!(
        "Encoded {} literals ({} bytes, {} after compression)",
        count, header.uncompressed_size, header.compressed_size
    );
    Ok(())
}

fn decode_file(input: &Path, output: Option<&Path>) -> Result<()> {
    let mut file = fs::File::open(input)?;
    let (_, frame) = Frame::read_from(&mut file)?;
    let json = serde_json::to_string_pretty(&JsonLiterals {
        literals: frame.into_literals(),
    })?;

    match output {
        Some(path) => {
            fs::write(path, json)?;
            println!("Decoded {} -> {}", input.display(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn compression_name(compression: &CompressionAlgorithm) -> String {
    match compression {
        CompressionAlgorithm::None => "none".to_string(),
        CompressionAlgorithm::Zstd { level } => format!("zstd (level {level})"),
    }
}

fn show_info(file: &Path) -> Result<()> {
    println!("File info for: {}", file.display());

    let literals = if is_frame_file(file) {
        let mut handle = fs::File::open(file)?;
        let (header, frame) = Frame::read_from(&mut handle)?;

        println!("Format: Frame (.strait)");
        println!("Compression: {}", compression_name(&header.compression));
        println!("Uncompressed size: {} bytes", header.uncompressed_size);
        println!("Compressed size: {} bytes", header.compressed_size);
        frame.into_literals()
    } else {
        println!("Format: JSON");
        read_json(file)?
    };

    println!("Literal count: {}", literals.len());
    for (i, literal) in literals.iter().enumerate() {
        println!("Literal {}: {} = {}", i, literal.ty(), literal);
    }

    Ok(())
}

fn check_file(file: &Path) -> Result<()> {
    println!("Checking {} against the SQL literal model", file.display());

    let literals = read_literals(file)?;
    tracing::debug!(count = literals.len(), "loaded literals");
    let adapter = SqlAdapter;
    let context = LowerContext::new();
    let mut exact = 0;
    let mut lossy = 0;
    let mut failed = 0;

    for (i, literal) in literals.iter().enumerate() {
        match round_trip(&adapter, literal, &context) {
            Ok(back) if &back == literal => {
                exact += 1;
                println!("Literal {}: PASS", i);
            }
            Ok(back) => {
                lossy += 1;
                let host = adapter.lower(literal, &context)?;
                println!("Literal {}: LOSSY - {} became {} via {}", i, literal, back, host);
            }
            Err(e) => {
                failed += 1;
                println!("Literal {}: FAIL ({:?}) - {}", i, e.kind(), e);
            }
        }
    }

    println!(
        "Roundtrip summary: {} exact, {} lossy, {} failed",
        exact, lossy, failed
    );
    Ok(())
}

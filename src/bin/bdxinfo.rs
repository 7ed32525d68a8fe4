//! BDX song metadata as JSON

use bdx2midi::bdx::{BdxReader, SongInfo};
use clap::Parser;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bdxinfo")]
#[command(version = "0.1.0")]
#[command(about = "Print BDX song metadata as JSON", long_about = None)]
struct Args {
    /// Input BDX file
    input: PathBuf,

    /// Output JSON file (writes to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output compact JSON (default is pretty-printed)
    #[arg(short, long)]
    compact: bool,
}

fn main() -> Result<(), bdx2midi::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let data = fs::read(&args.input)?;
    let reader = BdxReader::new(&data)?;
    let info = SongInfo::read(&reader)?;

    let json = if args.compact {
        serde_json::to_string(&info)?
    } else {
        serde_json::to_string_pretty(&info)?
    };

    match args.output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(json.as_bytes())?;
            file.write_all(b"\n")?;
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

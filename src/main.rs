use bdx2midi::midi::OverflowPolicy;
use bdx2midi::{ConvertOptions, Converter};
use clap::Parser;
use midly::{MetaMessage, MidiMessage, Smf, TrackEventKind};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bdx2midi")]
#[command(version = "0.1.0")]
#[command(about = "BDX song to Standard MIDI File converter", long_about = None)]
struct Args {
    /// Input BDX file
    input: PathBuf,

    /// Output MIDI file (defaults to the input path with a .mid extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a zero delta instead of failing when a delta time overflows
    #[arg(long)]
    lossy_deltas: bool,

    /// Print the note count of every track after converting
    #[arg(short, long)]
    summary: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), bdx2midi::Error> {
    let args = Args::parse();
    init_logging(args.verbose);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("mid"));

    let overflow = if args.lossy_deltas {
        OverflowPolicy::Substitute
    } else {
        OverflowPolicy::Fail
    };
    let converter = Converter::with_options(ConvertOptions { overflow });
    converter.convert_file(&args.input, &output)?;

    if args.summary {
        print_summary(&fs::read(&output)?)?;
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

/// Read the written file back and report what each track holds
fn print_summary(midi: &[u8]) -> Result<(), bdx2midi::Error> {
    let smf = Smf::parse(midi)?;
    println!(
        "{:?}, {} tracks, {:?}",
        smf.header.format,
        smf.tracks.len(),
        smf.header.timing
    );

    for (i, track) in smf.tracks.iter().enumerate() {
        let notes = track
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    TrackEventKind::Midi {
                        message: MidiMessage::NoteOn { .. },
                        ..
                    }
                )
            })
            .count();
        let tempos = track
            .iter()
            .filter(|e| matches!(e.kind, TrackEventKind::Meta(MetaMessage::Tempo(_))))
            .count();
        if tempos > 0 {
            println!("track {:2}: {} tempo changes", i, tempos);
        } else {
            println!("track {:2}: {} notes", i, notes);
        }
    }

    Ok(())
}

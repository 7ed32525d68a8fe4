//! BDX to SMF conversion
//!
//! A [`Converter`] validates the song, writes the conductor track, then
//! renders the eight part slots in order. Each part contributes one track
//! (silent and monophonic parts), two (drum parts) or six (chord parts).

pub mod chord;
pub mod drum;
pub mod envelope;
pub mod instrument;
pub mod tempo;
pub mod timeline;

use crate::bdx::header::{PART_COUNT, STEP_COUNT};
use crate::bdx::{BdxReader, ChordStyle, Part, PartKind};
use crate::error::Result;
use crate::midi::track::{assemble, OverflowPolicy, TrackChunk, DRUM_CHANNEL};
use crate::midi::SmfWriter;
use chord::{ChordSymbol, CustomShapes, GuitarShape, PianoVoicing, Voicing, STRING_COUNT};
use drum::DrumKit;
use envelope::VolumeCurve;
use std::fs;
use std::path::Path;
use timeline::{expand, Step};
use tracing::{debug, info};

/// Nibble value that starts a triplet group in drum steps
const DRUM_TRIPLET: u8 = 0x0F;

/// Conversion settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Handling of delta times that do not fit in a VLQ
    pub overflow: OverflowPolicy,
}

/// BDX to Standard MIDI File converter
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Convert a BDX song to SMF bytes
    pub fn convert(&self, data: &[u8]) -> Result<Vec<u8>> {
        let reader = BdxReader::new(data)?;
        Conversion::new(reader, self.options).run()
    }

    /// Convert the BDX file at `input` and write the SMF to `output`
    pub fn convert_file(&self, input: &Path, output: &Path) -> Result<()> {
        let data = fs::read(input)?;
        let midi = self.convert(&data)?;
        fs::write(output, &midi)?;
        info!(
            input = %input.display(),
            output = %output.display(),
            bytes = midi.len(),
            "wrote MIDI file"
        );
        Ok(())
    }
}

/// Number of tracks a song with these part kinds produces
pub fn track_count(kinds: &[PartKind]) -> usize {
    1 + kinds.iter().map(PartKind::track_count).sum::<usize>()
}

/// State of one conversion call
struct Conversion<'a> {
    reader: BdxReader<'a>,
    options: ConvertOptions,
    /// Loaded by the first custom guitar part; later parts see the last load
    custom_shapes: CustomShapes,
}

impl<'a> Conversion<'a> {
    fn new(reader: BdxReader<'a>, options: ConvertOptions) -> Self {
        Self {
            reader,
            options,
            custom_shapes: CustomShapes::default(),
        }
    }

    fn run(mut self) -> Result<Vec<u8>> {
        let mut smf = SmfWriter::new();

        let changes = tempo::read_tempo_changes(&self.reader)?;
        debug!(changes = changes.len(), "tempo table");
        smf.push(tempo::tempo_track(&changes, self.options.overflow)?);

        let mut kinds = Vec::with_capacity(PART_COUNT);
        for index in 0..PART_COUNT {
            let part = Part::read(&self.reader, index)?;
            for chunk in self.render_part(&part)? {
                smf.push(chunk);
            }
            kinds.push(part.kind);
        }

        let tracks = smf.track_count();
        debug_assert_eq!(tracks, track_count(&kinds));
        let midi = smf.finish();
        info!(tracks, bytes = midi.len(), "converted song");
        Ok(midi)
    }

    fn render_part(&mut self, part: &Part<'a>) -> Result<Vec<TrackChunk>> {
        debug!(
            part = part.index,
            instrument = part.instrument,
            kind = ?part.kind,
            steps = part.steps.len(),
            "rendering part"
        );

        match part.kind {
            PartKind::Silent => Ok(vec![TrackChunk::empty()]),
            PartKind::Monophonic => self.render_monophonic(part).map(|chunk| vec![chunk]),
            PartKind::Drum => self.render_drum(part),
            PartKind::Chord(style) => self.render_chord(part, style),
        }
    }

    fn render_monophonic(&self, part: &Part<'a>) -> Result<TrackChunk> {
        let curve = VolumeCurve::read(&self.reader, part.index)?;
        let events = expand(part.steps.len(), part.volume, &curve, |i| {
            Step::from_code(part.steps[i])
        });
        let program = instrument::program_for(part.instrument);
        assemble(part.channel(), Some(program), &events, self.options.overflow)
    }

    /// High nibbles go to the first track, low nibbles to the second
    fn render_drum(&self, part: &Part<'a>) -> Result<Vec<TrackChunk>> {
        let curve = VolumeCurve::read(&self.reader, part.index)?;
        let kit = DrumKit::from_instrument(part.instrument);
        debug!(part = part.index, kit = kit.name(), "drum kit");

        [4, 0]
            .into_iter()
            .map(|shift| {
                let events = expand(part.steps.len(), part.volume, &curve, |i| {
                    drum_step(kit, (part.steps[i] >> shift) & 0x0F)
                });
                assemble(DRUM_CHANNEL, None, &events, self.options.overflow)
            })
            .collect()
    }

    fn render_chord(&mut self, part: &Part<'a>, style: ChordStyle) -> Result<Vec<TrackChunk>> {
        if matches!(style, ChordStyle::Guitar { custom: true }) {
            self.custom_shapes = chord::read_custom_shapes(&self.reader)?;
            debug!(part = part.index, "loaded custom guitar shapes");
        }

        let curve = VolumeCurve::read(&self.reader, part.index)?;
        let chords = chord::read_chord_track(&self.reader, STEP_COUNT)?;
        let matrix = self.chord_matrix(part, style, &chords)?;
        let program = instrument::program_for(part.instrument);

        (0..STRING_COUNT)
            .map(|string| {
                let events = expand(matrix.len(), part.volume, &curve, |i| matrix[i][string]);
                assemble(part.channel(), Some(program), &events, self.options.overflow)
            })
            .collect()
    }

    /// What each string does at each step
    fn chord_matrix(
        &self,
        part: &Part<'a>,
        style: ChordStyle,
        chords: &[ChordSymbol],
    ) -> Result<Vec<[Step; STRING_COUNT]>> {
        let piano = match style {
            ChordStyle::Piano => Some(PianoVoicing::read(&self.reader)?),
            ChordStyle::Guitar { .. } => None,
        };

        part.steps
            .iter()
            .enumerate()
            .map(|(i, &code)| {
                Ok(match code {
                    0x00 => [Step::Sound(0); STRING_COUNT],
                    0x01..=0x7F => {
                        let symbol = chords.get(i).copied().unwrap_or(ChordSymbol::UNSET);
                        self.voice(piano.as_ref(), symbol)?.map(Step::Sound)
                    }
                    0xFF => [Step::Triplet; STRING_COUNT],
                    _ => [Step::Hold; STRING_COUNT],
                })
            })
            .collect()
    }

    fn voice(&self, piano: Option<&PianoVoicing>, symbol: ChordSymbol) -> Result<Voicing> {
        Ok(match (piano, symbol.custom_index()) {
            (Some(_), Some(index)) => chord::piano_custom(&self.reader, index)?,
            (Some(piano), None) => piano.voice(symbol),
            (None, Some(index)) => self
                .custom_shapes
                .get(index)
                .map_or([0; STRING_COUNT], GuitarShape::voicing),
            (None, None) => GuitarShape::standard(symbol).voicing(),
        })
    }
}

/// Step meaning of one drum nibble
fn drum_step(kit: DrumKit, nibble: u8) -> Step {
    if nibble == DRUM_TRIPLET {
        Step::Triplet
    } else {
        Step::Sound(kit.note_for_nibble(nibble))
    }
}

//! Integration tests for BDX conversion
//!
//! These tests build synthetic BDX songs, convert them, and read the result
//! back with midly.

use bdx2midi::bdx::header::{offset, BDX_MAGIC, PART_COUNT};
use bdx2midi::bdx::{BdxReader, SongInfo};
use bdx2midi::midi::OverflowPolicy;
use bdx2midi::{ConvertOptions, Converter, Error};
use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use tempfile::tempdir;

const EMPTY_TRACK: [u8; 12] = [
    0x4D, 0x54, 0x72, 0x6B, 0x00, 0x00, 0x00, 0x04, 0x00, 0xFF, 0x2F, 0x00,
];

/// Builder for synthetic BDX songs (one bar of 4/4 = 16 steps)
struct Song {
    data: Vec<u8>,
}

impl Song {
    fn new() -> Self {
        let mut data = vec![0u8; 0x8000];
        data[offset::MAGIC..offset::MAGIC + 12].copy_from_slice(BDX_MAGIC);
        data[offset::BARS] = 1;
        data[offset::BEATS] = 4;
        let mut song = Self { data };
        song.put_u16(offset::TEMPO_TABLE, 0xFFFF);
        for p in 0..PART_COUNT {
            song.put_u16(offset::volume_table(p), 0xFFFF);
        }
        song
    }

    fn put_u16(&mut self, at: usize, value: u16) {
        self.data[at..at + 2].copy_from_slice(&value.to_le_bytes());
    }

    fn part(mut self, index: usize, instrument: u8, part_type: u8) -> Self {
        let record = offset::part(index);
        self.data[record + offset::PART_VOLUME] = 0x7F;
        self.data[record + offset::PART_INSTRUMENT] = instrument;
        self.data[record + offset::PART_TYPE] = part_type;
        self
    }

    /// Set the first steps of a part; the remaining steps hold
    fn steps(mut self, index: usize, steps: &[u8]) -> Self {
        let base = offset::steps(index);
        self.data[base..base + 16].fill(0x80);
        self.data[base..base + steps.len()].copy_from_slice(steps);
        self
    }

    fn tempo(mut self, changes: &[(u16, u16)]) -> Self {
        for (i, &(tick, bpm)) in changes.iter().enumerate() {
            let record = offset::TEMPO_TABLE + i * offset::TEMPO_STRIDE;
            self.put_u16(record, tick);
            self.put_u16(record + 2, bpm);
        }
        self.put_u16(offset::TEMPO_TABLE + changes.len() * offset::TEMPO_STRIDE, 0xFFFF);
        self
    }

    fn volume(mut self, part: usize, changes: &[(u16, u8)]) -> Self {
        let base = offset::volume_table(part);
        for (i, &(tick, level)) in changes.iter().enumerate() {
            let record = base + i * offset::VOLUME_STRIDE;
            self.put_u16(record, tick);
            self.data[record + offset::VOLUME_VALUE] = level;
        }
        self.put_u16(base + changes.len() * offset::VOLUME_STRIDE, 0xFFFF);
        self
    }

    fn chords(mut self, changes: &[(u16, u16)]) -> Self {
        self.data[offset::CHORD_COUNT] = changes.len() as u8;
        for (i, &(tick, symbol)) in changes.iter().enumerate() {
            let record = offset::CHORD_TABLE + i * offset::CHORD_STRIDE;
            self.put_u16(record, tick);
            self.put_u16(record + 2, symbol);
        }
        self
    }

    fn voicing(mut self, ceiling: u8, mode: u8) -> Self {
        self.data[offset::VOICING_CEILING] = ceiling;
        self.data[offset::VOICING_MODE] = mode;
        self
    }

    fn custom_guitar(mut self, index: usize, word: u32) -> Self {
        let at = offset::GUITAR_CUSTOM_CHORDS + index * 4;
        self.data[at..at + 4].copy_from_slice(&word.to_le_bytes());
        self
    }

    fn custom_piano(mut self, index: usize, notes: [u8; 4]) -> Self {
        let at = offset::PIANO_CUSTOM_CHORDS + index * 4;
        self.data[at..at + 4].copy_from_slice(&notes);
        self
    }

    fn title(mut self, line: usize, text: &str) -> Self {
        let at = offset::TITLE_LINES[line];
        self.data[at..at + text.len()].copy_from_slice(text.as_bytes());
        self
    }

    fn convert(&self) -> Vec<u8> {
        Converter::new().convert(&self.data).expect("Conversion failed")
    }
}

/// Event with its absolute tick
struct Event<'a> {
    tick: u64,
    kind: TrackEventKind<'a>,
}

/// Events of every track, read back with midly
fn parse_tracks(midi: &[u8]) -> Vec<Vec<Event<'_>>> {
    let smf = Smf::parse(midi).expect("Failed to parse MIDI");
    smf.tracks
        .into_iter()
        .map(|track| {
            let mut tick = 0u64;
            track
                .into_iter()
                .map(|e| {
                    tick += e.delta.as_int() as u64;
                    Event { tick, kind: e.kind }
                })
                .collect()
        })
        .collect()
}

/// (tick, key) of every note-on
fn note_ons(events: &[Event]) -> Vec<(u64, u8)> {
    events
        .iter()
        .filter_map(|e| match e.kind {
            TrackEventKind::Midi {
                message: MidiMessage::NoteOn { key, .. },
                ..
            } => Some((e.tick, key.as_int())),
            _ => None,
        })
        .collect()
}

/// (tick, key) of every note-off
fn note_offs(events: &[Event]) -> Vec<(u64, u8)> {
    events
        .iter()
        .filter_map(|e| match e.kind {
            TrackEventKind::Midi {
                message: MidiMessage::NoteOff { key, .. },
                ..
            } => Some((e.tick, key.as_int())),
            _ => None,
        })
        .collect()
}

/// Velocity of every note-on
fn velocities(events: &[Event]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e.kind {
            TrackEventKind::Midi {
                message: MidiMessage::NoteOn { vel, .. },
                ..
            } => Some(vel.as_int()),
            _ => None,
        })
        .collect()
}

/// (channel, program) of every program change
fn programs(events: &[Event]) -> Vec<(u8, u8)> {
    events
        .iter()
        .filter_map(|e| match e.kind {
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange { program },
            } => Some((channel.as_int(), program.as_int())),
            _ => None,
        })
        .collect()
}

/// (tick, µs per quarter) of every tempo event
fn tempos(events: &[Event]) -> Vec<(u64, u32)> {
    events
        .iter()
        .filter_map(|e| match e.kind {
            TrackEventKind::Meta(MetaMessage::Tempo(t)) => Some((e.tick, t.as_int())),
            _ => None,
        })
        .collect()
}

/// First note of each track in `tracks`
fn first_keys(tracks: &[Vec<Event>]) -> Vec<Option<u8>> {
    tracks
        .iter()
        .map(|t| note_ons(t).first().map(|&(_, key)| key))
        .collect()
}

/// Split an SMF into raw chunks, checking each declared length
fn chunks(midi: &[u8]) -> Vec<&[u8]> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < midi.len() {
        let len = u32::from_be_bytes([midi[pos + 4], midi[pos + 5], midi[pos + 6], midi[pos + 7]]);
        let end = pos + 8 + len as usize;
        assert!(end <= midi.len(), "chunk at {pos} overruns the file");
        out.push(&midi[pos..end]);
        pos = end;
    }
    out
}

#[test]
fn test_invalid_header() {
    let mut data = Song::new().data;
    data[offset::MAGIC] = b'X';
    let err = Converter::new().convert(&data).unwrap_err();
    assert!(matches!(err, Error::InvalidHeader { .. }));
}

#[test]
fn test_truncated_song() {
    let data = Song::new().data[..0x300].to_vec();
    let err = Converter::new().convert(&data).unwrap_err();
    assert!(matches!(err, Error::Truncated { .. }));
}

#[test]
fn test_monophonic_triplet() {
    let midi = Song::new()
        .tempo(&[(0, 120)])
        .part(0, 0x03, 0)
        .steps(0, &[60, 0xFF, 64])
        .convert();

    let tracks = parse_tracks(&midi);
    assert_eq!(tracks.len(), 9);

    assert_eq!(tempos(&tracks[0]), vec![(0, 500_000)]);
    assert!(matches!(
        tracks[0][0].kind,
        TrackEventKind::Meta(MetaMessage::Text(text)) if text == b"bdx2m1d1"
    ));

    // The triplet offset of -3 units moves the second note back a whole
    // step, from 240 to 120 ticks
    let melody = &tracks[1];
    assert_eq!(programs(melody), vec![(0, 0x11)]);
    assert_eq!(note_ons(melody), vec![(0, 60), (120, 64)]);
    assert_eq!(note_offs(melody), vec![(120, 60), (240, 64)]);
}

#[test]
fn test_silent_parts_are_empty_tracks() {
    let midi = Song::new().steps(0, &[60, 62, 64]).convert();
    let chunks = chunks(&midi);
    assert_eq!(chunks.len(), 1 + 1 + PART_COUNT);
    for chunk in &chunks[2..] {
        assert_eq!(*chunk, &EMPTY_TRACK[..]);
    }
}

#[test]
fn test_chunk_lengths() {
    let midi = Song::new()
        .tempo(&[(0, 120), (24, 90)])
        .part(0, 0x03, 0)
        .steps(0, &[60, 0, 62, 0xFF, 64, 65, 66, 67])
        .part(1, 0x2A, 1)
        .steps(1, &[0x12, 0x00, 0x34])
        .part(2, 0x08, 4)
        .steps(2, &[0x01])
        .chords(&[(0, 0x0000)])
        .convert();

    assert_eq!(&midi[0..4], b"MThd");
    let count = u16::from_be_bytes([midi[10], midi[11]]) as usize;
    let chunks = chunks(&midi);
    assert_eq!(chunks.len(), count + 1);
    assert_eq!(count, 1 + 1 + 2 + 6 + 5);
    for chunk in &chunks[1..] {
        assert_eq!(&chunk[0..4], b"MTrk");
        assert_eq!(&chunk[chunk.len() - 3..], &[0xFF, 0x2F, 0x00]);
    }
}

#[test]
fn test_drum_nibbles_split_tracks() {
    let midi = Song::new()
        .part(1, 0x2A, 1)
        .steps(1, &[0x12, 0x80, 0x80])
        .convert();
    let tracks = parse_tracks(&midi);
    assert_eq!(tracks.len(), 10);

    // High nibble B (kick), low nibble A (snare), both on the percussion channel
    for (track, key) in [(&tracks[2], 0x23), (&tracks[3], 0x26)] {
        assert_eq!(note_ons(track).first(), Some(&(0, key)));
        assert!(programs(track).is_empty());
        assert!(track.iter().all(|e| match e.kind {
            TrackEventKind::Midi { channel, .. } => channel.as_int() == 9,
            _ => true,
        }));
    }
}

#[test]
fn test_guitar_chord_strings() {
    let midi = Song::new()
        .part(0, 0x08, 4)
        .steps(0, &[0x01])
        .chords(&[(0, 0x0000)])
        .convert();
    let tracks = parse_tracks(&midi);

    assert_eq!(
        first_keys(&tracks[1..7]),
        vec![Some(0x4C), Some(0x48), Some(0x43), Some(0x40), Some(0x3C), Some(0x34)]
    );
    for track in &tracks[1..7] {
        assert_eq!(programs(track), vec![(0, 0x1A)]);
    }
}

#[test]
fn test_chord_changes_follow_table() {
    // G major from step 2 (table tick 6)
    let midi = Song::new()
        .part(0, 0x08, 4)
        .steps(0, &[0x01, 0x80, 0x01])
        .chords(&[(0, 0x0000), (6, 0x0400)])
        .convert();
    let tracks = parse_tracks(&midi);
    let low_e = note_ons(&tracks[6]);
    assert_eq!(low_e, vec![(0, 0x34), (240, 0x37)]);
}

#[test]
fn test_piano_four_voices() {
    let midi = Song::new()
        .part(0, 0x01, 3)
        .steps(0, &[0x01])
        .chords(&[(0, 0x0000)])
        .voicing(72, 3)
        .convert();
    let tracks = parse_tracks(&midi);

    assert_eq!(
        first_keys(&tracks[1..7]),
        vec![Some(64), Some(67), Some(72), None, Some(60), None]
    );
}

#[test]
fn test_custom_piano_chord() {
    // Entry 1 stores its notes lowest address last; zero bytes stay silent
    let midi = Song::new()
        .part(0, 0x01, 3)
        .steps(0, &[0x01])
        .chords(&[(0, 0xFF01)])
        .custom_piano(1, [10, 20, 0, 40])
        .voicing(72, 3)
        .convert();
    let tracks = parse_tracks(&midi);

    assert_eq!(
        first_keys(&tracks[1..7]),
        vec![Some(40), None, Some(20), Some(10), None, None]
    );
}

#[test]
fn test_custom_guitar_chords_follow_part_order() {
    // String 0 at fret 2, string 1 muted
    let word = 2 | (0x10 << 5);
    let midi = Song::new()
        .custom_guitar(0, word)
        .chords(&[(0, 0xFF00)])
        .part(0, 0x08, 4)
        .steps(0, &[0x01])
        .part(1, 0x08, 2)
        .steps(1, &[0x01])
        .part(2, 0x08, 4)
        .steps(2, &[0x01])
        .convert();
    let tracks = parse_tracks(&midi);
    assert_eq!(tracks.len(), 1 + 3 * 6 + 5);

    let first_key = |t: usize| note_ons(&tracks[t]).first().map(|&(_, key)| key);
    // Before the custom part: the table is still blank (open strings)
    assert_eq!(first_key(1), Some(0x4C));
    assert_eq!(first_key(2), Some(0x47));
    // The custom part and every later part see the loaded shapes
    assert_eq!(first_key(7), Some(0x4E));
    assert_eq!(first_key(8), None);
    assert_eq!(first_key(13), Some(0x4E));
    assert_eq!(first_key(14), None);
}

#[test]
fn test_volume_envelope() {
    let midi = Song::new()
        .part(0, 0x03, 0)
        .steps(0, &[60, 62, 64])
        .volume(0, &[(3, 0)])
        .convert();
    let tracks = parse_tracks(&midi);
    assert_eq!(velocities(&tracks[1]), vec![127, 0, 0]);
}

#[test]
fn test_delta_overflow_policy() {
    let song = Song::new().tempo(&[(100, 120), (50, 120)]);

    // 50 - 100 timeline units, 40 ticks each
    let err = Converter::new().convert(&song.data).unwrap_err();
    assert!(matches!(err, Error::DeltaOverflow { value: -2000 }));

    let lossy = Converter::with_options(ConvertOptions {
        overflow: OverflowPolicy::Substitute,
    });
    let midi = lossy.convert(&song.data).expect("Lossy conversion failed");
    let tracks = parse_tracks(&midi);
    assert_eq!(tempos(&tracks[0]), vec![(0, 500_000), (0, 500_000)]);
}

#[test]
fn test_zero_tempo() {
    let song = Song::new().tempo(&[(0, 0)]);
    let err = Converter::new().convert(&song.data).unwrap_err();
    assert!(matches!(err, Error::ZeroTempo { index: 0 }));
}

#[test]
fn test_mixed_parts_parse() {
    let midi = Song::new()
        .tempo(&[(0, 150)])
        .part(0, 0x03, 0)
        .steps(0, &[60, 0xFF, 62, 63, 64, 65])
        .part(3, 0x2B, 1)
        .steps(3, &[0x12, 0xF3, 0x45])
        .part(5, 0x01, 3)
        .steps(5, &[0x01, 0x80, 0x01])
        .chords(&[(0, 0x0102)])
        .voicing(70, 4)
        .convert();

    let smf = Smf::parse(&midi).expect("midly rejected the file");
    assert_eq!(smf.header.format, Format::Parallel);
    assert_eq!(smf.header.timing, Timing::Metrical(480.into()));
    assert_eq!(smf.tracks.len(), 1 + 8 + 1 + 5);

    let tracks = parse_tracks(&midi);
    assert_eq!(tempos(&tracks[0]), vec![(0, 400_000)]);
    assert_eq!(note_ons(&tracks[1]).len(), 5);
}

#[test]
fn test_convert_file() {
    let song = Song::new().part(0, 0x03, 0).steps(0, &[60, 62]);
    let dir = tempdir().unwrap();
    let input = dir.path().join("song.bdx");
    let output = dir.path().join("song.mid");
    std::fs::write(&input, &song.data).unwrap();

    Converter::new()
        .convert_file(&input, &output)
        .expect("File conversion failed");
    let written = std::fs::read(&output).unwrap();
    assert_eq!(written, song.convert());
}

#[test]
fn test_convert_file_rejects_invalid_input() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.bdx");
    let output = dir.path().join("bad.mid");
    std::fs::write(&input, b"not a song").unwrap();

    let err = Converter::new().convert_file(&input, &output).unwrap_err();
    assert!(matches!(err, Error::InvalidHeader { .. }));
    assert!(!output.exists());
}

#[test]
fn test_song_info() {
    let song = Song::new()
        .title(0, "HELLO")
        .title(1, "WORLD")
        .tempo(&[(0, 120), (16, 140)])
        .part(0, 0x03, 0)
        .part(2, 0x2A, 1);
    let reader = BdxReader::new(&song.data).unwrap();
    let info = SongInfo::read(&reader).unwrap();

    assert_eq!(info.title, "HELLO WORLD");
    assert_eq!(info.instruments, vec!["Rock Organ", "Rock Drum"]);
    assert_eq!(info.track_count, 2);
    assert_eq!(info.tempo_changes, 2);

    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["parts"][2]["kind"], "drum");
}

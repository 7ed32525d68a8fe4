//! Triplet-aware step timeline
//!
//! Steps sit on a straight grid of [`UNITS_PER_STEP`] timeline units. A
//! triplet marker bends the next steps through a cyclic offset table so that
//! three notes share the space of three straight steps at even spacing.

use super::envelope::VolumeCurve;

/// MIDI ticks per timeline unit
pub const TICKS_PER_UNIT: u32 = 40;

/// Timeline units per straight step
pub const UNITS_PER_STEP: u32 = 3;

/// MIDI ticks per straight step (a sixteenth at 480 PPQ)
pub const TICKS_PER_STEP: u32 = TICKS_PER_UNIT * UNITS_PER_STEP;

/// A repeating table of offsets indexed by phase
#[derive(Debug, Clone, Copy)]
pub struct PhaseCycle {
    offsets: &'static [i32],
}

/// Offsets applied to the steps following a triplet marker
pub const STEP_TRIPLET: PhaseCycle = PhaseCycle::new(&[0, -3, -2, -1]);

/// Maps a tempo/volume/chord table tick onto a step slot
pub const TABLE_TRIPLET: PhaseCycle = PhaseCycle::new(&[0, 2, 1]);

impl PhaseCycle {
    pub const fn new(offsets: &'static [i32]) -> Self {
        Self { offsets }
    }

    /// Number of phases in one cycle
    fn phases(&self) -> usize {
        self.offsets.len()
    }

    /// Offset for `phase`, wrapping around the cycle
    pub fn offset(&self, phase: usize) -> i32 {
        self.offsets[phase % self.offsets.len()]
    }

    /// Fold `value` into whole cycles plus the offset of its remainder
    pub fn slot(&self, value: usize) -> usize {
        let len = self.offsets.len();
        let slot = (value / len) as i64 + self.offset(value % len) as i64;
        slot.max(0) as usize
    }

    /// Start a counter driven by this cycle
    pub fn counter(self) -> PhaseCounter {
        PhaseCounter {
            cycle: self,
            phase: 0,
            active: false,
        }
    }
}

/// Walks a [`PhaseCycle`] once per step after being triggered
#[derive(Debug, Clone, Copy)]
pub struct PhaseCounter {
    cycle: PhaseCycle,
    phase: usize,
    active: bool,
}

impl PhaseCounter {
    /// Offset at the current phase
    pub fn offset(&self) -> i32 {
        self.cycle.offset(self.phase)
    }

    /// Begin (or keep) cycling
    pub fn trigger(&mut self) {
        self.active = true;
    }

    /// Move to the next phase; the counter stops after one full cycle
    pub fn advance(&mut self) {
        if !self.active {
            return;
        }
        self.phase += 1;
        if self.phase >= self.cycle.phases() {
            self.phase = 0;
            self.active = false;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Meaning of one step for one voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Play this note; 0 is a rest
    Sound(u8),
    /// Start a triplet group
    Triplet,
    /// Keep the previous note ringing
    Hold,
}

impl Step {
    /// Interpret a note/rest/tie code (values >= 0x80 other than 0xFF tie)
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00..=0x7F => Self::Sound(code),
            0xFF => Self::Triplet,
            _ => Self::Hold,
        }
    }
}

/// One sounding (or resting) moment of a voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineEvent {
    /// Position in timeline units
    pub tick: u32,
    pub velocity: u8,
    /// MIDI note, 0 for a rest
    pub note: u8,
}

impl TimelineEvent {
    pub fn is_rest(&self) -> bool {
        self.note == 0
    }
}

/// Expand `len` steps into timeline events.
///
/// `classify` decides what each step index means; sounding steps pick up
/// their velocity from the part volume and the resolved volume curve.
pub fn expand<F>(len: usize, base_volume: u8, curve: &VolumeCurve, mut classify: F) -> Vec<TimelineEvent>
where
    F: FnMut(usize) -> Step,
{
    let mut events = Vec::new();
    let mut triplet = STEP_TRIPLET.counter();

    for index in 0..len {
        match classify(index) {
            Step::Sound(note) => {
                let tick = (index as i64 * UNITS_PER_STEP as i64 + triplet.offset() as i64).max(0);
                events.push(TimelineEvent {
                    tick: tick as u32,
                    velocity: curve.velocity(index, base_volume),
                    note,
                });
            }
            Step::Triplet => triplet.trigger(),
            Step::Hold => {}
        }
        triplet.advance();
    }

    events
}

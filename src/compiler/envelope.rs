//! Sparse (tick, value) tables resolved onto the step grid
//!
//! Volume and chord tables store changes at timeline ticks. Each change is
//! folded onto a step slot with [`TABLE_TRIPLET`] and every later slot
//! inherits the most recent value.

use super::timeline::TABLE_TRIPLET;
use crate::bdx::header::{offset, STEP_COUNT};
use crate::bdx::BdxReader;
use crate::error::Result;
use tracing::warn;

/// Level used where no volume change has happened yet
pub const DEFAULT_LEVEL: u8 = 0x7F;

/// Forward-filled per-slot values built from sparse changes
#[derive(Debug, Clone)]
pub struct SparseTimeline<T> {
    slots: Vec<Option<T>>,
}

impl<T: Copy> SparseTimeline<T> {
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    /// Record a change at table tick `tick`; ticks mapping past the end are dropped
    pub fn set(&mut self, tick: u16, value: T) -> bool {
        let slot = TABLE_TRIPLET.slot(tick as usize);
        match self.slots.get_mut(slot) {
            Some(entry) => {
                *entry = Some(value);
                true
            }
            None => {
                warn!(tick, slot, "table entry lands past the end of the timeline; ignored");
                false
            }
        }
    }

    /// Copy each value forward into the unset slots after it
    pub fn resolve(mut self) -> Vec<Option<T>> {
        for i in 1..self.slots.len() {
            if self.slots[i].is_none() {
                self.slots[i] = self.slots[i - 1];
            }
        }
        self.slots
    }
}

/// Dense per-step volume levels for one part
#[derive(Debug, Clone)]
pub struct VolumeCurve {
    levels: Vec<Option<u8>>,
}

impl VolumeCurve {
    /// Curve with no changes (every step at [`DEFAULT_LEVEL`])
    pub fn flat(len: usize) -> Self {
        Self {
            levels: vec![None; len],
        }
    }

    /// Read and resolve the volume table of `part`
    pub fn read(reader: &BdxReader<'_>, part: usize) -> Result<Self> {
        let base = offset::volume_table(part);
        let count = reader.count_records(base, offset::VOLUME_STRIDE)?;

        let mut timeline = SparseTimeline::new(STEP_COUNT);
        for i in 0..count {
            let record = base + i * offset::VOLUME_STRIDE;
            let tick = reader.u16_le_at(record)?;
            let level = reader.u8_at(record + offset::VOLUME_VALUE)?;
            timeline.set(tick, level);
        }

        Ok(Self {
            levels: timeline.resolve(),
        })
    }

    /// Level at `step`
    pub fn level(&self, step: usize) -> u8 {
        self.levels
            .get(step)
            .copied()
            .flatten()
            .unwrap_or(DEFAULT_LEVEL)
    }

    /// Velocity for `step` given the part's base volume
    pub fn velocity(&self, step: usize, base_volume: u8) -> u8 {
        scale_velocity(base_volume, self.level(step))
    }
}

/// `127 * (base / 127) * (level / 127)`, truncated and clamped to a MIDI velocity
pub fn scale_velocity(base_volume: u8, level: u8) -> u8 {
    let v = 127f32 * (base_volume as f32 / 127f32) * (level as f32 / 127f32);
    (v as i32).clamp(0, 127) as u8
}

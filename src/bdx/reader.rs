//! Bounds-checked fixed-offset reads over a BDX buffer

use super::header::{self, offset, BDX_MAGIC, STEP_COUNT, TABLE_END};
use crate::error::{Error, Result};

/// Read-only view over a validated BDX song buffer
#[derive(Debug, Clone, Copy)]
pub struct BdxReader<'a> {
    data: &'a [u8],
}

impl<'a> BdxReader<'a> {
    /// Validate the signature and wrap the buffer
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if !header::is_valid(data) {
            let end = data.len().min(offset::MAGIC + BDX_MAGIC.len());
            let found = data
                .get(offset::MAGIC..end)
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_default();
            return Err(Error::InvalidHeader { found });
        }
        Ok(Self { data })
    }

    /// Read bytes at a specific offset
    pub fn bytes_at(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(Error::Truncated { offset, len })
    }

    /// Read a u8 at a specific offset
    pub fn u8_at(&self, offset: usize) -> Result<u8> {
        Ok(self.bytes_at(offset, 1)?[0])
    }

    /// Read a 16-bit little-endian value at a specific offset
    pub fn u16_le_at(&self, offset: usize) -> Result<u16> {
        let b = self.bytes_at(offset, 2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Read a 32-bit little-endian value at a specific offset
    pub fn u32_le_at(&self, offset: usize) -> Result<u32> {
        let b = self.bytes_at(offset, 4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Number of steps each part plays (bars * beats * 4, capped to the step array)
    pub fn step_count(&self) -> Result<usize> {
        let bars = self.u8_at(offset::BARS)? as usize;
        let beats = self.u8_at(offset::BEATS)? as usize;
        Ok((bars * beats * 4).min(STEP_COUNT))
    }

    /// Number of records before the 0xFFFF sentinel in a table of `stride`-byte records
    pub fn count_records(&self, base: usize, stride: usize) -> Result<usize> {
        let mut count = 0;
        while self.u16_le_at(base + count * stride)? != TABLE_END {
            count += 1;
        }
        Ok(count)
    }

    /// Number of entries in the tempo change table
    pub fn tempo_count(&self) -> Result<usize> {
        self.count_records(offset::TEMPO_TABLE, offset::TEMPO_STRIDE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(len: usize) -> Vec<u8> {
        let mut data = vec![0u8; len];
        data[offset::MAGIC..offset::MAGIC + 12].copy_from_slice(BDX_MAGIC);
        data
    }

    #[test]
    fn test_rejects_bad_header() {
        let data = vec![0u8; 0x100];
        match BdxReader::new(&data) {
            Err(Error::InvalidHeader { found }) => assert_eq!(found.len(), 12),
            other => panic!("expected InvalidHeader, got {:?}", other),
        }
    }

    #[test]
    fn test_little_endian_reads() {
        let mut data = song(0x20);
        data[0x10..0x14].copy_from_slice(&[0x78, 0x56, 0x34, 0x12]);
        let reader = BdxReader::new(&data).unwrap();
        assert_eq!(reader.u16_le_at(0x10).unwrap(), 0x5678);
        assert_eq!(reader.u32_le_at(0x10).unwrap(), 0x1234_5678);
    }

    #[test]
    fn test_out_of_bounds_is_error() {
        let data = song(0x20);
        let reader = BdxReader::new(&data).unwrap();
        assert!(matches!(
            reader.u16_le_at(0x1F),
            Err(Error::Truncated { offset: 0x1F, len: 2 })
        ));
        assert!(reader.bytes_at(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_step_count_is_capped() {
        let mut data = song(0x100);
        data[offset::BARS] = 255;
        data[offset::BEATS] = 4;
        let reader = BdxReader::new(&data).unwrap();
        assert_eq!(reader.step_count().unwrap(), STEP_COUNT);

        data[offset::BARS] = 2;
        data[offset::BEATS] = 3;
        let reader = BdxReader::new(&data).unwrap();
        assert_eq!(reader.step_count().unwrap(), 24);
    }

    #[test]
    fn test_unterminated_table_fails() {
        let data = song(offset::TEMPO_TABLE + 8);
        let reader = BdxReader::new(&data).unwrap();
        assert!(matches!(reader.tempo_count(), Err(Error::Truncated { .. })));
    }

    #[test]
    fn test_tempo_count() {
        let mut data = song(offset::TEMPO_TABLE + 16);
        data[offset::TEMPO_TABLE + 8] = 0xFF;
        data[offset::TEMPO_TABLE + 9] = 0xFF;
        let reader = BdxReader::new(&data).unwrap();
        assert_eq!(reader.tempo_count().unwrap(), 2);
    }
}

//! Gap-compressed posting and query files.
//!
//! A file is a sequence of records. Each record is a little-endian `u32`
//! value count followed by that many d-gaps, every gap a 7-bits-per-byte
//! variable-byte integer whose high bit marks a continuation. The first gap
//! carries the first value itself; decoding is a running prefix sum. Gaps
//! wrap, so query records with unsorted ids survive the round trip.

use crate::prelude::*;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Write};
use std::path::Path;

pub struct GapWriter<W: Write>(pub W);

impl<W: Write> GapWriter<W> {
    pub fn write_lists<'a>(&mut self, lists: impl Iterator<Item = &'a [u32]>) -> IoResult<()> {
        for list in lists {
            self.write_list(list)?;
        }
        Ok(())
    }

    pub fn write_list(&mut self, ids: &[u32]) -> IoResult<()> {
        self.0.write_all(&(ids.len() as u32).to_le_bytes())?;
        let mut previous = 0u32;
        for &id in ids {
            self.write_gap(id.wrapping_sub(previous))?;
            previous = id;
        }
        Ok(())
    }

    fn write_gap(&mut self, mut gap: u32) -> IoResult<()> {
        while gap >= 0x80 {
            self.0.write_all(&[(gap as u8 & 0x7f) | 0x80])?;
            gap >>= 7;
        }
        self.0.write_all(&[gap as u8])
    }
}

pub struct GapReader {
    input: BufReader<File>,
    records: usize,
}

impl GapReader {
    pub fn open(path: impl AsRef<Path>) -> IoResult<Self> {
        Ok(Self {
            input: BufReader::new(File::open(path)?),
            records: 0,
        })
    }

    /// Next record, or `None` at a clean end of file.
    pub fn read_list(&mut self) -> Result<Option<Vec<u32>>> {
        let mut len_bytes = [0u8; 4];
        match self.input.read_exact(&mut len_bytes) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        let len = u32::from_le_bytes(len_bytes) as usize;

        let mut ids = Vec::with_capacity(len);
        let mut previous = 0u32;
        for _ in 0..len {
            previous = previous.wrapping_add(self.read_gap()?);
            ids.push(previous);
        }
        self.records += 1;
        Ok(Some(ids))
    }

    pub fn read_all(mut self) -> Result<Vec<Vec<u32>>> {
        let mut lists = vec![];
        while let Some(list) = self.read_list()? {
            lists.push(list);
        }
        Ok(lists)
    }

    fn read_gap(&mut self) -> Result<u32> {
        let mut value = 0u32;
        let mut shift = 0;
        loop {
            let mut byte = [0u8; 1];
            self.input
                .read_exact(&mut byte)
                .map_err(|_| TruncatedRecord(self.records))?;
            if shift >= 32 {
                return Err(GapOverflow(self.records).into());
            }
            value |= ((byte[0] & 0x7f) as u32) << shift;
            if byte[0] & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }
}

/// Posting lists must satisfy this before they enter a database; query
/// records are exempt (they may repeat an id on purpose).
pub fn is_strictly_increasing(ids: &[u32]) -> bool {
    ids.windows(2).all(|pair| pair[0] < pair[1])
}

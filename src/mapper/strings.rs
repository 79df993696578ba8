//! Text mappers for UTF-8 and UTF-16 strings.
//!
//! Two framings are supported, each for both encodings:
//!
//! - **Fixed width** - a field of exactly `length` units. Writes zero-pad the remainder, reads
//!   strip trailing zero units. Zeros inside the text are kept, so a value with an embedded zero
//!   followed by more text does not survive a round trip unchanged.
//! - **Null terminated** - the text followed by one zero unit. Reads consume one unit at a time
//!   up to and including the terminator, and an exhausted stream before the terminator is an
//!   error. The caller must keep zero units out of the text.
//!
//! UTF-8 units are bytes, UTF-16 units are 16-bit code units transcoded in the active byte order.
//! Combine the wide variants with [`crate::override_endian`] for formats that mandate one.
//!
//! Text that does not decode is reported as [`crate::Error::Malformed`].

use std::io::{Read, Write};

use log::warn;
use widestring::{U16Str, U16String};

use crate::{
    io::{read_byte, read_bytes, read_value, write_bytes, write_value, PREALLOC_LIMIT},
    mapper::BoxMapper,
    Endian, Mapper, Result,
};

fn decode_utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| malformed_error!("Invalid UTF-8 string - {}", e))
}

fn decode_utf16(units: &[u16]) -> Result<String> {
    U16Str::from_slice(units)
        .to_string()
        .map_err(|e| malformed_error!("Invalid UTF-16 string - {}", e))
}

/// Mapper for a UTF-8 string in a zero-padded field of fixed byte length.
pub struct FixedString<'a> {
    target: &'a mut String,
    length: usize,
}

impl Mapper for FixedString<'_> {
    fn read(&mut self, r: &mut dyn Read, _endian: Endian) -> Result<()> {
        let mut bytes = read_bytes(r, self.length)?;
        let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |pos| pos + 1);
        bytes.truncate(end);

        *self.target = decode_utf8(bytes)?;
        Ok(())
    }

    fn write(&mut self, w: &mut dyn Write, _endian: Endian) -> Result<()> {
        let mut end = self.target.len().min(self.length);
        while !self.target.is_char_boundary(end) {
            end -= 1;
        }
        if end < self.target.len() {
            warn!(
                "Truncating string of {} bytes to fixed field of {} bytes",
                self.target.len(),
                self.length
            );
        }

        let mut field = vec![0u8; self.length];
        field[..end].copy_from_slice(&self.target.as_bytes()[..end]);
        write_bytes(w, &field)
    }
}

/// Maps a UTF-8 string stored in exactly `length` bytes.
///
/// Text longer than the field is truncated on write (at a character boundary) without an error.
#[must_use]
pub fn fixed_string(target: &mut String, length: usize) -> BoxMapper<'_> {
    Box::new(FixedString { target, length })
}

/// Mapper for a zero-terminated UTF-8 string.
pub struct NullTermString<'a> {
    target: &'a mut String,
}

impl Mapper for NullTermString<'_> {
    fn read(&mut self, r: &mut dyn Read, _endian: Endian) -> Result<()> {
        let mut bytes = Vec::new();
        loop {
            match read_byte(r)? {
                0 => break,
                byte => bytes.push(byte),
            }
        }

        *self.target = decode_utf8(bytes)?;
        Ok(())
    }

    fn write(&mut self, w: &mut dyn Write, _endian: Endian) -> Result<()> {
        write_bytes(w, self.target.as_bytes())?;
        write_bytes(w, &[0])
    }
}

/// Maps a UTF-8 string followed by a zero byte.
///
/// # Examples
///
/// ```rust
/// use binmap::{null_term_string, Endian, Mapper};
///
/// let mut text = String::new();
/// let mut input: &[u8] = b"Hi\0rest";
/// null_term_string(&mut text).read(&mut input, Endian::Big)?;
/// assert_eq!(text, "Hi");
/// assert_eq!(input, b"rest");
/// # Ok::<(), binmap::Error>(())
/// ```
#[must_use]
pub fn null_term_string(target: &mut String) -> BoxMapper<'_> {
    Box::new(NullTermString { target })
}

/// Mapper for a UTF-16 string in a zero-padded field of fixed code unit length.
pub struct WideFixedString<'a> {
    target: &'a mut String,
    length: usize,
}

impl Mapper for WideFixedString<'_> {
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        let mut units = Vec::with_capacity(self.length.min(PREALLOC_LIMIT));
        for _ in 0..self.length {
            units.push(read_value::<u16>(r, endian)?);
        }
        let end = units.iter().rposition(|&u| u != 0).map_or(0, |pos| pos + 1);

        *self.target = decode_utf16(&units[..end])?;
        Ok(())
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        let units = U16String::from_str(self.target.as_str()).into_vec();

        let mut end = units.len().min(self.length);
        if end < units.len() {
            // never split a surrogate pair
            if end > 0 && (0xD800..0xDC00).contains(&units[end - 1]) {
                end -= 1;
            }
            warn!(
                "Truncating string of {} code units to fixed field of {} code units",
                units.len(),
                self.length
            );
        }

        for &unit in &units[..end] {
            write_value(w, endian, unit)?;
        }
        for _ in end..self.length {
            write_value(w, endian, 0u16)?;
        }
        Ok(())
    }
}

/// Maps a UTF-16 string stored in exactly `length` code units (`2 * length` bytes).
#[must_use]
pub fn wide_fixed_string(target: &mut String, length: usize) -> BoxMapper<'_> {
    Box::new(WideFixedString { target, length })
}

/// Mapper for a UTF-16 string terminated by a zero code unit.
pub struct WideNullTermString<'a> {
    target: &'a mut String,
}

impl Mapper for WideNullTermString<'_> {
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        let mut units = Vec::new();
        loop {
            match read_value::<u16>(r, endian)? {
                0 => break,
                unit => units.push(unit),
            }
        }

        *self.target = decode_utf16(&units)?;
        Ok(())
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        for unit in U16String::from_str(self.target.as_str()).into_vec() {
            write_value(w, endian, unit)?;
        }
        write_value(w, endian, 0u16)
    }
}

/// Maps a UTF-16 string followed by a zero code unit.
#[must_use]
pub fn wide_null_term_string(target: &mut String) -> BoxMapper<'_> {
    Box::new(WideNullTermString { target })
}

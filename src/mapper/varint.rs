//! Variable-length integer encoding.
//!
//! Unsigned values use the LEB128 scheme: 7 bits of payload per byte, least significant group
//! first, high bit set on every byte except the last. Signed values are zig-zag mapped first
//! (`0, -1, 1, -2, ...` becomes `0, 1, 2, 3, ...`) so small magnitudes stay short regardless of
//! sign.
//!
//! The encoding has no byte order. The [`Endian`] handed to [`varint`] and [`uvarint`] is
//! ignored, a value written under big-endian reads back identically under little-endian.
//!
//! # Examples
//!
//! ```rust
//! use binmap::{uvarint, Endian, Mapper};
//!
//! let mut value = 257u64;
//! let mut out = Vec::new();
//! uvarint(&mut value).write(&mut out, Endian::Big)?;
//! assert_eq!(out, [0x81, 0x02]);
//! # Ok::<(), binmap::Error>(())
//! ```

use std::io::{Read, Write};

use crate::{
    io::{read_byte, write_bytes},
    mapper::BoxMapper,
    Endian, Mapper, Result,
};

/// Maximum encoded length of a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

/// Maps a signed integer into the unsigned zig-zag domain.
#[must_use]
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
#[must_use]
pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Number of bytes the encoding of `value` occupies.
#[must_use]
pub fn uvarint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Encodes `value` into `buf` and returns the number of bytes used.
#[must_use]
pub fn encode_uvarint(mut value: u64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut len = 0;
    while value >= 0x80 {
        buf[len] = (value as u8) | 0x80;
        value >>= 7;
        len += 1;
    }
    buf[len] = value as u8;
    len + 1
}

/// Zig-zag maps `value`, then encodes it like [`encode_uvarint`].
#[must_use]
pub fn encode_varint(value: i64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    encode_uvarint(zigzag_encode(value), buf)
}

/// Reads one unsigned variable-length integer, one byte at a time.
///
/// # Errors
/// Returns [`crate::Error::Io`] if the stream ends inside the value, and
/// [`crate::Error::Malformed`] if the encoding runs past 64 bits.
pub fn read_uvarint(r: &mut dyn Read) -> Result<u64> {
    let mut value = 0u64;
    let mut shift = 0;

    for index in 0..MAX_VARINT_LEN {
        let byte = read_byte(r)?;
        if byte < 0x80 {
            if index == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(malformed_error!("Varint overflows 64 bits"));
            }
            return Ok(value | u64::from(byte) << shift);
        }

        value |= u64::from(byte & 0x7F) << shift;
        shift += 7;
    }

    Err(malformed_error!(
        "Varint longer than {} bytes",
        MAX_VARINT_LEN
    ))
}

/// Reads one zig-zag encoded signed integer.
///
/// # Errors
/// See [`read_uvarint`].
pub fn read_varint(r: &mut dyn Read) -> Result<i64> {
    Ok(zigzag_decode(read_uvarint(r)?))
}

/// Writes `value` using the minimal number of bytes.
///
/// # Errors
/// Returns [`crate::Error::Io`] if the stream fails.
pub fn write_uvarint(w: &mut dyn Write, value: u64) -> Result<()> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_uvarint(value, &mut buf);
    write_bytes(w, &buf[..len])
}

/// Writes `value` zig-zag encoded, using the minimal number of bytes.
///
/// # Errors
/// Returns [`crate::Error::Io`] if the stream fails.
pub fn write_varint(w: &mut dyn Write, value: i64) -> Result<()> {
    write_uvarint(w, zigzag_encode(value))
}

/// Mapper for a zig-zag encoded `i64`.
pub struct Varint<'a> {
    target: &'a mut i64,
}

impl Mapper for Varint<'_> {
    fn read(&mut self, r: &mut dyn Read, _endian: Endian) -> Result<()> {
        *self.target = read_varint(r)?;
        Ok(())
    }

    fn write(&mut self, w: &mut dyn Write, _endian: Endian) -> Result<()> {
        write_varint(w, *self.target)
    }
}

/// Mapper for a LEB128 encoded `u64`.
pub struct Uvarint<'a> {
    target: &'a mut u64,
}

impl Mapper for Uvarint<'_> {
    fn read(&mut self, r: &mut dyn Read, _endian: Endian) -> Result<()> {
        *self.target = read_uvarint(r)?;
        Ok(())
    }

    fn write(&mut self, w: &mut dyn Write, _endian: Endian) -> Result<()> {
        write_uvarint(w, *self.target)
    }
}

/// Maps a signed integer as a zig-zag variable-length integer. Byte order is ignored.
#[must_use]
pub fn varint(target: &mut i64) -> BoxMapper<'_> {
    Box::new(Varint { target })
}

/// Maps an unsigned integer as a variable-length integer. Byte order is ignored.
#[must_use]
pub fn uvarint(target: &mut u64) -> BoxMapper<'_> {
    Box::new(Uvarint { target })
}

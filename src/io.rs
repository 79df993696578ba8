//! Byte order policy and stream-level transcoding for mappers.
//!
//! This module is the only place in the crate that touches a reader or writer directly. Every
//! mapper, however deeply composed, bottoms out in the helpers defined here.
//!
//! # Architecture
//!
//! - [`Endian`] - The byte-order policy, passed explicitly to every read and write
//! - [`BinIO`] - Trait describing fixed-width scalars and their byte representation
//! - [`read_value`] / [`write_value`] - Transcode one scalar in the requested byte order
//! - [`read_byte`] / [`read_bytes`] / [`write_bytes`] - Raw byte access
//!
//! ## Supported Types
//! The [`BinIO`] trait is implemented for:
//! - **Unsigned integers**: `u8`, `u16`, `u32`, `u64`
//! - **Signed integers**: `i8`, `i16`, `i32`, `i64`
//! - **Floating point**: `f32`, `f64`
//!
//! `usize` and `isize` are deliberately left out, their width is a property of the host and not
//! of the wire format.
//!
//! # Buffering
//!
//! Nothing here buffers beyond a single scalar. Reads use `read_exact`, so a stream that ends
//! early surfaces as [`crate::Error::Io`] with `std::io::ErrorKind::UnexpectedEof`.
//!
//! # Examples
//!
//! ```rust
//! use binmap::io::{read_value, write_value};
//! use binmap::Endian;
//!
//! let mut buf = Vec::new();
//! write_value(&mut buf, Endian::Big, 0x0102u16)?;
//! assert_eq!(buf, [0x01, 0x02]);
//!
//! let value: u16 = read_value(&mut buf.as_slice(), Endian::Little)?;
//! assert_eq!(value, 0x0201);
//! # Ok::<(), binmap::Error>(())
//! ```

use std::io::{Read, Write};

use crate::{Error, Result};

/// Upper bound for capacity reserved up front from a count that was read off the wire.
///
/// Collections still grow past this as elements actually arrive, the limit only keeps a corrupt
/// or hostile length prefix from triggering a huge allocation before any element was decoded.
pub const PREALLOC_LIMIT: usize = 4096;

/// Byte-order policy for multi-byte scalars.
///
/// There is no default, every read and write names the policy it uses. It can be parsed from
/// text (case-insensitive `"big"`, `"be"`, `"little"`, `"le"`) so applications can carry it in
/// their own configuration.
///
/// # Examples
///
/// ```rust
/// use binmap::Endian;
///
/// let endian: Endian = "LE".parse().unwrap();
/// assert_eq!(endian, Endian::Little);
/// assert_eq!(Endian::Big.to_string(), "big");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Endian {
    /// Most significant byte first (network order)
    #[strum(to_string = "big", serialize = "be")]
    Big,
    /// Least significant byte first
    #[strum(to_string = "little", serialize = "le")]
    Little,
}

impl Endian {
    /// The byte order of the host this code was compiled for.
    #[must_use]
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endian::Big
        } else {
            Endian::Little
        }
    }

    /// Convert the byte representation of `T` into a value, using this byte order.
    #[must_use]
    pub fn decode<T: BinIO>(self, bytes: T::Bytes) -> T {
        match self {
            Endian::Big => T::from_be_bytes(bytes),
            Endian::Little => T::from_le_bytes(bytes),
        }
    }

    /// Convert `value` into its byte representation, using this byte order.
    #[must_use]
    pub fn encode<T: BinIO>(self, value: T) -> T::Bytes {
        match self {
            Endian::Big => value.to_be_bytes(),
            Endian::Little => value.to_le_bytes(),
        }
    }
}

/// Trait for fixed-width scalars that can be transcoded in either byte order.
///
/// Each implementation names the byte array that holds its wire form (e.g. `[u8; 4]` for `u32`)
/// and forwards to the standard library's `from_*_bytes` / `to_*_bytes` conversions. Floating
/// point values are transcoded bit-for-bit, NaN and infinities pass through unchanged.
pub trait BinIO: Sized + Copy {
    /// Associated type representing the byte array type for this scalar.
    type Bytes: Default + AsRef<[u8]> + AsMut<[u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
    /// Write T to a byte buffer in big-endian
    fn to_be_bytes(self) -> Self::Bytes;
}

macro_rules! impl_bin_io {
    ($($ty:ty => $n:literal),* $(,)?) => {
        $(
            impl BinIO for $ty {
                type Bytes = [u8; $n];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }

                fn to_be_bytes(self) -> Self::Bytes {
                    <$ty>::to_be_bytes(self)
                }
            }
        )*
    };
}

impl_bin_io! {
    u8 => 1, i8 => 1,
    u16 => 2, i16 => 2,
    u32 => 4, i32 => 4,
    u64 => 8, i64 => 8,
    f32 => 4, f64 => 8,
}

/// Reads one value of type `T` from `r` in the given byte order.
///
/// Consumes exactly `size_of::<T>()` bytes.
///
/// # Errors
/// Returns [`Error::Io`] if the stream fails or ends before the value is complete.
pub fn read_value<T: BinIO>(r: &mut dyn Read, endian: Endian) -> Result<T> {
    let mut bytes = T::Bytes::default();
    r.read_exact(bytes.as_mut())?;
    Ok(endian.decode(bytes))
}

/// Writes `value` to `w` in the given byte order.
///
/// # Errors
/// Returns [`Error::Io`] if the stream fails.
pub fn write_value<T: BinIO>(w: &mut dyn Write, endian: Endian, value: T) -> Result<()> {
    w.write_all(endian.encode(value).as_ref())?;
    Ok(())
}

/// Reads a single byte from `r`.
///
/// # Errors
/// Returns [`Error::Io`] if the stream fails or is exhausted.
pub fn read_byte(r: &mut dyn Read) -> Result<u8> {
    let mut byte = [0u8; 1];
    r.read_exact(&mut byte)?;
    Ok(byte[0])
}

/// Reads exactly `len` raw bytes from `r`.
///
/// The buffer grows as data arrives instead of being sized from `len` up front, so a bogus
/// length only costs what the stream actually delivers.
///
/// # Errors
/// Returns [`Error::Io`] if the stream fails or ends before `len` bytes were read.
pub fn read_bytes(r: &mut dyn Read, len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(len.min(PREALLOC_LIMIT));
    let limit = u64::try_from(len).map_err(|_| Error::LengthOverflow(u64::MAX))?;
    let read = (&mut *r).take(limit).read_to_end(&mut buf)?;
    if read != len {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }

    Ok(buf)
}

/// Writes all of `data` to `w`.
///
/// # Errors
/// Returns [`Error::Io`] if the stream fails.
pub fn write_bytes(w: &mut dyn Write, data: &[u8]) -> Result<()> {
    w.write_all(data)?;
    Ok(())
}

/// Converts a wire-level count into a host index type.
///
/// # Errors
/// Returns [`Error::LengthOverflow`] if `value` does not fit into `usize` on this platform.
pub fn to_usize(value: u64) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::LengthOverflow(value))
}

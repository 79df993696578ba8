//! Fixed-width scalar mappers.
//!
//! Every mapper in this module binds exactly one scalar and transcodes it with a single
//! fixed-width read or write in the caller's byte order. Integers are restricted to the
//! explicitly sized types, floats are transcoded bit-for-bit.

use std::io::{Read, Write};

use crate::{
    io::{read_byte, read_value, write_value, BinIO},
    mapper::BoxMapper,
    Endian, Error, Mapper, Result,
};

mod sealed {
    pub trait Sealed {}

    impl Sealed for u8 {}
    impl Sealed for i8 {}
    impl Sealed for u16 {}
    impl Sealed for i16 {}
    impl Sealed for u32 {}
    impl Sealed for i32 {}
    impl Sealed for u64 {}
    impl Sealed for i64 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Fixed-width integer types accepted by [`int`].
pub trait BinInt: BinIO + sealed::Sealed {}

impl BinInt for u8 {}
impl BinInt for i8 {}
impl BinInt for u16 {}
impl BinInt for i16 {}
impl BinInt for u32 {}
impl BinInt for i32 {}
impl BinInt for u64 {}
impl BinInt for i64 {}

/// IEEE-754 floating point types accepted by [`float`] and [`complex`].
pub trait BinFloat: BinIO + sealed::Sealed {}

impl BinFloat for f32 {}
impl BinFloat for f64 {}

/// Unsigned integer types usable as a length or count on the wire.
///
/// Conversions to and from `usize` are checked, a count that does not fit its declared width is
/// reported as [`Error::LengthOverflow`] instead of being silently truncated.
pub trait SizeType: BinInt + Default {
    /// Widen to `u64`.
    fn to_u64(self) -> u64;

    /// Narrow a host length into this size type.
    ///
    /// # Errors
    /// Returns [`Error::LengthOverflow`] if `len` does not fit.
    fn from_usize(len: usize) -> Result<Self>;

    /// Convert into a host length.
    ///
    /// # Errors
    /// Returns [`Error::LengthOverflow`] if the value does not fit into `usize`.
    fn to_usize(self) -> Result<usize> {
        crate::io::to_usize(self.to_u64())
    }
}

macro_rules! impl_size_type {
    ($($ty:ty),*) => {
        $(
            impl SizeType for $ty {
                fn to_u64(self) -> u64 {
                    u64::from(self)
                }

                fn from_usize(len: usize) -> Result<Self> {
                    <$ty>::try_from(len).map_err(|_| Error::LengthOverflow(len as u64))
                }
            }
        )*
    };
}

impl_size_type!(u8, u16, u32, u64);

/// Mapper for a single fixed-width scalar.
///
/// Created by [`byte`], [`int`], [`float`] and [`size`].
pub struct Primitive<'a, T> {
    target: &'a mut T,
}

impl<T: BinIO> Mapper for Primitive<'_, T> {
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        *self.target = read_value(r, endian)?;
        Ok(())
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        write_value(w, endian, *self.target)
    }
}

/// Maps a single byte.
#[must_use]
pub fn byte(target: &mut u8) -> BoxMapper<'_> {
    Box::new(Primitive { target })
}

/// Maps a fixed-width integer.
///
/// # Examples
///
/// ```rust
/// use binmap::{int, Endian, Mapper};
///
/// let mut value = -2i32;
/// let mut out = Vec::new();
/// int(&mut value).write(&mut out, Endian::Little)?;
/// assert_eq!(out, [0xFE, 0xFF, 0xFF, 0xFF]);
/// # Ok::<(), binmap::Error>(())
/// ```
#[must_use]
pub fn int<T: BinInt>(target: &mut T) -> BoxMapper<'_> {
    Box::new(Primitive { target })
}

/// Maps a 32 or 64-bit float. NaN and infinities are carried unchanged.
#[must_use]
pub fn float<T: BinFloat>(target: &mut T) -> BoxMapper<'_> {
    Box::new(Primitive { target })
}

/// Maps an unsigned integer used as a length or count.
#[must_use]
pub fn size<T: SizeType>(target: &mut T) -> BoxMapper<'_> {
    Box::new(Primitive { target })
}

/// Mapper for a `bool` stored as one byte.
pub struct Boolean<'a> {
    target: &'a mut bool,
}

impl Mapper for Boolean<'_> {
    fn read(&mut self, r: &mut dyn Read, _endian: Endian) -> Result<()> {
        *self.target = read_byte(r)? != 0;
        Ok(())
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        write_value(w, endian, u8::from(*self.target))
    }
}

/// Maps a `bool` as one byte.
///
/// Any nonzero byte reads as `true`. Writes `1` or `0`.
#[must_use]
pub fn boolean(target: &mut bool) -> BoxMapper<'_> {
    Box::new(Boolean { target })
}

/// A complex number, stored as its real part followed by its imaginary part.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex<T> {
    /// Real component
    pub re: T,
    /// Imaginary component
    pub im: T,
}

impl<T> Complex<T> {
    /// Create a complex value from its components.
    pub fn new(re: T, im: T) -> Self {
        Complex { re, im }
    }
}

/// Mapper for a [`Complex`] value.
pub struct ComplexMapper<'a, T> {
    target: &'a mut Complex<T>,
}

impl<T: BinFloat> Mapper for ComplexMapper<'_, T> {
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        let re = read_value(r, endian)?;
        let im = read_value(r, endian)?;
        *self.target = Complex { re, im };
        Ok(())
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        write_value(w, endian, self.target.re)?;
        write_value(w, endian, self.target.im)
    }
}

/// Maps a [`Complex`] value as two consecutive floats of the same width.
#[must_use]
pub fn complex<T: BinFloat>(target: &mut Complex<T>) -> BoxMapper<'_> {
    Box::new(ComplexMapper { target })
}

//! The mapper abstraction and its core combinators.
//!
//! A [`Mapper`] knows how to read a value from a byte stream and how to write it back, given a
//! byte-order policy. Mappers borrow the caller's data for as long as they live and are meant to
//! be built fresh for each operation:
//!
//! ```rust
//! use binmap::{byte, sequence, Endian, Mapper};
//!
//! let (mut a, mut b) = (0u8, 0u8);
//! let mut input: &[u8] = &[0x01, 0x02];
//! sequence(vec![byte(&mut a), byte(&mut b)]).read(&mut input, Endian::Big)?;
//! assert_eq!((a, b), (1, 2));
//!
//! let mut out = Vec::new();
//! sequence(vec![byte(&mut b), byte(&mut a)]).write(&mut out, Endian::Big)?;
//! assert_eq!(out, [0x02, 0x01]);
//! # Ok::<(), binmap::Error>(())
//! ```
//!
//! # Key Components
//!
//! - [`Mapper`] / [`BoxMapper`] - The two-operation capability every combinator implements
//! - [`Sequence`] - Runs child mappers in declaration order, failing fast
//! - [`OverrideEndian`] - Pins a sub-mapper to a fixed byte order
//! - [`Nil`] - Sentinel for an absent target, fails both directions with [`Error::NilTarget`]
//! - [`Custom`] / [`FnMapper`] - Mappers built from caller-supplied procedures
//!
//! Every constructor function returns a [`BoxMapper`], so composition is closed: a table, a
//! slice of records or a locked mapper can be one field of a larger sequence.
//!
//! # Factories
//!
//! Collection mappers take an element factory `for<'e> FnMut(&'e mut E) -> BoxMapper<'e>`.
//! Plain constructors such as [`crate::byte`] or [`crate::int`] already have that shape and can
//! be passed by name.

use std::io::{Read, Write};

use crate::{Endian, Error, Result};

pub(crate) mod collections;
pub(crate) mod events;
pub(crate) mod map;
pub(crate) mod panic;
pub(crate) mod primitives;
pub(crate) mod strings;
pub(crate) mod subject;
pub(crate) mod sync;
pub(crate) mod table;
pub(crate) mod varint;

pub use collections::{
    dynamic_slice, fixed_bytes, len_bytes, len_slice, slice, DynamicSlice, FixedBytes, LenBytes,
    LenSlice, Slice,
};
pub use events::EventHandler;
pub use map::{map, Associative, Map};
pub use panic::{on_panic, OnPanic};
pub use primitives::{
    boolean, byte, complex, float, int, size, BinFloat, BinInt, Boolean, Complex, ComplexMapper,
    Primitive, SizeType,
};
pub use strings::{
    fixed_string, null_term_string, wide_fixed_string, wide_null_term_string, FixedString,
    NullTermString, WideFixedString, WideNullTermString,
};
pub use subject::{normalize_write, validate_read, Subject};
pub use sync::{lock, rw_lock, Locked, RwLocked};
pub use table::{data_table, map_field, DataTable, Field, FieldMapper, TABLE_SCRATCH_CAPACITY};
pub use varint::{
    encode_uvarint, encode_varint, read_uvarint, read_varint, uvarint, uvarint_len, varint,
    write_uvarint, write_varint, zigzag_decode, zigzag_encode, Uvarint, Varint, MAX_VARINT_LEN,
};

/// A procedure that knows how to read from and write to binary data, given a byte-order policy.
///
/// Implementations bind a target location owned by the caller. `read` decodes from `r` into the
/// target, `write` encodes the target into `w`. Neither call buffers beyond what a single
/// primitive needs, and both block exactly as long as the stream blocks.
pub trait Mapper {
    /// Read data from a binary source into the target.
    ///
    /// # Errors
    /// Returns the first error encountered, unwrapped, no matter how deeply it was nested.
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()>;

    /// Write the target to a binary sink.
    ///
    /// # Errors
    /// Returns the first error encountered, unwrapped, no matter how deeply it was nested.
    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()>;
}

/// A boxed mapper borrowing its target for `'a`.
pub type BoxMapper<'a> = Box<dyn Mapper + 'a>;

impl<M: Mapper + ?Sized> Mapper for Box<M> {
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        (**self).read(r, endian)
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        (**self).write(w, endian)
    }
}

impl<M: Mapper + ?Sized> Mapper for &mut M {
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        (**self).read(r, endian)
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        (**self).write(w, endian)
    }
}

/// Sentinel mapper standing in for an absent target.
///
/// Both directions fail with [`Error::NilTarget`] without touching the stream, turning a
/// missing binding into a deterministic, catchable failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct Nil;

impl Mapper for Nil {
    fn read(&mut self, _r: &mut dyn Read, _endian: Endian) -> Result<()> {
        Err(Error::NilTarget)
    }

    fn write(&mut self, _w: &mut dyn Write, _endian: Endian) -> Result<()> {
        Err(Error::NilTarget)
    }
}

/// Returns the [`Nil`] sentinel mapper.
#[must_use]
pub fn nil() -> BoxMapper<'static> {
    Box::new(Nil)
}

/// Builds a mapper for an optional target, falling back to the [`Nil`] sentinel.
///
/// # Examples
///
/// ```rust
/// use binmap::{int, or_nil, Endian, Error, Mapper};
///
/// let mut missing: Option<&mut u32> = None;
/// let mut out = Vec::new();
/// let result = or_nil(missing.take(), int).write(&mut out, Endian::Big);
/// assert!(matches!(result, Err(Error::NilTarget)));
/// assert!(out.is_empty());
/// ```
pub fn or_nil<'a, T, F>(target: Option<&'a mut T>, factory: F) -> BoxMapper<'a>
where
    F: FnOnce(&'a mut T) -> BoxMapper<'a>,
{
    match target {
        Some(target) => factory(target),
        None => nil(),
    }
}

/// Mapper built from two procedures operating on a bound target.
///
/// Created with [`any`].
pub struct Custom<'a, T, R, W> {
    target: &'a mut T,
    read: R,
    write: W,
}

impl<'a, T, R, W> Mapper for Custom<'a, T, R, W>
where
    R: FnMut(&mut T, &mut dyn Read, Endian) -> Result<()>,
    W: FnMut(&mut T, &mut dyn Write, Endian) -> Result<()>,
{
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        (self.read)(self.target, r, endian)
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        (self.write)(self.target, w, endian)
    }
}

/// Creates a custom mapper for any target from two independently supplied procedures.
///
/// The procedures receive the target on every call, so they don't need to capture it. An
/// absent target yields the [`Nil`] sentinel.
///
/// # Examples
///
/// ```rust
/// use binmap::{any, byte, Endian, Error, Mapper};
///
/// // A byte stored inverted on the wire
/// let mut value = 0x0Fu8;
/// let mut out = Vec::new();
/// any(
///     Some(&mut value),
///     |v, r, e| {
///         byte(v).read(r, e)?;
///         *v = !*v;
///         Ok(())
///     },
///     |v, w, e| byte(&mut !*v).write(w, e),
/// )
/// .write(&mut out, Endian::Big)?;
/// assert_eq!(out, [0xF0]);
/// # Ok::<(), Error>(())
/// ```
pub fn any<'a, T, R, W>(target: Option<&'a mut T>, read: R, write: W) -> BoxMapper<'a>
where
    T: 'a,
    R: FnMut(&mut T, &mut dyn Read, Endian) -> Result<()> + 'a,
    W: FnMut(&mut T, &mut dyn Write, Endian) -> Result<()> + 'a,
{
    match target {
        Some(target) => Box::new(Custom {
            target,
            read,
            write,
        }),
        None => nil(),
    }
}

/// Mapper built from two target-less procedures.
///
/// Created with [`from_fns`].
pub struct FnMapper<R, W> {
    read: R,
    write: W,
}

impl<R, W> Mapper for FnMapper<R, W>
where
    R: FnMut(&mut dyn Read, Endian) -> Result<()>,
    W: FnMut(&mut dyn Write, Endian) -> Result<()>,
{
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        (self.read)(r, endian)
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        (self.write)(w, endian)
    }
}

/// Creates a mapper from two procedures that carry their own state.
///
/// Useful for dispatching on a discriminant read from the wire, where the mapper for the
/// payload is only known once the tag is decoded.
pub fn from_fns<'a, R, W>(read: R, write: W) -> BoxMapper<'a>
where
    R: FnMut(&mut dyn Read, Endian) -> Result<()> + 'a,
    W: FnMut(&mut dyn Write, Endian) -> Result<()> + 'a,
{
    Box::new(FnMapper { read, write })
}

/// Runs a list of mappers in declaration order.
///
/// Both directions iterate front to back and stop at the first error. Nothing is rolled back:
/// targets already decoded and bytes already written stay as they are.
#[derive(Default)]
pub struct Sequence<'a> {
    mappers: Vec<BoxMapper<'a>>,
}

impl<'a> Sequence<'a> {
    /// Create a sequence from the given mappers.
    #[must_use]
    pub fn new(mappers: Vec<BoxMapper<'a>>) -> Self {
        Sequence { mappers }
    }

    /// Append a mapper to the end of the sequence.
    pub fn push(&mut self, mapper: BoxMapper<'a>) {
        self.mappers.push(mapper);
    }

    /// Number of mappers in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    /// Returns `true` if the sequence has no mappers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

impl Mapper for Sequence<'_> {
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        for mapper in &mut self.mappers {
            mapper.read(r, endian)?;
        }
        Ok(())
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        for mapper in &mut self.mappers {
            mapper.write(w, endian)?;
        }
        Ok(())
    }
}

/// Creates a [`Sequence`] from the given mappers.
#[must_use]
pub fn sequence(mappers: Vec<BoxMapper<'_>>) -> BoxMapper<'_> {
    Box::new(Sequence::new(mappers))
}

/// Ignores the caller's byte order and always uses a fixed one.
///
/// Used for fields with a mandated byte order embedded in a document that uses another, such as
/// UTF-16 text that is little-endian inside a big-endian format.
pub struct OverrideEndian<'a> {
    inner: BoxMapper<'a>,
    endian: Endian,
}

impl Mapper for OverrideEndian<'_> {
    fn read(&mut self, r: &mut dyn Read, _endian: Endian) -> Result<()> {
        self.inner.read(r, self.endian)
    }

    fn write(&mut self, w: &mut dyn Write, _endian: Endian) -> Result<()> {
        self.inner.write(w, self.endian)
    }
}

/// Creates an [`OverrideEndian`] pinning `mapper` to `endian`.
#[must_use]
pub fn override_endian(mapper: BoxMapper<'_>, endian: Endian) -> BoxMapper<'_> {
    Box::new(OverrideEndian {
        inner: mapper,
        endian,
    })
}

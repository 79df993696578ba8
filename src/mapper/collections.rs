//! Byte buffers and homogeneous sequences.
//!
//! # Length handling
//!
//! Three flavours exist for both raw bytes and element sequences:
//!
//! - **Known length** ([`fixed_bytes`], [`slice`]) - the count is not part of this mapper's wire
//!   footprint, it is a constant or a value decoded earlier.
//! - **Caller-held length** ([`len_bytes`], [`len_slice`]) - the count is written from, and read
//!   into, a field the caller owns. On write the field is authoritative. Keeping it in sync with
//!   the collection is the caller's job, nothing here checks it.
//! - **Transient length** ([`dynamic_slice`]) - a `u32` count computed from the collection on
//!   write and discarded after read.
//!
//! Reads build a fresh collection and only replace the target once every element decoded. Up-front
//! capacity taken from a wire count is capped at [`crate::io::PREALLOC_LIMIT`].

use std::io::{Read, Write};

use crate::{
    io::{read_bytes, write_bytes, PREALLOC_LIMIT},
    mapper::{primitives::SizeType, BoxMapper},
    size, Endian, Mapper, Result,
};

fn read_elements<E, F>(
    r: &mut dyn Read,
    endian: Endian,
    count: usize,
    factory: &mut F,
) -> Result<Vec<E>>
where
    E: Default,
    F: for<'e> FnMut(&'e mut E) -> BoxMapper<'e>,
{
    let mut items = Vec::with_capacity(count.min(PREALLOC_LIMIT));
    for _ in 0..count {
        let mut item = E::default();
        factory(&mut item).read(r, endian)?;
        items.push(item);
    }
    Ok(items)
}

fn write_elements<E, F>(
    w: &mut dyn Write,
    endian: Endian,
    items: &mut [E],
    count: usize,
    factory: &mut F,
) -> Result<()>
where
    E: Default,
    F: for<'e> FnMut(&'e mut E) -> BoxMapper<'e>,
{
    for item in items.iter_mut().take(count) {
        factory(item).write(w, endian)?;
    }
    for _ in items.len()..count {
        let mut padding = E::default();
        factory(&mut padding).write(w, endian)?;
    }
    Ok(())
}

/// Mapper for exactly `length` raw bytes.
pub struct FixedBytes<'a> {
    target: &'a mut Vec<u8>,
    length: usize,
}

impl Mapper for FixedBytes<'_> {
    fn read(&mut self, r: &mut dyn Read, _endian: Endian) -> Result<()> {
        *self.target = read_bytes(r, self.length)?;
        Ok(())
    }

    fn write(&mut self, w: &mut dyn Write, _endian: Endian) -> Result<()> {
        let end = self.target.len().min(self.length);
        write_bytes(w, &self.target[..end])?;
        if end < self.length {
            write_bytes(w, &vec![0u8; self.length - end])?;
        }
        Ok(())
    }
}

/// Maps exactly `length` raw bytes.
///
/// A shorter buffer is zero-padded on write, a longer one is cut at `length`.
#[must_use]
pub fn fixed_bytes(target: &mut Vec<u8>, length: usize) -> BoxMapper<'_> {
    Box::new(FixedBytes { target, length })
}

/// Mapper for a byte buffer prefixed by a caller-held length.
pub struct LenBytes<'a, S> {
    target: &'a mut Vec<u8>,
    length: &'a mut S,
}

impl<S: SizeType> Mapper for LenBytes<'_, S> {
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        size(&mut *self.length).read(r, endian)?;
        fixed_bytes(&mut *self.target, self.length.to_usize()?).read(r, endian)
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        size(&mut *self.length).write(w, endian)?;
        fixed_bytes(&mut *self.target, self.length.to_usize()?).write(w, endian)
    }
}

/// Maps `length` followed by that many raw bytes.
///
/// On write, `length` decides how many bytes go out, not `target.len()`.
#[must_use]
pub fn len_bytes<'a, S: SizeType>(target: &'a mut Vec<u8>, length: &'a mut S) -> BoxMapper<'a> {
    Box::new(LenBytes { target, length })
}

/// Mapper for exactly `count` elements.
pub struct Slice<'a, E, F> {
    target: &'a mut Vec<E>,
    count: usize,
    factory: F,
}

impl<E, F> Mapper for Slice<'_, E, F>
where
    E: Default,
    F: for<'e> FnMut(&'e mut E) -> BoxMapper<'e>,
{
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        *self.target = read_elements(r, endian, self.count, &mut self.factory)?;
        Ok(())
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        write_elements(w, endian, self.target, self.count, &mut self.factory)
    }
}

/// Maps exactly `count` elements, each through the mapper `factory` builds for it.
///
/// Writes emit `count` elements no matter how many the collection holds, padding with
/// `E::default()` or skipping the surplus.
///
/// # Examples
///
/// ```rust
/// use binmap::{int, slice, Endian, Mapper};
///
/// let mut values: Vec<u16> = Vec::new();
/// let mut input: &[u8] = &[0x00, 0x01, 0x00, 0x02];
/// slice(&mut values, 2, int).read(&mut input, Endian::Big)?;
/// assert_eq!(values, [1, 2]);
/// # Ok::<(), binmap::Error>(())
/// ```
pub fn slice<'a, E, F>(target: &'a mut Vec<E>, count: usize, factory: F) -> BoxMapper<'a>
where
    E: Default + 'a,
    F: for<'e> FnMut(&'e mut E) -> BoxMapper<'e> + 'a,
{
    Box::new(Slice {
        target,
        count,
        factory,
    })
}

/// Mapper for elements prefixed by a caller-held count.
pub struct LenSlice<'a, E, S, F> {
    target: &'a mut Vec<E>,
    count: &'a mut S,
    factory: F,
}

impl<E, S, F> Mapper for LenSlice<'_, E, S, F>
where
    E: Default,
    S: SizeType,
    F: for<'e> FnMut(&'e mut E) -> BoxMapper<'e>,
{
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        size(&mut *self.count).read(r, endian)?;
        *self.target = read_elements(r, endian, self.count.to_usize()?, &mut self.factory)?;
        Ok(())
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        size(&mut *self.count).write(w, endian)?;
        write_elements(
            w,
            endian,
            self.target,
            self.count.to_usize()?,
            &mut self.factory,
        )
    }
}

/// Maps `count` followed by that many elements.
///
/// On write, `count` decides how many elements go out, not `target.len()`.
pub fn len_slice<'a, E, S, F>(
    target: &'a mut Vec<E>,
    count: &'a mut S,
    factory: F,
) -> BoxMapper<'a>
where
    E: Default + 'a,
    S: SizeType,
    F: for<'e> FnMut(&'e mut E) -> BoxMapper<'e> + 'a,
{
    Box::new(LenSlice {
        target,
        count,
        factory,
    })
}

/// Mapper for elements prefixed by a transient `u32` count.
pub struct DynamicSlice<'a, E, F> {
    target: &'a mut Vec<E>,
    factory: F,
}

impl<E, F> Mapper for DynamicSlice<'_, E, F>
where
    E: Default,
    F: for<'e> FnMut(&'e mut E) -> BoxMapper<'e>,
{
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        let mut count = 0u32;
        size(&mut count).read(r, endian)?;
        *self.target = read_elements(r, endian, count.to_usize()?, &mut self.factory)?;
        Ok(())
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        let len = self.target.len();
        let mut count = u32::from_usize(len)?;
        size(&mut count).write(w, endian)?;
        write_elements(w, endian, self.target, len, &mut self.factory)
    }
}

/// Maps a `u32` element count followed by the elements, without a caller-held count field.
///
/// # Examples
///
/// ```rust
/// use binmap::{byte, dynamic_slice, Endian, Mapper};
///
/// let mut values = vec![7u8, 8, 9];
/// let mut out = Vec::new();
/// dynamic_slice(&mut values, byte).write(&mut out, Endian::Little)?;
/// assert_eq!(out, [3, 0, 0, 0, 7, 8, 9]);
/// # Ok::<(), binmap::Error>(())
/// ```
pub fn dynamic_slice<'a, E, F>(target: &'a mut Vec<E>, factory: F) -> BoxMapper<'a>
where
    E: Default + 'a,
    F: for<'e> FnMut(&'e mut E) -> BoxMapper<'e> + 'a,
{
    Box::new(DynamicSlice { target, factory })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{int, null_term_string, sequence, test::FailingReader, Error};

    #[derive(Default, Debug, PartialEq)]
    struct Point {
        x: i16,
        y: i16,
    }

    fn point(p: &mut Point) -> BoxMapper<'_> {
        sequence(vec![int(&mut p.x), int(&mut p.y)])
    }

    #[test]
    fn fixed_bytes_pad_and_cut() {
        let mut data = vec![1u8, 2];
        let mut out = Vec::new();
        fixed_bytes(&mut data, 4).write(&mut out, Endian::Big).unwrap();
        assert_eq!(out, [1, 2, 0, 0]);

        let mut out = Vec::new();
        fixed_bytes(&mut data, 1).write(&mut out, Endian::Big).unwrap();
        assert_eq!(out, [1]);

        let mut decoded = Vec::new();
        fixed_bytes(&mut decoded, 3)
            .read(&mut &[9u8, 8, 7, 6][..], Endian::Big)
            .unwrap();
        assert_eq!(decoded, [9, 8, 7]);
    }

    #[test]
    fn len_bytes_uses_length_field() {
        let mut data = b"abcd".to_vec();
        let mut len = 2u16;
        let mut out = Vec::new();
        len_bytes(&mut data, &mut len)
            .write(&mut out, Endian::Big)
            .unwrap();
        assert_eq!(out, [0, 2, b'a', b'b']);

        let mut decoded = Vec::new();
        let mut decoded_len = 0u16;
        len_bytes(&mut decoded, &mut decoded_len)
            .read(&mut out.as_slice(), Endian::Big)
            .unwrap();
        assert_eq!(decoded_len, 2);
        assert_eq!(decoded, b"ab");
    }

    #[test]
    fn slice_of_records() {
        let mut points = vec![Point { x: 1, y: -1 }, Point { x: 2, y: -2 }];
        let mut out = Vec::new();
        slice(&mut points, 2, point)
            .write(&mut out, Endian::Little)
            .unwrap();
        assert_eq!(out, [1, 0, 0xFF, 0xFF, 2, 0, 0xFE, 0xFF]);

        let mut decoded = Vec::new();
        slice(&mut decoded, 2, point)
            .read(&mut out.as_slice(), Endian::Little)
            .unwrap();
        assert_eq!(decoded, points);
    }

    #[test]
    fn slice_pads_to_count() {
        let mut values = vec![5u8];
        let mut out = Vec::new();
        slice(&mut values, 3, crate::byte)
            .write(&mut out, Endian::Big)
            .unwrap();
        assert_eq!(out, [5, 0, 0]);
    }

    #[test]
    fn slice_read_failure_keeps_target() {
        let mut values = vec![1u32, 2];
        let mut input: &[u8] = &[0, 0, 0, 9, 0, 0];
        let result = slice(&mut values, 2, int).read(&mut input, Endian::Big);
        assert!(matches!(result, Err(ref e) if e.is_eof()));
        assert_eq!(values, [1, 2]);
    }

    #[test]
    fn len_slice_of_strings() {
        let mut names = vec!["ab".to_string(), "c".to_string()];
        let mut count = 2u8;
        let mut out = Vec::new();
        len_slice(&mut names, &mut count, null_term_string)
            .write(&mut out, Endian::Big)
            .unwrap();
        assert_eq!(out, [2, b'a', b'b', 0, b'c', 0]);

        let mut decoded = Vec::new();
        let mut decoded_count = 0u8;
        len_slice(&mut decoded, &mut decoded_count, null_term_string)
            .read(&mut out.as_slice(), Endian::Big)
            .unwrap();
        assert_eq!(decoded_count, 2);
        assert_eq!(decoded, names);
    }

    #[test]
    fn dynamic_slice_huge_count_does_not_allocate() {
        let mut values: Vec<u64> = Vec::new();
        let mut input: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF, 0, 0];
        let result = dynamic_slice(&mut values, int).read(&mut input, Endian::Big);
        assert!(matches!(result, Err(ref e) if e.is_eof()));
        assert!(values.is_empty());
    }

    #[test]
    fn dynamic_slice_stream_failure() {
        let mut values: Vec<u8> = Vec::new();
        let mut reader = FailingReader::new(&[0, 0, 0, 3, 1], 5);
        let result = dynamic_slice(&mut values, crate::byte).read(&mut reader, Endian::Big);
        assert!(matches!(result, Err(Error::Io(_))));
    }
}

//! Column-oriented tables stored row by row.
//!
//! A [`DataTable`] persists a struct-of-arrays: every column is a separate `Vec`, all of the same
//! length, described by a shared row count. On the wire the table is row-major: the row count,
//! then for each row one element of every column in declaration order.
//!
//! ```text
//! columns  a = [a0, a1, a2]   b = [b0, b1, b2]
//! wire     | 3 (u32) | a0 b0 | a1 b1 | a2 b2 |
//! ```
//!
//! Reads decode into per-column scratch buffers and only commit the columns, together with the
//! row count, once every row decoded. A failed read leaves all columns and the row count as they
//! were. Writes verify that every column matches the row count before emitting a single byte.

use std::io::{Read, Write};

use log::debug;

use crate::{io::to_usize, mapper::BoxMapper, size, Endian, Error, Mapper, Result};

/// Initial capacity of each column's read scratch buffer.
pub const TABLE_SCRATCH_CAPACITY: usize = 16;

/// One column of a [`DataTable`].
///
/// Created with [`map_field`].
pub trait FieldMapper {
    /// Current length of the column.
    fn len(&self) -> usize;

    /// Returns `true` if the column has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard anything decoded into the scratch buffer.
    fn reset(&mut self);

    /// Decode the next element into the scratch buffer.
    ///
    /// # Errors
    /// Returns the element mapper's error.
    fn read_next(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()>;

    /// Replace the column with the scratch buffer.
    fn apply(&mut self);

    /// Encode the element at `row`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if `row` is past the end of the column, or the element
    /// mapper's error.
    fn write_row(&mut self, row: usize, w: &mut dyn Write, endian: Endian) -> Result<()>;
}

/// A column bound to an element mapper factory.
pub struct Field<'a, T, F> {
    column: &'a mut Vec<T>,
    scratch: Vec<T>,
    factory: F,
}

impl<T, F> FieldMapper for Field<'_, T, F>
where
    T: Default,
    F: for<'e> FnMut(&'e mut T) -> BoxMapper<'e>,
{
    fn len(&self) -> usize {
        self.column.len()
    }

    fn reset(&mut self) {
        self.scratch.clear();
    }

    fn read_next(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        let mut item = T::default();
        (self.factory)(&mut item).read(r, endian)?;
        self.scratch.push(item);
        Ok(())
    }

    fn apply(&mut self) {
        *self.column = std::mem::take(&mut self.scratch);
    }

    fn write_row(&mut self, row: usize, w: &mut dyn Write, endian: Endian) -> Result<()> {
        let item = self.column.get_mut(row).ok_or(Error::OutOfBounds)?;
        (self.factory)(item).write(w, endian)
    }
}

/// Binds a column to the mapper `factory` builds for each of its elements.
pub fn map_field<'a, T, F>(column: &'a mut Vec<T>, factory: F) -> Box<dyn FieldMapper + 'a>
where
    T: Default + 'a,
    F: for<'e> FnMut(&'e mut T) -> BoxMapper<'e> + 'a,
{
    Box::new(Field {
        column,
        scratch: Vec::with_capacity(TABLE_SCRATCH_CAPACITY),
        factory,
    })
}

/// Mapper for a set of equally long columns sharing one row count.
///
/// Created with [`data_table`].
pub struct DataTable<'a> {
    rows: &'a mut u32,
    fields: Vec<Box<dyn FieldMapper + 'a>>,
}

impl DataTable<'_> {
    fn check_balance(&self) -> Result<()> {
        let expected = u64::from(*self.rows);
        for (column, field) in self.fields.iter().enumerate() {
            if field.len() as u64 != expected {
                debug!(
                    "Rejecting data table write - column {} has {} rows, expected {}",
                    column,
                    field.len(),
                    expected
                );
                return Err(Error::UnbalancedTable {
                    column,
                    expected,
                    actual: field.len(),
                });
            }
        }
        Ok(())
    }
}

impl Mapper for DataTable<'_> {
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        for field in &mut self.fields {
            field.reset();
        }

        let mut rows = 0u32;
        size(&mut rows).read(r, endian)?;
        // a table without columns has no row data, only the count
        let row_count = if self.fields.is_empty() {
            0
        } else {
            to_usize(u64::from(rows))?
        };
        for _ in 0..row_count {
            for field in &mut self.fields {
                field.read_next(r, endian)?;
            }
        }

        for field in &mut self.fields {
            field.apply();
        }
        *self.rows = rows;
        Ok(())
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        self.check_balance()?;

        let mut rows = *self.rows;
        size(&mut rows).write(w, endian)?;
        if self.fields.is_empty() {
            return Ok(());
        }
        for row in 0..to_usize(u64::from(rows))? {
            for field in &mut self.fields {
                field.write_row(row, w, endian)?;
            }
        }
        Ok(())
    }
}

/// Maps a table of columns built with [`map_field`], sharing the row count `rows`.
///
/// On write `rows` must equal the length of every column, otherwise nothing is written and
/// [`Error::UnbalancedTable`] is returned. On read `rows` receives the decoded row count.
///
/// # Examples
///
/// ```rust
/// use binmap::{byte, data_table, map_field, Endian, Mapper};
///
/// let mut a = b"H,tee".to_vec();
/// let mut b = b"i hr!".to_vec();
/// let mut rows = 5u32;
///
/// let mut out = Vec::new();
/// data_table(&mut rows, vec![map_field(&mut a, byte), map_field(&mut b, byte)])
///     .write(&mut out, Endian::Big)?;
/// assert_eq!(&out[..4], &[0, 0, 0, 5]);
/// assert_eq!(&out[4..], b"Hi, there!");
/// # Ok::<(), binmap::Error>(())
/// ```
#[must_use]
pub fn data_table<'a>(rows: &'a mut u32, fields: Vec<Box<dyn FieldMapper + 'a>>) -> BoxMapper<'a> {
    Box::new(DataTable { rows, fields })
}

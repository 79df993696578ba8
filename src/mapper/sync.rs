//! Mappers over lock-guarded targets.
//!
//! The guard is taken when an operation starts and released when it returns, on every path
//! including errors and contained panics. Decoding mutates the target, so both [`lock`] and
//! [`rw_lock`] decode under an exclusive guard. Encoding only observes it: [`rw_lock`] encodes
//! under the shared guard, which lets several writers run side by side.
//!
//! A guard poisoned by a panic elsewhere fails the operation with [`crate::Error::LockError`].

use std::{
    io::{Read, Write},
    sync::{Mutex, RwLock},
};

use crate::{mapper::BoxMapper, Endian, Mapper, Result};

/// Mapper over a `Mutex`-guarded target.
pub struct Locked<'a, T, F> {
    target: &'a Mutex<T>,
    factory: F,
}

impl<T, F> Mapper for Locked<'_, T, F>
where
    F: for<'e> FnMut(&'e mut T) -> BoxMapper<'e>,
{
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        let mut guard = lock!(self.target)?;
        let result = (self.factory)(&mut *guard).read(r, endian);
        result
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        let mut guard = lock!(self.target)?;
        let result = (self.factory)(&mut *guard).write(w, endian);
        result
    }
}

/// Maps a `Mutex`-guarded target, holding the lock for the whole of each operation.
///
/// # Examples
///
/// ```rust
/// use std::sync::Mutex;
/// use binmap::{int, lock, Endian, Mapper};
///
/// let counter = Mutex::new(0u32);
/// let mut input: &[u8] = &[0, 0, 0, 9];
/// lock(&counter, int).read(&mut input, Endian::Big)?;
/// assert_eq!(*counter.lock().unwrap(), 9);
/// # Ok::<(), binmap::Error>(())
/// ```
pub fn lock<'a, T, F>(target: &'a Mutex<T>, factory: F) -> BoxMapper<'a>
where
    T: 'a,
    F: for<'e> FnMut(&'e mut T) -> BoxMapper<'e> + 'a,
{
    Box::new(Locked { target, factory })
}

/// Mapper over a `RwLock`-guarded target.
pub struct RwLocked<'a, T, F> {
    target: &'a RwLock<T>,
    factory: F,
}

impl<T, F> Mapper for RwLocked<'_, T, F>
where
    T: Clone,
    F: for<'e> FnMut(&'e mut T) -> BoxMapper<'e>,
{
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        let mut guard = write_lock!(self.target)?;
        let result = (self.factory)(&mut *guard).read(r, endian);
        result
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        let guard = read_lock!(self.target)?;
        // the shared guard only hands out `&T`, the mapper gets a private copy
        let mut snapshot = T::clone(&guard);
        let result = (self.factory)(&mut snapshot).write(w, endian);
        result
    }
}

/// Maps a `RwLock`-guarded target: exclusive guard to decode, shared guard to encode.
///
/// Encoding works on a clone taken under the shared guard, changes the element mappers make
/// while encoding are discarded. This includes a [`crate::normalize_write`] inside `factory`: the
/// normalized value goes out on the wire but never reaches the shared target. Use [`lock`] when
/// normalization has to persist.
pub fn rw_lock<'a, T, F>(target: &'a RwLock<T>, factory: F) -> BoxMapper<'a>
where
    T: Clone + 'a,
    F: for<'e> FnMut(&'e mut T) -> BoxMapper<'e> + 'a,
{
    Box::new(RwLocked { target, factory })
}

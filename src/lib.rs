// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # binmap
//!
//! [![Crates.io](https://img.shields.io/crates/v/binmap.svg)](https://crates.io/crates/binmap)
//! [![Documentation](https://docs.rs/binmap/badge.svg)](https://docs.rs/binmap)
//!
//! Composable binary mappers. Declare a binary layout once, as a tree of small read/write units,
//! and use the same declaration to decode from any `std::io::Read` and to encode into any
//! `std::io::Write`. No reflection, no derive, no per-field error plumbing: the layout is spelled
//! out explicitly and the first error anywhere in the tree is what comes back.
//!
//! ## Features
//!
//! - **Symmetric** - One declaration drives both directions
//! - **Composable** - Every mapper is a [`BoxMapper`], sequences, slices, maps and tables nest freely
//! - **Explicit byte order** - Every call names its [`Endian`], sub-trees can pin their own
//! - **Streaming** - Nothing is buffered beyond a single primitive
//! - **Guarded** - Hooks, lock guards and a panic boundary wrap any mapper
//!
//! ## Quick Start
//!
//! ```rust
//! use binmap::prelude::*;
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Contact {
//!     kind: u8,
//!     value: String,
//! }
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct User {
//!     id: u64,
//!     name: String,
//!     contacts: Vec<Contact>,
//! }
//!
//! fn contact(c: &mut Contact) -> BoxMapper<'_> {
//!     sequence(vec![byte(&mut c.kind), null_term_string(&mut c.value)])
//! }
//!
//! fn user(u: &mut User) -> BoxMapper<'_> {
//!     sequence(vec![
//!         int(&mut u.id),
//!         null_term_string(&mut u.name),
//!         dynamic_slice(&mut u.contacts, contact),
//!     ])
//! }
//!
//! let mut alice = User {
//!     id: 7,
//!     name: "alice".to_string(),
//!     contacts: vec![Contact { kind: 1, value: "alice@example.com".to_string() }],
//! };
//!
//! let mut wire = Vec::new();
//! user(&mut alice).write(&mut wire, Endian::Big)?;
//!
//! let mut decoded = User::default();
//! user(&mut decoded).read(&mut wire.as_slice(), Endian::Big)?;
//! assert_eq!(decoded, alice);
//! # Ok::<(), binmap::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`Mapper`] - The read/write capability, see the [`mapper`] module for the composition rules
//! - [`io`] - Byte order and stream transcoding, the only code that touches the stream
//! - [`Error`] and [`Result`] - One error type for every failure a mapper can report
//! - [`prelude`] - Glob import of everything needed to declare layouts
//!
//! ### Mapper Families
//!
//! - **Scalars**: [`byte`], [`boolean`], [`int`], [`float`], [`complex`], [`size`],
//!   [`varint`], [`uvarint`]
//! - **Text**: [`fixed_string`], [`null_term_string`], [`wide_fixed_string`],
//!   [`wide_null_term_string`]
//! - **Collections**: [`fixed_bytes`], [`len_bytes`], [`slice`], [`len_slice`],
//!   [`dynamic_slice`], [`map`], [`data_table`]
//! - **Structure**: [`sequence`], [`override_endian`], [`any`], [`from_fns`], [`or_nil`]
//! - **Wrappers**: [`EventHandler`], [`validate_read`], [`normalize_write`], [`lock`],
//!   [`rw_lock`], [`on_panic`]
//!
//! ## Ownership
//!
//! Mappers borrow their targets. A mapper tree is cheap to build and is meant to be built for an
//! operation and dropped right after, usually through a function such as `user` above. While the
//! tree exists the borrow checker keeps anyone else from touching the data it maps. Data shared
//! between threads goes through [`lock`] or [`rw_lock`].
//!
//! ## Error Handling
//!
//! ```rust
//! use binmap::{int, Endian, Error, Mapper};
//!
//! let mut value = 0u32;
//! let result = int(&mut value).read(&mut &[0u8, 1][..], Endian::Big);
//! match result {
//!     Ok(()) => println!("value: {value}"),
//!     Err(e) if e.is_eof() => println!("input too short"),
//!     Err(e) => println!("other error: {e}"),
//! }
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade and never installs a logger.
//! Truncated fixed-width strings and contained panics are reported at `warn`, rejected tables and
//! duplicate map keys at `debug`.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of everything needed to declare and run mappers.
///
/// # Example
///
/// ```rust
/// use binmap::prelude::*;
///
/// let mut flag = false;
/// boolean(&mut flag).read(&mut &[1u8][..], Endian::Little)?;
/// assert!(flag);
/// # Ok::<(), binmap::Error>(())
/// ```
pub mod prelude;

pub mod io;
pub mod mapper;

/// `binmap` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `binmap` Error type
///
/// The main error type for all operations in this crate. Provides detailed error information
/// for stream failures, absent targets, structural problems and caller-raised validation errors.
pub use error::Error;

/// Byte order policy
pub use io::{Endian, PREALLOC_LIMIT};

pub use mapper::{
    any, from_fns, nil, or_nil, override_endian, sequence, BoxMapper, Custom, FnMapper, Mapper,
    Nil, OverrideEndian, Sequence,
};

pub use mapper::{
    boolean, byte, complex, data_table, dynamic_slice, fixed_bytes, fixed_string, float, int,
    len_bytes, len_slice, lock, map, map_field, normalize_write, null_term_string, on_panic,
    rw_lock, size, slice, uvarint, validate_read, varint, wide_fixed_string,
    wide_null_term_string, Associative, Complex, EventHandler, FieldMapper, Subject,
    TABLE_SCRATCH_CAPACITY,
};

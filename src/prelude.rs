//! # binmap Prelude
//!
//! This module provides a convenient prelude for the types and functions needed to declare a
//! binary layout and run it in either direction.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all binmap operations
pub use crate::Error;

/// The result type used throughout binmap
pub use crate::Result;

/// Byte order policy passed to every read and write
pub use crate::Endian;

// ================================================================================================
// Mapper Core
// ================================================================================================

/// The read/write capability and its boxed form
pub use crate::{BoxMapper, Mapper};

/// Structural combinators
pub use crate::{any, from_fns, nil, or_nil, override_endian, sequence};

// ================================================================================================
// Scalars and Text
// ================================================================================================

/// Fixed-width and variable-length scalars
pub use crate::{boolean, byte, complex, float, int, size, uvarint, varint, Complex};

/// UTF-8 and UTF-16 strings
pub use crate::{fixed_string, null_term_string, wide_fixed_string, wide_null_term_string};

// ================================================================================================
// Collections
// ================================================================================================

/// Byte buffers and element sequences
pub use crate::{dynamic_slice, fixed_bytes, len_bytes, len_slice, slice};

/// Associative collections and column tables
pub use crate::{data_table, map, map_field};

// ================================================================================================
// Wrappers
// ================================================================================================

/// Lifecycle hooks
pub use crate::{normalize_write, validate_read, EventHandler, Subject};

/// Lock guards and the panic boundary
pub use crate::{lock, on_panic, rw_lock};

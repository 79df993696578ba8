//! Mappers that keep hold of their target so hooks can inspect it.
//!
//! A plain mapper borrows its target exclusively, which leaves a hook declared next to it no way
//! to look at the data. A [`Subject`] owns the borrow instead and builds the inner mapper on
//! demand through a factory, so it can hand the target to a validator after a read, or to a
//! normalizer before a write.

use std::io::{Read, Write};

use crate::{mapper::events::after, mapper::BoxMapper, Endian, Error, Mapper, Result};

type Validator<'a, T> = Box<dyn FnMut(&T, Option<&Error>) -> Result<()> + 'a>;
type Normalizer<'a, T> = Box<dyn FnMut(&mut T) -> Result<()> + 'a>;

/// A target bound together with the factory that builds its mapper.
pub struct Subject<'a, T, F> {
    target: &'a mut T,
    factory: F,
    validator: Option<Validator<'a, T>>,
    normalizer: Option<Normalizer<'a, T>>,
}

impl<'a, T, F> Subject<'a, T, F>
where
    F: for<'e> FnMut(&'e mut T) -> BoxMapper<'e>,
{
    /// Bind `target` to `factory`, without any hooks.
    pub fn new(target: &'a mut T, factory: F) -> Self {
        Subject {
            target,
            factory,
            validator: None,
            normalizer: None,
        }
    }

    /// Check the target after every read.
    ///
    /// The validator sees the read's error, if any. Its own error is only returned when the
    /// read itself succeeded.
    #[must_use]
    pub fn validate_read(
        mut self,
        validator: impl FnMut(&T, Option<&Error>) -> Result<()> + 'a,
    ) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Adjust the target before every write. An error aborts the write.
    #[must_use]
    pub fn normalize_write(mut self, normalizer: impl FnMut(&mut T) -> Result<()> + 'a) -> Self {
        self.normalizer = Some(Box::new(normalizer));
        self
    }
}

impl<T, F> Mapper for Subject<'_, T, F>
where
    F: for<'e> FnMut(&'e mut T) -> BoxMapper<'e>,
{
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        let result = (self.factory)(&mut *self.target).read(r, endian);
        match &mut self.validator {
            Some(validator) => after(result, |err| validator(&*self.target, err)),
            None => result,
        }
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        if let Some(normalizer) = &mut self.normalizer {
            normalizer(&mut *self.target)?;
        }
        (self.factory)(&mut *self.target).write(w, endian)
    }
}

/// Maps `target` through `factory`, then checks it with `validator` after every read.
///
/// # Examples
///
/// ```rust
/// use binmap::{int, validate_read, Endian, Error, Mapper};
///
/// let mut port = 0u16;
/// let mut input: &[u8] = &[0, 0];
/// let result = validate_read(&mut port, int, |port, _| match port {
///     0 => Err(Error::validation("port must not be zero")),
///     _ => Ok(()),
/// })
/// .read(&mut input, Endian::Big);
/// assert!(matches!(result, Err(Error::Validation(_))));
/// ```
pub fn validate_read<'a, T, F, V>(target: &'a mut T, factory: F, validator: V) -> BoxMapper<'a>
where
    T: 'a,
    F: for<'e> FnMut(&'e mut T) -> BoxMapper<'e> + 'a,
    V: FnMut(&T, Option<&Error>) -> Result<()> + 'a,
{
    Box::new(Subject::new(target, factory).validate_read(validator))
}

/// Maps `target` through `factory`, adjusting it with `normalizer` before every write.
pub fn normalize_write<'a, T, F, N>(target: &'a mut T, factory: F, normalizer: N) -> BoxMapper<'a>
where
    T: 'a,
    F: for<'e> FnMut(&'e mut T) -> BoxMapper<'e> + 'a,
    N: FnMut(&mut T) -> Result<()> + 'a,
{
    Box::new(Subject::new(target, factory).normalize_write(normalizer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dynamic_slice, int, null_term_string};

    #[derive(Default)]
    struct Roster {
        names: Vec<String>,
    }

    fn roster(r: &mut Roster) -> BoxMapper<'_> {
        dynamic_slice(&mut r.names, null_term_string)
    }

    fn require_names(r: &Roster, _err: Option<&Error>) -> Result<()> {
        if r.names.is_empty() {
            return Err(Error::validation("at least one name is required"));
        }
        Ok(())
    }

    #[test]
    fn validator_rejects_decoded_value() {
        let mut decoded = Roster::default();
        let result = validate_read(&mut decoded, roster, require_names)
            .read(&mut &[0u8, 0, 0, 0][..], Endian::Big);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn validator_does_not_mask_stream_error() {
        let mut decoded = Roster::default();
        let result =
            validate_read(&mut decoded, roster, require_names).read(&mut &[0u8][..], Endian::Big);
        assert!(matches!(result, Err(ref e) if e.is_eof()));
    }

    #[test]
    fn normalizer_runs_before_write() {
        let mut value = 300u16;
        let mut out = Vec::new();
        normalize_write(&mut value, int, |v| {
            *v = (*v).min(255);
            Ok(())
        })
        .write(&mut out, Endian::Big)
        .unwrap();
        assert_eq!(value, 255);
        assert_eq!(out, [0, 255]);
    }

    #[test]
    fn normalizer_error_aborts_write() {
        let mut empty = Roster::default();
        let mut out = Vec::new();
        let result = normalize_write(&mut empty, roster, |r| {
            if r.names.is_empty() {
                return Err(Error::validation("empty roster"));
            }
            Ok(())
        })
        .write(&mut out, Endian::Big);
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(out.is_empty());
    }

    #[test]
    fn chained_hooks() {
        let mut source = Roster {
            names: vec![" ada ".to_string()],
        };
        let mut out = Vec::new();
        Subject::new(&mut source, roster)
            .normalize_write(|r| {
                for name in &mut r.names {
                    *name = name.trim().to_string();
                }
                Ok(())
            })
            .validate_read(require_names)
            .write(&mut out, Endian::Big)
            .unwrap();
        assert_eq!(out, [0, 0, 0, 1, b'a', b'd', b'a', 0]);

        let mut decoded = Roster::default();
        Subject::new(&mut decoded, roster)
            .validate_read(require_names)
            .read(&mut out.as_slice(), Endian::Big)
            .unwrap();
        assert_eq!(decoded.names, ["ada"]);
    }
}

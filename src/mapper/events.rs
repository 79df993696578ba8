//! Lifecycle hooks around a mapper.
//!
//! `before_*` hooks run first and abort the operation when they fail, the inner mapper never
//! runs. `after_*` hooks always run, even when the inner mapper failed, and receive that failure.
//! An `after_*` hook can turn a success into an error, but it can never replace or hide an error
//! the inner mapper already returned.

use std::io::{Read, Write};

use crate::{mapper::BoxMapper, Endian, Error, Mapper, Result};

type BeforeHook<'a> = Box<dyn FnMut() -> Result<()> + 'a>;
type AfterHook<'a> = Box<dyn FnMut(Option<&Error>) -> Result<()> + 'a>;

/// Runs an `after_*` hook and resolves which error wins.
pub(crate) fn after<F>(result: Result<()>, hook: F) -> Result<()>
where
    F: FnOnce(Option<&Error>) -> Result<()>,
{
    let hook_result = hook(result.as_ref().err());
    result.and(hook_result)
}

/// Wraps a mapper with lifecycle hooks.
///
/// # Examples
///
/// ```rust
/// use binmap::{int, Endian, Error, EventHandler, Mapper};
///
/// let mut value = 0u8;
/// let mut input: &[u8] = &[0x05];
/// let result = EventHandler::new(int(&mut value))
///     .after_read(|err| match err {
///         Some(_) => Ok(()),
///         None => Err(Error::validation("read succeeded, but was rejected")),
///     })
///     .read(&mut input, Endian::Big);
/// assert!(matches!(result, Err(Error::Validation(_))));
/// ```
pub struct EventHandler<'a> {
    inner: BoxMapper<'a>,
    before_read: Option<BeforeHook<'a>>,
    after_read: Option<AfterHook<'a>>,
    before_write: Option<BeforeHook<'a>>,
    after_write: Option<AfterHook<'a>>,
}

impl<'a> EventHandler<'a> {
    /// Wrap `inner` without any hooks.
    #[must_use]
    pub fn new(inner: BoxMapper<'a>) -> Self {
        EventHandler {
            inner,
            before_read: None,
            after_read: None,
            before_write: None,
            after_write: None,
        }
    }

    /// Run `hook` before every read.
    #[must_use]
    pub fn before_read(mut self, hook: impl FnMut() -> Result<()> + 'a) -> Self {
        self.before_read = Some(Box::new(hook));
        self
    }

    /// Run `hook` after every read, with the read's error if it failed.
    #[must_use]
    pub fn after_read(mut self, hook: impl FnMut(Option<&Error>) -> Result<()> + 'a) -> Self {
        self.after_read = Some(Box::new(hook));
        self
    }

    /// Run `hook` before every write.
    #[must_use]
    pub fn before_write(mut self, hook: impl FnMut() -> Result<()> + 'a) -> Self {
        self.before_write = Some(Box::new(hook));
        self
    }

    /// Run `hook` after every write, with the write's error if it failed.
    #[must_use]
    pub fn after_write(mut self, hook: impl FnMut(Option<&Error>) -> Result<()> + 'a) -> Self {
        self.after_write = Some(Box::new(hook));
        self
    }

    /// Box the handler for use inside other combinators.
    #[must_use]
    pub fn boxed(self) -> BoxMapper<'a> {
        Box::new(self)
    }
}

impl Mapper for EventHandler<'_> {
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        if let Some(hook) = &mut self.before_read {
            hook()?;
        }
        let result = self.inner.read(r, endian);
        match &mut self.after_read {
            Some(hook) => after(result, hook),
            None => result,
        }
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        if let Some(hook) = &mut self.before_write {
            hook()?;
        }
        let result = self.inner.write(w, endian);
        match &mut self.after_write {
            Some(hook) => after(result, hook),
            None => result,
        }
    }
}

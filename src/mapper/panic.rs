//! Fault boundary for untrusted mappers.
//!
//! [`on_panic`] runs the wrapped mapper under `std::panic::catch_unwind` and turns a panic into
//! [`Error::Panic`]. The handler gets the raw panic payload and may contribute its own error,
//! which is attached to the result. Panics outside a boundary unwind as usual.
//!
//! Only unwinding panics can be contained. A binary built with `panic = "abort"` still aborts.

use std::{
    any::Any,
    io::{Read, Write},
    panic::{catch_unwind, AssertUnwindSafe},
};

use log::warn;

use crate::{mapper::BoxMapper, Endian, Error, Mapper, Result};

fn payload_message(payload: &(dyn Any + Send)) -> Option<String> {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
}

/// Mapper that contains panics raised by the mapper it wraps.
///
/// Created with [`on_panic`].
pub struct OnPanic<'a, H> {
    inner: BoxMapper<'a>,
    handler: H,
}

impl<H> OnPanic<'_, H>
where
    H: FnMut(&(dyn Any + Send)) -> Option<Error>,
{
    fn contain(&mut self, payload: &(dyn Any + Send), direction: &str) -> Error {
        let message = payload_message(payload);
        warn!(
            "Contained panic during {} - {}",
            direction,
            message.as_deref().unwrap_or("non-string payload")
        );

        Error::Panic {
            message,
            handler: (self.handler)(payload).map(Box::new),
        }
    }
}

impl<H> Mapper for OnPanic<'_, H>
where
    H: FnMut(&(dyn Any + Send)) -> Option<Error>,
{
    fn read(&mut self, r: &mut dyn Read, endian: Endian) -> Result<()> {
        let inner = &mut self.inner;
        match catch_unwind(AssertUnwindSafe(|| inner.read(r, endian))) {
            Ok(result) => result,
            Err(payload) => Err(self.contain(&*payload, "read")),
        }
    }

    fn write(&mut self, w: &mut dyn Write, endian: Endian) -> Result<()> {
        let inner = &mut self.inner;
        match catch_unwind(AssertUnwindSafe(|| inner.write(w, endian))) {
            Ok(result) => result,
            Err(payload) => Err(self.contain(&*payload, "write")),
        }
    }
}

/// Wraps `mapper` in a fault boundary.
///
/// A panic inside `mapper` becomes [`Error::Panic`], carrying the panic message when it is a
/// string and whatever error `handler` returns for the payload.
///
/// # Examples
///
/// ```rust
/// use binmap::{from_fns, on_panic, Endian, Error, Mapper};
///
/// let faulty = from_fns(|_, _| panic!("bad input"), |_, _| Ok(()));
/// let result = on_panic(faulty, |_| None).read(&mut &[][..], Endian::Big);
/// assert!(matches!(result, Err(Error::Panic { message: Some(ref m), .. }) if m == "bad input"));
/// ```
pub fn on_panic<'a, H>(mapper: BoxMapper<'a>, handler: H) -> BoxMapper<'a>
where
    H: FnMut(&(dyn Any + Send)) -> Option<Error> + 'a,
{
    Box::new(OnPanic {
        inner: mapper,
        handler,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{byte, from_fns, lock};

    #[test]
    fn handler_error_is_attached() {
        let code = std::hint::black_box(42);
        let faulty = from_fns(|_, _| Ok(()), move |_, _| panic!("write {code}"));
        let mut out = Vec::new();
        let result = on_panic(faulty, |payload| {
            assert!(payload.is::<String>() || payload.is::<&str>());
            Some(Error::validation("handled"))
        })
        .write(&mut out, Endian::Big);

        match result {
            Err(Error::Panic { message, handler }) => {
                assert_eq!(message.as_deref(), Some("write 42"));
                assert!(matches!(handler.as_deref(), Some(Error::Validation(_))));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn owned_and_static_payloads() {
        let owned = std::panic::catch_unwind(|| std::panic::panic_any(format!("row {}", 7)))
            .unwrap_err();
        assert_eq!(payload_message(&*owned).as_deref(), Some("row 7"));

        let literal = std::panic::catch_unwind(|| panic!("row")).unwrap_err();
        assert_eq!(payload_message(&*literal).as_deref(), Some("row"));

        let other = std::panic::catch_unwind(|| std::panic::panic_any(7u32)).unwrap_err();
        assert_eq!(payload_message(&*other), None);
    }

    #[test]
    fn clean_operations_pass_through() {
        let mut value = 3u8;
        let mut out = Vec::new();
        on_panic(byte(&mut value), |_| None)
            .write(&mut out, Endian::Big)
            .unwrap();
        assert_eq!(out, [3]);

        let mut input: &[u8] = &[];
        let result = on_panic(byte(&mut value), |_| None).read(&mut input, Endian::Big);
        assert!(matches!(result, Err(ref e) if e.is_eof()));
    }

    #[test]
    fn guard_released_after_contained_panic() {
        let target = Mutex::new(0u8);
        let result = on_panic(
            lock(&target, |_| from_fns(|_, _| panic!("inside lock"), |_, _| Ok(()))),
            |_| None,
        )
        .read(&mut &[0u8][..], Endian::Big);
        assert!(matches!(result, Err(Error::Panic { handler: None, .. })));
        // poisoned, but not held
        assert!(matches!(
            lock(&target, byte).read(&mut &[1u8][..], Endian::Big),
            Err(Error::LockError)
        ));
    }
}

//! Integration tests for hooks, lock guards and the panic boundary used inside composed layouts.

use std::{
    cell::RefCell,
    sync::{Arc, Mutex, RwLock},
    thread,
};

use binmap::{prelude::*, Result};

#[derive(Debug, Default, Clone, PartialEq)]
struct Contact {
    email: String,
    allow_marketing: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct User {
    id: u64,
    username: String,
    contacts: Vec<Contact>,
}

fn require_email(c: &Contact) -> Result<()> {
    if c.email.is_empty() {
        return Err(Error::validation("empty email"));
    }
    Ok(())
}

fn contact_fields(c: &mut Contact) -> BoxMapper<'_> {
    sequence(vec![
        fixed_string(&mut c.email, 64),
        boolean(&mut c.allow_marketing),
    ])
}

fn contact(c: &mut Contact) -> BoxMapper<'_> {
    Box::new(
        Subject::new(c, contact_fields)
            .validate_read(|c, _| require_email(c))
            .normalize_write(|c| {
                c.email = c.email.trim().to_lowercase();
                require_email(c)
            }),
    )
}

fn user(u: &mut User) -> BoxMapper<'_> {
    sequence(vec![
        int(&mut u.id),
        null_term_string(&mut u.username),
        dynamic_slice(&mut u.contacts, contact),
    ])
}

/// Normalization runs for every element before it is written.
#[test]
fn test_contacts_normalized_on_write() -> Result<()> {
    let mut source = User {
        id: 1,
        username: "jdoe".to_string(),
        contacts: vec![Contact {
            email: "  JDoe@Example.com ".to_string(),
            allow_marketing: true,
        }],
    };

    let mut wire = Vec::new();
    user(&mut source).write(&mut wire, Endian::Big)?;
    assert_eq!(source.contacts[0].email, "jdoe@example.com");

    let mut decoded = User::default();
    user(&mut decoded).read(&mut wire.as_slice(), Endian::Big)?;
    assert_eq!(decoded, source);
    Ok(())
}

/// A rejected element aborts the whole write with the validation error, unwrapped.
#[test]
fn test_invalid_contact_aborts_write() {
    let mut source = User {
        id: 1,
        username: "jdoe".to_string(),
        contacts: vec![Contact::default()],
    };

    let mut wire = Vec::new();
    let result = user(&mut source).write(&mut wire, Endian::Big);
    assert!(matches!(result, Err(Error::Validation(ref m)) if m == "empty email"));
    // id, name and count already went out, nothing is rolled back
    assert_eq!(wire.len(), 8 + 5 + 4);
}

/// A decoded element that breaks a rule fails the read.
#[test]
fn test_invalid_contact_rejected_on_read() -> Result<()> {
    let mut wire = Vec::new();
    let mut id = 5u64;
    let mut name = "x".to_string();
    let mut contacts = vec![Contact::default()];
    sequence(vec![
        int(&mut id),
        null_term_string(&mut name),
        dynamic_slice(&mut contacts, contact_fields),
    ])
    .write(&mut wire, Endian::Little)?;

    let mut decoded = User::default();
    let result = user(&mut decoded).read(&mut wire.as_slice(), Endian::Little);
    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!(decoded.id, 5);
    assert!(decoded.contacts.is_empty());
    Ok(())
}

/// Hooks observe the order of operations across a nested layout.
#[test]
fn test_event_order() -> Result<()> {
    let events = RefCell::new(Vec::new());
    let mut source = User {
        id: 9,
        username: "ev".to_string(),
        contacts: Vec::new(),
    };

    let mut wire = Vec::new();
    EventHandler::new(user(&mut source))
        .before_write(|| {
            events.borrow_mut().push("before_write");
            Ok(())
        })
        .after_write(|err| {
            assert!(err.is_none());
            events.borrow_mut().push("after_write");
            Ok(())
        })
        .write(&mut wire, Endian::Big)?;

    let mut decoded = User::default();
    EventHandler::new(user(&mut decoded))
        .before_read(|| {
            events.borrow_mut().push("before_read");
            Ok(())
        })
        .after_read(|_| {
            events.borrow_mut().push("after_read");
            Ok(())
        })
        .read(&mut wire.as_slice(), Endian::Big)?;

    assert_eq!(
        *events.borrow(),
        ["before_write", "after_write", "before_read", "after_read"]
    );
    assert_eq!(decoded, source);
    Ok(())
}

/// Concurrent decodes into one guarded record never interleave: the final value is always one
/// of the complete inputs.
#[test]
fn test_locked_reads_do_not_tear() -> Result<()> {
    let inputs: Vec<Vec<u8>> = (0..8u64)
        .map(|n| {
            let mut record = User {
                id: n,
                username: format!("user{n}"),
                contacts: vec![Contact {
                    email: format!("user{n}@example.com"),
                    allow_marketing: n % 2 == 0,
                }],
            };
            let mut wire = Vec::new();
            let result = user(&mut record).write(&mut wire, Endian::Big);
            result.map(|()| wire)
        })
        .collect::<Result<_>>()?;

    let shared = Arc::new(Mutex::new(User::default()));
    let handles: Vec<_> = inputs
        .iter()
        .cloned()
        .map(|wire| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                let result = lock(&*shared, user).read(&mut wire.as_slice(), Endian::Big);
                result
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("reader thread panicked")?;
    }

    let last = shared.lock().expect("lock poisoned").clone();
    let n = last.id;
    assert_eq!(last.username, format!("user{n}"));
    assert_eq!(last.contacts[0].email, format!("user{n}@example.com"));
    Ok(())
}

/// Readers and writers sharing one rwlock-guarded record.
#[test]
fn test_rw_lock_readers_and_writers() -> Result<()> {
    let shared = Arc::new(RwLock::new(User {
        id: 1,
        username: "initial".to_string(),
        contacts: Vec::new(),
    }));

    let writers: Vec<_> = (0..4)
        .map(|_| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                let mut wire = Vec::new();
                let result = rw_lock(&*shared, user).write(&mut wire, Endian::Little);
                result.map(|()| wire)
            })
        })
        .collect();

    let mut update = User {
        id: 2,
        username: "updated".to_string(),
        contacts: Vec::new(),
    };
    let mut wire = Vec::new();
    user(&mut update).write(&mut wire, Endian::Little)?;
    rw_lock(&*shared, user).read(&mut wire.as_slice(), Endian::Little)?;

    for handle in writers {
        let encoded = handle.join().expect("writer thread panicked")?;
        let mut snapshot = User::default();
        user(&mut snapshot).read(&mut encoded.as_slice(), Endian::Little)?;
        assert!(snapshot.id == 1 || snapshot.id == 2);
    }
    assert_eq!(*shared.read().expect("lock poisoned"), update);
    Ok(())
}

/// A panicking third-party element mapper is contained inside the enclosing sequence.
#[test]
fn test_panic_boundary_in_sequence() {
    fn untrusted(_value: &mut u32) -> BoxMapper<'_> {
        from_fns(
            |_, _| Ok(()),
            |_, _| panic!("index out of range in plugin"),
        )
    }

    let mut header = 1u8;
    let mut values = vec![1u32, 2, 3];
    let mut wire = Vec::new();
    let result = sequence(vec![
        byte(&mut header),
        on_panic(dynamic_slice(&mut values, untrusted), |_| {
            Some(Error::validation("plugin failed"))
        }),
    ])
    .write(&mut wire, Endian::Big);

    match result {
        Err(Error::Panic { message, handler }) => {
            assert_eq!(message.as_deref(), Some("index out of range in plugin"));
            assert!(matches!(handler.as_deref(), Some(Error::Validation(_))));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    // header and element count were written before the fault
    assert_eq!(wire, [1, 0, 0, 0, 3]);
}

/// Absent optional sections fail deterministically instead of silently writing nothing.
#[test]
fn test_optional_section_is_nil() {
    let mut id = 3u64;
    let mut extra: Option<User> = None;
    let mut wire = Vec::new();
    let result = sequence(vec![int(&mut id), or_nil(extra.as_mut(), user)])
        .write(&mut wire, Endian::Big);
    assert!(matches!(result, Err(Error::NilTarget)));
    assert_eq!(wire.len(), 8);
}

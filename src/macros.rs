/// Helper macro for locking a mutex-guarded target
///
/// Evaluates to a `Result` carrying the guard, a poisoned mutex maps to [`crate::Error::LockError`].
///
/// ```rust, ignore
///  let mut data = lock!(my_mutex)?;
///  data.some_field = 42;
/// ```
macro_rules! lock {
    ($lock:expr) => {
        $lock.lock().map_err(|_| crate::Error::LockError)
    };
}

/// Helper macro for taking the shared guard of a rwlock-guarded target
///
/// ```rust, ignore
///  let data = read_lock!(my_rwlock)?;
///  println!("{}", data.some_field);
/// ```
macro_rules! read_lock {
    ($rwlock:expr) => {
        $rwlock.read().map_err(|_| crate::Error::LockError)
    };
}

/// Helper macro for taking the exclusive guard of a rwlock-guarded target
///
/// ```rust, ignore
///  let mut data = write_lock!(my_rwlock)?;
///  data.some_field = 42;
/// ```
macro_rules! write_lock {
    ($rwlock:expr) => {
        $rwlock.write().map_err(|_| crate::Error::LockError)
    };
}

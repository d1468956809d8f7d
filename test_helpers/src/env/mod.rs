//! Helpers for safely mutating environment variables in tests.
//!
//! Settings tests read `PRETTYCONF_*` variables, so every mutation takes a
//! global re-entrant mutex and returns an RAII guard that restores the
//! previous state when dropped. Stacked guards for one key restore in LIFO
//! order. Use [`scope_with`] when a test needs several variables held
//! exclusively for its whole body.
//!
//! # Examples
//!
//! ```
//! use prettyconf_test_helpers::env;
//!
//! let _g = env::set_var("PRETTYCONF_FORMAT", "json");
//! // `PRETTYCONF_FORMAT` is `json` for the duration of the guard.
//! ```

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::sync::LazyLock;

static ENV_MUTEX: LazyLock<ReentrantMutex<()>> = LazyLock::new(ReentrantMutex::default);

/// Applies `mutator` to `key` with the lock held, remembering the old value.
fn mutate_locked<F>(key: String, mutator: F, _guard: &ReentrantMutexGuard<'static, ()>) -> EnvVarGuard
where
    F: FnOnce(&str),
{
    let original = env::var_os(&key);
    mutator(&key);
    EnvVarGuard { key, original }
}

fn write_var(key: &str, value: &OsStr) {
    // SAFETY: callers hold `ENV_MUTEX`.
    unsafe { env::set_var(key, value) };
}

fn clear_var(key: &str) {
    // SAFETY: callers hold `ENV_MUTEX`.
    unsafe { env::remove_var(key) };
}

/// RAII guard restoring an environment variable to its prior value on drop.
#[must_use = "dropping restores the prior value"]
pub struct EnvVarGuard {
    key: String,
    original: Option<OsString>,
}

impl fmt::Debug for EnvVarGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvVarGuard")
            .field("key", &self.key)
            .field("had_original", &self.original.is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        let _guard = ENV_MUTEX.lock();
        match self.original.take() {
            Some(value) => write_var(&self.key, &value),
            None => clear_var(&self.key),
        }
    }
}

/// Holds the environment lock; mutations made through it never interleave
/// with other tests.
#[must_use = "dropping releases the environment lock"]
pub struct EnvVarLock {
    guard: ReentrantMutexGuard<'static, ()>,
}

impl EnvVarLock {
    /// Sets an environment variable while holding the lock.
    pub fn set_var<K, V>(&self, key: K, value: V) -> EnvVarGuard
    where
        K: Into<String>,
        V: AsRef<OsStr>,
    {
        mutate_locked(key.into(), |k| write_var(k, value.as_ref()), &self.guard)
    }

    /// Removes an environment variable while holding the lock.
    pub fn remove_var<K>(&self, key: K) -> EnvVarGuard
    where
        K: Into<String>,
    {
        mutate_locked(key.into(), clear_var, &self.guard)
    }
}

/// Keeps the lock and a set of guards alive together.
#[must_use = "dropping releases the environment lock and restores guards"]
pub struct EnvScope {
    guards: Vec<EnvVarGuard>,
    _lock: EnvVarLock,
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        // Restore while `_lock` is still held.
        drop(std::mem::take(&mut self.guards));
    }
}

/// Sets an environment variable and returns a guard restoring its prior value.
///
/// # Examples
/// ```
/// use prettyconf_test_helpers::env;
/// let _g = env::set_var("PRETTYCONF_DOC_SET", "bar");
/// assert!(matches!(std::env::var("PRETTYCONF_DOC_SET"), Ok(ref value) if value == "bar"));
/// ```
pub fn set_var<K, V>(key: K, value: V) -> EnvVarGuard
where
    K: Into<String>,
    V: AsRef<OsStr>,
{
    lock().set_var(key, value)
}

/// Removes an environment variable and returns a guard restoring its prior value.
pub fn remove_var<K>(key: K) -> EnvVarGuard
where
    K: Into<String>,
{
    lock().remove_var(key)
}

/// Acquires the global environment lock for the lifetime of the guard.
pub fn lock() -> EnvVarLock {
    EnvVarLock {
        guard: ENV_MUTEX.lock(),
    }
}

/// Builds guards under the lock and keeps the lock until the scope drops.
///
/// # Examples
/// ```
/// use prettyconf_test_helpers::env;
///
/// let _scope = env::scope_with(|lock| {
///     vec![lock.remove_var("PRETTYCONF_OUTPUT"), lock.set_var("PRETTYCONF_FORMAT", "yaml")]
/// });
/// ```
pub fn scope_with<F>(builder: F) -> EnvScope
where
    F: FnOnce(&EnvVarLock) -> Vec<EnvVarGuard>,
{
    let held = lock();
    let guards = builder(&held);
    EnvScope {
        guards,
        _lock: held,
    }
}

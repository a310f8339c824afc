//! Spin-wait locks used where the documented protocol holds a lock across
//! multiple calls (the document write lock, the column iterator lock) rather
//! than for the duration of a single critical section.

use std::cell::UnsafeCell;
use std::hint;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};

/// A bare acquire/release flag, for protocols that cannot express the
/// critical section as a single Rust scope (e.g. a lock acquired in one
/// call and released in another).
#[derive(Debug, Default)]
pub struct SpinFlag(AtomicBool);

impl SpinFlag {
    pub const fn new() -> Self {
        SpinFlag(AtomicBool::new(false))
    }

    /// Blocks until the flag can be set from false to true.
    pub fn acquire(&self) {
        while self
            .0
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            while self.0.load(Ordering::Relaxed) {
                hint::spin_loop();
            }
        }
    }

    /// Non-blocking variant of [`acquire`](Self::acquire).
    pub fn try_acquire(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    pub fn release(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_locked(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// RAII spinlock guarding a value, for critical sections that fit in one scope.
#[derive(Debug, Default)]
pub struct Spinlock<T> {
    flag: SpinFlag,
    value: UnsafeCell<T>,
}

unsafe impl<T: Send> Sync for Spinlock<T> {}
unsafe impl<T: Send> Send for Spinlock<T> {}

impl<T> Spinlock<T> {
    pub const fn new(value: T) -> Self {
        Spinlock {
            flag: SpinFlag::new(),
            value: UnsafeCell::new(value),
        }
    }

    pub fn lock(&self) -> SpinGuard<'_, T> {
        self.flag.acquire();
        SpinGuard { lock: self }
    }

    pub fn try_lock(&self) -> Option<SpinGuard<'_, T>> {
        if self.flag.try_acquire() {
            Some(SpinGuard { lock: self })
        } else {
            None
        }
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

pub struct SpinGuard<'a, T> {
    lock: &'a Spinlock<T>,
}

impl<T> Deref for SpinGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> DerefMut for SpinGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<T> Drop for SpinGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.flag.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn flag_round_trips() {
        let flag = SpinFlag::new();
        assert!(flag.try_acquire());
        assert!(!flag.try_acquire());
        flag.release();
        assert!(flag.try_acquire());
    }

    #[test]
    fn spinlock_serializes_increments() {
        let lock = Arc::new(Spinlock::new(0u64));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let lock = Arc::clone(&lock);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    *lock.lock() += 1;
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(*lock.lock(), 8000);
    }

    #[test]
    fn try_lock_fails_while_held() {
        let lock = Spinlock::new(());
        let guard = lock.lock();
        assert!(lock.try_lock().is_none());
        drop(guard);
        assert!(lock.try_lock().is_some());
    }
}

//! Scratchpads: per-thread work buffers reused across operations and
//! scrubbed on every exit path, including unwinding.
//!
//! A scratchpad holds the three `D`-limb buffers the multi-step operations
//! need: `normalize` stages its candidate and its high-limb carry in two of
//! them, `inv`/`div` stage the divisor in one, `legendre` keeps a read-only
//! copy of the input in one. Exactly one scratchpad is cached per thread per
//! field instantiation, lazily created on first use.

use std::cell::RefCell;

/// Three `D`-limb work buffers, reused across operations within one thread.
pub(crate) struct Scratchpad<const D: usize> {
    pub d0: [i64; D],
    pub d1: [i64; D],
    pub d2: [i64; D],
}

impl<const D: usize> Scratchpad<D> {
    fn new() -> Self {
        Self {
            d0: [0; D],
            d1: [0; D],
            d2: [0; D],
        }
    }

    /// Overwrites every limb of every buffer with all-ones, through a
    /// volatile write so the compiler cannot prove the store is dead and
    /// elide it.
    fn scrub(&mut self) {
        for buf in [&mut self.d0, &mut self.d1, &mut self.d2] {
            for limb in buf.iter_mut() {
                // SAFETY: `limb` is a valid, uniquely-borrowed `i64` for the
                // duration of this write.
                unsafe { std::ptr::write_volatile(limb, -1i64) };
            }
        }
    }
}

struct ScrubOnDrop<'a, const D: usize>(&'a mut Scratchpad<D>);

impl<const D: usize> Drop for ScrubOnDrop<'_, D> {
    fn drop(&mut self) {
        self.0.scrub();
    }
}

/// Runs `f` against this thread's scratchpad for field width `D`, creating
/// it on first use, and scrubs every buffer before returning — on a normal
/// return, an early return, or a panic unwinding through `f`.
///
/// Scratchpads are never shared across threads: each thread has its own
/// `thread_local!` slot, keyed (via monomorphization) by `D`.
pub(crate) fn with_scratchpad<const D: usize, R>(f: impl FnOnce(&mut Scratchpad<D>) -> R) -> R {
    // `thread_local!` expands to a plain item in this function's body, so a
    // generic function gets one such static per monomorphization — each
    // limb width `D` ends up with its own independent thread-local slot.
    thread_local! {
        static CACHE: RefCell<Option<Box<Scratchpad<D>>>> = const { RefCell::new(None) };
    }

    CACHE.with(|cell| {
        let mut slot = cell.borrow_mut();
        let pad = slot.get_or_insert_with(|| Box::new(Scratchpad::new()));
        let mut guard = ScrubOnDrop(pad.as_mut());
        f(guard.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratchpad_is_scrubbed_after_use() {
        with_scratchpad::<4, _>(|pad| {
            pad.d0 = [1, 2, 3, 4];
            pad.d1 = [5, 6, 7, 8];
            pad.d2 = [9, 10, 11, 12];
        });

        with_scratchpad::<4, _>(|pad| {
            assert!(pad.d0.iter().all(|&l| l == -1));
            assert!(pad.d1.iter().all(|&l| l == -1));
            assert!(pad.d2.iter().all(|&l| l == -1));
        });
    }

    #[test]
    fn scratchpad_is_scrubbed_on_panic_unwind() {
        let result = std::panic::catch_unwind(|| {
            with_scratchpad::<4, _>(|pad| {
                pad.d0 = [42; 4];
                panic!("boom");
            });
        });
        assert!(result.is_err());

        with_scratchpad::<4, _>(|pad| {
            assert!(pad.d0.iter().all(|&l| l == -1));
        });
    }
}

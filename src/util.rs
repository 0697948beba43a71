//! Prefetching and logging utilities.
use colored::Colorize;
use std::time::Instant;

/// Prefetch the cacheline holding `s[index]` into L1 cache.
///
/// This is a hint only. On architectures without a prefetch instruction it does nothing.
#[inline(always)]
pub fn prefetch_index<T>(s: &[T], index: usize) {
    debug_assert!(index < s.len());
    let ptr = s.as_ptr().wrapping_add(index);
    #[cfg(target_arch = "x86_64")]
    unsafe {
        std::arch::x86_64::_mm_prefetch(ptr as *const i8, std::arch::x86_64::_MM_HINT_T0);
    }
    #[cfg(target_arch = "x86")]
    unsafe {
        std::arch::x86::_mm_prefetch(ptr as *const i8, std::arch::x86::_MM_HINT_T0);
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "x86")))]
    {
        // Do nothing.
        let _ = ptr;
    }
}

/// Print the time elapsed since `start` under `name`, and return a new start time.
pub fn log_duration(name: &str, start: Instant) -> Instant {
    eprintln!(
        "{}",
        format!("{name:>12}: {:>13.2?}s", start.elapsed().as_secs_f32()).bold()
    );
    Instant::now()
}

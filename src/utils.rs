//! Utility functions for the demonstrations

use crate::errors::{ProcessError, ProcessResult};
use std::ffi::CString;
use std::hint::black_box;
use std::time::{Duration, Instant};

/// Measure the execution time of a closure
pub fn measure_time<T, F>(operation: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = operation();
    let duration = start.elapsed();
    (result, duration)
}

/// Convert a string to a C-compatible string
pub fn to_cstring(s: &str) -> ProcessResult<CString> {
    CString::new(s).map_err(|e| ProcessError::InvalidInput(format!("Invalid C string: {}", e)))
}

/// CPU-bound workload: count one by one up to `bound`.
///
/// `black_box` keeps the optimizer from folding the loop into a constant.
pub fn count_to(bound: u64) -> u64 {
    let mut count = 0u64;
    for _ in 0..bound {
        count = black_box(count + 1);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_time() {
        let (result, duration) = measure_time(|| {
            std::thread::sleep(Duration::from_millis(10));
            42
        });

        assert_eq!(result, 42);
        assert!(duration >= Duration::from_millis(10));
    }

    #[test]
    fn test_to_cstring() {
        assert_eq!(to_cstring("date").unwrap().as_bytes(), b"date");
        assert!(matches!(
            to_cstring("da\0te"),
            Err(ProcessError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_count_to() {
        assert_eq!(count_to(0), 0);
        assert_eq!(count_to(12_345), 12_345);
    }
}

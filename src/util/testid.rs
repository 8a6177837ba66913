//! Test identifier generation (§3: `test_<nanoseconds-since-epoch>`).

use std::time::{SystemTime, UNIX_EPOCH};

/// Generate an opaque, nanosecond-based run identifier. Also names the
/// working subdirectory `Work/testfiles/<test_id>/`.
pub fn generate_test_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_nanos();
    format!("test_{nanos}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_have_expected_prefix_and_are_distinct() {
        let a = generate_test_id();
        let b = generate_test_id();
        assert!(a.starts_with("test_"));
        assert!(b.starts_with("test_"));
        assert_ne!(a, b);
    }
}

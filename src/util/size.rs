//! Size/unit helpers shared by the corpus builder, executor, and finalizer.

use crate::config::SizeUnit;

/// Parse the `<size><unit>` prefix off a generated filename or a remote
/// name composed by the executor (e.g. `1K_1.dat` or
/// `1K_1_1700000000000_2_7.dat`), returning the byte size it represents.
///
/// Used by finalize (§4.5 step 4) to sum `uploaded.list` contributions for
/// DOWNLOAD campaigns, and by the download executor to size `data_kb`.
pub fn parse_prefixed_size_bytes(name: &str) -> Option<u64> {
    let stem = name.strip_suffix(".dat").unwrap_or(name);
    let prefix = stem.split('_').next()?;
    let split_at = prefix.find(|c: char| !c.is_ascii_digit())?;
    if split_at == 0 {
        return None;
    }
    let (digits, unit_str) = prefix.split_at(split_at);
    let size: u64 = digits.parse().ok()?;
    let unit = SizeUnit::parse(unit_str).ok()?;
    Some(size * unit.multiplier_bytes())
}

pub fn bytes_to_kb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generated_filename() {
        assert_eq!(parse_prefixed_size_bytes("1K_1.dat"), Some(1024));
        assert_eq!(parse_prefixed_size_bytes("5M_3.dat"), Some(5 * 1024 * 1024));
    }

    #[test]
    fn parses_remote_name_with_suffixes() {
        assert_eq!(
            parse_prefixed_size_bytes("1K_1_1700000000000_2_7.dat"),
            Some(1024)
        );
    }

    #[test]
    fn rejects_malformed_names() {
        assert_eq!(parse_prefixed_size_bytes("nope.dat"), None);
        assert_eq!(parse_prefixed_size_bytes("_1.dat"), None);
    }
}

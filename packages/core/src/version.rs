//! Crate version stamp, embedded in emitted instruction tables and command envelopes.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Schema version for the on-the-wire instruction table and command envelope formats.
/// Bumped independently of `VERSION` whenever the serialized shape changes.
pub const SCHEMA_VERSION: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_version_is_stable() {
        assert_eq!(SCHEMA_VERSION, 1);
    }
}

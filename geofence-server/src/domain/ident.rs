//! Shared validation for textual identifiers.

/// Error returned when parsing an invalid identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {reason}")]
pub struct InvalidIdentifier {
    kind: &'static str,
    reason: &'static str,
}

impl InvalidIdentifier {
    pub(super) fn new(kind: &'static str, reason: &'static str) -> Self {
        Self { kind, reason }
    }

    /// What kind of identifier failed to parse (e.g. "train number").
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

/// Longest identifier accepted anywhere in the model.
const MAX_LEN: usize = 32;

/// Check that `s` is a non-empty run of ASCII letters, digits, `-` or `_`.
pub(super) fn check(kind: &'static str, s: &str) -> Result<(), InvalidIdentifier> {
    if s.is_empty() {
        return Err(InvalidIdentifier::new(kind, "must not be empty"));
    }
    if s.len() > MAX_LEN {
        return Err(InvalidIdentifier::new(kind, "must be at most 32 characters"));
    }
    if !s
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(InvalidIdentifier::new(
            kind,
            "must contain only ASCII letters, digits, '-' or '_'",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_ids() {
        assert!(check("id", "12301").is_ok());
        assert!(check("id", "OBJ001").is_ok());
        assert!(check("id", "coach-A1_x").is_ok());
    }

    #[test]
    fn rejects_empty_and_long() {
        assert!(check("id", "").is_err());
        assert!(check("id", &"A".repeat(33)).is_err());
        assert!(check("id", &"A".repeat(32)).is_ok());
    }

    #[test]
    fn rejects_whitespace_and_punctuation() {
        assert!(check("id", "OBJ 001").is_err());
        assert!(check("id", "A/1").is_err());
        assert!(check("id", "Ä1").is_err());
    }

    #[test]
    fn error_display() {
        let err = check("train number", "").unwrap_err();
        assert_eq!(err.to_string(), "invalid train number: must not be empty");
        assert_eq!(err.kind(), "train number");
    }
}

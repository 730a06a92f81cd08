use std::fmt;

/// API key held for the current session only.
///
/// Deliberately not `Serialize`: the key lives in memory and is never written
/// to the config file.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Initial key from `GEMINI_API_KEY`, if set.
    pub fn from_env() -> Self {
        std::env::var("GEMINI_API_KEY")
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn is_present(&self) -> bool {
        !self.0.trim().is_empty()
    }

    pub fn expose(&self) -> &str {
        self.0.trim()
    }

    /// Asterisks with the last four characters visible.
    pub fn masked(&self) -> String {
        let count = self.0.chars().count();
        if count <= 4 {
            return "*".repeat(count);
        }
        let masked_len = count - 4;
        let last_four: String = self.0.chars().skip(masked_len).collect();
        format!("{}...{}", "*".repeat(masked_len.min(20)), last_four)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.masked()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_absent() {
        assert!(!Credential::default().is_present());
        assert!(!Credential::new("   ").is_present());
        assert!(Credential::new("abc").is_present());
    }

    #[test]
    fn test_masked_shows_last_four() {
        assert_eq!(Credential::new("abc").masked(), "***");
        assert_eq!(Credential::new("abcdefgh").masked(), "****...efgh");
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let debug = format!("{:?}", Credential::new("super-secret-key"));
        assert!(!debug.contains("super-secret"));
    }
}

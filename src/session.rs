//! Thin identity integration. The core never authenticates anyone; it only
//! consumes an opaque per-user key for persistence scoping. The web layer
//! materializes that key as a `sid` cookie.

use uuid::Uuid;

pub const SESSION_COOKIE: &str = "sid";

/// Opaque user key. The snapshot store uses its string form as a directory
/// name, which is why only uuid-shaped keys are accepted back from cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserKey(Uuid);

impl UserKey {
    pub fn generate() -> Self {
        UserKey(Uuid::new_v4())
    }

    /// Parse a key previously handed out; anything else is treated as no
    /// user present.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(UserKey)
    }
}

impl std::fmt::Display for UserKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_and_reject_garbage() {
        let key = UserKey::generate();
        assert_eq!(UserKey::parse(&key.to_string()), Some(key));
        assert!(UserKey::parse("../../etc/passwd").is_none());
        assert!(UserKey::parse("").is_none());
    }
}

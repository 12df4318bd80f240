//! Cache key derivation

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Derive a stable cache key from a namespace and the ordered call arguments
///
/// The arguments are serialized to JSON (a tuple keeps positional order) and
/// hashed together with the namespace, so identical logical requests map to
/// the same key no matter which call site issues them.
pub fn cache_key<A: Serialize + ?Sized>(namespace: &str, args: &A) -> Result<String, serde_json::Error> {
    debug!(%namespace, "cache_key: called");
    let encoded = serde_json::to_string(args)?;

    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b":");
    hasher.update(encoded.as_bytes());

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_arguments_same_key() {
        let a = cache_key("flights", &("Lahore", "Dubai", "2025-12-12", Some("2"))).unwrap();
        let b = cache_key("flights", &("Lahore", "Dubai", "2025-12-12", Some("2"))).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_namespace_separates_keys() {
        let a = cache_key("flights", &("Lahore", "Dubai")).unwrap();
        let b = cache_key("hotels", &("Lahore", "Dubai")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_argument_order_matters() {
        let a = cache_key("flights", &("Lahore", "Dubai")).unwrap();
        let b = cache_key("flights", &("Dubai", "Lahore")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_absent_argument_differs_from_empty_string() {
        let a = cache_key("logistics", &(None::<&str>, "Tokyo")).unwrap();
        let b = cache_key("logistics", &(Some(""), "Tokyo")).unwrap();
        assert_ne!(a, b);
    }
}

//! Content-based hashing for request output directories.

use sha2::{Digest, Sha256};

use fc_core::RequestKey;

/// Deterministic identifier for one simulation request.
///
/// Hashes the versioned canonical encoding of both variable vectors. The id
/// names the request's output directory; key equality never goes through it.
pub fn compute_request_id(key: &RequestKey) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.encode());
    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_stability() {
        let key = RequestKey::new(vec![1.0, 2.0, 3.5], vec![1, 2]);
        let same = RequestKey::new(vec![1.0, 2.0, 3.5], vec![1, 2]);

        assert_eq!(compute_request_id(&key), compute_request_id(&same));
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let key = RequestKey::new(vec![1.0, 2.0], vec![1]);
        let continuous_changed = RequestKey::new(vec![1.0, 2.5], vec![1]);
        let discrete_changed = RequestKey::new(vec![1.0, 2.0], vec![2]);

        assert_ne!(
            compute_request_id(&key),
            compute_request_id(&continuous_changed)
        );
        assert_ne!(
            compute_request_id(&key),
            compute_request_id(&discrete_changed)
        );
    }

    #[test]
    fn hash_is_filesystem_friendly() {
        let key = RequestKey::new(vec![-0.0, f64::MAX], vec![i32::MIN]);
        let id = compute_request_id(&key);
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

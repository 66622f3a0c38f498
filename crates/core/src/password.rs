// Password hashing using bcrypt
// Decision: Keep bcrypt so existing `$2a$`/`$2b$` hashes in the user file stay verifiable
// Decision: Default to the minimum cost; deployments raise it through `hash_cost`

use crate::error::Result;

/// Lowest cost bcrypt accepts. This is the historical default of the user file.
pub const MIN_HASH_COST: u32 = 4;

/// Highest cost bcrypt accepts
pub const MAX_HASH_COST: u32 = 31;

/// bcrypt work factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost(u32);

impl HashCost {
    /// Returns `None` when `cost` is outside what bcrypt accepts
    pub fn new(cost: u32) -> Option<Self> {
        (MIN_HASH_COST..=MAX_HASH_COST)
            .contains(&cost)
            .then_some(Self(cost))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for HashCost {
    fn default() -> Self {
        Self(MIN_HASH_COST)
    }
}

/// Hash a password with a fresh salt
pub fn hash_password(password: &str, cost: HashCost) -> Result<String> {
    Ok(bcrypt::hash(password, cost.get())?)
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    Ok(bcrypt::verify(password, hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret1", HashCost::default()).unwrap();

        assert!(verify_password("secret1", &hash).unwrap());
        assert!(!verify_password("secret2", &hash).unwrap());
    }

    #[test]
    fn test_different_hashes() {
        let hash1 = hash_password("same-password", HashCost::default()).unwrap();
        let hash2 = hash_password("same-password", HashCost::default()).unwrap();

        // Different salts
        assert_ne!(hash1, hash2);
        assert!(verify_password("same-password", &hash1).unwrap());
        assert!(verify_password("same-password", &hash2).unwrap());
    }

    #[test]
    fn test_hash_records_cost() {
        let hash = hash_password("secret1", HashCost::default()).unwrap();
        assert!(hash.starts_with("$2b$04$"), "unexpected hash prefix: {hash}");
    }

    #[test]
    fn test_cost_bounds() {
        assert!(HashCost::new(3).is_none());
        assert_eq!(HashCost::new(4), Some(HashCost::default()));
        assert_eq!(HashCost::new(12).map(HashCost::get), Some(12));
        assert!(HashCost::new(32).is_none());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("secret1", "not-a-bcrypt-hash").is_err());
    }
}

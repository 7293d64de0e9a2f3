use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};

/// One-way salted password hashing backed by bcrypt.
///
/// The cost factor is tunable; `DEFAULT_COST` (12) keeps a single hash in the
/// hundreds-of-milliseconds range on current hardware.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost).map_err(AppError::from)
    }

    /// Checks `password` against a stored bcrypt hash.
    ///
    /// A malformed hash never matches.
    pub fn verify(&self, hashed_password: &str, password: &str) -> bool {
        match verify(password, hashed_password) {
            Ok(matches) => matches,
            Err(e) => {
                log::warn!("stored password hash could not be checked: {}", e);
                false
            }
        }
    }
}

use soroban_sdk::Env;

use crate::errors::ContractError;
use crate::storage;

/// Scoped non-reentrant lock. Held for the lifetime of the value and
/// released on drop, so early returns through `?` unlock too.
pub struct ReentrancyGuard<'a> {
    env: &'a Env,
}

impl<'a> ReentrancyGuard<'a> {
    pub fn acquire(env: &'a Env) -> Result<Self, ContractError> {
        if storage::is_locked(env) {
            return Err(ContractError::ReentrancyViolation);
        }
        storage::set_locked(env);
        Ok(Self { env })
    }
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        storage::clear_locked(self.env);
    }
}

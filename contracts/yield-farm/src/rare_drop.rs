use soroban_sdk::{contractclient, log, token, Address, Env, Vec};

use crate::errors::ContractError;
use crate::events;
use crate::storage::{self, PoolInfo, RareDrop};

/// Basis-point denominator for rare drop chances.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Verifiable randomness provider. `context` is the pool id.
#[contractclient(name = "RandomnessClient")]
pub trait RandomnessInterface {
    /// Fails if the seed for (user, context) already exists.
    fn initialize_seed(env: Env, user: Address, context: u32);

    /// Fails if the seed for (user, context) was never initialized.
    fn generate_numbers(env: Env, user: Address, context: u32, count: u32) -> Vec<u64>;
}

pub fn validate_config(rare_drop: &RareDrop) -> Result<(), ContractError> {
    if let Some(rare) = rare_drop.config() {
        if rare.chance_bps > BPS_DENOMINATOR {
            return Err(ContractError::InvalidRareDropChance);
        }
        if rare.amount < 0 {
            return Err(ContractError::InvalidAmount);
        }
    }
    Ok(())
}

/// Seed the user's randomness for this pool. An already-seeded user makes the
/// provider fail, which is expected and swallowed here.
pub fn initialize_seed(env: &Env, user: &Address, pool_id: u32) -> bool {
    let Some(source) = storage::get_randomness(env) else {
        return false;
    };
    match RandomnessClient::new(env, &source).try_initialize_seed(user, &pool_id) {
        Ok(Ok(())) => true,
        _ => {
            log!(env, "seed init rejected", user.clone(), pool_id);
            false
        }
    }
}

/// One draw in `[0, BPS_DENOMINATOR)` scoped to (user, pool).
pub fn draw(env: &Env, user: &Address, pool_id: u32) -> Result<u32, ContractError> {
    let source = storage::get_randomness(env).ok_or(ContractError::RandomnessUnavailable)?;
    let client = RandomnessClient::new(env, &source);
    let numbers = match client.try_generate_numbers(user, &pool_id, &1) {
        Ok(Ok(numbers)) => numbers,
        _ => return Err(ContractError::RandomnessUnavailable),
    };
    let value = numbers.get(0).ok_or(ContractError::RandomnessUnavailable)?;
    Ok((value % BPS_DENOMINATOR as u64) as u32)
}

/// Strictly below the chance wins; a draw equal to the chance does not.
pub fn is_awarded(draw: u32, chance_bps: u32) -> bool {
    draw < chance_bps
}

/// Roll for the pool's rare drop and mint it on success. Never fails the
/// caller on randomness problems. Returns the amount minted.
pub fn evaluate(env: &Env, user: &Address, pool: &PoolInfo, seed_initialized: bool) -> i128 {
    let Some(rare) = pool.rare_drop.config() else {
        return 0;
    };
    if rare.chance_bps == 0 || rare.amount == 0 {
        return 0;
    }

    let roll = if seed_initialized {
        draw(env, user, pool.id)
    } else {
        Err(ContractError::RandomnessUnavailable)
    };

    match roll {
        Ok(value) if is_awarded(value, rare.chance_bps) => {
            token::StellarAssetClient::new(env, &rare.token).mint(user, &rare.amount);
            events::rare_drop(env, user, pool.id, &rare.token, rare.amount, value);
            rare.amount
        }
        Ok(_) => 0,
        Err(_) => {
            log!(env, "rare drop skipped: randomness unavailable", user.clone(), pool.id);
            0
        }
    }
}

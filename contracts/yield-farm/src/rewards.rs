use soroban_sdk::{Env, I256};

use crate::errors::ContractError;
use crate::storage::{self, GlobalState, PoolInfo, UserInfo};

/// Precision multiplier for accumulated reward per share (1e12).
pub const ACC_PRECISION: i128 = 1_000_000_000_000;

/// Reward owed to one pool for `blocks` elapsed blocks at the current weights.
pub fn pool_emission(
    blocks: u32,
    reward_per_block: i128,
    alloc_point: u32,
    total_alloc_point: u32,
) -> Result<i128, ContractError> {
    if total_alloc_point == 0 {
        return Ok(0);
    }
    (blocks as i128)
        .checked_mul(reward_per_block)
        .and_then(|v| v.checked_mul(alloc_point as i128))
        .map(|v| v / total_alloc_point as i128)
        .ok_or(ContractError::MathOverflow)
}

/// Bring `pool` up to `at_block`. Blocks with nothing staked are skipped
/// without banking their emission.
pub fn accrue(
    env: &Env,
    pool: &mut PoolInfo,
    global: &GlobalState,
    at_block: u32,
) -> Result<(), ContractError> {
    if at_block <= pool.last_reward_block {
        return Ok(());
    }

    if pool.total_staked > 0 {
        let blocks = at_block - pool.last_reward_block;
        let reward = pool_emission(
            blocks,
            global.reward_per_block,
            pool.alloc_point,
            global.total_alloc_point,
        )?;
        let delta = widen(env, reward)
            .mul(&widen(env, ACC_PRECISION))
            .div(&widen(env, pool.total_staked));
        pool.acc_reward_per_share = pool.acc_reward_per_share.add(&delta);
    }

    pool.last_reward_block = at_block;
    Ok(())
}

/// Debt snapshot for `amount` staked at accumulator `acc_reward_per_share`.
pub fn compute_reward_debt(env: &Env, amount: i128, acc_reward_per_share: &I256) -> I256 {
    widen(env, amount)
        .mul(acc_reward_per_share)
        .div(&widen(env, ACC_PRECISION))
}

/// Reward accrued to `user` since their last touch. Caller must accrue the pool first.
pub fn calculate_pending(
    env: &Env,
    pool: &PoolInfo,
    user: &UserInfo,
) -> Result<i128, ContractError> {
    if user.amount == 0 {
        return Ok(0);
    }
    let accumulated = compute_reward_debt(env, user.amount, &pool.acc_reward_per_share);
    let pending = accumulated
        .sub(&user.reward_debt)
        .to_i128()
        .ok_or(ContractError::MathOverflow)?;
    Ok(pending.max(0))
}

fn widen(env: &Env, value: i128) -> I256 {
    I256::from_i128(env, value)
}

/// Accrue a pool to the current ledger sequence and persist it.
pub fn update_pool(env: &Env, pool_id: u32) -> Result<PoolInfo, ContractError> {
    let global = storage::get_global(env)?;
    let mut pool = storage::get_pool(env, pool_id)?;
    accrue(env, &mut pool, &global, env.ledger().sequence())?;
    storage::set_pool(env, &pool);
    Ok(pool)
}

/// Accrue every pool. Must run before any weight or rate change.
pub fn mass_update_pools(env: &Env) -> Result<(), ContractError> {
    let pool_count = storage::get_pool_count(env);
    for i in 0..pool_count {
        update_pool(env, i)?;
    }
    Ok(())
}

/// View-only: the pool as `update_pool` would leave it, without writing.
pub fn simulate_pool(env: &Env, pool_id: u32) -> Result<PoolInfo, ContractError> {
    let global = storage::get_global(env)?;
    let mut pool = storage::get_pool(env, pool_id)?;
    accrue(env, &mut pool, &global, env.ledger().sequence())?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RareDrop;
    use soroban_sdk::testutils::Address as _;
    use soroban_sdk::Address;

    const E18: i128 = 1_000_000_000_000_000_000;

    fn pool(env: &Env, alloc_point: u32, total_staked: i128, last_reward_block: u32) -> PoolInfo {
        PoolInfo {
            id: 0,
            stake_token: Address::generate(env),
            reward_token: Address::generate(env),
            alloc_point,
            last_reward_block,
            acc_reward_per_share: I256::from_i32(env, 0),
            total_staked,
            min_staking_time: 0,
            rare_drop: RareDrop::Disabled,
        }
    }

    fn global(reward_per_block: i128, total_alloc_point: u32) -> GlobalState {
        GlobalState {
            reward_per_block,
            total_alloc_point,
            start_block: 0,
        }
    }

    fn acc(p: &PoolInfo) -> i128 {
        p.acc_reward_per_share.to_i128().unwrap()
    }

    fn staker(env: &Env, amount: i128, reward_debt: I256) -> UserInfo {
        UserInfo {
            amount,
            reward_debt,
            ..UserInfo::empty(env)
        }
    }

    #[test]
    fn emission_splits_by_weight() {
        assert_eq!(pool_emission(10, E18, 100, 200).unwrap(), 5 * E18);
        assert_eq!(pool_emission(10, E18, 0, 200).unwrap(), 0);
        assert_eq!(pool_emission(10, E18, 100, 0).unwrap(), 0);
        assert_eq!(
            pool_emission(u32::MAX, i128::MAX, 1, 1),
            Err(ContractError::MathOverflow)
        );
    }

    #[test]
    fn accrue_is_noop_at_or_before_last_block() {
        let env = Env::default();
        let mut p = pool(&env, 100, 100 * E18, 50);
        accrue(&env, &mut p, &global(E18, 100), 50).unwrap();
        accrue(&env, &mut p, &global(E18, 100), 40).unwrap();
        assert_eq!(acc(&p), 0);
        assert_eq!(p.last_reward_block, 50);
    }

    #[test]
    fn accrue_forfeits_idle_blocks() {
        let env = Env::default();
        let mut p = pool(&env, 100, 0, 10);
        accrue(&env, &mut p, &global(E18, 100), 30).unwrap();
        assert_eq!(acc(&p), 0);
        assert_eq!(p.last_reward_block, 30);

        // Stakers arriving later only earn from their own arrival.
        p.total_staked = 10 * E18;
        accrue(&env, &mut p, &global(E18, 100), 31).unwrap();
        assert_eq!(acc(&p), E18 * ACC_PRECISION / (10 * E18));
    }

    #[test]
    fn accrue_scales_by_total_staked() {
        let env = Env::default();
        let mut p = pool(&env, 100, 100 * E18, 0);
        accrue(&env, &mut p, &global(E18, 200), 10).unwrap();
        // 5e18 reward over 100e18 staked
        assert_eq!(acc(&p), 5 * E18 * ACC_PRECISION / (100 * E18));

        let user = staker(&env, 100 * E18, I256::from_i32(&env, 0));
        assert_eq!(calculate_pending(&env, &p, &user).unwrap(), 5 * E18);
    }

    #[test]
    fn accumulator_never_decreases() {
        let env = Env::default();
        let mut p = pool(&env, 7, 3, 0);
        let g = global(13, 9);
        let mut last = acc(&p);
        for block in 1..50u32 {
            p.total_staked = 3 + (block as i128 * 7919) % 1000;
            accrue(&env, &mut p, &g, block).unwrap();
            assert!(acc(&p) >= last);
            last = acc(&p);
        }
    }

    #[test]
    fn pending_is_zero_right_after_debt_reset() {
        let env = Env::default();
        let mut p = pool(&env, 1, 3 * E18, 0);
        accrue(&env, &mut p, &global(7 * E18, 3), 11).unwrap();
        let amount = 3 * E18;
        let debt = compute_reward_debt(&env, amount, &p.acc_reward_per_share);
        let user = staker(&env, amount, debt);
        assert_eq!(calculate_pending(&env, &p, &user).unwrap(), 0);
    }

    #[test]
    fn dust_staker_accumulator_leaves_room_for_large_positions() {
        let env = Env::default();
        // One unit staked for ten blocks at 1e18 with half the weight.
        let mut p = pool(&env, 100, 1, 0);
        accrue(&env, &mut p, &global(E18, 200), 10).unwrap();
        assert_eq!(acc(&p), 5 * E18 * ACC_PRECISION);

        // The debt of a 100e18 position no longer fits in i128 ...
        let big = 100 * E18;
        let debt = compute_reward_debt(&env, big, &p.acc_reward_per_share);
        assert_eq!(debt.to_i128(), None);

        // ... but the pending difference does.
        p.total_staked += big;
        accrue(&env, &mut p, &global(E18, 200), 11).unwrap();
        let user = staker(&env, big, debt);
        let pending = calculate_pending(&env, &p, &user).unwrap();
        // 0.5e18 over 100e18 + 1 units: per-share delta floors to 4_999_999_999.
        assert_eq!(pending, 499_999_999_900_000_000);
    }

    #[test]
    fn oversized_pending_is_reported() {
        let env = Env::default();
        let mut p = pool(&env, 1, 1, 0);
        p.acc_reward_per_share = widen(&env, ACC_PRECISION * 10);
        let user = staker(&env, i128::MAX, I256::from_i32(&env, 0));
        assert_eq!(
            calculate_pending(&env, &p, &user),
            Err(ContractError::MathOverflow)
        );
    }
}

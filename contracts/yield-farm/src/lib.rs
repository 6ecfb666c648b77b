#![no_std]

mod errors;
mod events;
mod guard;
mod rare_drop;
mod rewards;
mod storage;


pub use errors::ContractError;
pub use rare_drop::{RandomnessClient, RandomnessInterface, BPS_DENOMINATOR};
pub use rewards::ACC_PRECISION;
pub use storage::{GlobalState, PoolInfo, RareDrop, RareDropConfig, UserInfo};

use guard::ReentrancyGuard;
use soroban_sdk::{contract, contractimpl, token, Address, Env, Vec, I256};

/// Upper bound for a single pool's allocation weight.
pub const MAX_ALLOC_POINT: u32 = 10_000;

#[contract]
pub struct YieldFarmContract;

#[contractimpl]
impl YieldFarmContract {
    // ========== Admin Functions ==========

    /// One-time initialization. No pool accrues before `start_block`.
    pub fn initialize(
        env: Env,
        admin: Address,
        reward_per_block: i128,
        start_block: u32,
    ) -> Result<(), ContractError> {
        if storage::has_admin(&env) {
            return Err(ContractError::AlreadyInitialized);
        }
        if reward_per_block < 0 {
            return Err(ContractError::InvalidAmount);
        }

        storage::set_admin(&env, &admin);
        storage::set_global(
            &env,
            &GlobalState {
                reward_per_block,
                total_alloc_point: 0,
                start_block,
            },
        );
        storage::set_pool_count(&env, 0);
        storage::extend_instance_ttl(&env);

        events::initialized(&env, &admin, reward_per_block, start_block);
        Ok(())
    }

    /// Transfer admin role to a new address.
    pub fn set_admin(env: Env, admin: Address, new_admin: Address) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);
        storage::set_admin(&env, &new_admin);
        events::admin_changed(&env, &admin, &new_admin);
        Ok(())
    }

    /// Install the randomness provider used for rare drops.
    pub fn set_randomness_source(
        env: Env,
        admin: Address,
        source: Address,
    ) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);
        storage::set_randomness(&env, &source);
        events::randomness_set(&env, &source);
        Ok(())
    }

    /// Register a new pool. Every existing pool is accrued first since the
    /// allocation total changes.
    pub fn add_pool(
        env: Env,
        admin: Address,
        alloc_point: u32,
        stake_token: Address,
        reward_token: Address,
        min_staking_time: u64,
        rare_config: RareDrop,
    ) -> Result<u32, ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);

        Self::require_valid_alloc_point(alloc_point)?;
        rare_drop::validate_config(&rare_config)?;
        if storage::has_stake_token_pool(&env, &stake_token) {
            return Err(ContractError::PoolAlreadyExists);
        }

        rewards::mass_update_pools(&env)?;

        let mut global = storage::get_global(&env)?;
        global.total_alloc_point = global
            .total_alloc_point
            .checked_add(alloc_point)
            .ok_or(ContractError::MathOverflow)?;

        let pool_id = storage::get_pool_count(&env);
        storage::set_pool(
            &env,
            &PoolInfo {
                id: pool_id,
                stake_token: stake_token.clone(),
                reward_token,
                alloc_point,
                last_reward_block: env.ledger().sequence().max(global.start_block),
                acc_reward_per_share: I256::from_i32(&env, 0),
                total_staked: 0,
                min_staking_time,
                rare_drop: rare_config,
            },
        );
        storage::set_stake_token_pool(&env, &stake_token, pool_id);
        storage::set_pool_count(&env, pool_id + 1);
        storage::set_global(&env, &global);

        events::pool_added(&env, pool_id, &stake_token, alloc_point);
        Ok(pool_id)
    }

    /// Change one pool's weight. All pools are accrued under the old weights
    /// first, so elapsed blocks are never reweighted.
    pub fn set_pool(
        env: Env,
        admin: Address,
        pool_id: u32,
        alloc_point: u32,
    ) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);
        Self::require_valid_pool(&env, pool_id)?;
        Self::require_valid_alloc_point(alloc_point)?;

        rewards::mass_update_pools(&env)?;
        Self::apply_alloc_point(&env, pool_id, alloc_point)
    }

    /// Batch form of `set_pool`.
    pub fn set_alloc_points(
        env: Env,
        admin: Address,
        pool_ids: Vec<u32>,
        alloc_points: Vec<u32>,
    ) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);

        if pool_ids.len() != alloc_points.len() {
            return Err(ContractError::LengthMismatch);
        }
        for (pool_id, alloc_point) in pool_ids.iter().zip(alloc_points.iter()) {
            Self::require_valid_pool(&env, pool_id)?;
            Self::require_valid_alloc_point(alloc_point)?;
        }

        rewards::mass_update_pools(&env)?;
        for (pool_id, alloc_point) in pool_ids.iter().zip(alloc_points.iter()) {
            Self::apply_alloc_point(&env, pool_id, alloc_point)?;
        }
        Ok(())
    }

    /// Attach, replace or remove a pool's rare drop.
    pub fn set_rare_drop(
        env: Env,
        admin: Address,
        pool_id: u32,
        rare_config: RareDrop,
    ) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);
        rare_drop::validate_config(&rare_config)?;

        let mut pool = storage::get_pool(&env, pool_id)?;
        let (chance_bps, amount) = rare_config
            .config()
            .map_or((0, 0), |rare| (rare.chance_bps, rare.amount));
        pool.rare_drop = rare_config;
        storage::set_pool(&env, &pool);

        events::rare_drop_updated(&env, pool_id, chance_bps, amount);
        Ok(())
    }

    /// Change the global emission. Pools are accrued at the old rate up to
    /// the current block before the new rate applies.
    pub fn update_emission_rate(
        env: Env,
        admin: Address,
        new_rate: i128,
    ) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);
        if new_rate < 0 {
            return Err(ContractError::InvalidAmount);
        }

        rewards::mass_update_pools(&env)?;

        let mut global = storage::get_global(&env)?;
        let old_rate = global.reward_per_block;
        global.reward_per_block = new_rate;
        storage::set_global(&env, &global);

        events::emission_rate_updated(&env, old_rate, new_rate);
        Ok(())
    }

    // ========== Permissionless Accrual ==========

    pub fn mass_update_pools(env: Env) -> Result<(), ContractError> {
        storage::extend_instance_ttl(&env);
        rewards::mass_update_pools(&env)
    }

    pub fn update_pool(env: Env, pool_id: u32) -> Result<PoolInfo, ContractError> {
        storage::extend_instance_ttl(&env);
        rewards::update_pool(&env, pool_id)
    }

    // ========== User Functions ==========

    /// Stake `amount` of the pool's stake token, paying out any pending
    /// reward first. `amount == 0` only harvests.
    pub fn deposit(
        env: Env,
        user: Address,
        pool_id: u32,
        amount: i128,
    ) -> Result<(), ContractError> {
        user.require_auth();
        storage::extend_instance_ttl(&env);
        if amount < 0 {
            return Err(ContractError::InvalidAmount);
        }
        let _guard = ReentrancyGuard::acquire(&env)?;

        Self::settle_and_stake(&env, &user, pool_id, amount)?;
        Ok(())
    }

    /// Return `amount` of principal and pay out pending reward. Principal is
    /// locked for the pool's minimum staking time after the last deposit.
    pub fn withdraw(
        env: Env,
        user: Address,
        pool_id: u32,
        amount: i128,
    ) -> Result<(), ContractError> {
        user.require_auth();
        storage::extend_instance_ttl(&env);
        if amount < 0 {
            return Err(ContractError::InvalidAmount);
        }
        let _guard = ReentrancyGuard::acquire(&env)?;

        let pool = storage::get_pool(&env, pool_id)?;
        let mut info = storage::get_user(&env, pool_id, &user);
        if amount > info.amount {
            return Err(ContractError::InsufficientStakedAmount);
        }
        if amount > 0 {
            let held = env.ledger().timestamp().saturating_sub(info.last_stake_time);
            if held < pool.min_staking_time {
                return Err(ContractError::MinimumStakingTimeNotMet);
            }
        }

        let mut pool = rewards::update_pool(&env, pool_id)?;
        let pending = rewards::calculate_pending(&env, &pool, &info)?;

        // Effects before any token movement
        info.amount -= amount;
        pool.total_staked -= amount;
        info.reward_debt =
            rewards::compute_reward_debt(&env, info.amount, &pool.acc_reward_per_share);
        storage::set_pool(&env, &pool);
        storage::set_user(&env, pool_id, &user, &info);

        if amount > 0 {
            token::Client::new(&env, &pool.stake_token).transfer(
                &env.current_contract_address(),
                &user,
                &amount,
            );
        }
        Self::pay_reward(&env, &user, &pool, pending, info.seed_initialized);

        events::withdraw(&env, &user, pool_id, amount);
        Ok(())
    }

    /// Pay out pending reward without touching principal. Returns the base
    /// reward paid.
    pub fn harvest(env: Env, user: Address, pool_id: u32) -> Result<i128, ContractError> {
        user.require_auth();
        storage::extend_instance_ttl(&env);
        let _guard = ReentrancyGuard::acquire(&env)?;

        Self::settle_and_stake(&env, &user, pool_id, 0)
    }

    /// Return all principal immediately, forfeiting unclaimed reward and
    /// ignoring the staking lock. For use when the reward path is broken.
    pub fn emergency_withdraw(
        env: Env,
        user: Address,
        pool_id: u32,
    ) -> Result<i128, ContractError> {
        user.require_auth();
        storage::extend_instance_ttl(&env);
        let _guard = ReentrancyGuard::acquire(&env)?;

        let mut pool = storage::get_pool(&env, pool_id)?;
        let mut info = storage::get_user(&env, pool_id, &user);
        let amount = info.amount;

        info.amount = 0;
        info.reward_debt = I256::from_i32(&env, 0);
        pool.total_staked -= amount;
        storage::set_pool(&env, &pool);
        storage::set_user(&env, pool_id, &user, &info);

        if amount > 0 {
            token::Client::new(&env, &pool.stake_token).transfer(
                &env.current_contract_address(),
                &user,
                &amount,
            );
        }

        events::emergency_withdraw(&env, &user, pool_id, amount);
        Ok(amount)
    }

    // ========== View Functions ==========

    /// Unclaimed reward for a user as of the current ledger, without writing.
    pub fn pending_reward(env: Env, pool_id: u32, user: Address) -> Result<i128, ContractError> {
        let pool = rewards::simulate_pool(&env, pool_id)?;
        let info = storage::get_user(&env, pool_id, &user);
        rewards::calculate_pending(&env, &pool, &info)
    }

    pub fn pool_info(env: Env, pool_id: u32) -> Result<PoolInfo, ContractError> {
        storage::get_pool(&env, pool_id)
    }

    /// Position record; zeroed for a participant who never deposited.
    pub fn user_info(env: Env, pool_id: u32, user: Address) -> UserInfo {
        storage::get_user(&env, pool_id, &user)
    }

    pub fn global_state(env: Env) -> Result<GlobalState, ContractError> {
        storage::get_global(&env)
    }

    pub fn pool_count(env: Env) -> u32 {
        storage::get_pool_count(&env)
    }

    pub fn admin(env: Env) -> Result<Address, ContractError> {
        storage::get_admin(&env)
    }

    // ========== Internal Helpers ==========

    /// Shared body of `deposit` and `harvest`. Returns the base reward paid.
    fn settle_and_stake(
        env: &Env,
        user: &Address,
        pool_id: u32,
        amount: i128,
    ) -> Result<i128, ContractError> {
        let mut pool = rewards::update_pool(env, pool_id)?;
        // Harvesting without a position must not create one.
        if amount == 0 && !storage::has_user(env, pool_id, user) {
            return Ok(0);
        }
        let mut info = storage::get_user(env, pool_id, user);
        let pending = rewards::calculate_pending(env, &pool, &info)?;

        // Effects before any token movement
        if amount > 0 {
            info.amount = info
                .amount
                .checked_add(amount)
                .ok_or(ContractError::MathOverflow)?;
            pool.total_staked = pool
                .total_staked
                .checked_add(amount)
                .ok_or(ContractError::MathOverflow)?;
            info.last_stake_time = env.ledger().timestamp();
            storage::set_pool(env, &pool);
        }
        info.reward_debt =
            rewards::compute_reward_debt(env, info.amount, &pool.acc_reward_per_share);
        let needs_seed = !info.seed_initialized && storage::get_randomness(env).is_some();
        if needs_seed {
            info.seed_initialized = true;
        }
        storage::set_user(env, pool_id, user, &info);

        if amount > 0 {
            token::Client::new(env, &pool.stake_token).transfer(
                user,
                &env.current_contract_address(),
                &amount,
            );
        }
        if needs_seed {
            rare_drop::initialize_seed(env, user, pool_id);
        }
        let paid = Self::pay_reward(env, user, &pool, pending, info.seed_initialized);

        if amount > 0 {
            events::deposit(env, user, pool_id, amount);
        }
        Ok(paid)
    }

    /// Mint the settled reward and roll the pool's rare drop.
    fn pay_reward(
        env: &Env,
        user: &Address,
        pool: &PoolInfo,
        pending: i128,
        seed_initialized: bool,
    ) -> i128 {
        if pending <= 0 {
            return 0;
        }
        token::StellarAssetClient::new(env, &pool.reward_token).mint(user, &pending);
        events::harvest(env, user, pool.id, pending);
        rare_drop::evaluate(env, user, pool, seed_initialized);
        pending
    }

    fn apply_alloc_point(env: &Env, pool_id: u32, alloc_point: u32) -> Result<(), ContractError> {
        let mut pool = storage::get_pool(env, pool_id)?;
        let mut global = storage::get_global(env)?;
        global.total_alloc_point = global
            .total_alloc_point
            .checked_sub(pool.alloc_point)
            .and_then(|total| total.checked_add(alloc_point))
            .ok_or(ContractError::MathOverflow)?;
        pool.alloc_point = alloc_point;
        storage::set_pool(env, &pool);
        storage::set_global(env, &global);

        events::pool_updated(env, pool_id, alloc_point, global.total_alloc_point);
        Ok(())
    }

    fn require_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
        caller.require_auth();
        let admin = storage::get_admin(env)?;
        if *caller != admin {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn require_valid_pool(env: &Env, pool_id: u32) -> Result<(), ContractError> {
        let count = storage::get_pool_count(env);
        if pool_id >= count {
            return Err(ContractError::PoolNotFound);
        }
        Ok(())
    }

    fn require_valid_alloc_point(alloc_point: u32) -> Result<(), ContractError> {
        if alloc_point > MAX_ALLOC_POINT {
            return Err(ContractError::InvalidAllocPoint);
        }
        Ok(())
    }
}

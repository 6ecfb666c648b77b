use soroban_sdk::{contracttype, Address, Env, I256};

use crate::errors::ContractError;

// Storage TTL constants (in ledgers, ~5 seconds each)
const INSTANCE_TTL_THRESHOLD: u32 = 17_280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518_400; // ~30 days
const PERSISTENT_TTL_THRESHOLD: u32 = 17_280; // ~1 day
const PERSISTENT_TTL_EXTEND: u32 = 518_400; // ~30 days

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Global,
    Randomness,
    PoolCount,
    Locked,
    Pool(u32),
    StakeTokenPool(Address),
    User(u32, Address),
}

/// Engine-wide emission parameters.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GlobalState {
    pub reward_per_block: i128,
    pub total_alloc_point: u32,
    pub start_block: u32,
}

/// Secondary bonus attached to a pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RareDropConfig {
    pub token: Address,
    /// Probability per harvest, in basis points (0..=10_000).
    pub chance_bps: u32,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RareDrop {
    Disabled,
    Enabled(RareDropConfig),
}

impl RareDrop {
    pub fn config(&self) -> Option<&RareDropConfig> {
        match self {
            RareDrop::Enabled(config) => Some(config),
            RareDrop::Disabled => None,
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolInfo {
    pub id: u32,
    pub stake_token: Address,
    pub reward_token: Address,
    pub alloc_point: u32,
    pub last_reward_block: u32,
    /// Reward per staked unit since inception, scaled by `ACC_PRECISION`.
    /// 256-bit: a dust first staker can push `amount * acc` past `i128`.
    pub acc_reward_per_share: I256,
    pub total_staked: i128,
    /// Seconds a deposit must sit before principal can be withdrawn.
    pub min_staking_time: u64,
    pub rare_drop: RareDrop,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserInfo {
    pub amount: i128,
    /// `amount * acc_reward_per_share / ACC_PRECISION` at the last touch.
    pub reward_debt: I256,
    pub last_stake_time: u64,
    pub seed_initialized: bool,
}

impl UserInfo {
    pub fn empty(env: &Env) -> Self {
        UserInfo {
            amount: 0,
            reward_debt: I256::from_i32(env, 0),
            last_stake_time: 0,
            seed_initialized: false,
        }
    }
}

// --- Instance storage helpers (Admin, Global, Randomness, PoolCount, Locked) ---

pub fn has_admin(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

pub fn get_admin(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(ContractError::NotInitialized)
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
}

pub fn get_global(env: &Env) -> Result<GlobalState, ContractError> {
    env.storage()
        .instance()
        .get(&DataKey::Global)
        .ok_or(ContractError::NotInitialized)
}

pub fn set_global(env: &Env, global: &GlobalState) {
    env.storage().instance().set(&DataKey::Global, global);
}

pub fn get_randomness(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::Randomness)
}

pub fn set_randomness(env: &Env, source: &Address) {
    env.storage().instance().set(&DataKey::Randomness, source);
}

pub fn get_pool_count(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::PoolCount)
        .unwrap_or(0)
}

pub fn set_pool_count(env: &Env, count: u32) {
    env.storage().instance().set(&DataKey::PoolCount, &count);
}

pub fn is_locked(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Locked)
        .unwrap_or(false)
}

pub fn set_locked(env: &Env) {
    env.storage().instance().set(&DataKey::Locked, &true);
}

pub fn clear_locked(env: &Env) {
    env.storage().instance().remove(&DataKey::Locked);
}

pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

// --- Persistent storage helpers (Pool, StakeTokenPool, User) ---

pub fn get_pool(env: &Env, pool_id: u32) -> Result<PoolInfo, ContractError> {
    let key = DataKey::Pool(pool_id);
    let pool: PoolInfo = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(ContractError::PoolNotFound)?;
    extend_persistent(env, &key);
    Ok(pool)
}

pub fn set_pool(env: &Env, pool: &PoolInfo) {
    let key = DataKey::Pool(pool.id);
    env.storage().persistent().set(&key, pool);
    extend_persistent(env, &key);
}

pub fn has_stake_token_pool(env: &Env, stake_token: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::StakeTokenPool(stake_token.clone()))
}

pub fn set_stake_token_pool(env: &Env, stake_token: &Address, pool_id: u32) {
    let key = DataKey::StakeTokenPool(stake_token.clone());
    env.storage().persistent().set(&key, &pool_id);
    extend_persistent(env, &key);
}

/// Positions are never deleted, so a missing entry is a participant who has
/// never deposited and reads back as a zeroed record.
pub fn get_user(env: &Env, pool_id: u32, user: &Address) -> UserInfo {
    let key = DataKey::User(pool_id, user.clone());
    match env.storage().persistent().get::<DataKey, UserInfo>(&key) {
        Some(info) => {
            extend_persistent(env, &key);
            info
        }
        None => UserInfo::empty(env),
    }
}

pub fn has_user(env: &Env, pool_id: u32, user: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::User(pool_id, user.clone()))
}

pub fn set_user(env: &Env, pool_id: u32, user: &Address, info: &UserInfo) {
    let key = DataKey::User(pool_id, user.clone());
    env.storage().persistent().set(&key, info);
    extend_persistent(env, &key);
}

fn extend_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}

use soroban_sdk::{symbol_short, Address, Env};

pub fn initialized(env: &Env, admin: &Address, reward_per_block: i128, start_block: u32) {
    env.events().publish(
        (symbol_short!("init"), admin.clone()),
        (reward_per_block, start_block),
    );
}

pub fn admin_changed(env: &Env, old_admin: &Address, new_admin: &Address) {
    env.events().publish(
        (symbol_short!("admin_set"), old_admin.clone()),
        new_admin.clone(),
    );
}

pub fn randomness_set(env: &Env, source: &Address) {
    env.events().publish((symbol_short!("rand_set"),), source.clone());
}

pub fn pool_added(env: &Env, pool_id: u32, stake_token: &Address, alloc_point: u32) {
    env.events().publish(
        (symbol_short!("pool_add"), pool_id),
        (stake_token.clone(), alloc_point),
    );
}

pub fn pool_updated(env: &Env, pool_id: u32, alloc_point: u32, total_alloc_point: u32) {
    env.events().publish(
        (symbol_short!("pool_set"), pool_id),
        (alloc_point, total_alloc_point),
    );
}

pub fn rare_drop_updated(env: &Env, pool_id: u32, chance_bps: u32, amount: i128) {
    env.events().publish(
        (symbol_short!("rare_set"), pool_id),
        (chance_bps, amount),
    );
}

pub fn emission_rate_updated(env: &Env, old_rate: i128, new_rate: i128) {
    env.events().publish((symbol_short!("rate_set"),), (old_rate, new_rate));
}

pub fn deposit(env: &Env, user: &Address, pool_id: u32, amount: i128) {
    env.events().publish(
        (symbol_short!("deposit"), user.clone()),
        (pool_id, amount),
    );
}

pub fn withdraw(env: &Env, user: &Address, pool_id: u32, amount: i128) {
    env.events().publish(
        (symbol_short!("withdraw"), user.clone()),
        (pool_id, amount),
    );
}

pub fn harvest(env: &Env, user: &Address, pool_id: u32, reward: i128) {
    env.events().publish(
        (symbol_short!("harvest"), user.clone()),
        (pool_id, reward),
    );
}

pub fn emergency_withdraw(env: &Env, user: &Address, pool_id: u32, amount: i128) {
    env.events().publish(
        (symbol_short!("emergency"), user.clone()),
        (pool_id, amount),
    );
}

pub fn rare_drop(
    env: &Env,
    user: &Address,
    pool_id: u32,
    token: &Address,
    amount: i128,
    draw: u32,
) {
    env.events().publish(
        (symbol_short!("rare_drop"), user.clone()),
        (pool_id, token.clone(), amount, draw),
    );
}

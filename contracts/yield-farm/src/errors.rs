use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    PoolAlreadyExists = 4,
    PoolNotFound = 5,
    InvalidAmount = 6,
    InvalidAllocPoint = 7,
    InvalidRareDropChance = 8,
    LengthMismatch = 9,
    InsufficientStakedAmount = 10,
    MinimumStakingTimeNotMet = 11,
    ReentrancyViolation = 12,
    RandomnessUnavailable = 13,
    MathOverflow = 14,
}

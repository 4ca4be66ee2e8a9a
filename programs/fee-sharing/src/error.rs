use anchor_lang::prelude::*;

/// Result type of the pure ledger functions; handlers convert with `?`.
pub type LedgerResult<T> = core::result::Result<T, FeeSharingError>;

#[error_code]
pub enum FeeSharingError {
    #[msg("Amount must be greater than zero")]
    InvalidAmount,
    #[msg("Batch size must be greater than zero")]
    InvalidBatchSize,
    #[msg("Checkpoint index out of range")]
    OutOfRange,
    #[msg("No tokens for a withdrawal")]
    NothingToClaim,
    #[msg("Source is not an initialized program-owned account")]
    InvalidSource,
    #[msg("Invalid converter")]
    InvalidConverter,
    #[msg("Unauthorized")]
    Unauthorized,
    #[msg("Amount exceeds available balance")]
    InsufficientBalance,
    #[msg("Math overflow")]
    MathOverflow,
    #[msg("Distribution is already in progress")]
    Reentrancy,
    #[msg("Withdrawal interval has not elapsed")]
    IntervalNotElapsed,
    #[msg("Withdrawal interval must be positive")]
    InvalidInterval,
    #[msg("Source whitelist is full")]
    SourceListFull,
    #[msg("Weight history account is missing or malformed")]
    InvalidOracleAccount,
    #[msg("Receiver does not match the claim")]
    InvalidReceiver,
    #[msg("Token mint does not match pool")]
    MintMismatch,
    #[msg("Pool kind does not match instruction")]
    InvalidPool,
    #[msg("Checkpoint page does not match the pool or claim range")]
    CheckpointMismatch,
}

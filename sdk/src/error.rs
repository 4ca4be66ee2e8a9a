//! SDK error type.

use solana_sdk::pubkey::Pubkey;

/// All errors returned by the fee-sharing SDK.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── RPC / network ────────────────────────────────────────────────────────
    /// A Solana JSON-RPC call failed.
    #[error("RPC error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    // ── Account discovery ────────────────────────────────────────────────────
    #[error("Collector not initialized for program {0}")]
    CollectorNotFound(Pubkey),

    /// No pool has been opened for this pool id yet (no deposit so far).
    #[error("Pool not found for pool id {0}")]
    PoolNotFound(Pubkey),

    // ── Claims ───────────────────────────────────────────────────────────────
    /// The computed entitlement is zero, so the program would reject the claim.
    #[error("Nothing to claim from pool {0}")]
    NothingToClaim(Pubkey),

    // ── Arithmetic ───────────────────────────────────────────────────────────
    #[error("Integer overflow in entitlement math")]
    MathOverflow,

    // ── Account parsing ──────────────────────────────────────────────────────
    /// Raw account bytes could not be deserialized.
    #[error("Account parse error at offset {offset}: {reason}")]
    ParseError { offset: usize, reason: String },

    // ── Validation ───────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

//! Parameter and result types for [`crate::FeeSharingClient`].
//!
//! Results serialize with base58 keys so agents can emit them as JSON.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use solana_sdk::pubkey::Pubkey;

use crate::instructions::{SourceAccounts, NATIVE_POOL_ID};

fn display<T: Display, S: Serializer>(v: &T, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&v.to_string())
}

// ─── Pool selection ───────────────────────────────────────────────────────────

/// Which pool an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    /// Lamports held by the native pool.
    Native,
    /// SPL tokens of the given mint.
    Token(Pubkey),
}

impl PoolKind {
    pub fn pool_id(&self) -> Pubkey {
        match self {
            PoolKind::Native => NATIVE_POOL_ID,
            PoolKind::Token(mint) => *mint,
        }
    }

    pub fn from_pool_id(id: Pubkey) -> Self {
        if id == NATIVE_POOL_ID { PoolKind::Native } else { PoolKind::Token(id) }
    }
}

impl Display for PoolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolKind::Native => write!(f, "native"),
            PoolKind::Token(mint) => write!(f, "{mint}"),
        }
    }
}

impl FromStr for PoolKind {
    type Err = crate::Error;

    /// `native` / `sol`, or a base58 mint address.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "native" | "sol" => Ok(PoolKind::Native),
            _ => Pubkey::from_str(s)
                .map(PoolKind::Token)
                .map_err(|_| crate::Error::InvalidArgument(format!("not a pool: {s}"))),
        }
    }
}

impl Serialize for PoolKind {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        display(self, s)
    }
}

// ─── Params ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DepositParams {
    pub pool:   PoolKind,
    pub amount: u64,
}

#[derive(Debug, Clone)]
pub struct ClaimParams {
    pub pool:            PoolKind,
    /// Upper bound on checkpoints processed by one transaction.
    pub max_checkpoints: u32,
    /// Defaults to the claimant.
    pub receiver:        Option<Pubkey>,
}

#[derive(Debug, Clone)]
pub struct SourceDepositParams {
    pub accounts: SourceAccounts,
}

// ─── Results ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct DepositResult {
    pub signature: String,
    pub pool:      PoolKind,
    #[serde(serialize_with = "display")]
    pub fee_pool:  Pubkey,
    pub amount:    u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimResult {
    pub signature:       String,
    pub pool:            PoolKind,
    #[serde(serialize_with = "display")]
    pub receiver:        Pubkey,
    pub amount:          u64,
    pub processed_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimAllResult {
    pub pool:         PoolKind,
    pub claims:       Vec<ClaimResult>,
    pub total_amount: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TxResult {
    pub signature: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PoolInfo {
    pub pool:                PoolKind,
    #[serde(serialize_with = "display")]
    pub address:             Pubkey,
    #[serde(serialize_with = "display")]
    pub vault:               Pubkey,
    pub checkpoint_count:    u64,
    pub pending_accrual:     u64,
    pub last_seal_time:      i64,
    pub next_seal_time:      i64,
    /// Token balance of the vault, or lamports of the native pool account.
    pub balance:             u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckpointInfo {
    pub index:                u64,
    pub slot:                 u64,
    pub timestamp:            i64,
    #[serde(serialize_with = "display")]
    pub total_weighted_stake: u128,
    pub amount:               u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntitlementInfo {
    pub pool:             PoolKind,
    #[serde(serialize_with = "display")]
    pub owner:            Pubkey,
    pub processed_count:  u64,
    pub checkpoint_count: u64,
    pub is_escrow:        bool,
    pub entitlement:      u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectorInfo {
    #[serde(serialize_with = "display")]
    pub address:              Pubkey,
    #[serde(serialize_with = "display")]
    pub admin:                Pubkey,
    #[serde(serialize_with = "display")]
    pub weight_oracle:        Pubkey,
    #[serde(serialize_with = "display")]
    pub total_weight_history: Pubkey,
    #[serde(serialize_with = "display")]
    pub wrapped_reserve:      Pubkey,
    pub reserve_balance:      u64,
    pub withdrawal_interval:  i64,
    pub locked:               bool,
    pub sources:              Vec<String>,
}

//! Fee Sharing Rust SDK
//!
//! Client for the fee-sharing program on Solana. Deposit fees into per-asset
//! pools, seal them into checkpoints and claim the stake-weighted share of
//! each checkpoint. No Anchor dependency required.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use fee_sharing_sdk::{ClaimParams, FeeSharingClient, PoolKind};
//! use solana_sdk::{pubkey::Pubkey, signature::Keypair};
//! use std::str::FromStr;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client  = FeeSharingClient::devnet();
//!     let keypair = Keypair::new(); // use your funded staker keypair
//!
//!     let usdc = Pubkey::from_str("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v")?;
//!     let pool = PoolKind::Token(usdc);
//!
//!     // 1. See what is owed
//!     let owed = client.entitlement(&solana_sdk::signer::Signer::pubkey(&keypair), pool).await?;
//!     println!("Claimable: {} over {} checkpoints", owed.entitlement, owed.checkpoint_count);
//!
//!     // 2. Claim up to 32 checkpoints in one transaction
//!     let result = client.claim(&keypair, ClaimParams {
//!         pool,
//!         max_checkpoints: 32,
//!         receiver:        None,
//!     }).await?;
//!     println!("Claimed {}! tx: {}", result.amount, result.signature);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Feature Overview
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`FeeSharingClient::initialize_collector`] | Create the collector and its reserve |
//! | [`FeeSharingClient::deposit`] | Deposit tokens or lamports into a pool |
//! | [`FeeSharingClient::deposit_from_source`] | Pull fees from a whitelisted source |
//! | [`FeeSharingClient::seal_pending`] | Seal pending fees once the interval passed |
//! | [`FeeSharingClient::claim`] | Claim one batch of checkpoints |
//! | [`FeeSharingClient::claim_all`] | Claim everything owed, batch by batch |
//! | [`FeeSharingClient::entitlement`] | Off-chain estimate of what is claimable |
//! | [`FeeSharingClient::pool_info`] | Checkpoints, pending accrual, balance |
//! | [`FeeSharingClient::collector_info`] | Admin, oracle, sources, reserve |

pub mod client;
pub mod error;
pub mod instructions;
pub mod math;
pub mod state;
pub mod types;

pub use client::FeeSharingClient;
pub use error::{Error, Result};
pub use types::*;

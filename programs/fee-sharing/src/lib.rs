/// Fee Sharing: checkpointed revenue distribution to weighted stake-holders.
///
/// Revenue for each asset (and the native reserve) accrues in a pool and is
/// sealed into checkpoints at most once per withdrawal interval. Holders
/// claim their pro-rata share checkpoint by checkpoint, in bounded batches.
/// Sealed checkpoints are kept in fixed-size page accounts; claims and quotes
/// pass the pages they read as remaining accounts.
///
/// 11 instructions:
///   initialize_collector   create the config/authority PDA and wrapped reserve
///   deposit_asset          deposit SPL tokens into the pool for their mint
///   deposit_native         deposit lamports into the native pool
///   deposit_from_source    pull fees from a whitelisted source program
///   seal_pending           seal a pool's pending accrual after the interval
///   claim                  claim a token pool share, up to N checkpoints
///   claim_native           claim a native pool share, up to N checkpoints
///   quote_entitlement      emit the claimable amount (simulation)
///   add_source             admin: whitelist a fee source
///   remove_source          admin: drop a fee source
///   sweep_reserve          admin: move wrapped-native reserve balance

// ─── Security contact ─────────────────────────────────────────────────────────

use solana_security_txt::security_txt;

#[cfg(not(feature = "no-entrypoint"))]
security_txt! {
    name:             "Fee Sharing",
    project_url:      "https://github.com/fee-sharing/fee-sharing",
    contacts:         "email:security@fee-sharing.dev",
    policy:           "Please report security vulnerabilities by email. \
                       We aim to respond within 48 hours.",
    source_code:      "https://github.com/fee-sharing/fee-sharing",
    preferred_languages: "en"
}

pub mod batcher;
pub mod constants;
pub mod entitlement;
pub mod error;
pub mod instructions;
pub mod ledger;
pub mod oracle;
pub mod reserve;
pub mod source;
pub mod state;

use anchor_lang::prelude::*;
pub use constants::*;
pub use instructions::*;
pub use state::*;

declare_id!("2AAuWGsMDmgjFP9dqQ1uhs2UR8GPHr7JNWkFzjVcXWUo");

#[program]
pub mod fee_sharing {
    use super::*;

    /// Create the collector. The signer becomes admin.
    pub fn initialize_collector(
        ctx: Context<InitializeCollector>,
        weight_oracle: Pubkey,
        total_weight_history: Pubkey,
        withdrawal_interval: i64,
    ) -> Result<()> {
        initialize_collector::handler(ctx, weight_oracle, total_weight_history, withdrawal_interval)
    }

    /// Deposit tokens; seals a checkpoint if the interval has passed.
    pub fn deposit_asset(ctx: Context<DepositAsset>, amount: u64) -> Result<()> {
        deposit_asset::handler(ctx, amount)
    }

    /// Deposit lamports into the native pool.
    pub fn deposit_native(ctx: Context<DepositNative>, amount: u64) -> Result<()> {
        deposit_native::handler(ctx, amount)
    }

    /// Pull accrued fees from a whitelisted source.
    pub fn deposit_from_source(ctx: Context<DepositFromSource>) -> Result<()> {
        deposit_from_source::handler(ctx)
    }

    /// Seal pending accrual without a deposit.
    pub fn seal_pending(ctx: Context<SealPending>) -> Result<()> {
        seal_pending::handler(ctx)
    }

    /// Claim from a token pool. Default `receiver` means the claimant.
    pub fn claim(ctx: Context<Claim>, max_checkpoints: u32, receiver: Pubkey) -> Result<()> {
        claim::handler(ctx, max_checkpoints, receiver)
    }

    /// Claim lamports from the native pool.
    pub fn claim_native(
        ctx: Context<ClaimNative>,
        max_checkpoints: u32,
        receiver: Pubkey,
    ) -> Result<()> {
        claim_native::handler(ctx, max_checkpoints, receiver)
    }

    pub fn quote_entitlement(ctx: Context<QuoteEntitlement>) -> Result<()> {
        quote_entitlement::handler(ctx)
    }

    pub fn add_source(ctx: Context<ManageSources>, source: Pubkey) -> Result<()> {
        manage_sources::add_handler(ctx, source)
    }

    pub fn remove_source(ctx: Context<ManageSources>, source: Pubkey) -> Result<()> {
        manage_sources::remove_handler(ctx, source)
    }

    /// Admin sweep of the wrapped-native reserve.
    pub fn sweep_reserve(ctx: Context<SweepReserve>, amount: u64) -> Result<()> {
        sweep_reserve::handler(ctx, amount)
    }
}

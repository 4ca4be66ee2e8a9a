//! Low-level Anchor instruction builders.
//!
//! Each function constructs a [`solana_sdk::instruction::Instruction`] ready
//! for signing and submission.  Account order mirrors the Anchor
//! `#[derive(Accounts)]` structs in the on-chain program exactly.
//!
//! Anchor instruction discriminators: `sha256("global:{name}")[..8]`.
//! Anchor account discriminators:    `sha256("account:{TypeName}")[..8]`.

use std::ops::Range;

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use crate::state::CHECKPOINTS_PER_PAGE;

// ─── Well-known program IDs ───────────────────────────────────────────────────

pub const SPL_TOKEN_ID:     Pubkey = solana_sdk::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const ATA_PROGRAM_ID:   Pubkey = solana_sdk::pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");
pub const NATIVE_MINT:      Pubkey = solana_sdk::pubkey!("So11111111111111111111111111111111111111112");
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new_from_array([0; 32]);

// ─── PDA seeds (mirrors programs/fee-sharing/src/constants.rs) ───────────────

pub const COLLECTOR_SEED:    &[u8] = b"collector";
pub const POOL_SEED:         &[u8] = b"pool";
pub const VAULT_SEED:        &[u8] = b"vault";
pub const CURSOR_SEED:       &[u8] = b"cursor";
pub const RESERVE_SEED:      &[u8] = b"reserve";
pub const STAKE_WEIGHT_SEED: &[u8] = b"stake_weights";
pub const CHECKPOINT_SEED:   &[u8] = b"checkpoint";

/// Pool id of the native-currency pool.
pub const NATIVE_POOL_ID: Pubkey = Pubkey::new_from_array([0xff; 32]);

// ─── PDA derivation helpers ───────────────────────────────────────────────────

pub fn derive_collector(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[COLLECTOR_SEED], program_id)
}

/// Derive the pool PDA for a mint or [`NATIVE_POOL_ID`].
pub fn derive_fee_pool(pool_id: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[POOL_SEED, pool_id.as_ref()], program_id)
}

/// Derive the token vault PDA of a mint's pool.
pub fn derive_vault(mint: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED, mint.as_ref()], program_id)
}

/// Derive an owner's claim cursor for a pool account.
pub fn derive_cursor(fee_pool: &Pubkey, owner: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[CURSOR_SEED, fee_pool.as_ref(), owner.as_ref()],
        program_id,
    )
}

/// Derive page `page` of a pool's checkpoints.
pub fn derive_checkpoint_page(pool_id: &Pubkey, page: u64, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[CHECKPOINT_SEED, pool_id.as_ref(), &page.to_le_bytes()],
        program_id,
    )
}

/// Page receiving the next checkpoint of a pool holding `checkpoint_count`.
pub fn open_page(checkpoint_count: u64) -> u64 {
    checkpoint_count / CHECKPOINTS_PER_PAGE
}

/// Read-only metas of every page covering checkpoints `range`, passed as
/// remaining accounts to `claim`, `claim_native` and `quote_entitlement`.
pub fn page_metas(pool_id: &Pubkey, range: Range<u64>, program_id: &Pubkey) -> Vec<AccountMeta> {
    if range.is_empty() {
        return Vec::new();
    }
    (range.start / CHECKPOINTS_PER_PAGE..=(range.end - 1) / CHECKPOINTS_PER_PAGE)
        .map(|page| AccountMeta::new_readonly(derive_checkpoint_page(pool_id, page, program_id).0, false))
        .collect()
}

pub fn derive_reserve(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[RESERVE_SEED], program_id)
}

/// Derive an owner's stake weight history under the weight program.
pub fn derive_stake_weights(owner: &Pubkey, weight_program: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[STAKE_WEIGHT_SEED, owner.as_ref()], weight_program)
}

/// Derive the Associated Token Account for a wallet + mint.
pub fn derive_ata(wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[wallet.as_ref(), SPL_TOKEN_ID.as_ref(), mint.as_ref()],
        &ATA_PROGRAM_ID,
    )
    .0
}

// ─── Discriminator ────────────────────────────────────────────────────────────

fn disc(name: &str) -> Vec<u8> {
    let preimage = format!("global:{name}");
    solana_sdk::hash::hash(preimage.as_bytes()).to_bytes()[..8].to_vec()
}

/// Anchor account discriminator: `sha256("account:{TypeName}")[..8]`.
pub fn account_disc(type_name: &str) -> [u8; 8] {
    let h = solana_sdk::hash::hash(format!("account:{type_name}").as_bytes()).to_bytes();
    let mut out = [0u8; 8];
    out.copy_from_slice(&h[..8]);
    out
}

// ─── initialize_collector ─────────────────────────────────────────────────────

pub fn initialize_collector_ix(
    program_id:           &Pubkey,
    admin:                &Pubkey,
    weight_oracle:        &Pubkey,
    total_weight_history: &Pubkey,
    withdrawal_interval:  i64,
) -> Instruction {
    let (collector, _) = derive_collector(program_id);
    let (reserve, _)   = derive_reserve(program_id);

    let mut data = disc("initialize_collector");
    data.extend_from_slice(weight_oracle.as_ref());
    data.extend_from_slice(total_weight_history.as_ref());
    data.extend_from_slice(&withdrawal_interval.to_le_bytes());

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*admin,                 true),   // mut + signer
            AccountMeta::new(collector,              false),  // mut PDA (init)
            AccountMeta::new_readonly(NATIVE_MINT,   false),
            AccountMeta::new(reserve,                false),  // mut PDA (init)
            AccountMeta::new_readonly(SPL_TOKEN_ID,  false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        ],
        data,
    }
}

// ─── deposits ─────────────────────────────────────────────────────────────────

/// Build `deposit_asset`. Pays from the depositor's ATA for `mint`.
/// `checkpoint_count` is the pool's current count (0 for a new pool).
pub fn deposit_asset_ix(
    program_id:       &Pubkey,
    depositor:        &Pubkey,
    mint:             &Pubkey,
    total_weight:     &Pubkey,
    checkpoint_count: u64,
    amount:           u64,
) -> Instruction {
    let (collector, _) = derive_collector(program_id);
    let (fee_pool, _)  = derive_fee_pool(mint, program_id);
    let (page, _)      = derive_checkpoint_page(mint, open_page(checkpoint_count), program_id);
    let (vault, _)     = derive_vault(mint, program_id);

    let mut data = disc("deposit_asset");
    data.extend_from_slice(&amount.to_le_bytes());

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*depositor,              true),   // mut + signer
            AccountMeta::new(collector,               false),  // mut (lock)
            AccountMeta::new_readonly(*mint,          false),
            AccountMeta::new(fee_pool,                false),  // mut PDA (init_if_needed)
            AccountMeta::new(page,                    false),  // mut PDA (init_if_needed)
            AccountMeta::new(vault,                   false),  // mut PDA (init_if_needed)
            AccountMeta::new(derive_ata(depositor, mint), false),
            AccountMeta::new_readonly(*total_weight,  false),
            AccountMeta::new_readonly(SPL_TOKEN_ID,   false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        ],
        data,
    }
}

pub fn deposit_native_ix(
    program_id:       &Pubkey,
    depositor:        &Pubkey,
    total_weight:     &Pubkey,
    checkpoint_count: u64,
    amount:           u64,
) -> Instruction {
    let (collector, _) = derive_collector(program_id);
    let (fee_pool, _)  = derive_fee_pool(&NATIVE_POOL_ID, program_id);
    let (page, _)      = derive_checkpoint_page(&NATIVE_POOL_ID, open_page(checkpoint_count), program_id);

    let mut data = disc("deposit_native");
    data.extend_from_slice(&amount.to_le_bytes());

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*depositor,             true),
            AccountMeta::new(collector,              false),
            AccountMeta::new(fee_pool,               false),
            AccountMeta::new(page,                   false),
            AccountMeta::new_readonly(*total_weight, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        ],
        data,
    }
}

/// Accounts of a fee source, as its program expects them for `withdraw_fees`.
#[derive(Debug, Clone, Copy)]
pub struct SourceAccounts {
    pub source:           Pubkey,
    pub source_program:   Pubkey,
    pub source_fee_vault: Pubkey,
    pub source_authority: Pubkey,
    pub fee_mint:         Pubkey,
}

pub fn deposit_from_source_ix(
    program_id:       &Pubkey,
    caller:           &Pubkey,
    source:           &SourceAccounts,
    total_weight:     &Pubkey,
    checkpoint_count: u64,
) -> Instruction {
    let (collector, _) = derive_collector(program_id);
    let (fee_pool, _)  = derive_fee_pool(&source.fee_mint, program_id);
    let (page, _)      = derive_checkpoint_page(&source.fee_mint, open_page(checkpoint_count), program_id);
    let (vault, _)     = derive_vault(&source.fee_mint, program_id);

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*caller,                          true),
            AccountMeta::new(collector,                        false),
            AccountMeta::new(source.source,                    false),
            AccountMeta::new_readonly(source.source_program,   false),
            AccountMeta::new(source.source_fee_vault,          false),
            AccountMeta::new_readonly(source.source_authority, false),
            AccountMeta::new_readonly(source.fee_mint,         false),
            AccountMeta::new(fee_pool,                         false),
            AccountMeta::new(page,                             false),
            AccountMeta::new(vault,                            false),
            AccountMeta::new_readonly(*total_weight,           false),
            AccountMeta::new_readonly(SPL_TOKEN_ID,            false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID,       false),
        ],
        data: disc("deposit_from_source"),
    }
}

pub fn seal_pending_ix(
    program_id:       &Pubkey,
    caller:           &Pubkey,
    pool_id:          &Pubkey,
    total_weight:     &Pubkey,
    checkpoint_count: u64,
) -> Instruction {
    let (collector, _) = derive_collector(program_id);
    let (fee_pool, _)  = derive_fee_pool(pool_id, program_id);
    let (page, _)      = derive_checkpoint_page(pool_id, open_page(checkpoint_count), program_id);

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*caller,                true),
            AccountMeta::new(collector,              false),
            AccountMeta::new(fee_pool,               false),
            AccountMeta::new(page,                   false),
            AccountMeta::new_readonly(*total_weight, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        ],
        data: disc("seal_pending"),
    }
}

// ─── claims ───────────────────────────────────────────────────────────────────

fn claim_data(name: &str, max_checkpoints: u32, receiver: &Pubkey) -> Vec<u8> {
    let mut data = disc(name);
    data.extend_from_slice(&max_checkpoints.to_le_bytes());
    data.extend_from_slice(receiver.as_ref());
    data
}

fn batch_len(batch: &Range<u64>) -> u32 {
    u32::try_from(batch.end.saturating_sub(batch.start)).unwrap_or(u32::MAX)
}

/// Build `claim` for a token pool. Pays into `receiver`'s ATA for `mint`.
/// `batch` is `processed_count..end`; its pages ride along as remaining accounts.
pub fn claim_ix(
    program_id:   &Pubkey,
    claimant:     &Pubkey,
    mint:         &Pubkey,
    receiver:     &Pubkey,
    stake_weight: &Pubkey,
    batch:        Range<u64>,
) -> Instruction {
    let (collector, _) = derive_collector(program_id);
    let (fee_pool, _)  = derive_fee_pool(mint, program_id);
    let (vault, _)     = derive_vault(mint, program_id);
    let (cursor, _)    = derive_cursor(&fee_pool, claimant, program_id);
    let max_checkpoints = batch_len(&batch);

    let mut accounts = vec![
        AccountMeta::new(*claimant,              true),
        AccountMeta::new(collector,              false),
        AccountMeta::new_readonly(fee_pool,      false),
        AccountMeta::new(vault,                  false),
        AccountMeta::new(cursor,                 false),  // mut PDA (init_if_needed)
        AccountMeta::new(derive_ata(receiver, mint), false),
        AccountMeta::new_readonly(*stake_weight, false),
        AccountMeta::new_readonly(SPL_TOKEN_ID,  false),
        AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
    ];
    accounts.extend(page_metas(mint, batch, program_id));

    Instruction {
        program_id: *program_id,
        accounts,
        data: claim_data("claim", max_checkpoints, receiver),
    }
}

/// Build `claim_native`. Lamports go to `receiver` directly; it must stay
/// rent exempt after the payout.
pub fn claim_native_ix(
    program_id:   &Pubkey,
    claimant:     &Pubkey,
    receiver:     &Pubkey,
    stake_weight: &Pubkey,
    batch:        Range<u64>,
) -> Instruction {
    let (collector, _) = derive_collector(program_id);
    let (fee_pool, _)  = derive_fee_pool(&NATIVE_POOL_ID, program_id);
    let (cursor, _)    = derive_cursor(&fee_pool, claimant, program_id);
    let max_checkpoints = batch_len(&batch);

    let mut accounts = vec![
        AccountMeta::new(*claimant,              true),
        AccountMeta::new(collector,              false),
        AccountMeta::new(fee_pool,               false),
        AccountMeta::new(cursor,                 false),
        AccountMeta::new(*receiver,              false),
        AccountMeta::new_readonly(*stake_weight, false),
        AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
    ];
    accounts.extend(page_metas(&NATIVE_POOL_ID, batch, program_id));

    Instruction {
        program_id: *program_id,
        accounts,
        data: claim_data("claim_native", max_checkpoints, receiver),
    }
}

/// `unprocessed` is `processed_count..checkpoint_count`.
pub fn quote_entitlement_ix(
    program_id:   &Pubkey,
    pool_id:      &Pubkey,
    account:      &Pubkey,
    stake_weight: &Pubkey,
    unprocessed:  Range<u64>,
) -> Instruction {
    let (collector, _) = derive_collector(program_id);
    let (fee_pool, _)  = derive_fee_pool(pool_id, program_id);
    let (cursor, _)    = derive_cursor(&fee_pool, account, program_id);

    let mut accounts = vec![
        AccountMeta::new_readonly(collector,     false),
        AccountMeta::new_readonly(fee_pool,      false),
        AccountMeta::new_readonly(*account,      false),
        AccountMeta::new_readonly(cursor,        false),
        AccountMeta::new_readonly(*stake_weight, false),
    ];
    accounts.extend(page_metas(pool_id, unprocessed, program_id));

    Instruction {
        program_id: *program_id,
        accounts,
        data: disc("quote_entitlement"),
    }
}

// ─── admin ────────────────────────────────────────────────────────────────────

fn source_ix(name: &str, program_id: &Pubkey, admin: &Pubkey, source: &Pubkey) -> Instruction {
    let (collector, _) = derive_collector(program_id);
    let mut data = disc(name);
    data.extend_from_slice(source.as_ref());
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*admin, true),
            AccountMeta::new(collector,       false),
        ],
        data,
    }
}

pub fn add_source_ix(program_id: &Pubkey, admin: &Pubkey, source: &Pubkey) -> Instruction {
    source_ix("add_source", program_id, admin, source)
}

pub fn remove_source_ix(program_id: &Pubkey, admin: &Pubkey, source: &Pubkey) -> Instruction {
    source_ix("remove_source", program_id, admin, source)
}

/// Build `sweep_reserve`. `receiver_token` must be a wrapped-native token account.
pub fn sweep_reserve_ix(
    program_id:     &Pubkey,
    admin:          &Pubkey,
    receiver_token: &Pubkey,
    amount:         u64,
) -> Instruction {
    let (collector, _) = derive_collector(program_id);
    let (reserve, _)   = derive_reserve(program_id);

    let mut data = disc("sweep_reserve");
    data.extend_from_slice(&amount.to_le_bytes());

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*admin,       true),
            AccountMeta::new(collector,             false),
            AccountMeta::new(reserve,               false),
            AccountMeta::new(*receiver_token,       false),
            AccountMeta::new_readonly(SPL_TOKEN_ID, false),
        ],
        data,
    }
}

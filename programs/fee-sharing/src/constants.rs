use anchor_lang::prelude::Pubkey;

/// PDA seeds
pub const COLLECTOR_SEED: &[u8] = b"collector";
pub const POOL_SEED: &[u8] = b"pool";
pub const VAULT_SEED: &[u8] = b"vault";
pub const CURSOR_SEED: &[u8] = b"cursor";
pub const RESERVE_SEED: &[u8] = b"reserve";
/// [CHECKPOINT_SEED, pool_id, page as u64 le]
pub const CHECKPOINT_SEED: &[u8] = b"checkpoint";

/// Seed the weight program uses for per-account history PDAs: [STAKE_WEIGHT_SEED, owner]
pub const STAKE_WEIGHT_SEED: &[u8] = b"stake_weights";

/// Pool id of the native-currency pool. Lamports are held by the pool account itself.
pub const NATIVE_POOL_ID: Pubkey = Pubkey::new_from_array([0xff; 32]);

/// Minimum seconds between two seals of the same pool (one day)
pub const DEFAULT_WITHDRAWAL_INTERVAL: i64 = 86_400;

/// Checkpoints stored per page account
pub const CHECKPOINTS_PER_PAGE: u64 = 64;

/// Whitelisted fee sources per collector
pub const MAX_SOURCES: usize = 16;

/// Anchor discriminator of the `withdraw_fees` instruction a fee source
/// exposes: sha256("global:withdraw_fees")[..8]
pub const WITHDRAW_FEES_DISCRIMINATOR: [u8; 8] = [0xc6, 0xd4, 0xab, 0x6d, 0x90, 0xd7, 0xae, 0x59];

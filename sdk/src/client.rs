//! [`FeeSharingClient`]: the main entry point for integrations.

use solana_account_decoder_client_types::UiAccountEncoding;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::{Memcmp, MemcmpEncodedBytes, RpcFilterType},
};
use std::ops::Range;

use solana_sdk::{
    commitment_config::CommitmentConfig,
    compute_budget::ComputeBudgetInstruction,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};

use crate::{
    error::{Error, Result},
    instructions::{
        account_disc, add_source_ix, claim_ix, claim_native_ix, deposit_asset_ix,
        deposit_from_source_ix, deposit_native_ix, derive_checkpoint_page, derive_collector,
        derive_cursor, derive_fee_pool, derive_stake_weights, initialize_collector_ix,
        remove_source_ix, seal_pending_ix, sweep_reserve_ix,
    },
    math::{accumulated_entitlement, next_seal_time, plan_claim, ClaimPlan},
    state::{
        parse_checkpoint_page, parse_collector, parse_cursor, parse_fee_pool,
        parse_stake_weights, parse_token_amount, CheckpointState, CollectorState, FeePoolState,
        StakeWeightsState, CHECKPOINTS_PER_PAGE,
    },
    types::{
        CheckpointInfo, ClaimAllResult, ClaimParams, ClaimResult, CollectorInfo, DepositParams,
        DepositResult, EntitlementInfo, PoolInfo, PoolKind, SourceDepositParams, TxResult,
    },
};

// ─── Constants ────────────────────────────────────────────────────────────────

const DEFAULT_PROGRAM_ID: Pubkey = solana_sdk::pubkey!("2AAuWGsMDmgjFP9dqQ1uhs2UR8GPHr7JNWkFzjVcXWUo");
const DEVNET_RPC:  &str = "https://api.devnet.solana.com";
const MAINNET_RPC: &str = "https://api.mainnet-beta.solana.com";

/// Compute limit requested for claims; a wide batch reads several pages.
const CLAIM_COMPUTE_UNITS: u32 = 1_400_000;
/// `getMultipleAccounts` accepts at most 100 keys per call.
const MAX_MULTIPLE_ACCOUNTS: usize = 100;

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async fee-sharing client for Solana.
///
/// The weight program and total weight history accounts are read from the
/// on-chain collector, so only the program id needs configuring.
///
/// ```rust,no_run
/// # use fee_sharing_sdk::{FeeSharingClient, PoolKind};
/// # use solana_sdk::pubkey::Pubkey;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = FeeSharingClient::devnet();
/// let owner  = Pubkey::new_unique();
/// let info   = client.entitlement(&owner, PoolKind::Native).await?;
/// println!("Claimable: {} lamports", info.entitlement);
/// # Ok(())
/// # }
/// ```
pub struct FeeSharingClient {
    rpc_url:    String,
    program_id: Pubkey,
}

impl FeeSharingClient {
    /// Create a client pointing at any RPC endpoint.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self { rpc_url: rpc_url.into(), program_id: DEFAULT_PROGRAM_ID }
    }

    /// Pre-configured client for Solana devnet.
    pub fn devnet() -> Self {
        Self::new(DEVNET_RPC)
    }

    /// Pre-configured client for Solana mainnet-beta.
    pub fn mainnet() -> Self {
        Self::new(MAINNET_RPC)
    }

    /// Override the program ID (useful for locally deployed programs in tests).
    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    // ── Write operations ──────────────────────────────────────────────────────

    /// Create the collector. The payer becomes admin.
    pub async fn initialize_collector(
        &self,
        admin:                &Keypair,
        weight_oracle:        Pubkey,
        total_weight_history: Pubkey,
        withdrawal_interval:  i64,
    ) -> Result<TxResult> {
        if withdrawal_interval <= 0 {
            return Err(Error::InvalidArgument("withdrawal_interval must be > 0".into()));
        }
        let rpc = self.rpc();
        let ix = initialize_collector_ix(
            &self.program_id,
            &admin.pubkey(),
            &weight_oracle,
            &total_weight_history,
            withdrawal_interval,
        );
        let sig = self.sign_and_send(&rpc, &[ix], admin).await?;
        Ok(TxResult { signature: sig.to_string() })
    }

    /// Deposit tokens (from the payer's ATA) or lamports into a pool.
    pub async fn deposit(&self, payer: &Keypair, params: DepositParams) -> Result<DepositResult> {
        if params.amount == 0 {
            return Err(Error::InvalidArgument("amount must be > 0".into()));
        }
        let rpc = self.rpc();
        let collector = self.fetch_collector(&rpc).await?;
        let count = self.fetch_checkpoint_count(&rpc, params.pool).await?;

        let ix = match params.pool {
            PoolKind::Native => deposit_native_ix(
                &self.program_id,
                &payer.pubkey(),
                &collector.total_weight_history,
                count,
                params.amount,
            ),
            PoolKind::Token(mint) => deposit_asset_ix(
                &self.program_id,
                &payer.pubkey(),
                &mint,
                &collector.total_weight_history,
                count,
                params.amount,
            ),
        };
        let sig = self.sign_and_send(&rpc, &[ix], payer).await?;

        Ok(DepositResult {
            signature: sig.to_string(),
            pool:      params.pool,
            fee_pool:  derive_fee_pool(&params.pool.pool_id(), &self.program_id).0,
            amount:    params.amount,
        })
    }

    /// Pull accrued fees from a whitelisted source program.
    pub async fn deposit_from_source(
        &self,
        payer:  &Keypair,
        params: SourceDepositParams,
    ) -> Result<TxResult> {
        let rpc = self.rpc();
        let collector = self.fetch_collector(&rpc).await?;
        if !collector.sources.contains(&params.accounts.source) {
            return Err(Error::InvalidArgument(format!(
                "source {} is not whitelisted",
                params.accounts.source
            )));
        }
        let count = self
            .fetch_checkpoint_count(&rpc, PoolKind::Token(params.accounts.fee_mint))
            .await?;
        let ix = deposit_from_source_ix(
            &self.program_id,
            &payer.pubkey(),
            &params.accounts,
            &collector.total_weight_history,
            count,
        );
        let sig = self.sign_and_send(&rpc, &[ix], payer).await?;
        Ok(TxResult { signature: sig.to_string() })
    }

    /// Seal a pool's pending accrual once the withdrawal interval has passed.
    pub async fn seal_pending(&self, payer: &Keypair, pool: PoolKind) -> Result<TxResult> {
        let rpc = self.rpc();
        let collector = self.fetch_collector(&rpc).await?;
        let state = self.fetch_pool(&rpc, pool).await?;
        let ix = seal_pending_ix(
            &self.program_id,
            &payer.pubkey(),
            &pool.pool_id(),
            &collector.total_weight_history,
            state.checkpoint_count,
        );
        let sig = self.sign_and_send(&rpc, &[ix], payer).await?;
        Ok(TxResult { signature: sig.to_string() })
    }

    /// Claim one batch of at most `params.max_checkpoints` checkpoints.
    ///
    /// The batch is checked off-chain first; a batch that would pay nothing
    /// is widened to the first paying checkpoint rather than sent and rejected.
    pub async fn claim(&self, payer: &Keypair, params: ClaimParams) -> Result<ClaimResult> {
        let rpc = self.rpc();
        let collector = self.fetch_collector(&rpc).await?;
        let owner = payer.pubkey();
        let (pool_state, processed, holder, stake_weight) =
            self.fetch_claim_state(&rpc, &collector, &owner, params.pool).await?;
        let checkpoints = self
            .fetch_checkpoints(&rpc, params.pool, processed..pool_state.checkpoint_count)
            .await?;

        let plan = plan_claim(&checkpoints, processed, &holder, params.max_checkpoints)?
            .ok_or(Error::NothingToClaim(params.pool.pool_id()))?;
        let receiver = params.receiver.unwrap_or(owner);

        let ixs = self.claim_instructions(&owner, params.pool, &receiver, &stake_weight, &plan);
        let sig = self.sign_and_send(&rpc, &ixs, payer).await?;

        Ok(ClaimResult {
            signature:       sig.to_string(),
            pool:            params.pool,
            receiver,
            amount:          plan.amount,
            processed_count: plan.processed_after,
        })
    }

    /// Claim everything owed, one transaction per batch of `batch` checkpoints.
    pub async fn claim_all(
        &self,
        payer:    &Keypair,
        pool:     PoolKind,
        batch:    u32,
        receiver: Option<Pubkey>,
    ) -> Result<ClaimAllResult> {
        let rpc = self.rpc();
        let collector = self.fetch_collector(&rpc).await?;
        let owner = payer.pubkey();
        let receiver = receiver.unwrap_or(owner);
        let (pool_state, mut processed, holder, stake_weight) =
            self.fetch_claim_state(&rpc, &collector, &owner, pool).await?;

        let checkpoints = self
            .fetch_checkpoints(&rpc, pool, processed..pool_state.checkpoint_count)
            .await?;

        let mut claims = Vec::new();
        while let Some(plan) = plan_claim(&checkpoints, processed, &holder, batch)? {
            let ixs = self.claim_instructions(&owner, pool, &receiver, &stake_weight, &plan);
            let sig = self.sign_and_send(&rpc, &ixs, payer).await?;
            processed = plan.processed_after;
            claims.push(ClaimResult {
                signature:       sig.to_string(),
                pool,
                receiver,
                amount:          plan.amount,
                processed_count: processed,
            });
        }
        if claims.is_empty() {
            return Err(Error::NothingToClaim(pool.pool_id()));
        }
        let total_amount = claims.iter().map(|c| c.amount).sum();
        Ok(ClaimAllResult { pool, claims, total_amount })
    }

    /// Admin: whitelist a fee source.
    pub async fn add_source(&self, admin: &Keypair, source: Pubkey) -> Result<TxResult> {
        let rpc = self.rpc();
        let ix = add_source_ix(&self.program_id, &admin.pubkey(), &source);
        let sig = self.sign_and_send(&rpc, &[ix], admin).await?;
        Ok(TxResult { signature: sig.to_string() })
    }

    /// Admin: remove a fee source.
    pub async fn remove_source(&self, admin: &Keypair, source: Pubkey) -> Result<TxResult> {
        let rpc = self.rpc();
        let ix = remove_source_ix(&self.program_id, &admin.pubkey(), &source);
        let sig = self.sign_and_send(&rpc, &[ix], admin).await?;
        Ok(TxResult { signature: sig.to_string() })
    }

    /// Admin: move `amount` from the wrapped-native reserve to `receiver_token`.
    pub async fn sweep_reserve(
        &self,
        admin:          &Keypair,
        receiver_token: Pubkey,
        amount:         u64,
    ) -> Result<TxResult> {
        let rpc = self.rpc();
        let ix = sweep_reserve_ix(&self.program_id, &admin.pubkey(), &receiver_token, amount);
        let sig = self.sign_and_send(&rpc, &[ix], admin).await?;
        Ok(TxResult { signature: sig.to_string() })
    }

    // ── Read operations ───────────────────────────────────────────────────────

    pub async fn collector_info(&self) -> Result<CollectorInfo> {
        let rpc = self.rpc();
        let collector = self.fetch_collector(&rpc).await?;
        let reserve_balance = match rpc.get_account_data(&collector.wrapped_reserve).await {
            Ok(data) => parse_token_amount(&data)?,
            Err(_) => 0,
        };
        Ok(CollectorInfo {
            address:              derive_collector(&self.program_id).0,
            admin:                collector.admin,
            weight_oracle:        collector.weight_oracle,
            total_weight_history: collector.total_weight_history,
            wrapped_reserve:      collector.wrapped_reserve,
            reserve_balance,
            withdrawal_interval:  collector.withdrawal_interval,
            locked:               collector.locked,
            sources:              collector.sources.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Checkpoint count, pending accrual, seal times and balance of a pool.
    pub async fn pool_info(&self, pool: PoolKind) -> Result<PoolInfo> {
        let rpc = self.rpc();
        let collector = self.fetch_collector(&rpc).await?;
        let address = derive_fee_pool(&pool.pool_id(), &self.program_id).0;
        let state = self.fetch_pool(&rpc, pool).await?;

        let balance = match pool {
            PoolKind::Native => rpc.get_balance(&address).await?,
            PoolKind::Token(_) => parse_token_amount(&rpc.get_account_data(&state.vault).await?)?,
        };

        Ok(PoolInfo {
            pool,
            address,
            vault:            state.vault,
            checkpoint_count: state.checkpoint_count(),
            pending_accrual:  state.pending_amount,
            last_seal_time:   state.last_seal_ts,
            next_seal_time:   next_seal_time(&state, collector.withdrawal_interval),
            balance,
        })
    }

    /// All pools opened so far.
    pub async fn list_pools(&self) -> Result<Vec<(Pubkey, FeePoolState)>> {
        let rpc = self.rpc();
        let config = RpcProgramAccountsConfig {
            filters: Some(vec![RpcFilterType::Memcmp(Memcmp::new(
                0,
                MemcmpEncodedBytes::Bytes(account_disc("FeePool").to_vec()),
            ))]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };
        let raw = rpc
            .get_program_accounts_with_config(&self.program_id, config)
            .await?;
        Ok(raw
            .into_iter()
            .filter_map(|(pk, acc)| parse_fee_pool(&acc.data).ok().map(|p| (pk, p)))
            .collect())
    }

    /// Checkpoint `index` of a pool.
    pub async fn checkpoint_at(&self, pool: PoolKind, index: u64) -> Result<CheckpointInfo> {
        let rpc = self.rpc();
        let state = self.fetch_pool(&rpc, pool).await?;
        if index >= state.checkpoint_count {
            return Err(Error::InvalidArgument(format!(
                "checkpoint {index} out of range (count {})",
                state.checkpoint_count
            )));
        }
        let cp = self
            .fetch_checkpoints(&rpc, pool, index..index + 1)
            .await?
            .into_iter()
            .next()
            .ok_or(Error::PoolNotFound(pool.pool_id()))?;
        Ok(CheckpointInfo {
            index:                cp.index,
            slot:                 cp.slot,
            timestamp:            cp.timestamp,
            total_weighted_stake: cp.total_weighted_stake,
            amount:               cp.amount,
        })
    }

    /// Number of checkpoints `owner` has already been paid for.
    pub async fn processed_count(&self, owner: &Pubkey, pool: PoolKind) -> Result<u64> {
        let rpc = self.rpc();
        self.fetch_processed(&rpc, owner, pool).await
    }

    /// What `owner` could claim from `pool` right now.
    pub async fn entitlement(&self, owner: &Pubkey, pool: PoolKind) -> Result<EntitlementInfo> {
        let rpc = self.rpc();
        let collector = self.fetch_collector(&rpc).await?;
        let (state, processed, holder, _) =
            self.fetch_claim_state(&rpc, &collector, owner, pool).await?;
        let checkpoints = self
            .fetch_checkpoints(&rpc, pool, processed..state.checkpoint_count)
            .await?;
        Ok(EntitlementInfo {
            pool,
            owner:            *owner,
            processed_count:  processed,
            checkpoint_count: state.checkpoint_count(),
            is_escrow:        holder.is_escrow,
            entitlement:      accumulated_entitlement(&checkpoints, processed, &holder)?,
        })
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn rpc(&self) -> RpcClient {
        RpcClient::new_with_commitment(self.rpc_url.clone(), CommitmentConfig::confirmed())
    }

    async fn sign_and_send(
        &self,
        rpc:          &RpcClient,
        instructions: &[Instruction],
        payer:        &Keypair,
    ) -> Result<Signature> {
        let blockhash = rpc.get_latest_blockhash().await?;
        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&payer.pubkey()),
            &[payer],
            blockhash,
        );
        Ok(rpc.send_and_confirm_transaction(&tx).await?)
    }

    fn claim_instructions(
        &self,
        owner:        &Pubkey,
        pool:         PoolKind,
        receiver:     &Pubkey,
        stake_weight: &Pubkey,
        plan:         &ClaimPlan,
    ) -> [Instruction; 2] {
        let claim = match pool {
            PoolKind::Native => {
                claim_native_ix(&self.program_id, owner, receiver, stake_weight, plan.batch())
            }
            PoolKind::Token(mint) => {
                claim_ix(&self.program_id, owner, &mint, receiver, stake_weight, plan.batch())
            }
        };
        [ComputeBudgetInstruction::set_compute_unit_limit(CLAIM_COMPUTE_UNITS), claim]
    }

    async fn fetch_collector(&self, rpc: &RpcClient) -> Result<CollectorState> {
        let (address, _) = derive_collector(&self.program_id);
        let data = rpc
            .get_account_data(&address)
            .await
            .map_err(|_| Error::CollectorNotFound(self.program_id))?;
        parse_collector(&data)
    }

    async fn fetch_pool(&self, rpc: &RpcClient, pool: PoolKind) -> Result<FeePoolState> {
        let (address, _) = derive_fee_pool(&pool.pool_id(), &self.program_id);
        let data = rpc
            .get_account_data(&address)
            .await
            .map_err(|_| Error::PoolNotFound(pool.pool_id()))?;
        parse_fee_pool(&data)
    }

    /// A pool that does not exist yet opens with page 0.
    async fn fetch_checkpoint_count(&self, rpc: &RpcClient, pool: PoolKind) -> Result<u64> {
        match self.fetch_pool(rpc, pool).await {
            Ok(state) => Ok(state.checkpoint_count),
            Err(Error::PoolNotFound(_)) => Ok(0),
            Err(e) => Err(e),
        }
    }

    /// Checkpoints `range` of a pool, read from the pages that hold them.
    async fn fetch_checkpoints(
        &self,
        rpc:   &RpcClient,
        pool:  PoolKind,
        range: Range<u64>,
    ) -> Result<Vec<CheckpointState>> {
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let pool_id = pool.pool_id();
        let pages: Vec<Pubkey> = (range.start / CHECKPOINTS_PER_PAGE..=(range.end - 1) / CHECKPOINTS_PER_PAGE)
            .map(|page| derive_checkpoint_page(&pool_id, page, &self.program_id).0)
            .collect();

        let mut checkpoints = Vec::with_capacity((range.end - range.start) as usize);
        for keys in pages.chunks(MAX_MULTIPLE_ACCOUNTS) {
            for account in rpc.get_multiple_accounts(keys).await? {
                let account = account.ok_or(Error::PoolNotFound(pool_id))?;
                let page = parse_checkpoint_page(&account.data)?;
                checkpoints.extend(
                    page.checkpoints.into_iter().filter(|cp| range.contains(&cp.index)),
                );
            }
        }
        Ok(checkpoints)
    }

    /// A cursor that does not exist yet means nothing has been claimed.
    async fn fetch_processed(&self, rpc: &RpcClient, owner: &Pubkey, pool: PoolKind) -> Result<u64> {
        let (fee_pool, _) = derive_fee_pool(&pool.pool_id(), &self.program_id);
        let (cursor, _) = derive_cursor(&fee_pool, owner, &self.program_id);
        match rpc.get_account_data(&cursor).await {
            Ok(data) => Ok(parse_cursor(&data)?.processed_count),
            Err(_) => Ok(0),
        }
    }

    /// A missing stake history reads as no stake.
    async fn fetch_stake_weights(
        &self,
        rpc:       &RpcClient,
        collector: &CollectorState,
        owner:     &Pubkey,
    ) -> Result<(Pubkey, StakeWeightsState)> {
        let (address, _) = derive_stake_weights(owner, &collector.weight_oracle);
        match rpc.get_account_data(&address).await {
            Ok(data) => Ok((address, parse_stake_weights(&data)?)),
            Err(_) => Ok((address, StakeWeightsState { owner: *owner, ..Default::default() })),
        }
    }

    async fn fetch_claim_state(
        &self,
        rpc:       &RpcClient,
        collector: &CollectorState,
        owner:     &Pubkey,
        pool:      PoolKind,
    ) -> Result<(FeePoolState, u64, StakeWeightsState, Pubkey)> {
        let state = self.fetch_pool(rpc, pool).await?;
        let processed = self.fetch_processed(rpc, owner, pool).await?;
        let (stake_weight, holder) = self.fetch_stake_weights(rpc, collector, owner).await?;
        Ok((state, processed, holder, stake_weight))
    }
}

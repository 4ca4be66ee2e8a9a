use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    instruction::{AccountMeta, Instruction},
    program::invoke_signed,
};
use anchor_spl::token::{Mint, Token, TokenAccount};
use crate::{
    constants::*,
    error::FeeSharingError,
    source::{check_source, withdraw_fees_data, SourceView},
    state::{CheckpointPage, Collector, FeePool},
};
use super::distribution::{enter, leave, open_page, settle_deposit};

/// Pull accrued fees from a whitelisted source into the pool for its fee mint.
///
/// Gates, in order: the source is an initialized account of the passed
/// program (`InvalidSource`), it is whitelisted (`InvalidConverter`), and it
/// names the collector as fees controller (`Unauthorized`). The received
/// amount is the vault balance delta; zero succeeds without touching the ledger.
pub fn handler(ctx: Context<DepositFromSource>) -> Result<()> {
    let collector_key = ctx.accounts.collector.key();
    let source_info = ctx.accounts.source.to_account_info();
    let program_info = ctx.accounts.source_program.to_account_info();

    let header = {
        let data = source_info.try_borrow_data()?;
        let view = SourceView::from_accounts(&source_info, &program_info, &data[..]);
        check_source(&view, &collector_key, &ctx.accounts.collector)?
    };
    require_keys_eq!(header.fee_mint, ctx.accounts.fee_mint.key(), FeeSharingError::MintMismatch);

    let mint = ctx.accounts.fee_mint.key();
    if !ctx.accounts.fee_pool.is_initialized() {
        let vault = ctx.accounts.pool_vault.key();
        ctx.accounts.fee_pool.init(mint, vault, ctx.bumps.fee_pool);
        msg!("Pool opened: {}", mint);
    }
    open_page(&mut ctx.accounts.checkpoint_page, &ctx.accounts.fee_pool, ctx.bumps.checkpoint_page);

    enter(&mut ctx.accounts.collector)?;

    let before = ctx.accounts.pool_vault.amount;
    let ix = Instruction {
        program_id: program_info.key(),
        accounts: vec![
            AccountMeta::new(source_info.key(), false),
            AccountMeta::new(ctx.accounts.source_fee_vault.key(), false),
            AccountMeta::new_readonly(ctx.accounts.source_authority.key(), false),
            AccountMeta::new(ctx.accounts.pool_vault.key(), false),
            AccountMeta::new_readonly(collector_key, true),
            AccountMeta::new_readonly(ctx.accounts.token_program.key(), false),
        ],
        data: withdraw_fees_data(),
    };
    let seeds: &[&[u8]] = &[COLLECTOR_SEED, &[ctx.accounts.collector.bump]];
    invoke_signed(
        &ix,
        &[
            source_info.clone(),
            ctx.accounts.source_fee_vault.to_account_info(),
            ctx.accounts.source_authority.to_account_info(),
            ctx.accounts.pool_vault.to_account_info(),
            ctx.accounts.collector.to_account_info(),
            ctx.accounts.token_program.to_account_info(),
            program_info.clone(),
        ],
        &[seeds],
    )?;

    ctx.accounts.pool_vault.reload()?;
    let received = ctx
        .accounts
        .pool_vault
        .amount
        .checked_sub(before)
        .ok_or(FeeSharingError::MathOverflow)?;

    emit!(SourceFeesWithdrawn {
        pool_id: mint,
        sender: ctx.accounts.caller.key(),
        source: source_info.key(),
        amount: received,
    });

    if received == 0 {
        msg!("Source {} had no fees", source_info.key());
    } else {
        settle_deposit(
            &ctx.accounts.collector,
            &ctx.accounts.total_weight,
            &mut ctx.accounts.fee_pool,
            &mut ctx.accounts.checkpoint_page,
            &ctx.accounts.caller,
            received,
        )?;
    }

    leave(&mut ctx.accounts.collector);
    Ok(())
}

#[derive(Accounts)]
pub struct DepositFromSource<'info> {
    #[account(mut)]
    pub caller: Signer<'info>,

    #[account(mut, seeds = [COLLECTOR_SEED], bump = collector.bump)]
    pub collector: Box<Account<'info, Collector>>,

    /// CHECK: ownership, whitelist and header are checked in the handler
    #[account(mut)]
    pub source: UncheckedAccount<'info>,

    /// CHECK: must be executable and own `source`; checked in the handler
    pub source_program: UncheckedAccount<'info>,

    /// CHECK: passed through to the source program
    #[account(mut)]
    pub source_fee_vault: UncheckedAccount<'info>,

    /// CHECK: passed through to the source program
    pub source_authority: UncheckedAccount<'info>,

    pub fee_mint: Box<Account<'info, Mint>>,

    #[account(
        init_if_needed,
        payer = caller,
        space = FeePool::LEN,
        seeds = [POOL_SEED, fee_mint.key().as_ref()],
        bump,
    )]
    pub fee_pool: Account<'info, FeePool>,

    #[account(
        init_if_needed,
        payer = caller,
        space = CheckpointPage::LEN,
        seeds = [CHECKPOINT_SEED, fee_mint.key().as_ref(), &fee_pool.open_page().to_le_bytes()],
        bump,
    )]
    pub checkpoint_page: Box<Account<'info, CheckpointPage>>,

    #[account(
        init_if_needed,
        payer = caller,
        seeds = [VAULT_SEED, fee_mint.key().as_ref()],
        bump,
        token::mint = fee_mint,
        token::authority = collector,
    )]
    pub pool_vault: Box<Account<'info, TokenAccount>>,

    /// CHECK: decoded as the total weight history; address pinned by the collector
    #[account(address = collector.total_weight_history @ FeeSharingError::InvalidOracleAccount)]
    pub total_weight: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[event]
pub struct SourceFeesWithdrawn {
    pub pool_id: Pubkey,
    pub sender: Pubkey,
    pub source: Pubkey,
    pub amount: u64,
}

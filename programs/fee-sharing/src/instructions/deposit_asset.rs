use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};
use crate::{constants::*, error::FeeSharingError, state::{CheckpointPage, Collector, FeePool}};
use super::distribution::{enter, leave, open_page, settle_deposit};

/// Deposit tokens of `mint` into its pool. The pool and its vault are
/// created on first use, as is each checkpoint page; the depositor pays
/// their rent.
pub fn handler(ctx: Context<DepositAsset>, amount: u64) -> Result<()> {
    require!(amount > 0, FeeSharingError::InvalidAmount);
    let mint = ctx.accounts.mint.key();
    require_keys_neq!(mint, NATIVE_POOL_ID, FeeSharingError::InvalidPool);

    if !ctx.accounts.fee_pool.is_initialized() {
        let vault = ctx.accounts.pool_vault.key();
        ctx.accounts.fee_pool.init(mint, vault, ctx.bumps.fee_pool);
        msg!("Pool opened: {}", mint);
    }
    open_page(&mut ctx.accounts.checkpoint_page, &ctx.accounts.fee_pool, ctx.bumps.checkpoint_page);

    enter(&mut ctx.accounts.collector)?;

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.depositor_token.to_account_info(),
                to: ctx.accounts.pool_vault.to_account_info(),
                authority: ctx.accounts.depositor.to_account_info(),
            },
        ),
        amount,
    )?;

    settle_deposit(
        &ctx.accounts.collector,
        &ctx.accounts.total_weight,
        &mut ctx.accounts.fee_pool,
        &mut ctx.accounts.checkpoint_page,
        &ctx.accounts.depositor,
        amount,
    )?;

    leave(&mut ctx.accounts.collector);
    Ok(())
}

#[derive(Accounts)]
pub struct DepositAsset<'info> {
    #[account(mut)]
    pub depositor: Signer<'info>,

    #[account(mut, seeds = [COLLECTOR_SEED], bump = collector.bump)]
    pub collector: Box<Account<'info, Collector>>,

    pub mint: Box<Account<'info, Mint>>,

    #[account(
        init_if_needed,
        payer = depositor,
        space = FeePool::LEN,
        seeds = [POOL_SEED, mint.key().as_ref()],
        bump,
    )]
    pub fee_pool: Account<'info, FeePool>,

    #[account(
        init_if_needed,
        payer = depositor,
        space = CheckpointPage::LEN,
        seeds = [CHECKPOINT_SEED, mint.key().as_ref(), &fee_pool.open_page().to_le_bytes()],
        bump,
    )]
    pub checkpoint_page: Box<Account<'info, CheckpointPage>>,

    #[account(
        init_if_needed,
        payer = depositor,
        seeds = [VAULT_SEED, mint.key().as_ref()],
        bump,
        token::mint = mint,
        token::authority = collector,
    )]
    pub pool_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = depositor_token.mint == mint.key() @ FeeSharingError::MintMismatch,
        constraint = depositor_token.owner == depositor.key(),
    )]
    pub depositor_token: Box<Account<'info, TokenAccount>>,

    /// CHECK: decoded as the total weight history; address pinned by the collector
    #[account(address = collector.total_weight_history @ FeeSharingError::InvalidOracleAccount)]
    pub total_weight: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

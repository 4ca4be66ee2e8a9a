use anchor_lang::prelude::*;
use crate::{
    constants::*,
    entitlement::ClaimProcessor,
    error::{FeeSharingError, LedgerResult},
    state::{ClaimCursor, Collector, FeePool},
};
use super::claim::{init_cursor, resolve_receiver, EntitlementClaimed};
use super::distribution::{borrow_pages, enter, holder_oracle, leave, page_views};

/// Native-pool variant of `claim`: the payout is lamports debited from the
/// pool account. Both sides must stay rent exempt afterwards.
///
/// Remaining accounts: the checkpoint pages covering the batch, in any order.
pub fn handler(ctx: Context<ClaimNative>, max_checkpoints: u32, receiver: Pubkey) -> Result<()> {
    require_keys_eq!(ctx.accounts.fee_pool.pool_id, NATIVE_POOL_ID, FeeSharingError::InvalidPool);

    let claimant = ctx.accounts.claimant.key();
    let receiver = resolve_receiver(receiver, claimant);
    require_keys_eq!(ctx.accounts.receiver.key(), receiver, FeeSharingError::InvalidReceiver);

    init_cursor(&mut ctx.accounts.cursor, claimant, ctx.accounts.fee_pool.key(), ctx.bumps.cursor);

    let oracle = holder_oracle(&ctx.accounts.collector, &ctx.accounts.stake_weight, &claimant)?;

    enter(&mut ctx.accounts.collector)?;

    let outcome = {
        let pages = borrow_pages(ctx.remaining_accounts)?;
        let log = page_views(&pages, &NATIVE_POOL_ID)?;
        ClaimProcessor::new(&oracle).claim(
            &claimant,
            &ctx.accounts.fee_pool,
            log.as_slice(),
            &mut ctx.accounts.cursor,
            max_checkpoints,
        )?
    };

    let rent = Rent::get()?;
    let pool_info = ctx.accounts.fee_pool.to_account_info();
    let receiver_info = ctx.accounts.receiver.to_account_info();
    let (pool_after, receiver_after) = native_payout(
        outcome.amount,
        LamportSide { lamports: pool_info.lamports(), min_balance: rent.minimum_balance(pool_info.data_len()) },
        LamportSide { lamports: receiver_info.lamports(), min_balance: rent.minimum_balance(receiver_info.data_len()) },
    )?;
    **pool_info.try_borrow_mut_lamports()? = pool_after;
    **receiver_info.try_borrow_mut_lamports()? = receiver_after;

    emit!(EntitlementClaimed {
        pool_id: NATIVE_POOL_ID,
        account: claimant,
        receiver,
        amount: outcome.amount,
        processed_count: outcome.processed_count,
    });
    msg!(
        "Claimed {} lamports through checkpoint {}/{}",
        outcome.amount,
        outcome.processed_count,
        ctx.accounts.fee_pool.checkpoint_count()
    );

    leave(&mut ctx.accounts.collector);
    Ok(())
}

/// Balance of one side of a lamport move and the rent-exempt floor it must keep.
#[derive(Debug, Clone, Copy)]
pub struct LamportSide {
    pub lamports: u64,
    pub min_balance: u64,
}

/// Balances after moving `amount` from the pool to the receiver. The pool
/// may not dip into its rent reserve and the receiver must end up rent
/// exempt, otherwise the runtime would reject the transaction anyway.
pub fn native_payout(amount: u64, pool: LamportSide, receiver: LamportSide) -> LedgerResult<(u64, u64)> {
    let pool_after = pool
        .lamports
        .checked_sub(amount)
        .filter(|left| *left >= pool.min_balance)
        .ok_or(FeeSharingError::InsufficientBalance)?;
    let receiver_after = receiver
        .lamports
        .checked_add(amount)
        .ok_or(FeeSharingError::MathOverflow)?;
    if receiver_after < receiver.min_balance {
        return Err(FeeSharingError::InvalidReceiver);
    }
    Ok((pool_after, receiver_after))
}

#[derive(Accounts)]
pub struct ClaimNative<'info> {
    #[account(mut)]
    pub claimant: Signer<'info>,

    #[account(mut, seeds = [COLLECTOR_SEED], bump = collector.bump)]
    pub collector: Box<Account<'info, Collector>>,

    #[account(
        mut,
        seeds = [POOL_SEED, NATIVE_POOL_ID.as_ref()],
        bump = fee_pool.bump,
    )]
    pub fee_pool: Account<'info, FeePool>,

    #[account(
        init_if_needed,
        payer = claimant,
        space = ClaimCursor::LEN,
        seeds = [CURSOR_SEED, fee_pool.key().as_ref(), claimant.key().as_ref()],
        bump,
    )]
    pub cursor: Box<Account<'info, ClaimCursor>>,

    /// CHECK: lamport destination; must equal the resolved receiver
    #[account(mut)]
    pub receiver: UncheckedAccount<'info>,

    /// CHECK: the claimant's stake weight PDA under the weight program; checked in the handler
    pub stake_weight: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

use anchor_lang::prelude::*;
use crate::{constants::*, error::FeeSharingError, state::Collector};

/// Admin: whitelist a fee source. Adding a listed source is a no-op.
pub fn add_handler(ctx: Context<ManageSources>, source: Pubkey) -> Result<()> {
    let collector = &mut ctx.accounts.collector;
    collector.lock()?;
    let added = collector.add_source(source)?;
    collector.unlock();

    if added {
        emit!(SourceAdded { admin: ctx.accounts.admin.key(), source });
        msg!("Source added: {} ({} listed)", source, ctx.accounts.collector.sources.len());
    } else {
        msg!("Source already listed: {}", source);
    }
    Ok(())
}

/// Admin: drop a fee source. Removing an unlisted source is a no-op.
pub fn remove_handler(ctx: Context<ManageSources>, source: Pubkey) -> Result<()> {
    let collector = &mut ctx.accounts.collector;
    collector.lock()?;
    let removed = collector.remove_source(&source);
    collector.unlock();

    if removed {
        emit!(SourceRemoved { admin: ctx.accounts.admin.key(), source });
        msg!("Source removed: {}", source);
    } else {
        msg!("Source not listed: {}", source);
    }
    Ok(())
}

#[derive(Accounts)]
pub struct ManageSources<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [COLLECTOR_SEED],
        bump = collector.bump,
        has_one = admin @ FeeSharingError::Unauthorized,
    )]
    pub collector: Box<Account<'info, Collector>>,
}

#[event]
pub struct SourceAdded {
    pub admin: Pubkey,
    pub source: Pubkey,
}

#[event]
pub struct SourceRemoved {
    pub admin: Pubkey,
    pub source: Pubkey,
}

//! Gatekeeping for fee sources (AMM converters) the collector pulls from.
//!
//! A source is an account owned by an executable program whose data starts
//! with an 8-byte discriminator followed by:
//!
//! ```text
//! fees_controller: Pubkey   // must be the collector
//! fee_mint:        Pubkey   // mint of the accrued fees
//! ```
//!
//! The source program must expose `withdraw_fees`, which moves the accrued
//! fees into the receiver token account when signed by the fees controller.

use anchor_lang::prelude::*;
use crate::{
    constants::WITHDRAW_FEES_DISCRIMINATOR,
    error::{FeeSharingError, LedgerResult},
    state::Collector,
};

pub const SOURCE_HEADER_LEN: usize = 8 + 32 + 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceHeader {
    pub fees_controller: Pubkey,
    pub fee_mint: Pubkey,
}

/// Facts about the source account the gates look at.
pub struct SourceView<'a> {
    pub key: Pubkey,
    pub owner: Pubkey,
    pub data: &'a [u8],
    pub program_id: Pubkey,
    pub program_executable: bool,
}

impl<'a> SourceView<'a> {
    pub fn from_accounts(source: &'a AccountInfo, program: &AccountInfo, data: &'a [u8]) -> Self {
        Self {
            key: *source.key,
            owner: *source.owner,
            data,
            program_id: *program.key,
            program_executable: program.executable,
        }
    }
}

fn read_pubkey(data: &[u8], offset: usize) -> Pubkey {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&data[offset..offset + 32]);
    Pubkey::new_from_array(bytes)
}

/// Applies the gates in order: recognized account, whitelisted, authorises the collector.
pub fn check_source(
    view: &SourceView,
    collector_key: &Pubkey,
    collector: &Collector,
) -> LedgerResult<SourceHeader> {
    if !view.program_executable
        || view.owner != view.program_id
        || view.data.len() < SOURCE_HEADER_LEN
    {
        return Err(FeeSharingError::InvalidSource);
    }
    if !collector.is_whitelisted(&view.key) {
        return Err(FeeSharingError::InvalidConverter);
    }
    let header = SourceHeader {
        fees_controller: read_pubkey(view.data, 8),
        fee_mint: read_pubkey(view.data, 40),
    };
    if header.fees_controller != *collector_key {
        return Err(FeeSharingError::Unauthorized);
    }
    Ok(header)
}

/// Instruction data for the source's `withdraw_fees`. It takes no arguments.
pub fn withdraw_fees_data() -> Vec<u8> {
    WITHDRAW_FEES_DISCRIMINATOR.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        collector_key: Pubkey,
        collector: Collector,
        source: Pubkey,
        program: Pubkey,
        mint: Pubkey,
    }

    fn fixture() -> Fixture {
        let source = Pubkey::new_unique();
        let mut collector = Collector {
            admin: Pubkey::new_unique(),
            weight_oracle: Pubkey::new_unique(),
            total_weight_history: Pubkey::new_unique(),
            wrapped_reserve: Pubkey::new_unique(),
            withdrawal_interval: 86_400,
            locked: false,
            bump: 255,
            sources: Vec::new(),
        };
        collector.add_source(source).unwrap();
        Fixture {
            collector_key: Pubkey::new_unique(),
            collector,
            source,
            program: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
        }
    }

    fn header_bytes(controller: &Pubkey, mint: &Pubkey) -> Vec<u8> {
        let mut data = vec![7u8; 8];
        data.extend_from_slice(controller.as_ref());
        data.extend_from_slice(mint.as_ref());
        data
    }

    fn view<'a>(f: &Fixture, data: &'a [u8]) -> SourceView<'a> {
        SourceView {
            key: f.source,
            owner: f.program,
            data,
            program_id: f.program,
            program_executable: true,
        }
    }

    #[test]
    fn accepts_authorised_whitelisted_source() {
        let f = fixture();
        let data = header_bytes(&f.collector_key, &f.mint);
        let header = check_source(&view(&f, &data), &f.collector_key, &f.collector).unwrap();
        assert_eq!(header, SourceHeader { fees_controller: f.collector_key, fee_mint: f.mint });
    }

    #[test]
    fn non_program_account_is_invalid_source() {
        let f = fixture();
        let data = header_bytes(&f.collector_key, &f.mint);

        let mut v = view(&f, &data);
        v.program_executable = false;
        assert!(matches!(check_source(&v, &f.collector_key, &f.collector), Err(FeeSharingError::InvalidSource)));

        let mut v = view(&f, &data);
        v.owner = Pubkey::new_unique();
        assert!(matches!(check_source(&v, &f.collector_key, &f.collector), Err(FeeSharingError::InvalidSource)));

        let v = view(&f, &[]);
        assert!(matches!(check_source(&v, &f.collector_key, &f.collector), Err(FeeSharingError::InvalidSource)));
    }

    #[test]
    fn gates_apply_in_order() {
        let f = fixture();
        // not whitelisted and not authorised: whitelist gate wins
        let data = header_bytes(&Pubkey::new_unique(), &f.mint);
        let mut v = view(&f, &data);
        v.key = Pubkey::new_unique();
        assert!(matches!(check_source(&v, &f.collector_key, &f.collector), Err(FeeSharingError::InvalidConverter)));

        let v = view(&f, &data);
        assert!(matches!(check_source(&v, &f.collector_key, &f.collector), Err(FeeSharingError::Unauthorized)));
    }

    #[test]
    fn withdraw_fees_discriminator() {
        use sha2::{Digest, Sha256};
        let digest = Sha256::digest(b"global:withdraw_fees");
        assert_eq!(withdraw_fees_data(), digest[..8].to_vec());
    }
}

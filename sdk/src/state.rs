//! On-chain account deserialization.
//!
//! Parses raw account bytes for `Collector`, `FeePool`, checkpoint pages,
//! `ClaimCursor` and the weight program's history accounts. Byte offsets mirror the Anchor
//! `#[account]` / borsh layouts exactly.

use solana_sdk::pubkey::Pubkey;
use crate::error::{Error, Result};

// ─── Collector ────────────────────────────────────────────────────────────────

/// Deserialized `Collector` account state.
///
/// Layout (after 8-byte Anchor discriminator):
/// ```text
/// admin(32)  weight_oracle(32)  total_weight_history(32)  wrapped_reserve(32)
/// withdrawal_interval(8)  locked(1)  bump(1)  sources: len(4) + 32 * n
/// ```
#[derive(Debug, Clone)]
pub struct CollectorState {
    pub admin:                Pubkey,
    /// Program owning the stake weight history accounts.
    pub weight_oracle:        Pubkey,
    pub total_weight_history: Pubkey,
    pub wrapped_reserve:      Pubkey,
    pub withdrawal_interval:  i64,
    pub locked:               bool,
    pub sources:              Vec<Pubkey>,
}

pub fn parse_collector(data: &[u8]) -> Result<CollectorState> {
    let n = read_u32(data, 146)? as usize;
    let sources = (0..n)
        .map(|i| read_pubkey(data, 150 + 32 * i))
        .collect::<Result<Vec<_>>>()?;
    Ok(CollectorState {
        admin:                read_pubkey(data, 8)?,
        weight_oracle:        read_pubkey(data, 40)?,
        total_weight_history: read_pubkey(data, 72)?,
        wrapped_reserve:      read_pubkey(data, 104)?,
        withdrawal_interval:  read_i64(data, 136)?,
        locked:               read_bool(data, 144)?,
        sources,
    })
}

// ─── FeePool ──────────────────────────────────────────────────────────────────

/// Deserialized `FeePool` account state.
///
/// Layout (after 8-byte Anchor discriminator):
/// ```text
/// pool_id(32)  vault(32)  pending_amount(8)  last_seal_ts(8)  checkpoint_count(8)  bump(1)
/// ```
#[derive(Debug, Clone)]
pub struct FeePoolState {
    /// Mint, or `NATIVE_POOL_ID`.
    pub pool_id:          Pubkey,
    pub vault:            Pubkey,
    pub pending_amount:   u64,
    pub last_seal_ts:     i64,
    pub checkpoint_count: u64,
}

impl FeePoolState {
    pub fn checkpoint_count(&self) -> u64 {
        self.checkpoint_count
    }
}

pub fn parse_fee_pool(data: &[u8]) -> Result<FeePoolState> {
    Ok(FeePoolState {
        pool_id:          read_pubkey(data, 8)?,
        vault:            read_pubkey(data, 40)?,
        pending_amount:   read_u64(data, 72)?,
        last_seal_ts:     read_i64(data, 80)?,
        checkpoint_count: read_u64(data, 88)?,
    })
}

// ─── CheckpointPage ───────────────────────────────────────────────────────────

/// One sealed checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointState {
    pub index:                u64,
    pub slot:                 u64,
    pub timestamp:            i64,
    pub total_weighted_stake: u128,
    pub amount:               u64,
}

pub const CHECKPOINT_SIZE: usize = 48;

/// Checkpoints held by one page account; page `p` holds indices
/// `[p * CHECKPOINTS_PER_PAGE, (p + 1) * CHECKPOINTS_PER_PAGE)`.
pub const CHECKPOINTS_PER_PAGE: u64 = 64;

/// Deserialized `CheckpointPage` account state.
///
/// Layout (after 8-byte Anchor discriminator):
/// ```text
/// pool_id(32)  page(8)  bump(1)  checkpoints: len(4) + 48 * n
///   index(8) slot(8) timestamp(8) total_weighted_stake(16) amount(8)
/// ```
#[derive(Debug, Clone)]
pub struct CheckpointPageState {
    pub pool_id:     Pubkey,
    pub page:        u64,
    pub checkpoints: Vec<CheckpointState>,
}

pub fn parse_checkpoint_page(data: &[u8]) -> Result<CheckpointPageState> {
    let n = read_u32(data, 49)? as usize;
    if n as u64 > CHECKPOINTS_PER_PAGE {
        return Err(Error::ParseError {
            offset: 49,
            reason: format!("page claims {n} checkpoints; holds at most {CHECKPOINTS_PER_PAGE}"),
        });
    }
    let checkpoints = (0..n)
        .map(|i| {
            let base = 53 + CHECKPOINT_SIZE * i;
            Ok(CheckpointState {
                index:                read_u64(data, base)?,
                slot:                 read_u64(data, base + 8)?,
                timestamp:            read_i64(data, base + 16)?,
                total_weighted_stake: read_u128(data, base + 24)?,
                amount:               read_u64(data, base + 40)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(CheckpointPageState {
        pool_id: read_pubkey(data, 8)?,
        page:    read_u64(data, 40)?,
        checkpoints,
    })
}

// ─── ClaimCursor ──────────────────────────────────────────────────────────────

/// Layout: `owner(32) pool(32) processed_count(8) bump(1)` = 81 bytes.
#[derive(Debug, Clone)]
pub struct CursorState {
    pub owner:           Pubkey,
    pub pool:            Pubkey,
    pub processed_count: u64,
}

pub fn parse_cursor(data: &[u8]) -> Result<CursorState> {
    const EXPECTED: usize = 81;
    if data.len() < EXPECTED {
        return Err(Error::ParseError {
            offset: 0,
            reason: format!("ClaimCursor account is {} bytes; expected {}", data.len(), EXPECTED),
        });
    }
    Ok(CursorState {
        owner:           read_pubkey(data, 8)?,
        pool:            read_pubkey(data, 40)?,
        processed_count: read_u64(data, 72)?,
    })
}

// ─── Weight program histories ─────────────────────────────────────────────────

/// Per-account stake weight history.
///
/// Layout: `owner(32) is_escrow(1) points: len(4) + (slot(8) weighted_stake(16)) * n`
#[derive(Debug, Clone, Default)]
pub struct StakeWeightsState {
    pub owner:     Pubkey,
    pub is_escrow: bool,
    /// `(slot, weighted_stake)`, sorted by slot.
    pub points:    Vec<(u64, u128)>,
}

pub fn parse_stake_weights(data: &[u8]) -> Result<StakeWeightsState> {
    let n = read_u32(data, 41)? as usize;
    let points = (0..n)
        .map(|i| {
            let base = 45 + 24 * i;
            Ok((read_u64(data, base)?, read_u128(data, base + 8)?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(StakeWeightsState {
        owner:     read_pubkey(data, 8)?,
        is_escrow: read_bool(data, 40)?,
        points,
    })
}

// ─── SPL token account ────────────────────────────────────────────────────────

/// Read the `amount` field from a packed SPL token account.
///
/// Token account layout: `mint(32) owner(32) amount(8) …`
pub fn parse_token_amount(data: &[u8]) -> Result<u64> {
    if data.len() < 72 {
        return Err(Error::ParseError {
            offset: 64,
            reason: format!("Token account is {} bytes; need at least 72", data.len()),
        });
    }
    read_u64(data, 64)
}

// ─── Byte-slice primitives ────────────────────────────────────────────────────

fn slice<const N: usize>(data: &[u8], offset: usize, what: &str) -> Result<[u8; N]> {
    data.get(offset..offset + N)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| Error::ParseError {
            offset,
            reason: format!("slice too short for {what} ({N} bytes)"),
        })
}

pub(crate) fn read_pubkey(data: &[u8], offset: usize) -> Result<Pubkey> {
    Ok(Pubkey::from(slice::<32>(data, offset, "Pubkey")?))
}

pub(crate) fn read_bool(data: &[u8], offset: usize) -> Result<bool> {
    Ok(slice::<1>(data, offset, "bool")?[0] != 0)
}

pub(crate) fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    Ok(u32::from_le_bytes(slice(data, offset, "u32")?))
}

pub(crate) fn read_u64(data: &[u8], offset: usize) -> Result<u64> {
    Ok(u64::from_le_bytes(slice(data, offset, "u64")?))
}

pub(crate) fn read_i64(data: &[u8], offset: usize) -> Result<i64> {
    Ok(i64::from_le_bytes(slice(data, offset, "i64")?))
}

pub(crate) fn read_u128(data: &[u8], offset: usize) -> Result<u128> {
    Ok(u128::from_le_bytes(slice(data, offset, "u128")?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fee_pool_bytes(pool_id: &Pubkey, pending: u64, count: u64) -> Vec<u8> {
        let mut d = vec![0u8; 8];
        d.extend_from_slice(pool_id.as_ref());
        d.extend_from_slice(Pubkey::new_unique().as_ref());
        d.extend_from_slice(&pending.to_le_bytes());
        d.extend_from_slice(&1_700_000_000i64.to_le_bytes());
        d.extend_from_slice(&count.to_le_bytes());
        d.push(254);
        d
    }

    fn page_bytes(pool_id: &Pubkey, page: u64, checkpoints: &[(u64, u128, u64)]) -> Vec<u8> {
        let mut d = vec![0u8; 8];
        d.extend_from_slice(pool_id.as_ref());
        d.extend_from_slice(&page.to_le_bytes());
        d.push(253);
        d.extend_from_slice(&(checkpoints.len() as u32).to_le_bytes());
        for (i, (slot, total, amount)) in checkpoints.iter().enumerate() {
            let index = page * CHECKPOINTS_PER_PAGE + i as u64;
            d.extend_from_slice(&index.to_le_bytes());
            d.extend_from_slice(&slot.to_le_bytes());
            d.extend_from_slice(&(*slot as i64).to_le_bytes());
            d.extend_from_slice(&total.to_le_bytes());
            d.extend_from_slice(&amount.to_le_bytes());
        }
        d
    }

    #[test]
    fn parses_fee_pool_head() {
        let id = Pubkey::new_unique();
        let data = fee_pool_bytes(&id, 42, 130);
        assert_eq!(data.len(), 97);

        let pool = parse_fee_pool(&data).unwrap();
        assert_eq!(pool.pool_id, id);
        assert_eq!(pool.pending_amount, 42);
        assert_eq!(pool.last_seal_ts, 1_700_000_000);
        assert_eq!(pool.checkpoint_count(), 130);
    }

    #[test]
    fn parses_checkpoint_page() {
        let id = Pubkey::new_unique();
        let data = page_bytes(&id, 2, &[(10, 1_000, 500), (20, u128::MAX, 7)]);
        assert_eq!(data.len(), 53 + 2 * CHECKPOINT_SIZE);

        let page = parse_checkpoint_page(&data).unwrap();
        assert_eq!((page.pool_id, page.page), (id, 2));
        assert_eq!(page.checkpoints[1], CheckpointState {
            index: 2 * CHECKPOINTS_PER_PAGE + 1,
            slot: 20,
            timestamp: 20,
            total_weighted_stake: u128::MAX,
            amount: 7,
        });
    }

    #[test]
    fn truncated_page_is_a_parse_error() {
        let data = page_bytes(&Pubkey::new_unique(), 0, &[(1, 1, 1)]);
        let err = parse_checkpoint_page(&data[..data.len() - 1]).unwrap_err();
        assert!(matches!(err, Error::ParseError { .. }));
        assert!(parse_fee_pool(&fee_pool_bytes(&Pubkey::new_unique(), 0, 1)[..90]).is_err());
    }

    #[test]
    fn parses_collector_sources() {
        let admin = Pubkey::new_unique();
        let source = Pubkey::new_unique();
        let mut d = vec![0u8; 8];
        d.extend_from_slice(admin.as_ref());
        for _ in 0..3 {
            d.extend_from_slice(Pubkey::new_unique().as_ref());
        }
        d.extend_from_slice(&86_400i64.to_le_bytes());
        d.push(0);
        d.push(255);
        d.extend_from_slice(&1u32.to_le_bytes());
        d.extend_from_slice(source.as_ref());

        let c = parse_collector(&d).unwrap();
        assert_eq!(c.admin, admin);
        assert_eq!(c.withdrawal_interval, 86_400);
        assert!(!c.locked);
        assert_eq!(c.sources, vec![source]);
    }

    #[test]
    fn parses_cursor_and_rejects_short_data() {
        let owner = Pubkey::new_unique();
        let mut d = vec![0u8; 8];
        d.extend_from_slice(owner.as_ref());
        d.extend_from_slice(Pubkey::new_unique().as_ref());
        d.extend_from_slice(&9u64.to_le_bytes());
        d.push(1);
        let c = parse_cursor(&d).unwrap();
        assert_eq!((c.owner, c.processed_count), (owner, 9));
        assert!(parse_cursor(&d[..80]).is_err());
    }

    #[test]
    fn parses_stake_weights() {
        let owner = Pubkey::new_unique();
        let mut d = vec![0u8; 8];
        d.extend_from_slice(owner.as_ref());
        d.push(1);
        d.extend_from_slice(&2u32.to_le_bytes());
        for (slot, w) in [(5u64, 10u128), (9, 30)] {
            d.extend_from_slice(&slot.to_le_bytes());
            d.extend_from_slice(&w.to_le_bytes());
        }
        let s = parse_stake_weights(&d).unwrap();
        assert_eq!(s.owner, owner);
        assert!(s.is_escrow);
        assert_eq!(s.points, vec![(5, 10), (9, 30)]);
    }
}

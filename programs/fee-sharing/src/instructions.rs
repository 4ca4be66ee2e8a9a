#![allow(ambiguous_glob_reexports)]

pub mod distribution;
pub mod initialize_collector;
pub mod deposit_asset;
pub mod deposit_native;
pub mod deposit_from_source;
pub mod seal_pending;
pub mod claim;
pub mod claim_native;
pub mod quote_entitlement;
pub mod manage_sources;
pub mod sweep_reserve;

pub use distribution::*;
pub use initialize_collector::*;
pub use deposit_asset::*;
pub use deposit_native::*;
pub use deposit_from_source::*;
pub use seal_pending::*;
pub use claim::*;
pub use claim_native::*;
pub use quote_entitlement::*;
pub use manage_sources::*;
pub use sweep_reserve::*;

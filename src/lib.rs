pub mod bets;
pub mod error;
pub mod handicap;
pub mod model;
pub mod settle;
pub mod storage;

/// Bounded retries for the fetch/settle/apply loop when the snapshot
/// goes stale between settlement and persistence.
pub const SETTLE_MAX_RETRIES: usize = 3;

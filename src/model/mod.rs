pub mod bet;
pub mod ledger;
pub mod types;

pub use bet::*;
pub use ledger::*;
pub use types::*;

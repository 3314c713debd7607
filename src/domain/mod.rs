pub mod entities;
pub mod errors;
pub mod ledger;
pub mod ports;

// Re-export the domain boundary types and ports.
pub use entities::{Deposit, NewDeposit, NewPlayer, Player, RecordId, Session, User};
pub use errors::{BackendError, LedgerError};
pub use ports::{AuthProvider, Clock, DepositStore, PlayerStore};

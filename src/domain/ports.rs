use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{Deposit, NewDeposit, NewPlayer, Player, RecordId, Session};
use crate::domain::errors::BackendError;

// Port for the auth collaborator. `Ok(None)` means the token carries no session.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, BackendError>;
    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;
}

// Port for the players table, queried on behalf of one signed-in user.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    async fn select_players(&self, access_token: &str) -> Result<Vec<Player>, BackendError>;
    async fn insert_player(&self, access_token: &str, player: NewPlayer)
    -> Result<(), BackendError>;
    async fn update_balance(
        &self,
        access_token: &str,
        player_id: &RecordId,
        balance: f64,
    ) -> Result<(), BackendError>;
}

// Port for the deposits table. Selection is newest first.
#[async_trait]
pub trait DepositStore: Send + Sync {
    async fn select_deposits(&self, access_token: &str) -> Result<Vec<Deposit>, BackendError>;
    async fn insert_deposit(
        &self,
        access_token: &str,
        deposit: NewDeposit,
    ) -> Result<(), BackendError>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::entities::RecordId;
use crate::domain::ledger::{BalanceDrift, HistoryRow};
use crate::use_cases::{CreditReceipt, DashboardView};

// Request payload for adding a player.
#[derive(Debug, Deserialize)]
pub struct AddPlayerRequest {
    pub name: String,
}

// Request payload for crediting chips. The amount is kept as the raw form text;
// a JSON number is accepted and treated as its text form.
#[derive(Debug, Deserialize)]
pub struct CreditRequest {
    pub player_id: String,
    #[serde(deserialize_with = "amount_text")]
    pub amount: String,
}

fn amount_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawAmount::deserialize(deserializer)? {
        RawAmount::Text(text) => text,
        RawAmount::Number(number) => number.to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlayerView {
    pub id: RecordId,
    pub name: String,
    pub balance: f64,
}

// Rendered dashboard: players, newest-first history and balance drift.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user: UserView,
    pub players: Vec<PlayerView>,
    pub history: Vec<HistoryRow>,
    pub drift: Vec<BalanceDrift>,
}

impl From<&DashboardView> for DashboardResponse {
    fn from(view: &DashboardView) -> Self {
        Self {
            user: UserView {
                id: view.user.id.clone(),
                email: view.user.email.clone(),
            },
            players: view
                .players
                .iter()
                .map(|player| PlayerView {
                    id: player.id.clone(),
                    name: player.name.clone(),
                    balance: player.balance_or_zero(),
                })
                .collect(),
            history: view.history_rows(),
            drift: view.drift(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreditView {
    pub player_id: RecordId,
    pub amount: f64,
    pub new_balance: f64,
}

impl From<CreditReceipt> for CreditView {
    fn from(receipt: CreditReceipt) -> Self {
        Self {
            player_id: receipt.player_id,
            amount: receipt.amount,
            new_balance: receipt.new_balance,
        }
    }
}

// Response payload for a successful credit.
#[derive(Debug, Serialize)]
pub struct CreditResponse {
    pub credit: CreditView,
    pub dashboard: DashboardResponse,
}

// Simple error envelope for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

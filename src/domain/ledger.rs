// Pure ledger rules shared by the use cases and the dashboard rendering.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::entities::{Deposit, Player, RecordId};
use crate::domain::errors::LedgerError;

// Method tag written on every deposit created from the dashboard.
pub const MANUAL_METHOD: &str = "Manual";

// Name shown for history rows whose player is not in the loaded list.
pub const UNKNOWN_PLAYER: &str = "Unknown";

// Stored balances and deposit sums closer than this are treated as equal.
const DRIFT_TOLERANCE: f64 = 1e-6;

pub fn parse_amount(text: &str) -> Result<f64, LedgerError> {
    let amount: f64 = text
        .trim()
        .parse()
        .map_err(|_| LedgerError::InvalidAmount)?;
    if !amount.is_finite() {
        return Err(LedgerError::InvalidAmount);
    }
    Ok(amount)
}

pub fn find_player<'a>(players: &'a [Player], id: &RecordId) -> Result<&'a Player, LedgerError> {
    players
        .iter()
        .find(|player| &player.id == id)
        .ok_or(LedgerError::PlayerNotFound)
}

pub fn credited_balance(player: &Player, amount: f64) -> f64 {
    player.balance_or_zero() + amount
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct HistoryRow {
    pub id: RecordId,
    pub player_id: RecordId,
    pub player_name: String,
    pub amount: Option<f64>,
    pub method: String,
    pub created_by: Option<String>,
    pub timestamp: DateTime<Utc>,
}

// Resolve player names for the history log, keeping the history order.
pub fn history_rows(history: &[Deposit], players: &[Player]) -> Vec<HistoryRow> {
    let names: HashMap<&RecordId, &str> = players
        .iter()
        .map(|player| (&player.id, player.name.as_str()))
        .collect();

    history
        .iter()
        .map(|deposit| HistoryRow {
            id: deposit.id.clone(),
            player_id: deposit.player_id.clone(),
            player_name: names
                .get(&deposit.player_id)
                .copied()
                .unwrap_or(UNKNOWN_PLAYER)
                .to_string(),
            amount: deposit.amount,
            method: deposit.method.clone(),
            created_by: deposit.created_by.clone(),
            timestamp: deposit.timestamp,
        })
        .collect()
}

// A player whose stored balance disagrees with the sum of their deposits.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct BalanceDrift {
    pub player_id: RecordId,
    pub player_name: String,
    pub stored_balance: f64,
    pub deposit_total: f64,
}

pub fn balance_drift(players: &[Player], history: &[Deposit]) -> Vec<BalanceDrift> {
    let mut totals: HashMap<&RecordId, f64> = HashMap::new();
    for deposit in history {
        *totals.entry(&deposit.player_id).or_insert(0.0) += deposit.amount.unwrap_or(0.0);
    }

    players
        .iter()
        .filter_map(|player| {
            let deposit_total = totals.get(&player.id).copied().unwrap_or(0.0);
            let stored_balance = player.balance_or_zero();
            ((stored_balance - deposit_total).abs() > DRIFT_TOLERANCE).then(|| BalanceDrift {
                player_id: player.id.clone(),
                player_name: player.name.clone(),
                stored_balance,
                deposit_total,
            })
        })
        .collect()
}

use crate::domain::entities::{NewDeposit, RecordId};
use crate::domain::errors::LedgerError;
use crate::domain::ledger::{self, MANUAL_METHOD};
use crate::domain::ports::{Clock, DepositStore, PlayerStore};
use crate::use_cases::dashboard::{DashboardView, invalidate};

// Credit applied by a successful `credit` call.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditReceipt {
    pub player_id: RecordId,
    pub amount: f64,
    pub new_balance: f64,
}

// Deposit recorder use case with injected dependencies.
pub struct DepositRecorder<P, D, C> {
    pub players: P,
    pub deposits: D,
    pub clock: C,
}

impl<P, D, C> DepositRecorder<P, D, C>
where
    P: PlayerStore,
    D: DepositStore,
    C: Clock,
{
    pub async fn load_deposits(&self, view: &mut DashboardView) -> bool {
        let result = self.deposits.select_deposits(view.access_token()).await;
        view.apply_history(result)
    }

    // Record a deposit, then write the new balance computed from the view's
    // loaded snapshot. The two writes are independent: a concurrent credit from
    // another view can be overwritten (lost update).
    pub async fn credit(
        &self,
        view: &mut DashboardView,
        target_player_id: &str,
        amount_text: &str,
    ) -> Result<CreditReceipt, LedgerError> {
        if target_player_id.is_empty() || amount_text.is_empty() {
            return Err(LedgerError::IncompleteCredit);
        }
        let amount = ledger::parse_amount(amount_text)?;
        let player_id = RecordId::new(target_player_id);
        let new_balance = ledger::credited_balance(
            ledger::find_player(&view.players, &player_id)?,
            amount,
        );

        let deposit = NewDeposit {
            player_id: player_id.clone(),
            amount,
            method: MANUAL_METHOD.to_string(),
            created_by: view.user.identity().to_string(),
            timestamp: self.clock.now(),
        };
        self.deposits
            .insert_deposit(view.access_token(), deposit)
            .await
            .map_err(LedgerError::Backend)?;

        if let Err(err) = self
            .players
            .update_balance(view.access_token(), &player_id, new_balance)
            .await
        {
            tracing::error!(
                player_id = %player_id,
                amount,
                error = %err,
                "deposit recorded but balance update failed"
            );
            return Err(LedgerError::BalanceNotUpdated(err));
        }

        tracing::info!(player_id = %player_id, amount, new_balance, "chips credited");
        view.record_balance(&player_id, new_balance);
        invalidate(view, &self.players, &self.deposits).await;

        Ok(CreditReceipt {
            player_id,
            amount,
            new_balance,
        })
    }
}

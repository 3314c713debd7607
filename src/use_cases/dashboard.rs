use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::domain::entities::{Deposit, Player, RecordId, Session, User};
use crate::domain::errors::BackendError;
use crate::domain::ledger::{self, BalanceDrift, HistoryRow};
use crate::domain::ports::{DepositStore, PlayerStore};

// In-memory state of one signed-in dashboard: who is acting and the last
// loaded snapshot of both tables.
#[derive(Clone, Debug)]
pub struct DashboardView {
    pub user: User,
    access_token: String,
    pub players: Vec<Player>,
    pub history: Vec<Deposit>,
}

impl DashboardView {
    pub fn new(session: Session) -> Self {
        Self {
            user: session.user,
            access_token: session.access_token,
            players: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    // Replace the player list wholesale, or keep the previous one on error.
    pub fn apply_players(&mut self, result: Result<Vec<Player>, BackendError>) -> bool {
        match result {
            Ok(players) => {
                self.players = players;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load players; keeping previous list");
                false
            }
        }
    }

    // Replace the deposit history wholesale, or keep the previous one on error.
    pub fn apply_history(&mut self, result: Result<Vec<Deposit>, BackendError>) -> bool {
        match result {
            Ok(history) => {
                self.history = history;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load deposits; keeping previous history");
                false
            }
        }
    }

    // Write a balance the store has accepted into the snapshot, so the next
    // credit starts from it even if the reload that follows fails.
    pub fn record_balance(&mut self, player_id: &RecordId, balance: f64) {
        if let Some(player) = self.players.iter_mut().find(|p| &p.id == player_id) {
            player.balance = Some(balance);
        }
    }

    pub fn history_rows(&self) -> Vec<HistoryRow> {
        ledger::history_rows(&self.history, &self.players)
    }

    pub fn drift(&self) -> Vec<BalanceDrift> {
        ledger::balance_drift(&self.players, &self.history)
    }
}

pub async fn reload_players<P>(view: &mut DashboardView, players: &P) -> bool
where
    P: PlayerStore + ?Sized,
{
    let result = players.select_players(view.access_token()).await;
    view.apply_players(result)
}

// Drop both cached lists and re-read them from the store. The two reads are
// independent and run concurrently.
pub async fn invalidate<P, D>(view: &mut DashboardView, players: &P, deposits: &D)
where
    P: PlayerStore + ?Sized,
    D: DepositStore + ?Sized,
{
    let token = view.access_token().to_string();
    let (loaded_players, loaded_history) = tokio::join!(
        players.select_players(&token),
        deposits.select_deposits(&token)
    );
    view.apply_players(loaded_players);
    view.apply_history(loaded_history);
}

pub type ViewHandle = Arc<Mutex<DashboardView>>;

// Views left untouched this long are dropped on the next `open`.
pub const DEFAULT_VIEW_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

struct OpenView {
    handle: ViewHandle,
    last_used: Instant,
}

// Open dashboard views keyed by access token.
#[derive(Clone)]
pub struct ViewRegistry {
    views: Arc<Mutex<HashMap<String, OpenView>>>,
    idle_timeout: Duration,
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_VIEW_IDLE_TIMEOUT)
    }
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            views: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    // Activate the view for a session. A new view is always loaded; an existing
    // one is reloaded only when `reload` is set, otherwise its snapshot is reused.
    pub async fn open<P, D>(
        &self,
        session: Session,
        players: &P,
        deposits: &D,
        reload: bool,
    ) -> ViewHandle
    where
        P: PlayerStore + ?Sized,
        D: DepositStore + ?Sized,
    {
        let existing = {
            let mut views = self.views.lock().await;
            let evicted = evict_idle(&mut views, &session.access_token, self.idle_timeout);
            if evicted > 0 {
                tracing::debug!(evicted, "dropped idle dashboard views");
            }
            views.get_mut(&session.access_token).map(|open| {
                open.last_used = Instant::now();
                open.handle.clone()
            })
        };

        if let Some(handle) = existing {
            if reload {
                let mut view = handle.lock().await;
                view.user = session.user;
                invalidate(&mut view, players, deposits).await;
            }
            return handle;
        }

        let token = session.access_token.clone();
        let mut view = DashboardView::new(session);
        invalidate(&mut view, players, deposits).await;

        let mut views = self.views.lock().await;
        let open = views.entry(token).or_insert_with(|| OpenView {
            handle: Arc::new(Mutex::new(view)),
            last_used: Instant::now(),
        });
        open.last_used = Instant::now();
        open.handle.clone()
    }

    pub async fn discard(&self, access_token: &str) -> bool {
        let mut views = self.views.lock().await;
        views.remove(access_token).is_some()
    }

    pub async fn open_count(&self) -> usize {
        self.views.lock().await.len()
    }
}

fn evict_idle(
    views: &mut HashMap<String, OpenView>,
    keep: &str,
    idle_timeout: Duration,
) -> usize {
    let before = views.len();
    views.retain(|token, open| token == keep || open.last_used.elapsed() < idle_timeout);
    before - views.len()
}

use crate::domain::entities::NewPlayer;
use crate::domain::errors::LedgerError;
use crate::domain::ports::PlayerStore;
use crate::use_cases::dashboard::{DashboardView, reload_players};

// Player directory use case with injected dependencies.
pub struct PlayerDirectory<P> {
    pub store: P,
}

impl<P> PlayerDirectory<P>
where
    P: PlayerStore,
{
    pub async fn load_players(&self, view: &mut DashboardView) -> bool {
        reload_players(view, &self.store).await
    }

    pub async fn add_player(&self, view: &mut DashboardView, name: &str) -> Result<(), LedgerError> {
        if name.trim().is_empty() {
            return Err(LedgerError::MissingName);
        }

        self.store
            .insert_player(
                view.access_token(),
                NewPlayer {
                    name: name.to_string(),
                },
            )
            .await
            .map_err(LedgerError::Backend)?;

        tracing::info!(name, "player added");
        self.load_players(view).await;
        Ok(())
    }
}

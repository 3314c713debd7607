use crate::domain::entities::Session;
use crate::domain::errors::LedgerError;
use crate::domain::ports::AuthProvider;
use crate::use_cases::dashboard::ViewRegistry;

// Result of checking a request for a signed-in session.
#[derive(Debug)]
pub enum GateOutcome {
    RedirectToLogin,
    Admitted(Session),
}

// Session gate use case with injected dependencies.
pub struct SessionGateUseCase<A> {
    pub auth: A,
    pub views: ViewRegistry,
}

impl<A> SessionGateUseCase<A>
where
    A: AuthProvider,
{
    pub async fn execute(&self, access_token: Option<&str>) -> Result<GateOutcome, LedgerError> {
        let Some(token) = access_token.filter(|token| !token.is_empty()) else {
            return Ok(GateOutcome::RedirectToLogin);
        };

        let session = self
            .auth
            .get_session(token)
            .await
            .map_err(LedgerError::SessionUnavailable)?;

        match session {
            Some(session) => Ok(GateOutcome::Admitted(session)),
            None => {
                // The token no longer maps to a session; its view can never be used again.
                if self.views.discard(token).await {
                    tracing::debug!("discarded view of an expired session");
                }
                Ok(GateOutcome::RedirectToLogin)
            }
        }
    }
}

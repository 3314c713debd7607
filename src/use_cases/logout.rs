use crate::domain::errors::LedgerError;
use crate::domain::ports::AuthProvider;
use crate::use_cases::dashboard::ViewRegistry;

// Response returned by the logout use case.
pub struct LogoutResponse {
    pub view_discarded: bool,
}

// Logout use case with injected dependencies.
pub struct LogoutUseCase<A> {
    pub auth: A,
    pub views: ViewRegistry,
}

impl<A> LogoutUseCase<A>
where
    A: AuthProvider,
{
    // The view is dropped even when sign-out fails; the caller still navigates
    // to the login view.
    pub async fn execute(&self, access_token: &str) -> Result<LogoutResponse, LedgerError> {
        let view_discarded = self.views.discard(access_token).await;

        self.auth
            .sign_out(access_token)
            .await
            .map_err(LedgerError::Backend)?;

        Ok(LogoutResponse { view_discarded })
    }
}

use crate::domain::{LedgerError, Session};
use crate::interface_adapters::protocol::{
    AddPlayerRequest, CreditRequest, CreditResponse, DashboardResponse, ErrorResponse,
};
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::use_cases::{
    DepositRecorder, GateOutcome, LogoutUseCase, PlayerDirectory, SessionGateUseCase,
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Redirect, Response},
};

type ApiError = (StatusCode, Json<ErrorResponse>);

// Handler for activating the dashboard view.
#[tracing::instrument(name = "dashboard", skip_all)]
pub async fn dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let Some(session) = admit(&state, &headers).await? else {
        return Ok(redirect_to_login(&state));
    };

    let handle = state
        .views
        .open(session, &state.backend, &state.backend, true)
        .await;
    let view = handle.lock().await;

    Ok(Json(DashboardResponse::from(&*view)).into_response())
}

// Handler for adding a player to the directory.
#[tracing::instrument(name = "add_player", skip_all)]
pub async fn add_player(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AddPlayerRequest>,
) -> Result<Response, ApiError> {
    let Some(session) = admit(&state, &headers).await? else {
        return Ok(redirect_to_login(&state));
    };

    let handle = state
        .views
        .open(session, &state.backend, &state.backend, false)
        .await;
    let mut view = handle.lock().await;

    let directory = PlayerDirectory {
        store: state.backend.clone(),
    };
    directory
        .add_player(&mut view, &body.name)
        .await
        .map_err(map_ledger_error)?;

    Ok((StatusCode::CREATED, Json(DashboardResponse::from(&*view))).into_response())
}

// Handler for crediting chips to a player.
#[tracing::instrument(
    name = "credit",
    skip_all,
    fields(player_id = %body.player_id)
)]
pub async fn credit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreditRequest>,
) -> Result<Response, ApiError> {
    let Some(session) = admit(&state, &headers).await? else {
        return Ok(redirect_to_login(&state));
    };

    // Mutations reuse the view's loaded snapshot rather than reloading first.
    let handle = state
        .views
        .open(session, &state.backend, &state.backend, false)
        .await;
    let mut view = handle.lock().await;

    let recorder = DepositRecorder {
        players: state.backend.clone(),
        deposits: state.backend.clone(),
        clock: SystemClock,
    };
    let receipt = recorder
        .credit(&mut view, &body.player_id, &body.amount)
        .await
        .map_err(map_ledger_error)?;

    Ok((
        StatusCode::CREATED,
        Json(CreditResponse {
            credit: receipt.into(),
            dashboard: DashboardResponse::from(&*view),
        }),
    )
        .into_response())
}

// Handler for signing out; always ends on the login view.
#[tracing::instrument(name = "logout", skip_all)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = bearer_token(&headers) {
        let use_case = LogoutUseCase {
            auth: state.backend.clone(),
            views: state.views.clone(),
        };
        if let Err(err) = use_case.execute(token).await {
            tracing::warn!(error = %err, "sign-out failed; view discarded anyway");
        }
    }

    redirect_to_login(&state)
}

async fn admit(state: &AppState, headers: &HeaderMap) -> Result<Option<Session>, ApiError> {
    let gate = SessionGateUseCase {
        auth: state.backend.clone(),
        views: state.views.clone(),
    };
    match gate
        .execute(bearer_token(headers))
        .await
        .map_err(map_ledger_error)?
    {
        GateOutcome::Admitted(session) => Ok(Some(session)),
        GateOutcome::RedirectToLogin => Ok(None),
    }
}

// The auth scheme name is case-insensitive (RFC 9110).
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|token| !token.is_empty())
}

fn redirect_to_login(state: &AppState) -> Response {
    Redirect::to(&state.login_path).into_response()
}

// Helper to build a JSON error response.
fn error_response(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            message: message.to_string(),
        }),
    )
}

fn map_ledger_error(err: LedgerError) -> ApiError {
    match err {
        LedgerError::MissingName => error_response(StatusCode::BAD_REQUEST, "name is required"),
        LedgerError::IncompleteCredit => {
            error_response(StatusCode::BAD_REQUEST, "player_id and amount are required")
        }
        LedgerError::InvalidAmount => {
            error_response(StatusCode::BAD_REQUEST, "amount must be a number")
        }
        LedgerError::PlayerNotFound => error_response(StatusCode::NOT_FOUND, "player not found"),
        LedgerError::SessionUnavailable(err) => {
            tracing::error!(error = %err, "failed to fetch session");
            error_response(StatusCode::BAD_GATEWAY, "session unavailable")
        }
        LedgerError::Backend(err) => {
            tracing::error!(error = %err, "backend request failed");
            error_response(StatusCode::BAD_GATEWAY, "backend error")
        }
        LedgerError::BalanceNotUpdated(_) => error_response(
            StatusCode::BAD_GATEWAY,
            "deposit recorded but balance update failed",
        ),
    }
}

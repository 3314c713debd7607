use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::ports::Clock;
use crate::interface_adapters::clients::SupabaseClient;
use crate::use_cases::ViewRegistry;

// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    // Backend client injected at startup; cheap to clone per request.
    pub backend: SupabaseClient,
    // Open dashboard views keyed by access token.
    pub views: ViewRegistry,
    // Where unauthenticated requests are sent.
    pub login_path: Arc<str>,
}

// System clock adapter used by the deposit recorder.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

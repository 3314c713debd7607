pub mod dashboard;
pub mod deposit_recorder;
pub mod logout;
pub mod player_directory;
pub mod session_gate;


pub use dashboard::{DashboardView, ViewHandle, ViewRegistry};
pub use deposit_recorder::{CreditReceipt, DepositRecorder};
pub use logout::LogoutUseCase;
pub use player_directory::PlayerDirectory;
pub use session_gate::{GateOutcome, SessionGateUseCase};

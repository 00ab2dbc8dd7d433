pub mod auth_service;
pub mod session_service;
pub mod sport_service;
pub mod status_sweeper;

pub use auth_service::AuthService;
pub use session_service::{SessionDetail, SessionService};
pub use sport_service::SportService;
pub use status_sweeper::StatusSweeper;

pub mod session_member_repository;
pub mod session_repository;
pub mod sport_repository;
pub mod team_repository;
pub mod user_repository;

// Re-export all repositories for convenient access
pub use session_member_repository::SessionMemberRepository;
pub use session_repository::SessionRepository;
pub use sport_repository::SportRepository;
pub use team_repository::TeamRepository;
pub use user_repository::UserRepository;

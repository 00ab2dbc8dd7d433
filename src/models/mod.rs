//! Domain models for the Sportly backend.
//!
//! This module contains all database-backed models representing
//! the core entities of the pickup-sports platform.

pub mod session;
pub mod session_member;
pub mod sport;
pub mod team;
pub mod user;

// Re-export all models for convenient access
pub use session::{SessionStatus, SessionSummary, SportSession};
pub use session_member::{MemberProfile, SessionMember};
pub use sport::Sport;
pub use team::Team;
pub use user::{User, UserProfile};

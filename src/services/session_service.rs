use crate::error::{option_to_result, AppError, AppResult};
use crate::lifecycle;
use crate::models::{
    MemberProfile, SessionStatus, SessionSummary, Sport, SportSession, Team, UserProfile,
};
use crate::repositories::{
    SessionMemberRepository, SessionRepository, SportRepository, TeamRepository, UserRepository,
};
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Teams created alongside every session
const TEAM_NAMES: [&str; 2] = ["A", "B"];

/// Service for session creation, membership, and lifecycle transitions
pub struct SessionService {
    session_repo: Arc<SessionRepository>,
    sport_repo: Arc<SportRepository>,
    team_repo: Arc<TeamRepository>,
    member_repo: Arc<SessionMemberRepository>,
    user_repo: Arc<UserRepository>,
}

/// A session with everything the lobby screen shows
#[derive(Debug)]
pub struct SessionDetail {
    pub session: SportSession,
    pub sport: Sport,
    pub host: UserProfile,
    pub teams: Vec<Team>,
    pub members: Vec<MemberProfile>,
}

impl SessionService {
    pub fn new(
        session_repo: Arc<SessionRepository>,
        sport_repo: Arc<SportRepository>,
        team_repo: Arc<TeamRepository>,
        member_repo: Arc<SessionMemberRepository>,
        user_repo: Arc<UserRepository>,
    ) -> Self {
        Self {
            session_repo,
            sport_repo,
            team_repo,
            member_repo,
            user_repo,
        }
    }

    /// Create a new session with its two teams; the host joins automatically
    #[allow(clippy::too_many_arguments)]
    pub async fn create_session(
        &self,
        host_id: Uuid,
        sport_id: Uuid,
        title: &str,
        description: Option<&str>,
        location: &str,
        date_time: NaiveDateTime,
        duration_minutes: i32,
        max_players: i32,
    ) -> AppResult<SessionDetail> {
        info!(
            "Creating session: sport={}, host={}, title={}",
            sport_id, host_id, title
        );

        option_to_result(self.sport_repo.find_by_id(sport_id).await?, "Sport not found")?;

        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Session title is required".into()));
        }
        let location = location.trim();
        if location.is_empty() {
            return Err(AppError::Validation("Session location is required".into()));
        }
        let description = description.map(str::trim).filter(|d| !d.is_empty());

        let now = chrono::Utc::now().naive_utc();
        if date_time <= now {
            return Err(AppError::Validation(
                "Session start time must be in the future".into(),
            ));
        }
        if duration_minutes <= 0 {
            return Err(AppError::Validation(
                "Session duration must be positive".into(),
            ));
        }
        if max_players < 2 {
            return Err(AppError::Validation(
                "Session needs room for at least 2 players".into(),
            ));
        }

        let session = self
            .session_repo
            .create(
                sport_id,
                host_id,
                title,
                description,
                location,
                date_time,
                duration_minutes,
                max_players,
            )
            .await?;

        for name in TEAM_NAMES {
            self.team_repo.create(session.id, name).await?;
        }

        // Host is the first participant
        self.member_repo
            .add_member(session.id, host_id, None)
            .await?;

        info!("Created session {} ({})", session.title, session.id);
        self.get_session(session.id).await
    }

    /// Fetch a session with sport, host, teams, and member profiles
    pub async fn get_session(&self, session_id: Uuid) -> AppResult<SessionDetail> {
        let session = option_to_result(
            self.session_repo.find_by_id(session_id).await?,
            "Session not found",
        )?;

        let sport = option_to_result(
            self.sport_repo.find_by_id(session.sport_id).await?,
            "Sport not found",
        )?;

        let host = option_to_result(
            self.user_repo.find_by_id(session.host_id).await?,
            "Host not found",
        )?
        .profile();

        let teams = self.team_repo.find_by_session(session_id).await?;
        let members = self.member_repo.find_profiles_by_session(session_id).await?;

        Ok(SessionDetail {
            session,
            sport,
            host,
            teams,
            members,
        })
    }

    /// List sessions, optionally filtered by sport and status
    pub async fn list_sessions(
        &self,
        sport_id: Option<Uuid>,
        status: Option<SessionStatus>,
    ) -> AppResult<Vec<SessionSummary>> {
        Ok(self.session_repo.list(sport_id, status).await?)
    }

    /// Join a session, optionally straight onto a team
    pub async fn join_session(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        team_id: Option<Uuid>,
    ) -> AppResult<SessionDetail> {
        let now = chrono::Utc::now().naive_utc();
        self.member_repo
            .join_session(session_id, user_id, team_id, now)
            .await?;

        info!("User {} joined session {}", user_id, session_id);
        self.get_session(session_id).await
    }

    /// Leave a session while its roster is still open
    pub async fn leave_session(&self, session_id: Uuid, user_id: Uuid) -> AppResult<SessionDetail> {
        let now = chrono::Utc::now().naive_utc();
        self.member_repo
            .leave_session(session_id, user_id, now)
            .await?;

        info!("User {} left session {}", user_id, session_id);
        self.get_session(session_id).await
    }

    /// Assign or switch the user's team
    pub async fn set_team(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        team_id: Uuid,
    ) -> AppResult<SessionDetail> {
        let now = chrono::Utc::now().naive_utc();
        self.member_repo
            .set_team(session_id, user_id, team_id, now)
            .await?;

        info!(
            "User {} moved to team {} in session {}",
            user_id, team_id, session_id
        );
        self.get_session(session_id).await
    }

    /// Apply a requested status transition.
    ///
    /// Time-driven transitions (start, terminate) are validated against the
    /// server clock, so a client with a skewed clock cannot move a session
    /// early. Cancel and complete are host-only. The update itself is guarded
    /// on the current status, so concurrent requests cannot double-apply.
    pub async fn update_status(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        requested: SessionStatus,
    ) -> AppResult<SportSession> {
        let session = option_to_result(
            self.session_repo.find_by_id(session_id).await?,
            "Session not found",
        )?;

        let current = session.status_enum();
        if !current.can_transition(requested) {
            return Err(AppError::BusinessLogic(format!(
                "Cannot transition from {} to {}",
                current.as_str(),
                requested.as_str()
            )));
        }

        let now = chrono::Utc::now().naive_utc();
        match requested {
            SessionStatus::InProgress => {
                let check = lifecycle::determine_session_status(
                    current,
                    session.date_time,
                    session.duration_minutes,
                    now,
                );
                if !check.should_start {
                    return Err(AppError::Validation(
                        "Session has not reached its start time".into(),
                    ));
                }
            }
            SessionStatus::Terminated => {
                let check = lifecycle::determine_session_status(
                    current,
                    session.date_time,
                    session.duration_minutes,
                    now,
                );
                if !check.should_end {
                    return Err(AppError::Validation(
                        "Session has not reached its end time".into(),
                    ));
                }
            }
            SessionStatus::Cancelled => {
                if session.host_id != user_id {
                    return Err(AppError::Unauthorized(
                        "Only the host can cancel a session".into(),
                    ));
                }
            }
            SessionStatus::Completed => {
                if session.host_id != user_id {
                    return Err(AppError::Unauthorized(
                        "Only the host can mark a session completed".into(),
                    ));
                }
            }
            // No transition leads back to upcoming
            SessionStatus::Upcoming => {}
        }

        let updated = self
            .session_repo
            .transition_status(session_id, current, requested)
            .await?
            .ok_or_else(|| {
                AppError::BusinessLogic("Session status changed concurrently, retry".into())
            })?;

        info!(
            "Session {} moved {} -> {}",
            session_id,
            current.as_str(),
            requested.as_str()
        );
        Ok(updated)
    }
}

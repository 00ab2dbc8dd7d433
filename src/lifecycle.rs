//! Wall-clock session-status derivation.
//!
//! Sessions move along upcoming -> in_progress -> terminated as time passes.
//! Everything here is a pure function of the session's `(status, date_time,
//! duration_minutes)` triple and a caller-supplied `now`, so the same logic
//! serves request handlers, the background sweeper, and unit tests without
//! touching a clock or the database.

use chrono::{Duration, NaiveDateTime};

use crate::models::SessionStatus;

/// Result of checking a session against the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCheck {
    /// Session is upcoming and its start time has been reached
    pub should_start: bool,
    /// Session is in progress and its end time has been reached
    pub should_end: bool,
}

/// Time window details for a session that is currently running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSessionInfo {
    pub started_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub elapsed_minutes: i64,
    pub remaining_minutes: i64,
}

/// End of the session's time window: start plus duration in minutes
pub fn session_end(date_time: NaiveDateTime, duration_minutes: i32) -> NaiveDateTime {
    date_time + Duration::minutes(duration_minutes as i64)
}

/// Decide whether a session is due for a time-driven transition.
///
/// # Arguments
/// * `status` - Current lifecycle status
/// * `date_time` - Scheduled start time (UTC)
/// * `duration_minutes` - Planned length of the session
/// * `now` - The clock reading to compare against
///
/// # Returns
/// A `StatusCheck` where `should_start` is set for an upcoming session at or
/// past its start time, and `should_end` for a running session at or past
/// `date_time + duration`. Both comparisons are inclusive. At most one flag
/// is set, since they require different current statuses.
pub fn determine_session_status(
    status: SessionStatus,
    date_time: NaiveDateTime,
    duration_minutes: i32,
    now: NaiveDateTime,
) -> StatusCheck {
    let ends_at = session_end(date_time, duration_minutes);

    StatusCheck {
        should_start: status == SessionStatus::Upcoming && now >= date_time,
        should_end: status == SessionStatus::InProgress && now >= ends_at,
    }
}

/// True while a session is upcoming and strictly before its start time
pub fn is_session_upcoming(
    status: SessionStatus,
    date_time: NaiveDateTime,
    now: NaiveDateTime,
) -> bool {
    status == SessionStatus::Upcoming && now < date_time
}

/// Whether team rosters are locked for editing.
///
/// Rosters stay open only while the session is upcoming and has not reached
/// its start time. Once the start time passes (or the session leaves the
/// upcoming state for any reason) membership and team assignments are frozen.
pub fn is_team_locked(
    status: SessionStatus,
    date_time: NaiveDateTime,
    now: NaiveDateTime,
) -> bool {
    !is_session_upcoming(status, date_time, now)
}

/// Time-window details for a session inside its active window.
///
/// Returns `Some` only when the session has not reached a terminal status and
/// `now` falls within `[date_time, date_time + duration)`. An upcoming session
/// past its start time still yields info, since the status record may simply
/// lag the clock until the next transition is applied.
pub fn get_active_session_info(
    status: SessionStatus,
    date_time: NaiveDateTime,
    duration_minutes: i32,
    now: NaiveDateTime,
) -> Option<ActiveSessionInfo> {
    if status.is_terminal() {
        return None;
    }

    let ends_at = session_end(date_time, duration_minutes);
    if now < date_time || now >= ends_at {
        return None;
    }

    Some(ActiveSessionInfo {
        started_at: date_time,
        ends_at,
        elapsed_minutes: (now - date_time).num_minutes(),
        remaining_minutes: (ends_at - now).num_minutes(),
    })
}

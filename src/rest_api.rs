//! REST API surface for the Sportly backend.
//!
//! Request DTOs, the bearer-token extractor, handlers, and the router live
//! here. Handlers stay thin: parse, call the service, shape the response.
//! Errors render through `AppError: IntoResponse` as `{ "error", "details" }`.

use crate::error::{AppError, AppResult};
use crate::models::{SessionStatus, SessionSummary, Sport, UserProfile};
use crate::services::SessionDetail;
use crate::{auth, AppState};
use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        request::Parts,
        Method, StatusCode,
    },
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
pub struct CreateSportRequest {
    pub name: String,
    pub players_per_team: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub sport_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    /// Scheduled start, UTC
    pub date_time: NaiveDateTime,
    pub duration_minutes: i32,
    pub max_players: i32,
}

#[derive(Debug, Deserialize)]
pub struct SessionsQuery {
    pub sport_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub team_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SetTeamRequest {
    pub team_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct MemberView {
    pub user_id: Uuid,
    pub username: String,
    pub joined_at: NaiveDateTime,
}

#[derive(Debug, Serialize)]
pub struct TeamView {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<MemberView>,
}

/// Session detail as the lobby screen consumes it: teams with their rosters,
/// plus members who joined but have not picked a team yet
#[derive(Debug, Serialize)]
pub struct SessionDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub date_time: NaiveDateTime,
    pub duration_minutes: i32,
    pub max_players: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub sport: Sport,
    pub host: UserProfile,
    pub teams: Vec<TeamView>,
    pub unassigned: Vec<MemberView>,
    pub participant_count: i64,
}

impl SessionDetailResponse {
    fn from_detail(detail: SessionDetail) -> Self {
        let SessionDetail {
            session,
            sport,
            host,
            teams,
            members,
        } = detail;

        let mut team_views: Vec<TeamView> = teams
            .into_iter()
            .map(|t| TeamView {
                id: t.id,
                name: t.name,
                members: Vec::new(),
            })
            .collect();
        let mut unassigned = Vec::new();
        let participant_count = members.len() as i64;

        for member in members {
            let view = MemberView {
                user_id: member.user_id,
                username: member.username,
                joined_at: member.joined_at,
            };
            match member
                .team_id
                .and_then(|id| team_views.iter_mut().find(|t| t.id == id))
            {
                Some(team) => team.members.push(view),
                None => unassigned.push(view),
            }
        }

        Self {
            id: session.id,
            title: session.title,
            description: session.description,
            location: session.location,
            date_time: session.date_time,
            duration_minutes: session.duration_minutes,
            max_players: session.max_players,
            status: session.status,
            created_at: session.created_at,
            sport,
            host,
            teams: team_views,
            unassigned,
            participant_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Authentication extractor
// ---------------------------------------------------------------------------

/// The user behind a verified bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Expected bearer token".into()))?;

        let claims = auth::verify_token(token, &state.auth_config)?;

        Ok(AuthUser {
            user_id: claims.user_id()?,
            email: claims.email,
        })
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "sportly-backend" }))
}

async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> AppResult<impl IntoResponse> {
    let (user, token) = state
        .auth_service
        .signup(&req.email, &req.username, &req.password)
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (user, token) = state.auth_service.login(&req.email, &req.password).await?;

    Ok(Json(AuthResponse { token, user }))
}

async fn me(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<UserProfile>> {
    let profile = state.auth_service.me(auth_user.user_id).await?;

    Ok(Json(profile))
}

async fn list_sports(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Sport>>> {
    let sports = state.sport_service.list_sports().await?;

    Ok(Json(sports))
}

async fn create_sport(
    _auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSportRequest>,
) -> AppResult<impl IntoResponse> {
    let sport = state
        .sport_service
        .create_sport(&req.name, req.players_per_team)
        .await?;

    Ok((StatusCode::CREATED, Json(sport)))
}

async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionsQuery>,
) -> AppResult<Json<Vec<SessionSummary>>> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let sessions = state
        .session_service
        .list_sessions(query.sport_id, status)
        .await?;

    Ok(Json(sessions))
}

async fn create_session(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> AppResult<impl IntoResponse> {
    let detail = state
        .session_service
        .create_session(
            auth_user.user_id,
            req.sport_id,
            &req.title,
            req.description.as_deref(),
            &req.location,
            req.date_time,
            req.duration_minutes,
            req.max_players,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionDetailResponse::from_detail(detail)),
    ))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<SessionDetailResponse>> {
    let detail = state.session_service.get_session(session_id).await?;

    Ok(Json(SessionDetailResponse::from_detail(detail)))
}

async fn join_session(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    body: Option<Json<JoinRequest>>,
) -> AppResult<Json<SessionDetailResponse>> {
    let team_id = body.and_then(|Json(req)| req.team_id);
    let detail = state
        .session_service
        .join_session(session_id, auth_user.user_id, team_id)
        .await?;

    Ok(Json(SessionDetailResponse::from_detail(detail)))
}

async fn set_team(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SetTeamRequest>,
) -> AppResult<Json<SessionDetailResponse>> {
    let detail = state
        .session_service
        .set_team(session_id, auth_user.user_id, req.team_id)
        .await?;

    Ok(Json(SessionDetailResponse::from_detail(detail)))
}

async fn leave_session(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<SessionDetailResponse>> {
    let detail = state
        .session_service
        .leave_session(session_id, auth_user.user_id)
        .await?;

    Ok(Json(SessionDetailResponse::from_detail(detail)))
}

async fn update_status(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<Json<crate::models::SportSession>> {
    let requested = parse_status(&req.status)?;
    let session = state
        .session_service
        .update_status(session_id, auth_user.user_id, requested)
        .await?;

    Ok(Json(session))
}

fn parse_status(s: &str) -> AppResult<SessionStatus> {
    SessionStatus::from_str(s).map_err(AppError::Validation)
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the application router with CORS for the mobile client
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .route("/health", get(health))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/sports", get(list_sports).post(create_sport))
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/join", post(join_session))
        .route("/api/sessions/:id/team", post(set_team))
        .route("/api/sessions/:id/leave", delete(leave_session))
        .route("/api/sessions/:id/status", patch(update_status))
        .layer(cors)
        .with_state(state)
}

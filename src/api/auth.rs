use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState};
use crate::models::user::{Role, User};
use crate::search::Visibility;

const SESSION_USER_KEY: &str = "user";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub role: Role,
    pub api_key: String,
}

#[derive(Serialize)]
pub struct UserInfoResponse {
    pub username: String,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct ApiKeyResponse {
    pub api_key: String,
}

/// The identity behind a request, if any.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    pub user: Option<User>,
}

impl Caller {
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role.is_privileged())
    }

    #[must_use]
    pub fn visibility(&self) -> Visibility {
        if self.is_privileged() {
            Visibility::Privileged
        } else {
            Visibility::Public
        }
    }
}

/// Resolves the caller from:
/// 1. Session cookie (from login)
/// 2. `X-Api-Key` header
/// 3. `Authorization: Bearer <api_key>` header
///
/// Lookup failures are logged and treated as anonymous.
pub async fn resolve_caller(state: &AppState, session: &Session, headers: &HeaderMap) -> Caller {
    if let Ok(Some(username)) = session.get::<String>(SESSION_USER_KEY).await {
        match state.store().get_user_by_username(&username).await {
            Ok(Some(user)) => return Caller { user: Some(user) },
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to load session user {username}: {e:#}"),
        }
    }

    if let Some(key) = extract_api_key(headers) {
        match state.store().verify_api_key(&key).await {
            Ok(Some(user)) => return Caller { user: Some(user) },
            Ok(None) => {}
            Err(e) => tracing::warn!("API key lookup failed: {e:#}"),
        }
    }

    Caller::default()
}

// ============================================================================
// Middleware
// ============================================================================

/// Lets a request through only for admins and editors.
pub async fn require_privileged(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let caller = resolve_caller(&state, &session, &headers).await;

    match &caller.user {
        Some(user) if user.role.is_privileged() => {
            tracing::Span::current().record("user_id", user.username.as_str());
            Ok(next.run(request).await)
        }
        Some(_) => Err(ApiError::Forbidden("Insufficient role".to_string())),
        None => Ok((StatusCode::UNAUTHORIZED, "Unauthorized").into_response()),
    }
}

/// Extract API key from headers
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
/// Authenticate with username and password, returns API key on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let is_valid = state
        .store()
        .verify_user_password(&payload.username, &payload.password)
        .await
        .map_err(|e| ApiError::internal(format!("Authentication error: {e}")))?;

    if !is_valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let user = state
        .store()
        .get_user_by_username(&payload.username)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to get user: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    if let Err(e) = session.insert(SESSION_USER_KEY, &user.username).await {
        return Err(ApiError::internal(format!("Failed to create session: {e}")));
    }

    tracing::info!("User logged in: {}", user.username);

    Ok(Json(ApiResponse::success(LoginResponse {
        username: user.username,
        role: user.role,
        api_key: user.api_key,
    })))
}

/// POST /auth/logout
/// Invalidate the current session
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
) -> Result<Json<ApiResponse<UserInfoResponse>>, ApiError> {
    let user = resolve_caller(&state, &session, &headers)
        .await
        .user
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    Ok(Json(ApiResponse::success(UserInfoResponse {
        username: user.username,
        role: user.role,
        created_at: user.created_at,
        updated_at: user.updated_at,
    })))
}

/// POST /auth/api-key/regenerate
pub async fn regenerate_api_key(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
) -> Result<Json<ApiResponse<ApiKeyResponse>>, ApiError> {
    let user = resolve_caller(&state, &session, &headers)
        .await
        .user
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    let api_key = state
        .store()
        .regenerate_user_api_key(&user.username)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to regenerate API key: {e}")))?;

    tracing::info!("API key regenerated for user: {}", user.username);

    Ok(Json(ApiResponse::success(ApiKeyResponse { api_key })))
}

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    announcements::{
        dto::{AnnounceRequest, TodayAnnouncement},
        repo::{Announcement, Role},
    },
    auth::{extractors::AuthUser, repo::User},
    error::ApiError,
    state::AppState,
};

pub fn announcement_routes() -> Router<AppState> {
    Router::new()
        .route("/announce", post(announce))
        .route("/announcements/today", get(list_today))
}

/// "Today" is always the UTC calendar day, truncated at the boundary. The
/// DATE column never carries a time component, so day comparisons stay
/// exact across midnight rollover.
fn today_utc() -> time::Date {
    OffsetDateTime::now_utc().date()
}

#[instrument(skip(state, claims, payload))]
pub async fn announce(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<AnnounceRequest>,
) -> Result<String, ApiError> {
    // The token outlives the user record's guarantees; re-resolve.
    let user = match User::find_by_username(&state.db, &claims.sub).await? {
        Some(u) => u,
        None => {
            warn!(username = %claims.sub, "token subject no longer exists");
            return Err(ApiError::NotFound("User not found.".into()));
        }
    };

    let role = Role::parse(&payload.role).ok_or_else(|| {
        warn!(role = %payload.role, "invalid role");
        ApiError::Validation("Invalid role. Must be 'driver' or 'passenger'.".into())
    })?;

    let today = today_utc();
    if Announcement::find_for_user_on_date(&state.db, user.id, today)
        .await?
        .is_some()
    {
        warn!(user_id = user.id, "duplicate daily announcement");
        return Err(ApiError::Conflict(
            "You have already made an announcement today.".into(),
        ));
    }

    let announcement = Announcement::create(
        &state.db,
        user.id,
        role,
        today,
        payload.latitude,
        payload.longitude,
    )
    .await?;

    info!(
        user_id = user.id,
        announcement_id = announcement.id,
        role = role.as_str(),
        "announcement created"
    );
    Ok(format!("User announced as {} for today.", role.as_str()))
}

#[instrument(skip(state, _claims))]
pub async fn list_today(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
) -> Result<Json<Vec<TodayAnnouncement>>, ApiError> {
    let items = Announcement::list_for_date(&state.db, today_utc()).await?;
    if items.is_empty() {
        return Err(ApiError::NotFound("No announcements for today.".into()));
    }
    Ok(Json(items))
}

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use sqlx::SqliteConnection;
use tracing::{info, instrument, warn};

use super::{
    dto::{CreateFavoriteRequest, FavoriteDetails},
    repo_types::Favorite,
};
use crate::{
    auth::CurrentUser,
    db,
    error::{AppError, AppResult},
    extract::{AppJson, AppPath},
    songs::Song,
    state::AppState,
    users::{dto::UserRead, User},
};

pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/favorites", get(list_favorites).post(create_favorite))
        .route("/favorites/:id", get(get_favorite).delete(delete_favorite))
}

/// Convenience routes nested under the owning user.
pub fn user_favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/users/:id/favorites", get(list_user_favorite_songs))
        .route(
            "/users/:id/favorites/:song_id",
            post(mark_user_favorite).delete(unmark_user_favorite),
        )
}

fn user_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("User with id {id} not found"))
}

fn song_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Song with id {id} not found"))
}

/// Existence checks for both sides, then the pair-uniqueness check.
async fn mark(conn: &mut SqliteConnection, user_id: i64, song_id: i64) -> AppResult<Favorite> {
    if User::find_by_id(&mut *conn, user_id).await?.is_none() {
        return Err(user_not_found(user_id));
    }
    if Song::find_by_id(&mut *conn, song_id).await?.is_none() {
        return Err(song_not_found(song_id));
    }
    if Favorite::find_pair(&mut *conn, user_id, song_id).await?.is_some() {
        warn!(user_id, song_id, "song already marked as favorite");
        return Err(AppError::Conflict(
            "This song is already marked as favorite for this user".into(),
        ));
    }
    Ok(Favorite::create(&mut *conn, user_id, song_id).await?)
}

/// Admins see every favorite, everyone else only their own.
#[instrument(skip(state, actor))]
pub async fn list_favorites(
    State(state): State<AppState>,
    actor: CurrentUser,
) -> AppResult<AppJson<Vec<Favorite>>> {
    let favorites = if actor.0.is_admin() {
        Favorite::list(&state.db).await?
    } else {
        Favorite::list_by_user(&state.db, actor.0.id).await?
    };
    Ok(AppJson(favorites))
}

#[instrument(skip(state, actor, payload))]
pub async fn create_favorite(
    State(state): State<AppState>,
    actor: CurrentUser,
    AppJson(payload): AppJson<CreateFavoriteRequest>,
) -> AppResult<(StatusCode, AppJson<Favorite>)> {
    actor.require_self_or_admin(payload.user_id)?;

    let mut tx = db::begin_write(&state.db).await?;
    let favorite = mark(&mut tx, payload.user_id, payload.song_id).await?;
    tx.commit().await?;

    info!(favorite_id = favorite.id, user_id = favorite.user_id, song_id = favorite.song_id, "favorite created");
    Ok((StatusCode::CREATED, AppJson(favorite)))
}

#[instrument(skip(state, actor))]
pub async fn get_favorite(
    State(state): State<AppState>,
    actor: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<AppJson<FavoriteDetails>> {
    let favorite = Favorite::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Favorite with id {id} not found")))?;
    actor.require_self_or_admin(favorite.user_id)?;

    let user = User::find_by_id(&state.db, favorite.user_id)
        .await?
        .ok_or_else(|| user_not_found(favorite.user_id))?;
    let song = Song::find_by_id(&state.db, favorite.song_id)
        .await?
        .ok_or_else(|| song_not_found(favorite.song_id))?;

    Ok(AppJson(FavoriteDetails {
        id: favorite.id,
        marked_at: favorite.marked_at,
        user: UserRead::from(user),
        song,
    }))
}

#[instrument(skip(state, actor))]
pub async fn delete_favorite(
    State(state): State<AppState>,
    actor: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    let mut tx = db::begin_write(&state.db).await?;
    let favorite = Favorite::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Favorite with id {id} not found")))?;
    actor.require_self_or_admin(favorite.user_id)?;
    Favorite::delete(&mut *tx, id).await?;
    tx.commit().await?;

    info!(favorite_id = id, by = actor.0.id, "favorite deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, actor))]
pub async fn list_user_favorite_songs(
    State(state): State<AppState>,
    actor: CurrentUser,
    AppPath(user_id): AppPath<i64>,
) -> AppResult<AppJson<Vec<Song>>> {
    actor.require_self_or_admin(user_id)?;
    if User::find_by_id(&state.db, user_id).await?.is_none() {
        return Err(user_not_found(user_id));
    }
    Ok(AppJson(Favorite::songs_for_user(&state.db, user_id).await?))
}

#[instrument(skip(state, actor))]
pub async fn mark_user_favorite(
    State(state): State<AppState>,
    actor: CurrentUser,
    AppPath((user_id, song_id)): AppPath<(i64, i64)>,
) -> AppResult<(StatusCode, AppJson<Favorite>)> {
    actor.require_self_or_admin(user_id)?;

    let mut tx = db::begin_write(&state.db).await?;
    let favorite = mark(&mut tx, user_id, song_id).await?;
    tx.commit().await?;

    info!(favorite_id = favorite.id, user_id, song_id, "favorite created");
    Ok((StatusCode::CREATED, AppJson(favorite)))
}

#[instrument(skip(state, actor))]
pub async fn unmark_user_favorite(
    State(state): State<AppState>,
    actor: CurrentUser,
    AppPath((user_id, song_id)): AppPath<(i64, i64)>,
) -> AppResult<StatusCode> {
    actor.require_self_or_admin(user_id)?;

    let mut tx = db::begin_write(&state.db).await?;
    let favorite = Favorite::find_pair(&mut *tx, user_id, song_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Favorite not found".into()))?;
    Favorite::delete(&mut *tx, favorite.id).await?;
    tx.commit().await?;

    info!(favorite_id = favorite.id, user_id, song_id, "favorite removed");
    Ok(StatusCode::NO_CONTENT)
}

use axum::{extract::State, http::StatusCode, routing::get, Router};
use tracing::{info, instrument};

use super::{
    dto::{CreateSongRequest, SearchQuery, UpdateSongRequest},
    repo_types::Song,
};
use crate::{
    auth::CurrentUser,
    db,
    error::{AppError, AppResult},
    extract::{AppJson, AppPath, AppQuery},
    favorites::Favorite,
    state::AppState,
};

pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/songs", get(list_songs).post(create_song))
        .route("/songs/search", get(search_songs))
        .route(
            "/songs/:id",
            get(get_song).put(update_song).delete(delete_song),
        )
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Song with id {id} not found"))
}

#[instrument(skip_all)]
pub async fn list_songs(
    State(state): State<AppState>,
    _actor: CurrentUser,
) -> AppResult<AppJson<Vec<Song>>> {
    Ok(AppJson(Song::list(&state.db).await?))
}

#[instrument(skip(state, actor, payload))]
pub async fn create_song(
    State(state): State<AppState>,
    actor: CurrentUser,
    AppJson(mut payload): AppJson<CreateSongRequest>,
) -> AppResult<(StatusCode, AppJson<Song>)> {
    payload.normalize();
    payload.validate()?;

    let mut tx = db::begin_write(&state.db).await?;
    let song = Song::create(&mut *tx, &payload).await?;
    tx.commit().await?;

    info!(song_id = song.id, by = actor.0.id, "song created");
    Ok((StatusCode::CREATED, AppJson(song)))
}

#[instrument(skip(state, _actor))]
pub async fn search_songs(
    State(state): State<AppState>,
    _actor: CurrentUser,
    AppQuery(query): AppQuery<SearchQuery>,
) -> AppResult<AppJson<Vec<Song>>> {
    Ok(AppJson(Song::search(&state.db, &query).await?))
}

#[instrument(skip(state, _actor))]
pub async fn get_song(
    State(state): State<AppState>,
    _actor: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<AppJson<Song>> {
    let song = Song::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(AppJson(song))
}

#[instrument(skip(state, actor, payload))]
pub async fn update_song(
    State(state): State<AppState>,
    actor: CurrentUser,
    AppPath(id): AppPath<i64>,
    AppJson(mut payload): AppJson<UpdateSongRequest>,
) -> AppResult<AppJson<Song>> {
    payload.normalize();
    payload.validate()?;

    let mut tx = db::begin_write(&state.db).await?;
    let mut song = Song::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(title) = payload.title {
        song.title = title;
    }
    if let Some(artist) = payload.artist {
        song.artist = artist;
    }
    if let Some(album) = payload.album {
        song.album = album;
    }
    if let Some(duration) = payload.duration {
        song.duration = duration;
    }
    if let Some(year) = payload.year {
        song.year = year;
    }
    if let Some(genre) = payload.genre {
        song.genre = genre;
    }

    let song = song.save(&mut *tx).await?;
    tx.commit().await?;

    info!(song_id = song.id, by = actor.0.id, "song updated");
    Ok(AppJson(song))
}

#[instrument(skip(state, actor))]
pub async fn delete_song(
    State(state): State<AppState>,
    actor: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    let mut tx = db::begin_write(&state.db).await?;
    if Song::find_by_id(&mut *tx, id).await?.is_none() {
        return Err(not_found(id));
    }
    let removed = Favorite::delete_by_song(&mut *tx, id).await?;
    Song::delete(&mut *tx, id).await?;
    tx.commit().await?;

    info!(song_id = id, favorites_removed = removed, by = actor.0.id, "song deleted");
    Ok(StatusCode::NO_CONTENT)
}

use axum::{extract::State, http::StatusCode, routing::get, Router};
use tracing::{info, instrument, warn};

use super::{
    dto::{CreateUserRequest, UpdateUserRequest, UserRead},
    repo_types::{NewUser, Role, User},
};
use crate::{
    auth::CurrentUser,
    db,
    error::{AppError, AppResult},
    extract::{AppJson, AppPath},
    favorites::Favorite,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("User with id {id} not found"))
}

#[instrument(skip(state, actor))]
pub async fn list_users(
    State(state): State<AppState>,
    actor: CurrentUser,
) -> AppResult<AppJson<Vec<UserRead>>> {
    actor.require_admin()?;
    let users = User::list(&state.db).await?;
    Ok(AppJson(users.into_iter().map(UserRead::from).collect()))
}

#[instrument(skip(state, actor, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    actor: CurrentUser,
    AppJson(mut payload): AppJson<CreateUserRequest>,
) -> AppResult<(StatusCode, AppJson<UserRead>)> {
    actor.require_admin()?;
    payload.normalize();
    payload.validate()?;

    let hash = state.hasher.hash(&payload.password)?;

    let mut tx = db::begin_write(&state.db).await?;
    if User::find_by_email(&mut *tx, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict(format!(
            "Email '{}' is already registered",
            payload.email
        )));
    }
    let user = User::create(
        &mut *tx,
        NewUser {
            name: &payload.name,
            email: &payload.email,
            password_hash: &hash,
            role: payload.role.unwrap_or(Role::User),
        },
    )
    .await?;
    tx.commit().await?;

    info!(user_id = user.id, role = %user.role, by = actor.0.id, "user created");
    Ok((StatusCode::CREATED, AppJson(UserRead::from(user))))
}

#[instrument(skip(state, actor))]
pub async fn get_user(
    State(state): State<AppState>,
    actor: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<AppJson<UserRead>> {
    actor.require_admin()?;
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(AppJson(UserRead::from(user)))
}

#[instrument(skip(state, actor, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    actor: CurrentUser,
    AppPath(id): AppPath<i64>,
    AppJson(mut payload): AppJson<UpdateUserRequest>,
) -> AppResult<AppJson<UserRead>> {
    actor.require_self_or_admin(id)?;
    if payload.touches_privileged_fields() && !actor.0.is_admin() {
        warn!(user_id = actor.0.id, "non-admin tried to change role or active flag");
        return Err(AppError::Forbidden(
            "Only administrators may change role or active status".into(),
        ));
    }
    payload.normalize();
    payload.validate()?;

    let new_hash = match payload.password.as_deref() {
        Some(p) => Some(state.hasher.hash(p)?),
        None => None,
    };

    let mut tx = db::begin_write(&state.db).await?;
    let mut user = User::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(email) = payload.email {
        if email != user.email {
            if User::find_by_email(&mut *tx, &email).await?.is_some() {
                warn!(email = %email, "email already in use");
                return Err(AppError::Conflict(format!("Email '{email}' is already in use")));
            }
            user.email = email;
        }
    }
    if let Some(name) = payload.name {
        user.name = name;
    }
    if let Some(hash) = new_hash {
        user.password_hash = hash;
    }
    if let Some(role) = payload.role {
        user.role = role;
    }
    if let Some(active) = payload.active {
        user.active = active;
    }

    let user = user.save(&mut *tx).await?;
    tx.commit().await?;

    info!(user_id = user.id, by = actor.0.id, "user updated");
    Ok(AppJson(UserRead::from(user)))
}

#[instrument(skip(state, actor))]
pub async fn delete_user(
    State(state): State<AppState>,
    actor: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    actor.require_admin()?;

    let mut tx = db::begin_write(&state.db).await?;
    if User::find_by_id(&mut *tx, id).await?.is_none() {
        return Err(not_found(id));
    }
    let removed = Favorite::delete_by_user(&mut *tx, id).await?;
    User::delete(&mut *tx, id).await?;
    tx.commit().await?;

    info!(user_id = id, favorites_removed = removed, by = actor.0.id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, LoginRequest, RegisterRequest, TokenResponse, VerifyResponse},
        guard::CurrentUser,
    },
    db,
    error::{AppError, AppResult},
    extract::{AppForm, AppJson},
    state::AppState,
    users::{dto::UserRead, NewUser, Role, User},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/login-json", post(login_json))
        .route("/auth/register", post(register))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(get_me))
        .route("/auth/verify", get(verify))
}

/// Checks credentials and mints an access token. Unknown email and wrong
/// password get the same response, and both pay for one argon2 verify.
async fn authenticate(state: &AppState, email: &str, password: &str) -> AppResult<TokenResponse> {
    let user = match User::find_by_email(&state.db, email).await? {
        Some(u) => u,
        None => {
            state.hasher.verify_decoy(password);
            warn!(email = %email, "login unknown email");
            return Err(AppError::Unauthorized("Incorrect email or password".into()));
        }
    };

    if !state.hasher.verify(password, &user.password_hash) {
        warn!(email = %email, user_id = user.id, "login invalid password");
        return Err(AppError::Unauthorized("Incorrect email or password".into()));
    }

    if !user.active {
        warn!(user_id = user.id, "login inactive user");
        return Err(AppError::Forbidden(
            "Inactive user. Contact an administrator.".into(),
        ));
    }

    let access_token = state.keys.issue_access(user.id, &user.email, user.role)?;
    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(TokenResponse::bearer(access_token, user.role))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    AppForm(form): AppForm<LoginForm>,
) -> AppResult<AppJson<TokenResponse>> {
    let email = form.username.trim();
    authenticate(&state, email, &form.password).await.map(AppJson)
}

#[instrument(skip(state, payload))]
pub async fn login_json(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<AppJson<TokenResponse>> {
    let email = payload.email.trim();
    authenticate(&state, email, &payload.password).await.map(AppJson)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, AppJson<UserRead>)> {
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
            role: Role::User,
        },
    )
    .await?;
    tx.commit().await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, AppJson(UserRead::from(user))))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> AppJson<UserRead> {
    AppJson(UserRead::from(user))
}

#[instrument(skip_all)]
pub async fn verify(CurrentUser(user): CurrentUser) -> AppJson<VerifyResponse> {
    AppJson(VerifyResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
        active: user.active,
    })
}

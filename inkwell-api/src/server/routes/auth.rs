use crate::server::{
    Result, ServerError, ServerRouter, Settings,
    auth::Actor,
    blocking,
    json::{Json, Reply},
    resource::{TokenResource, UserResource},
    validation::ValidationErrors,
};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use inkwell_common::{
    model::{
        auth::{AccessToken, NewAccessToken},
        user::{CreateUser, Email, PasswordDigest, Role, User, UserCredentials, UserName},
    },
    util::FieldError,
};
use inkwell_db::client::{DbClient, DbError};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_post(register)
        .typed_post(login)
        .typed_post(logout)
        .typed_get(current_user)
}

async fn issue_token(db: &DbClient, settings: &Settings, user: &User) -> Result<AccessToken> {
    let name = format!("{}-AuthToken", user.name.get());
    let (user_id, ttl) = (user.id, settings.token_ttl);
    let token = blocking(move || NewAccessToken::generate(user_id, name, ttl)).await??;
    let token_id = db.create_access_token(&token).await?;

    Ok(token.into_token(token_id))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/register", rejection(ServerError))]
struct RegisterPath();

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RegisterBody {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

async fn register(
    RegisterPath(): RegisterPath,
    State(db): State<Arc<DbClient>>,
    State(settings): State<Arc<Settings>>,
    Json(body): Json<RegisterBody>,
) -> Result<Reply<TokenResource>> {
    let mut errors = ValidationErrors::default();
    let name = errors.check(UserName::new(body.name.unwrap_or_default()));
    let email = errors.check(Email::new(body.email.unwrap_or_default()));
    let password = body.password.unwrap_or_default();
    errors.check(PasswordDigest::check_rules(&password));

    if let Some(email) = &email
        && db.email_taken(email).await?
    {
        errors.add(&FieldError::Taken { field: "email" });
    }

    let (Some(name), Some(email)) = (name, email) else {
        return Err(errors.into());
    };
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let new_user = CreateUser {
        name,
        email,
        password: blocking(move || PasswordDigest::hash(&password)).await??,
        role: Role::Viewer,
    };

    let user = match db.create_user(&new_user).await {
        Ok(user) => user,
        // Lost a race against a concurrent registration with the same email.
        Err(DbError::UniqueViolation(_)) => {
            return Err(ValidationErrors::from(FieldError::Taken { field: "email" }).into());
        }
        Err(err) => return Err(err.into()),
    };
    info!(user_id = %user.id, "Registered user");

    let token = issue_token(&db, &settings, &user).await?;

    Ok(Reply::created(
        "Successfully created user!",
        TokenResource::from(&token),
    ))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/login", rejection(ServerError))]
struct LoginPath();

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LoginBody {
    email: Option<String>,
    password: Option<String>,
}

async fn login(
    LoginPath(): LoginPath,
    State(db): State<Arc<DbClient>>,
    State(settings): State<Arc<Settings>>,
    Json(body): Json<LoginBody>,
) -> Result<Reply<TokenResource>> {
    let mut errors = ValidationErrors::default();
    let email = body.email.filter(|email| !email.trim().is_empty());
    let password = body.password.filter(|password| !password.is_empty());
    if email.is_none() {
        errors.add(&FieldError::Required { field: "email" });
    }
    if password.is_none() {
        errors.add(&FieldError::Required { field: "password" });
    }
    let (Some(email), Some(password)) = (email, password) else {
        return Err(errors.into());
    };

    // A malformed address cannot belong to anybody.
    let Ok(email) = Email::new(email) else {
        return Err(ServerError::InvalidCredentials);
    };

    let UserCredentials { user, password: digest } = db
        .fetch_user_credentials(&email)
        .await?
        .ok_or(ServerError::InvalidCredentials)?;

    if !blocking(move || digest.verify(&password)).await? {
        return Err(ServerError::InvalidCredentials);
    }

    let token = issue_token(&db, &settings, &user).await?;

    Ok(Reply::accepted(
        "Successfully logged in!",
        TokenResource::from(&token),
    ))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/logout", rejection(ServerError))]
struct LogoutPath();

async fn logout(
    LogoutPath(): LogoutPath,
    State(db): State<Arc<DbClient>>,
    actor: Actor,
) -> Result<Reply<()>> {
    db.delete_access_token(actor.token_id()).await?;

    Ok(Reply::message("Successfully logged out."))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/user", rejection(ServerError))]
struct CurrentUserPath();

async fn current_user(CurrentUserPath(): CurrentUserPath, actor: Actor) -> Reply<UserResource> {
    Reply::ok(
        "User retrieved successfully.",
        UserResource::from(actor.into_user()),
    )
}

use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use axum_extra::typed_header::TypedHeaderRejection;
use inkwell_common::{
    model::{
        Id,
        auth::{AccessTokenDecodeError, TokenHashError},
        comment::CommentMarker,
        post::PostMarker,
        user::PasswordHashError,
    },
    util::PositiveDuration,
};
use inkwell_db::client::{DbClient, DbError};
use json::{Envelope, Json, Message};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, error};
use validation::ValidationErrors;

mod auth;
mod json;
mod pagination;
mod resource;
mod routes;
mod validation;
mod version;


pub type ServerRouter = Router<ServerState>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub db_client: Arc<DbClient>,
    pub settings: Arc<Settings>,
}

/// Runtime behavior that is fixed at startup.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct Settings {
    /// `None` means issued tokens never expire.
    pub token_ttl: Option<PositiveDuration>,
    pub v1_legacy_listing: bool,
    /// Prefix for pagination links, empty for relative links.
    pub public_url: String,
}

pub fn routes() -> ServerRouter {
    routes::routes()
        .fallback(fallback)
        .method_not_allowed_fallback(method_not_allowed)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub async fn method_not_allowed(method: Method, uri: Uri) -> ServerError {
    ServerError::MethodNotAllowed(method, uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

/// Runs argon2 hashing and verification on the blocking pool instead of an async worker.
pub async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(work).await?)
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Method {0} is not allowed for {1}")]
    MethodNotAllowed(Method, Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("Query string rejected: {0}")]
    QueryRejection(#[from] QueryRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Authorization header was missing or invalid: {0}")]
    InvalidAuthorizationHeader(TypedHeaderRejection),
    #[error("The provided access token could not be decoded: {0}")]
    InvalidAccessToken(#[from] AccessTokenDecodeError),
    #[error("The access token could not be hashed: {0}")]
    TokenHash(#[from] TokenHashError),
    #[error(transparent)]
    PasswordHash(#[from] PasswordHashError),
    #[error("Blocking task failed: {0}")]
    BlockingTask(#[from] JoinError),
    #[error("Provided token was unknown or expired")]
    InvalidToken,
    #[error("Login with unknown email or wrong password")]
    InvalidCredentials,
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("Forbidden: {0}")]
    Forbidden(&'static str),
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
    #[error("Comment with id {0} was not found.")]
    CommentByIdNotFound(Id<CommentMarker>),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::PostByIdNotFound(_)
            | ServerError::CommentByIdNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::MethodNotAllowed(..) => StatusCode::METHOD_NOT_ALLOWED,
            ServerError::InvalidAuthorizationHeader(_)
            | ServerError::InvalidAccessToken(_)
            | ServerError::InvalidToken
            | ServerError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ServerError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServerError::JsonRejection(_)
            | ServerError::QueryRejection(_)
            | ServerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::JsonResponse(_)
            | ServerError::Database(_)
            | ServerError::TokenHash(_)
            | ServerError::PasswordHash(_)
            | ServerError::BlockingTask(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// What the client gets to read. Server-side failures never expose their details.
    fn client_message(self) -> Message {
        match self {
            ServerError::UnknownRoute(_) | ServerError::PathRejection(_) => {
                "Resource not found.".into()
            }
            ServerError::MethodNotAllowed(..) => "Method not allowed for the requested route.".into(),
            ServerError::JsonRejection(rejection) => rejection.body_text().into(),
            ServerError::QueryRejection(rejection) => rejection.body_text().into(),
            ServerError::InvalidAuthorizationHeader(_)
            | ServerError::InvalidAccessToken(_)
            | ServerError::InvalidToken => "Unauthenticated.".into(),
            ServerError::InvalidCredentials => "Invalid Credentials".into(),
            ServerError::Validation(errors) => Message::Fields(errors.into_fields()),
            ServerError::Forbidden(message) => message.into(),
            ServerError::Database(_) => "Sql query error.".into(),
            ServerError::JsonResponse(_)
            | ServerError::TokenHash(_)
            | ServerError::PasswordHash(_)
            | ServerError::BlockingTask(_) => "Server error.".into(),
            err @ (ServerError::PostByIdNotFound(_) | ServerError::CommentByIdNotFound(_)) => {
                err.to_string().into()
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!(error = %self, %status, "Replying with error");
        } else {
            debug!(error = %self, %status, "Replying with error");
        }

        (status, Json(Envelope::error(self.client_message()))).into_response()
    }
}

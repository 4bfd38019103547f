use crate::server::{ServerError, blocking};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use inkwell_common::{
    model::{
        Id,
        auth::{AccessToken, AccessTokenMarker},
        comment::Comment,
        user::User,
    },
    policy::{CommentAction, PostAction, authorize_comment, authorize_post},
};
use inkwell_db::client::DbClient;
use std::sync::Arc;
use time::UtcDateTime;
use tracing::debug;

type AuthorizationHeader = TypedHeader<Authorization<Bearer>>;

/// The user behind a valid bearer token.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Actor {
    user: User,
    token_id: Id<AccessTokenMarker>,
}

impl Actor {
    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn into_user(self) -> User {
        self.user
    }

    /// The token this request was authenticated with.
    #[must_use]
    pub fn token_id(&self) -> Id<AccessTokenMarker> {
        self.token_id
    }

    pub fn authorize_post(&self, action: PostAction<'_>) -> Result<(), ServerError> {
        if authorize_post(&self.user, action).is_allowed() {
            Ok(())
        } else {
            Err(ServerError::Forbidden(action.denial_message()))
        }
    }

    pub fn authorize_comment(
        &self,
        action: CommentAction,
        comment: &Comment,
    ) -> Result<(), ServerError> {
        if authorize_comment(&self.user, action, comment).is_allowed() {
            Ok(())
        } else {
            Err(ServerError::Forbidden(action.denial_message()))
        }
    }
}

impl<S> FromRequestParts<S> for Actor
where
    Arc<DbClient>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let request_token: AccessToken = AuthorizationHeader::from_request_parts(parts, state)
            .await
            .map_err(ServerError::InvalidAuthorizationHeader)?
            .token()
            .parse()?;

        let db = Arc::<DbClient>::from_ref(state);

        let authentication = db
            .fetch_authentication(request_token.id)
            .await?
            .ok_or(ServerError::InvalidToken)?;

        let (token_id, user_id) = (authentication.id, authentication.user);
        let now = UtcDateTime::now();
        if !blocking(move || authentication.accepts(&request_token, now)).await?? {
            debug!(%token_id, "Token rejected");
            return Err(ServerError::InvalidToken);
        }

        // The token row cascades with its user, so a miss here is a race with deletion.
        let user = db
            .fetch_user(user_id)
            .await?
            .ok_or(ServerError::InvalidToken)?;

        Ok(Self { user, token_id })
    }
}

//! Client-facing JSON representations of the model.

use inkwell_common::model::{
    Id,
    auth::{AccessToken, TOKEN_TYPE},
    comment::{Comment, CommentAuthor, CommentMarker, CommentText, CommentWithAuthor},
    post::{Post, PostContent, PostMarker, PostStatus, PostTitle},
    user::{Email, Role, User, UserMarker, UserName},
};
use serde::Serialize;
use time::{OffsetDateTime, UtcDateTime, UtcOffset};

fn timestamp(value: UtcDateTime) -> OffsetDateTime {
    value.to_offset(UtcOffset::UTC)
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct UserResource {
    pub id: Id<UserMarker>,
    pub name: UserName,
    pub email: Email,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserResource {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            role: value.role,
            created_at: timestamp(value.created_at),
            updated_at: timestamp(value.updated_at),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct PostResource {
    pub id: Id<PostMarker>,
    pub title: PostTitle,
    pub content: PostContent,
    pub status: PostStatus,
    pub created_by: Id<UserMarker>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Post> for PostResource {
    fn from(value: Post) -> Self {
        Self {
            id: value.id,
            title: value.title,
            content: value.content,
            status: value.status,
            created_by: value.created_by,
            created_at: timestamp(value.created_at),
            updated_at: timestamp(value.updated_at),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct CommentAuthorResource {
    pub id: Id<UserMarker>,
    pub name: UserName,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct CommentResource {
    pub id: Id<CommentMarker>,
    pub post_id: Id<PostMarker>,
    pub user_id: Id<UserMarker>,
    pub comment: CommentText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<CommentAuthorResource>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Comment> for CommentResource {
    fn from(value: Comment) -> Self {
        Self {
            id: value.id,
            post_id: value.post_id,
            user_id: value.user_id,
            comment: value.comment,
            user: None,
            created_at: timestamp(value.created_at),
            updated_at: timestamp(value.updated_at),
        }
    }
}

impl From<CommentWithAuthor> for CommentResource {
    fn from(value: CommentWithAuthor) -> Self {
        let CommentAuthor { id, name } = value.author;

        Self {
            user: Some(CommentAuthorResource { id, name }),
            ..value.comment.into()
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct TokenResource {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    pub token_type: &'static str,
}

impl From<&AccessToken> for TokenResource {
    fn from(value: &AccessToken) -> Self {
        Self {
            access_token: value.as_token_str(),
            token_type: TOKEN_TYPE,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::server::resource::PostResource;
    use inkwell_common::model::{
        Id,
        post::{Post, PostContent, PostStatus, PostTitle},
    };
    use serde_json::json;
    use time::macros::utc_datetime;

    #[test]
    fn post_resource_json() {
        let post = Post {
            id: Id::new(4),
            title: PostTitle::new("Alpha".to_owned()).unwrap(),
            content: PostContent::new("Body".to_owned()).unwrap(),
            status: PostStatus::Published,
            created_by: Id::new(2),
            created_at: utc_datetime!(2025-05-01 08:30),
            updated_at: utc_datetime!(2025-05-02 09:00),
        };

        assert_eq!(
            serde_json::to_value(PostResource::from(post)).unwrap(),
            json!({
                "id": 4,
                "title": "Alpha",
                "content": "Body",
                "status": "published",
                "created_by": 2,
                "created_at": "2025-05-01T08:30:00Z",
                "updated_at": "2025-05-02T09:00:00Z",
            })
        );
    }
}

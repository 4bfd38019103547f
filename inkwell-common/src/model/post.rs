use crate::{
    model::{Id, user::UserMarker},
    util::{FieldError, required_text},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::UtcDateTime;

pub const POST_TITLE_MAX_LEN: usize = 255;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl FromStr for PostStatus {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(FieldError::NotAllowed {
                field: "status",
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub title: PostTitle,
    pub content: PostContent,
    pub status: PostStatus,
    pub created_by: Id<UserMarker>,
    pub created_at: UtcDateTime,
    pub updated_at: UtcDateTime,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct PostTitle(String);

impl PostTitle {
    pub fn new(title: String) -> Result<Self, FieldError> {
        required_text("title", title, Some(POST_TITLE_MAX_LEN)).map(Self)
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct PostContent(String);

impl PostContent {
    pub fn new(content: String) -> Result<Self, FieldError> {
        required_text("content", content, None).map(Self)
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

/// The only fields a client may set when creating a post. The author is
/// always the acting user and is passed separately.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct CreatePost {
    pub title: PostTitle,
    pub content: PostContent,
    pub status: PostStatus,
}

/// The only fields a client may change on an existing post.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct PostChanges {
    pub title: Option<PostTitle>,
    pub content: Option<PostContent>,
    pub status: Option<PostStatus>,
}

impl PostChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.status.is_none()
    }
}

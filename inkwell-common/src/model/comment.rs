use crate::{
    model::{
        Id,
        post::PostMarker,
        user::{UserMarker, UserName},
    },
    util::{FieldError, required_text},
};
use serde::Serialize;
use time::UtcDateTime;

pub const COMMENT_MAX_LEN: usize = 1000;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Comment {
    pub id: Id<CommentMarker>,
    pub post_id: Id<PostMarker>,
    pub user_id: Id<UserMarker>,
    pub comment: CommentText,
    pub created_at: UtcDateTime,
    pub updated_at: UtcDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CommentAuthor {
    pub id: Id<UserMarker>,
    pub name: UserName,
}

/// A comment as listed under its post.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author: CommentAuthor,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct CommentText(String);

impl CommentText {
    pub fn new(comment: String) -> Result<Self, FieldError> {
        required_text("comment", comment, Some(COMMENT_MAX_LEN)).map(Self)
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

use inkwell_common::model::{
    ModelValidationError,
    auth::Authentication,
    comment::{Comment, CommentAuthor, CommentText, CommentWithAuthor},
    post::{Post, PostContent, PostTitle},
    user::{Email, PasswordDigest, User, UserCredentials, UserName},
};
use sqlx::FromRow;
use time::{Duration, PrimitiveDateTime};

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct UserRecord {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct UserCredentialsRecord {
    #[sqlx(flatten)]
    pub user: UserRecord,
    pub password: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct AuthenticationRecord {
    pub token_id: i64,
    pub user_id: i64,
    pub token_hash: Vec<u8>,
    pub salt: Vec<u8>,
    pub created_at: PrimitiveDateTime,
    pub expires_after_seconds: Option<i64>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct PostRecord {
    pub post_id: i64,
    pub title: String,
    pub content: String,
    pub status: String,
    pub created_by: i64,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct CommentRecord {
    pub comment_id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub comment: String,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct CommentWithAuthorRecord {
    #[sqlx(flatten)]
    pub comment: CommentRecord,
    pub author_name: String,
}

impl TryFrom<UserRecord> for User {
    type Error = ModelValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.user_id.into(),
            name: UserName::new(value.name)?,
            email: Email::new(value.email)?,
            role: value.role.parse()?,
            created_at: value.created_at.as_utc(),
            updated_at: value.updated_at.as_utc(),
        })
    }
}

impl TryFrom<UserCredentialsRecord> for UserCredentials {
    type Error = ModelValidationError;

    fn try_from(value: UserCredentialsRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            user: value.user.try_into()?,
            password: PasswordDigest::from_stored(value.password),
        })
    }
}

impl TryFrom<AuthenticationRecord> for Authentication {
    type Error = ModelValidationError;

    fn try_from(value: AuthenticationRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.token_id.into(),
            user: value.user_id.into(),
            token_hash: value.token_hash.try_into()?,
            salt: value.salt.try_into()?,
            created_at: value.created_at.as_utc(),
            expires_after: value
                .expires_after_seconds
                .map(|seconds| Duration::seconds(seconds).try_into())
                .transpose()?,
        })
    }
}

impl TryFrom<PostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.post_id.into(),
            title: PostTitle::new(value.title)?,
            content: PostContent::new(value.content)?,
            status: value.status.parse()?,
            created_by: value.created_by.into(),
            created_at: value.created_at.as_utc(),
            updated_at: value.updated_at.as_utc(),
        })
    }
}

impl TryFrom<CommentRecord> for Comment {
    type Error = ModelValidationError;

    fn try_from(value: CommentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.comment_id.into(),
            post_id: value.post_id.into(),
            user_id: value.user_id.into(),
            comment: CommentText::new(value.comment)?,
            created_at: value.created_at.as_utc(),
            updated_at: value.updated_at.as_utc(),
        })
    }
}

impl TryFrom<CommentWithAuthorRecord> for CommentWithAuthor {
    type Error = ModelValidationError;

    fn try_from(value: CommentWithAuthorRecord) -> Result<Self, Self::Error> {
        let author = CommentAuthor {
            id: value.comment.user_id.into(),
            name: UserName::new(value.author_name)?,
        };

        Ok(Self {
            comment: value.comment.try_into()?,
            author,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::record::{AuthenticationRecord, PostRecord, UserRecord};
    use inkwell_common::model::{
        ModelValidationError,
        auth::Authentication,
        post::{Post, PostStatus},
        user::{Role, User},
    };
    use time::macros::datetime;

    fn user_record(role: &str) -> UserRecord {
        UserRecord {
            user_id: 3,
            name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
            role: role.to_owned(),
            created_at: datetime!(2025-03-01 10:00),
            updated_at: datetime!(2025-03-02 10:00),
        }
    }

    #[test]
    fn user_from_record() {
        let user = User::try_from(user_record("editor")).unwrap();
        assert_eq!(user.id.get(), 3);
        assert_eq!(user.role, Role::Editor);
        assert_eq!(user.email.get(), "ada@example.com");
        assert_eq!(user.created_at.hour(), 10);
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(matches!(
            User::try_from(user_record("owner")),
            Err(ModelValidationError::Field(_))
        ));
    }

    #[test]
    fn post_from_record() {
        let post = Post::try_from(PostRecord {
            post_id: 8,
            title: "Alpha".to_owned(),
            content: "Body".to_owned(),
            status: "published".to_owned(),
            created_by: 3,
            created_at: datetime!(2025-03-01 10:00),
            updated_at: datetime!(2025-03-01 10:00),
        })
        .unwrap();

        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.created_by.get(), 3);
        assert_eq!(post.title.get(), "Alpha");
    }

    #[test]
    fn authentication_from_record() {
        let record = AuthenticationRecord {
            token_id: 1,
            user_id: 3,
            token_hash: vec![1; 32],
            salt: vec![2; 16],
            created_at: datetime!(2025-03-01 10:00),
            expires_after_seconds: Some(3600),
        };

        let authentication = Authentication::try_from(record.clone()).unwrap();
        assert_eq!(
            authentication.expires_after.map(|ttl| ttl.whole_seconds()),
            Some(3600)
        );

        let broken_salt = AuthenticationRecord {
            salt: vec![2; 3],
            ..record.clone()
        };
        assert!(matches!(
            Authentication::try_from(broken_salt),
            Err(ModelValidationError::TokenSalt(_))
        ));

        let non_positive_ttl = AuthenticationRecord {
            expires_after_seconds: Some(0),
            ..record
        };
        assert!(matches!(
            Authentication::try_from(non_positive_ttl),
            Err(ModelValidationError::NonPositiveDuration(_))
        ));
    }
}

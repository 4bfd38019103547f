use crate::record::{
    AuthenticationRecord, CommentRecord, CommentWithAuthorRecord, PostRecord,
    UserCredentialsRecord, UserRecord,
};
use inkwell_common::{
    listing::PostFilter,
    model::{
        Id, ModelValidationError,
        auth::{AccessTokenMarker, Authentication, NewAccessToken},
        comment::{Comment, CommentMarker, CommentText, CommentWithAuthor},
        page::{Page, PageRequest},
        post::{CreatePost, Post, PostChanges, PostMarker},
        user::{CreateUser, Email, User, UserCredentials, UserMarker},
    },
};
use sqlx::{
    PgPool, Postgres, QueryBuilder, migrate::MigrateError, postgres::PgPoolOptions, query,
    query_as, query_scalar,
};
use thiserror::Error;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("Unique constraint {0:?} was violated")]
    UniqueViolation(String),
    #[error("Running migrations failed: {0}")]
    Migrate(#[from] MigrateError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

fn map_unique_violation(err: sqlx::Error) -> DbError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            DbError::UniqueViolation(db_err.constraint().unwrap_or_default().to_owned())
        }
        err => err.into(),
    }
}

fn limit_offset(page: PageRequest) -> (i64, i64) {
    (
        i64::try_from(page.limit()).unwrap_or(i64::MAX),
        i64::try_from(page.offset()).unwrap_or(i64::MAX),
    )
}

fn push_post_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
    if let Some(author) = filter.created_by {
        builder.push(" AND created_by = ").push_bind(author.get());
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(term) = &filter.search {
        let pattern = term.like_pattern();
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR content ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[derive(Debug)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    /// Creates the pool without opening a connection until one is needed.
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().connect_lazy(database_url)?;

        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!().run(&self.pool).await?;

        Ok(())
    }

    pub async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        let record = query_as::<_, UserRecord>(
            "
            SELECT
                user_id, name, email, role, created_at, updated_at
            FROM
                users.users
            WHERE
                user_id = $1
            ",
        )
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    pub async fn fetch_user_credentials(&self, email: &Email) -> Result<Option<UserCredentials>> {
        let record = query_as::<_, UserCredentialsRecord>(
            "
            SELECT
                user_id, name, email, role, created_at, updated_at, password
            FROM
                users.users
            WHERE
                email = $1
            ",
        )
        .bind(email.get())
        .fetch_optional(&self.pool)
        .await?;

        let credentials = record.map(UserCredentials::try_from).transpose()?;
        Ok(credentials)
    }

    pub async fn email_taken(&self, email: &Email) -> Result<bool> {
        let taken = query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users.users WHERE email = $1)",
        )
        .bind(email.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    pub async fn create_user(&self, user: &CreateUser) -> Result<User> {
        let record = query_as::<_, UserRecord>(
            "
            INSERT INTO users.users (name, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING user_id, name, email, role, created_at, updated_at
            ",
        )
        .bind(user.name.get())
        .bind(user.email.get())
        .bind(user.password.get())
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(record.try_into()?)
    }

    pub async fn create_access_token(
        &self,
        token: &NewAccessToken,
    ) -> Result<Id<AccessTokenMarker>> {
        let token_id = query_scalar::<_, i64>(
            "
            INSERT INTO users.access_tokens
                (user_id, name, token_hash, salt, expires_after_seconds)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING token_id
            ",
        )
        .bind(token.user.get())
        .bind(&token.name)
        .bind(&token.hash.0[..])
        .bind(&token.salt.0[..])
        .bind(token.expires_after.map(|ttl| ttl.whole_seconds()))
        .fetch_one(&self.pool)
        .await?;

        Ok(token_id.into())
    }

    pub async fn fetch_authentication(
        &self,
        token_id: Id<AccessTokenMarker>,
    ) -> Result<Option<Authentication>> {
        let record = query_as::<_, AuthenticationRecord>(
            "
            SELECT
                token_id, user_id, token_hash, salt, created_at, expires_after_seconds
            FROM
                users.access_tokens
            WHERE
                token_id = $1
            ",
        )
        .bind(token_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let authentication = record.map(Authentication::try_from).transpose()?;
        Ok(authentication)
    }

    /// Returns whether a token was deleted.
    pub async fn delete_access_token(&self, token_id: Id<AccessTokenMarker>) -> Result<bool> {
        let result = query("DELETE FROM users.access_tokens WHERE token_id = $1")
            .bind(token_id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let record = query_as::<_, PostRecord>(
            "
            SELECT
                post_id, title, content, status, created_by, created_at, updated_at
            FROM
                posts.posts
            WHERE
                post_id = $1
            ",
        )
        .bind(post_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }

    /// Posts matching `filter`, in insertion order.
    pub async fn list_posts(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>> {
        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts.posts WHERE TRUE");
        push_post_filter(&mut count_query, filter);
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut select_query = QueryBuilder::<Postgres>::new(
            "
            SELECT
                post_id, title, content, status, created_by, created_at, updated_at
            FROM
                posts.posts
            WHERE TRUE",
        );
        push_post_filter(&mut select_query, filter);
        let (limit, offset) = limit_offset(page);
        select_query
            .push(" ORDER BY post_id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let records = select_query
            .build_query_as::<PostRecord>()
            .fetch_all(&self.pool)
            .await?;

        let items = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            request: page,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    pub async fn create_post(&self, post: &CreatePost, author: Id<UserMarker>) -> Result<Post> {
        let record = query_as::<_, PostRecord>(
            "
            INSERT INTO posts.posts (title, content, status, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING post_id, title, content, status, created_by, created_at, updated_at
            ",
        )
        .bind(post.title.get())
        .bind(post.content.get())
        .bind(post.status.as_str())
        .bind(author.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(record.try_into()?)
    }

    /// Returns `None` if the post does not exist.
    pub async fn update_post(
        &self,
        post_id: Id<PostMarker>,
        changes: &PostChanges,
    ) -> Result<Option<Post>> {
        if changes.is_empty() {
            return self.fetch_post(post_id).await;
        }

        let mut builder = QueryBuilder::<Postgres>::new(
            "UPDATE posts.posts SET updated_at = (now() AT TIME ZONE 'utc')",
        );
        if let Some(title) = &changes.title {
            builder.push(", title = ").push_bind(title.get());
        }
        if let Some(content) = &changes.content {
            builder.push(", content = ").push_bind(content.get());
        }
        if let Some(status) = changes.status {
            builder.push(", status = ").push_bind(status.as_str());
        }
        builder
            .push(" WHERE post_id = ")
            .push_bind(post_id.get())
            .push(
                " RETURNING post_id, title, content, status, created_by, created_at, updated_at",
            );

        let record = builder
            .build_query_as::<PostRecord>()
            .fetch_optional(&self.pool)
            .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }

    /// Returns whether a post was deleted. Its comments go with it.
    pub async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<bool> {
        let result = query("DELETE FROM posts.posts WHERE post_id = $1")
            .bind(post_id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn fetch_comment(&self, comment_id: Id<CommentMarker>) -> Result<Option<Comment>> {
        let record = query_as::<_, CommentRecord>(
            "
            SELECT
                comment_id, post_id, user_id, comment, created_at, updated_at
            FROM
                posts.comments
            WHERE
                comment_id = $1
            ",
        )
        .bind(comment_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let comment = record.map(Comment::try_from).transpose()?;
        Ok(comment)
    }

    /// Comments of a post with their authors, newest first.
    pub async fn list_post_comments(
        &self,
        post_id: Id<PostMarker>,
        page: PageRequest,
    ) -> Result<Page<CommentWithAuthor>> {
        let total = query_scalar::<_, i64>("SELECT COUNT(*) FROM posts.comments WHERE post_id = $1")
            .bind(post_id.get())
            .fetch_one(&self.pool)
            .await?;

        let (limit, offset) = limit_offset(page);
        let records = query_as::<_, CommentWithAuthorRecord>(
            "
            SELECT
                comments.comment_id,
                comments.post_id,
                comments.user_id,
                comments.comment,
                comments.created_at,
                comments.updated_at,
                users.name AS author_name
            FROM
                posts.comments
                JOIN users.users ON users.user_id = comments.user_id
            WHERE
                comments.post_id = $1
            ORDER BY
                comments.created_at DESC,
                comments.comment_id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(post_id.get())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let items = records
            .into_iter()
            .map(CommentWithAuthor::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            request: page,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    pub async fn create_comment(
        &self,
        post_id: Id<PostMarker>,
        author: Id<UserMarker>,
        comment: &CommentText,
    ) -> Result<Comment> {
        let record = query_as::<_, CommentRecord>(
            "
            INSERT INTO posts.comments (post_id, user_id, comment)
            VALUES ($1, $2, $3)
            RETURNING comment_id, post_id, user_id, comment, created_at, updated_at
            ",
        )
        .bind(post_id.get())
        .bind(author.get())
        .bind(comment.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(record.try_into()?)
    }

    /// Only the text of a comment can change. Returns `None` if the comment does not exist.
    pub async fn update_comment(
        &self,
        comment_id: Id<CommentMarker>,
        comment: &CommentText,
    ) -> Result<Option<Comment>> {
        let record = query_as::<_, CommentRecord>(
            "
            UPDATE posts.comments
            SET comment = $1, updated_at = (now() AT TIME ZONE 'utc')
            WHERE comment_id = $2
            RETURNING comment_id, post_id, user_id, comment, created_at, updated_at
            ",
        )
        .bind(comment.get())
        .bind(comment_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let comment = record.map(Comment::try_from).transpose()?;
        Ok(comment)
    }

    pub async fn delete_comment(&self, comment_id: Id<CommentMarker>) -> Result<bool> {
        let result = query("DELETE FROM posts.comments WHERE comment_id = $1")
            .bind(comment_id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

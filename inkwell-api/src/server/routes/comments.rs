use crate::server::{
    Result, ServerError, ServerRouter, Settings,
    auth::Actor,
    json::{Json, NoContent, Query, Reply},
    pagination::{PageUrls, Paginated},
    resource::CommentResource,
    routes::posts::ListQuery,
    validation::ValidationErrors,
};
use axum::extract::{OriginalUri, State};
use axum_extra::routing::{RouterExt, TypedPath};
use inkwell_common::{
    model::{
        Id,
        comment::{Comment, CommentAuthor, CommentMarker, CommentText, CommentWithAuthor},
        page::PageRequest,
        post::PostMarker,
    },
    policy::CommentAction,
};
use inkwell_db::client::DbClient;
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(index)
        .typed_post(store)
        .typed_put(update)
        .typed_delete(destroy)
}

async fn find_comment(db: &DbClient, id: Id<CommentMarker>) -> Result<Comment> {
    db.fetch_comment(id)
        .await?
        .ok_or(ServerError::CommentByIdNotFound(id))
}

async fn ensure_post_exists(db: &DbClient, id: Id<PostMarker>) -> Result<()> {
    match db.fetch_post(id).await? {
        Some(_) => Ok(()),
        None => Err(ServerError::PostByIdNotFound(id)),
    }
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/comments", rejection(ServerError))]
struct PostCommentsPath {
    id: Id<PostMarker>,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/comments/{id}", rejection(ServerError))]
struct CommentPath {
    id: Id<CommentMarker>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CommentBody {
    comment: Option<String>,
}

impl CommentBody {
    fn validate(self) -> Result<CommentText, ValidationErrors> {
        Ok(CommentText::new(self.comment.unwrap_or_default())?)
    }
}

async fn index(
    PostCommentsPath { id }: PostCommentsPath,
    _actor: Actor,
    State(db): State<Arc<DbClient>>,
    State(settings): State<Arc<Settings>>,
    OriginalUri(uri): OriginalUri,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Reply<Paginated<CommentResource>>> {
    let query = ListQuery::from(pairs);
    ensure_post_exists(&db, id).await?;

    let page = db
        .list_post_comments(id, PageRequest::from_query(query.page.as_deref()))
        .await?;
    let urls = PageUrls::new(&settings.public_url, &uri, true);

    Ok(Reply::ok(
        "Post comments retrieved successfully.",
        Paginated::new(page, &urls, CommentResource::from),
    ))
}

async fn store(
    PostCommentsPath { id }: PostCommentsPath,
    actor: Actor,
    State(db): State<Arc<DbClient>>,
    Json(body): Json<CommentBody>,
) -> Result<Reply<CommentResource>> {
    ensure_post_exists(&db, id).await?;
    let text = body.validate()?;

    let author = actor.into_user();
    let comment = db.create_comment(id, author.id, &text).await?;
    let comment = CommentWithAuthor {
        comment,
        author: CommentAuthor {
            id: author.id,
            name: author.name,
        },
    };

    Ok(Reply::created(
        "Comment created successfully.",
        CommentResource::from(comment),
    ))
}

async fn update(
    CommentPath { id }: CommentPath,
    actor: Actor,
    State(db): State<Arc<DbClient>>,
    Json(body): Json<CommentBody>,
) -> Result<Reply<CommentResource>> {
    let comment = find_comment(&db, id).await?;
    actor.authorize_comment(CommentAction::Update, &comment)?;
    let text = body.validate()?;

    let comment = db
        .update_comment(id, &text)
        .await?
        .ok_or(ServerError::CommentByIdNotFound(id))?;

    Ok(Reply::ok(
        "Comment updated successfully.",
        CommentResource::from(comment),
    ))
}

async fn destroy(
    CommentPath { id }: CommentPath,
    actor: Actor,
    State(db): State<Arc<DbClient>>,
) -> Result<NoContent> {
    let comment = find_comment(&db, id).await?;
    actor.authorize_comment(CommentAction::Delete, &comment)?;

    if !db.delete_comment(id).await? {
        return Err(ServerError::CommentByIdNotFound(id));
    }

    Ok(NoContent)
}

use crate::server::{
    Result, ServerError, ServerRouter, Settings,
    auth::Actor,
    json::{Json, NoContent, Query, Reply},
    pagination::{PageUrls, Paginated},
    resource::PostResource,
    validation::ValidationErrors,
    version::ApiVersion,
};
use axum::{
    Extension,
    extract::{OriginalUri, State},
};
use axum_extra::routing::{RouterExt, TypedPath};
use inkwell_common::{
    listing::{PostFilter, SearchTerm},
    model::{
        Id,
        page::PageRequest,
        post::{CreatePost, Post, PostChanges, PostContent, PostMarker, PostStatus, PostTitle},
    },
    policy::PostAction,
};
use inkwell_db::client::DbClient;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(index)
        .typed_post(store)
        .typed_get(show)
        .typed_put(update)
        .typed_delete(destroy)
}

async fn find_post(db: &DbClient, id: Id<PostMarker>) -> Result<Post> {
    db.fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts", rejection(ServerError))]
struct PostsPath();

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
struct PostPath {
    id: Id<PostMarker>,
}

/// Listing parameters. `page` stays a string so that garbage falls back to
/// the first page, and a repeated key takes its last value.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub(super) struct ListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
}

impl From<Vec<(String, String)>> for ListQuery {
    fn from(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "page" => query.page = Some(value),
                "search" => query.search = Some(value),
                _ => {}
            }
        }

        query
    }
}

async fn index(
    PostsPath(): PostsPath,
    actor: Actor,
    Extension(version): Extension<ApiVersion>,
    State(db): State<Arc<DbClient>>,
    State(settings): State<Arc<Settings>>,
    OriginalUri(uri): OriginalUri,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Reply<Paginated<PostResource>>> {
    let query = ListQuery::from(pairs);
    let mut filter = if version.restricts_listing(&settings) {
        actor.authorize_post(PostAction::ViewAny)?;
        PostFilter::for_actor(actor.user())
    } else {
        PostFilter::unrestricted()
    };

    if version.supports_search() {
        filter = filter.with_search(query.search.as_deref().and_then(SearchTerm::new));
    }

    let page = db
        .list_posts(&filter, PageRequest::from_query(query.page.as_deref()))
        .await?;
    let urls = PageUrls::new(&settings.public_url, &uri, version.preserves_query_string());

    Ok(Reply::ok(
        "Posts retrieved successfully.",
        Paginated::new(page, &urls, PostResource::from),
    ))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StorePostBody {
    title: Option<String>,
    content: Option<String>,
    status: Option<String>,
}

impl StorePostBody {
    fn validate(self) -> Result<CreatePost, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let title = errors.check(PostTitle::new(self.title.unwrap_or_default()));
        let content = errors.check(PostContent::new(self.content.unwrap_or_default()));
        let status = errors.check(
            self.status
                .as_deref()
                .map(str::parse::<PostStatus>)
                .transpose(),
        );

        match (title, content, status) {
            (Some(title), Some(content), Some(status)) => Ok(CreatePost {
                title,
                content,
                status: status.unwrap_or_default(),
            }),
            _ => Err(errors),
        }
    }
}

async fn store(
    PostsPath(): PostsPath,
    actor: Actor,
    State(db): State<Arc<DbClient>>,
    Json(body): Json<StorePostBody>,
) -> Result<Reply<PostResource>> {
    actor.authorize_post(PostAction::Create)?;
    let post = body.validate()?;

    let post = db.create_post(&post, actor.user().id).await?;
    info!(post_id = %post.id, user_id = %actor.user().id, "Created post");

    Ok(Reply::created(
        "Post created successfully.",
        PostResource::from(post),
    ))
}

/// Any authenticated user may read any post by id, regardless of the listing filters.
async fn show(
    PostPath { id }: PostPath,
    actor: Actor,
    State(db): State<Arc<DbClient>>,
) -> Result<Reply<PostResource>> {
    let post = find_post(&db, id).await?;
    actor.authorize_post(PostAction::View(&post))?;

    Ok(Reply::ok(
        "Post retrieved successfully.",
        PostResource::from(post),
    ))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdatePostBody {
    title: Option<String>,
    content: Option<String>,
    status: Option<String>,
}

impl UpdatePostBody {
    fn validate(self) -> Result<PostChanges, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let title = errors.check(self.title.map(PostTitle::new).transpose());
        let content = errors.check(self.content.map(PostContent::new).transpose());
        let status = errors.check(
            self.status
                .as_deref()
                .map(str::parse::<PostStatus>)
                .transpose(),
        );

        match (title, content, status) {
            (Some(title), Some(content), Some(status)) => Ok(PostChanges {
                title,
                content,
                status,
            }),
            _ => Err(errors),
        }
    }
}

async fn update(
    PostPath { id }: PostPath,
    actor: Actor,
    State(db): State<Arc<DbClient>>,
    Json(body): Json<UpdatePostBody>,
) -> Result<Reply<PostResource>> {
    let post = find_post(&db, id).await?;
    actor.authorize_post(PostAction::Update(&post))?;
    let changes = body.validate()?;

    let post = db
        .update_post(id, &changes)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Reply::ok(
        "Post updated successfully.",
        PostResource::from(post),
    ))
}

async fn destroy(
    PostPath { id }: PostPath,
    actor: Actor,
    State(db): State<Arc<DbClient>>,
) -> Result<NoContent> {
    let post = find_post(&db, id).await?;
    actor.authorize_post(PostAction::Delete(&post))?;

    if !db.delete_post(id).await? {
        return Err(ServerError::PostByIdNotFound(id));
    }
    info!(post_id = %id, user_id = %actor.user().id, "Deleted post");

    Ok(NoContent)
}

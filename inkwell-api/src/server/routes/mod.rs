use crate::server::{ServerRouter, method_not_allowed, version::ApiVersion};
use axum::Extension;

mod auth;
mod comments;
mod health;
mod posts;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .merge(health::routes())
        .merge(auth::routes())
        .nest(ApiVersion::V1.prefix(), versioned(ApiVersion::V1))
        .nest(ApiVersion::V2.prefix(), versioned(ApiVersion::V2))
}

/// The posts API of one version. Comments only exist from V2 on.
fn versioned(version: ApiVersion) -> ServerRouter {
    let router = match version {
        ApiVersion::V1 => posts::routes(),
        ApiVersion::V2 => posts::routes().merge(comments::routes()),
    };

    router
        .method_not_allowed_fallback(method_not_allowed)
        .layer(Extension(version))
}

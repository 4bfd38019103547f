use crate::server::{ServerError, ServerRouter, json::Reply};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(up)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/up", rejection(ServerError))]
struct UpPath();

/// Liveness only. Does not touch the database.
async fn up(UpPath(): UpPath) -> Reply<()> {
    Reply::message("Application up.")
}

//! Paginated list payloads with navigation links.

use axum::http::Uri;
use inkwell_common::model::page::{PAGE_SIZE, Page};
use serde::Serialize;

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub links: PageLinks,
    pub meta: PageMeta,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct PageLinks {
    pub first: String,
    pub last: String,
    pub prev: Option<String>,
    pub next: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct PageMeta {
    pub current_page: u64,
    pub from: Option<u64>,
    pub last_page: u64,
    pub path: String,
    pub per_page: u64,
    pub to: Option<u64>,
    pub total: u64,
}

/// Builds page urls for the listing at the request's path.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PageUrls {
    path: String,
    preserved_query: String,
}

impl PageUrls {
    /// `uri` must be the original request uri, before any nesting stripped its prefix.
    #[must_use]
    pub fn new(public_url: &str, uri: &Uri, preserve_query: bool) -> Self {
        let path = format!("{}{}", public_url.trim_end_matches('/'), uri.path());

        let preserved_query = if preserve_query {
            uri.query()
                .unwrap_or_default()
                .split('&')
                .filter(|pair| !pair.is_empty())
                .filter(|pair| pair.split('=').next() != Some("page"))
                .collect::<Vec<_>>()
                .join("&")
        } else {
            String::new()
        };

        Self {
            path,
            preserved_query,
        }
    }

    #[must_use]
    pub fn page(&self, page: u64) -> String {
        if self.preserved_query.is_empty() {
            format!("{}?page={page}", self.path)
        } else {
            format!("{}?{}&page={page}", self.path, self.preserved_query)
        }
    }
}

impl<T> Paginated<T> {
    pub fn new<U>(page: Page<U>, urls: &PageUrls, into_resource: impl FnMut(U) -> T) -> Self {
        let links = PageLinks {
            first: urls.page(1),
            last: urls.page(page.last_page()),
            prev: page.prev_page().map(|prev| urls.page(prev)),
            next: page.next_page().map(|next| urls.page(next)),
        };
        let meta = PageMeta {
            current_page: page.current_page(),
            from: page.from(),
            last_page: page.last_page(),
            path: urls.path.clone(),
            per_page: PAGE_SIZE,
            to: page.to(),
            total: page.total,
        };

        Self {
            data: page.items.into_iter().map(into_resource).collect(),
            links,
            meta,
        }
    }
}

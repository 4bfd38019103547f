//! Which posts an actor gets to see when listing.
//!
//! Listing restrictions are not authorization denials: every authenticated
//! user may list posts, the filter only narrows the result. Fetching a single
//! post by id is never filtered.

use crate::model::{
    Id,
    post::PostStatus,
    user::{Role, User, UserMarker},
};

/// A case-insensitive substring to look for in post titles and contents.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Blank terms search for nothing in particular and are dropped.
    #[must_use]
    pub fn new(term: &str) -> Option<Self> {
        let term = term.trim();
        (!term.is_empty()).then(|| Self(term.to_owned()))
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    /// `ILIKE` pattern matching the term literally anywhere in a value.
    #[must_use]
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.0.len() + 2);
        pattern.push('%');
        for c in self.0.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }
}

/// Conjunction of restrictions applied to a post listing.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct PostFilter {
    pub created_by: Option<Id<UserMarker>>,
    pub status: Option<PostStatus>,
    pub search: Option<SearchTerm>,
}

impl PostFilter {
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Editors see their own posts, viewers see published posts, admins see everything.
    #[must_use]
    pub fn for_actor(actor: &User) -> Self {
        match actor.role {
            Role::Admin => Self::unrestricted(),
            Role::Editor => Self {
                created_by: Some(actor.id),
                ..Self::default()
            },
            Role::Viewer => Self {
                status: Some(PostStatus::Published),
                ..Self::default()
            },
        }
    }

    #[must_use]
    pub fn with_search(self, search: Option<SearchTerm>) -> Self {
        Self { search, ..self }
    }
}

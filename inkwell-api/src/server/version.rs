use crate::server::Settings;

/// Which revision of the posts API a request came in through.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            ApiVersion::V1 => "/v1",
            ApiVersion::V2 => "/v2",
        }
    }

    #[must_use]
    pub fn supports_search(self) -> bool {
        self == ApiVersion::V2
    }

    /// Whether pagination links keep the other query parameters of the request.
    #[must_use]
    pub fn preserves_query_string(self) -> bool {
        self == ApiVersion::V2
    }

    /// The legacy V1 listing skips the `viewAny` check and role filtering.
    #[must_use]
    pub fn restricts_listing(self, settings: &Settings) -> bool {
        !(self == ApiVersion::V1 && settings.v1_legacy_listing)
    }
}

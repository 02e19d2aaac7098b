use axum::http::Uri;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// PageParams
///
/// Query parameters accepted by every list endpoint. Defaults to the first
/// page of 100 rows; `limit` is hard-capped at 100 and rejected above it.
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[serde(default)]
pub struct PageParams {
    #[validate(range(min = 0))]
    pub offset: i64,
    #[validate(range(min = 0, max = 100))]
    pub limit: i64,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 100,
        }
    }
}

/// Pagination metadata echoed back in list envelopes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct Pagination {
    pub offset: i64,
    pub limit: i64,
    pub total: i64,
}

/// Hypermedia link: a `{rel, href}` pair pointing at a related or paginated
/// resource.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

impl Link {
    pub fn new(rel: &str, href: impl Into<String>) -> Self {
        Self {
            rel: rel.to_string(),
            href: href.into(),
        }
    }
}

/// Returns "/v1" when the request came in through the versioned mount, so
/// embedded resource links stay inside the mount the client is using.
pub fn api_prefix(uri: &Uri) -> &'static str {
    if uri.path() == "/v1" || uri.path().starts_with("/v1/") {
        "/v1"
    } else {
        ""
    }
}

/// pagination_links
///
/// Computes the `self`/`prev`/`next` links for a list response.
/// `self` is the request URL unchanged; `next` exists iff
/// `offset + limit < total`; `prev` exists iff `offset > 0`, with its offset
/// clamped to zero so a short first step back never goes negative.
pub fn pagination_links(offset: i64, limit: i64, total: i64, uri: &Uri) -> Vec<Link> {
    let mut links = vec![Link::new("self", uri.to_string())];
    let base = page_base(uri);
    if offset > 0 {
        let prev = (offset - limit).max(0);
        links.push(Link::new("prev", format!("{base}offset={prev}&limit={limit}")));
    }
    if offset + limit < total {
        let next = offset + limit;
        links.push(Link::new("next", format!("{base}offset={next}&limit={limit}")));
    }
    links
}

// Request path plus any non-paging query params, terminated so that
// "offset=..&limit=.." can be appended directly.
fn page_base(uri: &Uri) -> String {
    let mut base = uri.path().to_string();
    let kept: Vec<&str> = uri
        .query()
        .unwrap_or("")
        .split('&')
        .filter(|p| !p.is_empty())
        .filter(|p| {
            let key = p.split('=').next().unwrap_or("");
            key != "offset" && key != "limit"
        })
        .collect();
    base.push('?');
    if !kept.is_empty() {
        base.push_str(&kept.join("&"));
        base.push('&');
    }
    base
}

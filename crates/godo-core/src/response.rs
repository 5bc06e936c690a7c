//! Response wrapper with pagination links and rate-limit bookkeeping.
//!
//! The API reports pagination through a standard `Link` header and quota
//! state through three `RateLimit-*` headers. Both are parsed once, when the
//! [`Response`] is built.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, LINK};
use reqwest::{Method, StatusCode};
use tracing::debug;
use url::{form_urlencoded, Url};

/// Header carrying the request quota for the current window
pub const HEADER_RATE_LIMIT: &str = "ratelimit-limit";

/// Header carrying the requests left in the current window
pub const HEADER_RATE_REMAINING: &str = "ratelimit-remaining";

/// Header carrying the window reset time as Unix epoch seconds
pub const HEADER_RATE_RESET: &str = "ratelimit-reset";

/// Last-reported API quota state.
///
/// All fields are zero-valued until a response carrying rate-limit headers
/// has been seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rate {
    /// Requests allowed per window
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// When the current window resets
    pub reset: Option<DateTime<Utc>>,
}

impl Rate {
    /// Extract the rate snapshot from response headers.
    ///
    /// Returns `None` when none of the rate-limit headers are present. A
    /// present but unparseable component is stored as zero (or no reset).
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let limit = header_str(headers, HEADER_RATE_LIMIT);
        let remaining = header_str(headers, HEADER_RATE_REMAINING);
        let reset = header_str(headers, HEADER_RATE_RESET);

        if limit.is_none() && remaining.is_none() && reset.is_none() {
            return None;
        }

        Some(Self {
            limit: parse_count(HEADER_RATE_LIMIT, limit),
            remaining: parse_count(HEADER_RATE_REMAINING, remaining),
            reset: reset.and_then(|value| {
                let parsed = value
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(|secs| DateTime::from_timestamp(secs, 0));
                if parsed.is_none() {
                    debug!(header = HEADER_RATE_RESET, value, "unparseable rate-limit header");
                }
                parsed
            }),
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn parse_count(name: &str, value: Option<&str>) -> u32 {
    value.map_or(0, |value| {
        value.trim().parse().unwrap_or_else(|_| {
            debug!(header = name, value, "unparseable rate-limit header");
            0
        })
    })
}

/// Pagination URLs parsed from a `Link` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links {
    /// URL of the first page
    pub first: Option<String>,
    /// URL of the previous page
    pub prev: Option<String>,
    /// URL of the next page
    pub next: Option<String>,
    /// URL of the last page
    pub last: Option<String>,
}

impl Links {
    /// Parse a `Link` header value of the form `<URL>; rel="name", ...`.
    ///
    /// Malformed entries are skipped one by one; they never abort parsing of
    /// the remaining entries.
    #[must_use]
    pub fn parse(header: &str) -> Self {
        let mut links = Self::default();

        for entry in header.split(',') {
            let Some((rel, href)) = parse_entry(entry) else {
                continue;
            };
            let slot = match rel {
                "first" => &mut links.first,
                "prev" => &mut links.prev,
                "next" => &mut links.next,
                "last" => &mut links.last,
                _ => continue,
            };
            *slot = Some(href.to_string());
        }

        links
    }

    /// Parse the first `Link` header in `headers`, if any.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .map(Self::parse)
            .unwrap_or_default()
    }

    /// True when there is no `next` relation.
    #[must_use]
    pub const fn is_last_page(&self) -> bool {
        self.next.is_none()
    }

    /// The `page` query parameter of the `next` relation.
    #[must_use]
    pub fn next_page_number(&self) -> Option<u32> {
        self.next.as_deref().and_then(page_number)
    }
}

fn parse_entry(entry: &str) -> Option<(&str, &str)> {
    let mut segments = entry.trim().split(';');

    let href = segments
        .next()?
        .trim()
        .strip_prefix('<')?
        .strip_suffix('>')?;
    page_number(href)?;

    let rel = segments.find_map(|segment| {
        segment
            .trim()
            .strip_prefix("rel=")
            .map(|value| value.trim_matches('"'))
    })?;

    Some((rel, href))
}

// Relative references are valid hrefs, so only the query string is inspected.
fn page_number(href: &str) -> Option<u32> {
    let (_, query) = href.split_once('?')?;
    let query = query.split_once('#').map_or(query, |(query, _)| query);
    let page = form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse::<u32>().ok())?;
    (page > 0).then_some(page)
}

/// A completed API response.
///
/// The body has already been consumed by the time a `Response` exists; what
/// remains is the status, headers and the values derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    method: Method,
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    links: Links,
    rate: Option<Rate>,
}

impl Response {
    /// Wrap response metadata, parsing pagination and rate-limit headers.
    #[must_use]
    pub fn new(method: Method, url: Url, status: StatusCode, headers: HeaderMap) -> Self {
        let links = Links::from_headers(&headers);
        let rate = Rate::from_headers(&headers);
        Self {
            method,
            url,
            status,
            headers,
            links,
            rate,
        }
    }

    /// Method of the request that produced this response.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Final URL of the request that produced this response.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Raw response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Pagination links.
    #[must_use]
    pub const fn links(&self) -> &Links {
        &self.links
    }

    /// Rate snapshot carried by this response, if it had rate-limit headers.
    #[must_use]
    pub const fn rate(&self) -> Option<Rate> {
        self.rate
    }

    /// URL of the first page.
    #[must_use]
    pub fn first_page(&self) -> Option<&str> {
        self.links.first.as_deref()
    }

    /// URL of the previous page.
    #[must_use]
    pub fn prev_page(&self) -> Option<&str> {
        self.links.prev.as_deref()
    }

    /// URL of the next page.
    #[must_use]
    pub fn next_page(&self) -> Option<&str> {
        self.links.next.as_deref()
    }

    /// URL of the last page.
    #[must_use]
    pub fn last_page(&self) -> Option<&str> {
        self.links.last.as_deref()
    }
}

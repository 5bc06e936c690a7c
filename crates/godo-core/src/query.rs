//! Query parameter helpers.
//!
//! [`QueryParams`] collects optional values into URL query pairs, and
//! [`ListOptions`] carries the pagination parameters every list endpoint
//! accepts.

use std::fmt::Display;
use url::form_urlencoded;

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a key/value pair when the value is present.
    pub fn push_opt<T>(&mut self, key: &'static str, value: Option<T>)
    where
        T: ToString,
    {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
    }

    /// Append a required key/value pair.
    pub fn push<T>(&mut self, key: &'static str, value: T)
    where
        T: Display,
    {
        self.pairs.push((key, value.to_string()));
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Append the collected pairs to `path` as a query string.
    #[must_use]
    pub fn append_to(&self, path: &str) -> String {
        if self.pairs.is_empty() {
            return path.to_string();
        }

        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter().map(|(k, v)| (*k, v.as_str())))
            .finish();
        let separator = if path.contains('?') { '&' } else { '?' };
        format!("{path}{separator}{query}")
    }
}

/// Pagination parameters for list endpoints.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Page to fetch, starting at 1.
    pub page: Option<u32>,
    /// Results per page.
    pub per_page: Option<u32>,
}

impl ListOptions {
    /// Options requesting `page`.
    #[must_use]
    pub const fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: None,
        }
    }

    /// Set the page size.
    #[must_use]
    pub const fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Convert the options into URL query pairs.
    #[must_use]
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.push_opt("page", self.page);
        params.push_opt("per_page", self.per_page);
        params
    }

    /// Append the options to `path`.
    #[must_use]
    pub fn apply(&self, path: &str) -> String {
        self.to_params().append_to(path)
    }
}

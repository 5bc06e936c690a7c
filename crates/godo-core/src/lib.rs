//! # godo-core
//!
//! Shared HTTP transport for the DigitalOcean v2 API.
//!
//! Every resource service in the `godo` crate builds its requests and reads
//! its responses through the [`client::ServiceClient`] defined here.
//!
//! ## Modules
//!
//! - [`client`] - Request construction and execution
//! - [`response`] - Response wrapper, pagination links and rate-limit snapshot
//! - [`error`] - Error taxonomy and API error classification
//! - [`config`] - Configuration for building a client
//! - [`query`] - Query parameter helpers and list options
//! - [`stringify`] - Deterministic debug rendering of records
//! - [`timestamp`] - Timestamp scalar accepting RFC 3339 or epoch seconds

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod response;
pub mod stringify;
pub mod timestamp;

pub use client::{ServiceClient, ServiceClientBuilder};
pub use error::{Error, ErrorResponse, FieldError, Result};
pub use response::{Links, Rate, Response};
pub use stringify::Describe;
pub use timestamp::Timestamp;

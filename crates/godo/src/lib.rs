//! DigitalOcean v2 API client.
//!
//! Provides typed resource services (droplets, images, actions, SSH keys,
//! regions and sizes) on top of the shared transport in `godo-core`.
//!
//! ```no_run
//! # async fn run() -> godo::Result<()> {
//! let client = godo::Client::with_token("my-token")?;
//! let (droplets, response) = client.droplets().list(&godo::ListOptions::default()).await?;
//! println!("{} droplets, next page: {:?}", droplets.len(), response.next_page());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod actions;
pub mod client;
pub mod droplet_actions;
pub mod droplets;
pub mod image_actions;
pub mod images;
pub mod keys;
pub mod regions;
pub mod sizes;

pub use actions::{Action, ActionsService, ACTION_COMPLETED, ACTION_IN_PROGRESS};
pub use client::{Client, ClientBuilder, RequestBody};
pub use droplet_actions::{DropletActionRequest, DropletActionsService};
pub use droplets::{
    ActionLinks, Droplet, DropletCreateRequest, DropletCreated, DropletsService, Link, Network,
    Networks, SshKeyRef,
};
pub use godo_core::query::ListOptions;
pub use godo_core::{Error, ErrorResponse, FieldError, Links, Rate, Response, Timestamp};
pub use image_actions::{ImageActionRequest, ImageActionsService};
pub use images::{Image, ImagesService};
pub use keys::{Key, KeyCreateRequest, KeyUpdateRequest, KeysService};
pub use regions::{Region, RegionsService};
pub use sizes::{Size, SizesService};

/// Convenient result alias using the shared error type.
pub type Result<T> = godo_core::Result<T>;

//! Image models and operations.

use crate::client::{resource_path, Client};
use crate::Result;
use godo_core::query::ListOptions;
use godo_core::{describe, Response};
use serde::{Deserialize, Serialize};

pub(crate) const IMAGES_BASE_PATH: &str = "v2/images";

/// A distribution image, snapshot or backup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    /// Image identifier
    pub id: u64,
    /// Display name
    pub name: String,
    /// Distribution, e.g. `Ubuntu`
    pub distribution: String,
    /// Slug for public images
    pub slug: String,
    /// Whether the image is public
    pub public: bool,
    /// Regions the image is available in
    pub regions: Vec<String>,
}

describe!(godo::Image {
    id,
    name,
    distribution,
    slug,
    public,
    regions,
});

#[derive(Deserialize)]
struct ImageRoot {
    image: Image,
}

#[derive(Deserialize)]
struct ImagesRoot {
    images: Vec<Image>,
}

/// Image operations.
#[derive(Debug, Clone, Copy)]
pub struct ImagesService<'a> {
    client: &'a Client,
}

impl<'a> ImagesService<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List all images.
    pub async fn list(&self, opts: &ListOptions) -> Result<(Vec<Image>, Response)> {
        let path = opts.apply(IMAGES_BASE_PATH);
        let (root, response) = self.client.get_json::<ImagesRoot>(&path).await?;
        Ok((root.images, response))
    }

    /// Fetch an image by id.
    pub async fn get(&self, image_id: u64) -> Result<(Image, Response)> {
        self.fetch(&image_id.to_string()).await
    }

    /// Fetch a public image by slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<(Image, Response)> {
        self.fetch(slug).await
    }

    /// Delete an image.
    pub async fn delete(&self, image_id: u64) -> Result<Response> {
        let path = format!("{IMAGES_BASE_PATH}/{image_id}");
        self.client.delete(&path).await
    }

    async fn fetch(&self, id_or_slug: &str) -> Result<(Image, Response)> {
        let path = resource_path(IMAGES_BASE_PATH, id_or_slug)?;
        let (root, response) = self.client.get_json::<ImageRoot>(&path).await?;
        Ok((root.image, response))
    }
}

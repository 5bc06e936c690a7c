//! Actions run against an image.

use crate::actions::{Action, ActionRoot};
use crate::client::Client;
use crate::images::IMAGES_BASE_PATH;
use crate::Result;
use godo_core::Response;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// An image action request, serialized as `{"type": ..., ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageActionRequest {
    /// Copy the image to another region
    Transfer {
        /// Destination region slug
        region: String,
    },
}

/// Image action operations.
#[derive(Debug, Clone, Copy)]
pub struct ImageActionsService<'a> {
    client: &'a Client,
}

impl<'a> ImageActionsService<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Transfer an image to `region`.
    pub async fn transfer(&self, image_id: u64, region: &str) -> Result<(Action, Response)> {
        let path = format!("{IMAGES_BASE_PATH}/{image_id}/actions");
        let request = ImageActionRequest::Transfer {
            region: region.to_string(),
        };
        let (root, response) = self
            .client
            .send_json::<ActionRoot>(Method::POST, &path, Some((&request).into()))
            .await?;
        Ok((root.action, response))
    }

    /// Fetch an action run on an image.
    pub async fn get(&self, image_id: u64, action_id: u64) -> Result<(Action, Response)> {
        let path = format!("{IMAGES_BASE_PATH}/{image_id}/actions/{action_id}");
        let (root, response) = self.client.get_json::<ActionRoot>(&path).await?;
        Ok((root.action, response))
    }
}

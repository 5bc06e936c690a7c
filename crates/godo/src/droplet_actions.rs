//! Actions run against a droplet (power, resize, rename, snapshot).

use crate::actions::{Action, ActionRoot};
use crate::client::Client;
use crate::droplets::DROPLETS_BASE_PATH;
use crate::Result;
use godo_core::Response;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// A droplet action request, serialized as `{"type": ..., ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DropletActionRequest {
    /// Graceful shutdown
    Shutdown,
    /// Hard power off
    PowerOff,
    /// Power on
    PowerOn,
    /// Hard power cycle
    PowerCycle,
    /// Graceful reboot
    Reboot,
    /// Restart
    Restart,
    /// Resize to another size slug
    Resize {
        /// Target size slug
        size: String,
    },
    /// Rename the droplet
    Rename {
        /// New hostname
        name: String,
    },
    /// Take a snapshot image
    Snapshot {
        /// Snapshot name
        name: String,
    },
}

/// Droplet action operations.
#[derive(Debug, Clone, Copy)]
pub struct DropletActionsService<'a> {
    client: &'a Client,
}

impl<'a> DropletActionsService<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Shut a droplet down gracefully.
    pub async fn shutdown(&self, droplet_id: u64) -> Result<(Action, Response)> {
        self.perform(droplet_id, DropletActionRequest::Shutdown).await
    }

    /// Power a droplet off.
    pub async fn power_off(&self, droplet_id: u64) -> Result<(Action, Response)> {
        self.perform(droplet_id, DropletActionRequest::PowerOff).await
    }

    /// Power a droplet on.
    pub async fn power_on(&self, droplet_id: u64) -> Result<(Action, Response)> {
        self.perform(droplet_id, DropletActionRequest::PowerOn).await
    }

    /// Power-cycle a droplet.
    pub async fn power_cycle(&self, droplet_id: u64) -> Result<(Action, Response)> {
        self.perform(droplet_id, DropletActionRequest::PowerCycle).await
    }

    /// Reboot a droplet.
    pub async fn reboot(&self, droplet_id: u64) -> Result<(Action, Response)> {
        self.perform(droplet_id, DropletActionRequest::Reboot).await
    }

    /// Restart a droplet.
    pub async fn restart(&self, droplet_id: u64) -> Result<(Action, Response)> {
        self.perform(droplet_id, DropletActionRequest::Restart).await
    }

    /// Resize a droplet.
    pub async fn resize(&self, droplet_id: u64, size: &str) -> Result<(Action, Response)> {
        let request = DropletActionRequest::Resize {
            size: size.to_string(),
        };
        self.perform(droplet_id, request).await
    }

    /// Rename a droplet.
    pub async fn rename(&self, droplet_id: u64, name: &str) -> Result<(Action, Response)> {
        let request = DropletActionRequest::Rename {
            name: name.to_string(),
        };
        self.perform(droplet_id, request).await
    }

    /// Snapshot a droplet.
    pub async fn snapshot(&self, droplet_id: u64, name: &str) -> Result<(Action, Response)> {
        let request = DropletActionRequest::Snapshot {
            name: name.to_string(),
        };
        self.perform(droplet_id, request).await
    }

    /// Run an arbitrary action request.
    pub async fn perform(
        &self,
        droplet_id: u64,
        request: DropletActionRequest,
    ) -> Result<(Action, Response)> {
        let path = format!("{DROPLETS_BASE_PATH}/{droplet_id}/actions");
        let (root, response) = self
            .client
            .send_json::<ActionRoot>(Method::POST, &path, Some((&request).into()))
            .await?;
        Ok((root.action, response))
    }

    /// Fetch an action run on a droplet.
    pub async fn get(&self, droplet_id: u64, action_id: u64) -> Result<(Action, Response)> {
        let path = format!("{DROPLETS_BASE_PATH}/{droplet_id}/actions/{action_id}");
        self.get_by_uri(&path).await
    }

    /// Fetch an action by the absolute `href` of an action link.
    pub async fn get_by_uri(&self, uri: &str) -> Result<(Action, Response)> {
        let (root, response) = self.client.get_json::<ActionRoot>(uri).await?;
        Ok((root.action, response))
    }
}

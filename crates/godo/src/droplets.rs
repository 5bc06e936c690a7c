//! Droplet models and operations.

use crate::client::Client;
use crate::images::Image;
use crate::regions::Region;
use crate::sizes::Size;
use crate::Result;
use godo_core::query::ListOptions;
use godo_core::stringify::Field;
use godo_core::{describe, Response};
use reqwest::Method;
use serde::{Deserialize, Serialize};

pub(crate) const DROPLETS_BASE_PATH: &str = "v2/droplets";

/// A droplet (virtual machine).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Droplet {
    /// Droplet identifier
    pub id: u64,
    /// Hostname
    pub name: String,
    /// Memory in megabytes
    pub memory: u64,
    /// Virtual CPUs
    pub vcpus: u32,
    /// Disk in gigabytes
    pub disk: u64,
    /// Region the droplet runs in
    pub region: Option<Region>,
    /// Image the droplet was built from
    pub image: Option<Image>,
    /// Size (plan) of the droplet
    pub size: Option<Size>,
    /// Identifiers of backup images
    pub backup_ids: Vec<u64>,
    /// Identifiers of snapshot images
    pub snapshot_ids: Vec<u64>,
    /// Whether the droplet is locked against actions
    pub locked: bool,
    /// Lifecycle status, e.g. `new`, `active`, `off`
    pub status: String,
    /// Attached networks
    pub networks: Option<Networks>,
    /// Identifiers of actions run on the droplet
    pub action_ids: Vec<u64>,
}

describe!(godo::Droplet {
    id,
    name,
    memory,
    vcpus,
    disk,
    region,
    image,
    size,
    backup_ids,
    snapshot_ids,
    locked,
    status,
    networks,
    action_ids,
});

/// Networks attached to a droplet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Networks {
    /// IPv4 interfaces
    pub v4: Vec<Network>,
    /// IPv6 interfaces
    pub v6: Vec<Network>,
}

describe!(godo::Networks { v4, v6 });

/// A single network interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    /// Address assigned to the interface
    pub ip_address: String,
    /// Netmask (IPv4) or prefix (IPv6)
    pub netmask: String,
    /// Gateway address
    pub gateway: String,
    /// `public` or `private`
    #[serde(rename = "type")]
    pub network_type: String,
}

describe!(godo::Network {
    ip_address,
    netmask,
    gateway,
    network_type,
});

/// Action links returned alongside a droplet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionLinks {
    /// Links to actions started by the request
    pub actions: Vec<Link>,
}

impl ActionLinks {
    /// Find the link with relation `rel`.
    #[must_use]
    pub fn action(&self, rel: &str) -> Option<&Link> {
        self.actions.iter().find(|link| link.rel == rel)
    }
}

describe!(godo::ActionLinks { actions });

/// A link to an action resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    /// Action identifier
    pub id: u64,
    /// Relation, e.g. `create`
    pub rel: String,
    /// Absolute URL of the action
    pub href: String,
}

describe!(godo::Link { id, rel, href });

/// An SSH key reference in a create request: either its id or its fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SshKeyRef {
    /// Key identifier
    Id(u64),
    /// Key fingerprint
    Fingerprint(String),
}

impl From<u64> for SshKeyRef {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for SshKeyRef {
    fn from(fingerprint: &str) -> Self {
        Self::Fingerprint(fingerprint.to_string())
    }
}

impl Field for SshKeyRef {
    fn is_zero(&self) -> bool {
        false
    }

    fn render(&self, out: &mut String) {
        match self {
            Self::Id(id) => id.render(out),
            Self::Fingerprint(fingerprint) => fingerprint.render(out),
        }
    }
}

/// Request to create a droplet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropletCreateRequest {
    /// Hostname
    pub name: String,
    /// Region slug
    pub region: String,
    /// Size slug
    pub size: String,
    /// Image slug or id
    pub image: String,
    /// SSH keys to install
    #[serde(default)]
    pub ssh_keys: Vec<SshKeyRef>,
}

describe!(godo::DropletCreateRequest {
    name,
    region,
    size,
    image,
    ssh_keys,
});

/// A newly created droplet and the links to the actions creating it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropletCreated {
    /// The droplet as first reported
    pub droplet: Droplet,
    /// Links to the creation actions
    pub links: ActionLinks,
}

#[derive(Deserialize)]
struct DropletRoot {
    droplet: Droplet,
    #[serde(default)]
    links: Option<ActionLinks>,
}

#[derive(Deserialize)]
struct DropletsRoot {
    droplets: Vec<Droplet>,
}

/// Droplet operations.
#[derive(Debug, Clone, Copy)]
pub struct DropletsService<'a> {
    client: &'a Client,
}

impl<'a> DropletsService<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List all droplets.
    pub async fn list(&self, opts: &ListOptions) -> Result<(Vec<Droplet>, Response)> {
        let path = opts.apply(DROPLETS_BASE_PATH);
        let (root, response) = self.client.get_json::<DropletsRoot>(&path).await?;
        Ok((root.droplets, response))
    }

    /// Fetch a single droplet.
    pub async fn get(&self, droplet_id: u64) -> Result<(Droplet, Response)> {
        let path = format!("{DROPLETS_BASE_PATH}/{droplet_id}");
        let (root, response) = self.client.get_json::<DropletRoot>(&path).await?;
        Ok((root.droplet, response))
    }

    /// Create a droplet.
    pub async fn create(
        &self,
        request: &DropletCreateRequest,
    ) -> Result<(DropletCreated, Response)> {
        let (root, response) = self
            .client
            .send_json::<DropletRoot>(
                Method::POST,
                DROPLETS_BASE_PATH,
                Some(request.into()),
            )
            .await?;

        let created = DropletCreated {
            droplet: root.droplet,
            links: root.links.unwrap_or_default(),
        };
        Ok((created, response))
    }

    /// Delete a droplet.
    pub async fn delete(&self, droplet_id: u64) -> Result<Response> {
        let path = format!("{DROPLETS_BASE_PATH}/{droplet_id}");
        self.client.delete(&path).await
    }
}

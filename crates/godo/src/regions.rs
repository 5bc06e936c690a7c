//! Region listing.

use crate::client::Client;
use crate::Result;
use godo_core::query::ListOptions;
use godo_core::{describe, Response};
use serde::{Deserialize, Serialize};

const REGIONS_BASE_PATH: &str = "v2/regions";

/// A datacenter region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Region {
    /// Region identifier, e.g. `nyc3`
    pub slug: String,
    /// Display name
    pub name: String,
    /// Size slugs available in the region
    pub sizes: Vec<String>,
    /// Whether new droplets can be created here
    pub available: bool,
    /// Optional features such as `backups` or `ipv6`
    pub features: Vec<String>,
}

describe!(godo::Region { slug, name, sizes, available, features });

#[derive(Deserialize)]
struct RegionsRoot {
    regions: Vec<Region>,
}

/// Region operations.
#[derive(Debug, Clone, Copy)]
pub struct RegionsService<'a> {
    client: &'a Client,
}

impl<'a> RegionsService<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List all regions.
    pub async fn list(&self, opts: &ListOptions) -> Result<(Vec<Region>, Response)> {
        let path = opts.apply(REGIONS_BASE_PATH);
        let (root, response) = self.client.get_json::<RegionsRoot>(&path).await?;
        Ok((root.regions, response))
    }
}

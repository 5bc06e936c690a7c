//! Size listing.

use crate::client::Client;
use crate::Result;
use godo_core::query::ListOptions;
use godo_core::{describe, Response};
use serde::{Deserialize, Serialize};

const SIZES_BASE_PATH: &str = "v2/sizes";

/// A droplet size (plan).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Size {
    /// Size identifier, e.g. `512mb`
    pub slug: String,
    /// Memory in megabytes
    pub memory: u64,
    /// Virtual CPUs
    pub vcpus: u32,
    /// Disk in gigabytes
    pub disk: u64,
    /// Monthly transfer allowance in terabytes
    pub transfer: f64,
    /// Monthly price in US dollars
    pub price_monthly: f64,
    /// Hourly price in US dollars
    pub price_hourly: f64,
    /// Regions offering the size
    pub regions: Vec<String>,
}

describe!(godo::Size {
    slug,
    memory,
    vcpus,
    disk,
    transfer,
    price_monthly,
    price_hourly,
    regions,
});

#[derive(Deserialize)]
struct SizesRoot {
    sizes: Vec<Size>,
}

/// Size operations.
#[derive(Debug, Clone, Copy)]
pub struct SizesService<'a> {
    client: &'a Client,
}

impl<'a> SizesService<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List all sizes.
    pub async fn list(&self, opts: &ListOptions) -> Result<(Vec<Size>, Response)> {
        let path = opts.apply(SIZES_BASE_PATH);
        let (root, response) = self.client.get_json::<SizesRoot>(&path).await?;
        Ok((root.sizes, response))
    }
}

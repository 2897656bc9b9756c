//! Resource models and request payloads.
//!
//! Response models default every missing field and keep unknown fields in
//! `extra`, so new API fields never break deserialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A virtual machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Droplet {
    /// Unique droplet id.
    pub id: u64,
    /// Human readable name, also used as hostname.
    pub name: String,
    /// Memory in MB.
    pub memory: u64,
    /// Number of virtual CPUs.
    pub vcpus: u32,
    /// Disk size in GB.
    pub disk: u64,
    /// Whether the droplet is locked against user actions.
    pub locked: bool,
    /// `new`, `active`, `off` or `archive`.
    pub status: String,
    /// Creation time as an ISO 8601 string.
    pub created_at: String,
    /// Enabled features such as `backups`, `ipv6` or `private_networking`.
    pub features: Vec<String>,
    /// Ids of backups taken of this droplet.
    pub backup_ids: Vec<u64>,
    /// Ids of snapshots taken of this droplet.
    pub snapshot_ids: Vec<u64>,
    /// The image the droplet was created from.
    pub image: Option<Image>,
    /// Slug of the droplet's size.
    pub size_slug: Option<String>,
    /// The region the droplet runs in.
    pub region: Option<Region>,
    /// Assigned network interfaces.
    pub networks: Networks,
    /// Tags applied to the droplet.
    pub tags: Vec<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Droplet {
    /// Returns the first public IPv4 address, if one is assigned.
    pub fn public_ipv4(&self) -> Option<&str> {
        self.networks
            .v4
            .iter()
            .find(|n| n.kind == "public")
            .map(|n| n.ip_address.as_str())
    }
}

/// Network interfaces of a droplet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Networks {
    /// IPv4 interfaces.
    pub v4: Vec<NetworkInterface>,
    /// IPv6 interfaces.
    pub v6: Vec<NetworkInterface>,
}

/// One address assigned to a droplet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkInterface {
    /// The address.
    pub ip_address: String,
    /// Dotted netmask for IPv4, prefix length for IPv6.
    pub netmask: Value,
    /// Gateway address.
    pub gateway: String,
    /// `public` or `private`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// A distribution image, application image, snapshot or backup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    /// Unique image id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Base distribution, e.g. `Ubuntu`.
    pub distribution: String,
    /// Slug of a public image; `None` for snapshots and backups.
    pub slug: Option<String>,
    /// Whether the image is available to all accounts.
    pub public: bool,
    /// Region slugs the image is available in.
    pub regions: Vec<String>,
    /// Smallest disk, in GB, a droplet needs to use this image.
    pub min_disk_size: Option<u64>,
    /// Size of the image in GB.
    pub size_gigabytes: Option<f64>,
    /// `snapshot`, `backup` or `custom`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Creation time as an ISO 8601 string.
    pub created_at: String,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Public image categories accepted by `GET images/?type=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    /// Operating system base images.
    Distribution,
    /// One-click application images.
    Application,
}

impl ImageType {
    /// Returns the value sent in the `type` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Distribution => "distribution",
            ImageType::Application => "application",
        }
    }
}

/// An image given by numeric id or by slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    /// A numeric image id.
    Id(u64),
    /// A public image slug such as `ubuntu-22-04-x64`.
    Slug(String),
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::Id(id) => write!(f, "{}", id),
            ImageRef::Slug(slug) => f.write_str(slug),
        }
    }
}

impl From<u64> for ImageRef {
    fn from(id: u64) -> Self {
        ImageRef::Id(id)
    }
}

impl From<&str> for ImageRef {
    fn from(slug: &str) -> Self {
        ImageRef::Slug(slug.to_string())
    }
}

impl From<String> for ImageRef {
    fn from(slug: String) -> Self {
        ImageRef::Slug(slug)
    }
}

/// An SSH public key registered with the account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshKey {
    /// Unique key id.
    pub id: u64,
    /// MD5 fingerprint, usable in place of the id.
    pub fingerprint: String,
    /// The full public key.
    pub public_key: String,
    /// Display name.
    pub name: String,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A droplet size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Size {
    /// Identifier used when creating or resizing droplets.
    pub slug: String,
    /// Memory in MB.
    pub memory: u64,
    /// Number of virtual CPUs.
    pub vcpus: u32,
    /// Disk size in GB.
    pub disk: u64,
    /// Monthly outbound transfer allowance in TB.
    pub transfer: f64,
    /// Monthly price in USD.
    pub price_monthly: f64,
    /// Hourly price in USD.
    pub price_hourly: f64,
    /// Region slugs offering this size.
    pub regions: Vec<String>,
    /// Whether droplets of this size can currently be created.
    pub available: bool,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A datacenter region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Region {
    /// Identifier such as `nyc3`.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Size slugs available in this region.
    pub sizes: Vec<String>,
    /// Features such as `backups` or `ipv6`.
    pub features: Vec<String>,
    /// Whether new droplets can be created here.
    pub available: bool,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A DNS zone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Domain {
    /// The zone name, e.g. `example.com`.
    pub name: String,
    /// Default TTL of the zone's records.
    pub ttl: Option<u64>,
    /// The complete zone file.
    pub zone_file: Option<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A record inside a DNS zone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainRecord {
    /// Unique record id.
    pub id: u64,
    /// `A`, `AAAA`, `CNAME`, `MX`, `TXT`, `NS`, `SRV`, `CAA`.
    #[serde(rename = "type")]
    pub record_type: String,
    /// Host name relative to the zone; `@` is the apex.
    pub name: String,
    /// Record value, e.g. an address or target host.
    pub data: String,
    /// Priority of `MX` and `SRV` records.
    pub priority: Option<u32>,
    /// Port of `SRV` records.
    pub port: Option<u32>,
    /// Time to live in seconds.
    pub ttl: Option<u32>,
    /// Weight of `SRV` records.
    pub weight: Option<u32>,
    /// Flags of `CAA` records.
    pub flags: Option<u8>,
    /// Tag of `CAA` records.
    pub tag: Option<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An asynchronous operation on a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Action {
    /// Unique action id.
    pub id: u64,
    /// `in-progress`, `completed` or `errored`.
    pub status: String,
    /// What the action does, e.g. `power_cycle` or `transfer`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Start time as an ISO 8601 string.
    pub started_at: Option<String>,
    /// Completion time, once finished.
    pub completed_at: Option<String>,
    /// Id of the resource acted on.
    pub resource_id: Option<u64>,
    /// Kind of resource acted on, e.g. `droplet`.
    pub resource_type: Option<String>,
    /// Region the action ran in.
    pub region_slug: Option<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Action {
    /// Returns `true` once the action has finished successfully.
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }
}

/// The account owning the token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    /// Maximum number of droplets.
    pub droplet_limit: u32,
    /// Maximum number of floating IPs.
    pub floating_ip_limit: u32,
    /// Account email address.
    pub email: String,
    /// Unique account id.
    pub uuid: String,
    /// Whether the email address has been verified.
    pub email_verified: bool,
    /// `active`, `warning` or `locked`.
    pub status: String,
    /// Explanation accompanying a non-active status.
    pub status_message: String,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST droplets/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateDroplet {
    /// Droplet name.
    pub name: String,
    /// Region slug.
    pub region: String,
    /// Size slug.
    pub size: String,
    /// Image to boot from.
    pub image: ImageRef,
    /// SSH key ids or fingerprints to install.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ssh_keys: Vec<String>,
    /// Enable automated backups.
    pub backups: bool,
    /// Enable IPv6 networking.
    pub ipv6: bool,
    /// Cloud-init user data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    /// Tags to apply.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl CreateDroplet {
    /// Creates a request with the required fields and no options.
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        size: impl Into<String>,
        image: impl Into<ImageRef>,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            size: size.into(),
            image: image.into(),
            ssh_keys: Vec::new(),
            backups: false,
            ipv6: false,
            user_data: None,
            tags: Vec::new(),
        }
    }

    /// Adds an SSH key by id or fingerprint.
    pub fn with_ssh_key(mut self, key: impl Into<String>) -> Self {
        self.ssh_keys.push(key.into());
        self
    }

    /// Enables or disables automated backups.
    pub fn with_backups(mut self, backups: bool) -> Self {
        self.backups = backups;
        self
    }

    /// Enables or disables IPv6 networking.
    pub fn with_ipv6(mut self, ipv6: bool) -> Self {
        self.ipv6 = ipv6;
        self
    }

    /// Sets the cloud-init user data.
    pub fn with_user_data(mut self, user_data: impl Into<String>) -> Self {
        self.user_data = Some(user_data.into());
        self
    }

    /// Adds a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// Actions accepted by `POST droplets/{id}/actions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DropletAction {
    /// Reboots gracefully.
    Reboot,
    /// Hard reset.
    PowerCycle,
    /// Shuts down gracefully.
    Shutdown,
    /// Powers on a stopped droplet.
    PowerOn,
    /// Hard power off.
    PowerOff,
    /// Resets the root password.
    PasswordReset,
    /// Changes the droplet's size.
    Resize { size: String },
    /// Takes a snapshot with the given name.
    Snapshot { name: String },
    /// Restores one of the droplet's own images.
    Restore { image: ImageRef },
    /// Reinstalls from an image.
    Rebuild { image: ImageRef },
    /// Renames the droplet.
    Rename { name: String },
}

/// Body of `POST account/keys`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateSshKey {
    /// Display name.
    pub name: String,
    /// The full public key.
    pub public_key: String,
}

/// Body of `PUT account/keys/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateSshKey {
    /// New display name.
    pub name: String,
}

/// Body of `PUT images/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateImage {
    /// New display name.
    pub name: String,
}

/// Body of `POST domains/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateDomain {
    /// The zone name.
    pub name: String,
    /// Address of the apex `A` record.
    pub ip_address: String,
}

/// Body of `POST domains/{name}/records` and `PUT domains/{name}/records/{id}`.
///
/// Fields left as `None` are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DomainRecordRequest {
    /// Record type, e.g. `A` or `CNAME`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    /// Host name relative to the zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Record value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Priority of `MX` and `SRV` records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    /// Port of `SRV` records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,
    /// Time to live in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Weight of `SRV` records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    /// Flags of `CAA` records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u8>,
    /// Tag of `CAA` records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl DomainRecordRequest {
    /// Creates a record of `record_type` named `name` pointing at `data`.
    pub fn new(
        record_type: impl Into<String>,
        name: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            record_type: Some(record_type.into()),
            name: Some(name.into()),
            data: Some(data.into()),
            ..Self::default()
        }
    }
}

//! # Core Domain Entities
//!
//! Defines the IPAM data model shared by the engine and its collaborators.
//!
//! ## Clusters
//!
//! - **Address space**: `IpFamily`, `Subnet`
//! - **Occupancy**: `AddressStatus`, `AddressMetadata`, `AddressRecord`
//! - **Reservations**: `Reservation`

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Timestamp in milliseconds since UNIX epoch.
pub type Timestamp = u64;

/// Unique identifier for a declared subnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubnetId(pub Uuid);

impl SubnetId {
    /// Creates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubnetId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubnetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for an address record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    /// Creates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a range reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservationId(pub Uuid);

impl ReservationId {
    /// Creates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReservationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// IP address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IpFamily {
    /// 32-bit IPv4 addresses.
    V4,
    /// 128-bit IPv6 addresses.
    V6,
}

impl IpFamily {
    /// Address width in bits: 32 for IPv4, 128 for IPv6.
    pub fn bit_width(self) -> u8 {
        match self {
            Self::V4 => 32,
            Self::V6 => 128,
        }
    }

    /// Largest legal prefix length for this family.
    pub fn max_prefix(self) -> u8 {
        self.bit_width()
    }
}

impl std::fmt::Display for IpFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V4 => write!(f, "IPv4"),
            Self::V6 => write!(f, "IPv6"),
        }
    }
}

/// Occupancy status of an individual address.
///
/// `Available` is the initial and terminal status; absence of a record for
/// an address is equivalent to it. The four remaining statuses all count
/// as occupied for allocation and conflict purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AddressStatus {
    /// Free for allocation. Equivalent to no record existing.
    #[default]
    Available,
    /// Held by a range reservation.
    Reserved,
    /// Assigned to a host or user.
    Assigned,
    /// Managed by an external DHCP service.
    DhcpManaged,
    /// Statically configured outside the engine.
    StaticManaged,
}

impl AddressStatus {
    /// Returns true for every status that blocks allocation of the address.
    pub fn is_occupied(self) -> bool {
        !matches!(self, Self::Available)
    }
}

impl std::fmt::Display for AddressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Reserved => write!(f, "reserved"),
            Self::Assigned => write!(f, "assigned"),
            Self::DhcpManaged => write!(f, "dhcp-managed"),
            Self::StaticManaged => write!(f, "static-managed"),
        }
    }
}

/// Free-form metadata attached to an address record.
///
/// Every field is cleared when the address is released, regardless of the
/// status the release started from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AddressMetadata {
    /// DNS hostname for the address.
    pub hostname: Option<String>,
    /// Hardware (MAC) address of the occupant.
    pub hardware_address: Option<String>,
    /// Human-readable device name.
    pub device_name: Option<String>,
    /// Person or team the address is assigned to.
    pub assignee: Option<String>,
    /// Free-text note.
    pub note: Option<String>,
}

impl AddressMetadata {
    /// Creates empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hostname.
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Sets the hardware address.
    pub fn with_hardware_address(mut self, hw: impl Into<String>) -> Self {
        self.hardware_address = Some(hw.into());
        self
    }

    /// Sets the device name.
    pub fn with_device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }

    /// Sets the assignee.
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Sets the free-text note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Resets every field to `None`.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A declared subnet.
///
/// Subnets form a forest via `parent`; the engine does not enforce
/// acyclicity, that is the caller's responsibility. The (network, prefix,
/// family) triple is unique; uniqueness is enforced by the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    /// Unique identifier.
    pub id: SubnetId,
    /// Textual network address (canonical form).
    pub network: String,
    /// Prefix length: 0-32 for IPv4, 0-128 for IPv6.
    pub prefix: u8,
    /// Address family of the subnet.
    pub family: IpFamily,
    /// Optional parent subnet.
    pub parent: Option<SubnetId>,
    /// Optional human-readable description.
    pub description: Option<String>,
}

impl Subnet {
    /// Creates a new subnet with a fresh identifier and no parent.
    pub fn new(network: impl Into<String>, prefix: u8, family: IpFamily) -> Self {
        Self {
            id: SubnetId::new(),
            network: network.into(),
            prefix,
            family,
            parent: None,
            description: None,
        }
    }

    /// CIDR notation of the subnet, e.g. `192.168.1.0/24`.
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.network, self.prefix)
    }
}

/// Occupancy record for a single address.
///
/// Created implicitly on first assignment or reservation. The `address`
/// field always holds the canonical textual form and is the unique key
/// within the owning subnet. Releasing resets the record to `Available`
/// with metadata cleared; records are not deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Unique identifier.
    pub id: RecordId,
    /// Canonical textual address (unique key within the subnet).
    pub address: String,
    /// Owning subnet.
    pub subnet_id: SubnetId,
    /// Current occupancy status.
    pub status: AddressStatus,
    /// Occupant metadata; cleared on release.
    pub metadata: AddressMetadata,
    /// Creation timestamp (ms).
    pub created_at: Timestamp,
    /// Last mutation timestamp (ms).
    pub updated_at: Timestamp,
}

impl AddressRecord {
    /// Creates a new record with a fresh identifier.
    pub fn new(
        address: impl Into<String>,
        subnet_id: SubnetId,
        status: AddressStatus,
        metadata: AddressMetadata,
        now: Timestamp,
    ) -> Self {
        Self {
            id: RecordId::new(),
            address: address.into(),
            subnet_id,
            status,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A contiguous range reservation within a subnet.
///
/// Start and end are inclusive, numerically ordered, and both inside the
/// subnet. A reservation does not own its member records: deleting it is a
/// bulk status transition for still-`Reserved` members, not a cascading
/// delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique identifier.
    pub id: ReservationId,
    /// Subnet the range belongs to.
    pub subnet_id: SubnetId,
    /// Canonical first address of the range (inclusive).
    pub start_address: String,
    /// Canonical last address of the range (inclusive).
    pub end_address: String,
    /// Optional purpose of the reservation.
    pub purpose: Option<String>,
    /// Optional owner of the reservation.
    pub owner: Option<String>,
    /// Optional expiry timestamp (ms); `None` means it never expires.
    pub expires_at: Option<Timestamp>,
    /// Creation timestamp (ms).
    pub created_at: Timestamp,
}

impl Reservation {
    /// Creates a new reservation with a fresh identifier.
    pub fn new(
        subnet_id: SubnetId,
        start_address: impl Into<String>,
        end_address: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: ReservationId::new(),
            subnet_id,
            start_address: start_address.into(),
            end_address: end_address.into(),
            purpose: None,
            owner: None,
            expires_at: None,
            created_at: now,
        }
    }

    /// Sets the purpose.
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    /// Sets the owner.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Sets the expiry timestamp.
    pub fn with_expiry(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns true while the reservation blocks allocation.
    ///
    /// A reservation with no expiry is always active; one with an expiry is
    /// active strictly before that instant.
    pub fn is_active(&self, now: Timestamp) -> bool {
        match self.expires_at {
            None => true,
            Some(expiry) => now < expiry,
        }
    }
}

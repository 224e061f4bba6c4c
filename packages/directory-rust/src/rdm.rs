//! Fixed identifiers of the Source Directory domain: filter ids and masks,
//! element names and the enumerated values carried in filter payloads.
//!
//! All of these are standardized and must match an interoperating peer
//! exactly.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use omm_core::wire_enum;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

wire_enum! {
    /// Identifies one sub-record of a service inside a filter list.
    pub enum FilterId: "filter id" {
        Info = 1,
        State = 2,
        Group = 3,
        Load = 4,
        Data = 5,
        Link = 6,
        SeqMcast = 7,
    }
}

impl FilterId {
    /// The bit this filter occupies in a [`FilterMask`].
    #[must_use]
    pub fn mask(self) -> FilterMask {
        FilterMask(1 << (u8::from(self) - 1))
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::State => "State",
            Self::Group => "Group",
            Self::Load => "Load",
            Self::Data => "Data",
            Self::Link => "Link",
            Self::SeqMcast => "SeqMcast",
        }
    }
}

/// Bitwise OR of the filters a requester wants, or a stream carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FilterMask(u32);

impl FilterMask {
    pub const NONE: Self = Self(0);
    pub const INFO: Self = Self(0x01);
    pub const STATE: Self = Self(0x02);
    pub const GROUP: Self = Self(0x04);
    pub const LOAD: Self = Self(0x08);
    pub const DATA: Self = Self(0x10);
    pub const LINK: Self = Self(0x20);
    pub const SEQ_MCAST: Self = Self(0x40);

    /// The mask a directory request asks for when the caller does not choose.
    pub const DEFAULT_REQUEST: Self = Self(0x01 | 0x02 | 0x04);

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for FilterMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for FilterMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<FilterId> for FilterMask {
    fn from(id: FilterId) -> Self {
        id.mask()
    }
}

impl fmt::Display for FilterMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for code in 1..=7_u8 {
            let Ok(id) = FilterId::try_from(code) else {
                continue;
            };
            if self.contains(id.mask()) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(id.name())?;
                first = false;
            }
        }
        if first {
            write!(f, "0x{:x}", self.0)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Element names
// ---------------------------------------------------------------------------

/// Element-list entry names.
pub mod element {
    // Info
    pub const NAME: &str = "Name";
    pub const VENDOR: &str = "Vendor";
    pub const IS_SOURCE: &str = "IsSource";
    pub const CAPABILITIES: &str = "Capabilities";
    pub const DICTIONARIES_PROVIDED: &str = "DictionariesProvided";
    pub const DICTIONARIES_USED: &str = "DictionariesUsed";
    pub const QOS: &str = "QoS";
    pub const SUPPORTS_QOS_RANGE: &str = "SupportsQoSRange";
    pub const ITEM_LIST: &str = "ItemList";
    pub const SUPPORTS_OOB_SNAPSHOTS: &str = "SupportsOutOfBandSnapshots";
    pub const ACCEPTING_CONSUMER_STATUS: &str = "AcceptingConsumerStatus";

    // State
    pub const SERVICE_STATE: &str = "ServiceState";
    pub const ACCEPTING_REQUESTS: &str = "AcceptingRequests";
    pub const STATUS: &str = "Status";

    // Load
    pub const OPEN_LIMIT: &str = "OpenLimit";
    pub const OPEN_WINDOW: &str = "OpenWindow";
    pub const LOAD_FACTOR: &str = "LoadFactor";

    // Data and Link
    pub const TYPE: &str = "Type";
    pub const DATA: &str = "Data";
    pub const LINK_STATE: &str = "LinkState";
    pub const LINK_CODE: &str = "LinkCode";
    pub const TEXT: &str = "Text";

    // Group
    pub const GROUP: &str = "Group";
    pub const MERGED_TO_GROUP: &str = "MergedToGroup";

    // SeqMcast
    pub const SNAPSHOT_SERVER_HOST: &str = "SnapshotServerHost";
    pub const SNAPSHOT_SERVER_PORT: &str = "SnapshotServerPort";
    pub const GAP_RECOVERY_SERVER_HOST: &str = "GapRecoveryServerHost";
    pub const GAP_RECOVERY_SERVER_PORT: &str = "GapRecoveryServerPort";
    pub const REFERENCE_DATA_SERVER_HOST: &str = "ReferenceDataServerHost";
    pub const REFERENCE_DATA_SERVER_PORT: &str = "ReferenceDataServerPort";
    pub const STREAMING_MCAST_CHANNELS: &str = "StreamingMulticastChannels";
    pub const GAP_MCAST_CHANNELS: &str = "GapMulticastChannels";
    pub const MULTICAST_GROUP: &str = "MulticastGroup";
    pub const PORT: &str = "Port";
    pub const DOMAIN: &str = "Domain";

    // Consumer status
    pub const SOURCE_MIRRORING_MODE: &str = "SourceMirroringMode";
}

/// Key name of the generic message that carries consumer status.
pub const CONSUMER_STATUS_NAME: &str = "ConsumerStatus";

// ---------------------------------------------------------------------------
// Enumerated element values
// ---------------------------------------------------------------------------

wire_enum! {
    /// Whether a service is up.
    #[derive(Default)]
    pub enum ServiceStateValue: "service state" {
        Down = 0,
        #[default]
        Up = 1,
    }
}

wire_enum! {
    #[derive(Default)]
    pub enum LinkType: "link type" {
        #[default]
        Interactive = 1,
        Broadcast = 2,
    }
}

wire_enum! {
    #[derive(Default)]
    pub enum LinkState: "link state" {
        #[default]
        Down = 0,
        Up = 1,
    }
}

wire_enum! {
    #[derive(Default)]
    pub enum LinkCode: "link code" {
        #[default]
        None = 0,
        Ok = 1,
        RecoveryStarted = 2,
        RecoveryCompleted = 3,
    }
}

wire_enum! {
    /// A consumer's declared active/standby relationship to a service.
    #[derive(Default)]
    pub enum SourceMirroringMode: "source mirroring mode" {
        #[default]
        ActiveNoStandby = 0,
        ActiveWithStandby = 1,
        Standby = 2,
    }
}

wire_enum! {
    /// Well-known values of the Data filter's `Type` element.
    pub enum DataFilterType: "data filter type" {
        None = 0,
        Time = 1,
        Alert = 2,
        Headline = 3,
        Status = 4,
    }
}

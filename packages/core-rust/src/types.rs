//! Standardized enumerations and small value types shared by every OMM domain.
//!
//! The numeric codes below are fixed by the wire standard and must match an
//! interoperating peer bit-for-bit. Each enum serializes as its `u8` code.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Declares a `u8`-coded wire enumeration.
///
/// Generates the enum with `Debug`/`Clone`/`Copy`/`Eq`/`Hash`, a `u8`
/// conversion in both directions and `from_uint` for values carried in
/// unsigned-integer fields. Unknown codes are rejected with
/// `CodecError::InvalidValue`.
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $code ),+
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }

        impl TryFrom<u8> for $name {
            type Error = $crate::CodecError;

            fn try_from(code: u8) -> Result<Self, $crate::CodecError> {
                match code {
                    $( $code => Ok(Self::$variant), )+
                    other => Err($crate::CodecError::InvalidValue {
                        kind: $kind,
                        value: u64::from(other),
                    }),
                }
            }
        }

        impl $name {
            /// Converts a value decoded from an unsigned-integer field.
            ///
            /// # Errors
            ///
            /// Returns `CodecError::InvalidValue` for a value that names no
            /// variant.
            pub fn from_uint(value: u64) -> Result<Self, $crate::CodecError> {
                let code = u8::try_from(value)
                    .map_err(|_| $crate::CodecError::InvalidValue { kind: $kind, value })?;
                Self::try_from(code)
            }

            /// The wire code as an unsigned integer.
            #[must_use]
            pub fn as_uint(self) -> u64 {
                u64::from(self as u8)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

wire_enum! {
    /// Type codes for primitives and containers.
    #[derive(Serialize, Deserialize)]
    #[serde(into = "u8", try_from = "u8")]
    pub enum DataType: "data type" {
        Unknown = 0,
        Int = 3,
        UInt = 4,
        Float = 5,
        Double = 6,
        Real = 8,
        Date = 9,
        Time = 10,
        DateTime = 11,
        Qos = 12,
        State = 13,
        Enum = 14,
        Array = 15,
        Buffer = 16,
        AsciiString = 17,
        Utf8String = 18,
        RmtesString = 19,
        NoData = 128,
        Opaque = 130,
        Xml = 131,
        FieldList = 132,
        ElementList = 133,
        AnsiPage = 134,
        FilterList = 135,
        Vector = 136,
        Map = 137,
        Series = 138,
        Msg = 141,
        Json = 142,
    }
}

impl DataType {
    /// Whether this code names a container rather than a primitive.
    #[must_use]
    pub fn is_container(self) -> bool {
        u8::from(self) >= 128
    }
}

wire_enum! {
    /// Message domains. Only `Source` is produced by the directory protocol;
    /// the others appear as service capabilities.
    #[derive(Serialize, Deserialize)]
    #[serde(into = "u8", try_from = "u8")]
    pub enum DomainType: "domain type" {
        Login = 1,
        Source = 4,
        Dictionary = 5,
        MarketPrice = 6,
        MarketByOrder = 7,
        MarketByPrice = 8,
        MarketMaker = 9,
        SymbolList = 10,
        ServiceProviderStatus = 11,
        History = 12,
        Headline = 13,
        Story = 14,
        Replayheadline = 15,
        Replaystory = 16,
        Transaction = 17,
        YieldCurve = 22,
        Contribution = 27,
        Provider = 29,
        Analytics = 31,
        Reference = 32,
        NewsTextAnalytics = 33,
        SystemDomain = 127,
    }
}

// ---------------------------------------------------------------------------
// Entry actions
// ---------------------------------------------------------------------------

wire_enum! {
    /// Action attached to a map entry. Governs whether a payload follows.
    #[derive(Serialize, Deserialize, Default)]
    #[serde(into = "u8", try_from = "u8")]
    pub enum MapEntryAction: "map entry action" {
        Update = 1,
        #[default]
        Add = 2,
        Delete = 3,
    }
}

wire_enum! {
    /// Action attached to a filter-list entry. `Clear` carries no payload.
    #[derive(Serialize, Deserialize, Default)]
    #[serde(into = "u8", try_from = "u8")]
    pub enum FilterEntryAction: "filter entry action" {
        Update = 1,
        #[default]
        Set = 2,
        Clear = 3,
    }
}

wire_enum! {
    /// Action attached to a vector entry. `Clear` and `Delete` carry no payload.
    #[derive(Serialize, Deserialize, Default)]
    #[serde(into = "u8", try_from = "u8")]
    pub enum VectorEntryAction: "vector entry action" {
        Update = 1,
        #[default]
        Set = 2,
        Clear = 3,
        Insert = 4,
        Delete = 5,
    }
}

impl VectorEntryAction {
    /// Whether an entry with this action carries a payload.
    #[must_use]
    pub fn has_payload(self) -> bool {
        !matches!(self, Self::Clear | Self::Delete)
    }
}

// ---------------------------------------------------------------------------
// Stream state
// ---------------------------------------------------------------------------

wire_enum! {
    #[derive(Serialize, Deserialize, Default)]
    #[serde(into = "u8", try_from = "u8")]
    pub enum StreamState: "stream state" {
        Unspecified = 0,
        #[default]
        Open = 1,
        NonStreaming = 2,
        ClosedRecover = 3,
        Closed = 4,
        Redirected = 5,
    }
}

wire_enum! {
    #[derive(Serialize, Deserialize, Default)]
    #[serde(into = "u8", try_from = "u8")]
    pub enum DataState: "data state" {
        NoChange = 0,
        #[default]
        Ok = 1,
        Suspect = 2,
    }
}

wire_enum! {
    /// Additional detail on a [`State`].
    #[derive(Serialize, Deserialize, Default)]
    #[serde(into = "u8", try_from = "u8")]
    pub enum StateCode: "state code" {
        #[default]
        None = 0,
        NotFound = 1,
        Timeout = 2,
        NotEntitled = 3,
        InvalidArgument = 4,
        UsageError = 5,
        Preempted = 6,
        JitConflationStarted = 7,
        RealtimeResumed = 8,
        FailoverStarted = 9,
        FailoverCompleted = 10,
        GapDetected = 11,
        NoResources = 12,
        TooManyItems = 13,
        AlreadyOpen = 14,
        SourceUnknown = 15,
        NotOpen = 16,
        NonUpdatingItem = 19,
        UnsupportedViewType = 20,
        InvalidView = 21,
        FullViewProvided = 22,
        UnableToRequestAsBatch = 23,
        NoBatchViewSupportInReq = 26,
        ExceededMaxMountsPerUser = 27,
        Error = 28,
        DacsDown = 29,
        UserUnknownToPermSys = 30,
        DacsMaxLoginsReached = 31,
        DacsUserAccessToAppDenied = 32,
        GapFill = 34,
        AppAuthorizationFailed = 35,
    }
}

/// Full stream state: stream/data state, a code and free text.
///
/// Defaults to Open/Ok/None with empty text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub stream_state: StreamState,
    pub data_state: DataState,
    pub code: StateCode,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub text: String,
}

impl State {
    #[must_use]
    pub fn new(stream_state: StreamState, data_state: DataState) -> Self {
        Self {
            stream_state,
            data_state,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: StateCode) -> Self {
        self.code = code;
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Quality of service
// ---------------------------------------------------------------------------

wire_enum! {
    #[derive(Serialize, Deserialize, Default)]
    #[serde(into = "u8", try_from = "u8")]
    pub enum QosTimeliness: "qos timeliness" {
        #[default]
        Unspecified = 0,
        Realtime = 1,
        DelayedUnknown = 2,
        Delayed = 3,
    }
}

wire_enum! {
    #[derive(Serialize, Deserialize, Default)]
    #[serde(into = "u8", try_from = "u8")]
    pub enum QosRate: "qos rate" {
        #[default]
        Unspecified = 0,
        TickByTick = 1,
        JitConflated = 2,
        TimeConflated = 3,
    }
}

/// A (timeliness, rate) descriptor of how current and how frequent a
/// service's data is.
///
/// `time_info` is the delay in seconds and is only meaningful for
/// [`QosTimeliness::Delayed`]; `rate_info` is the conflation interval in
/// milliseconds and is only meaningful for [`QosRate::TimeConflated`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Qos {
    pub timeliness: QosTimeliness,
    pub rate: QosRate,
    #[serde(default)]
    pub dynamic: bool,
    #[serde(default)]
    pub time_info: u16,
    #[serde(default)]
    pub rate_info: u16,
}

impl Qos {
    /// Realtime, tick-by-tick.
    #[must_use]
    pub fn realtime_tick_by_tick() -> Self {
        Self {
            timeliness: QosTimeliness::Realtime,
            rate: QosRate::TickByTick,
            ..Self::default()
        }
    }

    /// Ordering key where a smaller tuple is a better quality of service.
    ///
    /// Realtime beats any delay, a known delay beats an unknown one, and
    /// unspecified is worst. For rate, tick-by-tick beats time conflation,
    /// which beats just-in-time conflation. Shorter delays and shorter
    /// conflation intervals win ties.
    fn rank(&self) -> (u8, u16, u8, u16) {
        let (timeliness_rank, delay) = match self.timeliness {
            QosTimeliness::Realtime => (0, 0),
            QosTimeliness::Delayed => (1, self.time_info),
            QosTimeliness::DelayedUnknown => (2, 0),
            QosTimeliness::Unspecified => (3, 0),
        };
        let (rate_rank, interval) = match self.rate {
            QosRate::TickByTick => (0, 0),
            QosRate::TimeConflated => (1, self.rate_info),
            QosRate::JitConflated => (2, 0),
            QosRate::Unspecified => (3, 0),
        };
        (timeliness_rank, delay, rate_rank, interval)
    }

    /// Returns `true` when `self` is strictly better than `other`.
    #[must_use]
    pub fn is_better(&self, other: &Qos) -> bool {
        self.rank() < other.rank()
    }

    /// Compares two QoS values so that the better one sorts greater.
    #[must_use]
    pub fn quality_cmp(&self, other: &Qos) -> Ordering {
        other.rank().cmp(&self.rank())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

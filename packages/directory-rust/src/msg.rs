//! [`DirectoryMsg`]: one value over the six directory message variants.

use std::fmt;

use omm_core::{Msg, MsgClass, MsgFlags};

use crate::error::DirectoryError;
use crate::messages::{
    DirectoryClose, DirectoryConsumerStatus, DirectoryRefresh, DirectoryRequest, DirectoryStatus,
    DirectoryUpdate,
};

/// Which variant a [`DirectoryMsg`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryMsgType {
    Request,
    Refresh,
    Update,
    Status,
    Close,
    ConsumerStatus,
}

impl DirectoryMsgType {
    /// Transport class the variant travels as.
    #[must_use]
    pub fn msg_class(self) -> MsgClass {
        match self {
            Self::Request => MsgClass::Request,
            Self::Refresh => MsgClass::Refresh,
            Self::Update => MsgClass::Update,
            Self::Status => MsgClass::Status,
            Self::Close => MsgClass::Close,
            Self::ConsumerStatus => MsgClass::Generic,
        }
    }

    /// The variant carried by a transport class. Every generic message on
    /// the directory stream is treated as consumer status.
    #[must_use]
    pub fn from_msg_class(class: MsgClass) -> Self {
        match class {
            MsgClass::Request => Self::Request,
            MsgClass::Refresh => Self::Refresh,
            MsgClass::Update => Self::Update,
            MsgClass::Status => Self::Status,
            MsgClass::Close => Self::Close,
            MsgClass::Generic => Self::ConsumerStatus,
        }
    }
}

/// A directory message of any kind.
///
/// Only the active variant exists. Use the `as_*` accessors to reach it;
/// they return `None` for every other kind.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryMsg {
    Request(DirectoryRequest),
    Refresh(DirectoryRefresh),
    Update(DirectoryUpdate),
    Status(DirectoryStatus),
    Close(DirectoryClose),
    ConsumerStatus(DirectoryConsumerStatus),
}

macro_rules! accessors {
    ($($variant:ident: $ty:ty => $get:ident, $get_mut:ident;)*) => {
        $(
            #[must_use]
            pub fn $get(&self) -> Option<&$ty> {
                match self {
                    Self::$variant(msg) => Some(msg),
                    _ => None,
                }
            }

            pub fn $get_mut(&mut self) -> Option<&mut $ty> {
                match self {
                    Self::$variant(msg) => Some(msg),
                    _ => None,
                }
            }
        )*
    };
}

impl DirectoryMsg {
    /// A cleared message of the given kind.
    #[must_use]
    pub fn new(msg_type: DirectoryMsgType) -> Self {
        match msg_type {
            DirectoryMsgType::Request => Self::Request(DirectoryRequest::default()),
            DirectoryMsgType::Refresh => Self::Refresh(DirectoryRefresh::default()),
            DirectoryMsgType::Update => Self::Update(DirectoryUpdate::default()),
            DirectoryMsgType::Status => Self::Status(DirectoryStatus::default()),
            DirectoryMsgType::Close => Self::Close(DirectoryClose::default()),
            DirectoryMsgType::ConsumerStatus => {
                Self::ConsumerStatus(DirectoryConsumerStatus::default())
            }
        }
    }

    #[must_use]
    pub fn msg_type(&self) -> DirectoryMsgType {
        match self {
            Self::Request(_) => DirectoryMsgType::Request,
            Self::Refresh(_) => DirectoryMsgType::Refresh,
            Self::Update(_) => DirectoryMsgType::Update,
            Self::Status(_) => DirectoryMsgType::Status,
            Self::Close(_) => DirectoryMsgType::Close,
            Self::ConsumerStatus(_) => DirectoryMsgType::ConsumerStatus,
        }
    }

    /// Switches to `msg_type`. Selecting the active kind keeps its contents;
    /// any other kind starts cleared.
    pub fn set_msg_type(&mut self, msg_type: DirectoryMsgType) {
        if self.msg_type() != msg_type {
            *self = Self::new(msg_type);
        }
    }

    accessors! {
        Request: DirectoryRequest => as_request, as_request_mut;
        Refresh: DirectoryRefresh => as_refresh, as_refresh_mut;
        Update: DirectoryUpdate => as_update, as_update_mut;
        Status: DirectoryStatus => as_status, as_status_mut;
        Close: DirectoryClose => as_close, as_close_mut;
        ConsumerStatus: DirectoryConsumerStatus => as_consumer_status, as_consumer_status_mut;
    }

    #[must_use]
    pub fn stream_id(&self) -> i32 {
        match self {
            Self::Request(msg) => msg.stream_id,
            Self::Refresh(msg) => msg.stream_id,
            Self::Update(msg) => msg.stream_id,
            Self::Status(msg) => msg.stream_id,
            Self::Close(msg) => msg.stream_id,
            Self::ConsumerStatus(msg) => msg.stream_id,
        }
    }

    pub fn set_stream_id(&mut self, stream_id: i32) {
        match self {
            Self::Request(msg) => msg.stream_id = stream_id,
            Self::Refresh(msg) => msg.stream_id = stream_id,
            Self::Update(msg) => msg.stream_id = stream_id,
            Self::Status(msg) => msg.stream_id = stream_id,
            Self::Close(msg) => msg.stream_id = stream_id,
            Self::ConsumerStatus(msg) => msg.stream_id = stream_id,
        }
    }

    /// Transport flags the active variant encodes with.
    #[must_use]
    pub fn flags(&self) -> MsgFlags {
        match self {
            Self::Request(msg) => msg.flags(),
            Self::Refresh(msg) => msg.flags(),
            Self::Update(msg) => msg.flags(),
            Self::Status(msg) => msg.flags(),
            Self::Close(_) | Self::ConsumerStatus(_) => MsgFlags::default(),
        }
    }

    /// Clears the active variant.
    pub fn clear(&mut self) {
        match self {
            Self::Request(msg) => msg.clear(),
            Self::Refresh(msg) => msg.clear(),
            Self::Update(msg) => msg.clear(),
            Self::Status(msg) => msg.clear(),
            Self::Close(msg) => msg.clear(),
            Self::ConsumerStatus(msg) => msg.clear(),
        }
    }

    /// Encodes the active variant.
    ///
    /// # Errors
    ///
    /// Returns the active variant's encode error.
    pub fn encode(&self) -> Result<Msg, DirectoryError> {
        match self {
            Self::Request(msg) => msg.encode(),
            Self::Refresh(msg) => msg.encode(),
            Self::Update(msg) => msg.encode(),
            Self::Status(msg) => msg.encode(),
            Self::Close(msg) => msg.encode(),
            Self::ConsumerStatus(msg) => msg.encode(),
        }
    }

    /// Decodes `msg` into a new value of the kind its class selects.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when `msg` is not on the Source domain, or
    /// its key or payload does not fit the selected kind.
    pub fn decode(msg: &Msg) -> Result<Self, DirectoryError> {
        let mut decoded = Self::new(DirectoryMsgType::from_msg_class(msg.msg_class));
        decoded.decode_into(msg)?;
        Ok(decoded)
    }

    /// Decodes `msg` in place, reusing the active variant's allocations when
    /// the kind does not change.
    ///
    /// # Errors
    ///
    /// Returns the selected variant's decode error, leaving that variant
    /// cleared.
    pub fn decode_into(&mut self, msg: &Msg) -> Result<(), DirectoryError> {
        self.set_msg_type(DirectoryMsgType::from_msg_class(msg.msg_class));
        match self {
            Self::Request(target) => target.decode(msg),
            Self::Refresh(target) => target.decode(msg),
            Self::Update(target) => target.decode(msg),
            Self::Status(target) => target.decode(msg),
            Self::Close(target) => target.decode(msg),
            Self::ConsumerStatus(target) => target.decode(msg),
        }
    }
}

impl Default for DirectoryMsg {
    fn default() -> Self {
        Self::new(DirectoryMsgType::Request)
    }
}

impl fmt::Display for DirectoryMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} stream={}", self.msg_type(), self.stream_id())?;
        match self {
            Self::Request(msg) => {
                write!(f, " filter={}", msg.filter)?;
                if let Some(service_id) = msg.service_id {
                    write!(f, " service={service_id}")?;
                }
                if msg.streaming {
                    f.write_str(" streaming")?;
                }
                Ok(())
            }
            Self::Refresh(msg) => write!(
                f,
                " filter={} services={} state={:?}/{:?}{}{}",
                msg.filter,
                msg.services.len(),
                msg.state.stream_state,
                msg.state.data_state,
                if msg.solicited { " solicited" } else { "" },
                if msg.clear_cache { " clear-cache" } else { "" },
            ),
            Self::Update(msg) => write!(f, " services={}", msg.services.len()),
            Self::Status(msg) => match &msg.state {
                Some(state) => write!(f, " state={:?}/{:?}", state.stream_state, state.data_state),
                None => Ok(()),
            },
            Self::Close(_) => Ok(()),
            Self::ConsumerStatus(msg) => write!(f, " services={}", msg.services.len()),
        }
    }
}

macro_rules! from_variant {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for DirectoryMsg {
                fn from(msg: $ty) -> Self {
                    Self::$variant(msg)
                }
            }
        )*
    };
}

from_variant!(
    Request(DirectoryRequest),
    Refresh(DirectoryRefresh),
    Update(DirectoryUpdate),
    Status(DirectoryStatus),
    Close(DirectoryClose),
    ConsumerStatus(DirectoryConsumerStatus),
);

use omm_core::{DomainType, Msg, MsgClass, MsgFlags, State};
use tracing::trace;

use super::{build_key, decode_cleared, key_service_id};
use crate::error::DirectoryError;
use crate::rdm::FilterMask;
use crate::wire;

/// Stream-level state change with no service payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectoryStatus {
    pub stream_id: i32,
    pub filter: Option<FilterMask>,
    pub service_id: Option<u32>,
    pub state: Option<State>,
    pub clear_cache: bool,
}

impl DirectoryStatus {
    #[must_use]
    pub fn new(stream_id: i32, state: State) -> Self {
        Self {
            stream_id,
            state: Some(state),
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn flags(&self) -> MsgFlags {
        MsgFlags {
            clear_cache: self.clear_cache,
            ..MsgFlags::default()
        }
    }

    /// # Errors
    ///
    /// Returns [`DirectoryError::ServiceIdOutOfRange`] when the key's service
    /// id is above 65535.
    pub fn encode(&self) -> Result<Msg, DirectoryError> {
        trace!(stream_id = self.stream_id, "encoding directory status");
        let mut msg = Msg::new(MsgClass::Status, DomainType::Source, self.stream_id);
        msg.key = build_key(self.filter, self.service_id)?;
        msg.flags = self.flags();
        msg.state.clone_from(&self.state);
        Ok(msg)
    }

    /// Resets `self`, then fills it from `msg`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::WrongMsgClass`] or
    /// [`DirectoryError::WrongDomain`] when `msg` is not a Source-domain
    /// status, and [`DirectoryError::InvalidValue`] for a key service id above 65535. `self` is left cleared on failure.
    pub fn decode(&mut self, msg: &Msg) -> Result<(), DirectoryError> {
        trace!(stream_id = msg.stream_id, "decoding directory status");
        decode_cleared(self, Self::clear, |this| {
            wire::expect_message(msg, MsgClass::Status)?;
            this.stream_id = msg.stream_id;
            this.clear_cache = msg.flags.clear_cache;
            this.state.clone_from(&msg.state);
            if let Some(key) = &msg.key {
                this.filter = key.filter.map(FilterMask::from_bits);
                this.service_id = key_service_id(key)?;
            }
            Ok(())
        })
    }
}

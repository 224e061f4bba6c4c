use omm_core::{DomainType, Msg, MsgClass};
use tracing::trace;

use super::decode_cleared;
use crate::error::DirectoryError;
use crate::wire;

/// Ends a directory stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectoryClose {
    pub stream_id: i32,
}

impl DirectoryClose {
    #[must_use]
    pub fn new(stream_id: i32) -> Self {
        Self { stream_id }
    }

    pub fn clear(&mut self) {
        self.stream_id = 0;
    }

    /// # Errors
    ///
    /// Never fails; the `Result` matches the other message kinds.
    pub fn encode(&self) -> Result<Msg, DirectoryError> {
        trace!(stream_id = self.stream_id, "encoding directory close");
        Ok(Msg::new(MsgClass::Close, DomainType::Source, self.stream_id))
    }

    /// Resets `self`, then fills it from `msg`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::WrongMsgClass`] or
    /// [`DirectoryError::WrongDomain`] when `msg` is not a Source-domain
    /// close. `self` is left cleared on failure.
    pub fn decode(&mut self, msg: &Msg) -> Result<(), DirectoryError> {
        decode_cleared(self, Self::clear, |this| {
            wire::expect_message(msg, MsgClass::Close)?;
            this.stream_id = msg.stream_id;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_roundtrip() {
        let mut decoded = DirectoryClose::default();
        decoded.decode(&DirectoryClose::new(5).encode().unwrap()).unwrap();
        assert_eq!(decoded.stream_id, 5);
    }

    #[test]
    fn request_is_not_a_close() {
        let msg = Msg::new(MsgClass::Request, DomainType::Source, 5);
        let mut close = DirectoryClose::new(1);
        assert!(matches!(
            close.decode(&msg),
            Err(DirectoryError::WrongMsgClass { .. })
        ));
        assert_eq!(close.stream_id, 0);
    }
}

//! Transport message envelope.
//!
//! A [`Msg`] is what travels between a provider and a consumer: a message
//! class, a domain, a stream id, an optional key and the class-specific
//! flags, wrapping a [`Data`] payload. Envelopes serialize as named
//! `MsgPack` via `rmp_serde::to_vec_named()`.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::codec::Data;
use crate::error::CodecError;
use crate::types::{DataType, DomainType, State};
use crate::wire_enum;

wire_enum! {
    /// Message classes used by the directory protocol.
    #[derive(Serialize, Deserialize)]
    #[serde(into = "u8", try_from = "u8")]
    pub enum MsgClass: "message class" {
        Request = 1,
        Refresh = 2,
        Status = 3,
        Update = 4,
        Close = 5,
        Generic = 7,
    }
}

/// Identifies what a stream is about. Every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgKey {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub service_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub filter: Option<u32>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Class-specific boolean flags. Unset flags are omitted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgFlags {
    /// Request: keep the stream open after the refresh.
    #[serde(skip_serializing_if = "is_false", default)]
    pub streaming: bool,
    /// Refresh: sent in answer to a request.
    #[serde(skip_serializing_if = "is_false", default)]
    pub solicited: bool,
    /// Refresh/Status: receiver must drop what it holds for the stream.
    #[serde(skip_serializing_if = "is_false", default)]
    pub clear_cache: bool,
    /// Refresh: last part of a (possibly multi-part) refresh.
    #[serde(skip_serializing_if = "is_false", default)]
    pub refresh_complete: bool,
    /// Update: transport must not coalesce this message with others.
    #[serde(skip_serializing_if = "is_false", default)]
    pub do_not_conflate: bool,
}

/// One message on a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Msg {
    pub msg_class: MsgClass,
    pub domain: DomainType,
    pub stream_id: i32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub key: Option<MsgKey>,
    #[serde(default)]
    pub flags: MsgFlags,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub state: Option<State>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub seq_num: Option<u32>,
    #[serde(default)]
    pub payload: Data,
}

impl Msg {
    /// An empty message of the given class on `stream_id`.
    #[must_use]
    pub fn new(msg_class: MsgClass, domain: DomainType, stream_id: i32) -> Self {
        Self {
            msg_class,
            domain,
            stream_id,
            key: None,
            flags: MsgFlags::default(),
            state: None,
            seq_num: None,
            payload: Data::NoData,
        }
    }

    /// Type of the payload container.
    #[must_use]
    pub fn container_type(&self) -> DataType {
        self.payload.data_type()
    }

    /// Serializes the envelope and its payload.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] when serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        trace!(
            class = ?self.msg_class,
            stream_id = self.stream_id,
            "encoding message"
        );
        Ok(rmp_serde::to_vec_named(self)?)
    }

    /// Parses an envelope produced by [`Msg::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] when `bytes` is not a valid envelope.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let msg: Self = rmp_serde::from_slice(bytes)?;
        trace!(
            class = ?msg.msg_class,
            stream_id = msg.stream_id,
            len = bytes.len(),
            "decoded message"
        );
        Ok(msg)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Self-describing container codec.
//!
//! A payload is a tree of [`Data`] values. Containers ([`Map`], [`FilterList`],
//! [`ElementList`], [`OmmArray`], [`Vector`]) are built with begin/entry/end
//! encoders and walked with validating iterators. Iterator exhaustion is the
//! end-of-container status; a malformed entry surfaces as `Some(Err(_))`.
//!
//! # Wire format
//!
//! The tree serializes through `rmp_serde` as named `MsgPack`, so every node
//! carries its own type tag and entry actions travel as their standard
//! integer codes.

mod containers;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::types::{Qos, State};

pub use crate::types::DataType;
pub use containers::{
    ArrayEncoder, ElementEntry, ElementList, ElementListEncoder, FilterEntry, FilterEntries,
    FilterList, FilterListEncoder, Map, MapEncoder, MapEntries, MapEntry, MapKey, OmmArray,
    Vector, VectorEncoder, VectorEntries, VectorEntry,
};

/// One node of an encoded payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Data {
    /// No payload at all.
    #[default]
    NoData,
    /// A primitive of the given type whose value was left blank.
    Blank(DataType),
    UInt(u64),
    Int(i64),
    Ascii(String),
    Buffer(#[serde(with = "serde_bytes")] Vec<u8>),
    Qos(Qos),
    State(State),
    Array(OmmArray),
    Vector(Vector),
    Map(Map),
    FilterList(FilterList),
    ElementList(ElementList),
    /// Pre-encoded content of an arbitrary type, carried through untouched.
    Encoded {
        data_type: DataType,
        #[serde(with = "serde_bytes")]
        bytes: Vec<u8>,
    },
}

impl Data {
    /// The type code this node reports to a decoder.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            Self::NoData => DataType::NoData,
            Self::Blank(data_type) | Self::Encoded { data_type, .. } => *data_type,
            Self::UInt(_) => DataType::UInt,
            Self::Int(_) => DataType::Int,
            Self::Ascii(_) => DataType::AsciiString,
            Self::Buffer(_) => DataType::Buffer,
            Self::Qos(_) => DataType::Qos,
            Self::State(_) => DataType::State,
            Self::Array(_) => DataType::Array,
            Self::Vector(_) => DataType::Vector,
            Self::Map(_) => DataType::Map,
            Self::FilterList(_) => DataType::FilterList,
            Self::ElementList(_) => DataType::ElementList,
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank(_))
    }

    // ---- Scalar decode: blank means absent ----

    /// Reads an unsigned integer. A blank value decodes as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedType`] for any other variant.
    pub fn as_uint(&self) -> Result<Option<u64>, CodecError> {
        match self {
            Self::UInt(value) => Ok(Some(*value)),
            Self::Blank(_) => Ok(None),
            other => Err(CodecError::mismatch(DataType::UInt, other.data_type())),
        }
    }

    /// Reads an ASCII string. A blank value decodes as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedType`] for any other variant.
    pub fn as_ascii(&self) -> Result<Option<&str>, CodecError> {
        match self {
            Self::Ascii(value) => Ok(Some(value)),
            Self::Blank(_) => Ok(None),
            other => Err(CodecError::mismatch(DataType::AsciiString, other.data_type())),
        }
    }

    /// Reads raw bytes. String content is accepted and returned as its bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedType`] for any other variant.
    pub fn as_buffer(&self) -> Result<Option<&[u8]>, CodecError> {
        match self {
            Self::Buffer(value) => Ok(Some(value)),
            Self::Ascii(value) => Ok(Some(value.as_bytes())),
            Self::Blank(_) => Ok(None),
            other => Err(CodecError::mismatch(DataType::Buffer, other.data_type())),
        }
    }

    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedType`] for any other variant.
    pub fn as_qos(&self) -> Result<Option<&Qos>, CodecError> {
        match self {
            Self::Qos(value) => Ok(Some(value)),
            Self::Blank(_) => Ok(None),
            other => Err(CodecError::mismatch(DataType::Qos, other.data_type())),
        }
    }

    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedType`] for any other variant.
    pub fn as_state(&self) -> Result<Option<&State>, CodecError> {
        match self {
            Self::State(value) => Ok(Some(value)),
            Self::Blank(_) => Ok(None),
            other => Err(CodecError::mismatch(DataType::State, other.data_type())),
        }
    }

    // ---- Container access ----

    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedType`] for any other variant.
    pub fn as_array(&self) -> Result<&OmmArray, CodecError> {
        match self {
            Self::Array(array) => Ok(array),
            other => Err(CodecError::mismatch(DataType::Array, other.data_type())),
        }
    }

    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedType`] for any other variant.
    pub fn as_vector(&self) -> Result<&Vector, CodecError> {
        match self {
            Self::Vector(vector) => Ok(vector),
            other => Err(CodecError::mismatch(DataType::Vector, other.data_type())),
        }
    }

    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedType`] for any other variant.
    pub fn as_map(&self) -> Result<&Map, CodecError> {
        match self {
            Self::Map(map) => Ok(map),
            other => Err(CodecError::mismatch(DataType::Map, other.data_type())),
        }
    }

    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedType`] for any other variant.
    pub fn as_filter_list(&self) -> Result<&FilterList, CodecError> {
        match self {
            Self::FilterList(list) => Ok(list),
            other => Err(CodecError::mismatch(DataType::FilterList, other.data_type())),
        }
    }

    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedType`] for any other variant.
    pub fn as_element_list(&self) -> Result<&ElementList, CodecError> {
        match self {
            Self::ElementList(list) => Ok(list),
            other => Err(CodecError::mismatch(DataType::ElementList, other.data_type())),
        }
    }
}

/// Checks an entry's payload against its action and the declared container type.
///
/// `carries_payload` is `false` for Delete/Clear actions. A container type of
/// `NoData` means entries never carry a payload.
pub(crate) fn check_payload(
    carries_payload: bool,
    payload: Option<&Data>,
    container_type: DataType,
) -> Result<(), CodecError> {
    match (carries_payload, payload) {
        (false, Some(_)) => Err(CodecError::UnexpectedPayload),
        (false, None) => Ok(()),
        (true, None) if container_type == DataType::NoData => Ok(()),
        (true, None) => Err(CodecError::MissingPayload),
        (true, Some(data)) if data.data_type() == container_type => Ok(()),
        (true, Some(data)) => Err(CodecError::mismatch(container_type, data.data_type())),
    }
}

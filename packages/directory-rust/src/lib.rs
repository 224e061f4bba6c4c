//! Source Directory protocol for OMM market-data streams.
//!
//! A provider describes the services it offers on a directory stream; a
//! consumer requests that stream, receives a refresh and then applies
//! updates. This crate models:
//!
//! - the per-service filters (Info, State, Load, Data, Link, Group, `SeqMcast`)
//!   and their replace/merge semantics ([`service`]),
//! - the six directory messages and their mapping onto transport messages
//!   ([`messages`], [`DirectoryMsg`]),
//! - a consumer-side [`DirectoryCache`] built on the merge primitives.

pub mod cache;
pub mod error;
pub mod messages;
pub mod msg;
pub mod rdm;
pub mod service;
mod wire;

pub use cache::{CacheConfig, DirectoryCache, GroupMergePolicy};
pub use error::DirectoryError;
pub use messages::{
    ConsumerStatusService, DirectoryClose, DirectoryConsumerStatus, DirectoryRefresh,
    DirectoryRequest, DirectoryStatus, DirectoryUpdate,
};
pub use msg::{DirectoryMsg, DirectoryMsgType};
pub use rdm::{FilterId, FilterMask};
pub use service::{FilterMerge, Service};

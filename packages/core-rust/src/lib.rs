//! OMM core: self-describing container codec, message envelope and the
//! standardized enumerations shared by every OMM domain.

pub mod codec;
pub mod error;
pub mod msg;
pub mod types;

pub use codec::{Data, DataType, MapKey};
pub use error::CodecError;
pub use msg::{Msg, MsgClass, MsgFlags, MsgKey};
pub use types::{
    DataState, DomainType, FilterEntryAction, MapEntryAction, Qos, QosRate, QosTimeliness,
    State, StateCode, StreamState, VectorEntryAction,
};

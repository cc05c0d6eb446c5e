//! # Randnet Proto Crate
//!
//! Wire types untuk protokol DKG randnet.
//!
//! ## Modules
//!
//! | Module | Deskripsi |
//! |--------|-----------|
//! | [`dkg`] | Phase types, `DkgData`, validasi |
//! | [`msgs`] | `MsgSendDkgData` transaction wrapper |
//! | [`encoding`] | Deterministic bincode codec + batch format |
//!
//! Types di crate ini adalah representasi transport/storage; semua
//! payload kriptografis bersifat opaque.

pub mod dkg;
pub mod encoding;
pub mod msgs;

pub use dkg::{DkgData, DkgDataType, ValidationError, NUM_DATA_TYPES, SIGNATURE_SIZE};
pub use encoding::{decode_msg, decode_msgs, encode_msg, encode_msgs, CodecError};
pub use msgs::{MsgSendDkgData, QUERY_DKG_DATA_PATH};

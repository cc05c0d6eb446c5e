//! # Transaction Messages
//!
//! Wrapper message yang membawa [`DkgData`] sebagai payload transaksi
//! on-chain. Satu transaksi membawa tepat satu `MsgSendDkgData`.

use serde::{Deserialize, Serialize};

use randnet_common::types::Address;

use crate::dkg::{DkgData, ValidationError};

/// Query path prefix untuk menarik DKG messages per phase type.
/// Phase ordinal (0..=6) di-append sebagai path segment terakhir.
pub const QUERY_DKG_DATA_PATH: &str = "custom/randapp/dkgData";

/// Pesan transaksi `send-dkg-data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSendDkgData {
    /// Phase message yang dibawa.
    pub data: DkgData,
    /// Address akun pengirim transaksi.
    pub from: Address,
}

impl MsgSendDkgData {
    #[must_use]
    pub fn new(data: DkgData, from: Address) -> Self {
        MsgSendDkgData { data, from }
    }

    /// Validasi stateless sebelum signing/broadcast.
    ///
    /// Menolak `from` kosong dan `data` yang malformed.
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        if self.from.is_zero() {
            return Err(ValidationError::EmptySender);
        }
        self.data.validate()
    }

    /// Full query path untuk phase type tertentu.
    #[must_use]
    pub fn query_path(data_type: crate::dkg::DkgDataType) -> String {
        format!("{}/{}", QUERY_DKG_DATA_PATH, data_type.as_u8())
    }
}

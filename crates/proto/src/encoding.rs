//! Serialization Helpers for DKG Wire Messages
//!
//! Module ini menyediakan fungsi encoding/decoding deterministik untuk
//! `MsgSendDkgData`. Encoding yang sama HARUS menghasilkan output byte
//! yang identik — decoder di node lain harus byte-compatible dengan
//! producer.

use crate::msgs::MsgSendDkgData;
use std::fmt;

/// Error type untuk decode failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Input tidak dapat di-decode.
    DecodeFailed(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::DecodeFailed(reason) => write!(f, "decode failed: {}", reason),
        }
    }
}

impl std::error::Error for CodecError {}

/// Encode single message ke bytes dengan format deterministik.
///
/// # Determinism Guarantee
/// Input yang sama SELALU menghasilkan output byte yang identik,
/// tidak bergantung pada platform, compiler, atau runtime state.
pub fn encode_msg(msg: &MsgSendDkgData) -> Vec<u8> {
    // bincode menggunakan little-endian dan fixed encoding order
    // yang menjamin deterministic output
    bincode::serialize(msg).unwrap_or_else(|_| Vec::new())
}

/// Decode bytes ke `MsgSendDkgData`.
///
/// # Roundtrip Guarantee
/// `decode_msg(encode_msg(msg)) == msg` untuk semua valid message.
pub fn decode_msg(bytes: &[u8]) -> Result<MsgSendDkgData, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::DecodeFailed("empty input".to_string()));
    }
    bincode::deserialize(bytes).map_err(|e| CodecError::DecodeFailed(e.to_string()))
}

/// Encode batch of messages ke bytes.
///
/// # Format
/// ```text
/// [msg_count:8][msg_1_len:8][msg_1_bytes:N]...[msg_N_len:8][msg_N_bytes:M]
/// ```
///
/// # Determinism Guarantee
/// Urutan message TIDAK BERUBAH. Output deterministik.
pub fn encode_msgs(msgs: &[MsgSendDkgData]) -> Vec<u8> {
    let mut result = Vec::new();

    // Write message count as u64 (8 bytes, little-endian)
    let count = msgs.len() as u64;
    result.extend_from_slice(&count.to_le_bytes());

    // Write each message with length prefix
    for msg in msgs {
        let encoded = encode_msg(msg);
        let len = encoded.len() as u64;
        result.extend_from_slice(&len.to_le_bytes());
        result.extend_from_slice(&encoded);
    }

    result
}

/// Decode bytes ke `Vec<MsgSendDkgData>`.
///
/// # Roundtrip Guarantee
/// `decode_msgs(encode_msgs(msgs)) == msgs`.
/// Urutan dan isi TIDAK BERUBAH.
pub fn decode_msgs(bytes: &[u8]) -> Result<Vec<MsgSendDkgData>, CodecError> {
    if bytes.len() < 8 {
        return Err(CodecError::DecodeFailed(
            "batch too short for count".to_string(),
        ));
    }

    let mut cursor = 0;

    // Read message count
    let count_bytes: [u8; 8] = bytes[cursor..cursor + 8]
        .try_into()
        .map_err(|_| CodecError::DecodeFailed("failed to read count".to_string()))?;
    let count = u64::from_le_bytes(count_bytes) as usize;
    cursor += 8;

    let mut msgs = Vec::with_capacity(count.min(1024));
    for i in 0..count {
        if bytes.len() < cursor + 8 {
            return Err(CodecError::DecodeFailed(format!(
                "batch truncated at message {} length prefix",
                i
            )));
        }
        let len_bytes: [u8; 8] = bytes[cursor..cursor + 8]
            .try_into()
            .map_err(|_| CodecError::DecodeFailed("failed to read length".to_string()))?;
        let len = u64::from_le_bytes(len_bytes) as usize;
        cursor += 8;

        if len > bytes.len() - cursor {
            return Err(CodecError::DecodeFailed(format!(
                "batch truncated at message {} body",
                i
            )));
        }
        let msg = decode_msg(&bytes[cursor..cursor + len])?;
        cursor += len;
        msgs.push(msg);
    }

    if cursor != bytes.len() {
        return Err(CodecError::DecodeFailed(format!(
            "trailing bytes after batch: {}",
            bytes.len() - cursor
        )));
    }

    Ok(msgs)
}

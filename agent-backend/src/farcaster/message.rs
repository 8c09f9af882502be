//! Farcaster protocol messages, as much of them as a `CastAdd` needs.
//!
//! Field tags match the hub protobuf schema. The `body` oneof is written as a
//! plain optional field at the `cast_add_body` tag, which encodes identically.

use ed25519_dalek::{Signer, SigningKey};
use prost::Message as _;

/// Seconds between the Unix epoch and the Farcaster epoch (2021-01-01T00:00:00Z)
pub const FARCASTER_EPOCH: i64 = 1_609_459_200;

pub const MESSAGE_TYPE_CAST_ADD: i32 = 1;
pub const NETWORK_MAINNET: i32 = 1;
pub const HASH_SCHEME_BLAKE3: i32 = 1;
pub const SIGNATURE_SCHEME_ED25519: i32 = 1;

/// Message hashes are BLAKE3 truncated to 20 bytes
pub const HASH_LENGTH: usize = 20;

#[derive(Clone, PartialEq, prost::Message)]
pub struct CastId {
    #[prost(uint64, tag = "1")]
    pub fid: u64,
    #[prost(bytes = "vec", tag = "2")]
    pub hash: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CastAddBody {
    #[prost(message, optional, tag = "3")]
    pub parent_cast_id: Option<CastId>,
    #[prost(string, tag = "4")]
    pub text: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct MessageData {
    #[prost(int32, tag = "1")]
    pub message_type: i32,
    #[prost(uint64, tag = "2")]
    pub fid: u64,
    #[prost(uint32, tag = "3")]
    pub timestamp: u32,
    #[prost(int32, tag = "4")]
    pub network: i32,
    #[prost(message, optional, tag = "5")]
    pub cast_add_body: Option<CastAddBody>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SignedMessage {
    #[prost(message, optional, tag = "1")]
    pub data: Option<MessageData>,
    #[prost(bytes = "vec", tag = "2")]
    pub hash: Vec<u8>,
    #[prost(int32, tag = "3")]
    pub hash_scheme: i32,
    #[prost(bytes = "vec", tag = "4")]
    pub signature: Vec<u8>,
    #[prost(int32, tag = "5")]
    pub signature_scheme: i32,
    #[prost(bytes = "vec", tag = "6")]
    pub signer: Vec<u8>,
    #[prost(bytes = "vec", optional, tag = "7")]
    pub data_bytes: Option<Vec<u8>>,
}

/// Unix seconds to Farcaster epoch seconds
pub fn farcaster_timestamp(unix_secs: i64) -> u32 {
    (unix_secs - FARCASTER_EPOCH).max(0) as u32
}

/// Parse an Ed25519 signer key from hex. Accepts the 32-byte seed or the
/// 64-byte seed+public form some tooling exports.
pub fn parse_signer_key(hex_key: &str) -> Result<SigningKey, String> {
    let key_hex = hex_key.trim().strip_prefix("0x").unwrap_or(hex_key.trim());
    let bytes = hex::decode(key_hex).map_err(|e| format!("Invalid signer key hex: {}", e))?;
    if bytes.len() != 32 && bytes.len() != 64 {
        return Err(format!(
            "Invalid signer key length: expected 32 or 64 bytes, got {}",
            bytes.len()
        ));
    }
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&bytes[..32]);
    Ok(SigningKey::from_bytes(&seed))
}

/// Decode a `0x`-prefixed cast hash
pub fn parse_cast_hash(hash: &str) -> Result<Vec<u8>, String> {
    let hex_part = hash.strip_prefix("0x").unwrap_or(hash);
    hex::decode(hex_part).map_err(|e| format!("Invalid cast hash {:?}: {}", hash, e))
}

/// Build and sign a `CastAdd` message
pub fn build_cast_add(
    fid: u64,
    text: &str,
    parent: Option<CastId>,
    timestamp: u32,
    signing_key: &SigningKey,
) -> SignedMessage {
    let data = MessageData {
        message_type: MESSAGE_TYPE_CAST_ADD,
        fid,
        timestamp,
        network: NETWORK_MAINNET,
        cast_add_body: Some(CastAddBody {
            parent_cast_id: parent,
            text: text.to_string(),
        }),
    };

    let data_bytes = data.encode_to_vec();
    let hash = blake3::hash(&data_bytes).as_bytes()[..HASH_LENGTH].to_vec();
    let signature = signing_key.sign(&hash);

    SignedMessage {
        data: Some(data),
        hash,
        hash_scheme: HASH_SCHEME_BLAKE3,
        signature: signature.to_bytes().to_vec(),
        signature_scheme: SIGNATURE_SCHEME_ED25519,
        signer: signing_key.verifying_key().to_bytes().to_vec(),
        data_bytes: Some(data_bytes),
    }
}

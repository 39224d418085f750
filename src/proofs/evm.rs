use ethereum_types::{H160, U256};
use sha3::{Digest, Keccak256};

use crate::proofs::error::{ProofError, ProofResult};

/// General Keccak256 hash function
pub fn keccak256(bytes: impl AsRef<[u8]>) -> [u8; 32] {
    let mut h = Keccak256::new();
    h.update(bytes.as_ref());
    let out = h.finalize();
    let mut r = [0u8; 32];
    r.copy_from_slice(&out);
    r
}

/// Left-pad bytes to 32 bytes (for EVM storage values)
pub fn left_pad_32(v: &[u8]) -> [u8; 32] {
    if v.len() >= 32 {
        let mut out = [0u8; 32];
        out.copy_from_slice(&v[v.len() - 32..]);
        return out;
    }
    let mut out = [0u8; 32];
    out[32 - v.len()..].copy_from_slice(v);
    out
}

/// 4-byte function selector from a Solidity signature (Solidity standard)
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&hash[..4]);
    sel
}

/// Hex-encode with a `0x` prefix
pub fn encode_hex(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes.as_ref()))
}

/// Decode a `0x`-prefixed (or bare) hex byte string
pub fn decode_hex(s: &str) -> ProofResult<Vec<u8>> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    if stripped.len() % 2 != 0 {
        return Err(ProofError::malformed(
            "hex string",
            format!("odd-length value '{s}'"),
        ));
    }
    hex::decode(stripped).map_err(|e| ProofError::malformed("hex string", format!("'{s}': {e}")))
}

/// Parse a hex quantity (`0x0`, `0x4009a8`, ...) into a U256
pub fn parse_quantity(s: &str) -> ProofResult<U256> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    U256::from_str_radix(stripped, 16)
        .map_err(|e| ProofError::malformed("hex quantity", format!("'{s}': {e}")))
}

/// Parse a 20-byte hex address
pub fn parse_address(s: &str) -> ProofResult<H160> {
    let bytes = decode_hex(s)?;
    if bytes.len() != 20 {
        return Err(ProofError::malformed(
            "address",
            format!("'{s}' is {} bytes, expected 20", bytes.len()),
        ));
    }
    Ok(H160::from_slice(&bytes))
}

/// Parse an address out of a 32-byte ABI return word
pub fn parse_address_word(s: &str) -> ProofResult<H160> {
    let bytes = decode_hex(s)?;
    if bytes.len() != 32 {
        return Err(ProofError::malformed(
            "abi word",
            format!("'{s}' is {} bytes, expected 32", bytes.len()),
        ));
    }
    Ok(H160::from_slice(&bytes[12..]))
}

/// ABI head word for a uint256 argument
pub fn abi_word_u256(v: U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    v.to_big_endian(&mut out);
    out
}

/// ABI head word for an address argument
pub fn abi_word_address(a: H160) -> [u8; 32] {
    left_pad_32(a.as_bytes())
}

/// Build `eth_call` data: selector followed by 32-byte argument words
pub fn encode_call(signature: &str, args: &[[u8; 32]]) -> String {
    let mut data = Vec::with_capacity(4 + 32 * args.len());
    data.extend_from_slice(&function_selector(signature));
    for arg in args {
        data.extend_from_slice(arg);
    }
    encode_hex(data)
}

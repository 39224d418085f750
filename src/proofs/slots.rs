use ethereum_types::{H160, H256, U256};

use crate::proofs::evm::keccak256;

/// How a storage slot is derived from a declared layout.
///
/// Every derivation path belongs to exactly one variant; call sites dispatch
/// here once instead of re-branching on the target contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingLayout {
    /// Element of a dynamic array rooted at `base_slot`
    Array { base_slot: U256, index: u64 },
    /// Single-level mapping keyed by an address
    Single { slot: U256, key: H160 },
    /// Two-level mapping keyed by (address, uint256)
    TwoLevel {
        slot: U256,
        outer_key: H160,
        inner_key: U256,
    },
}

impl MappingLayout {
    /// Compute the storage slot for this layout
    pub fn derive(&self) -> H256 {
        match *self {
            Self::Array { base_slot, index } => array_slot(base_slot, index),
            Self::Single { slot, key } => mapping_slot(slot, key),
            Self::TwoLevel {
                slot,
                outer_key,
                inner_key,
            } => two_level_mapping_slot(slot, outer_key, inner_key),
        }
    }
}

fn be32(v: U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    v.to_big_endian(&mut out);
    out
}

/// Slot of element `index` in a dynamic array declared at `base_slot`:
/// keccak256(uint256(base_slot)) + index, with EVM wrapping arithmetic.
pub fn array_slot(base_slot: U256, index: u64) -> H256 {
    let hashed = keccak256(be32(base_slot));
    let (slot, _) = U256::from_big_endian(&hashed).overflowing_add(U256::from(index));
    H256(be32(slot))
}

/// Slot of `mapping(address => ...)[key]` declared at `base_slot`:
/// keccak256(abi.encode(key, uint256(base_slot))).
pub fn mapping_slot(base_slot: U256, key: H160) -> H256 {
    let mut buf = [0u8; 64];
    buf[12..32].copy_from_slice(key.as_bytes());
    base_slot.to_big_endian(&mut buf[32..]);
    H256(keccak256(buf))
}

/// Slot of `mapping(address => mapping(uint256 => ...))[outer_key][inner_key]`
/// declared at `base_slot`.
///
/// The concatenation order is a protocol-level contract with the storage
/// layout being proved against: the inner-level encoding comes first, the
/// keccak of the outer-level encoding second.
pub fn two_level_mapping_slot(base_slot: U256, outer_key: H160, inner_key: U256) -> H256 {
    let mut first = [0u8; 64];
    first[12..32].copy_from_slice(outer_key.as_bytes());
    base_slot.to_big_endian(&mut first[32..]);

    let mut buf = [0u8; 64];
    inner_key.to_big_endian(&mut buf[..32]);
    buf[32..].copy_from_slice(&keccak256(first));
    H256(keccak256(buf))
}

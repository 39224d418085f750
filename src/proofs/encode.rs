use ethereum_types::U256;
use rlp::{Rlp, RlpStream};

use crate::proofs::error::{ProofError, ProofResult};
use crate::proofs::evm::{decode_hex, parse_quantity};
use crate::types::RpcBlock;

/// Canonical RLP encoding of an ordered list of byte strings
pub fn encode_list(items: &[Vec<u8>]) -> Vec<u8> {
    let mut stream = RlpStream::new_list(items.len());
    for item in items {
        stream.append(item);
    }
    stream.out().to_vec()
}

/// Inverse of [`encode_list`] for flat byte-string lists
pub fn decode_list(data: &[u8]) -> ProofResult<Vec<Vec<u8>>> {
    Ok(Rlp::new(data).as_list()?)
}

/// Re-encode raw trie nodes, as returned by `eth_getProof`, into a single
/// RLP list of lists.
///
/// Each raw node is itself an already-encoded RLP list; the verifier expects
/// the whole path as one nested list, so each node is validated as a complete
/// list item and spliced into the outer list unchanged. Byte-equal to
/// decoding every node and re-encoding the decoded collection, since RLP is
/// canonical.
pub fn re_encode_proof_nodes(nodes: &[Vec<u8>]) -> ProofResult<Vec<u8>> {
    let mut stream = RlpStream::new_list(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        let item = Rlp::new(node);
        let info = item.payload_info()?;
        if !item.is_list() || info.header_len + info.value_len != node.len() {
            return Err(ProofError::malformed(
                "proof node",
                format!("node {i} is not a single RLP list"),
            ));
        }
        stream.append_raw(node, 1);
    }
    Ok(stream.out().to_vec())
}

/// RLP-encode a block header for on-chain verification.
///
/// Field order is fixed and valid only for headers carrying both
/// `baseFeePerGas` and `withdrawalsRoot`; the retired difficulty field is
/// encoded as the empty string, and a zero `gasUsed` becomes the canonical
/// empty string rather than a zero byte.
pub fn encode_block_header(block: &RpcBlock) -> ProofResult<Vec<u8>> {
    let gas_used = parse_quantity(&block.gas_used)?;
    let fields: Vec<Vec<u8>> = vec![
        decode_hex(&block.parent_hash)?,
        decode_hex(&block.sha3_uncles)?,
        decode_hex(&block.miner)?,
        decode_hex(&block.state_root)?,
        decode_hex(&block.transactions_root)?,
        decode_hex(&block.receipts_root)?,
        decode_hex(&block.logs_bloom)?,
        Vec::new(), // difficulty placeholder
        quantity_bytes(parse_quantity(&block.number)?),
        quantity_bytes(parse_quantity(&block.gas_limit)?),
        if gas_used.is_zero() {
            Vec::new()
        } else {
            quantity_bytes(gas_used)
        },
        quantity_bytes(parse_quantity(&block.timestamp)?),
        decode_hex(&block.extra_data)?,
        decode_hex(&block.mix_hash)?,
        decode_hex(&block.nonce)?,
        quantity_bytes(parse_quantity(&block.base_fee_per_gas)?),
        decode_hex(&block.withdrawals_root)?,
    ];
    Ok(encode_list(&fields))
}

// Minimal big-endian bytes of a quantity; zero stays one zero byte, matching
// the original hex normalization of non-gasUsed quantities.
fn quantity_bytes(v: U256) -> Vec<u8> {
    if v.is_zero() {
        return vec![0];
    }
    let mut buf = [0u8; 32];
    v.to_big_endian(&mut buf);
    let first = buf.iter().position(|b| *b != 0).unwrap_or(31);
    buf[first..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_block(gas_used: &str) -> RpcBlock {
        let json = format!(
            r#"{{
                "hash": "0x53b4d1b16f03d4d8e27b938b886f4a0e4b01cd6a184354bb65bdb7cf0eb41df3",
                "parentHash": "0xa43b1c2e7a8a0f3bd2490b9ce1f1c5523dcab9d2cf7ea62ac9e1a6aae0b38c11",
                "sha3Uncles": "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347",
                "miner": "0x95222290dd7278aa3ddd389cc1e1d165cc4bafe5",
                "stateRoot": "0x54da5e0b6a3f4e6c5bb19264e0a7e6fd5ef6f4b8ffdfa7b4dbc1e2ff0f07d3a6",
                "transactionsRoot": "0xcf47b0b5a2a6b7c2e9f35b09a6dd1cf1e8d42ab0953e1f41ab76a05d5ab9db15",
                "receiptsRoot": "0x7ba08aea78e9f71fcd44fd6a1f54885ebc32ea00d4a6afbb2b4e3f88f3c9f20f",
                "logsBloom": "0x{bloom}",
                "difficulty": "0x0",
                "number": "0x400928",
                "gasLimit": "0x1c9c380",
                "gasUsed": "{gas_used}",
                "timestamp": "0x64b8f2a4",
                "extraData": "0xd883010d04846765746888676f312e32302e33856c696e7578",
                "mixHash": "0x6d4e1f8e2c9a11e8ab2bd8ce63c62ff8d7f86e5b8bb76a9b24d1ad3f70e2f5d9",
                "nonce": "0x0000000000000000",
                "baseFeePerGas": "0x3b9aca00",
                "withdrawalsRoot": "0x917f9ab4a40dd0ef71dcf5d251a3d023fab67cdf4cbdc1a4ef43d5c0a5ab4d2b"
            }}"#,
            bloom = fixture_bloom(),
        );
        serde_json::from_str(&json).unwrap()
    }

    fn fixture_bloom() -> String {
        let bloom: Vec<u8> = (0..256u32).map(|i| ((i * 7 + 3) % 256) as u8).collect();
        hex::encode(bloom)
    }

    #[test]
    fn list_round_trip() {
        let items: Vec<Vec<u8>> = vec![Vec::new(), vec![0x01], b"cat".to_vec(), vec![0u8; 60]];
        let encoded = encode_list(&items);
        assert_eq!(
            hex::encode(&encoded),
            format!("f844800183636174b83c{}", "00".repeat(60))
        );
        assert_eq!(decode_list(&encoded).unwrap(), items);
    }

    #[test]
    fn header_encoding_matches_golden_vector() {
        let encoded = encode_block_header(&fixture_block("0xd05dc1")).unwrap();
        let expected = format!(
            "f9023aa0a43b1c2e7a8a0f3bd2490b9ce1f1c5523dcab9d2cf7ea62ac9e1a6aae0b38c11\
             a01dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347\
             9495222290dd7278aa3ddd389cc1e1d165cc4bafe5\
             a054da5e0b6a3f4e6c5bb19264e0a7e6fd5ef6f4b8ffdfa7b4dbc1e2ff0f07d3a6\
             a0cf47b0b5a2a6b7c2e9f35b09a6dd1cf1e8d42ab0953e1f41ab76a05d5ab9db15\
             a07ba08aea78e9f71fcd44fd6a1f54885ebc32ea00d4a6afbb2b4e3f88f3c9f20f\
             b90100{bloom}\
             80834009288401c9c38083d05dc18464b8f2a4\
             99d883010d04846765746888676f312e32302e33856c696e7578\
             a06d4e1f8e2c9a11e8ab2bd8ce63c62ff8d7f86e5b8bb76a9b24d1ad3f70e2f5d9\
             880000000000000000843b9aca00\
             a0917f9ab4a40dd0ef71dcf5d251a3d023fab67cdf4cbdc1a4ef43d5c0a5ab4d2b",
            bloom = fixture_bloom(),
        )
        .replace(char::is_whitespace, "");
        assert_eq!(hex::encode(encoded), expected);
    }

    #[test]
    fn zero_gas_used_encodes_as_empty_string() {
        let encoded = encode_block_header(&fixture_block("0x0")).unwrap();
        let items = decode_list(&encoded).unwrap();
        assert_eq!(items.len(), 17);
        assert!(items[7].is_empty(), "difficulty placeholder");
        assert!(items[10].is_empty(), "zero gasUsed");
        // non-gasUsed quantities keep their value bytes
        assert_eq!(items[8], hex::decode("400928").unwrap());
        let expected = format!(
            "f90237a0a43b1c2e7a8a0f3bd2490b9ce1f1c5523dcab9d2cf7ea62ac9e1a6aae0b38c11\
             a01dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347\
             9495222290dd7278aa3ddd389cc1e1d165cc4bafe5\
             a054da5e0b6a3f4e6c5bb19264e0a7e6fd5ef6f4b8ffdfa7b4dbc1e2ff0f07d3a6\
             a0cf47b0b5a2a6b7c2e9f35b09a6dd1cf1e8d42ab0953e1f41ab76a05d5ab9db15\
             a07ba08aea78e9f71fcd44fd6a1f54885ebc32ea00d4a6afbb2b4e3f88f3c9f20f\
             b90100{bloom}\
             80834009288401c9c380808464b8f2a4\
             99d883010d04846765746888676f312e32302e33856c696e7578\
             a06d4e1f8e2c9a11e8ab2bd8ce63c62ff8d7f86e5b8bb76a9b24d1ad3f70e2f5d9\
             880000000000000000843b9aca00\
             a0917f9ab4a40dd0ef71dcf5d251a3d023fab67cdf4cbdc1a4ef43d5c0a5ab4d2b",
            bloom = fixture_bloom(),
        )
        .replace(char::is_whitespace, "");
        assert_eq!(hex::encode(encoded), expected);
    }

    #[test]
    fn proof_nodes_re_encode_as_nested_list() {
        let node1 = hex::decode("c5832001020a").unwrap();
        let node2 =
            hex::decode("e21fa0deadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef")
                .unwrap();
        let combined = re_encode_proof_nodes(&[node1, node2]).unwrap();
        assert_eq!(
            hex::encode(combined),
            "e9c5832001020ae21fa0deadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef"
        );
    }

    #[test]
    fn rejects_non_list_proof_nodes() {
        // a bare byte string is not a trie node
        let raw = hex::decode("83200102").unwrap();
        assert!(matches!(
            re_encode_proof_nodes(&[raw]),
            Err(ProofError::MalformedInput { .. })
        ));
        // trailing garbage after a well-formed list
        let trailing = hex::decode("c5832001020aff").unwrap();
        assert!(re_encode_proof_nodes(&[trailing]).is_err());
    }
}

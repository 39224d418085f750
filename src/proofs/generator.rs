use ethereum_types::{H160, H256, U256};

use crate::client::EthClient;
use crate::config::{ExtraSlot, TokenConfig};
use crate::proofs::bundle::ResultSet;
use crate::proofs::encode;
use crate::proofs::error::{ProofError, ProofResult};
use crate::proofs::evm::{
    abi_word_address, abi_word_u256, encode_call, encode_hex, parse_address_word, parse_quantity,
};
use crate::proofs::slots::MappingLayout;
use crate::proofs::store::ProofStore;

const BALANCE_OF: &str = "balanceOf(address)";
const GET_POWER_CURRENT: &str = "getPowerCurrent(address,uint8)";
const GET_DELEGATEE_BY_TYPE: &str = "getDelegateeByType(address,uint8)";

/// Drives slot derivation, proof fetching and encoding for one run.
///
/// All reads are pinned to `block_number`, and every step rewrites the whole
/// persisted [`ResultSet`] on completion; the assembler is the sole writer
/// while a run is in flight.
pub struct ProofAssembler<'a> {
    client: &'a EthClient,
    store: &'a ProofStore,
    block_number: u64,
}

impl<'a> ProofAssembler<'a> {
    pub fn new(client: &'a EthClient, store: &'a ProofStore, block_number: u64) -> Self {
        Self {
            client,
            store,
            block_number,
        }
    }

    /// Create or refresh the root bundle for a token: pinned block header,
    /// declared slots, and the account proof covering them.
    pub async fn generate_roots(
        &self,
        set: &mut ResultSet,
        token: &TokenConfig,
    ) -> ProofResult<()> {
        tracing::info!("generating roots for {}", token.name);

        let block = self.client.get_block_by_number(self.block_number).await?;
        let header_rlp = encode::encode_block_header(&block)?;
        set.block_hash = Some(block.hash.clone());

        let mut slot_keys: Vec<String> = Vec::new();
        {
            let bundle = set.ensure_bundle(&token.name, &token.address);
            bundle.block_header_rlp = Some(encode_hex(&header_rlp));

            if let Some(raw) = token.balance_slot {
                let padded = padded_slot_hex(raw);
                bundle.base_balance_slot_raw = Some(raw);
                bundle.base_balance_slot = Some(padded.clone());
                slot_keys.push(padded);
            }
            match token.extra {
                Some(ExtraSlot::DelegationBalance(raw)) => {
                    let padded = padded_slot_hex(raw);
                    bundle.delegation_slot_raw = Some(raw);
                    bundle.delegation_balance_slot = Some(padded.clone());
                    slot_keys.push(padded);
                }
                Some(ExtraSlot::ExchangeRate(raw)) => {
                    let padded = padded_slot_hex(raw);
                    bundle.exchange_rate_slot_raw = Some(raw);
                    bundle.exchange_rate_slot = Some(padded.clone());
                    slot_keys.push(padded);
                }
                Some(ExtraSlot::Representatives(raw)) => {
                    let padded = padded_slot_hex(raw);
                    bundle.representatives_slot_raw = Some(raw);
                    bundle.representatives_slot = Some(padded.clone());
                    slot_keys.push(padded);
                }
                None => {}
            }
        }

        let proof = self
            .client
            .get_proof(&token.address, &slot_keys, self.block_number)
            .await?;
        let nodes = decode_nodes(&proof.account_proof)?;
        let account_rlp = encode::re_encode_proof_nodes(&nodes)?;
        set.require_bundle(&token.name)?.account_state_proof_rlp = Some(encode_hex(account_rlp));

        self.store.save(set)?;
        Ok(())
    }

    /// Fetch the storage proof for one slot and attach it under `proof_name`.
    ///
    /// Precondition: roots for `token` must already exist; an unknown logical
    /// name aborts before any fetch or persistence write.
    pub async fn attach_storage_proof(
        &self,
        set: &mut ResultSet,
        token: &TokenConfig,
        slot: H256,
        proof_name: &str,
    ) -> ProofResult<()> {
        set.require_bundle(&token.name)?;

        let slot_hex = encode_hex(slot.as_bytes());
        let proof = self
            .client
            .get_proof(&token.address, std::slice::from_ref(&slot_hex), self.block_number)
            .await?;
        let entry = proof
            .storage_proof
            .first()
            .ok_or_else(|| ProofError::missing_data(format!("storage proof for {slot_hex}")))?;
        let nodes = decode_nodes(&entry.proof)?;
        let proof_rlp = encode_hex(encode::re_encode_proof_nodes(&nodes)?);

        set.require_bundle(&token.name)?
            .storage_proofs
            .insert(proof_name.to_string(), proof_rlp);

        self.store.save(set)?;
        Ok(())
    }

    /// Storage proof for a mapping slot keyed by the voter
    pub async fn generate_voter_slot_proof(
        &self,
        set: &mut ResultSet,
        token: &TokenConfig,
        raw_slot: u64,
        voter: H160,
        proof_name: &str,
    ) -> ProofResult<()> {
        let slot = MappingLayout::Single {
            slot: raw_slot.into(),
            key: voter,
        }
        .derive();
        self.attach_storage_proof(set, token, slot, proof_name).await
    }

    /// Storage proof for a fixed (non-mapping) slot index
    pub async fn generate_fixed_slot_proof(
        &self,
        set: &mut ResultSet,
        token: &TokenConfig,
        raw_slot: u64,
        proof_name: &str,
    ) -> ProofResult<()> {
        let slot = H256::from_low_u64_be(raw_slot);
        self.attach_storage_proof(set, token, slot, proof_name).await
    }

    /// Storage proof for the two-level representatives mapping keyed by
    /// (voter, chain id), recording the derived slot and its live value.
    pub async fn generate_representative_proof(
        &self,
        set: &mut ResultSet,
        token: &TokenConfig,
        raw_slot: u64,
        voter: H160,
        chain_id: u64,
        proof_name: &str,
    ) -> ProofResult<()> {
        set.require_bundle(&token.name)?;

        let slot = MappingLayout::TwoLevel {
            slot: raw_slot.into(),
            outer_key: voter,
            inner_key: chain_id.into(),
        }
        .derive();
        let slot_hex = encode_hex(slot.as_bytes());
        tracing::debug!("derived representative slot {slot_hex}");

        let representative = self
            .client
            .get_storage_at(&token.address, &slot_hex, self.block_number)
            .await?;

        let bundle = set.require_bundle(&token.name)?;
        bundle.representatives_slot_hash = Some(slot_hex);
        bundle.representative = Some(representative);
        bundle.represented = Some(encode_hex(voter.as_bytes()));
        bundle.chain_id = Some(chain_id);
        self.store.save(set)?;

        self.attach_storage_proof(set, token, slot, proof_name).await
    }

    /// Record the voter's live balance, voting power and delegation state at
    /// the pinned block, for cross-checking the proofs.
    ///
    /// Precondition: roots for `token` must already exist.
    pub async fn capture_voter_values(
        &self,
        set: &mut ResultSet,
        token: &TokenConfig,
        voter: H160,
    ) -> ProofResult<()> {
        set.require_bundle(&token.name)?;

        let balance_slot = token
            .balance_slot
            .ok_or_else(|| ProofError::missing_data(format!("balance slot for {}", token.name)))?;

        let voter_word = abi_word_address(voter);
        let power_type = abi_word_u256(U256::zero());

        let balance = self
            .client
            .call(&token.address, &encode_call(BALANCE_OF, &[voter_word]), self.block_number)
            .await?;
        let voting_power = self
            .client
            .call(
                &token.address,
                &encode_call(GET_POWER_CURRENT, &[voter_word, power_type]),
                self.block_number,
            )
            .await?;
        let delegatee_word = self
            .client
            .call(
                &token.address,
                &encode_call(GET_DELEGATEE_BY_TYPE, &[voter_word, power_type]),
                self.block_number,
            )
            .await?;
        let delegatee = parse_address_word(&delegatee_word)?;
        tracing::debug!("delegatee for {}: {delegatee:?}", token.name);

        let balance_value_slot = MappingLayout::Single {
            slot: balance_slot.into(),
            key: voter,
        }
        .derive();
        let balance_slot_value = self
            .client
            .get_storage_at(
                &token.address,
                &encode_hex(balance_value_slot.as_bytes()),
                self.block_number,
            )
            .await?;

        let mut exchange_rate = None;
        let mut delegation_balance_slot_value = None;
        match token.extra {
            Some(ExtraSlot::ExchangeRate(raw)) => {
                let value = self
                    .client
                    .get_storage_at(&token.address, &padded_slot_hex(raw), self.block_number)
                    .await?;
                exchange_rate = Some(abi_uint256_hex(&value)?);
            }
            Some(ExtraSlot::DelegationBalance(raw)) => {
                let slot = MappingLayout::Single {
                    slot: raw.into(),
                    key: voter,
                }
                .derive();
                let value = self
                    .client
                    .get_storage_at(&token.address, &encode_hex(slot.as_bytes()), self.block_number)
                    .await?;
                delegation_balance_slot_value = Some(abi_uint256_hex(&value)?);
            }
            Some(ExtraSlot::Representatives(_)) | None => {}
        }

        let bundle = set.require_bundle(&token.name)?;
        bundle.delegating = Some(delegatee != voter && !delegatee.is_zero());
        bundle.balance = Some(abi_uint256_hex(&balance)?);
        bundle.voting_power = Some(abi_uint256_hex(&voting_power)?);
        bundle.balance_slot_value = Some(abi_uint256_hex(&balance_slot_value)?);
        bundle.exchange_rate = exchange_rate;
        bundle.delegation_balance_slot_value = delegation_balance_slot_value;

        self.store.save(set)?;
        Ok(())
    }
}

fn decode_nodes(raw: &[String]) -> ProofResult<Vec<Vec<u8>>> {
    raw.iter().map(|n| crate::proofs::evm::decode_hex(n)).collect()
}

fn padded_slot_hex(raw_slot: u64) -> String {
    encode_hex(H256::from_low_u64_be(raw_slot).as_bytes())
}

// 32-byte ABI uint256 encoding of a hex quantity
fn abi_uint256_hex(value: &str) -> ProofResult<String> {
    Ok(encode_hex(abi_word_u256(parse_quantity(value)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn assembler_fixture(dir: &tempfile::TempDir) -> (EthClient, ProofStore) {
        // unroutable endpoint: precondition failures must return before any I/O
        let client = EthClient::new(Url::parse("http://127.0.0.1:1/").unwrap(), None);
        let store = ProofStore::new(dir.path().join("proofs.json"));
        (client, store)
    }

    fn token_fixture() -> TokenConfig {
        TokenConfig {
            name: "VOTING_TOKEN".into(),
            address: "0x64033B2270fd9D6bbFc35736d2aC812942cE75fE".into(),
            balance_slot: Some(0),
            extra: None,
        }
    }

    #[tokio::test]
    async fn storage_proof_requires_existing_roots() {
        let dir = tempfile::tempdir().unwrap();
        let (client, store) = assembler_fixture(&dir);
        let assembler = ProofAssembler::new(&client, &store, 4_196_648);

        let mut set = ResultSet::default();
        let voter = crate::proofs::evm::parse_address(
            "0x6D603081563784dB3f83ef1F65Cc389D94365Ac9",
        )
        .unwrap();
        let err = assembler
            .generate_voter_slot_proof(&mut set, &token_fixture(), 0, voter, "balanceStorageProofRlp")
            .await
            .unwrap_err();
        assert!(matches!(err, ProofError::MissingBundle { .. }));
        // nothing may be persisted on a precondition violation
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn value_capture_requires_existing_roots() {
        let dir = tempfile::tempdir().unwrap();
        let (client, store) = assembler_fixture(&dir);
        let assembler = ProofAssembler::new(&client, &store, 4_196_648);

        let mut set = ResultSet::default();
        let voter = crate::proofs::evm::parse_address(
            "0x6D603081563784dB3f83ef1F65Cc389D94365Ac9",
        )
        .unwrap();
        let err = assembler
            .capture_voter_values(&mut set, &token_fixture(), voter)
            .await
            .unwrap_err();
        assert!(matches!(err, ProofError::MissingBundle { .. }));
        assert!(!store.path().exists());
    }

    #[test]
    fn abi_uint256_hex_pads_to_a_full_word() {
        assert_eq!(
            abi_uint256_hex("0x2a").unwrap(),
            "0x000000000000000000000000000000000000000000000000000000000000002a"
        );
        assert_eq!(
            abi_uint256_hex("0x0").unwrap(),
            "0x0000000000000000000000000000000000000000000000000000000000000000"
        );
    }
}

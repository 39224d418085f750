use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::proofs::error::{ProofError, ProofResult};

/// Accumulated proof artifacts for one logical name.
///
/// Created when roots are generated, then progressively enriched by storage
/// proofs and derived-value capture; never removed within a run. All byte
/// strings are `0x`-prefixed hex.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProofBundle {
    /// Target contract address
    pub token: String,

    #[serde(rename = "blockHeaderRLP", skip_serializing_if = "Option::is_none")]
    pub block_header_rlp: Option<String>,
    #[serde(rename = "accountStateProofRLP", skip_serializing_if = "Option::is_none")]
    pub account_state_proof_rlp: Option<String>,

    // declared slots, raw index and 32-byte padded form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_balance_slot_raw: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_balance_slot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegation_slot_raw: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegation_balance_slot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_rate_slot_raw: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_rate_slot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representatives_slot_raw: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representatives_slot: Option<String>,

    // two-level representative lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representatives_slot_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub represented: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,

    // derived values, ABI uint256 hex
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voting_power: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegating: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_slot_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegation_balance_slot_value: Option<String>,

    /// Named storage-proof RLP strings, keyed by caller-supplied proof name
    #[serde(flatten)]
    pub storage_proofs: BTreeMap<String, String>,
}

impl ProofBundle {
    /// New bundle for a target contract
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Default::default()
        }
    }
}

/// The full persisted result document: top-level run metadata plus one
/// [`ProofBundle`] per logical name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_creator: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub governance: Option<String>,

    #[serde(flatten)]
    pub bundles: BTreeMap<String, ProofBundle>,
}

impl ResultSet {
    /// Bundle for `name`, created with the given token address if absent
    pub fn ensure_bundle(&mut self, name: &str, token: &str) -> &mut ProofBundle {
        self.bundles
            .entry(name.to_string())
            .or_insert_with(|| ProofBundle::new(token))
    }

    /// Bundle for `name`, or the precondition error if roots were never
    /// generated for it
    pub fn require_bundle(&mut self, name: &str) -> ProofResult<&mut ProofBundle> {
        self.bundles
            .get_mut(name)
            .ok_or_else(|| ProofError::missing_bundle(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_proofs_flatten_into_the_bundle_object() {
        let mut bundle = ProofBundle::new("0x64033b2270fd9d6bbfc35736d2ac812942ce75fe");
        bundle
            .storage_proofs
            .insert("balanceStorageProofRlp".into(), "0xdead".into());
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["balanceStorageProofRlp"], "0xdead");
        assert_eq!(json["token"], "0x64033b2270fd9d6bbfc35736d2ac812942ce75fe");
        assert!(json.get("balance").is_none());

        let back: ProofBundle = serde_json::from_value(json).unwrap();
        assert_eq!(back, bundle);
    }

    #[test]
    fn ensure_is_idempotent_and_keeps_state() {
        let mut set = ResultSet::default();
        set.ensure_bundle("TOKEN", "0xaa").balance = Some("0x01".into());
        set.ensure_bundle("TOKEN", "0xaa");
        assert_eq!(set.bundles.len(), 1);
        assert_eq!(set.bundles["TOKEN"].balance.as_deref(), Some("0x01"));
    }

    #[test]
    fn require_refuses_unknown_names() {
        let mut set = ResultSet::default();
        assert!(matches!(
            set.require_bundle("TOKEN"),
            Err(ProofError::MissingBundle { .. })
        ));
        set.ensure_bundle("TOKEN", "0xaa");
        assert!(set.require_bundle("TOKEN").is_ok());
    }

    #[test]
    fn result_set_round_trips_with_metadata() {
        let mut set = ResultSet::default();
        set.voter = Some("0x6d603081563784db3f83ef1f65cc389d94365ac9".into());
        set.tokens = vec!["0xaa".into(), "0xbb".into()];
        set.ensure_bundle("TOKEN", "0xaa").delegating = Some(false);

        let json = serde_json::to_string(&set).unwrap();
        let back: ResultSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}

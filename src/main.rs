// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use anyhow::Result;
use governance_proofs::proofs::evm::encode_hex;
use governance_proofs::{Config, EthClient, ExtraSlot, ProofAssembler, ProofStore};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = Config::from_env()?;
    let client = EthClient::new(cfg.rpc_url.clone(), None);
    let store = ProofStore::new(&cfg.out_path);
    let mut set = store.load_or_default()?;
    let assembler = ProofAssembler::new(&client, &store, cfg.block_number);

    // roots: pinned header + account proof per target contract
    for token in cfg.tokens.iter().chain(std::iter::once(&cfg.governance)) {
        assembler.generate_roots(&mut set, token).await?;
    }

    // balance storage proofs for the voter
    for token in &cfg.tokens {
        if let Some(raw_slot) = token.balance_slot {
            assembler
                .generate_voter_slot_proof(
                    &mut set,
                    token,
                    raw_slot,
                    cfg.voter,
                    "balanceStorageProofRlp",
                )
                .await?;
        }
    }

    // token-specific extra proofs
    for token in &cfg.tokens {
        match token.extra {
            Some(ExtraSlot::ExchangeRate(raw_slot)) => {
                assembler
                    .generate_fixed_slot_proof(
                        &mut set,
                        token,
                        raw_slot,
                        "exchangeRateStorageProofRlp",
                    )
                    .await?;
            }
            Some(ExtraSlot::DelegationBalance(raw_slot)) => {
                assembler
                    .generate_voter_slot_proof(
                        &mut set,
                        token,
                        raw_slot,
                        cfg.voter,
                        "delegationStorageProofRlp",
                    )
                    .await?;
            }
            Some(ExtraSlot::Representatives(_)) | None => {}
        }
    }

    // representative lookup in the governance contract's two-level mapping
    if let Some(ExtraSlot::Representatives(raw_slot)) = cfg.governance.extra {
        assembler
            .generate_representative_proof(
                &mut set,
                &cfg.governance,
                raw_slot,
                cfg.voter,
                cfg.representative_chain_id,
                "proofOfRepresentative",
            )
            .await?;
    }

    // live values for cross-checking the proofs
    for token in &cfg.tokens {
        assembler.capture_voter_values(&mut set, token, cfg.voter).await?;
    }

    set.voter = Some(encode_hex(cfg.voter.as_bytes()));
    set.proposal_creator = Some(encode_hex(cfg.proposal_creator.as_bytes()));
    set.tokens = cfg.tokens.iter().map(|t| t.address.clone()).collect();
    set.governance = Some(cfg.governance.address.clone());
    store.save(&set)?;

    tracing::info!(
        "wrote {} proof bundles to {}",
        set.bundles.len(),
        cfg.out_path.display()
    );
    Ok(())
}

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Proxy Manager
//!
//! Deploys proxies and retargets them under the rotating-secret scheme.
//!
//! # Retarget protocol
//! 1. Read the stored commitment; reject locally if the secret does not open it
//! 2. Send one transaction carrying the new target AND the next commitment
//! 3. A revert caused by a stale secret is still reported as `Unauthorized`
//!
//! A rejected retarget sends nothing or reverts, so neither the target nor
//! the commitment moves.

use super::{ProxyError, ProxyKind, Result};
use crate::error::DeployError;
use crate::ledger::{Call, Constructor, LedgerError, Receipt, Transactor};
use crate::registry::ContractRegistry;
use crate::types::{Address, ContractArtifact, RegistryEnrollment, SecretHash, UpgradeSecret};
use std::collections::BTreeSet;

/// A deployed proxy: its enrollment plus its kind. The live target is
/// on-chain only; read it with [`ProxyManager::current_target`].
#[derive(Clone, Debug, PartialEq)]
pub struct ProxyRecord {
    pub kind: ProxyKind,
    pub enrollment: RegistryEnrollment,
}

impl ProxyRecord {
    pub fn address(&self) -> Address {
        self.enrollment.address
    }
}

pub struct ProxyManager<'t, 'a> {
    transactor: &'t Transactor<'a>,
}

impl<'t, 'a> ProxyManager<'t, 'a> {
    pub fn new(transactor: &'t Transactor<'a>) -> Self {
        Self { transactor }
    }

    /// Deploy a proxy of `kind` from its compiled `artifact`, pointed at
    /// `target` and guarded by `secret_hash`.
    pub fn deploy_proxy(
        &self,
        kind: ProxyKind,
        artifact: &ContractArtifact,
        target: Address,
        secret_hash: SecretHash,
    ) -> crate::ledger::Result<ProxyRecord> {
        let receipt = self.transactor.submit(
            None,
            Call::Create {
                contract_name: artifact.name.clone(),
                version: artifact.version,
                bytecode: artifact.bytecode.clone(),
                constructor: Constructor::Proxy {
                    kind,
                    target,
                    secret_hash,
                },
            },
        )?;
        let address = receipt
            .contract_address
            .ok_or_else(|| LedgerError::UnexpectedValue("receipt has no contract address".into()))?;
        tracing::info!("Deployed {} at {} -> {}", kind, address, target);

        Ok(ProxyRecord {
            kind,
            enrollment: RegistryEnrollment::new(
                kind.contract_name(),
                artifact.version,
                address,
                artifact.abi.clone(),
            ),
        })
    }

    /// Point `proxy` at `new_target`, spending `current_secret` and
    /// installing `next_secret_hash`.
    pub fn retarget(
        &self,
        proxy: &ProxyRecord,
        new_target: Address,
        current_secret: &UpgradeSecret,
        next_secret_hash: SecretHash,
    ) -> Result<Receipt> {
        let address = proxy.address();
        let stored = self.stored_commitment(proxy)?;
        if !stored.opens_with(current_secret) {
            tracing::warn!("Rejected retarget of {}: secret does not match commitment", address);
            return Err(ProxyError::Unauthorized { proxy: address });
        }

        let call = proxy
            .kind
            .retarget_call(new_target, current_secret.clone(), next_secret_hash);
        match self.transactor.submit(Some(address), call) {
            Ok(receipt) => {
                tracing::info!("Retargeted {} {} -> {}", proxy.kind, address, new_target);
                Ok(receipt)
            }
            Err(LedgerError::Reverted { tx_hash }) => {
                // Someone may have rotated the secret between read and send.
                if !self.stored_commitment(proxy)?.opens_with(current_secret) {
                    return Err(ProxyError::Unauthorized { proxy: address });
                }
                Err(LedgerError::Reverted { tx_hash }.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Live target of `proxy`. Pure read.
    pub fn current_target(&self, proxy: &ProxyRecord) -> Result<Address> {
        self.read_target(proxy.kind, proxy.address())
    }

    pub fn stored_commitment(&self, proxy: &ProxyRecord) -> Result<SecretHash> {
        let value = self
            .transactor
            .call(proxy.address(), proxy.kind.commitment_query())
            .map_err(|e| self.not_a_proxy(e, proxy.kind, proxy.address()))?;
        Ok(value.into_hash()?)
    }

    /// Find the live proxy of `contract_name`.
    ///
    /// Proxies of one kind share a registry name, so the match is made
    /// on-chain: the newest enrolled proxy whose target is one of the
    /// contract's enrolled addresses wins.
    pub fn locate(
        &self,
        registry: &dyn ContractRegistry,
        kind: ProxyKind,
        contract_name: &str,
    ) -> crate::error::Result<Option<ProxyRecord>> {
        let implementations: BTreeSet<Address> = registry
            .search(Some(contract_name), None)?
            .into_iter()
            .map(|e| e.address)
            .collect();
        if implementations.is_empty() {
            return Ok(None);
        }

        for enrollment in registry.search(Some(kind.contract_name()), None)?.into_iter().rev() {
            match self.read_target(kind, enrollment.address) {
                Ok(target) if implementations.contains(&target) => {
                    return Ok(Some(ProxyRecord { kind, enrollment }));
                }
                Ok(_) => continue,
                Err(ProxyError::NotAProxy { address, .. }) => {
                    tracing::warn!("Enrolled {} at {} is not live on-chain", kind, address);
                    continue;
                }
                Err(e) => {
                    return Err(DeployError::Retarget {
                        proxy: enrollment.address,
                        orphaned: None,
                        source: e,
                    })
                }
            }
        }
        Ok(None)
    }

    fn read_target(&self, kind: ProxyKind, address: Address) -> Result<Address> {
        let value = self
            .transactor
            .call(address, kind.target_query())
            .map_err(|e| self.not_a_proxy(e, kind, address))?;
        Ok(value.into_address()?)
    }

    fn not_a_proxy(&self, err: LedgerError, kind: ProxyKind, address: Address) -> ProxyError {
        match err {
            LedgerError::UnknownContract(_) | LedgerError::UnexpectedValue(_) => {
                ProxyError::NotAProxy { address, kind }
            }
            other => ProxyError::Ledger(other),
        }
    }
}

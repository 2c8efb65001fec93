// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Simulated Chain
//!
//! A deterministic in-memory ledger that executes the calls this crate
//! issues, including both proxy kinds with their on-chain commitment check.
//!
//! # Semantics
//! - automine on: every send is mined into its own new block
//! - automine off: sends stay pending until `mine()`
//! - a retarget with a wrong secret is mined as a revert; nothing changes
//! - state (minus pending transactions) serializes for dev-chain files

use super::{
    Call, CallValue, Constructor, LedgerClient, LedgerError, Query, Receipt, Result, SignedTransaction,
    Signer, Transaction, TxStatus,
};
use crate::proxy::ProxyKind;
use crate::types::{Address, Bytecode, SecretHash, TxHash, UpgradeSecret, Version};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// On-chain storage of a proxy: the live target and the next commitment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySlot {
    pub kind: ProxyKind,
    pub target: Address,
    pub secret_hash: SecretHash,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractAccount {
    pub name: String,
    pub version: Version,
    pub bytecode: Bytecode,
    pub proxy: Option<ProxySlot>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainState {
    pub block_number: u64,
    pub automine: bool,
    nonces: BTreeMap<Address, u64>,
    contracts: BTreeMap<Address, ContractAccount>,
    receipts: BTreeMap<TxHash, Receipt>,
    #[serde(skip)]
    pending: Vec<(TxHash, u64, Transaction)>,
}

impl Default for ChainState {
    fn default() -> Self {
        Self {
            block_number: 0,
            automine: true,
            nonces: BTreeMap::new(),
            contracts: BTreeMap::new(),
            receipts: BTreeMap::new(),
            pending: Vec::new(),
        }
    }
}

impl ChainState {
    pub fn contract(&self, address: &Address) -> Option<&ContractAccount> {
        self.contracts.get(address)
    }

    pub fn contracts(&self) -> impl Iterator<Item = (&Address, &ContractAccount)> {
        self.contracts.iter()
    }

    fn mine_block(&mut self) {
        self.block_number += 1;
        let block = self.block_number;
        for (tx_hash, nonce, tx) in std::mem::take(&mut self.pending) {
            let receipt = self.execute(tx_hash, nonce, tx, block);
            self.receipts.insert(tx_hash, receipt);
        }
    }

    fn execute(&mut self, tx_hash: TxHash, nonce: u64, tx: Transaction, block_number: u64) -> Receipt {
        let outcome = match tx.call {
            Call::Create {
                contract_name,
                version,
                bytecode,
                constructor,
            } => self.create(tx.from, nonce, contract_name, version, bytecode, constructor),
            Call::DispatcherUpgrade {
                target,
                secret,
                next_secret_hash,
            } => self
                .retarget(tx.to, ProxyKind::Dispatcher, target, &secret, next_secret_hash)
                .map(|_| None),
            Call::RouterSetTarget {
                target,
                secret,
                next_secret_hash,
            } => self
                .retarget(tx.to, ProxyKind::Router, target, &secret, next_secret_hash)
                .map(|_| None),
        };

        let (status, contract_address) = match outcome {
            Ok(addr) => (TxStatus::Success, addr),
            Err(reason) => {
                tracing::debug!("sim: {} reverted: {}", tx_hash, reason);
                (TxStatus::Reverted, None)
            }
        };
        Receipt {
            tx_hash,
            block_number,
            status,
            contract_address,
        }
    }

    fn create(
        &mut self,
        from: Address,
        nonce: u64,
        name: String,
        version: Version,
        bytecode: Bytecode,
        constructor: Constructor,
    ) -> std::result::Result<Option<Address>, &'static str> {
        if bytecode.is_empty() {
            return Err("empty bytecode");
        }
        let proxy = match constructor {
            Constructor::Empty => None,
            Constructor::Proxy {
                kind,
                target,
                secret_hash,
            } => {
                if !self.contracts.contains_key(&target) {
                    return Err("proxy target has no code");
                }
                Some(ProxySlot {
                    kind,
                    target,
                    secret_hash,
                })
            }
        };
        let address = Address::derive(&from, nonce);
        self.contracts.insert(
            address,
            ContractAccount {
                name,
                version,
                bytecode,
                proxy,
            },
        );
        Ok(Some(address))
    }

    fn retarget(
        &mut self,
        proxy: Option<Address>,
        kind: ProxyKind,
        target: Address,
        secret: &UpgradeSecret,
        next_secret_hash: SecretHash,
    ) -> std::result::Result<(), &'static str> {
        let proxy = proxy.ok_or("retarget without recipient")?;
        if !self.contracts.contains_key(&target) {
            return Err("new target has no code");
        }
        let slot = self
            .contracts
            .get_mut(&proxy)
            .and_then(|c| c.proxy.as_mut())
            .ok_or("recipient is not a proxy")?;
        if slot.kind != kind {
            return Err("wrong proxy interface");
        }
        if !slot.secret_hash.opens_with(secret) {
            return Err("secret does not match commitment");
        }
        slot.target = target;
        slot.secret_hash = next_secret_hash;
        Ok(())
    }
}

/// In-memory ledger. Interior mutability so it can sit behind `&dyn LedgerClient`.
#[derive(Debug, Default)]
pub struct SimLedger {
    state: Mutex<ChainState>,
    reject_next: Mutex<Option<String>>,
}

impl SimLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: ChainState) -> Self {
        Self {
            state: Mutex::new(state),
            reject_next: Mutex::new(None),
        }
    }

    /// Copy of the current state, without pending transactions.
    pub fn snapshot(&self) -> ChainState {
        let mut state = self.lock().clone();
        state.pending.clear();
        state
    }

    pub fn set_automine(&self, on: bool) {
        self.lock().automine = on;
    }

    /// Mine `blocks` blocks; pending transactions land in the first one.
    pub fn mine(&self, blocks: u64) {
        let mut state = self.lock();
        for _ in 0..blocks {
            state.mine_block();
        }
    }

    /// Make the next `send` fail as if the node refused it.
    pub fn reject_next_send(&self, reason: impl Into<String>) {
        *self.reject_next.lock().unwrap_or_else(|e| e.into_inner()) = Some(reason.into());
    }

    pub fn proxy_slot(&self, proxy: &Address) -> Option<ProxySlot> {
        self.lock().contracts.get(proxy).and_then(|c| c.proxy.clone())
    }

    pub fn contract_count(&self) -> usize {
        self.lock().contracts.len()
    }

    fn lock(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LedgerClient for SimLedger {
    fn send(&self, signed: SignedTransaction) -> Result<TxHash> {
        if let Some(reason) = self.reject_next.lock().unwrap_or_else(|e| e.into_inner()).take() {
            return Err(LedgerError::Rejected(reason));
        }

        let mut state = self.lock();
        let tx = signed.transaction;
        let nonce = {
            let n = state.nonces.entry(tx.from).or_insert(0);
            let current = *n;
            *n += 1;
            current
        };

        let mut hasher = blake3::Hasher::new();
        hasher.update(b"deploykit:tx");
        hasher.update(tx.from.as_bytes());
        hasher.update(&nonce.to_le_bytes());
        hasher.update(tx.call.label().as_bytes());
        hasher.update(&signed.signature);
        let tx_hash = TxHash(*hasher.finalize().as_bytes());

        state.pending.push((tx_hash, nonce, tx));
        if state.automine {
            state.mine_block();
        }
        Ok(tx_hash)
    }

    fn receipt(&self, tx_hash: &TxHash) -> Result<Option<Receipt>> {
        Ok(self.lock().receipts.get(tx_hash).cloned())
    }

    fn block_number(&self) -> Result<u64> {
        Ok(self.lock().block_number)
    }

    fn call(&self, contract: Address, query: Query) -> Result<CallValue> {
        let state = self.lock();
        let account = state
            .contracts
            .get(&contract)
            .ok_or(LedgerError::UnknownContract(contract))?;
        let (kind, want_target) = match query {
            Query::DispatcherTarget => (ProxyKind::Dispatcher, true),
            Query::DispatcherSecretHash => (ProxyKind::Dispatcher, false),
            Query::RouterTarget => (ProxyKind::Router, true),
            Query::RouterSecretHash => (ProxyKind::Router, false),
        };
        match &account.proxy {
            Some(slot) if slot.kind == kind => Ok(if want_target {
                CallValue::Address(slot.target)
            } else {
                CallValue::Hash(slot.secret_hash)
            }),
            _ => Err(LedgerError::UnexpectedValue(format!(
                "{} does not implement {}",
                contract, kind
            ))),
        }
    }

    fn code(&self, address: Address) -> Result<Option<Bytecode>> {
        Ok(self.lock().contracts.get(&address).map(|c| c.bytecode.clone()))
    }
}

/// Signer that only stamps the sender. No key material involved.
#[derive(Clone, Debug)]
pub struct LocalSigner {
    address: Address,
}

impl LocalSigner {
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

impl Signer for LocalSigner {
    fn address(&self) -> Address {
        self.address
    }

    fn sign_and_send(&self, ledger: &dyn LedgerClient, tx: Transaction) -> Result<TxHash> {
        ledger.send(SignedTransaction {
            transaction: tx,
            signature: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed(from: Address, to: Option<Address>, call: Call) -> SignedTransaction {
        SignedTransaction {
            transaction: Transaction { from, to, call },
            signature: Vec::new(),
        }
    }

    fn create(name: &str) -> Call {
        Call::Create {
            contract_name: name.into(),
            version: Version::new(1, 0, 0),
            bytecode: Bytecode(vec![1, 2, 3]),
            constructor: Constructor::Empty,
        }
    }

    #[test]
    fn test_pending_until_mined() {
        let ledger = SimLedger::new();
        ledger.set_automine(false);
        let from = Address([9; 20]);

        let hash = ledger.send(signed(from, None, create("A"))).unwrap();
        assert!(ledger.receipt(&hash).unwrap().is_none());

        ledger.mine(1);
        let receipt = ledger.receipt(&hash).unwrap().unwrap();
        assert!(receipt.succeeded());
        assert_eq!(receipt.block_number, 1);
    }

    #[test]
    fn test_rejected_send_leaves_no_trace() {
        let ledger = SimLedger::new();
        ledger.reject_next_send("insufficient funds");
        let err = ledger.send(signed(Address([9; 20]), None, create("A"))).unwrap_err();
        assert_eq!(err, LedgerError::Rejected("insufficient funds".into()));
        assert_eq!(ledger.contract_count(), 0);
        assert_eq!(ledger.block_number().unwrap(), 0);
    }

    #[test]
    fn test_state_roundtrips_through_json() {
        let ledger = SimLedger::new();
        let hash = ledger.send(signed(Address([9; 20]), None, create("A"))).unwrap();

        let json = serde_json::to_string(&ledger.snapshot()).unwrap();
        let restored = SimLedger::from_state(serde_json::from_str(&json).unwrap());
        assert_eq!(restored.receipt(&hash).unwrap(), ledger.receipt(&hash).unwrap());
        assert_eq!(restored.contract_count(), 1);
    }
}

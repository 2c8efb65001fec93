// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Ledger collaborator boundary.
//!
//! The chain itself (transport, mining, signing internals) is external.
//! Everything in this crate reaches it through [`LedgerClient`] and
//! [`Signer`], passed explicitly into each operation.
//!
//! # Modules
//! - `transactor` = sign, send, then poll for confirmations
//! - `sim` = deterministic in-memory chain for tests and dev runs

pub mod sim;
pub mod transactor;

pub use transactor::{ConfirmationPolicy, Transactor};

use crate::proxy::ProxyKind;
use crate::types::{Address, Bytecode, SecretHash, TxHash, UpgradeSecret, Version};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("transaction {tx_hash} not confirmed within {waited:?}")]
    TransactionTimeout { tx_hash: TxHash, waited: Duration },

    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: TxHash },

    #[error("transaction rejected by node: {0}")]
    Rejected(String),

    #[error("no contract at {0}")]
    UnknownContract(Address),

    #[error("unexpected call result: {0}")]
    UnexpectedValue(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Constructor arguments for a contract creation.
#[derive(Clone, Debug, PartialEq)]
pub enum Constructor {
    /// Plain implementation contract.
    Empty,
    /// Proxy pointed at `target`, guarded by `secret_hash`.
    Proxy {
        kind: ProxyKind,
        target: Address,
        secret_hash: SecretHash,
    },
}

/// Every state-changing call this crate can issue.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Create {
        contract_name: String,
        version: Version,
        bytecode: Bytecode,
        constructor: Constructor,
    },
    /// `Dispatcher.upgrade(target, secret, nextSecretHash)`
    DispatcherUpgrade {
        target: Address,
        secret: UpgradeSecret,
        next_secret_hash: SecretHash,
    },
    /// `StakingInterfaceRouter.setTarget(target, secret, nextSecretHash)`
    RouterSetTarget {
        target: Address,
        secret: UpgradeSecret,
        next_secret_hash: SecretHash,
    },
}

impl Call {
    pub fn label(&self) -> &'static str {
        match self {
            Call::Create { .. } => "create",
            Call::DispatcherUpgrade { .. } => "Dispatcher.upgrade",
            Call::RouterSetTarget { .. } => "StakingInterfaceRouter.setTarget",
        }
    }
}

/// Read-only calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Query {
    DispatcherTarget,
    DispatcherSecretHash,
    RouterTarget,
    RouterSecretHash,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CallValue {
    Address(Address),
    Hash(SecretHash),
}

impl CallValue {
    pub fn into_address(self) -> Result<Address> {
        match self {
            CallValue::Address(a) => Ok(a),
            other => Err(LedgerError::UnexpectedValue(format!("expected address, got {:?}", other))),
        }
    }

    pub fn into_hash(self) -> Result<SecretHash> {
        match self {
            CallValue::Hash(h) => Ok(h),
            other => Err(LedgerError::UnexpectedValue(format!("expected hash, got {:?}", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub from: Address,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub call: Call,
}

/// A transaction stamped by a [`Signer`]. Signature bytes are opaque here.
#[derive(Clone, Debug, PartialEq)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signature: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    Success,
    Reverted,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub status: TxStatus,
    pub contract_address: Option<Address>,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.status == TxStatus::Success
    }
}

/// Narrow view of a chain node.
pub trait LedgerClient {
    fn send(&self, tx: SignedTransaction) -> Result<TxHash>;

    /// `None` while the transaction is not yet mined.
    fn receipt(&self, tx_hash: &TxHash) -> Result<Option<Receipt>>;

    fn block_number(&self) -> Result<u64>;

    fn call(&self, contract: Address, query: Query) -> Result<CallValue>;

    /// Deployed code at `address`, if any.
    fn code(&self, address: Address) -> Result<Option<Bytecode>>;
}

/// Credential boundary. Key handling is out of scope for this crate.
pub trait Signer {
    fn address(&self) -> Address;

    fn sign_and_send(&self, ledger: &dyn LedgerClient, tx: Transaction) -> Result<TxHash>;
}

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Sign, send and wait.
//!
//! Confirmation waiting is a bounded poll loop: the receipt must exist and
//! have `confirmations` blocks on top of it before `timeout` elapses.
//! Running out of time is `TransactionTimeout`, which callers may retry.

use super::{Call, CallValue, LedgerClient, LedgerError, Query, Receipt, Result, Signer, Transaction};
use crate::types::{Address, Bytecode, TxHash};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub confirmations: u64,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            confirmations: 0,
            timeout: Duration::from_secs(180),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Pairs a ledger with a signer for the duration of one operation.
pub struct Transactor<'a> {
    ledger: &'a dyn LedgerClient,
    signer: &'a dyn Signer,
    policy: ConfirmationPolicy,
}

impl<'a> Transactor<'a> {
    pub fn new(ledger: &'a dyn LedgerClient, signer: &'a dyn Signer, policy: ConfirmationPolicy) -> Self {
        Self { ledger, signer, policy }
    }

    pub fn sender(&self) -> Address {
        self.signer.address()
    }

    pub fn policy(&self) -> ConfirmationPolicy {
        self.policy
    }

    /// Submit a state-changing call and wait for it to settle.
    ///
    /// Returns only successful receipts; a reverted transaction is
    /// `LedgerError::Reverted`.
    pub fn submit(&self, to: Option<Address>, call: Call) -> Result<Receipt> {
        let label = call.label();
        let tx = Transaction {
            from: self.signer.address(),
            to,
            call,
        };
        let tx_hash = self.signer.sign_and_send(self.ledger, tx)?;
        tracing::debug!("Sent {} as {}", label, tx_hash);

        let receipt = self.wait_for_receipt(&tx_hash)?;
        if !receipt.succeeded() {
            tracing::warn!("{} reverted in block {}", tx_hash, receipt.block_number);
            return Err(LedgerError::Reverted { tx_hash });
        }
        Ok(receipt)
    }

    pub fn call(&self, contract: Address, query: Query) -> Result<CallValue> {
        self.ledger.call(contract, query)
    }

    pub fn code(&self, address: Address) -> Result<Option<Bytecode>> {
        self.ledger.code(address)
    }

    fn wait_for_receipt(&self, tx_hash: &TxHash) -> Result<Receipt> {
        let start = Instant::now();
        loop {
            if let Some(receipt) = self.ledger.receipt(tx_hash)? {
                // Reverts are final; no point waiting for depth.
                if !receipt.succeeded() {
                    return Ok(receipt);
                }
                let head = self.ledger.block_number()?;
                let depth = head.saturating_sub(receipt.block_number);
                if depth >= self.policy.confirmations {
                    return Ok(receipt);
                }
                tracing::debug!(
                    "{} has {}/{} confirmations",
                    tx_hash,
                    depth,
                    self.policy.confirmations
                );
            }

            let waited = start.elapsed();
            if waited >= self.policy.timeout {
                return Err(LedgerError::TransactionTimeout {
                    tx_hash: *tx_hash,
                    waited,
                });
            }
            std::thread::sleep(self.policy.poll_interval.min(self.policy.timeout - waited));
        }
    }
}

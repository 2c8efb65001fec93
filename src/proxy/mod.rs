// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Proxy deployment and authorized retargeting.

pub mod kind;
pub mod manager;

pub use kind::ProxyKind;
pub use manager::{ProxyManager, ProxyRecord};

use crate::ledger::LedgerError;
use crate::types::Address;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProxyError {
    #[error("secret does not open the commitment stored in {proxy}")]
    Unauthorized { proxy: Address },

    #[error("{address} is not a {kind}")]
    NotAProxy { address: Address, kind: ProxyKind },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

pub type Result<T> = std::result::Result<T, ProxyError>;

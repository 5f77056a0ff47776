// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use aegis_events::{ProtocolError, ProtocolErrorType, RecordId, RequestId};
use thiserror::Error;

/// Everything a protocol operation can be rejected with.
///
/// `AuthenticationFailed` and `MalformedPlaintext` are retryable: the pending
/// request entry stays live and a corrected callback can still land.
/// `UnknownRequest` and `AlreadyFinalized` are terminal for the call that
/// raised them — the caller was logically stale.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum LedgerError {
    #[error("no record {0}")]
    NotFound(RecordId),

    #[error("assessment {0} is already finalized")]
    AlreadyFinalized(RecordId),

    #[error("request {0} is unknown or already consumed")]
    UnknownRequest(RequestId),

    #[error("delivery for {0} failed proof verification")]
    AuthenticationFailed(RequestId),

    #[error("no initialized counter for category {0}")]
    CategoryNotFound(String),

    #[error("authenticated plaintext has unexpected length {0}")]
    MalformedPlaintext(usize),
}

impl LedgerError {
    pub fn err_type(&self) -> ProtocolErrorType {
        match self {
            LedgerError::NotFound(_) => ProtocolErrorType::NotFound,
            LedgerError::AlreadyFinalized(_) => ProtocolErrorType::AlreadyFinalized,
            LedgerError::UnknownRequest(_) => ProtocolErrorType::UnknownRequest,
            LedgerError::AuthenticationFailed(_) => ProtocolErrorType::AuthenticationFailed,
            LedgerError::CategoryNotFound(_) => ProtocolErrorType::CategoryNotFound,
            LedgerError::MalformedPlaintext(_) => ProtocolErrorType::MalformedPlaintext,
        }
    }
}

impl From<&LedgerError> for ProtocolError {
    fn from(err: &LedgerError) -> Self {
        ProtocolError::from_error(err.err_type(), err)
    }
}

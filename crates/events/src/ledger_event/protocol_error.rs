// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use strum::Display as StrumDisplay;

/// A protocol operation was rejected. Mirrors the ledger's typed error
/// taxonomy so observers on the bus see the same failures callers do.
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct ProtocolError {
    pub err_type: ProtocolErrorType,
    pub message: String,
}

#[derive(Clone, Copy, Debug, StrumDisplay, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolErrorType {
    NotFound,
    AlreadyFinalized,
    UnknownRequest,
    AuthenticationFailed,
    CategoryNotFound,
    MalformedPlaintext,
    Data,
}

impl ProtocolError {
    pub fn new(err_type: ProtocolErrorType, message: &str) -> Self {
        Self {
            err_type,
            message: message.to_string(),
        }
    }

    pub fn from_error(err_type: ProtocolErrorType, error: impl Display) -> Self {
        Self {
            err_type,
            message: error.to_string(),
        }
    }
}

impl Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.err_type, self.message)
    }
}

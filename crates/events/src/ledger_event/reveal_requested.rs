// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{RequestId, RevealTarget};
use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// The evaluator asked the oracle to decrypt the ciphertexts behind a target.
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct RevealRequested {
    pub request_id: RequestId,
    pub target: RevealTarget,
}

impl Display for RevealRequested {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request: {}, target: {}", self.request_id, self.target)
    }
}

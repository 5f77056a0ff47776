// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::AuthenticityProof;
use actix::Message;
use aegis_events::RequestId;
use std::fmt::{self, Display};

/// The oracle's callback: plaintext bytes for an earlier batch request plus
/// the proof that they are genuine. Arrives at an arbitrary later time and
/// must be treated as untrusted input until the proof verifies.
#[derive(Message, Clone, Debug)]
#[rtype(result = "anyhow::Result<()>")]
pub struct RevealDelivered {
    pub request_id: RequestId,
    pub plaintext: Vec<u8>,
    pub proof: AuthenticityProof,
}

impl Display for RevealDelivered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "request: {}, plaintext: {} bytes",
            self.request_id,
            self.plaintext.len()
        )
    }
}

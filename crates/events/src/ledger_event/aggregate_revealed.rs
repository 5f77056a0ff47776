// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::Message;
use aegis_classify::RiskLevel;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// The plaintext running count for one risk category, as authenticated by
/// the oracle. This event is the sink for category reveals; the ledger does
/// not retain the revealed value.
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct AggregateRevealed {
    pub category: RiskLevel,
    pub count: u32,
}

impl Display for AggregateRevealed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "category: {}, count: {}", self.category, self.count)
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::RecordId;
use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// An institution's assessment was revealed, classified and latched.
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct AssessmentFinalized {
    pub id: RecordId,
}

impl Display for AssessmentFinalized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id: {}", self.id)
    }
}

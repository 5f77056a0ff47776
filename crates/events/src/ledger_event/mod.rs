// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod aggregate_revealed;
mod assessment_finalized;
mod data_submitted;
mod protocol_error;
mod reveal_requested;

pub use aggregate_revealed::*;
pub use assessment_finalized::*;
pub use data_submitted::*;
pub use protocol_error::*;
pub use reveal_requested::*;

use crate::{Event, EventId, RecordId};
use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Macro to help define From traits for LedgerEvent
macro_rules! impl_from_event {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for LedgerEvent {
                fn from(data: $variant) -> Self {
                    LedgerEvent::$variant {
                        id: EventId::hash(data.clone()),
                        data,
                    }
                }
            }
        )*
    };
}

/// Everything the protocol makes observable: submissions, reveal requests,
/// finalizations, revealed aggregates and rejected operations.
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub enum LedgerEvent {
    DataSubmitted {
        id: EventId,
        data: DataSubmitted,
    },
    RevealRequested {
        id: EventId,
        data: RevealRequested,
    },
    AssessmentFinalized {
        id: EventId,
        data: AssessmentFinalized,
    },
    AggregateRevealed {
        id: EventId,
        data: AggregateRevealed,
    },
    ProtocolError {
        id: EventId,
        data: ProtocolError,
    },
}

impl_from_event!(
    DataSubmitted,
    RevealRequested,
    AssessmentFinalized,
    AggregateRevealed,
    ProtocolError
);

impl LedgerEvent {
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }

    /// The record this event concerns, where one applies.
    pub fn get_record_id(&self) -> Option<RecordId> {
        match self {
            LedgerEvent::DataSubmitted { data, .. } => Some(data.id),
            LedgerEvent::AssessmentFinalized { data, .. } => Some(data.id),
            _ => None,
        }
    }
}

impl Event for LedgerEvent {
    type Id = EventId;

    fn event_type(&self) -> String {
        match self {
            LedgerEvent::DataSubmitted { .. } => "DataSubmitted",
            LedgerEvent::RevealRequested { .. } => "RevealRequested",
            LedgerEvent::AssessmentFinalized { .. } => "AssessmentFinalized",
            LedgerEvent::AggregateRevealed { .. } => "AggregateRevealed",
            LedgerEvent::ProtocolError { .. } => "ProtocolError",
        }
        .to_string()
    }

    fn event_id(&self) -> Self::Id {
        match self {
            LedgerEvent::DataSubmitted { id, .. }
            | LedgerEvent::RevealRequested { id, .. }
            | LedgerEvent::AssessmentFinalized { id, .. }
            | LedgerEvent::AggregateRevealed { id, .. }
            | LedgerEvent::ProtocolError { id, .. } => id.clone(),
        }
    }
}

impl Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerEvent::DataSubmitted { data, .. } => {
                write!(f, "DataSubmitted({})", data)
            }
            LedgerEvent::RevealRequested { data, .. } => {
                write!(f, "RevealRequested({})", data)
            }
            LedgerEvent::AssessmentFinalized { data, .. } => {
                write!(f, "AssessmentFinalized({})", data)
            }
            LedgerEvent::AggregateRevealed { data, .. } => {
                write!(f, "AggregateRevealed({})", data)
            }
            LedgerEvent::ProtocolError { data, .. } => {
                write!(f, "ProtocolError({})", data)
            }
        }
    }
}

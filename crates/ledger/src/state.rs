// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::LedgerError;
use aegis_classify::{Classification, RiskLevel, SystemicFlag};
use aegis_events::{CategoryKey, RecordId, RequestId, RevealTarget};
use aegis_oracle::CiphertextHandle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One institution's submitted measurements. The three ciphertexts stay
/// opaque to the ledger for the record's whole lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncryptedMeasurement {
    pub id: RecordId,
    pub breach_attempts: CiphertextHandle,
    pub response_time_minutes: CiphertextHandle,
    pub vulnerability_count: CiphertextHandle,
    pub submitted_at: DateTime<Utc>,
}

/// Derived risk conclusions for one record. Fields are populated exactly
/// once, when the finalization latch flips.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub risk_level: Option<RiskLevel>,
    pub recommendations: Option<String>,
    pub systemic_flag: Option<SystemicFlag>,
    pub is_revealed: bool,
}

impl Assessment {
    /// Write the classification outcome and flip the latch. Invariant: the
    /// derived fields are all `Some` iff `is_revealed`.
    pub fn finalize(&mut self, id: RecordId, outcome: &Classification) -> Result<(), LedgerError> {
        if self.is_revealed {
            return Err(LedgerError::AlreadyFinalized(id));
        }
        self.risk_level = Some(outcome.risk_level);
        self.recommendations = Some(outcome.recommendations.to_string());
        self.systemic_flag = Some(outcome.systemic_flag);
        self.is_revealed = true;
        Ok(())
    }
}

/// Per-category encrypted running count. Presence in the counters map is
/// what "initialized" means; `count` always denotes a valid ciphertext.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateCounter {
    pub count: CiphertextHandle,
}

/// The ledger's whole authoritative state. All mutation goes through the
/// RiskLedger actor, which commits a complete next state or nothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub next_id: RecordId,
    pub records: BTreeMap<RecordId, EncryptedMeasurement>,
    pub assessments: BTreeMap<RecordId, Assessment>,
    pub pending: BTreeMap<RequestId, RevealTarget>,
    pub counters: BTreeMap<RiskLevel, AggregateCounter>,
    /// Append-only sequence of categories whose counters exist, used to
    /// reverse a category digest back to its name. Never reordered.
    pub registry: Vec<RiskLevel>,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            next_id: RecordId::FIRST,
            records: BTreeMap::new(),
            assessments: BTreeMap::new(),
            pending: BTreeMap::new(),
            counters: BTreeMap::new(),
            registry: Vec::new(),
        }
    }
}

impl LedgerState {
    /// Store a fresh measurement with an empty paired assessment and hand
    /// out its id. Ids are strictly increasing from 1 and never reused.
    pub fn submit(
        &mut self,
        breach_attempts: CiphertextHandle,
        response_time_minutes: CiphertextHandle,
        vulnerability_count: CiphertextHandle,
        submitted_at: DateTime<Utc>,
    ) -> RecordId {
        let id = self.next_id;
        self.next_id = id.next();
        self.records.insert(
            id,
            EncryptedMeasurement {
                id,
                breach_attempts,
                response_time_minutes,
                vulnerability_count,
                submitted_at,
            },
        );
        self.assessments.insert(id, Assessment::default());
        id
    }

    pub fn measurement(&self, id: RecordId) -> Option<&EncryptedMeasurement> {
        self.records.get(&id)
    }

    pub fn assessment(&self, id: RecordId) -> Result<&Assessment, LedgerError> {
        self.assessments.get(&id).ok_or(LedgerError::NotFound(id))
    }

    /// The ciphertexts to put in an institution reveal batch, in the fixed
    /// wire order. Rejects unknown ids and already-finalized assessments.
    pub fn institution_batch(&self, id: RecordId) -> Result<Vec<CiphertextHandle>, LedgerError> {
        if self.assessment(id)?.is_revealed {
            return Err(LedgerError::AlreadyFinalized(id));
        }
        let record = self.records.get(&id).ok_or(LedgerError::NotFound(id))?;
        Ok(vec![
            record.breach_attempts.clone(),
            record.response_time_minutes.clone(),
            record.vulnerability_count.clone(),
        ])
    }

    /// The single-ciphertext batch for a category reveal. Only categories
    /// with an initialized counter can be revealed.
    pub fn category_batch(&self, category: RiskLevel) -> Result<Vec<CiphertextHandle>, LedgerError> {
        let counter = self
            .counters
            .get(&category)
            .ok_or_else(|| LedgerError::CategoryNotFound(category.to_string()))?;
        Ok(vec![counter.count.clone()])
    }

    pub fn insert_pending(&mut self, request_id: RequestId, target: RevealTarget) {
        self.pending.insert(request_id, target);
    }

    pub fn pending_target(&self, request_id: RequestId) -> Result<RevealTarget, LedgerError> {
        self.pending
            .get(&request_id)
            .copied()
            .ok_or(LedgerError::UnknownRequest(request_id))
    }

    pub fn consume_pending(&mut self, request_id: RequestId) {
        self.pending.remove(&request_id);
    }

    /// Replace (or create) a category's counter handle. First creation also
    /// appends the category to the registry — exactly once.
    pub fn set_counter(&mut self, category: RiskLevel, count: CiphertextHandle) {
        if self.counters.insert(category, AggregateCounter { count }).is_none() {
            self.registry.push(category);
        }
    }

    pub fn counter(&self, category: RiskLevel) -> Result<&AggregateCounter, LedgerError> {
        self.counters
            .get(&category)
            .ok_or_else(|| LedgerError::CategoryNotFound(category.to_string()))
    }

    /// Reverse a category digest back to its name by rescanning the
    /// registry. Linear, and fine: the registry is bounded by the fixed
    /// four-category taxonomy.
    pub fn resolve_category(&self, key: CategoryKey) -> Result<RiskLevel, LedgerError> {
        self.registry
            .iter()
            .copied()
            .find(|category| CategoryKey::of(*category) == key)
            .ok_or_else(|| LedgerError::CategoryNotFound(key.to_string()))
    }
}

/// Decode an institution plaintext: three u32 little-endian values in the
/// fixed order breach_attempts, response_time_minutes, vulnerability_count.
pub fn decode_measurement_plaintext(bytes: &[u8]) -> Result<(u32, u32, u32), LedgerError> {
    if bytes.len() != 12 {
        return Err(LedgerError::MalformedPlaintext(bytes.len()));
    }
    let word = |i: usize| {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&bytes[i * 4..(i + 1) * 4]);
        u32::from_le_bytes(buf)
    };
    Ok((word(0), word(1), word(2)))
}

/// Decode a category plaintext: one u32 little-endian count.
pub fn decode_count_plaintext(bytes: &[u8]) -> Result<u32, LedgerError> {
    let arr: [u8; 4] = bytes
        .try_into()
        .map_err(|_| LedgerError::MalformedPlaintext(bytes.len()))?;
    Ok(u32::from_le_bytes(arr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_classify::classify;

    fn handle(tag: u8) -> CiphertextHandle {
        CiphertextHandle::from_bytes(vec![tag; 16])
    }

    fn submit_one(state: &mut LedgerState) -> RecordId {
        state.submit(handle(1), handle(2), handle(3), Utc::now())
    }

    #[test]
    fn ids_are_strictly_increasing_from_one() {
        let mut state = LedgerState::default();
        let ids: Vec<_> = (0..5).map(|_| submit_one(&mut state).value()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn submission_creates_empty_assessment() -> anyhow::Result<()> {
        let mut state = LedgerState::default();
        let id = submit_one(&mut state);
        let assessment = state.assessment(id)?;
        assert!(!assessment.is_revealed);
        assert_eq!(assessment.risk_level, None);
        assert_eq!(assessment.recommendations, None);
        assert_eq!(assessment.systemic_flag, None);
        Ok(())
    }

    #[test]
    fn latch_flips_exactly_once() {
        let mut state = LedgerState::default();
        let id = submit_one(&mut state);
        let outcome = classify(6, 130, 11);

        let assessment = state.assessments.get_mut(&id).unwrap();
        assessment.finalize(id, &outcome).unwrap();
        assert!(assessment.is_revealed);
        assert_eq!(assessment.risk_level, Some(RiskLevel::Critical));

        let again = assessment.finalize(id, &outcome);
        assert_eq!(again, Err(LedgerError::AlreadyFinalized(id)));
    }

    #[test]
    fn institution_batch_rejects_unknown_and_finalized() {
        let mut state = LedgerState::default();
        let missing = RecordId::new(42);
        assert_eq!(
            state.institution_batch(missing),
            Err(LedgerError::NotFound(missing))
        );

        let id = submit_one(&mut state);
        assert_eq!(state.institution_batch(id).unwrap().len(), 3);

        let outcome = classify(0, 0, 0);
        state
            .assessments
            .get_mut(&id)
            .unwrap()
            .finalize(id, &outcome)
            .unwrap();
        assert_eq!(
            state.institution_batch(id),
            Err(LedgerError::AlreadyFinalized(id))
        );
    }

    #[test]
    fn first_counter_write_appends_one_registry_entry() {
        let mut state = LedgerState::default();
        state.set_counter(RiskLevel::High, handle(9));
        state.set_counter(RiskLevel::High, handle(10));
        state.set_counter(RiskLevel::Low, handle(11));

        assert_eq!(state.registry, vec![RiskLevel::High, RiskLevel::Low]);
        assert_eq!(state.counter(RiskLevel::High).unwrap().count, handle(10));
    }

    #[test]
    fn category_digest_resolves_for_initialized_categories() {
        let mut state = LedgerState::default();
        for category in RiskLevel::ALL {
            state.set_counter(category, handle(1));
        }
        for category in RiskLevel::ALL {
            assert_eq!(
                state.resolve_category(CategoryKey::of(category)),
                Ok(category)
            );
        }
    }

    #[test]
    fn unseen_digest_does_not_resolve() {
        let state = LedgerState::default();
        let key = CategoryKey::of(RiskLevel::Critical);
        assert!(matches!(
            state.resolve_category(key),
            Err(LedgerError::CategoryNotFound(_))
        ));
    }

    #[test]
    fn measurement_plaintext_decodes_in_fixed_order() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&6u32.to_le_bytes());
        bytes.extend_from_slice(&130u32.to_le_bytes());
        bytes.extend_from_slice(&11u32.to_le_bytes());
        assert_eq!(decode_measurement_plaintext(&bytes), Ok((6, 130, 11)));
    }

    #[test]
    fn truncated_plaintext_is_malformed() {
        assert_eq!(
            decode_measurement_plaintext(&[0u8; 8]),
            Err(LedgerError::MalformedPlaintext(8))
        );
        assert_eq!(
            decode_count_plaintext(&[0u8; 3]),
            Err(LedgerError::MalformedPlaintext(3))
        );
    }
}

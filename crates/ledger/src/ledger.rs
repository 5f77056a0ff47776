// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    decode_count_plaintext, decode_measurement_plaintext, Assessment, EncryptedMeasurement,
    LedgerError, LedgerState,
};
use actix::prelude::*;
use aegis_classify::{classify, RiskLevel};
use aegis_data::{AutoPersist, Persistable, Repository};
use aegis_events::{
    AggregateRevealed, AssessmentFinalized, CategoryKey, DataSubmitted, EventBus, LedgerEvent,
    ProtocolError, RecordId, RequestId, RevealRequested, RevealTarget,
};
use aegis_oracle::{CipherEngine, CiphertextHandle, DecryptionOracle, RevealDelivered};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

//////////////////////////////////////////////////////////////////////////////
// Messages
//////////////////////////////////////////////////////////////////////////////

/// Submission interface: three encrypted measurements in, a record id out.
#[derive(Message, Clone, Debug)]
#[rtype(result = "anyhow::Result<RecordId>")]
pub struct SubmitMeasurement {
    pub breach_attempts: CiphertextHandle,
    pub response_time_minutes: CiphertextHandle,
    pub vulnerability_count: CiphertextHandle,
}

/// Privileged: ask the oracle to reveal one institution's measurements.
#[derive(Message, Clone, Copy, Debug)]
#[rtype(result = "anyhow::Result<RequestId>")]
pub struct RequestAssessmentReveal {
    pub id: RecordId,
}

/// Privileged: ask the oracle to reveal one category's aggregate count.
#[derive(Message, Clone, Copy, Debug)]
#[rtype(result = "anyhow::Result<RequestId>")]
pub struct RequestCategoryReveal {
    pub category: RiskLevel,
}

#[derive(Message, Clone, Copy, Debug)]
#[rtype(result = "Option<EncryptedMeasurement>")]
pub struct GetMeasurement {
    pub id: RecordId,
}

#[derive(Message, Clone, Copy, Debug)]
#[rtype(result = "anyhow::Result<Assessment>")]
pub struct GetAssessment {
    pub id: RecordId,
}

/// Read-only access to a category's still-encrypted running count.
#[derive(Message, Clone, Copy, Debug)]
#[rtype(result = "anyhow::Result<CiphertextHandle>")]
pub struct PeekEncryptedCount {
    pub category: RiskLevel,
}

#[derive(Message, Clone, Copy, Debug)]
#[rtype(result = "Vec<RiskLevel>")]
pub struct GetCategoryRegistry;

/// Full state snapshot, used by tests to assert an operation mutated
/// nothing.
#[derive(Message, Clone, Copy, Debug)]
#[rtype(result = "anyhow::Result<LedgerState>")]
pub struct GetSnapshot;

//////////////////////////////////////////////////////////////////////////////
// RiskLedger Actor
//////////////////////////////////////////////////////////////////////////////

/// The single writer over all protocol state. Its mailbox serializes
/// submissions, reveal requests and oracle callbacks, so no two mutations
/// interleave their visible effects.
pub struct RiskLedger {
    bus: Addr<EventBus<LedgerEvent>>,
    engine: Arc<dyn CipherEngine>,
    oracle: Arc<dyn DecryptionOracle>,
    state: Persistable<LedgerState>,
}

pub struct RiskLedgerParams {
    pub bus: Addr<EventBus<LedgerEvent>>,
    pub engine: Arc<dyn CipherEngine>,
    pub oracle: Arc<dyn DecryptionOracle>,
}

impl RiskLedger {
    pub fn new(params: RiskLedgerParams, state: Persistable<LedgerState>) -> Self {
        Self {
            bus: params.bus,
            engine: params.engine,
            oracle: params.oracle,
            state,
        }
    }

    /// Load (or initialize) ledger state from the repository and start the
    /// actor.
    pub async fn attach(
        bus: &Addr<EventBus<LedgerEvent>>,
        engine: Arc<dyn CipherEngine>,
        oracle: Arc<dyn DecryptionOracle>,
        repository: Repository<LedgerState>,
    ) -> Result<Addr<Self>> {
        let state = repository.load_or_default(LedgerState::default()).await?;
        let addr = RiskLedger::new(
            RiskLedgerParams {
                bus: bus.clone(),
                engine,
                oracle,
            },
            state,
        )
        .start();
        Ok(addr)
    }

    fn snapshot(&self) -> LedgerState {
        self.state.get().unwrap_or_default()
    }

    fn commit(&mut self, next: LedgerState) {
        self.state.set(next);
    }

    fn publish(&self, event: impl Into<LedgerEvent>) {
        self.bus.do_send(event.into());
    }

    fn reject(&self, err: &LedgerError) {
        warn!(error = %err, "Operation rejected");
        self.publish(ProtocolError::from(err));
    }

    /// Run the broker half of a reveal: hand the batch to the oracle, record
    /// the pending entry, announce the request. A target with a live pending
    /// request may be requested again; the finalization latch rejects
    /// whichever authenticated callback arrives second.
    fn issue_reveal(
        &mut self,
        mut state: LedgerState,
        batch: Vec<CiphertextHandle>,
        target: RevealTarget,
        reply_to: Recipient<RevealDelivered>,
    ) -> Result<RequestId> {
        let request_id = self.oracle.request_batch_decrypt(batch, reply_to)?;
        if state.pending.contains_key(&request_id) {
            warn!(request = %request_id, "Oracle reissued a live request id");
        }
        state.insert_pending(request_id, target);
        self.commit(state);
        info!(request = %request_id, target = %target, "Reveal requested");
        self.publish(RevealRequested { request_id, target });
        Ok(request_id)
    }
}

impl Actor for RiskLedger {
    type Context = Context<Self>;
}

//////////////////////////////////////////////////////////////////////////////
// Handlers
//////////////////////////////////////////////////////////////////////////////

impl Handler<SubmitMeasurement> for RiskLedger {
    type Result = Result<RecordId>;

    fn handle(&mut self, msg: SubmitMeasurement, _: &mut Self::Context) -> Self::Result {
        let now = Utc::now();
        let mut assigned = RecordId::FIRST;
        self.state.try_mutate(|mut state| {
            assigned = state.submit(
                msg.breach_attempts,
                msg.response_time_minutes,
                msg.vulnerability_count,
                now,
            );
            Ok(state)
        })?;

        info!(id = %assigned, "Measurement submitted");
        self.publish(DataSubmitted {
            id: assigned,
            timestamp: now,
        });
        Ok(assigned)
    }
}

impl Handler<RequestAssessmentReveal> for RiskLedger {
    type Result = Result<RequestId>;

    fn handle(&mut self, msg: RequestAssessmentReveal, ctx: &mut Self::Context) -> Self::Result {
        let state = self.snapshot();
        let batch = state.institution_batch(msg.id).map_err(|err| {
            self.reject(&err);
            err
        })?;
        self.issue_reveal(
            state,
            batch,
            RevealTarget::Institution(msg.id),
            ctx.address().recipient(),
        )
    }
}

impl Handler<RequestCategoryReveal> for RiskLedger {
    type Result = Result<RequestId>;

    fn handle(&mut self, msg: RequestCategoryReveal, ctx: &mut Self::Context) -> Self::Result {
        let state = self.snapshot();
        let batch = state.category_batch(msg.category).map_err(|err| {
            self.reject(&err);
            err
        })?;
        let target = RevealTarget::Category(CategoryKey::of(msg.category));
        self.issue_reveal(state, batch, target, ctx.address().recipient())
    }
}

impl Handler<RevealDelivered> for RiskLedger {
    type Result = Result<()>;

    fn handle(&mut self, msg: RevealDelivered, _: &mut Self::Context) -> Self::Result {
        let mut state = self.snapshot();

        // Re-delivery and forgeries for consumed or never-issued requests
        // stop here.
        let target = state.pending_target(msg.request_id).map_err(|err| {
            self.reject(&err);
            err
        })?;

        // Untrusted until proven otherwise. A failed proof mutates nothing
        // and leaves the pending entry live for a corrected delivery.
        if !self
            .oracle
            .verify(msg.request_id, &msg.plaintext, &msg.proof)
        {
            let err = LedgerError::AuthenticationFailed(msg.request_id);
            self.reject(&err);
            return Err(err.into());
        }

        match target {
            RevealTarget::Institution(id) => {
                let assessment = state.assessment(id).map_err(|err| {
                    self.reject(&err);
                    err
                })?;
                if assessment.is_revealed {
                    // A stale duplicate request resolved after finalization.
                    // Terminal: consume the entry so the request id is spent.
                    let err = LedgerError::AlreadyFinalized(id);
                    state.consume_pending(msg.request_id);
                    self.commit(state);
                    self.reject(&err);
                    return Err(err.into());
                }

                let (breaches, response_time, vulnerabilities) =
                    decode_measurement_plaintext(&msg.plaintext).map_err(|err| {
                        self.reject(&err);
                        err
                    })?;
                let outcome = classify(breaches, response_time, vulnerabilities);
                let category = outcome.risk_level;

                // Fallible work ends here; everything below commits together.
                let base = match state.counters.get(&category) {
                    Some(counter) => counter.count.clone(),
                    None => self.engine.encrypt_zero(),
                };
                let bumped = self.engine.increment(&base)?;

                if let Some(assessment) = state.assessments.get_mut(&id) {
                    assessment.finalize(id, &outcome)?;
                }
                state.set_counter(category, bumped);
                state.consume_pending(msg.request_id);
                self.commit(state);

                info!(id = %id, category = %category, "Assessment finalized");
                self.publish(AssessmentFinalized { id });
                Ok(())
            }
            RevealTarget::Category(key) => {
                let category = state.resolve_category(key).map_err(|err| {
                    self.reject(&err);
                    err
                })?;
                let count = decode_count_plaintext(&msg.plaintext).map_err(|err| {
                    self.reject(&err);
                    err
                })?;

                state.consume_pending(msg.request_id);
                self.commit(state);

                info!(category = %category, count, "Aggregate count revealed");
                self.publish(AggregateRevealed { category, count });
                Ok(())
            }
        }
    }
}

impl Handler<GetMeasurement> for RiskLedger {
    type Result = Option<EncryptedMeasurement>;

    fn handle(&mut self, msg: GetMeasurement, _: &mut Self::Context) -> Self::Result {
        self.snapshot().measurement(msg.id).cloned()
    }
}

impl Handler<GetAssessment> for RiskLedger {
    type Result = Result<Assessment>;

    fn handle(&mut self, msg: GetAssessment, _: &mut Self::Context) -> Self::Result {
        Ok(self.snapshot().assessment(msg.id).cloned()?)
    }
}

impl Handler<PeekEncryptedCount> for RiskLedger {
    type Result = Result<CiphertextHandle>;

    fn handle(&mut self, msg: PeekEncryptedCount, _: &mut Self::Context) -> Self::Result {
        Ok(self.snapshot().counter(msg.category)?.count.clone())
    }
}

impl Handler<GetCategoryRegistry> for RiskLedger {
    type Result = Vec<RiskLevel>;

    fn handle(&mut self, _: GetCategoryRegistry, _: &mut Self::Context) -> Self::Result {
        self.snapshot().registry
    }
}

impl Handler<GetSnapshot> for RiskLedger {
    type Result = Result<LedgerState>;

    fn handle(&mut self, _: GetSnapshot, _: &mut Self::Context) -> Self::Result {
        self.state.try_get()
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use aegis_classify::RiskLevel;
use aegis_data::{DataStore, InMemStore, RepositoriesFactory};
use aegis_events::{EventBus, LedgerEvent, RequestId, TakeEvents};
use aegis_ledger::{
    GetAssessment, GetCategoryRegistry, GetSnapshot, LedgerError, LedgerRepositoryFactory,
    PeekEncryptedCount, RequestAssessmentReveal, RequestCategoryReveal, RiskLedger,
};
use aegis_oracle::{AuthenticityProof, RevealDelivered};
use aegis_test_helpers::{
    encrypt_measurements, measurement_plaintext, setup_ledger, InProcessOracle,
};
use actix::Actor;
use anyhow::Result;
use std::sync::Arc;

#[actix::test]
async fn aggregate_reveal_reports_the_running_count() -> Result<()> {
    let sim = setup_ledger().await?;

    for _ in 0..2 {
        let id = sim
            .ledger
            .send(encrypt_measurements(&sim.oracle, 6, 130, 11))
            .await??;
        let request_id = sim.ledger.send(RequestAssessmentReveal { id }).await??;
        sim.ledger.send(sim.oracle.delivery(request_id)?).await??;
    }

    let request_id = sim
        .ledger
        .send(RequestCategoryReveal {
            category: RiskLevel::Critical,
        })
        .await??;
    sim.ledger.send(sim.oracle.delivery(request_id)?).await??;

    // 2 submissions, 3 reveal requests, 2 finalizations, 1 aggregate reveal.
    let events = sim.history.send(TakeEvents::new(8)).await?;
    let revealed = events
        .iter()
        .find_map(|event| match event {
            LedgerEvent::AggregateRevealed { data, .. } => Some(data.clone()),
            _ => None,
        })
        .expect("aggregate reveal event published");
    assert_eq!(revealed.category, RiskLevel::Critical);
    assert_eq!(revealed.count, 2);

    Ok(())
}

#[actix::test]
async fn unknown_request_id_is_rejected_and_mutates_nothing() -> Result<()> {
    let sim = setup_ledger().await?;

    sim.ledger
        .send(encrypt_measurements(&sim.oracle, 2, 30, 1))
        .await??;
    let before = sim.ledger.send(GetSnapshot).await??;

    let forged = RevealDelivered {
        request_id: RequestId::new(999),
        plaintext: measurement_plaintext(1, 2, 3),
        proof: AuthenticityProof::from_bytes(vec![0u8; 32]),
    };
    let err = sim
        .ledger
        .send(forged)
        .await?
        .expect_err("never-issued request must be rejected");
    assert_eq!(
        err.downcast_ref::<LedgerError>(),
        Some(&LedgerError::UnknownRequest(RequestId::new(999)))
    );

    let after = sim.ledger.send(GetSnapshot).await??;
    assert_eq!(before, after);

    // The rejection is visible on the bus as well.
    let events = sim.history.send(TakeEvents::new(2)).await?;
    assert!(matches!(events[0], LedgerEvent::DataSubmitted { .. }));
    match &events[1] {
        LedgerEvent::ProtocolError { data, .. } => {
            assert_eq!(data.err_type, aegis_events::ProtocolErrorType::UnknownRequest)
        }
        other => panic!("expected a protocol error event, got {}", other),
    }

    Ok(())
}

#[actix::test]
async fn bad_proof_leaves_the_request_retryable() -> Result<()> {
    let sim = setup_ledger().await?;

    let id = sim
        .ledger
        .send(encrypt_measurements(&sim.oracle, 2, 30, 1))
        .await??;
    let request_id = sim.ledger.send(RequestAssessmentReveal { id }).await??;

    let err = sim
        .ledger
        .send(sim.oracle.forged_delivery(request_id)?)
        .await?
        .expect_err("tampered proof must be rejected");
    assert_eq!(
        err.downcast_ref::<LedgerError>(),
        Some(&LedgerError::AuthenticationFailed(request_id))
    );
    let assessment = sim.ledger.send(GetAssessment { id }).await??;
    assert!(!assessment.is_revealed);

    // The pending entry survived, so a corrected delivery still lands.
    sim.ledger.send(sim.oracle.delivery(request_id)?).await??;
    let assessment = sim.ledger.send(GetAssessment { id }).await??;
    assert!(assessment.is_revealed);

    Ok(())
}

#[actix::test]
async fn stale_duplicate_request_cannot_double_finalize() -> Result<()> {
    let sim = setup_ledger().await?;

    let id = sim
        .ledger
        .send(encrypt_measurements(&sim.oracle, 6, 130, 11))
        .await??;

    // Re-requesting an unfinalized target is allowed; both are now pending.
    let first = sim.ledger.send(RequestAssessmentReveal { id }).await??;
    let second = sim.ledger.send(RequestAssessmentReveal { id }).await??;
    assert_ne!(first, second);

    sim.ledger.send(sim.oracle.delivery(first)?).await??;

    let err = sim
        .ledger
        .send(sim.oracle.delivery(second)?)
        .await?
        .expect_err("latch must reject the stale callback");
    assert_eq!(
        err.downcast_ref::<LedgerError>(),
        Some(&LedgerError::AlreadyFinalized(id))
    );

    // No double increment, and the stale request id is spent.
    let count_handle = sim
        .ledger
        .send(PeekEncryptedCount {
            category: RiskLevel::Critical,
        })
        .await??;
    assert_eq!(sim.oracle.peek_value(&count_handle)?, 1);

    let err = sim
        .ledger
        .send(sim.oracle.delivery(second)?)
        .await?
        .expect_err("spent request id must be unknown");
    assert_eq!(
        err.downcast_ref::<LedgerError>(),
        Some(&LedgerError::UnknownRequest(second))
    );

    Ok(())
}

#[actix::test]
async fn reveal_requests_for_unknown_targets_create_no_pending_entry() -> Result<()> {
    let sim = setup_ledger().await?;

    let missing = aegis_events::RecordId::new(42);
    let err = sim
        .ledger
        .send(RequestAssessmentReveal { id: missing })
        .await?
        .expect_err("unknown record");
    assert_eq!(
        err.downcast_ref::<LedgerError>(),
        Some(&LedgerError::NotFound(missing))
    );

    let err = sim
        .ledger
        .send(RequestCategoryReveal {
            category: RiskLevel::Low,
        })
        .await?
        .expect_err("uninitialized category");
    assert!(matches!(
        err.downcast_ref::<LedgerError>(),
        Some(LedgerError::CategoryNotFound(_))
    ));

    let snapshot = sim.ledger.send(GetSnapshot).await??;
    assert!(snapshot.pending.is_empty());
    assert_eq!(sim.oracle.pending_count(), 0);

    Ok(())
}

#[actix::test]
async fn independent_targets_resolve_in_any_order() -> Result<()> {
    let sim = setup_ledger().await?;

    let low = sim
        .ledger
        .send(encrypt_measurements(&sim.oracle, 1, 10, 1))
        .await??;
    let critical = sim
        .ledger
        .send(encrypt_measurements(&sim.oracle, 6, 130, 11))
        .await??;

    let low_request = sim.ledger.send(RequestAssessmentReveal { id: low }).await??;
    let critical_request = sim
        .ledger
        .send(RequestAssessmentReveal { id: critical })
        .await??;

    // Delivery order is the oracle's choice, not submission order.
    sim.ledger
        .send(sim.oracle.delivery(critical_request)?)
        .await??;
    sim.ledger.send(sim.oracle.delivery(low_request)?).await??;

    let low_assessment = sim.ledger.send(GetAssessment { id: low }).await??;
    assert_eq!(low_assessment.risk_level, Some(RiskLevel::Low));
    let critical_assessment = sim.ledger.send(GetAssessment { id: critical }).await??;
    assert_eq!(critical_assessment.risk_level, Some(RiskLevel::Critical));

    // Registry order reflects finalization order.
    let registry = sim.ledger.send(GetCategoryRegistry).await?;
    assert_eq!(registry, vec![RiskLevel::Critical, RiskLevel::Low]);

    Ok(())
}

#[actix::test]
async fn ledger_state_survives_reattach() -> Result<()> {
    let bus = EventBus::<LedgerEvent>::default().start();
    let store = InMemStore::new(false).start();
    let repositories = DataStore::from(&store).repositories();
    let oracle = Arc::new(InProcessOracle::new());

    let ledger = RiskLedger::attach(
        &bus,
        oracle.clone(),
        oracle.clone(),
        repositories.ledger(),
    )
    .await?;
    let id = ledger
        .send(encrypt_measurements(&oracle, 6, 130, 11))
        .await??;
    let request_id = ledger.send(RequestAssessmentReveal { id }).await??;
    ledger.send(oracle.delivery(request_id)?).await??;

    // A second instance over the same repository picks up where the first
    // left off.
    let revived = RiskLedger::attach(
        &bus,
        oracle.clone(),
        oracle.clone(),
        repositories.ledger(),
    )
    .await?;
    let assessment = revived.send(GetAssessment { id }).await??;
    assert!(assessment.is_revealed);
    assert_eq!(assessment.risk_level, Some(RiskLevel::Critical));

    let next = revived
        .send(encrypt_measurements(&oracle, 0, 0, 0))
        .await??;
    assert_eq!(next.value(), 2);

    Ok(())
}

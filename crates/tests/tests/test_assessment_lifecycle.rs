// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use aegis_classify::{RiskLevel, SystemicFlag, RECOMMEND_IMMEDIATE, RECOMMEND_ROUTINE};
use aegis_events::{LedgerEvent, TakeEvents};
use aegis_ledger::{
    GetAssessment, GetCategoryRegistry, GetMeasurement, PeekEncryptedCount, RequestAssessmentReveal,
};
use aegis_test_helpers::{encrypt_measurements, setup_ledger};
use anyhow::Result;

#[actix::test]
async fn full_lifecycle_submit_reveal_finalize() -> Result<()> {
    let sim = setup_ledger().await?;

    let id = sim
        .ledger
        .send(encrypt_measurements(&sim.oracle, 2, 30, 1))
        .await??;
    assert_eq!(id.value(), 1);

    let measurement = sim
        .ledger
        .send(GetMeasurement { id })
        .await?
        .expect("measurement stored");
    assert_eq!(measurement.id, id);

    // Nothing revealed yet.
    let assessment = sim.ledger.send(GetAssessment { id }).await??;
    assert!(!assessment.is_revealed);
    assert_eq!(assessment.risk_level, None);
    assert_eq!(assessment.recommendations, None);
    assert_eq!(assessment.systemic_flag, None);

    let request_id = sim.ledger.send(RequestAssessmentReveal { id }).await??;
    assert_eq!(sim.oracle.pending_count(), 1);

    // The oracle answers at its own pace; the test is that pace.
    sim.ledger.send(sim.oracle.delivery(request_id)?).await??;

    // Score 71 lands in High while each input sits below its recommendation
    // threshold, so the routine tier applies.
    let assessment = sim.ledger.send(GetAssessment { id }).await??;
    assert!(assessment.is_revealed);
    assert_eq!(assessment.risk_level, Some(RiskLevel::High));
    assert_eq!(
        assessment.recommendations.as_deref(),
        Some(RECOMMEND_ROUTINE)
    );
    assert_eq!(assessment.systemic_flag, Some(SystemicFlag::None));

    // First finalization in High lazily created that counter at one.
    let registry = sim.ledger.send(GetCategoryRegistry).await?;
    assert_eq!(registry, vec![RiskLevel::High]);
    let count_handle = sim
        .ledger
        .send(PeekEncryptedCount {
            category: RiskLevel::High,
        })
        .await??;
    assert_eq!(sim.oracle.peek_value(&count_handle)?, 1);

    let events = sim.history.send(TakeEvents::new(3)).await?;
    assert!(matches!(events[0], LedgerEvent::DataSubmitted { .. }));
    assert!(matches!(events[1], LedgerEvent::RevealRequested { .. }));
    assert!(matches!(events[2], LedgerEvent::AssessmentFinalized { .. }));

    Ok(())
}

#[actix::test]
async fn record_ids_increase_and_never_reuse() -> Result<()> {
    let sim = setup_ledger().await?;

    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(
            sim.ledger
                .send(encrypt_measurements(&sim.oracle, 6, 130, 11))
                .await??,
        );
    }
    assert_eq!(ids.iter().map(|id| id.value()).collect::<Vec<_>>(), [1, 2, 3]);

    // Finalizing a record does not free its id for reuse.
    sim.ledger
        .send(RequestAssessmentReveal { id: ids[0] })
        .await??;
    sim.oracle.deliver_all()?;

    let next = sim
        .ledger
        .send(encrypt_measurements(&sim.oracle, 0, 0, 0))
        .await??;
    assert_eq!(next.value(), 4);

    Ok(())
}

#[actix::test]
async fn severe_measurements_reach_every_tier() -> Result<()> {
    let sim = setup_ledger().await?;

    let id = sim
        .ledger
        .send(encrypt_measurements(&sim.oracle, 6, 130, 11))
        .await??;
    let request_id = sim.ledger.send(RequestAssessmentReveal { id }).await??;
    sim.ledger.send(sim.oracle.delivery(request_id)?).await??;

    let assessment = sim.ledger.send(GetAssessment { id }).await??;
    assert_eq!(assessment.risk_level, Some(RiskLevel::Critical));
    assert_eq!(
        assessment.recommendations.as_deref(),
        Some(RECOMMEND_IMMEDIATE)
    );
    assert_eq!(assessment.systemic_flag, Some(SystemicFlag::Potential));

    Ok(())
}

#[actix::test]
async fn counters_accumulate_within_a_category() -> Result<()> {
    let sim = setup_ledger().await?;

    for _ in 0..3 {
        let id = sim
            .ledger
            .send(encrypt_measurements(&sim.oracle, 6, 130, 11))
            .await??;
        let request_id = sim.ledger.send(RequestAssessmentReveal { id }).await??;
        sim.ledger.send(sim.oracle.delivery(request_id)?).await??;
    }

    // Three Critical finalizations, one registry entry.
    let registry = sim.ledger.send(GetCategoryRegistry).await?;
    assert_eq!(registry, vec![RiskLevel::Critical]);

    let count_handle = sim
        .ledger
        .send(PeekEncryptedCount {
            category: RiskLevel::Critical,
        })
        .await??;
    assert_eq!(sim.oracle.peek_value(&count_handle)?, 3);

    Ok(())
}

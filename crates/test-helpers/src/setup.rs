// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::InProcessOracle;
use actix::{Actor, Addr};
use aegis_data::{DataStore, InMemStore, RepositoriesFactory};
use aegis_events::{EventBus, HistoryCollector, LedgerEvent};
use aegis_ledger::{LedgerRepositoryFactory, RiskLedger, SubmitMeasurement};
use aegis_logger::SimpleLogger;
use aegis_oracle::CipherEngine;
use anyhow::Result;
use once_cell::sync::OnceCell;
use std::sync::Arc;

static TRACING: OnceCell<()> = OnceCell::new();

/// Install a fmt subscriber once per test binary; RUST_LOG controls the
/// filter.
pub fn ensure_tracing() {
    TRACING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Everything an end-to-end test needs to drive the protocol.
pub struct LedgerSimulated {
    pub bus: Addr<EventBus<LedgerEvent>>,
    pub history: Addr<HistoryCollector<LedgerEvent>>,
    pub ledger: Addr<RiskLedger>,
    pub oracle: Arc<InProcessOracle>,
    pub store: Addr<InMemStore>,
}

/// Stand up a bus, history collector, in-memory store and a ledger wired to
/// a fresh in-process oracle.
pub async fn setup_ledger() -> Result<LedgerSimulated> {
    ensure_tracing();
    let bus = EventBus::<LedgerEvent>::default().start();
    let history = EventBus::history(&bus);
    let store = InMemStore::new(true).start();
    let repositories = DataStore::from(&store).repositories();
    let oracle = Arc::new(InProcessOracle::new());

    let ledger = RiskLedger::attach(
        &bus,
        oracle.clone(),
        oracle.clone(),
        repositories.ledger(),
    )
    .await?;

    SimpleLogger::attach("aegis", bus.clone());

    Ok(LedgerSimulated {
        bus,
        history,
        ledger,
        oracle,
        store,
    })
}

/// Encrypt one institution's measurements for submission.
pub fn encrypt_measurements(
    oracle: &InProcessOracle,
    breaches: u32,
    response_time_minutes: u32,
    vulnerabilities: u32,
) -> SubmitMeasurement {
    SubmitMeasurement {
        breach_attempts: oracle.encrypt(breaches),
        response_time_minutes: oracle.encrypt(response_time_minutes),
        vulnerability_count: oracle.encrypt(vulnerabilities),
    }
}

/// The wire encoding of an institution plaintext, for tests that hand-craft
/// callbacks.
pub fn measurement_plaintext(breaches: u32, response_time_minutes: u32, vulnerabilities: u32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(12);
    bytes.extend_from_slice(&breaches.to_le_bytes());
    bytes.extend_from_slice(&response_time_minutes.to_le_bytes());
    bytes.extend_from_slice(&vulnerabilities.to_le_bytes());
    bytes
}

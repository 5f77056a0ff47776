// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::LedgerState;
use aegis_data::{Repositories, Repository};

pub struct StoreKeys;

impl StoreKeys {
    pub fn ledger() -> String {
        "//ledger".to_string()
    }
}

pub trait LedgerRepositoryFactory {
    fn ledger(&self) -> Repository<LedgerState>;
}

impl LedgerRepositoryFactory for Repositories {
    fn ledger(&self) -> Repository<LedgerState> {
        Repository::new(self.store.scope(StoreKeys::ledger()))
    }
}

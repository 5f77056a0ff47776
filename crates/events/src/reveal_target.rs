// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::RecordId;
use aegis_classify::RiskLevel;
use core::fmt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const CATEGORY_DOMAIN: &[u8] = b"aegis:category:";

/// One-way digest of a risk category name. Category reveals travel through
/// the same pending-request table as institution reveals; the digest gives
/// them a key in that table without exposing the category ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryKey(pub [u8; 32]);

impl CategoryKey {
    pub fn of(category: RiskLevel) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(CATEGORY_DOMAIN);
        hasher.update(category.to_string().as_bytes());
        CategoryKey(hasher.finalize().into())
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = bs58::encode(&self.0).into_string();
        write!(f, "cat:{}", &encoded[0..8])
    }
}

/// What a pending decryption request resolves to. The two kinds are
/// distinguished by tag, never by the numeric shape of their keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevealTarget {
    /// Finalize the assessment of one institution's record.
    Institution(RecordId),
    /// Reveal the running aggregate count for one risk category.
    Category(CategoryKey),
}

impl fmt::Display for RevealTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevealTarget::Institution(id) => write!(f, "institution({})", id),
            RevealTarget::Category(key) => write!(f, "category({})", key),
        }
    }
}

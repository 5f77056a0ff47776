// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use core::fmt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{ops::Deref, sync::Arc};

/// An encrypted integer the ledger cannot read. Handles are shared, not
/// copied: cloning bumps a refcount on the same underlying ciphertext, which
/// is what lets pending decryption batches reference submitted measurements
/// without duplicating them.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CiphertextHandle(Arc<Vec<u8>>);

impl CiphertextHandle {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Arc::new(bytes))
    }

    pub fn extract_bytes(&self) -> Vec<u8> {
        (*self.0).clone()
    }

    pub fn size_bytes(&self) -> usize {
        self.0.len()
    }
}

impl Deref for CiphertextHandle {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = &self.0[..self.0.len().min(8)];
        write!(f, "ct:{}..({}b)", hex::encode(head), self.0.len())
    }
}

impl Serialize for CiphertextHandle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CiphertextHandle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let vec: Vec<u8> = Vec::deserialize(deserializer)?;
        Ok(CiphertextHandle(Arc::new(vec)))
    }
}

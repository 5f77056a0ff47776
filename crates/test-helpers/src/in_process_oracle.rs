// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::Recipient;
use aegis_events::RequestId;
use aegis_oracle::{
    AuthenticityProof, CipherEngine, CiphertextHandle, DecryptionOracle, RevealDelivered,
};
use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Wire layout of a fake ciphertext: 4 bytes LE value, 8 bytes nonce.
const HANDLE_LEN: usize = 12;

struct PendingBatch {
    handles: Vec<CiphertextHandle>,
    reply_to: Recipient<RevealDelivered>,
}

/// A deterministic stand-in for the external decryption collaborator.
///
/// Handles carry their plaintext value (plus a nonce so equal values still
/// produce distinct ciphertexts) and only this oracle ever looks inside
/// them. Batch requests queue until the test calls `deliver`/`deliver_all`,
/// which is what makes the protocol's asynchrony explicit and controllable
/// in tests. Proofs are keyed SHA-256 digests over (request id, plaintext).
pub struct InProcessOracle {
    secret: [u8; 32],
    next_request: AtomicU64,
    pending: Mutex<BTreeMap<RequestId, PendingBatch>>,
}

impl InProcessOracle {
    pub fn new() -> Self {
        Self {
            secret: rand::random(),
            next_request: AtomicU64::new(1),
            pending: Mutex::new(BTreeMap::new()),
        }
    }

    fn value_of(&self, handle: &CiphertextHandle) -> Result<u32> {
        let bytes = handle.extract_bytes();
        if bytes.len() != HANDLE_LEN {
            return Err(anyhow!("handle has unexpected length {}", bytes.len()));
        }
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&bytes[0..4]);
        Ok(u32::from_le_bytes(buf))
    }

    fn proof_for(&self, request_id: RequestId, plaintext: &[u8]) -> AuthenticityProof {
        let mut hasher = Sha256::new();
        hasher.update(self.secret);
        hasher.update(request_id.value().to_le_bytes());
        hasher.update(plaintext);
        AuthenticityProof::from_bytes(hasher.finalize().to_vec())
    }

    fn plaintext_for(&self, handles: &[CiphertextHandle]) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(handles.len() * 4);
        for handle in handles {
            bytes.extend_from_slice(&self.value_of(handle)?.to_le_bytes());
        }
        Ok(bytes)
    }

    /// Build the authenticated callback message for a queued batch without
    /// sending it. Tests use this to drive the ledger synchronously and
    /// observe the typed result.
    pub fn delivery(&self, request_id: RequestId) -> Result<RevealDelivered> {
        let pending = self.pending.lock().expect("oracle lock poisoned");
        let batch = pending
            .get(&request_id)
            .ok_or_else(|| anyhow!("no pending batch for {}", request_id))?;
        let plaintext = self.plaintext_for(&batch.handles)?;
        let proof = self.proof_for(request_id, &plaintext);
        Ok(RevealDelivered {
            request_id,
            plaintext,
            proof,
        })
    }

    /// The correct plaintext paired with a proof that cannot verify.
    pub fn forged_delivery(&self, request_id: RequestId) -> Result<RevealDelivered> {
        let mut delivery = self.delivery(request_id)?;
        delivery.proof = AuthenticityProof::from_bytes(vec![0u8; 32]);
        Ok(delivery)
    }

    /// Decrypt the batch behind `request_id` and send the authenticated
    /// callback. The batch stays queued so a test can re-deliver.
    pub fn deliver(&self, request_id: RequestId) -> Result<()> {
        let message = self.delivery(request_id)?;
        let pending = self.pending.lock().expect("oracle lock poisoned");
        let batch = pending
            .get(&request_id)
            .ok_or_else(|| anyhow!("no pending batch for {}", request_id))?;
        batch.reply_to.do_send(message);
        Ok(())
    }

    /// Deliver every queued batch, in request id order.
    pub fn deliver_all(&self) -> Result<usize> {
        let ids: Vec<RequestId> = {
            let pending = self.pending.lock().expect("oracle lock poisoned");
            pending.keys().copied().collect()
        };
        for id in &ids {
            self.deliver(*id)?;
        }
        Ok(ids.len())
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().expect("oracle lock poisoned").len()
    }

    /// Peek at the plaintext value a handle encrypts. Tests use this to
    /// check homomorphic results without a full reveal round.
    pub fn peek_value(&self, handle: &CiphertextHandle) -> Result<u32> {
        self.value_of(handle)
    }
}

impl Default for InProcessOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl CipherEngine for InProcessOracle {
    fn encrypt_zero(&self) -> CiphertextHandle {
        self.encrypt(0)
    }

    fn encrypt(&self, value: u32) -> CiphertextHandle {
        let nonce: u64 = rand::random();
        let mut bytes = Vec::with_capacity(HANDLE_LEN);
        bytes.extend_from_slice(&value.to_le_bytes());
        bytes.extend_from_slice(&nonce.to_le_bytes());
        CiphertextHandle::from_bytes(bytes)
    }

    fn add(&self, a: &CiphertextHandle, b: &CiphertextHandle) -> Result<CiphertextHandle> {
        let sum = self.value_of(a)?.wrapping_add(self.value_of(b)?);
        Ok(self.encrypt(sum))
    }

    fn increment(&self, a: &CiphertextHandle) -> Result<CiphertextHandle> {
        self.add(a, &self.encrypt(1))
    }
}

impl DecryptionOracle for InProcessOracle {
    fn request_batch_decrypt(
        &self,
        handles: Vec<CiphertextHandle>,
        reply_to: Recipient<RevealDelivered>,
    ) -> Result<RequestId> {
        let request_id = RequestId::new(self.next_request.fetch_add(1, Ordering::SeqCst));
        self.pending
            .lock()
            .expect("oracle lock poisoned")
            .insert(request_id, PendingBatch { handles, reply_to });
        Ok(request_id)
    }

    fn verify(&self, request_id: RequestId, plaintext: &[u8], proof: &AuthenticityProof) -> bool {
        self.proof_for(request_id, plaintext) == *proof
    }
}

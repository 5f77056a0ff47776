// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{AuthenticityProof, CiphertextHandle, RevealDelivered};
use actix::Recipient;
use aegis_events::RequestId;
use anyhow::Result;

/// Homomorphic operations over ciphertext handles. The ledger combines
/// handles through this trait and never branches on their contents.
pub trait CipherEngine: Send + Sync {
    /// A fresh ciphertext encrypting zero.
    fn encrypt_zero(&self) -> CiphertextHandle;

    /// Encrypt a plaintext value. Submitting parties use this; the ledger
    /// itself only needs it indirectly through `increment`.
    fn encrypt(&self, value: u32) -> CiphertextHandle;

    /// Homomorphic addition of two ciphertexts.
    fn add(&self, a: &CiphertextHandle, b: &CiphertextHandle) -> Result<CiphertextHandle>;

    /// Homomorphic `a + enc(1)`.
    fn increment(&self, a: &CiphertextHandle) -> Result<CiphertextHandle>;
}

/// The asynchronous decryption collaborator. `request_batch_decrypt` returns
/// immediately with an opaque request id; the oracle later sends a
/// `RevealDelivered` message to the recipient it was handed. Deliveries are
/// untrusted until `verify` accepts their proof.
pub trait DecryptionOracle: Send + Sync {
    fn request_batch_decrypt(
        &self,
        handles: Vec<CiphertextHandle>,
        reply_to: Recipient<RevealDelivered>,
    ) -> Result<RequestId>;

    /// Whether `plaintext` is the genuine decryption for `request_id`.
    fn verify(&self, request_id: RequestId, plaintext: &[u8], proof: &AuthenticityProof) -> bool;
}

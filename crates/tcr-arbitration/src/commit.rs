//! # Vote Commitments
//!
//! A commitment is `sha256(JCS({"choice": c, "reason": r, "salt": hex(s)}))`.
//! Voters compute it off-line, submit only the digest during the commit
//! phase, and disclose `(choice, reason, salt)` during the reveal phase.

use tcr_core::{sha256_digest, CanonicalBytes, CanonicalizationError, Digest32};

/// Compute the commitment for a vote.
pub fn commit_hash(choice: u32, reason: &str, salt: &[u8]) -> Result<Digest32, CanonicalizationError> {
    let canonical = CanonicalBytes::new(&serde_json::json!({
        "choice": choice,
        "reason": reason,
        "salt": hex::encode(salt),
    }))?;
    Ok(sha256_digest(&canonical))
}

//! Uniform candidate selection.
//!
//! Every call samples the eligible set as it is right now. Previous draws are
//! neither remembered nor excluded, so repeats are expected.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::session::Session;
use crate::vendor::Vendor;

/// Result of a draw: the updated session and an uncommitted proposal.
#[derive(Debug, Clone, Serialize)]
pub struct DrawOutcome {
    pub session: Session,
    pub candidate: Vendor,
}

/// Pick one vendor uniformly at random. `None` when `candidates` is empty.
pub fn pick<'a, R: Rng + ?Sized>(candidates: &'a [Vendor], rng: &mut R) -> Option<&'a Vendor> {
    candidates.choose(rng)
}

//! The per-day session record and its state machine.
//!
//! ```text
//! AwaitingDraw --draw-->                 AwaitingDraw   (reroll_count += 1)
//! AwaitingDraw --lock(vendor, decider)--> Locked
//! Locked       --draw (force)-->         AwaitingDraw   (vendor/decider cleared, then drawn)
//! Locked       --draw (no force)-->      rejected: AlreadyDecided
//! any          --reset-->                deleted with its orders
//! ```
//!
//! Transitions here are pure; `RoomDb` runs them inside a write transaction.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, RoomError};
use crate::types::SessionStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub date: NaiveDate,
    pub status: SessionStatus,
    pub reroll_count: u32,
    /// Set only while `Locked`.
    pub chosen_vendor: Option<Uuid>,
    /// Set only while `Locked`.
    pub decider_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            date,
            status: SessionStatus::AwaitingDraw,
            reroll_count: 0,
            chosen_vendor: None,
            decider_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.status, SessionStatus::Locked)
    }

    /// Gate run before every draw. Reopens a locked session when forced,
    /// rejects it otherwise.
    pub fn prepare_draw(&mut self, force_reroll: bool) -> Result<()> {
        if !self.is_locked() {
            return Ok(());
        }
        if !force_reroll {
            return Err(RoomError::AlreadyDecided { date: self.date });
        }
        self.status = SessionStatus::AwaitingDraw;
        self.chosen_vendor = None;
        self.decider_name = None;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Count a completed draw. The drawn vendor is not recorded.
    pub fn record_draw(&mut self) {
        self.reroll_count = self.reroll_count.saturating_add(1);
        self.updated_at = Utc::now();
    }

    /// Bind a vendor and decider regardless of the current status.
    pub fn lock(&mut self, vendor_id: Uuid, decider_name: impl Into<String>) {
        self.status = SessionStatus::Locked;
        self.chosen_vendor = Some(vendor_id);
        self.decider_name = Some(decider_name.into());
        self.updated_at = Utc::now();
    }

    /// `chosen_vendor` and `decider_name` are present exactly when locked.
    pub fn is_consistent(&self) -> bool {
        let bound = self.chosen_vendor.is_some() && self.decider_name.is_some();
        let unbound = self.chosen_vendor.is_none() && self.decider_name.is_none();
        if self.is_locked() {
            bound
        } else {
            unbound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    #[test]
    fn new_session_awaits_draw_with_zero_rerolls() {
        let s = Session::new(day());
        assert_eq!(s.status, SessionStatus::AwaitingDraw);
        assert_eq!(s.reroll_count, 0);
        assert!(s.is_consistent());
    }

    #[test]
    fn draw_on_open_session_only_counts() {
        let mut s = Session::new(day());
        s.prepare_draw(false).unwrap();
        s.record_draw();
        assert_eq!(s.reroll_count, 1);
        assert_eq!(s.status, SessionStatus::AwaitingDraw);
    }

    #[test]
    fn locked_session_rejects_unforced_draw() {
        let mut s = Session::new(day());
        let vendor = Uuid::new_v4();
        s.lock(vendor, "Alice");
        let before = s.clone();

        let err = s.prepare_draw(false).unwrap_err();
        assert!(matches!(err, RoomError::AlreadyDecided { .. }));
        assert_eq!(s, before);
    }

    #[test]
    fn forced_draw_reopens_locked_session() {
        let mut s = Session::new(day());
        s.lock(Uuid::new_v4(), "Alice");
        s.prepare_draw(true).unwrap();
        assert_eq!(s.status, SessionStatus::AwaitingDraw);
        assert!(s.chosen_vendor.is_none());
        assert!(s.decider_name.is_none());
        assert!(s.is_consistent());
    }

    #[test]
    fn lock_without_prior_draw_is_allowed() {
        let mut s = Session::new(day());
        let vendor = Uuid::new_v4();
        s.lock(vendor, "Bob");
        assert!(s.is_locked());
        assert_eq!(s.chosen_vendor, Some(vendor));
        assert_eq!(s.decider_name.as_deref(), Some("Bob"));
        assert_eq!(s.reroll_count, 0);
        assert!(s.is_consistent());
    }
}

//! The daily room: draw, lock, orders and reset over a `RoomDb` and a
//! vendor catalog.
//!
//! Every operation takes its calendar day explicitly. Callers at the edge
//! (HTTP handlers, CLI) turn the wall clock into a date with [`Room::today`].

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::db::{ResetSummary, RoomDb};
use crate::draw::{self, DrawOutcome};
use crate::error::{Result, RoomError};
use crate::order::{Order, OrderDraft, OrderLimits, OrderView};
use crate::session::Session;
use crate::vendor::{Vendor, VendorCatalog};

pub struct Room<C> {
    db: Arc<RoomDb>,
    catalog: C,
    limits: OrderLimits,
    offset: FixedOffset,
}

impl<C: VendorCatalog> Room<C> {
    pub fn new(db: Arc<RoomDb>, catalog: C) -> Self {
        Self {
            db,
            catalog,
            limits: OrderLimits::default(),
            offset: Utc.fix(),
        }
    }

    pub fn with_limits(mut self, limits: OrderLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Offset used to truncate timestamps to calendar days.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn db(&self) -> &RoomDb {
        &self.db
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// The calendar day `now` falls on in the configured offset.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// UTC instants bounding `date` in the configured offset. Days at the
    /// edge of chrono's range have no representable bounds.
    fn day_bounds(&self, date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let shift = Duration::seconds(i64::from(self.offset.local_minus_utc()));
        let out_of_range = || RoomError::InvalidDate(date.to_string());
        let start = local_midnight
            .checked_sub_signed(shift)
            .ok_or_else(out_of_range)?;
        let end = start
            .checked_add_signed(Duration::days(1))
            .ok_or_else(out_of_range)?;
        Ok((Utc.from_utc_datetime(&start), Utc.from_utc_datetime(&end)))
    }

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    pub fn get_session(&self, date: NaiveDate) -> Result<Option<Session>> {
        self.db.session_for_date(date)
    }

    pub fn get_or_create_session(&self, date: NaiveDate) -> Result<Session> {
        self.db.get_or_create_session(date)
    }

    // -----------------------------------------------------------------------
    // Draw
    // -----------------------------------------------------------------------

    pub fn draw(&self, date: NaiveDate, region: &str, force_reroll: bool) -> Result<DrawOutcome> {
        self.draw_with_rng(date, region, force_reroll, &mut rand::thread_rng())
    }

    /// Propose a vendor for `date` and bump the reroll counter.
    ///
    /// A locked session is rejected unless `force_reroll`, in which case it is
    /// reopened and drawn in the same transaction. When `region` has no active
    /// vendors nothing is written.
    pub fn draw_with_rng<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        region: &str,
        force_reroll: bool,
        rng: &mut R,
    ) -> Result<DrawOutcome> {
        let candidates = self.catalog.list_active(region)?;
        let (session, candidate) = self.db.update_session_for_date(date, |session| {
            session.prepare_draw(force_reroll)?;
            let candidate = draw::pick(&candidates, rng)
                .cloned()
                .ok_or_else(|| RoomError::NoEligibleVendors {
                    region: region.to_string(),
                })?;
            session.record_draw();
            Ok(candidate)
        })?;

        tracing::info!(
            %date,
            session_id = %session.id,
            reroll_count = session.reroll_count,
            vendor_id = %candidate.id,
            forced = force_reroll,
            "vendor drawn"
        );
        Ok(DrawOutcome { session, candidate })
    }

    /// Uniform pick from `region` with no session side effects.
    pub fn random_vendor(&self, region: &str) -> Result<Vendor> {
        let candidates = self.catalog.list_active(region)?;
        draw::pick(&candidates, &mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| RoomError::NoEligibleVendors {
                region: region.to_string(),
            })
    }

    // -----------------------------------------------------------------------
    // Lock
    // -----------------------------------------------------------------------

    /// Commit `vendor_id` and `decider_name` to the session, whatever its
    /// status. The vendor's region is not compared with earlier draws.
    pub fn lock(&self, session_id: Uuid, vendor_id: Uuid, decider_name: &str) -> Result<Session> {
        let decider = decider_name.trim();
        if decider.is_empty() {
            return Err(RoomError::Validation("decider_name is required".into()));
        }
        self.catalog.require(vendor_id)?;

        let (session, ()) = self.db.update_session_by_id(session_id, |session| {
            session.lock(vendor_id, decider);
            Ok(())
        })?;
        tracing::info!(
            date = %session.date,
            session_id = %session.id,
            vendor_id = %vendor_id,
            decider = %decider,
            "session locked"
        );
        Ok(session)
    }

    // -----------------------------------------------------------------------
    // Orders
    // -----------------------------------------------------------------------

    /// Record an order against an existing session. The session does not
    /// have to be locked.
    pub fn submit_order(&self, draft: OrderDraft) -> Result<Order> {
        let draft = draft.validate(&self.limits)?;
        self.catalog.require(draft.vendor_id)?;

        let order = Order::from_draft(draft);
        self.db.insert_order(&order)?;
        tracing::info!(
            order_id = %order.id,
            session_id = %order.session_id,
            vendor_id = %order.vendor_id,
            "order submitted"
        );
        Ok(order)
    }

    /// Orders created on `date`, oldest first, with vendor and session resolved.
    pub fn list_orders(&self, date: NaiveDate) -> Result<Vec<OrderView>> {
        let (start, end) = self.day_bounds(date)?;
        let orders = self.db.orders_between(start, end)?;

        let mut sessions: HashMap<Uuid, Option<Session>> = HashMap::new();
        if let Some(own) = self.db.session_for_date(date)? {
            sessions.insert(own.id, Some(own));
        }
        let mut vendors: HashMap<Uuid, Option<Vendor>> = HashMap::new();
        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            let vendor = match vendors.get(&order.vendor_id) {
                Some(v) => v.clone(),
                None => {
                    let v = self.catalog.get(order.vendor_id)?;
                    vendors.insert(order.vendor_id, v.clone());
                    v
                }
            };
            let session = match sessions.get(&order.session_id) {
                Some(s) => s.clone(),
                None => {
                    let s = self.db.session_by_id(order.session_id)?;
                    sessions.insert(order.session_id, s.clone());
                    s
                }
            };
            result.push(OrderView {
                order,
                vendor,
                session,
            });
        }
        Ok(result)
    }

    /// Distinct calendar days that have at least one order, newest first.
    pub fn list_order_dates(&self) -> Result<Vec<NaiveDate>> {
        let days: BTreeSet<NaiveDate> = self
            .db
            .list_orders()?
            .iter()
            .map(|o| self.today(o.created_at))
            .collect();
        Ok(days.into_iter().rev().collect())
    }

    // -----------------------------------------------------------------------
    // Reset
    // -----------------------------------------------------------------------

    pub fn reset_day(&self, date: NaiveDate) -> Result<ResetSummary> {
        let summary = self.db.reset_day(date)?;
        if summary.session_removed {
            tracing::warn!(%date, orders_removed = summary.orders_removed, "day reset");
        } else {
            tracing::debug!(%date, "reset requested for day without session");
        }
        Ok(summary)
    }
}

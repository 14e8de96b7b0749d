//! Persistent storage for vendors, sessions and orders using redb.
//!
//! # Table design
//!
//! ```text
//! vendors   uuid (16 bytes)                              -> JSON Vendor
//! sessions  "YYYY-MM-DD"                                 -> JSON Session
//! orders    [ created_at_ms: u64 BE (8) | uuid (16) ]    -> JSON Order
//! ```
//!
//! Keying sessions by calendar day makes "one session per date" a property of
//! the table itself. Order keys lead with the creation timestamp, so a range
//! scan over a day's bounds returns that day's orders oldest first.
//!
//! Every mutation runs inside a single write transaction. redb admits one
//! writer at a time, so each read-modify-write (draw, lock, reset) is
//! serialized and either fully applied or not at all.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use redb::{Database, ReadableTable, TableDefinition, WriteTransaction};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Result, RoomError};
use crate::order::Order;
use crate::session::Session;
use crate::vendor::{Vendor, VendorCatalog, VendorDraft, VendorPatch};

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

const VENDORS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("vendors");
const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");
const ORDERS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("orders");

// ---------------------------------------------------------------------------
// Key helpers
// ---------------------------------------------------------------------------

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn order_key(ts: DateTime<Utc>, id: Uuid) -> [u8; 24] {
    let mut key = [0u8; 24];
    let ms = ts.timestamp_millis().max(0) as u64;
    key[..8].copy_from_slice(&ms.to_be_bytes());
    key[8..].copy_from_slice(id.as_bytes());
    key
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Outcome of `RoomDb::reset_day`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ResetSummary {
    pub session_removed: bool,
    pub orders_removed: usize,
}

/// Outcome of `RoomDb::import_vendors`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
}

// ---------------------------------------------------------------------------
// RoomDb
// ---------------------------------------------------------------------------

/// Persistent store for the vendor catalog, daily sessions and orders.
pub struct RoomDb {
    db: Database,
}

impl RoomDb {
    /// Open or create the redb database at `path`, creating all tables.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path).map_err(RoomError::storage)?;
        let wt = db.begin_write().map_err(RoomError::storage)?;
        wt.open_table(VENDORS).map_err(RoomError::storage)?;
        wt.open_table(SESSIONS).map_err(RoomError::storage)?;
        wt.open_table(ORDERS).map_err(RoomError::storage)?;
        wt.commit().map_err(RoomError::storage)?;
        Ok(Self { db })
    }

    /// Run `f` in a write transaction, committing on `Ok` and aborting on `Err`.
    fn write<T>(&self, f: impl FnOnce(&WriteTransaction) -> Result<T>) -> Result<T> {
        let wt = self.db.begin_write().map_err(RoomError::storage)?;
        match f(&wt) {
            Ok(value) => {
                wt.commit().map_err(RoomError::storage)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort) = wt.abort() {
                    tracing::warn!(error = %abort, "failed to abort write transaction");
                }
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Vendors
    // -----------------------------------------------------------------------

    /// Insert a new vendor. Names are unique across the catalog.
    pub fn create_vendor(&self, draft: VendorDraft) -> Result<Vendor> {
        let vendor = Vendor::from_draft(draft)?;
        self.write(|wt| {
            let mut table = wt.open_table(VENDORS).map_err(RoomError::storage)?;
            for entry in table.iter().map_err(RoomError::storage)? {
                let (_, v) = entry.map_err(RoomError::storage)?;
                let existing: Vendor = decode(v.value())?;
                if existing.name == vendor.name {
                    return Err(RoomError::VendorExists(vendor.name.clone()));
                }
            }
            let value = encode(&vendor)?;
            table
                .insert(vendor.id.as_bytes().as_slice(), value.as_slice())
                .map_err(RoomError::storage)?;
            Ok(())
        })?;
        tracing::info!(vendor_id = %vendor.id, name = %vendor.name, region = %vendor.region, "vendor created");
        Ok(vendor)
    }

    pub fn update_vendor(&self, id: Uuid, patch: VendorPatch) -> Result<Vendor> {
        let vendor = self.write(|wt| {
            let mut table = wt.open_table(VENDORS).map_err(RoomError::storage)?;
            let current = table
                .get(id.as_bytes().as_slice())
                .map_err(RoomError::storage)?
                .map(|g| g.value().to_vec())
                .ok_or_else(|| RoomError::VendorNotFound(id.to_string()))?;
            let mut vendor: Vendor = decode(&current)?;
            vendor.apply(patch)?;

            for entry in table.iter().map_err(RoomError::storage)? {
                let (_, v) = entry.map_err(RoomError::storage)?;
                let other: Vendor = decode(v.value())?;
                if other.id != vendor.id && other.name == vendor.name {
                    return Err(RoomError::VendorExists(vendor.name.clone()));
                }
            }

            let value = encode(&vendor)?;
            table
                .insert(id.as_bytes().as_slice(), value.as_slice())
                .map_err(RoomError::storage)?;
            Ok(vendor)
        })?;
        tracing::info!(vendor_id = %vendor.id, active = vendor.is_active, "vendor updated");
        Ok(vendor)
    }

    pub fn delete_vendor(&self, id: Uuid) -> Result<()> {
        self.write(|wt| {
            let mut table = wt.open_table(VENDORS).map_err(RoomError::storage)?;
            let removed = table
                .remove(id.as_bytes().as_slice())
                .map_err(RoomError::storage)?
                .is_some();
            if !removed {
                return Err(RoomError::VendorNotFound(id.to_string()));
            }
            Ok(())
        })?;
        tracing::info!(vendor_id = %id, "vendor deleted");
        Ok(())
    }

    /// Upsert vendors by name in one transaction.
    pub fn import_vendors(&self, drafts: Vec<VendorDraft>) -> Result<ImportSummary> {
        let summary = self.write(|wt| {
            let mut table = wt.open_table(VENDORS).map_err(RoomError::storage)?;
            let mut existing = Vec::new();
            for entry in table.iter().map_err(RoomError::storage)? {
                let (_, v) = entry.map_err(RoomError::storage)?;
                existing.push(decode::<Vendor>(v.value())?);
            }

            let mut summary = ImportSummary::default();
            for draft in drafts {
                let name = draft.name.trim().to_string();
                let vendor = match existing.iter_mut().find(|v| v.name == name) {
                    Some(current) => {
                        current.refresh_from(draft)?;
                        summary.updated += 1;
                        current.clone()
                    }
                    None => {
                        let created = Vendor::from_draft(draft)?;
                        existing.push(created.clone());
                        summary.created += 1;
                        created
                    }
                };
                let value = encode(&vendor)?;
                table
                    .insert(vendor.id.as_bytes().as_slice(), value.as_slice())
                    .map_err(RoomError::storage)?;
            }
            Ok(summary)
        })?;
        tracing::info!(
            created = summary.created,
            updated = summary.updated,
            "vendor catalog imported"
        );
        Ok(summary)
    }

    /// All vendors, newest first.
    pub fn list_vendors(&self) -> Result<Vec<Vendor>> {
        let rt = self.db.begin_read().map_err(RoomError::storage)?;
        let table = rt.open_table(VENDORS).map_err(RoomError::storage)?;
        let mut result = Vec::new();
        for entry in table.iter().map_err(RoomError::storage)? {
            let (_, v) = entry.map_err(RoomError::storage)?;
            result.push(decode::<Vendor>(v.value())?);
        }
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    /// Look up the session for `date` without creating one.
    pub fn session_for_date(&self, date: NaiveDate) -> Result<Option<Session>> {
        let rt = self.db.begin_read().map_err(RoomError::storage)?;
        let table = rt.open_table(SESSIONS).map_err(RoomError::storage)?;
        let key = date_key(date);
        match table.get(key.as_str()).map_err(RoomError::storage)? {
            Some(v) => Ok(Some(decode(v.value())?)),
            None => Ok(None),
        }
    }

    /// Find a session by id. Sessions are one per day, so a scan stays small.
    pub fn session_by_id(&self, id: Uuid) -> Result<Option<Session>> {
        Ok(self.list_sessions()?.into_iter().find(|s| s.id == id))
    }

    pub fn list_sessions(&self) -> Result<Vec<Session>> {
        let rt = self.db.begin_read().map_err(RoomError::storage)?;
        let table = rt.open_table(SESSIONS).map_err(RoomError::storage)?;
        let mut result = Vec::new();
        for entry in table.iter().map_err(RoomError::storage)? {
            let (_, v) = entry.map_err(RoomError::storage)?;
            result.push(decode::<Session>(v.value())?);
        }
        Ok(result)
    }

    pub fn get_or_create_session(&self, date: NaiveDate) -> Result<Session> {
        let (session, ()) = self.update_session_for_date(date, |_| Ok(()))?;
        Ok(session)
    }

    /// Load (or create) the session for `date`, apply `f`, and persist it.
    ///
    /// If `f` fails the transaction is aborted: neither the mutation nor a
    /// freshly created session is stored.
    pub fn update_session_for_date<T>(
        &self,
        date: NaiveDate,
        f: impl FnOnce(&mut Session) -> Result<T>,
    ) -> Result<(Session, T)> {
        self.write(|wt| {
            let mut table = wt.open_table(SESSIONS).map_err(RoomError::storage)?;
            let key = date_key(date);
            let current = table
                .get(key.as_str())
                .map_err(RoomError::storage)?
                .map(|g| g.value().to_vec());
            let mut session = match current {
                Some(bytes) => decode(&bytes)?,
                None => Session::new(date),
            };
            let out = f(&mut session)?;
            let value = encode(&session)?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(RoomError::storage)?;
            Ok((session, out))
        })
    }

    /// Apply `f` to the session identified by `id` and persist it.
    pub fn update_session_by_id<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> Result<T>,
    ) -> Result<(Session, T)> {
        self.write(|wt| {
            let mut table = wt.open_table(SESSIONS).map_err(RoomError::storage)?;
            let mut found = None;
            for entry in table.iter().map_err(RoomError::storage)? {
                let (_, v) = entry.map_err(RoomError::storage)?;
                let session: Session = decode(v.value())?;
                if session.id == id {
                    found = Some(session);
                    break;
                }
            }
            let mut session = found.ok_or_else(|| RoomError::SessionNotFound(id.to_string()))?;
            let out = f(&mut session)?;
            let key = date_key(session.date);
            let value = encode(&session)?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(RoomError::storage)?;
            Ok((session, out))
        })
    }

    // -----------------------------------------------------------------------
    // Orders
    // -----------------------------------------------------------------------

    /// Store a new order. The referenced session must exist at insert time.
    pub fn insert_order(&self, order: &Order) -> Result<()> {
        self.write(|wt| {
            let sessions = wt.open_table(SESSIONS).map_err(RoomError::storage)?;
            let mut exists = false;
            for entry in sessions.iter().map_err(RoomError::storage)? {
                let (_, v) = entry.map_err(RoomError::storage)?;
                if decode::<Session>(v.value())?.id == order.session_id {
                    exists = true;
                    break;
                }
            }
            if !exists {
                return Err(RoomError::SessionNotFound(order.session_id.to_string()));
            }

            let mut orders = wt.open_table(ORDERS).map_err(RoomError::storage)?;
            let key = order_key(order.created_at, order.id);
            let value = encode(order)?;
            orders
                .insert(key.as_slice(), value.as_slice())
                .map_err(RoomError::storage)?;
            Ok(())
        })
    }

    /// Orders created in `[start, end)`, oldest first.
    pub fn orders_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Order>> {
        let lower = order_key(start, Uuid::nil());
        let upper = order_key(end, Uuid::nil());
        let rt = self.db.begin_read().map_err(RoomError::storage)?;
        let table = rt.open_table(ORDERS).map_err(RoomError::storage)?;
        let mut result = Vec::new();
        for entry in table
            .range(lower.as_slice()..upper.as_slice())
            .map_err(RoomError::storage)?
        {
            let (_, v) = entry.map_err(RoomError::storage)?;
            result.push(decode::<Order>(v.value())?);
        }
        Ok(result)
    }

    /// Every order, oldest first.
    pub fn list_orders(&self) -> Result<Vec<Order>> {
        let rt = self.db.begin_read().map_err(RoomError::storage)?;
        let table = rt.open_table(ORDERS).map_err(RoomError::storage)?;
        let mut result = Vec::new();
        for entry in table.iter().map_err(RoomError::storage)? {
            let (_, v) = entry.map_err(RoomError::storage)?;
            result.push(decode::<Order>(v.value())?);
        }
        Ok(result)
    }

    // -----------------------------------------------------------------------
    // Reset
    // -----------------------------------------------------------------------

    /// Delete the session for `date` and every order attached to it.
    ///
    /// Both deletions share one transaction. A day without a session is a no-op.
    pub fn reset_day(&self, date: NaiveDate) -> Result<ResetSummary> {
        self.write(|wt| {
            let mut sessions = wt.open_table(SESSIONS).map_err(RoomError::storage)?;
            let key = date_key(date);
            let removed = sessions
                .remove(key.as_str())
                .map_err(RoomError::storage)?
                .map(|g| g.value().to_vec());
            let Some(bytes) = removed else {
                return Ok(ResetSummary::default());
            };
            let session: Session = decode(&bytes)?;

            let mut orders = wt.open_table(ORDERS).map_err(RoomError::storage)?;
            let mut doomed = Vec::new();
            for entry in orders.iter().map_err(RoomError::storage)? {
                let (k, v) = entry.map_err(RoomError::storage)?;
                if decode::<Order>(v.value())?.session_id == session.id {
                    doomed.push(k.value().to_vec());
                }
            }
            for k in &doomed {
                orders.remove(k.as_slice()).map_err(RoomError::storage)?;
            }

            Ok(ResetSummary {
                session_removed: true,
                orders_removed: doomed.len(),
            })
        })
    }
}

impl VendorCatalog for RoomDb {
    /// Active vendors in `region`, ordered by name for stable listings.
    fn list_active(&self, region: &str) -> Result<Vec<Vendor>> {
        let mut result: Vec<Vendor> = self
            .list_vendors()?
            .into_iter()
            .filter(|v| v.is_eligible(region))
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    fn get(&self, id: Uuid) -> Result<Option<Vendor>> {
        let rt = self.db.begin_read().map_err(RoomError::storage)?;
        let table = rt.open_table(VENDORS).map_err(RoomError::storage)?;
        match table
            .get(id.as_bytes().as_slice())
            .map_err(RoomError::storage)?
        {
            Some(v) => Ok(Some(decode(v.value())?)),
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderDraft;
    use crate::types::{IceLevel, SessionStatus, Sweetness};
    use chrono::Duration as CDur;
    use tempfile::TempDir;

    fn open_tmp() -> (TempDir, RoomDb) {
        let dir = TempDir::new().unwrap();
        let db = RoomDb::open(&dir.path().join("room.redb")).unwrap();
        (dir, db)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn order_for(session: &Session, vendor_id: Uuid, name: &str) -> Order {
        Order::from_draft(OrderDraft {
            session_id: session.id,
            vendor_id,
            requester_name: name.into(),
            drink: "Green tea".into(),
            sweetness: Sweetness::Light,
            ice: IceLevel::None,
            toppings: Vec::new(),
            notes: None,
        })
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let (_dir, db) = open_tmp();
        let first = db.get_or_create_session(day(2)).unwrap();
        let second = db.get_or_create_session(day(2)).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(db.list_sessions().unwrap().len(), 1);
    }

    #[test]
    fn session_lookup_does_not_create() {
        let (_dir, db) = open_tmp();
        assert!(db.session_for_date(day(3)).unwrap().is_none());
        assert!(db.list_sessions().unwrap().is_empty());
    }

    #[test]
    fn failed_update_leaves_store_unchanged() {
        let (_dir, db) = open_tmp();
        let err = db
            .update_session_for_date(day(4), |s| {
                s.record_draw();
                Err::<(), _>(RoomError::NoEligibleVendors {
                    region: "Daan".into(),
                })
            })
            .unwrap_err();
        assert!(matches!(err, RoomError::NoEligibleVendors { .. }));
        assert!(db.session_for_date(day(4)).unwrap().is_none());
    }

    #[test]
    fn update_by_unknown_id_is_not_found() {
        let (_dir, db) = open_tmp();
        let err = db
            .update_session_by_id(Uuid::new_v4(), |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, RoomError::SessionNotFound(_)));
    }

    #[test]
    fn update_by_id_persists_lock() {
        let (_dir, db) = open_tmp();
        let s = db.get_or_create_session(day(5)).unwrap();
        let vendor = Uuid::new_v4();
        db.update_session_by_id(s.id, |s| {
            s.lock(vendor, "Alice");
            Ok(())
        })
        .unwrap();
        let stored = db.session_for_date(day(5)).unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Locked);
        assert_eq!(stored.chosen_vendor, Some(vendor));
    }

    #[test]
    fn insert_order_requires_existing_session() {
        let (_dir, db) = open_tmp();
        let ghost = Session::new(day(6));
        let order = order_for(&ghost, Uuid::new_v4(), "Bob");
        let err = db.insert_order(&order).unwrap_err();
        assert!(matches!(err, RoomError::SessionNotFound(_)));
        assert!(db.list_orders().unwrap().is_empty());
    }

    #[test]
    fn orders_between_returns_creation_order_within_bounds() {
        let (_dir, db) = open_tmp();
        let s = db.get_or_create_session(day(7)).unwrap();
        let vendor = Uuid::new_v4();
        let now = Utc::now();

        let mut late = order_for(&s, vendor, "late");
        late.created_at = now - CDur::minutes(1);
        let mut early = order_for(&s, vendor, "early");
        early.created_at = now - CDur::minutes(10);
        let mut outside = order_for(&s, vendor, "outside");
        outside.created_at = now - CDur::days(2);

        db.insert_order(&late).unwrap();
        db.insert_order(&early).unwrap();
        db.insert_order(&outside).unwrap();

        let found = db
            .orders_between(now - CDur::hours(1), now)
            .unwrap();
        let names: Vec<_> = found.iter().map(|o| o.requester_name.as_str()).collect();
        assert_eq!(names, vec!["early", "late"]);
    }

    #[test]
    fn reset_removes_only_that_days_session_and_orders() {
        let (_dir, db) = open_tmp();
        let today = db.get_or_create_session(day(8)).unwrap();
        let other = db.get_or_create_session(day(9)).unwrap();
        let vendor = Uuid::new_v4();
        db.insert_order(&order_for(&today, vendor, "a")).unwrap();
        db.insert_order(&order_for(&today, vendor, "b")).unwrap();
        db.insert_order(&order_for(&other, vendor, "c")).unwrap();

        let summary = db.reset_day(day(8)).unwrap();
        assert_eq!(
            summary,
            ResetSummary {
                session_removed: true,
                orders_removed: 2
            }
        );
        assert!(db.session_for_date(day(8)).unwrap().is_none());
        let remaining = db.list_orders().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].session_id, other.id);
    }

    #[test]
    fn reset_without_session_is_noop() {
        let (_dir, db) = open_tmp();
        assert_eq!(db.reset_day(day(10)).unwrap(), ResetSummary::default());
    }

    #[test]
    fn vendor_names_are_unique() {
        let (_dir, db) = open_tmp();
        db.create_vendor(VendorDraft::new("50 Lan", "Daan")).unwrap();
        let err = db
            .create_vendor(VendorDraft::new("50 Lan", "Xinyi"))
            .unwrap_err();
        assert!(matches!(err, RoomError::VendorExists(_)));
    }

    #[test]
    fn rename_onto_existing_name_is_rejected() {
        let (_dir, db) = open_tmp();
        db.create_vendor(VendorDraft::new("50 Lan", "Daan")).unwrap();
        let other = db.create_vendor(VendorDraft::new("CoCo", "Daan")).unwrap();
        let err = db
            .update_vendor(
                other.id,
                VendorPatch {
                    name: Some("50 Lan".into()),
                    ..VendorPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, RoomError::VendorExists(_)));
    }

    #[test]
    fn import_upserts_by_name() {
        let (_dir, db) = open_tmp();
        let original = db.create_vendor(VendorDraft::new("Milksha", "Daan")).unwrap();

        let mut refreshed = VendorDraft::new("Milksha", "Daan");
        refreshed.menu_url = Some("https://www.milksha.com/".into());
        let summary = db
            .import_vendors(vec![refreshed, VendorDraft::new("Kebuke", "Daan")])
            .unwrap();
        assert_eq!(summary, ImportSummary { created: 1, updated: 1 });

        let stored = db.require(original.id).unwrap();
        assert_eq!(stored.menu_url.as_deref(), Some("https://www.milksha.com/"));
        assert_eq!(db.list_vendors().unwrap().len(), 2);
    }

    #[test]
    fn delete_missing_vendor_is_not_found() {
        let (_dir, db) = open_tmp();
        let err = db.delete_vendor(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, RoomError::VendorNotFound(_)));
    }

    #[test]
    fn catalog_filters_inactive_and_other_regions() {
        let (_dir, db) = open_tmp();
        db.create_vendor(VendorDraft::new("A", "Daan")).unwrap();
        let b = db.create_vendor(VendorDraft::new("B", "Daan")).unwrap();
        db.create_vendor(VendorDraft::new("C", "Xinyi")).unwrap();
        db.update_vendor(
            b.id,
            VendorPatch {
                is_active: Some(false),
                ..VendorPatch::default()
            },
        )
        .unwrap();

        let active = db.list_active("Daan").unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "A");
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Result, RoomError};

// ---------------------------------------------------------------------------
// Vendor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    /// Free-text category shown in the UI (e.g. "fruit tea").
    #[serde(default)]
    pub kind: Option<String>,
    pub region: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub menu_url: Option<String>,
    #[serde(default)]
    pub menu_image_url: Option<String>,
    #[serde(default)]
    pub uber_url: Option<String>,
    #[serde(default)]
    pub panda_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vendor {
    pub fn from_draft(draft: VendorDraft) -> Result<Self> {
        draft.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            kind: draft.kind,
            region: draft.region.trim().to_string(),
            address: draft.address,
            menu_url: draft.menu_url,
            menu_image_url: draft.menu_image_url,
            uber_url: draft.uber_url,
            panda_url: draft.panda_url,
            is_active: draft.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }

    /// Eligible for a draw in `region`.
    pub fn is_eligible(&self, region: &str) -> bool {
        self.is_active && self.region == region
    }

    /// Overwrite display fields from an import, keeping identity and timestamps.
    pub fn refresh_from(&mut self, draft: VendorDraft) -> Result<()> {
        draft.validate()?;
        self.kind = draft.kind;
        self.region = draft.region.trim().to_string();
        self.address = draft.address;
        self.menu_url = draft.menu_url;
        self.menu_image_url = draft.menu_image_url;
        self.uber_url = draft.uber_url;
        self.panda_url = draft.panda_url;
        if let Some(active) = draft.is_active {
            self.is_active = active;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn apply(&mut self, patch: VendorPatch) -> Result<()> {
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(RoomError::Validation("vendor name must not be blank".into()));
            }
            self.name = name.trim().to_string();
        }
        if let Some(region) = patch.region {
            if region.trim().is_empty() {
                return Err(RoomError::Validation("vendor region must not be blank".into()));
            }
            self.region = region.trim().to_string();
        }
        if let Some(kind) = patch.kind {
            self.kind = Some(kind);
        }
        if let Some(address) = patch.address {
            self.address = Some(address);
        }
        if let Some(url) = patch.menu_url {
            self.menu_url = Some(url);
        }
        if let Some(url) = patch.menu_image_url {
            self.menu_image_url = Some(url);
        }
        if let Some(url) = patch.uber_url {
            self.uber_url = Some(url);
        }
        if let Some(url) = patch.panda_url {
            self.panda_url = Some(url);
        }
        if let Some(active) = patch.is_active {
            self.is_active = active;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// VendorDraft / VendorPatch
// ---------------------------------------------------------------------------

/// Input for creating a vendor or importing a catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorDraft {
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>,
    pub region: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub menu_url: Option<String>,
    #[serde(default)]
    pub menu_image_url: Option<String>,
    #[serde(default)]
    pub uber_url: Option<String>,
    #[serde(default)]
    pub panda_url: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl VendorDraft {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RoomError::Validation("vendor name must not be blank".into()));
        }
        if self.region.trim().is_empty() {
            return Err(RoomError::Validation("vendor region must not be blank".into()));
        }
        Ok(())
    }
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub menu_url: Option<String>,
    #[serde(default)]
    pub menu_image_url: Option<String>,
    #[serde(default)]
    pub uber_url: Option<String>,
    #[serde(default)]
    pub panda_url: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

// ---------------------------------------------------------------------------
// VendorCatalog
// ---------------------------------------------------------------------------

/// Read side of the vendor catalog consumed by draws and orders.
pub trait VendorCatalog {
    /// Active vendors in `region`.
    fn list_active(&self, region: &str) -> Result<Vec<Vendor>>;

    fn get(&self, id: Uuid) -> Result<Option<Vendor>>;

    fn require(&self, id: Uuid) -> Result<Vendor> {
        self.get(id)?
            .ok_or_else(|| RoomError::VendorNotFound(id.to_string()))
    }
}

impl<T: VendorCatalog + ?Sized> VendorCatalog for Arc<T> {
    fn list_active(&self, region: &str) -> Result<Vec<Vendor>> {
        (**self).list_active(region)
    }

    fn get(&self, id: Uuid) -> Result<Option<Vendor>> {
        (**self).get(id)
    }
}

impl VendorCatalog for [Vendor] {
    fn list_active(&self, region: &str) -> Result<Vec<Vendor>> {
        Ok(self.iter().filter(|v| v.is_eligible(region)).cloned().collect())
    }

    fn get(&self, id: Uuid) -> Result<Option<Vendor>> {
        Ok(self.iter().find(|v| v.id == id).cloned())
    }
}

impl VendorCatalog for Vec<Vendor> {
    fn list_active(&self, region: &str) -> Result<Vec<Vendor>> {
        self.as_slice().list_active(region)
    }

    fn get(&self, id: Uuid) -> Result<Option<Vendor>> {
        VendorCatalog::get(self.as_slice(), id)
    }
}

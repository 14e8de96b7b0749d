use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{Result, RoomError};
use crate::session::Session;
use crate::types::{IceLevel, OrderStatus, Sweetness, Topping};
use crate::vendor::Vendor;

const MAX_NAME_CHARS: usize = 50;
const MAX_DRINK_CHARS: usize = 100;

// ---------------------------------------------------------------------------
// OrderLimits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderLimits {
    #[serde(default = "default_notes_max")]
    pub notes_max_chars: usize,
    #[serde(default = "default_max_toppings")]
    pub max_toppings: usize,
}

fn default_notes_max() -> usize {
    200
}

fn default_max_toppings() -> usize {
    5
}

impl Default for OrderLimits {
    fn default() -> Self {
        Self {
            notes_max_chars: default_notes_max(),
            max_toppings: default_max_toppings(),
        }
    }
}

// ---------------------------------------------------------------------------
// OrderDraft
// ---------------------------------------------------------------------------

/// An order submission as received from a requester.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub session_id: Uuid,
    pub vendor_id: Uuid,
    pub requester_name: String,
    pub drink: String,
    pub sweetness: Sweetness,
    pub ice: IceLevel,
    #[serde(default)]
    pub toppings: Vec<Topping>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl OrderDraft {
    /// Check field shapes and normalise whitespace. Never touches storage.
    pub fn validate(mut self, limits: &OrderLimits) -> Result<Self> {
        self.requester_name = required("requester_name", &self.requester_name, MAX_NAME_CHARS)?;
        self.drink = required("drink", &self.drink, MAX_DRINK_CHARS)?;

        if self.toppings.len() > limits.max_toppings {
            return Err(RoomError::Validation(format!(
                "at most {} toppings allowed, got {}",
                limits.max_toppings,
                self.toppings.len()
            )));
        }
        let mut seen = HashSet::new();
        for t in &self.toppings {
            if !seen.insert(*t) {
                return Err(RoomError::Validation(format!("duplicate topping '{t}'")));
            }
        }

        let notes = self.notes.as_deref().map(str::trim).unwrap_or("");
        if notes.chars().count() > limits.notes_max_chars {
            return Err(RoomError::Validation(format!(
                "notes exceed {} characters",
                limits.notes_max_chars
            )));
        }
        self.notes = (!notes.is_empty()).then(|| notes.to_string());
        Ok(self)
    }
}

fn required(field: &str, value: &str, max: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RoomError::Validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > max {
        return Err(RoomError::Validation(format!(
            "{field} exceeds {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub session_id: Uuid,
    pub vendor_id: Uuid,
    pub requester_name: String,
    pub drink: String,
    pub sweetness: Sweetness,
    pub ice: IceLevel,
    pub toppings: Vec<Topping>,
    pub notes: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Build a pending order from an already validated draft.
    pub fn from_draft(draft: OrderDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id: draft.session_id,
            vendor_id: draft.vendor_id,
            requester_name: draft.requester_name,
            drink: draft.drink,
            sweetness: draft.sweetness,
            ice: draft.ice,
            toppings: draft.toppings,
            notes: draft.notes.unwrap_or_default(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// An order with its vendor and session resolved for operator listings.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub vendor: Option<Vendor>,
    pub session: Option<Session>,
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RoomError;

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No vendor committed yet; draws are allowed.
    AwaitingDraw,
    /// A vendor and decider are bound to the day.
    Locked,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::AwaitingDraw => "awaiting_draw",
            SessionStatus::Locked => "locked",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OrderStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Sweetness
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sweetness {
    Full,
    Less,
    Half,
    Light,
    None,
}

impl Sweetness {
    pub fn all() -> &'static [Sweetness] {
        &[
            Sweetness::Full,
            Sweetness::Less,
            Sweetness::Half,
            Sweetness::Light,
            Sweetness::None,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sweetness::Full => "full",
            Sweetness::Less => "less",
            Sweetness::Half => "half",
            Sweetness::Light => "light",
            Sweetness::None => "none",
        }
    }
}

impl fmt::Display for Sweetness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sweetness {
    type Err = RoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sweetness::all()
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| RoomError::InvalidSweetness(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// IceLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IceLevel {
    Regular,
    Less,
    Light,
    None,
    RoomTemp,
    Hot,
}

impl IceLevel {
    pub fn all() -> &'static [IceLevel] {
        &[
            IceLevel::Regular,
            IceLevel::Less,
            IceLevel::Light,
            IceLevel::None,
            IceLevel::RoomTemp,
            IceLevel::Hot,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IceLevel::Regular => "regular",
            IceLevel::Less => "less",
            IceLevel::Light => "light",
            IceLevel::None => "none",
            IceLevel::RoomTemp => "room_temp",
            IceLevel::Hot => "hot",
        }
    }
}

impl fmt::Display for IceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IceLevel {
    type Err = RoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IceLevel::all()
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| RoomError::InvalidIceLevel(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Topping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topping {
    Pearl,
    CoconutJelly,
    Pudding,
    GrassJelly,
    Aloe,
    RedBean,
    TaroBall,
    Oat,
    CheeseFoam,
}

impl Topping {
    pub fn all() -> &'static [Topping] {
        &[
            Topping::Pearl,
            Topping::CoconutJelly,
            Topping::Pudding,
            Topping::GrassJelly,
            Topping::Aloe,
            Topping::RedBean,
            Topping::TaroBall,
            Topping::Oat,
            Topping::CheeseFoam,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Topping::Pearl => "pearl",
            Topping::CoconutJelly => "coconut_jelly",
            Topping::Pudding => "pudding",
            Topping::GrassJelly => "grass_jelly",
            Topping::Aloe => "aloe",
            Topping::RedBean => "red_bean",
            Topping::TaroBall => "taro_ball",
            Topping::Oat => "oat",
            Topping::CheeseFoam => "cheese_foam",
        }
    }
}

impl fmt::Display for Topping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Topping {
    type Err = RoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topping::all()
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| RoomError::InvalidTopping(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Parse a `YYYY-MM-DD` calendar day.
pub fn parse_date(s: &str) -> crate::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| RoomError::InvalidDate(s.to_string()))
}

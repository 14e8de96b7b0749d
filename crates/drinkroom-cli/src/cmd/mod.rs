pub mod admin;
pub mod config;
pub mod init;
pub mod order;
pub mod room;
pub mod serve;
pub mod vendor;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use drinkroom_core::config::Config;
use drinkroom_core::types::parse_date;
use drinkroom_core::{paths, Room, RoomDb};

/// The room as the CLI drives it: the redb store is also the catalog.
pub type CliRoom = Room<Arc<RoomDb>>;

/// Load config and open the store under `root`.
pub fn open_room(root: &Path) -> anyhow::Result<(Config, CliRoom)> {
    let config = Config::load(root).context("failed to load config (run `drinkroom init`)")?;
    let db = Arc::new(RoomDb::open(&paths::db_path(root)).context("failed to open store")?);
    let room = Room::new(db.clone(), db)
        .with_limits(config.limits)
        .with_offset(config.offset()?);
    Ok((config, room))
}

/// `--date` if given, otherwise today in the configured offset.
pub fn date_or_today(room: &CliRoom, date: Option<&str>) -> anyhow::Result<NaiveDate> {
    match date {
        Some(d) => Ok(parse_date(d)?),
        None => Ok(room.today(Utc::now())),
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use drinkroom_core::config::Config;
use drinkroom_core::{paths, Room, RoomDb};

use crate::auth::OperatorAuth;

/// The room as wired for the server: the redb store doubles as the catalog.
pub type SharedRoom = Room<Arc<RoomDb>>;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    pub room: Arc<SharedRoom>,
    pub auth: Arc<OperatorAuth>,
}

impl AppState {
    /// Load `.drinkroom/config.yaml` under `root` and open the store.
    pub fn open(root: &Path, secret_override: Option<String>) -> drinkroom_core::Result<Self> {
        let config = Config::load(root)?;
        let db = Arc::new(RoomDb::open(&paths::db_path(root))?);
        Self::new(root.to_path_buf(), config, db, secret_override)
    }

    pub fn new(
        root: PathBuf,
        config: Config,
        db: Arc<RoomDb>,
        secret_override: Option<String>,
    ) -> drinkroom_core::Result<Self> {
        let room = Room::new(db.clone(), db)
            .with_limits(config.limits)
            .with_offset(config.offset()?);
        let auth = OperatorAuth::from_config(&config.auth, secret_override);
        Ok(Self {
            root,
            config: Arc::new(config),
            room: Arc::new(room),
            auth: Arc::new(auth),
        })
    }

    /// The current calendar day in the configured offset.
    pub fn today(&self) -> NaiveDate {
        self.room.today(Utc::now())
    }

    /// `region` if given and non-blank, otherwise the configured default.
    pub fn region_or_default(&self, region: Option<String>) -> String {
        region
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| self.config.default_region.clone())
    }
}

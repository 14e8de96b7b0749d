pub mod config;
pub mod db;
pub mod draw;
pub mod error;
pub mod io;
pub mod order;
pub mod paths;
pub mod room;
pub mod session;
pub mod types;
pub mod vendor;

pub use db::{ImportSummary, ResetSummary, RoomDb};
pub use error::{ErrorKind, Result, RoomError};
pub use room::Room;

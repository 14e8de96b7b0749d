use crate::output::{or_dash, print_json};
use clap::Subcommand;
use drinkroom_core::session::Session;
use drinkroom_core::vendor::VendorCatalog;
use std::path::Path;
use uuid::Uuid;

use super::{date_or_today, open_room, CliRoom};

#[derive(Subcommand)]
pub enum RoomSubcommand {
    /// Show a day's session
    Show {
        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Propose a random vendor for today
    Draw {
        /// Region to draw from (default: default_region from config)
        #[arg(long)]
        region: Option<String>,
        /// Reopen a locked session and draw again
        #[arg(long)]
        force: bool,
    },
    /// Commit a vendor and decider to today's session
    Lock {
        vendor_id: Uuid,
        /// Person making the call
        #[arg(long)]
        decider: String,
    },
    /// Delete a day's session and all its orders
    Reset {
        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: RoomSubcommand, json: bool) -> anyhow::Result<()> {
    let (config, room) = open_room(root)?;
    match subcmd {
        RoomSubcommand::Show { date } => show(&room, date.as_deref(), json),
        RoomSubcommand::Draw { region, force } => {
            let region = region.unwrap_or(config.default_region);
            draw(&room, &region, force, json)
        }
        RoomSubcommand::Lock { vendor_id, decider } => lock(&room, vendor_id, &decider, json),
        RoomSubcommand::Reset { date } => reset(&room, date.as_deref(), json),
    }
}

fn print_session(room: &CliRoom, session: &Session) -> anyhow::Result<()> {
    println!("Date:         {}", session.date);
    println!("Session:      {}", session.id);
    println!("Status:       {}", session.status);
    println!("Draws:        {}", session.reroll_count);
    if let Some(id) = session.chosen_vendor {
        let name = room.catalog().get(id)?.map(|v| v.name);
        println!("Vendor:       {}", or_dash(name.as_deref()));
    }
    if let Some(decider) = &session.decider_name {
        println!("Decided by:   {decider}");
    }
    Ok(())
}

fn show(room: &CliRoom, date: Option<&str>, json: bool) -> anyhow::Result<()> {
    let date = date_or_today(room, date)?;
    let session = room.get_session(date)?;

    if json {
        return print_json(&session);
    }
    match session {
        Some(s) => print_session(room, &s),
        None => {
            println!("No session for {date}.");
            Ok(())
        }
    }
}

fn draw(room: &CliRoom, region: &str, force: bool, json: bool) -> anyhow::Result<()> {
    let date = date_or_today(room, None)?;
    let outcome = room.draw(date, region, force)?;

    if json {
        print_json(&outcome)?;
    } else {
        println!(
            "Drew '{}' ({}) for {date}, draw #{}",
            outcome.candidate.name, outcome.candidate.id, outcome.session.reroll_count
        );
        println!(
            "Lock it with: drinkroom room lock {} --decider <NAME>",
            outcome.candidate.id
        );
    }
    Ok(())
}

fn lock(room: &CliRoom, vendor_id: Uuid, decider: &str, json: bool) -> anyhow::Result<()> {
    let date = date_or_today(room, None)?;
    let session = room.get_or_create_session(date)?;
    let session = room.lock(session.id, vendor_id, decider)?;

    if json {
        print_json(&session)
    } else {
        print_session(room, &session)
    }
}

fn reset(room: &CliRoom, date: Option<&str>, json: bool) -> anyhow::Result<()> {
    let date = date_or_today(room, date)?;
    let summary = room.reset_day(date)?;

    if json {
        print_json(&serde_json::json!({
            "date": date,
            "session_removed": summary.session_removed,
            "orders_removed": summary.orders_removed,
        }))?;
    } else if summary.session_removed {
        println!(
            "Reset {date}: session removed, {} order(s) removed",
            summary.orders_removed
        );
    } else {
        println!("Nothing to reset for {date}.");
    }
    Ok(())
}

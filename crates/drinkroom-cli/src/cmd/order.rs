use crate::output::{or_dash, print_json, print_table};
use clap::Subcommand;
use drinkroom_core::order::OrderDraft;
use drinkroom_core::types::{IceLevel, Sweetness, Topping};
use drinkroom_core::RoomError;
use std::path::Path;
use uuid::Uuid;

use super::{date_or_today, open_room, CliRoom};

#[derive(Subcommand)]
pub enum OrderSubcommand {
    /// Submit an order against today's session
    Submit {
        /// Requester name
        #[arg(long)]
        name: String,
        /// Vendor the drink comes from
        #[arg(long)]
        vendor: Uuid,
        #[arg(long)]
        drink: String,
        /// full, less, half, light or none
        #[arg(long)]
        sweetness: String,
        /// regular, less, light, none, room_temp or hot
        #[arg(long)]
        ice: String,
        /// Repeatable: --topping pearl --topping aloe
        #[arg(long = "topping")]
        toppings: Vec<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List a day's orders, oldest first
    List {
        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Calendar days that have orders, newest first
    Days,
}

pub fn run(root: &Path, subcmd: OrderSubcommand, json: bool) -> anyhow::Result<()> {
    let (_, room) = open_room(root)?;
    match subcmd {
        OrderSubcommand::Submit {
            name,
            vendor,
            drink,
            sweetness,
            ice,
            toppings,
            notes,
        } => {
            let date = date_or_today(&room, None)?;
            let session = room
                .get_session(date)?
                .ok_or_else(|| RoomError::SessionNotFound(date.to_string()))?;
            let draft = OrderDraft {
                session_id: session.id,
                vendor_id: vendor,
                requester_name: name,
                drink,
                sweetness: sweetness.parse::<Sweetness>()?,
                ice: ice.parse::<IceLevel>()?,
                toppings: toppings
                    .iter()
                    .map(|t| t.parse::<Topping>())
                    .collect::<Result<Vec<_>, _>>()?,
                notes,
            };
            submit(&room, draft, json)
        }
        OrderSubcommand::List { date } => list(&room, date.as_deref(), json),
        OrderSubcommand::Days => days(&room, json),
    }
}

fn submit(room: &CliRoom, draft: OrderDraft, json: bool) -> anyhow::Result<()> {
    let order = room.submit_order(draft)?;
    if json {
        print_json(&order)?;
    } else {
        println!(
            "Order {} recorded for {}: {}",
            order.id, order.requester_name, order.drink
        );
    }
    Ok(())
}

fn list(room: &CliRoom, date: Option<&str>, json: bool) -> anyhow::Result<()> {
    let date = date_or_today(room, date)?;
    let orders = room.list_orders(date)?;

    if json {
        return print_json(&orders);
    }
    if orders.is_empty() {
        println!("No orders for {date}.");
        return Ok(());
    }
    let rows = orders
        .iter()
        .map(|view| {
            let o = &view.order;
            let toppings: Vec<&str> = o.toppings.iter().map(|t| t.as_str()).collect();
            vec![
                o.requester_name.clone(),
                or_dash(view.vendor.as_ref().map(|v| v.name.as_str())),
                o.drink.clone(),
                o.sweetness.to_string(),
                o.ice.to_string(),
                if toppings.is_empty() {
                    "-".to_string()
                } else {
                    toppings.join(",")
                },
                if o.notes.is_empty() {
                    "-".to_string()
                } else {
                    o.notes.clone()
                },
            ]
        })
        .collect();
    print_table(
        &["NAME", "VENDOR", "DRINK", "SWEETNESS", "ICE", "TOPPINGS", "NOTES"],
        rows,
    );
    Ok(())
}

fn days(room: &CliRoom, json: bool) -> anyhow::Result<()> {
    let days = room.list_order_dates()?;
    if json {
        return print_json(&days);
    }
    if days.is_empty() {
        println!("No orders yet.");
    }
    for d in days {
        println!("{d}");
    }
    Ok(())
}

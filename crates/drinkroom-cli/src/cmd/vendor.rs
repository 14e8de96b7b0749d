use crate::output::{or_dash, print_json, print_table};
use anyhow::Context;
use clap::{Args, Subcommand};
use drinkroom_core::vendor::{Vendor, VendorDraft, VendorPatch};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::open_room;

#[derive(Args)]
pub struct VendorFields {
    /// Free-form kind, e.g. "tea" or "coffee"
    #[arg(long)]
    kind: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    menu_url: Option<String>,
    #[arg(long)]
    menu_image_url: Option<String>,
    #[arg(long)]
    uber_url: Option<String>,
    #[arg(long)]
    panda_url: Option<String>,
}

#[derive(Subcommand)]
pub enum VendorSubcommand {
    /// Add a vendor to the catalog
    Add {
        name: String,
        #[arg(long)]
        region: String,
        #[command(flatten)]
        fields: VendorFields,
        /// Add the vendor as inactive (never drawn)
        #[arg(long)]
        inactive: bool,
    },
    /// List the catalog, newest first
    List {
        /// Only vendors in this region
        #[arg(long)]
        region: Option<String>,
        /// Hide inactive vendors
        #[arg(long)]
        active_only: bool,
    },
    /// Change fields on an existing vendor
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        region: Option<String>,
        #[command(flatten)]
        fields: VendorFields,
        /// true or false
        #[arg(long)]
        active: Option<bool>,
    },
    /// Remove a vendor from the catalog
    Remove { id: Uuid },
    /// Upsert vendors by name from a YAML or JSON list
    Import { file: PathBuf },
    /// Pick a random active vendor without touching any session
    Random {
        #[arg(long)]
        region: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: VendorSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        VendorSubcommand::Add {
            name,
            region,
            fields,
            inactive,
        } => add(root, name, region, fields, inactive, json),
        VendorSubcommand::List {
            region,
            active_only,
        } => list(root, region.as_deref(), active_only, json),
        VendorSubcommand::Update {
            id,
            name,
            region,
            fields,
            active,
        } => {
            let patch = VendorPatch {
                name,
                kind: fields.kind,
                region,
                address: fields.address,
                menu_url: fields.menu_url,
                menu_image_url: fields.menu_image_url,
                uber_url: fields.uber_url,
                panda_url: fields.panda_url,
                is_active: active,
            };
            update(root, id, patch, json)
        }
        VendorSubcommand::Remove { id } => remove(root, id, json),
        VendorSubcommand::Import { file } => import(root, &file, json),
        VendorSubcommand::Random { region } => random(root, region, json),
    }
}

fn add(
    root: &Path,
    name: String,
    region: String,
    fields: VendorFields,
    inactive: bool,
    json: bool,
) -> anyhow::Result<()> {
    let (_, room) = open_room(root)?;
    let draft = VendorDraft {
        name,
        kind: fields.kind,
        region,
        address: fields.address,
        menu_url: fields.menu_url,
        menu_image_url: fields.menu_image_url,
        uber_url: fields.uber_url,
        panda_url: fields.panda_url,
        is_active: Some(!inactive),
    };
    let vendor = room.db().create_vendor(draft)?;

    if json {
        print_json(&vendor)?;
    } else {
        println!("Added vendor '{}' ({}) in {}", vendor.name, vendor.id, vendor.region);
    }
    Ok(())
}

fn list(root: &Path, region: Option<&str>, active_only: bool, json: bool) -> anyhow::Result<()> {
    let (_, room) = open_room(root)?;
    let vendors: Vec<Vendor> = room
        .db()
        .list_vendors()?
        .into_iter()
        .filter(|v| region.map_or(true, |r| v.region == r))
        .filter(|v| !active_only || v.is_active)
        .collect();

    if json {
        return print_json(&vendors);
    }
    if vendors.is_empty() {
        println!("No vendors.");
        return Ok(());
    }
    let rows = vendors
        .iter()
        .map(|v| {
            vec![
                v.id.to_string(),
                v.name.clone(),
                v.region.clone(),
                or_dash(v.kind.as_deref()),
                if v.is_active { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "REGION", "KIND", "ACTIVE"], rows);
    Ok(())
}

fn update(root: &Path, id: Uuid, patch: VendorPatch, json: bool) -> anyhow::Result<()> {
    let (_, room) = open_room(root)?;
    let vendor = room.db().update_vendor(id, patch)?;
    if json {
        print_json(&vendor)?;
    } else {
        println!("Updated vendor '{}'", vendor.name);
    }
    Ok(())
}

fn remove(root: &Path, id: Uuid, json: bool) -> anyhow::Result<()> {
    let (_, room) = open_room(root)?;
    room.db().delete_vendor(id)?;
    if json {
        print_json(&serde_json::json!({ "removed": id }))?;
    } else {
        println!("Removed vendor {id}");
    }
    Ok(())
}

fn import(root: &Path, file: &Path, json: bool) -> anyhow::Result<()> {
    let (_, room) = open_room(root)?;
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    // YAML is a superset of JSON, so one parser covers both.
    let drafts: Vec<VendorDraft> = serde_yaml::from_str(&data)
        .with_context(|| format!("failed to parse vendor list in {}", file.display()))?;
    let summary = room.db().import_vendors(drafts)?;

    if json {
        print_json(&summary)?;
    } else {
        println!(
            "Imported vendors: {} created, {} updated",
            summary.created, summary.updated
        );
    }
    Ok(())
}

fn random(root: &Path, region: Option<String>, json: bool) -> anyhow::Result<()> {
    let (config, room) = open_room(root)?;
    let region = region.unwrap_or(config.default_region);
    let vendor = room.random_vendor(&region)?;
    if json {
        print_json(&vendor)?;
    } else {
        println!("{} ({})", vendor.name, vendor.region);
        if let Some(url) = &vendor.menu_url {
            println!("  menu: {url}");
        }
    }
    Ok(())
}

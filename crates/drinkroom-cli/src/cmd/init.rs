use anyhow::Context;
use drinkroom_core::{config::Config, paths, RoomDb};
use std::path::Path;

pub fn run(root: &Path, region: Option<&str>) -> anyhow::Result<()> {
    println!("Initializing drink room in: {}", root.display());

    let data_dir = paths::data_dir(root);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    let config_path = paths::config_path(root);
    if !config_path.exists() {
        let cfg = match region {
            Some(r) => Config::new(r),
            None => Config::default(),
        };
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        if region.is_some() {
            tracing::warn!("config exists; --region ignored");
        }
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    let db_path = paths::db_path(root);
    let existed = db_path.exists();
    RoomDb::open(&db_path).context("failed to create store")?;
    if existed {
        println!("  exists:  {}", paths::DB_FILE);
    } else {
        println!("  created: {}", paths::DB_FILE);
    }

    println!("\nNext: add vendors with `drinkroom vendor add <NAME> --region <REGION>`");
    Ok(())
}

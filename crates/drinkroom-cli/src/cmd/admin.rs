use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use drinkroom_core::config::{Config, OperatorConfig};
use drinkroom_server::auth::{hash_password_with_cost, PASSWORD_COST};
use std::path::Path;

#[derive(Subcommand)]
pub enum AdminSubcommand {
    /// Print a bcrypt password_hash value for config.yaml
    HashPassword {
        password: String,
        /// bcrypt cost (4-31)
        #[arg(long, default_value_t = PASSWORD_COST)]
        cost: u32,
    },
    /// Add or replace an operator in config.yaml
    AddOperator {
        username: String,
        #[arg(long)]
        password: String,
        /// bcrypt cost (4-31)
        #[arg(long, default_value_t = PASSWORD_COST)]
        cost: u32,
    },
    /// Remove an operator from config.yaml
    RemoveOperator { username: String },
}

pub fn run(root: &Path, subcmd: AdminSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        AdminSubcommand::HashPassword { password, cost } => {
            let hash = hash_password_with_cost(&password, cost).context("failed to hash password")?;
            if json {
                print_json(&serde_json::json!({ "password_hash": hash }))
            } else {
                println!("{hash}");
                Ok(())
            }
        }
        AdminSubcommand::AddOperator {
            username,
            password,
            cost,
        } => add_operator(root, &username, &password, cost),
        AdminSubcommand::RemoveOperator { username } => remove_operator(root, &username),
    }
}

fn add_operator(root: &Path, username: &str, password: &str, cost: u32) -> anyhow::Result<()> {
    let username = username.trim();
    if username.is_empty() {
        anyhow::bail!("username must not be blank");
    }
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }

    let mut config = Config::load(root).context("failed to load config")?;
    let entry = OperatorConfig {
        username: username.to_string(),
        password_hash: hash_password_with_cost(password, cost)
            .context("failed to hash password")?,
    };
    let replaced = match config.auth.operators.iter_mut().find(|o| o.username == username) {
        Some(existing) => {
            *existing = entry;
            true
        }
        None => {
            config.auth.operators.push(entry);
            false
        }
    };
    config.save(root).context("failed to write config.yaml")?;

    if replaced {
        println!("Updated password for operator '{username}'");
    } else {
        println!("Added operator '{username}'");
    }
    Ok(())
}

fn remove_operator(root: &Path, username: &str) -> anyhow::Result<()> {
    let mut config = Config::load(root).context("failed to load config")?;
    if config.operator(username).is_none() {
        anyhow::bail!("no operator named '{username}'");
    }
    config.auth.operators.retain(|o| o.username != username);
    config.save(root).context("failed to write config.yaml")?;
    println!("Removed operator '{username}'");
    Ok(())
}

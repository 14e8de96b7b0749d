#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn drinkroom(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("drinkroom").unwrap();
    cmd.current_dir(dir.path())
        .env("DRINKROOM_ROOT", dir.path())
        .env_remove("DRINKROOM_TOKEN_SECRET");
    cmd
}

fn init_room(dir: &TempDir) {
    drinkroom(dir)
        .args(["init", "--region", "Daan"])
        .assert()
        .success();
}

/// Run with `--json` and parse stdout.
fn json_of(dir: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = drinkroom(dir).arg("--json").args(args).output().unwrap();
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn add_vendor(dir: &TempDir, name: &str, region: &str) -> String {
    let v = json_of(dir, &["vendor", "add", name, "--region", region]);
    v["id"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// drinkroom init / config
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_and_store() {
    let dir = TempDir::new().unwrap();
    init_room(&dir);

    assert!(dir.path().join(".drinkroom/config.yaml").exists());
    assert!(dir.path().join(".drinkroom/room.redb").exists());
    let cfg = std::fs::read_to_string(dir.path().join(".drinkroom/config.yaml")).unwrap();
    assert!(cfg.contains("default_region: Daan"));
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init_room(&dir);
    drinkroom(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:"));
}

#[test]
fn commands_before_init_fail() {
    let dir = TempDir::new().unwrap();
    drinkroom(&dir)
        .args(["vendor", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("drinkroom init"));
}

#[test]
fn config_validate_warns_but_passes_on_fresh_init() {
    let dir = TempDir::new().unwrap();
    init_room(&dir);
    drinkroom(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no operators"));
}

// ---------------------------------------------------------------------------
// drinkroom vendor
// ---------------------------------------------------------------------------

#[test]
fn vendor_add_and_list() {
    let dir = TempDir::new().unwrap();
    init_room(&dir);
    add_vendor(&dir, "50 Lan", "Daan");

    drinkroom(&dir)
        .args(["vendor", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("50 Lan"));
}

#[test]
fn vendor_add_duplicate_fails() {
    let dir = TempDir::new().unwrap();
    init_room(&dir);
    add_vendor(&dir, "50 Lan", "Daan");

    drinkroom(&dir)
        .args(["vendor", "add", "50 Lan", "--region", "Xinyi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn vendor_import_upserts_by_name() {
    let dir = TempDir::new().unwrap();
    init_room(&dir);
    add_vendor(&dir, "50 Lan", "Daan");

    let file = dir.path().join("vendors.yaml");
    std::fs::write(
        &file,
        "- name: 50 Lan\n  region: Daan\n  kind: tea\n- name: Kebuke\n  region: Daan\n",
    )
    .unwrap();

    let summary = json_of(&dir, &["vendor", "import", file.to_str().unwrap()]);
    assert_eq!(summary["created"], 1);
    assert_eq!(summary["updated"], 1);

    let vendors = json_of(&dir, &["vendor", "list"]);
    assert_eq!(vendors.as_array().unwrap().len(), 2);
}

#[test]
fn inactive_vendor_is_never_random() {
    let dir = TempDir::new().unwrap();
    init_room(&dir);
    let id = add_vendor(&dir, "50 Lan", "Daan");
    drinkroom(&dir)
        .args(["vendor", "update", &id, "--active", "false"])
        .assert()
        .success();

    drinkroom(&dir)
        .args(["vendor", "random"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no active vendors"));
}

// ---------------------------------------------------------------------------
// drinkroom room / order
// ---------------------------------------------------------------------------

#[test]
fn draw_lock_order_reset_flow() {
    let dir = TempDir::new().unwrap();
    init_room(&dir);
    let id = add_vendor(&dir, "50 Lan", "Daan");

    let drawn = json_of(&dir, &["room", "draw"]);
    assert_eq!(drawn["session"]["reroll_count"], 1);
    assert_eq!(drawn["candidate"]["id"], id.as_str());

    drinkroom(&dir)
        .args(["room", "lock", &id, "--decider", "Alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("locked"));

    drinkroom(&dir)
        .args(["room", "draw"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already decided"));

    drinkroom(&dir)
        .args([
            "order",
            "submit",
            "--name",
            "Bob",
            "--vendor",
            &id,
            "--drink",
            "Four seasons tea",
            "--sweetness",
            "less",
            "--ice",
            "light",
            "--topping",
            "pearl",
        ])
        .assert()
        .success();

    drinkroom(&dir)
        .args(["order", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bob").and(predicate::str::contains("pearl")));

    let days = json_of(&dir, &["order", "days"]);
    assert_eq!(days.as_array().unwrap().len(), 1);

    let reset = json_of(&dir, &["room", "reset"]);
    assert_eq!(reset["session_removed"], true);
    assert_eq!(reset["orders_removed"], 1);

    drinkroom(&dir)
        .args(["order", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No orders"));
    drinkroom(&dir)
        .args(["room", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No session"));
}

#[test]
fn lock_without_prior_draw_creates_session() {
    let dir = TempDir::new().unwrap();
    init_room(&dir);
    let id = add_vendor(&dir, "50 Lan", "Daan");

    drinkroom(&dir)
        .args(["room", "lock", &id, "--decider", "Alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("locked"));

    let session = json_of(&dir, &["room", "show"]);
    assert_eq!(session["status"], "locked");
    assert_eq!(session["reroll_count"], 0);
    assert_eq!(session["chosen_vendor"], id.as_str());
}

#[test]
fn forced_draw_reopens_locked_room() {
    let dir = TempDir::new().unwrap();
    init_room(&dir);
    let id = add_vendor(&dir, "50 Lan", "Daan");
    json_of(&dir, &["room", "draw"]);
    json_of(&dir, &["room", "lock", &id, "--decider", "Alice"]);

    let forced = json_of(&dir, &["room", "draw", "--force"]);
    assert_eq!(forced["session"]["reroll_count"], 2);
    assert_eq!(forced["session"]["status"], "awaiting_draw");
    assert!(forced["session"]["decider_name"].is_null());
}

#[test]
fn draw_in_empty_region_fails_and_creates_nothing() {
    let dir = TempDir::new().unwrap();
    init_room(&dir);
    add_vendor(&dir, "50 Lan", "Daan");

    drinkroom(&dir)
        .args(["room", "draw", "--region", "Xinyi"])
        .assert()
        .failure();

    let session = json_of(&dir, &["room", "show"]);
    assert!(session.is_null());
}

#[test]
fn order_with_unknown_topping_fails() {
    let dir = TempDir::new().unwrap();
    init_room(&dir);
    let id = add_vendor(&dir, "50 Lan", "Daan");
    json_of(&dir, &["room", "draw"]);

    drinkroom(&dir)
        .args([
            "order",
            "submit",
            "--name",
            "Bob",
            "--vendor",
            &id,
            "--drink",
            "Milk tea",
            "--sweetness",
            "half",
            "--ice",
            "none",
            "--topping",
            "sprinkles",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid topping"));
}

#[test]
fn order_without_session_fails() {
    let dir = TempDir::new().unwrap();
    init_room(&dir);
    let id = add_vendor(&dir, "50 Lan", "Daan");

    drinkroom(&dir)
        .args([
            "order",
            "submit",
            "--name",
            "Bob",
            "--vendor",
            &id,
            "--drink",
            "Milk tea",
            "--sweetness",
            "half",
            "--ice",
            "none",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("session not found"));
}

#[test]
fn room_show_rejects_bad_date() {
    let dir = TempDir::new().unwrap();
    init_room(&dir);
    drinkroom(&dir)
        .args(["room", "show", "--date", "06/02/2025"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("YYYY-MM-DD"));
}

// ---------------------------------------------------------------------------
// drinkroom admin
// ---------------------------------------------------------------------------

#[test]
fn hash_password_prints_verifiable_bcrypt_hash() {
    let dir = TempDir::new().unwrap();
    let output = drinkroom(&dir)
        .args(["admin", "hash-password", "hunter2", "--cost", "4"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let printed = String::from_utf8(output.stdout).unwrap();
    let hash = printed.trim();
    assert!(hash.starts_with("$2"), "{hash}");
    assert!(drinkroom_server::auth::verify_password("hunter2", hash));
    assert!(!drinkroom_server::auth::verify_password("hunter3", hash));
}

#[test]
fn hash_password_is_salted() {
    let dir = TempDir::new().unwrap();
    let first = json_of(&dir, &["admin", "hash-password", "hunter2", "--cost", "4"]);
    let second = json_of(&dir, &["admin", "hash-password", "hunter2", "--cost", "4"]);
    assert_ne!(first["password_hash"], second["password_hash"]);
}

#[test]
fn add_operator_writes_config() {
    let dir = TempDir::new().unwrap();
    init_room(&dir);
    drinkroom(&dir)
        .args([
            "admin",
            "add-operator",
            "landseed",
            "--password",
            "hunter2",
            "--cost",
            "4",
        ])
        .assert()
        .success();

    let cfg = std::fs::read_to_string(dir.path().join(".drinkroom/config.yaml")).unwrap();
    assert!(cfg.contains("landseed"));
    assert!(cfg.contains("password_hash"));
    assert!(cfg.contains("$2"));
    assert!(!cfg.contains("hunter2"));

    drinkroom(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no operators").not());
}

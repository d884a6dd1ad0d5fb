#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const ARROWS_ID: &str = "00000000-0000-0000-0000-00000000a770";

/// Write an archer with a linked stack of arrows, armor and a class.
fn archer(dir: &TempDir, arrows: u32) -> PathBuf {
    let path = dir.path().join("archer.json");
    fs::write(
        &path,
        format!(
            r#"{{
    "name": "Sigrun",
    "type": "character",
    "abilities": {{
        "strength": {{ "value": 0 }},
        "agility": {{ "value": 1 }},
        "presence": {{ "value": 2 }},
        "toughness": {{ "value": -1 }}
    }},
    "items": [
        {{
            "name": "Bow",
            "type": "weapon",
            "weapon_type": "ranged",
            "damage_die": "1d6",
            "uses_ammo": true,
            "ammo_id": "{ARROWS_ID}",
            "equipped": true
        }},
        {{
            "id": "{ARROWS_ID}",
            "name": "Arrows",
            "type": "ammo",
            "quantity": {arrows}
        }},
        {{
            "name": "Scale Armor",
            "type": "armor",
            "tier": {{ "value": 2, "max": 2 }},
            "equipped": true
        }},
        {{
            "name": "Fanged Deserter",
            "type": "class",
            "omen_die": "3"
        }}
    ],
    "omens": {{ "value": 1, "max": 1 }}
}}
"#
        ),
    )
    .unwrap();
    path
}

/// Write a carriage with two upgrades.
fn carriage(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("carriage.json");
    fs::write(
        &path,
        r#"{
    "name": "The Rattling Hearse",
    "type": "carriage",
    "armor": "d4",
    "abilities": { "Speed": { "value": 2 } },
    "items": [
        {
            "name": "Flame Jet",
            "type": "carriage-upgrade",
            "attack": { "mode": "custom", "formula": "5", "chat": "Fire pours out" },
            "consumable": true,
            "quantity": 2
        },
        {
            "name": "Iron Plating",
            "type": "carriage-upgrade"
        }
    ]
}
"#,
    )
    .unwrap();
    path
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn item<'a>(actor: &'a Value, name: &str) -> Option<&'a Value> {
    actor["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["name"] == name)
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

fn cb() -> Command {
    Command::cargo_bin("cb").unwrap()
}

// ---------------------------------------------------------------------------
// roll
// ---------------------------------------------------------------------------

#[test]
fn roll_constant_formula() {
    cb().args(["roll", "2+3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5"));
}

#[test]
fn roll_json_reports_total() {
    let output = cb().args(["roll", "(2 + 3) * 4", "--json"]).output().unwrap();
    assert!(output.status.success());
    let card = stdout_json(&output);
    assert_eq!(card["rolls"][0]["total"], 20);
}

#[test]
fn roll_reads_actor_variables() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    let output = cb()
        .args(["roll", "@abilities.presence.value + 1", "--json", "--actor"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["rolls"][0]["total"], 3);
}

#[test]
fn roll_is_reproducible_with_seed() {
    let first = cb().args(["roll", "4d20", "--json", "--seed", "7"]).output().unwrap();
    let second = cb().args(["roll", "4d20", "--json", "--seed", "7"]).output().unwrap();
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn roll_rejects_bad_formula() {
    cb().args(["roll", "2d"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn roll_rejects_unknown_variable() {
    cb().args(["roll", "1d20 + @abilities.luck.value"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("abilities.luck.value"));
}

// ---------------------------------------------------------------------------
// attack
// ---------------------------------------------------------------------------

#[test]
fn attack_spends_one_arrow() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    cb().args(["attack"])
        .arg(&path)
        .args(["bow", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ranged Attack"));

    let actor = read_json(&path);
    assert_eq!(item(&actor, "Arrows").unwrap()["quantity"], 2);
}

#[test]
fn attack_remembers_inputs() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    cb().args(["attack"])
        .arg(&path)
        .args(["Bow", "--dr", "14", "--target-armor", "d2"])
        .assert()
        .success();

    let actor = read_json(&path);
    assert_eq!(actor["preferences"]["attack_dr"], 14);
    assert_eq!(actor["preferences"]["target_armor"], "d2");
}

#[test]
fn attack_last_arrow_removes_the_stack() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 1);
    cb().args(["attack"]).arg(&path).arg("Bow").assert().success();

    let actor = read_json(&path);
    assert!(item(&actor, "Arrows").is_none());
    assert!(item(&actor, "Bow").is_some());
}

#[test]
fn attack_without_ammo_tracking_keeps_arrows() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    cb().args(["attack"])
        .arg(&path)
        .args(["Bow", "--no-ammo-tracking"])
        .assert()
        .success();

    let actor = read_json(&path);
    assert_eq!(item(&actor, "Arrows").unwrap()["quantity"], 3);
}

#[test]
fn attack_rejects_zero_dr() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    let before = fs::read_to_string(&path).unwrap();
    cb().args(["attack"])
        .arg(&path)
        .args(["Bow", "--dr", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base DR must not be zero"));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn attack_rejects_bad_target_armor_before_rolling() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    let before = fs::read_to_string(&path).unwrap();
    cb().args(["attack"])
        .arg(&path)
        .args(["Bow", "--target-armor", "d"])
        .assert()
        .failure();
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn attack_dry_run_leaves_file_alone() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    let before = fs::read_to_string(&path).unwrap();
    cb().args(["attack"])
        .arg(&path)
        .args(["Bow", "--dry-run"])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn attack_unknown_weapon() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    cb().args(["attack"])
        .arg(&path)
        .arg("Halberd")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Halberd"));
}

#[test]
fn attack_json_card() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    let output = cb()
        .args(["attack"])
        .arg(&path)
        .args(["Bow", "--json", "--seed", "3"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let card = stdout_json(&output);
    assert_eq!(card["title"], "Ranged Attack");
    assert_eq!(card["modified_dr"], 12);
    assert!(card["outcome"].is_string());
    assert!(card["items"].as_array().unwrap().iter().any(|i| i == "Bow"));
}

#[test]
fn manual_attack_has_no_outcome() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    let output = cb()
        .args(["attack"])
        .arg(&path)
        .args(["Bow", "--json", "--manual"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let card = stdout_json(&output);
    assert!(card.get("outcome").is_none());
    assert_eq!(card["rolls"].as_array().unwrap().len(), 1);
    assert_eq!(item(&read_json(&path), "Arrows").unwrap()["quantity"], 2);
}

// ---------------------------------------------------------------------------
// defend
// ---------------------------------------------------------------------------

#[test]
fn defend_remembers_inputs() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    cb().args(["defend"])
        .arg(&path)
        .args(["--dr", "10", "--incoming", "1d8"])
        .assert()
        .success();

    let actor = read_json(&path);
    assert_eq!(actor["preferences"]["defend_dr"], 10);
    assert_eq!(actor["preferences"]["incoming_attack"], "1d8");
}

#[test]
fn defend_json_includes_armor_penalty() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    let output = cb()
        .args(["defend"])
        .arg(&path)
        .args(["--json", "--dr", "12"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["modified_dr"], 14);
}

#[test]
fn defend_rejects_non_numeric_dr() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    cb().args(["defend"])
        .arg(&path)
        .args(["--dr", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base DR must be a number"));
}

#[test]
fn carriage_defends() {
    let dir = TempDir::new().unwrap();
    let path = carriage(&dir);
    let output = cb()
        .args(["defend"])
        .arg(&path)
        .args(["--json", "--seed", "5"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["rolls"][0]["formula"], "1d20");
}

// ---------------------------------------------------------------------------
// modifiers
// ---------------------------------------------------------------------------

#[test]
fn modifiers_defense_table() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    cb().args(["modifiers"])
        .arg(&path)
        .arg("defense")
        .assert()
        .success()
        .stdout(predicate::str::contains("Scale Armor"))
        .stdout(predicate::str::contains("Modified DR: 14"));
}

#[test]
fn modifiers_encumbrance_toggle() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 30);

    cb().args(["modifiers"])
        .arg(&path)
        .args(["defense", "--dr", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Encumbered"))
        .stdout(predicate::str::contains("Modified DR: 14"));

    cb().args(["modifiers"])
        .arg(&path)
        .args(["defense", "--dr", "10", "--no-encumbrance"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Encumbered").not())
        .stdout(predicate::str::contains("Modified DR: 12"));
}

#[test]
fn modifiers_attack_requires_weapon() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    cb().args(["modifiers"])
        .arg(&path)
        .arg("attack")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--weapon"));
}

#[test]
fn modifiers_json() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    let output = cb()
        .args(["modifiers"])
        .arg(&path)
        .args(["agility", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let breakdown = stdout_json(&output);
    assert_eq!(breakdown["total"], 0);
    assert_eq!(breakdown["sources"][0]["kind"], "base");
}

// ---------------------------------------------------------------------------
// test, omens, check
// ---------------------------------------------------------------------------

#[test]
fn test_ability_against_dr() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    let output = cb()
        .args(["test"])
        .arg(&path)
        .args(["pre", "--dr", "12", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let card = stdout_json(&output);
    assert_eq!(card["title"], "Test Presence");
    let outcome = card["outcome"].as_str().unwrap();
    assert!(outcome == "Success" || outcome == "Failure");
}

#[test]
fn test_custom_ability_ignores_case() {
    let dir = TempDir::new().unwrap();
    let path = carriage(&dir);
    let output = cb()
        .args(["test"])
        .arg(&path)
        .args(["speed", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["title"], "Test Speed");
}

#[test]
fn test_rejects_unknown_ability() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    cb().args(["test"])
        .arg(&path)
        .arg("str!")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown ability"));
}

#[test]
fn omens_reroll_sets_value_and_max() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    cb().args(["omens"])
        .arg(&path)
        .arg("--reroll")
        .assert()
        .success()
        .stdout(predicate::str::contains("Omens: 3"));

    let actor = read_json(&path);
    assert_eq!(actor["omens"]["value"], 3);
    assert_eq!(actor["omens"]["max"], 3);
}

#[test]
fn omens_reroll_without_class() {
    let dir = TempDir::new().unwrap();
    let path = carriage(&dir);
    cb().args(["omens"])
        .arg(&path)
        .arg("--reroll")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no class"));
}

#[test]
fn death_check_card() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    let output = cb()
        .args(["check"])
        .arg(&path)
        .args(["death", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["title"], "Death Check");
}

#[test]
fn unknown_check_kind() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 3);
    cb().args(["check"])
        .arg(&path)
        .arg("sanity")
        .assert()
        .failure()
        .stderr(predicate::str::contains("death or drop"));
}

// ---------------------------------------------------------------------------
// upgrade
// ---------------------------------------------------------------------------

#[test]
fn consumable_upgrade_attacks_and_is_spent() {
    let dir = TempDir::new().unwrap();
    let path = carriage(&dir);
    let output = cb()
        .args(["upgrade"])
        .arg(&path)
        .args(["flame jet", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["rolls"][0]["total"], 5);

    let actor = read_json(&path);
    assert_eq!(item(&actor, "Flame Jet").unwrap()["quantity"], 1);
}

#[test]
fn passive_upgrade_does_nothing() {
    let dir = TempDir::new().unwrap();
    let path = carriage(&dir);
    let before = fs::read_to_string(&path).unwrap();
    cb().args(["upgrade"])
        .arg(&path)
        .arg("Iron Plating")
        .assert()
        .success()
        .stdout(predicate::str::contains("has no attack"));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn config_file_keeps_empty_ammo() {
    let dir = TempDir::new().unwrap();
    let path = archer(&dir, 1);
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{ "delete_zero_quantity": false }"#).unwrap();

    cb().args(["attack"])
        .arg(&path)
        .arg("Bow")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    let actor = read_json(&path);
    assert_eq!(item(&actor, "Arrows").unwrap()["quantity"], 0);
}

#[test]
fn missing_actor_file() {
    cb().args(["attack", "/nonexistent/actor.json", "Bow"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

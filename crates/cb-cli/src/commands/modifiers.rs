use std::path::Path;

use colored::Colorize;

use cb_core::Ability;
use cb_mechanics::{AttackSetup, DefendSetup, DrBreakdown, DrRequest, aggregate};

use super::{Session, load_actor, print_sources};

pub fn run(
    session: &Session,
    path: &Path,
    category: &str,
    weapon: Option<&str>,
    dr: Option<i32>,
) -> Result<(), String> {
    let actor = load_actor(path)?;

    let breakdown: DrBreakdown = match category.trim().to_lowercase().as_str() {
        "attack" => {
            let weapon = weapon.ok_or("attack modifiers need --weapon")?;
            let weapon_id = actor.item_by_name(weapon).map_err(|e| e.to_string())?.id;
            AttackSetup::prepare(&actor, &session.config, weapon_id)
                .map_err(|e| e.to_string())?
                .breakdown
        }
        "defense" | "defend" => DefendSetup::prepare(&actor, &session.config).breakdown,
        other => {
            let ability: Ability = other.parse().map_err(|e: cb_core::CoreError| e.to_string())?;
            let mut request = DrRequest::ability(ability);
            request.base_dr = cb_core::preferences::DEFAULT_DR;
            aggregate(&actor, &session.config, &request)
        }
    };
    let breakdown = match dr {
        Some(dr) => breakdown.with_base(dr),
        None => breakdown,
    };

    if session.json {
        let json = serde_json::to_string_pretty(&breakdown).map_err(|e| e.to_string())?;
        println!("{json}");
        return Ok(());
    }

    println!("  {} {}", actor.name.bold(), category.dimmed());
    print_sources(&breakdown.sources);
    println!("  Modifier total: {:+}", breakdown.total);
    println!("  {}", format!("Modified DR: {}", breakdown.modified_dr()).bold());
    Ok(())
}

use std::path::Path;

use colored::Colorize;

use cb_mechanics::resolution::attack;
use cb_mechanics::{AmmoUsage, AttackInput, AttackSetup, roll_unautomated_attack};

use super::{Session, load_actor};

pub fn run(
    session: &mut Session,
    path: &Path,
    weapon: &str,
    dr: Option<&str>,
    target_armor: Option<&str>,
) -> Result<(), String> {
    let mut actor = load_actor(path)?;
    let weapon_id = actor.item_by_name(weapon).map_err(|e| e.to_string())?.id;

    let ammo = if session.config.hit_automation {
        let setup =
            AttackSetup::prepare(&actor, &session.config, weapon_id).map_err(|e| e.to_string())?;
        let dr = dr.map_or_else(|| setup.base_dr.to_string(), str::to_string);
        let target_armor = target_armor
            .map(str::to_string)
            .or_else(|| setup.target_armor.clone())
            .unwrap_or_default();
        let input = AttackInput::parse(&dr, &target_armor).map_err(|e| e.to_string())?;

        let resolution = attack::resolve(
            &mut actor,
            &session.config,
            &setup,
            &input,
            &mut session.rng,
        )
        .map_err(|e| e.to_string())?;
        session.print_card(Some(&actor), &resolution.card)?;
        resolution.ammo
    } else {
        let (_, ammo, card) =
            roll_unautomated_attack(&mut actor, &session.config, weapon_id, &mut session.rng)
                .map_err(|e| e.to_string())?;
        session.print_card(Some(&actor), &card)?;
        ammo
    };

    if !session.json {
        print_ammo(&actor, &ammo);
    }
    session.save_actor(path, &actor)
}

fn print_ammo(actor: &cb_core::Actor, ammo: &AmmoUsage) {
    let name = |id: cb_core::ItemId| {
        actor
            .item(id)
            .map_or_else(|| "ammo".to_string(), |item| item.name.clone())
    };
    match ammo {
        AmmoUsage::NotTracked => {}
        AmmoUsage::Decremented { ammo, remaining } => {
            println!("  {}: {remaining} left", name(*ammo));
        }
        AmmoUsage::Depleted { deleted: true, .. } => {
            println!("  {}", "Out of ammo (removed)".yellow());
        }
        AmmoUsage::Depleted { ammo, .. } => {
            println!("  {}", format!("{}: out of ammo", name(*ammo)).yellow());
        }
        AmmoUsage::Missing(_) => {
            println!("  {}", "Linked ammo not found".red());
        }
    }
}

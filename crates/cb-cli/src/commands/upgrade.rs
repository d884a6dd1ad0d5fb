use std::path::Path;

use cb_mechanics::upgrade_attack;

use super::{Session, load_actor};

pub fn run(session: &mut Session, path: &Path, upgrade: &str) -> Result<(), String> {
    let mut actor = load_actor(path)?;
    let item_id = actor.item_by_name(upgrade).map_err(|e| e.to_string())?.id;

    let used = upgrade_attack(&mut actor, item_id, &mut session.rng).map_err(|e| e.to_string())?;
    let Some(used) = used else {
        println!("{upgrade} has no attack.");
        return Ok(());
    };

    session.print_card(Some(&actor), &used.card)?;
    if let Some(remaining) = used.remaining.filter(|_| !session.json) {
        println!("  Remaining: {remaining}");
    }
    session.save_actor(path, &actor)
}

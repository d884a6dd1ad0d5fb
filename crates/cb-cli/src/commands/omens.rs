use std::path::Path;

use cb_mechanics::{roll_omens, test_omens};

use super::{Session, load_actor};

pub fn run(session: &mut Session, path: &Path, reroll: bool) -> Result<(), String> {
    let mut actor = load_actor(path)?;

    if !reroll {
        let check = test_omens(&actor, &mut session.rng).map_err(|e| e.to_string())?;
        return session.print_card(Some(&actor), &check.card);
    }

    let Some(check) = roll_omens(&mut actor, &mut session.rng).map_err(|e| e.to_string())? else {
        return Err(format!("{} has no class to roll omens from", actor.name));
    };
    session.print_card(Some(&actor), &check.card)?;
    session.save_actor(path, &actor)
}

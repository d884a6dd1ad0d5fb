use std::path::Path;

use cb_mechanics::{death_check, drop_check};

use super::{Session, load_actor};

pub fn run(session: &mut Session, path: &Path, kind: &str) -> Result<(), String> {
    let actor = load_actor(path)?;
    let check = match kind.trim().to_lowercase().as_str() {
        "death" => death_check(&actor, &mut session.rng),
        "drop" => drop_check(&actor, &mut session.rng),
        other => return Err(format!("unknown check '{other}', expected death or drop")),
    }
    .map_err(|e| e.to_string())?;

    session.print_card(Some(&actor), &check.card)
}

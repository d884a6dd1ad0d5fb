use std::path::Path;

use cb_mechanics::resolution::defend;
use cb_mechanics::{DefendInput, DefendSetup, roll_unautomated_defend};

use super::{Session, load_actor};

pub fn run(
    session: &mut Session,
    path: &Path,
    dr: Option<&str>,
    incoming: Option<&str>,
) -> Result<(), String> {
    let mut actor = load_actor(path)?;

    if !session.config.hit_automation {
        let (_, card) = roll_unautomated_defend(&actor, &session.config, &mut session.rng)
            .map_err(|e| e.to_string())?;
        return session.print_card(Some(&actor), &card);
    }

    let setup = DefendSetup::prepare(&actor, &session.config);
    let dr = dr.map_or_else(|| setup.base_dr.to_string(), str::to_string);
    let incoming = incoming.unwrap_or(&setup.incoming_attack);
    let input = DefendInput::parse(&dr, incoming).map_err(|e| e.to_string())?;

    let resolution =
        defend::resolve(&mut actor, &setup, &input, &mut session.rng).map_err(|e| e.to_string())?;
    session.print_card(Some(&actor), &resolution.card)?;
    session.save_actor(path, &actor)
}

use std::path::Path;

use cb_core::RollData;
use cb_mechanics::{Formula, RollCard};

use super::{Session, load_actor};

pub fn run(session: &mut Session, formula: &str, actor: Option<&Path>) -> Result<(), String> {
    let actor = actor.map(load_actor).transpose()?;
    let data = actor.as_ref().map_or_else(RollData::new, |a| a.roll_data());

    let formula = Formula::parse(formula).map_err(|e| e.to_string())?;
    let roll = formula
        .evaluate(&data, &mut session.rng)
        .map_err(|e| e.to_string())?;

    let card = RollCard::new("Roll").roll(formula.source(), &roll);
    session.print_card(actor.as_ref(), &card)
}

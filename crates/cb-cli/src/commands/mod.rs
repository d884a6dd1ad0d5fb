pub mod attack;
pub mod check;
pub mod defend;
pub mod modifiers;
pub mod omens;
pub mod roll;
pub mod upgrade;

use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use rand::SeedableRng;
use rand::rngs::StdRng;

use cb_core::{Actor, EngineConfig};
use cb_mechanics::{DrSource, RollCard};

/// Global flags, as parsed by clap.
pub struct SessionOptions<'a> {
    pub seed: Option<u64>,
    pub config: Option<&'a Path>,
    pub no_ammo_tracking: bool,
    pub no_encumbrance: bool,
    pub manual: bool,
    pub json: bool,
    pub dry_run: bool,
}

/// State shared by one command invocation.
pub struct Session {
    pub config: EngineConfig,
    pub rng: StdRng,
    pub json: bool,
    pub dry_run: bool,
}

impl Session {
    /// Load the config file (if any), apply flag overrides and seed the RNG.
    pub fn open(options: &SessionOptions<'_>) -> Result<Self, String> {
        let mut config = match options.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
                serde_json::from_str::<EngineConfig>(&text)
                    .map_err(|e| format!("invalid config {}: {e}", path.display()))?
            }
            None => EngineConfig::default(),
        };
        if options.no_ammo_tracking {
            config.track_ammo = false;
        }
        if options.no_encumbrance {
            config.track_carrying_capacity = false;
        }
        if options.manual {
            config.hit_automation = false;
        }
        tracing::debug!(?config, seed = options.seed, "session opened");

        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            config,
            rng,
            json: options.json,
            dry_run: options.dry_run,
        })
    }

    /// Write the actor back unless this is a dry run.
    pub fn save_actor(&self, path: &Path, actor: &Actor) -> Result<(), String> {
        if self.dry_run {
            tracing::debug!(path = %path.display(), "dry run, actor not saved");
            return Ok(());
        }
        let json = serde_json::to_string_pretty(actor).map_err(|e| e.to_string())?;
        std::fs::write(path, json + "\n")
            .map_err(|e| format!("cannot write {}: {e}", path.display()))
    }

    /// Print a roll card as text or JSON.
    pub fn print_card(&self, actor: Option<&Actor>, card: &RollCard) -> Result<(), String> {
        if self.json {
            let json = serde_json::to_string_pretty(card).map_err(|e| e.to_string())?;
            println!("{json}");
        } else {
            print_card(actor, card);
        }
        Ok(())
    }
}

/// Read an actor from a JSON file.
pub fn load_actor(path: &Path) -> Result<Actor, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid actor {}: {e}", path.display()))
}

/// Render a DR source value with an explicit sign.
fn signed(value: i32) -> String {
    if value >= 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

/// Print DR sources as a table: base first, then signed modifiers.
pub fn print_sources(sources: &[DrSource]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Source", "DR"]);
    for (i, source) in sources.iter().enumerate() {
        let value = if i == 0 {
            source.value.to_string()
        } else {
            signed(source.value)
        };
        table.add_row(vec![source.name.clone(), value]);
    }
    println!("{table}");
}

fn print_card(actor: Option<&Actor>, card: &RollCard) {
    match actor {
        Some(actor) => println!("  {} {}", card.title.bold(), format!("({})", actor.name).dimmed()),
        None => println!("  {}", card.title.bold()),
    }

    if !card.rolls.is_empty() {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Roll", "Formula", "Dice", "Total"]);
        for roll in &card.rolls {
            let dice = roll
                .dice
                .iter()
                .map(|d| format!("{}:{}", d.die, d.value))
                .collect::<Vec<_>>()
                .join(" ");
            table.add_row(vec![
                roll.title.clone(),
                roll.formula.clone(),
                dice,
                roll.total.to_string(),
            ]);
        }
        println!("{table}");
    }

    if let Some(dr) = card.modified_dr {
        let modifiers: Vec<String> = card
            .dr_sources
            .iter()
            .skip(1)
            .map(|s| format!("{} {}", s.name, signed(s.value)))
            .collect();
        if modifiers.is_empty() {
            println!("  DR {dr}");
        } else {
            println!("  DR {dr} {}", format!("({})", modifiers.join(", ")).dimmed());
        }
    }
    if !card.items.is_empty() {
        println!("  Items: {}", card.items.join(", "));
    }
    if let Some(outcome) = &card.outcome {
        println!("  {}", outcome.yellow().bold());
    }
    if let Some(damage) = card.damage {
        println!("  Damage: {}", damage.to_string().red().bold());
    }
}

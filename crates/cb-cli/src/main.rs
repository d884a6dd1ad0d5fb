//! CLI frontend for the Crys-Borg rules engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cb",
    about = "Crys-Borg: dice, DR modifiers, attacks and defenses",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    options: Options,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every subcommand.
#[derive(Args)]
struct Options {
    /// RNG seed for reproducible rolls
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Print the roll card as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Do not write changes back to the actor file
    #[arg(long, global = true)]
    dry_run: bool,

    /// JSON engine config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Do not spend ammo
    #[arg(long, global = true)]
    no_ammo_tracking: bool,

    /// Ignore carrying capacity
    #[arg(long, global = true)]
    no_encumbrance: bool,

    /// Roll attacks and defenses without DR outcomes
    #[arg(long, global = true)]
    manual: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a dice formula
    Roll {
        /// Formula, e.g. "2d6+1" or "1d20 + @abilities.strength.value"
        formula: String,

        /// Actor file providing @variables
        #[arg(short, long)]
        actor: Option<PathBuf>,
    },

    /// Test an ability
    Test {
        /// Actor file
        actor: PathBuf,

        /// Ability (strength, agi, speed, ...)
        ability: String,

        /// Base DR to report success against
        #[arg(long)]
        dr: Option<i32>,
    },

    /// Show the DR modifiers that apply to a roll
    Modifiers {
        /// Actor file
        actor: PathBuf,

        /// attack, defense, or an ability name
        category: String,

        /// Weapon the attack is made with
        #[arg(short, long)]
        weapon: Option<String>,

        /// Base DR
        #[arg(long)]
        dr: Option<i32>,
    },

    /// Attack with a weapon
    Attack {
        /// Actor file
        actor: PathBuf,

        /// Weapon name (case-insensitive)
        weapon: String,

        /// Base DR (default: last used, or 12)
        #[arg(long, allow_hyphen_values = true)]
        dr: Option<String>,

        /// Target armor formula; pass "" for none (default: last used)
        #[arg(long)]
        target_armor: Option<String>,
    },

    /// Defend against an incoming attack
    Defend {
        /// Actor file
        actor: PathBuf,

        /// Base DR (default: last used, or 12)
        #[arg(long, allow_hyphen_values = true)]
        dr: Option<String>,

        /// Incoming damage formula (default: last used, or 1d4)
        #[arg(long)]
        incoming: Option<String>,
    },

    /// Test omens, or reroll them from the class omen die
    Omens {
        /// Actor file
        actor: PathBuf,

        /// Reroll omens instead of testing them
        #[arg(long)]
        reroll: bool,
    },

    /// Roll a death or drop check
    Check {
        /// Actor file
        actor: PathBuf,

        /// death or drop
        kind: String,
    },

    /// Use a carriage upgrade
    Upgrade {
        /// Carriage actor file
        actor: PathBuf,

        /// Upgrade name (case-insensitive)
        upgrade: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = &cli.options;

    let result = commands::Session::open(&commands::SessionOptions {
        seed: options.seed,
        config: options.config.as_deref(),
        no_ammo_tracking: options.no_ammo_tracking,
        no_encumbrance: options.no_encumbrance,
        manual: options.manual,
        json: options.json,
        dry_run: options.dry_run,
    })
    .and_then(|mut session| match cli.command {
        Commands::Roll { formula, actor } => {
            commands::roll::run(&mut session, &formula, actor.as_deref())
        }
        Commands::Test { actor, ability, dr } => {
            commands::test::run(&mut session, &actor, &ability, dr)
        }
        Commands::Modifiers {
            actor,
            category,
            weapon,
            dr,
        } => commands::modifiers::run(&session, &actor, &category, weapon.as_deref(), dr),
        Commands::Attack {
            actor,
            weapon,
            dr,
            target_armor,
        } => commands::attack::run(
            &mut session,
            &actor,
            &weapon,
            dr.as_deref(),
            target_armor.as_deref(),
        ),
        Commands::Defend {
            actor,
            dr,
            incoming,
        } => commands::defend::run(&mut session, &actor, dr.as_deref(), incoming.as_deref()),
        Commands::Omens { actor, reroll } => commands::omens::run(&mut session, &actor, reroll),
        Commands::Check { actor, kind } => commands::check::run(&mut session, &actor, &kind),
        Commands::Upgrade { actor, upgrade } => {
            commands::upgrade::run(&mut session, &actor, &upgrade)
        }
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

//! Kinetic Campaigns - Development Tools

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use kc_core::campaign::Campaign;
use kc_core::character::{ArchetypeId, MoveId};
use kc_core::config::EngineConfig;
use kc_core::data::CampaignPackage;
use kc_core::gate::gate_status;
use kc_core::persistence;
use kc_core::placement::PlacementConfig;
use kc_tools::error::{read_file, write_file, Result, ToolError};
use kc_tools::layout::{render_layout, view_layout};
use kc_tools::map_view::{render_map, AsciiConfig};
use kc_tools::play::{self, NewCharacter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "kc-tools")]
#[command(about = "Development tools for Kinetic Campaigns")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate campaign files
    Validate {
        /// Campaign file or directory
        #[arg(default_value = "assets/campaigns")]
        path: PathBuf,
    },
    /// Print the seeded layout of a realm
    Map {
        /// Campaign file
        #[arg(long, default_value = "assets/campaigns/omija.ron")]
        campaign: PathBuf,
        /// Placement seed
        #[arg(long, default_value_t = 12345)]
        seed: u64,
        /// Overlay a save's fog and progress
        #[arg(long)]
        save: Option<PathBuf>,
        /// Disable ANSI colors
        #[arg(long)]
        no_color: bool,
    },
    /// Print the view-box pixel layout of a realm as RON
    Layout {
        /// Campaign file
        #[arg(long, default_value = "assets/campaigns/omija.ron")]
        campaign: PathBuf,
        /// Placement seed
        #[arg(long, default_value_t = 12345)]
        seed: u64,
        /// Hex size (centre to corner) in pixels
        #[arg(long, default_value_t = kc_core::hex::DEFAULT_HEX_SIZE)]
        hex_size: i32,
    },
    /// Run a RON command script and write the resulting save
    Play {
        /// Command script
        script: PathBuf,
        /// Campaign file
        #[arg(long, default_value = "assets/campaigns/omija.ron")]
        campaign: PathBuf,
        /// Placement seed
        #[arg(long, default_value_t = 12345)]
        seed: u64,
        /// Save to resume from and write back to
        #[arg(long, default_value = "save.json")]
        save: PathBuf,
        /// Character name for a new game
        #[arg(long, default_value = "")]
        name: String,
        /// Archetype for a new game
        #[arg(long)]
        archetype: Option<String>,
        /// Starting move for a new game
        #[arg(long)]
        starting_move: Option<String>,
    },
    /// Summarize a save
    Inspect {
        /// Save file
        save: PathBuf,
        /// Campaign file
        #[arg(long, default_value = "assets/campaigns/omija.ron")]
        campaign: PathBuf,
        /// Placement seed
        #[arg(long, default_value_t = 12345)]
        seed: u64,
    },
}

fn load_campaign(path: &Path, seed: u64) -> Result<Campaign> {
    let package = CampaignPackage::from_ron_str(&read_file(path)?, &path.display().to_string())?;
    Ok(Campaign::new(
        package,
        &PlacementConfig::default().with_seed(seed),
        EngineConfig::default(),
    )?)
}

fn new_character(
    name: String,
    archetype: Option<String>,
    starting_move: Option<String>,
) -> Result<Option<NewCharacter>> {
    let (Some(archetype), Some(starting_move)) = (archetype, starting_move) else {
        return Ok(None);
    };
    Ok(Some(NewCharacter {
        name,
        archetype: archetype.parse::<ArchetypeId>()?,
        starting_move: starting_move.parse::<MoveId>()?,
    }))
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Validate { path } => {
            tracing::info!("Validating campaigns in: {}", path.display());
            for (file, summary) in kc_tools::validate::validate_campaign_directory(&path)? {
                tracing::info!(
                    file = %file.display(),
                    realm = %summary.realm,
                    cells = summary.cells,
                    placed = summary.placed,
                    "Campaign valid"
                );
            }
        }
        Commands::Map {
            campaign,
            seed,
            save,
            no_color,
        } => {
            let campaign = load_campaign(&campaign, seed)?;
            let state = match save {
                Some(path) => Some(
                    persistence::load(&read_file(&path)?, &campaign)
                        .ok_or(ToolError::InvalidSave(path))?,
                ),
                None => None,
            };
            let config = AsciiConfig {
                use_color: !no_color,
                respect_fog: state.is_some(),
                ..AsciiConfig::default()
            };
            print!("{}", render_map(&campaign, state.as_ref(), &config));
        }
        Commands::Layout {
            campaign,
            seed,
            hex_size,
        } => {
            let campaign = load_campaign(&campaign, seed)?;
            println!("{}", render_layout(&view_layout(&campaign, hex_size))?);
        }
        Commands::Play {
            script,
            campaign,
            seed,
            save,
            name,
            archetype,
            starting_move,
        } => {
            let commands = play::load_script(&script)?;
            let character = new_character(name, archetype, starting_move)?;
            let campaign = load_campaign(&campaign, seed)?;
            let mut session = play::open_session(campaign, Some(&save), character.as_ref())?;
            let log = play::run_script(&mut session, commands);
            let rejected = log.iter().filter(|entry| entry.result.is_err()).count();
            println!("{}", play::render_log(&log)?);

            let state = session.state().ok_or(ToolError::NoCharacter)?;
            write_file(&save, &persistence::save(state)?)?;
            tracing::info!(
                commands = log.len(),
                rejected,
                save = %save.display(),
                "Script finished"
            );
        }
        Commands::Inspect {
            save,
            campaign,
            seed,
        } => {
            let campaign = load_campaign(&campaign, seed)?;
            let state = persistence::load(&read_file(&save)?, &campaign)
                .ok_or_else(|| ToolError::InvalidSave(save.clone()))?;
            let config = AsciiConfig {
                use_color: false,
                ..AsciiConfig::default()
            };
            print!("{}", render_map(&campaign, Some(&state), &config));

            let character = &state.character;
            println!(
                "{} the {} ({}), moves: {}",
                character.name,
                character.archetype,
                character.starting_move,
                character
                    .known_moves()
                    .map(|m| m.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!(
                "Inventory: {}",
                character
                    .inventory
                    .iter()
                    .map(|item| item.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            if let Some(next) = state.level_up.pending() {
                println!("Level {} awaits a reward choice", next.level);
            }
            let gate = gate_status(&state, &campaign);
            println!(
                "Boss gate: {} ({} elites left, {} rifts open) | status {:?}",
                if gate.is_open() { "open" } else { "sealed" },
                gate.elites_remaining.len(),
                gate.rifts_open.len(),
                state.status
            );
        }
    }
    Ok(())
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

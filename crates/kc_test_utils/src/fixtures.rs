//! Test fixtures and helpers.
//!
//! The sample realm, ready-made sessions and a scripted winning run.

use kc_core::campaign::Campaign;
use kc_core::character::{ArchetypeId, MoveId};
use kc_core::config::EngineConfig;
use kc_core::data::CampaignPackage;
use kc_core::hex::HexCoord;
use kc_core::placement::{EncounterTag, PlacementConfig};
use kc_core::resources::ActivityKind;
use kc_core::session::{Command, Session};
use kc_core::state::GameState;

/// RON source of the sample realm.
pub const OMIJA_RON: &str = include_str!("../../../assets/campaigns/omija.ron");

/// Seed used when a test does not care about the layout.
pub const DEFAULT_SEED: u64 = 12345;

/// Parse the sample realm.
///
/// # Panics
///
/// Panics if the bundled RON is broken.
#[must_use]
pub fn omija_package() -> CampaignPackage {
    CampaignPackage::from_ron_str(OMIJA_RON, "omija.ron").expect("bundled omija.ron parses")
}

/// Build the sample realm with the given placement seed.
///
/// # Panics
///
/// Panics if the bundled realm fails validation.
#[must_use]
pub fn omija_campaign(seed: u64) -> Campaign {
    Campaign::new(
        omija_package(),
        &PlacementConfig::default().with_seed(seed),
        EngineConfig::default(),
    )
    .expect("bundled omija realm builds")
}

/// A session with a character already created.
///
/// # Panics
///
/// Panics if `starting_move` is not an `archetype` move.
#[must_use]
pub fn new_session(seed: u64, archetype: ArchetypeId, starting_move: MoveId) -> Session {
    let mut session = Session::new(omija_campaign(seed));
    session
        .create_character("Tester", archetype, starting_move)
        .expect("valid starting move");
    session
}

/// Hexes holding encounters with `tag`, in coordinate order.
#[must_use]
pub fn hexes_tagged(campaign: &Campaign, tag: EncounterTag) -> Vec<HexCoord> {
    campaign.placement().hexes_tagged(tag)
}

/// Clear every elite and close every rift so the boss can be engaged.
pub fn open_boss_gate(state: &mut GameState, campaign: &Campaign) {
    for hex in hexes_tagged(campaign, EncounterTag::Elite) {
        state.map.cleared.insert(hex);
    }
    for rift in &campaign.package().rifts {
        state.map.rift_progress.insert(rift.id.clone(), rift.stages.len());
    }
}

/// A command script that earns plenty of tokens, clears every elite,
/// closes every rift and then defeats the boss.
#[must_use]
pub fn winning_script(campaign: &Campaign) -> Vec<Command> {
    let mut script = vec![
        Command::LogActivity {
            activity: ActivityKind::Strength,
            minutes: 600,
        },
        Command::LogActivity {
            activity: ActivityKind::Cardio,
            minutes: 200,
        },
        Command::LogActivity {
            activity: ActivityKind::Flexibility,
            minutes: 200,
        },
    ];
    for hex in hexes_tagged(campaign, EncounterTag::Elite) {
        script.push(Command::Engage {
            hex,
            options: Default::default(),
        });
    }
    for rift in &campaign.package().rifts {
        let Some(hex) = campaign.placement().entrance_of(&rift.id) else {
            continue;
        };
        for stage_index in 0..rift.stages.len() {
            script.push(Command::AttemptRiftStage {
                hex,
                rift_id: rift.id.clone(),
                stage_index,
            });
        }
    }
    for hex in hexes_tagged(campaign, EncounterTag::Boss) {
        script.push(Command::Engage {
            hex,
            options: Default::default(),
        });
    }
    script
}

/// Apply every command, ignoring rejections.
pub fn run_script(session: &mut Session, commands: &[Command]) {
    for command in commands {
        let _ = session.apply(command.clone());
    }
}

//! Whole-session flows driven through the command surface.

use kc_core::prelude::*;
use kc_core::combat::{EngageReport, StrikeOutcome};
use kc_core::placement::EncounterTag;
use kc_core::progression::Reward;
use kc_test_utils::fixtures::{
    hexes_tagged, new_session, omija_campaign, open_boss_gate, winning_script, DEFAULT_SEED,
};

fn state(session: &Session) -> &GameState {
    session.state().expect("character created")
}

#[test]
fn test_activity_economy_thresholds() {
    let mut session = new_session(DEFAULT_SEED, ArchetypeId::Wayfinder, MoveId::PhaseStrike);
    let before = state(&session).resources;

    session.log_activity(ActivityKind::Cardio, 10).unwrap();
    assert_eq!(state(&session).resources, before);

    session.log_activity(ActivityKind::Strength, 14).unwrap();
    assert_eq!(state(&session).resources, before);

    session.log_activity(ActivityKind::Wellness, 30).unwrap();
    assert!(state(&session).resources.ritual >= before.ritual + 2);
}

#[test]
fn test_basic_then_elite_combat() {
    let mut session = new_session(DEFAULT_SEED, ArchetypeId::Wayfinder, MoveId::PhaseStrike);
    let campaign = session.campaign().clone();
    let basic = hexes_tagged(&campaign, EncounterTag::Basic)[0];
    let elite = hexes_tagged(&campaign, EncounterTag::Elite)[0];

    let outcome = session.engage(basic, EngageOptions::default()).unwrap();
    let Outcome::Engaged(EngageReport::Combat(report)) = outcome else {
        panic!("expected combat");
    };
    assert!(matches!(report.outcome, StrikeOutcome::Defeated(_)));
    assert!(!state(&session).map.encounter_health.contains_key(&basic));
    assert_eq!(state(&session).progression.currency, 130);

    // One attack token left, no defense, one ritual.
    let outcome = session.engage(elite, EngageOptions::default()).unwrap();
    let Outcome::Engaged(EngageReport::Combat(report)) = outcome else {
        panic!("expected combat");
    };
    assert_eq!(report.outcome, StrikeOutcome::Survived(Some(Retaliation::Absorbed)));
    assert_eq!(state(&session).map.encounter_health.get(&elite), Some(&2));
    assert_eq!(state(&session).character.hp, 5);

    assert_eq!(
        session.engage(elite, EngageOptions::default()),
        Err(Rejection::NoAttackTokens)
    );
    assert_eq!(
        session.engage(basic, EngageOptions::default()),
        Err(Rejection::AlreadyCleared(basic))
    );
}

#[test]
fn test_boss_gate_rejects_without_mutation() {
    let mut session = new_session(DEFAULT_SEED, ArchetypeId::GateCrasher, MoveId::MomentumStrike);
    let campaign = session.campaign().clone();
    let boss = hexes_tagged(&campaign, EncounterTag::Boss)[0];

    // Everything but the boss itself.
    for command in &winning_script(&campaign) {
        if matches!(command, Command::Engage { hex, .. } if *hex == boss) {
            continue;
        }
        session.apply(command.clone()).unwrap_or_else(|r| panic!("{command:?}: {r}"));
    }
    let before = state(&session).clone();
    let last_elite = hexes_tagged(&campaign, EncounterTag::Elite)[2];

    let mut blocked = before.clone();
    blocked.map.cleared.remove(&last_elite);
    let mut session = Session::resume(campaign.clone(), blocked.clone());
    assert_eq!(
        session.engage(boss, EngageOptions::default()),
        Err(Rejection::BossGateSealed)
    );
    assert_eq!(state(&session), &blocked);

    let mut session = Session::resume(campaign, before);
    assert!(session.engage(boss, EngageOptions::default()).is_ok());
    assert_eq!(state(&session).status, CampaignStatus::Victory);
    assert_eq!(
        session.engage(boss, EngageOptions::default()),
        Err(Rejection::CampaignComplete)
    );
}

#[test]
fn test_gate_reported_open_only_when_complete() {
    let campaign = omija_campaign(DEFAULT_SEED);
    let mut session = new_session(DEFAULT_SEED, ArchetypeId::RiftWeaver, MoveId::AetherShield);
    let gate = session.gate().unwrap();
    assert_eq!(gate.elites_remaining.len(), 3);
    assert_eq!(gate.rifts_open, vec!["moon-cats-vigil".to_string()]);

    let mut opened = state(&session).clone();
    open_boss_gate(&mut opened, &campaign);
    session = Session::resume(campaign, opened);
    assert!(session.gate().unwrap().is_open());
}

#[test]
fn test_level_up_pin_and_commit() {
    let mut session = new_session(DEFAULT_SEED, ArchetypeId::Wayfinder, MoveId::ScoutTheMultiverse);
    let mut game = state(&session).clone();
    game.progression.xp = 9;
    game.character.hp = 1;
    assert!(game.grant_reward(Reward::new(0, 5)));
    assert_eq!(game.progression.xp, 10);
    assert_eq!(game.progression.level, 1);

    // A second reward lands on the stash and still pays currency now.
    game.grant_reward(Reward::new(50, 1));
    assert_eq!(game.progression.currency, 170);
    assert_eq!(game.level_up.pending().map(|p| (p.level, p.xp, p.currency)), Some((2, 5, 170)));

    session = Session::resume(session.campaign().clone(), game);
    session
        .complete_level_up(LevelUpChoice::CrossClassMove(MoveId::AetherShield))
        .unwrap();
    let game = state(&session);
    assert_eq!(game.progression.level, 2);
    assert_eq!(game.progression.xp, 5);
    assert_eq!(game.character.hp, game.character.max_hp);
    assert!(game.character.knows(MoveId::AetherShield));
}

#[test]
fn test_rift_progress_is_monotonic() {
    let mut session = new_session(DEFAULT_SEED, ArchetypeId::GateCrasher, MoveId::MomentumStrike);
    session.log_activity(ActivityKind::Strength, 60).unwrap();
    let entrance = session
        .campaign()
        .placement()
        .entrance_of("moon-cats-vigil")
        .unwrap();

    session.attempt_rift_stage(entrance, "moon-cats-vigil", 0).unwrap();
    for stage in [0, 2, 3] {
        assert!(session.attempt_rift_stage(entrance, "moon-cats-vigil", stage).is_err());
        assert_eq!(state(&session).map.rift_stages_done("moon-cats-vigil"), 1);
    }
}

#[test]
fn test_save_load_mid_campaign() {
    let mut session = new_session(DEFAULT_SEED, ArchetypeId::RiftWeaver, MoveId::DimensionalAnchor);
    session.log_activity(ActivityKind::Wellness, 60).unwrap();
    let elite = hexes_tagged(session.campaign(), EncounterTag::Elite)[0];
    session.anchor(elite).unwrap();

    let json = save(state(&session)).unwrap();
    let loaded = load(&json, session.campaign()).unwrap();
    assert_eq!(&loaded, state(&session));

    let mut resumed = Session::resume(session.campaign().clone(), loaded);
    assert!(matches!(
        resumed.anchor(elite),
        Err(Rejection::AbilityAlreadyUsed { .. })
    ));
}

#[test]
fn test_full_run_reaches_victory() {
    for seed in [1, 42, DEFAULT_SEED] {
        let mut session = new_session(seed, ArchetypeId::GateCrasher, MoveId::AuraOfConquest);
        let script = winning_script(session.campaign());
        for command in script {
            session
                .apply(command.clone())
                .unwrap_or_else(|r| panic!("seed {seed}: {command:?}: {r}"));
        }
        assert_eq!(state(&session).status, CampaignStatus::Victory);
        assert!(state(&session).character.inventory.len() >= 4);
    }
}

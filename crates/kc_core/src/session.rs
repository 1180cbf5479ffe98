//! Command surface.
//!
//! A [`Session`] owns a campaign and at most one game. Every [`Command`] runs
//! against a clone of the game state, roll stream included, and the clone is
//! committed only when the command succeeds. A [`Rejection`] therefore leaves
//! the session exactly as it was.

use serde::{Deserialize, Serialize};

use crate::actions::{self, HealReport, ItemReport, MoveReport, PurchaseReport};
use crate::campaign::Campaign;
use crate::character::{ArchetypeId, Character, MoveId};
use crate::combat::{self, CombatReport, EngageOptions, EngageReport};
use crate::error::{Rejection, Result};
use crate::gate::{gate_status, GateStatus};
use crate::hex::HexCoord;
use crate::progression::{complete_level_up, LevelUpChoice, LevelUpState, Progression};
use crate::resources::{ActivityKind, ActivityReport};
use crate::rift::{attempt_stage, StageReport};
use crate::state::{CampaignStatus, GameState};

/// A player intent.
///
/// # Example RON
///
/// ```ron
/// [
///     LogActivity(activity: strength, minutes: 45),
///     Move(hex: "2,4"),
///     Engage(hex: "3,4"),
///     AttemptRiftStage(hex: "4,2", rift_id: "moon-cats-vigil", stage_index: 0),
///     CompleteLevelUp(choice: stat(power)),
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Convert logged minutes into tokens.
    LogActivity {
        /// Kind of activity.
        activity: ActivityKind,
        /// Duration in minutes.
        minutes: u32,
    },
    /// Step to an adjacent hex.
    Move {
        /// Destination.
        hex: HexCoord,
    },
    /// Fight or resolve the encounter on a hex.
    Engage {
        /// Encounter hex.
        hex: HexCoord,
        /// Strike modifiers.
        #[serde(default)]
        options: EngageOptions,
    },
    /// Clear the next stage of a rift.
    AttemptRiftStage {
        /// Rift entrance hex.
        hex: HexCoord,
        /// Rift id.
        rift_id: String,
        /// Stage to attempt.
        stage_index: usize,
    },
    /// Consume an item.
    UseItem {
        /// Item id.
        item_id: String,
    },
    /// Buy a nexus reward.
    Purchase {
        /// Reward id.
        reward_id: String,
    },
    /// Commit a pending level-up.
    CompleteLevelUp {
        /// Reward picked.
        choice: LevelUpChoice,
    },
    /// Reveal a distant hex.
    Scout {
        /// Target hex.
        hex: HexCoord,
    },
    /// Bind an elite or boss.
    Anchor {
        /// Encounter hex.
        hex: HexCoord,
    },
    /// Nexus Synthesizer heal.
    SynthesizeHeal,
    /// Spend ritual tokens on hit points.
    Heal {
        /// Hit points wanted.
        hp: u32,
    },
}

impl Command {
    /// Whether the command acts on the map, which is frozen after victory.
    #[must_use]
    pub const fn touches_map(&self) -> bool {
        matches!(
            self,
            Self::Move { .. }
                | Self::Engage { .. }
                | Self::AttemptRiftStage { .. }
                | Self::Scout { .. }
                | Self::Anchor { .. }
        )
    }
}

/// What a committed command did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Activity credited.
    Activity(ActivityReport),
    /// Player moved.
    Moved(MoveReport),
    /// Encounter engaged.
    Engaged(EngageReport),
    /// Anchor landed.
    Anchored(CombatReport),
    /// Rift stage cleared.
    RiftStage(StageReport),
    /// Item consumed.
    ItemUsed(ItemReport),
    /// Nexus reward bought.
    Purchased(PurchaseReport),
    /// Level-up committed.
    LeveledUp(Progression),
    /// Hex revealed.
    Scouted(HexCoord),
    /// Hit points restored.
    Healed(HealReport),
}

/// A campaign and the game being played in it.
#[derive(Debug, Clone)]
pub struct Session {
    campaign: Campaign,
    state: Option<GameState>,
}

impl Session {
    /// Open a session with no character yet.
    #[must_use]
    pub const fn new(campaign: Campaign) -> Self {
        Self {
            campaign,
            state: None,
        }
    }

    /// Resume a saved game.
    #[must_use]
    pub const fn resume(campaign: Campaign, state: GameState) -> Self {
        Self {
            campaign,
            state: Some(state),
        }
    }

    /// The campaign.
    #[must_use]
    pub const fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    /// The current game, if a character exists.
    #[must_use]
    pub const fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// Take the game out of the session.
    #[must_use]
    pub fn into_state(self) -> Option<GameState> {
        self.state
    }

    /// Create the character and start a fresh game, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the starting move belongs to another archetype.
    pub fn create_character(
        &mut self,
        name: &str,
        archetype: ArchetypeId,
        starting_move: MoveId,
    ) -> Result<&GameState> {
        let character = Character::new(name, archetype, starting_move, self.campaign.config().max_hp)?;
        tracing::info!(name = %character.name, %archetype, %starting_move, "Character created");
        Ok(&*self
            .state
            .insert(GameState::new(&self.campaign, character)))
    }

    /// What still blocks the boss.
    #[must_use]
    pub fn gate(&self) -> Option<GateStatus> {
        self.state
            .as_ref()
            .map(|state| gate_status(state, &self.campaign))
    }

    /// Run a command transactionally.
    ///
    /// # Errors
    ///
    /// Returns the rule that was violated; the game is unchanged.
    pub fn apply(&mut self, command: Command) -> std::result::Result<Outcome, Rejection> {
        let result = self.try_apply(&command);
        match &result {
            Ok(_) => tracing::trace!(?command, "Command committed"),
            Err(rejection) => tracing::debug!(?command, %rejection, "Command rejected"),
        }
        result
    }

    fn try_apply(&mut self, command: &Command) -> std::result::Result<Outcome, Rejection> {
        let current = self.state.as_ref().ok_or(Rejection::NoCharacter)?;
        if current.status == CampaignStatus::Victory && command.touches_map() {
            return Err(Rejection::CampaignComplete);
        }

        let campaign = &self.campaign;
        let mut next = current.clone();
        let mut rolls = std::mem::take(&mut next.rolls);
        let outcome = match command {
            Command::LogActivity { activity, minutes } => Outcome::Activity(actions::log_activity(
                &mut next, campaign, *activity, *minutes, &mut rolls,
            )),
            Command::Move { hex } => {
                Outcome::Moved(actions::move_to(&mut next, campaign, *hex, &mut rolls)?)
            }
            Command::Engage { hex, options } => Outcome::Engaged(combat::engage(
                &mut next, campaign, *hex, *options, &mut rolls,
            )?),
            Command::AttemptRiftStage {
                hex,
                rift_id,
                stage_index,
            } => Outcome::RiftStage(attempt_stage(
                &mut next,
                campaign,
                *hex,
                rift_id,
                *stage_index,
            )?),
            Command::UseItem { item_id } => Outcome::ItemUsed(actions::use_item(&mut next, item_id)?),
            Command::Purchase { reward_id } => {
                Outcome::Purchased(actions::purchase(&mut next, campaign, reward_id)?)
            }
            Command::CompleteLevelUp { choice } => {
                let progression = complete_level_up(&mut next.character, next.level_up, *choice)?;
                next.progression = progression;
                next.level_up = LevelUpState::Idle;
                Outcome::LeveledUp(progression)
            }
            Command::Scout { hex } => Outcome::Scouted(actions::scout(&mut next, campaign, *hex)?),
            Command::Anchor { hex } => Outcome::Anchored(combat::anchor(&mut next, campaign, *hex)?),
            Command::SynthesizeHeal => Outcome::Healed(actions::synthesize_heal(&mut next, campaign)?),
            Command::Heal { hp } => Outcome::Healed(actions::heal(&mut next, campaign, *hp)?),
        };
        next.rolls = rolls;
        self.state = Some(next);
        Ok(outcome)
    }

    /// Log an activity.
    ///
    /// # Errors
    ///
    /// Rejected without a character.
    pub fn log_activity(
        &mut self,
        activity: ActivityKind,
        minutes: u32,
    ) -> std::result::Result<Outcome, Rejection> {
        self.apply(Command::LogActivity { activity, minutes })
    }

    /// Move to an adjacent hex.
    ///
    /// # Errors
    ///
    /// See [`actions::move_to`].
    pub fn move_to(&mut self, hex: HexCoord) -> std::result::Result<Outcome, Rejection> {
        self.apply(Command::Move { hex })
    }

    /// Engage the encounter on a hex.
    ///
    /// # Errors
    ///
    /// See [`combat::engage`].
    pub fn engage(
        &mut self,
        hex: HexCoord,
        options: EngageOptions,
    ) -> std::result::Result<Outcome, Rejection> {
        self.apply(Command::Engage { hex, options })
    }

    /// Attempt a rift stage.
    ///
    /// # Errors
    ///
    /// See [`attempt_stage`].
    pub fn attempt_rift_stage(
        &mut self,
        hex: HexCoord,
        rift_id: &str,
        stage_index: usize,
    ) -> std::result::Result<Outcome, Rejection> {
        self.apply(Command::AttemptRiftStage {
            hex,
            rift_id: rift_id.to_string(),
            stage_index,
        })
    }

    /// Use an item.
    ///
    /// # Errors
    ///
    /// See [`actions::use_item`].
    pub fn use_item(&mut self, item_id: &str) -> std::result::Result<Outcome, Rejection> {
        self.apply(Command::UseItem {
            item_id: item_id.to_string(),
        })
    }

    /// Buy a nexus reward.
    ///
    /// # Errors
    ///
    /// See [`actions::purchase`].
    pub fn purchase(&mut self, reward_id: &str) -> std::result::Result<Outcome, Rejection> {
        self.apply(Command::Purchase {
            reward_id: reward_id.to_string(),
        })
    }

    /// Commit a pending level-up.
    ///
    /// # Errors
    ///
    /// Rejected with no pending level-up or an invalid choice.
    pub fn complete_level_up(
        &mut self,
        choice: LevelUpChoice,
    ) -> std::result::Result<Outcome, Rejection> {
        self.apply(Command::CompleteLevelUp { choice })
    }

    /// Scout a hex.
    ///
    /// # Errors
    ///
    /// See [`actions::scout`].
    pub fn scout(&mut self, hex: HexCoord) -> std::result::Result<Outcome, Rejection> {
        self.apply(Command::Scout { hex })
    }

    /// Anchor an elite or boss.
    ///
    /// # Errors
    ///
    /// See [`combat::anchor`].
    pub fn anchor(&mut self, hex: HexCoord) -> std::result::Result<Outcome, Rejection> {
        self.apply(Command::Anchor { hex })
    }

    /// Nexus Synthesizer heal.
    ///
    /// # Errors
    ///
    /// See [`actions::synthesize_heal`].
    pub fn synthesize_heal(&mut self) -> std::result::Result<Outcome, Rejection> {
        self.apply(Command::SynthesizeHeal)
    }

    /// Ritual heal.
    ///
    /// # Errors
    ///
    /// See [`actions::heal`].
    pub fn heal(&mut self, hp: u32) -> std::result::Result<Outcome, Rejection> {
        self.apply(Command::Heal { hp })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::testing::campaign;
    use crate::placement::EncounterTag;

    fn session() -> Session {
        let mut session = Session::new(campaign(42));
        session
            .create_character("Tester", ArchetypeId::GateCrasher, MoveId::MomentumStrike)
            .unwrap();
        session
    }

    #[test]
    fn test_commands_need_character() {
        let mut session = Session::new(campaign(42));
        assert_eq!(
            session.log_activity(ActivityKind::Cardio, 20),
            Err(Rejection::NoCharacter)
        );
    }

    #[test]
    fn test_wrong_archetype_move_fails_fast() {
        let mut session = Session::new(campaign(42));
        assert!(session
            .create_character("Tester", ArchetypeId::Wayfinder, MoveId::AetherShield)
            .is_err());
        assert!(session.state().is_none());
    }

    #[test]
    fn test_blank_name_defaults() {
        let mut session = Session::new(campaign(42));
        let state = session
            .create_character("  ", ArchetypeId::Wayfinder, MoveId::PhaseStrike)
            .unwrap();
        assert_eq!(state.character.name, "Worldhopper");
    }

    #[test]
    fn test_rejection_leaves_state_unchanged() {
        let mut session = session();
        let before = session.state().unwrap().clone();
        let boss = session.campaign().placement().hexes_tagged(EncounterTag::Boss)[0];
        assert_eq!(
            session.engage(boss, EngageOptions::default()),
            Err(Rejection::BossGateSealed)
        );
        assert_eq!(session.state(), Some(&before));
    }

    #[test]
    fn test_rolls_advance_only_on_commit() {
        let mut session = session();
        let rolls = session.state().unwrap().rolls.clone();
        let _ = session.move_to(HexCoord::new(-9, -9));
        assert_eq!(session.state().unwrap().rolls, rolls);
        session.log_activity(ActivityKind::Strength, 45).unwrap();
        assert_ne!(session.state().unwrap().rolls, rolls);
    }

    #[test]
    fn test_level_up_flow() {
        let mut session = session();
        {
            let state = session.state.as_mut().unwrap();
            state.progression.xp = 9;
            state.character.hp = 2;
            assert!(state.grant_reward(crate::progression::Reward::new(10, 5)));
        }
        let state = session.state().unwrap();
        assert_eq!(state.progression.xp, 10);
        assert_eq!(state.progression.currency, 130);

        assert!(matches!(
            session.complete_level_up(LevelUpChoice::NewMove(MoveId::PhaseStrike)),
            Err(Rejection::InvalidLevelUpChoice(_))
        ));
        let outcome = session
            .complete_level_up(LevelUpChoice::NewMove(MoveId::AuraOfConquest))
            .unwrap();
        let Outcome::LeveledUp(progression) = outcome else {
            panic!("expected level-up");
        };
        assert_eq!(progression.level, 2);
        assert_eq!(progression.xp, 4);
        let state = session.state().unwrap();
        assert_eq!(state.character.hp, state.character.max_hp);
        assert!(state.character.knows(MoveId::AuraOfConquest));
        assert!(!state.level_up.is_pending());
        assert_eq!(
            session.complete_level_up(LevelUpChoice::Stat(crate::character::StatKind::Power)),
            Err(Rejection::NoPendingLevelUp)
        );
    }

    #[test]
    fn test_map_frozen_after_victory() {
        let mut session = session();
        session.state.as_mut().unwrap().status = CampaignStatus::Victory;
        let start = session.campaign().start();
        let target = session.campaign().grid().neighbors_in(start)[0];
        assert_eq!(session.move_to(target), Err(Rejection::CampaignComplete));
        assert!(session.purchase("bath").is_ok());
    }

    #[test]
    fn test_command_ron_script() {
        let script = r#"[
            LogActivity(activity: strength, minutes: 45),
            Move(hex: "2,4"),
            Engage(hex: "3,4", options: (phase_strike: true)),
            CompleteLevelUp(choice: stat(power)),
            SynthesizeHeal,
        ]"#;
        let commands: Vec<Command> = ron::from_str(script).unwrap();
        assert_eq!(commands.len(), 5);
        assert_eq!(
            commands[2],
            Command::Engage {
                hex: HexCoord::new(3, 4),
                options: EngageOptions { phase_strike: true },
            }
        );
    }
}

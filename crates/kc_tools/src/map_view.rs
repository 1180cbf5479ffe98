//! ASCII preview of a seeded realm.
//!
//! Rows follow the odd-r offset layout: odd rows are shifted right by one
//! character so neighbouring hexes line up diagonally.

use std::fmt::Write as _;

use kc_core::campaign::Campaign;
use kc_core::hex::{offset_to_axial, GridShape, HexCoord};
use kc_core::placement::EncounterTag;
use kc_core::state::GameState;

/// ASCII rendering configuration.
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Draw fogged hexes as fog instead of showing their contents.
    pub respect_fog: bool,
    /// Show the symbol legend.
    pub show_legend: bool,
    /// Use colored output (ANSI).
    pub use_color: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            respect_fog: true,
            show_legend: true,
            use_color: true,
        }
    }
}

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";

    pub const CYAN: &str = "\x1b[36m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const GREEN: &str = "\x1b[32m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const GRAY: &str = "\x1b[90m";
}

fn cell(campaign: &Campaign, state: Option<&GameState>, hex: HexCoord, config: &AsciiConfig) -> (char, &'static str) {
    if let Some(state) = state {
        if state.map.player_pos == hex {
            return ('@', colors::CYAN);
        }
        if config.respect_fog && !state.map.revealed.contains(&hex) {
            return ('~', colors::GRAY);
        }
        if state.map.is_cleared(hex) {
            return ('x', colors::GREEN);
        }
    } else if hex == campaign.start() {
        return ('S', colors::CYAN);
    }

    if campaign.placement().rift_at(hex).is_some() {
        return ('R', colors::MAGENTA);
    }
    match campaign.encounter_at(hex).map(|e| e.tag()) {
        Some(EncounterTag::Boss) => ('B', colors::RED),
        Some(EncounterTag::Elite) => ('E', colors::YELLOW),
        Some(EncounterTag::Basic) => ('b', colors::YELLOW),
        Some(EncounterTag::Anomaly) => ('?', colors::MAGENTA),
        None => ('.', ""),
    }
}

/// Render a rectangular realm, optionally with a game's fog and progress.
pub fn render_map(campaign: &Campaign, state: Option<&GameState>, config: &AsciiConfig) -> String {
    let mut output = String::new();
    let (cols, rows) = match campaign.grid().shape() {
        GridShape::Rectangle { cols, rows } => (
            i32::try_from(cols).unwrap_or(i32::MAX),
            i32::try_from(rows).unwrap_or(i32::MAX),
        ),
        GridShape::Radial { .. } => {
            let _ = writeln!(output, "(radial grids are not previewed)");
            return output;
        }
    };

    let _ = writeln!(
        output,
        "{}== {} | seed {} =={}",
        if config.use_color { colors::BOLD } else { "" },
        campaign.package().realm.name,
        campaign.seed(),
        if config.use_color { colors::RESET } else { "" }
    );

    for row in 0..rows {
        if row % 2 == 1 {
            output.push(' ');
        }
        for col in 0..cols {
            let (ch, color) = cell(campaign, state, offset_to_axial(col, row), config);
            if config.use_color && !color.is_empty() {
                output.push_str(color);
                output.push(ch);
                output.push_str(colors::RESET);
            } else {
                output.push(ch);
            }
            output.push(' ');
        }
        output.push('\n');
    }

    if config.show_legend {
        output.push_str("@=you S=start b=basic E=elite B=boss ?=anomaly R=rift x=cleared ~=fog\n");
    }
    if let Some(state) = state {
        let r = state.resources;
        let _ = writeln!(
            output,
            "HP {}/{} | move {} atk {} def {} ritual {} | lvl {} xp {}/{} | {} gold",
            state.character.hp,
            state.character.max_hp,
            r.movement,
            r.attack,
            r.defense,
            r.ritual,
            state.progression.level,
            state.progression.xp,
            state.progression.cap(),
            state.progression.currency
        );
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use kc_core::character::{ArchetypeId, MoveId};
    use kc_test_utils::fixtures::{new_session, omija_campaign};

    fn plain() -> AsciiConfig {
        AsciiConfig {
            use_color: false,
            ..AsciiConfig::default()
        }
    }

    #[test]
    fn test_render_layout_counts() {
        let campaign = omija_campaign(7);
        let text = render_map(&campaign, None, &plain());
        assert_eq!(text.matches('B').count(), 2);
        // Three elites, plus the header's realm name and the legend.
        assert_eq!(text.matches('E').count(), 3 + 2);
        assert_eq!(text.matches('S').count(), 1 + 1);
        assert!(text.lines().nth(2).unwrap().starts_with(' '));
    }

    #[test]
    fn test_render_with_fog() {
        let session = new_session(7, ArchetypeId::Wayfinder, MoveId::PhaseStrike);
        let text = render_map(session.campaign(), session.state(), &plain());
        assert_eq!(text.matches('@').count(), 2);
        assert!(text.contains('~'));
        assert!(text.contains("HP 5/5"));
    }

    #[test]
    fn test_color_codes_optional() {
        let campaign = omija_campaign(7);
        assert!(!render_map(&campaign, None, &plain()).contains('\x1b'));
        assert!(render_map(&campaign, None, &AsciiConfig::default()).contains('\x1b'));
    }
}

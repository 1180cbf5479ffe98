//! View-box layout export.
//!
//! Gives a renderer the pixel centre of every hex in the 16:9 view box,
//! with the encounter tag placed there, so it never redoes hex math.

use kc_core::campaign::Campaign;
use kc_core::error::GameError;
use kc_core::hex::{GridTransform, DEFAULT_HEX_SIZE, VIEW_HEIGHT, VIEW_WIDTH};
use kc_core::math::Fixed;
use kc_core::placement::EncounterTag;
use serde::Serialize;

use crate::error::{Result, ToolError};

/// One hex placed in the view box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutCell {
    /// Stable hex id (`"q,r"`).
    pub id: String,
    /// View-box x, rounded to whole pixels.
    pub x: i32,
    /// View-box y, rounded to whole pixels.
    pub y: i32,
    /// Encounter placed on the hex.
    pub encounter: Option<EncounterTag>,
    /// Rift whose entrance is on the hex.
    pub rift: Option<String>,
}

/// Pixel layout of a realm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewLayout {
    /// View-box width.
    pub width: i32,
    /// View-box height.
    pub height: i32,
    /// Scale applied to grid pixels.
    pub scale: f64,
    /// Cells in grid order.
    pub cells: Vec<LayoutCell>,
}

/// Lay out `campaign` with hexes of `hex_size` pixels.
#[must_use]
pub fn view_layout(campaign: &Campaign, hex_size: i32) -> ViewLayout {
    let size = Fixed::from_num(hex_size);
    let grid = campaign.grid();
    let transform = GridTransform::for_grid(grid, size);
    let placement = campaign.placement();
    let cells = grid
        .cells()
        .iter()
        .map(|&hex| {
            let (x, y) = transform.hex_to_view_pixel(hex, size).round_to_pixels();
            LayoutCell {
                id: hex.id(),
                x,
                y,
                encounter: placement.encounter_at(hex).map(|e| e.tag()),
                rift: placement.rift_at(hex).map(str::to_owned),
            }
        })
        .collect();
    ViewLayout {
        width: VIEW_WIDTH,
        height: VIEW_HEIGHT,
        scale: transform.scale.to_num(),
        cells,
    }
}

/// Lay out with the default hex size.
#[must_use]
pub fn default_layout(campaign: &Campaign) -> ViewLayout {
    view_layout(campaign, DEFAULT_HEX_SIZE)
}

/// Render a layout as pretty RON.
///
/// # Errors
///
/// Returns an error if the layout cannot be serialized.
pub fn render_layout(layout: &ViewLayout) -> Result<String> {
    ron::ser::to_string_pretty(layout, ron::ser::PrettyConfig::default()).map_err(|e| {
        ToolError::Game(GameError::InvalidState(format!("Failed to render layout: {e}")))
    })
}

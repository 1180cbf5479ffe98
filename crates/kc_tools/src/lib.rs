//! # Kinetic Campaigns Tools
//!
//! Command-line tools for development:
//! - Campaign validators
//! - ASCII map preview
//! - View-box layout export
//! - Scripted play against a save file

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod layout;
pub mod map_view;
pub mod play;
pub mod validate;

//! Campaign validation utilities.

use std::path::{Path, PathBuf};

use kc_core::campaign::Campaign;
use kc_core::config::EngineConfig;
use kc_core::data::{CampaignPackage, EncounterKind};
use kc_core::placement::{EncounterTag, PlacementConfig};

use crate::error::{read_file, Result, ToolError};

/// What a valid campaign file contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSummary {
    /// Realm id.
    pub realm: String,
    /// Grid cells.
    pub cells: usize,
    /// Encounter definitions by kind: basic, elite, boss.
    pub encounters: [usize; 3],
    /// Anomaly definitions.
    pub anomalies: usize,
    /// Rift definitions.
    pub rifts: usize,
    /// Hexes holding an encounter after placement with the default seed.
    pub placed: usize,
}

/// Parse, validate and place a campaign file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, does not parse, or fails
/// content validation.
pub fn validate_campaign_file(path: &Path) -> Result<ValidationSummary> {
    let source = read_file(path)?;
    let package = CampaignPackage::from_ron_str(&source, &path.display().to_string())?;
    let encounters = [
        package.encounters_of(EncounterKind::Basic).len(),
        package.encounters_of(EncounterKind::Elite).len(),
        package.encounters_of(EncounterKind::Boss).len(),
    ];
    let anomalies = package.anomalies.len();
    let rifts = package.rifts.len();
    let realm = package.realm.id.clone();

    let campaign = Campaign::new(package, &PlacementConfig::default(), EngineConfig::default())?;
    if campaign.placement().hexes_tagged(EncounterTag::Boss).is_empty() {
        tracing::warn!(realm = %realm, "No boss placed; the realm cannot be won");
    }

    Ok(ValidationSummary {
        realm,
        cells: campaign.grid().len(),
        encounters,
        anomalies,
        rifts,
        placed: campaign.placement().encounters.len(),
    })
}

/// Validate every `.ron` campaign in a directory, or a single file.
///
/// # Errors
///
/// Returns the first failure.
pub fn validate_campaign_directory(path: &Path) -> Result<Vec<(PathBuf, ValidationSummary)>> {
    if path.is_file() {
        return Ok(vec![(path.to_path_buf(), validate_campaign_file(path)?)]);
    }
    let entries = std::fs::read_dir(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();

    let mut summaries = Vec::with_capacity(files.len());
    for file in files {
        tracing::debug!(file = %file.display(), "Validating campaign");
        let summary = validate_campaign_file(&file)?;
        summaries.push((file, summary));
    }
    Ok(summaries)
}

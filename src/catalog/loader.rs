//! Load a catalog from a directory of TOML files
//!
//! Layout:
//! - `units.toml` with `[[unit]]` tables
//! - `improvements.toml` with `[[improvement]]` tables
//! - `regiments/**/*.toml`, one regiment template per file
//! - `divisions/**/*.toml`, one division template per file
//! - `engine.toml` (optional) engine configuration

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::catalog::division::DivisionTemplate;
use crate::catalog::improvement::ImprovementDefinition;
use crate::catalog::regiment::RegimentTemplate;
use crate::catalog::registry::Catalog;
use crate::catalog::unit::UnitDefinition;
use crate::core::config::EngineConfig;
use crate::core::error::{MusterError, Result};

#[derive(Debug, Default, Deserialize)]
struct UnitsFile {
    #[serde(default)]
    unit: Vec<UnitDefinition>,
}

#[derive(Debug, Default, Deserialize)]
struct ImprovementsFile {
    #[serde(default)]
    improvement: Vec<ImprovementDefinition>,
}

/// Load every definition under `dir` into a fresh catalog
pub fn load_catalog(dir: &Path) -> Result<Catalog> {
    let mut catalog = Catalog::new();

    let units_path = dir.join("units.toml");
    if units_path.exists() {
        let units = parse_units(&fs::read_to_string(&units_path)?, &units_path)?;
        tracing::info!("Loaded {} units from {}", units.len(), units_path.display());
        for unit in units {
            catalog.insert_unit(unit);
        }
    }

    let improvements_path = dir.join("improvements.toml");
    if improvements_path.exists() {
        let improvements =
            parse_improvements(&fs::read_to_string(&improvements_path)?, &improvements_path)?;
        tracing::info!(
            "Loaded {} improvements from {}",
            improvements.len(),
            improvements_path.display()
        );
        for improvement in improvements {
            catalog.insert_improvement(improvement);
        }
    }

    let regiments: Vec<RegimentTemplate> = load_templates(&dir.join("regiments"))?;
    tracing::info!("Loaded {} regiment templates", regiments.len());
    for template in regiments {
        catalog.insert_regiment(template);
    }

    let divisions: Vec<DivisionTemplate> = load_templates(&dir.join("divisions"))?;
    tracing::info!("Loaded {} division templates", divisions.len());
    for template in divisions {
        catalog.insert_division(template);
    }

    Ok(catalog)
}

/// Load `engine.toml` from the catalog directory, or defaults when absent
pub fn load_engine_config(dir: &Path) -> Result<EngineConfig> {
    let path = dir.join("engine.toml");
    if path.exists() {
        EngineConfig::load(&path)
    } else {
        Ok(EngineConfig::default())
    }
}

pub fn parse_units(content: &str, path: &Path) -> Result<Vec<UnitDefinition>> {
    let file: UnitsFile = toml::from_str(content).map_err(|e| MusterError::toml(path, e))?;
    Ok(file.unit)
}

pub fn parse_improvements(content: &str, path: &Path) -> Result<Vec<ImprovementDefinition>> {
    let file: ImprovementsFile =
        toml::from_str(content).map_err(|e| MusterError::toml(path, e))?;
    Ok(file.improvement)
}

/// Load all .toml files from a directory recursively, in path order
fn load_templates<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut paths = Vec::new();
    if dir.is_dir() {
        collect_toml_files(dir, &mut paths)?;
    }
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| MusterError::toml(path, e))
        })
        .collect()
}

fn collect_toml_files(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry_path = entry?.path();
        if entry_path.is_dir() {
            collect_toml_files(&entry_path, paths)?;
        } else if entry_path.extension().map_or(false, |ext| ext == "toml") {
            paths.push(entry_path);
        }
    }
    Ok(())
}

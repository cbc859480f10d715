use anyhow::Context;
use std::path::{Path, PathBuf};

use crate::regulation::{CeilingGrowth, CeilingRule, RegulationParams, StrategyVariant};

pub const ENV_STRATEGY: &str = "PHASESEARCH_STRATEGY";
pub const ENV_CEILING: &str = "PHASESEARCH_CEILING";
pub const ENV_MIN_SIMPLIFYING_GENERATIONS: &str = "PHASESEARCH_MIN_SIMPLIFYING_GENERATIONS";
pub const ENV_RELAXATION_MARGIN: &str = "PHASESEARCH_RELAXATION_MARGIN";
pub const ENV_CEILING_GROWTH_FACTOR: &str = "PHASESEARCH_CEILING_GROWTH_FACTOR";
pub const ENV_CEILING_CAP: &str = "PHASESEARCH_CEILING_CAP";

impl RegulationParams {
    /// Default config file path: <config_dir>/phasesearch/regulation.toml
    pub fn config_path() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Cannot determine config directory")?
            .join("phasesearch");
        Ok(config_dir.join("regulation.toml"))
    }

    /// Load parameters from the default path, falling back to defaults.
    /// Environment variables override file values.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load parameters from `path` (TOML, or JSON for a `.json` extension),
    /// apply environment overrides and validate the result.
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let mut params = Self::read_file(path)?;
        params.apply_overrides(|key| std::env::var(key).ok())?;
        params
            .validate()
            .with_context(|| format!("Invalid regulation config {}", path.display()))?;
        Ok(params)
    }

    fn read_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No regulation config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        };
        parsed.with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("Invalid TOML regulation config")
    }

    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        serde_json::from_str(content).context("Invalid JSON regulation config")
    }

    /// Apply `PHASESEARCH_*` overrides obtained through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_STRATEGY) {
            self.strategy = raw
                .parse::<StrategyVariant>()
                .with_context(|| format!("Failed to parse {}", ENV_STRATEGY))?;
        }
        if let Some(raw) = lookup(ENV_CEILING) {
            let value = raw
                .trim()
                .parse::<f64>()
                .with_context(|| format!("Failed to parse {}", ENV_CEILING))?;
            self.ceiling = CeilingRule::Absolute { value };
        }
        if let Some(raw) = lookup(ENV_MIN_SIMPLIFYING_GENERATIONS) {
            self.min_simplifying_generations = raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Failed to parse {}", ENV_MIN_SIMPLIFYING_GENERATIONS))?;
        }
        if let Some(raw) = lookup(ENV_RELAXATION_MARGIN) {
            self.relaxation_margin = raw
                .trim()
                .parse::<f64>()
                .with_context(|| format!("Failed to parse {}", ENV_RELAXATION_MARGIN))?;
        }
        if let Some(raw) = lookup(ENV_CEILING_GROWTH_FACTOR) {
            let factor = raw
                .trim()
                .parse::<f64>()
                .with_context(|| format!("Failed to parse {}", ENV_CEILING_GROWTH_FACTOR))?;
            self.ceiling_growth = CeilingGrowth::Factor(factor);
        }
        if let Some(raw) = lookup(ENV_CEILING_CAP) {
            let raw = raw.trim();
            // empty or "none" clears a cap set in the file
            self.ceiling_cap = if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(
                    raw.parse::<f64>()
                        .with_context(|| format!("Failed to parse {}", ENV_CEILING_CAP))?,
                )
            };
        }
        Ok(())
    }
}

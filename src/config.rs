use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Source column names, after whitespace trimming.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub school_name: String,
    pub leader: String,
    pub status: String,
    pub signing_date: String,
    pub expiration_date: String,
    pub margin: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            school_name: "Nome da Escola".to_string(),
            leader: "Líder".to_string(),
            status: "Status da Parceria".to_string(),
            signing_date: "Data de Assinatura".to_string(),
            expiration_date: "Data de Vencimento".to_string(),
            margin: "Margem rentabilidade".to_string(),
        }
    }
}

impl ColumnNames {
    /// All required columns in file order of the original sheet.
    pub fn required(&self) -> [&str; 6] {
        [
            self.school_name.as_str(),
            self.leader.as_str(),
            self.status.as_str(),
            self.signing_date.as_str(),
            self.expiration_date.as_str(),
            self.margin.as_str(),
        ]
    }

    /// Trim surrounding whitespace, matching how file headers are read.
    fn trim(&mut self) {
        for name in [
            &mut self.school_name,
            &mut self.leader,
            &mut self.status,
            &mut self.signing_date,
            &mut self.expiration_date,
            &mut self.margin,
        ] {
            *name = name.trim().to_string();
        }
    }
}

/// Chart colours as `#rrggbb` strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThemeColors {
    pub positive: String,
    pub negative: String,
    pub accent: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            positive: "#10c759".to_string(),
            negative: "#fa3e3e".to_string(),
            accent: "#270ffc".to_string(),
        }
    }
}

/// Everything a config file may override. Missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub columns: ColumnNames,
    pub colors: ThemeColors,
    pub histogram_bins: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            colors: ThemeColors::default(),
            histogram_bins: 20,
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let mut config: DashboardConfig =
            serde_json::from_str(&text).context("parsing config JSON")?;
        config.columns.trim();
        if config.histogram_bins == 0 {
            anyhow::bail!("histogram_bins must be at least 1");
        }
        Ok(config)
    }

    /// Defaults when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

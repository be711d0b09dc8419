//! Process-level settings
//!
//! The binary reads these once from the environment and hands them to the
//! [`Repository`](crate::areas::repository::Repository); library code never looks at
//! environment variables itself.

use crate::errors::RepositoryError;
use anyhow::Context;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "SPRIG_CONFIG";
pub const AUTHOR_DATE_ENV: &str = "SPRIG_AUTHOR_DATE";
pub const DIFF_TOOL_ENV: &str = "SPRIG_DIFF_TOOL";
pub const IDENTITY_FILE_NAME: &str = ".sprigconfig";
pub const AUTHOR_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiffToolKind {
    /// In-process Myers diff, patch applier and diff3
    #[default]
    Builtin,
    /// `diff -u`, `patch` and `merge -p` from the host
    External,
}

impl DiffToolKind {
    fn parse(value: &str) -> Self {
        match value.trim() {
            "external" => DiffToolKind::External,
            "builtin" | "" => DiffToolKind::Builtin,
            other => {
                tracing::warn!(value = other, "unknown diff tool, using the builtin one");
                DiffToolKind::Builtin
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub identity_path: Option<PathBuf>,
    pub author_date: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub diff_tool: DiffToolKind,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let identity_path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(IDENTITY_FILE_NAME)));

        let author_date = match std::env::var(AUTHOR_DATE_ENV) {
            Ok(date) => Some(
                chrono::DateTime::parse_from_str(&date, AUTHOR_DATE_FORMAT)
                    .with_context(|| format!("Invalid {AUTHOR_DATE_ENV}: {date}"))?,
            ),
            Err(_) => None,
        };

        let diff_tool = std::env::var(DIFF_TOOL_ENV)
            .map(|value| DiffToolKind::parse(&value))
            .unwrap_or_default();

        Ok(Config {
            identity_path,
            author_date,
            diff_tool,
        })
    }

    /// Read the identity file; called once per commit creation
    pub fn identity(&self) -> anyhow::Result<Identity> {
        let path = self
            .identity_path
            .as_deref()
            .context("Unable to locate the home directory for the identity file")?;

        Identity::load(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Err(RepositoryError::FileNotFound(path.to_path_buf()).into());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read identity file {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid identity file {}", path.display()))
    }

    /// Parse `name = ...` and `email = ...` lines; other lines are ignored
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let mut name = None;
        let mut email = None;

        for line in content.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            match key.trim() {
                "name" => name = Some(value.trim().to_string()),
                "email" => email = Some(value.trim().to_string()),
                _ => {}
            }
        }

        Ok(Identity {
            name: name.context("missing `name = ` line")?,
            email: email.context("missing `email = ` line")?,
        })
    }
}

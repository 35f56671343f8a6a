//! Tracker configuration (`tracker.toml` at the corpus root)

use super::kind::{KindRegistry, BUILTIN_KINDS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Config file name, relative to the corpus root
pub const CONFIG_FILE: &str = "tracker.toml";

/// Where documents of one kind live
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KindLayout {
    /// Directory relative to the corpus root, searched recursively
    pub dir: PathBuf,

    /// File extension without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    "md".to_string()
}

impl KindLayout {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: default_extension(),
        }
    }
}

/// Tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Known artifact kinds and their directory conventions
    #[serde(default = "default_kinds")]
    pub kinds: BTreeMap<String, KindLayout>,
}

fn default_kinds() -> BTreeMap<String, KindLayout> {
    BUILTIN_KINDS
        .iter()
        .map(|kind| {
            let dir = match *kind {
                "feature" => "features",
                "experiment" => "experiments",
                "quality-assessment" => "quality-assessments",
                other => other,
            };
            (kind.to_string(), KindLayout::new(dir))
        })
        .collect()
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            kinds: default_kinds(),
        }
    }
}

impl TrackerConfig {
    /// Load config from `<root>/tracker.toml`, falling back to defaults
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: TrackerConfig = toml::from_str(&content)?;

        if let Some(kind) = config.kinds.keys().find(|k| !KindRegistry::is_valid_name(k)) {
            anyhow::bail!(
                "Invalid kind name '{}' in {}. Expected lowercase kebab-case, e.g. `ships-log`",
                kind,
                config_path.display()
            );
        }
        Ok(config)
    }

    /// Save config to `<root>/tracker.toml`
    pub fn save(&self, root: &Path) -> anyhow::Result<()> {
        std::fs::create_dir_all(root)?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(root.join(CONFIG_FILE), content)?;
        Ok(())
    }

    /// Registry of the configured kinds
    pub fn registry(&self) -> KindRegistry {
        KindRegistry::new(self.kinds.keys().cloned())
    }

    pub fn layout(&self, kind: &str) -> Option<&KindLayout> {
        self.kinds.get(kind)
    }

    /// Register or replace a kind
    pub fn with_kind(mut self, kind: impl Into<String>, layout: KindLayout) -> Self {
        self.kinds.insert(kind.into(), layout);
        self
    }
}

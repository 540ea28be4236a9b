use serde::Deserialize;

use crate::context::{LanguageMode, NeighborStrategy, SelectionMode, SizeCategory};
use crate::error::AlignError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Per-run matching configuration, immutable once the run starts.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchConfig {
    pub name: String,
    #[serde(default = "default_true")]
    pub match_classes: bool,
    #[serde(default = "default_true")]
    pub match_properties: bool,
    #[serde(default)]
    pub match_individuals: bool,
    pub size: SizeCategory,
    pub language: LanguageMode,
    #[serde(default)]
    pub selection: SelectionMode,
    #[serde(default)]
    pub neighbor: NeighborStrategy,
    #[serde(default)]
    pub direct_neighbors: bool,
    /// Root path under which auxiliary knowledge sources live.
    #[serde(default = "default_knowledge_root")]
    pub knowledge_root: String,
    /// Ordered auxiliary knowledge-source identifiers. Ids ending in
    /// `.lexicon` are lexicon sources, everything else an ontology source.
    #[serde(default)]
    pub knowledge_sources: Vec<String>,
    /// Configured natural languages; required under multi-language mode.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Whether the string matcher runs in generative mode or only extends
    /// the alignment the earlier strategies produced.
    #[serde(default = "default_true")]
    pub primary_string_matcher: bool,
    #[serde(default)]
    pub interactive: bool,
}

fn default_true() -> bool {
    true
}

fn default_knowledge_root() -> String {
    "store/knowledge".into()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MatchConfig {
    pub fn from_toml(input: &str) -> Result<Self, AlignError> {
        let config: MatchConfig =
            toml::from_str(input).map_err(|e| AlignError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AlignError> {
        if !self.match_classes && !self.match_properties && !self.match_individuals {
            return Err(AlignError::ConfigValidation(
                "at least one entity kind must be matched".into(),
            ));
        }

        if self.language == LanguageMode::Multi && self.languages.len() < 2 {
            return Err(AlignError::ConfigValidation(format!(
                "multi-language mode requires at least 2 languages, got {}",
                self.languages.len()
            )));
        }

        for source in &self.knowledge_sources {
            if source.trim().is_empty() {
                return Err(AlignError::ConfigValidation(
                    "knowledge source ids must be non-empty".into(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
impl MatchConfig {
    /// Small single-language non-interactive baseline for tests.
    pub fn minimal() -> Self {
        Self {
            name: "test".into(),
            match_classes: true,
            match_properties: false,
            match_individuals: false,
            size: SizeCategory::Small,
            language: LanguageMode::Single,
            selection: SelectionMode::default(),
            neighbor: NeighborStrategy::default(),
            direct_neighbors: false,
            knowledge_root: "store/knowledge".into(),
            knowledge_sources: Vec::new(),
            languages: Vec::new(),
            primary_string_matcher: true,
            interactive: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Anatomy Track"
size = "medium"
language = "single"
selection = "permissive"
neighbor = "average"
direct_neighbors = true
knowledge_sources = ["uberon.owl", "human.lexicon"]
"#;

    #[test]
    fn parse_valid() {
        let config = MatchConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Anatomy Track");
        assert_eq!(config.size, SizeCategory::Medium);
        assert_eq!(config.language, LanguageMode::Single);
        assert_eq!(config.selection, SelectionMode::Permissive);
        assert_eq!(config.neighbor, NeighborStrategy::Average);
        assert!(config.direct_neighbors);
        assert_eq!(config.knowledge_sources.len(), 2);
        // Defaults
        assert!(config.match_classes);
        assert!(config.match_properties);
        assert!(!config.match_individuals);
        assert!(config.primary_string_matcher);
        assert!(!config.interactive);
        assert_eq!(config.knowledge_root, "store/knowledge");
    }

    #[test]
    fn selection_defaults_to_hybrid() {
        let config = MatchConfig::from_toml(
            r#"
name = "Defaults"
size = "small"
language = "single"
"#,
        )
        .unwrap();
        assert_eq!(config.selection, SelectionMode::Hybrid);
        assert_eq!(config.neighbor, NeighborStrategy::Maximum);
    }

    #[test]
    fn reject_unknown_size() {
        let err = MatchConfig::from_toml(
            r#"
name = "Bad"
size = "enormous"
language = "single"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("config parse error"));
    }

    #[test]
    fn reject_multi_without_languages() {
        let err = MatchConfig::from_toml(
            r#"
name = "Bad"
size = "small"
language = "multi"
languages = ["en"]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("at least 2 languages"));
    }

    #[test]
    fn reject_no_entity_kinds() {
        let err = MatchConfig::from_toml(
            r#"
name = "Bad"
size = "small"
language = "single"
match_classes = false
match_properties = false
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("at least one entity kind"));
    }

    #[test]
    fn reject_blank_source_id() {
        let err = MatchConfig::from_toml(
            r#"
name = "Bad"
size = "small"
language = "single"
knowledge_sources = ["  "]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }
}

use std::path::Path;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Serialize, Deserialize};
use crate::core::error::Result;

/// Environment prefix for overrides, e.g. `FACETDEX_DEFAULT_LIMIT=50`.
pub const ENV_PREFIX: &str = "FACETDEX_";
pub const DEFAULT_CONFIG_FILE: &str = "facetdex.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Search defaults
    pub default_limit: usize,
    pub default_crop_length: usize,           // in word tokens
    pub crop_marker: String,
    pub highlight_pre_tag: String,
    pub highlight_post_tag: String,
    pub search_timeout_ms: u64,               // 0 disables the timeout

    // Typo tolerance
    pub min_word_len_one_typo: usize,         // bytes
    pub min_word_len_two_typos: usize,

    // Facets
    pub facet_scan_budget: usize,             // max candidate docs scanned per request
    pub max_values_per_facet: usize,
    /// `exhaustiveFacetsCount` is true only when no bound truncated the counts.
    /// Off by default, which always reports `false` as the legacy API did,
    /// even for a fully scanned candidate set.
    pub strict_facet_exhaustiveness: bool,

    // Indexing
    pub max_token_length: usize,
    pub parallel_batch_threshold: usize,      // below this, batches are analyzed sequentially

    pub query_cache_size: usize,              // 0 disables the cache
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_limit: 20,
            default_crop_length: 10,
            crop_marker: String::new(),
            highlight_pre_tag: "<em>".to_string(),
            highlight_post_tag: "</em>".to_string(),
            search_timeout_ms: 0,

            min_word_len_one_typo: 5,
            min_word_len_two_typos: 9,

            facet_scan_budget: 100_000,
            max_values_per_facet: 100,
            strict_facet_exhaustiveness: false,

            max_token_length: 255,
            parallel_batch_threshold: 64,

            query_cache_size: 256,
        }
    }
}

impl Config {
    /// Defaults, then `facetdex.toml` in the working directory, then `FACETDEX_*` env vars.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Maximum number of typos allowed for a query word of `len` bytes.
    pub fn typos_for_word_len(&self, len: usize) -> u8 {
        if len >= self.min_word_len_two_typos {
            2
        } else if len >= self.min_word_len_one_typo {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_typo_thresholds() {
        let config = Config::default();
        assert_eq!(config.typos_for_word_len(3), 0);
        assert_eq!(config.typos_for_word_len(6), 1);
        assert_eq!(config.typos_for_word_len(12), 2);
    }

    #[test]
    fn test_load_from_toml_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "default_limit = 5\ncrop_marker = \"…\"\nstrict_facet_exhaustiveness = true").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.default_limit, 5);
        assert_eq!(config.crop_marker, "…");
        assert!(config.strict_facet_exhaustiveness);
        assert_eq!(config.default_crop_length, Config::default().default_crop_length);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load_from("/nonexistent/facetdex.toml").unwrap();
        assert_eq!(config.highlight_pre_tag, "<em>");
    }
}

//! CSS class identifier mangling.
//!
//! The style pipeline calls [`ManglingSession::resolve`] once per class
//! identifier it discovers. The session memoizes every decision for the
//! lifetime of one project build, so an identifier maps to exactly one
//! mangled value no matter how many style sources mention it, and the
//! emitted map is a complete record of every identifier seen, excluded
//! ones included.

use indexmap::IndexMap;
use sha2::{Digest, Sha256};

use crate::config::{BuildConfig, ManglingStrategyKind};

/// Default prefix token for the sequential strategy.
pub const DEFAULT_SEQUENTIAL_PREFIX: &str = "idx";

/// Default prefix token for the content-hash strategy.
pub const DEFAULT_HASH_PREFIX: &str = "c";

/// Characters of `identifier + scope` actually fed to the hash.
pub const HASH_INPUT_LIMIT: usize = 6;

// ═══════════════════════════════════════════════════════════════════════════════
// EXCLUSION RULES
// ═══════════════════════════════════════════════════════════════════════════════

/// Identifiers exempt from mangling, matched by prefix or suffix.
/// Membership only; rule order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRules {
    pub prefixes: Vec<String>,
    pub suffixes: Vec<String>,
}

impl ExclusionRules {
    pub fn new(prefixes: Vec<String>, suffixes: Vec<String>) -> Self {
        Self { prefixes, suffixes }
    }

    pub fn from_config(config: &BuildConfig) -> Self {
        Self {
            prefixes: config.mangle_exclude_prefixes.clone(),
            suffixes: config.mangle_exclude_suffixes.clone(),
        }
    }

    pub fn is_excluded(&self, identifier: &str) -> bool {
        self.prefixes.iter().any(|p| identifier.starts_with(p.as_str()))
            || self.suffixes.iter().any(|s| identifier.ends_with(s.as_str()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STRATEGIES
// ═══════════════════════════════════════════════════════════════════════════════

/// Closed set of mangling schemes. Each variant carries the parameters it
/// needs; nothing is read from ambient state at resolve time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManglingStrategy {
    /// Identity. Also what development mode and unrecognized config kinds
    /// collapse to.
    None,

    /// Prefix + base-36 count of novel identifiers resolved so far in the
    /// session. Output depends purely on traversal order, so it is not
    /// stable across independent builds. Known limitation of the scheme.
    SequentialIndex { prefix: String },

    /// Prefix + hex digest over `identifier + scope`. The concatenation is
    /// truncated to its first `input_limit` characters before hashing, so
    /// identifiers sharing a long enough prefix within one scope collide.
    /// Deterministic across builds for the same identifier and scope.
    ContentHash { prefix: String, input_limit: usize },
}

impl ManglingStrategy {
    /// Selects the strategy for one project build. Development mode always
    /// yields `None`, whatever the config says.
    pub fn select(config: &BuildConfig) -> Self {
        if config.is_development() {
            return Self::None;
        }

        let prefix = |fallback: &str| {
            config
                .mangle_prefix
                .clone()
                .unwrap_or_else(|| fallback.to_string())
        };

        match config.mangling_strategy_kind {
            ManglingStrategyKind::None | ManglingStrategyKind::Unknown => Self::None,
            ManglingStrategyKind::SequentialIndex => Self::SequentialIndex {
                prefix: prefix(DEFAULT_SEQUENTIAL_PREFIX),
            },
            ManglingStrategyKind::ContentHash => Self::ContentHash {
                prefix: prefix(DEFAULT_HASH_PREFIX),
                input_limit: HASH_INPUT_LIMIT,
            },
        }
    }

    fn mangle(&self, identifier: &str, scope: &str, novel_count: usize) -> String {
        match self {
            Self::None => identifier.to_string(),
            Self::SequentialIndex { prefix } => {
                format!("{}{}", prefix, to_base36(novel_count))
            }
            Self::ContentHash {
                prefix,
                input_limit,
            } => {
                let input: String = identifier
                    .chars()
                    .chain(scope.chars())
                    .take(*input_limit)
                    .collect();
                format!("{}{:x}", prefix, Sha256::digest(input.as_bytes()))
            }
        }
    }
}

fn to_base36(mut value: usize) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = String::new();
    while value > 0 {
        out.insert(0, DIGITS[value % 36] as char);
        value /= 36;
    }
    out
}

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════════════

/// One project's mangling state for one build invocation.
///
/// Exclusively owned by that project's pipeline; never shared across
/// projects or across builds. The map keeps first-seen order so the
/// emitted artifact lists identifiers in discovery order.
#[derive(Debug, Clone)]
pub struct ManglingSession {
    scope: String,
    strategy: ManglingStrategy,
    rules: ExclusionRules,
    map: IndexMap<String, String>,
    novel_count: usize,
}

impl ManglingSession {
    pub fn new(
        scope: impl Into<String>,
        strategy: ManglingStrategy,
        rules: ExclusionRules,
    ) -> Self {
        Self {
            scope: scope.into(),
            strategy,
            rules,
            map: IndexMap::new(),
            novel_count: 0,
        }
    }

    /// Naming callback for the style pipeline, called per discovered class
    /// identifier. Synchronous, no I/O, and allocation-free on memoized
    /// hits. The first decision for an identifier is final for the
    /// session.
    pub fn resolve(&mut self, identifier: &str) -> &str {
        if !self.map.contains_key(identifier) {
            let mangled = if self.rules.is_excluded(identifier) {
                // Recorded as identity so the artifact stays a complete
                // audit of every identifier seen.
                identifier.to_string()
            } else {
                let fresh = self
                    .strategy
                    .mangle(identifier, &self.scope, self.novel_count);
                if matches!(self.strategy, ManglingStrategy::SequentialIndex { .. }) {
                    self.novel_count += 1;
                }
                fresh
            };
            self.map.insert(identifier.to_string(), mangled);
        }

        &self.map[identifier]
    }

    /// Whether mangling was active for this build.
    pub fn is_enabled(&self) -> bool {
        !matches!(self.strategy, ManglingStrategy::None)
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Original → mangled decisions in first-seen order.
    pub fn mangle_map(&self) -> &IndexMap<String, String> {
        &self.map
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Clears all decisions and restarts the sequential counter at zero.
    /// Called after the artifacts for this build have been written.
    pub fn reset(&mut self) {
        self.map.clear();
        self.novel_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential(prefix: &str) -> ManglingStrategy {
        ManglingStrategy::SequentialIndex {
            prefix: prefix.to_string(),
        }
    }

    fn content_hash(prefix: &str) -> ManglingStrategy {
        ManglingStrategy::ContentHash {
            prefix: prefix.to_string(),
            input_limit: HASH_INPUT_LIMIT,
        }
    }

    #[test]
    fn test_resolve_is_memoized() {
        let mut session =
            ManglingSession::new("site", sequential("idx"), ExclusionRules::default());
        let first = session.resolve("header").to_string();
        let second = session.resolve("header").to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sequential_indices_in_first_seen_order() {
        let mut session =
            ManglingSession::new("site", sequential("idx"), ExclusionRules::default());
        assert_eq!(session.resolve("header"), "idx0");
        assert_eq!(session.resolve("footer"), "idx1");
        assert_eq!(session.resolve("header"), "idx0");

        let map = session.mangle_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["header"], "idx0");
        assert_eq!(map["footer"], "idx1");
    }

    #[test]
    fn test_sequential_counter_restarts_after_reset() {
        let mut session =
            ManglingSession::new("site", sequential("idx"), ExclusionRules::default());
        session.resolve("header");
        session.resolve("footer");
        session.reset();

        assert!(session.is_empty());
        assert_eq!(session.resolve("sidebar"), "idx0");
    }

    #[test]
    fn test_sequential_counter_skips_excluded_identifiers() {
        let rules = ExclusionRules::new(vec!["js-".to_string()], vec![]);
        let mut session = ManglingSession::new("site", sequential("idx"), rules);
        assert_eq!(session.resolve("js-toggle"), "js-toggle");
        assert_eq!(session.resolve("header"), "idx0");
    }

    #[test]
    fn test_sequential_index_renders_base36() {
        let mut session =
            ManglingSession::new("site", sequential("idx"), ExclusionRules::default());
        for i in 0..36 {
            session.resolve(&format!("class-{}", i));
        }
        assert_eq!(session.resolve("one-more"), "idx10");
    }

    #[test]
    fn test_excluded_prefix_passes_through_and_is_recorded() {
        let rules = ExclusionRules::new(vec!["js-".to_string()], vec![]);
        let mut session = ManglingSession::new("site", content_hash("c"), rules);
        assert_eq!(session.resolve("js-toggle"), "js-toggle");
        assert_eq!(session.mangle_map()["js-toggle"], "js-toggle");
    }

    #[test]
    fn test_excluded_suffix_passes_through() {
        let rules = ExclusionRules::new(vec![], vec!["-raw".to_string()]);
        let mut session = ManglingSession::new("site", content_hash("c"), rules);
        assert_eq!(session.resolve("banner-raw"), "banner-raw");
    }

    #[test]
    fn test_content_hash_is_stable_across_sessions() {
        let mut first =
            ManglingSession::new("site", content_hash("c"), ExclusionRules::default());
        let mut second =
            ManglingSession::new("site", content_hash("c"), ExclusionRules::default());
        assert_eq!(first.resolve("header"), second.resolve("header"));
    }

    #[test]
    fn test_content_hash_scope_disambiguates() {
        let mut site = ManglingSession::new("site", content_hash("c"), ExclusionRules::default());
        let mut admin =
            ManglingSession::new("admin", content_hash("c"), ExclusionRules::default());
        // Short identifier, so the scope still fits inside the hashed input.
        assert_ne!(site.resolve("nav"), admin.resolve("nav"));
    }

    #[test]
    fn test_content_hash_input_truncation_collides_on_shared_prefix() {
        // Both concatenations truncate to the same six characters
        // ("header"), so the digests are equal. Inherited behavior,
        // preserved on purpose.
        let mut session =
            ManglingSession::new("site", content_hash("c"), ExclusionRules::default());
        let a = session.resolve("header-main").to_string();
        let b = session.resolve("header-alt").to_string();
        assert_eq!(a, b);
    }

    #[test]
    fn test_none_strategy_is_identity() {
        let mut session =
            ManglingSession::new("site", ManglingStrategy::None, ExclusionRules::default());
        assert_eq!(session.resolve("header"), "header");
        assert!(!session.is_enabled());
    }

    #[test]
    fn test_development_mode_forces_identity() {
        use crate::config::{BuildConfig, BuildMode, ManglingStrategyKind};

        let config = BuildConfig {
            mangling_strategy_kind: ManglingStrategyKind::ContentHash,
            mode: BuildMode::development(),
            ..BuildConfig::default()
        };
        assert_eq!(ManglingStrategy::select(&config), ManglingStrategy::None);
    }

    #[test]
    fn test_unknown_kind_selects_none() {
        use crate::config::{BuildConfig, ManglingStrategyKind};

        let config = BuildConfig {
            mangling_strategy_kind: ManglingStrategyKind::Unknown,
            ..BuildConfig::default()
        };
        assert_eq!(ManglingStrategy::select(&config), ManglingStrategy::None);
    }

    #[test]
    fn test_strategy_selection_uses_configured_prefix() {
        use crate::config::{BuildConfig, ManglingStrategyKind};

        let config = BuildConfig {
            mangling_strategy_kind: ManglingStrategyKind::SequentialIndex,
            mangle_prefix: Some("z".to_string()),
            ..BuildConfig::default()
        };
        assert_eq!(
            ManglingStrategy::select(&config),
            ManglingStrategy::SequentialIndex {
                prefix: "z".to_string()
            }
        );
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(36 * 36 + 1), "101");
    }
}

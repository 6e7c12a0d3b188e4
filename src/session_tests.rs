//! Cross-module scenario tests: full invocations of the build core the
//! way the bundler wiring drives it, with real config files on disk.

#[cfg(test)]
mod tests {
    use crate::{
        build_projects, BuildManifest, BuildMode, BuildOptions, ProjectContext,
        DEFAULT_CONFIG_FILE, ROSTER_FILE,
    };
    use std::fs;
    use tempfile::TempDir;

    fn scaffold(projects: &[&str], default_config: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("deploy")).unwrap();
        fs::write(
            root.join(ROSTER_FILE),
            serde_json::to_string(projects).unwrap(),
        )
        .unwrap();

        fs::create_dir_all(root.join("app/config")).unwrap();
        fs::write(root.join(DEFAULT_CONFIG_FILE), default_config).unwrap();

        dir
    }

    #[test]
    fn test_development_build_writes_disabled_identity_map() {
        let dir = scaffold(&["site"], r#"{"manglingStrategyKind": "contentHash"}"#);
        let options = BuildOptions {
            mode: BuildMode::development(),
            ..BuildOptions::new(dir.path(), "site")
        };

        build_projects(&options, |_context, session| {
            // Strategy is configured but development mode wins.
            assert_eq!(session.resolve("header"), "header");
            assert_eq!(session.resolve("footer"), "footer");
            BuildManifest::default()
        })
        .unwrap();

        let map_data =
            fs::read_to_string(dir.path().join("projects/site/public/cssmap.php")).unwrap();
        assert!(map_data.contains("'enabled' => false,"));
        assert!(map_data.contains("'header' => 'header',"));
    }

    #[test]
    fn test_excluded_identifiers_reach_the_artifact() {
        let dir = scaffold(
            &["site"],
            r#"{
                "manglingStrategyKind": "sequentialIndex",
                "mangleExcludePrefixes": ["js-"],
                "mangleExcludeSuffixes": ["-raw"]
            }"#,
        );
        let options = BuildOptions::new(dir.path(), "site");

        build_projects(&options, |_context, session| {
            session.resolve("js-toggle");
            session.resolve("header");
            session.resolve("banner-raw");
            BuildManifest::default()
        })
        .unwrap();

        let map_data =
            fs::read_to_string(dir.path().join("projects/site/public/cssmap.php")).unwrap();
        assert!(map_data.contains("'enabled' => true,"));
        assert!(map_data.contains("'js-toggle' => 'js-toggle',"));
        assert!(map_data.contains("'banner-raw' => 'banner-raw',"));
        // Excluded identifiers do not consume sequential indices.
        assert!(map_data.contains("'header' => 'idx0',"));
    }

    #[test]
    fn test_rebuild_starts_from_a_clean_session() {
        let dir = scaffold(&["site"], r#"{"manglingStrategyKind": "sequentialIndex"}"#);
        let options = BuildOptions::new(dir.path(), "site");

        build_projects(&options, |_context, session| {
            session.resolve("header");
            session.resolve("footer");
            BuildManifest::default()
        })
        .unwrap();

        // Second invocation resolves a different set; nothing from the
        // first run may leak into the new map.
        build_projects(&options, |_context, session| {
            session.resolve("sidebar");
            BuildManifest::default()
        })
        .unwrap();

        let map_data =
            fs::read_to_string(dir.path().join("projects/site/public/cssmap.php")).unwrap();
        assert!(map_data.contains("'sidebar' => 'idx0',"));
        assert!(!map_data.contains("'header'"));
        assert!(!map_data.contains("'footer'"));
    }

    #[test]
    fn test_content_hash_is_reproducible_across_invocations() {
        let dir = scaffold(&["site"], r#"{"manglingStrategyKind": "contentHash"}"#);
        let options = BuildOptions::new(dir.path(), "site");

        let pipeline = |_context: &ProjectContext,
                        session: &mut crate::ManglingSession| {
            session.resolve("header");
            BuildManifest::default()
        };

        build_projects(&options, pipeline).unwrap();
        let first =
            fs::read_to_string(dir.path().join("projects/site/public/cssmap.php")).unwrap();

        build_projects(&options, pipeline).unwrap();
        let second =
            fs::read_to_string(dir.path().join("projects/site/public/cssmap.php")).unwrap();

        assert_eq!(first, second);
    }
}

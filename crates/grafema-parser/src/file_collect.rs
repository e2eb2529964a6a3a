use globset::{Glob, GlobSet, GlobSetBuilder};
use grafema_core::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Configuration for file collection within one declared service root
/// (spec.md §1 "multi-service" scope; auto-discovery of service roots
/// itself stays out of scope, this just walks one given root).
#[derive(Debug, Clone)]
pub struct FileCollectionConfig {
    pub recursive: bool,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl Default for FileCollectionConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            include_patterns: vec![],
            exclude_patterns: vec![],
        }
    }
}

const SUPPORTED_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs"];

/// Walks `dir`, returning `(path, size)` pairs for every TypeScript/
/// JavaScript source file that passes the include/exclude globs. Grounded on
/// the teacher's `ignore`/`globset`-based walker.
pub fn collect_source_files_with_config(
    dir: &Path,
    config: &FileCollectionConfig,
) -> Result<Vec<(PathBuf, u64)>> {
    info!("Collecting source files from: {:?}", dir);

    let default_excludes = [
        "**/node_modules/**",
        "**/dist/**",
        "**/build/**",
        "**/.next/**",
        "**/.nuxt/**",
        "**/coverage/**",
        "**/.grafema/**",
        "**/.git/**",
    ];

    let mut combined_excludes: Vec<String> =
        default_excludes.iter().map(|s| s.to_string()).collect();
    combined_excludes.extend(config.exclude_patterns.clone());

    let exclude_set = build_globset(&combined_excludes);
    let include_set = if config.include_patterns.is_empty() {
        None
    } else {
        build_globset(&config.include_patterns)
    };

    let mut walker_builder = WalkBuilder::new(dir);
    walker_builder
        .hidden(false)
        .git_ignore(true)
        .git_exclude(true)
        .ignore(true);

    if !config.recursive {
        walker_builder.max_depth(Some(1));
    }

    let walker = walker_builder.build();

    let mut paths = Vec::new();
    let mut total_files = 0;

    for dent in walker {
        let dent = match dent {
            Ok(d) => d,
            Err(e) => {
                warn!("walker error: {}", e);
                continue;
            }
        };

        let path = dent.path();
        if !path.is_file() {
            continue;
        }
        total_files += 1;

        if let Some(ref set) = exclude_set {
            if set.is_match(path) {
                continue;
            }
        }
        if let Some(ref set) = include_set {
            if !set.is_match(path) {
                continue;
            }
        }

        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !SUPPORTED_EXTENSIONS.contains(&ext) {
            continue;
        }

        let size = dent.metadata().map(|m| m.len()).unwrap_or(0);
        paths.push((path.to_path_buf(), size));
    }

    debug!(
        "file collection complete: {} files scanned, {} matched",
        total_files,
        paths.len()
    );

    Ok(paths)
}

pub fn collect_source_files(dir: &Path) -> Result<Vec<(PathBuf, u64)>> {
    collect_source_files_with_config(dir, &FileCollectionConfig::default())
}

fn build_globset<S: AsRef<str>>(patterns: &[S]) -> Option<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    let mut added = false;

    for pattern in patterns {
        match Glob::new(pattern.as_ref()) {
            Ok(glob) => {
                builder.add(glob);
                added = true;
            }
            Err(e) => warn!("invalid glob pattern '{}': {}", pattern.as_ref(), e),
        }
    }

    if added {
        builder.build().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_only_ts_js_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ts"), "export const x = 1;").unwrap();
        std::fs::write(dir.path().join("a.py"), "x = 1").unwrap();
        let files = collect_source_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].0.ends_with("a.ts"));
    }

    #[test]
    fn excludes_node_modules_by_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        std::fs::write(dir.path().join("node_modules/pkg/index.js"), "").unwrap();
        std::fs::write(dir.path().join("a.js"), "").unwrap();
        let files = collect_source_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].0.ends_with("a.js"));
    }
}

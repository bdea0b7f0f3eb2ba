use ignore::WalkBuilder;
use std::path::PathBuf;
use tracing::debug;

use crate::config::SearchConfig;
use crate::errors::SearchResult;
use crate::filters::should_include_file;

/// Enumerates the files a search run will cover.
///
/// Single-file mode short-circuits the walk entirely. Otherwise the root
/// directory is walked, one level deep unless `recursive` is set, with
/// hidden entries filtered according to `include_hidden`.
pub fn collect_files(config: &SearchConfig) -> SearchResult<Vec<PathBuf>> {
    if let Some(file) = &config.file {
        debug!("Single-file mode: {}", file.display());
        return Ok(vec![file.clone()]);
    }

    let mut builder = WalkBuilder::new(&config.root_path);
    builder
        .standard_filters(false)
        .hidden(!config.include_hidden)
        .follow_links(false);

    if !config.recursive {
        builder.max_depth(Some(1));
    }

    let mut files: Vec<PathBuf> = builder
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| should_include_file(path, config.include_hidden, &config.ignore_patterns))
        .collect();

    // Walk order is filesystem-dependent; sort so work units are enqueued
    // deterministically.
    files.sort_unstable();

    debug!(
        "Enumerated {} files under {}",
        files.len(),
        config.root_path.display()
    );
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn config_for(root: &std::path::Path) -> SearchConfig {
        SearchConfig {
            pattern: "x".to_string(),
            root_path: root.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_non_recursive_skips_subdirectories() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("top.txt"), "a\n").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/nested.txt"), "b\n").unwrap();

        let files = collect_files(&config_for(dir.path())).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("top.txt"));
    }

    #[test]
    fn test_recursive_includes_subdirectories() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("top.txt"), "a\n").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/nested.txt"), "b\n").unwrap();

        let mut config = config_for(dir.path());
        config.recursive = true;

        let files = collect_files(&config).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_hidden_files_filtered_by_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("visible.txt"), "a\n").unwrap();
        fs::write(dir.path().join(".hidden"), "b\n").unwrap();

        let files = collect_files(&config_for(dir.path())).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("visible.txt"));

        let mut config = config_for(dir.path());
        config.include_hidden = true;
        let files = collect_files(&config).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_single_file_mode_bypasses_walk() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        fs::write(dir.path().join("b.txt"), "b\n").unwrap();

        let mut config = config_for(dir.path());
        config.file = Some(dir.path().join("a.txt"));

        let files = collect_files(&config).unwrap();
        assert_eq!(files, vec![dir.path().join("a.txt")]);
    }
}

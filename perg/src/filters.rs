use glob::Pattern;
use std::path::Path;

/// Returns true when the final path component starts with a dot. Hidden
/// files are skipped by default, matching conventional grep behavior.
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Checks if a path should be skipped based on user ignore patterns
pub fn should_ignore(path: &Path, ignore_patterns: &[String]) -> bool {
    if ignore_patterns.is_empty() {
        return false;
    }

    let path_str = path.to_string_lossy();
    let normalized = path_str.replace('\\', "/");

    ignore_patterns.iter().any(|pattern| {
        Pattern::new(pattern)
            .map(|p| p.matches(&normalized))
            .unwrap_or(false)
    })
}

/// Determines if an enumerated file should be handed to the partitioner
pub fn should_include_file(path: &Path, include_hidden: bool, ignore_patterns: &[String]) -> bool {
    (include_hidden || !is_hidden(path)) && !should_ignore(path, ignore_patterns)
}

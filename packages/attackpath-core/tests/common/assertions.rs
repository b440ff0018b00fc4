//! Custom assertions for attack-path results

use attackpath_core::AttackPath;
use pretty_assertions::assert_eq;

/// Compare paths as node-id lists, in order
pub fn assert_paths(actual: &[AttackPath], expected: &[&[&str]]) {
    let actual: Vec<Vec<&str>> = actual
        .iter()
        .map(|path| path.nodes().iter().map(String::as_str).collect())
        .collect();
    let expected: Vec<Vec<&str>> = expected.iter().map(|path| path.to_vec()).collect();
    assert_eq!(actual, expected);
}

/// Every path is simple, starts at `source` and ends at `target`
pub fn assert_well_formed(paths: &[AttackPath], source: &str, target: &str, max_depth: usize) {
    for path in paths {
        assert!(path.is_simple(), "path revisits a node: {}", path);
        assert_eq!(path.source(), Some(source), "bad source: {}", path);
        assert_eq!(path.target(), Some(target), "bad target: {}", path);
        assert!(
            path.hops() <= max_depth,
            "path exceeds depth {}: {}",
            max_depth,
            path
        );
    }
}

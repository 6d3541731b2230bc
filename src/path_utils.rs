//! Cross-platform path utilities
//!
//! Every path the core compares or persists goes through [`normalize`], so
//! that archive entries, snapshot entries, and stored manifests agree on a
//! single spelling regardless of platform or archive author.

use std::path::Path;

/// Characters that are unsafe in file names
/// Replaced with hyphens and collapsed: `/`, `\`, `:`, `*`, `?`, `"`, `<`, `>`, `|`
const PATH_UNSAFE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Convert a path to a forward-slash string
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Normalize a logical path into its canonical form.
///
/// Lowercases, converts `\` to `/`, and strips any leading `/` and `./`
/// segments.
///
/// # Examples
///
/// ```
/// use bundlekeeper::path_utils::normalize;
///
/// assert_eq!(normalize("Assets/Foo.cs"), "assets/foo.cs");
/// assert_eq!(normalize("./Assets\\Sub\\Bar.png"), "assets/sub/bar.png");
/// assert_eq!(normalize("/Assets/x"), "assets/x");
/// ```
pub fn normalize(path: &str) -> String {
    let mut normalized = path.trim().replace('\\', "/").to_lowercase();
    loop {
        if let Some(rest) = normalized.strip_prefix("./") {
            normalized = rest.to_string();
        } else if let Some(rest) = normalized.strip_prefix('/') {
            normalized = rest.to_string();
        } else {
            break;
        }
    }
    normalized
}

/// Normalize a filesystem path relative to `root`.
///
/// Returns `None` when `path` is not under `root`.
pub fn normalize_relative(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root)
        .ok()
        .map(|rel| normalize(&to_forward_slashes(rel)))
}

/// Whether `path` names a metadata companion file
pub fn is_meta_path(path: &str, meta_extension: &str) -> bool {
    path.len() > meta_extension.len() && path.ends_with(meta_extension)
}

/// Strip the metadata extension, yielding the path of the asset it describes
pub fn strip_meta_extension<'a>(path: &'a str, meta_extension: &str) -> Option<&'a str> {
    if is_meta_path(path, meta_extension) {
        path.strip_suffix(meta_extension)
    } else {
        None
    }
}

/// Path of the metadata companion for an asset path
pub fn meta_path_for(path: &str, meta_extension: &str) -> String {
    format!("{path}{meta_extension}")
}

/// Make a bundle title safe for filesystem use.
///
/// Replaces unsafe characters with hyphens, collapses consecutive hyphens,
/// and removes leading/trailing hyphens. Returns "unknown" if the result is
/// empty.
///
/// # Examples
///
/// ```
/// use bundlekeeper::path_utils::make_path_safe;
///
/// assert_eq!(make_path_safe("Props: Vol 1"), "Props- Vol 1");
/// assert_eq!(make_path_safe("a/b\\c"), "a-b-c");
/// assert_eq!(make_path_safe(":::"), "unknown");
/// ```
pub fn make_path_safe(name: &str) -> String {
    let key: String = name
        .chars()
        .map(|c| {
            if PATH_UNSAFE_CHARS.contains(&c) || c.is_control() {
                '-'
            } else {
                c
            }
        })
        .collect();

    let key = key
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .trim_matches('-')
        .trim()
        .to_string();

    if key.is_empty() || key == "." || key == ".." {
        "unknown".to_string()
    } else {
        key
    }
}

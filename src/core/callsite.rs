// PieLog - core/callsite.rs
//
// Call-site attribution.
//
// Every public logging entry point is `#[track_caller]`, so the location
// handed to `CallSite::resolve` is already the first frame outside the
// library: the compiler skips the library's own frames no matter how many
// internal layers sit between the public method and the formatter. Any new
// public entry point must carry the attribute too.

use crate::util::constants::UNKNOWN_CALL_SITE;
use std::fmt;
use std::panic::Location;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

/// Source location of the code that issued a log call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// `./`-prefixed, forward-slash path relative to the project root.
    pub path: String,
    pub line: u32,
}

impl CallSite {
    /// Resolve a caller location against the project root.
    ///
    /// Relative source paths (the caller's own crate) are anchored at the
    /// working directory; absolute ones (dependencies, remapped builds) are
    /// used as they are. The result is `./`-relative when it lives under
    /// `project_root` and absolute otherwise.
    pub fn resolve(location: &Location<'_>, project_root: &Path) -> CallSite {
        let file = location.file();
        if file.is_empty() {
            return CallSite::unknown();
        }

        CallSite {
            path: relative_to_root(Path::new(file), source_anchor(), project_root),
            line: location.line(),
        }
    }

    /// Location of whoever called the `#[track_caller]` chain leading here.
    #[track_caller]
    pub fn here(project_root: &Path) -> CallSite {
        CallSite::resolve(Location::caller(), project_root)
    }

    /// Placeholder used when no location is available.
    pub fn unknown() -> CallSite {
        CallSite {
            path: String::new(),
            line: 0,
        }
    }

    fn is_unknown(&self) -> bool {
        self.path.is_empty()
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            f.write_str(UNKNOWN_CALL_SITE)
        } else {
            write!(f, "{}:{}", self.path, self.line)
        }
    }
}

/// Working directory at the first resolution.
fn source_anchor() -> &'static Path {
    static ANCHOR: OnceLock<PathBuf> = OnceLock::new();
    ANCHOR.get_or_init(|| std::env::current_dir().unwrap_or_default())
}

/// `file` and `root` are joined onto `anchor` (a no-op for absolute paths)
/// before the root is stripped.
fn relative_to_root(file: &Path, anchor: &Path, root: &Path) -> String {
    let file = anchor.join(file);
    let root = anchor.join(root);
    match file.strip_prefix(&root) {
        Ok(relative) => format!("./{}", forward_slashes(relative)),
        Err(_) => forward_slashes(&file),
    }
}

/// Join path components with `/`, dropping `.` components.
fn forward_slashes(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        let part = match component {
            Component::CurDir => continue,
            Component::RootDir => {
                out.push('/');
                continue;
            }
            Component::Prefix(prefix) => prefix.as_os_str().to_string_lossy(),
            Component::ParentDir => "..".into(),
            Component::Normal(name) => name.to_string_lossy(),
        };
        if !out.is_empty() && !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(&part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_here_points_at_this_file() {
        let expected_line = line!() + 1;
        let site = CallSite::here(Path::new("."));
        assert_eq!(site.line, expected_line);
        assert!(site.path.starts_with("./"), "got {}", site.path);
        assert!(site.path.ends_with("src/core/callsite.rs"), "got {}", site.path);
        assert_eq!(site.to_string(), format!("{}:{expected_line}", site.path));
    }

    #[test]
    fn test_unrelated_root_keeps_full_path() {
        let site = CallSite::here(Path::new("/nowhere"));
        assert!(!site.path.starts_with("./"), "got {}", site.path);
        assert!(site.path.ends_with("src/core/callsite.rs"), "got {}", site.path);
    }

    #[test]
    fn test_through_nested_track_caller_layers() {
        #[track_caller]
        fn outer(root: &Path) -> CallSite {
            inner(root)
        }
        #[track_caller]
        fn inner(root: &Path) -> CallSite {
            CallSite::here(root)
        }

        let expected_line = line!() + 1;
        let site = outer(Path::new("."));
        assert_eq!(site.line, expected_line);
    }

    #[test]
    fn test_forward_slashes_drop_cur_dir() {
        let p: PathBuf = [".", "src", "main.rs"].iter().collect();
        assert_eq!(forward_slashes(&p), "src/main.rs");
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_path_under_root_is_relative() {
        let anchor = Path::new("/cwd");
        let file = Path::new("/work/project/src/lib.rs");
        assert_eq!(relative_to_root(file, anchor, Path::new("/work/project")), "./src/lib.rs");
        assert_eq!(relative_to_root(file, anchor, Path::new("/other")), "/work/project/src/lib.rs");
    }

    #[cfg(unix)]
    #[test]
    fn test_explicit_root_applies_to_relative_paths() {
        let anchor = Path::new("/work/ws");
        let file = Path::new("service/src/main.rs");
        assert_eq!(
            relative_to_root(file, anchor, Path::new("/work/ws/service")),
            "./src/main.rs"
        );
        assert_eq!(relative_to_root(file, anchor, Path::new(".")), "./service/src/main.rs");
        assert_eq!(relative_to_root(file, anchor, Path::new("service")), "./src/main.rs");
        assert_eq!(
            relative_to_root(file, anchor, Path::new("/elsewhere")),
            "/work/ws/service/src/main.rs"
        );
    }

    #[test]
    fn test_unknown_placeholder() {
        assert_eq!(CallSite::unknown().to_string(), "<unknown>:0");
    }
}

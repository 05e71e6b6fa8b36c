//! Command handlers plus the file-collection helper they share.

mod harvest;
mod sync;

pub use harvest::run_harvest;
pub use sync::run_sync;

use crate::exclusion::{build_exclude_globset, build_walker, ExclusionConfig};
use std::path::{Path, PathBuf};

/// Collect source files to process: directories are walked with the exclusion rules,
/// explicit files are checked against the exclude globs, and everything is filtered by
/// extension, sorted, and de-duplicated for deterministic processing order.
pub(crate) fn collect_files(
    paths: &[PathBuf],
    root: &Path,
    exts: &[String],
    excl: &ExclusionConfig,
) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let exclude_set = build_exclude_globset(&excl.patterns);

    let paths = if paths.is_empty() {
        vec![root.to_path_buf()]
    } else {
        paths.to_vec()
    };

    for path in paths {
        let full_path = if path.is_absolute() {
            path
        } else {
            root.join(&path)
        };

        if full_path.is_file() {
            let relative = full_path.strip_prefix(root).unwrap_or(&full_path);
            if exclude_set.as_ref().is_some_and(|s| s.is_match(relative)) {
                continue;
            }
            files.push(full_path);
        } else if full_path.is_dir() {
            for entry in build_walker(&full_path, excl).build().filter_map(|e| e.ok()) {
                let p = entry.path();
                if p.is_file() && has_extension(p, exts) {
                    files.push(p.to_path_buf());
                }
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

fn has_extension(path: &Path, exts: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| exts.iter().any(|e| e == ext))
        .unwrap_or(false)
}

/// Path shown in logs and stored in records: relative to the root when possible.
pub(crate) fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_collect_files_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        let files = collect_files(
            &[],
            temp_dir.path(),
            &exts(&["ts"]),
            &ExclusionConfig::default(),
        );
        assert!(files.is_empty());
    }

    #[test]
    fn test_collect_files_filters_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("api.ts"), "export const x = 1;").unwrap();
        fs::write(temp_dir.path().join("Plugin.h"), "// header").unwrap();
        fs::write(temp_dir.path().join("readme.md"), "# doc").unwrap();

        let files = collect_files(
            &[],
            temp_dir.path(),
            &exts(&["ts"]),
            &ExclusionConfig::default(),
        );
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("api.ts"));

        let files = collect_files(
            &[],
            temp_dir.path(),
            &exts(&["h", "m"]),
            &ExclusionConfig::default(),
        );
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("Plugin.h"));
    }

    #[test]
    fn test_collect_files_excludes_default_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let pods = temp_dir.path().join("Pods");
        fs::create_dir(&pods).unwrap();
        fs::write(pods.join("Dep.h"), "// dep").unwrap();
        fs::write(temp_dir.path().join("Plugin.h"), "// plugin").unwrap();

        let files = collect_files(
            &[],
            temp_dir.path(),
            &exts(&["h"]),
            &ExclusionConfig::default(),
        );
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("Plugin.h"));
    }

    #[test]
    fn test_collect_files_explicit_file_and_dedup() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("api.ts");
        fs::write(&file, "export const x = 1;").unwrap();

        // Same file reachable both explicitly and through the directory walk.
        let files = collect_files(
            &[file.clone(), temp_dir.path().to_path_buf()],
            temp_dir.path(),
            &exts(&["ts"]),
            &ExclusionConfig::default(),
        );
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_collect_files_relative_path_argument() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("src");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("api.ts"), "export const x = 1;").unwrap();
        fs::write(temp_dir.path().join("other.ts"), "export const y = 2;").unwrap();

        let files = collect_files(
            &[PathBuf::from("src")],
            temp_dir.path(),
            &exts(&["ts"]),
            &ExclusionConfig::default(),
        );
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/api.ts"));
    }

    #[test]
    fn test_collect_files_explicit_file_respects_excludes() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("api.generated.ts");
        fs::write(&file, "export const x = 1;").unwrap();

        let excl = ExclusionConfig {
            patterns: vec!["*.generated.ts".to_string()],
            respect_gitignore: true,
        };
        let files = collect_files(&[file], temp_dir.path(), &exts(&["ts"]), &excl);
        assert!(files.is_empty());
    }

    #[test]
    fn test_display_relative() {
        let root = Path::new("/project");
        assert_eq!(
            display_relative(Path::new("/project/src/api.ts"), root),
            "src/api.ts"
        );
        assert_eq!(
            display_relative(Path::new("/elsewhere/api.ts"), root),
            "/elsewhere/api.ts"
        );
    }
}

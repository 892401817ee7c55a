use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// `.dart` files below `lib`, at most `max_depth` directories deep and
/// `max_files` in total. Hidden directories are skipped; order is by name.
pub fn find_dart_files(lib: &Path, max_depth: usize, max_files: usize) -> Vec<PathBuf> {
    WalkDir::new(lib)
        .max_depth(max_depth + 1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.path().extension().is_some_and(|x| x == "dart"))
        .take(max_files)
        .map(DirEntry::into_path)
        .collect()
}

fn is_hidden(e: &DirEntry) -> bool {
    e.file_type().is_dir() && e.file_name().to_str().is_some_and(|n| n.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn respects_depth_cap_and_hidden_dirs() {
        let tmp = TempDir::new().unwrap();
        let lib = tmp.path().join("lib");
        for rel in ["a.dart", "src/b.dart", "src/deep/x/y/z.dart", ".hidden/c.dart", "readme.md"] {
            let p = lib.join(rel);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(p, "").unwrap();
        }

        let found = find_dart_files(&lib, 2, 20);
        let names: Vec<_> = found.iter().map(|p| p.strip_prefix(&lib).unwrap().to_path_buf()).collect();
        assert_eq!(names, vec![PathBuf::from("a.dart"), PathBuf::from("src/b.dart")]);

        assert_eq!(find_dart_files(&lib, 3, 1).len(), 1);
    }
}

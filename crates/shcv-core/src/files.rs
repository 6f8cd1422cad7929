//! Filesystem helpers: template discovery and atomic writes

use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Result, ShcvError};

/// Extensions recognized as chart templates
pub const TEMPLATE_EXTENSIONS: &[&str] = &["yaml", "yml", "tpl"];

/// Whether `path` names a template file by extension
pub fn is_template_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEMPLATE_EXTENSIONS.contains(&ext))
}

/// Collect every template file under `dir`, recursively, in file-name order
///
/// Hidden files are included. A missing directory is reported as
/// [`ShcvError::TemplatesDirNotFound`]; any error while walking (such as an
/// unreadable subdirectory) aborts the walk.
pub fn find_template_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ShcvError::TemplatesDirNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|source| ShcvError::WalkTemplates {
            path: dir.to_path_buf(),
            source,
        })?;

        if entry.file_type().is_file() && is_template_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Write `data` to a temporary file next to `path`, then rename it into place
///
/// An existing file keeps its permissions.
pub fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    if let Ok(metadata) = std::fs::metadata(path) {
        tmp.as_file().set_permissions(metadata.permissions())?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_is_template_file() {
        assert!(is_template_file(Path::new("deployment.yaml")));
        assert!(is_template_file(Path::new("service.yml")));
        assert!(is_template_file(Path::new("_helpers.tpl")));
        assert!(!is_template_file(Path::new("NOTES.txt")));
        assert!(!is_template_file(Path::new("README.md")));
        assert!(!is_template_file(Path::new("yaml")));
    }

    #[test]
    fn test_find_filters_by_extension() {
        let dir = TempDir::new().unwrap();
        for name in [
            "deployment.yaml",
            "service.yml",
            "ingress.tpl",
            "README.md",
            "script.sh",
            "notes.txt",
            ".hidden.yaml",
        ] {
            touch(dir.path(), name);
        }

        let files = find_template_files(dir.path()).unwrap();
        assert_eq!(
            relative(dir.path(), &files),
            vec![".hidden.yaml", "deployment.yaml", "ingress.tpl", "service.yml"]
        );
    }

    #[test]
    fn test_find_nested() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "deployment.yaml");
        touch(dir.path(), "nested/configmap.yaml");

        let files = find_template_files(dir.path()).unwrap();
        assert_eq!(
            relative(dir.path(), &files),
            vec!["deployment.yaml", "nested/configmap.yaml"]
        );
    }

    #[test]
    fn test_find_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert!(find_template_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_find_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = find_template_files(&dir.path().join("templates")).unwrap_err();
        assert!(matches!(err, ShcvError::TemplatesDirNotFound { .. }));
        assert!(err.to_string().starts_with("templates directory not found"));
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("values.yaml");
        fs::write(&path, "old: true\n").unwrap();

        write_atomic(&path, b"new: true\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new: true\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deployment.yaml");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_atomic(&path, b"new").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}

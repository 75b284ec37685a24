use crate::error::{AppError, AppResult};
use camino::{Utf8Path, Utf8PathBuf};
use directories::UserDirs;
use rfd::FileDialog;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

pub const SUGGESTED_NAME: &str = "document.md";
pub const MARKDOWN_EXTENSION: &str = ".md";

/// Appends `.md` unless the name already ends with it. Blank names mean the user backed out.
pub fn ensure_markdown_extension(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    if name.ends_with(MARKDOWN_EXTENSION) {
        Some(name.to_string())
    } else {
        Some(format!("{name}{MARKDOWN_EXTENSION}"))
    }
}

/// Gives a native-prompt path without an extension the one we expect.
pub fn with_default_extension(mut path: Utf8PathBuf, extension: &str) -> Utf8PathBuf {
    if path.extension().is_none() {
        path.set_extension(extension);
    }
    path
}

/// Where save prompts start: the documents folder, then home, then the working directory.
pub fn default_directory() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| {
            dirs.document_dir()
                .map(|p| p.to_path_buf())
                .or_else(|| Some(dirs.home_dir().to_path_buf()))
        })
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn pick_open_path() -> Option<Utf8PathBuf> {
    FileDialog::new()
        .add_filter("Markdown File", &["md", "markdown", "mdown"])
        .set_directory(default_directory())
        .pick_file()
        .and_then(|p| Utf8PathBuf::try_from(p).ok())
}

/// Save dialog used when the platform prompt is unavailable. The chosen file
/// name is coerced to end in `.md`.
pub fn pick_save_path() -> Option<Utf8PathBuf> {
    let picked = FileDialog::new()
        .add_filter("Markdown File", &["md"])
        .set_directory(default_directory())
        .set_file_name(SUGGESTED_NAME)
        .save_file()
        .and_then(|p| Utf8PathBuf::try_from(p).ok())?;
    coerce_file_name(&picked)
}

pub fn pick_export_path(suggested: &str) -> Option<Utf8PathBuf> {
    FileDialog::new()
        .add_filter("HTML", &["html", "htm"])
        .set_directory(default_directory())
        .set_file_name(suggested)
        .save_file()
        .and_then(|p| Utf8PathBuf::try_from(p).ok())
        .map(|p| with_default_extension(p, "html"))
}

fn coerce_file_name(path: &Utf8Path) -> Option<Utf8PathBuf> {
    let name = ensure_markdown_extension(path.file_name()?)?;
    Some(path.with_file_name(name))
}

pub fn read_to_string(path: &Utf8Path) -> AppResult<String> {
    Ok(fs::read_to_string(path)?)
}

pub fn write_atomic(path: &Utf8Path, contents: &str) -> AppResult<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .map(Utf8Path::to_path_buf)
        .unwrap_or_else(|| {
            Utf8PathBuf::try_from(std::env::temp_dir()).unwrap_or_else(|_| Utf8PathBuf::from("tmp"))
        });
    let mut tmp = NamedTempFile::new_in(&parent)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| AppError::Persist {
        path: path.to_string(),
        source: e.error,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_gets_markdown_extension() {
        assert_eq!(ensure_markdown_extension("notes").as_deref(), Some("notes.md"));
    }

    #[test]
    fn existing_extension_is_kept() {
        assert_eq!(ensure_markdown_extension("notes.md").as_deref(), Some("notes.md"));
        assert_eq!(
            ensure_markdown_extension("notes.txt").as_deref(),
            Some("notes.txt.md")
        );
    }

    #[test]
    fn blank_name_is_cancel() {
        assert_eq!(ensure_markdown_extension("   "), None);
        assert_eq!(ensure_markdown_extension(""), None);
    }

    #[test]
    fn fallback_path_rewrites_only_the_file_name() {
        let path = coerce_file_name(Utf8Path::new("/home/me/docs/notes")).unwrap();
        assert_eq!(path, Utf8PathBuf::from("/home/me/docs/notes.md"));
    }

    #[test]
    fn native_paths_without_extension_get_one() {
        let path = with_default_extension(Utf8PathBuf::from("/tmp/readme"), "md");
        assert_eq!(path, Utf8PathBuf::from("/tmp/readme.md"));
        let path = with_default_extension(Utf8PathBuf::from("/tmp/readme.txt"), "md");
        assert_eq!(path, Utf8PathBuf::from("/tmp/readme.txt"));
    }

    #[test]
    fn atomic_write_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().join("doc.md")).unwrap();
        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "# second\n").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "# second\n");
    }

    #[test]
    fn reading_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().join("missing.md")).unwrap();
        assert!(matches!(read_to_string(&path), Err(AppError::Io(_))));
    }
}

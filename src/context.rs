//! Collects reference material from a directory tree into a single text blob.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::LLMError;

/// Extensions (without the dot, lowercase) loaded when no override is given.
pub const DEFAULT_EXTENSIONS: &[&str] = &["txt", "md", "go", "rs", "json", "py"];

/// Text gathered by [`ContextLoader::load`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedContext {
    /// Concatenation of every included file, each preceded by a path header.
    pub text: String,
    /// Included files, in walk order.
    pub files: Vec<PathBuf>,
    /// Files that matched the allow-list but could not be read.
    pub skipped: Vec<PathBuf>,
}

impl LoadedContext {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Walks a directory and concatenates the files whose extension is allow-listed.
///
/// Hidden subdirectories (name starting with `.`) are not descended into; the root is
/// always walked even if its own name is hidden. Entries are visited sorted by file
/// name so the output is stable across platforms.
///
/// Unreadable files are skipped: the walk continues and the path is recorded in
/// [`LoadedContext::skipped`]. Failures of the walk itself, such as a missing root,
/// abort the load.
///
/// # Examples
///
/// ```no_run
/// use kotoba_duet::context::ContextLoader;
///
/// let loaded = ContextLoader::new().with_extensions(["md"]).load("./docs")?;
/// println!("{} files", loaded.files.len());
/// # Ok::<(), kotoba_duet::LLMError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ContextLoader {
    extensions: Vec<String>,
}

impl Default for ContextLoader {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

impl ContextLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the allow-list. A leading dot and letter case are ignored.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Returns `true` when the path's extension is on the allow-list.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| *allowed == ext))
    }

    pub fn load(&self, root: impl AsRef<Path>) -> Result<LoadedContext, LLMError> {
        let root = root.as_ref();
        let mut loaded = LoadedContext::default();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_hidden_dir(entry));

        for entry in walker {
            let entry = entry.map_err(|err| LLMError::Context {
                path: root.display().to_string(),
                message: err.to_string(),
            })?;
            if entry.file_type().is_dir() || !self.accepts(entry.path()) {
                continue;
            }

            match read_or_skip(entry.path()) {
                Some(content) => {
                    loaded.text.push_str(&format!(
                        "\n--- File: {} ---\n",
                        entry.path().display()
                    ));
                    loaded.text.push_str(&content);
                    loaded.text.push('\n');
                    loaded.files.push(entry.into_path());
                }
                None => loaded.skipped.push(entry.into_path()),
            }
        }

        tracing::debug!(
            root = %root.display(),
            files = loaded.files.len(),
            skipped = loaded.skipped.len(),
            "context loaded"
        );
        Ok(loaded)
    }
}

/// Loads `root` with the default allow-list and returns only the text.
pub fn load_context(root: impl AsRef<Path>) -> Result<String, LLMError> {
    ContextLoader::new().load(root).map(|loaded| loaded.text)
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_string_lossy().starts_with('.')
}

/// Skip-unreadable-files policy: a read failure drops the file, never the walk.
fn read_or_skip(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "skipping unreadable file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matches_case_insensitively() {
        let loader = ContextLoader::new();
        assert!(loader.accepts(Path::new("notes/README.MD")));
        assert!(loader.accepts(Path::new("main.go")));
        assert!(!loader.accepts(Path::new("tool.exe")));
        assert!(!loader.accepts(Path::new("Makefile")));
    }

    #[test]
    fn with_extensions_normalizes_entries() {
        let loader = ContextLoader::new().with_extensions([".TOML", "yaml"]);
        assert!(loader.accepts(Path::new("Cargo.toml")));
        assert!(loader.accepts(Path::new("ci.yaml")));
        assert!(!loader.accepts(Path::new("notes.md")));
    }
}

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

/// Extensions of files that are part of the knowledge base.
const KNOWLEDGE_EXTENSIONS: &[&str] = &["txt", "md"];

const BLOCK_START: &str = "\n## KNOWLEDGE BASE START\n\n";
const BLOCK_END: &str = "## KNOWLEDGE BASE END\n";

/// Literal marker carried by a block that could not be loaded.
pub const FAILURE_MARKER: &str = "KNOWLEDGE BASE START - ERROR";

/// Aggregated knowledge text, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBlock {
    text: String,
    files: Vec<String>,
    failure: Option<String>,
}

impl KnowledgeBlock {
    /// The full block, markers and banners included
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// File names that made it into the block, in block order
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Whether loading failed and the block is the error placeholder
    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }

    /// Reason the load failed, if it did
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub(crate) fn degraded(reason: String) -> Self {
        let text = format!(
            "\n## {}\n\nNo se pudo cargar la base de conocimiento: {}\n\n{}",
            FAILURE_MARKER, reason, BLOCK_END
        );
        Self {
            text,
            files: Vec::new(),
            failure: Some(reason),
        }
    }
}

impl std::fmt::Display for KnowledgeBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Concatenate every `.txt` / `.md` file in `dir` into a knowledge block.
///
/// Each file is preceded by a `--- Contenido de: <name> ---` banner and the
/// whole block is framed by `KNOWLEDGE BASE START` / `KNOWLEDGE BASE END`.
/// Files are taken in file-name order. Any I/O failure (missing directory,
/// unreadable or non-UTF-8 file) yields the degraded placeholder block.
pub fn load_knowledge_base(dir: &Path) -> KnowledgeBlock {
    match try_load(dir) {
        Ok(block) => {
            info!(
                "Loaded {} knowledge file(s) from {}",
                block.files.len(),
                dir.display()
            );
            block
        }
        Err(e) => {
            let reason = format!("{:#}", e);
            error!("Failed to load knowledge base: {}", reason);
            KnowledgeBlock::degraded(reason)
        }
    }
}

fn try_load(dir: &Path) -> Result<KnowledgeBlock> {
    // Raw names are kept for reading; the lossy form only appears in banners
    let mut entries_found: Vec<(String, OsString)> = Vec::new();

    let entries = fs::read_dir(dir)
        .with_context(|| format!("cannot read directory {}", dir.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("cannot list {}", dir.display()))?;
        // DirEntry::file_type does not follow symlinks
        let file_type = entry
            .file_type()
            .with_context(|| format!("cannot stat {}", entry.path().display()))?;
        if !file_type.is_file() {
            continue;
        }

        let raw_name = entry.file_name();
        let name = raw_name.to_string_lossy().into_owned();
        if is_knowledge_file(&name) {
            entries_found.push((name, raw_name));
        } else {
            debug!("Skipping non-knowledge file {}", name);
        }
    }

    entries_found.sort();

    let mut text = String::from(BLOCK_START);
    let mut names = Vec::with_capacity(entries_found.len());
    for (name, raw_name) in entries_found {
        let path = dir.join(&raw_name);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        text.push_str(&format!("--- Contenido de: {} ---\n{}\n\n", name, content));
        names.push(name);
    }
    text.push_str(BLOCK_END);

    Ok(KnowledgeBlock {
        text,
        files: names,
        failure: None,
    })
}

fn is_knowledge_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| KNOWLEDGE_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn aggregates_txt_and_md_with_banners() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.txt", "alpha content");
        write(tmp.path(), "b.md", "# beta");

        let block = load_knowledge_base(tmp.path());
        let text = block.as_str();

        assert!(!block.is_degraded());
        assert!(text.contains("## KNOWLEDGE BASE START"));
        assert!(text.contains("## KNOWLEDGE BASE END"));
        assert!(text.contains("--- Contenido de: a.txt ---\nalpha content"));
        assert!(text.contains("--- Contenido de: b.md ---\n# beta"));
        assert_eq!(block.files(), ["a.txt", "b.md"]);
    }

    #[test]
    fn exact_layout_for_single_file() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "only.txt", "x");

        let block = load_knowledge_base(tmp.path());
        assert_eq!(
            block.as_str(),
            "\n## KNOWLEDGE BASE START\n\n--- Contenido de: only.txt ---\nx\n\n## KNOWLEDGE BASE END\n"
        );
    }

    #[test]
    fn files_are_ordered_by_name() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "zeta.txt", "z");
        write(tmp.path(), "alpha.md", "a");

        let block = load_knowledge_base(tmp.path());
        let text = block.as_str();
        assert!(text.find("alpha.md").unwrap() < text.find("zeta.txt").unwrap());
    }

    #[test]
    fn skips_other_extensions_and_directories() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "notes.txt", "kept");
        write(tmp.path(), "image.png", "binary-ish");
        write(tmp.path(), "README", "no extension");
        fs::create_dir(tmp.path().join("nested.md")).unwrap();

        let block = load_knowledge_base(tmp.path());
        assert_eq!(block.files(), ["notes.txt"]);
        assert!(!block.as_str().contains("binary-ish"));
        assert!(!block.as_str().contains("no extension"));
    }

    #[test]
    fn empty_directory_yields_bare_markers() {
        let tmp = TempDir::new().unwrap();
        let block = load_knowledge_base(tmp.path());
        assert!(!block.is_degraded());
        assert_eq!(
            block.as_str(),
            "\n## KNOWLEDGE BASE START\n\n## KNOWLEDGE BASE END\n"
        );
    }

    #[test]
    fn missing_directory_degrades_without_panicking() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("does-not-exist");

        let block = load_knowledge_base(&missing);
        assert!(block.is_degraded());
        assert!(block.as_str().contains(FAILURE_MARKER));
        assert!(block
            .as_str()
            .contains("No se pudo cargar la base de conocimiento"));
        assert!(block.as_str().ends_with("## KNOWLEDGE BASE END\n"));
        assert!(block.failure_reason().unwrap().contains("does-not-exist"));
        assert!(block.files().is_empty());
    }

    #[test]
    fn non_utf8_file_degrades_whole_block() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "good.txt", "fine");
        fs::write(tmp.path().join("bad.txt"), [0xff, 0xfe, 0xfd]).unwrap();

        let block = load_knowledge_base(tmp.path());
        assert!(block.is_degraded());
        assert!(!block.as_str().contains("fine"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_file_name_is_still_read() {
        use std::os::unix::ffi::OsStrExt;

        let tmp = TempDir::new().unwrap();
        let name = std::ffi::OsStr::from_bytes(b"caf\xe9.txt");
        fs::write(tmp.path().join(name), "latin1 name").unwrap();

        let block = load_knowledge_base(tmp.path());
        assert!(!block.is_degraded());
        assert!(block.as_str().contains("latin1 name"));
        assert_eq!(block.files(), ["caf\u{FFFD}.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_are_not_followed() {
        let tmp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        write(outside.path(), "secret.txt", "outside");
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            tmp.path().join("link.txt"),
        )
        .unwrap();

        let block = load_knowledge_base(tmp.path());
        assert!(block.files().is_empty());
        assert!(!block.as_str().contains("outside"));
    }
}

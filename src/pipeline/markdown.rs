//! Markdown rendering of extracted sections, and atomic output writes.

use crate::error::Grobid2MdError;
use crate::tei::Section;
use std::path::Path;

/// Render one section as a Markdown heading followed by its content.
///
/// The heading level is `2 + number of dots in the section number`, so the
/// document title level (`#`) is never used by a section.
pub fn render_section(section: &Section) -> String {
    format!(
        "{} {} {}\n\n{}\n\n",
        "#".repeat(section.heading_level()),
        section.number,
        section.title,
        section.content
    )
}

/// Render all sections, in order, into one Markdown document.
pub fn render_markdown(sections: &[Section]) -> String {
    sections.iter().map(render_section).collect()
}

/// Write `contents` to `path` atomically: write a sibling temp file, then
/// rename it over the target. Parent directories are created as needed.
pub async fn write_atomic(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), Grobid2MdError> {
    let write_failed = |source: std::io::Error| Grobid2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp_path, contents).await.map_err(write_failed)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_failed)?;
    Ok(())
}

/// Render `sections` and write them to `path` atomically.
pub async fn write_markdown(path: &Path, sections: &[Section]) -> Result<(), Grobid2MdError> {
    write_atomic(path, render_markdown(sections)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_section_renders_exactly() {
        let md = render_markdown(&[Section::new("1", "Intro", "Hello world")]);
        assert_eq!(md, "## 1 Intro\n\nHello world\n\n");
    }

    #[test]
    fn heading_depth_follows_numbering() {
        let md = render_markdown(&[
            Section::new("2", "Method", "a"),
            Section::new("2.1", "Data", "b"),
            Section::new("2.1.3", "Cleaning", ""),
        ]);
        assert_eq!(
            md,
            "## 2 Method\n\na\n\n### 2.1 Data\n\nb\n\n#### 2.1.3 Cleaning\n\n\n\n"
        );
    }

    #[test]
    fn no_sections_renders_empty_document() {
        assert_eq!(render_markdown(&[]), "");
    }

    #[tokio::test]
    async fn atomic_write_creates_parents_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/paper-sections.md");

        write_markdown(&path, &[Section::new("1", "Intro", "Hello world")])
            .await
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "## 1 Intro\n\nHello world\n\n");
        assert!(!dir.path().join("nested/out/paper-sections.md.tmp").exists());
    }

    #[tokio::test]
    async fn atomic_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        write_atomic(&path, "old").await.unwrap();
        write_atomic(&path, "new").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }
}

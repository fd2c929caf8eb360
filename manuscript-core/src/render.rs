//! Rendering a manuscript to markdown and to a plain outline.

use crate::manuscript::Manuscript;
use crate::metadata::capitalize;
use crate::persist::sanitize;
use crate::toc::{SectionPath, Sections};
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

/// The full document: header, author and publication blocks, then every
/// section in ascending key order at each level.
///
/// Unfinished sections get a ` (draft)` heading suffix followed by their
/// last update time, prompt and summary.
pub fn render_markdown(manuscript: &Manuscript) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", manuscript.full_title()));

    if let Some(author) = manuscript.author() {
        out.push_str("_Author_\n\n");
        out.push_str(&format!("Name: {}\n", author.name));
        for (key, value) in &author.properties {
            out.push_str(&format!("{}: {value}\n", capitalize(key)));
        }
    }
    let publication = manuscript.publication();
    if !publication.is_empty() {
        if manuscript.author().is_some() {
            out.push('\n');
        }
        out.push_str("_Publication_\n\n");
        for (key, value) in publication.iter() {
            out.push_str(&format!("{}: {value}\n", capitalize(key)));
        }
    }
    out.push('\n');

    write_sections(&mut out, manuscript.toc().sections(), &SectionPath::root());
    out
}

fn write_sections(out: &mut String, sections: &Sections, base: &SectionPath) {
    let mut keys: Vec<_> = sections.keys().copied().collect();
    keys.sort_unstable();

    for key in keys {
        let node = &sections[&key];
        let path = base.child(key);
        let draft = if node.is_completed() { "" } else { " (draft)" };

        out.push_str(&format!("{} {path} {}{draft}\n\n", "#".repeat(path.depth()), node.title()));
        out.push_str(&format!("{}\n", node.content()));
        if !node.is_completed() {
            let updated = node.updated().map(|t| t.to_rfc3339()).unwrap_or_default();
            out.push_str(&format!("\n\nUpdated: {updated}\n\n"));
            if let Some(prompt) = node.prompt() {
                out.push_str(&format!("Prompt: {prompt}\n\n"));
            }
            if !node.summary().is_empty() {
                out.push_str(&format!("Summary: {}\n\n", node.summary()));
            }
        }
        write_sections(out, node.children(), &path);
    }
}

/// An indented `- title` tree in traversal order.
///
/// Sections show ` (completed)` when settled: prompted sections by their own
/// flag, headings once everything beneath them is. With `summaries`, each
/// non-empty summary is printed under its title.
pub fn render_outline(manuscript: &Manuscript, summaries: bool) -> String {
    let mut out = String::new();
    for (path, node) in manuscript.toc().iter() {
        let indent = "  ".repeat(path.depth() - 1);
        let marker = if node.is_settled() { " (completed)" } else { "" };
        out.push_str(&format!("{indent}- {}{marker}\n", node.title()));
        if summaries && !node.summary().is_empty() {
            out.push_str(&format!("{indent}  {}\n", node.summary()));
        }
    }
    out
}

/// Write the markdown rendering to `<output_dir>/<title>.md` and return the
/// path written.
pub async fn generate(manuscript: &Manuscript) -> std::io::Result<PathBuf> {
    fs::create_dir_all(manuscript.output_dir()).await?;
    let path = manuscript
        .output_dir()
        .join(format!("{}.md", sanitize(manuscript.title())));
    fs::write(&path, render_markdown(manuscript)).await?;
    info!(path = %path.display(), "manuscript rendered");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_manuscript;
    use crate::{Author, ManuscriptConfig, SectionDraft};

    #[test]
    fn test_markdown_header_blocks() {
        let config = ManuscriptConfig::new("Perceptron")
            .with_subtitle("A History")
            .with_author(Author::new("John Doe").with("email", "john@example.com"))
            .with_publication("publisher", "ABC Publishing");
        let manuscript = Manuscript::new(&config).unwrap();

        let text = render_markdown(&manuscript);
        assert_eq!(
            text,
            "Perceptron: A History\n\n_Author_\n\nName: John Doe\nEmail: john@example.com\n\n\
             _Publication_\n\nPublisher: ABC Publishing\n\n"
        );
    }

    #[test]
    fn test_markdown_sections_sorted_with_drafts() {
        let mut manuscript = sample_manuscript();
        manuscript.set_content(&[2].into(), "The end.", true).unwrap();
        manuscript.set_summary(&[1, 1].into(), "Roots of the idea").unwrap();

        let text = render_markdown(&manuscript);
        assert!(text.contains("# 1. Introduction\n\n\n"));
        assert!(text.contains("## 1.1. Background (draft)\n\n"));
        assert!(text.contains("Prompt: Prompt(directives: {'Instruction': 'Describe the background'}"));
        assert!(text.contains("Summary: Roots of the idea\n\n"));
        assert!(text.contains("# 2. Conclusion\n\nThe end.\n"));

        let intro = text.find("# 1. Introduction").unwrap();
        let conclusion = text.find("# 2. Conclusion").unwrap();
        assert!(intro < conclusion);
    }

    #[test]
    fn test_markdown_orders_keys_numerically() {
        let mut manuscript = Manuscript::new(&ManuscriptConfig::new("Order")).unwrap();
        manuscript.add_section(&[10].into(), SectionDraft::new("Ten")).unwrap();
        manuscript.add_section(&[2].into(), SectionDraft::new("Two")).unwrap();

        let text = render_markdown(&manuscript);
        assert!(text.find("# 2. Two").unwrap() < text.find("# 10. Ten").unwrap());
    }

    #[test]
    fn test_outline_markers() {
        let mut manuscript = sample_manuscript();
        let outline = render_outline(&manuscript, true);
        assert_eq!(
            outline,
            "- Introduction\n  - Background\n  - Scope\n- Conclusion\n"
        );

        manuscript.set_content(&[1, 1].into(), "a", true).unwrap();
        manuscript.set_content(&[1, 2].into(), "b", true).unwrap();
        manuscript.set_summary(&[1, 2].into(), "Scope summary").unwrap();
        let outline = render_outline(&manuscript, true);
        assert_eq!(
            outline,
            "- Introduction (completed)\n  - Background (completed)\n  - Scope (completed)\n    Scope summary\n- Conclusion\n"
        );
    }

    #[tokio::test]
    async fn test_generate_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ManuscriptConfig::new("Generated").with_output_dir(dir.path());
        let manuscript = Manuscript::new(&config).unwrap();

        let path = generate(&manuscript).await.unwrap();
        assert_eq!(path, dir.path().join("Generated.md"));
        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written, render_markdown(&manuscript));
    }
}

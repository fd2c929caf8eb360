//! End-to-end authoring flow: configure, outline, write, index, render.

use manuscript_core::render::{generate, render_markdown, render_outline};
use manuscript_core::{Manuscript, ManuscriptConfig, NextDirectives, SectionPath};
use serde_json::json;
use tempfile::TempDir;

fn path(s: &str) -> SectionPath {
    s.parse().unwrap()
}

fn research_config(dir: &TempDir) -> ManuscriptConfig {
    let mut config = ManuscriptConfig::from_toml_str(
        r#"
        title = "The Perceptron"
        subtitle = "A Short History"
        schema = "research"

        [author]
        name = "John Doe"

        [guidelines]
        Style = "Formal"

        [constraints]
        "Length Constraints" = "500 words"
        "#,
    )
    .expect("valid config");
    config.output_dir = dir.path().to_path_buf();
    config
}

// =============================================================================
// OUTLINE AND WRITING
// =============================================================================

#[tokio::test]
async fn test_research_manuscript_start_to_finish() {
    let temp_dir = TempDir::new().unwrap();
    let mut manuscript = Manuscript::open(&research_config(&temp_dir)).await.unwrap();

    let outline = [
        ("1.", json!({"title": "Origins"})),
        ("1.1.", json!({"title": "Rosenblatt", "prompt": {"directives": {"Instruction": "Introduce Rosenblatt"}}})),
        ("2.", json!({"title": "Legacy", "prompt": {"directives": {"Instruction": "Connect to deep learning"}}})),
    ];
    for (p, value) in outline {
        manuscript.add_section_value(&path(p), value).unwrap();
    }

    // Manuscript-wide guidelines flow into every prompt.
    let step = manuscript.move_to_next_and_get_prompts();
    assert_eq!(step.current_index, path("1."));
    assert!(step.current_prompt.is_none());

    let step = manuscript.move_to_next_and_get_prompts();
    let prompt = step.current_prompt.unwrap();
    assert_eq!(prompt.guidelines["Style"], "Formal");
    assert_eq!(prompt.constraints["Length Constraints"], "500 words");
    match step.next_prompt_directives {
        Some(NextDirectives::Directives(d)) => assert_eq!(d["Instruction"], "Connect to deep learning"),
        other => panic!("expected directives, got {other:?}"),
    }
    manuscript
        .set_content_at_cursor("Frank Rosenblatt built the Mark I.", true)
        .unwrap();
    manuscript.set_summary_at_cursor("Rosenblatt and the Mark I").unwrap();

    manuscript
        .invoke_accessor(
            "add_citation",
            vec![json!("Rosenblatt"), json!({"Year": 1958, "Title": "The Perceptron"})],
        )
        .unwrap();

    let step = manuscript.move_to_next_and_get_prompts();
    assert_eq!(step.current_index, path("2."));
    assert_eq!(step.next_prompt_directives, Some(NextDirectives::End));

    let pending = manuscript.check_complete();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].title, "Legacy");
    assert!(!manuscript.is_completed());

    manuscript.set_content_at_cursor("Its descendants are everywhere.", true).unwrap();
    assert!(manuscript.check_complete().is_empty());
    assert!(manuscript.is_completed());

    // Rendering reflects the finished state.
    let outline = render_outline(&manuscript, true);
    assert_eq!(
        outline,
        "- Origins (completed)\n  - Rosenblatt (completed)\n    Rosenblatt and the Mark I\n- Legacy (completed)\n"
    );
    let markdown = render_markdown(&manuscript);
    assert!(markdown.starts_with("The Perceptron: A Short History\n\n_Author_\n\nName: John Doe\n"));
    assert!(markdown.contains("## 1.1. Rosenblatt\n\nFrank Rosenblatt built the Mark I.\n"));
    assert!(markdown.contains("# 2. Legacy\n\nIts descendants are everywhere.\n"));
    // Headings without a prompt are complete from the moment they are added.
    assert!(markdown.contains("# 1. Origins\n\n"));
    assert!(!markdown.contains("(draft)"));

    let md_path = generate(&manuscript).await.unwrap();
    assert_eq!(md_path, temp_dir.path().join("The Perceptron.md"));

    // And the whole thing comes back from disk.
    manuscript.save().await.unwrap();
    let mut reopened = Manuscript::open(&research_config(&temp_dir)).await.unwrap();
    assert!(reopened.is_completed());
    let citation = reopened
        .invoke_accessor("get_citation", vec![json!("Rosenblatt")])
        .unwrap();
    assert_eq!(citation, Some(json!({"Year": 1958, "Title": "The Perceptron"})));
}

// =============================================================================
// KEYWORD INDEX
// =============================================================================

#[test]
fn test_keyword_index_collects_section_references() {
    let config = ManuscriptConfig::new("Index").with_schema("keyword_index".parse().unwrap());
    let mut manuscript = Manuscript::new(&config).unwrap();

    for (term, section) in [("neuron", "1.1."), ("neuron", "2."), ("weight", "1.1.")] {
        manuscript
            .invoke_accessor("add_keyword", vec![json!(term), json!(section)])
            .unwrap();
    }

    assert_eq!(
        manuscript.invoke_accessor("get_keywords", vec![]).unwrap(),
        Some(json!({"neuron": ["1.1.", "2."], "weight": ["1.1."]}))
    );
    assert_eq!(
        manuscript.invoke_accessor("get_keyword", vec![json!("neuron"), json!(1)]).unwrap(),
        Some(json!("2."))
    );
}

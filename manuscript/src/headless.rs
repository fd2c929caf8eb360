//! Headless line protocol.
//!
//! Lines starting with `#` are commands; any other line is a schema
//! accessor call such as `add_character Alice {"Role": "Hero"}`. Replies are
//! printed one per line with a bracketed tag (`[SECTION]`, `[SAVED]`,
//! `[ERROR]`, ...) so scripts can follow along.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use manuscript_core::render::{generate, render_outline};
use manuscript_core::{Manuscript, NextDirectives, Prompt, SectionDraft, SectionPath};
use serde_json::Value;
use tracing::{debug, warn};

const HELP: &[&str] = &[
    "  #section <path> <title> [| directive]  - Add a section (directive becomes its Instruction)",
    "  #next                - Move to the next section and show its prompt",
    "  #peek                - Show which section comes next",
    "  #goto <path>         - Jump to a section",
    "  #content <text>      - Set the current section's content",
    "  #done                - Mark the current section completed",
    "  #summary <text>      - Set the current section's summary",
    "  #toc                 - Show the outline",
    "  #check               - List sections still to write",
    "  #render              - Write the markdown file",
    "  #save                - Save a snapshot",
    "  #help                - Show this help",
    "  #quit                - Exit",
    "  <accessor> [args..]  - Schema call, e.g. add_scene \"Chapter 1\" {\"Setting\": \"Forest\"}",
];

/// A parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Section {
        path: SectionPath,
        title: String,
        directive: Option<String>,
    },
    Next,
    Peek,
    Goto(SectionPath),
    Content(String),
    Done,
    Summary(String),
    Toc,
    Check,
    Render,
    Save,
    Accessor { name: String, args: Vec<Value> },
    Help,
    Quit,
}

impl Command {
    /// Commands that change the manuscript and so trigger an autosave.
    pub fn is_mutating(&self) -> bool {
        match self {
            Command::Section { .. }
            | Command::Next
            | Command::Goto(_)
            | Command::Content(_)
            | Command::Done
            | Command::Summary(_) => true,
            Command::Accessor { name, .. } => !name.to_lowercase().starts_with("get_"),
            _ => false,
        }
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let Some(body) = line.strip_prefix('#') else {
            let (name, rest) = split_word(line);
            if name.is_empty() {
                return Err("empty input".to_string());
            }
            return Ok(Command::Accessor {
                name: name.to_string(),
                args: parse_args(rest)?,
            });
        };

        let (word, rest) = split_word(body);
        let rest = rest.trim();
        match word {
            "section" => {
                let (path, rest) = split_word(rest);
                let path = path.parse::<SectionPath>().map_err(|e| e.to_string())?;
                let (title, directive) = match rest.split_once('|') {
                    Some((title, directive)) => (title.trim(), Some(directive.trim().to_string())),
                    None => (rest.trim(), None),
                };
                if title.is_empty() {
                    return Err("usage: #section <path> <title> [| directive]".to_string());
                }
                Ok(Command::Section {
                    path,
                    title: title.to_string(),
                    directive: directive.filter(|d| !d.is_empty()),
                })
            }
            "next" => Ok(Command::Next),
            "peek" => Ok(Command::Peek),
            "goto" => rest
                .parse::<SectionPath>()
                .map(Command::Goto)
                .map_err(|e| e.to_string()),
            "content" => Ok(Command::Content(rest.to_string())),
            "done" => Ok(Command::Done),
            "summary" => Ok(Command::Summary(rest.to_string())),
            "toc" => Ok(Command::Toc),
            "check" => Ok(Command::Check),
            "render" => Ok(Command::Render),
            "save" => Ok(Command::Save),
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command '#{other}'. Type #help for help.")),
        }
    }
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], &s[i..]),
        None => (s, ""),
    }
}

/// Split accessor arguments: JSON values where they parse, bare words
/// otherwise. Bare non-negative integers become numbers.
fn parse_args(mut rest: &str) -> Result<Vec<Value>, String> {
    let mut args = Vec::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Ok(args);
        }
        if rest.starts_with(['{', '[', '"']) {
            let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
            match stream.next() {
                Some(Ok(value)) => {
                    let used = stream.byte_offset();
                    args.push(value);
                    rest = &rest[used..];
                }
                Some(Err(e)) => return Err(format!("bad JSON argument: {e}")),
                None => return Ok(args),
            }
        } else {
            let (word, tail) = split_word(rest);
            args.push(match word.parse::<u64>() {
                Ok(n) => Value::from(n),
                Err(_) => Value::String(word.to_string()),
            });
            rest = tail;
        }
    }
}

/// Runs commands against one manuscript.
pub struct Driver {
    manuscript: Manuscript,
    autosave: bool,
}

impl Driver {
    pub fn new(manuscript: Manuscript, autosave: bool) -> Self {
        Self {
            manuscript,
            autosave,
        }
    }

    pub fn manuscript(&self) -> &Manuscript {
        &self.manuscript
    }

    /// Execute one command, returning the reply lines.
    pub async fn execute(&mut self, command: Command) -> anyhow::Result<Vec<String>> {
        let mutating = command.is_mutating();
        let lines = self.apply(command).await?;
        if mutating && self.autosave {
            match self.manuscript.save().await {
                Ok(path) => debug!(path = %path.display(), "autosaved"),
                Err(e) => warn!("autosave failed: {e}"),
            }
        }
        Ok(lines)
    }

    async fn apply(&mut self, command: Command) -> anyhow::Result<Vec<String>> {
        let m = &mut self.manuscript;
        let lines = match command {
            Command::Section {
                path,
                title,
                directive,
            } => {
                let mut draft = SectionDraft::new(title.as_str());
                if let Some(directive) = directive {
                    draft = draft.with_prompt(Prompt::new().with_directive("Instruction", directive));
                }
                m.add_section(&path, draft)?;
                vec![format!("[ADDED] {path} {title}")]
            }
            Command::Next => {
                let step = m.move_to_next_and_get_prompts();
                if step.current_index.is_root() {
                    return Ok(vec!["[EMPTY] The outline has no sections yet.".to_string()]);
                }
                let title = m
                    .section(&step.current_index)
                    .map(|n| n.title().to_string())
                    .unwrap_or_default();
                let mut lines = vec![format!("[SECTION] {} {title}", step.current_index)];
                if let Some(prompt) = &step.current_prompt {
                    lines.push(format!("[PROMPT] {prompt}"));
                }
                match step.next_prompt_directives {
                    Some(NextDirectives::End) => lines.push("[NEXT] (end)".to_string()),
                    Some(NextDirectives::Directives(directives)) => {
                        lines.push(format!("[NEXT] {}", serde_json::to_string(&directives)?))
                    }
                    None => {}
                }
                lines
            }
            Command::Peek => {
                let next = m.find_next();
                match m.section(&next) {
                    Some(node) => vec![format!("[PEEK] {next} {}", node.title())],
                    None => vec!["[PEEK] (empty outline)".to_string()],
                }
            }
            Command::Goto(path) => {
                m.set_cursor(path.clone())?;
                vec![format!("[CURSOR] {path}")]
            }
            Command::Content(text) => {
                let path = m.current_path().clone();
                m.set_content_at_cursor(text, false)?;
                vec![format!("[CONTENT] {path}")]
            }
            Command::Done => {
                let path = m.current_path().clone();
                m.set_completed_at_cursor(true)?;
                vec![format!("[DONE] {path}")]
            }
            Command::Summary(text) => {
                let path = m.current_path().clone();
                m.set_summary_at_cursor(text)?;
                vec![format!("[SUMMARY] {path}")]
            }
            Command::Toc => {
                let mut lines = vec!["[TOC]".to_string()];
                lines.extend(render_outline(m, false).lines().map(str::to_string));
                lines
            }
            Command::Check => {
                let incomplete = m.check_complete();
                if incomplete.is_empty() {
                    vec!["[CHECK] All sections are complete.".to_string()]
                } else {
                    let mut lines = vec![format!("[CHECK] {} incomplete", incomplete.len())];
                    lines.extend(incomplete.iter().map(|s| format!("  {} {}", s.path, s.title)));
                    lines
                }
            }
            Command::Render => {
                let path = generate(m).await?;
                vec![format!("[RENDERED] {}", path.display())]
            }
            Command::Save => {
                let path = m.save().await?;
                vec![format!("[SAVED] {}", path.display())]
            }
            Command::Accessor { name, args } => match m.invoke_accessor(&name, args)? {
                Some(value) => vec![format!("[RESULT] {value}")],
                None => vec!["[OK]".to_string()],
            },
            Command::Help => {
                let mut lines = vec!["[HELP]".to_string()];
                lines.extend(HELP.iter().map(|l| l.to_string()));
                lines
            }
            Command::Quit => vec!["Goodbye!".to_string()],
        };
        Ok(lines)
    }
}

/// Run the protocol over stdin/stdout until `#quit` or end of input.
pub async fn run_headless(manuscript: Manuscript, autosave: bool) -> anyhow::Result<()> {
    println!("=== Manuscript: {} ===", manuscript.full_title());
    println!("Sections: {}", manuscript.toc().len());
    println!("Autosave: {}", if autosave { "on" } else { "off" });
    println!("Type #help for commands.");
    println!();

    let mut driver = Driver::new(manuscript, autosave);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(c) => c,
            Err(e) => {
                println!("[ERROR] {e}");
                stdout.flush().ok();
                continue;
            }
        };
        let quit = command == Command::Quit;

        match driver.execute(command).await {
            Ok(lines) => {
                for l in lines {
                    println!("{l}");
                }
            }
            Err(e) => println!("[ERROR] {e}"),
        }
        stdout.flush().ok();

        if quit {
            break;
        }
    }

    Ok(())
}

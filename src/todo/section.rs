//! Locating the checklist section of a note.
//!
//! A section is the configured heading line plus every line up to (not
//! including) the next ATX heading of the same or a shallower level.

use crate::error::VaultError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Level and label of an ATX heading line, e.g. `## To do` -> `(2, "To do")`.
fn atx_heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_end();
    let level = trimmed.bytes().take_while(|b| *b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some((level, rest.trim()))
}

fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: usize,
    pub label: String,
}

impl Heading {
    pub fn parse(raw: &str) -> Option<Self> {
        let (level, label) = atx_heading(raw.trim())?;
        if label.is_empty() {
            return None;
        }
        Some(Self {
            level,
            label: label.to_string(),
        })
    }

    /// Same level, label equal ignoring case and whitespace runs.
    pub fn matches(&self, line: &str) -> bool {
        match atx_heading(line) {
            Some((level, label)) => {
                level == self.level && normalize_label(label) == normalize_label(&self.label)
            }
            None => false,
        }
    }

    fn closes(&self, line: &str) -> bool {
        matches!(atx_heading(line), Some((level, _)) if level <= self.level)
    }

    pub fn render(&self) -> String {
        format!("{} {}", "#".repeat(self.level), self.label)
    }
}

/// Lines of a note without terminators, plus what is needed to write it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteLines {
    pub lines: Vec<String>,
    pub ending: LineEnding,
    pub final_newline: bool,
}

impl NoteLines {
    pub fn parse(content: &str) -> Self {
        let ending = if content.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        };
        if content.is_empty() {
            return Self {
                lines: Vec::new(),
                ending,
                final_newline: false,
            };
        }

        let final_newline = content.ends_with('\n');
        let body = content.strip_suffix('\n').unwrap_or(content);
        let lines = body
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        Self {
            lines,
            ending,
            final_newline,
        }
    }

    pub fn join(lines: &[String], ending: LineEnding, final_newline: bool) -> String {
        let mut out = lines.join(ending.as_str());
        if final_newline && !lines.is_empty() {
            out.push_str(ending.as_str());
        }
        out
    }
}

/// A note split around its checklist section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSections {
    pub prefix: Vec<String>,
    pub heading: String,
    pub body: Vec<String>,
    pub suffix: Vec<String>,
    pub ending: LineEnding,
    pub final_newline: bool,
}

impl NoteSections {
    pub fn render(&self) -> String {
        let mut lines =
            Vec::with_capacity(self.prefix.len() + 1 + self.body.len() + self.suffix.len());
        lines.extend(self.prefix.iter().cloned());
        lines.push(self.heading.clone());
        lines.extend(self.body.iter().cloned());
        lines.extend(self.suffix.iter().cloned());
        NoteLines::join(&lines, self.ending, self.final_newline)
    }

    /// The section text alone, heading included.
    pub fn render_section(&self) -> String {
        let mut lines = vec![self.heading.clone()];
        lines.extend(self.body.iter().cloned());
        NoteLines::join(&lines, self.ending, true)
    }

    /// `content` with a fresh, empty section appended after a blank separator.
    pub fn appended_to(content: &str, heading: &Heading) -> Self {
        let parsed = NoteLines::parse(content);
        let mut prefix = parsed.lines;
        if prefix.last().is_some_and(|line| !line.trim().is_empty()) {
            prefix.push(String::new());
        }
        Self {
            prefix,
            heading: heading.render(),
            body: Vec::new(),
            suffix: Vec::new(),
            ending: parsed.ending,
            final_newline: true,
        }
    }
}

pub fn extract_section(content: &str, heading: &Heading) -> Result<NoteSections, VaultError> {
    let NoteLines {
        lines,
        ending,
        final_newline,
    } = NoteLines::parse(content);

    let Some(start) = lines.iter().position(|line| heading.matches(line)) else {
        return Err(VaultError::SectionNotFound {
            heading: heading.render(),
        });
    };
    let end = lines[start + 1..]
        .iter()
        .position(|line| heading.closes(line))
        .map(|offset| start + 1 + offset)
        .unwrap_or(lines.len());

    let mut lines = lines;
    let suffix = lines.split_off(end);
    let body = lines.split_off(start + 1);
    let heading_line = lines.pop().unwrap_or_default();
    Ok(NoteSections {
        prefix: lines,
        heading: heading_line,
        body,
        suffix,
        ending,
        final_newline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo_heading() -> Heading {
        Heading::parse("## To do").expect("heading")
    }

    #[test]
    fn heading_parse_and_match_is_lenient_on_case_and_spacing() {
        let heading = todo_heading();
        assert_eq!(heading.level, 2);
        assert!(heading.matches("## To do"));
        assert!(heading.matches("##   to   DO  "));
        assert!(!heading.matches("### To do"));
        assert!(!heading.matches("##To do"));
        assert!(!heading.matches("## To do list"));
        assert!(Heading::parse("To do").is_none());
        assert!(Heading::parse("##").is_none());
    }

    #[test]
    fn section_stops_at_equal_or_shallower_heading() {
        let note = "# 2025-08-01\n\n## To do\n- [ ] a\n### Detail\n- [ ] b\n## Notes\ntext\n";
        let sections = extract_section(note, &todo_heading()).expect("section");

        assert_eq!(sections.prefix, vec!["# 2025-08-01", ""]);
        assert_eq!(sections.heading, "## To do");
        assert_eq!(sections.body, vec!["- [ ] a", "### Detail", "- [ ] b"]);
        assert_eq!(sections.suffix, vec!["## Notes", "text"]);
        assert_eq!(sections.render(), note);
    }

    #[test]
    fn section_runs_to_end_of_file_without_final_newline() {
        let note = "## To do\n- [x] done";
        let sections = extract_section(note, &todo_heading()).expect("section");
        assert_eq!(sections.body, vec!["- [x] done"]);
        assert!(sections.suffix.is_empty());
        assert_eq!(sections.render(), note);
    }

    #[test]
    fn crlf_notes_round_trip() {
        let note = "## To do\r\n- [ ] a\r\n\r\n## Notes\r\n";
        let sections = extract_section(note, &todo_heading()).expect("section");
        assert_eq!(sections.ending, LineEnding::CrLf);
        assert_eq!(sections.body, vec!["- [ ] a", ""]);
        assert_eq!(sections.render(), note);
    }

    #[test]
    fn missing_heading_is_reported() {
        let err = extract_section("# 2025-08-01\n\n## Notes\n", &todo_heading())
            .expect_err("no section");
        assert!(matches!(err, VaultError::SectionNotFound { .. }));
    }

    #[test]
    fn appended_section_separates_with_blank_line() {
        let sections = NoteSections::appended_to("# 2025-08-02\nSome text\n", &todo_heading());
        assert_eq!(
            sections.render(),
            "# 2025-08-02\nSome text\n\n## To do\n"
        );

        let sections = NoteSections::appended_to("", &todo_heading());
        assert_eq!(sections.render(), "## To do\n");
    }
}

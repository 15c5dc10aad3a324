//! Checklist lines to an explicit forest.
//!
//! Indentation is the only hierarchy signal. Raw indentation width is divided
//! by the smallest non-zero width seen in the section; a node's parent is the
//! nearest preceding node with a strictly smaller raw level, and its depth is
//! always `parent.depth + 1` regardless of how far the raw level jumped.

use once_cell::sync::Lazy;
use regex::Regex;

/// Columns a tab counts for when comparing mixed indentation.
pub const TAB_WIDTH: usize = 4;

static ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([ \t]*)- \[([ xX])\](?: (.*))?$").expect("valid checklist item regex")
});
static MALFORMED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*[-*+][ \t]*\[[^\]]?\]").expect("valid malformed item regex"));
static PROVENANCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?)\s*\(from (\d{4}-\d{2}-\d{2})\)\s*$").expect("valid provenance regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentUnit {
    Spaces(usize),
    Tab,
}

impl IndentUnit {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim_matches(' ');
        if trimmed.eq_ignore_ascii_case("tab") || trimmed == "\t" {
            return Some(Self::Tab);
        }
        match trimmed.parse::<usize>() {
            Ok(n) if (1..=8).contains(&n) => Some(Self::Spaces(n)),
            _ => None,
        }
    }

    pub fn width(self) -> usize {
        match self {
            Self::Spaces(n) => n,
            Self::Tab => TAB_WIDTH,
        }
    }

    pub fn repeat(self, depth: usize) -> String {
        match self {
            Self::Spaces(n) => " ".repeat(n * depth),
            Self::Tab => "\t".repeat(depth),
        }
    }

    fn from_whitespace(ws: &str) -> Self {
        if !ws.is_empty() && ws.chars().all(|c| c == '\t') {
            Self::Tab
        } else {
            Self::Spaces(indent_width(ws))
        }
    }
}

impl std::fmt::Display for IndentUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spaces(n) => write!(f, "{n} spaces"),
            Self::Tab => f.write_str("tab"),
        }
    }
}

fn indent_width(ws: &str) -> usize {
    ws.chars()
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistNode {
    pub text: String,
    pub checked: bool,
    /// Character between the brackets as written (` `, `x` or `X`).
    pub marker: char,
    pub depth: usize,
    pub provenance: Option<String>,
    pub children: Vec<ChecklistNode>,
    /// Non-checklist lines between this item and the next one, kept verbatim.
    /// They belong to the section, not the item, and never migrate with it.
    pub attached: Vec<String>,
}

impl ChecklistNode {
    pub fn new(text: impl Into<String>, checked: bool) -> Self {
        Self {
            text: text.into(),
            checked,
            marker: if checked { 'x' } else { ' ' },
            depth: 0,
            provenance: None,
            children: Vec::new(),
            attached: Vec::new(),
        }
    }

    pub fn with_child(mut self, mut child: ChecklistNode) -> Self {
        child.set_depth(self.depth + 1);
        self.children.push(child);
        self
    }

    fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
        for child in &mut self.children {
            child.set_depth(depth + 1);
        }
    }

    /// True when this node and every descendant are checked.
    pub fn all_checked(&self) -> bool {
        self.checked && self.children.iter().all(ChecklistNode::all_checked)
    }

    /// Nodes in this subtree, this one included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ChecklistNode::count).sum::<usize>()
    }

    pub fn for_each_mut(&mut self, f: &mut impl FnMut(&mut ChecklistNode)) {
        f(self);
        for child in &mut self.children {
            child.for_each_mut(f);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecklistForest {
    pub leading: Vec<String>,
    pub trees: Vec<ChecklistNode>,
    pub trailing: Vec<String>,
    /// Unit observed in the section, `None` when nothing was indented.
    pub indent: Option<IndentUnit>,
    /// Lines that looked like checklist items but did not parse.
    pub malformed: Vec<String>,
}

impl ChecklistForest {
    pub fn item_count(&self) -> usize {
        self.trees.iter().map(ChecklistNode::count).sum()
    }
}

enum ParsedLine {
    Item {
        indent: String,
        checked: bool,
        marker: char,
        text: String,
    },
    Malformed(String),
    Other,
}

fn parse_line(line: &str) -> ParsedLine {
    if let Some(caps) = ITEM_RE.captures(line) {
        let marker = caps
            .get(2)
            .and_then(|m| m.as_str().chars().next())
            .unwrap_or(' ');
        return ParsedLine::Item {
            indent: caps.get(1).map(|m| m.as_str()).unwrap_or("").to_string(),
            checked: marker != ' ',
            marker,
            text: caps.get(3).map(|m| m.as_str()).unwrap_or("").to_string(),
        };
    }
    if MALFORMED_RE.is_match(line) {
        let after_bullet = line.trim_start().get(1..).unwrap_or("").trim();
        return ParsedLine::Malformed(after_bullet.to_string());
    }
    ParsedLine::Other
}

/// Splits a trailing `(from YYYY-MM-DD)` off the item text.
pub fn split_provenance(text: &str) -> (String, Option<String>) {
    match PROVENANCE_RE.captures(text) {
        Some(caps) => (
            caps.get(1).map(|m| m.as_str()).unwrap_or("").to_string(),
            caps.get(2).map(|m| m.as_str().to_string()),
        ),
        None => (text.to_string(), None),
    }
}

fn detect_unit(lines: &[String]) -> Option<IndentUnit> {
    lines
        .iter()
        .filter_map(|line| match parse_line(line) {
            ParsedLine::Item { indent, .. } if indent_width(&indent) > 0 => Some(indent),
            _ => None,
        })
        .min_by_key(|indent| indent_width(indent))
        .map(|indent| IndentUnit::from_whitespace(&indent))
}

fn attach(stack: &mut Vec<(usize, ChecklistNode)>, trees: &mut Vec<ChecklistNode>) {
    if let Some((_, node)) = stack.pop() {
        match stack.last_mut() {
            Some((_, parent)) => parent.children.push(node),
            None => trees.push(node),
        }
    }
}

pub fn build_forest(lines: &[String]) -> ChecklistForest {
    let indent = detect_unit(lines);
    let unit_width = indent.map(IndentUnit::width).unwrap_or(1).max(1);

    let last_item = lines
        .iter()
        .rposition(|line| !matches!(parse_line(line), ParsedLine::Other));
    let trailing_start = match last_item {
        Some(idx) => lines[idx + 1..]
            .iter()
            .rposition(|line| !line.trim().is_empty())
            .map(|offset| idx + 1 + offset + 1)
            .unwrap_or(idx + 1),
        None => lines
            .iter()
            .rposition(|line| !line.trim().is_empty())
            .map(|idx| idx + 1)
            .unwrap_or(0),
    };

    let mut forest = ChecklistForest {
        indent,
        trailing: lines[trailing_start..].to_vec(),
        ..ChecklistForest::default()
    };
    let mut stack: Vec<(usize, ChecklistNode)> = Vec::new();

    for line in &lines[..trailing_start] {
        let (level, mut node) = match parse_line(line) {
            ParsedLine::Item {
                indent,
                checked,
                marker,
                text,
            } => {
                let mut node = ChecklistNode::new(text, checked);
                node.marker = marker;
                (indent_width(&indent) / unit_width, node)
            }
            ParsedLine::Malformed(text) => {
                forest.malformed.push(line.clone());
                (0, ChecklistNode::new(text, false))
            }
            ParsedLine::Other => {
                match stack.last_mut() {
                    Some((_, node)) => node.attached.push(line.clone()),
                    None => forest.leading.push(line.clone()),
                }
                continue;
            }
        };

        while stack.last().is_some_and(|(top, _)| *top >= level) {
            attach(&mut stack, &mut forest.trees);
        }
        let (text, provenance) = split_provenance(&node.text);
        node.text = text;
        node.provenance = provenance;
        node.depth = stack.len();
        stack.push((level, node));
    }
    while !stack.is_empty() {
        attach(&mut stack, &mut forest.trees);
    }

    forest
}

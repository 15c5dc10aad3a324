use crate::todo::hierarchy::{ChecklistForest, ChecklistNode, IndentUnit};

pub fn render_item(node: &ChecklistNode, unit: IndentUnit) -> String {
    let marker = match (node.checked, node.marker) {
        (false, _) => ' ',
        (true, m @ ('x' | 'X')) => m,
        (true, _) => 'x',
    };
    let mut line = format!("{}- [{marker}]", unit.repeat(node.depth));
    let tail = match (&node.provenance, node.text.is_empty()) {
        (Some(date), true) => format!("(from {date})"),
        (Some(date), false) => format!("{} (from {date})", node.text),
        (None, _) => node.text.clone(),
    };
    if !tail.is_empty() {
        line.push(' ');
        line.push_str(&tail);
    }
    line
}

fn render_node(node: &ChecklistNode, unit: IndentUnit, out: &mut Vec<String>) {
    out.push(render_item(node, unit));
    out.extend(node.attached.iter().cloned());
    for child in &node.children {
        render_node(child, unit, out);
    }
}

/// Groups only, depth-first in sibling order.
pub fn render_groups(groups: &[ChecklistNode], unit: IndentUnit) -> Vec<String> {
    let mut out = Vec::new();
    for group in groups {
        render_node(group, unit, &mut out);
    }
    out
}

/// Whole section body: leading lines, groups, trailing blank lines.
///
/// Uses the unit detected on read, `fallback` when the section had no nesting.
pub fn render_forest(forest: &ChecklistForest, fallback: IndentUnit) -> Vec<String> {
    let unit = forest.indent.unwrap_or(fallback);
    let mut out = forest.leading.clone();
    out.extend(render_groups(&forest.trees, unit));
    out.extend(forest.trailing.iter().cloned());
    out
}

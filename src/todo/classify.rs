use crate::todo::hierarchy::{ChecklistForest, ChecklistNode};

/// Whether a top-level group moves: any unchecked node anywhere in it decides.
pub fn should_migrate(group: &ChecklistNode) -> bool {
    !group.all_checked()
}

/// Moves every attached line out of a subtree, in render order.
fn detach_lines(node: &mut ChecklistNode, out: &mut Vec<String>) {
    out.append(&mut node.attached);
    for child in &mut node.children {
        detach_lines(child, out);
    }
}

/// The node rendered last in a group, whose attached lines close the group.
fn last_rendered(node: &mut ChecklistNode) -> &mut ChecklistNode {
    if node.children.is_empty() {
        node
    } else {
        let last = node.children.len() - 1;
        last_rendered(&mut node.children[last])
    }
}

/// Splits the forest's groups into `(migrating, remaining)`, both in source order.
///
/// Only checklist nodes migrate. Non-checklist lines inside a migrating group
/// stay in `remaining` where the group used to be: after the preceding kept
/// group, or in `leading` when no group is kept before it. `remaining` also
/// keeps the forest's trailing lines and its indent unit.
pub fn classify(forest: ChecklistForest) -> (Vec<ChecklistNode>, ChecklistForest) {
    let ChecklistForest {
        mut leading,
        trees,
        trailing,
        indent,
        malformed,
    } = forest;

    let mut migrating = Vec::new();
    let mut kept: Vec<ChecklistNode> = Vec::new();
    for mut group in trees {
        if !should_migrate(&group) {
            kept.push(group);
            continue;
        }
        let mut stays = Vec::new();
        detach_lines(&mut group, &mut stays);
        match kept.last_mut() {
            Some(previous) => last_rendered(previous).attached.append(&mut stays),
            None => leading.append(&mut stays),
        }
        migrating.push(group);
    }

    let remaining = ChecklistForest {
        leading,
        trees: kept,
        trailing,
        indent,
        malformed,
    };
    (migrating, remaining)
}

use crate::todo::hierarchy::ChecklistNode;

/// Tags every unchecked, untagged node with the source note's date.
///
/// Returns how many nodes were tagged. Checked nodes and nodes that already
/// carry a date keep their text exactly, so the first origin survives later hops.
pub fn tag_groups(groups: &mut [ChecklistNode], source_date: &str) -> usize {
    let mut tagged = 0usize;
    for group in groups.iter_mut() {
        group.for_each_mut(&mut |node| {
            if !node.checked && node.provenance.is_none() {
                node.provenance = Some(source_date.to_string());
                tagged += 1;
            }
        });
    }
    tagged
}

use std::collections::BTreeMap;

use crate::ir::Forest;

/// Recomputes the hidden set from scratch: every node starts visible, then
/// each collapsed primary hides its whole descendant cone (children, their
/// spouses, recursively). The collapsed node itself and its own spouses
/// stay visible. Running this twice on an unchanged forest yields the same
/// mapping.
pub fn resolve_visibility(forest: &Forest) -> BTreeMap<String, bool> {
    let mut hidden: BTreeMap<String, bool> = forest
        .persons
        .keys()
        .map(|id| (id.clone(), false))
        .collect();
    for (id, person) in &forest.persons {
        if person.collapsed() && !person.children().is_empty() {
            hide_descendants(forest, id, &mut hidden);
        }
    }
    hidden
}

fn hide_descendants(forest: &Forest, parent_id: &str, hidden: &mut BTreeMap<String, bool>) {
    for child_id in forest.children_of(parent_id) {
        // An already-hidden child means its whole subtree is hidden; no
        // need to descend again. This also bounds traversal on cyclic input.
        if hidden.get(child_id).copied().unwrap_or(false) {
            continue;
        }
        hidden.insert(child_id.clone(), true);
        for spouse_id in forest.spouses_of(child_id) {
            hidden.insert(spouse_id.clone(), true);
        }
        hide_descendants(forest, child_id, hidden);
    }
}

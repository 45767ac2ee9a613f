use std::collections::{BTreeMap, HashSet};

use crate::config::LayoutConfig;
use crate::ir::Forest;

use super::{TreeIndex, is_hidden, visible_spouse_count, visible_spouses};

/// Centering correction. The assigner leaves every generation left-packed;
/// this pass walks parents shallowest-generation first and lines each
/// parent block (card plus spouses) up with its child block. When the
/// parent block is the wider one, the children shift right inside the
/// parent's reserved slot; when the child block is wider, the parent block
/// slides right over it instead, so the children never leave their slot and
/// never collide with a neighbouring subtree. Offsets applied to children
/// move their entire descendant cones, never just the direct children, so
/// alignment established deeper in the tree survives. Running shallow-first
/// means a subtree is only shifted after its own position is final.
///
/// An only child follows a tighter rule: its card is pinned directly under
/// the parent's card so the single connector drop is vertical.
pub(super) fn center_subtrees(
    forest: &Forest,
    index: &TreeIndex,
    hidden: &BTreeMap<String, bool>,
    positions: &mut BTreeMap<String, (f32, f32)>,
    config: &LayoutConfig,
) {
    for ids in index.generations.values() {
        for id in ids {
            let children: Vec<String> = forest
                .children_of(id)
                .iter()
                .filter(|child_id| !is_hidden(hidden, child_id))
                .cloned()
                .collect();
            if children.is_empty() {
                continue;
            }
            let Some(&(parent_x, _)) = positions.get(id) else {
                continue;
            };

            if let [only] = children.as_slice() {
                if let Some(&(child_x, _)) = positions.get(only) {
                    let residual = parent_x - child_x;
                    if residual != 0.0 {
                        shift_subtree(forest, hidden, positions, only, residual);
                    }
                }
                continue;
            }

            let mut parent_right = parent_x + config.card_width;
            for spouse_id in visible_spouses(forest, hidden, id) {
                if let Some(&(spouse_x, _)) = positions.get(spouse_id) {
                    parent_right = parent_right.max(spouse_x + config.card_width);
                }
            }
            let parent_center = (parent_x + parent_right) / 2.0;

            let mut left_edge = f32::MAX;
            let mut right_edge = f32::MIN;
            for child_id in &children {
                let Some(&(child_x, _)) = positions.get(child_id) else {
                    continue;
                };
                let spouse_span =
                    visible_spouse_count(forest, hidden, child_id) as f32 * config.spouse_spacing;
                left_edge = left_edge.min(child_x);
                right_edge = right_edge.max(child_x + config.card_width + spouse_span);
            }
            if left_edge > right_edge {
                continue;
            }

            let offset = parent_center - (left_edge + right_edge) / 2.0;
            if offset > 0.0 {
                for child_id in &children {
                    shift_subtree(forest, hidden, positions, child_id, offset);
                }
            } else if offset < 0.0 {
                // Child block is wider than the parent block: move the
                // parent over the children rather than dragging the block
                // out of its reserved slot.
                if let Some(pos) = positions.get_mut(id) {
                    pos.0 -= offset;
                }
                let spouse_ids: Vec<String> =
                    visible_spouses(forest, hidden, id).cloned().collect();
                for spouse_id in spouse_ids {
                    if let Some(pos) = positions.get_mut(&spouse_id) {
                        pos.0 -= offset;
                    }
                }
            }
        }
    }
}

/// Shifts a node, its visible spouses, and every visible descendant by
/// `dx`. Iterative with a visited set: a revisit means cyclic input, and
/// the walk just stops instead of looping.
fn shift_subtree(
    forest: &Forest,
    hidden: &BTreeMap<String, bool>,
    positions: &mut BTreeMap<String, (f32, f32)>,
    root: &str,
    dx: f32,
) {
    let mut stack = vec![root.to_string()];
    let mut visited: HashSet<String> = HashSet::new();
    while let Some(id) = stack.pop() {
        if !visited.insert(id.clone()) {
            continue;
        }
        if let Some(pos) = positions.get_mut(&id) {
            pos.0 += dx;
        }
        for spouse_id in forest.spouses_of(&id) {
            if !is_hidden(hidden, spouse_id)
                && let Some(pos) = positions.get_mut(spouse_id)
            {
                pos.0 += dx;
            }
        }
        for child_id in forest.children_of(&id) {
            if !is_hidden(hidden, child_id) {
                stack.push(child_id.clone());
            }
        }
    }
}

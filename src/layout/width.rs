use std::collections::{BTreeMap, HashMap};

use crate::config::LayoutConfig;
use crate::ir::Forest;

use super::{TreeIndex, is_hidden, visible_spouse_count};

/// Bottom-up space accounting: the horizontal span each visible primary
/// subtree needs so no sibling subtree can overlap it. Deepest generation
/// first, so child widths are always settled before their parents read
/// them. Hidden nodes contribute nothing; a node whose children are not
/// materialized yet (`has_more_children`) is childless here.
pub(super) fn compute_widths(
    forest: &Forest,
    index: &TreeIndex,
    hidden: &BTreeMap<String, bool>,
    config: &LayoutConfig,
) -> HashMap<String, f32> {
    let mut required: HashMap<String, f32> = HashMap::new();
    for ids in index.generations.values().rev() {
        for id in ids {
            let spouse_span =
                visible_spouse_count(forest, hidden, id) as f32 * config.spouse_spacing;
            let base_width = config.card_width + spouse_span;
            let children: Vec<&String> = forest
                .children_of(id)
                .iter()
                .filter(|child_id| !is_hidden(hidden, child_id))
                .collect();
            let width = if children.is_empty() {
                base_width
            } else {
                let span: f32 = children
                    .iter()
                    .map(|child_id| {
                        required
                            .get(child_id.as_str())
                            .copied()
                            .unwrap_or(config.card_width)
                    })
                    .sum();
                let gaps = (children.len() - 1) as f32 * config.horizontal_spacing;
                base_width.max(span + gaps)
            };
            required.insert(id.clone(), width);
        }
    }
    required
}

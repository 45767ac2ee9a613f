use std::collections::{BTreeMap, HashMap};

use crate::config::LayoutConfig;
use crate::ir::Forest;

use super::{TreeIndex, visible_spouses};

/// Top-down placement: generations shallowest first, one left-to-right
/// cursor per generation. Each primary gets exactly its required width
/// reserved, so deep subtrees never run into the next sibling. Spouses go
/// immediately to the right of their partner on the same row.
pub(super) fn assign_positions(
    forest: &Forest,
    index: &TreeIndex,
    hidden: &BTreeMap<String, bool>,
    widths: &HashMap<String, f32>,
    config: &LayoutConfig,
) -> BTreeMap<String, (f32, f32)> {
    let mut positions: BTreeMap<String, (f32, f32)> = BTreeMap::new();
    let Some(min_gen) = index.generations.keys().next().copied() else {
        return positions;
    };
    for (&generation, ids) in &index.generations {
        let mut cursor = config.left_margin();
        let y = (generation - min_gen) as f32 * config.vertical_spacing + config.top_margin;
        for id in ids {
            positions.insert(id.clone(), (cursor, y));
            let mut last_x = cursor;
            for spouse_id in visible_spouses(forest, hidden, id) {
                last_x += config.spouse_spacing;
                positions.insert(spouse_id.clone(), (last_x, y));
            }
            let reserved = widths.get(id).copied().unwrap_or(config.card_width);
            cursor += reserved + config.horizontal_spacing;
        }
    }
    positions
}

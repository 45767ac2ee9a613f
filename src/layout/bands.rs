use std::collections::BTreeMap;

use crate::config::LayoutConfig;

use super::{GenerationBand, TreeIndex};

/// One band per generation that still has visible nodes. A band starts at
/// the generation's card tops and runs down to the next non-empty
/// generation's card tops, so consecutive bands tile the canvas; the
/// deepest band just wraps its card row plus a bottom margin.
pub(super) fn compute_bands(
    index: &TreeIndex,
    positions: &BTreeMap<String, (f32, f32)>,
    config: &LayoutConfig,
) -> Vec<GenerationBand> {
    let mut tops: Vec<(i32, f32)> = Vec::new();
    for (&generation, ids) in &index.generations {
        let top = ids
            .iter()
            .filter_map(|id| positions.get(id).map(|&(_, y)| y))
            .fold(f32::MAX, f32::min);
        if top < f32::MAX {
            tops.push((generation, top));
        }
    }

    let mut bands = Vec::with_capacity(tops.len());
    for (idx, &(generation, top_y)) in tops.iter().enumerate() {
        let height = match tops.get(idx + 1) {
            Some(&(_, next_top)) => next_top - top_y,
            None => config.card_height + config.band_bottom_margin,
        };
        bands.push(GenerationBand {
            generation,
            top_y,
            height,
        });
    }
    bands
}

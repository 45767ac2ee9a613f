mod bands;
mod center;
mod connectors;
mod position;
pub(crate) mod types;
mod visibility;
mod width;

pub use types::*;
pub use visibility::resolve_visibility;

use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::config::LayoutConfig;
use crate::ir::{Forest, Position, TreeError};

/// Per-run traversal index: visible primaries bucketed by generation, each
/// bucket in the order the parents were visited, roots first. Spouses never
/// appear here; they ride along with their partner in every stage.
pub(crate) struct TreeIndex {
    pub(crate) generations: BTreeMap<i32, Vec<String>>,
}

impl TreeIndex {
    pub(crate) fn build(
        forest: &Forest,
        hidden: &BTreeMap<String, bool>,
    ) -> Result<Self, TreeError> {
        let mut generations: BTreeMap<i32, Vec<String>> = BTreeMap::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        for root_id in &forest.roots {
            if forest.is_primary(root_id) && !is_hidden(hidden, root_id) {
                queue.push_back(root_id.clone());
            }
        }
        while let Some(id) = queue.pop_front() {
            if !visited.insert(id.clone()) {
                // Reachable twice: the input is not a tree.
                return Err(TreeError::CycleDetected(id));
            }
            let Some(person) = forest.find_by_id(&id) else {
                continue;
            };
            generations
                .entry(person.generation)
                .or_default()
                .push(id.clone());
            for child_id in person.children() {
                if forest.persons.contains_key(child_id) && !is_hidden(hidden, child_id) {
                    queue.push_back(child_id.clone());
                }
            }
        }
        Ok(Self { generations })
    }
}

pub(crate) fn is_hidden(hidden: &BTreeMap<String, bool>, id: &str) -> bool {
    hidden.get(id).copied().unwrap_or(false)
}

pub(crate) fn visible_spouses<'a>(
    forest: &'a Forest,
    hidden: &'a BTreeMap<String, bool>,
    id: &str,
) -> impl Iterator<Item = &'a String> {
    forest
        .spouses_of(id)
        .iter()
        .filter(|spouse_id| !is_hidden(hidden, spouse_id))
}

pub(crate) fn visible_spouse_count(
    forest: &Forest,
    hidden: &BTreeMap<String, bool>,
    id: &str,
) -> usize {
    visible_spouses(forest, hidden, id).count()
}

/// Runs the whole pipeline over the forest: visibility, bottom-up widths,
/// top-down placement, centering correction, generation bands, connector
/// geometry. Positions and `hidden_by_collapse` are written back into the
/// forest (the engine is their only writer); the returned snapshot is what
/// renderers consume. Synchronous, no partial state observable.
pub fn compute_layout(
    forest: &mut Forest,
    config: &LayoutConfig,
) -> Result<LayoutResult, TreeError> {
    if forest.is_empty() {
        return Ok(LayoutResult::empty());
    }

    let hidden = resolve_visibility(forest);
    let index = TreeIndex::build(forest, &hidden)?;
    let widths = width::compute_widths(forest, &index, &hidden, config);
    let mut positions = position::assign_positions(forest, &index, &hidden, &widths, config);
    center::center_subtrees(forest, &index, &hidden, &mut positions, config);

    // In forests whose roots span generations a pin can drag a subtree left
    // of the margin; slide the whole canvas back onto it.
    let min_x = positions.values().map(|pos| pos.0).fold(f32::MAX, f32::min);
    if min_x < f32::MAX && min_x < config.left_margin() {
        let dx = config.left_margin() - min_x;
        for pos in positions.values_mut() {
            pos.0 += dx;
        }
    }
    for pos in positions.values_mut() {
        pos.0 = pos.0.round();
        pos.1 = pos.1.round();
    }

    let bands = bands::compute_bands(&index, &positions, config);
    let connectors = connectors::compute_connectors(forest, &index, &hidden, &positions, config);

    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for (id, person) in forest.persons.iter_mut() {
        person.hidden_by_collapse = is_hidden(&hidden, id);
        if let Some(&(x, y)) = positions.get(id) {
            person.position = Position { x, y };
            if !person.hidden_by_collapse {
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
    }

    let nodes: BTreeMap<String, NodeLayout> = forest
        .persons
        .iter()
        .map(|(id, person)| {
            (
                id.clone(),
                NodeLayout {
                    id: id.clone(),
                    x: person.position.x,
                    y: person.position.y,
                    generation: person.generation,
                    hidden: person.hidden_by_collapse,
                },
            )
        })
        .collect();

    let (width, height) = if max_x > f32::MIN {
        (
            max_x + config.card_width + config.bounds_margin,
            max_y + config.card_height + config.bounds_margin,
        )
    } else {
        (0.0, 0.0)
    };

    Ok(LayoutResult {
        nodes,
        bands,
        connectors,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Person, Role};

    #[test]
    fn empty_forest_yields_empty_result() {
        let mut forest = Forest::new();
        let result = compute_layout(&mut forest, &LayoutConfig::default()).unwrap();
        assert!(result.nodes.is_empty());
        assert!(result.bands.is_empty());
        assert_eq!((result.width, result.height), (0.0, 0.0));
    }

    #[test]
    fn cyclic_child_references_are_reported() {
        let mut forest = Forest::new();
        let mut a = Person::new("a", "A", 1, Role::primary());
        if let Role::Primary { children, .. } = &mut a.role {
            children.push("b".into());
        }
        let mut b = Person::new("b", "B", 2, Role::primary());
        if let Role::Primary { children, .. } = &mut b.role {
            children.push("a".into());
        }
        forest.persons.insert("a".into(), a);
        forest.persons.insert("b".into(), b);
        forest.roots.push("a".into());

        let err = compute_layout(&mut forest, &LayoutConfig::default()).unwrap_err();
        assert!(matches!(err, TreeError::CycleDetected(_)));
    }

    #[test]
    fn hidden_nodes_keep_stale_positions() {
        let mut forest = Forest::new();
        let mut root = Person::new("r", "R", 1, Role::primary());
        if let Role::Primary { children, .. } = &mut root.role {
            children.push("c".into());
        }
        forest.persons.insert("r".into(), root);
        forest
            .persons
            .insert("c".into(), Person::new("c", "C", 2, Role::primary()));
        forest.roots.push("r".into());

        let config = LayoutConfig::default();
        compute_layout(&mut forest, &config).unwrap();
        let before = forest.find_by_id("c").unwrap().position;
        assert!(before.y > 0.0);

        forest.set_collapsed("r", true).unwrap();
        let result = compute_layout(&mut forest, &config).unwrap();
        let child = forest.find_by_id("c").unwrap();
        assert!(child.hidden_by_collapse);
        assert_eq!(child.position, before);
        assert!(result.nodes["c"].hidden);
        // the bounding box only tracks visible cards
        assert_eq!(result.height, 50.0 + config.card_height + config.bounds_margin);
    }
}

use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::ir::Forest;

use super::{Connector, ConnectorKind, TreeIndex, is_hidden, visible_spouses};

/// Connector geometry for the external line-drawing collaborator: spouse
/// links, direct parent-to-child drops, and the shared bus rail when a
/// parent has several children. Everything here is plain polylines over
/// the final coordinates; no painting, no waiting on rendered elements.
pub(super) fn compute_connectors(
    forest: &Forest,
    index: &TreeIndex,
    hidden: &BTreeMap<String, bool>,
    positions: &BTreeMap<String, (f32, f32)>,
    config: &LayoutConfig,
) -> Vec<Connector> {
    let mut connectors = Vec::new();
    for ids in index.generations.values() {
        for id in ids {
            let Some(&(x, y)) = positions.get(id) else {
                continue;
            };
            spouse_links(forest, hidden, positions, id, x, y, config, &mut connectors);
            child_links(forest, hidden, positions, id, x, y, config, &mut connectors);
        }
    }
    connectors
}

fn spouse_links(
    forest: &Forest,
    hidden: &BTreeMap<String, bool>,
    positions: &BTreeMap<String, (f32, f32)>,
    id: &str,
    x: f32,
    y: f32,
    config: &LayoutConfig,
    out: &mut Vec<Connector>,
) {
    let anchor_y = y + config.card_height / 2.0;
    for spouse_id in visible_spouses(forest, hidden, id) {
        let Some(&(spouse_x, spouse_y)) = positions.get(spouse_id) else {
            continue;
        };
        out.push(Connector {
            kind: ConnectorKind::Spouse,
            from: id.to_string(),
            to: Some(spouse_id.clone()),
            points: vec![
                (x + config.card_width, anchor_y),
                (spouse_x, spouse_y + config.card_height / 2.0),
            ],
        });
    }
}

fn child_links(
    forest: &Forest,
    hidden: &BTreeMap<String, bool>,
    positions: &BTreeMap<String, (f32, f32)>,
    id: &str,
    x: f32,
    y: f32,
    config: &LayoutConfig,
    out: &mut Vec<Connector>,
) {
    let children: Vec<(&String, (f32, f32))> = forest
        .children_of(id)
        .iter()
        .filter(|child_id| !is_hidden(hidden, child_id))
        .filter_map(|child_id| positions.get(child_id).map(|&pos| (child_id, pos)))
        .collect();
    if children.is_empty() {
        return;
    }

    let parent_center_x = x + config.card_width / 2.0;
    let parent_bottom = y + config.card_height;

    if let [(child_id, (child_x, child_y))] = children.as_slice() {
        out.push(Connector {
            kind: ConnectorKind::ParentChild,
            from: id.to_string(),
            to: Some((*child_id).clone()),
            points: vec![
                (parent_center_x, parent_bottom),
                (child_x + config.card_width / 2.0, *child_y),
            ],
        });
        return;
    }

    let child_top = children
        .iter()
        .map(|(_, (_, child_y))| *child_y)
        .fold(f32::MAX, f32::min);
    let rail_y = child_top - config.bus_rise;
    let rail_left = children
        .iter()
        .map(|(_, (child_x, _))| child_x + config.card_width / 2.0)
        .fold(f32::MAX, f32::min);
    let rail_right = children
        .iter()
        .map(|(_, (child_x, _))| child_x + config.card_width / 2.0)
        .fold(f32::MIN, f32::max);

    let mut drop = vec![(parent_center_x, parent_bottom), (parent_center_x, rail_y)];
    if parent_center_x < rail_left {
        drop.push((rail_left, rail_y));
    } else if parent_center_x > rail_right {
        drop.push((rail_right, rail_y));
    }
    out.push(Connector {
        kind: ConnectorKind::ParentDrop,
        from: id.to_string(),
        to: None,
        points: drop,
    });
    out.push(Connector {
        kind: ConnectorKind::SiblingRail,
        from: id.to_string(),
        to: None,
        points: vec![(rail_left, rail_y), (rail_right, rail_y)],
    });
    for (child_id, (child_x, child_y)) in &children {
        let center = child_x + config.card_width / 2.0;
        out.push(Connector {
            kind: ConnectorKind::ChildRiser,
            from: id.to_string(),
            to: Some((*child_id).clone()),
            points: vec![(center, rail_y), (center, *child_y)],
        });
    }
}

use std::collections::BTreeMap;
use std::path::Path;

use family_tree_layout::config::LayoutConfig;
use family_tree_layout::ir::Forest;
use family_tree_layout::layout::{
    ConnectorKind, LayoutResult, compute_layout, resolve_visibility,
};
use family_tree_layout::parser::parse_family;

fn load_fixture(name: &str) -> Forest {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    let parsed = parse_family(&input).expect("fixture parse failed");
    assert!(
        parsed.warnings.is_empty(),
        "{name}: unexpected warnings {:?}",
        parsed.warnings
    );
    parsed.forest
}

fn layout_fixture(name: &str) -> (Forest, LayoutResult) {
    let mut forest = load_fixture(name);
    let result = compute_layout(&mut forest, &LayoutConfig::default()).expect("layout failed");
    (forest, result)
}

/// Interval of one primary card plus its visible spouse run.
fn block_interval(forest: &Forest, result: &LayoutResult, id: &str, config: &LayoutConfig) -> (f32, f32) {
    let node = &result.nodes[id];
    let spouse_count = forest
        .spouses_of(id)
        .iter()
        .filter(|s| !result.nodes[s.as_str()].hidden)
        .count() as f32;
    (
        node.x,
        node.x + config.card_width + spouse_count * config.spouse_spacing,
    )
}

fn assert_no_overlap(forest: &Forest, result: &LayoutResult, config: &LayoutConfig) {
    let mut by_generation: BTreeMap<i32, Vec<(f32, f32)>> = BTreeMap::new();
    for (id, node) in &result.nodes {
        if node.hidden || !forest.is_primary(id) {
            continue;
        }
        by_generation
            .entry(node.generation)
            .or_default()
            .push(block_interval(forest, result, id, config));
    }
    for (generation, mut intervals) in by_generation {
        intervals.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in intervals.windows(2) {
            assert!(
                pair[0].1 <= pair[1].0,
                "generation {generation}: blocks {:?} and {:?} overlap",
                pair[0],
                pair[1]
            );
        }
    }
}

fn assert_spouse_adjacency(forest: &Forest, result: &LayoutResult, config: &LayoutConfig) {
    for (id, node) in &result.nodes {
        if node.hidden || !forest.is_primary(id) {
            continue;
        }
        let mut rank = 0.0;
        for spouse_id in forest.spouses_of(id) {
            let spouse = &result.nodes[spouse_id.as_str()];
            if spouse.hidden {
                continue;
            }
            rank += 1.0;
            assert_eq!(spouse.y, node.y, "spouse {spouse_id} left its partner's row");
            assert_eq!(
                spouse.x - node.x,
                rank * config.spouse_spacing,
                "spouse {spouse_id} is not at slot {rank}"
            );
        }
    }
}

fn assert_generation_monotonicity(forest: &Forest, result: &LayoutResult) {
    for (id, node) in &result.nodes {
        if node.hidden {
            continue;
        }
        for child_id in forest.children_of(id) {
            let child = &result.nodes[child_id.as_str()];
            if !child.hidden {
                assert!(
                    child.y > node.y,
                    "child {child_id} does not sit below parent {id}"
                );
            }
        }
    }
}

fn assert_parent_centering(forest: &Forest, result: &LayoutResult, config: &LayoutConfig) {
    for (id, node) in &result.nodes {
        if node.hidden || !forest.is_primary(id) {
            continue;
        }
        let children: Vec<&str> = forest
            .children_of(id)
            .iter()
            .filter(|c| !result.nodes[c.as_str()].hidden)
            .map(|c| c.as_str())
            .collect();
        if children.is_empty() {
            continue;
        }
        if let [only] = children.as_slice() {
            assert_eq!(result.nodes[*only].x, node.x, "only child {only} not under {id}");
            continue;
        }
        let (parent_left, parent_right) = block_interval(forest, result, id, config);
        let parent_center = (parent_left + parent_right) / 2.0;
        let left = children
            .iter()
            .map(|c| block_interval(forest, result, c, config).0)
            .fold(f32::MAX, f32::min);
        let right = children
            .iter()
            .map(|c| block_interval(forest, result, c, config).1)
            .fold(f32::MIN, f32::max);
        let children_center = (left + right) / 2.0;
        assert!(
            (parent_center - children_center).abs() <= 1.0,
            "{id}: parent center {parent_center} vs children center {children_center}"
        );
    }
}

#[test]
fn worked_example_coordinates() {
    let (forest, result) = layout_fixture("basic.json");
    let config = LayoutConfig::default();

    let a = &result.nodes["A"];
    let b = &result.nodes["B"];
    let c = &result.nodes["C"];
    let d = &result.nodes["D"];
    let e = &result.nodes["E"];

    assert_eq!((a.x, a.y), (100.0, 50.0));
    assert_eq!(b.y, a.y);
    assert_eq!(b.x, a.x + 220.0);
    assert!(c.x < d.x);
    assert!(e.y > c.y);
    assert_eq!((c.y, e.y), (410.0, 770.0));

    // children midpoint sits under the center of the A+B block
    let (parent_left, parent_right) = block_interval(&forest, &result, "A", &config);
    let midpoint = (c.x + d.x + config.card_width) / 2.0;
    assert_eq!(midpoint, (parent_left + parent_right) / 2.0);

    // E is C's only child, pinned directly under it
    assert_eq!(e.x, c.x);

    assert_eq!(result.width, b.x + config.card_width + config.bounds_margin);
    assert_eq!(result.height, e.y + config.card_height + config.bounds_margin);
}

#[test]
fn dynasty_layout_properties_hold() {
    let (forest, result) = layout_fixture("dynasty.json5");
    let config = LayoutConfig::default();
    assert_no_overlap(&forest, &result, &config);
    assert_spouse_adjacency(&forest, &result, &config);
    assert_generation_monotonicity(&forest, &result);
    assert_parent_centering(&forest, &result, &config);
}

#[test]
fn dynasty_exact_positions() {
    let (_, result) = layout_fixture("dynasty.json5");

    // generation rows
    for (id, y) in [("r", 50.0), ("p1", 410.0), ("c1", 770.0), ("g1", 1130.0)] {
        assert_eq!(result.nodes[id].y, y, "row of {id}");
    }
    // the root block slides right to sit over its three children
    assert_eq!(result.nodes["r"].x, 415.0);
    assert_eq!(result.nodes["m"].x, 635.0);
    assert_eq!(result.nodes["o"].x, 855.0);
    // p2 has no spouse but a wide child block, so its card moves over it
    assert_eq!(result.nodes["p2"].x, 635.0);
    assert_eq!(result.nodes["c2"].x, 530.0);
    assert_eq!(result.nodes["c3"].x, 740.0);
    // single-child chains stay pinned
    assert_eq!(result.nodes["c1"].x, result.nodes["p1"].x);
    assert_eq!(result.nodes["g1"].x, result.nodes["c1"].x);
}

#[test]
fn dynasty_generation_bands() {
    let (_, result) = layout_fixture("dynasty.json5");
    let config = LayoutConfig::default();
    let summary: Vec<(i32, f32, f32)> = result
        .bands
        .iter()
        .map(|band| (band.generation, band.top_y, band.height))
        .collect();
    assert_eq!(summary, vec![
        (13, 50.0, 360.0),
        (14, 410.0, 360.0),
        (15, 770.0, 360.0),
        (16, 1130.0, config.card_height + config.band_bottom_margin),
    ]);
}

#[test]
fn basic_connector_geometry() {
    let (_, result) = layout_fixture("basic.json");

    let spouse = result
        .connectors
        .iter()
        .find(|c| c.kind == ConnectorKind::Spouse)
        .expect("spouse link missing");
    assert_eq!(spouse.points, vec![(270.0, 160.0), (320.0, 160.0)]);

    let rail = result
        .connectors
        .iter()
        .find(|c| c.kind == ConnectorKind::SiblingRail && c.from == "A")
        .expect("sibling rail missing");
    assert_eq!(rail.points, vec![(190.0, 390.0), (400.0, 390.0)]);

    let drop = result
        .connectors
        .iter()
        .find(|c| c.kind == ConnectorKind::ParentDrop && c.from == "A")
        .expect("parent drop missing");
    // A+B block center lies left of the rail span: stub to the left end
    assert_eq!(drop.points, vec![(185.0, 270.0), (185.0, 390.0), (190.0, 390.0)]);

    let direct = result
        .connectors
        .iter()
        .find(|c| c.kind == ConnectorKind::ParentChild && c.from == "C")
        .expect("direct child link missing");
    assert_eq!(direct.points, vec![(190.0, 630.0), (190.0, 770.0)]);
}

#[test]
fn collapse_hides_exactly_the_descendant_cone() {
    let mut forest = load_fixture("dynasty.json5");
    let config = LayoutConfig::default();
    compute_layout(&mut forest, &config).unwrap();

    forest.set_collapsed("p1", true).unwrap();
    let result = compute_layout(&mut forest, &config).unwrap();

    let hidden: Vec<&str> = result
        .nodes
        .values()
        .filter(|n| n.hidden)
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(hidden, vec!["c1", "g1", "w2"]);
    // the collapsed node and its own spouse stay visible
    assert!(!result.nodes["p1"].hidden);
    assert!(!result.nodes["w1"].hidden);

    assert_no_overlap(&forest, &result, &config);
    assert_parent_centering(&forest, &result, &config);
}

#[test]
fn expand_restores_the_previous_layout() {
    let mut forest = load_fixture("dynasty.json5");
    let config = LayoutConfig::default();
    let before = compute_layout(&mut forest, &config).unwrap();

    forest.set_collapsed("p1", true).unwrap();
    compute_layout(&mut forest, &config).unwrap();
    forest.set_collapsed("p1", false).unwrap();
    let after = compute_layout(&mut forest, &config).unwrap();

    for (id, node) in &before.nodes {
        let restored = &after.nodes[id.as_str()];
        assert_eq!((restored.x, restored.y), (node.x, node.y), "position of {id}");
        assert!(!restored.hidden);
    }
    assert_eq!(before.width, after.width);
    assert_eq!(before.height, after.height);
}

#[test]
fn collapsing_the_root_shrinks_the_canvas() {
    let mut forest = load_fixture("dynasty.json5");
    let config = LayoutConfig::default();
    let full = compute_layout(&mut forest, &config).unwrap();

    forest.set_collapsed("r", true).unwrap();
    let collapsed = compute_layout(&mut forest, &config).unwrap();
    assert!(collapsed.width < full.width);
    assert!(collapsed.height < full.height);
    assert_eq!(collapsed.bands.len(), 1);

    // hidden nodes keep the coordinates from the run they were visible in
    let stale = &collapsed.nodes["g1"];
    assert_eq!((stale.x, stale.y), (full.nodes["g1"].x, full.nodes["g1"].y));
    assert!(stale.hidden);
}

#[test]
fn visibility_resolution_is_idempotent() {
    let mut forest = load_fixture("dynasty.json5");
    forest.set_collapsed("p1", true).unwrap();
    forest.set_collapsed("c1", true).unwrap();
    let first = resolve_visibility(&forest);
    let second = resolve_visibility(&forest);
    assert_eq!(first, second);
}

#[test]
fn fetched_subtree_joins_the_layout() {
    let mut forest = load_fixture("dynasty.json5");
    let config = LayoutConfig::default();
    compute_layout(&mut forest, &config).unwrap();
    assert!(forest.find_by_id("p3").unwrap().has_more_children());

    let fetched = parse_family(
        r#"[
            { "id": "c4", "name": "Quill Vane", "generation": 15, "type": "child" },
            { "id": "c5", "name": "Rowan Vane", "generation": 15, "type": "child" }
        ]"#,
    )
    .unwrap();
    forest.insert_subtree("p3", fetched.forest).unwrap();
    assert!(!forest.find_by_id("p3").unwrap().has_more_children());

    let result = compute_layout(&mut forest, &config).unwrap();
    assert_eq!(result.nodes["c4"].y, 770.0);
    assert_eq!(result.nodes["c5"].y, 770.0);
    assert!(!result.nodes["c4"].hidden);
    assert_no_overlap(&forest, &result, &config);
    assert_parent_centering(&forest, &result, &config);
}

#[test]
fn empty_document_lays_out_to_nothing() {
    let parsed = parse_family("[]").unwrap();
    let mut forest = parsed.forest;
    let result = compute_layout(&mut forest, &LayoutConfig::default()).unwrap();
    assert!(result.nodes.is_empty());
    assert!(result.bands.is_empty());
    assert!(result.connectors.is_empty());
    assert_eq!((result.width, result.height), (0.0, 0.0));
}

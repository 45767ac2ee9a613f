use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub generation: i32,
    /// Hidden nodes carry the stale coordinates of their last visible run;
    /// renderers must not paint them.
    pub hidden: bool,
}

/// Vertical strip occupied by one generation, for background banding and
/// the generation label column.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationBand {
    pub generation: i32,
    pub top_y: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorKind {
    /// Primary's right edge to a spouse's left edge.
    Spouse,
    /// Parent bottom-center straight down to an only child's top-center.
    ParentChild,
    /// Parent bottom-center down to the sibling rail, with a horizontal
    /// stub when the parent center falls outside the rail span.
    ParentDrop,
    /// Horizontal rail spanning the leftmost to rightmost child centers.
    SiblingRail,
    /// Vertical riser from the rail to one child's top-center.
    ChildRiser,
}

/// Pure connector geometry. Painting these polylines (and waiting for the
/// target elements to exist) is the external collaborator's concern.
#[derive(Debug, Clone)]
pub struct Connector {
    pub kind: ConnectorKind,
    pub from: String,
    pub to: Option<String>,
    pub points: Vec<(f32, f32)>,
}

#[derive(Debug, Clone)]
pub struct LayoutResult {
    pub nodes: BTreeMap<String, NodeLayout>,
    pub bands: Vec<GenerationBand>,
    pub connectors: Vec<Connector>,
    pub width: f32,
    pub height: f32,
}

impl LayoutResult {
    pub fn empty() -> Self {
        Self {
            nodes: BTreeMap::new(),
            bands: Vec::new(),
            connectors: Vec::new(),
            width: 0.0,
            height: 0.0,
        }
    }
}

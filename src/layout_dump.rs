use crate::ir::Forest;
use crate::layout::LayoutResult;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub bands: Vec<BandDump>,
    pub connectors: Vec<ConnectorDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub name: String,
    pub role: String,
    pub generation: i32,
    pub x: f32,
    pub y: f32,
    pub hidden: bool,
}

#[derive(Debug, Serialize)]
pub struct BandDump {
    pub generation: i32,
    pub top_y: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
pub struct ConnectorDump {
    pub kind: String,
    pub from: String,
    pub to: Option<String>,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_result(result: &LayoutResult, forest: &Forest) -> Self {
        let nodes = result
            .nodes
            .values()
            .map(|node| {
                let person = forest.find_by_id(&node.id);
                NodeDump {
                    id: node.id.clone(),
                    name: person.map(|p| p.name.clone()).unwrap_or_default(),
                    role: match person {
                        Some(p) if p.is_primary() => "primary".to_string(),
                        Some(_) => "spouse".to_string(),
                        None => String::new(),
                    },
                    generation: node.generation,
                    x: node.x,
                    y: node.y,
                    hidden: node.hidden,
                }
            })
            .collect();

        let bands = result
            .bands
            .iter()
            .map(|band| BandDump {
                generation: band.generation,
                top_y: band.top_y,
                height: band.height,
            })
            .collect();

        let connectors = result
            .connectors
            .iter()
            .map(|connector| ConnectorDump {
                kind: format!("{:?}", connector.kind),
                from: connector.from.clone(),
                to: connector.to.clone(),
                points: connector.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        LayoutDump {
            width: result.width,
            height: result.height,
            nodes,
            bands,
            connectors,
        }
    }
}

pub fn write_layout_dump(path: &Path, result: &LayoutResult, forest: &Forest) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_result(result, forest);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

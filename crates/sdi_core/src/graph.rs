//! Circular node layout for the equipment graph view.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::output::{Equipment, EquipmentCategory};

/// Fraction of the smaller canvas side used as the circle radius.
const RADIUS_FACTOR: f64 = 0.35;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub tag: String,
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub description: String,
    pub x: f64,
    pub y: f64,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphLayout {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Display radius for a node of the given category.
pub fn node_size(category: &EquipmentCategory) -> u32 {
    match category {
        EquipmentCategory::HeatExchanger => 50,
        EquipmentCategory::Pump => 45,
        EquipmentCategory::ControlValve => 40,
        _ => 35,
    }
}

impl GraphLayout {
    /// Place equipment evenly on a circle, first item at twelve o'clock,
    /// and chain consecutive items with edges.
    pub fn circular(equipment: &[Equipment], width: f64, height: f64) -> Self {
        let center_x = width / 2.0;
        let center_y = height / 2.0;
        let radius = width.min(height) * RADIUS_FACTOR;
        let count = equipment.len().max(1) as f64;

        let nodes: Vec<GraphNode> = equipment
            .iter()
            .enumerate()
            .map(|(i, eq)| {
                let angle = (i as f64 / count) * 2.0 * PI - PI / 2.0;
                GraphNode {
                    id: eq.tag.clone(),
                    tag: eq.tag.clone(),
                    equipment_type: eq.equipment_type.clone(),
                    description: eq.description.clone(),
                    x: center_x + radius * angle.cos(),
                    y: center_y + radius * angle.sin(),
                    size: node_size(&eq.category()),
                }
            })
            .collect();

        let edges = nodes
            .windows(2)
            .map(|pair| GraphEdge {
                source: pair[0].id.clone(),
                target: pair[1].id.clone(),
            })
            .collect();

        Self {
            width,
            height,
            nodes,
            edges,
        }
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edges touching the given node.
    pub fn edges_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.source == id || e.target == id)
    }
}

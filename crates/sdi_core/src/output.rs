//! Generation output and the strategies that produce it.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Diagram text published by the sample strategy.
pub const SAMPLE_DIAGRAM_TEXT: &str = "(E-101){shell-and-tube heat exchanger}
<1>[P-101]{centrifugal pump}
|TIC-101|[E-101.outlet]
<2>(V-101){control valve}
|[TIC-101.out]>[V-101.set]";

/// Category of a piece of equipment, used for grouping and legends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EquipmentCategory {
    HeatExchanger,
    Pump,
    ControlValve,
    Instrument,
    Other(String),
}

impl EquipmentCategory {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Heat Exchanger" => Self::HeatExchanger,
            "Pump" => Self::Pump,
            "Control Valve" => Self::ControlValve,
            "Instrument" => Self::Instrument,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::HeatExchanger => "Heat Exchanger",
            Self::Pump => "Pump",
            Self::ControlValve => "Control Valve",
            Self::Instrument => "Instrument",
            Self::Other(s) => s.as_str(),
        }
    }

    /// Categories shown in a legend, in display order.
    pub fn legend() -> [EquipmentCategory; 4] {
        [
            Self::HeatExchanger,
            Self::Pump,
            Self::ControlValve,
            Self::Instrument,
        ]
    }
}

/// One row of the equipment list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    /// Unique short code, e.g. `P-101`
    pub tag: String,
    /// Category label, e.g. `Pump`
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub description: String,
}

impl Equipment {
    pub fn new(
        tag: impl Into<String>,
        equipment_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            equipment_type: equipment_type.into(),
            description: description.into(),
        }
    }

    pub fn category(&self) -> EquipmentCategory {
        EquipmentCategory::from_label(&self.equipment_type)
    }
}

/// Result of a completed generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutput {
    #[serde(rename = "diagramText")]
    pub diagram_text: String,
    #[serde(rename = "equipmentList")]
    pub equipment: Vec<Equipment>,
}

impl GenerationOutput {
    /// Build an output, rejecting duplicate equipment tags.
    pub fn new(diagram_text: impl Into<String>, equipment: Vec<Equipment>) -> CoreResult<Self> {
        let mut seen = HashSet::new();
        for item in &equipment {
            if !seen.insert(item.tag.as_str()) {
                return Err(CoreError::InvalidOutput(format!(
                    "duplicate equipment tag: {}",
                    item.tag
                )));
            }
        }
        Ok(Self {
            diagram_text: diagram_text.into(),
            equipment,
        })
    }

    /// The fixed heat-exchanger loop sample.
    pub fn sample() -> Self {
        Self {
            diagram_text: SAMPLE_DIAGRAM_TEXT.to_string(),
            equipment: vec![
                Equipment::new("E-101", "Heat Exchanger", "Shell-and-tube heat exchanger"),
                Equipment::new("P-101", "Pump", "Centrifugal pump for feed"),
                Equipment::new("V-101", "Control Valve", "Temperature control valve"),
                Equipment::new("TIC-101", "Instrument", "Temperature Indicator Controller"),
            ],
        }
    }

    pub fn find(&self, tag: &str) -> Option<&Equipment> {
        self.equipment.iter().find(|e| e.tag == tag)
    }
}

/// Turns a process description into a generation output.
///
/// The stage sequencing never looks inside the strategy, so a real
/// diagram-construction backend can replace the sample one without touching
/// the engine.
#[async_trait]
pub trait GenerationStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, input: &str) -> CoreResult<GenerationOutput>;
}

/// Placeholder strategy: always returns [`GenerationOutput::sample`],
/// whatever the input.
#[derive(Debug, Default, Clone, Copy)]
pub struct SampleStrategy;

#[async_trait]
impl GenerationStrategy for SampleStrategy {
    fn name(&self) -> &str {
        "sample"
    }

    async fn generate(&self, _input: &str) -> CoreResult<GenerationOutput> {
        Ok(GenerationOutput::sample())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_equipment() {
        let output = GenerationOutput::sample();
        let tags: Vec<_> = output.equipment.iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["E-101", "P-101", "V-101", "TIC-101"]);
        assert_eq!(output.find("V-101").unwrap().category(), EquipmentCategory::ControlValve);
        assert_eq!(output.find("TIC-101").unwrap().equipment_type, "Instrument");
        assert_eq!(output.diagram_text, SAMPLE_DIAGRAM_TEXT);
    }

    #[test]
    fn test_duplicate_tags_rejected() {
        let result = GenerationOutput::new(
            "x",
            vec![
                Equipment::new("P-1", "Pump", "a"),
                Equipment::new("P-1", "Pump", "b"),
            ],
        );
        assert!(matches!(result, Err(CoreError::InvalidOutput(_))));
    }

    #[tokio::test]
    async fn test_sample_strategy_ignores_input() {
        let a = SampleStrategy.generate("a storage tank").await.unwrap();
        let b = SampleStrategy.generate("").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a, GenerationOutput::sample());
    }

    #[test]
    fn test_output_json_shape() {
        let json = serde_json::to_value(GenerationOutput::sample()).unwrap();
        assert!(json.get("diagramText").is_some());
        assert_eq!(json["equipmentList"][1]["type"], "Pump");
    }
}

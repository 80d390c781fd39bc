//! Plain-text renderings of a generation output.

use crate::graph::{node_size, GraphLayout};
use crate::output::{Equipment, EquipmentCategory, GenerationOutput};

/// Render the equipment list as an aligned `Tag | Type | Description` table.
pub fn equipment_table(equipment: &[Equipment]) -> String {
    let headers = ["Tag", "Type", "Description"];
    let mut widths = headers.map(str::len);
    for item in equipment {
        widths[0] = widths[0].max(item.tag.len());
        widths[1] = widths[1].max(item.equipment_type.len());
        widths[2] = widths[2].max(item.description.len());
    }

    let mut out = String::new();
    push_row(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &[rule[0].as_str(), rule[1].as_str(), rule[2].as_str()], &widths);
    for item in equipment {
        push_row(
            &mut out,
            &[
                item.tag.as_str(),
                item.equipment_type.as_str(),
                item.description.as_str(),
            ],
            &widths,
        );
    }
    out
}

fn push_row(out: &mut String, cells: &[&str; 3], widths: &[usize; 3]) {
    let line = format!(
        "{:<w0$} | {:<w1$} | {:<w2$}",
        cells[0],
        cells[1],
        cells[2],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2]
    );
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Render a graph layout as a node list followed by its edges.
pub fn graph_summary(layout: &GraphLayout) -> String {
    let mut out = String::new();
    for node in &layout.nodes {
        out.push_str(&format!(
            "{:<8} {:<15} ({:>6.1}, {:>6.1}) r={}\n",
            node.tag, node.equipment_type, node.x, node.y, node.size
        ));
    }
    for edge in &layout.edges {
        out.push_str(&format!("{} -> {}\n", edge.source, edge.target));
    }
    out.push_str(&legend_line());
    out.push('\n');
    out
}

/// Node size key for each legend category.
pub fn legend_line() -> String {
    let entries: Vec<String> = EquipmentCategory::legend()
        .iter()
        .map(|category| format!("{} r={}", category.label(), node_size(category)))
        .collect();
    format!("Legend: {}", entries.join(", "))
}

/// Everything a preview pane shows for one output.
pub fn full_preview(output: &GenerationOutput) -> String {
    format!(
        "{}\n\n{}",
        output.diagram_text,
        equipment_table(&output.equipment)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equipment_table() {
        let output = GenerationOutput::sample();
        let table = equipment_table(&output.equipment);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("Tag     | Type"));
        assert!(lines[1].starts_with("------- | ---"));
        assert!(lines[2].starts_with("E-101   | Heat Exchanger"));
        assert!(lines[5].contains("Temperature Indicator Controller"));
    }

    #[test]
    fn test_graph_summary_lists_edges() {
        let output = GenerationOutput::sample();
        let layout = GraphLayout::circular(&output.equipment, 400.0, 400.0);
        let summary = graph_summary(&layout);
        assert!(summary.contains("E-101 -> P-101"));
        assert!(summary.contains("V-101 -> TIC-101"));
        assert!(summary.trim_end().ends_with(&legend_line()));
    }

    #[test]
    fn test_legend_line() {
        assert_eq!(
            legend_line(),
            "Legend: Heat Exchanger r=50, Pump r=45, Control Valve r=40, Instrument r=35"
        );
    }

    #[test]
    fn test_full_preview_starts_with_diagram() {
        let output = GenerationOutput::sample();
        assert!(full_preview(&output).starts_with("(E-101)"));
    }
}

//! Edge label text: attribute projection per canvas configuration and
//! numeric formatting.

use slint::SharedString;

use crate::graph::{CanvasConfig, EdgeAttribute, EdgeAttributes};

/// Format a single attribute value. Finite integral values render without a
/// fractional part; infinities render as the infinity sign, never as a
/// truncated large number.
pub fn format_attribute_value(value: f32) -> String {
    if value == f32::INFINITY {
        "∞".to_string()
    } else if value == f32::NEG_INFINITY {
        "-∞".to_string()
    } else if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn attribute_value(attribute: EdgeAttribute, attrs: &EdgeAttributes) -> Option<f32> {
    match attribute {
        EdgeAttribute::InCapacity => Some(attrs.in_capacity),
        EdgeAttribute::OutCapacity => Some(attrs.out_capacity),
        EdgeAttribute::TransitTime => Some(attrs.transit_time),
        EdgeAttribute::Storage => Some(attrs.storage),
        EdgeAttribute::InflowBound => {
            attrs.flow_control.as_ref().and_then(|fc| fc.inflow_bound)
        }
    }
}

/// Render the label for one edge under the canvas configuration.
///
/// Multi-attribute selections render as a parenthesized tuple in the
/// configured order; a single attribute renders bare.
pub fn edge_label_text(config: &CanvasConfig, attrs: &EdgeAttributes) -> SharedString {
    let parts: Vec<String> = config
        .label_attributes()
        .iter()
        .filter_map(|a| attribute_value(*a, attrs))
        .map(format_attribute_value)
        .collect();

    match parts.len() {
        0 => SharedString::default(),
        1 => parts[0].as_str().into(),
        _ => format!("({})", parts.join(", ")).into(),
    }
}

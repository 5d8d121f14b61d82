//! Static vertical node table for the tube bundle.
//!
//! Nodes are ordered top to bottom; node 0 is the hottest region at the
//! U-bends. Each node spans an equal slice of the bundle height.

use serde::{Deserialize, Serialize};

/// Per-node geometry entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeGeometry {
    /// Share of total tube heat-transfer area in this node.
    pub area_fraction: f64,
    /// Fraction of the node area still effective for natural convection while
    /// the node sits below the thermocline (stagnant).
    pub stagnant_effectiveness: f64,
    /// Share of secondary water mass held in this node.
    pub mass_fraction: f64,
}

impl NodeGeometry {
    pub const fn new(area_fraction: f64, stagnant_effectiveness: f64, mass_fraction: f64) -> Self {
        Self {
            area_fraction,
            stagnant_effectiveness,
            mass_fraction,
        }
    }
}

/// Default five-node table (top to bottom).
pub fn default_nodes() -> Vec<NodeGeometry> {
    vec![
        NodeGeometry::new(0.25, 0.50, 0.250),
        NodeGeometry::new(0.25, 0.30, 0.200),
        NodeGeometry::new(0.20, 0.15, 0.200),
        NodeGeometry::new(0.15, 0.08, 0.175),
        NodeGeometry::new(0.15, 0.05, 0.175),
    ]
}

/// Elevation of the top of node `index` above the tubesheet [ft].
pub fn node_top_ft(index: usize, node_count: usize, bundle_height_ft: f64) -> f64 {
    let band = bundle_height_ft / node_count.max(1) as f64;
    bundle_height_ft - index as f64 * band
}

/// Fraction of node `index` lying above the thermocline, in `[0, 1]`.
pub fn fraction_above_thermocline(
    index: usize,
    node_count: usize,
    bundle_height_ft: f64,
    thermocline_ft: f64,
) -> f64 {
    let band = bundle_height_ft / node_count.max(1) as f64;
    if band <= 0.0 {
        return 0.0;
    }
    let top = node_top_ft(index, node_count, bundle_height_ft);
    sg_core::unit_clamp((top - thermocline_ft) / band)
}

/// Subcooled effective area fraction: full area above the thermocline, the
/// stagnant effectiveness below it.
pub fn effective_area_fraction(
    node: &NodeGeometry,
    index: usize,
    node_count: usize,
    bundle_height_ft: f64,
    thermocline_ft: f64,
) -> f64 {
    let above = fraction_above_thermocline(index, node_count, bundle_height_ft, thermocline_ft);
    node.area_fraction * (above + (1.0 - above) * node.stagnant_effectiveness)
}

//! Node placement shared by drawing and hit-testing.

use crate::topology::GraphNode;

/// Y coordinate of the first node.
pub const ANCHOR_Y: f64 = 80.0;
/// Extra pick radius around each circle.
pub const HIT_SLOP: f64 = 5.0;

/// Where one node lands on the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePlacement {
    /// Position in the node sequence (0-based).
    pub index: usize,
    pub message_id: u64,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub is_latest: bool,
}

impl NodePlacement {
    /// Whether `(x, y)` falls inside the pick area of this node
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let dx = x - self.x;
        let dy = y - self.y;
        (dx * dx + dy * dy).sqrt() < self.radius + HIT_SLOP
    }
}

/// Walk the node sequence from the top-centre anchor.
///
/// Offsets describe the edge coming *into* a node, so the first node's offset
/// is ignored.
pub fn layout(nodes: &[GraphNode], width: f64) -> Vec<NodePlacement> {
    let mut x = width / 2.0;
    let mut y = ANCHOR_Y;
    let last = nodes.len().saturating_sub(1);

    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            if index > 0 {
                x += node.offset_x;
                y += node.offset_y;
            }
            NodePlacement {
                index,
                message_id: node.message_id,
                x,
                y,
                radius: node.radius(),
                is_latest: index == last,
            }
        })
        .collect()
}

/// First node, in sequence order, whose pick area contains `(x, y)`.
pub fn pick(placements: &[NodePlacement], x: f64, y: f64) -> Option<u64> {
    placements
        .iter()
        .find(|p| p.contains(x, y))
        .map(|p| p.message_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u64, weight: u32, dx: f64, dy: f64) -> GraphNode {
        GraphNode {
            id,
            message_id: id,
            weight,
            offset_x: dx,
            offset_y: dy,
        }
    }

    #[test]
    fn test_layout_empty() {
        assert!(layout(&[], 400.0).is_empty());
    }

    #[test]
    fn test_first_node_anchored_ignoring_offset() {
        let placements = layout(&[node(1, 1, 35.0, 99.0)], 400.0);
        assert_eq!(placements.len(), 1);
        assert_eq!((placements[0].x, placements[0].y), (200.0, 80.0));
        assert!(placements[0].is_latest);
    }

    #[test]
    fn test_offsets_accumulate() {
        let nodes = vec![
            node(1, 1, 0.0, 0.0),
            node(2, 3, -20.0, 70.0),
            node(3, 1, 10.0, 65.0),
        ];
        let placements = layout(&nodes, 300.0);
        assert_eq!((placements[1].x, placements[1].y), (130.0, 150.0));
        assert_eq!((placements[2].x, placements[2].y), (140.0, 215.0));
        assert_eq!(placements[1].radius, 10.0);
        assert!(!placements[1].is_latest);
        assert!(placements[2].is_latest);
    }

    #[test]
    fn test_pick_at_centre_returns_node() {
        let nodes = vec![node(1, 1, 0.0, 0.0), node(2, 2, 15.0, 60.0), node(3, 5, -30.0, 90.0)];
        let placements = layout(&nodes, 480.0);
        for p in &placements {
            assert_eq!(pick(&placements, p.x, p.y), Some(p.message_id));
        }
    }

    #[test]
    fn test_pick_respects_slop_boundary() {
        let placements = layout(&[node(9, 1, 0.0, 0.0)], 200.0);
        // radius 6 + slop 5 = 11, strict inequality
        assert_eq!(pick(&placements, 100.0 + 10.9, 80.0), Some(9));
        assert_eq!(pick(&placements, 100.0 + 11.0, 80.0), None);
        assert_eq!(pick(&placements, 0.0, 0.0), None);
    }

    #[test]
    fn test_pick_prefers_earliest_on_overlap() {
        // Second node lands 4 units below the first: both pick areas cover the midpoint.
        let nodes = vec![node(1, 1, 0.0, 0.0), node(2, 1, 0.0, 4.0)];
        let placements = layout(&nodes, 100.0);
        assert_eq!(pick(&placements, 50.0, 82.0), Some(1));
    }
}

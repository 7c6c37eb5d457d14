use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use super::layout::{pick, NodePlacement};
use super::raster::RasterSurface;
use super::render::{render, Palette};
use super::surface::Surface;
use crate::error::RenderResult;
use crate::topology::GraphNode;

/// PNG image of the graph as last drawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSnapshot {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl GraphSnapshot {
    /// `data:image/png;base64,...` URI for embedding
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }
}

/// Raster canvas that keeps its pixels in sync with the graph.
///
/// Every size change reallocates the buffer and redraws; every data change
/// redraws. The buffer never holds content from an older size or node list.
pub struct GraphCanvas {
    surface: RasterSurface,
    palette: Palette,
    nodes: Vec<GraphNode>,
    active_message_id: Option<u64>,
    placements: Vec<NodePlacement>,
    redraws: u64,
}

impl GraphCanvas {
    /// Create a canvas and draw the empty background
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        Self::with_palette(width, height, Palette::default())
    }

    pub fn with_palette(width: u32, height: u32, palette: Palette) -> RenderResult<Self> {
        let mut canvas = Self {
            surface: RasterSurface::new(width, height)?,
            palette,
            nodes: Vec::new(),
            active_message_id: None,
            placements: Vec::new(),
            redraws: 0,
        };
        canvas.redraw();
        Ok(canvas)
    }

    /// Match the container size. Always followed by a full redraw.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if self.surface.size() != (width, height) {
            self.surface = RasterSurface::new(width, height)?;
            debug!(width, height, "Canvas buffer reallocated");
        }
        self.redraw();
        Ok(())
    }

    /// Replace the drawn graph state and redraw
    pub fn update(&mut self, nodes: &[GraphNode], active_message_id: Option<u64>) {
        self.nodes = nodes.to_vec();
        self.active_message_id = active_message_id;
        self.redraw();
    }

    /// Repaint everything from the stored state
    pub fn redraw(&mut self) {
        self.placements = render(
            &mut self.surface,
            &self.nodes,
            self.active_message_id,
            &self.palette,
        );
        self.redraws += 1;
    }

    /// Message id of the node under `(x, y)`, using the placements just drawn
    pub fn pick(&self, x: f64, y: f64) -> Option<u64> {
        pick(&self.placements, x, y)
    }

    /// PNG of the current buffer, or `None` while there is no graph yet
    pub fn snapshot(&self) -> RenderResult<Option<GraphSnapshot>> {
        if self.nodes.is_empty() {
            return Ok(None);
        }
        let (width, height) = self.surface.size();
        Ok(Some(GraphSnapshot {
            png: self.surface.encode_png()?,
            width,
            height,
        }))
    }

    pub fn size(&self) -> (u32, u32) {
        self.surface.size()
    }

    pub fn placements(&self) -> &[NodePlacement] {
        &self.placements
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    /// Number of full redraws so far
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes() -> Vec<GraphNode> {
        vec![
            GraphNode {
                id: 1,
                message_id: 1,
                weight: 3,
                offset_x: 0.0,
                offset_y: 0.0,
            },
            GraphNode {
                id: 2,
                message_id: 2,
                weight: 1,
                offset_x: -25.0,
                offset_y: 70.0,
            },
        ]
    }

    #[test]
    fn test_snapshot_none_before_first_node() {
        let canvas = GraphCanvas::new(200, 200).unwrap();
        assert!(canvas.snapshot().unwrap().is_none());
    }

    #[test]
    fn test_snapshot_after_update() {
        let mut canvas = GraphCanvas::new(200, 300).unwrap();
        canvas.update(&nodes(), None);
        let snapshot = canvas.snapshot().unwrap().unwrap();
        assert_eq!((snapshot.width, snapshot.height), (200, 300));
        assert!(snapshot.data_uri().starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn test_resize_reallocates_and_redraws() {
        let mut canvas = GraphCanvas::new(200, 300).unwrap();
        canvas.update(&nodes(), Some(1));
        let before = canvas.redraw_count();

        canvas.resize(400, 300).unwrap();
        assert_eq!(canvas.size(), (400, 300));
        assert_eq!(canvas.redraw_count(), before + 1);
        // anchor moved with the new width
        assert_eq!(canvas.placements()[0].x, 200.0);
        assert_eq!(canvas.pick(200.0, 80.0), Some(1));

        // same size still redraws
        canvas.resize(400, 300).unwrap();
        assert_eq!(canvas.redraw_count(), before + 2);
    }

    #[test]
    fn test_resize_to_zero_fails_and_keeps_buffer() {
        let mut canvas = GraphCanvas::new(100, 100).unwrap();
        assert!(canvas.resize(0, 100).is_err());
        assert_eq!(canvas.size(), (100, 100));
    }

    #[test]
    fn test_resize_beyond_limit_fails_and_keeps_buffer() {
        let mut canvas = GraphCanvas::new(100, 100).unwrap();
        canvas.update(&nodes(), None);
        let err = canvas.resize(100_000, 100_000).unwrap_err();
        assert!(matches!(err, crate::error::RenderError::InvalidSurface { .. }));
        assert_eq!(canvas.size(), (100, 100));
        assert!(canvas.snapshot().unwrap().is_some());
    }

    #[test]
    fn test_pick_matches_drawn_pixels() {
        let mut canvas = GraphCanvas::new(240, 320).unwrap();
        canvas.update(&nodes(), None);
        let palette = Palette::default();
        for placement in canvas.placements().to_vec() {
            assert_eq!(canvas.pick(placement.x, placement.y), Some(placement.message_id));
            let expected = if placement.is_latest {
                palette.latest
            } else {
                palette.node
            };
            // offset to avoid the index label strokes
            let px = canvas
                .surface()
                .pixel(placement.x as u32, (placement.y + placement.radius * 0.75) as u32)
                .unwrap();
            assert_eq!(px, expected);
        }
    }
}

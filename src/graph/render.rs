use super::layout::{layout, NodePlacement};
use super::surface::{Rgba, Surface};
use crate::topology::GraphNode;

/// Spacing of the background dot grid.
pub const GRID_PITCH: f64 = 30.0;
/// Radius of one grid dot.
pub const GRID_DOT_RADIUS: f64 = 1.0;
/// Extra radius of the ring around the active node.
pub const ACTIVE_RING_GAP: f64 = 3.0;
/// Circles at or below this radius get no index label.
pub const LABEL_MIN_RADIUS: f64 = 8.0;

/// Colors used by [`render`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgba,
    pub grid: Rgba,
    pub edge: Rgba,
    pub node: Rgba,
    pub latest: Rgba,
    pub stroke: Rgba,
    pub active_ring: Rgba,
    pub label: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgba::rgb(0xf7, 0xf4, 0xee),
            grid: Rgba::rgba(0x1c, 0x1c, 0x1c, 0x26),
            edge: Rgba::rgb(0x55, 0x55, 0x55),
            node: Rgba::rgb(0x1c, 0x1c, 0x1c),
            latest: Rgba::rgb(0xd9, 0x4f, 0x2b),
            stroke: Rgba::rgb(0xf7, 0xf4, 0xee),
            active_ring: Rgba::rgb(0x2b, 0x6c, 0xd9),
            label: Rgba::rgb(0xff, 0xff, 0xff),
        }
    }
}

/// Draw the full graph: background, dot grid, then edges and nodes in sequence order.
///
/// Returns the placements that were drawn so callers can hit-test against
/// exactly what is on the surface.
pub fn render<S>(
    surface: &mut S,
    nodes: &[GraphNode],
    active_message_id: Option<u64>,
    palette: &Palette,
) -> Vec<NodePlacement>
where
    S: Surface + ?Sized,
{
    let (width, height) = surface.size();
    surface.fill_background(palette.background);
    draw_grid(surface, f64::from(width), f64::from(height), palette.grid);

    let placements = layout(nodes, f64::from(width));
    let mut previous: Option<(f64, f64)> = None;

    for placement in &placements {
        let centre = (placement.x, placement.y);
        if let Some(from) = previous {
            surface.line(from, centre, 1.5, palette.edge);
        }
        draw_node(surface, placement, active_message_id, palette);
        previous = Some(centre);
    }

    placements
}

fn draw_grid<S: Surface + ?Sized>(surface: &mut S, width: f64, height: f64, color: Rgba) {
    let mut y = GRID_PITCH / 2.0;
    while y < height {
        let mut x = GRID_PITCH / 2.0;
        while x < width {
            surface.fill_circle(x, y, GRID_DOT_RADIUS, color);
            x += GRID_PITCH;
        }
        y += GRID_PITCH;
    }
}

fn draw_node<S: Surface + ?Sized>(
    surface: &mut S,
    placement: &NodePlacement,
    active_message_id: Option<u64>,
    palette: &Palette,
) {
    let NodePlacement { x, y, radius, .. } = *placement;
    let fill = if placement.is_latest {
        palette.latest
    } else {
        palette.node
    };

    surface.fill_circle(x, y, radius, fill);
    surface.stroke_circle(x, y, radius, 1.0, palette.stroke);

    if active_message_id == Some(placement.message_id) {
        surface.stroke_circle(x, y, radius + ACTIVE_RING_GAP, 2.0, palette.active_ring);
    }

    if radius > LABEL_MIN_RADIUS {
        let text = (placement.index + 1).to_string();
        surface.label(x, y, &text, radius, palette.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::surface::{DrawCommand, RecordingSurface};

    fn node(id: u64, weight: u32, dx: f64, dy: f64) -> GraphNode {
        GraphNode {
            id,
            message_id: id,
            weight,
            offset_x: dx,
            offset_y: dy,
        }
    }

    fn node_circles(commands: &[DrawCommand]) -> Vec<(f64, f64, f64, Rgba)> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillCircle {
                    x,
                    y,
                    radius,
                    color,
                } if *radius > GRID_DOT_RADIUS => Some((*x, *y, *radius, *color)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_background_and_grid_cover_surface() {
        let mut surface = RecordingSurface::new(90, 60);
        let palette = Palette::default();
        render(&mut surface, &[], None, &palette);

        let commands = surface.commands();
        assert_eq!(commands[0], DrawCommand::Background(palette.background));
        // 3 columns x 2 rows at 30px pitch
        let dots = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillCircle { radius, .. } if *radius == GRID_DOT_RADIUS))
            .count();
        assert_eq!(dots, 6);
    }

    #[test]
    fn test_latest_node_has_distinct_fill() {
        let mut surface = RecordingSurface::new(400, 400);
        let palette = Palette::default();
        let nodes = vec![node(1, 1, 0.0, 0.0), node(2, 1, 10.0, 70.0), node(3, 1, -5.0, 80.0)];
        render(&mut surface, &nodes, None, &palette);

        let circles = node_circles(surface.commands());
        assert_eq!(circles.len(), 3);
        assert_eq!(circles[0].3, palette.node);
        assert_eq!(circles[1].3, palette.node);
        assert_eq!(circles[2].3, palette.latest);
    }

    #[test]
    fn test_edges_connect_consecutive_centres() {
        let mut surface = RecordingSurface::new(200, 400);
        let nodes = vec![node(1, 1, 0.0, 0.0), node(2, 1, 20.0, 60.0)];
        render(&mut surface, &nodes, None, &Palette::default());

        let lines: Vec<_> = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect();
        assert_eq!(lines, vec![((100.0, 80.0), (120.0, 140.0))]);
    }

    #[test]
    fn test_every_node_stroked_and_active_ring_drawn() {
        let mut surface = RecordingSurface::new(300, 300);
        let palette = Palette::default();
        let nodes = vec![node(1, 1, 0.0, 0.0), node(2, 2, 0.0, 60.0)];
        render(&mut surface, &nodes, Some(1), &palette);

        let strokes: Vec<_> = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::StrokeCircle {
                    radius,
                    width,
                    color,
                    ..
                } => Some((*radius, *width, *color)),
                _ => None,
            })
            .collect();
        assert_eq!(
            strokes,
            vec![
                (6.0, 1.0, palette.stroke),
                (9.0, 2.0, palette.active_ring),
                (8.0, 1.0, palette.stroke),
            ]
        );
    }

    #[test]
    fn test_labels_only_on_large_nodes() {
        let mut surface = RecordingSurface::new(300, 300);
        // radius 6, 8, 10
        let nodes = vec![node(1, 1, 0.0, 0.0), node(2, 2, 0.0, 60.0), node(3, 3, 0.0, 60.0)];
        render(&mut surface, &nodes, None, &Palette::default());

        let labels: Vec<_> = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Label { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["3".to_string()]);
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut surface = RecordingSurface::new(240, 320);
        let nodes = vec![node(1, 4, 0.0, 0.0), node(2, 1, 12.0, 75.0)];
        render(&mut surface, &nodes, Some(2), &Palette::default());
        let first = surface.commands().to_vec();
        render(&mut surface, &nodes, Some(2), &Palette::default());
        assert_eq!(surface.commands(), first.as_slice());
    }
}

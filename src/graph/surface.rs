//! Drawing surface abstraction.

/// Straight RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// The primitive operations the graph renderer needs.
///
/// Coordinates are in surface pixels with the origin at the top-left.
pub trait Surface {
    /// Current size in pixels (width, height).
    fn size(&self) -> (u32, u32);

    /// Paint the whole surface with one color.
    fn fill_background(&mut self, color: Rgba);

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba);

    fn stroke_circle(&mut self, x: f64, y: f64, radius: f64, width: f64, color: Rgba);

    fn line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Rgba);

    /// Draw `text` centred on `(x, y)`, roughly `size` pixels tall.
    fn label(&mut self, x: f64, y: f64, text: &str, size: f64, color: Rgba);
}

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Background(Rgba),
    FillCircle {
        x: f64,
        y: f64,
        radius: f64,
        color: Rgba,
    },
    StrokeCircle {
        x: f64,
        y: f64,
        radius: f64,
        width: f64,
        color: Rgba,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        width: f64,
        color: Rgba,
    },
    Label {
        x: f64,
        y: f64,
        text: String,
        color: Rgba,
    },
}

/// Surface that records calls instead of rasterizing them
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drop recorded commands, keeping the size
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill_background(&mut self, color: Rgba) {
        // A background fill replaces everything drawn before it.
        self.commands.clear();
        self.commands.push(DrawCommand::Background(color));
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::FillCircle {
            x,
            y,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, x: f64, y: f64, radius: f64, width: f64, color: Rgba) {
        self.commands.push(DrawCommand::StrokeCircle {
            x,
            y,
            radius,
            width,
            color,
        });
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Rgba) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn label(&mut self, x: f64, y: f64, text: &str, _size: f64, color: Rgba) {
        self.commands.push(DrawCommand::Label {
            x,
            y,
            text: text.to_string(),
            color,
        });
    }
}

use std::collections::HashSet;

/// Immediate-mode 2D drawing target, shaped after the Canvas 2D API.
/// The browser implementation wraps `CanvasRenderingContext2d`.
pub trait DrawSurface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    fn set_fill_style(&mut self, color: &str);
    fn set_stroke_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f32);
    fn set_global_alpha(&mut self, alpha: f32);
    fn set_font(&mut self, font: &str);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32);
    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn arc(&mut self, x: f32, y: f32, radius: f32, start: f32, end: f32);
    fn close_path(&mut self);
    fn fill(&mut self);
    fn stroke(&mut self);

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn scale(&mut self, sx: f32, sy: f32);

    /// Draw a preloaded image by key. Returns false when the image is not
    /// available so the caller can draw a placeholder.
    fn draw_image(&mut self, key: &str, x: f32, y: f32, w: f32, h: f32) -> bool;

    fn fill_text(&mut self, text: &str, x: f32, y: f32);

    /// Filled circle.
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32) {
        self.begin_path();
        self.arc(x, y, radius, 0.0, std::f32::consts::TAU);
        self.fill();
    }

    /// Open polyline through `points`.
    fn stroke_polyline(&mut self, points: &[[f32; 2]]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.begin_path();
        self.move_to(first[0], first[1]);
        for p in rest {
            self.line_to(p[0], p[1]);
        }
        self.stroke();
    }
}

/// A recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillStyle(String),
    StrokeStyle(String),
    LineWidth(f32),
    GlobalAlpha(f32),
    Font(String),
    FillRect { x: f32, y: f32, w: f32, h: f32 },
    StrokeRect { x: f32, y: f32, w: f32, h: f32 },
    BeginPath,
    MoveTo(f32, f32),
    LineTo(f32, f32),
    Arc { x: f32, y: f32, radius: f32 },
    ClosePath,
    Fill,
    Stroke,
    Save,
    Restore,
    Translate(f32, f32),
    Scale(f32, f32),
    Image { key: String, drawn: bool },
    Text(String),
}

/// Headless surface that records every call. Used by tests and native tools.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    pub commands: Vec<DrawCommand>,
    images: HashSet<String>,
    depth: i32,
    max_depth: i32,
    underflow: bool,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
            images: HashSet::new(),
            depth: 0,
            max_depth: 0,
            underflow: false,
        }
    }

    /// Mark an image key as loaded.
    pub fn with_image(mut self, key: &str) -> Self {
        self.images.insert(key.to_string());
        self
    }

    /// Every `save` has been matched by a `restore`, and no `restore` came first.
    pub fn is_balanced(&self) -> bool {
        self.depth == 0 && !self.underflow
    }

    pub fn max_depth(&self) -> i32 {
        self.max_depth
    }

    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    /// Text drawn so far.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl DrawSurface for RecordingSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn set_fill_style(&mut self, color: &str) {
        self.commands.push(DrawCommand::FillStyle(color.to_string()));
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.commands.push(DrawCommand::StrokeStyle(color.to_string()));
    }

    fn set_line_width(&mut self, width: f32) {
        self.commands.push(DrawCommand::LineWidth(width));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::GlobalAlpha(alpha));
    }

    fn set_font(&mut self, font: &str) {
        self.commands.push(DrawCommand::Font(font.to_string()));
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.commands.push(DrawCommand::FillRect { x, y, w, h });
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.commands.push(DrawCommand::StrokeRect { x, y, w, h });
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::LineTo(x, y));
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, _start: f32, _end: f32) {
        self.commands.push(DrawCommand::Arc { x, y, radius });
    }

    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill);
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke);
    }

    fn save(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.depth -= 1;
        if self.depth < 0 {
            self.underflow = true;
        }
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::Translate(x, y));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.commands.push(DrawCommand::Scale(sx, sy));
    }

    fn draw_image(&mut self, key: &str, _x: f32, _y: f32, _w: f32, _h: f32) -> bool {
        let drawn = self.images.contains(key);
        self.commands.push(DrawCommand::Image { key: key.to_string(), drawn });
        drawn
    }

    fn fill_text(&mut self, text: &str, _x: f32, _y: f32) {
        self.commands.push(DrawCommand::Text(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_save_restore_balance() {
        let mut s = RecordingSurface::new(100.0, 100.0);
        s.save();
        s.save();
        s.restore();
        assert!(!s.is_balanced());
        s.restore();
        assert!(s.is_balanced());
        assert_eq!(s.max_depth(), 2);
        s.restore();
        s.save();
        assert!(!s.is_balanced(), "restore before save is an underflow");
    }

    #[test]
    fn images_draw_only_when_loaded() {
        let mut s = RecordingSurface::new(100.0, 100.0).with_image("coin");
        assert!(s.draw_image("coin", 0.0, 0.0, 8.0, 8.0));
        assert!(!s.draw_image("missing", 0.0, 0.0, 8.0, 8.0));
    }

    #[test]
    fn polyline_helper_strokes_once() {
        let mut s = RecordingSurface::new(100.0, 100.0);
        s.stroke_polyline(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]);
        assert_eq!(s.count(|c| matches!(c, DrawCommand::LineTo(..))), 2);
        assert_eq!(s.count(|c| *c == DrawCommand::Stroke), 1);
        s.clear();
        s.stroke_polyline(&[]);
        assert!(s.commands.is_empty());
    }
}

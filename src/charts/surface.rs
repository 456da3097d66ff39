//! Drawing surface
//!
//! Retained list of shapes that a chart renderer draws onto, plus the
//! interactive hover state of its data marks. Serializes to a standalone
//! SVG document.
//!
//! Shapes are grouped into [`Layer`]s; within a layer they keep insertion
//! order. Data marks are shapes that carry a hover emphasis and a tooltip.
//! Only one mark can be hovered at a time, and [`Surface::clear`] drops the
//! hover state together with the shapes.

use std::fmt::Write;

use crate::format::escape;

/// Format a coordinate with at most two decimals
pub fn num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 || !rounded.is_finite() {
        return "0".to_string();
    }
    let fixed = format!("{:.2}", rounded);
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Paint order, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Grid,
    Axis,
    Data,
    Legend,
    Title,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
    pub dash: Option<&'static str>,
}

impl Stroke {
    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
            dash: None,
        }
    }

    pub fn dashed(mut self, pattern: &'static str) -> Self {
        self.dash = Some(pattern);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(&self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub fill: String,
    pub size: u32,
    pub anchor: Anchor,
    /// Rotation in degrees about the text origin
    pub rotate: Option<f64>,
    /// Vertically centre on `y` instead of sitting on the baseline
    pub centered: bool,
}

impl TextStyle {
    pub fn new(fill: impl Into<String>, size: u32, anchor: Anchor) -> Self {
        Self {
            fill: fill.into(),
            size,
            anchor,
            rotate: None,
            centered: false,
        }
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotate = Some(degrees);
        self
    }

    pub fn centered(mut self) -> Self {
        self.centered = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: String,
        stroke: Option<Stroke>,
        opacity: Option<f64>,
        rx: Option<f64>,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: Stroke,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: String,
    },
    /// Unfilled path
    Path { d: String, stroke: Stroke },
    Text {
        x: f64,
        y: f64,
        content: String,
        style: TextStyle,
    },
    /// Rectangle filled with a horizontal gradient; stops are `(offset 0..1, colour)`
    Gradient {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        stops: Vec<(f64, String)>,
    },
}

impl Shape {
    /// Plain filled rectangle
    pub fn rect(x: f64, y: f64, width: f64, height: f64, fill: impl Into<String>) -> Shape {
        Shape::Rect {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
            fill: fill.into(),
            stroke: None,
            opacity: None,
            rx: None,
        }
    }

    pub fn text(x: f64, y: f64, content: impl Into<String>, style: TextStyle) -> Shape {
        Shape::Text {
            x,
            y,
            content: content.into(),
            style,
        }
    }

    fn emphasized(&self, emphasis: &Emphasis) -> Shape {
        let mut shape = self.clone();
        match (&mut shape, emphasis) {
            (Shape::Rect { stroke, .. }, Emphasis::Stroke(s)) => *stroke = Some(s.clone()),
            (Shape::Rect { opacity, .. }, Emphasis::Opacity(o)) => *opacity = Some(*o),
            (Shape::Rect { fill, .. }, Emphasis::Fill(f)) => *fill = f.clone(),
            (Shape::Circle { r, fill, .. }, Emphasis::Grow { radius, fill: f }) => {
                *r = *radius;
                *fill = f.clone();
            }
            (Shape::Circle { fill, .. }, Emphasis::Fill(f)) => *fill = f.clone(),
            _ => {}
        }
        shape
    }

    fn write_svg(&self, out: &mut String, id: usize, title: Option<&str>) {
        let title = title
            .map(|t| format!("<title>{}</title>", escape(t)))
            .unwrap_or_default();
        let _ = match self {
            Shape::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
                opacity,
                rx,
            } => {
                let mut attrs = String::new();
                if let Some(stroke) = stroke {
                    attrs.push_str(&stroke_attrs(stroke));
                }
                if let Some(o) = opacity {
                    let _ = write!(attrs, r#" opacity="{}""#, num(*o));
                }
                if let Some(rx) = rx {
                    let _ = write!(attrs, r#" rx="{}""#, num(*rx));
                }
                write!(
                    out,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"{}>{}</rect>"#,
                    num(*x),
                    num(*y),
                    num(*width),
                    num(*height),
                    escape(fill),
                    attrs,
                    title
                )
            }
            Shape::Line {
                x1,
                y1,
                x2,
                y2,
                stroke,
            } => write!(
                out,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
                num(*x1),
                num(*y1),
                num(*x2),
                num(*y2),
                stroke_attrs(stroke)
            ),
            Shape::Circle { cx, cy, r, fill } => write!(
                out,
                r#"<circle cx="{}" cy="{}" r="{}" fill="{}">{}</circle>"#,
                num(*cx),
                num(*cy),
                num(*r),
                escape(fill),
                title
            ),
            Shape::Path { d, stroke } => write!(
                out,
                r#"<path d="{}" fill="none"{}/>"#,
                d,
                stroke_attrs(stroke)
            ),
            Shape::Text {
                x,
                y,
                content,
                style,
            } => {
                let mut attrs = String::new();
                if let Some(deg) = style.rotate {
                    let _ = write!(
                        attrs,
                        r#" transform="rotate({},{},{})""#,
                        num(deg),
                        num(*x),
                        num(*y)
                    );
                }
                if style.centered {
                    attrs.push_str(r#" dominant-baseline="middle""#);
                }
                write!(
                    out,
                    r#"<text x="{}" y="{}" fill="{}" font-size="{}px" text-anchor="{}"{}>{}</text>"#,
                    num(*x),
                    num(*y),
                    escape(&style.fill),
                    style.size,
                    style.anchor.as_str(),
                    attrs,
                    escape(content)
                )
            }
            Shape::Gradient {
                x,
                y,
                width,
                height,
                stops,
            } => {
                let _ = write!(
                    out,
                    r#"<defs><linearGradient id="gradient-{}" x1="0%" y1="0%" x2="100%" y2="0%">"#,
                    id
                );
                for (offset, color) in stops {
                    let _ = write!(
                        out,
                        r#"<stop offset="{}%" stop-color="{}"/>"#,
                        num(offset * 100.0),
                        escape(color)
                    );
                }
                write!(
                    out,
                    r#"</linearGradient></defs><rect x="{}" y="{}" width="{}" height="{}" fill="url(#gradient-{})"/>"#,
                    num(*x),
                    num(*y),
                    num(*width),
                    num(*height),
                    id
                )
            }
        };
    }
}

fn stroke_attrs(stroke: &Stroke) -> String {
    let mut attrs = format!(
        r#" stroke="{}" stroke-width="{}""#,
        escape(&stroke.color),
        num(stroke.width)
    );
    if let Some(dash) = stroke.dash {
        let _ = write!(attrs, r#" stroke-dasharray="{}""#, dash);
    }
    attrs
}

/// Visual change applied to a data mark while hovered
#[derive(Debug, Clone, PartialEq)]
pub enum Emphasis {
    Stroke(Stroke),
    Opacity(f64),
    Fill(String),
    /// Enlarge and recolour a point
    Grow { radius: f64, fill: String },
}

/// Floating label shown above a hovered mark
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    /// Horizontal centre
    pub x: f64,
    /// Bottom edge of the label box
    pub y: f64,
    pub width: f64,
    pub lines: Vec<String>,
}

impl Tooltip {
    pub fn new(x: f64, y: f64, width: f64, lines: Vec<String>) -> Self {
        Self { x, y, width, lines }
    }

    /// Single-line label sized to its text
    pub fn single(x: f64, y: f64, line: impl Into<String>) -> Self {
        let line = line.into();
        let width = (line.chars().count() as f64 * 7.0 + 16.0).max(50.0);
        Self::new(x, y, width, vec![line])
    }

    /// Label text as one string
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn write_svg(&self, out: &mut String) {
        let line_height = 15.0;
        let height = self.lines.len() as f64 * line_height + 5.0;
        let top = self.y - height;
        let _ = write!(
            out,
            r##"<g class="tooltip"><rect x="{}" y="{}" width="{}" height="{}" fill="#343a40" rx="3"/>"##,
            num(self.x - self.width / 2.0),
            num(top),
            num(self.width),
            num(height)
        );
        for (i, line) in self.lines.iter().enumerate() {
            let _ = write!(
                out,
                r#"<text x="{}" y="{}" fill="white" font-size="11px" text-anchor="middle">{}</text>"#,
                num(self.x),
                num(top + line_height * (i as f64 + 1.0)),
                escape(line)
            );
        }
        out.push_str("</g>");
    }
}

/// Handle to a data mark on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkId(usize);

#[derive(Debug, Clone)]
struct Interaction {
    emphasis: Emphasis,
    tooltip: Tooltip,
}

#[derive(Debug, Clone)]
struct Entry {
    layer: Layer,
    shape: Shape,
    interaction: Option<Interaction>,
}

/// Retained drawing target for chart renderers
#[derive(Debug, Clone)]
pub struct Surface {
    width: f64,
    height: f64,
    background: Option<String>,
    entries: Vec<Entry>,
    hovered: Option<MarkId>,
}

impl Surface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background: None,
            entries: Vec::new(),
            hovered: None,
        }
    }

    /// Paint a solid background behind everything (for standalone export)
    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background = Some(color.into());
        self
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Remove every shape and any hover state
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hovered = None;
    }

    pub fn push(&mut self, layer: Layer, shape: Shape) {
        self.entries.push(Entry {
            layer,
            shape,
            interaction: None,
        });
    }

    /// Add an interactive data mark
    pub fn push_mark(&mut self, shape: Shape, emphasis: Emphasis, tooltip: Tooltip) -> MarkId {
        let id = MarkId(self.entries.len());
        self.entries.push(Entry {
            layer: Layer::Data,
            shape,
            interaction: Some(Interaction { emphasis, tooltip }),
        });
        id
    }

    /// All data marks in paint order
    pub fn marks(&self) -> Vec<MarkId> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.interaction.is_some())
            .map(|(i, _)| MarkId(i))
            .collect()
    }

    pub fn mark_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.interaction.is_some())
            .count()
    }

    /// Shape of a mark as currently displayed (emphasized while hovered)
    pub fn mark_shape(&self, id: MarkId) -> Option<Shape> {
        let entry = self.entries.get(id.0)?;
        let interaction = entry.interaction.as_ref()?;
        if self.hovered == Some(id) {
            Some(entry.shape.emphasized(&interaction.emphasis))
        } else {
            Some(entry.shape.clone())
        }
    }

    pub fn tooltip(&self, id: MarkId) -> Option<&Tooltip> {
        self.entries
            .get(id.0)?
            .interaction
            .as_ref()
            .map(|i| &i.tooltip)
    }

    /// Pointer entered a mark: emphasize it and return its label
    pub fn pointer_enter(&mut self, id: MarkId) -> Option<&Tooltip> {
        let interaction = self.entries.get(id.0)?.interaction.as_ref()?;
        self.hovered = Some(id);
        Some(&interaction.tooltip)
    }

    /// Pointer left a mark: revert emphasis and drop the label
    pub fn pointer_leave(&mut self, id: MarkId) {
        if self.hovered == Some(id) {
            self.hovered = None;
        }
    }

    pub fn hovered(&self) -> Option<MarkId> {
        self.hovered
    }

    /// Every text string drawn, in paint order (tooltips excluded)
    pub fn texts(&self) -> Vec<&str> {
        self.ordered()
            .filter_map(|(_, e)| match &e.shape {
                Shape::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Shapes in a given layer, in insertion order
    pub fn shapes_in(&self, layer: Layer) -> Vec<&Shape> {
        self.entries
            .iter()
            .filter(|e| e.layer == layer)
            .map(|e| &e.shape)
            .collect()
    }

    fn ordered(&self) -> impl Iterator<Item = (usize, &Entry)> {
        let mut ordered: Vec<(usize, &Entry)> = self.entries.iter().enumerate().collect();
        ordered.sort_by_key(|(_, e)| e.layer);
        ordered.into_iter()
    }

    /// Serialize as a standalone SVG document, including the current hover state
    pub fn to_svg(&self) -> String {
        let mut out = String::with_capacity(4096 + self.entries.len() * 128);
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
            w = num(self.width),
            h = num(self.height)
        );
        if let Some(bg) = &self.background {
            let _ = write!(
                out,
                r#"<rect width="100%" height="100%" fill="{}"/>"#,
                escape(bg)
            );
        }

        for (index, entry) in self.ordered() {
            match &entry.interaction {
                Some(interaction) => {
                    let shape = if self.hovered == Some(MarkId(index)) {
                        entry.shape.emphasized(&interaction.emphasis)
                    } else {
                        entry.shape.clone()
                    };
                    let label = interaction.tooltip.lines.join(" | ");
                    shape.write_svg(&mut out, index, Some(&label));
                }
                None => entry.shape.write_svg(&mut out, index, None),
            }
        }

        if let Some(tooltip) = self.hovered.and_then(|id| self.tooltip(id)) {
            tooltip.write_svg(&mut out);
        }

        out.push_str("</svg>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar_surface() -> (Surface, MarkId) {
        let mut surface = Surface::new(100.0, 50.0);
        surface.push(
            Layer::Title,
            Shape::text(50.0, 15.0, "Title", TextStyle::new("white", 12, Anchor::Middle)),
        );
        surface.push(
            Layer::Grid,
            Shape::Line {
                x1: 0.0,
                y1: 10.0,
                x2: 100.0,
                y2: 10.0,
                stroke: Stroke::new("rgba(255, 255, 255, 0.1)", 1.0),
            },
        );
        let id = surface.push_mark(
            Shape::rect(10.0, 10.0, 20.0, 30.0, "#0d6efd"),
            Emphasis::Fill("#0a58ca".to_string()),
            Tooltip::single(20.0, 0.0, "8,650 loans"),
        );
        (surface, id)
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(10.0), "10");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(1.23456), "1.23");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(100.0), "100");
    }

    #[test]
    fn test_layers_paint_in_order() {
        let (surface, _) = bar_surface();
        let svg = surface.to_svg();
        let grid = svg.find("<line").unwrap();
        let bar = svg.find("<rect").unwrap();
        let title = svg.find(">Title<").unwrap();
        assert!(grid < bar && bar < title);
    }

    #[test]
    fn test_hover_cycle() {
        let (mut surface, id) = bar_surface();
        assert!(!surface.to_svg().contains("class=\"tooltip\""));

        let label = surface.pointer_enter(id).unwrap().text();
        assert_eq!(label, "8,650 loans");
        assert_eq!(surface.hovered(), Some(id));
        let svg = surface.to_svg();
        assert!(svg.contains("#0a58ca"));
        assert!(svg.contains("class=\"tooltip\""));

        surface.pointer_leave(id);
        assert_eq!(surface.hovered(), None);
        let svg = surface.to_svg();
        assert!(!svg.contains("#0a58ca"));
        assert!(!svg.contains("class=\"tooltip\""));
    }

    #[test]
    fn test_marks_carry_native_title() {
        let (surface, _) = bar_surface();
        assert!(surface.to_svg().contains("<title>8,650 loans</title>"));
    }

    #[test]
    fn test_clear_drops_hover() {
        let (mut surface, id) = bar_surface();
        surface.pointer_enter(id);
        surface.clear();
        assert_eq!(surface.mark_count(), 0);
        assert_eq!(surface.hovered(), None);
        assert!(surface.pointer_enter(id).is_none());
    }

    #[test]
    fn test_text_is_escaped() {
        let mut surface = Surface::new(10.0, 10.0);
        surface.push(
            Layer::Axis,
            Shape::text(0.0, 0.0, "a<b", TextStyle::new("#adb5bd", 10, Anchor::End)),
        );
        assert!(surface.to_svg().contains("a&lt;b"));
    }
}

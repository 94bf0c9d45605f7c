//! Value records produced by the TEI extractors.
//!
//! All of these are plain immutable values: an extraction pass creates them
//! once from the parsed tree and hands them to the renderer and the cropper.
//! Nothing keeps a reference back into the XML, so the tree can be dropped as
//! soon as extraction returns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A page-relative rectangle in the coordinate space of the GROBID service
/// (top-left origin, PDF points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// 1-based page number.
    pub page: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub fn new(page: u32, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            page,
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (`x + width`).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// `(x, y, width, height)` without the page.
    pub fn coordinates(&self) -> (f64, f64, f64, f64) {
        (self.x, self.y, self.width, self.height)
    }

    /// Smallest rectangle on `self.page` enclosing both `self` and `other`.
    ///
    /// The page of `other` is ignored; callers only merge boxes that share a
    /// page.
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rectangle::new(self.page, x, y, right - x, bottom - y)
    }
}

/// One numbered structural division of the paper.
///
/// Only built when both `number` and `title` are non-empty; see
/// [`crate::tei::extract_sections`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Dotted hierarchical label, e.g. `"2.1"`.
    pub number: String,
    /// Heading text with the number prefix removed.
    pub title: String,
    /// Paragraph and formula text, blocks separated by a blank line.
    pub content: String,
}

impl Section {
    pub fn new(
        number: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            title: title.into(),
            content: content.into(),
        }
    }

    /// Markdown heading level: `"1"` → 2, `"1.1"` → 3, `"1.1.1"` → 4.
    pub fn heading_level(&self) -> usize {
        2 + self.number.matches('.').count()
    }
}

/// Whether a captioned visual block is a figure or a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualKind {
    Figure,
    Table,
}

impl VisualKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisualKind::Figure => "figure",
            VisualKind::Table => "table",
        }
    }
}

impl fmt::Display for VisualKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A whole captioned figure or table block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureTable {
    pub kind: VisualKind,
    /// `head` and `figDesc` text joined by a space.
    pub caption: String,
    pub rect: Rectangle,
}

impl FigureTable {
    pub fn page(&self) -> u32 {
        self.rect.page
    }

    pub fn coordinates(&self) -> (f64, f64, f64, f64) {
        self.rect.coordinates()
    }
}

/// An image asset nested inside a figure, with its own tighter box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graphic {
    /// Free-form type from the annotation (`bitmap`, `vector`, …); `unknown`
    /// when absent.
    pub graphic_type: String,
    pub rect: Rectangle,
    /// Caption of the enclosing figure, copied at extraction time.
    pub parent_caption: String,
}

impl Graphic {
    pub fn page(&self) -> u32 {
        self.rect.page
    }

    pub fn coordinates(&self) -> (f64, f64, f64, f64) {
        self.rect.coordinates()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_level_follows_dot_count() {
        assert_eq!(Section::new("1", "Intro", "").heading_level(), 2);
        assert_eq!(Section::new("2.1", "Sub", "").heading_level(), 3);
        assert_eq!(Section::new("3.1.2", "Deep", "").heading_level(), 4);
    }

    #[test]
    fn union_encloses_both_boxes() {
        let a = Rectangle::new(1, 10.0, 20.0, 5.0, 5.0);
        let b = Rectangle::new(1, 12.0, 18.0, 10.0, 3.0);
        let u = a.union(&b);
        assert_eq!(u, Rectangle::new(1, 10.0, 18.0, 12.0, 7.0));
    }

    #[test]
    fn coordinates_accessor_drops_page() {
        let fig = FigureTable {
            kind: VisualKind::Table,
            caption: "Table 1".into(),
            rect: Rectangle::new(1, 100.0, 200.0, 300.0, 150.0),
        };
        assert_eq!(fig.coordinates(), (100.0, 200.0, 300.0, 150.0));
        assert_eq!(fig.page(), 1);
    }

    #[test]
    fn visual_kind_serialises_lowercase() {
        let json = serde_json::to_string(&VisualKind::Figure).unwrap();
        assert_eq!(json, "\"figure\"");
        assert_eq!(VisualKind::Table.to_string(), "table");
    }
}

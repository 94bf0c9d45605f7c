//! TEI XML extraction.
//!
//! GROBID returns a TEI P5 document annotated with `coords` attributes. This
//! module turns that tree into three flat lists:
//!
//! ```text
//!  TEI XML ─► parse_tei ─► extract_sections          ─► Vec<Section>
//!                       ├► extract_figures_and_tables ─► Vec<FigureTable>
//!                       └► extract_graphics           ─► Vec<Graphic>
//! ```
//!
//! | Module       | Responsibility                                        |
//! |--------------|-------------------------------------------------------|
//! | [`tree`]     | [`TeiNode`] abstraction, roxmltree binding, parsing   |
//! | [`text`]     | Mixed-content flattening                              |
//! | [`coords`]   | `coords` attribute parsing and box merging            |
//! | [`sections`] | Numbered divisions                                    |
//! | [`visuals`]  | Figures, tables and nested graphics                   |
//! | [`model`]    | Plain value records                                   |

pub mod coords;
pub mod model;
pub mod sections;
pub mod text;
pub mod tree;
pub mod visuals;

pub use coords::{parse_coords, parse_segment, SegmentError};
pub use model::{FigureTable, Graphic, Rectangle, Section, VisualKind};
pub use sections::extract_sections;
pub use text::collect_text;
pub use tree::{parse_tei, TeiNode, TEI_NS};
pub use visuals::{caption_of, extract_figures_and_tables, extract_graphics};

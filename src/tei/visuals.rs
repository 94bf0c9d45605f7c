//! Figure, table and graphic extraction.
//!
//! Figures and tables are the whole captioned blocks. Graphics are the image
//! assets nested directly inside a `<figure>`, each with its own (usually
//! tighter) `coords`. Elements whose geometry is missing or unparseable are
//! left out of the results; GROBID annotations are routinely partial.

use super::coords::parse_coords;
use super::model::{FigureTable, Graphic, VisualKind};
use super::text::collect_text;
use super::tree::TeiNode;
use tracing::debug;

/// All figures (first) and then all tables below `root` that carry usable
/// coordinates, each batch in document order.
pub fn extract_figures_and_tables<'a, N: TeiNode<'a>>(root: N) -> Vec<FigureTable> {
    let mut out = Vec::new();
    for (tag, kind) in [("figure", VisualKind::Figure), ("table", VisualKind::Table)] {
        for node in root.descendants_named(tag) {
            if let Some(element) = figure_table_from(node, kind) {
                out.push(element);
            }
        }
    }
    debug!("extracted {} figures/tables", out.len());
    out
}

/// Every `<graphic>` directly inside a `<figure>` that carries usable
/// coordinates, tagged with its figure's caption.
pub fn extract_graphics<'a, N: TeiNode<'a>>(root: N) -> Vec<Graphic> {
    let mut out = Vec::new();
    for figure in root.descendants_named("figure") {
        let caption = caption_of(figure);
        for node in figure.child_elements().into_iter().filter(|c| c.is_tei("graphic")) {
            let Some(rect) = node.attr("coords").and_then(parse_coords) else {
                continue;
            };
            out.push(Graphic {
                graphic_type: node.attr("type").unwrap_or("unknown").to_string(),
                rect,
                parent_caption: caption.clone(),
            });
        }
    }
    debug!("extracted {} graphics", out.len());
    out
}

/// `<head>` and `<figDesc>` text joined by a single space.
pub fn caption_of<'a, N: TeiNode<'a>>(element: N) -> String {
    ["head", "figDesc"]
        .iter()
        .filter_map(|tag| element.find_child(tag))
        .map(collect_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn figure_table_from<'a, N: TeiNode<'a>>(node: N, kind: VisualKind) -> Option<FigureTable> {
    let rect = parse_coords(node.attr("coords")?)?;
    Some(FigureTable {
        kind,
        caption: caption_of(node),
        rect,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tei::model::Rectangle;
    use crate::tei::tree::parse_tei;

    fn wrap(body: &str) -> String {
        format!(
            r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><text><body>{body}</body></text></TEI>"#
        )
    }

    #[test]
    fn figures_then_tables_with_parsed_rectangles() {
        let xml = wrap(
            r#"<table coords="2,0,0,10,10"><head>Table 1</head></table>
               <figure coords="1,100,200,300,150"><head>Figure 1.</head><figDesc>A plot</figDesc></figure>
               <figure><head>no coords</head></figure>"#,
        );
        let doc = parse_tei(&xml).unwrap();
        let found = extract_figures_and_tables(doc.root_element());

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, VisualKind::Figure);
        assert_eq!(found[0].rect, Rectangle::new(1, 100.0, 200.0, 300.0, 150.0));
        assert_eq!(found[0].caption, "Figure 1. A plot");
        assert_eq!(found[1].kind, VisualKind::Table);
        assert_eq!(found[1].rect, Rectangle::new(2, 0.0, 0.0, 10.0, 10.0));
        assert_eq!(found[1].caption, "Table 1");
    }

    #[test]
    fn unparseable_coords_exclude_the_element() {
        let xml = wrap(
            r#"<figure coords="oops"><head>Bad</head></figure>
               <figure coords=""><head>Empty</head></figure>
               <figure coords="1,1,1"><head>Short</head></figure>"#,
        );
        let doc = parse_tei(&xml).unwrap();
        assert!(extract_figures_and_tables(doc.root_element()).is_empty());
    }

    #[test]
    fn caption_handles_missing_parts() {
        let xml = wrap(
            r#"<figure coords="1,0,0,1,1"><figDesc>Only description</figDesc></figure>
               <figure coords="1,0,0,1,1"><head>Only head</head></figure>
               <figure coords="1,0,0,1,1"/>"#,
        );
        let doc = parse_tei(&xml).unwrap();
        let captions: Vec<String> = extract_figures_and_tables(doc.root_element())
            .into_iter()
            .map(|f| f.caption)
            .collect();
        assert_eq!(captions, vec!["Only description", "Only head", ""]);
    }

    #[test]
    fn graphic_uses_its_own_coords_and_parent_caption() {
        let xml = wrap(
            r#"<figure coords="1,100.0,200.0,300.0,150.0">
                 <head>Figure 1. Test figure</head>
                 <figDesc>Description of <ref>test</ref> figure</figDesc>
                 <graphic coords="1,120.0,220.0,260.0,110.0" type="bitmap"/>
               </figure>"#,
        );
        let doc = parse_tei(&xml).unwrap();
        let graphics = extract_graphics(doc.root_element());

        assert_eq!(graphics.len(), 1);
        let g = &graphics[0];
        assert_eq!(g.rect, Rectangle::new(1, 120.0, 220.0, 260.0, 110.0));
        assert_eq!(g.graphic_type, "bitmap");
        assert_eq!(
            g.parent_caption,
            "Figure 1. Test figure Description of test figure"
        );
    }

    #[test]
    fn graphics_without_coords_or_type() {
        let xml = wrap(
            r#"<figure coords="1,0,0,50,50"><head>F</head>
                 <graphic type="vector"/>
                 <graphic coords="2,1,1,4,4;2,3,3,4,4"/>
               </figure>"#,
        );
        let doc = parse_tei(&xml).unwrap();
        let graphics = extract_graphics(doc.root_element());

        assert_eq!(graphics.len(), 1);
        assert_eq!(graphics[0].graphic_type, "unknown");
        assert_eq!(graphics[0].rect, Rectangle::new(2, 1.0, 1.0, 6.0, 6.0));
    }

    #[test]
    fn graphic_outside_figure_or_nested_deeper_is_not_visited() {
        let xml = wrap(
            r#"<graphic coords="1,0,0,5,5" type="bitmap"/>
               <figure coords="1,0,0,50,50"><p><graphic coords="1,0,0,5,5"/></p></figure>"#,
        );
        let doc = parse_tei(&xml).unwrap();
        assert!(extract_graphics(doc.root_element()).is_empty());
    }

    #[test]
    fn graphic_survives_figure_without_coords() {
        let xml = wrap(
            r#"<figure><head>Fig 2</head><graphic coords="3,1,2,3,4" type="bitmap"/></figure>"#,
        );
        let doc = parse_tei(&xml).unwrap();
        assert!(extract_figures_and_tables(doc.root_element()).is_empty());
        let graphics = extract_graphics(doc.root_element());
        assert_eq!(graphics.len(), 1);
        assert_eq!(graphics[0].parent_caption, "Fig 2");
    }
}

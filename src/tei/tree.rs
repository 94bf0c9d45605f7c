//! Labeled-tree view of a TEI document.
//!
//! The extractors never touch an XML library directly. They walk anything
//! implementing [`TeiNode`]: a node with a local name, attributes, its own
//! leading text, the "tail" text that follows it inside its parent, and
//! ordered element children. [`roxmltree`] nodes implement it below.

use crate::error::Grobid2MdError;
use std::borrow::Cow;

/// Namespace GROBID puts on every TEI element.
pub const TEI_NS: &str = "http://www.tei-c.org/ns/1.0";

/// Read-only element node of a parsed TEI tree.
///
/// `'a` is the lifetime of the parsed document, so names, attributes and
/// text read from a node outlive the node handle itself.
pub trait TeiNode<'a>: Copy {
    /// Tag name without prefix or namespace.
    fn local_name(&self) -> &'a str;

    /// Namespace URI, if the element has one.
    fn namespace(&self) -> Option<&'a str>;

    /// Value of an un-namespaced attribute.
    fn attr(&self, name: &str) -> Option<&'a str>;

    /// Text between the start tag and the first child element. Comments
    /// and processing instructions are skipped, the text around them kept.
    fn own_text(&self) -> Cow<'a, str>;

    /// Text between the end tag and the next sibling element, with the same
    /// comment handling as [`TeiNode::own_text`].
    fn tail_text(&self) -> Cow<'a, str>;

    /// Element children in document order.
    fn child_elements(&self) -> Vec<Self>;

    /// `true` for a TEI element named `name`. Un-namespaced elements are
    /// accepted too, so hand-written fixtures without `xmlns` still match.
    fn is_tei(&self, name: &str) -> bool {
        self.local_name() == name && matches!(self.namespace(), None | Some(TEI_NS))
    }

    /// First direct child that is the TEI element `name`.
    fn find_child(&self, name: &str) -> Option<Self> {
        self.child_elements().into_iter().find(|c| c.is_tei(name))
    }

    /// Every element below this one in document order (self excluded).
    fn descendant_elements(&self) -> Vec<Self> {
        let mut out = Vec::new();
        push_descendants(*self, &mut out);
        out
    }

    /// Descendants that are the TEI element `name`, in document order.
    fn descendants_named(&self, name: &str) -> Vec<Self> {
        self.descendant_elements()
            .into_iter()
            .filter(|n| n.is_tei(name))
            .collect()
    }
}

fn push_descendants<'a, N: TeiNode<'a>>(node: N, out: &mut Vec<N>) {
    for child in node.child_elements() {
        out.push(child);
        push_descendants(child, out);
    }
}

/// Join the text nodes in a run of siblings, stopping at the first element.
fn text_run<'a, 'input: 'a>(first: Option<roxmltree::Node<'a, 'input>>) -> Cow<'a, str> {
    let mut run: Cow<'a, str> = Cow::Borrowed("");
    let mut cursor = first;
    while let Some(node) = cursor {
        if node.is_element() {
            break;
        }
        if let Some(text) = node.text().filter(|_| node.is_text()) {
            if run.is_empty() {
                run = Cow::Borrowed(text);
            } else {
                run.to_mut().push_str(text);
            }
        }
        cursor = node.next_sibling();
    }
    run
}

impl<'a, 'input: 'a> TeiNode<'a> for roxmltree::Node<'a, 'input> {
    fn local_name(&self) -> &'a str {
        self.tag_name().name()
    }

    fn namespace(&self) -> Option<&'a str> {
        self.tag_name().namespace()
    }

    fn attr(&self, name: &str) -> Option<&'a str> {
        self.attribute(name)
    }

    fn own_text(&self) -> Cow<'a, str> {
        text_run(self.first_child())
    }

    fn tail_text(&self) -> Cow<'a, str> {
        text_run(self.next_sibling())
    }

    fn child_elements(&self) -> Vec<Self> {
        self.children().filter(|c| c.is_element()).collect()
    }
}

/// Parse TEI XML into a [`roxmltree::Document`].
///
/// A document that is not well-formed is fatal for that document: no
/// sections and no visual elements can be recovered from it.
pub fn parse_tei(xml: &str) -> Result<roxmltree::Document<'_>, Grobid2MdError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    roxmltree::Document::parse_with_options(xml, options).map_err(|e| {
        Grobid2MdError::MalformedXml {
            detail: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_xml_is_an_error() {
        let err = parse_tei("<TEI><text>").unwrap_err();
        assert!(matches!(err, Grobid2MdError::MalformedXml { .. }));
    }

    #[test]
    fn tei_namespace_and_bare_elements_match() {
        let doc = parse_tei(
            r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><div/><x:div xmlns:x="urn:other"/></TEI>"#,
        )
        .unwrap();
        let root = doc.root_element();
        assert!(root.is_tei("TEI"));
        let divs = root.descendants_named("div");
        assert_eq!(divs.len(), 1, "foreign-namespace div must be ignored");

        let bare = parse_tei("<TEI><div/></TEI>").unwrap();
        assert_eq!(bare.root_element().descendants_named("div").len(), 1);
    }

    #[test]
    fn descendants_are_in_document_order() {
        let doc = parse_tei("<a><b><c/></b><d/></a>").unwrap();
        let names: Vec<&str> = doc
            .root_element()
            .descendant_elements()
            .iter()
            .map(|n| n.local_name())
            .collect();
        assert_eq!(names, vec!["b", "c", "d"]);
    }

    #[test]
    fn text_and_tail_slots() {
        let doc = parse_tei("<p>lead <b>bold</b> tail</p>").unwrap();
        let p = doc.root_element();
        assert_eq!(p.own_text(), "lead ");
        let b = p.find_child("b").unwrap();
        assert_eq!(b.own_text(), "bold");
        assert_eq!(b.tail_text(), " tail");
    }

    #[test]
    fn text_slots_skip_comments_and_processing_instructions() {
        let doc = parse_tei("<p>one <!-- c --> two <?pi x?>three<b/>four <!-- d -->five</p>")
            .unwrap();
        let p = doc.root_element();
        assert_eq!(p.own_text(), "one  two three");
        let b = p.find_child("b").unwrap();
        assert_eq!(b.tail_text(), "four five");
        assert_eq!(b.own_text(), "");
    }

    #[test]
    fn attributes_outlive_the_node_handle() {
        let doc = parse_tei(r#"<TEI><div><head n="3">x</head></div></TEI>"#).unwrap();
        let number: Option<&str> = doc
            .root_element()
            .descendants_named("head")
            .first()
            .and_then(|h| h.attr("n"));
        assert_eq!(number, Some("3"));
    }
}

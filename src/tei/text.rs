//! Mixed-content flattening.

use super::tree::TeiNode;

/// Flatten an element's mixed content into one string.
///
/// Concatenates the element's own text, then each child's flattened text
/// followed by that child's tail, recursively. Inline markup (`<ref>`,
/// `<hi>`, `<formula>`, …) contributes its text in place; empty elements
/// contribute nothing. Only the final result is trimmed, so spacing carried
/// by tail text survives.
pub fn collect_text<'a, N: TeiNode<'a>>(node: N) -> String {
    let mut buf = String::new();
    push_text(node, &mut buf);
    buf.trim().to_string()
}

fn push_text<'a, N: TeiNode<'a>>(node: N, buf: &mut String) {
    buf.push_str(&node.own_text());
    for child in node.child_elements() {
        push_text(child, buf);
        buf.push_str(&child.tail_text());
    }
}

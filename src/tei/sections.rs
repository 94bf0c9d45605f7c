//! Section extraction: numbered `<div>` → [`Section`].

use super::model::Section;
use super::text::collect_text;
use super::tree::TeiNode;
use tracing::debug;

/// Extract every numbered division below `root`, in document order.
///
/// The result is flat: nesting is carried only by the dotted `number`.
/// Divisions without a `<head>`, without an `n` attribute, or whose title is
/// empty once the number is stripped are left out.
pub fn extract_sections<'a, N: TeiNode<'a>>(root: N) -> Vec<Section> {
    let divs = root.descendants_named("div");
    let total = divs.len();
    let sections: Vec<Section> = divs.into_iter().filter_map(section_from_div).collect();
    debug!("{} of {} divisions became sections", sections.len(), total);
    sections
}

fn section_from_div<'a, N: TeiNode<'a>>(div: N) -> Option<Section> {
    let head = div.find_child("head")?;

    let number = head.attr("n").unwrap_or("").trim();
    if number.is_empty() {
        return None;
    }

    let heading = collect_text(head);
    let title = heading.strip_prefix(number).unwrap_or(&heading).trim();
    if title.is_empty() {
        return None;
    }

    let mut blocks = Vec::new();
    collect_blocks(div, true, &mut blocks);

    Some(Section::new(number, title, blocks.join("\n\n")))
}

/// Gather paragraph text from every `<p>` below `node`, plus `<formula>`
/// elements standing directly in the division, in document order.
fn collect_blocks<'a, N: TeiNode<'a>>(node: N, division_level: bool, out: &mut Vec<String>) {
    for child in node.child_elements() {
        if child.is_tei("p") || (division_level && child.is_tei("formula")) {
            let text = collect_text(child);
            if !text.is_empty() {
                out.push(text);
            }
        } else {
            collect_blocks(child, false, out);
        }
    }
}

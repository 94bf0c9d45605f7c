//! Parsing of GROBID `coords` annotations.
//!
//! The attribute value is a `;`-separated list of `page,x,y,width,height`
//! segments. One logical element (a table annotated line by line, a caption
//! wrapping across columns) may be described by several boxes; they are
//! merged into the smallest rectangle enclosing all of them.
//!
//! Only segments on the page of the first valid segment are merged. Later
//! pages are dropped, not returned as extra rectangles.

use super::model::Rectangle;
use thiserror::Error;

/// Why a single `page,x,y,width,height` segment was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegmentError {
    #[error("expected 5 comma-separated fields, found {found}")]
    FieldCount { found: usize },

    #[error("page '{0}' is not a non-negative integer")]
    InvalidPage(String),

    #[error("'{0}' is not a number")]
    InvalidNumber(String),

    #[error("'{0}' is not a finite number")]
    NonFinite(String),
}

/// Parse one `page,x,y,width,height` segment.
pub fn parse_segment(segment: &str) -> Result<Rectangle, SegmentError> {
    let fields: Vec<&str> = segment.split(',').map(str::trim).collect();
    if fields.len() != 5 {
        return Err(SegmentError::FieldCount {
            found: fields.len(),
        });
    }

    let page: u32 = fields[0]
        .parse()
        .map_err(|_| SegmentError::InvalidPage(fields[0].to_string()))?;

    let mut values = [0.0f64; 4];
    for (slot, raw) in values.iter_mut().zip(&fields[1..]) {
        let v: f64 = raw
            .parse()
            .map_err(|_| SegmentError::InvalidNumber(raw.to_string()))?;
        if !v.is_finite() {
            return Err(SegmentError::NonFinite(raw.to_string()));
        }
        *slot = v;
    }

    let [x, y, width, height] = values;
    Ok(Rectangle::new(page, x, y, width, height))
}

/// Parse a full `coords` attribute into one enclosing rectangle.
///
/// Invalid segments are skipped. Returns `None` when no segment parses.
pub fn parse_coords(raw: &str) -> Option<Rectangle> {
    let mut valid = raw
        .split(';')
        .filter(|s| !s.trim().is_empty())
        .filter_map(|s| parse_segment(s).ok());

    let first = valid.next()?;
    Some(
        valid
            .filter(|r| r.page == first.page)
            .fold(first, |acc, r| acc.union(&r)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_and_garbage_yield_none() {
        assert_eq!(parse_coords(""), None);
        assert_eq!(parse_coords("garbage"), None);
        assert_eq!(parse_coords(";;"), None);
        assert_eq!(parse_coords("invalid,coords,string"), None);
    }

    #[test]
    fn four_fields_is_rejected() {
        assert_eq!(parse_coords("1,1,2,3"), None);
        assert_eq!(
            parse_segment("1,1,2,3"),
            Err(SegmentError::FieldCount { found: 4 })
        );
    }

    #[test]
    fn six_fields_is_rejected() {
        assert_eq!(parse_coords("1,1,2,3,4,5"), None);
    }

    #[test]
    fn single_segment_is_returned_as_is() {
        let r = parse_coords("1,100.0,200.0,300.0,150.0").unwrap();
        assert_eq!(r, Rectangle::new(1, 100.0, 200.0, 300.0, 150.0));
    }

    #[test]
    fn same_page_segments_merge_to_enclosing_box() {
        let raw = "3,312.00,193.02,252.00,7.40;3,312.00,202.02,252.00,7.40;\
                   3,312.00,211.02,252.00,7.40;3,312.00,220.02,36.13,7.40";
        let r = parse_coords(raw).unwrap();
        assert_eq!(r.page, 3);
        assert!(approx(r.x, 312.0));
        assert!(approx(r.y, 193.02));
        assert!(approx(r.right(), 564.0));
        assert!(approx(r.bottom(), 227.42));
        assert!(approx(r.width, 252.0));
        assert!(approx(r.height, 34.40));
    }

    #[test]
    fn merge_takes_min_and_max_of_every_edge() {
        // second box sticks out left and below, first sticks out top and right
        let r = parse_coords("2,50,100,200,50;2,40,120,100,80").unwrap();
        assert!(approx(r.x, 40.0));
        assert!(approx(r.y, 100.0));
        assert!(approx(r.right(), 250.0));
        assert!(approx(r.bottom(), 200.0));
    }

    #[test]
    fn merged_box_is_minimal() {
        let segments = [
            Rectangle::new(1, 10.0, 10.0, 5.0, 5.0),
            Rectangle::new(1, 30.0, 2.0, 1.0, 1.0),
            Rectangle::new(1, 12.0, 40.0, 3.0, 2.0),
        ];
        let raw = segments
            .iter()
            .map(|s| format!("{},{},{},{},{}", s.page, s.x, s.y, s.width, s.height))
            .collect::<Vec<_>>()
            .join(";");
        let r = parse_coords(&raw).unwrap();

        for s in &segments {
            assert!(r.x <= s.x && r.y <= s.y);
            assert!(r.right() >= s.right() && r.bottom() >= s.bottom());
        }
        // every edge is touched by some segment, so no smaller box exists
        assert!(segments.iter().any(|s| approx(s.x, r.x)));
        assert!(segments.iter().any(|s| approx(s.y, r.y)));
        assert!(segments.iter().any(|s| approx(s.right(), r.right())));
        assert!(segments.iter().any(|s| approx(s.bottom(), r.bottom())));
    }

    #[test]
    fn invalid_segments_are_skipped() {
        let r = parse_coords("1,10,10,5,5;oops;1,x,1,1,1;1,20,20,5,5").unwrap();
        assert_eq!(r, Rectangle::new(1, 10.0, 10.0, 15.0, 15.0));
    }

    #[test]
    fn leading_invalid_segment_does_not_pick_the_page() {
        let r = parse_coords("bad;2,1,1,1,1;3,0,0,9,9").unwrap();
        assert_eq!(r, Rectangle::new(2, 1.0, 1.0, 1.0, 1.0));
    }

    #[test]
    fn other_pages_are_dropped() {
        let r = parse_coords("1,10,20,5,5;2,1,1,1,1").unwrap();
        assert_eq!(r, Rectangle::new(1, 10.0, 20.0, 5.0, 5.0));
    }

    #[test]
    fn later_same_page_segment_after_other_page_still_merges() {
        let r = parse_coords("1,0,0,1,1;2,50,50,1,1;1,4,4,1,1").unwrap();
        assert_eq!(r, Rectangle::new(1, 0.0, 0.0, 5.0, 5.0));
    }

    #[test]
    fn whitespace_around_fields_is_tolerated() {
        let r = parse_coords(" 1, 10.5 ,20,5,5 ").unwrap();
        assert_eq!(r, Rectangle::new(1, 10.5, 20.0, 5.0, 5.0));
    }

    #[test]
    fn non_numeric_and_non_finite_fields_are_rejected() {
        assert!(matches!(
            parse_segment("1,a,2,3,4"),
            Err(SegmentError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_segment("-1,1,2,3,4"),
            Err(SegmentError::InvalidPage(_))
        ));
        assert!(matches!(
            parse_segment("1,NaN,2,3,4"),
            Err(SegmentError::NonFinite(_))
        ));
        assert!(matches!(
            parse_segment("1,inf,2,3,4"),
            Err(SegmentError::NonFinite(_))
        ));
    }
}

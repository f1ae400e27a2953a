use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const ELLIPSIS: char = '\u{2026}';

/// Width of `s` in terminal cells
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` to at most `max_cells`, ending in `…` when something was dropped.
/// Never splits a grapheme cluster.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 0 {
        return String::new();
    }
    let budget = max_cells - 1;
    let mut width = 0;
    let mut out = String::new();
    for g in s.graphemes(true) {
        let gw = display_width(g);
        if width + gw > budget {
            break;
        }
        width += gw;
        out.push_str(g);
    }
    out.push(ELLIPSIS);
    out
}

/// Right-pad `s` with spaces to `cells` wide. Wider strings are returned as is.
pub fn pad_to_width(s: &str, cells: usize) -> String {
    let w = display_width(s);
    let mut out = s.to_string();
    if w < cells {
        out.push_str(&" ".repeat(cells - w));
    }
    out
}

/// Byte offset of the grapheme after the one at `offset`, or `None` at the end
pub fn next_grapheme_boundary(s: &str, offset: usize) -> Option<usize> {
    let g = s.get(offset..)?.graphemes(true).next()?;
    Some(offset + g.len())
}

/// Byte offset of the grapheme before `offset`, or `None` at the start
pub fn prev_grapheme_boundary(s: &str, offset: usize) -> Option<usize> {
    let g = s.get(..offset)?.graphemes(true).next_back()?;
    Some(offset - g.len())
}

/// Terminal column of byte `offset`
pub fn byte_offset_to_display_col(s: &str, offset: usize) -> usize {
    display_width(&s[..offset.min(s.len())])
}

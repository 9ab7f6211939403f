use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells. Task names are frequently Japanese, so
/// byte or char counts cannot be used for column alignment.
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(grapheme_display_width).sum()
}

/// Truncate a string to fit within `max_cells` terminal cells, appending `…` if truncated.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells <= 1 {
        return "\u{2026}".to_string();
    }
    let budget = max_cells - 1; // reserve 1 cell for '…'
    let mut width = 0;
    let mut result = String::new();
    for grapheme in s.graphemes(true) {
        let gw = grapheme_display_width(grapheme);
        if width + gw > budget {
            break;
        }
        width += gw;
        result.push_str(grapheme);
    }
    result.push('\u{2026}');
    result
}

/// Fit `s` into exactly `cells` columns: truncate if too wide, pad with
/// spaces on the right otherwise.
pub fn pad_to_width(s: &str, cells: usize) -> String {
    let fitted = truncate_to_width(s, cells);
    let width = display_width(&fitted);
    let mut out = fitted;
    // a wide char can leave the truncated text one cell short
    out.extend(std::iter::repeat_n(' ', cells.saturating_sub(width)));
    out
}

/// Center `s` in `cells` columns. Extra space goes to the right.
pub fn center_to_width(s: &str, cells: usize) -> String {
    let fitted = truncate_to_width(s, cells);
    let slack = cells.saturating_sub(display_width(&fitted));
    let left = slack / 2;
    let mut out = " ".repeat(left);
    out.push_str(&fitted);
    out.push_str(&" ".repeat(slack - left));
    out
}

/// Display width of a grapheme cluster. Tabs count as 4 cells.
fn grapheme_display_width(g: &str) -> usize {
    if g == "\t" {
        return 4;
    }
    UnicodeWidthStr::width(g)
}

use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells. Tabs count as 4 cells.
pub fn display_width(s: &str) -> usize {
    s.split('\t')
        .enumerate()
        .map(|(i, part)| {
            let w = UnicodeWidthStr::width(part);
            if i > 0 { w + 4 } else { w }
        })
        .sum()
}

/// Spaces needed after `s` to fill `cells` terminal cells
pub fn padding_for(s: &str, cells: usize) -> String {
    " ".repeat(cells.saturating_sub(display_width(s)))
}

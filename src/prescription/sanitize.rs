/// Clean OCR output before it reaches the extractor.
///
/// Strips control characters, folds the typographic look-alikes OCR engines
/// emit for prescription shorthand (en/em dashes in `1–0–1`, `×` in `× 5 days`)
/// back to ASCII, trims every line and drops blank ones.
pub fn sanitize_ocr_text(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| match c {
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => Some('-'),
            '\u{00D7}' => Some('x'),
            '\u{2044}' | '\u{FF0F}' => Some('/'),
            '\u{2018}' | '\u{2019}' => Some('\''),
            '\u{00A0}' | '\t' => Some(' '),
            c if c.is_control() && c != '\n' => None,
            c => Some(c),
        })
        .collect::<String>()
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

//! OCR line parser.
//!
//! Turns raw key text into step records. Anything that does not start with a
//! step number (headers, page numbers, blank lines) is skipped.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Goto, KeyError, KeyResult, StepId, StepRecord};

/// Character class of every accepted prime mark.
const PRIMES: &str = r"['\x{2019}\x{2018}\x{00B4}\x{2032}\x{2033}\x{2034}]";

/// `<digits><primes>[.] <text>`
static STEP_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(?P<id>\d+{PRIMES}*)\.?\s+(?P<rest>.*)$")).expect("valid step regex")
});

/// Explicit marker before a trailing successor. Arrows and the em dash always
/// mark a successor; a hyphen or en dash glued to a digit is a numeric range
/// (`4-5`), not a marker.
static ARROW_GOTO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?:(?P<arrow>->|\x{{2192}}|\x{{2014}})|(?:^|[^\d])(?P<dash>\x{{2013}}|-))\s*(?P<goto>\d+{PRIMES}*)\.?$"
    ))
    .expect("valid arrow regex")
});

/// Bare trailing successor separated by whitespace.
static BARE_GOTO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\s(?P<goto>\d+{PRIMES}*)\.?$")).expect("valid goto regex")
});

/// Parse one raw line into a step record.
///
/// Returns `None` for lines that are not step lines.
pub fn parse_line(line: &str) -> Option<StepRecord> {
    let line = line.replace(['\u{00A0}', '\u{202F}'], " ");
    let caps = STEP_LINE.captures(line.trim())?;

    let id = StepId::parse(&caps["id"]).ok()?;
    let rest = caps["rest"].trim();

    let (text, goto) = if let Some(m) = ARROW_GOTO.captures(rest) {
        let start = m.name("arrow").or_else(|| m.name("dash")).map_or(rest.len(), |g| g.start());
        (&rest[..start], successor(&m["goto"]))
    } else if let Some(m) = BARE_GOTO.captures(rest) {
        let start = m.get(0).map_or(rest.len(), |g| g.start());
        (&rest[..start], successor(&m["goto"]))
    } else {
        (rest, Goto::End)
    };

    Some(StepRecord { id, text: clean_text(text), goto })
}

fn successor(token: &str) -> Goto {
    StepId::parse(token).map_or(Goto::End, Goto::Step)
}

/// Strip whitespace and the punctuation OCR leaves around a description.
fn clean_text(text: &str) -> String {
    text.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '.' | ';' | ',' | ':' | '-' | '\u{2013}' | '\u{2014}')
    })
    .to_string()
}

/// Parse a whole document, keeping step lines in document order.
pub fn parse_document(text: &str) -> Vec<StepRecord> {
    let records: Vec<_> = text.lines().filter_map(parse_line).collect();
    tracing::debug!(lines = text.lines().count(), steps = records.len(), "Parsed OCR text");
    records
}

/// Read and parse an OCR text file.
///
/// A missing file is an error; nothing is produced for it.
pub fn parse_file(path: &Path) -> KeyResult<Vec<StepRecord>> {
    if !path.exists() {
        return Err(KeyError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|e| KeyError::io(path, e))?;
    Ok(parse_document(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str) -> StepId {
        StepId::parse(id).unwrap()
    }

    #[test]
    fn test_bare_trailing_goto() {
        let rec = parse_line("2. Leaves opposite, margin entire 5").unwrap();
        assert_eq!(rec.id, step("2"));
        assert_eq!(rec.text, "Leaves opposite, margin entire");
        assert_eq!(rec.goto, Goto::Step(step("5")));
    }

    #[test]
    fn test_arrow_goto() {
        let rec = parse_line("2'. Leaves alternate, margin toothed -> 8").unwrap();
        assert_eq!(rec.id, step("2'"));
        assert_eq!(rec.text, "Leaves alternate, margin toothed");
        assert_eq!(rec.goto, Goto::Step(step("8")));
    }

    #[test]
    fn test_unicode_markers_and_primes() {
        let rec = parse_line("4’ Petals yellow → 6′").unwrap();
        assert_eq!(rec.id, step("4'"));
        assert_eq!(rec.text, "Petals yellow");
        assert_eq!(rec.goto, Goto::Step(step("6'")));

        let rec = parse_line("5. Fruit a capsule — 9.").unwrap();
        assert_eq!(rec.text, "Fruit a capsule");
        assert_eq!(rec.goto, Goto::Step(step("9")));

        let rec = parse_line("5'. Fruit a berry –11").unwrap();
        assert_eq!(rec.text, "Fruit a berry");
        assert_eq!(rec.goto, Goto::Step(step("11")));
    }

    #[test]
    fn test_terminal_line() {
        let rec = parse_line("7. Flowers white; sepals hairy. Viola alba.").unwrap();
        assert_eq!(rec.text, "Flowers white; sepals hairy. Viola alba");
        assert_eq!(rec.goto, Goto::End);
    }

    #[test]
    fn test_numeric_range_is_not_a_goto() {
        let rec = parse_line("3. Stamens 4-5").unwrap();
        assert_eq!(rec.text, "Stamens 4-5");
        assert_eq!(rec.goto, Goto::End);
    }

    #[test]
    fn test_arrow_glued_to_digit_is_a_goto() {
        let rec = parse_line("4. Petals 5->7").unwrap();
        assert_eq!(rec.text, "Petals 5");
        assert_eq!(rec.goto, Goto::Step(step("7")));

        let rec = parse_line("6. Sepals 2\u{2192}9").unwrap();
        assert_eq!(rec.text, "Sepals 2");
        assert_eq!(rec.goto, Goto::Step(step("9")));

        let rec = parse_line("8. Carpels 3\u{2014}10").unwrap();
        assert_eq!(rec.goto, Goto::Step(step("10")));

        let rec = parse_line("9. Stamens 4\u{2013}5").unwrap();
        assert_eq!(rec.text, "Stamens 4\u{2013}5");
        assert_eq!(rec.goto, Goto::End);
    }

    #[test]
    fn test_non_breaking_spaces() {
        let rec = parse_line("3.\u{00A0}Leaves glabrous\u{00A0}4").unwrap();
        assert_eq!(rec.id, step("3"));
        assert_eq!(rec.text, "Leaves glabrous");
        assert_eq!(rec.goto, Goto::Step(step("4")));
    }

    #[test]
    fn test_noise_lines_are_skipped() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   ").is_none());
        assert!(parse_line("FLORA GALLICA").is_none());
        assert!(parse_line("124").is_none());
        assert!(parse_line("Genus Viola L.").is_none());
    }

    #[test]
    fn test_parse_is_deterministic() {
        let line = "12''. Calyx teeth unequal -> 13";
        assert_eq!(parse_line(line), parse_line(line));
    }

    #[test]
    fn test_parse_document_keeps_order() {
        let text = "KEY TO SPECIES\n1. Annual 2\n\n1'. Perennial 3\n- 57 -\n2. Flowers blue\n";
        let ids: Vec<_> =
            parse_document(text).into_iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "1'", "2"]);
    }

    #[test]
    fn test_parse_missing_file() {
        let err = parse_file(Path::new("/definitely/not/here_ocr.txt")).unwrap_err();
        assert!(matches!(err, KeyError::NotFound(_)));
    }
}

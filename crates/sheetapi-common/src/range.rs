//! A1 notation for the ranges a spreadsheet store is addressed with.
//!
//! Only the forms this workspace issues or accepts are modelled: `Title`, `Title!A1`,
//! `Title!A1:C3`, `Title!1:1`, `Title!A:C` and open-ended mixes such as `Title!A2:C`.
//! Rows and columns are 1-based throughout, matching the store's own numbering.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors produced while parsing A1 notation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum A1ParseError {
    Empty,
    UnterminatedQuote,
    /// Text after a quoted sheet title that is not a `!` area suffix.
    TrailingInput(String),
    InvalidReference(String),
    ZeroRow,
    /// Start/end bounds were not ordered (start <= end).
    RangeOrder,
}

impl fmt::Display for A1ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            A1ParseError::Empty => write!(f, "range is empty"),
            A1ParseError::UnterminatedQuote => write!(f, "quoted sheet title is not terminated"),
            A1ParseError::TrailingInput(rest) => {
                write!(f, "unexpected `{rest}` after quoted sheet title")
            }
            A1ParseError::InvalidReference(r) => write!(f, "`{r}` is not an A1 reference"),
            A1ParseError::ZeroRow => write!(f, "row numbers are 1-based"),
            A1ParseError::RangeOrder => {
                write!(f, "range must be ordered so the start is above/left of the end")
            }
        }
    }
}

impl Error for A1ParseError {}

/// One side of an area. Either part may be open (`A` is a whole column, `3` a whole row).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct CellRef {
    pub col: Option<u32>,
    pub row: Option<u32>,
}

impl CellRef {
    pub const fn cell(row: u32, col: u32) -> Self {
        Self {
            col: Some(col),
            row: Some(row),
        }
    }

    pub const fn row(row: u32) -> Self {
        Self {
            col: None,
            row: Some(row),
        }
    }

    pub const fn col(col: u32) -> Self {
        Self {
            col: Some(col),
            row: None,
        }
    }

    fn parse(text: &str) -> Result<Self, A1ParseError> {
        let invalid = || A1ParseError::InvalidReference(text.to_string());
        let rest = text.strip_prefix('$').unwrap_or(text);
        let letters_len = rest.bytes().take_while(u8::is_ascii_alphabetic).count();
        let (letters, digits) = rest.split_at(letters_len);
        let digits = digits.strip_prefix('$').unwrap_or(digits);

        if letters.is_empty() && digits.is_empty() {
            return Err(invalid());
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let col = if letters.is_empty() {
            None
        } else {
            Some(letters_to_column(&letters.to_ascii_uppercase()).ok_or_else(invalid)?)
        };
        let row = if digits.is_empty() {
            None
        } else {
            let row: u32 = digits.parse().map_err(|_| invalid())?;
            if row == 0 {
                return Err(A1ParseError::ZeroRow);
            }
            Some(row)
        };
        Ok(Self { col, row })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = self.col {
            f.write_str(&column_to_letters(col))?;
        }
        if let Some(row) = self.row {
            write!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Concrete 1-based bounds of a range. `None` on a last row/column means unbounded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GridBounds {
    pub first_row: u32,
    pub last_row: Option<u32>,
    pub first_col: u32,
    pub last_col: Option<u32>,
}

impl GridBounds {
    pub fn contains_row(&self, row: u32) -> bool {
        row >= self.first_row && self.last_row.is_none_or(|last| row <= last)
    }

    pub fn contains_col(&self, col: u32) -> bool {
        col >= self.first_col && self.last_col.is_none_or(|last| col <= last)
    }
}

/// A sheet title plus an optional area on that sheet.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct A1Range {
    pub sheet: String,
    pub start: Option<CellRef>,
    /// Only ever set together with `start`.
    pub end: Option<CellRef>,
}

impl A1Range {
    /// The whole tab, e.g. `Sheet1`.
    pub fn whole_sheet(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            start: None,
            end: None,
        }
    }

    pub fn cell(sheet: impl Into<String>, row: u32, col: u32) -> Self {
        Self {
            sheet: sheet.into(),
            start: Some(CellRef::cell(row, col)),
            end: None,
        }
    }

    /// Rectangle from `(first_row, first_col)` to `(last_row, last_col)`, inclusive.
    pub fn rect(
        sheet: impl Into<String>,
        first_row: u32,
        first_col: u32,
        last_row: u32,
        last_col: u32,
    ) -> Self {
        Self {
            sheet: sheet.into(),
            start: Some(CellRef::cell(first_row, first_col)),
            end: Some(CellRef::cell(last_row, last_col)),
        }
    }

    /// Whole rows, e.g. `Sheet1!1:1`.
    pub fn rows(sheet: impl Into<String>, first_row: u32, last_row: u32) -> Self {
        Self {
            sheet: sheet.into(),
            start: Some(CellRef::row(first_row)),
            end: Some(CellRef::row(last_row)),
        }
    }

    pub fn parse(input: &str) -> Result<Self, A1ParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(A1ParseError::Empty);
        }

        if let Some(quoted) = input.strip_prefix('\'') {
            let (sheet, rest) = split_quoted_title(quoted)?;
            return match rest {
                "" => Ok(Self::whole_sheet(sheet)),
                _ => match rest.strip_prefix('!') {
                    Some(area) => {
                        let (start, end) = parse_area(area)?;
                        Ok(Self {
                            sheet,
                            start: Some(start),
                            end,
                        })
                    }
                    None => Err(A1ParseError::TrailingInput(rest.to_string())),
                },
            };
        }

        // Unquoted titles may themselves contain `!`; only split when the suffix is an area.
        if let Some((sheet, area)) = input.rsplit_once('!') {
            if !sheet.is_empty() {
                if let Ok((start, end)) = parse_area(area) {
                    return Ok(Self {
                        sheet: sheet.to_string(),
                        start: Some(start),
                        end,
                    });
                }
            }
        }
        Ok(Self::whole_sheet(input))
    }

    pub fn is_whole_sheet(&self) -> bool {
        self.start.is_none()
    }

    pub fn bounds(&self) -> GridBounds {
        let Some(start) = self.start else {
            return GridBounds {
                first_row: 1,
                last_row: None,
                first_col: 1,
                last_col: None,
            };
        };
        let end = self.end.unwrap_or(start);
        GridBounds {
            first_row: start.row.unwrap_or(1),
            last_row: end.row,
            first_col: start.col.unwrap_or(1),
            last_col: end.col,
        }
    }
}

impl fmt::Display for A1Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_sheet_title(f, &self.sheet)?;
        if let Some(start) = self.start {
            write!(f, "!{start}")?;
            if let Some(end) = self.end {
                write!(f, ":{end}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for A1Range {
    type Err = A1ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "serde")]
impl Serialize for A1Range {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for A1Range {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        A1Range::parse(&text).map_err(serde::de::Error::custom)
    }
}

fn split_quoted_title(quoted: &str) -> Result<(String, &str), A1ParseError> {
    let mut title = String::new();
    let mut chars = quoted.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if ch != '\'' {
            title.push(ch);
            continue;
        }
        if let Some((_, '\'')) = chars.peek() {
            chars.next();
            title.push('\'');
            continue;
        }
        return Ok((title, &quoted[idx + 1..]));
    }
    Err(A1ParseError::UnterminatedQuote)
}

fn parse_area(area: &str) -> Result<(CellRef, Option<CellRef>), A1ParseError> {
    match area.split_once(':') {
        Some((start, end)) => {
            let start = CellRef::parse(start)?;
            let end = CellRef::parse(end)?;
            let rows_reversed = matches!((start.row, end.row), (Some(a), Some(b)) if a > b);
            let cols_reversed = matches!((start.col, end.col), (Some(a), Some(b)) if a > b);
            if rows_reversed || cols_reversed {
                return Err(A1ParseError::RangeOrder);
            }
            Ok((start, Some(end)))
        }
        None => Ok((CellRef::parse(area)?, None)),
    }
}

fn needs_quoting(sheet: &str) -> bool {
    sheet.is_empty()
        || sheet
            .chars()
            .any(|ch| !(ch.is_ascii_alphanumeric() || ch == '_'))
        || looks_like_reference(sheet)
}

/// A bare title such as `Q1`, `AB12`, `2024` or `R1C1` would be read as a cell, not a tab.
fn looks_like_reference(sheet: &str) -> bool {
    let all_digits = |text: &str| text.bytes().all(|b| b.is_ascii_digit());
    let letters = sheet.bytes().take_while(u8::is_ascii_alphabetic).count();
    let digits = &sheet[letters..];
    if letters <= 3 && !digits.is_empty() && all_digits(digits) {
        return true;
    }
    let Some(after_r) = sheet.strip_prefix(['R', 'r']) else {
        return false;
    };
    let row_digits = after_r.bytes().take_while(u8::is_ascii_digit).count();
    after_r[row_digits..]
        .strip_prefix(['C', 'c'])
        .is_some_and(all_digits)
}

fn write_sheet_title(f: &mut fmt::Formatter<'_>, sheet: &str) -> fmt::Result {
    if needs_quoting(sheet) {
        write!(f, "'{}'", sheet.replace('\'', "''"))
    } else {
        f.write_str(sheet)
    }
}

/// 1-based column number to letters: `1 -> A`, `27 -> AA`. Zero is treated as `A`.
pub fn column_to_letters(col: u32) -> String {
    let mut col = col.max(1) - 1;
    let mut buf = Vec::new();
    loop {
        let rem = (col % 26) as u8;
        buf.push(b'A' + rem);
        col /= 26;
        if col == 0 {
            break;
        }
        col -= 1;
    }
    buf.reverse();
    buf.into_iter().map(char::from).collect()
}

/// Uppercase letters to a 1-based column number; `None` on anything else.
pub fn letters_to_column(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for (idx, ch) in s.bytes().enumerate() {
        if !ch.is_ascii_uppercase() {
            return None;
        }
        let val = (ch - b'A') as u32;
        col = col.checked_mul(26)?;
        col = col.checked_add(val)?;
        if idx != s.len() - 1 {
            col = col.checked_add(1)?;
        }
    }
    col.checked_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letter_roundtrip() {
        assert_eq!(column_to_letters(1), "A");
        assert_eq!(column_to_letters(26), "Z");
        assert_eq!(column_to_letters(27), "AA");
        assert_eq!(column_to_letters(28), "AB");
        assert_eq!(column_to_letters(703), "AAA");
        for col in [1, 2, 26, 27, 52, 53, 702, 703, 16_384] {
            assert_eq!(letters_to_column(&column_to_letters(col)), Some(col));
        }
        assert!(letters_to_column("a1").is_none());
        assert!(letters_to_column("").is_none());
    }

    #[test]
    fn renders_row_ranges() {
        assert_eq!(A1Range::rect("Sheet1", 2, 1, 2, 2).to_string(), "Sheet1!A2:B2");
        assert_eq!(A1Range::rows("Sheet1", 1, 1).to_string(), "Sheet1!1:1");
        assert_eq!(A1Range::cell("Sheet1", 3, 1).to_string(), "Sheet1!A3");
        assert_eq!(A1Range::whole_sheet("Sheet1").to_string(), "Sheet1");
    }

    #[test]
    fn quotes_titles_that_need_it() {
        assert_eq!(
            A1Range::rect("My Sheet", 4, 1, 4, 3).to_string(),
            "'My Sheet'!A4:C4"
        );
        assert_eq!(
            A1Range::whole_sheet("Bob's").to_string(),
            "'Bob''s'"
        );
    }

    #[test]
    fn quotes_titles_that_read_as_cell_references() {
        for title in ["Q1", "A1", "ab12", "XFD100", "2024", "R1C1", "rc", "R2C"] {
            let rendered = A1Range::whole_sheet(title).to_string();
            assert_eq!(rendered, format!("'{title}'"));
            assert_eq!(A1Range::parse(&rendered).unwrap(), A1Range::whole_sheet(title));
        }
        assert_eq!(A1Range::rect("Q1", 2, 1, 2, 2).to_string(), "'Q1'!A2:B2");
        for title in ["Sheet1", "People", "ABCD1", "Rec", "R"] {
            assert_eq!(A1Range::whole_sheet(title).to_string(), title);
        }
    }

    #[test]
    fn parses_the_supported_forms() {
        assert_eq!(A1Range::parse("Sheet1").unwrap(), A1Range::whole_sheet("Sheet1"));
        assert_eq!(
            A1Range::parse("Sheet1!A2:B2").unwrap(),
            A1Range::rect("Sheet1", 2, 1, 2, 2)
        );
        assert_eq!(A1Range::parse("Sheet1!1:1").unwrap(), A1Range::rows("Sheet1", 1, 1));
        assert_eq!(A1Range::parse("Sheet1!$B$3").unwrap(), A1Range::cell("Sheet1", 3, 2));
        assert_eq!(
            A1Range::parse("'My Sheet'!a1:c3").unwrap(),
            A1Range::rect("My Sheet", 1, 1, 3, 3)
        );
        assert_eq!(
            A1Range::parse("'Bob''s'").unwrap(),
            A1Range::whole_sheet("Bob's")
        );
    }

    #[test]
    fn unquoted_bang_without_area_is_part_of_the_title() {
        assert_eq!(
            A1Range::parse("Hello!World Tab").unwrap(),
            A1Range::whole_sheet("Hello!World Tab")
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(A1Range::parse("  "), Err(A1ParseError::Empty));
        assert_eq!(A1Range::parse("'Open"), Err(A1ParseError::UnterminatedQuote));
        assert!(matches!(
            A1Range::parse("'Tab'x"),
            Err(A1ParseError::TrailingInput(_))
        ));
        assert_eq!(A1Range::parse("'Tab'!A0"), Err(A1ParseError::ZeroRow));
        assert_eq!(A1Range::parse("'Tab'!B3:A1"), Err(A1ParseError::RangeOrder));
    }

    #[test]
    fn bounds_cover_open_ended_forms() {
        let whole = A1Range::whole_sheet("S").bounds();
        assert_eq!((whole.first_row, whole.last_row), (1, None));
        assert_eq!((whole.first_col, whole.last_col), (1, None));

        let header = A1Range::rows("S", 1, 1).bounds();
        assert_eq!((header.first_row, header.last_row), (1, Some(1)));
        assert_eq!(header.last_col, None);

        let open = A1Range::parse("S!A2:C").unwrap().bounds();
        assert_eq!((open.first_row, open.last_row), (2, None));
        assert_eq!((open.first_col, open.last_col), (1, Some(3)));
        assert!(open.contains_row(1_000));
        assert!(!open.contains_col(4));

        let cell = A1Range::cell("S", 5, 2).bounds();
        assert_eq!(cell.last_row, Some(5));
        assert_eq!(cell.last_col, Some(2));
    }
}

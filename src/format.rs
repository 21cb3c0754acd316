//! Fixed-width console rows
//!
//! Column widths are counted in characters, not bytes.

use std::io::{self, Write};

/// Separator placed between columns
pub const COLUMN_SEPARATOR: &str = " | ";

/// Pad `value` with trailing spaces up to `width`, or cut it down to `width`.
/// No ellipsis is added when cutting.
pub fn standardize_string(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len > width {
        value.chars().take(width).collect()
    } else {
        let mut padded = String::with_capacity(value.len() + (width - len));
        padded.push_str(value);
        padded.extend(std::iter::repeat(' ').take(width - len));
        padded
    }
}

/// Render one row: each column standardized to its width, joined with
/// [`COLUMN_SEPARATOR`]. A column without a matching width is left as is.
pub fn format_row<S: AsRef<str>>(columns: &[S], widths: &[usize]) -> String {
    columns
        .iter()
        .enumerate()
        .fold(String::new(), |mut row, (index, column)| {
            let column = column.as_ref();
            let cell = match widths.get(index) {
                Some(&width) => standardize_string(column, width),
                None => column.to_string(),
            };
            if index > 0 {
                row.push_str(COLUMN_SEPARATOR);
            }
            row.push_str(&cell);
            row
        })
}

/// A horizontal rule as wide as a row rendered with `widths`
pub fn separator_line(widths: &[usize]) -> String {
    let columns: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    format_row(&columns, widths).replace(COLUMN_SEPARATOR, "-+-")
}

/// Line-oriented console writer with an in-place update mode
pub struct Console<W: Write> {
    out: W,
    /// Width of the line currently being rewritten, if any
    live_width: Option<usize>,
}

impl Console<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            live_width: None,
        }
    }

    /// Append a full line
    pub fn line(&mut self, message: &str) -> io::Result<()> {
        self.finish_live()?;
        writeln!(self.out, "{}", message)
    }

    /// Rewrite the current line in place
    pub fn update_line(&mut self, message: &str) -> io::Result<()> {
        let width = message.chars().count();
        let previous = self.live_width.unwrap_or(0);
        // Blank out leftovers from a longer previous message.
        let padding = previous.saturating_sub(width);
        write!(self.out, "\r{}{}", message, " ".repeat(padding))?;
        self.live_width = Some(width);
        self.out.flush()
    }

    /// End an in-place line so that the next output starts on a new line
    pub fn finish_live(&mut self) -> io::Result<()> {
        if self.live_width.take().is_some() {
            writeln!(self.out)?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_standardize_string() {
        assert_eq!(standardize_string("abc", 5), "abc  ");
        assert_eq!(standardize_string("abcdef", 3), "abc");
        assert_eq!(standardize_string("abc", 3), "abc");
        assert_eq!(standardize_string("", 2), "  ");
        assert_eq!(standardize_string("abc", 0), "");
    }

    #[test]
    fn test_standardize_string_counts_chars() {
        assert_eq!(standardize_string("héllo", 3), "hél");
        assert_eq!(standardize_string("日本", 3), "日本 ");
    }

    #[test]
    fn test_format_row() {
        assert_eq!(format_row(&["a", "bb"], &[3, 3]), "a   | bb ");
        assert_eq!(format_row(&["toolong", "x"], &[4, 1]), "tool | x");
        assert_eq!(format_row::<&str>(&[], &[3]), "");
        assert_eq!(format_row(&["a", "free"], &[2]), "a  | free");
    }

    #[test]
    fn test_separator_line() {
        assert_eq!(separator_line(&[3, 2]), "----+---");
    }

    #[test]
    fn test_console_update_mode() {
        let mut console = Console::new(Vec::new());
        console.update_line("cloning api").expect("write");
        console.update_line("done").expect("write");
        console.line("summary").expect("write");

        let written = String::from_utf8(console.into_inner()).expect("utf8");
        assert_eq!(written, "\rcloning api\rdone       \nsummary\n");
    }

    #[test]
    fn test_console_append_mode() {
        let mut console = Console::new(Vec::new());
        console.line("one").expect("write");
        console.line("two").expect("write");
        console.finish_live().expect("write");

        let written = String::from_utf8(console.into_inner()).expect("utf8");
        assert_eq!(written, "one\ntwo\n");
    }

    #[quickcheck]
    fn prop_standardized_width_is_exact(value: String, width: u8) -> bool {
        standardize_string(&value, width as usize).chars().count() == width as usize
    }

    #[quickcheck]
    fn prop_standardized_keeps_prefix(value: String, width: u8) -> bool {
        let out = standardize_string(&value, width as usize);
        let kept: String = value.chars().take(width as usize).collect();
        out.starts_with(&kept)
    }

    #[quickcheck]
    fn prop_row_width_is_sum_of_widths(columns: Vec<String>) -> bool {
        let widths: Vec<usize> = columns.iter().map(|c| c.chars().count() % 7 + 1).collect();
        let expected = widths.iter().sum::<usize>()
            + COLUMN_SEPARATOR.len() * columns.len().saturating_sub(1);
        format_row(&columns, &widths).chars().count() == expected
    }
}

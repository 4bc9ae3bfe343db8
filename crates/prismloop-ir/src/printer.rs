use std::fmt::{Display, Write};

/// Indent used for every line inside a module block.
pub const DEFAULT_INDENT: &str = "  ";

/// Render one item per line, each prefixed by `indent` and terminated by a
/// line break.
pub fn compose_lines<I>(indent: &str, items: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    let mut out = String::new();
    for item in items {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{indent}{item}");
    }
    out
}

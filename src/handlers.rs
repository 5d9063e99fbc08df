use std::io::{BufRead, Write};

use anyhow::Result;
use bq::search_query::{ParseError, Parser, SearchQuery};

#[derive(Debug, Clone, Copy, Default)]
pub struct FilterOptions {
    pub count: bool,
    pub line_number: bool,
}

/// Stream `input` line by line, writing the matches (or their count).
/// Returns the number of matching lines.
pub fn filter_lines<R: BufRead, W: Write>(
    query: &SearchQuery,
    input: R,
    out: &mut W,
    opts: FilterOptions,
) -> Result<usize> {
    let mut found = 0;
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        if !query.matches(&line) {
            continue;
        }
        found += 1;
        if opts.count {
            continue;
        }
        if opts.line_number {
            writeln!(out, "{}:{}", idx + 1, line)?;
        } else {
            writeln!(out, "{line}")?;
        }
    }
    if opts.count {
        writeln!(out, "{found}")?;
    }
    Ok(found)
}

pub fn explain<W: Write>(query: &str, out: &mut W) -> Result<()> {
    let mut parser = match Parser::new(query) {
        Ok(parser) => parser,
        Err(e) => {
            writeln!(out, "{}", render_error(query, &e))?;
            return Ok(());
        }
    };

    writeln!(out, "tokens:")?;
    for tok in parser.tokens() {
        writeln!(out, "  {tok}")?;
    }

    match parser.parse() {
        Ok(predicate) => {
            writeln!(out, "tree:")?;
            writeln!(out, "  {predicate}")?;
            writeln!(out, "normalized:")?;
            writeln!(out, "  {}", predicate.normalized())?;
        }
        Err(e) => writeln!(out, "{}", render_error(query, &e))?,
    }
    Ok(())
}

/// The query with a caret under the offending character.
///
/// The caret is padded by terminal columns, so it lines up under CJK text.
pub fn render_error(query: &str, err: &ParseError) -> String {
    let columns: usize = query.chars().take(err.position).map(column_width).sum();
    format!("error: {}\n  {}\n  {}^", err, query, " ".repeat(columns))
}

/// Columns a character occupies in a terminal: 2 for East Asian wide and
/// full-width characters, 1 otherwise.
fn column_width(c: char) -> usize {
    let wide = matches!(
        u32::from(c),
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3040..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x1F300..=0x1F64F
            | 0x20000..=0x3FFFD
    );
    if wide {
        2
    } else {
        1
    }
}

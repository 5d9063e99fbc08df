use std::fmt;

use super::errors::{ParseError, ParseResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    And,
    Or,
    Not,
    LParen,
    RParen,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Word => "WORD",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::LParen => "LEFT_PAREN",
            TokenKind::RParen => "RIGHT_PAREN",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    /// Character offset into the source query.
    pub position: usize,
}

impl Token {
    fn new(kind: TokenKind, value: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            position,
        }
    }

    /// True for tokens that can close an operand (`word`, `)`).
    fn ends_operand(&self) -> bool {
        matches!(self.kind, TokenKind::Word | TokenKind::RParen)
    }

    /// True for tokens that can open an operand (`word`, `-`, `(`).
    fn starts_operand(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Word | TokenKind::Not | TokenKind::LParen
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} @{}", self.kind, self.value, self.position)
    }
}

/// Scan a raw query into positioned tokens.
///
/// Parentheses are checked for balance during the scan; an unmatched `)` is
/// reported where it appears, leftover `(` at the outermost unmatched one.
pub fn tokenize(input: &str) -> ParseResult<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut tokens = Vec::new();
    let mut open_parens: Vec<usize> = Vec::new();
    let mut i = 0;

    while i < len {
        match chars[i] {
            c if c.is_whitespace() => {
                i += 1;
            }
            '(' => {
                open_parens.push(i);
                tokens.push(Token::new(TokenKind::LParen, "(", i));
                i += 1;
            }
            ')' => {
                if open_parens.pop().is_none() {
                    return Err(ParseError::unmatched_close(i));
                }
                tokens.push(Token::new(TokenKind::RParen, ")", i));
                i += 1;
            }
            '-' if starts_not(&chars, i) => {
                tokens.push(Token::new(TokenKind::Not, "-", i));
                i += 1;
            }
            _ => {
                let start = i;
                let word = read_word(&chars, &mut i);
                let kind = if word.eq_ignore_ascii_case("and") {
                    TokenKind::And
                } else if word.eq_ignore_ascii_case("or") {
                    TokenKind::Or
                } else {
                    TokenKind::Word
                };
                tokens.push(Token::new(kind, word, start));
            }
        }
    }

    if let Some(&first) = open_parens.first() {
        return Err(ParseError::unmatched_open(first));
    }

    Ok(tokens)
}

/// Decide whether the `-` at `i` is a NOT operator.
///
/// The left side must be start of input, whitespace or `(`. With that in
/// place, a following `-` makes it part of a word (`--flag`); anything else
/// makes it a NOT. A NOT whose operand does not start at the very next
/// character (`a -`, `a - b`, `(- a)`) is rejected by the parser.
fn starts_not(chars: &[char], i: usize) -> bool {
    let left_ok = i == 0 || chars[i - 1].is_whitespace() || chars[i - 1] == '(';
    if !left_ok {
        return false;
    }
    !matches!(chars.get(i + 1), Some('-'))
}

fn read_word(chars: &[char], i: &mut usize) -> String {
    let mut word = String::new();
    while *i < chars.len() {
        match chars[*i] {
            c if c.is_whitespace() => break,
            '(' | ')' => break,
            c => {
                word.push(c);
                *i += 1;
            }
        }
    }
    word
}

/// Make adjacency mean conjunction: `a b`, `(a) -b`, `a (b)`.
pub fn insert_implicit_ands(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len() * 2);
    for tok in tokens {
        if let Some(prev) = out.last() {
            if prev.ends_operand() && tok.starts_operand() {
                out.push(Token::new(TokenKind::And, "AND", tok.position));
            }
        }
        out.push(tok);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_positions_are_char_offsets() {
        let tokens = tokenize("測定 (掃除)").unwrap();
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 3, 4, 6]);
    }

    #[test]
    fn test_operators_case_insensitive() {
        let tokens = tokenize("a and b Or c").unwrap();
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Word,
                TokenKind::And,
                TokenKind::Word,
                TokenKind::Or,
                TokenKind::Word
            ]
        );
        assert_eq!(tokens[1].value, "and");
    }

    #[test]
    fn test_hyphen_inside_word() {
        let tokens = tokenize("foo-bar").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].value, "foo-bar");
    }

    #[test]
    fn test_double_hyphen_is_word() {
        let tokens = tokenize("--flag").unwrap();
        assert_eq!(kinds(&tokens), vec![TokenKind::Word]);
        assert_eq!(tokens[0].value, "--flag");
    }

    #[test]
    fn test_not_before_word_and_group() {
        let tokens = tokenize("-a (-b) -(c)").unwrap();
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Not,
                TokenKind::Word,
                TokenKind::LParen,
                TokenKind::Not,
                TokenKind::Word,
                TokenKind::RParen,
                TokenKind::Not,
                TokenKind::LParen,
                TokenKind::Word,
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_bare_hyphen_is_not_token() {
        let tokens = tokenize("a -").unwrap();
        assert_eq!(kinds(&tokens), vec![TokenKind::Word, TokenKind::Not]);
        assert_eq!(tokens[1].position, 2);
    }

    #[test]
    fn test_hyphen_before_space_keeps_position() {
        let tokens = tokenize("a - b").unwrap();
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Word, TokenKind::Not, TokenKind::Word]
        );
        assert_eq!(tokens[1].position, 2);
        assert_eq!(tokens[2].position, 4);
    }

    #[test]
    fn test_ideographic_space_skipped() {
        let tokens = tokenize("測定\u{3000}掃除").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].position, 3);
    }

    #[test]
    fn test_fullwidth_parens_are_word_chars() {
        let tokens = tokenize("（注）").unwrap();
        assert_eq!(kinds(&tokens), vec![TokenKind::Word]);
    }

    #[test]
    fn test_unmatched_close_position() {
        let err = tokenize("a) b").unwrap_err();
        assert_eq!(err.position, 1);
    }

    #[test]
    fn test_unmatched_open_reports_first() {
        let err = tokenize("((a) (b").unwrap_err();
        assert_eq!(err.position, 0);
    }

    #[test]
    fn test_implicit_and_inserted() {
        let tokens = insert_implicit_ands(tokenize("a (b) -c").unwrap());
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Word,
                TokenKind::And,
                TokenKind::LParen,
                TokenKind::Word,
                TokenKind::RParen,
                TokenKind::And,
                TokenKind::Not,
                TokenKind::Word,
            ]
        );
        assert_eq!(tokens[1].position, 2);
    }

    #[test]
    fn test_no_implicit_and_next_to_operators() {
        let tokens = insert_implicit_ands(tokenize("a OR b AND c").unwrap());
        assert_eq!(tokens.len(), 5);
    }
}

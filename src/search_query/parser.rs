use std::fmt;

use super::errors::{ParseError, ParseResult};
use super::lexer::{self, Token, TokenKind};

/// Default bound on parenthesis nesting.
pub const MAX_NESTING_DEPTH: usize = 256;
/// Default bound on token count, implicit ANDs included. The predicate tree
/// is at most this deep, so evaluating and dropping it stays on the stack.
pub const MAX_QUERY_TOKENS: usize = 512;

/// Resource bounds applied while compiling one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_depth: usize,
    pub max_tokens: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: MAX_NESTING_DEPTH,
            max_tokens: MAX_QUERY_TOKENS,
        }
    }
}

/// Compiled query. Immutable once built; see [`Predicate::matches`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Word(String),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// Rewrite every word literal with `f`, keeping the tree shape.
    pub fn map_words<F>(self, f: &F) -> Predicate
    where
        F: Fn(&str) -> String,
    {
        match self {
            Predicate::Word(w) => Predicate::Word(f(&w)),
            Predicate::And(a, b) => {
                Predicate::And(Box::new(a.map_words(f)), Box::new(b.map_words(f)))
            }
            Predicate::Or(a, b) => {
                Predicate::Or(Box::new(a.map_words(f)), Box::new(b.map_words(f)))
            }
            Predicate::Not(inner) => Predicate::Not(Box::new(inner.map_words(f))),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Word(w) => write!(f, "{w:?}"),
            Predicate::And(a, b) => write!(f, "(and {a} {b})"),
            Predicate::Or(a, b) => write!(f, "(or {a} {b})"),
            Predicate::Not(inner) => write!(f, "(not {inner})"),
        }
    }
}

/// Recursive-descent parser over one query.
///
/// Tokenization and implicit-AND insertion happen in [`Parser::new`], so a
/// structurally broken query never yields a parser. [`Parser::parse`] can be
/// called repeatedly; each call rewinds the cursor.
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: usize,
    /// Character length of the query, reported for errors at end of input.
    end: usize,
}

impl Parser {
    pub fn new(query: &str) -> ParseResult<Self> {
        Self::with_limits(query, Limits::default())
    }

    pub fn with_limits(query: &str, limits: Limits) -> ParseResult<Self> {
        let tokens = lexer::insert_implicit_ands(lexer::tokenize(query)?);
        log::debug!("query={query:?} tokens={}", tokens.len());
        if let Some(extra) = tokens.get(limits.max_tokens) {
            return Err(ParseError::too_long(limits.max_tokens, extra.position));
        }
        Ok(Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth: limits.max_depth,
            end: query.chars().count(),
        })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Build a fresh predicate from the token list.
    pub fn parse(&mut self) -> ParseResult<Predicate> {
        self.pos = 0;
        self.depth = 0;

        if self.tokens.is_empty() {
            return Err(ParseError::new("empty query", 0));
        }

        let result = self.parse_or()?;
        if let Some(tok) = self.peek() {
            return Err(ParseError::new(
                format!("unexpected '{}'", tok.value),
                tok.position,
            ));
        }
        Ok(result)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// Consume a binary operator, failing at its position when nothing
    /// follows it or the enclosing group closes right after it.
    fn advance_operator(&mut self) -> ParseResult<()> {
        let Some(op) = self.advance() else {
            return Ok(());
        };
        match self.peek_kind() {
            None | Some(TokenKind::RParen) => {
                Err(ParseError::missing_operand(&op.value, op.position))
            }
            _ => Ok(()),
        }
    }

    /// or_expr = and_expr ("or" and_expr)*
    fn parse_or(&mut self) -> ParseResult<Predicate> {
        let mut left = self.parse_and()?;
        while self.peek_kind() == Some(TokenKind::Or) {
            self.advance_operator()?;
            let right = self.parse_and()?;
            left = Predicate::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// and_expr = not_expr ("and" not_expr)*
    fn parse_and(&mut self) -> ParseResult<Predicate> {
        let mut left = self.parse_not()?;
        while self.peek_kind() == Some(TokenKind::And) {
            self.advance_operator()?;
            let right = self.parse_not()?;
            left = Predicate::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// not_expr = "-"? primary
    ///
    /// The operand must start right after the `-`; `a - b` is a dangling NOT.
    fn parse_not(&mut self) -> ParseResult<Predicate> {
        if self.peek_kind() != Some(TokenKind::Not) {
            return self.parse_primary();
        }
        let not_pos = self.advance().map_or(self.end, |t| t.position);
        let has_operand = matches!(
            self.peek(),
            Some(tok) if matches!(tok.kind, TokenKind::Word | TokenKind::LParen)
                && tok.position == not_pos + 1
        );
        if !has_operand {
            return Err(ParseError::dangling_not(not_pos));
        }
        let inner = self.parse_primary()?;
        Ok(Predicate::Not(Box::new(inner)))
    }

    /// primary = word | "(" or_expr ")"
    fn parse_primary(&mut self) -> ParseResult<Predicate> {
        let Some(tok) = self.advance() else {
            return Err(ParseError::new("unexpected end of query", self.end));
        };

        match tok.kind {
            TokenKind::Word => Ok(Predicate::Word(tok.value)),
            TokenKind::LParen => self.parse_group(tok.position),
            TokenKind::And | TokenKind::Or => {
                Err(ParseError::missing_operand(&tok.value, tok.position))
            }
            TokenKind::Not => Err(ParseError::dangling_not(tok.position)),
            TokenKind::RParen => Err(ParseError::new("unexpected ')'", tok.position)),
        }
    }

    fn parse_group(&mut self, open_pos: usize) -> ParseResult<Predicate> {
        if self.peek_kind() == Some(TokenKind::RParen) {
            return Err(ParseError::empty_group(open_pos));
        }

        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::too_deep(self.max_depth, open_pos));
        }

        let expr = self.parse_or()?;
        match self.advance() {
            Some(tok) if tok.kind == TokenKind::RParen => {
                self.depth -= 1;
                Ok(expr)
            }
            _ => Err(ParseError::unmatched_open(open_pos)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(w: &str) -> Box<Predicate> {
        Box::new(Predicate::Word(w.to_string()))
    }

    fn parse(query: &str) -> ParseResult<Predicate> {
        Parser::new(query)?.parse()
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        assert_eq!(
            parse("a OR b AND c").unwrap(),
            Predicate::Or(word("a"), Box::new(Predicate::And(word("b"), word("c"))))
        );
    }

    #[test]
    fn test_left_associative() {
        assert_eq!(
            parse("a b c").unwrap(),
            Predicate::And(Box::new(Predicate::And(word("a"), word("b"))), word("c"))
        );
    }

    #[test]
    fn test_not_binds_tightest() {
        assert_eq!(
            parse("-a b").unwrap(),
            Predicate::And(Box::new(Predicate::Not(word("a"))), word("b"))
        );
    }

    #[test]
    fn test_parse_twice_same_tree() {
        let mut parser = Parser::new("x (y OR -z)").unwrap();
        let first = parser.parse().unwrap();
        let second = parser.parse().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_redundant_parens_collapse() {
        assert_eq!(parse("((((w))))").unwrap(), parse("w").unwrap());
    }

    #[test]
    fn test_empty_group_position() {
        assert_eq!(parse("a ()").unwrap_err(), ParseError::empty_group(2));
    }

    #[test]
    fn test_dangling_not_positions() {
        assert_eq!(parse("a -").unwrap_err().position, 2);
        assert_eq!(parse("(a -)").unwrap_err().position, 3);
        assert_eq!(parse("aaa -and").unwrap_err().position, 4);
        assert_eq!(parse("- -a").unwrap_err().position, 0);
    }

    #[test]
    fn test_not_requires_adjacent_operand() {
        assert_eq!(parse("a - b").unwrap_err(), ParseError::dangling_not(2));
        assert_eq!(parse("-  b").unwrap_err(), ParseError::dangling_not(0));
        assert_eq!(parse("(- a)").unwrap_err(), ParseError::dangling_not(1));
        assert_eq!(parse("-\u{3000}測定").unwrap_err(), ParseError::dangling_not(0));
        assert!(parse("a -b").is_ok());
        assert!(parse("-(b)").is_ok());
    }

    #[test]
    fn test_stray_operator_positions() {
        assert_eq!(parse("a AND OR").unwrap_err().position, 6);
        assert_eq!(parse("a OR AND").unwrap_err().position, 5);
        assert_eq!(parse("AND a").unwrap_err().position, 0);
        assert_eq!(parse("(OR a)").unwrap_err().position, 1);
    }

    #[test]
    fn test_trailing_operator_reports_operator() {
        assert_eq!(parse("a b AND").unwrap_err().position, 4);
        assert_eq!(parse("(a OR) b").unwrap_err().position, 3);
    }

    #[test]
    fn test_empty_query() {
        assert!(parse("").is_err());
        assert!(parse(" \u{3000} ").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}w{}", "(".repeat(5), ")".repeat(5));
        let limits = |max_depth| Limits {
            max_depth,
            ..Limits::default()
        };
        assert!(Parser::with_limits(&deep, limits(5)).unwrap().parse().is_ok());
        let err = Parser::with_limits(&deep, limits(4)).unwrap().parse().unwrap_err();
        assert_eq!(err.position, 4);
    }

    #[test]
    fn test_token_limit() {
        let limits = Limits {
            max_tokens: 5,
            ..Limits::default()
        };
        // a AND b AND c
        assert!(Parser::with_limits("a b c", limits).is_ok());
        // a AND b AND c AND d: the sixth token is the AND inserted before `d`
        let err = Parser::with_limits("a b c d", limits).unwrap_err();
        assert_eq!(err, ParseError::too_long(5, 6));
    }

    #[test]
    fn test_long_flat_query_rejected_before_evaluation() {
        let err = parse(&"a ".repeat(20_000)).unwrap_err();
        assert_eq!(err.position, 2 * (MAX_QUERY_TOKENS / 2));
    }

    #[test]
    fn test_longest_allowed_query_evaluates() {
        let words = MAX_QUERY_TOKENS / 2;
        let query = "a ".repeat(words).trim_end().to_string();
        let predicate = parse(&query).unwrap().normalized();
        assert!(predicate.matches("a"));
        assert!(!predicate.matches("b"));
    }

    #[test]
    fn test_default_limit_rejects_pathological_input() {
        let deep = format!("{}w{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(parse(&deep).is_err());
    }

    #[test]
    fn test_map_words() {
        let p = parse("A -B").unwrap().map_words(&|w| w.to_lowercase());
        assert_eq!(p, Predicate::And(word("a"), Box::new(Predicate::Not(word("b")))));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            parse("a (b OR -c)").unwrap().to_string(),
            r#"(and "a" (or "b" (not "c")))"#
        );
    }
}

mod errors;
mod eval;
mod lexer;
mod normalize;
mod parser;

pub use errors::{ParseError, ParseResult};
pub use eval::eval;
pub use lexer::{Token, TokenKind};
pub use normalize::normalize;
pub use parser::{Limits, Parser, Predicate, MAX_NESTING_DEPTH, MAX_QUERY_TOKENS};

use crate::config::{Config, MatchMode};

/// Strict parse of a raw query into a predicate over raw literals.
pub fn parse(query: &str) -> ParseResult<Predicate> {
    Parser::new(query)?.parse()
}

impl Predicate {
    /// Normalize every word literal so the predicate can be run against
    /// [`normalize`]d candidates.
    pub fn normalized(self) -> Predicate {
        self.map_words(&normalize)
    }
}

/// Caller-side view of a query: what to do with a blank or broken one.
///
/// Behavior:
/// - Blank query (only whitespace) → matches everything
/// - Strict: structural errors are returned to the caller
/// - Lenient: structural errors fall back to a substring search over the
///   normalized query
#[derive(Debug, Clone, PartialEq)]
pub enum SearchQuery {
    All,
    Expr(Predicate),
    Substring(String),
}

impl SearchQuery {
    pub fn strict(query: &str) -> ParseResult<Self> {
        Self::strict_with_limits(query, Limits::default())
    }

    pub fn lenient(query: &str) -> Self {
        Self::lenient_with_limits(query, Limits::default())
    }

    pub fn from_config(query: &str, config: &Config) -> ParseResult<Self> {
        let limits = config.limits();
        match config.mode {
            MatchMode::Strict => Self::strict_with_limits(query, limits),
            MatchMode::Lenient => Ok(Self::lenient_with_limits(query, limits)),
        }
    }

    fn strict_with_limits(query: &str, limits: Limits) -> ParseResult<Self> {
        if query.trim().is_empty() {
            return Ok(Self::All);
        }
        let predicate = Parser::with_limits(query, limits)?.parse()?;
        Ok(Self::Expr(predicate.normalized()))
    }

    fn lenient_with_limits(query: &str, limits: Limits) -> Self {
        match Self::strict_with_limits(query, limits) {
            Ok(q) => q,
            Err(e) => {
                log::warn!("query={query:?} error=\"{e}\" falling back to substring search");
                Self::Substring(normalize(query))
            }
        }
    }

    /// Match a raw candidate; it is normalized here.
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            SearchQuery::All => true,
            SearchQuery::Expr(predicate) => predicate.matches(&normalize(candidate)),
            SearchQuery::Substring(needle) => normalize(candidate).contains(needle.as_str()),
        }
    }

    /// Keep the candidates that match, in order.
    pub fn filter<'a, I>(&'a self, candidates: I) -> impl Iterator<Item = I::Item> + 'a
    where
        I: IntoIterator,
        I::IntoIter: 'a,
        I::Item: AsRef<str>,
    {
        candidates
            .into_iter()
            .filter(move |c| self.matches(c.as_ref()))
    }
}

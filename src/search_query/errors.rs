/// A structural problem in a query, located at a character offset.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at position {position}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    pub fn unmatched_close(position: usize) -> Self {
        Self::new("unmatched ')'", position)
    }

    pub fn unmatched_open(position: usize) -> Self {
        Self::new("unmatched '('", position)
    }

    pub fn empty_group(position: usize) -> Self {
        Self::new("empty group '()'", position)
    }

    pub fn dangling_not(position: usize) -> Self {
        Self::new("'-' must be followed by a word or group", position)
    }

    pub fn missing_operand(operator: &str, position: usize) -> Self {
        Self::new(format!("operator '{operator}' has no operand"), position)
    }

    pub fn too_long(max_tokens: usize, position: usize) -> Self {
        Self::new(format!("query has more than {max_tokens} tokens"), position)
    }

    pub fn too_deep(max_depth: usize, position: usize) -> Self {
        Self::new(
            format!("parentheses nested deeper than {max_depth} levels"),
            position,
        )
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

use super::parser::Predicate;

/// Evaluate `predicate` against an already normalized candidate text.
pub fn eval(predicate: &Predicate, text: &str) -> bool {
    match predicate {
        Predicate::Word(w) => text.contains(w.as_str()),
        Predicate::And(a, b) => eval(a, text) && eval(b, text),
        Predicate::Or(a, b) => eval(a, text) || eval(b, text),
        Predicate::Not(inner) => !eval(inner, text),
    }
}

impl Predicate {
    pub fn matches(&self, text: &str) -> bool {
        eval(self, text)
    }
}

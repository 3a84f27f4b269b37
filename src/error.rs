use crate::ast::{TokenId, TokenKind};
use std::fmt;

/// No pattern matched at a scan position. The TEXT fallback always matches,
/// so this signals a lexer defect rather than bad input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("no token matches at line {line}, column {column}")]
    Unmatched { line: usize, column: usize },
}

/// The token stream does not describe a tree. Only a lexer defect produces it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("token {id} refers to unknown parent {parent}")]
    MissingParent { id: TokenId, parent: TokenId },
    #[error("token id {id} appears more than once")]
    DuplicateId { id: TokenId },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid nesting: {parent} cannot contain {child} (line {line})")]
pub struct StructuralError {
    pub parent: TokenKind,
    pub child: TokenKind,
    pub line: usize,
    pub id: TokenId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    TitleFirst,
    SingleTitle,
    OneConstructPerLine,
    NoTopLevelParenthetical,
    DialogueNeedsCharacter,
    NoConsecutiveTransitions,
    ScenePlacement,
}

impl Rule {
    pub fn name(self) -> &'static str {
        match self {
            Rule::TitleFirst => "title must be first",
            Rule::SingleTitle => "single title",
            Rule::OneConstructPerLine => "one construct per line",
            Rule::NoTopLevelParenthetical => "no parenthetical at top level",
            Rule::DialogueNeedsCharacter => "dialogue needs preceding character",
            Rule::NoConsecutiveTransitions => "no consecutive transitions",
            Rule::ScenePlacement => "scene placement",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{rule}: {message}")]
pub struct SemanticError {
    pub rule: Rule,
    pub message: String,
    pub line: Option<usize>, // None only for an empty document
    pub kind: Option<TokenKind>,
}

impl SemanticError {
    pub(crate) fn new(rule: Rule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
            line: None,
            kind: None,
        }
    }

    pub(crate) fn at(mut self, line: usize, kind: TokenKind) -> Self {
        self.line = Some(line);
        self.kind = Some(kind);
        self
    }
}

/// Any failure of the compile pipeline. Every variant is terminal for the
/// document being compiled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

impl Error {
    /// Source line the failure points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Lex(LexError::Unmatched { line, .. }) => Some(*line),
            Error::Build(_) => None,
            Error::Structural(e) => Some(e.line),
            Error::Semantic(e) => e.line,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

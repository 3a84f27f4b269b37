use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Title,         // [T: ...]
    Scene,         // >
    Action,        // <...>
    Character,     // @name
    Parenthetical, // (...)
    Dialogue,      // --
    Transition,    // >>
    Text,
}

impl TokenKind {
    pub const ALL: [TokenKind; 8] = [
        TokenKind::Title,
        TokenKind::Scene,
        TokenKind::Action,
        TokenKind::Character,
        TokenKind::Parenthetical,
        TokenKind::Dialogue,
        TokenKind::Transition,
        TokenKind::Text,
    ];

    /// Kinds whose inner content is lexed again for nested tokens.
    pub fn is_container(self) -> bool {
        match self {
            TokenKind::Action
            | TokenKind::Parenthetical
            | TokenKind::Dialogue
            | TokenKind::Scene
            | TokenKind::Transition => true,
            TokenKind::Title | TokenKind::Character | TokenKind::Text => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Title => "TITLE",
            TokenKind::Scene => "SCENE",
            TokenKind::Action => "ACTION",
            TokenKind::Character => "CHARACTER",
            TokenKind::Parenthetical => "PARENTHETICAL",
            TokenKind::Dialogue => "DIALOGUE",
            TokenKind::Transition => "TRANSITION",
            TokenKind::Text => "TEXT",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a token in the nesting hierarchy, e.g. `2.1.3` is the third
/// token nested in the first token nested in the second root.
///
/// Ordering is lexicographic over the segments, which matches the order in
/// which the lexer emits tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TokenId(Vec<u32>);

impl TokenId {
    pub fn root(ordinal: u32) -> Self {
        TokenId(vec![ordinal])
    }

    /// Id of the `ordinal`-th token nested under `parent`, or of the
    /// `ordinal`-th root when there is no parent.
    pub fn nested(parent: Option<&TokenId>, ordinal: u32) -> Self {
        match parent {
            Some(p) => p.child(ordinal),
            None => TokenId::root(ordinal),
        }
    }

    pub fn child(&self, ordinal: u32) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(ordinal);
        TokenId(segments)
    }

    pub fn parent(&self) -> Option<TokenId> {
        match self.0.split_last() {
            Some((_, rest)) if !rest.is_empty() => Some(TokenId(rest.to_vec())),
            _ => None,
        }
    }

    pub fn segments(&self) -> &[u32] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, seg) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid token id `{input}`")]
pub struct ParseTokenIdError {
    pub input: String,
}

impl FromStr for TokenId {
    type Err = ParseTokenIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTokenIdError {
            input: s.to_string(),
        };
        let segments = s
            .split('.')
            .map(|seg| match seg.parse::<u32>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(err()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TokenId(segments))
    }
}

impl From<TokenId> for String {
    fn from(id: TokenId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for TokenId {
    type Error = ParseTokenIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub kind: TokenKind,
    pub raw: String,   // source text including delimiters
    pub inner: String, // delimiters stripped
    pub line: usize,
    pub column: usize, // chars from the start of the source line
}

impl Token {
    /// Individual names of a character cue; `@ANA@LUIS` yields both.
    pub fn character_names(&self) -> impl Iterator<Item = &str> {
        let names = match self.kind {
            TokenKind::Character => self.inner.as_str(),
            _ => "",
        };
        names.split('@').filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_id_renders_dotted_path() {
        let id = TokenId::root(2).child(1).child(3);
        assert_eq!(id.to_string(), "2.1.3");
        assert_eq!(id.depth(), 3);
        assert_eq!(id.segments(), &[2, 1, 3]);
        assert!(!id.is_root());
    }

    #[test]
    fn token_id_parent_strips_last_segment() {
        let id: TokenId = "4.2".parse().unwrap();
        assert_eq!(id.parent(), Some(TokenId::root(4)));
        assert_eq!(TokenId::root(4).parent(), None);
    }

    #[test]
    fn token_id_rejects_malformed_paths() {
        for bad in ["", "1..2", "0", "1.x", "-1", "1."] {
            assert!(bad.parse::<TokenId>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn token_id_order_follows_emission_order() {
        let ids: Vec<TokenId> = ["1", "1.1", "1.1.1", "1.2", "2", "10"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn token_id_serializes_as_string() {
        let id = TokenId::root(3).child(2);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"3.2\"");
        let back: TokenId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn only_five_kinds_are_containers() {
        let containers: Vec<TokenKind> = TokenKind::ALL
            .iter()
            .copied()
            .filter(|k| k.is_container())
            .collect();
        assert_eq!(
            containers,
            vec![
                TokenKind::Scene,
                TokenKind::Action,
                TokenKind::Parenthetical,
                TokenKind::Dialogue,
                TokenKind::Transition,
            ]
        );
    }

    #[test]
    fn chained_cue_splits_into_names() {
        let tok = Token {
            id: TokenId::root(1),
            kind: TokenKind::Character,
            raw: "@ANA@LUIS".to_string(),
            inner: "ANA@LUIS".to_string(),
            line: 1,
            column: 0,
        };
        let names: Vec<&str> = tok.character_names().collect();
        assert_eq!(names, vec!["ANA", "LUIS"]);
    }
}

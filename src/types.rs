use crate::ast::{Token, TokenId, TokenKind};
use crate::tree::Node;
use serde::{Deserialize, Serialize};

/// What the renderer receives for a validated screenplay.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScreenplayOutput {
    pub title: Option<String>,
    #[serde(default)]
    pub characters: Vec<String>, // first appearance order, one colour each
    pub roots: Vec<NodeOutput>,
    pub tokens: Vec<Token>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NodeOutput {
    pub id: TokenId,
    pub kind: TokenKind,
    pub raw: String,
    pub inner: String,
    pub line: usize,
    pub column: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<NodeOutput>,
}

impl NodeOutput {
    pub fn from_node(node: Node<'_>) -> Self {
        // Reverse pre-order finishes every child before its parent; the
        // finished siblings sit on top of `built`, first child last.
        let mut built: Vec<NodeOutput> = Vec::new();
        for below in node.descendants().into_iter().rev() {
            let at = built.len() - below.child_count();
            let children = built.drain(at..).rev().collect();
            built.push(Self::with_children(below.token(), children));
        }
        built.reverse();
        Self::with_children(node.token(), built)
    }

    fn with_children(token: &Token, children: Vec<NodeOutput>) -> Self {
        Self {
            id: token.id.clone(),
            kind: token.kind,
            raw: token.raw.clone(),
            inner: token.inner.clone(),
            line: token.line,
            column: token.column,
            children,
        }
    }
}

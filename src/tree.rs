use crate::ast::{Token, TokenId, TokenKind};
use crate::error::BuildError;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Default)]
struct Links {
    parent: Option<usize>,
    children: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    tokens: Vec<Token>,
    links: Vec<Links>,
    roots: Vec<usize>,
    by_id: HashMap<TokenId, usize>,
}

impl SyntaxTree {
    // Containers precede their nested tokens, so a parent is always linked
    // before its children arrive.
    pub fn build(tokens: Vec<Token>) -> Result<Self, BuildError> {
        let mut links = vec![Links::default(); tokens.len()];
        let mut roots = Vec::new();
        let mut by_id = HashMap::with_capacity(tokens.len());

        for (idx, token) in tokens.iter().enumerate() {
            if by_id.insert(token.id.clone(), idx).is_some() {
                return Err(BuildError::DuplicateId {
                    id: token.id.clone(),
                });
            }

            let Some(parent_id) = token.id.parent() else {
                roots.push(idx);
                continue;
            };
            let Some(&parent) = by_id.get(&parent_id) else {
                return Err(BuildError::MissingParent {
                    id: token.id.clone(),
                    parent: parent_id,
                });
            };
            links[idx].parent = Some(parent);
            links[parent].children.push(idx);
        }

        tracing::debug!(nodes = tokens.len(), roots = roots.len(), "built syntax tree");
        Ok(Self {
            tokens,
            links,
            roots,
            by_id,
        })
    }

    pub fn roots(&self) -> impl ExactSizeIterator<Item = Node<'_>> + Clone + '_ {
        self.roots.iter().map(move |&index| Node { tree: self, index })
    }

    pub fn root(&self, n: usize) -> Option<Node<'_>> {
        self.roots.get(n).map(|&index| Node { tree: self, index })
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn node(&self, index: usize) -> Option<Node<'_>> {
        (index < self.tokens.len()).then_some(Node { tree: self, index })
    }

    pub fn get(&self, id: &TokenId) -> Option<Node<'_>> {
        self.by_id.get(id).map(|&index| Node { tree: self, index })
    }

    /// All nodes in depth-first pre-order, which is the lexer's order.
    pub fn iter(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        (0..self.tokens.len()).map(move |index| Node { tree: self, index })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t SyntaxTree,
    index: usize,
}

impl<'t> Node<'t> {
    pub fn token(&self) -> &'t Token {
        &self.tree.tokens[self.index]
    }

    pub fn kind(&self) -> TokenKind {
        self.token().kind
    }

    pub fn id(&self) -> &'t TokenId {
        &self.token().id
    }

    pub fn line(&self) -> usize {
        self.token().line
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn parent(&self) -> Option<Node<'t>> {
        self.tree.links[self.index].parent.map(|index| Node {
            tree: self.tree,
            index,
        })
    }

    pub fn is_root(&self) -> bool {
        self.tree.links[self.index].parent.is_none()
    }

    pub fn children(
        &self,
    ) -> impl DoubleEndedIterator<Item = Node<'t>> + ExactSizeIterator + 't {
        let tree = self.tree;
        tree.links[self.index]
            .children
            .iter()
            .map(move |&index| Node { tree, index })
    }

    pub fn child_count(&self) -> usize {
        self.tree.links[self.index].children.len()
    }

    /// Nodes below this one in pre-order, excluding itself.
    pub fn descendants(&self) -> Vec<Node<'t>> {
        let mut out = Vec::new();
        let mut stack: Vec<Node<'t>> = self.children().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children().rev());
        }
        out
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id().to_string())
            .field("kind", &self.kind())
            .field("children", &self.child_count())
            .finish()
    }
}

/// Indented outline, one node per line: `id KIND "inner"`.
impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, node) in self.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            let token = node.token();
            let indent = "  ".repeat(token.id.depth() - 1);
            write!(f, "{}{} {} {:?}", indent, token.id, token.kind, token.inner)?;
        }
        Ok(())
    }
}

use crate::ast::TokenKind;
use crate::error::StructuralError;
use crate::tree::SyntaxTree;

/// Kinds a token of `parent` kind may directly contain.
pub fn permitted_children(parent: TokenKind) -> &'static [TokenKind] {
    use TokenKind::*;
    match parent {
        Title => &[Text],
        Scene => &[Character, Text],
        Action => &[Character, Parenthetical, Text],
        Character => &[Text],
        Parenthetical => &[Character, Text],
        Dialogue => &[Character, Parenthetical, Text],
        Transition => &[Text],
        Text => &[],
    }
}

pub fn may_contain(parent: TokenKind, child: TokenKind) -> bool {
    permitted_children(parent).contains(&child)
}

// Node order is pre-order, so the first pair reported is the first one met
// walking the tree left to right.
pub fn validate_nesting(tree: &SyntaxTree) -> Result<(), StructuralError> {
    for node in tree.iter() {
        let Some(parent) = node.parent() else {
            continue;
        };
        if !may_contain(parent.kind(), node.kind()) {
            let err = StructuralError {
                parent: parent.kind(),
                child: node.kind(),
                line: node.line(),
                id: node.id().clone(),
            };
            tracing::debug!(%err, "nesting check failed");
            return Err(err);
        }
    }
    Ok(())
}

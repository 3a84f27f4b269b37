use crate::ast::{Token, TokenKind};
use crate::error::{Rule, SemanticError};
use crate::tree::{Node, SyntaxTree};

type RuleCheck = fn(&[Node<'_>], &[Token]) -> Result<(), SemanticError>;

const RULES: [(Rule, RuleCheck); 7] = [
    (Rule::TitleFirst, title_first),
    (Rule::SingleTitle, single_title),
    (Rule::OneConstructPerLine, one_construct_per_line),
    (Rule::NoTopLevelParenthetical, no_top_level_parenthetical),
    (Rule::DialogueNeedsCharacter, dialogue_follows_character),
    (Rule::NoConsecutiveTransitions, no_consecutive_transitions),
    (Rule::ScenePlacement, scene_placement),
];

pub fn validate_semantics(tree: &SyntaxTree) -> Result<(), SemanticError> {
    let roots: Vec<Node<'_>> = tree.roots().collect();
    for (rule, check) in RULES {
        if let Err(err) = check(&roots, tree.tokens()) {
            tracing::debug!(%rule, %err, "semantic check failed");
            return Err(err);
        }
    }
    Ok(())
}

fn title_first(roots: &[Node<'_>], _: &[Token]) -> Result<(), SemanticError> {
    match roots.first() {
        Some(first) if first.kind() == TokenKind::Title => Ok(()),
        Some(first) => Err(SemanticError::new(
            Rule::TitleFirst,
            format!("found {} on line {}", first.kind(), first.line()),
        )
        .at(first.line(), first.kind())),
        None => Err(SemanticError::new(Rule::TitleFirst, "document is empty")),
    }
}

fn single_title(_: &[Node<'_>], tokens: &[Token]) -> Result<(), SemanticError> {
    let titles: Vec<&Token> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Title)
        .collect();
    if titles.len() == 1 {
        return Ok(());
    }

    let message = format!("expected exactly one title, found {}", titles.len());
    let err = SemanticError::new(Rule::SingleTitle, message);
    Err(match titles.get(1) {
        Some(second) => err.at(second.line, TokenKind::Title),
        None => err,
    })
}

// Roots come in source order, so roots sharing a line are adjacent.
fn one_construct_per_line(roots: &[Node<'_>], _: &[Token]) -> Result<(), SemanticError> {
    let Some(pair) = roots.windows(2).find(|w| w[0].line() == w[1].line()) else {
        return Ok(());
    };

    let line = pair[0].line();
    let kinds: Vec<&str> = roots
        .iter()
        .filter(|n| n.line() == line)
        .map(|n| n.kind().as_str())
        .collect();
    Err(SemanticError::new(
        Rule::OneConstructPerLine,
        format!("line {} holds {}", line, kinds.join(", ")),
    )
    .at(line, pair[1].kind()))
}

fn no_top_level_parenthetical(roots: &[Node<'_>], _: &[Token]) -> Result<(), SemanticError> {
    match roots
        .iter()
        .find(|n| n.kind() == TokenKind::Parenthetical)
    {
        Some(node) => Err(SemanticError::new(
            Rule::NoTopLevelParenthetical,
            format!(
                "parenthetical on line {} must be inside a dialogue or an action",
                node.line()
            ),
        )
        .at(node.line(), node.kind())),
        None => Ok(()),
    }
}

fn dialogue_follows_character(roots: &[Node<'_>], _: &[Token]) -> Result<(), SemanticError> {
    for (idx, node) in roots.iter().enumerate() {
        if node.kind() != TokenKind::Dialogue {
            continue;
        }
        let previous = idx.checked_sub(1).map(|prev| roots[prev].kind());
        if !previous.is_some_and(cues_dialogue) {
            return Err(SemanticError::new(
                Rule::DialogueNeedsCharacter,
                format!(
                    "dialogue on line {} must follow a character cue",
                    node.line()
                ),
            )
            .at(node.line(), node.kind()));
        }
    }
    Ok(())
}

fn no_consecutive_transitions(roots: &[Node<'_>], _: &[Token]) -> Result<(), SemanticError> {
    let repeated = roots
        .windows(2)
        .find(|w| w[0].kind() == TokenKind::Transition && w[1].kind() == TokenKind::Transition);
    match repeated {
        Some(pair) => Err(SemanticError::new(
            Rule::NoConsecutiveTransitions,
            format!(
                "transition on line {} directly follows another transition",
                pair[1].line()
            ),
        )
        .at(pair[1].line(), TokenKind::Transition)),
        None => Ok(()),
    }
}

fn scene_placement(roots: &[Node<'_>], _: &[Token]) -> Result<(), SemanticError> {
    for (idx, node) in roots.iter().enumerate() {
        if node.kind() != TokenKind::Scene || idx == 0 {
            continue;
        }
        let previous = roots[idx - 1].kind();
        if !opens_scene(previous) {
            return Err(SemanticError::new(
                Rule::ScenePlacement,
                format!(
                    "scene on line {} must open the script or follow a title or a transition, found {}",
                    node.line(),
                    previous
                ),
            )
            .at(node.line(), node.kind()));
        }
    }
    Ok(())
}

fn cues_dialogue(kind: TokenKind) -> bool {
    match kind {
        TokenKind::Character => true,
        TokenKind::Title
        | TokenKind::Scene
        | TokenKind::Action
        | TokenKind::Parenthetical
        | TokenKind::Dialogue
        | TokenKind::Transition
        | TokenKind::Text => false,
    }
}

fn opens_scene(kind: TokenKind) -> bool {
    match kind {
        TokenKind::Title | TokenKind::Transition => true,
        TokenKind::Scene
        | TokenKind::Action
        | TokenKind::Character
        | TokenKind::Parenthetical
        | TokenKind::Dialogue
        | TokenKind::Text => false,
    }
}

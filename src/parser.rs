use crate::ast::{Token, TokenId, TokenKind};
use crate::error::LexError;
use winnow::combinator::{alt, delimited, not, preceded, repeat};
use winnow::error::ModalResult;
use winnow::stream::Offset;
use winnow::token::{any, take_till, take_while};
use winnow::Parser;

pub fn lex(input: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut next_root = 1;

    for (idx, line) in input.lines().enumerate() {
        let mut raw = line;
        if idx == 0 {
            raw = raw.trim_start_matches('\u{feff}');
        }

        let source = SourceLine {
            text: raw,
            line_no: idx + 1,
        };
        next_root = source.lex_into(next_root, &mut tokens)?;
    }

    tracing::debug!(tokens = tokens.len(), roots = next_root - 1, "lexed document");
    Ok(tokens)
}

struct SourceLine<'s> {
    text: &'s str,
    line_no: usize,
}

// A segment still to be lexed, with the id its tokens nest under.
struct Frame<'s> {
    input: &'s str,
    parent: Option<TokenId>,
    ordinal: u32,
}

impl<'s> SourceLine<'s> {
    // Depth-first: a container is emitted, then its inner text is lexed to
    // the end before the enclosing segment resumes. Returns the next root
    // ordinal.
    fn lex_into(&self, first_root: u32, out: &mut Vec<Token>) -> Result<u32, LexError> {
        let mut next_root = first_root;
        let mut stack = vec![Frame {
            input: self.text,
            parent: None,
            ordinal: first_root,
        }];

        while let Some(frame) = stack.last_mut() {
            frame.input = frame.input.trim_start();
            if frame.input.is_empty() {
                if let Some(Frame {
                    parent: None,
                    ordinal,
                    ..
                }) = stack.pop()
                {
                    next_root = ordinal;
                }
                continue;
            }

            let column = self.column_of(frame.input);
            let lexeme = any_lexeme
                .parse_next(&mut frame.input)
                .map_err(|_| LexError::Unmatched {
                    line: self.line_no,
                    column,
                })?;

            let id = TokenId::nested(frame.parent.as_ref(), frame.ordinal);
            frame.ordinal += 1;
            tracing::trace!(%id, kind = %lexeme.kind, line = self.line_no, column, "token");
            out.push(Token {
                id: id.clone(),
                kind: lexeme.kind,
                raw: lexeme.raw.to_string(),
                inner: lexeme.inner.to_string(),
                line: self.line_no,
                column,
            });

            if lexeme.kind.is_container() {
                stack.push(Frame {
                    input: lexeme.inner,
                    parent: Some(id),
                    ordinal: 1,
                });
            }
        }
        Ok(next_root)
    }

    // Nested fragments are slices of the same source line, so this is their
    // absolute position in it.
    fn column_of(&self, fragment: &str) -> usize {
        let byte = fragment.offset_from(&self.text);
        self.text[..byte].chars().count()
    }
}

struct Lexeme<'s> {
    kind: TokenKind,
    raw: &'s str,
    inner: &'s str,
}

impl<'s> Lexeme<'s> {
    fn new(kind: TokenKind, raw: &'s str, inner: &'s str) -> Self {
        Self { kind, raw, inner }
    }
}

fn any_lexeme<'s>(input: &mut &'s str) -> ModalResult<Lexeme<'s>> {
    alt((construct, text)).parse_next(input)
}

// Priority order matters: `>>` must be tried before `>`.
fn construct<'s>(input: &mut &'s str) -> ModalResult<Lexeme<'s>> {
    alt((
        transition,
        scene,
        action,
        character,
        parenthetical,
        dialogue,
        title,
    ))
    .parse_next(input)
}

fn transition<'s>(input: &mut &'s str) -> ModalResult<Lexeme<'s>> {
    preceded(">>", rest_of_line)
        .with_taken()
        .map(|(inner, raw)| Lexeme::new(TokenKind::Transition, raw, inner))
        .parse_next(input)
}

fn scene<'s>(input: &mut &'s str) -> ModalResult<Lexeme<'s>> {
    preceded('>', rest_of_line)
        .with_taken()
        .map(|(inner, raw)| Lexeme::new(TokenKind::Scene, raw, inner))
        .parse_next(input)
}

fn action<'s>(input: &mut &'s str) -> ModalResult<Lexeme<'s>> {
    delimited('<', take_till(1.., ('>', '\n')), '>')
        .with_taken()
        .map(|(inner, raw)| Lexeme::new(TokenKind::Action, raw, inner))
        .parse_next(input)
}

fn character<'s>(input: &mut &'s str) -> ModalResult<Lexeme<'s>> {
    repeat::<_, _, (), _, _>(1.., preceded('@', take_while(1.., is_name_char)))
        .take()
        .map(|raw: &'s str| Lexeme::new(TokenKind::Character, raw, &raw[1..]))
        .parse_next(input)
}

fn parenthetical<'s>(input: &mut &'s str) -> ModalResult<Lexeme<'s>> {
    delimited('(', take_till(1.., (')', '\n')), ')')
        .with_taken()
        .map(|(inner, raw)| Lexeme::new(TokenKind::Parenthetical, raw, inner))
        .parse_next(input)
}

fn dialogue<'s>(input: &mut &'s str) -> ModalResult<Lexeme<'s>> {
    preceded("--", rest_of_line)
        .with_taken()
        .map(|(inner, raw)| Lexeme::new(TokenKind::Dialogue, raw, inner))
        .parse_next(input)
}

fn title<'s>(input: &mut &'s str) -> ModalResult<Lexeme<'s>> {
    delimited("[T:", take_till(1.., (']', '\n')), ']')
        .with_taken()
        .map(|(body, raw): (&'s str, &'s str)| {
            Lexeme::new(TokenKind::Title, raw, body.trim_start())
        })
        .parse_next(input)
}

// Only reached where no construct starts, so the first char is always taken.
fn text<'s>(input: &mut &'s str) -> ModalResult<Lexeme<'s>> {
    repeat::<_, _, (), _, _>(1.., preceded(not(construct), any))
        .take()
        .map(|raw: &'s str| {
            let raw = raw.trim_end();
            Lexeme::new(TokenKind::Text, raw, raw)
        })
        .parse_next(input)
}

fn rest_of_line<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    take_till(0.., '\n').parse_next(input)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

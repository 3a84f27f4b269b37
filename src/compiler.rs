use crate::ast::{Token, TokenKind};
use crate::error::Result;
use crate::grammar::validate_nesting;
use crate::parser::lex;
use crate::semantic::validate_semantics;
use crate::tree::{Node, SyntaxTree};
use crate::types::{NodeOutput, ScreenplayOutput};

#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub check_semantics: bool, // screenplay rules after the nesting check
    pub uppercase_cast: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            check_semantics: true,
            uppercase_cast: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn compile(&self, text: &str) -> Result<Screenplay> {
        let tokens = lex(text)?;
        let tree = SyntaxTree::build(tokens)?;
        validate_nesting(&tree)?;
        if self.options.check_semantics {
            validate_semantics(&tree)?;
        }

        tracing::debug!(
            tokens = tree.len(),
            roots = tree.root_count(),
            semantics = self.options.check_semantics,
            "compiled screenplay"
        );
        Ok(Screenplay {
            tree,
            options: self.options.clone(),
        })
    }
}

pub fn compile(text: &str) -> Result<Screenplay> {
    Compiler::new().compile(text)
}

// Only produced for documents that passed validation.
#[derive(Debug, Clone)]
pub struct Screenplay {
    tree: SyntaxTree,
    options: CompileOptions,
}

impl Screenplay {
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn into_tree(self) -> SyntaxTree {
        self.tree
    }

    pub fn tokens(&self) -> &[Token] {
        self.tree.tokens()
    }

    pub fn roots(&self) -> impl ExactSizeIterator<Item = Node<'_>> + '_ {
        self.tree.roots()
    }

    pub fn title(&self) -> Option<&str> {
        self.tokens()
            .iter()
            .find(|t| t.kind == TokenKind::Title)
            .map(|t| t.inner.as_str())
    }

    // Nested cues count too; first appearance wins.
    pub fn characters(&self) -> Vec<String> {
        let mut cast: Vec<String> = Vec::new();
        for token in self.tokens() {
            for name in token.character_names() {
                let name = if self.options.uppercase_cast {
                    name.to_uppercase()
                } else {
                    name.to_string()
                };
                if !cast.contains(&name) {
                    cast.push(name);
                }
            }
        }
        cast
    }

    pub fn to_output(&self) -> ScreenplayOutput {
        ScreenplayOutput {
            title: self.title().map(str::to_string),
            characters: self.characters(),
            roots: self.roots().map(NodeOutput::from_node).collect(),
            tokens: self.tokens().to_vec(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_output())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Rule};
    use indoc::indoc;

    fn root_kinds(screenplay: &Screenplay) -> Vec<TokenKind> {
        screenplay.roots().map(|n| n.kind()).collect()
    }

    #[test]
    fn compiles_minimal_scene() {
        let screenplay = compile("[T: Test]\n>1. INT. ROOM\n@BOB\n--Hello\n").unwrap();
        assert_eq!(
            root_kinds(&screenplay),
            vec![
                TokenKind::Title,
                TokenKind::Scene,
                TokenKind::Character,
                TokenKind::Dialogue,
            ]
        );
        assert_eq!(screenplay.title(), Some("Test"));
        assert_eq!(screenplay.characters(), vec!["BOB"]);
    }

    #[test]
    fn errors_carry_their_stage() {
        let err = compile("[T: X]\n>INT --hola").unwrap_err();
        assert!(matches!(err, Error::Structural(_)), "{:?}", err);
        assert_eq!(err.line(), Some(2));

        let err = compile("[T: X]\n(sola)").unwrap_err();
        match err {
            Error::Semantic(e) => assert_eq!(e.rule, Rule::NoTopLevelParenthetical),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn nesting_runs_before_semantics() {
        // Breaks the title rule and the grammar; the grammar is checked first.
        let err = compile(">INT --hola").unwrap_err();
        assert!(matches!(err, Error::Structural(_)), "{:?}", err);
    }

    #[test]
    fn semantics_can_be_skipped() {
        let compiler = Compiler::with_options(CompileOptions {
            check_semantics: false,
            ..CompileOptions::default()
        });
        assert!(!compiler.options().check_semantics);
        let screenplay = compiler.compile("--Hola\n(sola)").unwrap();
        assert_eq!(
            root_kinds(&screenplay),
            vec![TokenKind::Dialogue, TokenKind::Parenthetical]
        );
        assert_eq!(screenplay.title(), None);

        assert!(matches!(
            compiler.compile(">INT --hola"),
            Err(Error::Structural(_))
        ));
    }

    #[test]
    fn cast_is_deduplicated_in_order() {
        let src = indoc! {"
            [T: X]
            <@Rubén deja el cucharón (mirando a @Mario)>
            @mario@RUBÉN
            --Vale.
        "};
        let screenplay = compile(src).unwrap();
        assert_eq!(screenplay.characters(), vec!["RUBÉN", "MARIO"]);

        let keep_case = Compiler::with_options(CompileOptions {
            uppercase_cast: false,
            ..CompileOptions::default()
        });
        let screenplay = keep_case.compile(src).unwrap();
        assert_eq!(
            screenplay.characters(),
            vec!["Rubén", "Mario", "mario", "RUBÉN"]
        );
    }

    #[test]
    fn output_nests_children() {
        let screenplay = compile("[T: X]\n@ANA\n--(bajito) hola").unwrap();
        let output = screenplay.to_output();
        assert_eq!(output.title.as_deref(), Some("X"));
        assert_eq!(output.roots.len(), 3);
        assert_eq!(output.tokens.len(), 6);

        let dialogue = &output.roots[2];
        assert_eq!(dialogue.children.len(), 2);
        assert_eq!(dialogue.children[0].kind, TokenKind::Parenthetical);
        assert_eq!(dialogue.children[0].children[0].inner, "bajito");
        assert_eq!(dialogue.children[1].column, 11);

        let json: serde_json::Value = serde_json::from_str(&screenplay.to_json().unwrap()).unwrap();
        assert_eq!(json["roots"][2]["id"], "3");
        assert_eq!(json["roots"][2]["children"][0]["id"], "3.1");
        assert_eq!(json["roots"][2]["kind"], "DIALOGUE");
        assert!(json["roots"][0].get("children").is_none());
    }

    #[test]
    fn deep_dialogue_line_is_a_nesting_error() {
        let src = format!("[T: X]\n@ANA\n--{}\n", "-".repeat(5_000));
        let err = compile(&src).unwrap_err();
        insta::assert_snapshot!(err, @"invalid nesting: DIALOGUE cannot contain DIALOGUE (line 3)");
    }

    #[test]
    fn validated_tree_can_be_taken_out() {
        let tree = compile("[T: X]\n@ANA\n--hola").unwrap().into_tree();
        assert_eq!(tree.root_count(), 3);
        assert_eq!(tree.get(&"3.1".parse().unwrap()).map(|n| n.kind()), Some(TokenKind::Text));
    }

    #[test]
    fn compiling_twice_gives_the_same_tree() {
        let src = "[T: X]\n<@A mira (a @B)>\n@B\n--¿Qué?";
        let first = compile(src).unwrap().to_output();
        let second = compile(src).unwrap().to_output();
        assert_eq!(first, second);
    }

    #[test]
    fn output_survives_a_json_round_trip() {
        let screenplay = compile("[T: X]\n>INT. BAR\n@ANA\n--hola").unwrap();
        let output = screenplay.to_output();
        let back: ScreenplayOutput =
            serde_json::from_str(&screenplay.to_json().unwrap()).unwrap();
        assert_eq!(back, output);
    }
}

//! Per-mode scanning: interpolation, comments, heredoc/nowdoc, braces,
//! literals and language-version gating.

use phplex::{Lexer, LexerOptions, LexicalState, PhpVersion, Token, TokenKind};

/// Scan `src` starting in scripting mode, END excluded.
fn script(src: &str, version: PhpVersion) -> Vec<(TokenKind, String)> {
    let opts = LexerOptions {
        version,
        ..LexerOptions::default()
    };
    Lexer::with_state(src.as_bytes(), opts, LexicalState::InScripting, true)
        .take_while(|t| t.kind != TokenKind::End)
        .map(|t| (t.kind, t.text().into_owned()))
        .collect()
}

fn latest(src: &str) -> Vec<(TokenKind, String)> {
    script(src, PhpVersion::LATEST)
}

fn tk(kind: TokenKind, text: &str) -> (TokenKind, String) {
    (kind, text.to_string())
}

fn kinds(src: &str) -> Vec<TokenKind> {
    latest(src).into_iter().map(|(k, _)| k).collect()
}

// ---------------- interpolation ----------------

#[test]
fn simple_variable_in_double_quotes() {
    use TokenKind::*;
    assert_eq!(
        latest("\"a $b c\""),
        vec![
            tk(DoubleQuote, "\""),
            tk(EncapsedAndWhitespace, "a "),
            tk(Variable, "$b"),
            tk(EncapsedAndWhitespace, " c"),
            tk(DoubleQuote, "\""),
        ]
    );
}

#[test]
fn property_fetch_in_string() {
    use TokenKind::*;
    assert_eq!(
        latest("\"$o->p\""),
        vec![
            tk(DoubleQuote, "\""),
            tk(Variable, "$o"),
            tk(ObjectOperator, "->"),
            tk(String, "p"),
            tk(DoubleQuote, "\""),
        ]
    );
}

#[test]
fn array_offset_in_string() {
    use TokenKind::*;
    assert_eq!(
        latest("\"$a[0] $b[key]\""),
        vec![
            tk(DoubleQuote, "\""),
            tk(Variable, "$a"),
            tk(LBracket, "["),
            tk(NumString, "0"),
            tk(RBracket, "]"),
            tk(EncapsedAndWhitespace, " "),
            tk(Variable, "$b"),
            tk(LBracket, "["),
            tk(String, "key"),
            tk(RBracket, "]"),
            tk(DoubleQuote, "\""),
        ]
    );
}

#[test]
fn curly_interpolation() {
    use TokenKind::*;
    assert_eq!(
        latest("\"{$a}\""),
        vec![
            tk(DoubleQuote, "\""),
            tk(CurlyOpen, "{"),
            tk(Variable, "$a"),
            tk(RBrace, "}"),
            tk(DoubleQuote, "\""),
        ]
    );
}

#[test]
fn dollar_brace_varname() {
    use TokenKind::*;
    assert_eq!(
        latest("\"${name}\""),
        vec![
            tk(DoubleQuote, "\""),
            tk(DollarOpenCurlyBraces, "${"),
            tk(StringVarname, "name"),
            tk(RBrace, "}"),
            tk(DoubleQuote, "\""),
        ]
    );
}

#[test]
fn dollar_brace_expression() {
    use TokenKind::*;
    assert_eq!(
        latest("\"${$x}\""),
        vec![
            tk(DoubleQuote, "\""),
            tk(DollarOpenCurlyBraces, "${"),
            tk(Variable, "$x"),
            tk(RBrace, "}"),
            tk(DoubleQuote, "\""),
        ]
    );
}

#[test]
fn lone_dollar_and_brace_are_text() {
    use TokenKind::*;
    assert_eq!(
        latest("\"$ 5 { x\\\"\""),
        vec![
            tk(DoubleQuote, "\""),
            tk(EncapsedAndWhitespace, "$ 5 { x\\\""),
            tk(DoubleQuote, "\""),
        ]
    );
}

#[test]
fn single_quotes_do_not_interpolate() {
    use TokenKind::*;
    assert_eq!(
        latest("'a $b \\' c'"),
        vec![
            tk(SingleQuote, "'"),
            tk(EncapsedAndWhitespace, "a $b \\' c"),
            tk(SingleQuote, "'"),
        ]
    );
}

#[test]
fn backquote_interpolates() {
    use TokenKind::*;
    assert_eq!(
        latest("`ls $dir`"),
        vec![
            tk(Backquote, "`"),
            tk(EncapsedAndWhitespace, "ls "),
            tk(Variable, "$dir"),
            tk(Backquote, "`"),
        ]
    );
}

#[test]
fn empty_string() {
    use TokenKind::*;
    assert_eq!(latest("\"\""), vec![tk(DoubleQuote, "\""), tk(DoubleQuote, "\"")]);
}

// ---------------- comments ----------------

#[test]
fn one_line_comment_stops_before_newline() {
    use TokenKind::*;
    assert_eq!(
        latest("// hi\n$x"),
        vec![tk(Comment, "// hi"), tk(Whitespace, "\n"), tk(Variable, "$x")]
    );
    assert_eq!(
        latest("# hash\r\n"),
        vec![tk(Comment, "# hash"), tk(Whitespace, "\r\n")]
    );
}

#[test]
fn one_line_comment_stops_before_lone_cr() {
    use TokenKind::*;
    assert_eq!(
        latest("// a\r$x"),
        vec![tk(Comment, "// a"), tk(Whitespace, "\r"), tk(Variable, "$x")]
    );
}

#[test]
fn one_line_comment_ends_at_close_tag() {
    use TokenKind::*;
    assert_eq!(
        latest("// a ?> b"),
        vec![tk(Comment, "// a "), tk(CloseTag, "?>"), tk(InlineHtml, " b")]
    );
}

#[test]
fn one_line_comment_keeps_lone_question_mark() {
    use TokenKind::*;
    assert_eq!(latest("// a ? b"), vec![tk(Comment, "// a ? b")]);
}

#[test]
fn block_and_doc_comments() {
    use TokenKind::*;
    assert_eq!(latest("/* a * b */"), vec![tk(Comment, "/* a * b */")]);
    assert_eq!(latest("/** d */"), vec![tk(DocComment, "/** d */")]);
    assert_eq!(latest("/**/"), vec![tk(Comment, "/**/")]);
    assert_eq!(
        latest("/* open"),
        vec![tk(Comment, "/* open")],
        "unterminated comment is handed out at end of input"
    );
}

// ---------------- heredoc / nowdoc ----------------

#[test]
fn heredoc_with_interpolation() {
    use TokenKind::*;
    assert_eq!(
        latest("<<<EOT\nhi $x\nEOT;"),
        vec![
            tk(StartHeredoc, "<<<EOT\n"),
            tk(EncapsedAndWhitespace, "hi "),
            tk(Variable, "$x"),
            tk(EncapsedAndWhitespace, "\n"),
            tk(EndHeredoc, "EOT"),
            tk(Semicolon, ";"),
        ]
    );
}

#[test]
fn nowdoc_is_literal() {
    use TokenKind::*;
    assert_eq!(
        latest("<<<'EOT'\n$a\nEOT\n"),
        vec![
            tk(StartHeredoc, "<<<'EOT'\n"),
            tk(EncapsedAndWhitespace, "$a\n"),
            tk(EndHeredoc, "EOT"),
            tk(Whitespace, "\n"),
        ]
    );
}

#[test]
fn quoted_heredoc_label() {
    let mut lexer = Lexer::with_state(
        &b"<<< \"END\"\r\nx\r\nEND;"[..],
        LexerOptions::default(),
        LexicalState::InScripting,
        true,
    );
    assert_eq!(lexer.next_token().kind, TokenKind::StartHeredoc);
    let label = lexer.heredoc_label().cloned().expect("label while in heredoc");
    assert_eq!(label.label, b"END");
    assert!(!label.nowdoc);
    let rest: Vec<TokenKind> = lexer.map(|t| t.kind).collect();
    assert_eq!(
        rest,
        vec![
            TokenKind::EncapsedAndWhitespace,
            TokenKind::EndHeredoc,
            TokenKind::Semicolon,
            TokenKind::End
        ]
    );
}

#[test]
fn label_inside_a_line_does_not_close() {
    use TokenKind::*;
    assert_eq!(
        latest("<<<EOT\nsay EOT\nEOTX\nEOT\n"),
        vec![
            tk(StartHeredoc, "<<<EOT\n"),
            tk(EncapsedAndWhitespace, "say EOT\nEOTX\n"),
            tk(EndHeredoc, "EOT"),
            tk(Whitespace, "\n"),
        ]
    );
}

#[test]
fn indented_terminator_needs_php73() {
    use TokenKind::*;
    let src = "<<<EOT\n  a\n  EOT;";
    assert_eq!(
        script(src, PhpVersion::Php73),
        vec![
            tk(StartHeredoc, "<<<EOT\n"),
            tk(EncapsedAndWhitespace, "  a\n"),
            tk(EndHeredoc, "  EOT"),
            tk(Semicolon, ";"),
        ]
    );
    assert_eq!(
        script(src, PhpVersion::Php70),
        vec![
            tk(StartHeredoc, "<<<EOT\n"),
            tk(EncapsedAndWhitespace, "  a\n  EOT;"),
        ]
    );
}

#[test]
fn heredoc_body_is_one_token_across_lines() {
    use TokenKind::*;
    assert_eq!(
        latest("<<<EOT\na\nb $x\nc\n\nEOT;"),
        vec![
            tk(StartHeredoc, "<<<EOT\n"),
            tk(EncapsedAndWhitespace, "a\nb "),
            tk(Variable, "$x"),
            tk(EncapsedAndWhitespace, "\nc\n\n"),
            tk(EndHeredoc, "EOT"),
            tk(Semicolon, ";"),
        ]
    );
}

#[test]
fn nowdoc_body_is_one_token_across_lines() {
    use TokenKind::*;
    assert_eq!(
        latest("<<<'EOT'\none {$a}\r\ntwo\r\nEOT\r\n"),
        vec![
            tk(StartHeredoc, "<<<'EOT'\n"),
            tk(EncapsedAndWhitespace, "one {$a}\r\ntwo\r\n"),
            tk(EndHeredoc, "EOT"),
            tk(Whitespace, "\r\n"),
        ]
    );
}

#[test]
fn heredoc_with_lone_cr_line_ends() {
    use TokenKind::*;
    assert_eq!(
        latest("<<<EOT\ra\rEOT;"),
        vec![
            tk(StartHeredoc, "<<<EOT\r"),
            tk(EncapsedAndWhitespace, "a\r"),
            tk(EndHeredoc, "EOT"),
            tk(Semicolon, ";"),
        ]
    );
}

#[test]
fn strict_terminator_must_end_the_line() {
    use TokenKind::*;
    let src = "<<<EOT\na\nEOT);";
    assert_eq!(
        script(src, PhpVersion::Php73),
        vec![
            tk(StartHeredoc, "<<<EOT\n"),
            tk(EncapsedAndWhitespace, "a\n"),
            tk(EndHeredoc, "EOT"),
            tk(RParen, ")"),
            tk(Semicolon, ";"),
        ]
    );
    assert_eq!(
        script(src, PhpVersion::Php70),
        vec![tk(StartHeredoc, "<<<EOT\n"), tk(EncapsedAndWhitespace, "a\nEOT);")]
    );

    assert_eq!(
        script("<<<EOT\na\nEOT;\n$b", PhpVersion::Php70),
        vec![
            tk(StartHeredoc, "<<<EOT\n"),
            tk(EncapsedAndWhitespace, "a\n"),
            tk(EndHeredoc, "EOT"),
            tk(Semicolon, ";"),
            tk(Whitespace, "\n"),
            tk(Variable, "$b"),
        ]
    );
    assert_eq!(
        script("<<<EOT\na\nEOT", PhpVersion::Php70),
        vec![
            tk(StartHeredoc, "<<<EOT\n"),
            tk(EncapsedAndWhitespace, "a\n"),
            tk(EndHeredoc, "EOT"),
        ],
        "end of input also ends the line"
    );
}

#[test]
fn heredoc_label_survives_nested_braces() {
    let src = "<<<EOT\n{$a[\"k\"]}\nEOT;";
    let mut lexer = Lexer::with_state(
        src.as_bytes(),
        LexerOptions::default(),
        LexicalState::InScripting,
        true,
    );
    let mut saw_nested = false;
    loop {
        let t = lexer.next_token();
        if t.kind == TokenKind::End {
            break;
        }
        if lexer.state() == LexicalState::InScripting && lexer.stack_depth() == 1 {
            saw_nested = true;
            assert!(lexer.heredoc_label().is_none());
        }
        if lexer.state() == LexicalState::Heredoc {
            assert_eq!(
                lexer.heredoc_label().map(|h| h.label.clone()),
                Some(b"EOT".to_vec())
            );
        }
    }
    assert!(saw_nested);
    assert_eq!(lexer.stack_depth(), 0);
    assert_eq!(lexer.state(), LexicalState::InScripting);
}

// ---------------- braces and the state stack ----------------

#[test]
fn braces_balance_the_stack() {
    let src = "function f() { if (1) { $a = [1]; } }";
    let mut lexer = Lexer::with_state(
        src.as_bytes(),
        LexerOptions::default(),
        LexicalState::InScripting,
        true,
    );
    let mut max_depth = 0;
    loop {
        let t = lexer.next_token();
        assert_ne!(t.kind, TokenKind::Error);
        max_depth = max_depth.max(lexer.stack_depth());
        if t.kind == TokenKind::End {
            break;
        }
    }
    assert_eq!(max_depth, 2);
    assert_eq!(lexer.stack_depth(), 0);
}

#[test]
fn object_operator_then_property() {
    use TokenKind::*;
    assert_eq!(
        latest("$a->b -> c->d()"),
        vec![
            tk(Variable, "$a"),
            tk(ObjectOperator, "->"),
            tk(String, "b"),
            tk(Whitespace, " "),
            tk(ObjectOperator, "->"),
            tk(Whitespace, " "),
            tk(String, "c"),
            tk(ObjectOperator, "->"),
            tk(String, "d"),
            tk(LParen, "("),
            tk(RParen, ")"),
        ]
    );
}

#[test]
fn keyword_after_arrow_is_a_name() {
    use TokenKind::*;
    assert_eq!(
        latest("$a->class"),
        vec![tk(Variable, "$a"), tk(ObjectOperator, "->"), tk(String, "class")]
    );
}

// ---------------- literals, keywords, casts ----------------

#[test]
fn numbers() {
    use TokenKind::*;
    assert_eq!(
        kinds("42 0x1F 017 0b101 1.5 .5 1e3 2.5E-3"),
        vec![
            LNumber, Whitespace, HexNumber, Whitespace, OctalNumber, Whitespace, BinaryNumber,
            Whitespace, DNumber, Whitespace, DNumber, Whitespace, DNumber, Whitespace, DNumber,
        ]
    );
    assert_eq!(
        latest("1_000_000 0x7F_FF 0_17 0b1_0 1_0.5_5 1e1_0"),
        vec![
            tk(LNumber, "1_000_000"),
            tk(Whitespace, " "),
            tk(HexNumber, "0x7F_FF"),
            tk(Whitespace, " "),
            tk(OctalNumber, "0_17"),
            tk(Whitespace, " "),
            tk(BinaryNumber, "0b1_0"),
            tk(Whitespace, " "),
            tk(DNumber, "1_0.5_5"),
            tk(Whitespace, " "),
            tk(DNumber, "1e1_0"),
        ]
    );
    assert_eq!(
        latest("1__0 2_"),
        vec![
            tk(LNumber, "1"),
            tk(String, "__0"),
            tk(Whitespace, " "),
            tk(LNumber, "2"),
            tk(String, "_"),
        ],
        "a separator sits between two digits"
    );
}

#[test]
fn digit_separators_need_php74() {
    use TokenKind::*;
    assert_eq!(
        script("1_000;", PhpVersion::Php73),
        vec![tk(LNumber, "1"), tk(String, "_000"), tk(Semicolon, ";")]
    );
    assert_eq!(
        script("1_0.5 0x1_F", PhpVersion::Php73),
        vec![
            tk(LNumber, "1"),
            tk(String, "_0"),
            tk(DNumber, ".5"),
            tk(Whitespace, " "),
            tk(HexNumber, "0x1"),
            tk(String, "_F"),
        ]
    );
    assert_eq!(
        script("1_000;", PhpVersion::Php74),
        vec![tk(LNumber, "1_000"), tk(Semicolon, ";")]
    );
}

#[test]
fn keywords_are_case_insensitive() {
    use TokenKind::*;
    assert_eq!(
        kinds("ECHO Function classes __DIR__"),
        vec![Echo, Whitespace, Function, Whitespace, String, Whitespace, Dir]
    );
}

#[test]
fn casts_allow_inner_blanks() {
    use TokenKind::*;
    assert_eq!(
        latest("( int )$a (STRING)$b (object)"),
        vec![
            tk(IntCast, "( int )"),
            tk(Variable, "$a"),
            tk(Whitespace, " "),
            tk(StringCast, "(STRING)"),
            tk(Variable, "$b"),
            tk(Whitespace, " "),
            tk(ObjectCast, "(object)"),
        ]
    );
}

#[test]
fn longest_operator_wins() {
    use TokenKind::*;
    assert_eq!(
        kinds("=== !== <=> ??= **= ... <<= ::"),
        vec![
            IsIdentical, Whitespace, IsNotIdentical, Whitespace, Spaceship, Whitespace,
            CoalesceEqual, Whitespace, PowEqual, Whitespace, Ellipsis, Whitespace, SlEqual,
            Whitespace, DoubleColon,
        ]
    );
}

// ---------------- language-version gating ----------------

#[test]
fn new_keywords_are_names_on_older_versions() {
    use TokenKind::*;
    assert_eq!(script("match", PhpVersion::Php80), vec![tk(Match, "match")]);
    assert_eq!(script("match", PhpVersion::Php74), vec![tk(String, "match")]);
    assert_eq!(script("fn", PhpVersion::Php74), vec![tk(Fn, "fn")]);
    assert_eq!(script("fn", PhpVersion::Php70), vec![tk(String, "fn")]);
    assert_eq!(script("trait", PhpVersion::Php53), vec![tk(String, "trait")]);
}

#[test]
fn new_operators_split_on_older_versions() {
    use TokenKind::*;
    assert_eq!(
        script("$a ?? $b", PhpVersion::Php56),
        vec![
            tk(Variable, "$a"),
            tk(Whitespace, " "),
            tk(Question, "?"),
            tk(Question, "?"),
            tk(Whitespace, " "),
            tk(Variable, "$b"),
        ]
    );
    assert_eq!(
        script("**", PhpVersion::Php55),
        vec![tk(Star, "*"), tk(Star, "*")]
    );
    assert_eq!(
        script("<=>", PhpVersion::Php56),
        vec![tk(IsSmallerOrEqual, "<="), tk(Gt, ">")]
    );
    assert_eq!(
        script("??=", PhpVersion::Php70),
        vec![tk(Coalesce, "??"), tk(Assign, "=")]
    );
    assert_eq!(
        script("0b11", PhpVersion::Php53),
        vec![tk(LNumber, "0"), tk(String, "b11")]
    );
}

#[test]
fn yield_from_downgrades_stepwise() {
    use TokenKind::*;
    assert_eq!(
        script("yield from", PhpVersion::Php70),
        vec![tk(YieldFrom, "yield from")]
    );
    assert_eq!(
        script("yield from", PhpVersion::Php56),
        vec![tk(Yield, "yield"), tk(Whitespace, " "), tk(String, "from")]
    );
    assert_eq!(
        script("yield from", PhpVersion::Php54),
        vec![tk(String, "yield"), tk(Whitespace, " "), tk(String, "from")]
    );
}

#[test]
fn nullsafe_operator_needs_php80() {
    use TokenKind::*;
    assert_eq!(
        script("$a?->b", PhpVersion::Php80),
        vec![tk(Variable, "$a"), tk(NullsafeObjectOperator, "?->"), tk(String, "b")]
    );
    assert_eq!(
        script("$a?->b", PhpVersion::Php74),
        vec![
            tk(Variable, "$a"),
            tk(Question, "?"),
            tk(ObjectOperator, "->"),
            tk(String, "b"),
        ]
    );
}

#[test]
fn hash_bracket_is_attribute_or_comment() {
    use TokenKind::*;
    assert_eq!(
        script("#[Attr]", PhpVersion::Php80),
        vec![tk(Attribute, "#["), tk(String, "Attr"), tk(RBracket, "]")]
    );
    assert_eq!(
        script("#[Attr]\n", PhpVersion::Php74),
        vec![tk(Comment, "#[Attr]"), tk(Whitespace, "\n")]
    );
}

#[test]
fn gated_percent_close_tag_is_percent() {
    use TokenKind::*;
    assert_eq!(
        latest("5 %> 2"),
        vec![
            tk(LNumber, "5"),
            tk(Whitespace, " "),
            tk(Percent, "%"),
            tk(Gt, ">"),
            tk(Whitespace, " "),
            tk(LNumber, "2"),
        ]
    );
}

#[test]
fn tokens_carry_absolute_offsets() {
    let toks: Vec<Token> = Lexer::new(&b"ab<?php $x"[..], LexerOptions::default()).collect();
    let spans: Vec<(usize, usize)> = toks.iter().map(|t| (t.start, t.end)).collect();
    assert_eq!(spans, vec![(0, 2), (2, 8), (8, 10), (10, 10)]);
}

//! End-to-end scanning scenarios: tags, strings, heredocs, buffer growth
//! and source failures.

use std::io::{self, Read};

use phplex::{
    Lexer, LexerOptions, LexicalState, Token, TokenKind, dev::OneByteReader, tokenize,
};

fn kinds_and_text(tokens: &[Token]) -> Vec<(TokenKind, String)> {
    tokens
        .iter()
        .map(|t| (t.kind, t.text().into_owned()))
        .collect()
}

fn lex(src: &str, opts: LexerOptions) -> Vec<(TokenKind, String)> {
    kinds_and_text(&tokenize(src, &opts))
}

fn tk(kind: TokenKind, text: &str) -> (TokenKind, String) {
    (kind, text.to_string())
}

#[test]
fn echo_double_quoted_string() {
    use TokenKind::*;
    let got = lex("<?php echo \"x\";", LexerOptions::default());
    assert_eq!(
        got,
        vec![
            tk(OpenTag, "<?php "),
            tk(Echo, "echo"),
            tk(Whitespace, " "),
            tk(DoubleQuote, "\""),
            tk(EncapsedAndWhitespace, "x"),
            tk(DoubleQuote, "\""),
            tk(Semicolon, ";"),
        ]
    );
}

#[test]
fn end_token_closes_the_stream() {
    let src = "<?php echo \"x\";";
    let all: Vec<Token> = Lexer::new(src.as_bytes(), LexerOptions::default()).collect();
    let last = all.last().expect("at least END");
    assert_eq!(last.kind, TokenKind::End);
    assert_eq!(last.start, src.len());
    assert!(last.is_empty());
    assert_eq!(
        all.iter().filter(|t| t.kind == TokenKind::End).count(),
        1,
        "END appears once"
    );
}

#[test]
fn next_token_keeps_returning_end() {
    let mut lexer = Lexer::new(&b"<?php"[..], LexerOptions::default());
    assert_eq!(lexer.next_token().kind, TokenKind::OpenTag);
    for _ in 0..3 {
        assert_eq!(lexer.next_token().kind, TokenKind::End);
    }
}

#[test]
fn empty_input_is_just_end() {
    let all: Vec<Token> = Lexer::new(&b""[..], LexerOptions::default()).collect();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].kind, TokenKind::End);
    assert_eq!((all[0].start, all[0].end), (0, 0));
}

#[test]
fn heredoc_from_scripting_state() {
    use TokenKind::*;
    let src = "<<<EOT\nabc\nEOT;";
    let mut lexer = Lexer::with_state(
        src.as_bytes(),
        LexerOptions::default(),
        LexicalState::InScripting,
        true,
    );

    let start = lexer.next_token();
    assert_eq!((start.kind, start.text().as_ref()), (StartHeredoc, "<<<EOT\n"));
    assert_eq!(lexer.state(), LexicalState::Heredoc);
    assert_eq!(lexer.heredoc_label().map(|h| h.label.as_slice()), Some(&b"EOT"[..]));

    let rest: Vec<Token> = lexer.by_ref().collect();
    assert_eq!(
        kinds_and_text(&rest),
        vec![
            tk(EncapsedAndWhitespace, "abc\n"),
            tk(EndHeredoc, "EOT"),
            tk(Semicolon, ";"),
            tk(End, ""),
        ]
    );
    assert_eq!(lexer.state(), LexicalState::InScripting);
    assert!(lexer.heredoc_label().is_none());
}

#[test]
fn asp_tags_follow_the_option() {
    use TokenKind::*;
    let src = "<% echo 1; %>";

    let off = lex(src, LexerOptions::default());
    assert_eq!(off, vec![tk(InlineHtml, src)]);

    let on = lex(
        src,
        LexerOptions {
            allow_asp_tags: true,
            ..LexerOptions::default()
        },
    );
    assert_eq!(
        on,
        vec![
            tk(OpenTag, "<%"),
            tk(Whitespace, " "),
            tk(Echo, "echo"),
            tk(Whitespace, " "),
            tk(LNumber, "1"),
            tk(Semicolon, ";"),
            tk(Whitespace, " "),
            tk(CloseTag, "%>"),
        ]
    );
}

#[test]
fn short_tags_follow_the_option() {
    use TokenKind::*;
    let src = "<?= $a ?>";

    assert_eq!(lex(src, LexerOptions::default()), vec![tk(InlineHtml, src)]);

    let on = lex(
        src,
        LexerOptions {
            allow_short_tags: true,
            ..LexerOptions::default()
        },
    );
    assert_eq!(
        on,
        vec![
            tk(OpenTagWithEcho, "<?="),
            tk(Whitespace, " "),
            tk(Variable, "$a"),
            tk(Whitespace, " "),
            tk(CloseTag, "?>"),
        ]
    );
}

#[test]
fn inline_html_around_php() {
    use TokenKind::*;
    let got = lex("<p>hi</p>\n<?php $x ?>\nbye", LexerOptions::default());
    assert_eq!(
        got,
        vec![
            tk(InlineHtml, "<p>hi</p>\n"),
            tk(OpenTag, "<?php "),
            tk(Variable, "$x"),
            tk(Whitespace, " "),
            tk(CloseTag, "?>\n"),
            tk(InlineHtml, "bye"),
        ]
    );
}

#[test]
fn open_tag_at_end_of_input() {
    assert_eq!(
        lex("<?php", LexerOptions::default()),
        vec![tk(TokenKind::OpenTag, "<?php")]
    );
}

#[test]
fn script_language_tag() {
    use TokenKind::*;
    let got = lex("<script language=\"php\">$a</script>", LexerOptions::default());
    assert_eq!(
        got,
        vec![
            tk(OpenTag, "<script language=\"php\">"),
            tk(Variable, "$a"),
            tk(CloseTag, "</script>"),
        ]
    );
}

#[test]
fn unmatched_close_brace_is_an_error_token() {
    use TokenKind::*;
    let got = lex("<?php }", LexerOptions::default());
    assert_eq!(got, vec![tk(OpenTag, "<?php "), tk(Error, "}")]);
}

#[test]
fn tiny_buffer_grows_for_long_tokens() {
    let html = "x".repeat(10_000);
    let src = format!("{html}<?php $a = \"{}\";", "y".repeat(5_000));
    let big = Lexer::new(src.as_bytes(), LexerOptions::default());
    let small = Lexer::new(src.as_bytes(), LexerOptions::default()).with_capacity(16);
    let a: Vec<Token> = big.collect();
    let b: Vec<Token> = small.collect();
    assert_eq!(a, b);
    assert_eq!(a[0].kind, TokenKind::InlineHtml);
    assert_eq!(a[0].len(), 10_000);
}

#[test]
fn one_byte_reader_gives_the_same_tokens() {
    let src = b"<?php\n$s = <<<EOT\nhello {$name}!\r\nEOT;\n// done ?>\ntail";
    let whole: Vec<Token> = Lexer::new(&src[..], LexerOptions::default()).collect();
    let trickled: Vec<Token> = Lexer::new(OneByteReader(src), LexerOptions::default())
        .with_capacity(1)
        .collect();
    assert_eq!(whole, trickled);
}

#[test]
fn initialize_restarts_on_a_new_source() {
    let mut lexer = Lexer::new(&b"<?php {"[..], LexerOptions::default());
    let _: Vec<Token> = lexer.by_ref().collect();
    assert_eq!(lexer.stack_depth(), 1);

    lexer.initialize(&b"$a"[..], LexicalState::InScripting, false);
    assert_eq!(lexer.stack_depth(), 0);
    let toks: Vec<Token> = lexer.collect();
    assert_eq!(toks[0].kind, TokenKind::Variable);
    assert_eq!((toks[0].start, toks[0].end), (0, 2));
    assert_eq!(toks[1].kind, TokenKind::End);
}

struct FailAfter<'a> {
    data: &'a [u8],
}

impl Read for FailAfter<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.is_empty() {
            return Err(io::Error::other("device gone"));
        }
        let n = buf.len().min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn read_error_ends_the_stream() {
    use TokenKind::*;
    let mut lexer = Lexer::new(
        FailAfter {
            data: b"<?php $a",
        },
        LexerOptions::default(),
    );
    let toks: Vec<Token> = lexer.by_ref().collect();
    assert_eq!(
        kinds_and_text(&toks),
        vec![tk(OpenTag, "<?php "), tk(Variable, "$a"), tk(End, "")]
    );
    assert!(lexer.read_error().is_some());
}

struct Interrupting<'a> {
    data: &'a [u8],
    interrupt_next: bool,
}

impl Read for Interrupting<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt_next = !self.interrupt_next;
        if self.interrupt_next {
            return Err(io::Error::from(io::ErrorKind::Interrupted));
        }
        let n = buf.len().min(self.data.len()).min(3);
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn interrupted_reads_are_retried() {
    let src = b"<?php echo 'interrupted';";
    let mut lexer = Lexer::new(
        Interrupting {
            data: src,
            interrupt_next: false,
        },
        LexerOptions::default(),
    );
    let toks: Vec<Token> = lexer.by_ref().collect();
    let plain: Vec<Token> = Lexer::new(&src[..], LexerOptions::default()).collect();
    assert_eq!(toks, plain);
    assert!(lexer.read_error().is_none());
}

#[test]
fn short_echo_tag_without_blanks() {
    use TokenKind::*;
    let src = "<?=1?>";
    assert_eq!(lex(src, LexerOptions::default()), vec![tk(InlineHtml, src)]);
    let on = lex(
        src,
        LexerOptions {
            allow_short_tags: true,
            ..LexerOptions::default()
        },
    );
    assert_eq!(
        on,
        vec![tk(OpenTagWithEcho, "<?="), tk(LNumber, "1"), tk(CloseTag, "?>")]
    );
}

#[test]
fn offsets_stay_ordered_across_growth() {
    let src = format!("<?php /* {} */ $a;", "z".repeat(300));
    let mut lexer = Lexer::new(OneByteReader(src.as_bytes()), LexerOptions::default())
        .with_capacity(4);
    let mut comment = None;
    loop {
        let t = lexer.next_token();
        let o = lexer.offsets();
        assert!(o.token_start <= o.chunk_start, "{o:?}");
        assert!(o.chunk_start <= o.token_end, "{o:?}");
        assert!(o.token_end <= o.lookahead, "{o:?}");
        assert!(o.lookahead <= o.chars_read, "{o:?}");
        assert!(o.chars_read <= o.capacity, "{o:?}");
        if t.kind == TokenKind::Comment {
            comment = Some(t.clone());
        }
        if t.kind == TokenKind::End {
            break;
        }
    }
    let comment = comment.expect("comment token");
    assert_eq!(comment.lexeme, src.as_bytes()[6..6 + 306].to_vec());
    assert_eq!((comment.start, comment.end), (6, 312));
    assert!(lexer.offsets().capacity >= 306);
}

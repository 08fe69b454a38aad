// src/main.rs
// Lex one PHP file (or stdin with `-`) and print its tokens.
// Usage:
//   phplex [--asp-tags] [--short-tags] [--php 7.4] [--json] [--state InScripting] <file|->

use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
};

use anyhow::{Context, Result, anyhow, bail};
use phplex::{Lexer, LexicalState, TokenKind, config::options_from_args, logging};
use serde::Serialize;

#[derive(Serialize)]
struct JsonToken<'a> {
    kind: TokenKind,
    start: usize,
    end: usize,
    text: &'a str,
}

fn parse_state(name: &str) -> Option<LexicalState> {
    LexicalState::ALL
        .into_iter()
        .find(|s| format!("{s:?}").eq_ignore_ascii_case(name))
}

fn main() -> Result<()> {
    logging::init();

    let (options, rest) = options_from_args(std::env::args().skip(1)).map_err(|e| anyhow!(e))?;

    let mut json = false;
    let mut state = LexicalState::Initial;
    let mut input: Option<String> = None;
    let mut args = rest.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--state" => {
                let name = args.next().context("--state needs a mode name")?;
                state = parse_state(&name).with_context(|| format!("unknown mode {name:?}"))?;
            }
            _ if input.is_none() => input = Some(arg),
            _ => bail!("unexpected argument {arg:?}"),
        }
    }
    let input = input.context("usage: phplex [options] <file|->")?;

    let source: Box<dyn Read> = if input == "-" {
        Box::new(io::stdin().lock())
    } else {
        Box::new(File::open(&input).with_context(|| format!("failed to open {input}"))?)
    };

    let mut lexer = Lexer::with_state(source, options, state, true);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut count = 0usize;
    for tok in lexer.by_ref() {
        if tok.kind == TokenKind::End {
            break;
        }
        count += 1;
        let text = tok.text();
        if json {
            let line = serde_json::to_string(&JsonToken {
                kind: tok.kind,
                start: tok.start,
                end: tok.end,
                text: &text,
            })?;
            writeln!(out, "{line}")?;
        } else {
            writeln!(out, "{:>8}..{:<8} {:?}  {:?}", tok.start, tok.end, tok.kind, text)?;
        }
    }
    out.flush()?;

    if let Some(e) = lexer.read_error() {
        bail!("reading {input} failed after {count} tokens: {e}");
    }
    log::info!("{count} tokens, final mode {:?}", lexer.state());
    Ok(())
}

//! Randomized properties over generated sources: total coverage,
//! determinism, independence from buffer size, and stack balance.

use phplex::{
    Lexer, LexerOptions, LexicalState, PhpVersion, TokenKind,
    dev::{OneByteReader, check_stream, gen_noise, gen_php_source, lex_bytes},
};
use rand::{Rng, SeedableRng, rngs::StdRng};

const VERSIONS: [PhpVersion; 5] = [
    PhpVersion::Php52,
    PhpVersion::Php56,
    PhpVersion::Php70,
    PhpVersion::Php74,
    PhpVersion::Php80,
];

fn random_options(rng: &mut StdRng) -> LexerOptions {
    LexerOptions {
        allow_asp_tags: rng.random_bool(0.5),
        allow_short_tags: rng.random_bool(0.5),
        version: VERSIONS[rng.random_range(0..VERSIONS.len())],
    }
}

#[test]
fn generated_php_is_fully_covered() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..40 {
        let len = rng.random_range(0..4_000);
        let src = gen_php_source(&mut rng, len);
        let opts = random_options(&mut rng);
        let toks = lex_bytes(src.as_bytes(), &opts);
        if let Err(e) = check_stream(src.as_bytes(), &toks) {
            panic!("{e}\nsource: {src:?}\noptions: {opts:?}");
        }
    }
}

#[test]
fn noise_is_fully_covered() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let len = rng.random_range(0..600);
        let src = gen_noise(&mut rng, len);
        let opts = random_options(&mut rng);
        let toks = lex_bytes(&src, &opts);
        if let Err(e) = check_stream(&src, &toks) {
            panic!("{e}\nsource: {:?}\noptions: {opts:?}", String::from_utf8_lossy(&src));
        }
    }
}

#[test]
fn every_start_mode_terminates_and_covers() {
    let mut rng = StdRng::seed_from_u64(13);
    for state in LexicalState::ALL {
        for _ in 0..20 {
            let len = rng.random_range(0..200);
            let src = gen_noise(&mut rng, len);
            let at_bol = rng.random_bool(0.5);
            let toks: Vec<_> =
                Lexer::with_state(&src[..], LexerOptions::default(), state, at_bol).collect();
            if let Err(e) = check_stream(&src, &toks) {
                panic!("{state:?}: {e}\nsource: {:?}", String::from_utf8_lossy(&src));
            }
        }
    }
}

#[test]
fn scanning_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..10 {
        let src = gen_php_source(&mut rng, 2_000);
        let opts = random_options(&mut rng);
        assert_eq!(lex_bytes(src.as_bytes(), &opts), lex_bytes(src.as_bytes(), &opts));
    }
}

#[test]
fn buffer_size_does_not_change_tokens() {
    let mut rng = StdRng::seed_from_u64(19);
    for _ in 0..20 {
        let src = if rng.random_bool(0.5) {
            gen_php_source(&mut rng, 1_500).into_bytes()
        } else {
            gen_noise(&mut rng, 800)
        };
        let opts = random_options(&mut rng);
        let capacity = rng.random_range(1..64);
        let whole = lex_bytes(&src, &opts);
        let trickled: Vec<_> = Lexer::new(OneByteReader(&src), opts.clone())
            .with_capacity(capacity)
            .collect();
        assert_eq!(whole, trickled, "capacity {capacity}, options {opts:?}");
    }
}

fn push_nested(rng: &mut StdRng, out: &mut String, depth: u32) {
    let n = rng.random_range(0..4);
    for _ in 0..n {
        match rng.random_range(0..5) {
            0 if depth < 6 => {
                out.push_str("if ($a) {");
                push_nested(rng, out, depth + 1);
                out.push('}');
            }
            1 if depth < 6 => {
                out.push_str("$s = \"{$o->p} ${v} $a[1]\";");
            }
            2 => out.push_str("$h = <<<EOT\n{$x[0]}\nEOT;\n"),
            3 => out.push_str("/* { */ // }\n"),
            _ => out.push_str("$b = '}';"),
        }
    }
}

#[test]
fn balanced_sources_return_to_depth_zero() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..50 {
        let mut src = String::from("<?php ");
        push_nested(&mut rng, &mut src, 0);
        let mut lexer = Lexer::new(src.as_bytes(), LexerOptions::default());
        let mut max_depth = 0;
        loop {
            let t = lexer.next_token();
            assert_ne!(t.kind, TokenKind::Error, "source: {src:?}");
            max_depth = max_depth.max(lexer.stack_depth());
            if t.kind == TokenKind::End {
                break;
            }
        }
        assert_eq!(lexer.stack_depth(), 0, "source: {src:?} (max depth {max_depth})");
        assert_eq!(lexer.state(), LexicalState::InScripting);
    }
}

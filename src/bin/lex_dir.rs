// src/bin/lex_dir.rs
// Lex every .php file under a directory in parallel and report totals.
// Usage:
//   cargo run --release --bin lex_dir -- [--php 7.4] [--short-tags] <dir>

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result, anyhow};
use phplex::{Lexer, LexerOptions, TokenKind, config::options_from_args, logging};
use rayon::prelude::*;
use walkdir::WalkDir;

#[derive(Default, Clone, Copy)]
struct Stats {
    files: usize,
    bytes: usize,
    tokens: usize,
    errors: usize,
}

impl Stats {
    fn add(self, o: Stats) -> Stats {
        Stats {
            files: self.files + o.files,
            bytes: self.bytes + o.bytes,
            tokens: self.tokens + o.tokens,
            errors: self.errors + o.errors,
        }
    }
}

fn lex_file(path: &Path, options: &LexerOptions) -> Result<Stats> {
    let f = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut lexer = Lexer::new(BufReader::new(f), options.clone());
    let mut stats = Stats {
        files: 1,
        ..Stats::default()
    };
    for tok in lexer.by_ref() {
        if tok.kind == TokenKind::End {
            stats.bytes = tok.end;
            break;
        }
        stats.tokens += 1;
        if tok.kind == TokenKind::Error {
            stats.errors += 1;
            log::debug!("{}: ERROR token at {}", path.display(), tok.start);
        }
    }
    if let Some(e) = lexer.read_error() {
        return Err(anyhow!("failed to read {}: {e}", path.display()));
    }
    Ok(stats)
}

fn main() -> Result<()> {
    logging::init();

    let (options, rest) = options_from_args(std::env::args().skip(1)).map_err(|e| anyhow!(e))?;
    let root = rest
        .first()
        .map(PathBuf::from)
        .context("usage: lex_dir [options] <dir>")?;

    let files: Vec<PathBuf> = WalkDir::new(&root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("php"))
        })
        .collect();
    log::info!("[lex_dir] {} .php files under {}", files.len(), root.display());

    let t0 = Instant::now();
    let total = files
        .par_iter()
        .map(|p| match lex_file(p, &options) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("{e:#}");
                Stats::default()
            }
        })
        .reduce(Stats::default, Stats::add);
    let ms = t0.elapsed().as_millis();

    println!(
        "{} files, {} bytes, {} tokens, {} ERROR tokens in {} ms",
        total.files, total.bytes, total.tokens, total.errors, ms
    );
    Ok(())
}

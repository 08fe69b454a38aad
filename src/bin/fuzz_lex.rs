// src/bin/fuzz_lex.rs
// Generate random PHP-ish inputs and check scanner invariants on each:
// total coverage, a single trailing END, and identical streams whether the
// source arrives in one piece or one byte at a time into a tiny buffer.
// Env:
//   FUZZ_LEN, FUZZ_ITERS, FUZZ_SEED   generator settings
//   FUZZ_NOISE=1                      raw byte noise instead of PHP-ish text
//   FUZZ_SAVE=1 and FUZZ_DIR=...      save failing cases
//   FUZZ_INPUT=path                   replay a saved case

use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result, bail};
use phplex::{
    Lexer, LexerOptions, PhpVersion,
    dev::{OneByteReader, check_stream, gen_noise, gen_php_source, lex_bytes},
    logging,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn random_options<R: Rng>(rng: &mut R) -> LexerOptions {
    const VERSIONS: [PhpVersion; 4] = [
        PhpVersion::Php53,
        PhpVersion::Php56,
        PhpVersion::Php74,
        PhpVersion::Php80,
    ];
    LexerOptions {
        allow_asp_tags: rng.random_bool(0.3),
        allow_short_tags: rng.random_bool(0.3),
        version: VERSIONS[rng.random_range(0..VERSIONS.len())],
    }
}

fn run_once(src: &[u8], options: &LexerOptions) -> Result<()> {
    let t0 = Instant::now();
    let whole = lex_bytes(src, options);
    let ms = t0.elapsed().as_millis();
    if let Err(e) = check_stream(src, &whole) {
        bail!("invariant violated: {e}");
    }

    let trickled: Vec<_> = Lexer::new(OneByteReader(src), options.clone())
        .with_capacity(1)
        .collect();
    if trickled != whole {
        let i = whole
            .iter()
            .zip(&trickled)
            .position(|(a, b)| a != b)
            .unwrap_or(whole.len().min(trickled.len()));
        bail!(
            "buffered and one-byte streams diverge at token {i}: {:?} vs {:?}",
            whole.get(i),
            trickled.get(i)
        );
    }

    log::info!(
        "[fuzz] {} bytes -> {} tokens in {} ms ({:?})",
        src.len(),
        whole.len(),
        ms,
        options
    );
    Ok(())
}

fn save_case(dir: &str, seed: u64, iter: usize, src: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {dir}"))?;
    let path = Path::new(dir).join(format!("case_s{seed}_i{iter}_n{}.php", src.len()));
    fs::write(&path, src).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn main() -> Result<()> {
    logging::init();

    if let Ok(path) = std::env::var("FUZZ_INPUT") {
        log::info!("[replay] reading {path}");
        let src = fs::read(&path).with_context(|| format!("failed to read {path}"))?;
        return run_once(&src, &LexerOptions::default());
    }

    let len: usize = env_or("FUZZ_LEN", 200_000);
    let iters: usize = env_or("FUZZ_ITERS", 20);
    let seed: u64 = env_or("FUZZ_SEED", 42);
    let noise = std::env::var("FUZZ_NOISE").ok().as_deref() == Some("1");
    let save = std::env::var("FUZZ_SAVE").ok().as_deref() == Some("1");
    let out_dir = std::env::var("FUZZ_DIR").unwrap_or_else(|_| "fuzz-cases".to_string());

    log::info!("[fuzz] len={len} iters={iters} seed={seed} noise={noise}");
    let mut rng = StdRng::seed_from_u64(seed);
    for i in 0..iters {
        let src = if noise {
            gen_noise(&mut rng, len)
        } else {
            gen_php_source(&mut rng, len).into_bytes()
        };
        let options = random_options(&mut rng);
        if let Err(e) = run_once(&src, &options) {
            if save {
                let path = save_case(&out_dir, seed, i, &src)?;
                log::error!("[save] wrote {}", path.display());
            }
            return Err(e.context(format!("iteration {i} (seed {seed})")));
        }
    }
    log::info!("[fuzz] all {iters} iterations passed");
    Ok(())
}

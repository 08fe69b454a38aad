// src/bin/gen_tables.rs
// Build the PHP scanner tables and write them as JSON and compact binary.
// Usage:
//   cargo run --bin gen_tables                 # writes tables/php_tables.{json,bin}
//   cargo run --bin gen_tables -- /path/out    # writes /path/out.{json,bin}

use std::{env, fs, path::PathBuf, time::Instant};

use anyhow::{Context, Result, ensure};
use phplex::{
    lexer::tables::{
        build_tables, load_tables_bin_bytes, load_tables_json_bytes, save_tables_bin,
        save_tables_json,
    },
    logging,
};

fn main() -> Result<()> {
    logging::init();

    let base = PathBuf::from(
        env::args()
            .nth(1)
            .unwrap_or_else(|| "tables/php_tables".to_string()),
    );
    if let Some(parent) = base.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    log::info!("[gen_tables] building PHP scanner tables…");
    let t0 = Instant::now();
    let t = build_tables();
    log::info!(
        "[gen_tables] {} states, {} rows x {} columns, {} rules ({} ms)",
        t.n_states(),
        t.n_rows(),
        t.n_columns,
        t.actions.len(),
        t0.elapsed().as_millis()
    );

    let json = base.with_extension("json");
    save_tables_json(&json, &t).with_context(|| format!("failed to write {}", json.display()))?;
    let bin = base.with_extension("bin");
    save_tables_bin(&bin, &t).with_context(|| format!("failed to write {}", bin.display()))?;

    // read both back before declaring success
    let from_json = load_tables_json_bytes(&fs::read(&json)?).map_err(anyhow::Error::msg)?;
    let from_bin = load_tables_bin_bytes(&fs::read(&bin)?).map_err(anyhow::Error::msg)?;
    for (name, back) in [("json", &from_json), ("bin", &from_bin)] {
        ensure!(
            back.transitions == t.transitions && back.row_of == t.row_of && back.entry == t.entry,
            "{name} tables differ from the built ones"
        );
    }

    log::info!("[gen_tables] wrote {} and {}", json.display(), bin.display());
    Ok(())
}

// src/lexer/tables/io.rs
use std::{
    io::{BufWriter, Write},
    path::Path,
    time::Instant,
};

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use super::{AcceptCondition, N_SYMBOLS, NO_RULE, NO_STATE, Tables, rules::php_actions};
use crate::lexer::state::LexicalState;

/// Tables on disk carry everything but the actions, which are code and are
/// re-attached from the rule list. `n_rules` guards against a stale file.
fn check_and_attach(mut t: Tables, n_rules: u32) -> Result<Tables, String> {
    let actions = php_actions();
    if actions.len() != n_rules as usize {
        return Err(format!(
            "tables were built for {n_rules} rules, this build has {}",
            actions.len()
        ));
    }
    t.actions = actions;

    let n_states = t.row_of.len();
    let n_columns = t.n_columns as usize;
    if n_columns == 0 || t.transitions.len() % n_columns != 0 {
        return Err("transition table is not a whole number of rows".into());
    }
    let n_rows = t.transitions.len() / n_columns;
    if t.accept.len() != n_states || t.rule_of.len() != n_states {
        return Err("per-state arrays disagree on the state count".into());
    }
    if t.columns.iter().any(|&c| c as usize >= n_columns) {
        return Err("symbol column out of range".into());
    }
    if t.row_of.iter().any(|&r| r as usize >= n_rows) {
        return Err("row id out of range".into());
    }
    if t.transitions.iter().any(|&s| s != NO_STATE && s as usize >= n_states) {
        return Err("transition target out of range".into());
    }
    if t.entry.iter().any(|&s| s as usize >= n_states) {
        return Err("entry state out of range".into());
    }
    let bad_rule = |r: &u32| *r != NO_RULE && *r >= n_rules;
    if t.rule_of.iter().any(bad_rule) {
        return Err("rule id out of range".into());
    }
    Ok(t)
}

// -------------------- JSON (de)serialization --------------------

#[serde_as]
#[derive(Serialize, Deserialize)]
struct TablesDisk {
    #[serde_as(as = "[_; N_SYMBOLS]")]
    columns: [u16; N_SYMBOLS],
    n_columns: u32,
    n_rules: u32,
    row_of: Vec<u32>,
    transitions: Vec<u32>,
    accept: Vec<AcceptCondition>,
    rule_of: Vec<u32>,
    entry: [u32; LexicalState::COUNT],
}
impl From<&Tables> for TablesDisk {
    fn from(t: &Tables) -> Self {
        Self {
            columns: t.columns,
            n_columns: t.n_columns,
            n_rules: t.actions.len() as u32,
            row_of: t.row_of.clone(),
            transitions: t.transitions.clone(),
            accept: t.accept.clone(),
            rule_of: t.rule_of.clone(),
            entry: t.entry,
        }
    }
}
impl TablesDisk {
    fn into_tables(self) -> Result<Tables, String> {
        let n_rules = self.n_rules;
        check_and_attach(
            Tables {
                columns: self.columns,
                n_columns: self.n_columns,
                row_of: self.row_of,
                transitions: self.transitions,
                accept: self.accept,
                rule_of: self.rule_of,
                entry: self.entry,
                actions: Vec::new(),
            },
            n_rules,
        )
    }
}

pub fn save_tables_json(path: &Path, t: &Tables) -> std::io::Result<()> {
    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer(&mut w, &TablesDisk::from(t))?;
    w.flush()
}

pub fn load_tables_json_bytes(data: &[u8]) -> Result<Tables, String> {
    serde_json::from_slice::<TablesDisk>(data)
        .map_err(|e| format!("Failed to parse tables JSON: {e}"))?
        .into_tables()
}

// -------------------- Compact binary --------------------
//
// magic, then u32 n_columns, n_states, n_rows, n_rules (LE);
// columns: N_SYMBOLS x u16; entry: COUNT x u32;
// row_of, rule_of: n_states x u32;
// transitions: n_rows * n_columns x u32; accept: n_states x u8.

const BIN_MAGIC: &[u8; 8] = b"PHPLXT02";

fn write_u32s(w: &mut impl Write, values: &[u32]) -> std::io::Result<()> {
    const CHUNK: usize = 1 << 16;
    let mut bytes = Vec::with_capacity(CHUNK * 4);
    for chunk in values.chunks(CHUNK) {
        bytes.clear();
        for v in chunk {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        w.write_all(&bytes)?;
    }
    Ok(())
}

pub fn save_tables_bin(path: &Path, t: &Tables) -> std::io::Result<()> {
    let instant = Instant::now();
    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);

    w.write_all(BIN_MAGIC)?;
    write_u32s(
        &mut w,
        &[
            t.n_columns,
            t.n_states() as u32,
            t.n_rows() as u32,
            t.actions.len() as u32,
        ],
    )?;

    for &c in &t.columns {
        w.write_all(&c.to_le_bytes())?;
    }
    write_u32s(&mut w, &t.entry)?;
    write_u32s(&mut w, &t.row_of)?;
    write_u32s(&mut w, &t.rule_of)?;
    write_u32s(&mut w, &t.transitions)?;
    let accept: Vec<u8> = t.accept.iter().map(|&a| a as u8).collect();
    w.write_all(&accept)?;

    w.flush()?;
    log::debug!(
        "saved tables to {} in {} ms",
        path.display(),
        instant.elapsed().as_millis()
    );
    Ok(())
}

struct BinReader<'a> {
    data: &'a [u8],
}

impl<'a> BinReader<'a> {
    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8], String> {
        if self.data.len() < n {
            return Err(format!("truncated {what}"));
        }
        let (head, rest) = self.data.split_at(n);
        self.data = rest;
        Ok(head)
    }

    fn u16(&mut self, what: &str) -> Result<u16, String> {
        let b = self.take(2, what)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self, what: &str) -> Result<u32, String> {
        let b = self.take(4, what)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u32s(&mut self, n: usize, what: &str) -> Result<Vec<u32>, String> {
        let len = n.checked_mul(4).ok_or_else(|| format!("{what} length overflow"))?;
        let bytes = self.take(len, what)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }
}

pub fn load_tables_bin_bytes(data: &[u8]) -> Result<Tables, String> {
    let mut r = BinReader { data };
    if r.take(8, "magic")? != BIN_MAGIC {
        return Err("bad magic in tables .bin".into());
    }
    let n_columns = r.u32("header")?;
    let n_states = r.u32("header")? as usize;
    let n_rows = r.u32("header")? as usize;
    let n_rules = r.u32("header")?;

    let mut columns = [0u16; N_SYMBOLS];
    for c in columns.iter_mut() {
        *c = r.u16("columns")?;
    }
    let mut entry = [0u32; LexicalState::COUNT];
    for e in entry.iter_mut() {
        *e = r.u32("entry")?;
    }
    let row_of = r.u32s(n_states, "row_of")?;
    let rule_of = r.u32s(n_states, "rule_of")?;
    let cells = n_rows
        .checked_mul(n_columns as usize)
        .ok_or("transition table size overflow")?;
    let transitions = r.u32s(cells, "transitions")?;
    let accept = r
        .take(n_states, "accept")?
        .iter()
        .map(|&b| AcceptCondition::from_u8(b).ok_or_else(|| format!("bad accept condition {b}")))
        .collect::<Result<Vec<_>, _>>()?;

    check_and_attach(
        Tables {
            columns,
            n_columns,
            row_of,
            transitions,
            accept,
            rule_of,
            entry,
            actions: Vec::new(),
        },
        n_rules,
    )
}

// src/lexer/tables/build.rs
// Rules -> Thompson NFA -> DFA by subset construction -> compressed tables.

use hashbrown::HashMap;
use rayon::prelude::*;
use std::time::Instant;

use super::pattern::{ByteSet, Edge, N_SYMBOLS, Nfa, SYM_BOL, SYM_EOF};
use super::rules::{Rule, php_rules};
use super::{AcceptCondition, NO_RULE, NO_STATE, Tables};
use crate::lexer::state::LexicalState;

/// Per lexical state: (plain entry node, entry node after BOL).
type Entries = [(u32, u32); LexicalState::COUNT];

fn compile_rules(rules: &[Rule]) -> (Nfa, Entries) {
    let mut nfa = Nfa::default();
    let mut entries: Entries = [(0, 0); LexicalState::COUNT];
    for e in entries.iter_mut() {
        let plain = nfa.add_node();
        let bol = nfa.add_node();
        nfa.add_edge(plain, Edge::Bol, bol);
        *e = (plain, bol);
    }

    for (id, rule) in rules.iter().enumerate() {
        let (start, end) = nfa.compile(&rule.pattern);
        nfa.nodes[end as usize].accept = Some(id as u32);
        for st in rule.states {
            let (plain, bol) = entries[st.idx()];
            if !rule.anchored {
                nfa.add_eps(plain, start);
            }
            nfa.add_eps(bol, start);
        }
    }
    (nfa, entries)
}

/// Group symbols that every edge label treats alike.
/// Returns the column of each symbol and one representative symbol per column.
fn symbol_classes(nfa: &Nfa) -> ([u16; N_SYMBOLS], Vec<usize>) {
    let mut labels: HashMap<ByteSet, u32> = HashMap::new();
    for node in &nfa.nodes {
        for (edge, _) in &node.edges {
            if let Edge::Bytes(s) = edge {
                let next = labels.len() as u32;
                labels.entry(*s).or_insert(next);
            }
        }
    }
    let mut ordered: Vec<(ByteSet, u32)> = labels.into_iter().collect();
    ordered.sort_unstable_by_key(|&(_, id)| id);

    let mut columns = [0u16; N_SYMBOLS];
    let mut reps: Vec<usize> = Vec::new();
    let mut by_signature: HashMap<Vec<u32>, u16> = HashMap::new();
    for b in 0..256usize {
        let signature: Vec<u32> = ordered
            .iter()
            .filter(|(s, _)| s.contains(b as u8))
            .map(|&(_, id)| id)
            .collect();
        let col = *by_signature.entry(signature).or_insert_with(|| {
            reps.push(b);
            (reps.len() - 1) as u16
        });
        columns[b] = col;
    }
    for sym in [SYM_BOL, SYM_EOF] {
        reps.push(sym);
        columns[sym] = (reps.len() - 1) as u16;
    }
    (columns, reps)
}

struct Dfa {
    sets: Vec<Vec<u32>>,
    rows: Vec<Vec<u32>>,
    entry: [u32; LexicalState::COUNT],
}

fn intern(sets: &mut Vec<Vec<u32>>, map: &mut HashMap<Vec<u32>, u32>, set: Vec<u32>) -> u32 {
    if let Some(&id) = map.get(&set) {
        return id;
    }
    let id = sets.len() as u32;
    map.insert(set.clone(), id);
    sets.push(set);
    id
}

fn subset_construction(nfa: &Nfa, entries: &Entries, reps: &[usize]) -> Dfa {
    let mut sets: Vec<Vec<u32>> = Vec::new();
    let mut map: HashMap<Vec<u32>, u32> = HashMap::new();
    let mut entry = [0u32; LexicalState::COUNT];
    for (i, &(plain, _)) in entries.iter().enumerate() {
        entry[i] = intern(&mut sets, &mut map, nfa.closure([plain]));
    }

    let mut rows: Vec<Vec<u32>> = Vec::new();
    let mut round = 0usize;
    loop {
        let done = rows.len();
        let cur_len = sets.len();
        if done == cur_len {
            break;
        }

        // successor sets for the whole frontier, in parallel
        let successors: Vec<Vec<Vec<u32>>> = sets[done..cur_len]
            .par_iter()
            .map(|set| reps.iter().map(|&sym| nfa.step(set, sym)).collect::<Vec<_>>())
            .collect();

        // intern sequentially so ids are stable
        for succ in successors {
            let row = succ
                .into_iter()
                .map(|t| {
                    if t.is_empty() {
                        NO_STATE
                    } else {
                        intern(&mut sets, &mut map, t)
                    }
                })
                .collect();
            rows.push(row);
        }

        round += 1;
        log::debug!("[tables] subset round {round}: {} states", sets.len());
    }

    Dfa { sets, rows, entry }
}

fn classify(nfa: &Nfa, rules: &[Rule], set: &[u32]) -> (AcceptCondition, u32) {
    let best = set
        .iter()
        .filter_map(|&n| nfa.nodes[n as usize].accept)
        .min()
        .unwrap_or(NO_RULE);
    let cond = if best == NO_RULE {
        AcceptCondition::NotAccept
    } else if rules[best as usize].anchored {
        AcceptCondition::AcceptOnStart
    } else if rules[best as usize].trim_newline {
        AcceptCondition::AcceptOnEnd
    } else {
        AcceptCondition::Accept
    };
    (cond, best)
}

pub fn build_tables_from(rules: &[Rule]) -> Tables {
    let t0 = Instant::now();
    let (nfa, entries) = compile_rules(rules);
    let (columns, reps) = symbol_classes(&nfa);
    log::debug!(
        "[tables] {} rules -> {} NFA nodes, {} columns",
        rules.len(),
        nfa.nodes.len(),
        reps.len()
    );

    let t1 = Instant::now();
    let dfa = subset_construction(&nfa, &entries, &reps);
    log::debug!(
        "[tables] {} DFA states (took {} ms)",
        dfa.sets.len(),
        t1.elapsed().as_millis()
    );

    let n_states = dfa.sets.len();
    let mut accept = Vec::with_capacity(n_states);
    let mut rule_of = Vec::with_capacity(n_states);
    for set in &dfa.sets {
        let (cond, rule) = classify(&nfa, rules, set);
        accept.push(cond);
        rule_of.push(rule);
    }

    // share identical rows
    let n_columns = reps.len();
    let mut row_ids: HashMap<&[u32], u32> = HashMap::new();
    let mut transitions: Vec<u32> = Vec::new();
    let mut row_of = Vec::with_capacity(n_states);
    for row in &dfa.rows {
        let id = *row_ids.entry(row.as_slice()).or_insert_with(|| {
            transitions.extend_from_slice(row);
            (transitions.len() / n_columns - 1) as u32
        });
        row_of.push(id);
    }

    log::debug!(
        "[tables] finalized: {} states, {} rows x {} columns (total {} ms)",
        n_states,
        transitions.len() / n_columns,
        n_columns,
        t0.elapsed().as_millis()
    );

    Tables {
        columns,
        n_columns: n_columns as u32,
        row_of,
        transitions,
        accept,
        rule_of,
        entry: dfa.entry,
        actions: rules.iter().map(|r| r.action).collect(),
    }
}

pub fn build_tables() -> Tables {
    build_tables_from(&php_rules())
}

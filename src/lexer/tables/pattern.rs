// src/lexer/tables/pattern.rs
// Byte-level pattern combinators and their Thompson NFA.

/// Symbols seen by the DFA: every byte value plus two synthetic ones.
pub const SYM_BOL: usize = 256;
pub const SYM_EOF: usize = 257;
pub const N_SYMBOLS: usize = 258;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct ByteSet([u64; 4]);

impl ByteSet {
    pub const EMPTY: ByteSet = ByteSet([0; 4]);
    pub const FULL: ByteSet = ByteSet([u64::MAX; 4]);

    #[inline]
    pub fn contains(&self, b: u8) -> bool {
        self.0[(b >> 6) as usize] >> (b & 63) & 1 == 1
    }

    #[inline]
    pub fn insert(&mut self, b: u8) {
        self.0[(b >> 6) as usize] |= 1 << (b & 63);
    }

    pub fn of(bytes: &[u8]) -> ByteSet {
        let mut s = ByteSet::EMPTY;
        for &b in bytes {
            s.insert(b);
        }
        s
    }

    pub fn range(lo: u8, hi: u8) -> ByteSet {
        let mut s = ByteSet::EMPTY;
        for b in lo..=hi {
            s.insert(b);
        }
        s
    }

    pub fn union(self, other: ByteSet) -> ByteSet {
        let mut out = self;
        for i in 0..4 {
            out.0[i] |= other.0[i];
        }
        out
    }

    pub fn complement(self) -> ByteSet {
        let mut out = self;
        for w in out.0.iter_mut() {
            *w = !*w;
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }
}

#[derive(Clone, Debug)]
pub enum Pat {
    Bytes(ByteSet),
    /// Matches the synthetic end-of-input symbol (zero width).
    Eof,
    Seq(Vec<Pat>),
    Alt(Vec<Pat>),
    Star(Box<Pat>),
    Plus(Box<Pat>),
    Opt(Box<Pat>),
}

impl Pat {
    pub fn star(self) -> Pat {
        Pat::Star(Box::new(self))
    }
    pub fn plus(self) -> Pat {
        Pat::Plus(Box::new(self))
    }
    pub fn opt(self) -> Pat {
        Pat::Opt(Box::new(self))
    }
    pub fn then(self, next: Pat) -> Pat {
        match self {
            Pat::Seq(mut v) => {
                v.push(next);
                Pat::Seq(v)
            }
            p => Pat::Seq(vec![p, next]),
        }
    }
}

pub fn lit(s: &str) -> Pat {
    Pat::Seq(s.bytes().map(|b| Pat::Bytes(ByteSet::of(&[b]))).collect())
}

/// ASCII case-insensitive literal.
pub fn ci(s: &str) -> Pat {
    Pat::Seq(
        s.bytes()
            .map(|b| Pat::Bytes(ByteSet::of(&[b.to_ascii_lowercase(), b.to_ascii_uppercase()])))
            .collect(),
    )
}

pub fn set(bytes: &[u8]) -> Pat {
    Pat::Bytes(ByteSet::of(bytes))
}

pub fn range(lo: u8, hi: u8) -> Pat {
    Pat::Bytes(ByteSet::range(lo, hi))
}

pub fn not(bytes: &[u8]) -> Pat {
    Pat::Bytes(ByteSet::of(bytes).complement())
}

pub fn any() -> Pat {
    Pat::Bytes(ByteSet::FULL)
}

pub fn seq(parts: Vec<Pat>) -> Pat {
    Pat::Seq(parts)
}

pub fn alt(parts: Vec<Pat>) -> Pat {
    Pat::Alt(parts)
}

#[derive(Clone, Copy, Debug)]
pub enum Edge {
    Bytes(ByteSet),
    Bol,
    Eof,
}

impl Edge {
    #[inline]
    pub fn matches(&self, sym: usize) -> bool {
        match self {
            Edge::Bytes(s) => sym < 256 && s.contains(sym as u8),
            Edge::Bol => sym == SYM_BOL,
            Edge::Eof => sym == SYM_EOF,
        }
    }
}

#[derive(Default, Clone, Debug)]
pub struct Node {
    pub eps: Vec<u32>,
    pub edges: Vec<(Edge, u32)>,
    pub accept: Option<u32>,
}

#[derive(Default, Debug)]
pub struct Nfa {
    pub nodes: Vec<Node>,
}

impl Nfa {
    pub fn add_node(&mut self) -> u32 {
        self.nodes.push(Node::default());
        (self.nodes.len() - 1) as u32
    }

    pub fn add_eps(&mut self, from: u32, to: u32) {
        self.nodes[from as usize].eps.push(to);
    }

    pub fn add_edge(&mut self, from: u32, edge: Edge, to: u32) {
        self.nodes[from as usize].edges.push((edge, to));
    }

    /// Thompson construction; returns (entry, exit).
    pub fn compile(&mut self, pat: &Pat) -> (u32, u32) {
        match pat {
            Pat::Bytes(s) => {
                let a = self.add_node();
                let b = self.add_node();
                self.add_edge(a, Edge::Bytes(*s), b);
                (a, b)
            }
            Pat::Eof => {
                let a = self.add_node();
                let b = self.add_node();
                self.add_edge(a, Edge::Eof, b);
                (a, b)
            }
            Pat::Seq(parts) => {
                let start = self.add_node();
                let mut cur = start;
                for p in parts {
                    let (s, e) = self.compile(p);
                    self.add_eps(cur, s);
                    cur = e;
                }
                (start, cur)
            }
            Pat::Alt(parts) => {
                let start = self.add_node();
                let end = self.add_node();
                for p in parts {
                    let (s, e) = self.compile(p);
                    self.add_eps(start, s);
                    self.add_eps(e, end);
                }
                (start, end)
            }
            Pat::Star(inner) => {
                let start = self.add_node();
                let end = self.add_node();
                let (s, e) = self.compile(inner);
                self.add_eps(start, s);
                self.add_eps(start, end);
                self.add_eps(e, s);
                self.add_eps(e, end);
                (start, end)
            }
            Pat::Plus(inner) => {
                let (s, e) = self.compile(inner);
                let end = self.add_node();
                self.add_eps(e, s);
                self.add_eps(e, end);
                (s, end)
            }
            Pat::Opt(inner) => {
                let start = self.add_node();
                let end = self.add_node();
                let (s, e) = self.compile(inner);
                self.add_eps(start, s);
                self.add_eps(start, end);
                self.add_eps(e, end);
                (start, end)
            }
        }
    }

    /// Sorted epsilon closure.
    pub fn closure(&self, seeds: impl IntoIterator<Item = u32>) -> Vec<u32> {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack: Vec<u32> = Vec::new();
        let mut out = Vec::new();
        for s in seeds {
            if !seen[s as usize] {
                seen[s as usize] = true;
                stack.push(s);
            }
        }
        while let Some(n) = stack.pop() {
            out.push(n);
            for &t in &self.nodes[n as usize].eps {
                if !seen[t as usize] {
                    seen[t as usize] = true;
                    stack.push(t);
                }
            }
        }
        out.sort_unstable();
        out
    }

    /// Closure of the nodes reachable from `set` on symbol `sym`.
    pub fn step(&self, set: &[u32], sym: usize) -> Vec<u32> {
        let mut targets = Vec::new();
        for &n in set {
            for (edge, to) in &self.nodes[n as usize].edges {
                if edge.matches(sym) {
                    targets.push(*to);
                }
            }
        }
        if targets.is_empty() {
            return targets;
        }
        self.closure(targets)
    }
}

// src/dev/generator.rs
// Random PHP-looking sources. Mostly well formed, with the odd unterminated
// construct so the end-of-input paths get exercised too.

use rand::Rng;

pub fn gen_php_source<R: Rng>(rng: &mut R, target_len: usize) -> String {
    let mut out = String::with_capacity(target_len + target_len / 8);

    while out.len() < target_len {
        out.push_str("<html>\n");
        if rng.random_bool(0.5) {
            out.push_str("<?php ");
        } else {
            out.push_str("<?php\n");
        }
        let stmts = rng.random_range(1..=40);
        for _ in 0..stmts {
            push_statement(rng, &mut out);
        }
        if rng.random_bool(0.8) {
            out.push_str("?>\n");
        }
    }
    out
}

/// Arbitrary bytes with a bias toward the characters that switch modes.
pub fn gen_noise<R: Rng>(rng: &mut R, len: usize) -> Vec<u8> {
    const HOT: &[u8] = b"<?php%>{}$\"'`\\#/*\n\r[]-> \t0xbEOT";
    (0..len)
        .map(|_| {
            if rng.random_bool(0.7) {
                HOT[rng.random_range(0..HOT.len())]
            } else {
                rng.random()
            }
        })
        .collect()
}

fn push_statement<R: Rng>(rng: &mut R, out: &mut String) {
    match rng.random_range(0u32..100) {
        0..=19 => {
            push_var(rng, out);
            out.push_str(" = ");
            push_expr(rng, out, 2);
            out.push_str(";\n");
        }
        20..=29 => {
            out.push_str("echo ");
            push_string(rng, out);
            out.push_str(";\n");
        }
        30..=39 => push_line_comment(rng, out),
        40..=47 => push_block_comment(rng, out),
        48..=55 => push_heredoc(rng, out),
        56..=65 => {
            out.push_str("if (");
            push_expr(rng, out, 2);
            out.push_str(") {\n");
            let n = rng.random_range(0..=3);
            for _ in 0..n {
                push_statement(rng, out);
            }
            out.push_str("}\n");
        }
        66..=73 => {
            out.push_str("function ");
            push_ident(rng, out);
            out.push_str("($a, ...$rest) { return $a ?? null; }\n");
        }
        74..=81 => {
            out.push_str("$obj?->");
            push_ident(rng, out);
            out.push_str("->call(");
            push_expr(rng, out, 1);
            out.push_str(");\n");
        }
        82..=87 => {
            out.push_str("#[Attr]\n$x = match ($y) { 1 => 2, default => 3 };\n");
        }
        88..=93 => {
            out.push_str("$n = (int) ");
            push_number(rng, out);
            out.push_str(" <=> 0b101 ** 2;\n");
        }
        _ => {
            // rare: a construct left open
            let open = ["/* open", "\"open $x", "'open", "<<<EOT\nopen"];
            out.push_str(open[rng.random_range(0..open.len())]);
            out.push('\n');
        }
    }
}

fn push_expr<R: Rng>(rng: &mut R, out: &mut String, depth: u32) {
    match rng.random_range(0u32..5) {
        0 => push_var(rng, out),
        1 => push_number(rng, out),
        2 => push_string(rng, out),
        3 if depth > 0 => {
            out.push('(');
            push_expr(rng, out, depth - 1);
            let ops = [" + ", " . ", " === ", " && ", " ?? ", "<<", " % "];
            out.push_str(ops[rng.random_range(0..ops.len())]);
            push_expr(rng, out, depth - 1);
            out.push(')');
        }
        _ => push_ident(rng, out),
    }
}

fn push_var<R: Rng>(rng: &mut R, out: &mut String) {
    out.push('$');
    push_ident(rng, out);
}

fn push_ident<R: Rng>(rng: &mut R, out: &mut String) {
    let len = rng.random_range(1..=10);
    out.push(random_alpha(rng));
    for _ in 1..len {
        if rng.random_bool(0.7) {
            out.push(random_alpha(rng));
        } else {
            out.push(char::from(b'0' + rng.random_range(0..10)));
        }
    }
}

fn push_number<R: Rng>(rng: &mut R, out: &mut String) {
    match rng.random_range(0u32..6) {
        0 => out.push_str(&rng.random_range(0u32..100_000).to_string()),
        1 => out.push_str(&format!("0x{:X}", rng.random_range(0u32..0xffff))),
        2 => out.push_str(&format!("0{:o}", rng.random_range(1u32..512))),
        3 => {
            let (int, frac) = (rng.random_range(0u32..100), rng.random_range(0u32..100));
            out.push_str(&format!("{int}.{frac}"));
        }
        4 => {
            let (high, low) = (rng.random_range(1u32..1000), rng.random_range(0u32..1000));
            out.push_str(&format!("{high}_{low:03}"));
        }
        _ => out.push_str("1e10"),
    }
}

fn push_string<R: Rng>(rng: &mut R, out: &mut String) {
    if rng.random_bool(0.4) {
        out.push_str("'it\\'s ");
        push_ident(rng, out);
        out.push('\'');
        return;
    }
    out.push('"');
    let parts = rng.random_range(0..=4);
    for _ in 0..parts {
        match rng.random_range(0u32..6) {
            0 => push_var(rng, out),
            1 => out.push_str("{$a->b}"),
            2 => out.push_str("$arr[0]"),
            3 => out.push_str("${name}"),
            4 => out.push_str("\\n\\\""),
            _ => out.push_str(" text "),
        }
    }
    out.push('"');
}

fn push_line_comment<R: Rng>(rng: &mut R, out: &mut String) {
    out.push_str(if rng.random_bool(0.5) { "// " } else { "# " });
    push_ident(rng, out);
    out.push('\n');
}

fn push_block_comment<R: Rng>(rng: &mut R, out: &mut String) {
    out.push_str(if rng.random_bool(0.3) { "/** " } else { "/* " });
    let k = rng.random_range(0..=4);
    for _ in 0..k {
        push_ident(rng, out);
        out.push_str(if rng.random_bool(0.3) { "\n * " } else { " " });
    }
    out.push_str("*/\n");
}

fn push_heredoc<R: Rng>(rng: &mut R, out: &mut String) {
    let nowdoc = rng.random_bool(0.3);
    out.push_str(if nowdoc { "$h = <<<'EOT'\n" } else { "$h = <<<EOT\n" });
    let lines = rng.random_range(0..=3);
    for _ in 0..lines {
        out.push_str("line ");
        if !nowdoc && rng.random_bool(0.5) {
            push_var(rng, out);
        }
        out.push('\n');
    }
    out.push_str("EOT;\n");
}

fn random_alpha<R: Rng>(rng: &mut R) -> char {
    let set = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_";
    set[rng.random_range(0..set.len())] as char
}

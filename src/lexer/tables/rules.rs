// src/lexer/tables/rules.rs
// Ordered PHP scanner rules. Earlier rules win ties between equal-length matches.

use super::pattern::{ByteSet, Pat, alt, any, ci, lit, not, range, seq, set};
use super::tokens::TokenKind;
use crate::lexer::action::{Action, TagGate};
use crate::lexer::state::LexicalState;

use LexicalState as LS;

pub struct Rule {
    pub states: &'static [LexicalState],
    /// Only reachable through the synthetic BOL symbol.
    pub anchored: bool,
    /// Accepts with one trailing CR and/or LF trimmed off.
    pub trim_newline: bool,
    pub pattern: Pat,
    pub action: Action,
}

#[derive(Default)]
struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    fn add(&mut self, states: &'static [LexicalState], pattern: Pat, action: Action) {
        self.rules.push(Rule {
            states,
            anchored: false,
            trim_newline: false,
            pattern,
            action,
        });
    }

    fn anchored(&mut self, states: &'static [LexicalState], pattern: Pat, action: Action) {
        self.rules.push(Rule {
            states,
            anchored: true,
            trim_newline: false,
            pattern,
            action,
        });
    }

    fn trimmed(&mut self, states: &'static [LexicalState], pattern: Pat, action: Action) {
        self.rules.push(Rule {
            states,
            anchored: false,
            trim_newline: true,
            pattern,
            action,
        });
    }

    fn emit(&mut self, states: &'static [LexicalState], pattern: Pat, kind: TokenKind) {
        self.add(states, pattern, Action::Emit(kind));
    }
}

fn label_start_set() -> ByteSet {
    ByteSet::range(b'a', b'z')
        .union(ByteSet::range(b'A', b'Z'))
        .union(ByteSet::of(b"_"))
        .union(ByteSet::range(0x80, 0xff))
}

fn label_start() -> Pat {
    Pat::Bytes(label_start_set())
}

fn label() -> Pat {
    let rest = label_start_set().union(ByteSet::range(b'0', b'9'));
    label_start().then(Pat::Bytes(rest).star())
}

fn newline() -> Pat {
    alt(vec![lit("\r\n"), lit("\n"), lit("\r")])
}

fn whitespace() -> Pat {
    set(b" \n\r\t").plus()
}

fn tabs_and_spaces() -> Pat {
    set(b" \t").star()
}

fn hex_digits() -> ByteSet {
    ByteSet::range(b'0', b'9')
        .union(ByteSet::range(b'a', b'f'))
        .union(ByteSet::range(b'A', b'F'))
}

/// Digits from `set` with single `_` separators between them (7.4+, gated in the action).
fn digits(set: ByteSet) -> Pat {
    let run = || Pat::Bytes(set).plus();
    run().then(lit("_").then(run()).star())
}

fn lnum() -> Pat {
    digits(ByteSet::range(b'0', b'9'))
}

fn dnum() -> Pat {
    alt(vec![
        seq(vec![lnum().opt(), lit("."), lnum()]),
        seq(vec![lnum(), lit("."), lnum().opt()]),
    ])
}

fn onum() -> Pat {
    seq(vec![lit("0"), lit("_").opt(), digits(ByteSet::range(b'0', b'7'))])
}

fn hnum() -> Pat {
    seq(vec![lit("0"), set(b"xX"), digits(hex_digits())])
}

fn bnum() -> Pat {
    seq(vec![lit("0"), set(b"bB"), digits(ByteSet::of(b"01"))])
}

/// Everything but `except` and bytes that may start a label.
fn not_label_start(except: &[u8]) -> Pat {
    Pat::Bytes(ByteSet::of(except).union(label_start_set()).complement())
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("abstract", TokenKind::Abstract),
    ("array", TokenKind::Array),
    ("as", TokenKind::As),
    ("break", TokenKind::Break),
    ("callable", TokenKind::Callable),
    ("case", TokenKind::Case),
    ("catch", TokenKind::Catch),
    ("class", TokenKind::Class),
    ("clone", TokenKind::Clone),
    ("const", TokenKind::Const),
    ("continue", TokenKind::Continue),
    ("declare", TokenKind::Declare),
    ("default", TokenKind::Default),
    ("do", TokenKind::Do),
    ("echo", TokenKind::Echo),
    ("else", TokenKind::Else),
    ("elseif", TokenKind::ElseIf),
    ("empty", TokenKind::Empty),
    ("enddeclare", TokenKind::EndDeclare),
    ("endfor", TokenKind::EndFor),
    ("endforeach", TokenKind::EndForeach),
    ("endif", TokenKind::EndIf),
    ("endswitch", TokenKind::EndSwitch),
    ("endwhile", TokenKind::EndWhile),
    ("eval", TokenKind::Eval),
    ("exit", TokenKind::Exit),
    ("die", TokenKind::Exit),
    ("extends", TokenKind::Extends),
    ("final", TokenKind::Final),
    ("finally", TokenKind::Finally),
    ("fn", TokenKind::Fn),
    ("for", TokenKind::For),
    ("foreach", TokenKind::Foreach),
    ("function", TokenKind::Function),
    ("global", TokenKind::Global),
    ("goto", TokenKind::Goto),
    ("__halt_compiler", TokenKind::HaltCompiler),
    ("if", TokenKind::If),
    ("implements", TokenKind::Implements),
    ("include", TokenKind::Include),
    ("include_once", TokenKind::IncludeOnce),
    ("instanceof", TokenKind::InstanceOf),
    ("insteadof", TokenKind::InsteadOf),
    ("interface", TokenKind::Interface),
    ("isset", TokenKind::Isset),
    ("list", TokenKind::List),
    ("and", TokenKind::LogicalAnd),
    ("or", TokenKind::LogicalOr),
    ("xor", TokenKind::LogicalXor),
    ("match", TokenKind::Match),
    ("namespace", TokenKind::Namespace),
    ("new", TokenKind::New),
    ("print", TokenKind::Print),
    ("private", TokenKind::Private),
    ("protected", TokenKind::Protected),
    ("public", TokenKind::Public),
    ("require", TokenKind::Require),
    ("require_once", TokenKind::RequireOnce),
    ("return", TokenKind::Return),
    ("static", TokenKind::Static),
    ("switch", TokenKind::Switch),
    ("throw", TokenKind::Throw),
    ("trait", TokenKind::Trait),
    ("try", TokenKind::Try),
    ("unset", TokenKind::Unset),
    ("use", TokenKind::Use),
    ("var", TokenKind::Var),
    ("while", TokenKind::While),
    ("yield", TokenKind::Yield),
    ("__class__", TokenKind::ClassC),
    ("__trait__", TokenKind::TraitC),
    ("__function__", TokenKind::FuncC),
    ("__method__", TokenKind::MethodC),
    ("__line__", TokenKind::Line),
    ("__file__", TokenKind::File),
    ("__dir__", TokenKind::Dir),
    ("__namespace__", TokenKind::NsC),
];

const CASTS: &[(&[&str], TokenKind)] = &[
    (&["int", "integer"], TokenKind::IntCast),
    (&["real", "double", "float"], TokenKind::DoubleCast),
    (&["string", "binary"], TokenKind::StringCast),
    (&["array"], TokenKind::ArrayCast),
    (&["object"], TokenKind::ObjectCast),
    (&["bool", "boolean"], TokenKind::BoolCast),
    (&["unset"], TokenKind::UnsetCast),
];

const OPERATORS: &[(&str, TokenKind)] = &[
    ("=>", TokenKind::DoubleArrow),
    ("++", TokenKind::Inc),
    ("--", TokenKind::Dec),
    ("===", TokenKind::IsIdentical),
    ("!==", TokenKind::IsNotIdentical),
    ("==", TokenKind::IsEqual),
    ("!=", TokenKind::IsNotEqual),
    ("<>", TokenKind::IsNotEqual),
    ("<=>", TokenKind::Spaceship),
    ("<=", TokenKind::IsSmallerOrEqual),
    (">=", TokenKind::IsGreaterOrEqual),
    ("+=", TokenKind::PlusEqual),
    ("-=", TokenKind::MinusEqual),
    ("*=", TokenKind::MulEqual),
    ("**", TokenKind::Pow),
    ("**=", TokenKind::PowEqual),
    ("/=", TokenKind::DivEqual),
    (".=", TokenKind::ConcatEqual),
    ("%=", TokenKind::ModEqual),
    ("<<=", TokenKind::SlEqual),
    (">>=", TokenKind::SrEqual),
    ("&=", TokenKind::AndEqual),
    ("|=", TokenKind::OrEqual),
    ("^=", TokenKind::XorEqual),
    ("||", TokenKind::BooleanOr),
    ("&&", TokenKind::BooleanAnd),
    ("<<", TokenKind::Sl),
    (">>", TokenKind::Sr),
    ("::", TokenKind::DoubleColon),
    ("\\", TokenKind::NsSeparator),
    ("...", TokenKind::Ellipsis),
    ("??", TokenKind::Coalesce),
    ("??=", TokenKind::CoalesceEqual),
    (";", TokenKind::Semicolon),
    (":", TokenKind::Colon),
    (",", TokenKind::Comma),
    (".", TokenKind::Dot),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
    ("&", TokenKind::Amp),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("/", TokenKind::Slash),
    ("*", TokenKind::Star),
    ("=", TokenKind::Assign),
    ("%", TokenKind::Percent),
    ("!", TokenKind::Bang),
    ("~", TokenKind::Tilde),
    ("$", TokenKind::Dollar),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("?", TokenKind::Question),
    ("@", TokenKind::At),
];

const INTERPOLATING: &[LexicalState] = &[LS::DoubleQuotes, LS::Backquote, LS::Heredoc];
const HEREDOCS: &[LexicalState] = &[LS::Heredoc, LS::Newdoc];

fn initial_rules(r: &mut RuleSet) {
    const S: &[LexicalState] = &[LS::Initial];

    let after_php = alt(vec![set(b" \t"), newline(), Pat::Eof]);
    r.add(
        S,
        seq(vec![lit("<?"), ci("php"), after_php]),
        Action::OpenTag(TokenKind::OpenTag, TagGate::Always),
    );
    r.add(S, lit("<?="), Action::OpenTag(TokenKind::OpenTagWithEcho, TagGate::Short));
    r.add(S, lit("<%="), Action::OpenTag(TokenKind::OpenTagWithEcho, TagGate::Asp));
    r.add(S, lit("<?"), Action::OpenTag(TokenKind::OpenTag, TagGate::Short));
    r.add(S, lit("<%"), Action::OpenTag(TokenKind::OpenTag, TagGate::Asp));

    let php_name = alt(vec![
        ci("php"),
        seq(vec![lit("\""), ci("php"), lit("\"")]),
        seq(vec![lit("'"), ci("php"), lit("'")]),
    ]);
    r.add(
        S,
        seq(vec![
            ci("<script"),
            whitespace(),
            ci("language"),
            whitespace().opt(),
            lit("="),
            whitespace().opt(),
            php_name,
            whitespace().opt(),
            lit(">"),
        ]),
        Action::OpenTag(TokenKind::OpenTag, TagGate::Always),
    );

    r.add(S, not(b"<").plus(), Action::Extend);
    r.add(S, lit("<"), Action::Extend);
}

fn scripting_rules(r: &mut RuleSet) {
    const S: &[LexicalState] = &[LS::InScripting];

    r.add(S, lit("?>").then(newline().opt()), Action::CloseTag(TagGate::Always));
    r.add(S, lit("%>").then(newline().opt()), Action::CloseTag(TagGate::Asp));
    r.add(
        S,
        seq(vec![ci("</script"), whitespace().opt(), lit(">"), newline().opt()]),
        Action::CloseTag(TagGate::Always),
    );

    r.emit(S, whitespace(), TokenKind::Whitespace);

    r.add(S, lit("#["), Action::AttributeOrComment);
    r.add(S, alt(vec![lit("#"), lit("//")]), Action::EnterComment(LS::OneLineComment));
    r.add(S, lit("/*"), Action::EnterComment(LS::Comment));
    r.add(S, lit("/**").then(set(b" \n\r\t")), Action::EnterComment(LS::DocComment));

    let heredoc_label = alt(vec![
        label(),
        seq(vec![lit("\""), label(), lit("\"")]),
        seq(vec![lit("'"), label(), lit("'")]),
    ]);
    r.add(
        S,
        seq(vec![lit("<<<"), tabs_and_spaces(), heredoc_label, newline()]),
        Action::StartHeredoc,
    );

    r.add(S, lit("\""), Action::OpenQuote(TokenKind::DoubleQuote, LS::DoubleQuotes));
    r.add(S, lit("'"), Action::OpenQuote(TokenKind::SingleQuote, LS::SingleQuotes));
    r.add(S, lit("`"), Action::OpenQuote(TokenKind::Backquote, LS::Backquote));

    r.add(S, lit("{"), Action::OpenBrace);
    r.add(S, lit("}"), Action::CloseBrace);
    r.add(S, lit("->"), Action::ObjectOperator(TokenKind::ObjectOperator));
    r.add(S, lit("?->"), Action::ObjectOperator(TokenKind::NullsafeObjectOperator));

    for (names, kind) in CASTS {
        let name = alt(names.iter().map(|n| ci(n)).collect());
        r.emit(
            S,
            seq(vec![lit("("), tabs_and_spaces(), name, tabs_and_spaces(), lit(")")]),
            *kind,
        );
    }

    r.emit(S, seq(vec![ci("yield"), whitespace(), ci("from")]), TokenKind::YieldFrom);
    for (word, kind) in KEYWORDS {
        r.emit(S, ci(word), *kind);
    }

    r.emit(S, lit("$").then(label()), TokenKind::Variable);
    r.emit(S, label(), TokenKind::String);

    r.emit(S, onum(), TokenKind::OctalNumber);
    r.emit(S, hnum(), TokenKind::HexNumber);
    r.emit(S, bnum(), TokenKind::BinaryNumber);
    r.emit(S, lnum(), TokenKind::LNumber);
    r.emit(S, dnum(), TokenKind::DNumber);
    r.emit(
        S,
        seq(vec![alt(vec![lnum(), dnum()]), set(b"eE"), set(b"+-").opt(), lnum()]),
        TokenKind::DNumber,
    );

    for (op, kind) in OPERATORS {
        r.emit(S, lit(op), *kind);
    }
}

fn string_rules(r: &mut RuleSet) {
    let var = || lit("$").then(label());

    r.add(
        INTERPOLATING,
        var(),
        Action::Interpolate {
            kind: TokenKind::Variable,
            push: None,
            give_back: 0,
        },
    );
    r.add(
        INTERPOLATING,
        seq(vec![var(), lit("->"), label_start()]),
        Action::Interpolate {
            kind: TokenKind::Variable,
            push: Some(LS::LookingForProperty),
            give_back: 3,
        },
    );
    r.add(
        INTERPOLATING,
        var().then(lit("[")),
        Action::Interpolate {
            kind: TokenKind::Variable,
            push: Some(LS::VarOffset),
            give_back: 1,
        },
    );
    r.add(
        INTERPOLATING,
        lit("${"),
        Action::Interpolate {
            kind: TokenKind::DollarOpenCurlyBraces,
            push: Some(LS::LookingForVarname),
            give_back: 0,
        },
    );
    r.add(
        INTERPOLATING,
        lit("{$"),
        Action::Interpolate {
            kind: TokenKind::CurlyOpen,
            push: Some(LS::InScripting),
            give_back: 1,
        },
    );
    r.add(INTERPOLATING, set(b"${"), Action::Extend);
    r.add(INTERPOLATING, lit("\\"), Action::Extend);

    let escaped = || lit("\\").then(any());

    r.add(&[LS::DoubleQuotes], lit("\""), Action::CloseQuote(TokenKind::DoubleQuote));
    r.add(
        &[LS::DoubleQuotes],
        alt(vec![not(b"\"$\\{"), escaped()]).plus(),
        Action::Extend,
    );

    r.add(&[LS::Backquote], lit("`"), Action::CloseQuote(TokenKind::Backquote));
    r.add(
        &[LS::Backquote],
        alt(vec![not(b"`$\\{"), escaped()]).plus(),
        Action::Extend,
    );

    r.add(&[LS::SingleQuotes], lit("'"), Action::CloseQuote(TokenKind::SingleQuote));
    r.add(
        &[LS::SingleQuotes],
        alt(vec![not(b"'\\"), escaped()]).plus(),
        Action::Extend,
    );
    r.add(&[LS::SingleQuotes], lit("\\"), Action::Extend);
}

fn heredoc_rules(r: &mut RuleSet) {
    r.anchored(
        HEREDOCS,
        seq(vec![tabs_and_spaces(), label(), lit(";").opt(), newline().opt()]),
        Action::EndHeredoc,
    );
    r.add(HEREDOCS, newline(), Action::Extend);
    r.add(HEREDOCS, label(), Action::Extend);
    r.add(
        &[LS::Heredoc],
        alt(vec![
            not_label_start(b"$\\{\r\n"),
            lit("\\").then(not(b"\r\n")),
        ])
        .plus(),
        Action::Extend,
    );
    r.add(&[LS::Newdoc], not_label_start(b"\r\n").plus(), Action::Extend);
}

fn lookahead_rules(r: &mut RuleSet) {
    const PROP: &[LexicalState] = &[LS::LookingForProperty];
    r.emit(PROP, whitespace(), TokenKind::Whitespace);
    r.emit(PROP, lit("->"), TokenKind::ObjectOperator);
    r.add(PROP, label(), Action::PropertyName);
    r.add(PROP, any(), Action::PopAndRescan);

    const VARNAME: &[LexicalState] = &[LS::LookingForVarname];
    r.add(VARNAME, label().then(set(b"[}")), Action::VarnameLabel);
    r.add(VARNAME, any(), Action::VarnameRescan);

    const OFFSET: &[LexicalState] = &[LS::VarOffset];
    r.emit(
        OFFSET,
        alt(vec![lit("0"), range(b'1', b'9').then(range(b'0', b'9').star())]),
        TokenKind::NumString,
    );
    r.emit(
        OFFSET,
        alt(vec![
            range(b'0', b'9').plus(),
            seq(vec![lit("0"), set(b"xX"), Pat::Bytes(hex_digits()).plus()]),
            seq(vec![lit("0"), set(b"bB"), set(b"01").plus()]),
        ]),
        TokenKind::NumString,
    );
    r.emit(OFFSET, lit("$").then(label()), TokenKind::Variable);
    r.add(OFFSET, lit("]"), Action::CloseOffset);
    r.emit(OFFSET, lit("["), TokenKind::LBracket);
    r.emit(OFFSET, lit("-"), TokenKind::Minus);
    r.emit(OFFSET, label(), TokenKind::String);
    r.add(OFFSET, any(), Action::PopAndRescan);
}

fn comment_rules(r: &mut RuleSet) {
    const BLOCKS: &[(&[LexicalState], TokenKind)] = &[
        (&[LS::Comment], TokenKind::Comment),
        (&[LS::DocComment], TokenKind::DocComment),
    ];
    for &(state, kind) in BLOCKS {
        r.add(state, not(b"*").plus(), Action::Extend);
        r.add(state, lit("*"), Action::Extend);
        r.add(state, lit("*/"), Action::EndComment(kind));
    }

    const LINE: &[LexicalState] = &[LS::OneLineComment];
    r.add(LINE, not(b"\r\n?%").plus(), Action::Extend);
    r.add(LINE, set(b"?%"), Action::Extend);
    r.add(LINE, lit("?>"), Action::CommentCloseTag(TagGate::Always));
    r.add(LINE, lit("%>"), Action::CommentCloseTag(TagGate::Asp));
    r.trimmed(LINE, newline(), Action::EndComment(TokenKind::Comment));
}

/// The full, ordered PHP rule list.
pub fn php_rules() -> Vec<Rule> {
    let mut r = RuleSet::default();
    initial_rules(&mut r);
    scripting_rules(&mut r);
    string_rules(&mut r);
    heredoc_rules(&mut r);
    lookahead_rules(&mut r);
    comment_rules(&mut r);
    r.rules
}

/// Action table indexed by rule id.
pub fn php_actions() -> Vec<Action> {
    php_rules().into_iter().map(|r| r.action).collect()
}

// src/lexer/tables/tokens.rs

use serde::{Deserialize, Serialize};

use crate::config::PhpVersion;

/// Token kinds produced by the PHP scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum TokenKind {
    End = 0,
    Error = 1,

    // text outside of scripting + tags
    InlineHtml,
    OpenTag,
    OpenTagWithEcho,
    CloseTag,

    Whitespace,
    Comment,
    DocComment,

    // literals; the raw lexeme is returned untouched
    LNumber,
    HexNumber,
    OctalNumber,
    BinaryNumber,
    DNumber,
    String,
    Variable,
    EncapsedAndWhitespace,
    StringVarname,
    NumString,

    // quoting / interpolation
    DoubleQuote,
    SingleQuote,
    Backquote,
    StartHeredoc,
    EndHeredoc,
    DollarOpenCurlyBraces,
    CurlyOpen,

    // keywords
    Abstract,
    Array,
    As,
    Break,
    Callable,
    Case,
    Catch,
    Class,
    Clone,
    Const,
    Continue,
    Declare,
    Default,
    Do,
    Echo,
    Else,
    ElseIf,
    Empty,
    EndDeclare,
    EndFor,
    EndForeach,
    EndIf,
    EndSwitch,
    EndWhile,
    Eval,
    Exit,
    Extends,
    Final,
    Finally,
    Fn,
    For,
    Foreach,
    Function,
    Global,
    Goto,
    HaltCompiler,
    If,
    Implements,
    Include,
    IncludeOnce,
    InstanceOf,
    InsteadOf,
    Interface,
    Isset,
    List,
    LogicalAnd,
    LogicalOr,
    LogicalXor,
    Match,
    Namespace,
    New,
    Print,
    Private,
    Protected,
    Public,
    Require,
    RequireOnce,
    Return,
    Static,
    Switch,
    Throw,
    Trait,
    Try,
    Unset,
    Use,
    Var,
    While,
    Yield,
    YieldFrom,

    // magic constants
    ClassC,
    TraitC,
    FuncC,
    MethodC,
    Line,
    File,
    Dir,
    NsC,

    // casts
    IntCast,
    DoubleCast,
    StringCast,
    ArrayCast,
    ObjectCast,
    BoolCast,
    UnsetCast,

    // multi-char operators
    DoubleArrow,
    Inc,
    Dec,
    IsIdentical,
    IsNotIdentical,
    IsEqual,
    IsNotEqual,
    Spaceship,
    IsSmallerOrEqual,
    IsGreaterOrEqual,
    PlusEqual,
    MinusEqual,
    MulEqual,
    Pow,
    PowEqual,
    DivEqual,
    ConcatEqual,
    ModEqual,
    SlEqual,
    SrEqual,
    AndEqual,
    OrEqual,
    XorEqual,
    BooleanOr,
    BooleanAnd,
    Sl,
    Sr,
    DoubleColon,
    NsSeparator,
    Ellipsis,
    Coalesce,
    CoalesceEqual,
    ObjectOperator,
    NullsafeObjectOperator,
    Attribute,

    // single-char punctuation
    Semicolon,
    Colon,
    Comma,
    Dot,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Pipe,
    Caret,
    Amp,
    Plus,
    Minus,
    Slash,
    Star,
    Assign,
    Percent,
    Bang,
    Tilde,
    Dollar,
    Lt,
    Gt,
    Question,
    At,
}

impl TokenKind {
    /// First language version in which the scanner may produce this kind.
    pub fn min_version(self) -> PhpVersion {
        use TokenKind::*;
        match self {
            Namespace | Goto | Dir | NsC => PhpVersion::Php53,
            Trait | InsteadOf | Callable | TraitC | BinaryNumber => PhpVersion::Php54,
            Finally | Yield => PhpVersion::Php55,
            Pow | PowEqual | Ellipsis => PhpVersion::Php56,
            Spaceship | Coalesce | YieldFrom => PhpVersion::Php70,
            CoalesceEqual | Fn => PhpVersion::Php74,
            Match | NullsafeObjectOperator | Attribute => PhpVersion::Php80,
            _ => PhpVersion::Php52,
        }
    }

    /// What a too-new kind turns into on an older language version.
    ///
    /// `Some(n)` keeps the first `n` matched bytes and returns the rest to
    /// the input; `None` keeps the whole lexeme.
    pub fn downgrade(self) -> Option<(Option<usize>, TokenKind)> {
        use TokenKind::*;
        let d = match self {
            Namespace | Goto | Dir | NsC | Trait | InsteadOf | Callable | TraitC | Finally
            | Yield | Fn | Match => (None, String),
            BinaryNumber => (Some(1), LNumber),
            Pow | PowEqual => (Some(1), Star),
            Ellipsis => (Some(1), Dot),
            Spaceship => (Some(2), IsSmallerOrEqual),
            Coalesce => (Some(1), Question),
            CoalesceEqual => (Some(2), Coalesce),
            YieldFrom => (Some(5), Yield),
            NullsafeObjectOperator => (Some(1), Question),
            _ => return None,
        };
        Some(d)
    }

    /// Kind of a numeric literal written without `_` separators.
    pub fn of_number(text: &[u8]) -> TokenKind {
        match text {
            [b'0', b'x' | b'X', ..] => TokenKind::HexNumber,
            [b'0', b'b' | b'B', ..] => TokenKind::BinaryNumber,
            _ if text.iter().any(|&b| matches!(b, b'.' | b'e' | b'E')) => TokenKind::DNumber,
            [b'0', rest @ ..]
                if !rest.is_empty() && rest.iter().all(|&b| matches!(b, b'0'..=b'7')) =>
            {
                TokenKind::OctalNumber
            }
            _ => TokenKind::LNumber,
        }
    }

    /// Kinds a parser normally skips.
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::DocComment
        )
    }

    #[inline]
    pub fn is_number(self) -> bool {
        matches!(
            self,
            TokenKind::LNumber
                | TokenKind::HexNumber
                | TokenKind::OctalNumber
                | TokenKind::BinaryNumber
                | TokenKind::DNumber
        )
    }
}

//! Logos-based lexer for the Metal Shading Language
//!
//! Fast tokenization using the logos crate. The lexer never fails: every byte
//! of the input lands in exactly one token, and input no rule recognises is
//! collected into `ERROR` tokens (one per maximal invalid run).

use super::errors::{ErrorCode, SyntaxError};
use super::syntax_kind::SyntaxKind;
use crate::base::{Position, Span};
use logos::Logos;
use rowan::{TextRange, TextSize};

/// A token with its kind, text, byte range and line/column span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub range: TextRange,
    pub span: Span,
}

impl Token<'_> {
    pub fn offset(&self) -> TextSize {
        self.range.start()
    }
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    input: &'a str,
    inner: logos::Lexer<'a, LogosToken>,
    base: usize,
    position: Position,
    peeked: Option<(Result<LogosToken, ()>, std::ops::Range<usize>)>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::starting_at(input, 0)
    }

    /// Start lexing at byte `offset`. Offsets inside a UTF-8 sequence are
    /// moved forward to the next character boundary.
    pub fn starting_at(input: &'a str, offset: usize) -> Self {
        let mut base = offset.min(input.len());
        while !input.is_char_boundary(base) {
            base += 1;
        }
        Self {
            input,
            inner: LogosToken::lexer(&input[base..]),
            base,
            position: Position::of_offset(input, base),
            peeked: None,
        }
    }

    fn raw_next(&mut self) -> Option<(Result<LogosToken, ()>, std::ops::Range<usize>)> {
        if let Some(peeked) = self.peeked.take() {
            return Some(peeked);
        }
        let result = self.inner.next()?;
        let mut span = self.inner.span();
        let rest = &self.input[self.base..];
        // Invalid input is consumed in whole characters.
        if result.is_err() && !rest.is_char_boundary(span.end) {
            let mut end = span.end;
            while !rest.is_char_boundary(end) {
                end += 1;
            }
            self.inner.bump(end - span.end);
            span.end = end;
        }
        Some((result, span.start + self.base..span.end + self.base))
    }

    fn make_token(&mut self, kind: SyntaxKind, range: std::ops::Range<usize>) -> Token<'a> {
        let text = &self.input[range.clone()];
        let start = self.position;
        self.position = start.advance(text);
        Token {
            kind,
            text,
            range: TextRange::new(
                TextSize::from(range.start as u32),
                TextSize::from(range.end as u32),
            ),
            span: Span::new(start, self.position),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (result, range) = self.raw_next()?;
        match result {
            Ok(t) => {
                let kind = contextual_kind(
                    t.into(),
                    &self.input[range.clone()],
                    &self.input[range.end..],
                );
                Some(self.make_token(kind, range))
            }
            Err(()) => {
                // Merge the run of invalid input into one token
                let start = range.start;
                let mut end = range.end;
                while let Some((next, next_range)) = self.raw_next() {
                    if next.is_err() && next_range.start == end {
                        end = next_range.end;
                    } else {
                        self.peeked = Some((next, next_range));
                        break;
                    }
                }
                Some(self.make_token(SyntaxKind::ERROR, start..end))
            }
        }
    }
}

/// Builtin templates that are also ordinary words in user code
const TEMPLATE_NAMES: &[&str] = &[
    "array",
    "array_ref",
    "vec",
    "matrix",
    "packed_vec",
    "atomic",
    "imageblock",
];

/// Refine a token kind by the character right after it. Nothing looks
/// further ahead, so a token only has to be relexed when the text touching
/// its end changes.
///
/// - `>` directly followed by `>` is `GT_JOINT`: a shift operator is written
///   `>>` with nothing in between, while `> >` is two separate `>` tokens.
/// - a builtin template name not directly followed by `<` is an identifier,
///   so `float4 vec;` declares a variable.
fn contextual_kind(kind: SyntaxKind, text: &str, rest: &str) -> SyntaxKind {
    match kind {
        SyntaxKind::GT if rest.starts_with('>') => SyntaxKind::GT_JOINT,
        SyntaxKind::PRIMITIVE_TYPE
            if TEMPLATE_NAMES.contains(&text) && !rest.starts_with('<') =>
        {
            SyntaxKind::IDENT
        }
        _ => kind,
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Tokenize from `offset` to the end of the input
pub fn tokenize_from(input: &str, offset: usize) -> Vec<Token<'_>> {
    Lexer::starting_at(input, offset).collect()
}

/// The lexical diagnostic for an `ERROR` token, `None` for any other token
pub fn lex_error(token: &Token<'_>) -> Option<SyntaxError> {
    if token.kind != SyntaxKind::ERROR {
        return None;
    }
    let (code, message) = if token.text.starts_with("/*") {
        (ErrorCode::E0103, "unterminated block comment".to_string())
    } else if token.text.starts_with('"') {
        (ErrorCode::E0102, "unterminated string literal".to_string())
    } else {
        (ErrorCode::E0101, format!("invalid character `{}`", token.text))
    };
    Some(SyntaxError::new(message, token.range, code))
}

/// Lexical diagnostics for a token stream, in source order
pub fn lex_errors<'t, 'a: 't>(tokens: impl IntoIterator<Item = &'t Token<'a>>) -> Vec<SyntaxError> {
    tokens.into_iter().filter_map(lex_error).collect()
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\**")]
    UnterminatedComment,

    #[regex(r"#([^\\\n]|\\[^\n]|\\\n)*")]
    Preprocessor,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+[uU]?")]
    #[regex(r"0[xX][0-9a-fA-F]+[uU]?")]
    Integer,

    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?[fFhH]?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?[fFhH]?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[fFhH]?")]
    Float,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    #[regex(r#""([^"\\\n]|\\.)*"#)]
    UnterminatedString,

    #[regex(r"'([^'\\\n]|\\.)*'")]
    Char,

    // =========================================================================
    // BUILTIN TYPES
    // =========================================================================
    #[regex(r"(bool|char|uchar|short|ushort|int|uint|long|ulong|half|float|bfloat)([2-4](x[2-4])?)?")]
    #[regex(r"packed_(char|uchar|short|ushort|int|uint|half|float|bfloat)[2-4]")]
    #[regex(r"texture(1d|1d_array|2d|2d_array|2d_ms|2d_ms_array|3d|cube|cube_array|_buffer)")]
    #[regex(r"depth(2d|2d_array|2d_ms|2d_ms_array|cube|cube_array)")]
    #[regex(r"atomic_(int|uint|bool|float|ulong)")]
    #[regex(r"simdgroup_(float|half|bfloat)8x8")]
    #[regex(r"(void|sampler|size_t|ptrdiff_t|array|array_ref|vec|matrix|packed_vec|atomic|ray_data|imageblock)")]
    #[regex(r"(instance|primitive)_acceleration_structure")]
    #[regex(r"(visible|intersection)_function_table")]
    PrimitiveType,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION (must come before single-char)
    // =========================================================================
    #[token("[[")]
    LAttr,

    #[token("::")]
    ColonColon,

    #[token("->")]
    Arrow,

    #[token("<<=")]
    ShlEq,

    #[token(">>=")]
    ShrEq,

    #[token("+=")]
    PlusEq,

    #[token("-=")]
    MinusEq,

    #[token("*=")]
    StarEq,

    #[token("/=")]
    SlashEq,

    #[token("%=")]
    PercentEq,

    #[token("&=")]
    AmpEq,

    #[token("|=")]
    PipeEq,

    #[token("^=")]
    CaretEq,

    #[token("==")]
    EqEq,

    #[token("!=")]
    BangEq,

    #[token("<=")]
    LtEq,

    #[token(">=")]
    GtEq,

    #[token("<<")]
    Shl,

    #[token("++")]
    PlusPlus,

    #[token("--")]
    MinusMinus,

    #[token("&&")]
    AmpAmp,

    #[token("||")]
    PipePipe,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("as_type")]
    AsTypeKw,
    #[token("break")]
    BreakKw,
    #[token("case")]
    CaseKw,
    #[token("class")]
    ClassKw,
    #[token("const")]
    ConstKw,
    #[token("constant")]
    ConstantKw,
    #[token("constexpr")]
    ConstexprKw,
    #[token("continue")]
    ContinueKw,
    #[token("default")]
    DefaultKw,
    #[token("device")]
    DeviceKw,
    #[token("do")]
    DoKw,
    #[token("else")]
    ElseKw,
    #[token("enum")]
    EnumKw,
    #[token("extern")]
    ExternKw,
    #[token("false")]
    FalseKw,
    #[token("for")]
    ForKw,
    #[token("fragment")]
    FragmentKw,
    #[token("if")]
    IfKw,
    #[token("inline")]
    InlineKw,
    #[token("kernel")]
    KernelKw,
    #[token("namespace")]
    NamespaceKw,
    #[token("reinterpret_cast")]
    ReinterpretCastKw,
    #[token("return")]
    ReturnKw,
    #[token("sizeof")]
    SizeofKw,
    #[token("static")]
    StaticKw,
    #[token("static_cast")]
    StaticCastKw,
    #[token("struct")]
    StructKw,
    #[token("switch")]
    SwitchKw,
    #[token("thread")]
    ThreadKw,
    #[token("threadgroup")]
    ThreadgroupKw,
    #[token("threadgroup_imageblock")]
    ThreadgroupImageblockKw,
    #[token("true")]
    TrueKw,
    #[token("typedef")]
    TypedefKw,
    #[token("using")]
    UsingKw,
    #[token("vertex")]
    VertexKw,
    #[token("volatile")]
    VolatileKw,
    #[token("while")]
    WhileKw,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        use LogosToken::*;
        match token {
            // Trivia
            Whitespace => SyntaxKind::WHITESPACE,
            LineComment => SyntaxKind::LINE_COMMENT,
            BlockComment => SyntaxKind::BLOCK_COMMENT,
            Preprocessor => SyntaxKind::PREPROCESSOR,
            UnterminatedComment | UnterminatedString => SyntaxKind::ERROR,

            // Literals
            Ident => SyntaxKind::IDENT,
            Integer => SyntaxKind::INT_NUMBER,
            Float => SyntaxKind::FLOAT_NUMBER,
            String => SyntaxKind::STRING,
            Char => SyntaxKind::CHAR,
            PrimitiveType => SyntaxKind::PRIMITIVE_TYPE,

            // Multi-char punctuation
            LAttr => SyntaxKind::L_ATTR,
            ColonColon => SyntaxKind::COLON_COLON,
            Arrow => SyntaxKind::ARROW,
            ShlEq => SyntaxKind::SHL_EQ,
            ShrEq => SyntaxKind::SHR_EQ,
            PlusEq => SyntaxKind::PLUS_EQ,
            MinusEq => SyntaxKind::MINUS_EQ,
            StarEq => SyntaxKind::STAR_EQ,
            SlashEq => SyntaxKind::SLASH_EQ,
            PercentEq => SyntaxKind::PERCENT_EQ,
            AmpEq => SyntaxKind::AMP_EQ,
            PipeEq => SyntaxKind::PIPE_EQ,
            CaretEq => SyntaxKind::CARET_EQ,
            EqEq => SyntaxKind::EQ_EQ,
            BangEq => SyntaxKind::BANG_EQ,
            LtEq => SyntaxKind::LT_EQ,
            GtEq => SyntaxKind::GT_EQ,
            Shl => SyntaxKind::SHL,
            PlusPlus => SyntaxKind::PLUS_PLUS,
            MinusMinus => SyntaxKind::MINUS_MINUS,
            AmpAmp => SyntaxKind::AMP_AMP,
            PipePipe => SyntaxKind::PIPE_PIPE,

            // Single-char punctuation
            LBrace => SyntaxKind::L_BRACE,
            RBrace => SyntaxKind::R_BRACE,
            LBracket => SyntaxKind::L_BRACKET,
            RBracket => SyntaxKind::R_BRACKET,
            LParen => SyntaxKind::L_PAREN,
            RParen => SyntaxKind::R_PAREN,
            Semicolon => SyntaxKind::SEMICOLON,
            Colon => SyntaxKind::COLON,
            Comma => SyntaxKind::COMMA,
            Dot => SyntaxKind::DOT,
            Question => SyntaxKind::QUESTION,
            Eq => SyntaxKind::EQ,
            Lt => SyntaxKind::LT,
            Gt => SyntaxKind::GT,
            Plus => SyntaxKind::PLUS,
            Minus => SyntaxKind::MINUS,
            Star => SyntaxKind::STAR,
            Slash => SyntaxKind::SLASH,
            Percent => SyntaxKind::PERCENT,
            Bang => SyntaxKind::BANG,
            Tilde => SyntaxKind::TILDE,
            Amp => SyntaxKind::AMP,
            Pipe => SyntaxKind::PIPE,
            Caret => SyntaxKind::CARET,

            // Keywords
            AsTypeKw => SyntaxKind::AS_TYPE_KW,
            BreakKw => SyntaxKind::BREAK_KW,
            CaseKw => SyntaxKind::CASE_KW,
            ClassKw => SyntaxKind::CLASS_KW,
            ConstKw => SyntaxKind::CONST_KW,
            ConstantKw => SyntaxKind::CONSTANT_KW,
            ConstexprKw => SyntaxKind::CONSTEXPR_KW,
            ContinueKw => SyntaxKind::CONTINUE_KW,
            DefaultKw => SyntaxKind::DEFAULT_KW,
            DeviceKw => SyntaxKind::DEVICE_KW,
            DoKw => SyntaxKind::DO_KW,
            ElseKw => SyntaxKind::ELSE_KW,
            EnumKw => SyntaxKind::ENUM_KW,
            ExternKw => SyntaxKind::EXTERN_KW,
            FalseKw => SyntaxKind::FALSE_KW,
            ForKw => SyntaxKind::FOR_KW,
            FragmentKw => SyntaxKind::FRAGMENT_KW,
            IfKw => SyntaxKind::IF_KW,
            InlineKw => SyntaxKind::INLINE_KW,
            KernelKw => SyntaxKind::KERNEL_KW,
            NamespaceKw => SyntaxKind::NAMESPACE_KW,
            ReinterpretCastKw => SyntaxKind::REINTERPRET_CAST_KW,
            ReturnKw => SyntaxKind::RETURN_KW,
            SizeofKw => SyntaxKind::SIZEOF_KW,
            StaticKw => SyntaxKind::STATIC_KW,
            StaticCastKw => SyntaxKind::STATIC_CAST_KW,
            StructKw => SyntaxKind::STRUCT_KW,
            SwitchKw => SyntaxKind::SWITCH_KW,
            ThreadKw => SyntaxKind::THREAD_KW,
            ThreadgroupKw => SyntaxKind::THREADGROUP_KW,
            ThreadgroupImageblockKw => SyntaxKind::THREADGROUP_IMAGEBLOCK_KW,
            TrueKw => SyntaxKind::TRUE_KW,
            TypedefKw => SyntaxKind::TYPEDEF_KW,
            UsingKw => SyntaxKind::USING_KW,
            VertexKw => SyntaxKind::VERTEX_KW,
            VolatileKw => SyntaxKind::VOLATILE_KW,
            WhileKw => SyntaxKind::WHILE_KW,
        }
    }
}

use crate::diagnostic::Span;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals and identifiers
    Integer,
    Float,
    String,
    Null,
    Identifier,

    // Punctuation
    OpenParen,
    CloseParen,
    OpenSquare,
    CloseSquare,
    Comma,
    Dot,
    Colon,
    Equals,

    // Symbolic operators
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Greater,
    Less,
    Bang,
    EqualEqual,
    NotEqual,
    GreaterEqual,
    LessEqual,

    // Word operators
    Mod,
    Div,
    And,
    Or,
    Not,

    // Declarations
    Let,
    Array,
    Function,
    EndFunction,
    Procedure,
    EndProcedure,
    Return,

    // Conditionals
    If,
    Then,
    ElseIf,
    Else,
    EndIf,
    Switch,
    Case,
    Default,
    EndSwitch,

    // Loops
    For,
    To,
    Next,
    While,
    EndWhile,
    Do,
    Until,

    // Classes
    Class,
    EndClass,
    Public,
    Private,
    New,
    Inherits,

    Eof,
}

impl TokenKind {
    /// Looks up a reserved word. Operators spelled as words (`MOD`, `AND`, ...)
    /// are case sensitive like every other keyword.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "let" => TokenKind::Let,
            "array" => TokenKind::Array,
            "null" => TokenKind::Null,
            "MOD" => TokenKind::Mod,
            "DIV" => TokenKind::Div,
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "NOT" => TokenKind::Not,
            "function" => TokenKind::Function,
            "endfunction" => TokenKind::EndFunction,
            "procedure" => TokenKind::Procedure,
            "endprocedure" => TokenKind::EndProcedure,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "elseif" => TokenKind::ElseIf,
            "else" => TokenKind::Else,
            "endif" => TokenKind::EndIf,
            "switch" => TokenKind::Switch,
            "case" => TokenKind::Case,
            "default" => TokenKind::Default,
            "endswitch" => TokenKind::EndSwitch,
            "for" => TokenKind::For,
            "to" => TokenKind::To,
            "next" => TokenKind::Next,
            "while" => TokenKind::While,
            "endwhile" => TokenKind::EndWhile,
            "do" => TokenKind::Do,
            "until" => TokenKind::Until,
            "class" => TokenKind::Class,
            "endclass" => TokenKind::EndClass,
            "public" => TokenKind::Public,
            "private" => TokenKind::Private,
            "new" => TokenKind::New,
            "inherits" => TokenKind::Inherits,
            _ => return None,
        };
        Some(kind)
    }

    pub fn symbol(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "(" => TokenKind::OpenParen,
            ")" => TokenKind::CloseParen,
            "[" => TokenKind::OpenSquare,
            "]" => TokenKind::CloseSquare,
            "," => TokenKind::Comma,
            "." => TokenKind::Dot,
            ":" => TokenKind::Colon,
            "=" => TokenKind::Equals,
            "+" => TokenKind::Plus,
            "-" => TokenKind::Minus,
            "*" => TokenKind::Star,
            "/" => TokenKind::Slash,
            "^" => TokenKind::Caret,
            ">" => TokenKind::Greater,
            "<" => TokenKind::Less,
            "!" => TokenKind::Bang,
            "==" => TokenKind::EqualEqual,
            "!=" => TokenKind::NotEqual,
            ">=" => TokenKind::GreaterEqual,
            "<=" => TokenKind::LessEqual,
            _ => return None,
        };
        Some(kind)
    }

    /// Human readable description used in "expected ..." messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Integer => "integer literal",
            TokenKind::Float => "float literal",
            TokenKind::String => "string literal",
            TokenKind::Null => "`null`",
            TokenKind::Identifier => "identifier",
            TokenKind::OpenParen => "`(`",
            TokenKind::CloseParen => "`)`",
            TokenKind::OpenSquare => "`[`",
            TokenKind::CloseSquare => "`]`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::Colon => "`:`",
            TokenKind::Equals => "`=`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Caret => "`^`",
            TokenKind::Greater => "`>`",
            TokenKind::Less => "`<`",
            TokenKind::Bang => "`!`",
            TokenKind::EqualEqual => "`==`",
            TokenKind::NotEqual => "`!=`",
            TokenKind::GreaterEqual => "`>=`",
            TokenKind::LessEqual => "`<=`",
            TokenKind::Mod => "`MOD`",
            TokenKind::Div => "`DIV`",
            TokenKind::And => "`AND`",
            TokenKind::Or => "`OR`",
            TokenKind::Not => "`NOT`",
            TokenKind::Let => "`let`",
            TokenKind::Array => "`array`",
            TokenKind::Function => "`function`",
            TokenKind::EndFunction => "`endfunction`",
            TokenKind::Procedure => "`procedure`",
            TokenKind::EndProcedure => "`endprocedure`",
            TokenKind::Return => "`return`",
            TokenKind::If => "`if`",
            TokenKind::Then => "`then`",
            TokenKind::ElseIf => "`elseif`",
            TokenKind::Else => "`else`",
            TokenKind::EndIf => "`endif`",
            TokenKind::Switch => "`switch`",
            TokenKind::Case => "`case`",
            TokenKind::Default => "`default`",
            TokenKind::EndSwitch => "`endswitch`",
            TokenKind::For => "`for`",
            TokenKind::To => "`to`",
            TokenKind::Next => "`next`",
            TokenKind::While => "`while`",
            TokenKind::EndWhile => "`endwhile`",
            TokenKind::Do => "`do`",
            TokenKind::Until => "`until`",
            TokenKind::Class => "`class`",
            TokenKind::EndClass => "`endclass`",
            TokenKind::Public => "`public`",
            TokenKind::Private => "`private`",
            TokenKind::New => "`new`",
            TokenKind::Inherits => "`inherits`",
            TokenKind::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A lexed token. `value` is the token text (string literals without their
/// quotes, numbers without digit separators); `line`/`column` are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub value: String,
    pub kind: TokenKind,
    pub span: Span,
    pub line: usize,
    pub column: usize,
}

use chumsky::prelude::*;

use crate::diagnostic::Span;
use crate::interpreter::error::SyntaxError;
use crate::token::{Token, TokenKind};

/// Raw pieces of source text recognised by the combinator pass. Keyword
/// classification and number validation happen afterwards in [`tokenize`],
/// since both need context the combinators do not carry.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Lexeme<'a> {
    Word(&'a str),
    Number(&'a str),
    Text(&'a str),
    Symbol(&'a str),
}

fn lexemes<'a>() -> impl Parser<'a, &'a str, Vec<(Lexeme<'a>, SimpleSpan)>, extra::Err<Simple<'a, char>>> {
    let number = any()
        .filter(|c: &char| c.is_ascii_digit())
        .then(
            any()
                .filter(|c: &char| c.is_ascii_digit() || *c == '.' || *c == '_')
                .repeated(),
        )
        .to_slice()
        .map(Lexeme::Number);

    // No escape sequences: everything up to the next quote is literal text.
    let text = just('"')
        .ignore_then(none_of("\"").repeated().to_slice())
        .then_ignore(just('"'))
        .map(Lexeme::Text);

    let word = any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
                .repeated(),
        )
        .to_slice()
        .map(Lexeme::Word);

    let symbol = choice((
        just("=="),
        just("!="),
        just(">="),
        just("<="),
        just("("),
        just(")"),
        just("["),
        just("]"),
        just(","),
        just("."),
        just(":"),
        just("="),
        just("+"),
        just("-"),
        just("*"),
        just("/"),
        just("^"),
        just(">"),
        just("<"),
        just("!"),
    ))
    .to_slice()
    .map(Lexeme::Symbol);

    let token = choice((number, text, word, symbol));

    let comment = just("//").then(none_of("\n").repeated()).ignored();
    let blank = one_of(" \t\r\n").ignored();
    let skip = comment.or(blank).repeated();

    skip.clone()
        .ignore_then(
            token
                .map_with(|lexeme, e| (lexeme, e.span()))
                .then_ignore(skip)
                .repeated()
                .collect(),
        )
        .then_ignore(end())
}

/// Tracks the 1-based line and column while walking forward through the source.
struct Cursor<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, offset: 0, line: 1, column: 1 }
    }

    fn advance_to(&mut self, target: usize) -> (usize, usize) {
        for ch in self.source[self.offset..target].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset = target;
        (self.line, self.column)
    }
}

/// Converts source text into tokens, always terminated by an `Eof` token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let lexed = lexemes()
        .parse(source)
        .into_result()
        .map_err(|errors| lex_error(source, &errors))?;

    let mut cursor = Cursor::new(source);
    let mut tokens: Vec<Token> = Vec::with_capacity(lexed.len() + 1);

    for (lexeme, simple_span) in lexed {
        let span = Span::new(simple_span.start, simple_span.end);
        let (line, column) = cursor.advance_to(span.start);

        let (kind, value) = match lexeme {
            Lexeme::Word(word) => {
                // Names after a member-access dot are never keywords: `file.close`, `super.new`.
                let after_dot = matches!(tokens.last(), Some(Token { kind: TokenKind::Dot, .. }));
                let kind = match TokenKind::keyword(word) {
                    Some(keyword) if !after_dot => keyword,
                    _ => TokenKind::Identifier,
                };
                (kind, word.to_string())
            }
            Lexeme::Number(digits) => {
                if digits.matches('.').count() > 1 {
                    return Err(SyntaxError::new(
                        format!("multiple decimal points in number literal `{}`", digits),
                        span,
                        line,
                        column,
                    ));
                }
                let kind = if digits.contains('.') { TokenKind::Float } else { TokenKind::Integer };
                (kind, digits.replace('_', ""))
            }
            Lexeme::Text(text) => (TokenKind::String, text.to_string()),
            Lexeme::Symbol(symbol) => {
                let kind = TokenKind::symbol(symbol).ok_or_else(|| {
                    SyntaxError::new(format!("unrecognised symbol `{}`", symbol), span, line, column)
                })?;
                (kind, symbol.to_string())
            }
        };

        tokens.push(Token { value, kind, span, line, column });
    }

    let (line, column) = cursor.advance_to(source.len());
    tokens.push(Token {
        value: "EndOfFile".to_string(),
        kind: TokenKind::Eof,
        span: Span::new(source.len(), source.len()),
        line,
        column,
    });

    Ok(tokens)
}

/// Finds the first offset the lexeme grammar cannot start a token at. Chumsky's
/// error position points at wherever backtracking gave up, which is usually the
/// start of the enclosing repetition rather than the offending character.
fn first_unlexable(source: &str) -> Option<(usize, char)> {
    let mut chars = source.char_indices().peekable();
    while let Some((offset, ch)) = chars.next() {
        match ch {
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                while chars.next_if(|(_, c)| *c != '\n').is_some() {}
            }
            '"' => {
                if !chars.any(|(_, c)| c == '"') {
                    return Some((offset, ch));
                }
            }
            ' ' | '\t' | '\r' | '\n' => {}
            c if c.is_ascii_alphanumeric() || c == '_' || c == '.' => {}
            c if "()[],:=+-*/^><!".contains(c) => {}
            _ => return Some((offset, ch)),
        }
    }
    None
}

fn lex_error(source: &str, errors: &[Simple<'_, char>]) -> SyntaxError {
    let (start, message) = match first_unlexable(source) {
        Some((offset, '"')) => (offset, "unterminated string literal".to_string()),
        Some((offset, ch)) => (offset, format!("unrecognised character ({}): {}", ch as u32, ch)),
        None => {
            let offset = errors.first().map(|error| error.span().start).unwrap_or(source.len());
            (offset.min(source.len()), "unexpected input".to_string())
        }
    };

    let width = source[start..].chars().next().map_or(1, char::len_utf8);
    let span = Span::new(start, start + width);
    let (line, column) = Cursor::new(source).advance_to(start);
    SyntaxError::new(message, span, line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("Lexer failed")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    fn values(source: &str) -> Vec<String> {
        tokenize(source)
            .expect("Lexer failed")
            .into_iter()
            .map(|token| token.value)
            .collect()
    }

    #[test]
    fn test_empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("   \n\t "), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("let array function endfunction while endwhile"),
            vec![
                TokenKind::Let,
                TokenKind::Array,
                TokenKind::Function,
                TokenKind::EndFunction,
                TokenKind::While,
                TokenKind::EndWhile,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_word_operators_are_case_sensitive() {
        assert_eq!(
            kinds("MOD DIV AND OR NOT mod"),
            vec![
                TokenKind::Mod,
                TokenKind::Div,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keyword_after_dot_is_identifier() {
        assert_eq!(
            kinds("super.new(x)"),
            vec![
                TokenKind::Identifier,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::OpenParen,
                TokenKind::Identifier,
                TokenKind::CloseParen,
                TokenKind::Eof,
            ]
        );
        assert_eq!(kinds("new")[0], TokenKind::New);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("42 3.5"), vec![TokenKind::Integer, TokenKind::Float, TokenKind::Eof]);
        assert_eq!(values("1_000_000 2.5")[..2], ["1000000".to_string(), "2.5".to_string()]);
    }

    #[test]
    fn test_multiple_decimal_points_fail() {
        let error = tokenize("let x = 1.2.3").unwrap_err();
        assert!(error.message.contains("multiple decimal points"));
        assert_eq!((error.line, error.column), (1, 9));
    }

    #[test]
    fn test_strings_have_no_escapes() {
        let tokens = tokenize(r#""hello \n world""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].value, r"hello \n world");
    }

    #[test]
    fn test_unterminated_string_fails() {
        let error = tokenize("print(\"oops)").unwrap_err();
        assert!(error.message.contains("unterminated string"));
        assert_eq!(error.column, 7);
    }

    #[test]
    fn test_two_character_operators_are_greedy() {
        assert_eq!(
            kinds("== != >= <= = > < !"),
            vec![
                TokenKind::EqualEqual,
                TokenKind::NotEqual,
                TokenKind::GreaterEqual,
                TokenKind::LessEqual,
                TokenKind::Equals,
                TokenKind::Greater,
                TokenKind::Less,
                TokenKind::Bang,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("x = 1 // set x\n// whole line\ny"),
            vec![
                TokenKind::Identifier,
                TokenKind::Equals,
                TokenKind::Integer,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
        assert_eq!(kinds("// only a comment"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_identifiers_may_contain_dashes() {
        assert_eq!(values("first-name")[0], "first-name");
        assert_eq!(
            kinds("a - b"),
            vec![TokenKind::Identifier, TokenKind::Minus, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("let x = 1\n  print(x)").unwrap();
        let print = tokens.iter().find(|t| t.value == "print").unwrap();
        assert_eq!((print.line, print.column), (2, 3));
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_unrecognised_character_reports_code() {
        let error = tokenize("x = 5 $").unwrap_err();
        assert!(error.message.contains("(36)"), "{}", error.message);
        assert_eq!(error.column, 7);
    }

    #[test]
    fn test_bad_character_after_a_string_is_located() {
        let error = tokenize("print(\"hi\") ~").unwrap_err();
        assert_eq!(error.message, "unrecognised character (126): ~");
        assert_eq!((error.line, error.column), (1, 13));

        let error = tokenize("a @ b").unwrap_err();
        assert!(error.message.contains("(64)"), "{}", error.message);
        assert_eq!(error.column, 3);

        assert!(tokenize("$").unwrap_err().message.contains("(36)"));
    }

    #[test]
    fn test_quotes_inside_comments_do_not_open_strings() {
        let error = tokenize("x = 1 // say \"hi\n#").unwrap_err();
        assert!(error.message.contains("(35)"), "{}", error.message);
        assert_eq!((error.line, error.column), (2, 1));
    }
}

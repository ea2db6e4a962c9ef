use crate::diagnostics::{Diagnostic, DiagnosticKind, SourceSpan};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Atom,
    Int,
    Float,
    Str,
    Hash,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: SourceSpan,
}

/// Characters that can appear in an atom. Everything that is not
/// whitespace or reader punctuation qualifies, so `:KEY`, `+`, and `t`
/// are all atoms.
fn is_atom_char(ch: char) -> bool {
    !ch.is_whitespace() && !matches!(ch, '(' | ')' | '[' | ']' | '"' | '#' | ';')
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current: usize,
    peeked: Option<(usize, char)>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices(),
            current: 0,
            peeked: None,
        }
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let next = if let Some(pair) = self.peeked.take() {
            Some(pair)
        } else {
            self.chars.next()
        };
        if let Some((idx, ch)) = next {
            self.current = idx + ch.len_utf8();
        }
        next
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        if self.peeked.is_none() {
            self.peeked = self.chars.next();
        }
        self.peeked
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while let Some((_, ch)) = self.peek() {
                if ch.is_whitespace() {
                    self.bump();
                } else {
                    break;
                }
            }
            if let Some((_, ';')) = self.peek() {
                while let Some((_, ch)) = self.bump() {
                    if ch == '\n' {
                        break;
                    }
                }
                continue;
            }
            break;
        }
    }

    fn simple_token(&mut self, start: usize, kind: TokenKind) -> Token {
        let end = self.current;
        Token {
            kind,
            lexeme: self.source[start..end].to_string(),
            span: SourceSpan { start, end },
        }
    }

    /// Lexes a maximal run of atom characters and classifies it as a
    /// number or an atom. A run that starts like a number but is not one
    /// (`12ab`, `1.2.3`) is malformed rather than an atom.
    fn word(&mut self, start: usize) -> Result<Token, Diagnostic> {
        let mut end = self.current;
        while let Some((idx, ch)) = self.peek() {
            if is_atom_char(ch) {
                self.bump();
                end = idx + ch.len_utf8();
            } else {
                break;
            }
        }
        let lexeme = self.source[start..end].to_string();
        let span = SourceSpan { start, end };
        match classify_number(&lexeme) {
            NumberShape::Int => Ok(Token {
                kind: TokenKind::Int,
                lexeme,
                span,
            }),
            NumberShape::Float => Ok(Token {
                kind: TokenKind::Float,
                lexeme,
                span,
            }),
            NumberShape::Malformed => Err(Diagnostic::new(
                DiagnosticKind::Syntax,
                format!("malformed number `{lexeme}`"),
            )
            .with_span(span)),
            NumberShape::NotANumber => Ok(Token {
                kind: TokenKind::Atom,
                lexeme,
                span,
            }),
        }
    }

    /// String contents are taken verbatim up to the closing quote; there
    /// are no escape sequences in Qb Script.
    fn string_literal(&mut self, start: usize) -> Result<Token, Diagnostic> {
        let mut value = String::new();
        while let Some((idx, ch)) = self.bump() {
            if ch == '"' {
                return Ok(Token {
                    kind: TokenKind::Str,
                    lexeme: value,
                    span: SourceSpan {
                        start,
                        end: idx + 1,
                    },
                });
            }
            value.push(ch);
        }
        Err(
            Diagnostic::new(DiagnosticKind::Syntax, "unterminated string literal").with_span(
                SourceSpan {
                    start,
                    end: self.current,
                },
            ),
        )
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, Diagnostic> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            let (start, ch) = match self.bump() {
                Some(pair) => pair,
                None => {
                    tokens.push(Token {
                        kind: TokenKind::Eof,
                        lexeme: String::new(),
                        span: SourceSpan {
                            start: self.current,
                            end: self.current,
                        },
                    });
                    break;
                }
            };

            let token = match ch {
                '(' => self.simple_token(start, TokenKind::LParen),
                ')' => self.simple_token(start, TokenKind::RParen),
                '[' => self.simple_token(start, TokenKind::LBracket),
                ']' => self.simple_token(start, TokenKind::RBracket),
                '#' => self.simple_token(start, TokenKind::Hash),
                '"' => self.string_literal(start)?,
                _ => self.word(start)?,
            };
            tokens.push(token);
        }
        Ok(tokens)
    }
}

enum NumberShape {
    Int,
    Float,
    Malformed,
    NotANumber,
}

/// A number is an optional sign, digits, and an optional fractional part.
/// Anything that does not begin with a digit (after the sign) is an atom.
fn classify_number(lexeme: &str) -> NumberShape {
    let digits = lexeme.strip_prefix(['+', '-']).unwrap_or(lexeme);
    if !digits.starts_with(|ch: char| ch.is_ascii_digit()) {
        return NumberShape::NotANumber;
    }
    let (integral, fraction) = match digits.split_once('.') {
        Some((integral, fraction)) => (integral, Some(fraction)),
        None => (digits, None),
    };
    if !integral.chars().all(|ch| ch.is_ascii_digit()) {
        return NumberShape::Malformed;
    }
    match fraction {
        Some(fraction) if !fraction.is_empty() && fraction.chars().all(|ch| ch.is_ascii_digit()) => {
            NumberShape::Float
        }
        Some(_) => NumberShape::Malformed,
        None => NumberShape::Int,
    }
}

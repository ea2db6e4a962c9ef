use crate::{
    diagnostics::{Diagnostic, DiagnosticKind, QbError, SourceSpan},
    lexer::{Lexer, Token, TokenKind},
    value::Value,
};

/// Reads source text into the ordered sequence of top-level expression
/// trees. The trees are ordinary [`Value`]s: atoms, numbers, strings,
/// literal lists, and call forms, with `#expr` desugared to `(quote expr)`.
pub fn parse(source: &str) -> Result<Vec<Value>, QbError> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(tokens);
    let mut forms = Vec::new();
    while !parser.check(TokenKind::Eof) {
        forms.push(parser.parse_expr()?);
    }
    Ok(forms)
}

struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.current].clone();
        if !matches!(token.kind, TokenKind::Eof) {
            self.current += 1;
        }
        token
    }

    fn parse_expr(&mut self) -> Result<Value, Diagnostic> {
        let token = self.advance();
        match token.kind {
            TokenKind::Atom => Ok(Value::atom(token.lexeme)),
            TokenKind::Int => token.lexeme.parse::<i64>().map(Value::int).map_err(|_| {
                Diagnostic::new(
                    DiagnosticKind::Syntax,
                    format!("integer literal `{}` out of range", token.lexeme),
                )
                .with_span(token.span)
            }),
            TokenKind::Float => token.lexeme.parse::<f64>().map(Value::float).map_err(|_| {
                Diagnostic::new(
                    DiagnosticKind::Syntax,
                    format!("malformed number `{}`", token.lexeme),
                )
                .with_span(token.span)
            }),
            TokenKind::Str => Ok(Value::string(token.lexeme)),
            TokenKind::Hash => self.parse_quote(token.span),
            TokenKind::LParen => self.parse_call(token.span),
            TokenKind::LBracket => self.parse_list(token.span),
            TokenKind::RParen | TokenKind::RBracket => Err(Diagnostic::new(
                DiagnosticKind::Syntax,
                format!("unexpected `{}`", token.lexeme),
            )
            .with_span(token.span)),
            TokenKind::Eof => Err(Diagnostic::new(
                DiagnosticKind::Syntax,
                "unexpected end of input",
            )
            .with_span(token.span)),
        }
    }

    /// `#` binds to exactly one following expression.
    fn parse_quote(&mut self, span: SourceSpan) -> Result<Value, Diagnostic> {
        if self.check(TokenKind::Eof) {
            return Err(Diagnostic::new(
                DiagnosticKind::Syntax,
                "`#` must be followed by an expression",
            )
            .with_span(span));
        }
        let quoted = self.parse_expr()?;
        Ok(Value::call(vec![Value::atom("quote"), quoted]))
    }

    fn parse_call(&mut self, open: SourceSpan) -> Result<Value, Diagnostic> {
        let (items, close) = self.parse_seq(TokenKind::RParen, open)?;
        if items.is_empty() {
            return Err(Diagnostic::new(
                DiagnosticKind::Syntax,
                "empty call has no operator",
            )
            .with_span(SourceSpan::new(open.start, close.end)));
        }
        Ok(Value::call(items))
    }

    fn parse_list(&mut self, open: SourceSpan) -> Result<Value, Diagnostic> {
        let (items, _) = self.parse_seq(TokenKind::RBracket, open)?;
        Ok(Value::list(items))
    }

    fn parse_seq(
        &mut self,
        terminator: TokenKind,
        open: SourceSpan,
    ) -> Result<(Vec<Value>, SourceSpan), Diagnostic> {
        let mut items = Vec::new();
        loop {
            if self.check(TokenKind::Eof) {
                return Err(Diagnostic::new(
                    DiagnosticKind::Syntax,
                    format!(
                        "missing closing `{}`",
                        if terminator == TokenKind::RParen { ")" } else { "]" }
                    ),
                )
                .with_span(open));
            }
            if self.check(terminator.clone()) {
                let close = self.advance();
                return Ok((items, close.span));
            }
            items.push(self.parse_expr()?);
        }
    }
}

//! Recursive-descent parser for Groovy build scripts.
//!
//! Covers the shapes build scripts are made of: command expressions and
//! command chains (`compile 'a:b:1.+' lock '1.0'`), parenthesized calls
//! with trailing closures, named arguments, property paths, assignments,
//! list/map literals and closures. Other operators are parsed into
//! [`Expr::Other`] nodes the walker descends through.
//!
//! The parser is lenient about statement contents but strict about
//! structure: unbalanced delimiters and unterminated literals fail.

use crate::ast::{
    Assignment, Block, Call, Compound, Expr, Ident, ListLit, LockClause, LockValue, MapEntry,
    MapLit, NumberLit, Property, Span, Statement,
};
use crate::lexer::{SyntaxError, Token, TokenKind, tokenize};

type PResult<T> = Result<T, SyntaxError>;

/// Parses a whole script into its top-level block.
pub fn parse_script(source: &str) -> PResult<Block> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        src: source,
        tokens,
        pos: 0,
    };
    let statements = parser.statements(None)?;
    Ok(Block {
        span: Span::new(0, source.len()),
        params: Vec::new(),
        statements,
    })
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

enum Arg {
    Positional(Expr),
    Named(MapEntry),
}

impl Parser<'_> {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn prev_end(&self) -> usize {
        self.tokens[self.pos.saturating_sub(1)].span.end
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), TokenKind::Newline) {
            self.bump();
        }
    }

    /// Index of the next token that is not a line break.
    fn next_significant(&self) -> usize {
        let mut i = self.pos;
        while matches!(self.tokens[i].kind, TokenKind::Newline) && i < self.tokens.len() - 1 {
            i += 1;
        }
        i
    }

    fn unexpected(&self, context: &str) -> SyntaxError {
        let what = match self.peek() {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Newline => "line break".to_string(),
            _ => format!("'{}'", self.span().slice(self.src)),
        };
        SyntaxError::new(self.span().start, format!("unexpected {what} {context}"))
    }

    /// Statements up to the closing brace (`open` is the brace span) or EOF.
    fn statements(&mut self, open: Option<Span>) -> PResult<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            match self.peek() {
                TokenKind::Newline
                | TokenKind::Semi
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::Arrow
                | TokenKind::Assign => {
                    self.bump();
                }
                TokenKind::RBrace => {
                    if open.is_some() {
                        return Ok(statements);
                    }
                    return Err(SyntaxError::new(self.span().start, "unexpected '}'"));
                }
                TokenKind::Eof => {
                    if let Some(open) = open {
                        return Err(SyntaxError::new(open.start, "unclosed '{'"));
                    }
                    return Ok(statements);
                }
                _ => statements.push(self.statement()?),
            }
        }
    }

    fn statement(&mut self) -> PResult<Statement> {
        let start = self.span().start;

        // `def x = ...` / `String x = ...`
        let declares = matches!(self.peek(), TokenKind::Ident(_))
            && matches!(self.peek_at(2), TokenKind::Assign);
        if declares {
            if let TokenKind::Ident(name) = self.peek_at(1).clone() {
                self.bump();
                self.bump();
                self.bump();
                self.skip_newlines();
                let value = self.expression()?;
                return Ok(Statement::Assign(Assignment {
                    span: Span::new(start, value.span().end),
                    target: vec![name],
                    value,
                }));
            }
        }

        let expr = self.command_expression()?;
        if matches!(self.peek(), TokenKind::Assign) {
            self.bump();
            self.skip_newlines();
            let value = self.expression()?;
            let span = Span::new(start, value.span().end);
            if let Some(path) = expr.path() {
                return Ok(Statement::Assign(Assignment {
                    span,
                    target: path.into_iter().map(String::from).collect(),
                    value,
                }));
            }
            return Ok(Statement::Expr(Expr::Other(Compound {
                span,
                children: vec![expr, value],
            })));
        }
        Ok(Statement::Expr(expr))
    }

    /// An expression that may be a Groovy command expression followed by
    /// a command chain and an optional trailing lock clause.
    fn command_expression(&mut self) -> PResult<Expr> {
        let mut expr = self.expression()?;

        if expr.path().is_some() && self.starts_command_arg() {
            let args = self.command_args()?;
            expr = make_call(expr, args, None);
        }

        loop {
            let TokenKind::Ident(name) = self.peek().clone() else {
                break;
            };
            if name == "lock" && self.lock_value_follows() {
                let keyword = self.bump().span;
                let value_tok = self.bump();
                let value = match value_tok.kind {
                    TokenKind::Str(lit) => LockValue::Str(lit),
                    TokenKind::Number(text) => LockValue::Number(NumberLit {
                        span: value_tok.span,
                        text,
                    }),
                    _ => break,
                };
                let clause = LockClause {
                    span: keyword.to(value.span()),
                    value,
                };
                if let Expr::Call(call) = &mut expr {
                    call.lock = Some(clause);
                }
                break;
            }

            let method_span = self.span();
            match self.peek_at(1) {
                TokenKind::LParen | TokenKind::LBrace => {
                    self.bump();
                    let receiver = expr;
                    let mut call = Call {
                        span: receiver.span().to(method_span),
                        receiver: Some(Box::new(receiver)),
                        method: name,
                        method_span,
                        args: Vec::new(),
                        closure: None,
                        lock: None,
                    };
                    if matches!(self.peek(), TokenKind::LParen) {
                        call.args = split_args(self.paren_args()?);
                        call.span.end = self.prev_end();
                    }
                    if matches!(self.peek(), TokenKind::LBrace) {
                        let block = self.closure()?;
                        call.span.end = block.span.end;
                        call.closure = Some(block);
                    }
                    expr = Expr::Call(call);
                }
                _ => {
                    let saved = self.pos;
                    self.bump();
                    if !self.starts_command_arg() {
                        self.pos = saved;
                        break;
                    }
                    let args = self.command_args()?;
                    let method = Expr::Property(Property {
                        span: expr.span().to(method_span),
                        target: Box::new(expr),
                        name,
                    });
                    expr = make_call(method, args, Some(method_span));
                }
            }
        }

        Ok(expr)
    }

    fn lock_value_follows(&self) -> bool {
        matches!(self.peek_at(1), TokenKind::Str(_) | TokenKind::Number(_))
    }

    fn starts_command_arg(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Str(_) | TokenKind::Number(_) | TokenKind::Ident(_) | TokenKind::LBracket
        )
    }

    /// Unparenthesized arguments: `a, b, key: value` until end of line.
    fn command_args(&mut self) -> PResult<Vec<Arg>> {
        let mut args = vec![self.argument()?];
        while matches!(self.peek(), TokenKind::Comma) {
            self.bump();
            self.skip_newlines();
            args.push(self.argument()?);
        }
        Ok(args)
    }

    fn paren_args(&mut self) -> PResult<Vec<Arg>> {
        let open = self.bump().span;
        let mut args = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek() {
                TokenKind::RParen => {
                    self.bump();
                    return Ok(args);
                }
                TokenKind::Eof => return Err(SyntaxError::new(open.start, "unclosed '('")),
                TokenKind::RBrace | TokenKind::RBracket => {
                    return Err(self.unexpected("inside '(...)'"));
                }
                // Separators, and the pieces of `for (;;)`, `catch (T e)` and friends.
                TokenKind::Comma
                | TokenKind::Semi
                | TokenKind::Colon
                | TokenKind::Assign
                | TokenKind::Arrow => {
                    self.bump();
                }
                _ => args.push(self.argument()?),
            }
        }
    }

    fn argument(&mut self) -> PResult<Arg> {
        let is_named = matches!(
            self.peek(),
            TokenKind::Ident(_) | TokenKind::Str(_) | TokenKind::Number(_)
        ) && matches!(self.peek_at(1), TokenKind::Colon);
        if !is_named {
            return Ok(Arg::Positional(self.expression()?));
        }

        let key_tok = self.bump();
        let key = match key_tok.kind {
            TokenKind::Str(lit) => lit.raw(),
            TokenKind::Ident(name) | TokenKind::Number(name) => name,
            _ => String::new(),
        };
        self.bump();
        self.skip_newlines();
        let value = self.expression()?;
        Ok(Arg::Named(MapEntry {
            span: key_tok.span.to(value.span()),
            key,
            key_span: key_tok.span,
            value,
        }))
    }

    /// Binary and ternary expressions over postfix operands.
    fn expression(&mut self) -> PResult<Expr> {
        let first = self.unary()?;
        let start = first.span().start;
        let mut children = vec![first];
        loop {
            match self.peek() {
                TokenKind::Op(op) if op == "++" || op == "--" => {
                    self.bump();
                }
                TokenKind::Op(op) if op == "?" => {
                    self.bump();
                    self.skip_newlines();
                    children.push(self.expression()?);
                    self.skip_newlines();
                    if matches!(self.peek(), TokenKind::Colon) {
                        self.bump();
                        self.skip_newlines();
                        children.push(self.expression()?);
                    }
                }
                TokenKind::Op(_) => {
                    self.bump();
                    self.skip_newlines();
                    children.push(self.unary()?);
                }
                _ => break,
            }
        }
        if children.len() == 1 {
            return Ok(children.remove(0));
        }
        Ok(Expr::Other(Compound {
            span: Span::new(start, self.prev_end()),
            children,
        }))
    }

    fn unary(&mut self) -> PResult<Expr> {
        if let TokenKind::Op(_) = self.peek() {
            let start = self.bump().span.start;
            let operand = self.unary()?;
            return Ok(Expr::Other(Compound {
                span: Span::new(start, operand.span().end),
                children: vec![operand],
            }));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.bump();
                    self.skip_newlines();
                    expr = self.member(expr)?;
                }
                TokenKind::Newline => {
                    // `foo\n    .bar()` continues the chain.
                    let next = self.next_significant();
                    if matches!(self.tokens[next].kind, TokenKind::Dot) {
                        self.pos = next;
                    } else {
                        break;
                    }
                }
                TokenKind::LParen => {
                    let args = self.paren_args()?;
                    let end = self.prev_end();
                    expr = make_call(expr, args, None);
                    if let Expr::Call(call) = &mut expr {
                        call.span.end = end;
                    }
                    self.trailing_closure(&mut expr)?;
                }
                TokenKind::LBrace if accepts_closure(&expr) => {
                    if !matches!(expr, Expr::Call(_)) {
                        expr = make_call(expr, Vec::new(), None);
                    }
                    self.trailing_closure(&mut expr)?;
                }
                TokenKind::LBracket if self.span().start == expr.span().end => {
                    let index = self.list_or_map()?;
                    expr = Expr::Other(Compound {
                        span: expr.span().to(index.span()),
                        children: vec![expr, index],
                    });
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn trailing_closure(&mut self, expr: &mut Expr) -> PResult<()> {
        if !matches!(self.peek(), TokenKind::LBrace) {
            return Ok(());
        }
        let block = self.closure()?;
        if let Expr::Call(call) = expr {
            if call.closure.is_none() {
                call.span.end = block.span.end;
                call.closure = Some(block);
            }
        }
        Ok(())
    }

    fn member(&mut self, target: Expr) -> PResult<Expr> {
        let name = match self.peek() {
            TokenKind::Ident(name) | TokenKind::Number(name) => name.clone(),
            TokenKind::Str(lit) => lit.raw(),
            _ => return Err(self.unexpected("after '.'")),
        };
        let span = self.bump().span;
        Ok(Expr::Property(Property {
            span: target.span().to(span),
            target: Box::new(target),
            name,
        }))
    }

    fn primary(&mut self) -> PResult<Expr> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                let span = self.bump().span;
                Ok(Expr::Ident(Ident { span, name }))
            }
            TokenKind::Str(lit) => {
                self.bump();
                Ok(Expr::Str(lit))
            }
            TokenKind::Number(text) => {
                let span = self.bump().span;
                Ok(Expr::Number(NumberLit { span, text }))
            }
            TokenKind::LParen => {
                let open = self.bump().span;
                self.skip_newlines();
                if matches!(self.peek(), TokenKind::RParen) {
                    let close = self.bump().span;
                    return Ok(Expr::Other(Compound {
                        span: open.to(close),
                        children: Vec::new(),
                    }));
                }
                let inner = self.command_expression()?;
                self.skip_newlines();
                match self.peek() {
                    TokenKind::RParen => {
                        self.bump();
                        Ok(inner)
                    }
                    TokenKind::Eof => Err(SyntaxError::new(open.start, "unclosed '('")),
                    _ => Err(self.unexpected("in parenthesized expression")),
                }
            }
            TokenKind::LBracket => self.list_or_map(),
            TokenKind::LBrace => Ok(Expr::Closure(self.closure()?)),
            _ => Err(self.unexpected("where an expression was expected")),
        }
    }

    fn list_or_map(&mut self) -> PResult<Expr> {
        let open = self.bump().span;
        let mut items = Vec::new();
        let mut entries = Vec::new();
        let mut empty_map = false;
        loop {
            self.skip_newlines();
            match self.peek() {
                TokenKind::RBracket => break,
                TokenKind::Eof => return Err(SyntaxError::new(open.start, "unclosed '['")),
                TokenKind::Comma => {
                    self.bump();
                }
                // `[:]`
                TokenKind::Colon => {
                    empty_map = true;
                    self.bump();
                }
                TokenKind::RParen | TokenKind::RBrace => {
                    return Err(self.unexpected("inside '[...]'"));
                }
                _ => match self.argument()? {
                    Arg::Positional(expr) => items.push(expr),
                    Arg::Named(entry) => entries.push(entry),
                },
            }
        }
        let close = self.bump().span;
        let span = open.to(close);
        if !entries.is_empty() || (items.is_empty() && empty_map) {
            return Ok(Expr::Map(MapLit { span, entries }));
        }
        Ok(Expr::List(ListLit { span, items }))
    }

    fn closure(&mut self) -> PResult<Block> {
        let open = self.bump().span;
        let params = self.closure_params();
        let statements = self.statements(Some(open))?;
        let close = self.bump().span;
        Ok(Block {
            span: open.to(close),
            params,
            statements,
        })
    }

    /// Consumes `a, b ->` at the start of a closure, if present.
    fn closure_params(&mut self) -> Vec<String> {
        let mut i = self.next_significant();
        let mut names = Vec::new();
        loop {
            match &self.tokens[i].kind {
                TokenKind::Ident(name) => names.push(name.clone()),
                TokenKind::Comma => {}
                TokenKind::Arrow => {
                    self.pos = i + 1;
                    return names;
                }
                _ => return Vec::new(),
            }
            i += 1;
        }
    }
}

fn accepts_closure(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(_) | Expr::Property(_) => true,
        Expr::Call(call) => call.closure.is_none(),
        _ => false,
    }
}

/// Builds a call from its callee expression and raw arguments.
fn make_call(callee: Expr, args: Vec<Arg>, method_span: Option<Span>) -> Expr {
    let callee_span = callee.span();
    let (receiver, method, name_span) = match callee {
        Expr::Ident(ident) => (None, ident.name, ident.span),
        Expr::Property(prop) => {
            let name_span = method_span.unwrap_or_else(|| {
                Span::new(callee_span.end - prop.name.len(), callee_span.end)
            });
            (Some(prop.target), prop.name, name_span)
        }
        other => (Some(Box::new(other)), "call".to_string(), callee_span),
    };

    let args = split_args(args);
    let end = args
        .iter()
        .map(|arg| arg.span().end)
        .fold(callee_span.end, usize::max);

    Expr::Call(Call {
        span: Span::new(callee_span.start, end),
        receiver,
        method,
        method_span: name_span,
        args,
        closure: None,
        lock: None,
    })
}

/// Positional arguments in order, with named arguments gathered into one
/// leading map literal the way Groovy passes them.
fn split_args(args: Vec<Arg>) -> Vec<Expr> {
    let mut positional = Vec::new();
    let mut named: Vec<MapEntry> = Vec::new();
    for arg in args {
        match arg {
            Arg::Positional(expr) => positional.push(expr),
            Arg::Named(entry) => named.push(entry),
        }
    }
    if let (Some(first), Some(last)) = (named.first(), named.last()) {
        let span = first.span.to(last.span);
        positional.insert(0, Expr::Map(MapLit { span, entries: named }));
    }
    positional
}

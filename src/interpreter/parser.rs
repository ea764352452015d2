use std::rc::Rc;

use super::error::SyntaxError;
use crate::ast::{
    BinaryOp, ClassDecl, ClassMember, ClassMemberKind, Expr, ExprKind, Program, RoutineDecl, RoutineKind, Stmt,
    SwitchCase, UnaryOp, Visibility,
};
use crate::diagnostic::Span;
use crate::token::{Token, TokenKind};

pub type ParseResult<T> = Result<T, SyntaxError>;

/// Tokens that close a block; a bare `return` stops in front of them.
const BLOCK_END: &[TokenKind] = &[
    TokenKind::EndFunction,
    TokenKind::EndProcedure,
    TokenKind::EndIf,
    TokenKind::Else,
    TokenKind::ElseIf,
    TokenKind::EndWhile,
    TokenKind::Next,
    TokenKind::Until,
    TokenKind::EndSwitch,
    TokenKind::Case,
    TokenKind::Default,
    TokenKind::EndClass,
    TokenKind::Eof,
];

/// Recursive-descent parser over a token vector that always ends in `Eof`.
pub struct TokenParser {
    tokens: Vec<Token>,
    current: usize,
}

impl TokenParser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut body = Vec::new();
        while !self.check(TokenKind::Eof) {
            body.push(self.parse_statement()?);
        }
        Ok(Program { body })
    }

    fn at(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.current.min(last)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.at().kind == kind
    }

    fn check_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.at().kind)
    }

    fn eat(&mut self) -> Token {
        let token = self.at().clone();
        if token.kind != TokenKind::Eof {
            self.current += 1;
        }
        token
    }

    fn previous_span(&self) -> Span {
        self.current
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|token| token.span)
            .unwrap_or_else(|| self.at().span)
    }

    fn error_at(token: &Token, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(message, token.span, token.line, token.column)
    }

    fn describe(token: &Token) -> String {
        match token.kind {
            TokenKind::Identifier => format!("identifier `{}`", token.value),
            TokenKind::Integer | TokenKind::Float => format!("number `{}`", token.value),
            TokenKind::String => format!("string \"{}\"", token.value),
            kind => kind.describe().to_string(),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.eat())
        } else {
            let found = self.at();
            Err(Self::error_at(
                found,
                format!("expected {}, found {}", kind.describe(), Self::describe(found)),
            ))
        }
    }

    fn expect_identifier(&mut self) -> ParseResult<(Rc<str>, Span)> {
        let token = self.expect(TokenKind::Identifier)?;
        Ok((Rc::from(token.value.as_str()), token.span))
    }

    /// Parses statements until one of `terminators` is next, without consuming it.
    fn parse_block(&mut self, terminators: &[TokenKind], opener: &Token) -> ParseResult<Vec<Stmt>> {
        let mut body = Vec::new();
        while !self.check_any(terminators) {
            // Another block's closing keyword means this block was closed with the wrong one.
            if self.check_any(BLOCK_END) {
                let expected: Vec<&str> = terminators.iter().map(|kind| kind.describe()).collect();
                let found = self.at();
                let message = if found.kind == TokenKind::Eof {
                    format!("expected {} before end of input", expected.join(" or "))
                } else {
                    format!("expected {}, found {}", expected.join(" or "), Self::describe(found))
                };
                return Err(Self::error_at(found, message)
                    .with_secondary(opener.span, format!("{} block starts here", opener.kind.describe())));
            }
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.at().kind {
            TokenKind::Let => self.parse_variable_declaration(),
            TokenKind::Array => self.parse_array_declaration(),
            TokenKind::Function | TokenKind::Procedure => Ok(Stmt::Routine(self.parse_routine()?)),
            TokenKind::Class => self.parse_class(),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => {
                let keyword = self.eat();
                self.parse_if(&keyword)
            }
            TokenKind::Switch => self.parse_switch(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_until(),
            _ => Ok(Stmt::Expr(self.parse_expression()?)),
        }
    }

    fn parse_variable_declaration(&mut self) -> ParseResult<Stmt> {
        let keyword = self.eat();
        let (name, _) = self.expect_identifier()?;
        self.expect(TokenKind::Equals)?;
        let value = self.parse_expression()?;
        let span = keyword.span.merge(value.span);
        Ok(Stmt::Let { name, value, span })
    }

    fn parse_array_declaration(&mut self) -> ParseResult<Stmt> {
        let keyword = self.eat();
        let (name, _) = self.expect_identifier()?;
        self.expect(TokenKind::OpenSquare)?;
        let mut dimensions = vec![self.parse_expression()?];
        while self.check(TokenKind::Comma) {
            self.eat();
            dimensions.push(self.parse_expression()?);
        }
        let close = self.expect(TokenKind::CloseSquare)?;
        Ok(Stmt::Array { name, dimensions, span: keyword.span.merge(close.span) })
    }

    fn parse_routine(&mut self) -> ParseResult<Rc<RoutineDecl>> {
        let keyword = self.eat();
        let (kind, end) = match keyword.kind {
            TokenKind::Function => (RoutineKind::Function, TokenKind::EndFunction),
            _ => (RoutineKind::Procedure, TokenKind::EndProcedure),
        };

        // Constructors are spelled `new`, which is otherwise a keyword.
        let name: Rc<str> = if self.check(TokenKind::New) {
            Rc::from(self.eat().value.as_str())
        } else {
            self.expect_identifier()?.0
        };

        self.expect(TokenKind::OpenParen)?;
        let mut params = Vec::new();
        if !self.check(TokenKind::CloseParen) {
            loop {
                let (param, span) = self.expect_identifier()?;
                if params.contains(&param) {
                    return Err(SyntaxError::new(
                        format!("duplicate parameter `{}` in `{}`", param, name),
                        span,
                        self.tokens[self.current - 1].line,
                        self.tokens[self.current - 1].column,
                    ));
                }
                params.push(param);
                if !self.check(TokenKind::Comma) {
                    break;
                }
                self.eat();
            }
        }
        self.expect(TokenKind::CloseParen)?;

        let body = self.parse_block(&[end], &keyword)?;
        let close = self.expect(end)?;

        Ok(Rc::new(RoutineDecl {
            kind,
            name,
            params,
            body,
            span: keyword.span.merge(close.span),
        }))
    }

    fn parse_class(&mut self) -> ParseResult<Stmt> {
        let keyword = self.eat();
        let (name, _) = self.expect_identifier()?;

        let parent = if self.check(TokenKind::Inherits) {
            self.eat();
            Some(self.expect_identifier()?)
        } else {
            None
        };

        let mut members: Vec<ClassMember> = Vec::new();
        while !self.check(TokenKind::EndClass) {
            let modifier = self.at().clone();
            let visibility = match modifier.kind {
                TokenKind::Public => Visibility::Public,
                TokenKind::Private => Visibility::Private,
                TokenKind::Eof => {
                    return Err(Self::error_at(&modifier, "expected `endclass` before end of input")
                        .with_secondary(keyword.span, "`class` block starts here"));
                }
                _ => {
                    return Err(Self::error_at(
                        &modifier,
                        format!(
                            "expected `public` or `private` before a class member, found {}",
                            Self::describe(&modifier)
                        ),
                    ));
                }
            };
            self.eat();

            let member = match self.at().kind {
                TokenKind::Function | TokenKind::Procedure => {
                    let decl = self.parse_routine()?;
                    let span = modifier.span.merge(decl.span);
                    ClassMember { visibility, kind: ClassMemberKind::Routine(decl), span }
                }
                TokenKind::Identifier => {
                    let (attribute, span) = self.expect_identifier()?;
                    ClassMember {
                        visibility,
                        kind: ClassMemberKind::Attribute(attribute),
                        span: modifier.span.merge(span),
                    }
                }
                _ => {
                    let found = self.at();
                    return Err(Self::error_at(
                        found,
                        format!(
                            "expected an attribute name or a function/procedure, found {}",
                            Self::describe(found)
                        ),
                    ));
                }
            };

            if members.iter().any(|existing| existing.name() == member.name()) {
                return Err(SyntaxError::new(
                    format!("class `{}` declares `{}` more than once", name, member.name()),
                    member.span,
                    modifier.line,
                    modifier.column,
                ));
            }
            members.push(member);
        }
        let close = self.expect(TokenKind::EndClass)?;

        Ok(Stmt::Class(Rc::new(ClassDecl {
            name,
            parent,
            members,
            span: keyword.span.merge(close.span),
        })))
    }

    fn parse_return(&mut self) -> ParseResult<Stmt> {
        let keyword = self.eat();
        if self.check_any(BLOCK_END) {
            return Ok(Stmt::Return { value: None, span: keyword.span });
        }
        let value = self.parse_expression()?;
        let span = keyword.span.merge(value.span);
        Ok(Stmt::Return { value: Some(value), span })
    }

    /// Called after `if` or `elseif` has been consumed. An `elseif` chain
    /// becomes a nested if statement as the sole element of the else branch,
    /// and the innermost one consumes the shared `endif`.
    fn parse_if(&mut self, keyword: &Token) -> ParseResult<Stmt> {
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Then)?;
        let then_branch = self.parse_block(&[TokenKind::ElseIf, TokenKind::Else, TokenKind::EndIf], keyword)?;

        let else_branch = match self.at().kind {
            TokenKind::ElseIf => {
                let elseif = self.eat();
                Some(vec![self.parse_if(&elseif)?])
            }
            TokenKind::Else => {
                let else_keyword = self.eat();
                let body = self.parse_block(&[TokenKind::EndIf], &else_keyword)?;
                self.expect(TokenKind::EndIf)?;
                Some(body)
            }
            _ => {
                self.expect(TokenKind::EndIf)?;
                None
            }
        };

        Ok(Stmt::If { condition, then_branch, else_branch })
    }

    fn parse_switch(&mut self) -> ParseResult<Stmt> {
        let keyword = self.eat();
        let discriminant = self.parse_expression()?;
        self.expect(TokenKind::Colon)?;

        let arm_end = [TokenKind::Case, TokenKind::Default, TokenKind::EndSwitch];
        let mut cases = Vec::new();
        loop {
            match self.at().kind {
                TokenKind::Case => {
                    let case = self.eat();
                    let test = self.parse_expression()?;
                    self.expect(TokenKind::Colon)?;
                    let body = self.parse_block(&arm_end, &case)?;
                    cases.push(SwitchCase { test: Some(test), body });
                }
                TokenKind::Default => {
                    let default = self.eat();
                    self.expect(TokenKind::Colon)?;
                    let body = self.parse_block(&arm_end, &default)?;
                    cases.push(SwitchCase { test: None, body });
                }
                TokenKind::EndSwitch => {
                    self.eat();
                    break;
                }
                TokenKind::Eof => {
                    return Err(Self::error_at(self.at(), "expected `endswitch` before end of input")
                        .with_secondary(keyword.span, "`switch` block starts here"));
                }
                _ => {
                    let found = self.at();
                    return Err(Self::error_at(
                        found,
                        format!("expected `case`, `default` or `endswitch`, found {}", Self::describe(found)),
                    ));
                }
            }
        }

        Ok(Stmt::Switch { discriminant, cases })
    }

    fn parse_for(&mut self) -> ParseResult<Stmt> {
        let keyword = self.eat();
        let (var, var_span) = self.expect_identifier()?;
        self.expect(TokenKind::Equals)?;
        // Bounds are parsed below the range level so `to` separates them.
        let start = self.parse_multiplicative()?;
        self.expect(TokenKind::To)?;
        let end = self.parse_multiplicative()?;

        let body = self.parse_block(&[TokenKind::Next], &keyword)?;
        self.expect(TokenKind::Next)?;

        let next_var = self.expect(TokenKind::Identifier)?;
        if next_var.value.as_str() != var.as_ref() {
            return Err(Self::error_at(
                &next_var,
                format!("`next {}` does not match the loop variable `{}`", next_var.value, var),
            )
            .with_secondary(var_span, "loop variable declared here"));
        }

        Ok(Stmt::For {
            var,
            start,
            end,
            body,
            span: keyword.span.merge(next_var.span),
        })
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let keyword = self.eat();
        let condition = self.parse_expression()?;
        let body = self.parse_block(&[TokenKind::EndWhile], &keyword)?;
        self.expect(TokenKind::EndWhile)?;
        Ok(Stmt::While { span: keyword.span.merge(condition.span), condition, body })
    }

    fn parse_do_until(&mut self) -> ParseResult<Stmt> {
        let keyword = self.eat();
        let body = self.parse_block(&[TokenKind::Until], &keyword)?;
        self.expect(TokenKind::Until)?;
        let condition = self.parse_expression()?;
        Ok(Stmt::DoUntil { body, condition })
    }

    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> ParseResult<Expr> {
        let target = self.parse_range()?;
        if !self.check(TokenKind::Equals) {
            return Ok(target);
        }
        let equals = self.eat();
        if !matches!(
            target.kind,
            ExprKind::Identifier(_) | ExprKind::FieldAccess { .. } | ExprKind::Index { .. }
        ) {
            return Err(SyntaxError::new(
                "invalid assignment target: expected a variable, member or index",
                target.span,
                equals.line,
                equals.column,
            ));
        }
        let value = self.parse_assignment()?;
        let span = target.span.merge(value.span);
        Ok(Expr::new(
            ExprKind::Assignment { target: Box::new(target), value: Box::new(value) },
            span,
        ))
    }

    fn parse_range(&mut self) -> ParseResult<Expr> {
        let start = self.parse_multiplicative()?;
        if !self.check(TokenKind::To) {
            return Ok(start);
        }
        self.eat();
        let end = self.parse_multiplicative()?;
        let span = start.span.merge(end.span);
        Ok(Expr::new(ExprKind::Range { start: Box::new(start), end: Box::new(end) }, span))
    }

    fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
        let span = left.span.merge(right.span);
        Expr::new(ExprKind::Binary { left: Box::new(left), op, right: Box::new(right) }, span)
    }

    /// Left-folds one precedence level.
    fn parse_level(
        &mut self,
        operators: &[(TokenKind, BinaryOp)],
        next: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut left = next(self)?;
        while let Some(&(_, op)) = operators.iter().find(|(kind, _)| self.check(*kind)) {
            self.eat();
            let right = next(self)?;
            left = Self::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        self.parse_level(
            &[
                (TokenKind::Star, BinaryOp::Mul),
                (TokenKind::Slash, BinaryOp::Div),
                (TokenKind::Mod, BinaryOp::Mod),
                (TokenKind::Div, BinaryOp::IntDiv),
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        self.parse_level(
            &[(TokenKind::Plus, BinaryOp::Add), (TokenKind::Minus, BinaryOp::Sub)],
            Self::parse_exponent,
        )
    }

    fn parse_exponent(&mut self) -> ParseResult<Expr> {
        self.parse_level(&[(TokenKind::Caret, BinaryOp::Pow)], Self::parse_or)
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        self.parse_level(&[(TokenKind::Or, BinaryOp::Or)], Self::parse_and)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        self.parse_level(&[(TokenKind::And, BinaryOp::And)], Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        self.parse_level(
            &[
                (TokenKind::EqualEqual, BinaryOp::Eq),
                (TokenKind::NotEqual, BinaryOp::NotEq),
                (TokenKind::Greater, BinaryOp::Greater),
                (TokenKind::Less, BinaryOp::Less),
                (TokenKind::GreaterEqual, BinaryOp::GreaterEq),
                (TokenKind::LessEqual, BinaryOp::LessEq),
            ],
            Self::parse_not,
        )
    }

    fn unary(&mut self, op: UnaryOp, operand: fn(&mut Self) -> ParseResult<Expr>) -> ParseResult<Expr> {
        let operator = self.eat();
        let expr = operand(self)?;
        let span = operator.span.merge(expr.span);
        Ok(Expr::new(ExprKind::Unary { op, expr: Box::new(expr) }, span))
    }

    fn parse_not(&mut self) -> ParseResult<Expr> {
        if self.check_any(&[TokenKind::Not, TokenKind::Bang]) {
            self.unary(UnaryOp::Not, Self::parse_not)
        } else {
            self.parse_unary_plus()
        }
    }

    fn parse_unary_plus(&mut self) -> ParseResult<Expr> {
        if self.check(TokenKind::Plus) {
            self.unary(UnaryOp::Plus, Self::parse_unary_plus)
        } else {
            self.parse_unary_minus()
        }
    }

    fn parse_unary_minus(&mut self) -> ParseResult<Expr> {
        if self.check(TokenKind::Minus) {
            self.unary(UnaryOp::Neg, Self::parse_unary_plus)
        } else {
            self.parse_call_member()
        }
    }

    fn parse_call_member(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;
        self.parse_suffixes(&mut expr)?;
        Ok(expr)
    }

    /// `.field`, `[i, j]` and `(args)` in any order and number.
    fn parse_suffixes(&mut self, expr: &mut Expr) -> ParseResult<()> {
        loop {
            match self.at().kind {
                TokenKind::Dot => {
                    self.eat();
                    let field = self.expect(TokenKind::Identifier)?;
                    let span = expr.span.merge(field.span);
                    let object = std::mem::replace(expr, Expr::new(ExprKind::Null, span));
                    *expr = Expr::new(
                        ExprKind::FieldAccess { object: Box::new(object), field: Rc::from(field.value.as_str()) },
                        span,
                    );
                }
                TokenKind::OpenSquare => {
                    self.eat();
                    let mut indices = vec![self.parse_expression()?];
                    while self.check(TokenKind::Comma) {
                        self.eat();
                        indices.push(self.parse_expression()?);
                    }
                    let close = self.expect(TokenKind::CloseSquare)?;
                    for index in indices {
                        let span = expr.span.merge(close.span);
                        let object = std::mem::replace(expr, Expr::new(ExprKind::Null, span));
                        *expr = Expr::new(
                            ExprKind::Index { object: Box::new(object), index: Box::new(index) },
                            span,
                        );
                    }
                }
                TokenKind::OpenParen => {
                    let args = self.parse_arguments()?;
                    let span = expr.span.merge(self.previous_span());
                    let callee = std::mem::replace(expr, Expr::new(ExprKind::Null, span));
                    *expr = Expr::new(ExprKind::Call { callee: Box::new(callee), args }, span);
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect(TokenKind::OpenParen)?;
        let mut args = Vec::new();
        if !self.check(TokenKind::CloseParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.check(TokenKind::Comma) {
                    break;
                }
                self.eat();
            }
        }
        self.expect(TokenKind::CloseParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = self.at().clone();
        let kind = match token.kind {
            TokenKind::Identifier => ExprKind::Identifier(Rc::from(token.value.as_str())),
            TokenKind::Integer => {
                let value = token.value.parse::<i64>().map_err(|_| {
                    Self::error_at(&token, format!("integer literal `{}` is too large", token.value))
                })?;
                ExprKind::Integer(value)
            }
            TokenKind::Float => {
                let value = token
                    .value
                    .parse::<f64>()
                    .map_err(|_| Self::error_at(&token, format!("invalid float literal `{}`", token.value)))?;
                ExprKind::Float(value)
            }
            TokenKind::String => ExprKind::String(Rc::from(token.value.as_str())),
            TokenKind::Null => ExprKind::Null,
            TokenKind::OpenParen => {
                self.eat();
                let inner = self.parse_expression()?;
                let close = self.expect(TokenKind::CloseParen)?;
                return Ok(Expr::new(inner.kind, token.span.merge(close.span)));
            }
            TokenKind::New => return self.parse_new(),
            _ => {
                return Err(Self::error_at(
                    &token,
                    format!("expected an expression, found {}", Self::describe(&token)),
                ));
            }
        };
        self.eat();
        Ok(Expr::new(kind, token.span))
    }

    /// `new Name(args)` or `new module.Name(args)`
    fn parse_new(&mut self) -> ParseResult<Expr> {
        let keyword = self.eat();
        let (name, span) = self.expect_identifier()?;
        let mut class = Expr::new(ExprKind::Identifier(name), span);
        while self.check(TokenKind::Dot) {
            self.eat();
            let field = self.expect(TokenKind::Identifier)?;
            let span = class.span.merge(field.span);
            class = Expr::new(
                ExprKind::FieldAccess { object: Box::new(class), field: Rc::from(field.value.as_str()) },
                span,
            );
        }
        let args = self.parse_arguments()?;
        let span = keyword.span.merge(self.previous_span());
        Ok(Expr::new(ExprKind::New { class: Box::new(class), args }, span))
    }
}

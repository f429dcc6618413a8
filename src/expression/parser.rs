use crate::expression::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::expression::error::CompileError;
use crate::expression::lexer::{Span, Token, TokenKind};
use crate::foundation::core::Component;

/// Parse a token stream (with trailing Eof sentinel) into an expression tree.
pub(crate) fn parse(tokens: Vec<Token>) -> Result<Expr, CompileError> {
    let mut p = Parser { tokens, pos: 0 };
    let expr = p.parse_term()?;
    p.expect(TokenKind::Eof)?;
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> &Token {
        let t = &self.tokens[self.pos];
        self.pos += 1;
        t
    }

    fn span(&self) -> Span {
        self.peek().span
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Span, CompileError> {
        if self.peek().kind == kind {
            Ok(self.bump().span)
        } else {
            Err(CompileError::parse(
                self.span().start,
                format!("expected {kind:?}, found {:?}", self.peek().kind),
            ))
        }
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn parse_term(&mut self) -> Result<Expr, CompileError> {
        let mut e = self.parse_factor()?;
        loop {
            let op = if self.consume(TokenKind::Plus) {
                BinaryOp::Add
            } else if self.consume(TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let r = self.parse_factor()?;
            e = binary(op, e, r);
        }
        Ok(e)
    }

    fn parse_factor(&mut self) -> Result<Expr, CompileError> {
        let mut e = self.parse_unary()?;
        loop {
            let op = if self.consume(TokenKind::Star) {
                BinaryOp::Mul
            } else if self.consume(TokenKind::Slash) {
                BinaryOp::Div
            } else if self.consume(TokenKind::Percent) {
                BinaryOp::Rem
            } else {
                break;
            };
            let r = self.parse_unary()?;
            e = binary(op, e, r);
        }
        Ok(e)
    }

    fn parse_unary(&mut self) -> Result<Expr, CompileError> {
        if self.peek().kind == TokenKind::Minus {
            let start = self.bump().span.start;
            let e = self.parse_unary()?;
            let span = Span {
                start,
                end: e.span.end,
            };
            return Ok(Expr {
                span,
                kind: ExprKind::Unary {
                    op: UnaryOp::Neg,
                    expr: Box::new(e),
                },
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, CompileError> {
        let mut e = self.parse_primary()?;

        loop {
            if self.consume(TokenKind::Dot) {
                let t = self.bump().clone();
                let name = match t.kind {
                    TokenKind::Ident(s) => s,
                    other => {
                        return Err(CompileError::parse(
                            t.span.start,
                            format!("expected component after '.', found {other:?}"),
                        ));
                    }
                };
                let Some(component) = Component::from_name(&name) else {
                    return Err(CompileError::parse(
                        t.span.start,
                        format!("expected component x/y/z/w after '.', found \"{name}\""),
                    ));
                };
                let span = Span {
                    start: e.span.start,
                    end: t.span.end,
                };
                e = Expr {
                    span,
                    kind: ExprKind::Member {
                        object: Box::new(e),
                        component,
                    },
                };
                continue;
            }

            if self.consume(TokenKind::LParen) {
                let func = match e.kind {
                    ExprKind::Ident(name) => name,
                    _ => {
                        return Err(CompileError::parse(
                            e.span.start,
                            "call target must be an identifier",
                        ));
                    }
                };
                let (args, rparen) = self.parse_args()?;
                let span = Span {
                    start: e.span.start,
                    end: rparen.end,
                };
                e = match vector_width(&func) {
                    Some(width) => Expr {
                        span,
                        kind: ExprKind::Vector {
                            width,
                            components: args,
                        },
                    },
                    None => Expr {
                        span,
                        kind: ExprKind::Call { func, args },
                    },
                };
                continue;
            }

            break;
        }

        Ok(e)
    }

    fn parse_args(&mut self) -> Result<(Vec<Expr>, Span), CompileError> {
        let mut args = Vec::new();
        if self.peek().kind == TokenKind::RParen {
            let span = self.bump().span;
            return Ok((args, span));
        }
        loop {
            args.push(self.parse_term()?);
            if self.consume(TokenKind::Comma) {
                continue;
            }
            let span = self.expect(TokenKind::RParen)?;
            return Ok((args, span));
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, CompileError> {
        let t = self.bump().clone();
        match t.kind {
            TokenKind::Number(v) => Ok(Expr {
                span: t.span,
                kind: ExprKind::Number(v),
            }),
            TokenKind::Ident(s) => Ok(Expr {
                span: t.span,
                kind: ExprKind::Ident(s),
            }),
            TokenKind::Placeholder(i) => Ok(Expr {
                span: t.span,
                kind: ExprKind::Placeholder(i),
            }),
            TokenKind::LParen => {
                let e = self.parse_term()?;
                let rparen = self.expect(TokenKind::RParen)?;
                Ok(Expr {
                    span: Span {
                        start: t.span.start,
                        end: rparen.end,
                    },
                    kind: e.kind,
                })
            }
            other => Err(CompileError::parse(
                t.span.start,
                format!("unexpected token {other:?}"),
            )),
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    let span = Span {
        start: left.span.start,
        end: right.span.end,
    };
    Expr {
        span,
        kind: ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
    }
}

fn vector_width(name: &str) -> Option<u8> {
    match name {
        "vec2" => Some(2),
        "vec3" => Some(3),
        "vec4" => Some(4),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::error::CompileErrorKind;
    use crate::expression::lexer::lex;
    use crate::expression::template::Template;

    fn parse_str(src: &str) -> Result<Expr, CompileError> {
        parse(lex(&Template::new(src)).unwrap())
    }

    #[test]
    fn parses_arithmetic_precedence() {
        let e = parse_str("1+2*3").unwrap();
        match e.kind {
            ExprKind::Binary {
                op: BinaryOp::Add,
                right,
                ..
            } => {
                assert!(matches!(
                    right.kind,
                    ExprKind::Binary {
                        op: BinaryOp::Mul,
                        ..
                    }
                ));
            }
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn parses_member_chains() {
        let e = parse_str("v.x").unwrap();
        match e.kind {
            ExprKind::Member { component, .. } => assert_eq!(component, Component::X),
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn parses_calls_and_vectors() {
        let e = parse_str("clamp(1, 0, 2)").unwrap();
        match e.kind {
            ExprKind::Call { func, args } => {
                assert_eq!(func, "clamp");
                assert_eq!(args.len(), 3);
            }
            other => panic!("unexpected ast: {other:?}"),
        }

        let e = parse_str("vec3(1, 2, 3)").unwrap();
        match e.kind {
            ExprKind::Vector { width, components } => {
                assert_eq!(width, 3);
                assert_eq!(components.len(), 3);
            }
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn unary_minus_binds_tighter_than_mul_operand() {
        let e = parse_str("-1 * 2").unwrap();
        assert!(matches!(
            e.kind,
            ExprKind::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn rejects_unmatched_parenthesis() {
        let err = parse_str("sin(").unwrap_err();
        assert_eq!(err.kind(), CompileErrorKind::Parse);
    }

    #[test]
    fn rejects_trailing_input() {
        let err = parse_str("1 + 2 3").unwrap_err();
        assert_eq!(err.kind(), CompileErrorKind::Parse);
        assert_eq!(err.offset(), 6);
    }

    #[test]
    fn rejects_non_component_member() {
        let err = parse_str("v.q").unwrap_err();
        assert_eq!(err.kind(), CompileErrorKind::Parse);
    }

    #[test]
    fn rejects_call_on_non_identifier() {
        let err = parse_str("(1 + 2)(3)").unwrap_err();
        assert_eq!(err.kind(), CompileErrorKind::Parse);
    }
}

use crate::expression::error::CompileError;
use crate::expression::template::Template;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    Ident(String),
    /// Interpolation slot, carrying the splice's positional index.
    Placeholder(u32),

    LParen,
    RParen,
    Comma,
    Dot,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    Eof,
}

/// Tokenize a composite template.
///
/// Fragments are scanned in order; between fragment `i` and `i + 1` a single
/// `Placeholder(i)` token is emitted, spanning the `{i}` marker the rendered
/// text shows at that position. All spans are byte offsets into the rendered
/// text.
pub(crate) fn lex(template: &Template) -> Result<Vec<Token>, CompileError> {
    let mut out = Vec::new();
    let mut offset = 0usize;

    for (fi, fragment) in template.fragments.iter().enumerate() {
        lex_fragment(fragment, offset, &mut out)?;
        offset += fragment.len();

        if fi < template.splices.len() {
            let marker_len = render_marker_len(fi);
            out.push(Token {
                kind: TokenKind::Placeholder(fi as u32),
                span: Span {
                    start: offset,
                    end: offset + marker_len,
                },
            });
            offset += marker_len;
        }
    }

    out.push(Token {
        kind: TokenKind::Eof,
        span: Span {
            start: offset,
            end: offset,
        },
    });

    Ok(out)
}

/// Byte length of the `{i}` marker in the rendered text.
fn render_marker_len(i: usize) -> usize {
    let mut digits = 1;
    let mut v = i / 10;
    while v > 0 {
        digits += 1;
        v /= 10;
    }
    digits + 2
}

fn lex_fragment(input: &str, base: usize, out: &mut Vec<Token>) -> Result<(), CompileError> {
    let bytes = input.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let start = i;

        // Number: [0-9]+(.[0-9]+)?([eE][+-]?[0-9]+)? or .[0-9]+([eE][+-]?[0-9]+)?
        if c.is_ascii_digit()
            || (c == '.' && i + 1 < bytes.len() && (bytes[i + 1] as char).is_ascii_digit())
        {
            if c == '.' {
                i += 1;
            } else {
                while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                    i += 1;
                }
                if i < bytes.len()
                    && (bytes[i] as char) == '.'
                    && i + 1 < bytes.len()
                    && (bytes[i + 1] as char).is_ascii_digit()
                {
                    i += 1;
                }
            }

            while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                i += 1;
            }

            // exponent
            if i < bytes.len() && matches!(bytes[i] as char, 'e' | 'E') {
                let e_pos = i;
                i += 1;
                if i < bytes.len() && matches!(bytes[i] as char, '+' | '-') {
                    i += 1;
                }
                let exp_start = i;
                while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                    i += 1;
                }
                if exp_start == i {
                    return Err(CompileError::lex(
                        base + e_pos,
                        "invalid number exponent (expected digits)",
                    ));
                }
            }

            let s = &input[start..i];
            let v: f64 = s
                .parse()
                .map_err(|_| CompileError::lex(base + start, "invalid number"))?;
            out.push(Token {
                kind: TokenKind::Number(v),
                span: Span {
                    start: base + start,
                    end: base + i,
                },
            });
            continue;
        }

        // Ident
        if c.is_ascii_alphabetic() || c == '_' {
            i += 1;
            while i < bytes.len() {
                let ch = bytes[i] as char;
                if ch.is_ascii_alphanumeric() || ch == '_' {
                    i += 1;
                } else {
                    break;
                }
            }
            out.push(Token {
                kind: TokenKind::Ident(input[start..i].to_owned()),
                span: Span {
                    start: base + start,
                    end: base + i,
                },
            });
            continue;
        }

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            _ => {
                return Err(CompileError::lex(
                    base + start,
                    format!("unexpected character '{c}'"),
                ));
            }
        };
        i += 1;
        out.push(Token {
            kind,
            span: Span {
                start: base + start,
                end: base + i,
            },
        });
    }

    Ok(())
}

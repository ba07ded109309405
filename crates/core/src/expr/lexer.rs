//! Tokenizer for calculator expressions.
//!
//! Accepts both ASCII operators and the keypad glyphs (`×`, `÷`, `−`, `√`,
//! `π`), so strings assembled by the session and strings typed by a user go
//! through the same path.

use std::fmt;

use crate::error::CalcError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
    /// The radical glyph `√`, a prefix operator.
    Radical,
    /// The `π` glyph.
    Pi,
    /// A bare word such as `sin` or `pi`.
    Ident(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Plus => f.write_str("+"),
            Self::Minus => f.write_str("-"),
            Self::Star => f.write_str("*"),
            Self::Slash => f.write_str("/"),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::Comma => f.write_str(","),
            Self::Radical => f.write_str("√"),
            Self::Pi => f.write_str("π"),
            Self::Ident(name) => f.write_str(name),
        }
    }
}

/// A token with the char offset it started at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub value: T,
    pub pos: usize,
}

/// Split an expression into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Spanned<Token>>, CalcError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        let token = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '0'..='9' | '.' => {
                let (number, end) = lex_number(&chars, start)?;
                i = end;
                tokens.push(Spanned {
                    value: Token::Number(number),
                    pos: start,
                });
                continue;
            }
            c if c.is_ascii_alphabetic() => {
                while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();
                tokens.push(Spanned {
                    value: Token::Ident(name.to_ascii_lowercase()),
                    pos: start,
                });
                continue;
            }
            '+' => Token::Plus,
            '-' | '−' => Token::Minus,
            '*' | '×' => Token::Star,
            '/' | '÷' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '√' => Token::Radical,
            'π' => Token::Pi,
            other => return Err(CalcError::UnexpectedChar { ch: other, pos: i }),
        };

        tokens.push(Spanned {
            value: token,
            pos: start,
        });
        i += 1;
    }

    Ok(tokens)
}

/// Lex a numeric literal starting at `start`; returns the value and the
/// index just past it.
///
/// Grammar: `digits? ('.' digits?)? (('e'|'E') ('+'|'-')? digits)?`.
fn lex_number(chars: &[char], start: usize) -> Result<(f64, usize), CalcError> {
    let mut i = start;
    while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
        i += 1;
    }

    if i < chars.len() && matches!(chars[i], 'e' | 'E') {
        let mut j = i + 1;
        if j < chars.len() && matches!(chars[j], '+' | '-') {
            j += 1;
        }
        let digits_start = j;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
        if j == digits_start {
            // `4e` or `4e+`: the exponent key was pressed without digits.
            let text: String = chars[start..j].iter().collect();
            return Err(CalcError::InvalidNumber { text, pos: start });
        }
        i = j;
    }

    let text: String = chars[start..i].iter().collect();
    text.parse::<f64>()
        .map(|n| (n, i))
        .map_err(|_| CalcError::InvalidNumber { text, pos: start })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.value)
            .collect()
    }

    #[test]
    fn test_simple_arithmetic() {
        assert_eq!(
            kinds("7 + 3"),
            vec![Token::Number(7.0), Token::Plus, Token::Number(3.0)]
        );
    }

    #[test]
    fn test_keypad_glyphs() {
        assert_eq!(
            kinds("4 × 5 ÷ 2 − 1"),
            vec![
                Token::Number(4.0),
                Token::Star,
                Token::Number(5.0),
                Token::Slash,
                Token::Number(2.0),
                Token::Minus,
                Token::Number(1.0),
            ]
        );
        assert_eq!(kinds("√π"), vec![Token::Radical, Token::Pi]);
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(kinds(".5"), vec![Token::Number(0.5)]);
        assert_eq!(kinds("5."), vec![Token::Number(5.0)]);
        assert_eq!(kinds("1e5"), vec![Token::Number(100000.0)]);
        assert_eq!(kinds("2.5E-3"), vec![Token::Number(0.0025)]);
    }

    #[test]
    fn test_functions_lowercased() {
        assert_eq!(
            kinds("SIN(90)"),
            vec![
                Token::Ident("sin".into()),
                Token::LParen,
                Token::Number(90.0),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_positions_are_char_offsets() {
        let tokens = tokenize("√ 16").unwrap();
        assert_eq!(tokens[0].pos, 0);
        assert_eq!(tokens[1].pos, 2);
    }

    #[test]
    fn test_invalid_numbers() {
        assert_eq!(
            tokenize("1.2.3"),
            Err(CalcError::InvalidNumber {
                text: "1.2.3".into(),
                pos: 0
            })
        );
        assert_eq!(
            tokenize("3 + 4e"),
            Err(CalcError::InvalidNumber {
                text: "4e".into(),
                pos: 4
            })
        );
        assert!(matches!(
            tokenize("."),
            Err(CalcError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_unexpected_char() {
        assert_eq!(
            tokenize("2 $ 3"),
            Err(CalcError::UnexpectedChar { ch: '$', pos: 2 })
        );
    }
}

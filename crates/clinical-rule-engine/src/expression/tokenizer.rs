//! 条件字符串分词器
//!
//! 自左向右扫描输入，相同类别的连续字符合并为一个标记，空白字符直接跳过。
//! 括号总是单字符标记。分词结果是惰性的单遍迭代器，遇到第一个错误后结束。

use super::token::{Token, TokenKind, parse_boolean};
use crate::error::ExpressionError;
use crate::operators::LogicalOperator;
use std::iter::Peekable;
use std::str::CharIndices;

/// 字符类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Letter,
    Digit,
    Whitespace,
    Parenthesis,
    Operator,
}

fn classify(ch: char, position: usize) -> Result<CharClass, ExpressionError> {
    if ch.is_alphabetic() {
        Ok(CharClass::Letter)
    } else if ch.is_ascii_digit() {
        Ok(CharClass::Digit)
    } else if ch.is_whitespace() {
        Ok(CharClass::Whitespace)
    } else if ch == '(' || ch == ')' {
        Ok(CharClass::Parenthesis)
    } else if LogicalOperator::is_operator_char(ch) {
        Ok(CharClass::Operator)
    } else {
        Err(ExpressionError::InvalidCharacter { ch, position })
    }
}

/// 分词迭代器
pub struct Tokenizer<'a> {
    chars: Peekable<CharIndices<'a>>,
    buffer: String,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            buffer: String::new(),
            finished: false,
        }
    }

    fn scan(&mut self) -> Result<Option<Token>, ExpressionError> {
        self.buffer.clear();

        while let Some((position, ch)) = self.chars.next() {
            let class = classify(ch, position)?;
            if class == CharClass::Whitespace {
                continue;
            }

            self.buffer.push(ch);

            // 到达输入末尾时按空白处理，使当前标记结束
            let next = self.chars.peek().copied();
            let next_class = match next {
                Some((pos, c)) => classify(c, pos)?,
                None => CharClass::Whitespace,
            };

            if class == next_class && class != CharClass::Parenthesis {
                continue;
            }

            let followed_by_paren = matches!(next, Some((_, '(')));
            return self.emit(class, followed_by_paren).map(Some);
        }

        Ok(None)
    }

    fn emit(&self, class: CharClass, followed_by_paren: bool) -> Result<Token, ExpressionError> {
        let symbol = self.buffer.as_str();

        let token = match class {
            CharClass::Letter => {
                if parse_boolean(symbol).is_none() {
                    return Err(ExpressionError::InvalidToken(symbol.to_string()));
                }
                Token::new(symbol, TokenKind::Literal)
            }
            CharClass::Digit => Token::new(symbol, TokenKind::Number),
            CharClass::Operator => match LogicalOperator::from_symbol(symbol) {
                Some(op) => Token::operator(op),
                None => return Err(ExpressionError::InvalidToken(symbol.to_string())),
            },
            CharClass::Parenthesis => Token::new(symbol, TokenKind::Parenthesis),
            CharClass::Whitespace => unreachable!("whitespace is never buffered"),
        };

        if followed_by_paren && matches!(token.kind(), TokenKind::Literal | TokenKind::Number) {
            return Ok(token.into_function());
        }

        Ok(token)
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, ExpressionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.scan() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// 将条件字符串拆分为标记序列
pub fn tokenize(input: &str) -> Tokenizer<'_> {
    Tokenizer::new(input)
}

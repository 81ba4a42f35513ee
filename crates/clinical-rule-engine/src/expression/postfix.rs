//! 中缀转后缀（Shunting-Yard）

use super::token::{Token, TokenKind};
use crate::error::ExpressionError;
use std::collections::VecDeque;

/// 当前运算符入栈前是否需要先弹出栈顶运算符
///
/// 左结合：`a.precedence <= b.precedence`；右结合：`a.precedence < b.precedence`。
/// 同优先级的左结合运算符会先弹出栈顶，保持从左到右的求值顺序。
pub fn should_pop_before_push(current: &Token, top: &Token) -> bool {
    if current.is_right_associative() {
        current.precedence() < top.precedence()
    } else {
        current.precedence() <= top.precedence()
    }
}

/// 惰性后缀序列
///
/// 每次拉取都只消费必要的输入标记，输出缓冲在 `pending` 中。
pub struct Postfix<I> {
    tokens: I,
    stack: Vec<Token>,
    pending: VecDeque<Token>,
    input_done: bool,
    failed: bool,
}

impl<I> Postfix<I>
where
    I: Iterator<Item = Result<Token, ExpressionError>>,
{
    pub fn new(tokens: I) -> Self {
        Self {
            tokens,
            stack: Vec::new(),
            pending: VecDeque::new(),
            input_done: false,
            failed: false,
        }
    }

    fn accept(&mut self, token: Token) -> Result<(), ExpressionError> {
        match token.kind() {
            TokenKind::Literal | TokenKind::Number => self.pending.push_back(token),
            TokenKind::Function => self.stack.push(token),
            TokenKind::Operator => {
                while self.stack.last().is_some_and(|top| {
                    top.kind() == TokenKind::Operator && should_pop_before_push(&token, top)
                }) {
                    if let Some(top) = self.stack.pop() {
                        self.pending.push_back(top);
                    }
                }
                self.stack.push(token);
            }
            TokenKind::Parenthesis if token.is_open_paren() => self.stack.push(token),
            TokenKind::Parenthesis => {
                loop {
                    match self.stack.pop() {
                        Some(top) if top.is_open_paren() => break,
                        Some(top) => self.pending.push_back(top),
                        None => return Err(ExpressionError::MismatchedParentheses),
                    }
                }

                if self
                    .stack
                    .last()
                    .is_some_and(|top| top.kind() == TokenKind::Function)
                    && let Some(function) = self.stack.pop()
                {
                    self.pending.push_back(function);
                }
            }
        }

        Ok(())
    }

    fn fail(&mut self, error: ExpressionError) -> Option<Result<Token, ExpressionError>> {
        self.failed = true;
        self.pending.clear();
        self.stack.clear();
        Some(Err(error))
    }
}

impl<I> Iterator for Postfix<I>
where
    I: Iterator<Item = Result<Token, ExpressionError>>,
{
    type Item = Result<Token, ExpressionError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }

            if self.failed {
                return None;
            }

            if self.input_done {
                // 输入结束后按 LIFO 顺序弹出剩余栈内容
                return match self.stack.pop() {
                    Some(token) if token.kind() == TokenKind::Parenthesis => {
                        self.fail(ExpressionError::MismatchedParentheses)
                    }
                    Some(token) => Some(Ok(token)),
                    None => None,
                };
            }

            match self.tokens.next() {
                Some(Ok(token)) => {
                    if let Err(e) = self.accept(token) {
                        return self.fail(e);
                    }
                }
                Some(Err(e)) => return self.fail(e),
                None => self.input_done = true,
            }
        }
    }
}

/// 将中缀标记序列转换为后缀顺序
pub fn to_postfix<I>(tokens: I) -> Postfix<I::IntoIter>
where
    I: IntoIterator<Item = Result<Token, ExpressionError>>,
{
    Postfix::new(tokens.into_iter())
}

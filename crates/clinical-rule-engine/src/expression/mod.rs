//! 布尔条件表达式引擎
//!
//! 将 `true & (false | true)` 形式的中缀字符串依次经过：
//!
//! - `tokenize`: 分词并分类（字面量、数字、运算符、括号）
//! - `to_postfix`: Shunting-Yard 转换为后缀顺序
//! - `evaluate_postfix`: 基于值栈求值
//!
//! 三个阶段都是惰性迭代器，`convert_and_evaluate` 将其串联为一次调用。

pub mod evaluate;
pub mod postfix;
pub mod token;
pub mod tokenizer;

pub use evaluate::{convert_and_evaluate, evaluate_postfix};
pub use postfix::{Postfix, should_pop_before_push, to_postfix};
pub use token::{Token, TokenKind, parse_boolean};
pub use tokenizer::{Tokenizer, tokenize};

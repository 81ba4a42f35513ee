//! 后缀表达式求值

use super::postfix::to_postfix;
use super::token::{Token, TokenKind, parse_boolean};
use super::tokenizer::tokenize;
use crate::error::ExpressionError;
use crate::operators::LogicalOperator;

/// 对后缀顺序的标记序列求值
///
/// 操作数按原文压栈（解析为布尔值），运算符弹出两个操作数后压入结果。
/// 序列结束时栈中必须恰好剩余一个值。
///
/// 求值阶段发现的第一个错误会暂存，输入继续读到结束：上游的结构错误
/// （如括号不匹配）总是优先于求值错误返回。
pub fn evaluate_postfix<I>(tokens: I) -> Result<bool, ExpressionError>
where
    I: IntoIterator<Item = Result<Token, ExpressionError>>,
{
    let mut stack: Vec<bool> = Vec::new();
    let mut deferred: Option<ExpressionError> = None;

    for token in tokens {
        let token = token?;

        if let Err(e) = apply_token(&mut stack, &token) {
            deferred.get_or_insert(e);
        }
    }

    if let Some(e) = deferred {
        return Err(e);
    }

    match stack.as_slice() {
        [value] => Ok(*value),
        [] => Err(ExpressionError::MalformedExpression("表达式为空".to_string())),
        values => Err(ExpressionError::MalformedExpression(format!(
            "求值结束后剩余 {} 个值",
            values.len()
        ))),
    }
}

/// 处理单个标记；出错时仍压入占位值，保持后续运算符的操作数个数
fn apply_token(stack: &mut Vec<bool>, token: &Token) -> Result<(), ExpressionError> {
    match token.kind() {
        TokenKind::Operator => {
            let (rhs, lhs) = (stack.pop(), stack.pop());
            let Some(op) = LogicalOperator::from_symbol(token.symbol()) else {
                stack.push(false);
                return Err(ExpressionError::InvalidToken(token.symbol().to_string()));
            };

            // 先弹出的是右操作数
            let (Some(rhs), Some(lhs)) = (rhs, lhs) else {
                stack.push(false);
                return Err(ExpressionError::MalformedExpression(format!(
                    "运算符 '{}' 缺少操作数",
                    op
                )));
            };
            stack.push(op.apply(lhs, rhs));
            Ok(())
        }
        TokenKind::Parenthesis => Err(ExpressionError::MalformedExpression(format!(
            "后缀序列中出现括号 '{}'",
            token.symbol()
        ))),
        TokenKind::Literal | TokenKind::Number | TokenKind::Function => {
            match parse_boolean(token.symbol()) {
                Some(value) => {
                    stack.push(value);
                    Ok(())
                }
                None => {
                    stack.push(false);
                    Err(ExpressionError::InvalidToken(token.symbol().to_string()))
                }
            }
        }
    }
}

/// 分词 → 转后缀 → 求值
pub fn convert_and_evaluate(infix: &str) -> Result<bool, ExpressionError> {
    evaluate_postfix(to_postfix(tokenize(infix)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals() {
        assert!(convert_and_evaluate("true").unwrap());
        assert!(!convert_and_evaluate("false").unwrap());
        assert!(convert_and_evaluate("(((TRUE)))").unwrap());
    }

    #[test]
    fn test_and_or() {
        assert!(convert_and_evaluate("true & true").unwrap());
        assert!(!convert_and_evaluate("true & false").unwrap());
        assert!(convert_and_evaluate("false | true").unwrap());
        assert!(!convert_and_evaluate("false | false").unwrap());
    }

    #[test]
    fn test_grouping() {
        assert!(convert_and_evaluate("true & (false | true)").unwrap());
        assert!(!convert_and_evaluate("false & (true | true)").unwrap());
        assert!(convert_and_evaluate("(false & true) | true").unwrap());
    }

    #[test]
    fn test_ungrouped_mixed_operators() {
        // `|` 结合得比 `&` 紧：false & (false | true)
        assert!(!convert_and_evaluate("false & false | true").unwrap());
        // (true | false) & false
        assert!(!convert_and_evaluate("true | false & false").unwrap());
    }

    #[test]
    fn test_missing_operand() {
        assert!(matches!(
            convert_and_evaluate("true &"),
            Err(ExpressionError::MalformedExpression(_))
        ));
        assert!(matches!(
            convert_and_evaluate("| true"),
            Err(ExpressionError::MalformedExpression(_))
        ));
    }

    #[test]
    fn test_extra_operand() {
        assert!(matches!(
            convert_and_evaluate("true false"),
            Err(ExpressionError::MalformedExpression(_))
        ));
    }

    #[test]
    fn test_empty_expression() {
        assert!(matches!(
            convert_and_evaluate(""),
            Err(ExpressionError::MalformedExpression(_))
        ));
    }

    #[test]
    fn test_unsubstituted_rule_id() {
        assert_eq!(
            convert_and_evaluate("true & 7").unwrap_err(),
            ExpressionError::InvalidToken("7".to_string())
        );
    }

    #[test]
    fn test_mismatched_parentheses() {
        assert_eq!(
            convert_and_evaluate("(true & false").unwrap_err(),
            ExpressionError::MismatchedParentheses
        );
    }

    #[test]
    fn test_unbalanced_parentheses_win_over_bad_operands() {
        assert_eq!(
            convert_and_evaluate("(1 & 2").unwrap_err(),
            ExpressionError::MismatchedParentheses
        );
        assert_eq!(
            convert_and_evaluate("1 & 2)").unwrap_err(),
            ExpressionError::MismatchedParentheses
        );
        assert_eq!(
            convert_and_evaluate("(1 &").unwrap_err(),
            ExpressionError::MismatchedParentheses
        );
    }

    #[test]
    fn test_first_evaluation_error_reported() {
        // 两个未替换的规则 ID，报告第一个
        assert_eq!(
            convert_and_evaluate("3 | 4").unwrap_err(),
            ExpressionError::InvalidToken("3".to_string())
        );
        assert_eq!(
            convert_and_evaluate("7 &").unwrap_err(),
            ExpressionError::InvalidToken("7".to_string())
        );
    }

    #[test]
    fn test_evaluate_prebuilt_postfix() {
        // 已是后缀顺序的序列可直接求值
        let tokens = tokenize("true false | false &");
        assert!(!evaluate_postfix(tokens).unwrap());
    }
}

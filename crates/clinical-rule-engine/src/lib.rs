//! 临床监护规则引擎
//!
//! 提供基于监护消息的规则评估与复合事件解析能力，支持：
//! - 报警/测量规则（含持续类规则）评估
//! - 以规则 ID 书写的布尔条件模板（`1 & (2 | 3)`）的分词、转后缀与求值
//! - JSON 目录定义的解析和校验
//! - 可插拔的状态输出

pub mod compiler;
pub mod defaults;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod expression;
pub mod models;
pub mod operators;
pub mod rules;
pub mod sink;

pub use compiler::{Catalog, CatalogCompiler, CatalogDefinition, CompiledEvent, referenced_rules};
pub use defaults::ventilator_catalog;
pub use error::{ExpressionError, Result, RuleError};
pub use evaluator::ComparisonEvaluator;
pub use executor::EventResolver;
pub use expression::{Token, TokenKind, convert_and_evaluate, evaluate_postfix, to_postfix, tokenize};
pub use models::{
    ACCEPTABLE_STATUS, Alarm, Event, EventFailure, Measurement, Message, Resolution, RuleId,
    RuleResults, TargetValue,
};
pub use operators::{ComparisonOperator, LogicalOperator};
pub use rules::{Rule, RuleKind};
pub use sink::{ConsoleSink, LogSink, MonitorService, StatusSink};

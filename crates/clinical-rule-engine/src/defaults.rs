//! 内置呼吸机监护目录
//!
//! 未配置目录文件时使用。

use crate::compiler::CatalogDefinition;
use crate::models::Event;
use crate::operators::ComparisonOperator;
use crate::rules::Rule;
use std::time::Duration;

pub fn ventilator_catalog() -> CatalogDefinition {
    let rules = vec![
        Rule::alarm(1, "CO2lo"),
        Rule::alarm(8, "SPO2hi"),
        Rule::measurement(4, "SFRatio", ComparisonOperator::Lt, "153"),
        Rule::measurement_duration(
            5,
            "OSI",
            ComparisonOperator::Gt,
            "7.8",
            Duration::from_secs(60 * 60),
        ),
        Rule::alarm(2, "HRhi"),
        Rule::alarm(3, "HRlo"),
        Rule::alarm(6, "CO2hi"),
        Rule::measurement(22, "HR", ComparisonOperator::Lt, "80"),
        Rule::measurement(99, "SPO2", ComparisonOperator::Lt, "85"),
    ];

    let events = vec![
        Event::new(1, "Severe Hyperventilation", "1 & (2 | 3)"),
        Event::new(2, "Severe Hypoxemia", "4 & 5 & (2 | 3)"),
        Event::new(3, "Hypoxemia", "1 | 22"),
        Event::new(4, "WAY TOO LOW SPO2", "99"),
        Event::new(5, "something else", "8 | 3"),
    ];

    CatalogDefinition { rules, events }
}

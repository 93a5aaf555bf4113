//! Domain types: condition trees, rules, templates, indicator configs.

pub mod condition;
pub mod group;
pub mod ids;
pub mod indicator;
pub mod rule;
pub mod template;

pub use condition::{ConditionType, ConditionValue, Operator, RuleCondition};
pub use group::{Logic, RuleGroup};
pub use ids::{ConditionId, GroupId, RuleId, TreeFingerprint};
pub use indicator::{IndicatorConfig, ParamValue};
pub use rule::{AlertChannel, BacktestStats, CachedBacktest, Rule, RuleAction, TriggerStats};
pub use template::{builtin_templates, find_template, RuleTemplate, TemplateCategory, TemplatePreset};

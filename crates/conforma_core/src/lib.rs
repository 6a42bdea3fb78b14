mod canon;
mod condition;
mod coverage;
mod cross;
mod error;
mod evaluate;
mod finding;
mod formula;
mod hierarchy;
mod interpolate;
mod paths;
mod rule;
mod snapshot;
mod tables;
mod validate;

pub use canon::{canonical_json_bytes, content_hash, ruleset_hash, snapshot_hash};
pub use condition::{evaluate_condition, ConditionEval, SkipDiag};
pub use coverage::{coverage_percent, plugin_metrics, RuleEvaluationMetrics};
pub use cross::{cross_specialty_pairs, CrossSpecialtyPair};
pub use error::EngineError;
pub use evaluate::{
    collect_findings, collect_metrics, evaluate_plugin, evaluate_plugins, evaluate_rule,
    Diagnostic, PluginEvaluation, RuleEvaluation, RuleOutcome, SkipReason,
};
pub use finding::Finding;
pub use formula::{eval_formula, FormulaFault};
pub use hierarchy::{
    build_hierarchy, AnalysisHierarchy, DomainEntry, DomainNode, DomainTaxonomy, RegulationNode,
    SeverityCounts, SpecialtyNode, UNGROUPED_DOMAIN,
};
pub use interpolate::{interpolate, ValueFormatter};
pub use paths::{resolve_path, Resolution};
pub use rule::{
    CmpOp, DeclarativeRule, Operator, Regulation, RuleCondition, RulePlugin, Severity,
};
pub use snapshot::{ProjectSnapshot, COMPUTED_NAMESPACE};
pub use tables::{LookupTable, LookupTables, TableRow};
pub use validate::{validate_plugin, validate_rule, RuleViolation};

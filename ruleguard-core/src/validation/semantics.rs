//! Field semantics table.
//!
//! Single registry of value domains for condition fields and indicator
//! parameters. Every validator reads its bounds from here; adding a field or an
//! indicator means adding one entry. Tables are built once and never mutated.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::domain::{ConditionType, Operator};

// ─── Descriptors ────────────────────────────────────────────────────

/// Broad family of a condition field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Price,
    Oscillator,
    Trend,
    Volume,
    News,
    Portfolio,
    Risk,
}

impl FieldKind {
    /// Whether a condition of type `t` is a sensible container for this field.
    pub fn accepts(self, t: ConditionType) -> bool {
        use ConditionType as T;
        match self {
            Self::Price => matches!(t, T::Price | T::Indicator),
            Self::Oscillator => matches!(t, T::Indicator),
            Self::Trend => matches!(t, T::Indicator | T::Price),
            Self::Volume => matches!(t, T::Volume | T::Indicator),
            Self::News => matches!(t, T::News),
            Self::Portfolio => matches!(t, T::Portfolio),
            Self::Risk => matches!(t, T::Portfolio | T::Price),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Oscillator => "oscillator",
            Self::Trend => "trend",
            Self::Volume => "volume",
            Self::News => "news",
            Self::Portfolio => "portfolio",
            Self::Risk => "risk",
        }
    }
}

/// Value type a field or parameter expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Number,
    String,
    Boolean,
}

/// Legal domain of a condition field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDomain {
    pub kind: FieldKind,
    pub value_type: ValueType,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Operators the field supports.
    pub operators: &'static [Operator],
    /// Thresholds above this are legal but rarely reached.
    pub rarely_above: Option<f64>,
    /// Thresholds below this are legal but rarely reached.
    pub rarely_below: Option<f64>,
}

/// Legal domain of an indicator parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDomain {
    pub name: &'static str,
    pub value_type: ValueType,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub required: bool,
    /// Only whole numbers are legal (periods, lookbacks).
    pub integer: bool,
}

/// Indicator families used by the clutter heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorFamily {
    Oscillator,
    MovingAverage,
    Trend,
    Volatility,
    Volume,
    Composite,
}

/// Parameter rules for one indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRule {
    pub family: IndicatorFamily,
    pub params: &'static [ParamDomain],
}

impl IndicatorRule {
    pub fn param(&self, name: &str) -> Option<&'static ParamDomain> {
        self.params.iter().find(|p| p.name == name)
    }
}

// ─── Condition fields ───────────────────────────────────────────────

const ALL_OPERATORS: &[Operator] = &Operator::ALL;
const EQUALITY_ONLY: &[Operator] = &[Operator::Equals];

const fn numeric(kind: FieldKind, min: Option<f64>, max: Option<f64>) -> FieldDomain {
    FieldDomain {
        kind,
        value_type: ValueType::Number,
        min,
        max,
        operators: ALL_OPERATORS,
        rarely_above: None,
        rarely_below: None,
    }
}

const fn categorical(kind: FieldKind, value_type: ValueType) -> FieldDomain {
    FieldDomain {
        kind,
        value_type,
        min: None,
        max: None,
        operators: EQUALITY_ONLY,
        rarely_above: None,
        rarely_below: None,
    }
}

const PERCENT_0_100: (Option<f64>, Option<f64>) = (Some(0.0), Some(100.0));

static FIELD_DOMAINS: LazyLock<HashMap<&'static str, FieldDomain>> = LazyLock::new(|| {
    use FieldKind::*;
    let (p0, p100) = PERCENT_0_100;
    let mut m = HashMap::new();

    for field in [
        "current_price",
        "open",
        "high",
        "low",
        "close",
        "vwap",
        "day_high",
        "day_low",
        "week52_high",
        "week52_low",
    ] {
        m.insert(field, numeric(Price, Some(0.0), None));
    }
    m.insert("price_change_pct", numeric(Price, Some(-100.0), None));

    for field in [
        "SMA_20",
        "SMA_50",
        "SMA_200",
        "EMA_12",
        "EMA_26",
        "bollinger_upper",
        "bollinger_middle",
        "bollinger_lower",
    ] {
        m.insert(field, numeric(Trend, Some(0.0), None));
    }
    for field in ["MACD", "MACD_signal", "MACD_histogram"] {
        m.insert(field, numeric(Trend, None, None));
    }
    m.insert("ADX", numeric(Trend, p0, p100));

    m.insert(
        "RSI",
        FieldDomain {
            rarely_above: Some(90.0),
            rarely_below: Some(10.0),
            ..numeric(Oscillator, p0, p100)
        },
    );
    m.insert("stochastic_k", numeric(Oscillator, p0, p100));
    m.insert("stochastic_d", numeric(Oscillator, p0, p100));
    m.insert("MFI", numeric(Oscillator, p0, p100));
    m.insert("williams_r", numeric(Oscillator, Some(-100.0), Some(0.0)));
    m.insert("CCI", numeric(Oscillator, None, None));

    m.insert("volume", numeric(Volume, Some(0.0), None));
    m.insert("avg_volume", numeric(Volume, Some(0.0), None));
    m.insert(
        "volume_ratio",
        FieldDomain {
            rarely_above: Some(5.0),
            ..numeric(Volume, Some(0.0), None)
        },
    );

    m.insert("news_sentiment", numeric(News, Some(-1.0), Some(1.0)));
    m.insert("news_count", numeric(News, Some(0.0), None));
    m.insert("news_sentiment_label", categorical(News, ValueType::String));
    m.insert("earnings_today", categorical(News, ValueType::Boolean));

    m.insert("position_pnl_pct", numeric(Portfolio, Some(-100.0), None));
    m.insert("portfolio_weight_pct", numeric(Portfolio, p0, p100));
    m.insert("unrealized_pnl", numeric(Portfolio, None, None));
    m.insert("sector", categorical(Portfolio, ValueType::String));

    m.insert("stop_loss", numeric(Risk, Some(0.0), None));
    m.insert("safety_line", numeric(Risk, Some(0.0), None));

    m
});

/// Look up the domain of a condition field. Exact match first, then
/// case-insensitive.
pub fn field_domain(field: &str) -> Option<&'static FieldDomain> {
    field_entry(field).map(|(_, domain)| domain)
}

fn field_entry(field: &str) -> Option<(&'static str, &'static FieldDomain)> {
    let table = &*FIELD_DOMAINS;
    table
        .get_key_value(field)
        .or_else(|| table.iter().find(|(name, _)| name.eq_ignore_ascii_case(field)))
        .map(|(name, domain)| (*name, domain))
}

/// Identity of a field for same-field comparisons: the registered spelling of a
/// known field, the trimmed ASCII-lowercase name of an unknown one.
pub fn canonical_field(field: &str) -> Cow<'static, str> {
    let field = field.trim();
    match field_entry(field) {
        Some((name, _)) => Cow::Borrowed(name),
        None => Cow::Owned(field.to_ascii_lowercase()),
    }
}

/// Kind of a field, if known.
pub fn field_kind(field: &str) -> Option<FieldKind> {
    field_domain(field).map(|d| d.kind)
}

/// Fields that carry risk management (a stop or a safety line).
pub fn is_risk_field(field: &str) -> bool {
    field_kind(field) == Some(FieldKind::Risk)
}

/// Timeframes the market-data service can evaluate.
pub const KNOWN_TIMEFRAMES: &[&str] = &["1m", "5m", "15m", "30m", "1h", "4h", "1d", "1w"];

// ─── Indicator parameters ───────────────────────────────────────────

const fn int_param(name: &'static str, min: f64, max: f64, required: bool) -> ParamDomain {
    ParamDomain {
        name,
        value_type: ValueType::Number,
        min: Some(min),
        max: Some(max),
        required,
        integer: true,
    }
}

const fn num_param(name: &'static str, min: f64, max: f64, required: bool) -> ParamDomain {
    ParamDomain {
        name,
        value_type: ValueType::Number,
        min: Some(min),
        max: Some(max),
        required,
        integer: false,
    }
}

const SOURCE_PARAM: ParamDomain = ParamDomain {
    name: "source",
    value_type: ValueType::String,
    min: None,
    max: None,
    required: false,
    integer: false,
};

const RSI_PARAMS: &[ParamDomain] = &[
    int_param("period", 2.0, 100.0, true),
    num_param("overbought", 50.0, 100.0, true),
    num_param("oversold", 0.0, 50.0, true),
];
const MACD_PARAMS: &[ParamDomain] = &[
    int_param("fast", 1.0, 100.0, true),
    int_param("slow", 2.0, 200.0, true),
    int_param("signal", 1.0, 50.0, true),
];
const MA_PARAMS: &[ParamDomain] = &[int_param("period", 1.0, 500.0, true), SOURCE_PARAM];
const BOLLINGER_PARAMS: &[ParamDomain] = &[
    int_param("period", 2.0, 200.0, true),
    num_param("std_dev", 0.5, 5.0, true),
];
const STOCHASTIC_PARAMS: &[ParamDomain] = &[
    int_param("k_period", 1.0, 100.0, true),
    int_param("d_period", 1.0, 50.0, true),
    int_param("smooth", 1.0, 10.0, false),
];
const ATR_PARAMS: &[ParamDomain] = &[int_param("period", 1.0, 100.0, true)];
const RSI_DIVERGENCE_PARAMS: &[ParamDomain] = &[int_param("lookback", 5.0, 200.0, false)];
const STOCH_RSI_PARAMS: &[ParamDomain] = &[int_param("period", 2.0, 100.0, true)];
const SQUEEZE_PARAMS: &[ParamDomain] = &[num_param("threshold", 0.01, 1.0, false)];
const VOLUME_PROFILE_PARAMS: &[ParamDomain] = &[int_param("bins", 5.0, 200.0, false)];
const NO_PARAMS: &[ParamDomain] = &[];

static INDICATOR_RULES: LazyLock<HashMap<&'static str, IndicatorRule>> = LazyLock::new(|| {
    use IndicatorFamily::*;
    let rule = |family, params| IndicatorRule { family, params };
    HashMap::from([
        ("RSI", rule(Oscillator, RSI_PARAMS)),
        ("MACD", rule(Trend, MACD_PARAMS)),
        ("SMA", rule(MovingAverage, MA_PARAMS)),
        ("EMA", rule(MovingAverage, MA_PARAMS)),
        ("WMA", rule(MovingAverage, MA_PARAMS)),
        ("Bollinger Bands", rule(Volatility, BOLLINGER_PARAMS)),
        ("Stochastic", rule(Oscillator, STOCHASTIC_PARAMS)),
        ("ATR", rule(Volatility, ATR_PARAMS)),
        ("VWAP", rule(Volume, NO_PARAMS)),
        ("Volume Profile", rule(Volume, VOLUME_PROFILE_PARAMS)),
        ("RSI Divergence", rule(Composite, RSI_DIVERGENCE_PARAMS)),
        ("Stochastic RSI", rule(Composite, STOCH_RSI_PARAMS)),
        ("MACD Histogram", rule(Composite, NO_PARAMS)),
        ("Bollinger Squeeze", rule(Composite, SQUEEZE_PARAMS)),
    ])
});

/// Composite indicators and the base indicators they need active.
static INDICATOR_DEPENDENCIES: LazyLock<HashMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| {
        const NEEDS_RSI: &[&str] = &["RSI"];
        const NEEDS_MACD: &[&str] = &["MACD"];
        const NEEDS_BOLLINGER: &[&str] = &["Bollinger Bands"];
        HashMap::from([
            ("RSI Divergence", NEEDS_RSI),
            ("Stochastic RSI", NEEDS_RSI),
            ("MACD Histogram", NEEDS_MACD),
            ("Bollinger Squeeze", NEEDS_BOLLINGER),
        ])
    });

/// Canonical registry name for an indicator (case-insensitive match).
pub fn canonical_indicator(name: &str) -> Option<&'static str> {
    let table = &*INDICATOR_RULES;
    table
        .get_key_value(name)
        .map(|(k, _)| *k)
        .or_else(|| table.keys().copied().find(|k| k.eq_ignore_ascii_case(name)))
}

/// Parameter rules for an indicator, if it is registered.
pub fn indicator_rule(name: &str) -> Option<&'static IndicatorRule> {
    canonical_indicator(name).and_then(|k| INDICATOR_RULES.get(k))
}

/// Base indicators required by a composite indicator (empty if none).
pub fn indicator_dependencies(name: &str) -> &'static [&'static str] {
    canonical_indicator(name)
        .and_then(|k| INDICATOR_DEPENDENCIES.get(k).copied())
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_domain_is_bounded_with_advisory_extremes() {
        let d = field_domain("RSI").unwrap();
        assert_eq!(d.kind, FieldKind::Oscillator);
        assert_eq!((d.min, d.max), (Some(0.0), Some(100.0)));
        assert_eq!((d.rarely_above, d.rarely_below), (Some(90.0), Some(10.0)));
    }

    #[test]
    fn lookup_falls_back_to_case_insensitive() {
        assert!(field_domain("rsi").is_some());
        assert!(field_domain("Current_Price").is_some());
        assert!(field_domain("moon_phase").is_none());
        assert_eq!(canonical_indicator("bollinger bands"), Some("Bollinger Bands"));
    }

    #[test]
    fn canonical_field_unifies_spellings() {
        assert_eq!(canonical_field("rsi"), "RSI");
        assert_eq!(canonical_field(" Current_Price "), "current_price");
        assert_eq!(canonical_field("Moon_Phase"), canonical_field("moon_phase"));
    }

    #[test]
    fn categorical_fields_only_support_equals() {
        let d = field_domain("sector").unwrap();
        assert_eq!(d.operators, &[Operator::Equals]);
        assert_eq!(d.value_type, ValueType::String);
    }

    #[test]
    fn every_dependency_target_is_registered() {
        for (composite, deps) in INDICATOR_DEPENDENCIES.iter() {
            assert!(indicator_rule(composite).is_some(), "{composite} unregistered");
            for dep in deps.iter() {
                assert!(indicator_rule(dep).is_some(), "{dep} unregistered");
            }
        }
    }

    #[test]
    fn risk_fields_are_classified() {
        assert!(is_risk_field("stop_loss"));
        assert!(is_risk_field("safety_line"));
        assert!(!is_risk_field("current_price"));
    }
}

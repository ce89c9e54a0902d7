//! Interest terms: benchmark, spread and payment frequency

use crate::DomainError;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Largest accepted spread magnitude, in basis points
pub const MAX_SPREAD_BPS: i64 = 10_000;

/// Time period units for frequency calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum PeriodUnit {
    /// Daily
    Day,
    /// Weekly
    Week,
    /// Monthly
    Month,
    /// Yearly
    Year,
}

/// A payment or calculation frequency, e.g. every 3 months
///
/// The multiplier is always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "RawFrequency")]
pub struct Frequency {
    period: PeriodUnit,
    #[schemars(range(min = 1))]
    period_multiplier: u32,
}

#[derive(Deserialize, JsonSchema)]
struct RawFrequency {
    period: PeriodUnit,
    #[schemars(range(min = 1))]
    period_multiplier: i64,
}

impl TryFrom<RawFrequency> for Frequency {
    type Error = DomainError;

    fn try_from(raw: RawFrequency) -> Result<Self, Self::Error> {
        Frequency::new(raw.period, raw.period_multiplier)
    }
}

impl Frequency {
    /// Create a frequency, rejecting non-positive multipliers
    pub fn new(period: PeriodUnit, period_multiplier: i64) -> Result<Self, DomainError> {
        if period_multiplier <= 0 || period_multiplier > i64::from(u32::MAX) {
            return Err(DomainError::InvalidPeriodMultiplier(period_multiplier));
        }
        Ok(Self {
            period,
            period_multiplier: period_multiplier as u32,
        })
    }

    /// The period unit
    pub fn period(&self) -> PeriodUnit {
        self.period
    }

    /// The number of periods between payments
    pub fn period_multiplier(&self) -> u32 {
        self.period_multiplier
    }
}

/// Floating rate index plus margin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "RawFloatingRateOption")]
pub struct FloatingRateOption {
    benchmark: String,
    #[schemars(schema_with = "crate::schema::spread_bps")]
    spread_bps: Decimal,
}

#[derive(Deserialize, JsonSchema)]
struct RawFloatingRateOption {
    benchmark: String,
    #[schemars(schema_with = "crate::schema::spread_bps")]
    spread_bps: Decimal,
}

impl TryFrom<RawFloatingRateOption> for FloatingRateOption {
    type Error = DomainError;

    fn try_from(raw: RawFloatingRateOption) -> Result<Self, Self::Error> {
        FloatingRateOption::new(raw.benchmark, raw.spread_bps)
    }
}

impl FloatingRateOption {
    /// Create a rate option; the spread must lie in [-10000, 10000] bps
    pub fn new(benchmark: impl Into<String>, spread_bps: Decimal) -> Result<Self, DomainError> {
        let limit = Decimal::from(MAX_SPREAD_BPS);
        if spread_bps < -limit || spread_bps > limit {
            return Err(DomainError::SpreadOutOfRange(spread_bps));
        }
        Ok(Self {
            benchmark: benchmark.into(),
            spread_bps,
        })
    }

    /// Benchmark name, e.g. "Term SOFR"
    pub fn benchmark(&self) -> &str {
        &self.benchmark
    }

    /// Margin over the benchmark in basis points
    pub fn spread_bps(&self) -> Decimal {
        self.spread_bps
    }
}

/// Interest rate structure and payment frequency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InterestRatePayout {
    /// Benchmark and spread
    pub rate_option: FloatingRateOption,

    /// How often interest is paid
    pub payment_frequency: Frequency,
}

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Longest horizon the planner accepts.
pub const MAX_PROJECTION_YEARS: u32 = 100;

/// Inputs of the real-estate return planner.
///
/// Rates are fractions (0.05 = 5%). `years` is unsigned, so a negative
/// horizon cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionParams {
    pub principal: f64,
    pub years: u32,
    pub appreciation_rate: f64,
    pub rent_yield: f64,
    pub expense_rate: f64,
}

impl ProjectionParams {
    pub fn new(
        principal: f64,
        years: u32,
        appreciation_rate: f64,
        rent_yield: f64,
        expense_rate: f64,
    ) -> Self {
        Self {
            principal,
            years,
            appreciation_rate,
            rent_yield,
            expense_rate,
        }
    }

    /// Check the inputs the way the planner form does before projecting.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Investment amount must be a positive number, got {}",
                self.principal
            )));
        }
        if self.years > MAX_PROJECTION_YEARS {
            return Err(CoreError::ValidationError(format!(
                "Projection horizon of {} years exceeds maximum of {MAX_PROJECTION_YEARS}",
                self.years
            )));
        }
        for (name, rate) in [
            ("appreciation rate", self.appreciation_rate),
            ("rent yield", self.rent_yield),
            ("expense rate", self.expense_rate),
        ] {
            if !rate.is_finite() {
                return Err(CoreError::ValidationError(format!(
                    "The {name} must be a finite number"
                )));
            }
        }
        if self.appreciation_rate <= -1.0 {
            return Err(CoreError::ValidationError(
                "The appreciation rate must be greater than -100%".into(),
            ));
        }
        Ok(())
    }
}

/// One year of the projection. Monetary fields are rounded to whole units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRow {
    pub year: u32,
    pub property_value: f64,
    pub rent_income: f64,
    pub expenses: f64,
    pub net_cashflow: f64,
    pub cumulative_total: f64,
}

/// Headline numbers for the end of a projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub principal: f64,
    pub final_property_value: f64,
    pub total_net_cashflow: f64,
    pub final_total: f64,

    /// `final_total - principal`
    pub total_gain: f64,

    /// `total_gain / principal * 100`
    pub roi_pct: f64,
}

impl ProjectionSummary {
    /// Summarize a projection. Returns `None` for an empty row set.
    pub fn from_rows(rows: &[ProjectionRow]) -> Option<Self> {
        let first = rows.first()?;
        let last = rows.last()?;
        let principal = first.property_value;
        let total_net_cashflow: f64 = rows.iter().skip(1).map(|r| r.net_cashflow).sum();
        let total_gain = last.cumulative_total - principal;
        let roi_pct = if principal > 0.0 {
            total_gain / principal * 100.0
        } else {
            0.0
        };
        Some(Self {
            principal,
            final_property_value: last.property_value,
            total_net_cashflow,
            final_total: last.cumulative_total,
            total_gain,
            roi_pct,
        })
    }
}

use crate::errors::CoreError;
use crate::models::projection::{ProjectionParams, ProjectionRow};

/// Year-by-year compounding projection for the real-estate planner.
///
/// - property value compounds at `appreciation_rate`
/// - rent and expenses are flat fractions of the *original* principal
/// - cumulative total = property value + all net cash flow so far
///
/// Compounding runs on unrounded values; each emitted row is rounded to
/// whole units.
pub struct ReturnProjector;

impl ReturnProjector {
    /// Validate the inputs, then project.
    pub fn project_checked(params: &ProjectionParams) -> Result<Vec<ProjectionRow>, CoreError> {
        params.validate()?;
        Ok(Self::project(params))
    }

    /// Rows for years `0..=params.years`. No validation or clamping.
    pub fn project(params: &ProjectionParams) -> Vec<ProjectionRow> {
        let principal = params.principal;
        let rent_income = principal * params.rent_yield;
        let expenses = principal * params.expense_rate;
        let net_cashflow = rent_income - expenses;

        let mut rows = Vec::with_capacity(params.years as usize + 1);
        rows.push(ProjectionRow {
            year: 0,
            property_value: principal.round(),
            rent_income: 0.0,
            expenses: 0.0,
            net_cashflow: 0.0,
            cumulative_total: principal.round(),
        });

        let mut property_value = principal;
        let mut cashflow_to_date = 0.0;
        for year in 1..=params.years {
            property_value *= 1.0 + params.appreciation_rate;
            cashflow_to_date += net_cashflow;
            rows.push(ProjectionRow {
                year,
                property_value: property_value.round(),
                rent_income: rent_income.round(),
                expenses: expenses.round(),
                net_cashflow: net_cashflow.round(),
                cumulative_total: (property_value + cashflow_to_date).round(),
            });
        }
        rows
    }
}

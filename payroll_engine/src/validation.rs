//! Input validation at the edges of the calculator.
//!
//! The calculator in [`engine`](crate::engine) accepts any numbers and
//! never fails.  The checks here are applied where values enter the
//! system (manual deduction edits, component configuration, payroll
//! submission) and report problems as [`ValidationError`]s.

use crate::models::{ManualDeductions, PayrollComponent, PayrollRecord};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Gaji Pokok harus lebih dari 0")]
    BasicSalaryNotPositive,

    #[error("`{field}` must not be negative")]
    NegativeAmount { field: &'static str },

    #[error("manual deductions of {requested} exceed the net salary of {available}")]
    ManualDeductionExceedsNet { requested: f64, available: f64 },

    #[error("component `{name}` is invalid: {reason}")]
    InvalidComponent { name: String, reason: &'static str },
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    // NaN fails this check too.
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NegativeAmount { field })
    }
}

/// Checks a record about to be submitted to the backend.
pub fn validate_submission(record: &PayrollRecord) -> Result<(), ValidationError> {
    if record.basic_salary.is_nan() || record.basic_salary <= 0.0 {
        return Err(ValidationError::BasicSalaryNotPositive);
    }
    let fields = [
        ("position_allowance", record.position_allowance),
        ("management_allowance", record.management_allowance),
        ("phone_allowance", record.phone_allowance),
        ("incentive_allowance", record.incentive_allowance),
        ("overtime_allowance", record.overtime_allowance),
        ("kasbon", record.kasbon),
        ("telat", record.telat),
        ("angsuran_kredit", record.angsuran_kredit),
    ];
    for (field, value) in fields {
        non_negative(field, value)?;
    }
    Ok(())
}

/// Checks a component loaded from configuration.
pub fn validate_component(component: &PayrollComponent) -> Result<(), ValidationError> {
    let invalid = |reason| ValidationError::InvalidComponent {
        name: component.name.clone(),
        reason,
    };
    if component.name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }
    if non_negative("percentage", component.percentage).is_err() {
        return Err(invalid("percentage is negative"));
    }
    if non_negative("amount", component.amount).is_err() {
        return Err(invalid("amount is negative"));
    }
    Ok(())
}

/// Checks every component of a configuration, stopping at the first
/// invalid one.
pub fn validate_components(components: &[PayrollComponent]) -> Result<(), ValidationError> {
    components.iter().try_for_each(validate_component)
}

/// Checks manual deductions against the net salary they come out of.
///
/// `available` is the net salary before manual deductions; see
/// [`net_before_manual`](crate::engine::net_before_manual).
pub fn check_manual_deductions(
    manual: &ManualDeductions,
    available: f64,
) -> Result<(), ValidationError> {
    non_negative("kasbon", manual.kasbon)?;
    non_negative("telat", manual.telat)?;
    non_negative("angsuran_kredit", manual.angsuran_kredit)?;
    let requested = manual.total();
    if requested > available {
        return Err(ValidationError::ManualDeductionExceedsNet {
            requested,
            available,
        });
    }
    Ok(())
}

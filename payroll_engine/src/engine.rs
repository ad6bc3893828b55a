//! Payroll computation engine.
//!
//! The `engine` module turns a basic salary, a set of configured
//! [`PayrollComponent`]s and the manually entered deductions into a
//! [`PayrollRecord`].  The calculation is split in two pure steps:
//! [`calculate_components`] resolves every active component to an
//! amount, and [`aggregate`] folds those amounts into subtotals and the
//! named record fields.  [`recompute`] chains both and is meant to be
//! called again from scratch whenever any input changes.
//!
//! [`run_payroll`] applies the same calculation to many employees at
//! once, using the [`rayon`] crate to spread the work across CPU cores.

use crate::keys::ComponentKey;
use crate::models::{
    CalculatedComponent, ComponentCategory, ComponentType, EmployeePayrollResult,
    ManualDeductions, PayrollComponent, PayrollInput, PayrollRecord, PayrollRunInput,
    PayrollRunResult,
};
use crate::validation::{
    check_manual_deductions, validate_components, validate_submission, ValidationError,
};
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info};

/// Resolves each active component to a monetary amount.
///
/// Returns an empty list when `basic_salary` is not positive.  A
/// positive percentage takes precedence over a fixed amount.  Input
/// order is preserved and nothing is deduplicated.
pub fn calculate_components(
    basic_salary: f64,
    components: &[PayrollComponent],
) -> Vec<CalculatedComponent> {
    if basic_salary <= 0.0 {
        return Vec::new();
    }
    components
        .iter()
        .filter(|component| component.is_active)
        .map(|component| {
            let (amount, is_percentage) = if component.percentage > 0.0 {
                (basic_salary * component.percentage / 100.0, true)
            } else if component.amount > 0.0 {
                (component.amount, false)
            } else {
                (0.0, false)
            };
            CalculatedComponent {
                name: component.name.clone(),
                key: component.resolved_key(),
                component_type: component.component_type,
                amount,
                percentage: component.percentage,
                is_percentage,
                category: component.category,
            }
        })
        .collect()
}

fn slice_sum(
    calculated: &[CalculatedComponent],
    component_type: ComponentType,
    category: ComponentCategory,
) -> f64 {
    calculated
        .iter()
        .filter(|c| c.component_type == component_type && c.category == category)
        .map(|c| c.amount)
        .sum()
}

fn field_mut(record: &mut PayrollRecord, key: ComponentKey) -> &mut f64 {
    match key {
        ComponentKey::PositionAllowance => &mut record.position_allowance,
        ComponentKey::ManagementAllowance => &mut record.management_allowance,
        ComponentKey::PhoneAllowance => &mut record.phone_allowance,
        ComponentKey::IncentiveAllowance => &mut record.incentive_allowance,
        ComponentKey::OvertimeAllowance => &mut record.overtime_allowance,
        ComponentKey::BpjsHealthCompany => &mut record.bpjs_health_company,
        ComponentKey::BpjsHealthEmployee => &mut record.bpjs_health_employee,
        ComponentKey::BpjsJhtCompany => &mut record.bpjs_jht_company,
        ComponentKey::BpjsJhtEmployee => &mut record.bpjs_jht_employee,
        ComponentKey::BpjsJkkCompany => &mut record.bpjs_jkk_company,
        ComponentKey::BpjsJkmCompany => &mut record.bpjs_jkm_company,
        ComponentKey::BpjsPensionCompany => &mut record.bpjs_pension_company,
        ComponentKey::BpjsPensionEmployee => &mut record.bpjs_pension_employee,
    }
}

/// Folds calculated components and manual deductions into a record.
///
/// Never fails: a named field with no matching component stays at
/// zero.  Only the first component mapped to a given key fills that
/// field; later ones are reported in `unmapped_components` but still
/// count towards their slice subtotal.
pub fn aggregate(
    basic_salary: f64,
    calculated: &[CalculatedComponent],
    manual: &ManualDeductions,
) -> PayrollRecord {
    use ComponentCategory::{Allowance, Bpjs};
    use ComponentType::{Deduction, Income};

    let total_allowances = slice_sum(calculated, Income, Allowance);
    let company_contributions = slice_sum(calculated, Income, Bpjs);
    let employee_deductions = slice_sum(calculated, Deduction, Bpjs);

    let total_manual_deductions = manual.total();
    let total_deductions = employee_deductions + total_manual_deductions;
    let total_pendapatan = basic_salary + total_allowances + company_contributions;

    let mut record = PayrollRecord {
        basic_salary,
        total_bpjs_company: company_contributions,
        total_bpjs_employee: employee_deductions,
        kasbon: manual.kasbon,
        telat: manual.telat,
        angsuran_kredit: manual.angsuran_kredit,
        total_manual_deductions,
        total_allowances,
        total_deductions,
        total_pendapatan,
        gross_salary: basic_salary + total_allowances,
        net_salary: total_pendapatan - total_deductions,
        components: calculated.to_vec(),
        ..Default::default()
    };

    let mut filled = HashSet::new();
    for component in calculated {
        match component.key {
            Some(key)
                if key.expected_type() == component.component_type && filled.insert(key) =>
            {
                *field_mut(&mut record, key) = component.amount;
            }
            _ => {
                debug!(name = %component.name, "component feeds no named payroll field");
                record.unmapped_components.push(component.name.clone());
            }
        }
    }
    record
}

/// Net salary before manual deductions: total income minus the
/// employee-paid BPJS.  Manual deductions may not exceed this.
pub fn net_before_manual(record: &PayrollRecord) -> f64 {
    record.total_pendapatan - record.total_bpjs_employee
}

/// Recomputes a whole record from its inputs.
pub fn recompute(input: &PayrollInput) -> PayrollRecord {
    let calculated = calculate_components(input.basic_salary, &input.components);
    let mut record = aggregate(input.basic_salary, &calculated, &input.manual_deductions);
    record.employee_id = input.employee_id.clone();
    record.period = input.period.clone();
    record
}

/// Runs a payroll for many employees against one component set.
///
/// Fails only when the component configuration itself is invalid.
/// Employees whose entry does not pass validation get an `error` in
/// their result instead of a record; the rest of the run proceeds.
pub fn run_payroll(input: PayrollRunInput) -> Result<PayrollRunResult, ValidationError> {
    validate_components(&input.components)?;
    info!(
        employees = input.employees.len(),
        components = input.components.len(),
        "running payroll"
    );

    let period = input.period;
    let components = input.components;

    let results: Vec<EmployeePayrollResult> = input
        .employees
        .into_par_iter()
        .map(|employee| {
            let basic_salary = employee.basic_salary;
            let manual = employee.manual_deductions;
            let calculated = calculate_components(basic_salary, &components);
            let base = aggregate(basic_salary, &calculated, &ManualDeductions::default());
            let outcome = check_manual_deductions(&manual, net_before_manual(&base))
                .map(|()| {
                    let mut record = aggregate(basic_salary, &calculated, &manual);
                    record.employee_id = Some(employee.employee_id.clone());
                    record.period = Some(period.clone());
                    record
                })
                .and_then(|record| validate_submission(&record).map(|()| record));
            match outcome {
                Ok(record) => EmployeePayrollResult {
                    employee_id: employee.employee_id,
                    record: Some(record),
                    error: None,
                },
                Err(err) => EmployeePayrollResult {
                    employee_id: employee.employee_id,
                    record: None,
                    error: Some(err.to_string()),
                },
            }
        })
        .collect();
    Ok(PayrollRunResult { period, results })
}

//! Data models for the Payroll Engine.
//!
//! The `models` module defines the serialisable structs and enums the
//! engine consumes and produces: payroll component configuration,
//! manual deductions entered per payroll run, the per-component
//! calculation result and the aggregate [`PayrollRecord`].  They derive
//! `Serialize` and `Deserialize` so that they can be exchanged with the
//! HR backend as JSON.

use crate::keys::ComponentKey;
use serde::{Deserialize, Serialize};

/// Whether a component adds to or subtracts from pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Income,
    Deduction,
}

/// Grouping used to subtotal components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    Fixed,
    Variable,
    /// Statutory social insurance (BPJS Kesehatan and Ketenagakerjaan).
    Bpjs,
    Allowance,
}

fn default_active() -> bool {
    true
}

/// A configured payroll component, owned by the backend.
///
/// A component expresses its value either as a percentage of the basic
/// salary or as a fixed amount.  When both are set the percentage
/// wins; see [`calculate_components`](crate::engine::calculate_components).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollComponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Display name.  Also used to resolve a [`ComponentKey`] when
    /// `key` is absent.
    pub name: String,
    /// Explicit mapping onto a named payroll field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<ComponentKey>,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub category: ComponentCategory,
    /// Percentage of the basic salary, e.g. `4.0` for 4%.
    #[serde(default)]
    pub percentage: f64,
    /// Fixed amount, used only when `percentage` is zero.
    #[serde(default)]
    pub amount: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PayrollComponent {
    /// The key this component feeds: the explicit `key` if present,
    /// otherwise a lookup of `name` against the canonical labels.
    pub fn resolved_key(&self) -> Option<ComponentKey> {
        self.key.or_else(|| ComponentKey::from_label(&self.name))
    }
}

/// Deductions entered by hand for a single payroll run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualDeductions {
    /// Cash advance.
    pub kasbon: f64,
    /// Lateness penalty.
    pub telat: f64,
    /// Credit installment.
    pub angsuran_kredit: f64,
}

impl ManualDeductions {
    pub fn total(&self) -> f64 {
        self.kasbon + self.telat + self.angsuran_kredit
    }
}

/// A component resolved to a monetary amount for one basic salary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedComponent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<ComponentKey>,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub amount: f64,
    pub percentage: f64,
    /// True when `amount` was derived from `percentage`.
    pub is_percentage: bool,
    pub category: ComponentCategory,
}

/// Salary data the backend keeps per employee.
///
/// Only `basic_salary` feeds a payroll calculation.  The stored
/// allowances are cross-checked against the component-derived ones by
/// [`PayrollDraft::salary_mismatches`](crate::draft::PayrollDraft::salary_mismatches).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalaryRecord {
    pub basic_salary: f64,
    pub position_allowance: f64,
    pub management_allowance: f64,
    pub phone_allowance: f64,
    pub incentive_allowance: f64,
    pub overtime_allowance: f64,
}

/// Defines the start and end dates of a pay period.  Dates are
/// represented as ISO 8601 strings (`YYYY-MM-DD`) for simplicity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// Inclusive start date of the pay period.
    pub start: String,
    /// Inclusive end date of the pay period.
    pub end: String,
}

/// The full payroll breakdown for one employee, as submitted to the
/// backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayrollRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<PayPeriod>,

    pub basic_salary: f64,

    pub position_allowance: f64,
    pub management_allowance: f64,
    pub phone_allowance: f64,
    pub incentive_allowance: f64,
    pub overtime_allowance: f64,

    pub bpjs_health_company: f64,
    pub bpjs_jht_company: f64,
    pub bpjs_jkk_company: f64,
    pub bpjs_jkm_company: f64,
    pub bpjs_pension_company: f64,
    /// Sum of every income/BPJS component, named or not.
    pub total_bpjs_company: f64,

    pub bpjs_health_employee: f64,
    pub bpjs_jht_employee: f64,
    pub bpjs_pension_employee: f64,
    /// Sum of every deduction/BPJS component, named or not.
    pub total_bpjs_employee: f64,

    pub kasbon: f64,
    pub telat: f64,
    pub angsuran_kredit: f64,
    pub total_manual_deductions: f64,

    pub total_allowances: f64,
    pub total_deductions: f64,
    /// Gross income including employer-paid contributions.
    pub total_pendapatan: f64,
    /// Basic salary plus allowances.
    pub gross_salary: f64,
    pub net_salary: f64,

    #[serde(default)]
    pub components: Vec<CalculatedComponent>,
    /// Names of active components that did not map onto a named field.
    /// They still count towards the subtotals of their slice.
    #[serde(default)]
    pub unmapped_components: Vec<String>,
}

/// Everything needed to compute one employee's payroll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayrollInput {
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub period: Option<PayPeriod>,
    pub basic_salary: f64,
    #[serde(default)]
    pub components: Vec<PayrollComponent>,
    #[serde(default)]
    pub manual_deductions: ManualDeductions,
}

/// One employee's entry in a batch payroll run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeePayroll {
    pub employee_id: String,
    pub basic_salary: f64,
    #[serde(default)]
    pub manual_deductions: ManualDeductions,
}

/// Input to a batch payroll run.  All employees share one component
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRunInput {
    pub period: PayPeriod,
    pub components: Vec<PayrollComponent>,
    pub employees: Vec<EmployeePayroll>,
}

/// The per-employee outcome of a batch run.  `error` is set when the
/// employee's entry failed validation; `record` is then absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeePayrollResult {
    pub employee_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<PayrollRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The aggregate result of a payroll run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRunResult {
    /// The pay period that was processed.
    pub period: PayPeriod,
    /// Individual results for each employee, in input order.
    pub results: Vec<EmployeePayrollResult>,
}

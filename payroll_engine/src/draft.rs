//! An editable payroll entry for one employee.
//!
//! [`PayrollDraft`] holds the three inputs of a payroll calculation and
//! recomputes the record from scratch on every read.  Manual deduction
//! edits are guarded: an edit that would push the total above the net
//! salary is rejected and the previous value is kept.

use crate::engine::{net_before_manual, recompute};
use crate::keys::ComponentKey;
use crate::models::{
    ManualDeductions, PayrollComponent, PayrollInput, PayrollRecord, SalaryRecord,
};
use crate::validation::{
    check_manual_deductions, validate_components, validate_submission, ValidationError,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManualDeductionField {
    Kasbon,
    Telat,
    AngsuranKredit,
}

/// An allowance whose stored value in the employee's salary record
/// differs from the amount the components produce.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllowanceMismatch {
    pub key: ComponentKey,
    pub stored: f64,
    pub calculated: f64,
}

// Half a sen.
const MISMATCH_TOLERANCE: f64 = 0.005;

#[derive(Debug, Clone, Default)]
pub struct PayrollDraft {
    input: PayrollInput,
}

impl PayrollDraft {
    pub fn new(basic_salary: f64, components: Vec<PayrollComponent>) -> Self {
        PayrollDraft {
            input: PayrollInput {
                basic_salary,
                components,
                ..Default::default()
            },
        }
    }

    /// Seeds a draft with the basic salary the backend keeps for the
    /// employee.  Allowances always come from the components; stored
    /// allowances that disagree with them are logged.
    pub fn from_salary(salary: &SalaryRecord, components: Vec<PayrollComponent>) -> Self {
        let draft = Self::new(salary.basic_salary, components);
        for mismatch in draft.salary_mismatches(salary) {
            warn!(
                key = ?mismatch.key,
                stored = mismatch.stored,
                calculated = mismatch.calculated,
                "salary record allowance differs from components"
            );
        }
        draft
    }

    /// Compares the allowances stored in `salary` with the ones the
    /// current components produce.
    pub fn salary_mismatches(&self, salary: &SalaryRecord) -> Vec<AllowanceMismatch> {
        let record = self.record();
        [
            (ComponentKey::PositionAllowance, salary.position_allowance, record.position_allowance),
            (
                ComponentKey::ManagementAllowance,
                salary.management_allowance,
                record.management_allowance,
            ),
            (ComponentKey::PhoneAllowance, salary.phone_allowance, record.phone_allowance),
            (
                ComponentKey::IncentiveAllowance,
                salary.incentive_allowance,
                record.incentive_allowance,
            ),
            (ComponentKey::OvertimeAllowance, salary.overtime_allowance, record.overtime_allowance),
        ]
        .into_iter()
        .filter(|(_, stored, calculated)| (stored - calculated).abs() > MISMATCH_TOLERANCE)
        .map(|(key, stored, calculated)| AllowanceMismatch {
            key,
            stored,
            calculated,
        })
        .collect()
    }

    /// Wraps an existing input.  Its manual deductions are taken as-is;
    /// [`submit`](Self::submit) still checks them against the ceiling.
    pub fn from_input(input: PayrollInput) -> Self {
        PayrollDraft { input }
    }

    pub fn input(&self) -> &PayrollInput {
        &self.input
    }

    pub fn manual_deductions(&self) -> ManualDeductions {
        self.input.manual_deductions
    }

    pub fn set_employee_id(&mut self, employee_id: impl Into<String>) {
        self.input.employee_id = Some(employee_id.into());
    }

    pub fn set_basic_salary(&mut self, basic_salary: f64) -> Result<(), ValidationError> {
        if basic_salary.is_nan() || basic_salary < 0.0 {
            return Err(ValidationError::NegativeAmount {
                field: "basic_salary",
            });
        }
        self.input.basic_salary = basic_salary;
        Ok(())
    }

    /// Replaces the component set.  An invalid set is rejected and the
    /// previous one kept.
    pub fn set_components(
        &mut self,
        components: Vec<PayrollComponent>,
    ) -> Result<(), ValidationError> {
        validate_components(&components)?;
        self.input.components = components;
        Ok(())
    }

    /// Net salary with no manual deductions applied.
    pub fn available_for_manual_deductions(&self) -> f64 {
        let without_manual = PayrollInput {
            manual_deductions: ManualDeductions::default(),
            ..self.input.clone()
        };
        net_before_manual(&recompute(&without_manual))
    }

    /// Updates one manual deduction.  On rejection the stored values
    /// are left untouched.
    pub fn set_manual_deduction(
        &mut self,
        field: ManualDeductionField,
        value: f64,
    ) -> Result<(), ValidationError> {
        let mut updated = self.input.manual_deductions;
        match field {
            ManualDeductionField::Kasbon => updated.kasbon = value,
            ManualDeductionField::Telat => updated.telat = value,
            ManualDeductionField::AngsuranKredit => updated.angsuran_kredit = value,
        }
        let available = self.available_for_manual_deductions();
        if let Err(err) = check_manual_deductions(&updated, available) {
            warn!(?field, value, error = %err, "manual deduction edit rejected");
            return Err(err);
        }
        self.input.manual_deductions = updated;
        Ok(())
    }

    pub fn record(&self) -> PayrollRecord {
        recompute(&self.input)
    }

    /// Produces the record to send to the backend, or the first
    /// validation problem found.
    pub fn submit(&self) -> Result<PayrollRecord, ValidationError> {
        validate_components(&self.input.components)?;
        let available = self.available_for_manual_deductions();
        check_manual_deductions(&self.input.manual_deductions, available)?;
        let record = self.record();
        validate_submission(&record)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComponentCategory, ComponentType};

    fn bpjs_employee(percentage: f64) -> PayrollComponent {
        PayrollComponent {
            id: None,
            name: "BPJS Kesehatan (Karyawan)".into(),
            key: None,
            component_type: ComponentType::Deduction,
            category: ComponentCategory::Bpjs,
            percentage,
            amount: 0.0,
            is_active: true,
            description: None,
        }
    }

    #[test]
    fn rejected_edit_keeps_previous_values() {
        let mut draft = PayrollDraft::new(1_000_000.0, vec![bpjs_employee(1.0)]);
        assert_eq!(draft.available_for_manual_deductions(), 990_000.0);

        draft.set_manual_deduction(ManualDeductionField::Kasbon, 500_000.0).unwrap();
        draft.set_manual_deduction(ManualDeductionField::Telat, 400_000.0).unwrap();

        let err = draft
            .set_manual_deduction(ManualDeductionField::AngsuranKredit, 100_000.0)
            .unwrap_err();
        assert!(matches!(err, ValidationError::ManualDeductionExceedsNet { .. }));
        assert_eq!(
            draft.manual_deductions(),
            ManualDeductions {
                kasbon: 500_000.0,
                telat: 400_000.0,
                angsuran_kredit: 0.0,
            }
        );
        assert_eq!(draft.record().net_salary, 90_000.0);
    }

    #[test]
    fn lowering_a_deduction_is_always_allowed() {
        let mut draft = PayrollDraft::new(100.0, Vec::new());
        draft.set_manual_deduction(ManualDeductionField::Kasbon, 100.0).unwrap();
        draft.set_manual_deduction(ManualDeductionField::Kasbon, 40.0).unwrap();
        assert_eq!(draft.record().net_salary, 60.0);
    }

    #[test]
    fn record_follows_basic_salary_changes() {
        let mut draft = PayrollDraft::new(1_000_000.0, vec![bpjs_employee(1.0)]);
        draft.set_basic_salary(2_000_000.0).unwrap();
        assert_eq!(draft.record().total_bpjs_employee, 20_000.0);
        assert!(draft.set_basic_salary(-1.0).is_err());
        assert_eq!(draft.input().basic_salary, 2_000_000.0);
    }

    #[test]
    fn submit_requires_positive_basic_salary() {
        let salary = SalaryRecord::default();
        let draft = PayrollDraft::from_salary(&salary, Vec::new());
        assert_eq!(draft.submit(), Err(ValidationError::BasicSalaryNotPositive));
    }

    #[test]
    fn submit_rechecks_deductions_from_raw_input() {
        let input = PayrollInput {
            basic_salary: 1_000.0,
            manual_deductions: ManualDeductions {
                kasbon: 1_500.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let draft = PayrollDraft::from_input(input);
        assert!(matches!(
            draft.submit(),
            Err(ValidationError::ManualDeductionExceedsNet { .. })
        ));
    }

    #[test]
    fn submit_rejects_invalid_components() {
        let mut negative = bpjs_employee(0.0);
        negative.name = "BPJS JHT (Karyawan)".into();
        negative.percentage = -2.0;
        let draft = PayrollDraft::new(1_000_000.0, vec![bpjs_employee(1.0), negative]);
        assert!(matches!(
            draft.submit(),
            Err(ValidationError::InvalidComponent { .. })
        ));
    }

    #[test]
    fn invalid_component_set_is_not_applied() {
        let mut draft = PayrollDraft::new(1_000_000.0, vec![bpjs_employee(1.0)]);
        let mut unnamed = bpjs_employee(1.0);
        unnamed.name = " ".into();
        assert!(draft.set_components(vec![unnamed]).is_err());
        assert_eq!(draft.input().components, vec![bpjs_employee(1.0)]);
        draft.set_components(Vec::new()).unwrap();
        assert_eq!(draft.record().net_salary, 1_000_000.0);
    }

    #[test]
    fn stored_allowances_are_compared_with_components() {
        let position = PayrollComponent {
            id: None,
            name: "Tunjangan Jabatan".into(),
            key: None,
            component_type: ComponentType::Income,
            category: ComponentCategory::Allowance,
            percentage: 0.0,
            amount: 500_000.0,
            is_active: true,
            description: None,
        };
        let salary = SalaryRecord {
            basic_salary: 5_000_000.0,
            position_allowance: 500_000.0,
            phone_allowance: 100_000.0,
            ..Default::default()
        };
        let draft = PayrollDraft::from_salary(&salary, vec![position]);
        assert_eq!(draft.input().basic_salary, 5_000_000.0);
        assert_eq!(
            draft.salary_mismatches(&salary),
            vec![AllowanceMismatch {
                key: ComponentKey::PhoneAllowance,
                stored: 100_000.0,
                calculated: 0.0,
            }]
        );
    }

    #[test]
    fn submit_returns_the_recomputed_record() {
        let mut draft = PayrollDraft::new(5_000_000.0, vec![bpjs_employee(1.0)]);
        draft.set_employee_id("EMP-7");
        let record = draft.submit().unwrap();
        assert_eq!(record.employee_id.as_deref(), Some("EMP-7"));
        assert_eq!(record.net_salary, 4_950_000.0);
    }
}

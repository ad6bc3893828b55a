//! Stable identifiers for payroll components.
//!
//! Named fields of a [`PayrollRecord`](crate::models::PayrollRecord)
//! (position allowance, company-paid BPJS Kesehatan, ...) are filled
//! from components carrying a [`ComponentKey`].  Components configured
//! before keys existed only have a display name; for those the engine
//! falls back to [`ComponentKey::from_label`], an exact match on the
//! canonical Indonesian labels.

use crate::models::ComponentType;
use serde::{Deserialize, Serialize};

/// Identifies which named payroll field a component feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKey {
    PositionAllowance,
    ManagementAllowance,
    PhoneAllowance,
    IncentiveAllowance,
    OvertimeAllowance,
    BpjsHealthCompany,
    BpjsHealthEmployee,
    BpjsJhtCompany,
    BpjsJhtEmployee,
    BpjsJkkCompany,
    BpjsJkmCompany,
    BpjsPensionCompany,
    BpjsPensionEmployee,
}

impl ComponentKey {
    pub const ALL: [ComponentKey; 13] = [
        ComponentKey::PositionAllowance,
        ComponentKey::ManagementAllowance,
        ComponentKey::PhoneAllowance,
        ComponentKey::IncentiveAllowance,
        ComponentKey::OvertimeAllowance,
        ComponentKey::BpjsHealthCompany,
        ComponentKey::BpjsHealthEmployee,
        ComponentKey::BpjsJhtCompany,
        ComponentKey::BpjsJhtEmployee,
        ComponentKey::BpjsJkkCompany,
        ComponentKey::BpjsJkmCompany,
        ComponentKey::BpjsPensionCompany,
        ComponentKey::BpjsPensionEmployee,
    ];

    /// Canonical display label, as used in component configuration.
    pub fn label(self) -> &'static str {
        match self {
            ComponentKey::PositionAllowance => "Tunjangan Jabatan",
            ComponentKey::ManagementAllowance => "Tunjangan Manajemen",
            ComponentKey::PhoneAllowance => "Tunjangan Telepon",
            ComponentKey::IncentiveAllowance => "Tunjangan Insentif",
            ComponentKey::OvertimeAllowance => "Tunjangan Lembur",
            ComponentKey::BpjsHealthCompany => "BPJS Kesehatan (Perusahaan)",
            ComponentKey::BpjsHealthEmployee => "BPJS Kesehatan (Karyawan)",
            ComponentKey::BpjsJhtCompany => "BPJS JHT (Perusahaan)",
            ComponentKey::BpjsJhtEmployee => "BPJS JHT (Karyawan)",
            ComponentKey::BpjsJkkCompany => "BPJS JKK (Perusahaan)",
            ComponentKey::BpjsJkmCompany => "BPJS JKM (Perusahaan)",
            ComponentKey::BpjsPensionCompany => "BPJS Jaminan Pensiun (Perusahaan)",
            ComponentKey::BpjsPensionEmployee => "BPJS Jaminan Pensiun (Karyawan)",
        }
    }

    /// Looks up a key by its exact canonical label.  Matching is
    /// case-sensitive and does not trim whitespace.
    pub fn from_label(label: &str) -> Option<ComponentKey> {
        Self::ALL.into_iter().find(|key| key.label() == label)
    }

    /// The component type a key may be fed by.  Allowances and
    /// company-paid BPJS are income; employee-paid BPJS is a deduction.
    pub fn expected_type(self) -> ComponentType {
        match self {
            ComponentKey::BpjsHealthEmployee
            | ComponentKey::BpjsJhtEmployee
            | ComponentKey::BpjsPensionEmployee => ComponentType::Deduction,
            _ => ComponentType::Income,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_lookup() {
        for key in ComponentKey::ALL {
            assert_eq!(ComponentKey::from_label(key.label()), Some(key));
        }
    }

    #[test]
    fn lookup_is_exact() {
        assert_eq!(ComponentKey::from_label("tunjangan jabatan"), None);
        assert_eq!(ComponentKey::from_label(" Tunjangan Jabatan"), None);
        assert_eq!(ComponentKey::from_label("BPJS Kesehatan"), None);
    }

    #[test]
    fn employee_side_bpjs_is_a_deduction() {
        assert_eq!(
            ComponentKey::BpjsJhtEmployee.expected_type(),
            ComponentType::Deduction
        );
        assert_eq!(
            ComponentKey::BpjsJhtCompany.expected_type(),
            ComponentType::Income
        );
        assert_eq!(
            ComponentKey::OvertimeAllowance.expected_type(),
            ComponentType::Income
        );
    }

    #[test]
    fn serialises_as_snake_case() {
        let json = serde_json::to_string(&ComponentKey::BpjsJkkCompany).unwrap();
        assert_eq!(json, "\"bpjs_jkk_company\"");
    }
}

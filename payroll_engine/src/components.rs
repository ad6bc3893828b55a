//! Loading payroll component configuration.
//!
//! Components are normally owned by the HR backend.  For standalone
//! use the engine reads them from JSON: either a single file holding an
//! array of [`PayrollComponent`]s, or a directory of such files.  When
//! nothing is configured, [`default_components`] supplies the standard
//! BPJS contribution rates.

use crate::keys::ComponentKey;
use crate::models::{ComponentCategory, ComponentType, PayrollComponent};
use crate::validation::validate_component;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

fn parse_file(path: &Path) -> Result<Vec<PayrollComponent>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let components = serde_json::from_str::<Vec<PayrollComponent>>(&data)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(components)
}

/// Load component definitions from a file or directory.
///
/// A directory is scanned (non-recursively) for `.json` files; files
/// that fail to parse are skipped with a warning, in file-name order.
/// A single file that fails to parse is an error.  Components that
/// fail [`validate_component`] are dropped with a warning either way.
pub fn load_components_from_path(path: &Path) -> Result<Vec<PayrollComponent>> {
    let mut components = Vec::new();
    if path.is_dir() {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_file()
                && entry.path().extension().is_some_and(|ext| ext == "json")
            {
                files.push(entry.path());
            }
        }
        files.sort();
        for file in files {
            match parse_file(&file) {
                Ok(parsed) => components.extend(parsed),
                Err(err) => warn!(path = %file.display(), error = %err, "skipping component file"),
            }
        }
    } else {
        components = parse_file(path)?;
    }

    components.retain(|component| match validate_component(component) {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "dropping component");
            false
        }
    });
    info!(count = components.len(), path = %path.display(), "loaded payroll components");
    Ok(components)
}

fn bpjs(key: ComponentKey, percentage: f64, description: &str) -> PayrollComponent {
    PayrollComponent {
        id: None,
        name: key.label().to_string(),
        key: Some(key),
        component_type: key.expected_type(),
        category: ComponentCategory::Bpjs,
        percentage,
        amount: 0.0,
        is_active: true,
        description: Some(description.to_string()),
    }
}

/// Statutory BPJS contributions at their standard rates.  JKK uses the
/// lowest risk class (0.24%).
pub fn default_components() -> Vec<PayrollComponent> {
    vec![
        bpjs(ComponentKey::BpjsHealthCompany, 4.0, "BPJS Kesehatan, employer share"),
        bpjs(ComponentKey::BpjsHealthEmployee, 1.0, "BPJS Kesehatan, employee share"),
        bpjs(ComponentKey::BpjsJhtCompany, 3.7, "Jaminan Hari Tua, employer share"),
        bpjs(ComponentKey::BpjsJhtEmployee, 2.0, "Jaminan Hari Tua, employee share"),
        bpjs(ComponentKey::BpjsJkkCompany, 0.24, "Jaminan Kecelakaan Kerja"),
        bpjs(ComponentKey::BpjsJkmCompany, 0.3, "Jaminan Kematian"),
        bpjs(ComponentKey::BpjsPensionCompany, 2.0, "Jaminan Pensiun, employer share"),
        bpjs(ComponentKey::BpjsPensionEmployee, 1.0, "Jaminan Pensiun, employee share"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{aggregate, calculate_components};
    use crate::models::ManualDeductions;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("payroll_engine_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn defaults_split_by_payer() {
        let components = default_components();
        let calculated = calculate_components(10_000_000.0, &components);
        let record = aggregate(10_000_000.0, &calculated, &ManualDeductions::default());
        assert!((record.total_bpjs_company - 1_024_000.0).abs() < 1e-6);
        assert!((record.total_bpjs_employee - 400_000.0).abs() < 1e-6);
        assert_eq!(record.bpjs_health_company, 400_000.0);
        assert!(record.unmapped_components.is_empty());
    }

    #[test]
    fn loads_a_directory_and_skips_bad_files() {
        let dir = scratch_dir("dir");
        std::fs::write(
            dir.join("allowances.json"),
            r#"[{"name": "Tunjangan Jabatan", "type": "income", "category": "allowance",
                 "amount": 500000}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("bpjs.json"),
            r#"[{"name": "BPJS JKM (Perusahaan)", "type": "income", "category": "bpjs",
                 "percentage": 0.3},
                {"name": "Rusak", "type": "income", "category": "bpjs", "percentage": -1}]"#,
        )
        .unwrap();
        std::fs::write(dir.join("broken.json"), "not json").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let components = load_components_from_path(&dir).unwrap();
        let names: Vec<&str> = components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Tunjangan Jabatan", "BPJS JKM (Perusahaan)"]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn sample_configuration_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/components.json");
        let components = load_components_from_path(&path).unwrap();
        assert_eq!(components.len(), 10);
        assert_eq!(components.iter().filter(|c| !c.is_active).count(), 2);
        assert!(components.iter().all(|c| c.key.is_some()));
    }

    #[test]
    fn malformed_single_file_is_an_error() {
        let dir = scratch_dir("file");
        let file = dir.join("components.json");
        std::fs::write(&file, "{").unwrap();
        assert!(load_components_from_path(&file).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}

use std::collections::HashMap;

use super::domain::{DepartmentRecord, GrantBracket, VacationCategoryRecord};

/// Error enumeration for reference-data lookups.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown department code '{0}'")]
    UnknownDepartment(String),
    #[error("unknown vacation category code '{0}'")]
    UnknownVacationCategory(String),
}

/// Code-to-department lookup built from the department reference table at
/// driver start and passed by reference into the roster filter.
#[derive(Debug, Default)]
pub struct DepartmentRegistry {
    by_code: HashMap<String, DepartmentRecord>,
}

impl DepartmentRegistry {
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = DepartmentRecord>,
    {
        Self {
            by_code: records
                .into_iter()
                .map(|record| (record.code.clone(), record))
                .collect(),
        }
    }

    pub fn resolve(&self, code: &str) -> Result<&DepartmentRecord, RegistryError> {
        self.by_code
            .get(code)
            .ok_or_else(|| RegistryError::UnknownDepartment(code.to_string()))
    }

    pub fn is_admin(&self, code: &str) -> Result<bool, RegistryError> {
        self.resolve(code).map(|record| record.is_admin)
    }
}

/// Code-to-vacation-category lookup, same construction discipline as
/// [`DepartmentRegistry`].
#[derive(Debug, Default)]
pub struct VacationCategoryRegistry {
    by_code: HashMap<String, VacationCategoryRecord>,
}

impl VacationCategoryRegistry {
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = VacationCategoryRecord>,
    {
        Self {
            by_code: records
                .into_iter()
                .map(|record| (record.code.clone(), record))
                .collect(),
        }
    }

    pub fn resolve(&self, code: &str) -> Result<&VacationCategoryRecord, RegistryError> {
        self.by_code
            .get(code)
            .ok_or_else(|| RegistryError::UnknownVacationCategory(code.to_string()))
    }
}

/// Tenure-to-grant-days schedule, keyed by employment type. Brackets are
/// kept sorted by minimum tenure so a lookup takes the last bracket the
/// employee has reached.
#[derive(Debug, Default)]
pub struct GrantSchedule {
    by_type: HashMap<String, Vec<GrantBracket>>,
}

impl GrantSchedule {
    pub fn from_brackets<I>(brackets: I) -> Self
    where
        I: IntoIterator<Item = GrantBracket>,
    {
        let mut by_type: HashMap<String, Vec<GrantBracket>> = HashMap::new();
        for bracket in brackets {
            by_type
                .entry(bracket.employment_type.clone())
                .or_default()
                .push(bracket);
        }
        for brackets in by_type.values_mut() {
            brackets.sort_by_key(|bracket| bracket.min_tenure_months);
        }
        Self { by_type }
    }

    /// Granted days for an employee of `employment_type` with
    /// `tenure_months` whole months of service; `None` when no bracket has
    /// been reached or the employment type is not scheduled.
    pub fn days_for(&self, employment_type: &str, tenure_months: u32) -> Option<u32> {
        self.by_type.get(employment_type).and_then(|brackets| {
            brackets
                .iter()
                .rev()
                .find(|bracket| bracket.min_tenure_months <= tenure_months)
                .map(|bracket| bracket.granted_days)
        })
    }
}

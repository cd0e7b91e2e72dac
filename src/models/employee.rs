//! Employee records and the typed filters used to query them.

use crate::error::{Result, StaffdeskError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used in storage, tool arguments and rendered output.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date, naming the field in the error.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        StaffdeskError::InvalidInput(format!(
            "'{}' is not a valid {} (expected YYYY-MM-DD)",
            value, field
        ))
    })
}

/// A row of the `employees` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: String,
    pub company_name: String,
    pub full_name: String,
    pub admission_date: NaiveDate,
    pub termination_date: Option<NaiveDate>,
    pub status_description: String,
    pub birth_date: Option<NaiveDate>,
    pub cost_center_name: String,
    pub salary: f64,
    pub complementary_salary: Option<f64>,
    pub salary_effective_date: Option<NaiveDate>,
    pub gender: String,
    pub street_address: Option<String>,
    pub address_number: Option<String>,
    pub city_name: Option<String>,
    pub race: Option<String>,
    pub postal_code: Option<String>,
    pub company_cod_senior_numemp: Option<i64>,
    pub employee_cod_senior_numcad: Option<i64>,
    pub collaborator_type_code_senior_tipcol: Option<i64>,
    pub status_cod_senior_sitafa: Option<i64>,
    pub cost_center_cod_senior_codccu: Option<i64>,
    pub agent_id: i64,
}

impl Employee {
    /// An employee is active until a termination date is recorded.
    pub fn is_active(&self) -> bool {
        self.termination_date.is_none()
    }

    /// `ACTIVE` or `TERMINATED`.
    pub fn status_label(&self) -> &'static str {
        if self.is_active() {
            "ACTIVE"
        } else {
            "TERMINATED"
        }
    }

    /// The date selected by `field`, if recorded.
    pub fn date(&self, field: DateField) -> Option<NaiveDate> {
        match field {
            DateField::Admission => Some(self.admission_date),
            DateField::Termination => self.termination_date,
            DateField::Birth => self.birth_date,
        }
    }
}

/// Salary projection of an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryInfo {
    pub employee_id: String,
    pub full_name: String,
    pub salary: f64,
    pub complementary_salary: Option<f64>,
    pub salary_effective_date: Option<NaiveDate>,
    pub cost_center_name: String,
}

impl SalaryInfo {
    /// Base plus complementary salary.
    pub fn total(&self) -> f64 {
        self.salary + self.complementary_salary.unwrap_or(0.0)
    }
}

/// Which date column a range query filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateField {
    Admission,
    Termination,
    Birth,
}

impl DateField {
    /// Column holding this date.
    pub fn column(self) -> &'static str {
        match self {
            DateField::Admission => "admission_date",
            DateField::Termination => "termination_date",
            DateField::Birth => "birth_date",
        }
    }
}

impl std::str::FromStr for DateField {
    type Err = StaffdeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "admission" => Ok(DateField::Admission),
            "termination" => Ok(DateField::Termination),
            "birth" => Ok(DateField::Birth),
            _ => Err(StaffdeskError::InvalidInput(
                "Invalid date_type. Use 'admission', 'termination', or 'birth'".to_string(),
            )),
        }
    }
}

impl std::fmt::Display for DateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateField::Admission => write!(f, "admission"),
            DateField::Termination => write!(f, "termination"),
            DateField::Birth => write!(f, "birth"),
        }
    }
}

/// Columns that may be enumerated with distinct-value queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistinctColumn {
    CompanyName,
    CityName,
    CostCenterName,
    Race,
    Gender,
    StatusDescription,
}

impl DistinctColumn {
    pub const ALL: [DistinctColumn; 6] = [
        DistinctColumn::CompanyName,
        DistinctColumn::CityName,
        DistinctColumn::CostCenterName,
        DistinctColumn::Race,
        DistinctColumn::Gender,
        DistinctColumn::StatusDescription,
    ];

    pub fn column(self) -> &'static str {
        match self {
            DistinctColumn::CompanyName => "company_name",
            DistinctColumn::CityName => "city_name",
            DistinctColumn::CostCenterName => "cost_center_name",
            DistinctColumn::Race => "race",
            DistinctColumn::Gender => "gender",
            DistinctColumn::StatusDescription => "status_description",
        }
    }
}

impl std::str::FromStr for DistinctColumn {
    type Err = StaffdeskError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        DistinctColumn::ALL
            .into_iter()
            .find(|c| c.column() == wanted)
            .ok_or_else(|| {
                StaffdeskError::InvalidInput(format!(
                    "Column '{}' is not allowed for distinct analysis",
                    s
                ))
            })
    }
}

impl std::fmt::Display for DistinctColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// A value bound into an assignment clause.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Real(f64),
    Integer(i64),
}

impl From<NaiveDate> for FieldValue {
    fn from(date: NaiveDate) -> Self {
        FieldValue::Text(date.format(DATE_FORMAT).to_string())
    }
}

/// Fields to change on an existing employee. `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeUpdate {
    pub company_name: Option<String>,
    pub full_name: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub termination_date: Option<NaiveDate>,
    pub status_description: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub cost_center_name: Option<String>,
    pub salary: Option<f64>,
    pub complementary_salary: Option<f64>,
    pub salary_effective_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub street_address: Option<String>,
    pub address_number: Option<String>,
    pub city_name: Option<String>,
    pub race: Option<String>,
    pub postal_code: Option<String>,
    pub company_cod_senior_numemp: Option<i64>,
    pub employee_cod_senior_numcad: Option<i64>,
    pub collaborator_type_code_senior_tipcol: Option<i64>,
    pub status_cod_senior_sitafa: Option<i64>,
    pub cost_center_cod_senior_codccu: Option<i64>,
    pub agent_id: Option<i64>,
}

impl EmployeeUpdate {
    pub fn is_empty(&self) -> bool {
        self.assignments().is_empty()
    }

    /// Column/value pairs for every provided field.
    ///
    /// Column names come only from this fixed mapping, never from input.
    pub fn assignments(&self) -> Vec<(&'static str, FieldValue)> {
        let mut out = Vec::new();

        text(&mut out, "company_name", &self.company_name);
        text(&mut out, "full_name", &self.full_name);
        date(&mut out, "admission_date", &self.admission_date);
        date(&mut out, "termination_date", &self.termination_date);
        text(&mut out, "status_description", &self.status_description);
        date(&mut out, "birth_date", &self.birth_date);
        text(&mut out, "cost_center_name", &self.cost_center_name);
        real(&mut out, "salary", &self.salary);
        real(&mut out, "complementary_salary", &self.complementary_salary);
        date(&mut out, "salary_effective_date", &self.salary_effective_date);
        text(&mut out, "gender", &self.gender);
        text(&mut out, "street_address", &self.street_address);
        text(&mut out, "address_number", &self.address_number);
        text(&mut out, "city_name", &self.city_name);
        text(&mut out, "race", &self.race);
        text(&mut out, "postal_code", &self.postal_code);
        int(&mut out, "company_cod_senior_numemp", &self.company_cod_senior_numemp);
        int(&mut out, "employee_cod_senior_numcad", &self.employee_cod_senior_numcad);
        int(
            &mut out,
            "collaborator_type_code_senior_tipcol",
            &self.collaborator_type_code_senior_tipcol,
        );
        int(&mut out, "status_cod_senior_sitafa", &self.status_cod_senior_sitafa);
        int(
            &mut out,
            "cost_center_cod_senior_codccu",
            &self.cost_center_cod_senior_codccu,
        );
        int(&mut out, "agent_id", &self.agent_id);

        out
    }
}

fn text(out: &mut Vec<(&'static str, FieldValue)>, col: &'static str, v: &Option<String>) {
    if let Some(v) = v {
        out.push((col, FieldValue::Text(v.clone())));
    }
}

fn date(out: &mut Vec<(&'static str, FieldValue)>, col: &'static str, v: &Option<NaiveDate>) {
    if let Some(v) = v {
        out.push((col, FieldValue::from(*v)));
    }
}

fn real(out: &mut Vec<(&'static str, FieldValue)>, col: &'static str, v: &Option<f64>) {
    if let Some(v) = v {
        out.push((col, FieldValue::Real(*v)));
    }
}

fn int(out: &mut Vec<(&'static str, FieldValue)>, col: &'static str, v: &Option<i64>) {
    if let Some(v) = v {
        out.push((col, FieldValue::Integer(*v)));
    }
}

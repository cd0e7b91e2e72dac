//! Employee data access.

use crate::db::Database;
use crate::error::{Result, StaffdeskError};
use crate::models::{
    DateField, DistinctColumn, Employee, EmployeeUpdate, FieldValue, SalaryInfo, DATE_FORMAT,
};
use chrono::NaiveDate;
use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, AnyPool, Row};
use tracing::{debug, instrument};

/// Select list shared by every employee query. Dates are read back as text
/// so both backends decode the same way.
const EMPLOYEE_COLUMNS: &str = "employee_id, company_name, full_name, \
    CAST(admission_date AS CHAR) AS admission_date, \
    CAST(termination_date AS CHAR) AS termination_date, \
    status_description, \
    CAST(birth_date AS CHAR) AS birth_date, \
    cost_center_name, salary, complementary_salary, \
    CAST(salary_effective_date AS CHAR) AS salary_effective_date, \
    gender, street_address, address_number, city_name, race, postal_code, \
    company_cod_senior_numemp, employee_cod_senior_numcad, \
    collaborator_type_code_senior_tipcol, status_cod_senior_sitafa, \
    cost_center_cod_senior_codccu, agent_id";

const INSERT_EMPLOYEE: &str = "INSERT INTO employees (\
    employee_id, company_name, full_name, admission_date, termination_date, \
    status_description, birth_date, cost_center_name, salary, complementary_salary, \
    salary_effective_date, gender, street_address, address_number, city_name, race, \
    postal_code, company_cod_senior_numemp, employee_cod_senior_numcad, \
    collaborator_type_code_senior_tipcol, status_cod_senior_sitafa, \
    cost_center_cod_senior_codccu, agent_id) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

/// Default row limit for distinct-value listings.
pub const DEFAULT_DISTINCT_LIMIT: i64 = 100;

/// Queries and mutations over the `employees` table.
#[derive(Clone, Debug)]
pub struct EmployeeRepository {
    pool: AnyPool,
}

impl EmployeeRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Employee>> {
        self.fetch_where("1 = 1", Vec::new()).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_employee_id(&self, employee_id: &str) -> Result<Option<Employee>> {
        let sql = format!("SELECT {} FROM employees WHERE employee_id = ?", EMPLOYEE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(employee_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(employee_from_row).transpose()
    }

    /// Substring match on `full_name`.
    #[instrument(skip(self))]
    pub async fn get_by_name(&self, fragment: &str) -> Result<Vec<Employee>> {
        self.fetch_where(
            "full_name LIKE ?",
            vec![FieldValue::Text(format!("%{}%", fragment))],
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_by_company(&self, company_name: &str) -> Result<Vec<Employee>> {
        self.fetch_where("company_name = ?", vec![FieldValue::Text(company_name.to_string())])
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_by_status(&self, status_description: &str) -> Result<Vec<Employee>> {
        self.fetch_where(
            "status_description = ?",
            vec![FieldValue::Text(status_description.to_string())],
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_by_cost_center(&self, cost_center_name: &str) -> Result<Vec<Employee>> {
        self.fetch_where(
            "cost_center_name = ?",
            vec![FieldValue::Text(cost_center_name.to_string())],
        )
        .await
    }

    /// Employees whose chosen date lies in `[start, end]`.
    #[instrument(skip(self))]
    pub async fn get_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        date_type: DateField,
    ) -> Result<Vec<Employee>> {
        let clause = format!("{} BETWEEN ? AND ?", date_type.column());
        self.fetch_where(&clause, vec![FieldValue::from(start), FieldValue::from(end)])
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_salary_info(&self, employee_id: &str) -> Result<Option<SalaryInfo>> {
        let row = sqlx::query(
            "SELECT employee_id, full_name, salary, complementary_salary, \
             CAST(salary_effective_date AS CHAR) AS salary_effective_date, cost_center_name \
             FROM employees WHERE employee_id = ?",
        )
        .bind(employee_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(SalaryInfo {
                employee_id: row.try_get("employee_id")?,
                full_name: row.try_get("full_name")?,
                salary: row.try_get("salary")?,
                complementary_salary: row.try_get("complementary_salary")?,
                salary_effective_date: optional_date(&row, "salary_effective_date")?,
                cost_center_name: row.try_get("cost_center_name")?,
            })),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<Employee>> {
        self.fetch_where("termination_date IS NULL", Vec::new()).await
    }

    #[instrument(skip(self))]
    pub async fn list_terminated(&self) -> Result<Vec<Employee>> {
        self.fetch_where("termination_date IS NOT NULL", Vec::new())
            .await
    }

    /// Number of distinct non-null values in an allow-listed column.
    #[instrument(skip(self))]
    pub async fn count_distinct(&self, column: DistinctColumn) -> Result<i64> {
        let col = column.column();
        let sql = format!(
            "SELECT COUNT(DISTINCT {col}) FROM employees WHERE {col} IS NOT NULL"
        );
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Sorted distinct non-null values of an allow-listed column.
    #[instrument(skip(self))]
    pub async fn list_distinct(&self, column: DistinctColumn, limit: i64) -> Result<Vec<String>> {
        let col = column.column();
        let sql = format!(
            "SELECT DISTINCT {col} FROM employees WHERE {col} IS NOT NULL ORDER BY {col} LIMIT ?"
        );
        let rows: Vec<(String,)> = sqlx::query_as(&sql)
            .bind(limit.max(0))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(v,)| v).collect())
    }

    #[instrument(skip(self, employee), fields(employee_id = %employee.employee_id))]
    pub async fn add(&self, employee: &Employee) -> Result<()> {
        sqlx::query(INSERT_EMPLOYEE)
            .bind(employee.employee_id.clone())
            .bind(employee.company_name.clone())
            .bind(employee.full_name.clone())
            .bind(format_date(employee.admission_date))
            .bind(employee.termination_date.map(format_date))
            .bind(employee.status_description.clone())
            .bind(employee.birth_date.map(format_date))
            .bind(employee.cost_center_name.clone())
            .bind(employee.salary)
            .bind(employee.complementary_salary)
            .bind(employee.salary_effective_date.map(format_date))
            .bind(employee.gender.clone())
            .bind(employee.street_address.clone())
            .bind(employee.address_number.clone())
            .bind(employee.city_name.clone())
            .bind(employee.race.clone())
            .bind(employee.postal_code.clone())
            .bind(employee.company_cod_senior_numemp)
            .bind(employee.employee_cod_senior_numcad)
            .bind(employee.collaborator_type_code_senior_tipcol)
            .bind(employee.status_cod_senior_sitafa)
            .bind(employee.cost_center_cod_senior_codccu)
            .bind(employee.agent_id)
            .execute(&self.pool)
            .await?;

        debug!("Inserted employee {}", employee.employee_id);
        Ok(())
    }

    /// Apply the provided fields. Returns the number of rows changed.
    #[instrument(skip(self, changes))]
    pub async fn update(&self, employee_id: &str, changes: &EmployeeUpdate) -> Result<u64> {
        let assignments = changes.assignments();
        if assignments.is_empty() {
            return Err(StaffdeskError::InvalidInput(
                "You must provide at least one field to update".to_string(),
            ));
        }

        let set_clause = assignments
            .iter()
            .map(|(col, _)| format!("{} = ?", col))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE employees SET {} WHERE employee_id = ?", set_clause);

        let mut query = sqlx::query(&sql);
        for (_, value) in assignments {
            query = bind_value(query, value);
        }
        let result = query
            .bind(employee_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Hard delete. Returns the number of rows removed.
    #[instrument(skip(self))]
    pub async fn delete(&self, employee_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM employees WHERE employee_id = ?")
            .bind(employee_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn fetch_where(&self, clause: &str, params: Vec<FieldValue>) -> Result<Vec<Employee>> {
        let sql = format!(
            "SELECT {} FROM employees WHERE {} ORDER BY employee_id",
            EMPLOYEE_COLUMNS, clause
        );

        let mut query = sqlx::query(&sql);
        for value in params {
            query = bind_value(query, value);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(employee_from_row).collect()
    }
}

fn bind_value<'q>(
    query: Query<'q, Any, AnyArguments<'q>>,
    value: FieldValue,
) -> Query<'q, Any, AnyArguments<'q>> {
    match value {
        FieldValue::Text(v) => query.bind(v),
        FieldValue::Real(v) => query.bind(v),
        FieldValue::Integer(v) => query.bind(v),
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn stored_date(column: &str, raw: &str) -> Result<NaiveDate> {
    // MySQL may render DATETIME-compatible text; the date part is the first 10 chars.
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).map_err(|_| {
        StaffdeskError::Database(format!("Stored {} '{}' is not a valid date", column, raw))
    })
}

fn optional_date(row: &AnyRow, column: &str) -> Result<Option<NaiveDate>> {
    let raw: Option<String> = row.try_get(column)?;
    raw.as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| stored_date(column, s))
        .transpose()
}

fn employee_from_row(row: &AnyRow) -> Result<Employee> {
    let admission: String = row.try_get("admission_date")?;

    Ok(Employee {
        employee_id: row.try_get("employee_id")?,
        company_name: row.try_get("company_name")?,
        full_name: row.try_get("full_name")?,
        admission_date: stored_date("admission_date", &admission)?,
        termination_date: optional_date(row, "termination_date")?,
        status_description: row.try_get("status_description")?,
        birth_date: optional_date(row, "birth_date")?,
        cost_center_name: row.try_get("cost_center_name")?,
        salary: row.try_get("salary")?,
        complementary_salary: row.try_get("complementary_salary")?,
        salary_effective_date: optional_date(row, "salary_effective_date")?,
        gender: row.try_get("gender")?,
        street_address: row.try_get("street_address")?,
        address_number: row.try_get("address_number")?,
        city_name: row.try_get("city_name")?,
        race: row.try_get("race")?,
        postal_code: row.try_get("postal_code")?,
        company_cod_senior_numemp: row.try_get("company_cod_senior_numemp")?,
        employee_cod_senior_numcad: row.try_get("employee_cod_senior_numcad")?,
        collaborator_type_code_senior_tipcol: row
            .try_get("collaborator_type_code_senior_tipcol")?,
        status_cod_senior_sitafa: row.try_get("status_cod_senior_sitafa")?,
        cost_center_cod_senior_codccu: row.try_get("cost_center_cod_senior_codccu")?,
        agent_id: row.try_get("agent_id")?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    pub(crate) fn sample_employee(id: &str, name: &str) -> Employee {
        Employee {
            employee_id: id.to_string(),
            company_name: "Acme Corp".to_string(),
            full_name: name.to_string(),
            admission_date: date("2023-01-15"),
            termination_date: None,
            status_description: "Working".to_string(),
            birth_date: None,
            cost_center_name: "Engineering".to_string(),
            salary: 75000.0,
            complementary_salary: None,
            salary_effective_date: None,
            gender: "F".to_string(),
            street_address: None,
            address_number: None,
            city_name: None,
            race: None,
            postal_code: None,
            company_cod_senior_numemp: None,
            employee_cod_senior_numcad: None,
            collaborator_type_code_senior_tipcol: None,
            status_cod_senior_sitafa: None,
            cost_center_cod_senior_codccu: None,
            agent_id: 1,
        }
    }

    async fn repo() -> EmployeeRepository {
        let db = Database::in_memory().await.unwrap();
        EmployeeRepository::new(&db)
    }

    #[tokio::test]
    async fn test_insert_then_lookup_returns_equal_fields() {
        let repo = repo().await;
        let mut emp = sample_employee("E001", "Ana Souza");
        emp.birth_date = Some(date("1990-05-02"));
        emp.complementary_salary = Some(5000.5);
        emp.city_name = Some("Curitiba".to_string());
        emp.company_cod_senior_numemp = Some(7);
        repo.add(&emp).await.unwrap();

        let found = repo.get_by_employee_id("E001").await.unwrap().unwrap();
        assert_eq!(found, emp);
        assert!(found.termination_date.is_none());
        assert!(found.race.is_none());
        assert!(repo.get_by_employee_id("E999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_employee_id_is_constraint_error() {
        let repo = repo().await;
        repo.add(&sample_employee("E001", "Ana")).await.unwrap();

        let err = repo.add(&sample_employee("E001", "Other")).await.unwrap_err();
        assert!(matches!(err, StaffdeskError::Constraint(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_empty_update_rejected_and_row_unchanged() {
        let repo = repo().await;
        let emp = sample_employee("E001", "Ana");
        repo.add(&emp).await.unwrap();

        let err = repo.update("E001", &EmployeeUpdate::default()).await.unwrap_err();
        assert!(matches!(err, StaffdeskError::InvalidInput(_)));
        assert_eq!(repo.get_by_employee_id("E001").await.unwrap().unwrap(), emp);
    }

    #[tokio::test]
    async fn test_dangling_agent_reference_fails_and_row_unchanged() {
        let repo = repo().await;
        let emp = sample_employee("E001", "Ana");
        repo.add(&emp).await.unwrap();

        let changes = EmployeeUpdate {
            agent_id: Some(999),
            salary: Some(1.0),
            ..Default::default()
        };
        let err = repo.update("E001", &changes).await.unwrap_err();
        assert!(matches!(err, StaffdeskError::Constraint(_)), "got {:?}", err);
        assert_eq!(repo.get_by_employee_id("E001").await.unwrap().unwrap(), emp);
    }

    #[tokio::test]
    async fn test_partial_update_touches_only_given_fields() {
        let repo = repo().await;
        repo.add(&sample_employee("E001", "Ana")).await.unwrap();

        let changes = EmployeeUpdate {
            salary: Some(80000.0),
            city_name: Some("Recife".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.update("E001", &changes).await.unwrap(), 1);
        assert_eq!(repo.update("E404", &changes).await.unwrap(), 0);

        let found = repo.get_by_employee_id("E001").await.unwrap().unwrap();
        assert_eq!(found.salary, 80000.0);
        assert_eq!(found.city_name.as_deref(), Some("Recife"));
        assert_eq!(found.full_name, "Ana");
        assert_eq!(found.company_name, "Acme Corp");
    }

    #[tokio::test]
    async fn test_delete_nonexistent_returns_zero() {
        let repo = repo().await;
        repo.add(&sample_employee("E001", "Ana")).await.unwrap();

        assert_eq!(repo.delete("NOPE").await.unwrap(), 0);
        assert_eq!(repo.delete("E001").await.unwrap(), 1);
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_active_then_terminated() {
        let repo = repo().await;
        repo.add(&sample_employee("E001", "Ana")).await.unwrap();

        let active = repo.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert!(active[0].is_active());
        assert!(repo.list_terminated().await.unwrap().is_empty());

        let changes = EmployeeUpdate {
            termination_date: Some(date("2024-03-31")),
            ..Default::default()
        };
        repo.update("E001", &changes).await.unwrap();

        assert!(repo.list_active().await.unwrap().is_empty());
        let terminated = repo.list_terminated().await.unwrap();
        assert_eq!(terminated.len(), 1);
        assert_eq!(terminated[0].status_label(), "TERMINATED");
        assert_eq!(terminated[0].termination_date, Some(date("2024-03-31")));
    }

    #[tokio::test]
    async fn test_name_search_returns_all_matches() {
        let repo = repo().await;
        repo.add(&sample_employee("E001", "Maria Silva")).await.unwrap();
        repo.add(&sample_employee("E002", "Maria Silva")).await.unwrap();
        repo.add(&sample_employee("E003", "João Pereira")).await.unwrap();

        let found = repo.get_by_name("Maria Silva").await.unwrap();
        let ids: Vec<_> = found.iter().map(|e| e.employee_id.as_str()).collect();
        assert_eq!(ids, vec!["E001", "E002"]);

        assert_eq!(repo.get_by_name("Silva").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_exact_match_filters() {
        let repo = repo().await;
        let mut other = sample_employee("E002", "Bruno");
        other.company_name = "Globex".to_string();
        other.cost_center_name = "Sales".to_string();
        other.status_description = "On Leave".to_string();
        repo.add(&sample_employee("E001", "Ana")).await.unwrap();
        repo.add(&other).await.unwrap();

        assert_eq!(repo.get_by_company("Globex").await.unwrap()[0].employee_id, "E002");
        assert!(repo.get_by_company("Glob").await.unwrap().is_empty());
        assert_eq!(repo.get_by_status("On Leave").await.unwrap().len(), 1);
        assert_eq!(repo.get_by_cost_center("Engineering").await.unwrap()[0].employee_id, "E001");
    }

    #[tokio::test]
    async fn test_date_range_is_inclusive() {
        let repo = repo().await;
        let mut late = sample_employee("E002", "Bruno");
        late.admission_date = date("2023-12-31");
        let mut outside = sample_employee("E003", "Carla");
        outside.admission_date = date("2024-01-01");
        repo.add(&sample_employee("E001", "Ana")).await.unwrap();
        repo.add(&late).await.unwrap();
        repo.add(&outside).await.unwrap();

        let found = repo
            .get_by_date_range(date("2023-01-15"), date("2023-12-31"), DateField::Admission)
            .await
            .unwrap();
        assert_eq!(found.len(), 2);

        let none = repo
            .get_by_date_range(date("2023-01-01"), date("2023-12-31"), DateField::Termination)
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_salary_info() {
        let repo = repo().await;
        let mut emp = sample_employee("E001", "Ana");
        emp.complementary_salary = Some(5000.0);
        emp.salary_effective_date = Some(date("2024-01-01"));
        repo.add(&emp).await.unwrap();

        let info = repo.get_salary_info("E001").await.unwrap().unwrap();
        assert_eq!(info.total(), 80000.0);
        assert_eq!(info.salary_effective_date, Some(date("2024-01-01")));
        assert!(repo.get_salary_info("E404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_distinct_values() {
        let repo = repo().await;
        let mut b = sample_employee("E002", "Bruno");
        b.city_name = Some("Recife".to_string());
        let mut c = sample_employee("E003", "Carla");
        c.city_name = Some("Curitiba".to_string());
        let mut d = sample_employee("E004", "Davi");
        d.city_name = Some("Recife".to_string());
        repo.add(&sample_employee("E001", "Ana")).await.unwrap();
        repo.add(&b).await.unwrap();
        repo.add(&c).await.unwrap();
        repo.add(&d).await.unwrap();

        assert_eq!(repo.count_distinct(DistinctColumn::CityName).await.unwrap(), 2);
        assert_eq!(
            repo.list_distinct(DistinctColumn::CityName, DEFAULT_DISTINCT_LIMIT)
                .await
                .unwrap(),
            vec!["Curitiba".to_string(), "Recife".to_string()]
        );
        assert_eq!(
            repo.list_distinct(DistinctColumn::CityName, 1).await.unwrap(),
            vec!["Curitiba".to_string()]
        );
    }

    #[tokio::test]
    async fn test_deleting_agent_cascades() {
        let db = Database::in_memory().await.unwrap();
        let repo = EmployeeRepository::new(&db);
        repo.add(&sample_employee("E001", "Ana")).await.unwrap();

        sqlx::query("DELETE FROM agents WHERE id = 1")
            .execute(db.pool())
            .await
            .unwrap();
        assert!(repo.list_all().await.unwrap().is_empty());
    }
}

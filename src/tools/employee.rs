//! Tools for the employee agent.

use super::format::{
    dated_line, employee_details, employee_summary_line, salary_details,
};
use super::{error_text, function_tool, no_arguments, parse_call, ToolOutput, Toolset};
use crate::config::EmployeeAccess;
use crate::error::{Result, StaffdeskError};
use crate::models::{parse_date, DateField, DistinctColumn, Employee, EmployeeUpdate};
use crate::repository::{EmployeeRepository, DEFAULT_DISTINCT_LIMIT};
use async_openai::types::ChatCompletionTool;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

const GREETING: &str = "Hello! I am an employee database management assistant. I can help you with:

📊 **Listing & Searching:**
- List all employees, active employees, or terminated employees
- Search employees by ID, name, company, status, or cost center
- Filter employees by date ranges (admission, termination, birth dates)

💰 **Salary Information:**
- Get detailed salary information for specific employees
- View base salary, complementary salary, and totals

🔍 **Advanced Queries:**
- Summarize the distinct companies, cities, cost centers and statuses on record
- Filter by employment status or cost centers

Just ask me what you'd like to do with the employee database!";

const READ_ONLY_REFUSAL: &str = "I'm sorry, but I only have read-only access to the employee \
database. Adding, updating, or deleting employee records is not supported. I can search for, \
filter, and retrieve employee information for you.";

/// Optional employee fields: name, JSON type, description.
const OPTIONAL_FIELDS: &[(&str, &str, &str)] = &[
    ("termination_date", "string", "Termination date (YYYY-MM-DD)"),
    ("birth_date", "string", "Birth date (YYYY-MM-DD)"),
    ("complementary_salary", "number", "Complementary salary amount"),
    ("salary_effective_date", "string", "Date the salary took effect (YYYY-MM-DD)"),
    ("street_address", "string", "Street address"),
    ("address_number", "string", "Address number"),
    ("city_name", "string", "City"),
    ("race", "string", "Race"),
    ("postal_code", "string", "Postal code"),
    ("company_cod_senior_numemp", "integer", "Legacy company code"),
    ("employee_cod_senior_numcad", "integer", "Legacy employee code"),
    ("collaborator_type_code_senior_tipcol", "integer", "Legacy collaborator type code"),
    ("status_cod_senior_sitafa", "integer", "Legacy status code"),
    ("cost_center_cod_senior_codccu", "integer", "Legacy cost center code"),
];

/// Fields every new employee needs.
const REQUIRED_FIELDS: &[(&str, &str, &str)] = &[
    ("employee_id", "string", "Unique employee identifier"),
    ("company_name", "string", "Company name"),
    ("full_name", "string", "Full name of the employee"),
    ("admission_date", "string", "Admission date (YYYY-MM-DD)"),
    ("status_description", "string", "Employment status description"),
    ("cost_center_name", "string", "Cost center name"),
    ("salary", "number", "Base salary"),
    ("gender", "string", "Gender"),
    ("agent_id", "integer", "ID of the owning agent record (use 1 unless told otherwise)"),
];

/// Arguments of `add_new_employee`. Dates arrive as `YYYY-MM-DD` text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewEmployeeArgs {
    pub employee_id: String,
    pub company_name: String,
    pub full_name: String,
    pub admission_date: String,
    pub status_description: String,
    pub cost_center_name: String,
    pub salary: f64,
    pub gender: String,
    pub agent_id: i64,
    #[serde(default)]
    pub termination_date: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub complementary_salary: Option<f64>,
    #[serde(default)]
    pub salary_effective_date: Option<String>,
    #[serde(default)]
    pub street_address: Option<String>,
    #[serde(default)]
    pub address_number: Option<String>,
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub company_cod_senior_numemp: Option<i64>,
    #[serde(default)]
    pub employee_cod_senior_numcad: Option<i64>,
    #[serde(default)]
    pub collaborator_type_code_senior_tipcol: Option<i64>,
    #[serde(default)]
    pub status_cod_senior_sitafa: Option<i64>,
    #[serde(default)]
    pub cost_center_cod_senior_codccu: Option<i64>,
}

impl NewEmployeeArgs {
    fn into_employee(self) -> Result<Employee> {
        Ok(Employee {
            admission_date: parse_date("admission_date", &self.admission_date)?,
            termination_date: optional_date("termination_date", self.termination_date)?,
            birth_date: optional_date("birth_date", self.birth_date)?,
            salary_effective_date: optional_date(
                "salary_effective_date",
                self.salary_effective_date,
            )?,
            employee_id: self.employee_id,
            company_name: self.company_name,
            full_name: self.full_name,
            status_description: self.status_description,
            cost_center_name: self.cost_center_name,
            salary: self.salary,
            complementary_salary: self.complementary_salary,
            gender: self.gender,
            street_address: self.street_address,
            address_number: self.address_number,
            city_name: self.city_name,
            race: self.race,
            postal_code: self.postal_code,
            company_cod_senior_numemp: self.company_cod_senior_numemp,
            employee_cod_senior_numcad: self.employee_cod_senior_numcad,
            collaborator_type_code_senior_tipcol: self.collaborator_type_code_senior_tipcol,
            status_cod_senior_sitafa: self.status_cod_senior_sitafa,
            cost_center_cod_senior_codccu: self.cost_center_cod_senior_codccu,
            agent_id: self.agent_id,
        })
    }
}

/// Arguments of `update_employee_details`. Absent fields stay untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmployeeChangeArgs {
    pub employee_id: String,
    pub company_name: Option<String>,
    pub full_name: Option<String>,
    pub admission_date: Option<String>,
    pub termination_date: Option<String>,
    pub status_description: Option<String>,
    pub birth_date: Option<String>,
    pub cost_center_name: Option<String>,
    pub salary: Option<f64>,
    pub complementary_salary: Option<f64>,
    pub salary_effective_date: Option<String>,
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

impl EmployeeChangeArgs {
    fn into_update(self) -> Result<(String, EmployeeUpdate)> {
        let update = EmployeeUpdate {
            admission_date: optional_date("admission_date", self.admission_date)?,
            termination_date: optional_date("termination_date", self.termination_date)?,
            birth_date: optional_date("birth_date", self.birth_date)?,
            salary_effective_date: optional_date(
                "salary_effective_date",
                self.salary_effective_date,
            )?,
            company_name: self.company_name,
            full_name: self.full_name,
            status_description: self.status_description,
            cost_center_name: self.cost_center_name,
            salary: self.salary,
            complementary_salary: self.complementary_salary,
            gender: self.gender,
            street_address: self.street_address,
            address_number: self.address_number,
            city_name: self.city_name,
            race: self.race,
            postal_code: self.postal_code,
            company_cod_senior_numemp: self.company_cod_senior_numemp,
            employee_cod_senior_numcad: self.employee_cod_senior_numcad,
            collaborator_type_code_senior_tipcol: self.collaborator_type_code_senior_tipcol,
            status_cod_senior_sitafa: self.status_cod_senior_sitafa,
            cost_center_cod_senior_codccu: self.cost_center_cod_senior_codccu,
            agent_id: self.agent_id,
        };
        Ok((self.employee_id, update))
    }
}

fn optional_date(field: &str, value: Option<String>) -> Result<Option<chrono::NaiveDate>> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_date(field, &v))
        .transpose()
}

/// Calls understood by [`EmployeeTools`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum EmployeeToolCall {
    ListAllEmployees,
    ListActiveEmployees,
    ListTerminatedEmployees,
    GetEmployeeDetails {
        employee_id: String,
    },
    GetEmployeeByName {
        full_name: String,
    },
    GetEmployeesByCompany {
        company_name: String,
    },
    GetEmployeesByStatus {
        status_description: String,
    },
    GetEmployeesByCostCenter {
        cost_center_name: String,
    },
    GetEmployeeSalaryInfo {
        employee_id: String,
    },
    GetEmployeesByDateRange {
        start_date: String,
        end_date: String,
        date_type: String,
    },
    GetDistinctValuesSummary {
        column: String,
        #[serde(default)]
        limit: Option<i64>,
    },
    GreetEmployeeManager,
    ErrorResponse {
        #[serde(default)]
        operation: Option<String>,
    },
    AddNewEmployee(NewEmployeeArgs),
    UpdateEmployeeDetails(EmployeeChangeArgs),
    DeleteEmployee {
        employee_id: String,
    },
}

impl EmployeeToolCall {
    /// Calls that change stored data.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            EmployeeToolCall::AddNewEmployee(_)
                | EmployeeToolCall::UpdateEmployeeDetails(_)
                | EmployeeToolCall::DeleteEmployee { .. }
        )
    }
}

const WRITE_TOOLS: [&str; 3] = ["add_new_employee", "update_employee_details", "delete_employee"];

/// Employee toolset, read-only unless configured otherwise.
pub struct EmployeeTools {
    repo: EmployeeRepository,
    access: EmployeeAccess,
}

impl EmployeeTools {
    pub fn new(repo: EmployeeRepository, access: EmployeeAccess) -> Self {
        Self { repo, access }
    }

    pub fn access(&self) -> EmployeeAccess {
        self.access
    }

    async fn run(&self, call: EmployeeToolCall) -> Result<ToolOutput> {
        if call.is_write() && self.access == EmployeeAccess::ReadOnly {
            return Ok(ToolOutput::text(READ_ONLY_REFUSAL));
        }

        let text = match call {
            EmployeeToolCall::ListAllEmployees => {
                let employees = self.repo.list_all().await?;
                if employees.is_empty() {
                    "There are no employees in the database.".to_string()
                } else {
                    lines(employees.iter().map(employee_summary_line))
                }
            }
            EmployeeToolCall::ListActiveEmployees => {
                let employees = self.repo.list_active().await?;
                if employees.is_empty() {
                    "There are no active employees in the database.".to_string()
                } else {
                    lines(employees.iter().map(|e| {
                        format!(
                            "- {} (ID: {}, Company: {}, Cost Center: {})",
                            e.full_name, e.employee_id, e.company_name, e.cost_center_name
                        )
                    }))
                }
            }
            EmployeeToolCall::ListTerminatedEmployees => {
                let employees = self.repo.list_terminated().await?;
                if employees.is_empty() {
                    "There are no terminated employees in the database.".to_string()
                } else {
                    lines(employees.iter().map(|e| dated_line(e, DateField::Termination)))
                }
            }
            EmployeeToolCall::GetEmployeeDetails { employee_id } => {
                match self.repo.get_by_employee_id(&employee_id).await? {
                    Some(emp) => employee_details(&emp),
                    None => format!("No employee found with ID '{}'.", employee_id),
                }
            }
            EmployeeToolCall::GetEmployeeByName { full_name } => {
                let employees = self.repo.get_by_name(&full_name).await?;
                match employees.as_slice() {
                    [] => format!("No employee found with name '{}'.", full_name),
                    [emp] => employee_details(emp),
                    many => {
                        let mut out = vec![format!(
                            "Found {} employees with name '{}':",
                            many.len(),
                            full_name
                        )];
                        out.extend(many.iter().map(employee_summary_line));
                        out.push(String::new());
                        out.push("Please use the employee ID to get specific details.".to_string());
                        out.join("\n")
                    }
                }
            }
            EmployeeToolCall::GetEmployeesByCompany { company_name } => {
                let employees = self.repo.get_by_company(&company_name).await?;
                if employees.is_empty() {
                    format!("No employees found for company '{}'.", company_name)
                } else {
                    with_header(
                        format!("Employees at {}:", company_name),
                        employees.iter().map(|e| {
                            format!("- {} (ID: {}) ({})", e.full_name, e.employee_id, e.status_label())
                        }),
                    )
                }
            }
            EmployeeToolCall::GetEmployeesByStatus { status_description } => {
                let employees = self.repo.get_by_status(&status_description).await?;
                if employees.is_empty() {
                    format!("No employees found with status '{}'.", status_description)
                } else {
                    with_header(
                        format!("Employees with status '{}':", status_description),
                        employees.iter().map(|e| {
                            format!("- {} (ID: {}, Company: {})", e.full_name, e.employee_id, e.company_name)
                        }),
                    )
                }
            }
            EmployeeToolCall::GetEmployeesByCostCenter { cost_center_name } => {
                let employees = self.repo.get_by_cost_center(&cost_center_name).await?;
                if employees.is_empty() {
                    format!("No employees found in cost center '{}'.", cost_center_name)
                } else {
                    with_header(
                        format!("Employees in cost center '{}':", cost_center_name),
                        employees.iter().map(employee_summary_line),
                    )
                }
            }
            EmployeeToolCall::GetEmployeeSalaryInfo { employee_id } => {
                match self.repo.get_salary_info(&employee_id).await? {
                    Some(info) => salary_details(&info),
                    None => format!("No employee found with ID '{}'.", employee_id),
                }
            }
            EmployeeToolCall::GetEmployeesByDateRange {
                start_date,
                end_date,
                date_type,
            } => {
                let field: DateField = date_type.parse()?;
                let start = parse_date("start_date", &start_date)?;
                let end = parse_date("end_date", &end_date)?;

                let employees = self.repo.get_by_date_range(start, end, field).await?;
                if employees.is_empty() {
                    format!(
                        "No employees found with {} date between {} and {}.",
                        field, start, end
                    )
                } else {
                    with_header(
                        format!("Employees with {} date between {} and {}:", field, start, end),
                        employees.iter().map(|e| dated_line(e, field)),
                    )
                }
            }
            EmployeeToolCall::GetDistinctValuesSummary { column, limit } => {
                let column: DistinctColumn = column.parse()?;
                let limit = limit.unwrap_or(DEFAULT_DISTINCT_LIMIT).max(1);
                let total = self.repo.count_distinct(column).await?;
                let values = self.repo.list_distinct(column, limit).await?;

                if values.is_empty() {
                    format!("No values recorded for '{}'.", column)
                } else {
                    let mut header = format!("Distinct values for '{}' ({} total)", column, total);
                    if (values.len() as i64) < total {
                        header.push_str(&format!(", showing the first {}", values.len()));
                    }
                    header.push(':');
                    with_header(header, values.iter().map(|v| format!("- {}", v)))
                }
            }
            EmployeeToolCall::GreetEmployeeManager => {
                return Ok(ToolOutput::direct(self.greeting()));
            }
            EmployeeToolCall::ErrorResponse { .. } => READ_ONLY_REFUSAL.to_string(),
            EmployeeToolCall::AddNewEmployee(args) => {
                let employee = args.into_employee()?;
                match self.repo.add(&employee).await {
                    Ok(()) => format!(
                        "Employee '{}' (ID: {}) was successfully added.",
                        employee.full_name, employee.employee_id
                    ),
                    Err(StaffdeskError::Constraint(_)) => format!(
                        "Error: An employee with ID '{}' already exists, or agent {} does not exist.",
                        employee.employee_id, employee.agent_id
                    ),
                    Err(e) => return Err(e),
                }
            }
            EmployeeToolCall::UpdateEmployeeDetails(args) => {
                let (employee_id, changes) = args.into_update()?;
                match self.repo.update(&employee_id, &changes).await {
                    Ok(0) => format!("Error: No employee found with ID '{}' to update.", employee_id),
                    Ok(_) => format!("Successfully updated employee with ID '{}'.", employee_id),
                    Err(StaffdeskError::Constraint(_)) => {
                        "Error: Update failed due to constraint violation (duplicate ID or invalid reference)."
                            .to_string()
                    }
                    Err(e) => return Err(e),
                }
            }
            EmployeeToolCall::DeleteEmployee { employee_id } => {
                match self.repo.delete(&employee_id).await? {
                    0 => format!("Error: No employee found with ID '{}' to delete.", employee_id),
                    _ => format!("Employee with ID '{}' has been successfully deleted.", employee_id),
                }
            }
        };

        Ok(ToolOutput::text(text))
    }

    fn greeting(&self) -> String {
        match self.access {
            EmployeeAccess::ReadOnly => GREETING.to_string(),
            EmployeeAccess::ReadWrite => GREETING.replace(
                "🔍 **Advanced Queries:**",
                "👥 **Employee Management:**\n- Add new employees with comprehensive details\n\
                 - Update existing employee information\n- Delete employee records\n\n\
                 🔍 **Advanced Queries:**",
            ),
        }
    }
}

fn lines(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join("\n")
}

fn with_header(header: String, items: impl Iterator<Item = String>) -> String {
    std::iter::once(header).chain(items).collect::<Vec<_>>().join("\n")
}

fn string_arg(name: &str, description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            name: { "type": "string", "description": description }
        },
        "required": [name]
    })
}

fn field_properties(fields: &[(&str, &str, &str)]) -> serde_json::Map<String, serde_json::Value> {
    fields
        .iter()
        .map(|(name, kind, description)| {
            (
                name.to_string(),
                serde_json::json!({ "type": kind, "description": description }),
            )
        })
        .collect()
}

fn read_definitions() -> Vec<ChatCompletionTool> {
    vec![
        function_tool(
            "list_all_employees",
            "Lists all employees currently in the database with their status.",
            no_arguments(),
        ),
        function_tool(
            "list_active_employees",
            "Lists all active employees (those without termination date).",
            no_arguments(),
        ),
        function_tool(
            "list_terminated_employees",
            "Lists all terminated employees (those with termination date).",
            no_arguments(),
        ),
        function_tool(
            "get_employee_details",
            "Finds a specific employee by their employee ID and returns detailed information.",
            string_arg("employee_id", "The employee ID to look up"),
        ),
        function_tool(
            "get_employee_by_name",
            "Finds employees by full or partial name and returns detailed information.",
            string_arg("full_name", "Full name or part of the name of the employee"),
        ),
        function_tool(
            "get_employees_by_company",
            "Gets all employees from a specific company.",
            string_arg("company_name", "Exact company name"),
        ),
        function_tool(
            "get_employees_by_status",
            "Gets all employees with a specific status description.",
            string_arg("status_description", "Exact status description"),
        ),
        function_tool(
            "get_employees_by_cost_center",
            "Gets all employees from a specific cost center.",
            string_arg("cost_center_name", "Exact cost center name"),
        ),
        function_tool(
            "get_employee_salary_info",
            "Gets salary information for a specific employee.",
            string_arg("employee_id", "The employee ID"),
        ),
        function_tool(
            "get_employees_by_date_range",
            "Gets employees filtered by date range for admission, termination, or birth dates.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "start_date": { "type": "string", "description": "Start date (YYYY-MM-DD), inclusive" },
                    "end_date": { "type": "string", "description": "End date (YYYY-MM-DD), inclusive" },
                    "date_type": {
                        "type": "string",
                        "enum": ["admission", "termination", "birth"],
                        "description": "Which date to filter on"
                    }
                },
                "required": ["start_date", "end_date", "date_type"]
            }),
        ),
        function_tool(
            "get_distinct_values_summary",
            "Lists the distinct values recorded for a column, such as the companies, cities or cost centers on file.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "column": {
                        "type": "string",
                        "enum": DistinctColumn::ALL.iter().map(|c| c.column()).collect::<Vec<_>>(),
                        "description": "Column to summarize"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of values to list (default: 100)",
                        "default": DEFAULT_DISTINCT_LIMIT
                    }
                },
                "required": ["column"]
            }),
        ),
        function_tool(
            "greet_employee_manager",
            "Provides a greeting and explains the employee management agent's capabilities.",
            no_arguments(),
        ),
    ]
}

fn write_definitions() -> Vec<ChatCompletionTool> {
    let mut add_properties = field_properties(REQUIRED_FIELDS);
    add_properties.extend(field_properties(OPTIONAL_FIELDS));
    let required: Vec<&str> = REQUIRED_FIELDS.iter().map(|(name, _, _)| *name).collect();

    let mut update_properties = field_properties(REQUIRED_FIELDS);
    update_properties.extend(field_properties(OPTIONAL_FIELDS));

    vec![
        function_tool(
            "add_new_employee",
            "Adds a new employee to the database.",
            serde_json::json!({
                "type": "object",
                "properties": add_properties,
                "required": required
            }),
        ),
        function_tool(
            "update_employee_details",
            "Modifies the details of an existing employee. Only the provided fields change.",
            serde_json::json!({
                "type": "object",
                "properties": update_properties,
                "required": ["employee_id"]
            }),
        ),
        function_tool(
            "delete_employee",
            "Permanently deletes an existing employee.",
            string_arg("employee_id", "The employee ID to delete"),
        ),
    ]
}

#[async_trait]
impl Toolset for EmployeeTools {
    fn definitions(&self) -> Vec<ChatCompletionTool> {
        let mut tools = read_definitions();
        match self.access {
            EmployeeAccess::ReadOnly => tools.push(function_tool(
                "error_response",
                "Explains that adding, updating, or deleting employee data is not supported.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "operation": {
                            "type": "string",
                            "description": "The operation the user asked for"
                        }
                    }
                }),
            )),
            EmployeeAccess::ReadWrite => tools.extend(write_definitions()),
        }
        tools
    }

    async fn execute(&self, name: &str, arguments: &str) -> ToolOutput {
        info!("Employee tool: {} {}", name, arguments);

        if self.access == EmployeeAccess::ReadOnly && WRITE_TOOLS.contains(&name) {
            return ToolOutput::text(READ_ONLY_REFUSAL);
        }

        let result = match parse_call::<EmployeeToolCall>(name, arguments) {
            Ok(call) if call.is_write() || self.has_tool(name) => self.run(call).await,
            Ok(_) => Err(StaffdeskError::Agent(format!("Unknown tool '{}'", name))),
            Err(_) if !self.has_tool(name) => {
                Err(StaffdeskError::Agent(format!("Unknown tool '{}'", name)))
            }
            Err(e) => Err(e),
        };

        result.unwrap_or_else(|e| ToolOutput::text(error_text(&e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::repository::sample_employee;

    async fn tools(access: EmployeeAccess) -> EmployeeTools {
        let db = Database::in_memory().await.unwrap();
        let repo = EmployeeRepository::new(&db);
        repo.add(&sample_employee("E001", "Maria Silva")).await.unwrap();
        repo.add(&sample_employee("E002", "Maria Silva")).await.unwrap();
        let mut bruno = sample_employee("E003", "Bruno Lima");
        bruno.complementary_salary = Some(5000.0);
        bruno.termination_date = chrono::NaiveDate::from_ymd_opt(2024, 3, 31);
        repo.add(&bruno).await.unwrap();
        EmployeeTools::new(repo, access)
    }

    fn names(tools: &EmployeeTools) -> Vec<String> {
        tools
            .definitions()
            .into_iter()
            .map(|t| t.function.name)
            .collect()
    }

    #[tokio::test]
    async fn test_tool_sets_per_access_mode() {
        let ro = names(&tools(EmployeeAccess::ReadOnly).await);
        assert!(ro.contains(&"error_response".to_string()));
        assert!(ro.contains(&"list_all_employees".to_string()));
        assert!(!ro.contains(&"add_new_employee".to_string()));

        let rw = names(&tools(EmployeeAccess::ReadWrite).await);
        assert!(!rw.contains(&"error_response".to_string()));
        for name in ["add_new_employee", "update_employee_details", "delete_employee"] {
            assert!(rw.contains(&name.to_string()));
        }
    }

    #[tokio::test]
    async fn test_same_name_lists_each_id() {
        let tools = tools(EmployeeAccess::ReadOnly).await;
        let out = tools
            .execute("get_employee_by_name", r#"{"full_name": "Maria Silva"}"#)
            .await;

        assert!(out.text.starts_with("Found 2 employees with name 'Maria Silva':"));
        assert!(out.text.contains("ID: E001"));
        assert!(out.text.contains("ID: E002"));
        assert!(out.text.ends_with("Please use the employee ID to get specific details."));
    }

    #[tokio::test]
    async fn test_details_and_salary_rendering() {
        let tools = tools(EmployeeAccess::ReadOnly).await;

        let out = tools.execute("get_employee_details", r#"{"employee_id":"E003"}"#).await;
        assert!(out.text.contains("- Status: TERMINATED"));
        assert!(out.text.contains("- Salary: $75,000.00"));

        let out = tools
            .execute("get_employee_salary_info", r#"{"employee_id":"E003"}"#)
            .await;
        assert!(out.text.contains("- Total Salary: $80,000.00"));

        let out = tools.execute("get_employee_details", r#"{"employee_id":"NOPE"}"#).await;
        assert_eq!(out.text, "No employee found with ID 'NOPE'.");
    }

    #[tokio::test]
    async fn test_active_and_terminated_lists() {
        let tools = tools(EmployeeAccess::ReadOnly).await;

        let active = tools.execute("list_active_employees", "{}").await;
        assert_eq!(active.text.lines().count(), 2);
        assert!(!active.text.contains("E003"));

        let terminated = tools.execute("list_terminated_employees", "").await;
        assert_eq!(
            terminated.text,
            "- Bruno Lima (ID: E003, Date: 2024-03-31)"
        );
    }

    #[tokio::test]
    async fn test_bad_date_type_is_rendered_as_error() {
        let tools = tools(EmployeeAccess::ReadOnly).await;
        let out = tools
            .execute(
                "get_employees_by_date_range",
                r#"{"start_date":"2023-01-01","end_date":"2023-12-31","date_type":"hire"}"#,
            )
            .await;
        assert!(out.text.starts_with("Error: Invalid date_type"));

        let out = tools
            .execute(
                "get_employees_by_date_range",
                r#"{"start_date":"2023-01-01","end_date":"2023-12-31","date_type":"admission"}"#,
            )
            .await;
        assert!(out.text.starts_with("Employees with admission date between 2023-01-01 and 2023-12-31:"));
        assert_eq!(out.text.lines().count(), 4);
    }

    #[tokio::test]
    async fn test_distinct_summary_rejects_unlisted_column() {
        let tools = tools(EmployeeAccess::ReadOnly).await;

        let out = tools
            .execute("get_distinct_values_summary", r#"{"column":"salary"}"#)
            .await;
        assert!(out.text.contains("not allowed for distinct analysis"));

        let out = tools
            .execute("get_distinct_values_summary", r#"{"column":"company_name"}"#)
            .await;
        assert_eq!(out.text, "Distinct values for 'company_name' (1 total):\n- Acme Corp");
    }

    #[tokio::test]
    async fn test_read_only_refuses_writes() {
        let tools = tools(EmployeeAccess::ReadOnly).await;

        let out = tools.execute("delete_employee", r#"{"employee_id":"E001"}"#).await;
        assert!(out.text.contains("read-only"));

        let still_there = tools.execute("get_employee_details", r#"{"employee_id":"E001"}"#).await;
        assert!(still_there.text.starts_with("Employee Details:"));

        let out = tools.execute("error_response", "{}").await;
        assert!(out.text.contains("not supported"));
    }

    #[tokio::test]
    async fn test_read_only_refuses_writes_with_incomplete_arguments() {
        let tools = tools(EmployeeAccess::ReadOnly).await;

        let out = tools.execute("add_new_employee", r#"{"full_name":"Ana"}"#).await;
        assert_eq!(out.text, READ_ONLY_REFUSAL);

        let out = tools.execute("update_employee_details", "not json").await;
        assert_eq!(out.text, READ_ONLY_REFUSAL);
    }

    #[tokio::test]
    async fn test_read_write_add_update_delete() {
        let tools = tools(EmployeeAccess::ReadWrite).await;

        let add = r#"{
            "employee_id": "E010", "company_name": "Acme Corp", "full_name": "Clara Nunes",
            "admission_date": "2024-02-01", "status_description": "Working",
            "cost_center_name": "Finance", "salary": 61000, "gender": "F", "agent_id": 1
        }"#;
        let out = tools.execute("add_new_employee", add).await;
        assert_eq!(out.text, "Employee 'Clara Nunes' (ID: E010) was successfully added.");

        let out = tools.execute("add_new_employee", add).await;
        assert!(out.text.starts_with("Error: An employee with ID 'E010' already exists"));

        let out = tools
            .execute(
                "update_employee_details",
                r#"{"employee_id":"E010","termination_date":"2024-06-30"}"#,
            )
            .await;
        assert_eq!(out.text, "Successfully updated employee with ID 'E010'.");

        let out = tools
            .execute("update_employee_details", r#"{"employee_id":"E010"}"#)
            .await;
        assert!(out.text.contains("at least one field"));

        let out = tools
            .execute("update_employee_details", r#"{"employee_id":"E010","agent_id":999}"#)
            .await;
        assert!(out.text.contains("constraint violation"));

        let out = tools
            .execute("update_employee_details", r#"{"employee_id":"E010","birth_date":"30/06/1990"}"#)
            .await;
        assert!(out.text.contains("not a valid birth_date"));

        let out = tools.execute("delete_employee", r#"{"employee_id":"E010"}"#).await;
        assert_eq!(out.text, "Employee with ID 'E010' has been successfully deleted.");

        let out = tools.execute("delete_employee", r#"{"employee_id":"E010"}"#).await;
        assert_eq!(out.text, "Error: No employee found with ID 'E010' to delete.");
    }

    #[tokio::test]
    async fn test_greeting_is_return_direct() {
        let tools = tools(EmployeeAccess::ReadWrite).await;
        let out = tools.execute("greet_employee_manager", "{}").await;
        assert!(out.return_direct);
        assert!(out.text.contains("Employee Management"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let tools = tools(EmployeeAccess::ReadOnly).await;
        let out = tools.execute("launch_rockets", "{}").await;
        assert_eq!(out.text, "Error: Unknown tool 'launch_rockets'");
    }
}

//! Human-readable rendering of records for tool output.

use crate::models::{DateField, Employee, SalaryInfo};

/// `75000.0` -> `$75,000.00`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, fraction)
}

/// One line per employee: name, id, company and status.
pub fn employee_summary_line(emp: &Employee) -> String {
    format!(
        "- {} (ID: {}, Company: {}) ({})",
        emp.full_name,
        emp.employee_id,
        emp.company_name,
        emp.status_label()
    )
}

/// Multi-line detail block for one employee.
pub fn employee_details(emp: &Employee) -> String {
    let mut lines = vec![
        "Employee Details:".to_string(),
        format!("- ID: {}", emp.employee_id),
        format!("- Name: {}", emp.full_name),
        format!("- Company: {}", emp.company_name),
        format!("- Status: {}", emp.status_label()),
        format!("- Admission Date: {}", emp.admission_date),
        format!("- Cost Center: {}", emp.cost_center_name),
        format!("- Salary: {}", format_currency(emp.salary)),
    ];

    if let Some(extra) = emp.complementary_salary.filter(|v| *v != 0.0) {
        lines.push(format!("- Complementary Salary: {}", format_currency(extra)));
    }
    if let Some(date) = emp.termination_date {
        lines.push(format!("- Termination Date: {}", date));
    }
    if let Some(date) = emp.birth_date {
        lines.push(format!("- Birth Date: {}", date));
    }
    if let Some(city) = emp.city_name.as_deref().filter(|c| !c.is_empty()) {
        lines.push(format!("- City: {}", city));
    }
    if !emp.gender.is_empty() {
        lines.push(format!("- Gender: {}", emp.gender));
    }

    lines.join("\n")
}

pub fn salary_details(info: &SalaryInfo) -> String {
    let mut lines = vec![
        format!("Salary Information for {}:", info.full_name),
        format!("- Employee ID: {}", info.employee_id),
        format!("- Base Salary: {}", format_currency(info.salary)),
        format!("- Cost Center: {}", info.cost_center_name),
    ];

    if let Some(extra) = info.complementary_salary.filter(|v| *v != 0.0) {
        lines.push(format!("- Complementary Salary: {}", format_currency(extra)));
        lines.push(format!("- Total Salary: {}", format_currency(info.total())));
    }
    if let Some(date) = info.salary_effective_date {
        lines.push(format!("- Salary Effective Date: {}", date));
    }

    lines.join("\n")
}

/// Line for a date-range hit, showing the date that matched.
pub fn dated_line(emp: &Employee, field: DateField) -> String {
    let date = emp
        .date(field)
        .map(|d| d.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    format!("- {} (ID: {}, Date: {})", emp.full_name, emp.employee_id, date)
}

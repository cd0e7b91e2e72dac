//! Table definitions per backend.

use crate::config::DatabaseBackend;

pub const DEFAULT_AGENT_NAME: &str = "default";
pub const DEFAULT_AGENT_DESCRIPTION: &str = "Default agent owning imported employee records";

const MYSQL_USERS: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INT AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE
) ENGINE=InnoDB";

const MYSQL_AGENTS: &str = "
CREATE TABLE IF NOT EXISTS agents (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    description TEXT,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
) ENGINE=InnoDB";

const MYSQL_EMPLOYEES: &str = "
CREATE TABLE IF NOT EXISTS employees (
    employee_id VARCHAR(64) NOT NULL PRIMARY KEY,
    company_name VARCHAR(255) NOT NULL,
    full_name VARCHAR(255) NOT NULL,
    admission_date DATE NOT NULL,
    termination_date DATE NULL,
    status_description VARCHAR(255) NOT NULL,
    birth_date DATE NULL,
    cost_center_name VARCHAR(255) NOT NULL,
    salary DOUBLE NOT NULL,
    complementary_salary DOUBLE NULL,
    salary_effective_date DATE NULL,
    gender VARCHAR(32) NOT NULL,
    street_address VARCHAR(255) NULL,
    address_number VARCHAR(32) NULL,
    city_name VARCHAR(255) NULL,
    race VARCHAR(64) NULL,
    postal_code VARCHAR(32) NULL,
    company_cod_senior_numemp BIGINT NULL,
    employee_cod_senior_numcad BIGINT NULL,
    collaborator_type_code_senior_tipcol BIGINT NULL,
    status_cod_senior_sitafa BIGINT NULL,
    cost_center_cod_senior_codccu BIGINT NULL,
    agent_id BIGINT NOT NULL,
    CONSTRAINT fk_employees_agent FOREIGN KEY (agent_id)
        REFERENCES agents(id) ON DELETE CASCADE
) ENGINE=InnoDB";

const SQLITE_USERS: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE
)";

const SQLITE_AGENTS: &str = "
CREATE TABLE IF NOT EXISTS agents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)";

const SQLITE_EMPLOYEES: &str = "
CREATE TABLE IF NOT EXISTS employees (
    employee_id TEXT NOT NULL PRIMARY KEY,
    company_name TEXT NOT NULL,
    full_name TEXT NOT NULL,
    admission_date TEXT NOT NULL,
    termination_date TEXT,
    status_description TEXT NOT NULL,
    birth_date TEXT,
    cost_center_name TEXT NOT NULL,
    salary REAL NOT NULL,
    complementary_salary REAL,
    salary_effective_date TEXT,
    gender TEXT NOT NULL,
    street_address TEXT,
    address_number TEXT,
    city_name TEXT,
    race TEXT,
    postal_code TEXT,
    company_cod_senior_numemp INTEGER,
    employee_cod_senior_numcad INTEGER,
    collaborator_type_code_senior_tipcol INTEGER,
    status_cod_senior_sitafa INTEGER,
    cost_center_cod_senior_codccu INTEGER,
    agent_id INTEGER NOT NULL REFERENCES agents(id) ON DELETE CASCADE
)";

/// `(table, ddl)` pairs in dependency order.
pub fn tables(backend: DatabaseBackend) -> [(&'static str, &'static str); 3] {
    match backend {
        DatabaseBackend::Mysql => [
            ("users", MYSQL_USERS),
            ("agents", MYSQL_AGENTS),
            ("employees", MYSQL_EMPLOYEES),
        ],
        DatabaseBackend::Sqlite => [
            ("users", SQLITE_USERS),
            ("agents", SQLITE_AGENTS),
            ("employees", SQLITE_EMPLOYEES),
        ],
    }
}

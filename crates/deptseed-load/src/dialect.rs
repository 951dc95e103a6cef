use deptseed_core::Table;

/// SQL flavour spoken by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// SQL Server, reached over ODBC.
    TSql,
    Postgres,
}

impl Dialect {
    pub fn create_table(self, table: Table) -> String {
        format!("CREATE TABLE {}({})", table, self.columns(table))
    }

    pub fn create_table_if_missing(self, table: Table) -> String {
        match self {
            Dialect::TSql => format!(
                "IF OBJECT_ID(N'{table}', N'U') IS NULL {}",
                self.create_table(table)
            ),
            Dialect::Postgres => format!(
                "CREATE TABLE IF NOT EXISTS {}({})",
                table,
                self.columns(table)
            ),
        }
    }

    pub fn drop_table(self, table: Table) -> String {
        format!("DROP TABLE {table}")
    }

    pub fn insert(self, table: Table) -> &'static str {
        match (self, table) {
            (Dialect::TSql, Table::Department) => {
                "INSERT INTO department(name) OUTPUT INSERTED.id VALUES (?)"
            }
            (Dialect::TSql, Table::Employee) => {
                "INSERT INTO employee(department_id, chief_id, name, email, salary, hire_date) \
                 OUTPUT INSERTED.id VALUES (?, ?, ?, ?, ?, ?)"
            }
            (Dialect::Postgres, Table::Department) => {
                "INSERT INTO department(name) VALUES ($1) RETURNING id"
            }
            (Dialect::Postgres, Table::Employee) => {
                "INSERT INTO employee(department_id, chief_id, name, email, salary, hire_date) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING id"
            }
        }
    }

    pub fn count_rows(self, table: Table) -> String {
        match self {
            Dialect::TSql => format!("SELECT COUNT_BIG(*) FROM {table}"),
            Dialect::Postgres => format!("SELECT COUNT(*) FROM {table}"),
        }
    }

    fn columns(self, table: Table) -> &'static str {
        match (self, table) {
            (Dialect::TSql, Table::Department) => {
                "id INTEGER PRIMARY KEY IDENTITY, \
                 name NVARCHAR(100) NOT NULL"
            }
            (Dialect::TSql, Table::Employee) => {
                "id INTEGER PRIMARY KEY IDENTITY, \
                 department_id INTEGER NOT NULL, \
                 chief_id INTEGER, \
                 name NVARCHAR(100) NOT NULL, \
                 email NVARCHAR(100) NOT NULL, \
                 salary INTEGER NOT NULL, \
                 hire_date DATE NOT NULL, \
                 FOREIGN KEY (department_id) REFERENCES department(id), \
                 FOREIGN KEY (chief_id) REFERENCES employee(id)"
            }
            (Dialect::Postgres, Table::Department) => {
                "id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY, \
                 name VARCHAR(100) NOT NULL"
            }
            (Dialect::Postgres, Table::Employee) => {
                "id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY, \
                 department_id BIGINT NOT NULL REFERENCES department(id), \
                 chief_id BIGINT REFERENCES employee(id), \
                 name VARCHAR(100) NOT NULL, \
                 email VARCHAR(100) NOT NULL, \
                 salary INTEGER NOT NULL, \
                 hire_date DATE NOT NULL"
            }
        }
    }
}

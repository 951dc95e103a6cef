use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Windows / integrated authentication.
    #[default]
    Trusted,
    /// SQL Server login with `user` and `password`.
    Sql,
}

/// ODBC connection parameters. `connection_string`, when set, wins over the
/// individual fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionSettings {
    pub driver: String,
    pub server: String,
    pub database: String,
    pub auth: AuthMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
    /// Extra attributes appended verbatim, e.g. `TrustServerCertificate = "yes"`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            driver: "ODBC Driver 18 for SQL Server".to_string(),
            server: r"(localdb)\MSSQLLocalDB".to_string(),
            database: "ODBC_DB".to_string(),
            auth: AuthMode::Trusted,
            user: None,
            password: None,
            connection_string: None,
            extra: BTreeMap::new(),
        }
    }
}

impl ConnectionSettings {
    pub fn to_connection_string(&self) -> ConfigResult<String> {
        if let Some(conn) = &self.connection_string {
            if conn.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "connection.connection_string",
                    reason: "must not be empty".to_string(),
                });
            }
            return Ok(conn.clone());
        }

        for (field, value) in [
            ("connection.driver", &self.driver),
            ("connection.server", &self.server),
            ("connection.database", &self.database),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField { field });
            }
        }

        let mut conn = format!(
            "Driver={{{}}};Server={};Database={};",
            self.driver.replace('}', "}}"),
            quote(&self.server),
            quote(&self.database)
        );

        match self.auth {
            AuthMode::Trusted => conn.push_str("Trusted_Connection=yes;"),
            AuthMode::Sql => {
                let user = self
                    .user
                    .as_deref()
                    .ok_or(ConfigError::MissingField { field: "connection.user" })?;
                conn.push_str(&format!("UID={};", quote(user)));
                if let Some(password) = &self.password {
                    conn.push_str(&format!("PWD={};", quote(password)));
                }
            }
        }

        for (key, value) in &self.extra {
            conn.push_str(&format!("{key}={};", quote(value)));
        }

        Ok(conn)
    }
}

/// Brace-quote values that would otherwise break the key/value syntax.
fn quote(value: &str) -> String {
    if value.contains([';', '{', '}']) || value.starts_with(' ') || value.ends_with(' ') {
        format!("{{{}}}", value.replace('}', "}}"))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets_localdb_with_trusted_auth() {
        let conn = ConnectionSettings::default()
            .to_connection_string()
            .expect("connection string");
        assert_eq!(
            conn,
            r"Driver={ODBC Driver 18 for SQL Server};Server=(localdb)\MSSQLLocalDB;Database=ODBC_DB;Trusted_Connection=yes;"
        );
    }

    #[test]
    fn sql_auth_requires_user() {
        let settings = ConnectionSettings {
            auth: AuthMode::Sql,
            ..ConnectionSettings::default()
        };
        assert!(matches!(
            settings.to_connection_string(),
            Err(ConfigError::MissingField { field: "connection.user" })
        ));
    }

    #[test]
    fn sql_auth_quotes_password() {
        let mut extra = BTreeMap::new();
        extra.insert("TrustServerCertificate".to_string(), "yes".to_string());
        let settings = ConnectionSettings {
            server: "tcp:db.local,1433".to_string(),
            auth: AuthMode::Sql,
            user: Some("sa".to_string()),
            password: Some("p;ss}".to_string()),
            extra,
            ..ConnectionSettings::default()
        };
        let conn = settings.to_connection_string().expect("connection string");
        assert!(conn.contains("UID=sa;PWD={p;ss}}};"), "{conn}");
        assert!(conn.ends_with("TrustServerCertificate=yes;"));
    }

    #[test]
    fn explicit_connection_string_wins() {
        let settings = ConnectionSettings {
            connection_string: Some("postgres://localhost/seed".to_string()),
            ..ConnectionSettings::default()
        };
        assert_eq!(
            settings.to_connection_string().expect("connection string"),
            "postgres://localhost/seed"
        );
    }
}

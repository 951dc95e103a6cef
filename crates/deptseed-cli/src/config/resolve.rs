use std::path::PathBuf;

use deptseed_core::{DEFAULT_SEED, RowCount, SeedError};
use deptseed_load::{LoadOptions, Target};

use super::{ConfigError, SeedSettings};

/// Values given on the command line (or through `DEPTSEED_CONN`).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub conn: Option<String>,
    pub seed: Option<u64>,
    pub departments: Option<i64>,
    pub employees: Option<i64>,
    pub schema_mode: Option<deptseed_load::SchemaMode>,
    pub commit: Option<deptseed_load::CommitMode>,
    pub on_error: Option<deptseed_load::OnRowError>,
    pub no_verify: bool,
    pub connect_timeout_secs: Option<u32>,
    pub run_dir: Option<PathBuf>,
    pub dry_run: bool,
}

/// Settings after layering defaults, file and command line.
#[derive(Debug, Clone)]
pub struct EffectiveSettings {
    pub seed: u64,
    pub departments: Option<RowCount>,
    pub employees: Option<RowCount>,
    pub options: LoadOptions,
    pub connection: String,
    pub target: Target,
    pub run_dir: PathBuf,
    pub dry_run: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Seed(#[from] SeedError),
}

/// Inputs of the record generator after layering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSettings {
    pub seed: u64,
    pub departments: Option<RowCount>,
    pub employees: Option<RowCount>,
}

/// Layer the generator inputs only. Load options are not looked at, so a
/// file meant for `seed` never blocks a preview.
pub fn resolve_generation(
    settings: &SeedSettings,
    overrides: &Overrides,
) -> Result<GenerationSettings, SeedError> {
    Ok(GenerationSettings {
        seed: overrides.seed.or(settings.seed).unwrap_or(DEFAULT_SEED),
        departments: overrides
            .departments
            .or(settings.departments)
            .map(RowCount::new)
            .transpose()?,
        employees: overrides
            .employees
            .or(settings.employees)
            .map(RowCount::new)
            .transpose()?,
    })
}

/// Layer `overrides` over `settings`. Counts and option combinations are
/// validated here, before anything touches the database.
pub fn resolve(
    settings: &SeedSettings,
    overrides: Overrides,
) -> Result<EffectiveSettings, ResolveError> {
    let generation = resolve_generation(settings, &overrides)?;

    let options = LoadOptions {
        schema_mode: overrides
            .schema_mode
            .or(settings.schema_mode)
            .unwrap_or_default(),
        commit: overrides.commit.or(settings.commit).unwrap_or_default(),
        on_error: overrides.on_error.or(settings.on_error).unwrap_or_default(),
        verify: !overrides.no_verify && settings.verify.unwrap_or(true),
        connect_timeout_secs: overrides
            .connect_timeout_secs
            .or(settings.connect_timeout_secs),
    };
    options.validate()?;

    let connection = if overrides.dry_run {
        "memory:".to_string()
    } else {
        match overrides.conn {
            Some(conn) => conn,
            None => settings.connection.to_connection_string()?,
        }
    };
    let target = Target::detect(&connection)?;

    Ok(EffectiveSettings {
        seed: generation.seed,
        departments: generation.departments,
        employees: generation.employees,
        options,
        connection,
        target,
        run_dir: overrides
            .run_dir
            .or_else(|| settings.run_dir.clone())
            .unwrap_or_else(|| PathBuf::from("runs")),
        dry_run: overrides.dry_run,
    })
}

#[cfg(test)]
mod tests {
    use deptseed_load::{CommitMode, OnRowError, SchemaMode};

    use super::*;

    #[test]
    fn defaults_target_local_sql_server() {
        let effective = resolve(&SeedSettings::default(), Overrides::default()).expect("resolve");
        assert_eq!(effective.seed, DEFAULT_SEED);
        assert_eq!(effective.target.engine(), "odbc");
        assert!(effective.connection.contains("MSSQLLocalDB"));
        assert_eq!(effective.options, LoadOptions::default());
        assert_eq!(effective.run_dir, PathBuf::from("runs"));
        assert!(effective.departments.is_none());
    }

    #[test]
    fn command_line_beats_file() {
        let settings = SeedSettings {
            seed: Some(1),
            departments: Some(3),
            commit: Some(CommitMode::Batch),
            schema_mode: Some(SchemaMode::Create),
            ..SeedSettings::default()
        };
        let overrides = Overrides {
            seed: Some(2),
            departments: Some(5),
            commit: Some(CommitMode::Row),
            conn: Some("postgres://seed@localhost/hr".to_string()),
            ..Overrides::default()
        };

        let effective = resolve(&settings, overrides).expect("resolve");
        assert_eq!(effective.seed, 2);
        assert_eq!(effective.departments.map(RowCount::get), Some(5));
        assert_eq!(effective.options.commit, CommitMode::Row);
        assert_eq!(effective.options.schema_mode, SchemaMode::Create);
        assert_eq!(effective.target.engine(), "postgres");
    }

    #[test]
    fn negative_counts_are_invalid_arguments() {
        let overrides = Overrides {
            employees: Some(-4),
            ..Overrides::default()
        };
        let err = resolve(&SeedSettings::default(), overrides).expect_err("negative");
        assert!(matches!(err, ResolveError::Seed(SeedError::InvalidArgument(_))));
    }

    #[test]
    fn skip_inside_batch_is_rejected() {
        let overrides = Overrides {
            commit: Some(CommitMode::Batch),
            on_error: Some(OnRowError::Skip),
            ..Overrides::default()
        };
        assert!(resolve(&SeedSettings::default(), overrides).is_err());
    }

    #[test]
    fn generation_ignores_load_options() {
        let settings = SeedSettings {
            commit: Some(CommitMode::Batch),
            on_error: Some(OnRowError::Skip),
            departments: Some(2),
            ..SeedSettings::default()
        };
        let generation =
            resolve_generation(&settings, &Overrides::default()).expect("generation");
        assert_eq!(generation.seed, DEFAULT_SEED);
        assert_eq!(generation.departments.map(RowCount::get), Some(2));
        assert!(resolve(&settings, Overrides::default()).is_err());
    }

    #[test]
    fn dry_run_uses_memory_target() {
        let overrides = Overrides {
            dry_run: true,
            conn: Some("postgres://ignored".to_string()),
            ..Overrides::default()
        };
        let effective = resolve(&SeedSettings::default(), overrides).expect("resolve");
        assert_eq!(effective.target, Target::Memory);
    }
}

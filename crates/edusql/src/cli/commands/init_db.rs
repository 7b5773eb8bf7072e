use anyhow::{Context, Result};
use clap::Args;
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::sqlite::{
    ensure_school_schema, is_internal_table, open_writable_database, seed_demo_data,
};

#[derive(Debug, Clone, Args)]
pub struct InitDbArgs {
    /// Insert the demo roster when the Students table is empty.
    #[arg(long, default_value_t = false)]
    pub seed: bool,
}

pub fn run(args: &InitDbArgs, config: &AppConfig) -> Result<()> {
    let path = &config.database_path;
    let mut connection = open_writable_database(path)?;
    ensure_school_schema(&connection)?;

    let tables = school_table_names(&connection)?;
    println!(
        "edusql: school schema ready at {} ({} tables)",
        path.display(),
        tables.len()
    );

    if args.seed {
        let outcome = seed_demo_data(&mut connection)?;
        if outcome.seeded {
            println!("edusql: seeded demo data ({} students)", outcome.students);
        } else {
            println!(
                "edusql: skipped seeding; Students already holds {} rows",
                outcome.students
            );
        }
    }

    tracing::info!(
        path = %path.display(),
        tables = tables.len(),
        seed = args.seed,
        "database initialized"
    );
    Ok(())
}

fn school_table_names(connection: &Connection) -> Result<Vec<String>> {
    let mut statement = connection
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .context("failed to list database tables")?;
    let names = statement
        .query_map([], |row| row.get::<usize, String>(0))
        .context("failed to list database tables")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to read table name")?;

    Ok(names
        .into_iter()
        .filter(|name| !is_internal_table(name))
        .collect())
}

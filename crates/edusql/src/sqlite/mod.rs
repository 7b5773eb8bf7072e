mod bootstrap;
mod executor;
mod functions;

pub use bootstrap::{
    SCHEMA_META_TABLE, SeedOutcome, ensure_school_schema, is_internal_table,
    open_writable_database, seed_demo_data,
};
pub use executor::{Executor, open_read_only_connection};
pub use functions::{register_query_functions, soundex};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, InterruptHandle, OpenFlags, params_from_iter};

use crate::error::ExecutionError;
use crate::models::{CandidateQuery, QueryResult, ResultSet, SqlParam};
use crate::validate::ValidatedQuery;

use super::functions::register_query_functions;

/// Runs validated queries against a read-only connection opened per call.
#[derive(Debug, Clone)]
pub struct Executor {
    database_path: PathBuf,
    timeout: Duration,
}

impl Executor {
    #[must_use]
    pub fn new(database_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            database_path: database_path.into(),
            timeout,
        }
    }

    pub fn execute(&self, query: &ValidatedQuery) -> QueryResult {
        let started = Instant::now();
        match self.try_execute(query.candidate()) {
            Ok(result_set) => {
                tracing::info!(
                    rows = result_set.rows.len(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "query executed"
                );
                tracing::debug!(rows = ?result_set.rows, "raw query rows");
                QueryResult::Rows(result_set)
            }
            Err(error) => {
                tracing::error!(
                    %error,
                    sql = %query.candidate().text,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "query execution failed"
                );
                QueryResult::db_error(error.to_string())
            }
        }
    }

    fn try_execute(&self, query: &CandidateQuery) -> Result<ResultSet, ExecutionError> {
        let connection = open_read_only_connection(&self.database_path, self.timeout)?;
        let watchdog = Watchdog::arm(connection.get_interrupt_handle(), self.timeout);
        let result = run_query(&connection, query);
        let fired = watchdog.disarm();

        match result {
            Err(_) if fired => Err(ExecutionError::TimedOut(self.timeout.as_millis())),
            other => other,
        }
    }
}

pub fn open_read_only_connection(
    path: &Path,
    busy_timeout: Duration,
) -> Result<Connection, ExecutionError> {
    let open_error = |cause: rusqlite::Error| ExecutionError::Open {
        path: path.display().to_string(),
        cause: cause.to_string(),
    };

    let connection = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(open_error)?;
    connection.busy_timeout(busy_timeout).map_err(open_error)?;
    register_query_functions(&connection).map_err(open_error)?;
    Ok(connection)
}

fn run_query(connection: &Connection, query: &CandidateQuery) -> Result<ResultSet, ExecutionError> {
    let mut statement = connection
        .prepare(&query.text)
        .map_err(|error| ExecutionError::Prepare(error.to_string()))?;
    if !statement.readonly() {
        return Err(ExecutionError::Prepare(
            "statement would modify the database".to_string(),
        ));
    }

    let column_names = statement
        .column_names()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    let params = query
        .params
        .iter()
        .map(SqlParam::to_sql_value)
        .collect::<Vec<_>>();

    let mut rows = statement
        .query(params_from_iter(params.iter()))
        .map_err(|error| ExecutionError::Query(error.to_string()))?;
    let mut result_rows = Vec::new();
    while let Some(row) = rows
        .next()
        .map_err(|error| ExecutionError::Query(error.to_string()))?
    {
        let mut values = Vec::with_capacity(column_names.len());
        for index in 0..column_names.len() {
            let value = row
                .get::<usize, SqlValue>(index)
                .map_err(|error| ExecutionError::Decode(error.to_string()))?;
            values.push(value);
        }
        result_rows.push(values);
    }

    Ok(ResultSet::new(column_names, result_rows))
}

struct Watchdog {
    done: mpsc::Sender<()>,
    fired: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Watchdog {
    fn arm(interrupt: InterruptHandle, timeout: Duration) -> Self {
        let (done, finished) = mpsc::channel::<()>();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let handle = std::thread::spawn(move || {
            if let Err(mpsc::RecvTimeoutError::Timeout) = finished.recv_timeout(timeout) {
                flag.store(true, Ordering::SeqCst);
                interrupt.interrupt();
            }
        });

        Self {
            done,
            fired,
            handle,
        }
    }

    fn disarm(self) -> bool {
        let _ = self.done.send(());
        let _ = self.handle.join();
        self.fired.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use rusqlite::types::Value as SqlValue;

    use super::Executor;
    use crate::models::{CandidateQuery, FailureKind, QueryResult, SqlParam};
    use crate::sqlite::{ensure_school_schema, open_writable_database, seed_demo_data};
    use crate::validate::validate;

    fn seeded_db(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("edusql-exec-{label}-{nanos}.sqlite"));
        let mut connection = open_writable_database(&path).expect("db should open");
        ensure_school_schema(&connection).expect("schema should apply");
        seed_demo_data(&mut connection).expect("seed should apply");
        path
    }

    fn run(path: &PathBuf, candidate: CandidateQuery) -> QueryResult {
        let validated = validate(candidate).expect("query should validate");
        Executor::new(path.clone(), Duration::from_secs(5)).execute(&validated)
    }

    #[test]
    fn returns_columns_and_rows_in_order() {
        let path = seeded_db("rows");
        let result = run(
            &path,
            CandidateQuery::primary(
                "SELECT Name, AttendancePercentage FROM Students ORDER BY StudentID LIMIT 2",
            ),
        );

        let QueryResult::Rows(result_set) = result else {
            panic!("expected rows");
        };
        assert_eq!(result_set.columns, vec!["Name", "AttendancePercentage"]);
        assert_eq!(
            result_set.rows[0],
            vec![SqlValue::Text("Asha".to_string()), SqlValue::Real(92.5)]
        );
        assert_eq!(result_set.rows.len(), 2);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn binds_fallback_parameters() {
        let path = seeded_db("params");
        let result = run(
            &path,
            CandidateQuery::fallback("SELECT Name FROM Students WHERE ClassID = ?1 ORDER BY Name")
                .with_param(SqlParam::Integer(5)),
        );

        let QueryResult::Rows(result_set) = result else {
            panic!("expected rows");
        };
        assert_eq!(
            result_set.rows,
            vec![
                vec![SqlValue::Text("Asha".to_string())],
                vec![SqlValue::Text("Ravi".to_string())]
            ]
        );
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn driver_errors_become_failure_values() {
        let path = seeded_db("errors");
        let result = run(&path, CandidateQuery::primary("SELECT Nope FROM Studnets"));
        match result {
            QueryResult::Failure(failure) => {
                assert_eq!(failure.kind, FailureKind::DbError);
                assert!(failure.message.contains("Studnets"), "{}", failure.message);
            }
            other => panic!("expected failure, got {other:?}"),
        }
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn runaway_queries_are_interrupted_at_the_time_limit() {
        let path = seeded_db("timeout");
        let validated = validate(CandidateQuery::primary(
            "SELECT COUNT(*) FROM Students a, Students b, Students c, Students d, Students e, \
             Students f, Students g, Students h, Students i, Students j, Students k, Students l",
        ))
        .expect("cross join should validate");

        let result = Executor::new(path.clone(), Duration::from_millis(50)).execute(&validated);
        match result {
            QueryResult::Failure(failure) => {
                assert!(failure.message.contains("time limit"), "{}", failure.message);
            }
            other => panic!("expected timeout failure, got {other:?}"),
        }
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn phonetic_name_matching_is_available() {
        let path = seeded_db("soundex");
        let result = run(
            &path,
            CandidateQuery::primary("SELECT Name FROM Students WHERE SOUNDEX(Name) = SOUNDEX('Mira')"),
        );
        let QueryResult::Rows(result_set) = result else {
            panic!("expected rows");
        };
        assert_eq!(result_set.rows, vec![vec![SqlValue::Text("Meera".to_string())]]);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_database_is_a_failure_not_a_new_file() {
        let path = std::env::temp_dir().join("edusql-exec-missing/never-created.sqlite");
        let result = run(&path, CandidateQuery::primary("SELECT 1 FROM Students"));
        assert!(matches!(result, QueryResult::Failure(_)));
        assert!(!path.exists());
    }
}

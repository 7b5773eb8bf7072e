use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::schema::SCHOOL_SCHEMA_VERSION;

pub const SCHEMA_META_TABLE: &str = "edusql_schema_meta";

const CREATE_SCHOOL_TABLES_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS Classes (
    ClassID INTEGER PRIMARY KEY,
    ClassName TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS Subjects (
    SubjectID INTEGER PRIMARY KEY,
    SubjectName TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS Teachers (
    TeacherID INTEGER PRIMARY KEY,
    Name TEXT NOT NULL,
    SubjectID INTEGER REFERENCES Subjects(SubjectID),
    PhoneNumber TEXT,
    Email TEXT
);

CREATE TABLE IF NOT EXISTS Students (
    StudentID INTEGER PRIMARY KEY,
    Name TEXT NOT NULL,
    Age INTEGER,
    ClassID INTEGER REFERENCES Classes(ClassID),
    TuitionFees REAL NOT NULL DEFAULT 0,
    TransportFees REAL NOT NULL DEFAULT 0,
    ExamFees REAL NOT NULL DEFAULT 0,
    FeesPaid REAL NOT NULL DEFAULT 0,
    Address TEXT,
    PhoneNumber TEXT,
    Email TEXT,
    AdmissionDate TEXT,
    AttendancePercentage REAL,
    ExamScore REAL,
    Status TEXT,
    Remarks TEXT
);

CREATE TABLE IF NOT EXISTS Courses (
    CourseID INTEGER PRIMARY KEY,
    CourseName TEXT NOT NULL,
    Description TEXT,
    TeacherID INTEGER REFERENCES Teachers(TeacherID)
);

CREATE TABLE IF NOT EXISTS Enrollments (
    EnrollmentID INTEGER PRIMARY KEY,
    StudentID INTEGER REFERENCES Students(StudentID),
    CourseID INTEGER REFERENCES Courses(CourseID),
    Term TEXT,
    EnrollmentDate TEXT
);

CREATE TABLE IF NOT EXISTS Exams (
    ExamID INTEGER PRIMARY KEY,
    SubjectID INTEGER REFERENCES Subjects(SubjectID),
    Term TEXT
);

CREATE TABLE IF NOT EXISTS ExamResults (
    ResultID INTEGER PRIMARY KEY,
    ExamID INTEGER REFERENCES Exams(ExamID),
    StudentID INTEGER REFERENCES Students(StudentID),
    MarksObtained REAL,
    TotalMarks REAL
);

CREATE TABLE IF NOT EXISTS Attendance (
    AttendanceID INTEGER PRIMARY KEY,
    StudentID INTEGER REFERENCES Students(StudentID),
    CourseID INTEGER REFERENCES Courses(CourseID),
    Date TEXT,
    Status TEXT
);

CREATE TABLE IF NOT EXISTS Payments (
    PaymentID INTEGER PRIMARY KEY,
    StudentID INTEGER REFERENCES Students(StudentID),
    AmountPaid REAL,
    PaymentDate TEXT,
    PaymentMethod TEXT
);

CREATE TABLE IF NOT EXISTS Parents (
    ParentID INTEGER PRIMARY KEY,
    StudentID INTEGER REFERENCES Students(StudentID),
    Name TEXT NOT NULL,
    Relationship TEXT,
    PhoneNumber TEXT,
    Email TEXT
);

CREATE TABLE IF NOT EXISTS ExamTypes (
    ExamTypeID INTEGER PRIMARY KEY,
    ExamType TEXT NOT NULL,
    Weightage REAL
);

CREATE TABLE IF NOT EXISTS Grades (
    GradeID INTEGER PRIMARY KEY,
    MinMarks REAL,
    MaxMarks REAL,
    Grade TEXT
);

CREATE TABLE IF NOT EXISTS HomeroomTeachers (
    HomeroomID INTEGER PRIMARY KEY,
    TeacherID INTEGER REFERENCES Teachers(TeacherID),
    ClassID INTEGER REFERENCES Classes(ClassID)
);

CREATE TABLE IF NOT EXISTS Logs (
    LogID INTEGER PRIMARY KEY,
    TableName TEXT,
    Action TEXT,
    ActionDate TEXT,
    UserID INTEGER,
    UserRole TEXT,
    OldValue TEXT,
    NewValue TEXT,
    Details TEXT
);

CREATE TABLE IF NOT EXISTS edusql_schema_meta (
    schema_version TEXT NOT NULL PRIMARY KEY,
    applied_at_utc TEXT NOT NULL
);
"#;

const SEED_SQL: &str = r#"
INSERT INTO Classes (ClassID, ClassName) VALUES
    (4, 'Grade 4'), (5, 'Grade 5'), (6, 'Grade 6');

INSERT INTO Subjects (SubjectID, SubjectName) VALUES
    (1, 'Mathematics'), (2, 'Science'), (3, 'English');

INSERT INTO Teachers (TeacherID, Name, SubjectID, PhoneNumber, Email) VALUES
    (1, 'Priya Nair', 1, '9000000001', 'priya@school.com'),
    (2, 'Daniel Okafor', 2, '9000000002', 'daniel@school.com'),
    (3, 'Lena Fischer', 3, '9000000003', 'lena@school.com');

INSERT INTO Students (
    StudentID, Name, Age, ClassID, TuitionFees, TransportFees, ExamFees, FeesPaid,
    Address, PhoneNumber, Email, AdmissionDate, AttendancePercentage, ExamScore, Status, Remarks
) VALUES
    (1, 'Asha', 10, 5, 50000, 5000, 2000, 57000, 'Address 1', '9123400001', 'asha@school.com', '2021-06-01', 92.5, 95, 'Active', 'Excellent'),
    (2, 'Ravi', 11, 5, 50000, 5000, 2000, 40000, 'Address 2', '9123400002', 'ravi@school.com', '2020-06-01', 78, 71.5, 'Active', 'Needs Support'),
    (3, 'Meera', 9, 4, 50000, 5000, 2000, 57000, 'Address 3', '9123400003', 'meera@school.com', '2022-06-01', 98, 88, 'Active', 'Good Progress'),
    (4, 'Kabir', 9, 4, 50000, 5000, 2000, 30000, 'Address 4', '9123400004', 'kabir@school.com', '2022-06-01', 65.5, 54, 'Active', 'Irregular'),
    (5, 'Zoya', 12, 6, 50000, 5000, 2000, 57000, 'Address 5', '9123400005', 'zoya@school.com', '2019-06-01', 88, 91, 'Active', 'Good Progress'),
    (6, 'Arjun', 12, 6, 50000, 5000, 2000, 50000, 'Address 6', '9123400006', 'arjun@school.com', '2019-06-01', 81, 62, 'Active', 'Average');

INSERT INTO Parents (ParentID, StudentID, Name, Relationship, PhoneNumber, Email) VALUES
    (1, 1, 'Sunita', 'Mother', '9800000001', 'sunita@mail.com'),
    (2, 1, 'Vikram', 'Father', '9800000002', 'vikram@mail.com'),
    (3, 2, 'Anita', 'Mother', '9800000003', 'anita@mail.com'),
    (4, 3, 'Rohan', 'Father', '9800000004', 'rohan@mail.com');

INSERT INTO Exams (ExamID, SubjectID, Term) VALUES
    (1, 1, 'Term 1'), (2, 2, 'Term 1');

INSERT INTO ExamResults (ResultID, ExamID, StudentID, MarksObtained, TotalMarks) VALUES
    (1, 1, 1, 97, 100), (2, 1, 2, 70, 100), (3, 1, 3, 85, 100),
    (4, 2, 1, 93, 100), (5, 2, 4, 51, 100), (6, 2, 5, 90, 100);

INSERT INTO Payments (PaymentID, StudentID, AmountPaid, PaymentDate, PaymentMethod) VALUES
    (1, 1, 57000, '2025-04-02', 'Card'),
    (2, 2, 40000, '2025-04-05', 'Cash'),
    (3, 4, 30000, '2025-04-11', 'Bank Transfer');

INSERT INTO Grades (GradeID, MinMarks, MaxMarks, Grade) VALUES
    (1, 90, 100, 'A+'), (2, 75, 89.99, 'A'), (3, 60, 74.99, 'B'), (4, 0, 59.99, 'C');
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOutcome {
    pub seeded: bool,
    pub students: usize,
}

pub fn open_writable_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!(
                "failed to create database parent directory: {}",
                parent.display()
            )
        })?;
    }

    Connection::open(path)
        .with_context(|| format!("failed to open sqlite database: {}", path.display()))
}

pub fn ensure_school_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(CREATE_SCHOOL_TABLES_SQL)
        .context("failed to create school schema")?;

    if schema_meta_has_version(connection, SCHOOL_SCHEMA_VERSION)? {
        return Ok(());
    }

    let applied_at_utc = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("failed to format schema applied timestamp")?;
    connection
        .execute(
            &format!(
                "INSERT INTO {SCHEMA_META_TABLE} (schema_version, applied_at_utc) VALUES (?1, ?2)"
            ),
            params![SCHOOL_SCHEMA_VERSION, applied_at_utc],
        )
        .context("failed to write schema meta row")?;

    Ok(())
}

/// Inserts the demo roster only into an empty `Students` table.
pub fn seed_demo_data(connection: &mut Connection) -> Result<SeedOutcome> {
    let existing = count_students(connection)?;
    if existing > 0 {
        return Ok(SeedOutcome {
            seeded: false,
            students: existing,
        });
    }

    let tx = connection
        .transaction()
        .context("failed to open seed transaction")?;
    tx.execute_batch(SEED_SQL)
        .context("failed to insert demo data")?;
    tx.commit().context("failed to commit demo data")?;

    Ok(SeedOutcome {
        seeded: true,
        students: count_students(connection)?,
    })
}

pub fn is_internal_table(name: &str) -> bool {
    name.starts_with("sqlite_") || name == SCHEMA_META_TABLE
}

fn count_students(connection: &Connection) -> Result<usize> {
    let count = connection
        .query_row("SELECT COUNT(*) FROM Students", [], |row| {
            row.get::<usize, i64>(0)
        })
        .context("failed to count students")?;
    Ok(usize::try_from(count).unwrap_or_default())
}

fn schema_meta_has_version(connection: &Connection, schema_version: &str) -> Result<bool> {
    let query = format!(
        "SELECT EXISTS(SELECT 1 FROM {SCHEMA_META_TABLE} WHERE schema_version = ?1 LIMIT 1)"
    );
    let exists = connection
        .query_row(&query, [schema_version], |row| row.get::<usize, i64>(0))
        .context("failed to query schema version metadata")?;
    Ok(exists != 0)
}

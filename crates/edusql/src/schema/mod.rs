use std::fmt::Write as _;

use serde::Serialize;

pub const SCHOOL_SCHEMA_VERSION: &str = "edusql.school-schema.v1";

const SCHOOL_TABLES: &[(&str, &[&str])] = &[
    (
        "Students",
        &[
            "StudentID",
            "Name",
            "Age",
            "ClassID",
            "TuitionFees",
            "TransportFees",
            "ExamFees",
            "FeesPaid",
            "Address",
            "PhoneNumber",
            "Email",
            "AdmissionDate",
            "AttendancePercentage",
            "ExamScore",
            "Status",
            "Remarks",
        ],
    ),
    ("Classes", &["ClassID", "ClassName"]),
    (
        "Teachers",
        &["TeacherID", "Name", "SubjectID", "PhoneNumber", "Email"],
    ),
    ("Subjects", &["SubjectID", "SubjectName"]),
    (
        "Courses",
        &["CourseID", "CourseName", "Description", "TeacherID"],
    ),
    (
        "Enrollments",
        &[
            "EnrollmentID",
            "StudentID",
            "CourseID",
            "Term",
            "EnrollmentDate",
        ],
    ),
    ("Exams", &["ExamID", "SubjectID", "Term"]),
    (
        "ExamResults",
        &[
            "ResultID",
            "ExamID",
            "StudentID",
            "MarksObtained",
            "TotalMarks",
        ],
    ),
    (
        "Attendance",
        &["AttendanceID", "StudentID", "CourseID", "Date", "Status"],
    ),
    (
        "Payments",
        &[
            "PaymentID",
            "StudentID",
            "AmountPaid",
            "PaymentDate",
            "PaymentMethod",
        ],
    ),
    (
        "Parents",
        &[
            "ParentID",
            "StudentID",
            "Name",
            "Relationship",
            "PhoneNumber",
            "Email",
        ],
    ),
    ("ExamTypes", &["ExamTypeID", "ExamType", "Weightage"]),
    ("Grades", &["GradeID", "MinMarks", "MaxMarks", "Grade"]),
    ("HomeroomTeachers", &["HomeroomID", "TeacherID", "ClassID"]),
    (
        "Logs",
        &[
            "LogID",
            "TableName",
            "Action",
            "ActionDate",
            "UserID",
            "UserRole",
            "OldValue",
            "NewValue",
            "Details",
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSpec {
    pub name: String,
    pub columns: Vec<String>,
}

impl TableSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|column| (*column).to_string()).collect(),
        }
    }
}

/// Tables and columns handed to the model as grounding context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDescriptor {
    pub version: String,
    pub tables: Vec<TableSpec>,
}

impl SchemaDescriptor {
    #[must_use]
    pub fn school() -> Self {
        Self {
            version: SCHOOL_SCHEMA_VERSION.to_string(),
            tables: SCHOOL_TABLES
                .iter()
                .map(|(name, columns)| TableSpec::new(*name, columns))
                .collect(),
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut output = String::from("Tables:\n");
        for (index, table) in self.tables.iter().enumerate() {
            let _ = writeln!(
                output,
                "{}. {}({})",
                index + 1,
                table.name,
                table.columns.join(", ")
            );
        }
        output
    }
}

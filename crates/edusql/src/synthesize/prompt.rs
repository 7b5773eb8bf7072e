use std::fmt::Write as _;

use crate::models::Question;
use crate::schema::SchemaDescriptor;

/// User vocabulary on the left, schema value or identifier on the right.
pub const SYNONYM_RULES: &[(&[&str], &str)] = &[
    (&["Mom", "Mother"], "'Mother' in the `Parents.Relationship` column"),
    (&["Dad", "Father"], "'Father' in the `Parents.Relationship` column"),
    (&["Marks"], "`MarksObtained` in the `ExamResults` table"),
    (&["Exam Results"], "the `ExamResults` table"),
    (&["Grade N", "Class N"], "`Students.ClassID = N`"),
    (&["Score"], "`Students.ExamScore` unless a specific exam is named"),
];

const OUTPUT_RULES: &[&str] = &[
    "Return ONLY one SQLite SELECT statement that can run as-is.",
    "No explanations, no markdown code fences, no comments.",
    "Never produce DROP, DELETE, ALTER, INSERT, UPDATE, TRUNCATE or any other statement that changes data.",
    "Use only the tables and columns listed in the schema.",
    "Use explicit JOINs on the ID columns when data spans tables.",
    "Apply WHERE, BETWEEN or LIKE for filters and ORDER BY for sorting.",
];

const RANKING_RULES: &[&str] = &[
    "For \"top N\", \"best\" or rank questions use RANK() or DENSE_RANK() over the score column so ties are kept, or ORDER BY ... DESC LIMIT N when ties do not matter.",
    "When only part of a name is given, match it with LIKE '%part%'.",
    "For names that may be misspelled, compare phonetically with SOUNDEX(Name) = SOUNDEX('guess').",
];

const EXAMPLE_QUERY: &str = "\
-- Find top 5 highest scorers:
SELECT s.StudentID, s.Name, r.MarksObtained
FROM ExamResults r JOIN Students s ON s.StudentID = r.StudentID
ORDER BY r.MarksObtained DESC
LIMIT 5";

#[must_use]
pub fn build_generation_prompt(schema: &SchemaDescriptor, question: &Question) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "### Database schema ({})", schema.version);
    prompt.push_str(&schema.render());

    let _ = writeln!(prompt, "\n### User request\n\"{}\"", question.trimmed());

    prompt.push_str("\n### Output rules\n");
    push_bullets(&mut prompt, OUTPUT_RULES);

    prompt.push_str("\n### Naming and synonyms\n");
    for (phrases, mapping) in SYNONYM_RULES {
        let quoted = phrases
            .iter()
            .map(|phrase| format!("\"{phrase}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(prompt, "- {quoted} -> {mapping}");
    }

    prompt.push_str("\n### Ranking and fuzzy matching\n");
    push_bullets(&mut prompt, RANKING_RULES);

    let _ = write!(
        prompt,
        "\n### Example pattern (the comment is illustration only, never emit one)\n{EXAMPLE_QUERY}\n"
    );
    prompt
}

fn push_bullets(prompt: &mut String, lines: &[&str]) {
    for line in lines {
        let _ = writeln!(prompt, "- {line}");
    }
}

#[cfg(test)]
mod tests {
    use super::build_generation_prompt;
    use crate::models::Question;
    use crate::schema::SchemaDescriptor;

    #[test]
    fn prompt_embeds_schema_question_and_rules() {
        let prompt = build_generation_prompt(
            &SchemaDescriptor::school(),
            &Question::new("  Who is Asha's mom? "),
        );

        assert!(prompt.contains("Students(StudentID, Name, Age, ClassID"));
        assert!(prompt.contains("Logs(LogID, TableName"));
        assert!(prompt.contains("\"Who is Asha's mom?\""));
        assert!(prompt.contains("\"Mom\", \"Mother\" -> 'Mother' in the `Parents.Relationship` column"));
        assert!(prompt.contains("\"Marks\" -> `MarksObtained`"));
        assert!(prompt.contains("no markdown code fences"));
        assert!(prompt.contains("DENSE_RANK()"));
        assert!(prompt.contains("SOUNDEX(Name)"));
    }

    #[test]
    fn prompt_sections_appear_in_a_stable_order() {
        let prompt = build_generation_prompt(&SchemaDescriptor::school(), &Question::new("x"));
        let positions = [
            "### Database schema",
            "### User request",
            "### Output rules",
            "### Naming and synonyms",
            "### Ranking and fuzzy matching",
            "### Example pattern",
        ]
        .map(|heading| prompt.find(heading).expect("heading should be present"));
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }
}

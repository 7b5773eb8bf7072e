use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Result};

/// Scalar functions generated queries may call that the bundled SQLite lacks.
pub fn register_query_functions(connection: &Connection) -> Result<()> {
    connection.create_scalar_function(
        "soundex",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |context| {
            let code = match context.get_raw(0) {
                ValueRef::Text(bytes) => Some(soundex(&String::from_utf8_lossy(bytes))),
                ValueRef::Null => None,
                ValueRef::Integer(value) => Some(soundex(&value.to_string())),
                ValueRef::Real(value) => Some(soundex(&value.to_string())),
                ValueRef::Blob(_) => Some(soundex("")),
            };
            Ok(code)
        },
    )
}

/// American Soundex. Text without ASCII letters codes to `?000`.
#[must_use]
pub fn soundex(text: &str) -> String {
    let mut letters = text
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|ch| ch.to_ascii_uppercase());
    let Some(first) = letters.next() else {
        return "?000".to_string();
    };

    let mut code = String::with_capacity(4);
    code.push(first);
    let mut previous = digit_for(first);
    for letter in letters {
        if code.len() == 4 {
            break;
        }
        if matches!(letter, 'H' | 'W') {
            continue;
        }
        let digit = digit_for(letter);
        if let Some(value) = digit.filter(|_| digit != previous) {
            code.push(value);
        }
        previous = digit;
    }

    while code.len() < 4 {
        code.push('0');
    }
    code
}

fn digit_for(letter: char) -> Option<char> {
    match letter {
        'B' | 'F' | 'P' | 'V' => Some('1'),
        'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => Some('2'),
        'D' | 'T' => Some('3'),
        'L' => Some('4'),
        'M' | 'N' => Some('5'),
        'R' => Some('6'),
        _ => None,
    }
}

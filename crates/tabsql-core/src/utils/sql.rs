//! SQL text helpers used at the query-construction boundary.
//!
//! Identifiers coming from file names, the catalog or user selection are
//! quoted here rather than interpolated raw. No validation happens: any name
//! is accepted and a bad one surfaces as an engine error.

/// Quote an identifier for DuckDB: wrap in double quotes, double embedded quotes.
///
/// # Examples
/// ```
/// use tabsql_core::utils::sql::quote_identifier;
/// assert_eq!(quote_identifier("orders"), "\"orders\"");
/// assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal: wrap in single quotes, double embedded quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// What a single pass over SQL text found outside literals and comments.
struct Scan {
    words: Vec<String>,
    /// Last non-whitespace character outside literals and comments.
    last_code: Option<char>,
    /// A string literal, quoted identifier or block comment is still open.
    unterminated: bool,
}

fn scan(sql: &str) -> Scan {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut last_code = None;
    let mut unterminated = false;
    let mut chars = sql.chars().peekable();

    let flush = |current: &mut String, words: &mut Vec<String>| {
        if !current.is_empty() {
            words.push(current.to_ascii_uppercase());
            current.clear();
        }
    };

    while let Some(ch) = chars.next() {
        match ch {
            '\'' | '"' => {
                flush(&mut current, &mut words);
                last_code = Some(ch);
                let mut closed = false;
                // Doubled quote inside a quoted run is an escaped quote.
                while let Some(inner) = chars.next() {
                    if inner == ch {
                        if chars.peek() == Some(&ch) {
                            chars.next();
                        } else {
                            closed = true;
                            break;
                        }
                    }
                }
                unterminated = !closed;
            }
            '-' if chars.peek() == Some(&'-') => {
                flush(&mut current, &mut words);
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                flush(&mut current, &mut words);
                chars.next();
                let mut prev = '\0';
                let mut closed = false;
                for inner in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        closed = true;
                        break;
                    }
                    prev = inner;
                }
                unterminated = !closed;
            }
            c if c.is_alphanumeric() || c == '_' => {
                current.push(c);
                last_code = Some(c);
            }
            c => {
                flush(&mut current, &mut words);
                if !c.is_whitespace() {
                    last_code = Some(c);
                }
            }
        }
    }
    flush(&mut current, &mut words);

    Scan {
        words,
        last_code,
        unterminated,
    }
}

/// Uppercased keywords/identifiers of `sql`, ignoring string literals,
/// quoted identifiers and comments.
pub fn keywords(sql: &str) -> Vec<String> {
    scan(sql).words
}

/// True when `sql` ends with a `;` that is not inside a literal or comment.
///
/// # Examples
/// ```
/// use tabsql_core::utils::sql::is_complete_statement;
/// assert!(is_complete_statement("SELECT 1; -- done"));
/// assert!(!is_complete_statement("SELECT 'a;"));
/// ```
pub fn is_complete_statement(sql: &str) -> bool {
    let scan = scan(sql);
    !scan.unterminated && scan.last_code == Some(';')
}

/// True when the statement carries both a LIMIT and an OFFSET clause.
///
/// Such a manual query counts as user-controlled pagination and leaves the
/// paginated view in place.
pub fn is_bounded_query(sql: &str) -> bool {
    let words = keywords(sql);
    words.iter().any(|w| w == "LIMIT") && words.iter().any(|w| w == "OFFSET")
}

/// True when the statement changes the catalog (tables created or dropped).
pub fn is_schema_changing(sql: &str) -> bool {
    matches!(
        keywords(sql).first().map(String::as_str),
        Some("CREATE" | "DROP" | "ALTER")
    )
}

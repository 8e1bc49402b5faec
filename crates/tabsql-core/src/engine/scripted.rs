//! In-memory engine fake for headless tests.
//!
//! Understands only the statement shapes this crate generates (table
//! listing, describe, counts, bounded selects and file ingestion) plus any
//! canned responses a test registers. Every statement is recorded.

use super::{Column, Engine, EngineError, QueryResult, Row, Value};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct ScriptedEngine {
    tables: Mutex<HashMap<String, QueryResult>>,
    buffers: Mutex<HashMap<String, Vec<u8>>>,
    canned: Mutex<HashMap<String, Result<QueryResult, EngineError>>>,
    failing: Mutex<HashSet<String>>,
    log: Mutex<Vec<String>>,
}

impl ScriptedEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a table with integer `id` and text `label` columns and `rows` rows.
    pub(crate) fn with_numbered_table(self, name: &str, rows: usize) -> Self {
        let data = (1..=rows)
            .map(|i| Row::new(vec![Value::Integer(i as i64), Value::Text(format!("row {}", i))]))
            .collect();
        self.with_table(
            name,
            QueryResult::new(
                vec![Column::new("id", "Int64"), Column::new("label", "Utf8")],
                data,
            ),
        )
    }

    pub(crate) fn with_table(self, name: &str, data: QueryResult) -> Self {
        self.tables
            .lock()
            .expect("tables lock")
            .insert(name.to_string(), data);
        self
    }

    /// Respond to the exact statement `sql` with `response`.
    pub(crate) fn with_response(self, sql: &str, response: Result<QueryResult, EngineError>) -> Self {
        self.canned
            .lock()
            .expect("canned lock")
            .insert(sql.to_string(), response);
        self
    }

    /// Fail every statement containing `fragment`.
    pub(crate) fn failing_on(self, fragment: &str) -> Self {
        self.failing
            .lock()
            .expect("failing lock")
            .insert(fragment.to_string());
        self
    }

    pub(crate) fn statements(&self) -> Vec<String> {
        self.log.lock().expect("log lock").clone()
    }

    pub(crate) fn has_table(&self, name: &str) -> bool {
        self.tables.lock().expect("tables lock").contains_key(name)
    }

    fn run(&self, sql: &str) -> Result<QueryResult, EngineError> {
        if let Some(response) = self.canned.lock().expect("canned lock").get(sql) {
            return response.clone();
        }
        if let Some(fragment) = self
            .failing
            .lock()
            .expect("failing lock")
            .iter()
            .find(|f| sql.contains(f.as_str()))
        {
            return Err(EngineError::new(format!(
                "Scripted Error: statement contains '{}'",
                fragment
            )));
        }

        let trimmed = sql.trim().trim_end_matches(';');
        if trimmed.eq_ignore_ascii_case("SHOW TABLES") {
            return Ok(self.show_tables());
        }
        if let Some(rest) = trimmed.strip_prefix("DESCRIBE ") {
            let (table, _) = parse_identifier(rest)?;
            return self.describe(&table);
        }
        if let Some(rest) = trimmed.strip_prefix("SELECT COUNT(*) AS total FROM ") {
            let (table, _) = parse_identifier(rest)?;
            let data = self.table(&table)?;
            return Ok(QueryResult::new(
                vec![Column::new("total", "Int64")],
                vec![Row::new(vec![Value::Integer(data.rows.len() as i64)])],
            ));
        }
        if let Some(rest) = trimmed.strip_prefix("SELECT * FROM ") {
            let (table, tail) = parse_identifier(rest)?;
            return self.select(&table, tail);
        }
        if let Some(rest) = trimmed.strip_prefix("CREATE OR REPLACE TABLE ") {
            let (table, tail) = parse_identifier(rest)?;
            return self.create_from_buffer(&table, tail);
        }

        Err(EngineError::new(format!(
            "Parser Error: scripted engine cannot run \"{}\"",
            sql
        )))
    }

    fn table(&self, name: &str) -> Result<QueryResult, EngineError> {
        self.tables
            .lock()
            .expect("tables lock")
            .get(name)
            .cloned()
            .ok_or_else(|| {
                EngineError::new(format!(
                    "Catalog Error: Table with name {} does not exist!",
                    name
                ))
            })
    }

    fn show_tables(&self) -> QueryResult {
        let mut names: Vec<String> = self
            .tables
            .lock()
            .expect("tables lock")
            .keys()
            .cloned()
            .collect();
        names.sort();
        QueryResult::new(
            vec![Column::new("name", "Utf8")],
            names
                .into_iter()
                .map(|n| Row::new(vec![Value::Text(n)]))
                .collect(),
        )
    }

    fn describe(&self, table: &str) -> Result<QueryResult, EngineError> {
        let data = self.table(table)?;
        Ok(QueryResult::new(
            vec![
                Column::new("column_name", "Utf8"),
                Column::new("column_type", "Utf8"),
            ],
            data.columns
                .iter()
                .map(|c| {
                    Row::new(vec![
                        Value::Text(c.name.clone()),
                        Value::Text(c.data_type.clone()),
                    ])
                })
                .collect(),
        ))
    }

    fn select(&self, table: &str, tail: &str) -> Result<QueryResult, EngineError> {
        let data = self.table(table)?;
        let words: Vec<&str> = tail.split_whitespace().collect();
        let (limit, offset) = match words.as_slice() {
            [] => (data.rows.len(), 0),
            ["LIMIT", n] => (parse_number(n)?, 0),
            ["LIMIT", n, "OFFSET", m] => (parse_number(n)?, parse_number(m)?),
            _ => {
                return Err(EngineError::new(format!(
                    "Parser Error: unexpected select tail \"{}\"",
                    tail
                )));
            }
        };
        let rows = data.rows.iter().skip(offset).take(limit).cloned().collect();
        Ok(QueryResult::new(data.columns.clone(), rows))
    }

    fn create_from_buffer(&self, table: &str, tail: &str) -> Result<QueryResult, EngineError> {
        let file = tail
            .split('\'')
            .nth(1)
            .ok_or_else(|| EngineError::new("Parser Error: missing file name"))?;
        let bytes = self
            .buffers
            .lock()
            .expect("buffers lock")
            .get(file)
            .cloned()
            .ok_or_else(|| EngineError::new(format!("IO Error: No files found that match the pattern \"{}\"", file)))?;

        let text = String::from_utf8_lossy(&bytes);
        let mut lines = text.lines();
        let columns: Vec<Column> = lines
            .next()
            .unwrap_or_default()
            .split(',')
            .map(|name| Column::new(name.trim(), "Utf8"))
            .collect();
        let rows = lines
            .filter(|line| !line.is_empty())
            .map(|line| {
                Row::new(
                    line.split(',')
                        .map(|cell| {
                            if cell.is_empty() {
                                Value::Null
                            } else {
                                Value::Text(cell.to_string())
                            }
                        })
                        .collect(),
                )
            })
            .collect();

        self.tables
            .lock()
            .expect("tables lock")
            .insert(table.to_string(), QueryResult::new(columns, rows));
        Ok(QueryResult::new(
            vec![Column::new("Count", "Int64")],
            vec![Row::new(vec![Value::Integer(0)])],
        ))
    }
}

fn parse_number(word: &str) -> Result<usize, EngineError> {
    word.parse()
        .map_err(|_| EngineError::new(format!("Parser Error: bad number {}", word)))
}

/// Split a leading (optionally double-quoted) identifier from `input`.
fn parse_identifier(input: &str) -> Result<(String, &str), EngineError> {
    let input = input.trim_start();
    if let Some(rest) = input.strip_prefix('"') {
        let mut name = String::new();
        let mut chars = rest.char_indices().peekable();
        while let Some((idx, ch)) = chars.next() {
            if ch == '"' {
                if matches!(chars.peek(), Some((_, '"'))) {
                    chars.next();
                    name.push('"');
                } else {
                    return Ok((name, &rest[idx + 1..]));
                }
            } else {
                name.push(ch);
            }
        }
        return Err(EngineError::new("Parser Error: unterminated quoted identifier"));
    }
    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    Ok((input[..end].to_string(), &input[end..]))
}

#[async_trait]
impl Engine for ScriptedEngine {
    async fn register_file_buffer(&self, name: &str, bytes: Vec<u8>) -> Result<(), EngineError> {
        self.log
            .lock()
            .expect("log lock")
            .push(format!("REGISTER {}", name));
        self.buffers
            .lock()
            .expect("buffers lock")
            .insert(name.to_string(), bytes);
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<QueryResult, EngineError> {
        self.log.lock().expect("log lock").push(sql.to_string());
        self.run(sql)
    }
}

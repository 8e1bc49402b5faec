//! GROUP BY query builder
//!
//! Produces a query the user can inspect or run. Identifiers are quoted; the
//! engine reports anything that does not exist.

use crate::error::QueryBuildError;
use crate::utils::sql::quote_identifier;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    /// `COUNT(*)`; needs no value column.
    CountAll,
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub const ALL: [AggregateFunction; 6] = [
        AggregateFunction::CountAll,
        AggregateFunction::Count,
        AggregateFunction::Sum,
        AggregateFunction::Avg,
        AggregateFunction::Min,
        AggregateFunction::Max,
    ];

    pub fn sql_name(&self) -> &'static str {
        match self {
            AggregateFunction::CountAll => "COUNT(*)",
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }

    pub fn needs_value_column(&self) -> bool {
        !matches!(self, AggregateFunction::CountAll)
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

impl FromStr for AggregateFunction {
    type Err = QueryBuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let function = match upper.as_str() {
            "COUNT(*)" | "COUNT_ALL" => AggregateFunction::CountAll,
            "COUNT" => AggregateFunction::Count,
            "SUM" => AggregateFunction::Sum,
            "AVG" => AggregateFunction::Avg,
            "MIN" => AggregateFunction::Min,
            "MAX" => AggregateFunction::Max,
            _ => {
                return Err(QueryBuildError::UnknownFunction {
                    name: s.to_string(),
                });
            }
        };
        Ok(function)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderTarget {
    /// One of the table's own columns.
    Column(String),
    /// The aggregated value, ordered by its alias.
    Aggregated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    fn keyword(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderOption {
    pub target: OrderTarget,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationQuery {
    pub table: String,
    pub group_by: String,
    pub function: AggregateFunction,
    pub value_column: Option<String>,
    pub order: Option<(OrderTarget, OrderDirection)>,
}

impl AggregationQuery {
    pub fn new(table: impl Into<String>, group_by: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            group_by: group_by.into(),
            function: AggregateFunction::CountAll,
            value_column: None,
            order: None,
        }
    }

    pub fn function(mut self, function: AggregateFunction, value_column: Option<String>) -> Self {
        self.function = function;
        self.value_column = value_column.filter(|c| !c.is_empty());
        self
    }

    pub fn order_by(mut self, target: OrderTarget, direction: OrderDirection) -> Self {
        self.order = Some((target, direction));
        self
    }

    /// Alias of the aggregated column: `count`, or `<fn>_<value column>`.
    pub fn alias(&self) -> Result<String, QueryBuildError> {
        if !self.function.needs_value_column() {
            return Ok("count".to_string());
        }
        let value = self.value_column()?;
        Ok(format!(
            "{}_{}",
            self.function.sql_name().to_lowercase(),
            value
        ))
    }

    fn value_column(&self) -> Result<&str, QueryBuildError> {
        self.value_column
            .as_deref()
            .ok_or_else(|| QueryBuildError::MissingValueColumn {
                function: self.function.sql_name().to_string(),
            })
    }

    pub fn build(&self) -> Result<String, QueryBuildError> {
        if self.table.is_empty() || self.group_by.is_empty() {
            return Err(QueryBuildError::MissingSelection);
        }

        let group_by = quote_identifier(&self.group_by);
        let alias = quote_identifier(&self.alias()?);
        let aggregate = if self.function.needs_value_column() {
            format!(
                "{}({})",
                self.function.sql_name(),
                quote_identifier(self.value_column()?)
            )
        } else {
            self.function.sql_name().to_string()
        };

        let mut sql = format!(
            "SELECT {}, {} AS {}\nFROM {}\nGROUP BY {}",
            group_by,
            aggregate,
            alias,
            quote_identifier(&self.table),
            group_by
        );

        if let Some((target, direction)) = &self.order {
            let column = match target {
                OrderTarget::Column(name) => quote_identifier(name),
                OrderTarget::Aggregated => alias.clone(),
            };
            sql.push_str(&format!("\nORDER BY {} {}", column, direction.keyword()));
        }

        sql.push(';');
        Ok(sql)
    }
}

/// Ordering choices for a table's `columns`. The aggregated entry appears
/// once a group-by column is chosen and the function has what it needs.
pub fn order_options(
    columns: &[String],
    function: AggregateFunction,
    group_by: Option<&str>,
    value_column: Option<&str>,
) -> Vec<OrderOption> {
    let mut options: Vec<OrderOption> = columns
        .iter()
        .map(|name| OrderOption {
            target: OrderTarget::Column(name.clone()),
            label: format!("{} (original)", name),
        })
        .collect();

    if group_by.is_some_and(|g| !g.is_empty()) {
        let label = match (function, value_column) {
            (AggregateFunction::CountAll, _) => Some("Count (aggregated)".to_string()),
            (f, Some(v)) if !v.is_empty() => Some(format!("{}({}) (aggregated)", f.sql_name(), v)),
            _ => None,
        };
        if let Some(label) = label {
            options.push(OrderOption {
                target: OrderTarget::Aggregated,
                label,
            });
        }
    }

    options
}

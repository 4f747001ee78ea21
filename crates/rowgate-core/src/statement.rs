//! Parameterized statements
//!
//! The gateway never splices values into SQL text. Values always travel as
//! bound parameters (`?` placeholders, in order), identifiers are checked
//! against the table's declared columns and double-quoted. Composite
//! predicates are built as a [`Condition`] tree, so a caller-supplied
//! predicate has no way to emit raw SQL.

use crate::errors::{GatewayError, Result};
use crate::row::{Fields, ID_COLUMN};
use crate::schema::ColumnTypes;
use crate::value::Value;

/// SQL text plus its bound parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// Comparison operators available to predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
}

impl CompareOp {
    fn sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Like => "LIKE",
        }
    }
}

/// A filter over one table's columns
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        column: String,
        op: CompareOp,
        value: Value,
    },
    IsNull {
        column: String,
        negated: bool,
    },
    In {
        column: String,
        values: Vec<Value>,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn compare(column: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Condition::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Eq, value)
    }

    /// Every column this condition references, depth first
    pub fn columns(&self) -> Vec<&str> {
        let mut columns = Vec::new();
        self.collect_columns(&mut columns);
        columns
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::Compare { column, .. }
            | Condition::IsNull { column, .. }
            | Condition::In { column, .. } => out.push(column),
            Condition::And(parts) | Condition::Or(parts) => {
                for part in parts {
                    part.collect_columns(out);
                }
            }
            Condition::Not(inner) => inner.collect_columns(out),
        }
    }

    fn render(&self, sql: &mut String, params: &mut Vec<Value>) {
        match self {
            Condition::Compare { column, op, value } => {
                sql.push_str(&quote_ident(column));
                sql.push(' ');
                sql.push_str(op.sql());
                sql.push_str(" ?");
                params.push(value.clone());
            }
            Condition::IsNull { column, negated } => {
                sql.push_str(&quote_ident(column));
                sql.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Condition::In { values, .. } if values.is_empty() => sql.push_str("1 = 0"),
            Condition::In { column, values } => {
                sql.push_str(&quote_ident(column));
                sql.push_str(" IN (");
                sql.push_str(&vec!["?"; values.len()].join(", "));
                sql.push(')');
                params.extend(values.iter().cloned());
            }
            Condition::And(parts) => render_group(parts, " AND ", "1 = 1", sql, params),
            Condition::Or(parts) => render_group(parts, " OR ", "1 = 0", sql, params),
            Condition::Not(inner) => {
                sql.push_str("NOT (");
                inner.render(sql, params);
                sql.push(')');
            }
        }
    }
}

fn render_group(
    parts: &[Condition],
    joiner: &str,
    empty: &str,
    sql: &mut String,
    params: &mut Vec<Value>,
) {
    if parts.is_empty() {
        sql.push_str(empty);
        return;
    }
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            sql.push_str(joiner);
        }
        sql.push('(');
        part.render(sql, params);
        sql.push(')');
    }
}

/// Handed to `where_expression` callbacks to build a [`Condition`]
#[derive(Debug, Default)]
pub struct PredicateBuilder {
    _private: (),
}

impl PredicateBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn eq(&self, column: &str, value: impl Into<Value>) -> Condition {
        Condition::compare(column, CompareOp::Eq, value)
    }

    pub fn ne(&self, column: &str, value: impl Into<Value>) -> Condition {
        Condition::compare(column, CompareOp::Ne, value)
    }

    pub fn gt(&self, column: &str, value: impl Into<Value>) -> Condition {
        Condition::compare(column, CompareOp::Gt, value)
    }

    pub fn gte(&self, column: &str, value: impl Into<Value>) -> Condition {
        Condition::compare(column, CompareOp::Gte, value)
    }

    pub fn lt(&self, column: &str, value: impl Into<Value>) -> Condition {
        Condition::compare(column, CompareOp::Lt, value)
    }

    pub fn lte(&self, column: &str, value: impl Into<Value>) -> Condition {
        Condition::compare(column, CompareOp::Lte, value)
    }

    pub fn like(&self, column: &str, pattern: impl Into<Value>) -> Condition {
        Condition::compare(column, CompareOp::Like, pattern)
    }

    pub fn is_null(&self, column: &str) -> Condition {
        Condition::IsNull {
            column: column.to_string(),
            negated: false,
        }
    }

    pub fn is_not_null(&self, column: &str) -> Condition {
        Condition::IsNull {
            column: column.to_string(),
            negated: true,
        }
    }

    pub fn in_list<V: Into<Value>>(&self, column: &str, values: impl IntoIterator<Item = V>) -> Condition {
        Condition::In {
            column: column.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn and(&self, parts: impl IntoIterator<Item = Condition>) -> Condition {
        Condition::And(parts.into_iter().collect())
    }

    pub fn or(&self, parts: impl IntoIterator<Item = Condition>) -> Condition {
        Condition::Or(parts.into_iter().collect())
    }

    pub fn not(&self, inner: Condition) -> Condition {
        Condition::Not(Box::new(inner))
    }
}

/// Quote an identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Builds the statements a gateway issues against its table
pub(crate) struct StatementBuilder<'a> {
    table: &'a str,
    columns: &'a ColumnTypes,
}

impl<'a> StatementBuilder<'a> {
    pub(crate) fn new(table: &'a str, columns: &'a ColumnTypes) -> Self {
        Self { table, columns }
    }

    pub(crate) fn check_column(&self, column: &str) -> Result<()> {
        if self.columns.contains(column) {
            Ok(())
        } else {
            Err(GatewayError::UnknownColumn {
                table: self.table.to_string(),
                column: column.to_string(),
            })
        }
    }

    pub(crate) fn check_fields(&self, fields: &Fields) -> Result<()> {
        fields.keys().try_for_each(|column| self.check_column(column))
    }

    pub(crate) fn check_condition(&self, condition: &Condition) -> Result<()> {
        condition
            .columns()
            .into_iter()
            .try_for_each(|column| self.check_column(column))
    }

    /// One page of rows after `after_id`, ascending by id
    pub(crate) fn select_page(
        &self,
        filter: Option<&Condition>,
        after_id: i64,
        limit: usize,
    ) -> Result<Statement> {
        let mut sql = format!("SELECT * FROM {} WHERE ", quote_ident(self.table));
        let mut params = Vec::new();

        if let Some(condition) = filter {
            self.check_condition(condition)?;
            sql.push('(');
            condition.render(&mut sql, &mut params);
            sql.push_str(") AND ");
        }

        sql.push_str(&format!(
            "{} > ? ORDER BY {} ASC LIMIT ?",
            quote_ident(ID_COLUMN),
            quote_ident(ID_COLUMN)
        ));
        params.push(Value::Integer(after_id));
        params.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));

        Ok(Statement::new(sql, params))
    }

    pub(crate) fn select_by_id(&self, id: i64) -> Statement {
        Statement::new(
            format!(
                "SELECT * FROM {} WHERE {} = ?",
                quote_ident(self.table),
                quote_ident(ID_COLUMN)
            ),
            vec![Value::Integer(id)],
        )
    }

    pub(crate) fn count(&self) -> Statement {
        Statement::new(
            format!("SELECT COUNT(*) AS {} FROM {}", quote_ident("count"), quote_ident(self.table)),
            Vec::new(),
        )
    }

    pub(crate) fn insert(&self, fields: &Fields) -> Result<Statement> {
        self.check_fields(fields)?;

        if fields.is_empty() {
            return Ok(Statement::new(
                format!("INSERT INTO {} DEFAULT VALUES", quote_ident(self.table)),
                Vec::new(),
            ));
        }

        let columns: Vec<String> = fields.keys().map(|c| quote_ident(c)).collect();
        let placeholders = vec!["?"; fields.len()].join(", ");
        Ok(Statement::new(
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_ident(self.table),
                columns.join(", "),
                placeholders
            ),
            fields.values().cloned().collect(),
        ))
    }

    pub(crate) fn update(&self, id: i64, fields: &Fields) -> Result<Statement> {
        self.check_fields(fields)?;

        let assignments: Vec<String> = fields
            .keys()
            .map(|c| format!("{} = ?", quote_ident(c)))
            .collect();
        let mut params: Vec<Value> = fields.values().cloned().collect();
        params.push(Value::Integer(id));

        Ok(Statement::new(
            format!(
                "UPDATE {} SET {} WHERE {} = ?",
                quote_ident(self.table),
                assignments.join(", "),
                quote_ident(ID_COLUMN)
            ),
            params,
        ))
    }

    pub(crate) fn delete(&self, id: i64) -> Statement {
        Statement::new(
            format!(
                "DELETE FROM {} WHERE {} = ?",
                quote_ident(self.table),
                quote_ident(ID_COLUMN)
            ),
            vec![Value::Integer(id)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;
    use crate::schema::{Column, TableSchema};
    use crate::value::ColumnType;

    fn column_types() -> ColumnTypes {
        TableSchema::with_columns(
            "beatles_members",
            vec![
                Column::new("name", ColumnType::String),
                Column::new("is_best_beatle", ColumnType::Boolean),
            ],
        )
        .unwrap()
        .column_types()
    }

    #[test]
    fn test_insert_binds_every_value() {
        let types = column_types();
        let builder = StatementBuilder::new("beatles_members", &types);
        let stmt = builder
            .insert(&fields! { "name" => "Ringo Starr", "is_best_beatle" => false })
            .unwrap();

        assert_eq!(
            stmt.sql(),
            "INSERT INTO \"beatles_members\" (\"is_best_beatle\", \"name\") VALUES (?, ?)"
        );
        assert_eq!(
            stmt.params(),
            &[Value::Boolean(false), Value::Text("Ringo Starr".to_string())]
        );
    }

    #[test]
    fn test_insert_without_fields_uses_defaults() {
        let types = column_types();
        let stmt = StatementBuilder::new("beatles_members", &types)
            .insert(&Fields::new())
            .unwrap();
        assert_eq!(stmt.sql(), "INSERT INTO \"beatles_members\" DEFAULT VALUES");
        assert!(stmt.params().is_empty());
    }

    #[test]
    fn test_update_binds_id_last() {
        let types = column_types();
        let stmt = StatementBuilder::new("beatles_members", &types)
            .update(4, &fields! { "name" => "otto" })
            .unwrap();

        assert_eq!(
            stmt.sql(),
            "UPDATE \"beatles_members\" SET \"name\" = ? WHERE \"id\" = ?"
        );
        assert_eq!(stmt.params(), &[Value::from("otto"), Value::Integer(4)]);
    }

    #[test]
    fn test_unknown_column_is_rejected() {
        let types = column_types();
        let err = StatementBuilder::new("beatles_members", &types)
            .insert(&fields! { "name; DROP TABLE x" => 1 })
            .unwrap_err();
        assert!(matches!(err, GatewayError::UnknownColumn { .. }));
    }

    #[test]
    fn test_select_page_with_composite_filter() {
        let types = column_types();
        let qb = PredicateBuilder::new();
        let filter = qb.or([
            qb.eq("name", "John Lennon"),
            qb.and([qb.like("name", "%Starr"), qb.not(qb.is_null("is_best_beatle"))]),
        ]);

        let stmt = StatementBuilder::new("beatles_members", &types)
            .select_page(Some(&filter), 10, 50)
            .unwrap();

        assert_eq!(
            stmt.sql(),
            "SELECT * FROM \"beatles_members\" WHERE ((\"name\" = ?) OR ((\"name\" LIKE ?) AND (NOT (\"is_best_beatle\" IS NULL)))) AND \"id\" > ? ORDER BY \"id\" ASC LIMIT ?"
        );
        assert_eq!(
            stmt.params(),
            &[
                Value::from("John Lennon"),
                Value::from("%Starr"),
                Value::Integer(10),
                Value::Integer(50)
            ]
        );
    }

    #[test]
    fn test_hostile_values_stay_parameters() {
        let types = column_types();
        let qb = PredicateBuilder::new();
        let stmt = StatementBuilder::new("beatles_members", &types)
            .select_page(Some(&qb.eq("name", "x' OR '1'='1")), 0, 10)
            .unwrap();

        assert!(!stmt.sql().contains("OR '1'"));
        assert_eq!(stmt.params()[0], Value::from("x' OR '1'='1"));
    }

    #[test]
    fn test_empty_in_list_matches_nothing() {
        let types = column_types();
        let qb = PredicateBuilder::new();
        let stmt = StatementBuilder::new("beatles_members", &types)
            .select_page(Some(&qb.in_list("name", Vec::<String>::new())), 0, 10)
            .unwrap();
        assert!(stmt.sql().contains("(1 = 0)"));
    }

    #[test]
    fn test_quote_ident_doubles_quotes() {
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}

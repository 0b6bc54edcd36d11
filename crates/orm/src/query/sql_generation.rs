//! Query Builder SQL generation

use super::builder::QueryBuilder;
use super::types::*;
use crate::backends::DatabaseValue;

/// Collects bound parameters while a statement is rendered
struct ParamSink {
    params: Vec<DatabaseValue>,
    inline: bool,
}

impl ParamSink {
    fn push(&mut self, value: &DatabaseValue) -> String {
        if self.inline {
            return format_value(value);
        }
        self.params.push(value.clone());
        format!("${}", self.params.len())
    }
}

impl<M> QueryBuilder<M> {
    /// Generate SQL with `$n` placeholders and the parameters in binding order
    pub fn to_sql_with_params(&self) -> (String, Vec<DatabaseValue>) {
        let mut sink = ParamSink {
            params: Vec::new(),
            inline: false,
        };
        let sql = self.build_select_sql(&mut sink);
        (sql, sink.params)
    }

    /// Render the query with literal values, for logging and tests
    pub fn to_sql(&self) -> String {
        let mut sink = ParamSink {
            params: Vec::new(),
            inline: true,
        };
        self.build_select_sql(&mut sink)
    }

    fn build_select_sql(&self, sink: &mut ParamSink) -> String {
        let mut sql = String::from("SELECT ");

        if self.select_fields.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.select_fields.join(", "));
        }

        if !self.from_tables.is_empty() {
            sql.push_str(" FROM ");
            sql.push_str(&self.from_tables.join(", "));
        }

        if !self.where_conditions.is_empty() {
            let conditions: Vec<String> = self
                .where_conditions
                .iter()
                .map(|predicate| render_predicate(predicate, sink))
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        self.build_order_limit_clause(&mut sql);
        sql
    }

    /// Helper method to build ORDER BY and LIMIT clauses
    fn build_order_limit_clause(&self, sql: &mut String) {
        if !self.order_by.is_empty() {
            let order_clauses: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, direction)| format!("{} {}", column, direction))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order_clauses.join(", "));
        }

        if let Some(limit) = self.limit_count {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = self.offset_value {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
    }
}

fn render_predicate(predicate: &Predicate, sink: &mut ParamSink) -> String {
    match predicate {
        Predicate::Condition(condition) => render_condition(condition, sink),
        Predicate::And(inner) => render_group(inner, " AND ", "TRUE", sink),
        Predicate::Or(inner) => render_group(inner, " OR ", "FALSE", sink),
    }
}

fn render_group(inner: &[Predicate], joiner: &str, empty: &str, sink: &mut ParamSink) -> String {
    match inner {
        [] => empty.to_string(),
        [single] => render_predicate(single, sink),
        _ => {
            let parts: Vec<String> = inner.iter().map(|p| render_predicate(p, sink)).collect();
            format!("({})", parts.join(joiner))
        }
    }
}

fn render_condition(condition: &WhereCondition, sink: &mut ParamSink) -> String {
    match condition.operator {
        QueryOperator::In => {
            if condition.values.is_empty() {
                // IN () is not valid SQL
                return "FALSE".to_string();
            }
            let placeholders: Vec<String> = condition.values.iter().map(|v| sink.push(v)).collect();
            format!("{} IN ({})", condition.column, placeholders.join(", "))
        }
        QueryOperator::IsNull | QueryOperator::IsNotNull => {
            format!("{} {}", condition.column, condition.operator)
        }
        QueryOperator::Equal => match &condition.value {
            Some(value) => format!("{} = {}", condition.column, sink.push(value)),
            None => format!("{} IS NULL", condition.column),
        },
    }
}

/// Format a value for inline SQL
fn format_value(value: &DatabaseValue) -> String {
    match value {
        DatabaseValue::String(s) => format!("'{}'", s.replace('\'', "''")),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_select() {
        let query = QueryBuilder::<()>::new().from("cell").where_eq("radio", "gsm");
        let (sql, params) = query.to_sql_with_params();
        assert_eq!(sql, "SELECT * FROM cell WHERE radio = $1");
        assert_eq!(params, vec![DatabaseValue::from("gsm")]);
    }

    #[test]
    fn test_or_of_and_groups_are_parenthesised() {
        let query = QueryBuilder::<()>::new().from("cell").filter(Predicate::or(vec![
            Predicate::and(vec![Predicate::eq("mcc", 262i64), Predicate::eq("cid", 1i64)]),
            Predicate::and(vec![Predicate::eq("mcc", 310i64), Predicate::eq("cid", 2i64)]),
        ]));

        let (sql, params) = query.to_sql_with_params();
        assert_eq!(
            sql,
            "SELECT * FROM cell WHERE ((mcc = $1 AND cid = $2) OR (mcc = $3 AND cid = $4))"
        );
        assert_eq!(params.len(), 4);
        assert_eq!(params[2], DatabaseValue::Int64(310));
    }

    #[test]
    fn test_in_list_keeps_order() {
        let query = QueryBuilder::<()>::new()
            .from("wifi")
            .where_in("mac", vec!["c", "a", "b"])
            .order_by("mac")
            .limit(10);

        let (sql, params) = query.to_sql_with_params();
        assert_eq!(
            sql,
            "SELECT * FROM wifi WHERE mac IN ($1, $2, $3) ORDER BY mac ASC LIMIT 10"
        );
        assert_eq!(
            params,
            vec![
                DatabaseValue::from("c"),
                DatabaseValue::from("a"),
                DatabaseValue::from("b")
            ]
        );
    }

    #[test]
    fn test_single_member_groups_render_bare() {
        let query = QueryBuilder::<()>::new()
            .from("cell")
            .filter(Predicate::or(vec![Predicate::and(vec![Predicate::eq("cid", 7i64)])]));
        assert_eq!(query.to_sql(), "SELECT * FROM cell WHERE cid = 7");
    }

    #[test]
    fn test_inline_rendering_escapes_quotes() {
        let query = QueryBuilder::<()>::new()
            .select("id, name")
            .from("area")
            .where_eq("name", "o'brien")
            .where_not_null("lat")
            .limit(20)
            .offset(40);
        assert_eq!(
            query.to_sql(),
            "SELECT id, name FROM area WHERE name = 'o''brien' AND lat IS NOT NULL LIMIT 20 OFFSET 40"
        );
    }

    #[test]
    fn test_offset_without_limit() {
        let (sql, params) = QueryBuilder::<()>::new()
            .from("cell")
            .where_eq("mcc", 262i64)
            .order_by("cid")
            .offset(100)
            .to_sql_with_params();
        assert_eq!(
            sql,
            "SELECT * FROM cell WHERE mcc = $1 ORDER BY cid ASC OFFSET 100"
        );
        assert_eq!(params, vec![DatabaseValue::Int64(262)]);
    }

    #[test]
    fn test_inline_bytes_render_as_bytea() {
        let query = QueryBuilder::<()>::new()
            .from("blue")
            .where_eq("mac", vec![0x36u8, 0x80]);
        assert_eq!(query.to_sql(), "SELECT * FROM blue WHERE mac = '\\x3680'");

        let (sql, params) = query.to_sql_with_params();
        assert_eq!(sql, "SELECT * FROM blue WHERE mac = $1");
        assert_eq!(params, vec![DatabaseValue::Bytes(vec![0x36, 0x80])]);
    }

    #[test]
    fn test_empty_groups() {
        let query = QueryBuilder::<()>::new()
            .from("cell")
            .filter(Predicate::or(Vec::new()))
            .where_in::<i64>("cid", Vec::new());
        assert_eq!(query.to_sql(), "SELECT * FROM cell WHERE FALSE AND FALSE");
    }
}

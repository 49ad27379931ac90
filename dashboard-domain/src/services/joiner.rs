// Key-based left join of a side mapping into an event table

use polars::prelude::*;

use crate::entities::table::Table;
use crate::error::DataError;

const JOIN_KEY: &str = "__join_key";
const ROW: &str = "__row";
const HIT: &str = "__hit";

/// Outcome of joining a mapping file into the primary table.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    Joined { matched: usize },
    /// Every mapped column was already present; the table is unchanged.
    AlreadyPresent,
}

fn mapped_alias(idx: usize) -> String {
    format!("__mapped_{idx}")
}

/// Left-joins `columns` of `mapping` into `primary` on `key`.
///
/// Keys compare by their display string, so an integer id in one file
/// matches the same id read as text in the other. The first mapping row
/// per key wins; unmatched primary rows get nulls. A mapped column that
/// already exists in `primary` is replaced in place.
pub fn left_join(
    primary: Table,
    mapping: &Table,
    key: &str,
    columns: &[String],
) -> Result<(Table, JoinOutcome), DataError> {
    if columns.iter().all(|c| primary.has_column(c)) {
        return Ok((primary, JoinOutcome::AlreadyPresent));
    }
    primary.column(key)?;
    mapping.column(key)?;
    for name in columns {
        mapping.column(name)?;
    }

    let firsts: Vec<Expr> = columns
        .iter()
        .enumerate()
        .map(|(idx, name)| col(name.as_str()).first().alias(mapped_alias(idx)))
        .chain(std::iter::once(len().alias(HIT)))
        .collect();
    let lookup = mapping
        .frame()
        .clone()
        .lazy()
        .with_column(col(key).cast(DataType::String).alias(JOIN_KEY))
        .filter(col(JOIN_KEY).is_not_null())
        .group_by_stable([col(JOIN_KEY)])
        .agg(firsts);

    let existing = primary.column_names();
    let mut output: Vec<Expr> = existing
        .iter()
        .map(|name| match columns.iter().position(|c| c == name) {
            Some(idx) => col(mapped_alias(idx)).alias(name.as_str()),
            None => col(name.as_str()),
        })
        .collect();
    output.extend(
        columns
            .iter()
            .enumerate()
            .filter(|(_, name)| !existing.contains(name))
            .map(|(idx, name)| col(mapped_alias(idx)).alias(name.as_str())),
    );
    output.push(col(HIT));

    let mut joined = primary
        .into_frame()
        .lazy()
        .with_row_index(ROW, None)
        .with_column(col(key).cast(DataType::String).alias(JOIN_KEY))
        .join(
            lookup,
            [col(JOIN_KEY)],
            [col(JOIN_KEY)],
            JoinArgs::new(JoinType::Left),
        )
        .sort_by_exprs([col(ROW)], SortMultipleOptions::default())
        .select(output)
        .collect()?;

    let hits = joined.drop_in_place(HIT)?;
    let matched = hits.len() - hits.null_count();
    Ok((Table::from(joined), JoinOutcome::Joined { matched }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::table::fixtures::{int_column, text_column as text};

    fn events() -> Table {
        Table::new(vec![
            int_column("id", &[Some(1), Some(2), Some(3), None]),
            text("src_ip", &[Some("a"), Some("b"), Some("c"), Some("d")]),
        ])
        .expect("events")
    }

    fn categories() -> Table {
        Table::new(vec![
            text("id", &[Some("2"), Some("1"), Some("2")]),
            text("protocol", &[Some("smb"), Some("http"), Some("ftp")]),
            text("transport", &[Some("tcp"), Some("tcp"), Some("udp")]),
        ])
        .expect("categories")
    }

    #[test]
    fn joins_by_key_first_match_wins() {
        let columns = vec!["protocol".to_string(), "transport".to_string()];
        let (joined, outcome) = left_join(events(), &categories(), "id", &columns).expect("join");
        assert_eq!(outcome, JoinOutcome::Joined { matched: 2 });
        assert_eq!(joined.height(), 4);

        assert_eq!(joined.column_names(), vec!["id", "src_ip", "protocol", "transport"]);
        let protocol = joined.text("protocol").expect("protocol");
        assert_eq!(protocol[0].as_deref(), Some("http"));
        assert_eq!(protocol[1].as_deref(), Some("smb"));
        assert!(protocol[2].is_none());
        assert!(protocol[3].is_none());
        assert_eq!(joined.text("id").expect("id")[1].as_deref(), Some("2"));
    }

    #[test]
    fn present_mapped_column_is_replaced_in_place() {
        let primary = events()
            .with_column(text("protocol", &[Some("x"), Some("x"), Some("x"), Some("x")]))
            .expect("column");
        let columns = vec!["protocol".to_string(), "transport".to_string()];
        let (joined, outcome) = left_join(primary, &categories(), "id", &columns).expect("join");
        assert_eq!(outcome, JoinOutcome::Joined { matched: 2 });
        assert_eq!(joined.column_names(), vec!["id", "src_ip", "protocol", "transport"]);
        assert_eq!(joined.text("protocol").expect("protocol")[0].as_deref(), Some("http"));
    }

    #[test]
    fn skips_when_columns_present() {
        let columns = vec!["src_ip".to_string()];
        let (joined, outcome) = left_join(events(), &categories(), "missing", &columns).expect("join");
        assert_eq!(outcome, JoinOutcome::AlreadyPresent);
        assert_eq!(joined, events());
    }

    #[test]
    fn missing_key_is_schema_error() {
        let columns = vec!["protocol".to_string()];
        let err = left_join(events(), &categories(), "event_id", &columns).expect_err("missing");
        assert_eq!(err, DataError::MissingColumn("event_id".to_string()));
    }
}

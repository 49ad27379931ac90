// Aggregation-plot builder
// Groups event rows with polars, aggregates them and shapes the result into a chart

use polars::prelude::*;
use serde::Serialize;

use crate::entities::aggregate::{AggregateRow, AggregateTable, Aggregation};
use crate::entities::chart::Chart;
use crate::entities::layout::PlotRequest;
use crate::entities::table::{scalars, Table};
use crate::error::DataError;
use crate::value_objects::AggOp;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotOutput {
    /// Full grouped table after rename and sort, before any truncation.
    pub aggregate: AggregateTable,
    pub chart: Chart,
}

/// A lazy group-by whose value columns carry positional aliases, so a value
/// may share its name with a key column.
struct Grouped {
    frame: LazyFrame,
    key_columns: Vec<String>,
    value_columns: Vec<String>,
}

fn value_alias(idx: usize) -> String {
    format!("__value_{idx}")
}

fn agg_expr(agg: &Aggregation) -> Expr {
    let column = col(agg.column.as_str());
    match agg.op {
        AggOp::Size => len(),
        AggOp::Count => column.count(),
        AggOp::Nunique => column.drop_nulls().n_unique(),
        AggOp::Sum => column.sum(),
        AggOp::Mean => column.mean(),
        AggOp::Min => column.min(),
        AggOp::Max => column.max(),
    }
}

impl Grouped {
    fn new(table: &Table, group_by: &[String], aggregations: &[Aggregation]) -> Result<Grouped, DataError> {
        if group_by.is_empty() {
            return Err(DataError::EmptyGrouping);
        }
        for name in group_by {
            table.column(name)?;
        }
        for agg in aggregations {
            if agg.op.needs_numeric() && !table.dtype(&agg.column)?.is_numeric() {
                return Err(DataError::NonNumeric {
                    column: agg.column.clone(),
                    op: agg.op.to_string(),
                });
            }
        }

        let keys: Vec<Expr> = group_by.iter().map(|name| col(name.as_str())).collect();
        let values: Vec<Expr> = aggregations
            .iter()
            .enumerate()
            .map(|(idx, agg)| agg_expr(agg).cast(DataType::Float64).alias(value_alias(idx)))
            .collect();

        let mut frame = table.frame().clone().lazy();
        if let Some(present) = group_by
            .iter()
            .map(|name| col(name.as_str()).is_not_null())
            .reduce(|all, next| all.and(next))
        {
            frame = frame.filter(present);
        }
        let frame = frame
            .group_by(keys.clone())
            .agg(values)
            .sort_by_exprs(keys, SortMultipleOptions::default());

        Ok(Grouped {
            frame,
            key_columns: group_by.to_vec(),
            value_columns: value_column_names(aggregations),
        })
    }

    fn rename_value(&mut self, from: &str, to: &str) {
        if let Some(column) = self.value_columns.iter_mut().find(|c| c.as_str() == from) {
            *column = to.to_string();
        }
    }

    /// Stable descending sort; nulls last. Value columns win over keys.
    fn rank_desc(self, column: &str) -> Result<Grouped, DataError> {
        let by = if let Some(idx) = self.value_columns.iter().position(|c| c == column) {
            col(value_alias(idx))
        } else if self.key_columns.iter().any(|c| c == column) {
            col(column)
        } else {
            return Err(DataError::MissingColumn(column.to_string()));
        };
        let Grouped {
            frame,
            key_columns,
            value_columns,
        } = self;
        let options = SortMultipleOptions::default()
            .with_order_descending(true)
            .with_nulls_last(true)
            .with_maintain_order(true);
        Ok(Grouped {
            frame: frame.sort_by_exprs([by], options),
            key_columns,
            value_columns,
        })
    }

    fn collect(self) -> Result<AggregateTable, DataError> {
        let frame = self.frame.collect()?;
        let keys = self
            .key_columns
            .iter()
            .map(|name| scalars(frame.column(name)?))
            .collect::<Result<Vec<_>, DataError>>()?;
        let values = (0..self.value_columns.len())
            .map(|idx| -> Result<Vec<Option<f64>>, DataError> {
                let column = frame.column(&value_alias(idx))?;
                Ok(column.as_materialized_series().f64()?.into_iter().collect())
            })
            .collect::<Result<Vec<_>, _>>()?;

        let rows = (0..frame.height())
            .map(|row| AggregateRow {
                key: keys.iter().filter_map(|column| column[row].clone()).collect(),
                values: values.iter().map(|column| column[row]).collect(),
            })
            .collect();
        Ok(AggregateTable {
            key_columns: self.key_columns,
            value_columns: self.value_columns,
            rows,
        })
    }
}

/// Groups `table` by `group_by` and applies each aggregation per group.
///
/// Groups come out in ascending key order; rows with a null in any key
/// column are left out.
pub fn aggregate(
    table: &Table,
    group_by: &[String],
    aggregations: &[Aggregation],
) -> Result<AggregateTable, DataError> {
    Grouped::new(table, group_by, aggregations)?.collect()
}

fn value_column_names(aggregations: &[Aggregation]) -> Vec<String> {
    aggregations
        .iter()
        .map(|agg| {
            let repeated = aggregations.iter().filter(|a| a.column == agg.column).count() > 1;
            if repeated {
                format!("{}_{}", agg.column, agg.op)
            } else {
                agg.column.clone()
            }
        })
        .collect()
}

/// Aggregates, renames, ranks and charts one request.
///
/// Only bar charts are cut to `top_n`; the returned aggregate is never cut.
pub fn build_plot(table: &Table, request: &PlotRequest) -> Result<PlotOutput, DataError> {
    let mut grouped = Grouped::new(table, &request.group_by, &request.aggregations)?;
    grouped.rename_value(&request.rename, &request.target);
    let aggregate = grouped.rank_desc(&request.sort_by)?.collect()?;

    let drawn = if request.chart.truncates() {
        aggregate.head(request.top_n)
    } else {
        aggregate.clone()
    };
    let points = drawn.pairs(&request.x, &request.target)?;
    let chart = Chart::new(
        request.chart,
        request.title.clone(),
        request.x_label.clone(),
        request.y_label.clone(),
    )
    .with_points(request.target.clone(), points);

    Ok(PlotOutput { aggregate, chart })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::table::fixtures::{int_column, text_column};
    use crate::value_objects::ChartKind;

    fn logins() -> Table {
        let mut login = vec![Some("Success"); 3];
        login.extend(vec![Some("Fail"); 7]);
        let ips = [
            "1.1.1.1", "1.1.1.1", "2.2.2.2", "1.1.1.1", "3.3.3.3", "3.3.3.3", "3.3.3.3",
            "4.4.4.4", "5.5.5.5", "6.6.6.6",
        ];
        Table::new(vec![
            text_column("login", &login),
            text_column("src", &ips.iter().map(|v| Some(*v)).collect::<Vec<_>>()),
            int_column(
                "bytes",
                &[Some(10), Some(20), None, Some(5), Some(1), Some(1), Some(1), Some(2), Some(3), Some(4)],
            ),
        ])
        .expect("table")
    }

    #[test]
    fn counts_login_outcomes_descending() {
        let request = PlotRequest::count_by("login", "Login Rate", "Login", "Count");
        let output = build_plot(&logins(), &request).expect("plot");

        let pairs = output.aggregate.pairs("login", "count").expect("pairs");
        assert_eq!(
            pairs,
            vec![("Fail".to_string(), 7.0), ("Success".to_string(), 3.0)]
        );
        assert_eq!(output.chart.categories, vec!["Fail", "Success"]);
        assert_eq!(output.chart.total(), 10.0);
    }

    #[test]
    fn bar_truncates_but_line_does_not() {
        let mut request = PlotRequest::count_by("src", "Top", "IP", "Count");
        request.top_n = 2;
        let bar = build_plot(&logins(), &request).expect("bar");
        assert_eq!(bar.chart.categories, vec!["1.1.1.1", "3.3.3.3"]);
        assert_eq!(bar.aggregate.len(), 6);

        let line = build_plot(&logins(), &request.clone().chart(ChartKind::Line)).expect("line");
        assert_eq!(line.chart.categories.len(), 6);

        let pie = build_plot(&logins(), &request.chart(ChartKind::Pie)).expect("pie");
        assert_eq!(pie.chart.categories.len(), 6);
        assert_eq!((pie.chart.width, pie.chart.height), (800, 600));
    }

    #[test]
    fn ties_keep_ascending_key_order() {
        let request = PlotRequest::count_by("src", "Top", "IP", "Count");
        let output = build_plot(&logins(), &request).expect("plot");
        let labels: Vec<String> = output
            .aggregate
            .pairs("src", "count")
            .expect("pairs")
            .into_iter()
            .map(|(label, _)| label)
            .collect();
        assert_eq!(
            labels,
            vec!["1.1.1.1", "3.3.3.3", "2.2.2.2", "4.4.4.4", "5.5.5.5", "6.6.6.6"]
        );
    }

    #[test]
    fn numeric_aggregations_and_null_keys() {
        let table = Table::new(vec![
            text_column("k", &[Some("a"), Some("a"), None, Some("b")]),
            int_column("v", &[Some(2), None, Some(9), Some(5)]),
        ])
        .expect("table");
        let result = aggregate(
            &table,
            &["k".to_string()],
            &[
                Aggregation::new("v", AggOp::Sum),
                Aggregation::new("v", AggOp::Size),
                Aggregation::new("v", AggOp::Count),
                Aggregation::new("v", AggOp::Mean),
            ],
        )
        .expect("aggregate");

        assert_eq!(result.value_columns, vec!["v_sum", "v_size", "v_count", "v_mean"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].values, vec![Some(2.0), Some(2.0), Some(1.0), Some(2.0)]);
        assert_eq!(result.rows[1].values, vec![Some(5.0), Some(1.0), Some(1.0), Some(5.0)]);
    }

    #[test]
    fn multi_key_grouping_charts_first_key() {
        let table = Table::new(vec![
            text_column("source_address", &[Some("a"), Some("a"), Some("b"), Some("a")]),
            text_column("target_address", &[Some("x"), Some("x"), Some("x"), Some("y")]),
        ])
        .expect("table");
        let request = PlotRequest {
            group_by: vec!["source_address".to_string(), "target_address".to_string()],
            aggregations: vec![Aggregation::count("target_address")],
            x: "source_address".to_string(),
            rename: "target_address".to_string(),
            target: "count".to_string(),
            sort_by: "count".to_string(),
            title: "Top sources".to_string(),
            x_label: "Source".to_string(),
            y_label: "Count".to_string(),
            top_n: 10,
            chart: ChartKind::Bar,
        };
        let output = build_plot(&table, &request).expect("plot");
        assert_eq!(output.aggregate.len(), 3);
        assert_eq!(output.chart.categories, vec!["a", "b"]);
        assert_eq!(output.chart.series[0].values, vec![3.0, 1.0]);
    }

    #[test]
    fn schema_errors_surface() {
        let missing = PlotRequest::count_by("nope", "t", "x", "y");
        assert_eq!(
            build_plot(&logins(), &missing).expect_err("missing"),
            DataError::MissingColumn("nope".to_string())
        );

        let err = aggregate(&logins(), &["login".to_string()], &[Aggregation::new("src", AggOp::Sum)])
            .expect_err("non numeric");
        assert!(matches!(err, DataError::NonNumeric { .. }));

        let err = aggregate(&logins(), &[], &[]).expect_err("empty");
        assert_eq!(err, DataError::EmptyGrouping);
    }

    #[test]
    fn empty_table_gives_empty_chart() {
        let request = PlotRequest::count_by("login", "t", "x", "y");
        let empty = logins().head(0);
        let output = build_plot(&empty, &request).expect("plot");
        assert!(output.aggregate.is_empty());
        assert!(output.chart.is_empty());
    }
}

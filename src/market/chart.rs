use crate::market::types::{ChartData, ChartSeries, SymbolStats};

/// Replaces the data of the series named `symbol`, or appends a new series.
///
/// Matching is exact and case-sensitive; the position of an existing series is kept.
pub fn update_chart_data(series: &mut Vec<ChartSeries>, symbol: &str, value: ChartData) {
    match series.iter_mut().find(|entry| entry.name == symbol) {
        Some(entry) => entry.data = value,
        None => series.push(ChartSeries {
            name: symbol.to_string(),
            data: value,
        }),
    }
}

pub fn upsert_symbol_stats(rows: &mut Vec<SymbolStats>, stats: SymbolStats) {
    match rows.iter_mut().find(|row| row.symbol == stats.symbol) {
        Some(row) => *row = stats,
        None => rows.push(stats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(name: &str, value: f64) -> ChartSeries {
        ChartSeries {
            name: name.to_string(),
            data: ChartData::Value(value),
        }
    }

    #[test]
    fn replaces_existing_series_in_place() {
        let mut data = vec![series("ABCD", 10.0), series("IJKL", 50.0)];

        update_chart_data(&mut data, "ABCD", ChartData::Value(30.0));

        assert_eq!(data, vec![series("ABCD", 30.0), series("IJKL", 50.0)]);
    }

    #[test]
    fn appends_unseen_series_at_the_end() {
        let mut data = vec![series("ABCD", 30.0), series("IJKL", 50.0)];

        update_chart_data(&mut data, "EFGH", ChartData::Value(22.15));

        assert_eq!(
            data,
            vec![series("ABCD", 30.0), series("IJKL", 50.0), series("EFGH", 22.15)]
        );
    }

    #[test]
    fn match_is_case_sensitive() {
        let mut data = vec![series("abcd", 1.0)];
        update_chart_data(&mut data, "ABCD", ChartData::Value(2.0));
        assert_eq!(data.len(), 2);
        assert_eq!(data[0], series("abcd", 1.0));
    }

    #[test]
    fn repeated_updates_converge() {
        let mut data = vec![series("ABCD", 10.0)];
        let points = ChartData::Points(vec![[10.0, 1.0], [121.0, 10.0], [150.0, 5.0]]);

        update_chart_data(&mut data, "ABCD", points.clone());
        let after_first = data.clone();
        update_chart_data(&mut data, "ABCD", points);

        assert_eq!(data, after_first);
    }

    #[test]
    fn upserts_stats_rows_by_symbol() {
        let mut rows = Vec::new();
        let first = SymbolStats {
            symbol: "TEST".to_string(),
            cumulative_return: Some(10.0),
            annualized_cumulative_return: Some(15.0),
            annualized_volatility: Some(20.0),
        };
        upsert_symbol_stats(&mut rows, first.clone());
        upsert_symbol_stats(
            &mut rows,
            SymbolStats {
                symbol: "ABCD".to_string(),
                cumulative_return: Some(90.0),
                annualized_cumulative_return: None,
                annualized_volatility: Some(23.0),
            },
        );
        upsert_symbol_stats(
            &mut rows,
            SymbolStats {
                cumulative_return: Some(11.0),
                ..first
            },
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, "TEST");
        assert_eq!(rows[0].cumulative_return, Some(11.0));
    }
}

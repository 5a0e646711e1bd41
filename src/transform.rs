//! Conversion of raw price history into chart series

use crate::{
    constants::DATE_LABEL_FORMAT,
    error::DashboardError,
    format,
    types::{ChartSeries, CurrencyCode, PricePoint},
};

/// Turns provider price points into an index-aligned chart series
#[derive(Debug, Clone)]
pub struct TimeSeriesTransformer {
    date_format: String,
}

impl TimeSeriesTransformer {
    /// Creates a transformer labelling points with the chrono `date_format`
    ///
    /// Formats with unknown specifiers are rejected up front.
    pub fn new(date_format: impl Into<String>) -> Result<Self, DashboardError> {
        let date_format = date_format.into();
        if !format::is_valid_date_format(&date_format) {
            return Err(DashboardError::InvalidConfig(format!(
                "invalid date label format '{}'",
                date_format
            )));
        }

        Ok(Self { date_format })
    }

    /// Builds the chart series for one asset
    ///
    /// Input order is kept as is. Points falling on the same day produce
    /// repeated labels; nothing is merged or sorted.
    pub fn to_chart_series(
        &self,
        points: &[PricePoint],
        asset_display_name: &str,
        currency: CurrencyCode,
    ) -> ChartSeries {
        let (labels, values) = points
            .iter()
            .map(|p| {
                let label = format::date_label(p.timestamp_millis, &self.date_format);
                (label, p.price)
            })
            .unzip();

        ChartSeries {
            title: format::series_title(asset_display_name, currency),
            labels,
            values,
        }
    }
}

impl Default for TimeSeriesTransformer {
    fn default() -> Self {
        Self {
            date_format: DATE_LABEL_FORMAT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;
    // 2024-01-01T00:00:00Z
    const JAN_1: i64 = 1_704_067_200_000;

    #[test]
    fn test_empty_input_yields_empty_series() {
        let series =
            TimeSeriesTransformer::default().to_chart_series(&[], "Bitcoin", CurrencyCode::Usd);
        assert!(series.labels.is_empty());
        assert!(series.values.is_empty());
        assert_eq!(series.title, "Bitcoin (USD)");
    }

    #[test]
    fn test_two_points_keep_order_and_values() {
        let points = [PricePoint::new(JAN_1, 10.0), PricePoint::new(JAN_1 + DAY_MS, 20.0)];
        let series =
            TimeSeriesTransformer::default().to_chart_series(&points, "Bitcoin", CurrencyCode::Usd);

        assert_eq!(series.labels, vec!["01.01.2024", "02.01.2024"]);
        assert_eq!(series.values, vec![10.0, 20.0]);
    }

    #[test]
    fn test_same_day_points_keep_duplicate_labels() {
        let points = [
            PricePoint::new(JAN_1, 1.0),
            PricePoint::new(JAN_1 + 3_600_000, 2.0),
            PricePoint::new(JAN_1 + 3_600_000, 3.0),
        ];
        let series =
            TimeSeriesTransformer::default().to_chart_series(&points, "XRP", CurrencyCode::Pln);

        assert_eq!(series.len(), 3);
        assert_eq!(series.labels, vec!["01.01.2024"; 3]);
        assert_eq!(series.values, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.title, "XRP (PLN)");
    }

    #[test]
    fn test_unsorted_input_is_not_reordered() {
        let points = [PricePoint::new(JAN_1 + DAY_MS, 5.0), PricePoint::new(JAN_1, 4.0)];
        let transformer = TimeSeriesTransformer::new("%Y-%m-%d").unwrap();
        let series = transformer.to_chart_series(&points, "Litecoin", CurrencyCode::Eur);

        assert_eq!(series.labels, vec!["2024-01-02", "2024-01-01"]);
        assert_eq!(series.values, vec![5.0, 4.0]);
    }

    #[test]
    fn test_unknown_date_specifier_is_rejected() {
        let err = TimeSeriesTransformer::new("%Q").unwrap_err();
        assert!(matches!(err, DashboardError::InvalidConfig(_)));
        assert!(err.to_string().contains("%Q"));
    }
}

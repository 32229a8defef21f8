//! Cross-DAO aggregation of daily series.
//!
//! Several independently fetched per-DAO series are outer-joined by date
//! and averaged over the entries actually present at each date. Two numeric
//! regimes exist and deliberately differ in their ordering contract: the
//! fixed-point regime sorts its output by date (its inputs are unordered
//! per-date maps), the plain regime preserves first-encountered input order
//! (its callers feed pre-ordered series).

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Number of decimals carried by fixed-point (wei-scale) values.
pub const FIXED_POINT_DECIMALS: u32 = 18;

/// One dated value in a named series. `value` is the raw string from the
/// store; the empty string marks an absent measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: i64,
    pub value: String,
}

/// A per-DAO daily series with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedSeries {
    pub entity: String,
    pub points: Vec<SeriesPoint>,
}

/// Outer-join mean over 10^18-scaled integer strings.
///
/// A date missing from a series, or present with an empty-string value,
/// contributes to neither numerator nor denominator for that date.
/// Division truncates toward zero — never rounds — at 18-decimal scale,
/// with the sum carried in checked i128 arithmetic. Output ascends by date.
pub fn mean_fixed_point(series: &[NamedSeries]) -> Result<Vec<SeriesPoint>> {
    let mut sums: HashMap<i64, (i128, u32)> = HashMap::new();
    for named in series {
        for point in &named.points {
            if point.value.is_empty() {
                continue;
            }
            let value: i128 = point.value.parse().map_err(|_| {
                Error::validation(format!(
                    "invalid fixed-point value '{}' for entity '{}'",
                    point.value, named.entity
                ))
            })?;
            let entry = sums.entry(point.date).or_insert((0, 0));
            entry.0 = entry.0.checked_add(value).ok_or_else(|| {
                Error::validation(format!("fixed-point sum overflow at date {}", point.date))
            })?;
            entry.1 += 1;
        }
    }

    let mut dates: Vec<i64> = sums.keys().copied().collect();
    dates.sort_unstable();
    Ok(dates
        .into_iter()
        .map(|date| {
            let (sum, count) = sums[&date];
            SeriesPoint {
                date,
                value: (sum / i128::from(count)).to_string(),
            }
        })
        .collect())
}

/// Outer-join mean over plain decimal strings, rounded half-up to two
/// places in the output string. Output dates keep first-encountered input
/// order — no re-sort of what the callers already ordered.
pub fn mean_plain(series: &[NamedSeries]) -> Result<Vec<SeriesPoint>> {
    let mut sums: HashMap<i64, (Decimal, u32)> = HashMap::new();
    let mut date_order: Vec<i64> = Vec::new();
    for named in series {
        for point in &named.points {
            if point.value.is_empty() {
                continue;
            }
            let value = Decimal::from_str_exact(&point.value).map_err(|e| {
                Error::validation(format!(
                    "invalid decimal value '{}' for entity '{}': {}",
                    point.value, named.entity, e
                ))
            })?;
            let entry = match sums.entry(point.date) {
                Entry::Occupied(occupied) => occupied.into_mut(),
                Entry::Vacant(vacant) => {
                    date_order.push(point.date);
                    vacant.insert((Decimal::ZERO, 0))
                }
            };
            entry.0 += value;
            entry.1 += 1;
        }
    }

    Ok(date_order
        .into_iter()
        .map(|date| {
            let (sum, count) = sums[&date];
            let mut mean = (sum / Decimal::from(count))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            mean.rescale(2);
            SeriesPoint {
                date,
                value: mean.to_string(),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const D1: i64 = 86_400;
    const D2: i64 = 2 * 86_400;
    const D3: i64 = 3 * 86_400;

    fn series(entity: &str, points: &[(i64, &str)]) -> NamedSeries {
        NamedSeries {
            entity: entity.to_string(),
            points: points
                .iter()
                .map(|(date, value)| SeriesPoint {
                    date: *date,
                    value: value.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn fixed_point_mean_of_aligned_series() {
        let input = vec![
            series(
                "ENS",
                &[
                    (D1, "50000000000000000000"),
                    (D2, "60000000000000000000"),
                ],
            ),
            series(
                "UNI",
                &[
                    (D1, "40000000000000000000"),
                    (D2, "50000000000000000000"),
                ],
            ),
        ];

        let result = mean_fixed_point(&input).expect("mean");

        assert_eq!(
            result,
            vec![
                SeriesPoint { date: D1, value: "45000000000000000000".to_string() },
                SeriesPoint { date: D2, value: "55000000000000000000".to_string() },
            ]
        );
    }

    #[test]
    fn fixed_point_mean_outer_joins_dates() {
        let input = vec![
            series(
                "ENS",
                &[
                    (D1, "50000000000000000000"),
                    (D2, "60000000000000000000"),
                ],
            ),
            series(
                "UNI",
                &[
                    (D2, "40000000000000000000"),
                    (D3, "30000000000000000000"),
                ],
            ),
        ];

        let result = mean_fixed_point(&input).expect("mean");

        // D1 and D3 average over the single present entity.
        assert_eq!(
            result,
            vec![
                SeriesPoint { date: D1, value: "50000000000000000000".to_string() },
                SeriesPoint { date: D2, value: "50000000000000000000".to_string() },
                SeriesPoint { date: D3, value: "30000000000000000000".to_string() },
            ]
        );
    }

    #[test]
    fn fixed_point_mean_skips_empty_string_values() {
        let input = vec![
            series("ENS", &[(D1, "50000000000000000000")]),
            series("UNI", &[(D1, "")]),
        ];

        let result = mean_fixed_point(&input).expect("mean");

        assert_eq!(result[0].value, "50000000000000000000");
    }

    #[test]
    fn fixed_point_mean_truncates_exactly() {
        let input = vec![
            series("ENS", &[(D1, "12345678901234567890")]),
            series("UNI", &[(D1, "23456789012345678901")]),
        ];

        let result = mean_fixed_point(&input).expect("mean");

        // (12345678901234567890 + 23456789012345678901) / 2, truncated.
        assert_eq!(result[0].value, "17901233956790123395");
    }

    #[test]
    fn fixed_point_mean_output_is_sorted_by_date() {
        let input = vec![
            series("ENS", &[(D3, "3000000000000000000"), (D1, "1000000000000000000")]),
            series("UNI", &[(D2, "2000000000000000000")]),
        ];

        let result = mean_fixed_point(&input).expect("mean");

        let dates: Vec<i64> = result.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![D1, D2, D3]);
    }

    #[test]
    fn fixed_point_mean_rejects_garbage_values() {
        let input = vec![series("ENS", &[(D1, "not-a-number")])];
        assert!(mean_fixed_point(&input).is_err());
    }

    #[test]
    fn fixed_point_mean_of_no_series_is_empty() {
        assert!(mean_fixed_point(&[]).expect("mean").is_empty());
    }

    #[test]
    fn plain_mean_rounds_half_up_to_two_places() {
        let input = vec![
            series("ENS", &[(D1, "12.35")]),
            series("UNI", &[(D1, "23.46")]),
        ];

        let result = mean_plain(&input).expect("mean");

        // (12.35 + 23.46) / 2 = 17.905 rounds to 17.91, not 17.90.
        assert_eq!(result[0].value, "17.91");
    }

    #[test]
    fn plain_mean_preserves_input_order() {
        let input = vec![
            series("ENS", &[(D3, "3"), (D1, "1")]),
            series("UNI", &[(D2, "2"), (D1, "5")]),
        ];

        let result = mean_plain(&input).expect("mean");

        let dates: Vec<i64> = result.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![D3, D1, D2]);
        assert_eq!(result[1].value, "3.00");
    }

    #[test]
    fn plain_mean_skips_empty_string_values() {
        let input = vec![
            series("ENS", &[(D1, "10")]),
            series("UNI", &[(D1, "")]),
            series("GTC", &[(D1, "20")]),
        ];

        let result = mean_plain(&input).expect("mean");

        assert_eq!(result, vec![SeriesPoint { date: D1, value: "15.00".to_string() }]);
    }

    #[test]
    fn plain_mean_of_no_series_is_empty() {
        assert!(mean_plain(&[]).expect("mean").is_empty());
    }
}

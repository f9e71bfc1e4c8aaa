//! Survival aggregation and statistics.
//!
//! Every function here is a pure pass over a slice of passenger records and
//! produces the data for one dashboard chart. Empty or degenerate input
//! yields zero rates and empty sequences, never an error.

use crate::config::AnalysisConfig;
use crate::models::{ratio, AgeBin, Dashboard, GroupSummary, Passenger, SurvivalOverview};
use indexmap::IndexMap;
use std::hash::Hash;

/// Default width of an age histogram bucket, in years.
pub const DEFAULT_AGE_BIN_SIZE: u32 = 10;

/// Default label for passengers with no recorded embarkation port.
pub const DEFAULT_UNKNOWN_PORT: &str = "Unknown";

/// Parameters for building a dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Width of the age histogram buckets.
    pub age_bin_size: u32,
    /// Group label used for an empty embarkation port.
    pub unknown_port_label: String,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            age_bin_size: DEFAULT_AGE_BIN_SIZE,
            unknown_port_label: DEFAULT_UNKNOWN_PORT.to_string(),
        }
    }
}

impl From<&AnalysisConfig> for AnalysisOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            age_bin_size: config.age_bin_size,
            unknown_port_label: config.unknown_port_label.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct Tally {
    total: usize,
    survived: usize,
}

/// Group records by `key_fn` and compute survival statistics per group.
///
/// Groups are emitted in the order their key was first seen. No sorting or
/// filtering is applied; callers do that as an explicit final step.
pub fn group_survival<K, F>(records: &[Passenger], key_fn: F) -> Vec<GroupSummary<K>>
where
    K: Hash + Eq,
    F: Fn(&Passenger) -> K,
{
    let mut groups: IndexMap<K, Tally> = IndexMap::new();

    for passenger in records {
        let tally = groups.entry(key_fn(passenger)).or_default();
        tally.total += 1;
        if passenger.has_survived() {
            tally.survived += 1;
        }
    }

    groups
        .into_iter()
        .map(|(key, tally)| GroupSummary::new(key, tally.total, tally.survived))
        .collect()
}

/// Overall survivor counts.
pub fn survival_overview(records: &[Passenger]) -> SurvivalOverview {
    let survived = records.iter().filter(|p| p.has_survived()).count();

    SurvivalOverview {
        total: records.len(),
        survived,
        rate: ratio(survived, records.len()),
    }
}

/// Fraction of passengers who survived, in `[0, 1]`. Zero for no records.
pub fn overall_survival_rate(records: &[Passenger]) -> f64 {
    survival_overview(records).rate
}

/// Survival by sex, in first-seen order.
pub fn survival_by_sex(records: &[Passenger]) -> Vec<GroupSummary<String>> {
    group_survival(records, |p| p.sex.clone())
}

/// Survival by passenger class, in first-seen order.
pub fn survival_by_class(records: &[Passenger]) -> Vec<GroupSummary<i32>> {
    group_survival(records, |p| p.pclass)
}

/// Survival by embarkation port, largest group first.
///
/// Passengers with no port are grouped under `unknown_label`. Groups of
/// equal size keep their first-seen order.
pub fn survival_by_embarked(records: &[Passenger], unknown_label: &str) -> Vec<GroupSummary<String>> {
    let mut groups = group_survival(records, |p| {
        if p.embarked.is_empty() {
            unknown_label.to_string()
        } else {
            p.embarked.clone()
        }
    });

    groups.sort_by_key(|g| std::cmp::Reverse(g.total));
    groups
}

/// Survival by number of relatives aboard, smallest family first.
///
/// Family sizes with no survivors are left out, so a population without
/// any survivor produces an empty result.
pub fn survival_by_family_size(records: &[Passenger]) -> Vec<GroupSummary<u32>> {
    let mut groups = group_survival(records, Passenger::family_size);

    groups.retain(|g| g.rate > 0.0);
    groups.sort_by_key(|g| g.key);
    groups
}

/// Fixed-width histogram of known ages.
///
/// Buckets are `[start, start + bin_size)` and run from 0 through the bucket
/// holding the oldest passenger, including empty buckets in between.
/// Passengers without a known age (see [`Passenger::known_age`]) are
/// ignored, which bounds the number of buckets. A `bin_size` of 0 falls back
/// to [`DEFAULT_AGE_BIN_SIZE`].
pub fn age_distribution(records: &[Passenger], bin_size: u32) -> Vec<AgeBin> {
    let bin_size = if bin_size == 0 {
        DEFAULT_AGE_BIN_SIZE
    } else {
        bin_size
    };
    let width = f64::from(bin_size);

    let ages: Vec<f64> = records.iter().filter_map(Passenger::known_age).collect();
    let Some(max_age) = ages.iter().copied().reduce(f64::max) else {
        return Vec::new();
    };

    let last = (max_age / width).floor() as usize;
    let mut bins: Vec<AgeBin> = (0..=last)
        .map(|i| {
            let start = (i as u32).saturating_mul(bin_size);
            AgeBin::new(start, start.saturating_add(bin_size))
        })
        .collect();

    for age in ages {
        let index = (age / width).floor() as usize;
        if let Some(bin) = bins.get_mut(index) {
            bin.count += 1;
        }
    }

    bins
}

/// Keep only the passengers whose sex is exactly `sex`.
pub fn filter_by_sex(records: &[Passenger], sex: &str) -> Vec<Passenger> {
    records.iter().filter(|p| p.sex == sex).cloned().collect()
}

/// Compute every chart of the dashboard from one record collection.
pub fn build_dashboard(records: &[Passenger], options: &AnalysisOptions) -> Dashboard {
    Dashboard {
        overview: survival_overview(records),
        by_sex: survival_by_sex(records),
        by_class: survival_by_class(records),
        age_distribution: age_distribution(records, options.age_bin_size),
        by_embarked: survival_by_embarked(records, &options.unknown_port_label),
        by_family_size: survival_by_family_size(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn passenger(sex: &str, survived: i32) -> Passenger {
        Passenger {
            sex: sex.to_string(),
            survived,
            ..Default::default()
        }
    }

    fn with_age(age: Option<f64>) -> Passenger {
        Passenger {
            age,
            ..Default::default()
        }
    }

    fn embarked(port: &str, survived: i32) -> Passenger {
        Passenger {
            embarked: port.to_string(),
            survived,
            ..Default::default()
        }
    }

    fn family(sibsp: u32, parch: u32, survived: i32) -> Passenger {
        Passenger {
            sibsp,
            parch,
            survived,
            ..Default::default()
        }
    }

    #[test]
    fn test_overall_survival_rate() {
        assert_eq!(overall_survival_rate(&[]), 0.0);

        let records = vec![
            passenger("male", 1),
            passenger("male", 0),
            passenger("female", 1),
            passenger("female", 1),
        ];
        assert_eq!(overall_survival_rate(&records), 0.75);
    }

    #[test]
    fn test_overview_counts() {
        let records = vec![passenger("male", 1), passenger("male", 0), passenger("male", 7)];
        let overview = survival_overview(&records);

        assert_eq!(overview.total, 3);
        assert_eq!(overview.survived, 1);
        assert_eq!(overview.perished(), 2);
    }

    #[test]
    fn test_survival_by_sex_first_seen_order() {
        let records = vec![
            passenger("male", 0),
            passenger("male", 1),
            passenger("female", 1),
        ];

        let by_sex = survival_by_sex(&records);

        assert_eq!(
            by_sex,
            vec![
                GroupSummary::new("male".to_string(), 2, 1),
                GroupSummary::new("female".to_string(), 1, 1),
            ]
        );
        assert_eq!(by_sex[0].rate, 0.5);
        assert_eq!(by_sex[1].rate, 1.0);
    }

    #[test]
    fn test_survival_by_class_is_not_sorted() {
        let records = vec![
            Passenger {
                pclass: 3,
                ..Default::default()
            },
            Passenger {
                pclass: 1,
                survived: 1,
                ..Default::default()
            },
            Passenger {
                pclass: 3,
                survived: 1,
                ..Default::default()
            },
            Passenger {
                pclass: 7,
                ..Default::default()
            },
        ];

        let by_class = survival_by_class(&records);
        let keys: Vec<i32> = by_class.iter().map(|g| g.key).collect();

        assert_eq!(keys, vec![3, 1, 7]);
        assert_eq!(by_class[0].total, 2);
        assert_eq!(by_class[0].survived, 1);
    }

    #[test]
    fn test_survival_by_embarked_folds_unknown_and_sorts() {
        let records = vec![
            embarked("C", 1),
            embarked("S", 0),
            embarked("", 1),
            embarked("S", 1),
            embarked("S", 0),
            embarked("", 0),
            embarked("Q", 0),
        ];

        let by_port = survival_by_embarked(&records, "Unknown");
        let keys: Vec<&str> = by_port.iter().map(|g| g.key.as_str()).collect();

        assert_eq!(keys, vec!["S", "Unknown", "C", "Q"]);
        assert_eq!(by_port[0].total, 3);
        assert_eq!(by_port[1].total, 2);
        assert_eq!(by_port[1].survived, 1);
    }

    #[test]
    fn test_survival_by_family_size_single_non_survivor() {
        let records = vec![family(0, 0, 0)];
        assert!(survival_by_family_size(&records).is_empty());
    }

    #[test]
    fn test_survival_by_family_size_filters_and_sorts() {
        let records = vec![
            family(2, 1, 1),
            family(0, 0, 0),
            family(1, 0, 1),
            family(0, 1, 0),
            family(5, 0, 0),
            family(0, 0, 1),
        ];

        let by_family = survival_by_family_size(&records);
        let keys: Vec<u32> = by_family.iter().map(|g| g.key).collect();

        assert_eq!(keys, vec![0, 1, 3]);
        assert_eq!(by_family[0].total, 2);
        assert_eq!(by_family[1].rate, 0.5);
    }

    #[test]
    fn test_age_distribution_scenario() {
        let records: Vec<_> = [5.0, 15.0, 25.0, 34.0]
            .into_iter()
            .map(|a| with_age(Some(a)))
            .collect();

        let bins = age_distribution(&records, 10);
        let summary: Vec<(&str, usize)> = bins.iter().map(|b| (b.range.as_str(), b.count)).collect();

        assert_eq!(
            summary,
            vec![("0-9", 1), ("10-19", 1), ("20-29", 1), ("30-39", 1)]
        );
    }

    #[test]
    fn test_age_distribution_boundaries_and_gaps() {
        let records = vec![
            with_age(Some(0.42)),
            with_age(None),
            with_age(Some(40.0)),
            with_age(Some(9.99)),
        ];

        let bins = age_distribution(&records, 10);
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();

        // 40 opens the 40-49 bucket; 10-39 stay as empty buckets.
        assert_eq!(counts, vec![2, 0, 0, 0, 1]);
        assert_eq!(bins[4].range, "40-49");
    }

    #[test]
    fn test_age_distribution_zero_age_is_counted() {
        let bins = age_distribution(&[with_age(Some(0.0))], 5);
        assert_eq!(bins, vec![AgeBin { count: 1, ..AgeBin::new(0, 5) }]);
    }

    #[test]
    fn test_age_distribution_ignores_implausible_ages() {
        let records = vec![
            with_age(Some(1e20)),
            with_age(Some(1e12)),
            with_age(Some(f64::MAX)),
            with_age(Some(34.0)),
        ];

        let bins = age_distribution(&records, 10);

        assert_eq!(bins.len(), 4);
        assert_eq!(bins[3].range, "30-39");
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 1);

        assert!(age_distribution(&[with_age(Some(1e20))], 1).is_empty());
    }

    #[test]
    fn test_age_distribution_without_known_ages() {
        let records = vec![with_age(None), with_age(None)];
        assert!(age_distribution(&records, 10).is_empty());
    }

    #[test]
    fn test_age_distribution_zero_bin_size_uses_default() {
        let records = vec![with_age(Some(12.0))];
        let bins = age_distribution(&records, 0);

        assert_eq!(bins.len(), 2);
        assert_eq!(bins[1].range, "10-19");
    }

    #[test]
    fn test_empty_input() {
        let records: Vec<Passenger> = Vec::new();

        assert_eq!(overall_survival_rate(&records), 0.0);
        assert!(survival_by_sex(&records).is_empty());
        assert!(survival_by_class(&records).is_empty());
        assert!(survival_by_embarked(&records, DEFAULT_UNKNOWN_PORT).is_empty());
        assert!(survival_by_family_size(&records).is_empty());
        assert!(age_distribution(&records, DEFAULT_AGE_BIN_SIZE).is_empty());
    }

    #[test]
    fn test_filter_by_sex() {
        let records = vec![
            passenger("male", 0),
            passenger("female", 1),
            passenger("Female", 1),
        ];

        let female = filter_by_sex(&records, "female");
        assert_eq!(female.len(), 1);

        let dashboard = build_dashboard(&female, &AnalysisOptions::default());
        assert_eq!(dashboard.overview.rate, 1.0);
        assert_eq!(dashboard.by_sex.len(), 1);
    }

    #[test]
    fn test_build_dashboard_uses_options() {
        let records = vec![
            Passenger {
                age: Some(7.0),
                survived: 1,
                ..Default::default()
            },
            embarked("", 0),
        ];
        let options = AnalysisOptions {
            age_bin_size: 5,
            unknown_port_label: "?".to_string(),
        };

        let dashboard = build_dashboard(&records, &options);

        assert_eq!(dashboard.age_distribution.len(), 2);
        assert_eq!(dashboard.by_embarked[0].key, "?");
        assert_eq!(dashboard.by_embarked[0].total, 2);
    }

    fn passenger_strategy() -> impl Strategy<Value = Passenger> {
        (
            1i32..=3,
            0i32..=1,
            prop::sample::select(vec!["male", "female"]),
            prop::option::of(0.0f64..90.0),
            0u32..5,
            0u32..5,
            prop::sample::select(vec!["S", "C", "Q", ""]),
        )
            .prop_map(|(pclass, survived, sex, age, sibsp, parch, port)| Passenger {
                pclass,
                survived,
                sex: sex.to_string(),
                age,
                sibsp,
                parch,
                embarked: port.to_string(),
                ..Default::default()
            })
    }

    fn survivors(records: &[Passenger]) -> usize {
        records.iter().filter(|p| p.has_survived()).count()
    }

    fn sums<K>(groups: &[GroupSummary<K>]) -> (usize, usize) {
        groups
            .iter()
            .fold((0, 0), |(t, s), g| (t + g.total, s + g.survived))
    }

    proptest! {
        #[test]
        fn groupings_partition_records(records in prop::collection::vec(passenger_strategy(), 0..200)) {
            let expected = (records.len(), survivors(&records));

            prop_assert_eq!(sums(&survival_by_sex(&records)), expected);
            prop_assert_eq!(sums(&survival_by_class(&records)), expected);
            prop_assert_eq!(sums(&survival_by_embarked(&records, DEFAULT_UNKNOWN_PORT)), expected);
            prop_assert_eq!(sums(&group_survival(&records, Passenger::family_size)), expected);
            prop_assert_eq!(sums(&survival_by_family_size(&records)).1, expected.1);
        }

        #[test]
        fn overall_rate_matches_counts(records in prop::collection::vec(passenger_strategy(), 1..200)) {
            let expected = survivors(&records) as f64 / records.len() as f64;
            let rate = overall_survival_rate(&records);

            prop_assert!((rate - expected).abs() < 1e-12);
            prop_assert!((0.0..=1.0).contains(&rate));
        }

        #[test]
        fn embarked_sorted_by_total_desc(records in prop::collection::vec(passenger_strategy(), 0..200)) {
            let groups = survival_by_embarked(&records, DEFAULT_UNKNOWN_PORT);

            for pair in groups.windows(2) {
                prop_assert!(pair[0].total >= pair[1].total);
            }
            prop_assert!(groups.iter().all(|g| !g.key.is_empty()));
        }

        #[test]
        fn family_sorted_without_zero_rates(records in prop::collection::vec(passenger_strategy(), 0..200)) {
            let groups = survival_by_family_size(&records);

            for pair in groups.windows(2) {
                prop_assert!(pair[0].key < pair[1].key);
            }
            prop_assert!(groups.iter().all(|g| g.rate > 0.0));
        }

        #[test]
        fn age_bins_are_contiguous(
            records in prop::collection::vec(passenger_strategy(), 0..200),
            bin_size in 1u32..25,
        ) {
            let bins = age_distribution(&records, bin_size);
            let known: Vec<f64> = records.iter().filter_map(Passenger::known_age).collect();

            prop_assert_eq!(bins.is_empty(), known.is_empty());
            prop_assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), known.len());

            for (i, bin) in bins.iter().enumerate() {
                prop_assert_eq!(bin.start, i as u32 * bin_size);
                prop_assert_eq!(bin.end, bin.start + bin_size);
            }

            if let Some(last) = bins.last() {
                let max = known.iter().copied().fold(0.0, f64::max);
                prop_assert!(f64::from(last.start) <= max && max < f64::from(last.end));
            }
        }

        #[test]
        fn sex_filter_is_a_plain_subset(records in prop::collection::vec(passenger_strategy(), 0..200)) {
            let male = filter_by_sex(&records, "male");
            let by_sex = survival_by_sex(&male);

            prop_assert!(by_sex.len() <= 1);
            prop_assert_eq!(sums(&by_sex), (male.len(), survivors(&male)));
        }
    }
}

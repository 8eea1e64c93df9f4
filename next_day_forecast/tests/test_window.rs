use next_day_forecast::{build_windows, split};
use rstest::rstest;

fn series(len: usize) -> Vec<f64> {
    (0..len).map(|i| i as f64).collect()
}

#[rstest]
#[case(59, 60)]
#[case(60, 60)]
#[case(10, 10)]
#[case(0, 5)]
fn series_no_longer_than_window_yields_nothing(#[case] len: usize, #[case] w: usize) {
    assert!(build_windows(&series(len), w).is_empty());
}

#[rstest]
#[case(61, 60, 1)]
#[case(100, 60, 39)]
#[case(65, 60, 5)]
#[case(12, 10, 2)]
fn window_count_is_length_minus_window(#[case] len: usize, #[case] w: usize, #[case] expected: usize) {
    let dataset = build_windows(&series(len), w);
    assert_eq!(dataset.len(), expected);
    assert!(dataset.inputs.iter().all(|window| window.len() == w));
}

#[test]
fn split_partitions_without_overlap_or_reordering() {
    // 100 points with a 60-day window: 39 samples, split 31/8 at 0.8
    let dataset = build_windows(&series(100), 60);
    assert_eq!(dataset.len(), 39);

    let (train, test) = split(dataset, 0.8);
    assert_eq!(train.len(), 31);
    assert_eq!(test.len(), 8);

    // Train is the exact prefix: its last target precedes test's first
    assert_eq!(train.targets[30], 90.0);
    assert_eq!(test.targets[0], 91.0);
    // Order within both halves is the original temporal order
    assert!(train.targets.windows(2).all(|p| p[0] < p[1]));
    assert!(test.targets.windows(2).all(|p| p[0] < p[1]));
}

#[rstest]
#[case(1, 0.8)]
#[case(5, 0.8)]
#[case(39, 0.8)]
#[case(40, 0.5)]
fn split_sizes_always_sum_to_total(#[case] samples: usize, #[case] ratio: f64) {
    let dataset = build_windows(&series(samples + 7), 7);
    assert_eq!(dataset.len(), samples);

    let expected_train = (samples as f64 * ratio).floor() as usize;
    let (train, test) = split(dataset, ratio);
    assert_eq!(train.len(), expected_train);
    assert_eq!(train.len() + test.len(), samples);
}

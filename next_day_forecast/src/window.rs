//! Sliding-window dataset construction and temporal train/test splitting

/// Supervised dataset of fixed-length input windows and scalar targets.
///
/// `targets[i]` is the series value immediately following `inputs[i]`.
#[derive(Debug, Clone, Default)]
pub struct WindowedDataset {
    /// Input windows, each of the configured window length
    pub inputs: Vec<Vec<f64>>,
    /// Next-step target for each window
    pub targets: Vec<f64>,
}

impl WindowedDataset {
    /// Number of (window, target) samples
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Whether the dataset holds no samples
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Build the supervised dataset from a scaled series.
///
/// A series of length `L` yields `L - w` samples; `L <= w` yields an
/// empty dataset, which the caller must translate into an
/// insufficient-history condition before training.
pub fn build_windows(series: &[f64], w: usize) -> WindowedDataset {
    if w == 0 || series.len() <= w {
        return WindowedDataset::default();
    }

    let count = series.len() - w;
    let mut inputs = Vec::with_capacity(count);
    let mut targets = Vec::with_capacity(count);
    for i in 0..count {
        inputs.push(series[i..i + w].to_vec());
        targets.push(series[i + w]);
    }

    WindowedDataset { inputs, targets }
}

/// Deterministic prefix/suffix partition of a windowed dataset.
///
/// The split index is `floor(len * ratio)`; train is the prefix, test the
/// suffix. No shuffling: the data is temporally ordered and randomizing
/// would leak future information into training.
pub fn split(dataset: WindowedDataset, ratio: f64) -> (WindowedDataset, WindowedDataset) {
    let split_at = (dataset.len() as f64 * ratio).floor() as usize;

    let mut inputs = dataset.inputs;
    let mut targets = dataset.targets;
    let test_inputs = inputs.split_off(split_at);
    let test_targets = targets.split_off(split_at);

    (
        WindowedDataset { inputs, targets },
        WindowedDataset {
            inputs: test_inputs,
            targets: test_targets,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_follows_its_window() {
        let series: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let dataset = build_windows(&series, 4);
        assert_eq!(dataset.len(), 6);
        for (i, window) in dataset.inputs.iter().enumerate() {
            assert_eq!(window.len(), 4);
            assert_eq!(dataset.targets[i], series[i + 4]);
        }
    }

    #[test]
    fn short_series_yields_empty_dataset() {
        let series = vec![1.0, 2.0, 3.0];
        assert!(build_windows(&series, 3).is_empty());
        assert!(build_windows(&series, 10).is_empty());
        assert!(build_windows(&[], 3).is_empty());
    }
}

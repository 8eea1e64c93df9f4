//! Two-layer recurrent sequence regressor
//!
//! An Elman-style network: the first recurrent layer feeds its full
//! hidden sequence into the second, whose final state drives a single
//! linear output unit. Inverted dropout follows each recurrent layer
//! during training. Trained with mini-batch SGD on MSE loss, gradients
//! backpropagated through time and clipped.
//!
//! The math is hand-rolled over plain vectors; the window is short (60
//! steps by default) and the datasets are small, so there is no need for
//! anything heavier.

use crate::config::ForecastConfig;
use crate::error::{ForecastError, Result};
use crate::models::SequenceRegressor;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::debug;

const GRADIENT_CLIP: f64 = 5.0;

/// Two-layer recurrent network with a linear output unit
#[derive(Debug)]
pub struct RecurrentNet {
    name: String,
    h1: usize,
    h2: usize,
    dropout: f64,
    learning_rate: f64,
    epochs: usize,
    batch_size: usize,
    rng: StdRng,

    // Layer 1: scalar input -> h1 units
    w_xh1: Vec<f64>,
    w_hh1: Vec<Vec<f64>>,
    b1: Vec<f64>,
    // Layer 2: h1 -> h2 units
    w_h1h2: Vec<Vec<f64>>,
    w_hh2: Vec<Vec<f64>>,
    b2: Vec<f64>,
    // Output unit
    w_out: Vec<f64>,
    b_out: f64,

    /// Window length fixed by the first `fit`; `None` until trained
    window: Option<usize>,
}

/// Gradient accumulator with the same shapes as the weights
struct Grads {
    w_xh1: Vec<f64>,
    w_hh1: Vec<Vec<f64>>,
    b1: Vec<f64>,
    w_h1h2: Vec<Vec<f64>>,
    w_hh2: Vec<Vec<f64>>,
    b2: Vec<f64>,
    w_out: Vec<f64>,
    b_out: f64,
}

impl Grads {
    fn zeros(h1: usize, h2: usize) -> Self {
        Self {
            w_xh1: vec![0.0; h1],
            w_hh1: vec![vec![0.0; h1]; h1],
            b1: vec![0.0; h1],
            w_h1h2: vec![vec![0.0; h1]; h2],
            w_hh2: vec![vec![0.0; h2]; h2],
            b2: vec![0.0; h2],
            w_out: vec![0.0; h2],
            b_out: 0.0,
        }
    }
}

/// Per-sample forward pass cache needed for backpropagation
struct ForwardPass {
    /// Post-activation states of layer 1, one vector per timestep
    h1s: Vec<Vec<f64>>,
    /// Dropout-masked layer 1 states fed into layer 2
    h1d: Vec<Vec<f64>>,
    /// Post-activation states of layer 2
    h2s: Vec<Vec<f64>>,
    /// Dropout-masked final layer 2 state
    h2d_last: Vec<f64>,
    mask1: Vec<f64>,
    mask2: Vec<f64>,
    output: f64,
}

impl RecurrentNet {
    /// Create an untrained network from the pipeline configuration
    pub fn from_config(config: &ForecastConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let [h1, h2] = config.hidden;

        // Weights drawn from N(0, 1/fan_in); small enough to keep tanh
        // activations away from saturation at the start of training.
        let init1 = Normal::new(0.0, 1.0 / ((1 + h1) as f64).sqrt()).unwrap();
        let init2 = Normal::new(0.0, 1.0 / ((h1 + h2) as f64).sqrt()).unwrap();
        let init_out = Normal::new(0.0, 1.0 / (h2 as f64).sqrt()).unwrap();

        let w_xh1 = (0..h1).map(|_| init1.sample(&mut rng)).collect();
        let w_hh1 = (0..h1)
            .map(|_| (0..h1).map(|_| init1.sample(&mut rng)).collect())
            .collect();
        let w_h1h2 = (0..h2)
            .map(|_| (0..h1).map(|_| init2.sample(&mut rng)).collect())
            .collect();
        let w_hh2 = (0..h2)
            .map(|_| (0..h2).map(|_| init2.sample(&mut rng)).collect())
            .collect();
        let w_out = (0..h2).map(|_| init_out.sample(&mut rng)).collect();

        Self {
            name: format!("RecurrentNet({}x{})", h1, h2),
            h1,
            h2,
            dropout: config.dropout,
            learning_rate: config.learning_rate,
            epochs: config.epochs,
            batch_size: config.batch_size,
            rng,
            w_xh1,
            w_hh1,
            b1: vec![0.0; h1],
            w_h1h2,
            w_hh2,
            b2: vec![0.0; h2],
            w_out,
            b_out: 0.0,
            window: None,
        }
    }

    fn sample_mask(&mut self, len: usize) -> Vec<f64> {
        if self.dropout == 0.0 {
            return vec![1.0; len];
        }
        let keep_scale = 1.0 / (1.0 - self.dropout);
        (0..len)
            .map(|_| {
                if self.rng.gen::<f64>() < self.dropout {
                    0.0
                } else {
                    keep_scale
                }
            })
            .collect()
    }

    /// Forward pass over one window. Masks of all ones give the
    /// inference-time behavior.
    fn forward(&self, window: &[f64], mask1: &[f64], mask2: &[f64]) -> ForwardPass {
        let t_len = window.len();
        let mut h1s: Vec<Vec<f64>> = Vec::with_capacity(t_len);
        let mut h1d: Vec<Vec<f64>> = Vec::with_capacity(t_len);
        let mut h2s: Vec<Vec<f64>> = Vec::with_capacity(t_len);

        let mut h1_prev = vec![0.0; self.h1];
        let mut h2_prev = vec![0.0; self.h2];

        for &x in window {
            let mut h1_t = vec![0.0; self.h1];
            for i in 0..self.h1 {
                let mut pre = self.w_xh1[i] * x + self.b1[i];
                for j in 0..self.h1 {
                    pre += self.w_hh1[i][j] * h1_prev[j];
                }
                h1_t[i] = pre.tanh();
            }
            let h1d_t: Vec<f64> = h1_t.iter().zip(mask1).map(|(h, m)| h * m).collect();

            let mut h2_t = vec![0.0; self.h2];
            for i in 0..self.h2 {
                let mut pre = self.b2[i];
                for j in 0..self.h1 {
                    pre += self.w_h1h2[i][j] * h1d_t[j];
                }
                for j in 0..self.h2 {
                    pre += self.w_hh2[i][j] * h2_prev[j];
                }
                h2_t[i] = pre.tanh();
            }

            h1_prev = h1_t.clone();
            h2_prev = h2_t.clone();
            h1s.push(h1_t);
            h1d.push(h1d_t);
            h2s.push(h2_t);
        }

        let h2d_last: Vec<f64> = h2s
            .last()
            .map(|h| h.iter().zip(mask2).map(|(v, m)| v * m).collect())
            .unwrap_or_else(|| vec![0.0; self.h2]);

        let mut output = self.b_out;
        for i in 0..self.h2 {
            output += self.w_out[i] * h2d_last[i];
        }

        ForwardPass {
            h1s,
            h1d,
            h2s,
            h2d_last,
            mask1: mask1.to_vec(),
            mask2: mask2.to_vec(),
            output,
        }
    }

    /// Backpropagation through time for one sample; accumulates into `grads`
    fn backward(&self, window: &[f64], target: f64, pass: &ForwardPass, grads: &mut Grads) {
        let t_len = window.len();
        let d_out = pass.output - target;

        grads.b_out += d_out;
        for i in 0..self.h2 {
            grads.w_out[i] += d_out * pass.h2d_last[i];
        }

        // Gradients flowing into h1[t] / h2[t] from timestep t+1
        let mut dh1_rec = vec![0.0; self.h1];
        let mut dh2_rec = vec![0.0; self.h2];

        for t in (0..t_len).rev() {
            let mut dh2_t = dh2_rec.clone();
            if t == t_len - 1 {
                for i in 0..self.h2 {
                    dh2_t[i] += d_out * self.w_out[i] * pass.mask2[i];
                }
            }

            let mut dpre2 = vec![0.0; self.h2];
            for i in 0..self.h2 {
                dpre2[i] = dh2_t[i] * (1.0 - pass.h2s[t][i] * pass.h2s[t][i]);
                grads.b2[i] += dpre2[i];
                for j in 0..self.h1 {
                    grads.w_h1h2[i][j] += dpre2[i] * pass.h1d[t][j];
                }
                if t > 0 {
                    for j in 0..self.h2 {
                        grads.w_hh2[i][j] += dpre2[i] * pass.h2s[t - 1][j];
                    }
                }
            }

            let mut dh2_next = vec![0.0; self.h2];
            for j in 0..self.h2 {
                for i in 0..self.h2 {
                    dh2_next[j] += dpre2[i] * self.w_hh2[i][j];
                }
            }
            dh2_rec = dh2_next;

            let mut dh1_t = dh1_rec.clone();
            for j in 0..self.h1 {
                let mut dh1d = 0.0;
                for i in 0..self.h2 {
                    dh1d += dpre2[i] * self.w_h1h2[i][j];
                }
                dh1_t[j] += dh1d * pass.mask1[j];
            }

            let mut dpre1 = vec![0.0; self.h1];
            for j in 0..self.h1 {
                dpre1[j] = dh1_t[j] * (1.0 - pass.h1s[t][j] * pass.h1s[t][j]);
                grads.b1[j] += dpre1[j];
                grads.w_xh1[j] += dpre1[j] * window[t];
                if t > 0 {
                    for k in 0..self.h1 {
                        grads.w_hh1[j][k] += dpre1[j] * pass.h1s[t - 1][k];
                    }
                }
            }

            let mut dh1_next = vec![0.0; self.h1];
            for k in 0..self.h1 {
                for j in 0..self.h1 {
                    dh1_next[k] += dpre1[j] * self.w_hh1[j][k];
                }
            }
            dh1_rec = dh1_next;
        }
    }

    fn apply_grads(&mut self, grads: &Grads, batch_len: usize) {
        let scale = self.learning_rate / batch_len as f64;
        let clip = |g: f64| g.clamp(-GRADIENT_CLIP, GRADIENT_CLIP);

        for i in 0..self.h1 {
            self.w_xh1[i] -= scale * clip(grads.w_xh1[i]);
            self.b1[i] -= scale * clip(grads.b1[i]);
            for j in 0..self.h1 {
                self.w_hh1[i][j] -= scale * clip(grads.w_hh1[i][j]);
            }
        }
        for i in 0..self.h2 {
            self.b2[i] -= scale * clip(grads.b2[i]);
            self.w_out[i] -= scale * clip(grads.w_out[i]);
            for j in 0..self.h1 {
                self.w_h1h2[i][j] -= scale * clip(grads.w_h1h2[i][j]);
            }
            for j in 0..self.h2 {
                self.w_hh2[i][j] -= scale * clip(grads.w_hh2[i][j]);
            }
        }
        self.b_out -= scale * clip(grads.b_out);
    }

    /// Mean squared error without dropout, for validation reporting
    fn evaluate(&self, inputs: &[Vec<f64>], targets: &[f64]) -> f64 {
        if inputs.is_empty() {
            return 0.0;
        }
        let ones1 = vec![1.0; self.h1];
        let ones2 = vec![1.0; self.h2];
        let sum: f64 = inputs
            .iter()
            .zip(targets)
            .map(|(window, &target)| {
                let err = self.forward(window, &ones1, &ones2).output - target;
                err * err
            })
            .sum();
        sum / inputs.len() as f64
    }
}

impl SequenceRegressor for RecurrentNet {
    fn fit(
        &mut self,
        inputs: &[Vec<f64>],
        targets: &[f64],
        validation_fraction: f64,
    ) -> Result<()> {
        if inputs.is_empty() {
            return Err(ForecastError::Training(
                "empty training set".to_string(),
            ));
        }
        if inputs.len() != targets.len() {
            return Err(ForecastError::Training(format!(
                "{} windows but {} targets",
                inputs.len(),
                targets.len()
            )));
        }
        let window_len = inputs[0].len();
        if window_len == 0 {
            return Err(ForecastError::Training("zero-length windows".to_string()));
        }
        if inputs.iter().any(|w| w.len() != window_len) {
            return Err(ForecastError::Training(
                "inconsistent window lengths in training set".to_string(),
            ));
        }

        // Hold out the trailing fraction for validation, preserving
        // temporal order.
        let n_val = (inputs.len() as f64 * validation_fraction).floor() as usize;
        let n_train = inputs.len() - n_val.min(inputs.len() - 1);
        let (train_inputs, val_inputs) = inputs.split_at(n_train);
        let (train_targets, val_targets) = targets.split_at(n_train);

        let mut order: Vec<usize> = (0..train_inputs.len()).collect();

        for epoch in 0..self.epochs {
            order.shuffle(&mut self.rng);
            let mut epoch_loss = 0.0;

            for batch in order.chunks(self.batch_size) {
                let mut grads = Grads::zeros(self.h1, self.h2);
                for &idx in batch {
                    let mask1 = self.sample_mask(self.h1);
                    let mask2 = self.sample_mask(self.h2);
                    let pass = self.forward(&train_inputs[idx], &mask1, &mask2);
                    let err = pass.output - train_targets[idx];
                    epoch_loss += err * err;
                    self.backward(&train_inputs[idx], train_targets[idx], &pass, &mut grads);
                }
                self.apply_grads(&grads, batch.len());
            }

            epoch_loss /= train_inputs.len() as f64;
            if !epoch_loss.is_finite() {
                return Err(ForecastError::Training(format!(
                    "non-finite loss at epoch {}",
                    epoch
                )));
            }

            let val_loss = self.evaluate(val_inputs, val_targets);
            debug!(epoch, train_loss = epoch_loss, val_loss, "epoch finished");
        }

        self.window = Some(window_len);
        Ok(())
    }

    fn predict_next(&self, window: &[f64]) -> Result<f64> {
        let expected = self.window.ok_or_else(|| {
            ForecastError::Prediction("predict called before fit".to_string())
        })?;
        if window.len() != expected {
            return Err(ForecastError::Prediction(format!(
                "window length {} does not match trained length {}",
                window.len(),
                expected
            )));
        }

        let ones1 = vec![1.0; self.h1];
        let ones2 = vec![1.0; self.h2];
        let output = self.forward(window, &ones1, &ones2).output;
        if !output.is_finite() {
            return Err(ForecastError::Prediction(
                "model produced a non-finite forecast".to_string(),
            ));
        }
        Ok(output)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

//! Multilayer perceptron value approximator
//!
//! Fully connected network with ReLU hidden layers and an identity output
//! layer, trained on mean squared error with the Adam optimizer. One call to
//! [`ValueApproximator::fit_step`] is one optimizer step on one sample.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::{ValueApproximator, ensure_no_shrink, ensure_state_size, ensure_target_size};
use crate::error::{Error, Result};

const ADAM_BETA1: f64 = 0.9;
const ADAM_BETA2: f64 = 0.999;
const ADAM_EPSILON: f64 = 1e-8;

/// Architecture and optimizer settings for [`Mlp`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Width of each hidden layer, input side first
    pub hidden_layers: Vec<usize>,
    /// Adam step size
    pub learning_rate: f64,
    /// Seed for weight initialization (None = non-deterministic)
    pub seed: Option<u64>,
}

impl NetworkConfig {
    pub fn new(hidden_layers: Vec<usize>, learning_rate: f64) -> Self {
        Self {
            hidden_layers,
            learning_rate,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.hidden_layers.contains(&0) {
            return Err(Error::invalid_config("hidden layer widths must be positive"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::invalid_config(format!(
                "learning rate {} must be positive and finite",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::new(vec![64, 32], 0.001)
    }
}

/// First and second moment estimates for one parameter tensor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Moments {
    first: Vec<f64>,
    second: Vec<f64>,
}

impl Moments {
    fn zeros(len: usize) -> Self {
        Self {
            first: vec![0.0; len],
            second: vec![0.0; len],
        }
    }

    fn extend_zeros(&mut self, additional: usize) {
        self.first.extend(std::iter::repeat_n(0.0, additional));
        self.second.extend(std::iter::repeat_n(0.0, additional));
    }
}

/// Fully connected layer. Weights are stored row-major, one row per output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Dense {
    inputs: usize,
    outputs: usize,
    weights: Vec<f64>,
    biases: Vec<f64>,
    weight_moments: Moments,
    bias_moments: Moments,
}

impl Dense {
    fn new(inputs: usize, outputs: usize, rng: &mut StdRng) -> Self {
        let weights = (0..inputs * outputs)
            .map(|_| he_uniform(inputs, rng))
            .collect();
        Self {
            inputs,
            outputs,
            weights,
            biases: vec![0.0; outputs],
            weight_moments: Moments::zeros(inputs * outputs),
            bias_moments: Moments::zeros(outputs),
        }
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .chunks_exact(self.inputs)
            .zip(&self.biases)
            .map(|(row, bias)| bias + row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>())
            .collect()
    }

    fn check_shape(&self) -> std::result::Result<(), String> {
        let (inputs, outputs) = (self.inputs, self.outputs);
        if inputs == 0 || outputs == 0 {
            return Err(format!("layer is {inputs}x{outputs}"));
        }
        let expected = [
            ("weights", self.weights.len(), inputs * outputs),
            ("biases", self.biases.len(), outputs),
            ("weight moments", self.weight_moments.first.len(), inputs * outputs),
            ("weight moments", self.weight_moments.second.len(), inputs * outputs),
            ("bias moments", self.bias_moments.first.len(), outputs),
            ("bias moments", self.bias_moments.second.len(), outputs),
        ];
        for (name, got, want) in expected {
            if got != want {
                return Err(format!("{inputs}x{outputs} layer holds {got} {name}, expected {want}"));
            }
        }
        Ok(())
    }

    /// Append freshly initialized output units, leaving existing rows intact.
    fn grow_outputs(&mut self, outputs: usize, rng: &mut StdRng) {
        let added = outputs - self.outputs;
        let inputs = self.inputs;
        self.weights
            .extend((0..added * inputs).map(|_| he_uniform(inputs, rng)));
        self.biases.extend(std::iter::repeat_n(0.0, added));
        self.weight_moments.extend_zeros(added * inputs);
        self.bias_moments.extend_zeros(added);
        self.outputs = outputs;
    }
}

fn he_uniform(fan_in: usize, rng: &mut StdRng) -> f64 {
    let limit = (6.0 / fan_in as f64).sqrt();
    rng.random_range(-limit..limit)
}

fn relu(x: f64) -> f64 {
    x.max(0.0)
}

fn adam_update(params: &mut [f64], grads: &[f64], moments: &mut Moments, step_size: f64) {
    for (((param, grad), m), v) in params
        .iter_mut()
        .zip(grads)
        .zip(moments.first.iter_mut())
        .zip(moments.second.iter_mut())
    {
        *m = ADAM_BETA1 * *m + (1.0 - ADAM_BETA1) * grad;
        *v = ADAM_BETA2 * *v + (1.0 - ADAM_BETA2) * grad * grad;
        *param -= step_size * *m / (v.sqrt() + ADAM_EPSILON);
    }
}

/// Multilayer perceptron Q-network.
///
/// # Examples
///
/// ```
/// use qlearn::approximator::{Mlp, NetworkConfig, ValueApproximator};
///
/// let config = NetworkConfig::new(vec![16, 16], 0.01).with_seed(1);
/// let mut net = Mlp::new(2, 4, config)?;
/// let before = net.predict(&[1.0, 0.0])?;
/// assert_eq!(before.len(), 4);
///
/// let mut target = before.clone();
/// target[2] += 1.0;
/// net.fit_step(&[1.0, 0.0], &target)?;
/// assert!(net.predict(&[1.0, 0.0])?[2] > before[2]);
/// # Ok::<(), qlearn::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mlp {
    config: NetworkConfig,
    state_size: usize,
    layers: Vec<Dense>,
    /// Adam steps taken since the last rebuild
    step: u64,
    /// Number of rebuilds/expansions; offsets the init seed
    generation: u64,
}

impl Mlp {
    /// Create a network mapping `state_size` inputs to `action_count` outputs.
    pub fn new(state_size: usize, action_count: usize, config: NetworkConfig) -> Result<Self> {
        config.validate()?;
        if state_size == 0 {
            return Err(Error::invalid_config("state size must be positive"));
        }
        if action_count == 0 {
            return Err(Error::EmptyActionSpace);
        }

        let mut net = Self {
            config,
            state_size,
            layers: Vec::new(),
            step: 0,
            generation: 0,
        };
        net.layers = net.build_layers(action_count);
        Ok(net)
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Total number of trainable parameters
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights.len() + layer.biases.len())
            .sum()
    }

    /// Check that the layers chain from `state_size` inputs and that every
    /// parameter buffer matches its layer's dimensions.
    ///
    /// Freshly built networks always pass; deserialized ones may not.
    pub fn validate_shape(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(Error::invalid_config("network has no layers"));
        }
        let mut width = self.state_size;
        for (l, layer) in self.layers.iter().enumerate() {
            if layer.inputs != width {
                return Err(Error::invalid_config(format!(
                    "layer {l} takes {} inputs but receives {width}",
                    layer.inputs
                )));
            }
            layer
                .check_shape()
                .map_err(|message| Error::invalid_config(format!("layer {l}: {message}")))?;
            width = layer.outputs;
        }
        Ok(())
    }

    fn init_rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(self.generation)),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }

    fn build_layers(&self, action_count: usize) -> Vec<Dense> {
        let mut rng = self.init_rng();
        let mut widths = Vec::with_capacity(self.config.hidden_layers.len() + 2);
        widths.push(self.state_size);
        widths.extend(&self.config.hidden_layers);
        widths.push(action_count);

        widths
            .windows(2)
            .map(|pair| Dense::new(pair[0], pair[1], &mut rng))
            .collect()
    }

    /// Forward pass keeping every layer's input and pre-activation.
    ///
    /// `inputs[l]` is what layer `l` consumed; `pre[l]` is its raw output.
    fn forward_trace(&self, state: &[f64]) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let last = self.layers.len() - 1;
        let mut inputs = Vec::with_capacity(self.layers.len());
        let mut pre = Vec::with_capacity(self.layers.len());
        let mut activation = state.to_vec();

        for (l, layer) in self.layers.iter().enumerate() {
            let z = layer.forward(&activation);
            let next = if l == last {
                z.clone()
            } else {
                z.iter().copied().map(relu).collect()
            };
            inputs.push(activation);
            pre.push(z);
            activation = next;
        }

        (inputs, pre)
    }
}

impl ValueApproximator for Mlp {
    fn state_size(&self) -> usize {
        self.state_size
    }

    fn action_count(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.outputs)
    }

    fn predict(&self, state: &[f64]) -> Result<Vec<f64>> {
        ensure_state_size(self.state_size, state)?;
        let last = self.layers.len() - 1;
        let mut activation = state.to_vec();
        for (l, layer) in self.layers.iter().enumerate() {
            let z = layer.forward(&activation);
            activation = if l == last {
                z
            } else {
                z.into_iter().map(relu).collect()
            };
        }
        Ok(activation)
    }

    fn fit_step(&mut self, state: &[f64], target: &[f64]) -> Result<f64> {
        ensure_state_size(self.state_size, state)?;
        ensure_target_size(self.action_count(), target)?;

        let (inputs, pre) = self.forward_trace(state);
        let output = &pre[pre.len() - 1];
        let n = output.len() as f64;
        let loss = output
            .iter()
            .zip(target)
            .map(|(y, t)| (y - t).powi(2))
            .sum::<f64>()
            / n;

        // dL/dz for the output layer (identity activation)
        let mut delta: Vec<f64> = output
            .iter()
            .zip(target)
            .map(|(y, t)| 2.0 * (y - t) / n)
            .collect();

        let mut gradients = Vec::with_capacity(self.layers.len());
        for l in (0..self.layers.len()).rev() {
            let layer = &self.layers[l];
            let input = &inputs[l];

            let mut weight_grads = Vec::with_capacity(delta.len() * input.len());
            for d in &delta {
                weight_grads.extend(input.iter().map(|x| d * x));
            }
            let bias_grads = delta.clone();

            if l > 0 {
                let below = &pre[l - 1];
                delta = (0..layer.inputs)
                    .map(|k| {
                        if below[k] <= 0.0 {
                            return 0.0;
                        }
                        delta
                            .iter()
                            .enumerate()
                            .map(|(j, d)| layer.weights[j * layer.inputs + k] * d)
                            .sum()
                    })
                    .collect();
            }

            gradients.push((weight_grads, bias_grads));
        }
        gradients.reverse();

        self.step += 1;
        let t = self.step as i32;
        let step_size = self.config.learning_rate * (1.0 - ADAM_BETA2.powi(t)).sqrt()
            / (1.0 - ADAM_BETA1.powi(t));

        for (layer, (weight_grads, bias_grads)) in self.layers.iter_mut().zip(&gradients) {
            adam_update(
                &mut layer.weights,
                weight_grads,
                &mut layer.weight_moments,
                step_size,
            );
            adam_update(
                &mut layer.biases,
                bias_grads,
                &mut layer.bias_moments,
                step_size,
            );
        }

        Ok(loss)
    }

    fn rebuild(&mut self, action_count: usize) -> Result<()> {
        if action_count == 0 {
            return Err(Error::EmptyActionSpace);
        }
        self.generation += 1;
        self.layers = self.build_layers(action_count);
        self.step = 0;
        Ok(())
    }

    fn expand(&mut self, action_count: usize) -> Result<()> {
        let current = self.action_count();
        ensure_no_shrink(current, action_count)?;
        if action_count == current {
            return Ok(());
        }

        self.generation += 1;
        let mut rng = self.init_rng();
        if let Some(output) = self.layers.last_mut() {
            output.grow_outputs(action_count, &mut rng);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approximator::GrowthStrategy;

    fn net(actions: usize) -> Mlp {
        Mlp::new(3, actions, NetworkConfig::new(vec![8, 8], 0.01).with_seed(42)).unwrap()
    }

    #[test]
    fn test_shapes() {
        let mlp = net(4);
        assert_eq!(mlp.state_size(), 3);
        assert_eq!(mlp.action_count(), 4);
        assert_eq!(mlp.parameter_count(), (3 * 8 + 8) + (8 * 8 + 8) + (8 * 4 + 4));
        assert_eq!(mlp.predict(&[0.1, 0.2, 0.3]).unwrap().len(), 4);
    }

    #[test]
    fn test_validate_shape() {
        let mut mlp = net(4);
        assert!(mlp.validate_shape().is_ok());
        mlp.expand(6).unwrap();
        assert!(mlp.validate_shape().is_ok());

        let mut truncated = mlp.clone();
        truncated.layers[1].weights.pop();
        assert!(matches!(
            truncated.validate_shape(),
            Err(Error::InvalidConfiguration { .. })
        ));

        let mut unchained = mlp.clone();
        unchained.layers[2].inputs = 7;
        assert!(unchained.validate_shape().is_err());

        let mut wrong_input = mlp.clone();
        wrong_input.state_size = 5;
        assert!(wrong_input.validate_shape().is_err());

        let mut empty = mlp;
        empty.layers.clear();
        assert!(empty.validate_shape().is_err());
    }

    #[test]
    fn test_seeded_init_is_deterministic() {
        assert_eq!(net(4), net(4));
    }

    #[test]
    fn test_rejects_wrong_sizes() {
        let mut mlp = net(2);
        assert!(matches!(
            mlp.predict(&[1.0]),
            Err(Error::StateSizeMismatch {
                expected: 3,
                got: 1
            })
        ));
        assert!(matches!(
            mlp.fit_step(&[1.0, 0.0, 0.0], &[1.0]),
            Err(Error::TargetSizeMismatch {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_invalid_configs() {
        assert!(Mlp::new(3, 0, NetworkConfig::default()).is_err());
        assert!(Mlp::new(0, 2, NetworkConfig::default()).is_err());
        assert!(Mlp::new(3, 2, NetworkConfig::new(vec![4, 0], 0.01)).is_err());
        assert!(Mlp::new(3, 2, NetworkConfig::new(vec![4], 0.0)).is_err());
    }

    #[test]
    fn test_fit_step_moves_prediction_toward_target() {
        let mut mlp = net(3);
        let state = [0.5, -0.2, 1.0];
        let before = mlp.predict(&state).unwrap();
        let mut target = before.clone();
        target[1] = before[1] + 5.0;

        let first_loss = mlp.fit_step(&state, &target).unwrap();
        let after = mlp.predict(&state).unwrap();
        assert!(after[1] > before[1]);

        for _ in 0..200 {
            mlp.fit_step(&state, &target).unwrap();
        }
        let final_loss = mlp.fit_step(&state, &target).unwrap();
        assert!(final_loss < first_loss);
    }

    #[test]
    fn test_learns_one_hot_mapping() {
        let mut mlp = net(2);
        let a = [1.0, 0.0, 0.0];
        let b = [0.0, 0.0, 1.0];
        for _ in 0..300 {
            mlp.fit_step(&a, &[1.0, 0.0]).unwrap();
            mlp.fit_step(&b, &[0.0, 1.0]).unwrap();
        }
        let pa = mlp.predict(&a).unwrap();
        let pb = mlp.predict(&b).unwrap();
        assert!(pa[0] > pa[1]);
        assert!(pb[1] > pb[0]);
    }

    #[test]
    fn test_rebuild_replaces_parameters() {
        let mut mlp = net(2);
        let original = mlp.clone();
        mlp.rebuild(3).unwrap();
        assert_eq!(mlp.action_count(), 3);
        assert_ne!(mlp.layers[0].weights, original.layers[0].weights);
        assert!(matches!(mlp.rebuild(0), Err(Error::EmptyActionSpace)));
    }

    #[test]
    fn test_expand_preserves_existing_outputs() {
        let mut mlp = net(2);
        let state = [0.3, 0.7, -0.4];
        let before = mlp.predict(&state).unwrap();

        mlp.grow(4, GrowthStrategy::PreserveWeights).unwrap();
        let after = mlp.predict(&state).unwrap();
        assert_eq!(after.len(), 4);
        assert_eq!(&after[..2], &before[..]);

        assert!(mlp.expand(4).is_ok());
        assert!(matches!(
            mlp.expand(3),
            Err(Error::ActionSpaceShrink {
                current: 4,
                requested: 3
            })
        ));
    }
}

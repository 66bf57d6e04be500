use log::debug;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Uniform};

use super::{Chain, Sequential, activations::ActFn, layers::Dense};
use crate::Result;

/// Constructs a fresh chain for a given input and output dimensionality.
///
/// Builders are deterministic given their seed; building twice with the same seed yields the
/// same initial parameters.
pub trait Builder {
    type Chain: Chain;

    fn build(&self, n_in: usize, n_out: usize) -> Result<Self::Chain>;
}

/// A single dense layer mapping the inputs to the outputs.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Linear {
    pub act_fn: Option<ActFn>,
    pub seed: Option<u64>,
}

/// One hidden dense layer between the inputs and the outputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Short {
    /// The hidden width, `0` picks `round(sqrt(n_in * n_out))`.
    pub n_hidden: usize,
    pub act_fn: ActFn,
    pub seed: Option<u64>,
}

impl Default for Short {
    fn default() -> Self {
        Self {
            n_hidden: 0,
            act_fn: ActFn::default(),
            seed: None,
        }
    }
}

impl Short {
    fn hidden_width(&self, n_in: usize, n_out: usize) -> usize {
        if self.n_hidden > 0 {
            return self.n_hidden;
        }

        ((n_in * n_out) as f32).sqrt().round().max(1.) as usize
    }
}

impl Builder for Linear {
    type Chain = Sequential;

    fn build(&self, n_in: usize, n_out: usize) -> Result<Sequential> {
        let layers = [Dense::new((n_in, n_out), self.act_fn)];
        init(layers, self.seed)
    }
}

impl Builder for Short {
    type Chain = Sequential;

    fn build(&self, n_in: usize, n_out: usize) -> Result<Sequential> {
        let n_hidden = self.hidden_width(n_in, n_out);
        let layers = [
            Dense::new((n_in, n_hidden), Some(self.act_fn)),
            Dense::new((n_hidden, n_out), None),
        ];
        init(layers, self.seed)
    }
}

/// The builders selectable from a configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arch {
    Linear(Linear),
    Short(Short),
}

impl Default for Arch {
    fn default() -> Self {
        Self::Short(Short::default())
    }
}

impl Builder for Arch {
    type Chain = Sequential;

    fn build(&self, n_in: usize, n_out: usize) -> Result<Sequential> {
        match self {
            Arch::Linear(b) => b.build(n_in, n_out),
            Arch::Short(b) => b.build(n_in, n_out),
        }
    }
}

/// Creates a `Sequential` whose weights follow a Xavier uniform distribution and whose biases
/// start at zero.
fn init<const N: usize>(layers: [Dense; N], seed: Option<u64>) -> Result<Sequential> {
    let mut rng = generate_rng(seed);
    let mut params = Vec::with_capacity(layers.iter().map(Dense::size).sum());

    for layer in &layers {
        let (fan_in, fan_out) = layer.dim();
        let range = (6. / (fan_in + fan_out).max(1) as f32).sqrt();
        let distribution = Uniform::new_inclusive(-range, range)?;

        params.extend((0..fan_in * fan_out).map(|_| distribution.sample(&mut rng)));
        params.extend(std::iter::repeat_n(0., fan_out));
    }

    debug!(size = params.len(), seeded = seed.is_some(); "initialized chain");
    Sequential::with_params(layers, params)
}

fn generate_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

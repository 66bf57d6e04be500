use std::{fs, path::Path};

use machine_learning::{
    arch::{activations::ActFn, loss::Loss, Arch, Linear, Short},
    optimization::{Adam, GradientDescent, GradientDescentWithMomentum, Optim},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    data::{Features, Table, Target},
    regressor::Regressor,
    FitErr, Result,
};

/// The specification for the `ActFn` enum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFnSpec {
    Sigmoid { amp: f32 },
    Tanh,
    Relu,
}

impl Default for ActFnSpec {
    fn default() -> Self {
        Self::Sigmoid { amp: 1. }
    }
}

/// The specification for the `Arch` enum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuilderSpec {
    Linear {
        act_fn: Option<ActFnSpec>,
        seed: Option<u64>,
    },
    Short {
        #[serde(default)]
        n_hidden: usize,
        #[serde(default)]
        act_fn: ActFnSpec,
        seed: Option<u64>,
    },
}

impl Default for BuilderSpec {
    fn default() -> Self {
        Self::Short {
            n_hidden: 0,
            act_fn: ActFnSpec::default(),
            seed: None,
        }
    }
}

/// The specification for the `Optim` enum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerSpec {
    Adam {
        learning_rate: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    },
    GradientDescent {
        learning_rate: f32,
    },
    GradientDescentWithMomentum {
        learning_rate: f32,
        momentum: f32,
    },
}

impl Default for OptimizerSpec {
    fn default() -> Self {
        Self::GradientDescent { learning_rate: 0.1 }
    }
}

/// The specification for the `Loss` enum.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossSpec {
    #[default]
    Mse,
    Mae,
}

/// The specification for a `Regressor`, every field falls back to the `Regressor::new` default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressorSpec {
    #[serde(default)]
    pub builder: BuilderSpec,
    #[serde(default)]
    pub optimizer: OptimizerSpec,
    #[serde(default)]
    pub loss: LossSpec,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub lambda: f32,
    #[serde(default)]
    pub alpha: f32,
    #[serde(default)]
    pub optimizer_changes_trigger_retraining: bool,
}

fn default_epochs() -> usize {
    10
}

fn default_batch_size() -> usize {
    1
}

impl RegressorSpec {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FitErr::Config(e.to_string()))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&read(path.as_ref())?)
    }

    /// Builds the `Regressor` this spec describes.
    ///
    /// # Returns
    /// An error if an optimizer hyperparameter is out of its domain.
    pub fn resolve(&self) -> Result<Regressor<Arch, Optim, Loss>> {
        let mut regressor = Regressor::new(
            self.resolve_builder(),
            self.resolve_optimizer()?,
            self.resolve_loss(),
        );

        regressor.epochs = self.epochs;
        regressor.batch_size = self.batch_size;
        regressor.lambda = self.lambda;
        regressor.alpha = self.alpha;
        regressor.optimizer_changes_trigger_retraining = self.optimizer_changes_trigger_retraining;
        Ok(regressor)
    }

    fn resolve_builder(&self) -> Arch {
        match self.builder {
            BuilderSpec::Linear { act_fn, seed } => Arch::Linear(Linear {
                act_fn: act_fn.map(resolve_act_fn),
                seed,
            }),
            BuilderSpec::Short {
                n_hidden,
                act_fn,
                seed,
            } => Arch::Short(Short {
                n_hidden,
                act_fn: resolve_act_fn(act_fn),
                seed,
            }),
        }
    }

    fn resolve_optimizer(&self) -> Result<Optim> {
        let optimizer = match self.optimizer {
            OptimizerSpec::GradientDescent { learning_rate } => {
                check_learning_rate(learning_rate)?;
                Optim::GradientDescent(GradientDescent::new(learning_rate))
            }
            OptimizerSpec::GradientDescentWithMomentum {
                learning_rate,
                momentum,
            } => {
                check_learning_rate(learning_rate)?;
                check_unit("momentum", momentum)?;
                Optim::GradientDescentWithMomentum(GradientDescentWithMomentum::new(
                    learning_rate,
                    momentum,
                ))
            }
            OptimizerSpec::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => {
                check_learning_rate(learning_rate)?;
                check_unit("beta1", beta1)?;
                check_unit("beta2", beta2)?;
                check_epsilon(epsilon)?;
                Optim::Adam(Adam::new(learning_rate, beta1, beta2, epsilon))
            }
        };

        Ok(optimizer)
    }

    fn resolve_loss(&self) -> Loss {
        match self.loss {
            LossSpec::Mse => Loss::Mse,
            LossSpec::Mae => Loss::Mae,
        }
    }
}

fn resolve_act_fn(spec: ActFnSpec) -> ActFn {
    match spec {
        ActFnSpec::Sigmoid { amp } => ActFn::sigmoid(amp),
        ActFnSpec::Tanh => ActFn::tanh(),
        ActFnSpec::Relu => ActFn::relu(),
    }
}

fn check_learning_rate(learning_rate: f32) -> Result<()> {
    if !(learning_rate > 0. && learning_rate.is_finite()) {
        return Err(FitErr::Config(format!(
            "learning_rate must be positive, got {learning_rate}"
        )));
    }

    Ok(())
}

fn check_unit(name: &str, value: f32) -> Result<()> {
    if !(0. ..1.).contains(&value) {
        return Err(FitErr::Config(format!("{name} must be in [0, 1), got {value}")));
    }

    Ok(())
}

fn check_epsilon(epsilon: f32) -> Result<()> {
    if !(epsilon >= 0. && epsilon.is_finite()) {
        return Err(FitErr::Config(format!(
            "epsilon must be finite and non-negative, got {epsilon}"
        )));
    }

    Ok(())
}

/// The target of a data file: a flat array, an array of records or a table.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TargetSpec {
    Vector(Vec<f32>),
    Records(Vec<Vec<f32>>),
    Table(Table),
}

#[derive(Debug, Deserialize)]
struct RawData {
    features: Value,
    target: TargetSpec,
}

/// A data file: a `features` table and its `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSpec {
    pub features: Features,
    pub target: Target,
}

impl DataSpec {
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawData = serde_json::from_str(json).map_err(|e| FitErr::Config(e.to_string()))?;

        if !raw.features.is_object() {
            return Err(FitErr::NotATable("features"));
        }

        let table: Table =
            serde_json::from_value(raw.features).map_err(|e| FitErr::Config(e.to_string()))?;

        let target = match raw.target {
            TargetSpec::Vector(v) => Target::Vector(v),
            TargetSpec::Records(r) => Target::Records(r),
            TargetSpec::Table(t) => Target::Table(t),
        };

        Ok(Self {
            features: Features::Table(table),
            target,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&read(path.as_ref())?)
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| FitErr::Config(format!("failed to read {}: {e}", path.display())))
}

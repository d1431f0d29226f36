//! JSON weight snapshots.
//!
//! The on-disk record keeps the key names of the external trainer the
//! weights historically came from:
//!
//! ```json
//! {
//!   "W_h": [[..]],  "W_o": [[..]],
//!   "Th":  [[..]],  "To":  [[..]],
//!   "config": {
//!     "capa_entrada": 35, "capa_oculta": 12, "capa_salida": 10,
//!     "funciones_activacion": ["sigmoid", "sigmoid"],
//!     "bias": true
//!   }
//! }
//! ```
//!
//! `W_h` is `[hidden][input]`, `W_o` is `[output][hidden]`, and the bias
//! matrices `Th`/`To` are column vectors (`[size][1]`). `Th`, `To` and
//! `config` are optional.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{NetError, Result};
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::network::{network::Network, spec::NetworkSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSnapshot {
    #[serde(rename = "W_h")]
    pub w_h: Vec<Vec<f64>>,
    #[serde(rename = "W_o")]
    pub w_o: Vec<Vec<f64>>,
    #[serde(rename = "Th", default, skip_serializing_if = "Option::is_none")]
    pub th: Option<Vec<Vec<f64>>>,
    #[serde(rename = "To", default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<SnapshotConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    pub capa_entrada: usize,
    pub capa_oculta: usize,
    pub capa_salida: usize,
    /// `[hidden, output]` activation names.
    pub funciones_activacion: [String; 2],
    pub bias: bool,
}

impl WeightSnapshot {
    pub fn from_json_str(s: &str) -> Result<WeightSnapshot> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates the snapshot against `declared` and builds the replacement
    /// layers. Nothing outside the returned values is touched.
    fn build(&self, declared: &NetworkSpec) -> Result<(Vec<Layer>, NetworkSpec)> {
        let mut spec = declared.clone();

        if let Some(cfg) = &self.config {
            let sizes = (cfg.capa_entrada, cfg.capa_oculta, cfg.capa_salida);
            let expected = (declared.input_size, declared.hidden_size, declared.output_size);
            if sizes != expected {
                return Err(NetError::Configuration(format!(
                    "snapshot declares {}-{}-{} but the network is {}-{}-{}",
                    sizes.0, sizes.1, sizes.2, expected.0, expected.1, expected.2
                )));
            }
            let [hidden, output] = &cfg.funciones_activacion;
            spec.hidden_activation = resolve_activation(hidden, declared.hidden_activation)?;
            spec.output_activation = resolve_activation(output, declared.output_activation)?;
        }
        spec.validate()?;

        let w_h = Matrix::from_data(self.w_h.clone())?;
        w_h.expect_shape(spec.hidden_size, spec.input_size, "W_h")?;
        let w_o = Matrix::from_data(self.w_o.clone())?;
        w_o.expect_shape(spec.output_size, spec.hidden_size, "W_o")?;

        spec.bias = match &self.config {
            Some(cfg) => cfg.bias,
            None => match (&self.th, &self.to) {
                (Some(_), Some(_)) => true,
                (None, None) => false,
                _ => {
                    return Err(NetError::Configuration(
                        "snapshot must carry both Th and To or neither".to_owned(),
                    ))
                }
            },
        };

        let (th, to) = if spec.bias {
            (
                Some(bias_column(self.th.as_ref(), spec.hidden_size, "Th")?),
                Some(bias_column(self.to.as_ref(), spec.output_size, "To")?),
            )
        } else {
            (None, None)
        };

        let layers = vec![
            Layer::from_parts(w_h, th, spec.hidden_activation)?,
            Layer::from_parts(w_o, to, spec.output_activation)?,
        ];
        Ok((layers, spec))
    }
}

/// Keeps the current activation when the names agree so parameters such as
/// a leaky-ReLU slope survive a round trip.
fn resolve_activation(name: &str, current: ActivationFunction) -> Result<ActivationFunction> {
    if current.name() == name.trim().to_ascii_lowercase() {
        Ok(current)
    } else {
        ActivationFunction::from_name(name)
    }
}

fn bias_column(data: Option<&Vec<Vec<f64>>>, size: usize, name: &str) -> Result<Vec<f64>> {
    let data = data.ok_or_else(|| NetError::Configuration(format!("bias is enabled but {name} is missing")))?;
    let m = Matrix::from_data(data.clone())?;
    m.expect_shape(size, 1, name)?;
    Ok(m.data.into_iter().map(|row| row[0]).collect())
}

impl Network {
    /// Captures the current weights and configuration.
    pub fn save_weights(&self) -> WeightSnapshot {
        let spec = self.spec();
        let (hidden, output) = (&self.layers[0], &self.layers[1]);
        WeightSnapshot {
            w_h: hidden.weights.data.clone(),
            w_o: output.weights.data.clone(),
            th: hidden.biases.as_deref().map(|b| Matrix::column(b).data),
            to: output.biases.as_deref().map(|b| Matrix::column(b).data),
            config: Some(SnapshotConfig {
                capa_entrada: spec.input_size,
                capa_oculta: spec.hidden_size,
                capa_salida: spec.output_size,
                funciones_activacion: [
                    spec.hidden_activation.name().to_owned(),
                    spec.output_activation.name().to_owned(),
                ],
                bias: spec.bias,
            }),
        }
    }

    /// Replaces the weights with `snapshot` and marks the network ready.
    ///
    /// Everything is validated first; on error the network is unchanged.
    pub fn load_weights(&mut self, snapshot: &WeightSnapshot) -> Result<()> {
        let (layers, spec) = snapshot.build(self.spec())?;
        self.replace(layers, spec);
        Ok(())
    }

    /// Boolean form of [`Network::load_weights`]: `false` on any structural
    /// problem, leaving the weights and ready state as they were.
    pub fn try_load_weights(&mut self, snapshot: &WeightSnapshot) -> bool {
        match self.load_weights(snapshot) {
            Ok(()) => true,
            Err(e) => {
                warn!("rejected weight snapshot: {e}");
                false
            }
        }
    }

    /// Builds a ready network from a snapshot that carries its own `config`.
    pub fn from_snapshot(snapshot: &WeightSnapshot) -> Result<Network> {
        let cfg = snapshot.config.as_ref().ok_or_else(|| {
            NetError::Configuration("snapshot has no config; load it into a sized network instead".to_owned())
        })?;
        let [hidden, output] = &cfg.funciones_activacion;
        let declared = NetworkSpec {
            input_size: cfg.capa_entrada,
            hidden_size: cfg.capa_oculta,
            output_size: cfg.capa_salida,
            hidden_activation: ActivationFunction::from_name(hidden)?,
            output_activation: ActivationFunction::from_name(output)?,
            bias: cfg.bias,
        };
        let (layers, spec) = snapshot.build(&declared)?;
        Ok(Network::from_layers(layers, spec))
    }

    /// Writes the weight snapshot as pretty-printed JSON.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.save_weights())?;
        Ok(())
    }

    /// Loads a snapshot file previously written by `save_json` into this network.
    pub fn load_json(&mut self, path: &str) -> Result<()> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let snapshot: WeightSnapshot = serde_json::from_reader(reader)?;
        self.load_weights(&snapshot)
    }
}

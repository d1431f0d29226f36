use std::time::Instant;

use log::{debug, info, warn};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::classify::classifier::argmax;
use crate::error::Result;
use crate::loss::loss_type::LossType;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::EpochStats;
use crate::train::example::{check_examples, TrainingExample};
use crate::train::report::{TrainOutcome, TrainReport};
use crate::train::train_config::TrainConfig;
use crate::train::trainer::{evaluate_error, run_one_epoch};

/// Trains `network` until the epoch error reaches `precision`, the epoch cap
/// runs out, or a stop is requested.
///
/// Runs to completion on the calling thread. Use
/// [`crate::train::TrainingWorker`] to move it off the caller.
///
/// # Errors
/// Fails before touching any weight when the hyperparameters are invalid,
/// the training set is empty, an example has the wrong shape, or the loss
/// does not fit the output activation. Running out of epochs is *not* an
/// error; see [`TrainOutcome::EpochLimitReached`].
pub fn train_loop(
    network: &mut Network,
    examples: &[TrainingExample],
    config: &TrainConfig,
) -> Result<TrainReport> {
    let hp = &config.hyperparams;
    hp.validate()?;
    check_examples(network, examples)?;

    let output_activation = network.spec().output_activation;
    let loss = hp.loss.unwrap_or_else(|| LossType::for_output(output_activation));
    loss.check_pairing(output_activation)?;

    let optimizer = Sgd::with_momentum(hp.learning_rate, hp.momentum);
    let mut rng = match hp.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut order: Vec<usize> = (0..examples.len()).collect();

    info!(
        "training {}-{}-{} network on {} examples (lr={}, momentum={}, max_epochs={}, precision={})",
        network.spec().input_size,
        network.spec().hidden_size,
        network.spec().output_size,
        examples.len(),
        hp.learning_rate,
        hp.momentum,
        hp.max_epochs,
        hp.precision,
    );

    let t_start = Instant::now();
    let mut final_error = evaluate_error(network, examples, loss);
    let mut epochs = 0;
    let mut outcome = TrainOutcome::EpochLimitReached;

    for epoch in 1..=hp.max_epochs {
        if config.stop_requested() {
            outcome = TrainOutcome::Stopped;
            break;
        }

        let t_epoch = Instant::now();
        if hp.shuffle {
            order.shuffle(&mut rng);
        }
        let error = run_one_epoch(network, examples, &order, &optimizer, loss);
        final_error = error;
        epochs = epoch;

        let converged = error <= hp.precision;
        let report_now = converged || epoch == hp.max_epochs || epoch % hp.report_every == 0;

        if report_now {
            let stats = EpochStats {
                epoch,
                max_epochs: hp.max_epochs,
                error,
                accuracy: compute_accuracy(network, examples),
                elapsed_ms: t_epoch.elapsed().as_millis() as u64,
            };
            debug!("epoch {epoch}/{}: error={error:.6} accuracy={:.3}", hp.max_epochs, stats.accuracy);

            if let Some(ref tx) = config.progress_tx {
                // A dropped receiver means nobody wants the result any more.
                if tx.send(stats).is_err() && !converged {
                    outcome = TrainOutcome::Stopped;
                    break;
                }
            }
        }

        if converged {
            outcome = TrainOutcome::Converged;
            break;
        }
    }

    let report = TrainReport {
        outcome,
        epochs,
        final_error,
        elapsed_ms: t_start.elapsed().as_millis() as u64,
    };
    match outcome {
        TrainOutcome::Converged => {
            info!("converged after {epochs} epochs (error={final_error:.6})")
        }
        TrainOutcome::EpochLimitReached => warn!(
            "epoch limit {} reached without converging (error={final_error:.6}, precision={})",
            hp.max_epochs, hp.precision
        ),
        TrainOutcome::Stopped => info!("training stopped after {epochs} epochs (error={final_error:.6})"),
    }
    Ok(report)
}

/// Fraction of examples whose output arg-max matches the target arg-max.
fn compute_accuracy(network: &mut Network, examples: &[TrainingExample]) -> f64 {
    if examples.is_empty() {
        return 0.0;
    }
    let correct = examples.iter()
        .filter(|ex| argmax(&network.feed(&ex.input)) == argmax(&ex.target))
        .count();
    correct as f64 / examples.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{atomic::AtomicBool, mpsc, Arc};

    use crate::activation::activation::ActivationFunction;
    use crate::error::NetError;
    use crate::network::spec::NetworkSpec;
    use crate::train::train_config::Hyperparams;

    fn xor() -> Vec<TrainingExample> {
        vec![
            TrainingExample::new(vec![0.0, 0.0], vec![0.0]),
            TrainingExample::new(vec![0.0, 1.0], vec![1.0]),
            TrainingExample::new(vec![1.0, 0.0], vec![1.0]),
            TrainingExample::new(vec![1.0, 1.0], vec![0.0]),
        ]
    }

    fn seeded(spec: NetworkSpec) -> Network {
        Network::with_rng(spec, &mut StdRng::seed_from_u64(11)).unwrap()
    }

    #[test]
    fn epoch_cap_is_reported_not_raised() {
        let mut net = seeded(NetworkSpec::new(2, 3, 1));
        let config = TrainConfig::new(Hyperparams {
            max_epochs: 5,
            precision: 0.0,
            seed: Some(1),
            ..Hyperparams::default()
        });
        let report = train_loop(&mut net, &xor(), &config).unwrap();
        assert_eq!(report.outcome, TrainOutcome::EpochLimitReached);
        assert_eq!(report.epochs, 5);
        assert!(report.final_error.is_finite());
        assert!(net.is_ready());
    }

    #[test]
    fn loose_precision_converges_immediately() {
        let mut net = seeded(NetworkSpec::new(2, 3, 1));
        let config = TrainConfig::new(Hyperparams { precision: 10.0, seed: Some(1), ..Hyperparams::default() });
        let report = train_loop(&mut net, &xor(), &config).unwrap();
        assert_eq!(report.outcome, TrainOutcome::Converged);
        assert_eq!(report.epochs, 1);
    }

    #[test]
    fn raised_stop_flag_prevents_training() {
        let mut net = seeded(NetworkSpec::new(2, 3, 1));
        let mut config = TrainConfig::new(Hyperparams::default());
        config.stop_flag = Some(Arc::new(AtomicBool::new(true)));
        let report = train_loop(&mut net, &xor(), &config).unwrap();
        assert_eq!(report.outcome, TrainOutcome::Stopped);
        assert_eq!(report.epochs, 0);
        assert!(!net.is_ready());
    }

    #[test]
    fn progress_is_sent_every_report_interval() {
        let mut net = seeded(NetworkSpec::new(2, 3, 1));
        let (tx, rx) = mpsc::channel();
        let mut config = TrainConfig::new(Hyperparams {
            max_epochs: 25,
            precision: 0.0,
            report_every: 10,
            seed: Some(2),
            ..Hyperparams::default()
        });
        config.progress_tx = Some(tx);
        train_loop(&mut net, &xor(), &config).unwrap();
        drop(config);

        let epochs: Vec<usize> = rx.iter().map(|s| s.epoch).collect();
        assert_eq!(epochs, vec![10, 20, 25]);
    }

    #[test]
    fn dropped_receiver_stops_training() {
        let mut net = seeded(NetworkSpec::new(2, 3, 1));
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut config = TrainConfig::new(Hyperparams {
            precision: 0.0,
            report_every: 3,
            seed: Some(2),
            ..Hyperparams::default()
        });
        config.progress_tx = Some(tx);
        let report = train_loop(&mut net, &xor(), &config).unwrap();
        assert_eq!(report.outcome, TrainOutcome::Stopped);
        assert_eq!(report.epochs, 3);
    }

    #[test]
    fn softmax_output_trains_with_cross_entropy() {
        let spec = NetworkSpec::new(2, 4, 2)
            .with_activations(ActivationFunction::Tanh, ActivationFunction::Softmax);
        let mut net = seeded(spec);
        let data = vec![
            TrainingExample::one_hot(vec![1.0, 0.0], 0, 2),
            TrainingExample::one_hot(vec![0.0, 1.0], 1, 2),
        ];
        let config = TrainConfig::new(Hyperparams {
            max_epochs: 2000,
            precision: 0.05,
            seed: Some(3),
            ..Hyperparams::default()
        });
        let report = train_loop(&mut net, &data, &config).unwrap();
        assert!(report.converged(), "{report:?}");
        let out = net.forward(&[1.0, 0.0]).unwrap();
        assert!((out.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(out[0] > out[1]);
    }

    #[test]
    fn softmax_with_explicit_mse_is_a_configuration_error() {
        let spec = NetworkSpec::new(2, 2, 2)
            .with_activations(ActivationFunction::Sigmoid, ActivationFunction::Softmax);
        let mut net = seeded(spec);
        let config = TrainConfig::new(Hyperparams { loss: Some(LossType::Mse), ..Hyperparams::default() });
        let data = vec![TrainingExample::one_hot(vec![1.0, 0.0], 0, 2)];
        assert!(matches!(train_loop(&mut net, &data, &config), Err(NetError::Configuration(_))));
    }

    #[test]
    fn nan_example_is_rejected_and_network_stays_unready() {
        let mut net = seeded(NetworkSpec::new(2, 2, 1));
        let before = net.save_weights();
        let data = vec![TrainingExample::new(vec![f64::NAN, 0.0], vec![1.0])];
        let config = TrainConfig::new(Hyperparams { max_epochs: 10, ..Hyperparams::default() });
        assert!(matches!(train_loop(&mut net, &data, &config), Err(NetError::Configuration(_))));
        assert!(!net.is_ready());
        assert_eq!(net.save_weights(), before);
    }

    #[test]
    fn momentum_run_learns_or() {
        let mut net = seeded(NetworkSpec::new(2, 4, 1));
        let or = vec![
            TrainingExample::new(vec![0.0, 0.0], vec![0.0]),
            TrainingExample::new(vec![0.0, 1.0], vec![1.0]),
            TrainingExample::new(vec![1.0, 0.0], vec![1.0]),
            TrainingExample::new(vec![1.0, 1.0], vec![1.0]),
        ];
        let config = TrainConfig::new(Hyperparams {
            learning_rate: 0.3,
            momentum: 0.5,
            max_epochs: 20_000,
            precision: 0.005,
            seed: Some(5),
            ..Hyperparams::default()
        });
        let report = train_loop(&mut net, &or, &config).unwrap();
        assert!(report.converged(), "{report:?}");
        assert!(net.forward(&[0.0, 0.0]).unwrap()[0] < 0.5);
        assert!(net.forward(&[1.0, 1.0]).unwrap()[0] > 0.5);
    }
}

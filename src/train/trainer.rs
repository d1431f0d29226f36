use crate::{
    error::Result,
    loss::loss_type::LossType,
    network::network::Network,
    optim::sgd::Sgd,
    train::example::{check_examples, TrainingExample},
};

/// Runs one forward and backward pass for a single example and updates the
/// weights in place. Returns the example's loss before the update.
pub(crate) fn backpropagate(
    network: &mut Network,
    example: &TrainingExample,
    optimizer: &Sgd,
    loss: LossType,
) -> f64 {
    let output = network.feed(&example.input);
    let error_value = loss.loss(&output, &example.target);

    // ∂L/∂a of the output layer
    let mut error = loss.derivative(&output, &example.target);

    for i in (0..network.layers.len()).rev() {
        let (w_grad, delta) = network.layers[i].compute_gradients(&error);

        // Propagate through the weights before they change.
        if i > 0 {
            error = network.layers[i].backpropagate_error(&delta);
        }

        optimizer.step(&mut network.layers[i], &w_grad, &delta);
    }

    error_value
}

/// One epoch of online SGD visiting `examples` in `order`. Returns the mean loss.
pub(crate) fn run_one_epoch(
    network: &mut Network,
    examples: &[TrainingExample],
    order: &[usize],
    optimizer: &Sgd,
    loss: LossType,
) -> f64 {
    let total: f64 = order.iter()
        .map(|&idx| backpropagate(network, &examples[idx], optimizer, loss))
        .sum();
    network.mark_ready();
    total / order.len() as f64
}

/// Mean loss over `examples` without touching the weights.
pub(crate) fn evaluate_error(network: &mut Network, examples: &[TrainingExample], loss: LossType) -> f64 {
    let total: f64 = examples.iter()
        .map(|ex| {
            let output = network.feed(&ex.input);
            loss.loss(&output, &ex.target)
        })
        .sum();
    total / examples.len().max(1) as f64
}

/// Trains `network` for exactly one epoch in the given example order.
///
/// The optimizer settings and examples are checked before any weight
/// changes; the loss is the default for the output activation. Returns the
/// mean loss of the epoch.
pub fn train_network(
    network: &mut Network,
    examples: &[TrainingExample],
    optimizer: &Sgd,
) -> Result<f64> {
    optimizer.validate()?;
    check_examples(network, examples)?;
    let loss = LossType::for_output(network.spec().output_activation);
    let order: Vec<usize> = (0..examples.len()).collect();
    Ok(run_one_epoch(network, examples, &order, optimizer, loss))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetError;
    use crate::network::spec::NetworkSpec;
    use rand::{rngs::StdRng, SeedableRng};

    fn tiny() -> Network {
        Network::with_rng(NetworkSpec::new(2, 2, 1), &mut StdRng::seed_from_u64(3)).unwrap()
    }

    #[test]
    fn error_decreases_on_a_single_repeated_example() {
        let mut net = tiny();
        let data = vec![TrainingExample::new(vec![1.0, 0.0], vec![1.0])];
        let sgd = Sgd::new(0.5);

        let first = train_network(&mut net, &data, &sgd).unwrap();
        let mut last = first;
        for _ in 1..100 {
            last = train_network(&mut net, &data, &sgd).unwrap();
        }
        assert!(last < first, "{last} >= {first}");
    }

    #[test]
    fn one_epoch_makes_the_network_ready() {
        let mut net = tiny();
        assert!(!net.is_ready());
        let data = vec![TrainingExample::new(vec![0.0, 1.0], vec![0.0])];
        train_network(&mut net, &data, &Sgd::new(0.1)).unwrap();
        assert!(net.is_ready());
    }

    #[test]
    fn shape_mismatch_fails_before_any_update() {
        let mut net = tiny();
        let before = net.layers[0].weights.clone();
        let data = vec![
            TrainingExample::new(vec![1.0, 0.0], vec![1.0]),
            TrainingExample::new(vec![1.0, 0.0], vec![1.0, 0.0]),
        ];
        let err = train_network(&mut net, &data, &Sgd::new(0.1)).unwrap_err();
        assert!(matches!(err, NetError::TargetShape { expected: 1, actual: 2 }));
        assert_eq!(net.layers[0].weights, before);
        assert!(!net.is_ready());
    }

    #[test]
    fn non_finite_values_fail_before_any_update() {
        for data in [
            vec![TrainingExample::new(vec![f64::NAN, 0.0], vec![1.0])],
            vec![
                TrainingExample::new(vec![1.0, 0.0], vec![1.0]),
                TrainingExample::new(vec![1.0, 0.0], vec![f64::INFINITY]),
            ],
        ] {
            let mut net = tiny();
            let before = net.save_weights();
            let err = train_network(&mut net, &data, &Sgd::new(0.1)).unwrap_err();
            assert!(matches!(&err, NetError::Configuration(msg) if msg.contains(&format!("example {}", data.len() - 1))));
            assert_eq!(net.save_weights(), before);
            assert!(!net.is_ready());
        }
    }

    #[test]
    fn invalid_optimizer_settings_are_rejected() {
        let data = vec![TrainingExample::new(vec![1.0, 0.0], vec![1.0])];
        for sgd in [Sgd::new(0.0), Sgd::new(-0.1), Sgd::new(f64::NAN), Sgd::with_momentum(0.1, 1.0)] {
            let mut net = tiny();
            let before = net.save_weights();
            assert!(matches!(train_network(&mut net, &data, &sgd), Err(NetError::Configuration(_))));
            assert_eq!(net.save_weights(), before);
            assert!(!net.is_ready());
        }
    }

    #[test]
    fn empty_set_is_rejected() {
        let err = train_network(&mut tiny(), &[], &Sgd::new(0.1)).unwrap_err();
        assert!(matches!(err, NetError::EmptyTrainingSet));
    }

    #[test]
    fn output_gradient_matches_finite_difference() {
        let mut net = tiny();
        let ex = TrainingExample::new(vec![0.7, -0.2], vec![1.0]);

        let eps = 1e-6;
        let w = net.layers[1].weights.data[0][0];
        net.layers[1].weights.data[0][0] = w + eps;
        let plus = evaluate_error(&mut net, std::slice::from_ref(&ex), LossType::Mse);
        net.layers[1].weights.data[0][0] = w - eps;
        let minus = evaluate_error(&mut net, std::slice::from_ref(&ex), LossType::Mse);
        net.layers[1].weights.data[0][0] = w;
        let numeric = (plus - minus) / (2.0 * eps);

        let output = net.feed(&ex.input);
        let error = LossType::Mse.derivative(&output, &ex.target);
        let (w_grad, _) = net.layers[1].compute_gradients(&error);
        assert!((w_grad.data[0][0] - numeric).abs() < 1e-6);
    }
}

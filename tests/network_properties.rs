use lexinet::classify::argmax;
use lexinet::encode::letter::glyph;
use lexinet::{
    confidence, predict_label, train_loop, train_network, Classifier, Hyperparams, NetError, Network, NetworkSpec,
    Sgd, TrainConfig, TrainingExample, WeightSnapshot,
};
use rand::{rngs::StdRng, SeedableRng};

fn seeded(spec: NetworkSpec, seed: u64) -> Network {
    Network::with_rng(spec, &mut StdRng::seed_from_u64(seed)).unwrap()
}

fn trained_or(seed: u64) -> Network {
    let mut net = seeded(NetworkSpec::new(2, 3, 1), seed);
    let data = vec![
        TrainingExample::new(vec![0.0, 0.0], vec![0.0]),
        TrainingExample::new(vec![1.0, 1.0], vec![1.0]),
    ];
    train_network(&mut net, &data, &Sgd::new(0.5)).unwrap();
    net
}

#[test]
fn forward_output_depends_only_on_input() {
    let mut net = trained_or(1);
    let x = [0.25, 0.75];
    let first = net.forward(&x).unwrap();
    net.forward(&[1.0, 0.0]).unwrap();
    assert_eq!(net.forward(&x).unwrap(), first);
}

#[test]
fn wrong_dimensions_are_reported() {
    let mut net = trained_or(2);
    assert!(matches!(
        net.forward(&[1.0, 2.0, 3.0]),
        Err(NetError::InputShape { expected: 2, actual: 3 })
    ));

    let bad_target = vec![TrainingExample::new(vec![0.0, 1.0], vec![1.0, 0.0])];
    let config = TrainConfig::new(Hyperparams { max_epochs: 10, ..Hyperparams::default() });
    assert!(matches!(
        train_loop(&mut net, &bad_target, &config),
        Err(NetError::TargetShape { expected: 1, actual: 2 })
    ));
}

#[test]
fn single_example_error_shrinks_with_training() {
    let mut net = seeded(NetworkSpec::new(2, 2, 1), 3);
    let data = vec![TrainingExample::new(vec![1.0, 0.0], vec![1.0])];
    let sgd = Sgd::new(0.5);
    let first = train_network(&mut net, &data, &sgd).unwrap();
    let mut last = first;
    for _ in 1..100 {
        last = train_network(&mut net, &data, &sgd).unwrap();
    }
    assert!(last < first, "error went from {first} to {last}");
}

#[test]
fn snapshot_round_trip_preserves_outputs() {
    let mut source = trained_or(4);
    let json = source.save_weights().to_json_string().unwrap();

    let mut target = seeded(NetworkSpec::new(2, 3, 1), 99);
    assert!(!target.is_ready());
    target.load_weights(&WeightSnapshot::from_json_str(&json).unwrap()).unwrap();
    assert!(target.is_ready());

    for x in [[0.0, 0.0], [0.3, 0.9], [1.0, 1.0]] {
        assert_eq!(source.forward(&x).unwrap(), target.forward(&x).unwrap());
    }
}

#[test]
fn snapshot_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weights.json");
    let path = path.to_str().unwrap();

    let mut source = trained_or(5);
    source.save_json(path).unwrap();

    let mut target = seeded(NetworkSpec::new(2, 3, 1), 6);
    target.load_json(path).unwrap();
    assert_eq!(source.forward(&[0.6, 0.1]).unwrap(), target.forward(&[0.6, 0.1]).unwrap());
}

#[test]
fn malformed_snapshot_leaves_ready_network_untouched() {
    let mut net = trained_or(7);
    let before = net.save_weights();
    let out_before = net.forward(&[0.4, 0.2]).unwrap();

    let mut bad = before.clone();
    bad.w_h.pop();
    assert!(!net.try_load_weights(&bad));
    assert!(net.is_ready());
    assert_eq!(net.save_weights(), before);
    assert_eq!(net.forward(&[0.4, 0.2]).unwrap(), out_before);
}

#[test]
fn malformed_snapshot_keeps_fresh_network_unready() {
    let mut net = seeded(NetworkSpec::new(2, 3, 1), 8);
    let before = net.save_weights();

    let mut bad = trained_or(9).save_weights();
    bad.w_o[0].push(0.5);
    assert!(!net.try_load_weights(&bad));
    assert!(!net.is_ready());
    assert_eq!(net.save_weights(), before);
}

#[test]
fn confidence_stays_in_unit_interval() {
    for outputs in [
        vec![0.9, 0.1, 0.0],
        vec![0.5, 0.5],
        vec![1.0],
        vec![0.2],
        vec![3.0, -4.0],
        vec![0.1, 0.35, 0.3],
    ] {
        let c = confidence(&outputs);
        assert!((0.0..=1.0).contains(&c), "{outputs:?} -> {c}");
    }
    assert_eq!(confidence(&[0.5, 0.5]), 0.0);
    assert!((confidence(&[0.1, 0.35, 0.3]) - 0.1).abs() < 1e-12);
}

#[test]
fn ties_resolve_to_the_first_label() {
    let labels: Vec<String> = ["b", "d", "p"].iter().map(|s| s.to_string()).collect();
    assert_eq!(argmax(&[0.4, 0.4, 0.1]), 0);
    assert_eq!(predict_label(&[0.1, 0.7, 0.7], &labels).unwrap(), "d");
}

#[test]
fn mirrored_letters_are_separated() {
    let letters = ['b', 'd', 'p'];
    let data: Vec<TrainingExample> = letters
        .iter()
        .enumerate()
        .map(|(class, c)| TrainingExample::one_hot(glyph(*c).unwrap().to_input(), class, letters.len()))
        .collect();

    let net = seeded(NetworkSpec::new(35, 4, 3), 2024);
    let mut classifier = Classifier::new(net, letters.iter().map(|c| c.to_string())).unwrap();
    let config = TrainConfig::new(Hyperparams {
        learning_rate: 0.1,
        max_epochs: 5000,
        precision: 0.01,
        seed: Some(2024),
        ..Hyperparams::default()
    });
    let report = train_loop(classifier.network_mut(), &data, &config).unwrap();
    assert!(report.final_error <= 0.05, "{report:?}");

    for (ex, letter) in data.iter().zip(letters) {
        let prediction = classifier.predict(&ex.input).unwrap();
        assert_eq!(prediction.label, letter.to_string());
        assert!(prediction.confidence > 0.3, "{prediction:?}");
    }
}

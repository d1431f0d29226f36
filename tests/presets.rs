use lexinet::classify::accuracy;
use lexinet::encode::letter::{glyph, letter_classifier, letter_spec, letter_training_set, GLYPH_LETTERS};
use lexinet::encode::student::{student_spec, student_training_set, PERFORMANCE_LABELS};
use lexinet::encode::word::{word_classifier, word_spec, word_training_set, VOCABULARY};
use lexinet::{
    Hyperparams, ModelRegistry, ModelStatus, Network, NetworkSpec, StatusStore, TrainingExample, TrainingWorker,
};
use rand::{rngs::StdRng, SeedableRng};

fn hyperparams(max_epochs: usize) -> Hyperparams {
    Hyperparams {
        learning_rate: 0.3,
        momentum: 0.5,
        max_epochs,
        precision: 0.01,
        seed: Some(2024),
        report_every: 100,
        ..Hyperparams::default()
    }
}

fn seeded(spec: NetworkSpec, seed: u64) -> Network {
    Network::with_rng(spec, &mut StdRng::seed_from_u64(seed)).unwrap()
}

#[test]
fn letter_preset_recognizes_clean_glyphs() {
    let mut rng = StdRng::seed_from_u64(1);
    let data = letter_training_set(4, 1, &mut rng);
    assert_eq!(data.len(), GLYPH_LETTERS.len() * 5);

    let worker = TrainingWorker::spawn("letters", seeded(letter_spec(16), 1), data, hyperparams(3000)).unwrap();
    let (network, report) = worker.join().unwrap();
    assert!(report.final_error < 0.1, "{report:?}");

    let mut classifier = letter_classifier(network).unwrap();
    let mut correct = 0;
    for letter in GLYPH_LETTERS {
        let prediction = classifier.predict(&glyph(letter).unwrap().to_input()).unwrap();
        if prediction.label == letter.to_string() {
            correct += 1;
        }
    }
    assert!(correct >= 9, "only {correct} of {} glyphs recognized", GLYPH_LETTERS.len());
}

#[test]
fn word_preset_learns_vocabulary() {
    let data = word_training_set(0, 0.0, &mut StdRng::seed_from_u64(2));
    assert_eq!(data.len(), VOCABULARY.len());

    let worker = TrainingWorker::spawn("words", seeded(word_spec(20), 2), data.clone(), hyperparams(3000)).unwrap();
    let (network, _) = worker.join().unwrap();
    let mut classifier = word_classifier(network).unwrap();
    assert!(accuracy(classifier.network_mut(), &data).unwrap() >= 0.9);
    assert_eq!(classifier.class_of("dragón"), Some(7));
}

#[test]
fn student_preset_generalizes_the_scoring_rule() {
    let mut rng = StdRng::seed_from_u64(3);
    let train = student_training_set(200, &mut rng);
    let held_out = student_training_set(100, &mut rng);
    assert!(train.iter().all(|ex| ex.target.len() == PERFORMANCE_LABELS.len()));

    let worker = TrainingWorker::spawn("students", seeded(student_spec(8), 3), train, hyperparams(2000)).unwrap();
    let (mut network, _) = worker.join().unwrap();
    let acc = accuracy(&mut network, &held_out).unwrap();
    assert!(acc >= 0.8, "held-out accuracy {acc}");
}

#[test]
fn registry_tracks_worker_lifecycle() {
    let registry = ModelRegistry::shared();
    registry.register("or");
    assert_eq!(registry.status("or"), ModelStatus::NotReady);
    assert!(!registry.all_ready());

    let data = vec![
        TrainingExample::new(vec![0.0, 0.0], vec![0.0]),
        TrainingExample::new(vec![0.0, 1.0], vec![1.0]),
        TrainingExample::new(vec![1.0, 0.0], vec![1.0]),
        TrainingExample::new(vec![1.0, 1.0], vec![1.0]),
    ];
    registry.mark_training("or");
    let worker = TrainingWorker::spawn("or", seeded(NetworkSpec::new(2, 4, 1), 4), data, hyperparams(20_000)).unwrap();
    assert_eq!(registry.status("or"), ModelStatus::Training);

    let (network, report) = worker.join().unwrap();
    registry.mark_ready("or", network.save_weights(), Some(report.clone()));
    assert!(registry.all_ready());
    assert_eq!(registry.report("or"), Some(report));

    let mut restored = registry.restore("or").unwrap();
    assert!(restored.forward(&[1.0, 1.0]).unwrap()[0] > 0.5);

    registry.reset();
    assert_eq!(registry.status("or"), ModelStatus::NotReady);
    assert!(registry.snapshot("or").is_none());
}

//! Trains the letter recognizer, then classifies noisy versions of each glyph.
use rand::{rngs::StdRng, SeedableRng};

use lexinet::encode::letter::{self, GLYPH_LETTERS};
use lexinet::{train_loop, Hyperparams, Network, TrainConfig};

fn main() -> lexinet::Result<()> {
    env_logger::init();
    let mut rng = StdRng::seed_from_u64(7);

    let mut network = Network::with_rng(letter::letter_spec(16), &mut rng)?;
    let examples = letter::letter_training_set(10, 2, &mut rng);
    let config = TrainConfig::new(Hyperparams {
        learning_rate: 0.3,
        max_epochs: 3_000,
        seed: Some(7),
        ..Hyperparams::default()
    });
    let report = train_loop(&mut network, &examples, &config)?;
    println!("{:?} after {} epochs (error {:.5})", report.outcome, report.epochs, report.final_error);

    let mut classifier = letter::letter_classifier(network)?;
    for c in GLYPH_LETTERS {
        let Some(clean) = letter::glyph(c) else { continue };
        let noisy = clean.with_noise(3, &mut rng);
        let p = classifier.predict(&noisy.to_input())?;
        println!("{noisy}-> {c} read as {} (confidence {:.2})\n", p.label, p.confidence);
    }
    Ok(())
}

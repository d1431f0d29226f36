//! Trains the letter, word and student-analysis networks on background
//! workers, publishes them to a model registry and prints sample
//! predictions.
//!
//! Run with:
//!   RUST_LOG=info cargo run --release -- [letters-snapshot.json]
use std::env;
use std::process::ExitCode;

use log::{debug, error, info};
use rand::{rngs::StdRng, SeedableRng};

use lexinet::encode::{letter, student, word};
use lexinet::{Hyperparams, ModelRegistry, Network, Result, StatusStore, TrainingWorker};

const SEED: u64 = 2024;

fn main() -> ExitCode {
    env_logger::init();

    match run(env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(snapshot_path: Option<String>) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let registry = ModelRegistry::new();

    let jobs = vec![
        ("letters", Network::with_rng(letter::letter_spec(16), &mut rng)?, letter::letter_training_set(8, 2, &mut rng)),
        ("words", Network::with_rng(word::word_spec(20), &mut rng)?, word::word_training_set(4, 0.03, &mut rng)),
        ("students", Network::with_rng(student::student_spec(8), &mut rng)?, student::student_training_set(300, &mut rng)),
    ];
    let hp = Hyperparams {
        learning_rate: 0.3,
        momentum: 0.5,
        max_epochs: 5_000,
        seed: Some(SEED),
        report_every: 500,
        ..Hyperparams::default()
    };

    let mut workers = Vec::with_capacity(jobs.len());
    for (name, network, examples) in jobs {
        registry.register(name);
        registry.mark_training(name);
        workers.push(TrainingWorker::spawn(name, network, examples, hp.clone())?);
    }

    for worker in workers {
        let name = worker.name().to_owned();
        for stats in worker.progress().iter() {
            debug!("[{name}] epoch {}: error={:.5} accuracy={:.3}", stats.epoch, stats.error, stats.accuracy);
        }
        match worker.join() {
            Ok((network, report)) => {
                info!("[{name}] {:?} after {} epochs, error {:.5}", report.outcome, report.epochs, report.final_error);
                registry.mark_ready(&name, network.save_weights(), Some(report));
            }
            Err(e) => {
                registry.mark_failed(&name);
                return Err(e);
            }
        }
    }

    let mut letters = letter::letter_classifier(registry.restore("letters")?)?;
    for c in letter::GLYPH_LETTERS {
        let Some(bitmap) = letter::glyph(c) else { continue };
        let p = letters.predict(&bitmap.to_input())?;
        println!("letter {c}: {} (confidence {:.2})", p.label, p.confidence);
    }

    let mut words = word::word_classifier(registry.restore("words")?)?;
    for w in ["Dragón", "plato", "perro", "BRAZO"] {
        let p = words.predict(&word::encode_word(w))?;
        println!("word {w}: {} (confidence {:.2})", p.label, p.confidence);
    }

    let mut students = student::student_classifier(registry.restore("students")?)?;
    let sample = student::StudentMetrics {
        accuracy: 0.72,
        mean_response_secs: 14.0,
        levels_completed: 11,
        levels_total: 20,
        attempts_per_level: 1.8,
        modules_played: 4,
        recent_trend: 0.1,
    };
    let p = students.predict(&sample.encode())?;
    println!(
        "student: {} (confidence {:.2}, score {}/100)",
        p.label,
        p.confidence,
        student::performance_score(&p.outputs)?
    );

    if let Some(path) = snapshot_path {
        registry.restore("letters")?.save_json(&path)?;
        info!("wrote letter snapshot to {path}");
    }

    println!("all models ready: {}", registry.all_ready());
    registry.reset();
    Ok(())
}

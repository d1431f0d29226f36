use lexinet::{Network, NetworkSpec, Sgd, TrainingExample, train_network};

fn main() -> lexinet::Result<()> {
    let mut network = Network::new(NetworkSpec::new(2, 3, 1))?;

    let examples = vec![
        TrainingExample::new(vec![1.0, 0.0], vec![1.0]),
        TrainingExample::new(vec![1.0, 1.0], vec![0.0]),
        TrainingExample::new(vec![0.0, 1.0], vec![1.0]),
        TrainingExample::new(vec![0.0, 0.0], vec![0.0]),
    ];

    let optimizer = Sgd::with_momentum(0.5, 0.9);
    let epochs = 10000;

    for epoch in 0..epochs {
        let loss = train_network(&mut network, &examples, &optimizer)?;
        if epoch % 1000 == 0 {
            println!("Epoch {epoch}: loss = {loss:.6}");
        }
    }

    for ex in &examples {
        println!("Input: {:?} -> Output: {:.4}", ex.input, network.forward(&ex.input)?[0]);
    }
    Ok(())
}

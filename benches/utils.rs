#![allow(dead_code)]
use dtree::Observation;
use rand::distributions::Uniform;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const LABELS: [&str; 3] = ["low", "mid", "high"];

// Labeled observations from a random linear model with uniform noise,
// the label is the bucket the response falls in.
pub(crate) fn create_observations(n_samples: usize, n_features: usize, seed: u64) -> Vec<Observation> {
    // reproducible seed
    let mut rng = StdRng::seed_from_u64(seed);

    let feature_distribution = Uniform::new(0.0, 1.0);
    let noise_distribution = Uniform::new(-0.25, 0.25);
    let weight_distribution = Uniform::new(-1.0, 1.0);

    let weights: Vec<f64> = (0..n_features).map(|_| rng.sample(weight_distribution)).collect();
    let scale: f64 = weights.iter().map(|w| w.abs()).sum::<f64>().max(f64::EPSILON);

    (0..n_samples)
        .map(|_| {
            let features: Vec<f64> = (0..n_features).map(|_| rng.sample(feature_distribution)).collect();
            let linear: f64 = features.iter().zip(weights.iter()).map(|(x, w)| x * w).sum::<f64>() / scale;
            let y = linear + rng.sample(noise_distribution);
            let label = if y < -0.2 {
                LABELS[0]
            } else if y < 0.2 {
                LABELS[1]
            } else {
                LABELS[2]
            };
            Observation::labeled(features, label)
        })
        .collect()
}

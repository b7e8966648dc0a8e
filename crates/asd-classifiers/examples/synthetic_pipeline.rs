use asd_classifiers::data_handling::{Datasets, FeatureTable, LabeledTable};
use asd_classifiers::{Pipeline, PipelineConfig, Preset};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // 200 training rows, 60 count-like features; the first 5 carry signal.
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let n_train = 200;
    let n_test = 20;
    let n_features = 60;
    let names: Vec<String> = (1..=n_features).map(|i| format!("X{}", i)).collect();

    let labels: Array1<i64> = (0..n_train).map(|_| rng.gen_range(0..2)).collect();
    let train_x = Array2::from_shape_fn((n_train, n_features), |(r, c)| {
        let base: f64 = rng.gen_range(0.0..10.0);
        if c < 5 {
            base + 5.0 * labels[r] as f64
        } else {
            base
        }
    });
    let test_x = Array2::from_shape_fn((n_test, n_features), |_| rng.gen_range(0.0..15.0));

    let train = LabeledTable::new(FeatureTable::new(names.clone(), train_x)?, labels, "Class".to_string())?;
    let test = FeatureTable::new(names, test_x)?;
    let datasets = Datasets::new(train, test)?;

    let mut config = PipelineConfig::preset(Preset::CorrelationElimination);
    config.reduction.k_best = 10;
    config.reduction.post_selection_drop.clear();

    let output = Pipeline::new(config).fit_predict(&datasets)?;

    println!("Selected features: {:?}", output.selected_features());
    println!("Training accuracy: {:.3}", output.training_accuracy);
    for (id, label) in output.submission.rows().take(5) {
        println!("{},{}", id, label);
    }
    Ok(())
}

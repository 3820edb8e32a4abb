// Runs the multi-label loss on one random batch and prints the result.
//
//   cargo run -- [config.json] [--batch N] [--attributes K] [--seed S]
//   cargo run -- --help
//
// Without a config file the loss is unweighted and normalized by batch size.
use std::process::ExitCode;

use clap::Parser;
use rand::prelude::*;
use rand::rngs::StdRng;
use tracing::error;
use tracing_subscriber::EnvFilter;

use multilabel_loss::{Layer, LayerRegistry, LossConfig, LossError, MultiLabelSigmoidCrossEntropyLoss, Tensor};

/// Runs the multi-label loss on one random batch
#[derive(Parser)]
#[command(name = "multilabel-loss")]
#[command(version)]
struct Args {
    /// Loss config (JSON); unweighted BATCH_SIZE loss when omitted
    config_path: Option<String>,

    /// Examples in the batch
    #[arg(short, long, default_value = "8")]
    batch: usize,

    /// Attributes per example (ignored when the config sets positive_ratio)
    #[arg(short, long, default_value = "4")]
    attributes: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,
}

/// Standard-normal scores and Bernoulli targets drawn at each attribute's
/// positive ratio (0.5 when unset).
fn random_batch(rng: &mut StdRng, batch: usize, positive_ratio: &[f64]) -> Result<(Tensor, Tensor), LossError> {
    let attributes = positive_ratio.len();
    let mut scores = Vec::with_capacity(batch * attributes);
    let mut targets = Vec::with_capacity(batch * attributes);
    for _ in 0..batch {
        for &ratio in positive_ratio {
            // Box-Muller; u1 in (0, 1] avoids ln(0)
            let u1: f64 = 1.0 - rng.gen::<f64>();
            let u2: f64 = rng.gen();
            scores.push((-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos());
            targets.push(if rng.gen_bool(ratio.clamp(0.0, 1.0)) { 1.0 } else { 0.0 });
        }
    }
    Ok((
        Tensor::from_data(&[batch, attributes], scores)?,
        Tensor::from_data(&[batch, attributes], targets)?,
    ))
}

fn run(args: &Args) -> Result<(), LossError> {
    let config = match &args.config_path {
        Some(path) => LossConfig::load_json(path)?,
        None => LossConfig::default(),
    };
    let ratios = if config.positive_ratio.is_empty() {
        vec![0.5; args.attributes]
    } else {
        config.positive_ratio.clone()
    };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let (predictions, targets) = random_batch(&mut rng, args.batch, &ratios)?;

    let registry = LayerRegistry::with_builtin();
    let mut layer = registry.create(MultiLabelSigmoidCrossEntropyLoss::TYPE_NAME, &config)?;
    let bottom = [&predictions, &targets];
    layer.configure(&bottom)?;
    layer.reshape(&bottom)?;
    let loss = layer.forward(&bottom)?.data()[0];

    println!("layer          : {}", layer.type_name());
    println!("batch          : {} x {}", args.batch, ratios.len());
    println!("normalization  : {}", config.resolved_normalization());
    println!("loss           : {loss:.6}");
    println!("weighted loss  : {:.6}", loss * config.resolved_loss_weight());
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_fatal() => {
            error!("{err}");
            ExitCode::from(2)
        }
        Err(err) => {
            error!("{err}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_and_defaults() {
        let args = Args::try_parse_from(["multilabel-loss"]).unwrap();
        assert_eq!((args.batch, args.attributes, args.seed), (8, 4, None));
        assert!(args.config_path.is_none());

        let args = Args::try_parse_from([
            "multilabel-loss", "loss.json", "--batch", "3", "-a", "2", "--seed", "7",
        ])
        .unwrap();
        assert_eq!(args.config_path.as_deref(), Some("loss.json"));
        assert_eq!((args.batch, args.attributes, args.seed), (3, 2, Some(7)));
    }

    #[test]
    fn help_and_bad_values_are_reported() {
        let help = Args::try_parse_from(["multilabel-loss", "--help"]).err().unwrap();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
        assert!(Args::try_parse_from(["multilabel-loss", "--batch", "many"]).is_err());
    }

    #[test]
    fn seeded_batches_are_reproducible() {
        let draw = || random_batch(&mut StdRng::seed_from_u64(3), 4, &[0.2, 0.8]).unwrap();
        let (p1, t1) = draw();
        let (p2, t2) = draw();
        assert_eq!(p1, p2);
        assert_eq!(t1, t2);
        assert_eq!(p1.shape(), &[4, 2]);
        assert!(t1.data().iter().all(|&t| t == 0.0 || t == 1.0));
    }
}

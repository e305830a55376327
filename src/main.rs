mod args;

use anyhow::{Context, Result};
use clap::Parser;
use notepitch_cv::{
    ClassificationAdapter, DatasetBuilder, InferencePipeline, PipelineConfig, SampleLabeler,
    TemplateClassifier, TemplateLoader,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use args::{Args, ClassifyArgs, Command, GenerateArgs, SampleArgs};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config: {:?}", path))?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = args.reference_dir {
        config.reference_dir = dir;
    }

    match args.command {
        Command::Generate(cmd) => generate(config, cmd),
        Command::Classify(cmd) => {
            let code = classify(config, cmd)?;
            std::process::exit(code);
        }
        Command::Sample(cmd) => sample(config, cmd),
    }
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Canonical size plus the built-in template classifier, both from the
/// reference directory
fn load_adapter(config: &PipelineConfig) -> Result<ClassificationAdapter<TemplateClassifier>> {
    let loader = TemplateLoader::new(&config.reference_dir);
    let size = loader
        .canonical_size(config.inference.reference_note)
        .context("Failed to determine canonical template size")?;
    let templates = loader
        .load_set(size, config.augment.binarize_threshold)
        .context("Failed to load reference templates")?;
    let classifier = TemplateClassifier::new(&templates, config.inference.classifier_temperature)?;
    info!("Loaded {} templates at canonical size {}", templates.len(), size);
    Ok(ClassificationAdapter::new(classifier, size))
}

fn generate(mut config: PipelineConfig, cmd: GenerateArgs) -> Result<()> {
    if let Some(dir) = cmd.output_dir {
        config.dataset_dir = dir;
    }
    if let Some(n) = cmd.variants {
        config.augment.variants_per_category = n;
    }
    if let Some(max_pad) = cmd.max_pad {
        config.augment.max_pad = max_pad;
    }
    if cmd.seed.is_some() {
        config.augment.seed = cmd.seed;
    }
    config.validate()?;

    let sources = TemplateLoader::new(&config.reference_dir)
        .reference_paths()
        .with_context(|| format!("Failed to read reference directory: {:?}", config.reference_dir))?;
    let builder = DatasetBuilder::new(&config.augment, &config.dataset_dir)?;
    let mut rng = rng_from(config.augment.seed);
    let summary = builder.build(&sources, &mut rng)?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn classify(mut config: PipelineConfig, cmd: ClassifyArgs) -> Result<i32> {
    if let Some(note) = cmd.reference_note {
        config.inference.reference_note = note;
    }
    if let Some(dir) = cmd.output_dir {
        config.inference.output_dir = dir;
    }
    config.validate()?;

    let adapter = load_adapter(&config)?;
    let size = adapter.size();
    let pipeline = InferencePipeline::new(adapter.classifier(), size, &config.inference);
    let outcome = pipeline.run_file(&cmd.image);

    println!("{}", outcome.report().to_json()?);
    Ok(outcome.exit_code())
}

fn sample(mut config: PipelineConfig, cmd: SampleArgs) -> Result<()> {
    if let Some(dir) = cmd.generated_dir {
        config.dataset_dir = dir;
    }
    if let Some(dir) = cmd.selected_dir {
        config.sample.selected_dir = dir;
    }
    if let Some(file) = cmd.labels {
        config.sample.labels_file = file;
    }
    if let Some(count) = cmd.count {
        config.sample.count = count;
    }
    config.validate()?;

    let adapter = load_adapter(&config)?;
    let labeler = SampleLabeler::new(&adapter, config.sample.count);
    let mut rng = rng_from(cmd.seed.or(config.augment.seed));
    let labels = labeler.run(
        &config.dataset_dir,
        &config.sample.selected_dir,
        &config.sample.labels_file,
        &mut rng,
    )?;

    println!("{}", serde_json::to_string_pretty(&labels)?);
    Ok(())
}

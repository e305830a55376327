//! Command-line arguments

use clap::{Args as ClapArgs, Parser, Subcommand};
use notepitch_core::Pitch;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Synthetic note dataset generation and single-image pitch inference", long_about = None)]
pub struct Args {
    /// JSON configuration file; flags below override its values
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding one reference `.png` per pitch
    #[arg(long, global = true, value_name = "DIR")]
    pub reference_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the augmented training set from the reference images
    Generate(GenerateArgs),
    /// Localize, normalize and classify one note image
    Classify(ClassifyArgs),
    /// Classify a random sample of generated images and export labels
    Sample(SampleArgs),
}

#[derive(ClapArgs, Debug)]
pub struct GenerateArgs {
    /// Where `{note}_{index}.png` files are written
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Variants per single-operator category (combined gets twice this)
    #[arg(long, value_name = "N")]
    pub variants: Option<usize>,

    /// Exclusive upper bound of each random pad width
    #[arg(long, value_name = "PIXELS")]
    pub max_pad: Option<u32>,

    /// Seed for reproducible datasets
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(ClapArgs, Debug)]
pub struct ClassifyArgs {
    /// Image to classify
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Reference whose dimensions define the canonical size
    #[arg(long, value_name = "PITCH")]
    pub reference_note: Option<Pitch>,

    /// Where the input copy, binary and centered images are written
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct SampleArgs {
    /// Directory of generated variants to sample from
    #[arg(long, value_name = "DIR")]
    pub generated_dir: Option<PathBuf>,

    #[arg(long, value_name = "DIR")]
    pub selected_dir: Option<PathBuf>,

    #[arg(long, value_name = "FILE")]
    pub labels: Option<PathBuf>,

    #[arg(long, value_name = "K")]
    pub count: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,
}

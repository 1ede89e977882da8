use clap::Parser;
use log::{error, info};
use oculex_core::{Collaborators, DicomExtractor, ResultWriter};
use std::path::PathBuf;
use std::process;

/// CLI tool for extracting metadata and raster artifacts from ophthalmic
/// DICOM files
#[derive(Parser, Debug)]
#[command(name = "oculex")]
#[command(about = "Extract metadata and image artifacts from an ophthalmic DICOM file")]
#[command(version)]
struct Cli {
    /// DICOM file to extract
    #[arg(short, long, value_name = "FILE")]
    input_file: PathBuf,

    /// Folder receiving the JSON sidecar and PNG artifacts
    #[arg(short, long, value_name = "FOLDER")]
    output_folder: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    if !cli.input_file.is_file() {
        eprintln!("Error: {} is not a file", cli.input_file.display());
        process::exit(1);
    }

    info!("Processing file: {}", cli.input_file.display());

    let extractor = DicomExtractor::new(Collaborators::none());
    let writer = ResultWriter::new(&cli.output_folder);

    match extractor.extract_file_to(&cli.input_file, &writer) {
        Ok((extraction, written)) => {
            for warning in &extraction.warnings {
                eprintln!("Warning: {warning}");
            }
            println!("{}", written.sidecar.display());
            for image in &written.images {
                println!("{}", image.display());
            }
        }
        Err(e) => {
            error!("Extraction failed: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

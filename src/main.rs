//! CLI tool for extracting embedded images from a PDF into a ZIP archive.
//!
//! Runs the same pipeline as the HTTP service, reading the PDF from disk and
//! writing `extracted_images.zip` (or the given path) next to it.

use extractimagespdf::{Extraction, ExtractorConfig, ImageArchive, PdfImageExtractor, Result};
use std::{env, fs, process};

/// Exit status when the PDF parsed but held no extractable images.
const EXIT_NO_IMAGES: i32 = 2;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) || args.contains(&"-h".to_string()) {
        print_usage(program_name(&args));
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let pdf_path = &args[1];
    let output_path = args
        .get(2)
        .map(String::as_str)
        .unwrap_or(ImageArchive::FILE_NAME);

    match run_extraction(pdf_path, output_path) {
        Ok(true) => println!("\n✅ Extraction completed successfully!"),
        Ok(false) => process::exit(EXIT_NO_IMAGES),
        Err(e) => {
            eprintln!("\n❌ Error: {}", e);
            process::exit(1);
        }
    }
}

fn program_name(args: &[String]) -> &str {
    args.first().map_or("extractimagespdf", String::as_str)
}

fn print_usage(program_name: &str) {
    println!("🖼️  extractImagesPDF - PDF Image Extraction Tool");
    println!();
    println!("USAGE:");
    println!("    {} <pdf_file> [output_zip]", program_name);
    println!();
    println!("ARGUMENTS:");
    println!("    <pdf_file>     Path to the PDF file to read");
    println!("    [output_zip]   Archive to write (default: 'extracted_images.zip')");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help     Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    EXTRACT_IMAGES_COMPRESSION_LEVEL   Deflate level 0-9 (default: 9)");
    println!("    RUST_LOG                           Log filter, e.g. 'debug'");
    println!();
    println!("EXIT STATUS:");
    println!("    0  archive written");
    println!("    1  error (unreadable PDF, I/O or packaging failure)");
    println!("    2  the PDF contains no extractable images");
}

/// Returns `Ok(false)` when the document held no extractable images.
fn run_extraction(pdf_path: &str, output_path: &str) -> Result<bool> {
    println!("🔍 Reading PDF: {}", pdf_path);
    println!("{}", "─".repeat(60));

    let config = ExtractorConfig::from_env()?;
    let bytes = fs::read(pdf_path)?;

    let archive = match PdfImageExtractor::with_config(config).extract_archive(&bytes)? {
        Extraction::Archive(archive) => archive,
        Extraction::NoImagesFound => {
            println!("ℹ️  No images found in the PDF");
            return Ok(false);
        }
    };

    for name in &archive.entry_names {
        println!("📄 {}", name);
    }

    fs::write(output_path, &archive.data)?;

    println!("\n{}", "─".repeat(60));
    println!("📊 Summary:");
    println!("   • {} image(s) extracted", archive.len());
    println!(
        "   • Archive: {} ({})",
        output_path,
        format_bytes(archive.data.len())
    );

    Ok(true)
}

fn format_bytes(bytes: usize) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

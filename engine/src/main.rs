//! Rowmap CLI - map CSV rows onto the demo `Customer` record
//!
//! ```bash
//! rowmap import customers.csv               # Import with the built-in mapping
//! rowmap import customers.csv -m map.json   # Import with a mapping file
//! rowmap demo                               # Import the bundled sample
//! rowmap schema                             # Print the Customer schema
//! rowmap example-mapping                    # Print the built-in mapping as JSON
//! rowmap check-mapping map.json             # Validate a mapping file
//! ```
//!
//! Settings can also come from `ROWMAP_*` variables or a `.env` file; flags win.

use clap::{Parser, Subcommand};
use rowmap::demo::{example_mapping, Customer, SAMPLE_CSV};
use rowmap::logs::set_echo;
use rowmap::{
    derive_schema, import_csv, load_mapping, CoercionCache, CsvInfo, ImportOptions, ImportReport,
    MappingNode,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rowmap")]
#[command(about = "Map CSV rows onto typed records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a CSV file and output the records as JSON
    Import {
        /// Input CSV file
        input: PathBuf,

        /// Mapping JSON file (default: built-in example mapping)
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Input encoding (auto-detect if not specified)
        #[arg(short, long)]
        encoding: Option<String>,

        /// First line is data, not a header
        #[arg(long)]
        no_headers: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import the bundled sample with the built-in mapping
    Demo,

    /// Print the Customer schema
    Schema {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the built-in example mapping
    ExampleMapping,

    /// Check a mapping file against the Customer record
    CheckMapping {
        /// Mapping JSON file
        file: PathBuf,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();
    set_echo(true);

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Import {
            input,
            mapping,
            delimiter,
            encoding,
            no_headers,
            output,
        } => cmd_import(
            &input,
            mapping.as_deref(),
            delimiter,
            encoding,
            no_headers,
            output.as_deref(),
        ),

        Commands::Demo => cmd_demo(),

        Commands::Schema { output } => cmd_schema(output.as_deref()),

        Commands::ExampleMapping => cmd_example_mapping(),

        Commands::CheckMapping { file } => cmd_check_mapping(&file),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_import(
    input: &Path,
    mapping_path: Option<&Path>,
    delimiter: Option<char>,
    encoding: Option<String>,
    no_headers: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Importing: {}", input.display());

    let mut options = ImportOptions::from_env()?;
    if delimiter.is_some() {
        options.delimiter = delimiter;
    }
    if encoding.is_some() {
        options.encoding = encoding;
    }
    if no_headers {
        options.has_headers = false;
    }

    let mapping = match mapping_path {
        Some(path) => load_mapping(path)?,
        None => example_mapping(),
    };

    let bytes = fs::read(input)?;
    let cache = CoercionCache::new();
    let (report, info) = import_csv::<Customer>(&cache, &bytes, &mapping, &options)?;

    print_info(&info, &report);
    let json = serde_json::to_string_pretty(&report.records)?;
    write_output(&json, output)
}

fn cmd_demo() -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Importing bundled sample");

    let cache = CoercionCache::new();
    let (report, info) = import_csv::<Customer>(
        &cache,
        SAMPLE_CSV.as_bytes(),
        &example_mapping(),
        &ImportOptions::default(),
    )?;

    print_info(&info, &report);
    let json = serde_json::to_string_pretty(&report.records)?;
    write_output(&json, None)
}

fn print_info(info: &CsvInfo, report: &ImportReport<Customer>) {
    eprintln!("   Encoding: {}", info.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(info.delimiter));
    eprintln!("   Columns: {}", info.headers.join(", "));
    eprintln!("\n⚙️  {}", report.summary());
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn cmd_schema(output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let schema = derive_schema::<Customer>()?;
    write_output(&schema.to_json()?, output)
}

fn cmd_example_mapping() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", example_mapping().to_json()?);
    Ok(())
}

fn cmd_check_mapping(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Checking: {}", file.display());

    let mapping: MappingNode = load_mapping(file)?;
    CoercionCache::new().check::<Customer>(&mapping)?;

    eprintln!(
        "✅ Mapping fits Customer ({} leaves, rows need {} columns)",
        mapping.leaf_count(),
        mapping.required_width()
    );
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

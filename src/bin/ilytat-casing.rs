//! ilytat-casing CLI - inspect the storefront's snake_case/camelCase bridge
//!
//! Converts single names and whole JSON documents the same way the API does,
//! and checks override tables and model option files before they ship.

use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::process;

use ilytat_casing::name_mapper::{is_camel_case, is_snake_case};
use ilytat_casing::{
    camelize_outbound, enhance_model_options, object_camel_to_snake, Direction, FieldMappings,
    ModelOptions, NameMapper,
};

#[derive(Parser)]
#[command(name = "ilytat-casing")]
#[command(version, about = "snake_case/camelCase bridge for the ILYTAT storefront", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one field name, applying the override table
    Convert {
        /// Field name to convert
        name: String,

        /// Conversion direction (to-camel, to-snake)
        #[arg(short, long, default_value = "to-camel")]
        direction: Direction,

        /// YAML override table (default: built-in storefront table)
        #[arg(short, long)]
        mappings: Option<PathBuf>,

        /// Ignore the override table and use the plain algorithm
        #[arg(long)]
        no_overrides: bool,
    },

    /// Rewrite the keys of a JSON document
    Transform {
        /// JSON file to read (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Conversion direction (to-camel, to-snake)
        #[arg(short, long, default_value = "to-camel")]
        direction: Direction,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Validate an override table and report lossy entries
    CheckMappings {
        /// YAML override table (default: built-in storefront table)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print the standardized persistence options for a model options file
    ModelOptions {
        /// YAML model options file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert { name, direction, mappings, no_overrides } => {
            convert_name(name, direction, mappings, no_overrides)
        }
        Commands::Transform { input, direction, pretty } => {
            transform_document(input, direction, pretty)
        }
        Commands::CheckMappings { file } => check_mappings(file),
        Commands::ModelOptions { file } => print_model_options(file),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn load_mappings(path: Option<PathBuf>) -> Result<FieldMappings, String> {
    match path {
        Some(path) => FieldMappings::load_from_file(&path)
            .map_err(|e| format!("Failed to load {}: {}", path.display(), e)),
        None => Ok(FieldMappings::storefront()),
    }
}

fn convert_name(
    name: String,
    direction: Direction,
    mappings: Option<PathBuf>,
    no_overrides: bool,
) -> Result<(), String> {
    let mapper = if no_overrides {
        NameMapper::algorithmic()
    } else {
        NameMapper::new(load_mappings(mappings)?)
    };

    println!("{}", mapper.convert(&name, direction));
    Ok(())
}

fn transform_document(input: Option<PathBuf>, direction: Direction, pretty: bool) -> Result<(), String> {
    let contents = match input {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            buf
        }
    };

    let value: serde_json::Value = serde_json::from_str(&contents)
        .map_err(|e| format!("Invalid JSON: {}", e))?;

    // Same shaping as the response/request paths: a top-level array is
    // mapped element-wise on the way out only.
    let converted = match direction {
        Direction::ToCamel => camelize_outbound(&value),
        Direction::ToSnake => object_camel_to_snake(&value),
    };

    let output = if pretty {
        serde_json::to_string_pretty(&converted)
    } else {
        serde_json::to_string(&converted)
    }
    .map_err(|e| format!("Failed to serialize output: {}", e))?;

    println!("{}", output);
    Ok(())
}

fn check_mappings(file: Option<PathBuf>) -> Result<(), String> {
    let source = file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in storefront table".to_string());
    let mappings = load_mappings(file)?;

    println!("🔍 Checking {} ({} entries)...", source, mappings.len());

    let mut problems = 0;
    for (snake, camel) in mappings.iter() {
        if !is_snake_case(snake) {
            println!("  ✗ '{}' is not a snake_case column name", snake);
            problems += 1;
        }
        if !camel.chars().all(|c| c.is_ascii_alphanumeric()) {
            println!("  ✗ '{}' contains characters outside [A-Za-z0-9]", camel);
            problems += 1;
        } else if !is_camel_case(camel) {
            println!("  ℹ '{}' is not strictly camelCase", camel);
        }
    }

    let mapper = NameMapper::new(mappings);
    let lossy = mapper.lossy_round_trips();
    if lossy.is_empty() {
        println!("  ✓ Every override also round-trips algorithmically");
    } else {
        println!("  ℹ {} override(s) only hold through the table, not deep object conversion:", lossy.len());
        for (snake, camel, algorithmic) in &lossy {
            println!("      {} <-> {} (algorithm gives {})", snake, camel, algorithmic);
        }
    }

    if problems > 0 {
        return Err(format!("{} problem(s) found", problems));
    }

    println!("✓ Override table is valid");
    Ok(())
}

fn print_model_options(file: PathBuf) -> Result<(), String> {
    let options = ModelOptions::load_from_file(&file).map_err(|e| e.to_string())?;
    let enhanced = enhance_model_options(options);

    let yaml = serde_yaml::to_string(&enhanced)
        .map_err(|e| format!("Failed to serialize options: {}", e))?;
    print!("{}", yaml);
    Ok(())
}

//! Mining Equipment Selector
//!
//! Recommends mining equipment for an operation and analyzes dragline
//! productivity data.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;
use tracing::info;

use mining_selector::requirement::ProductionTarget;
use mining_selector::{
    RequirementInput, ScoringConfig, db, import, logging, productivity, recommend, sample, scoring,
};

#[derive(Parser)]
#[command(name = "mining-selector")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Mining equipment selection and dragline productivity calculator")]
struct Cli {
    /// Path to the SQLite equipment database
    #[arg(short, long, default_value = "equipment_data.db", env = "MES_DATABASE")]
    database: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScoringArgs {
    /// Drop equipment scoring below this
    #[arg(long, default_value_t = 1, env = "MES_MIN_SCORE")]
    min_score: u8,

    /// Fraction outside the production range that still earns partial credit
    #[arg(long, default_value_t = 0.2, env = "MES_PRODUCTION_TOLERANCE")]
    tolerance: f64,

    /// Points awarded for a production target inside the tolerance band
    #[arg(long, default_value_t = 10, env = "MES_PARTIAL_CREDIT")]
    partial_credit: u8,
}

impl ScoringArgs {
    fn to_config(&self) -> Result<ScoringConfig> {
        Ok(ScoringConfig::new(
            self.min_score,
            self.tolerance,
            self.partial_credit,
        )?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize empty database with schema
    Init,

    /// Load the sample equipment catalog
    LoadSample {
        /// Replace an existing catalog
        #[arg(long)]
        force: bool,
    },

    /// Import equipment definitions from a directory of JSON files
    Import {
        /// Directory to scan for *.json definitions
        source_dir: PathBuf,

        /// Clear existing catalog before import
        #[arg(long)]
        clear: bool,
    },

    /// List all equipment in the catalog
    ListEquipment {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show details for a specific piece of equipment
    Equipment {
        /// Equipment ID
        id: i64,
    },

    /// Recommend equipment for an operation
    Select {
        /// JSON request body file ("-" for stdin)
        #[arg(short, long, conflicts_with_all = ["operation_type", "material_type", "production_target", "working_conditions"])]
        request: Option<PathBuf>,

        /// Type of mining operation (e.g., "Surface Mining")
        #[arg(long)]
        operation_type: Option<String>,

        /// Material being mined (e.g., "Coal", "Iron Ore")
        #[arg(long)]
        material_type: Option<String>,

        /// Target production in tons/day
        #[arg(long)]
        production_target: Option<String>,

        /// Working environment (e.g., "Standard", "Heavy Duty")
        #[arg(long)]
        working_conditions: Option<String>,

        #[command(flatten)]
        scoring: ScoringArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze dragline productivity from a CSV file
    Analyze {
        /// CSV file with dragline operating records
        data: PathBuf,

        /// CSV file with truck-and-shovel records to compare against
        #[arg(long)]
        compare: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    db::init_schema(&conn)?;
    Ok(conn)
}

fn read_request(path: &Path) -> Result<RequirementInput> {
    let body = if path == Path::new("-") {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        body
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    RequirementInput::from_json(&body).context("Invalid request body")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Init => {
            open_database(&cli.database)?;
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::LoadSample { force } => {
            let conn = open_database(&cli.database)?;
            let loaded = sample::load_sample_data(&conn, force)?;
            if loaded == 0 {
                println!("Catalog already has equipment. Use --force to replace it.");
            } else {
                println!("Loaded {} sample machines", loaded);
            }
        }

        Commands::Import { source_dir, clear } => {
            let conn = open_database(&cli.database)?;
            if clear {
                info!("clearing existing catalog");
                db::clear_catalog(&conn)?;
            }

            let stats = import::import_directory(&conn, &source_dir)?;
            println!("{}", stats);
        }

        Commands::ListEquipment { json } => {
            let conn = open_database(&cli.database)?;
            let equipment = db::list_equipment(&conn)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&equipment)?);
            } else if equipment.is_empty() {
                println!("No equipment in database. Run 'import' or 'load-sample' first.");
            } else {
                println!("{:>4} {:<30} {:<12} {:>10}", "ID", "Name", "Type", "Capacity");
                println!("{}", "-".repeat(59));
                for e in equipment {
                    println!(
                        "{:>4} {:<30} {:<12} {:>10}",
                        e.id,
                        e.name,
                        e.equipment_type,
                        e.capacity.as_deref().unwrap_or("-")
                    );
                }
            }
        }

        Commands::Equipment { id } => {
            let conn = open_database(&cli.database)?;
            match db::get_equipment(&conn, id)? {
                Some(e) => {
                    println!("Equipment: {}", e.name);
                    println!("  ID: {}", e.id);
                    println!("  Type: {}", e.equipment_type);
                    if let Some(capacity) = &e.capacity {
                        println!("  Capacity: {}", capacity);
                    }
                    if let Some(specs) = &e.specifications {
                        println!("  Specifications: {}", specs);
                    }

                    let conditions = db::get_conditions(&conn, id)?;
                    if conditions.is_empty() {
                        println!("  No eligibility conditions (never recommended)");
                    } else {
                        println!("  Suited for:");
                        for c in conditions {
                            println!(
                                "    {} / {} / {}..{} tons/day / {}",
                                c.operation_type.as_deref().unwrap_or("any operation"),
                                c.material_type.as_deref().unwrap_or("any material"),
                                c.min_production.unwrap_or(0.0),
                                c.max_production
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| "∞".to_string()),
                                c.working_conditions.as_deref().unwrap_or("any conditions"),
                            );
                        }
                    }
                }
                None => println!("Equipment {} not found", id),
            }
        }

        Commands::Select {
            request,
            operation_type,
            material_type,
            production_target,
            working_conditions,
            scoring: scoring_args,
            json,
        } => {
            let config = scoring_args.to_config()?;
            let input = match request {
                Some(path) => read_request(&path)?,
                None => RequirementInput {
                    operation_type,
                    material_type,
                    production_target: production_target.map(ProductionTarget::Text),
                    working_conditions,
                },
            };
            let requirement = input.validate()?;

            let conn = open_database(&cli.database)?;
            let recommendations = recommend(&conn, &requirement, &config)?;
            info!(
                operation = %requirement.operation_type,
                material = %requirement.material_type,
                target = requirement.production_target,
                recommended = recommendations.len(),
                "selection served"
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&recommendations)?);
            } else if recommendations.is_empty() {
                println!("No compatible equipment found.");
            } else {
                print!("{}", scoring::format_recommendations(&recommendations));
            }
        }

        Commands::Analyze {
            data,
            compare,
            json,
        } => {
            let records = productivity::read_records(&data)?;
            let truck_shovel = compare
                .map(|path| productivity::read_records(&path))
                .transpose()?;

            let report = productivity::analyze(records, truck_shovel);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
        }
    }

    Ok(())
}

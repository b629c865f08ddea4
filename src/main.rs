//! slcheck - Security List Checker
//!
//! Command-line front end over an inventory snapshot (a JSON export of VCNs,
//! subnets, security lists and route tables).
//!
//! # Usage
//!
//! ```bash
//! slcheck check --inventory inventory.json            # Report redundant rules
//! slcheck check --inventory inventory.json --json out.json
//! slcheck lists --inventory inventory.json --port 22  # Lists with rules for port 22
//! slcheck lists --inventory inventory.json --ip 10.0.0.5
//! slcheck lists --inventory inventory.json --attr description=bastion
//! slcheck routes --inventory inventory.json --ip 192.168.1.1
//! slcheck cidr 10.0.0.0/22 10.0.3.7                   # Range and membership
//! ```
//!
//! Logs go to stderr; `-v`/`-vv` raise the level, `RUST_LOG` overrides it.

use clap::{ArgAction, Args, Parser, Subcommand};
use slcheck::config::{self, AppConfig};
use slcheck::core::address::{MembershipPolicy, cidr_bounds, ip_in_cidr};
use slcheck::core::inventory::{Inventory, dedupe_inventory};
use slcheck::filters::{Query, select_route_rules, select_security_rules};
use slcheck::format::{route_rule_line, security_rule_line, subnet_report};
use slcheck::output::{self, ROUTE_TABLES_SUBDIR, SECURITY_LISTS_SUBDIR};
use slcheck::utils::resolve_snapshot;
use slcheck::validators::{build_query, check_reserved_ip, validate_cidr, validate_ip};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

shadow_rs::shadow!(build);

const NOTHING_FOUND: &str = "Nothing found. Perhaps the parameter is in another case.";

#[derive(Parser)]
#[command(name = "slcheck", version = build::PKG_VERSION)]
#[command(about = "Security List Checker - finds redundant network security rules", long_about = None)]
struct Cli {
    /// Config file (default: config.json in the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InventoryArgs {
    /// Inventory snapshot (JSON)
    #[arg(short, long, value_name = "FILE")]
    inventory: PathBuf,
    /// Directory for written lists (overrides the config file)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,
    /// Let 0.0.0.0/0 match IP searches
    #[arg(long)]
    include_full_range: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report rules that other rules of the same subnet already cover
    Check {
        /// Inventory snapshot (JSON)
        #[arg(short, long, value_name = "FILE")]
        inventory: PathBuf,
        /// Also write the full result as JSON
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
        /// Skip rules that cannot be parsed instead of aborting
        #[arg(long)]
        skip_invalid: bool,
    },
    /// Search security lists and write the matching ones to <output>/sls
    Lists {
        #[command(flatten)]
        source: InventoryArgs,
        /// Rules whose TCP/UDP port range includes this port
        #[arg(long, conflicts_with_all = ["ip", "attr"])]
        port: Option<u16>,
        /// Rules whose source or destination contains this address
        #[arg(long, conflicts_with = "attr")]
        ip: Option<String>,
        /// Lists or rules whose attribute contains a text (case-insensitive)
        #[arg(long, value_name = "NAME=VALUE")]
        attr: Option<String>,
    },
    /// Search route tables and write the matching ones to <output>/routing
    Routes {
        #[command(flatten)]
        source: InventoryArgs,
        /// Routes whose destination contains this address
        #[arg(long, conflicts_with = "attr")]
        ip: Option<String>,
        /// Tables or routes whose attribute contains a text (case-insensitive)
        #[arg(long, value_name = "NAME=VALUE")]
        attr: Option<String>,
    },
    /// Show the address range of a CIDR block, optionally testing an address
    Cidr {
        /// Block in a.b.c.d/len form
        cidr: String,
        /// Address to test for membership
        ip: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!(
        "slcheck {} (commit {}, built {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BUILD_TIME
    );

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to create Tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(handle_cli(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn handle_cli(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Check {
            inventory,
            json,
            skip_invalid,
        } => {
            let config = AppConfig {
                skip_invalid: config.skip_invalid || skip_invalid,
                ..config
            };
            run_check(&inventory, json.as_deref(), &config).await?;
        }
        Commands::Lists {
            source,
            port,
            ip,
            attr,
        } => {
            let query = build_query(port, ip.as_deref(), attr.as_deref())?;
            run_lists(&source, query.as_ref(), &config).await?;
        }
        Commands::Routes { source, ip, attr } => {
            let query = build_query(None, ip.as_deref(), attr.as_deref())?;
            run_routes(&source, query.as_ref(), &config).await?;
        }
        Commands::Cidr { cidr, ip } => run_cidr(&cidr, ip.as_deref())?,
    }
    Ok(())
}

async fn run_check(
    inventory: &Path,
    json: Option<&Path>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let inventory = Arc::new(Inventory::load(&resolve_snapshot(inventory)).await?);
    let reports = dedupe_inventory(inventory, config.invalid_rule_policy()).await?;

    for report in &reports {
        println!("\n{}", subnet_report(report).trim_end());
    }

    if let Some(path) = json {
        let info = output::BuildInfo {
            version: build::PKG_VERSION,
            commit: build::SHORT_COMMIT,
            build_time: build::BUILD_TIME,
        };
        output::write_report(path, info, &reports).await?;
    }
    Ok(())
}

fn membership_policy(source: &InventoryArgs, config: &AppConfig) -> MembershipPolicy {
    if source.include_full_range {
        MembershipPolicy::including_full_range()
    } else {
        config.membership_policy()
    }
}

fn output_dir(source: &InventoryArgs, config: &AppConfig) -> PathBuf {
    source
        .output
        .clone()
        .unwrap_or_else(|| config.output_dir.clone())
}

async fn run_lists(
    source: &InventoryArgs,
    query: Option<&Query>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let policy = membership_policy(source, config);
    let out_dir = output_dir(source, config);
    let width = config.column_width();

    output::clear_directory(&out_dir.join(SECURITY_LISTS_SUBDIR)).await?;
    let inventory = Inventory::load(&resolve_snapshot(&source.inventory)).await?;

    let mut written = 0;
    for list in &inventory.security_lists {
        let selection = select_security_rules(list, query, policy);
        if query.is_some() && !selection.is_hit() {
            continue;
        }

        let vcn = inventory.vcn_name(&list.vcn_id);
        println!("\n{vcn} Security List Name: {}", list.display_name);
        for (direction, rule) in &selection.rules {
            println!("{}", security_rule_line(*direction, rule, width));
        }

        output::write_collection(&out_dir, SECURITY_LISTS_SUBDIR, vcn, list).await?;
        written += 1;
    }

    if written == 0 {
        println!("{NOTHING_FOUND}");
    } else {
        info!(
            "Wrote {written} security list(s) to {}",
            out_dir.join(SECURITY_LISTS_SUBDIR).display()
        );
    }
    Ok(())
}

async fn run_routes(
    source: &InventoryArgs,
    query: Option<&Query>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let policy = membership_policy(source, config);
    let out_dir = output_dir(source, config);
    let width = config.column_width();

    output::clear_directory(&out_dir.join(ROUTE_TABLES_SUBDIR)).await?;
    let inventory = Inventory::load(&resolve_snapshot(&source.inventory)).await?;

    let mut written = 0;
    for table in &inventory.route_tables {
        let selection = select_route_rules(table, query, policy);
        if query.is_some() && !selection.is_hit() {
            continue;
        }

        let vcn = inventory.vcn_name(&table.vcn_id);
        println!("\n{vcn} Route Table Name: {}", table.display_name);
        for rule in &selection.rules {
            println!("{}", route_rule_line("route", rule, width));
        }

        output::write_collection(&out_dir, ROUTE_TABLES_SUBDIR, vcn, table).await?;
        written += 1;
    }

    if written == 0 {
        println!("{NOTHING_FOUND}");
    } else {
        info!(
            "Wrote {written} route table(s) to {}",
            out_dir.join(ROUTE_TABLES_SUBDIR).display()
        );
    }
    Ok(())
}

fn run_cidr(cidr: &str, ip: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let cidr = validate_cidr(cidr)?;
    let bounds = cidr_bounds(&cidr).ok_or_else(|| format!("Invalid CIDR '{cidr}'"))?;

    println!("IP range for CIDR {cidr}:");
    println!("From    : {}", bounds.first_host);
    println!("To      : {}", bounds.last_host);
    println!("Size    : {}", bounds.size);
    if let Some(note) = check_reserved_ip(bounds.network) {
        println!("Note    : {note}");
    }

    if let Some(ip) = ip {
        let ip = validate_ip(ip)?;
        let inside = ip_in_cidr(ip, &cidr, MembershipPolicy::including_full_range());
        println!("\n{ip} is {}in range\n", if inside { "" } else { "not " });
    }
    Ok(())
}

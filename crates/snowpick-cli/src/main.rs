use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use snowpick_core::{AccountObjectType, SchemaObjectType, SessionConfig, Table};
use snowpick_objects::{SchemaObject, SessionExt};
use snowpick_session::{SessionRef, SnowflakeSession};

/// snowpick - explore and administer Snowflake objects
#[derive(Parser)]
#[command(name = "snowpick")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a connection profile (default: snowpick.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List schema-level objects matching regex filters
    Objects {
        /// Database name patterns
        #[arg(short, long, default_value = ".*")]
        databases: Vec<String>,

        /// Schema name patterns
        #[arg(short, long, default_value = ".*")]
        schemas: Vec<String>,

        /// Object name patterns
        #[arg(short, long, default_value = ".*")]
        names: Vec<String>,

        /// Object type patterns (table, view, procedure, ...)
        #[arg(short = 't', long, default_value = ".*")]
        types: Vec<String>,

        /// Database patterns to exclude instead of the defaults
        #[arg(long)]
        ignore_databases: Vec<String>,

        /// Schema patterns to exclude instead of the defaults
        #[arg(long)]
        ignore_schemas: Vec<String>,
    },

    /// List account-level objects matching regex filters
    AccountObjects {
        /// Object name patterns
        #[arg(short, long, default_value = ".*")]
        names: Vec<String>,

        /// Object type patterns (warehouse, role, user, ...)
        #[arg(short = 't', long, default_value = ".*")]
        types: Vec<String>,

        /// Name patterns to exclude
        #[arg(long)]
        ignore_names: Vec<String>,
    },

    /// DESCRIBE one object
    Describe {
        /// Object type (table, warehouse, ...)
        object_type: String,

        /// Qualified name: DB.SCHEMA.NAME for schema objects, NAME for
        /// account objects
        name: String,
    },

    /// Fetch an object's DDL via GET_DDL
    Ddl {
        /// Object type (table, view, warehouse, ...)
        object_type: String,

        /// Qualified name: DB.SCHEMA.NAME for schema objects, NAME for
        /// account objects
        name: String,

        /// Write the DDL under this directory instead of printing it
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// SHOW GRANTS ON one object
    Grants {
        /// Object type (table, warehouse, role, ...)
        object_type: String,

        /// Qualified name: DB.SCHEMA.NAME for schema objects, NAME for
        /// account objects
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; profiles can come from a file instead.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.verbose)?;
    let session = connect(&config)?;

    match cli.command {
        Commands::Objects {
            databases,
            schemas,
            names,
            types,
            ignore_databases,
            ignore_schemas,
        } => {
            objects_command(
                session,
                &databases,
                &schemas,
                &names,
                &types,
                &ignore_databases,
                &ignore_schemas,
            )
            .await
        }
        Commands::AccountObjects {
            names,
            types,
            ignore_names,
        } => account_objects_command(session, &names, &types, &ignore_names).await,
        Commands::Describe { object_type, name } => {
            describe_command(session, &object_type, &name).await
        }
        Commands::Ddl {
            object_type,
            name,
            save,
        } => ddl_command(session, &object_type, &name, save.as_deref()).await,
        Commands::Grants { object_type, name } => {
            grants_command(session, &object_type, &name).await
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "snowpick=debug" } else { "snowpick=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve the connection profile: --config, then ./snowpick.toml, then
/// environment variables alone. Environment variables override file values.
fn load_config(config_path: Option<&Path>, verbose: bool) -> Result<SessionConfig> {
    let mut config = if let Some(path) = config_path {
        SessionConfig::from_file(path)
            .with_context(|| format!("failed to load profile from {}", path.display()))?
    } else if Path::new("snowpick.toml").exists() {
        SessionConfig::from_file(Path::new("snowpick.toml"))
            .context("failed to load profile from snowpick.toml")?
    } else {
        if verbose {
            eprintln!("{}", "No profile file found, using environment only".yellow());
        }
        return SessionConfig::from_env().map_err(|e| {
            anyhow!(
                "incomplete connection profile: {e}. Provide snowpick.toml or SNOWFLAKE_* environment variables."
            )
        });
    };

    config.apply_env();
    config.validate().map_err(|e| {
        anyhow!(
            "incomplete connection profile: {e}. Provide snowpick.toml or SNOWFLAKE_* environment variables."
        )
    })?;
    Ok(config)
}

fn connect(config: &SessionConfig) -> Result<SessionRef> {
    let session = SnowflakeSession::from_config(config)?.build()?;
    Ok(Arc::new(session))
}

/// True when the name looks like DB.SCHEMA.NAME rather than an account
/// object name. Callable signatures carry dots inside parentheses, so only
/// the part before "(" counts.
fn parse_qualified(name: &str) -> Option<(String, String, String)> {
    let head = name.split('(').next().unwrap_or(name);
    let mut parts = head.splitn(3, '.');
    let database = parts.next()?;
    let schema = parts.next()?;
    let rest = parts.next()?;
    let object = match name.split_once('(') {
        Some((_, tail)) => format!("{rest}({tail}"),
        None => rest.to_string(),
    };
    Some((database.to_string(), schema.to_string(), object))
}

/// Resolve an object_type/name pair to either kind of handle
enum Target {
    Schema(SchemaObject),
    Account(snowpick_objects::AccountObject),
}

fn resolve_target(session: &SessionRef, object_type: &str, name: &str) -> Result<Target> {
    if let Ok(ty) = SchemaObjectType::from_str(object_type) {
        let (database, schema, object) = parse_qualified(name).ok_or_else(|| {
            anyhow!("schema objects need a qualified name: DB.SCHEMA.NAME, got '{name}'")
        })?;
        return Ok(Target::Schema(
            session.schema_object(database, schema, object, ty),
        ));
    }
    if let Ok(ty) = AccountObjectType::from_str(object_type) {
        return Ok(Target::Account(session.account_object(name, ty)));
    }
    Err(anyhow!("unknown object type '{object_type}'"))
}

async fn objects_command(
    session: SessionRef,
    databases: &[String],
    schemas: &[String],
    names: &[String],
    types: &[String],
    ignore_databases: &[String],
    ignore_schemas: &[String],
) -> Result<()> {
    let mut filter = session.schema_object_filter(
        &as_strs(databases),
        &as_strs(schemas),
        &as_strs(names),
        &as_strs(types),
    );
    if !ignore_databases.is_empty() {
        filter = filter.with_ignore_dbs(&as_strs(ignore_databases));
    }
    if !ignore_schemas.is_empty() {
        filter = filter.with_ignore_schemas(&as_strs(ignore_schemas));
    }

    let objects = filter.find().await?;
    if objects.is_empty() {
        println!("{}", "No objects matched the filters".yellow());
        return Ok(());
    }

    for object in &objects {
        println!(
            "{:<20} {}.{}.{}",
            object.object_type.to_string().cyan(),
            object.database,
            object.schema,
            object.name.bold()
        );
    }
    println!();
    println!("{} objects", objects.len().to_string().green());
    Ok(())
}

async fn account_objects_command(
    session: SessionRef,
    names: &[String],
    types: &[String],
    ignore_names: &[String],
) -> Result<()> {
    let mut filter = session.account_object_filter(&as_strs(names), &as_strs(types));
    if !ignore_names.is_empty() {
        filter = filter.with_ignore_names(&as_strs(ignore_names));
    }

    let objects = filter.find().await?;
    if objects.is_empty() {
        println!("{}", "No objects matched the filters".yellow());
        return Ok(());
    }

    for object in &objects {
        println!(
            "{:<20} {}",
            object.object_type.to_string().cyan(),
            object.name.bold()
        );
    }
    println!();
    println!("{} objects", objects.len().to_string().green());
    Ok(())
}

async fn describe_command(session: SessionRef, object_type: &str, name: &str) -> Result<()> {
    let described = match resolve_target(&session, object_type, name)? {
        Target::Schema(object) => object.describe().await?,
        Target::Account(object) => object.describe().await?,
    };
    print_table(&described);
    Ok(())
}

async fn ddl_command(
    session: SessionRef,
    object_type: &str,
    name: &str,
    save: Option<&Path>,
) -> Result<()> {
    match resolve_target(&session, object_type, name)? {
        Target::Schema(object) => {
            if let Some(root) = save {
                let path = object.save_ddl(root).await?;
                println!("{} {}", "DDL saved to".green(), path.display());
            } else {
                println!("{}", object.ddl().await?);
            }
        }
        Target::Account(object) => {
            let ddl = object.ddl().await?;
            if let Some(root) = save {
                std::fs::create_dir_all(root)?;
                let path = root.join(format!("{}.sql", object.name));
                std::fs::write(&path, ddl)?;
                println!("{} {}", "DDL saved to".green(), path.display());
            } else {
                println!("{ddl}");
            }
        }
    }
    Ok(())
}

async fn grants_command(session: SessionRef, object_type: &str, name: &str) -> Result<()> {
    let grants = match resolve_target(&session, object_type, name)? {
        Target::Schema(object) => object.grants_on().await?,
        Target::Account(object) => object.grants_on().await?,
    };
    if grants.is_empty() {
        println!("{}", "No grants".yellow());
        return Ok(());
    }
    print_table(&grants);
    Ok(())
}

fn as_strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

/// Render a result table with padded columns
fn print_table(table: &Table) {
    let mut widths: Vec<usize> = table.columns().iter().map(|c| c.len()).collect();
    for row in table.rows() {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.as_deref().unwrap_or("").len();
            if len > widths[i] {
                widths[i] = len;
            }
        }
    }

    let header: Vec<String> = table
        .columns()
        .iter()
        .zip(&widths)
        .map(|(c, &w)| format!("{c:<w$}"))
        .collect();
    println!("{}", header.join("  ").bold());

    for row in table.rows() {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<w$}", cell.as_deref().unwrap_or("")))
            .collect();
        println!("{}", line.join("  "));
    }

    println!();
    println!("{} rows", table.num_rows().to_string().green());
}

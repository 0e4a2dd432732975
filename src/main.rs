// ABOUTME: CLI entry point for pg-dburi
// ABOUTME: Parses connection flags and commands and routes them to the library

use clap::{Args, Parser, Subcommand, ValueEnum};
use pg_dburi::postgres::DbUri;
use pg_dburi::query;
use std::fmt::Display;

#[derive(Parser)]
#[command(name = "pg-dburi")]
#[command(about = "PostgreSQL connection descriptor and query helper", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConnectionArgs {
    /// Database server host
    #[arg(
        long,
        global = true,
        default_value_t = std::env::var("PGHOST").unwrap_or_else(|_| "localhost".to_string())
    )]
    host: String,
    /// Database server port
    #[arg(
        long,
        global = true,
        default_value_t = std::env::var("PGPORT").unwrap_or_else(|_| "5432".to_string())
    )]
    port: String,
    /// Database user
    #[arg(
        long,
        global = true,
        default_value_t = std::env::var("PGUSER").unwrap_or_else(|_| "postgres".to_string())
    )]
    user: String,
    /// Database name
    #[arg(
        long,
        global = true,
        default_value_t = std::env::var("PGDATABASE").unwrap_or_else(|_| "postgres".to_string())
    )]
    dbname: String,
    /// Password (falls back to PGPASSWORD when omitted)
    #[arg(long, global = true, default_value = "", hide_default_value = true)]
    password: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the connection URI
    Uri,
    /// Print the keyword/value connection string
    Dsn,
    /// Open a connection and check that the server answers
    Ping,
    /// Create a database on the server
    CreateDb { name: String },
    /// Drop a database on the server if it exists
    DropDb { name: String },
    /// Terminate all pglogical backends on the server
    KillPglogical,
    /// Dump the DDL of the public schema
    DumpSchema {
        /// pg_dump executable to run
        #[arg(long, default_value = pg_dburi::migration::PG_DUMP)]
        pg_dump: String,
    },
    /// Run a query and print its reduced result
    Query {
        sql: String,
        /// Expected result shape
        #[arg(long, value_enum, default_value_t = Shape::Matrix)]
        shape: Shape,
        /// Decode values as integers instead of text
        #[arg(long)]
        int: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Shape {
    Matrix,
    Row,
    Column,
    Scalar,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let args = cli.connection;
    let uri = DbUri::new(args.host, args.port, args.dbname, args.user, args.password)?;

    match cli.command {
        Commands::Uri => println!("{}", uri.to_uri()),
        Commands::Dsn => println!("{}", uri.to_dsn()?),
        Commands::Ping => {
            uri.open().await?;
            println!("✓ Connected to {}:{}/{}", uri.host(), uri.port(), uri.name());
        }
        Commands::CreateDb { name } => uri.create_database(&name).await?,
        Commands::DropDb { name } => uri.drop_database(&name).await?,
        Commands::KillPglogical => {
            let terminated = uri.terminate_replication_backends().await?;
            println!("{}", terminated);
        }
        Commands::DumpSchema { pg_dump } => {
            if pg_dump == pg_dburi::migration::PG_DUMP {
                pg_dburi::utils::check_required_tools()?;
            }
            print!("{}", uri.dump_schema_with(&pg_dump).await?);
        }
        Commands::Query { sql, shape, int } => {
            if int {
                run_query::<i64>(&uri, &sql, shape).await?;
            } else {
                run_query::<String>(&uri, &sql, shape).await?;
            }
        }
    }

    Ok(())
}

async fn run_query<T>(uri: &DbUri, sql: &str, shape: Shape) -> anyhow::Result<()>
where
    T: query::Scalar + Display,
{
    let client = uri.open().await?;
    match shape {
        Shape::Matrix => {
            for row in query::query_matrix::<T>(&client, sql, &[]).await? {
                println!("{}", join(&row));
            }
        }
        Shape::Row => println!("{}", join(&query::query_row::<T>(&client, sql, &[]).await?)),
        Shape::Column => {
            for value in query::query_column::<T>(&client, sql, &[]).await? {
                println!("{}", value);
            }
        }
        Shape::Scalar => println!("{}", query::query_scalar::<T>(&client, sql, &[]).await?),
    }
    Ok(())
}

fn join<T: Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("\t")
}

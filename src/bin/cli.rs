//! tdwire CLI Client
//!
//! Logs on, runs each statement given on the command line, and logs off.

use clap::Parser;
use tdwire::{Config, Connection, StatementResult};
use tracing_subscriber::{fmt, EnvFilter};

/// tdwire CLI
#[derive(Parser, Debug)]
#[command(name = "tdwire-cli")]
#[command(about = "Run SQL against a server speaking the parcel protocol")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(short = 'H', long, default_value = "localhost")]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = tdwire::config::DEFAULT_PORT)]
    port: u16,

    /// Logon username
    #[arg(short, long)]
    user: String,

    /// Logon password
    #[arg(short = 'P', long, default_value = "")]
    password: String,

    /// Target database
    #[arg(short, long, default_value = "test")]
    database: String,

    /// Declared session character set
    #[arg(long, default_value = "UTF8")]
    charset: String,

    /// Read/write/connect timeout in milliseconds (0 disables)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    /// Print raw response bytes instead of decoded rows
    #[arg(long)]
    raw: bool,

    /// Statements to run, in order
    #[arg(required = true)]
    sql: Vec<String>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tdwire=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("tdwire CLI v{}", tdwire::VERSION);

    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .username(&args.user)
        .password(&args.password)
        .database(&args.database)
        .charset(&args.charset)
        .connect_timeout_ms(args.timeout_ms)
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms)
        .build();

    let mut conn = match Connection::open(config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Logon failed: {}", e);
            std::process::exit(1);
        }
    };

    let mut failed = false;
    for sql in &args.sql {
        let outcome = if args.raw {
            conn.execute(sql).map(|bytes| print_raw(&bytes))
        } else {
            conn.query(sql).map(|result| print_result(&result))
        };
        if let Err(e) = outcome {
            tracing::error!("Statement failed: {}", e);
            failed = true;
            if !conn.is_authenticated() {
                break;
            }
        }
    }

    conn.close();
    if failed {
        std::process::exit(2);
    }
}

fn print_result(result: &StatementResult) {
    if !result.columns.is_empty() {
        println!("{}", result.column_names().join("\t"));
    }
    for row in &result.rows {
        let cells: Vec<&str> = row
            .iter()
            .map(|v| v.as_deref().unwrap_or("NULL"))
            .collect();
        println!("{}", cells.join("\t"));
    }
    println!("({} rows affected)", result.activity_count);
}

fn print_raw(bytes: &[u8]) {
    for chunk in bytes.chunks(16) {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
        println!("{}", hex.join(" "));
    }
}

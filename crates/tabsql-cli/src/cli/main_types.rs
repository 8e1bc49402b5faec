use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tabsql_core::core::pagination::PageSize;

#[derive(Parser)]
#[command(name = "tabsql")]
#[command(about = "Load CSV, JSON and Parquet files into an embedded SQL engine, query them and page through the results")]
#[command(version)]
#[command(after_help = "Examples:
  tabsql --load sales.csv tables               # Load a file and list tables
  tabsql --load sales.csv browse sales         # Page through a table
  tabsql --load sales.csv query 'SELECT region, SUM(amount) FROM sales GROUP BY 1'
  tabsql --database shop.duckdb shell          # Interactive SQL shell
  tabsql config set --page-size 50             # Change the default page size

Environment Variables:
  TABSQL_PAGE_SIZE   Rows per page (10, 25, 50 or 100)
  TABSQL_DATABASE    DuckDB database file (in-memory when unset)
  RUST_LOG           Log filter, e.g. tabsql_core=debug")]
pub struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Custom configuration directory path
    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    /// DuckDB database file (in-memory when omitted)
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// File to load before running the command (can be repeated)
    #[arg(long, global = true, value_name = "FILE", action = clap::ArgAction::Append)]
    pub load: Vec<PathBuf>,

    /// Rows per page: 10, 25, 50 or 100
    #[arg(long, global = true, value_parser = parse_page_size)]
    pub page_size: Option<PageSize>,

    #[command(subcommand)]
    pub command: Commands,
}

pub fn parse_page_size(value: &str) -> Result<PageSize, String> {
    value.parse::<PageSize>().map_err(|e| e.to_string())
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a SQL statement and print its result
    Query(QueryArgs),
    /// Load CSV, JSON or Parquet files as tables
    #[command(after_help = "Examples:
  tabsql load sales.csv events.json       # Creates tables 'sales' and 'events'
  tabsql --database shop.duckdb load orders.parquet")]
    Load {
        /// Files to load; each becomes a table named after the file
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List known tables
    Tables {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show the columns of a table
    Describe {
        /// Table name
        table: String,
    },
    /// Page through a table
    Browse(BrowseArgs),
    /// Build (and optionally run) a GROUP BY query
    Aggregate(AggregateArgs),
    /// Run a SQL statement and write the result as CSV
    #[command(after_help = "Examples:
  tabsql --load sales.csv export 'SELECT * FROM sales'            # ./tabsql_results_<time>.csv
  tabsql --load sales.csv export 'SELECT * FROM sales' -o out.csv")]
    Export {
        /// SQL statement to run
        sql: String,
        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Interactive SQL shell
    Shell,
    /// Configuration management (show, set)
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Set configuration values
    #[command(after_help = "Examples:
  tabsql config set --page-size 50
  tabsql config set --database ~/data/warehouse.duckdb")]
    Set {
        /// Default rows per page
        #[arg(long, value_parser = parse_page_size)]
        page_size: Option<PageSize>,
        /// Default DuckDB database file
        #[arg(long)]
        database: Option<PathBuf>,
        /// Default directory for exports
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Query arguments for executing a statement
#[derive(Args, Debug)]
#[command(after_help = "Examples:
  tabsql --load sales.csv query 'SELECT * FROM sales LIMIT 5'
  tabsql --load sales.csv query 'SELECT * FROM sales' --format json
  tabsql --load sales.csv query 'SELECT * FROM sales' --export out.csv")]
pub struct QueryArgs {
    /// SQL statement to run
    pub sql: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Also write the result as CSV to this path
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[command(after_help = "Keys (interactive mode):
  n / →      next page          p / ←      previous page
  Home / g   first page         End / G    last page
  + / -      change page size   r          reload
  q / Esc    quit")]
pub struct BrowseArgs {
    /// Table to browse
    pub table: String,

    /// Page to open
    #[arg(long, default_value_t = 1)]
    pub page: u64,

    /// Print the page and exit instead of opening the pager
    #[arg(long)]
    pub no_interactive: bool,
}

#[derive(Args, Debug)]
#[command(after_help = "Examples:
  tabsql --load sales.csv aggregate --table sales --group-by region
  tabsql --load sales.csv aggregate --table sales --group-by region --function SUM --value amount --order-by aggregated --desc --run")]
pub struct AggregateArgs {
    /// Table to aggregate
    #[arg(long)]
    pub table: Option<String>,

    /// Column to group by
    #[arg(long)]
    pub group_by: Option<String>,

    /// COUNT(*), COUNT, SUM, AVG, MIN or MAX
    #[arg(long, default_value = "COUNT(*)")]
    pub function: String,

    /// Column to aggregate (not needed for COUNT(*))
    #[arg(long)]
    pub value: Option<String>,

    /// Column to order by, or 'aggregated' for the aggregated value
    #[arg(long)]
    pub order_by: Option<String>,

    /// Order descending
    #[arg(long)]
    pub desc: bool,

    /// List the available ordering choices
    #[arg(long)]
    pub options: bool,

    /// Run the query instead of only printing it
    #[arg(long)]
    pub run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tabsql",
            "browse",
            "orders",
            "--page",
            "3",
            "--page-size",
            "50",
            "--load",
            "a.csv",
            "--load",
            "b.json",
        ])
        .expect("should parse");

        assert_eq!(cli.page_size.map(PageSize::get), Some(50));
        assert_eq!(cli.load.len(), 2);
        match cli.command {
            Commands::Browse(args) => {
                assert_eq!(args.table, "orders");
                assert_eq!(args.page, 3);
                assert!(!args.no_interactive);
            }
            _ => panic!("expected browse"),
        }
    }

    #[test]
    fn test_invalid_page_size_is_rejected() {
        assert!(Cli::try_parse_from(["tabsql", "--page-size", "7", "tables"]).is_err());
    }

    #[test]
    fn test_query_format() {
        let cli = Cli::try_parse_from(["tabsql", "query", "SELECT 1", "--format", "json"])
            .expect("should parse");
        match cli.command {
            Commands::Query(args) => {
                assert_eq!(args.sql, "SELECT 1");
                assert_eq!(args.format, OutputFormat::Json);
            }
            _ => panic!("expected query"),
        }
    }
}

//! Command line arguments and their translation into requests.

use std::path::{Path, PathBuf};

use clap::{ArgGroup, Args, Parser, Subcommand};

use dynaquery_core::condition::{AttributePath, Comparator, Condition};
use dynaquery_core::query::{GetItemRequest, QueryRequest, ScanRequest};
use dynaquery_core::storage::{QueryError, ReturnConsumedCapacity};
use dynaquery_core::value::Value;

/// dynaquery - Run key-condition queries, filtered scans and key lookups against DynamoDB
#[derive(Debug, Parser)]
#[command(name = "dynaquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: Global,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Args)]
pub struct Global {
    /// Silence everything but the items
    #[clap(long, global = true)]
    pub silent: bool,

    /// Enable verbose output
    #[clap(long, global = true)]
    pub verbose: bool,
}

impl Global {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_filter(&self) -> &'static str {
        if self.verbose {
            "dynaquery=debug,dynaquery_core=debug"
        } else if self.silent {
            "dynaquery=error"
        } else {
            "dynaquery=info"
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Read the items of one partition
    Query(QueryArgs),

    /// Read every item of a table or index
    Scan(ScanArgs),

    /// Read the one item with the given primary key
    Get(GetArgs),
}

impl Commands {
    /// The `--table` argument, if given.
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::Query(args) => args.target.table.as_deref(),
            Self::Scan(args) => args.target.table.as_deref(),
            Self::Get(args) => args.table.as_deref(),
        }
    }

    pub fn fixture(&self) -> Option<&Path> {
        match self {
            Self::Query(args) => args.target.fixture.as_deref(),
            Self::Scan(args) => args.target.fixture.as_deref(),
            Self::Get(args) => args.fixture.as_deref(),
        }
    }
}

/// Options shared by queries and scans.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Table to read (defaults to DYNAQUERY_TABLE)
    #[arg(long, short)]
    pub table: Option<String>,

    /// Secondary index to read instead of the base table
    #[arg(long)]
    pub index: Option<String>,

    /// Keep items whose attribute equals the value, as NAME=VALUE (repeatable)
    #[arg(long = "filter", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub filters: Vec<(String, Value)>,

    /// Attributes to return, comma separated
    #[arg(long, value_delimiter = ',')]
    pub projection: Vec<String>,

    /// Maximum number of items to read
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,

    /// Use strongly consistent reads
    #[arg(long)]
    pub consistent_read: bool,

    /// Report consumed capacity (INDEXES, TOTAL or NONE)
    #[arg(long)]
    pub return_consumed_capacity: Option<ReturnConsumedCapacity>,

    /// Read from a JSON fixture instead of DynamoDB
    #[arg(long, value_name = "PATH")]
    pub fixture: Option<PathBuf>,
}

impl TargetArgs {
    /// The filter made of every `--filter`, joined with AND.
    pub fn filter(&self) -> Option<Condition> {
        let mut conditions = self
            .filters
            .iter()
            .map(|(name, value)| Condition::eq(name.as_str(), value.clone()));
        let first = conditions.next()?;
        Some(conditions.fold(first, Condition::and))
    }
}

#[derive(Debug, Clone, Args)]
#[command(group(
    ArgGroup::new("sort_operator")
        .args(["begins_with", "equals", "lt", "le", "gt", "ge", "between"])
        .requires("sort_key")
))]
pub struct QueryArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Partition key equality, as NAME=VALUE
    #[arg(long, value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub partition_key: (String, Value),

    /// Sort key attribute the sort operator applies to
    #[arg(long, value_name = "NAME", requires = "sort_operator")]
    pub sort_key: Option<String>,

    /// Sort key starts with the prefix
    #[arg(long, value_name = "PREFIX", value_parser = parse_value)]
    pub begins_with: Option<Value>,

    /// Sort key equals the value
    #[arg(long, value_parser = parse_value)]
    pub equals: Option<Value>,

    /// Sort key is less than the value
    #[arg(long, value_parser = parse_value)]
    pub lt: Option<Value>,

    /// Sort key is less than or equal to the value
    #[arg(long, value_parser = parse_value)]
    pub le: Option<Value>,

    /// Sort key is greater than the value
    #[arg(long, value_parser = parse_value)]
    pub gt: Option<Value>,

    /// Sort key is greater than or equal to the value
    #[arg(long, value_parser = parse_value)]
    pub ge: Option<Value>,

    /// Sort key is between the two values, inclusive
    #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"], value_parser = parse_value)]
    pub between: Option<Vec<Value>>,

    /// Return items in descending sort key order
    #[arg(long)]
    pub descending: bool,
}

impl QueryArgs {
    pub fn key_condition(&self) -> Condition {
        let (name, value) = &self.partition_key;
        let partition = Condition::eq(AttributePath::attribute(name), value.clone());
        match self.sort_condition() {
            Some(sort) => partition.and(sort),
            None => partition,
        }
    }

    fn sort_condition(&self) -> Option<Condition> {
        let path = AttributePath::attribute(self.sort_key.as_deref()?);
        if let Some(prefix) = &self.begins_with {
            return Some(Condition::begins_with(path, prefix.clone()));
        }
        if let Some([low, high]) = self.between.as_deref() {
            return Some(Condition::between(path, low.clone(), high.clone()));
        }
        [
            (&self.equals, Comparator::Equal),
            (&self.lt, Comparator::Less),
            (&self.le, Comparator::LessOrEqual),
            (&self.gt, Comparator::Greater),
            (&self.ge, Comparator::GreaterOrEqual),
        ]
        .into_iter()
        .find_map(|(value, comparator)| {
            Some(Condition::compare(path.clone(), comparator, value.clone()?))
        })
    }

    pub fn to_request(&self, table: &str) -> Result<QueryRequest, QueryError> {
        let target = &self.target;
        let mut builder = QueryRequest::builder(table)
            .key_condition(self.key_condition())
            .projection(&target.projection)
            .scan_index_forward(!self.descending)
            .consistent_read(target.consistent_read);
        if let Some(index) = &target.index {
            builder = builder.index(index);
        }
        if let Some(filter) = target.filter() {
            builder = builder.filter(filter);
        }
        if let Some(limit) = target.limit {
            builder = builder.limit(limit);
        }
        if let Some(mode) = target.return_consumed_capacity {
            builder = builder.return_consumed_capacity(mode);
        }
        builder.build()
    }
}

#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

impl ScanArgs {
    pub fn to_request(&self, table: &str) -> Result<ScanRequest, QueryError> {
        let target = &self.target;
        let mut builder = ScanRequest::builder(table)
            .projection(&target.projection)
            .consistent_read(target.consistent_read);
        if let Some(index) = &target.index {
            builder = builder.index(index);
        }
        if let Some(filter) = target.filter() {
            builder = builder.filter(filter);
        }
        if let Some(limit) = target.limit {
            builder = builder.limit(limit);
        }
        if let Some(mode) = target.return_consumed_capacity {
            builder = builder.return_consumed_capacity(mode);
        }
        builder.build()
    }
}

#[derive(Debug, Clone, Args)]
pub struct GetArgs {
    /// Table to read (defaults to DYNAQUERY_TABLE)
    #[arg(long, short)]
    pub table: Option<String>,

    /// Key attribute, as NAME=VALUE (once for the partition key, again for the sort key)
    #[arg(long = "key", value_name = "NAME=VALUE", required = true, value_parser = parse_assignment)]
    pub key: Vec<(String, Value)>,

    /// Attributes to return, comma separated
    #[arg(long, value_delimiter = ',')]
    pub projection: Vec<String>,

    /// Use a strongly consistent read
    #[arg(long)]
    pub consistent_read: bool,

    /// Report consumed capacity (INDEXES, TOTAL or NONE)
    #[arg(long)]
    pub return_consumed_capacity: Option<ReturnConsumedCapacity>,

    /// Read from a JSON fixture instead of DynamoDB
    #[arg(long, value_name = "PATH")]
    pub fixture: Option<PathBuf>,
}

impl GetArgs {
    pub fn to_request(&self, table: &str) -> Result<GetItemRequest, QueryError> {
        let mut builder = self
            .key
            .iter()
            .fold(GetItemRequest::builder(table), |builder, (name, value)| {
                builder.key(name.as_str(), value.clone())
            })
            .projection(&self.projection)
            .consistent_read(self.consistent_read);
        if let Some(mode) = self.return_consumed_capacity {
            builder = builder.return_consumed_capacity(mode);
        }
        builder.build()
    }
}

/// Parses a typed literal: `N:42`, `S:text`, `BOOL:true`, `NULL`, or a bare
/// string.
pub fn parse_value(raw: &str) -> Result<Value, String> {
    if raw == "NULL" {
        return Ok(Value::Null);
    }
    if let Some(number) = raw.strip_prefix("N:") {
        return number
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(|_| Value::N(number.trim().to_string()))
            .ok_or_else(|| format!("'{number}' is not a number"));
    }
    if let Some(flag) = raw.strip_prefix("BOOL:") {
        return flag
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|_| format!("'{flag}' is not a boolean"));
    }
    Ok(Value::from(raw.strip_prefix("S:").unwrap_or(raw)))
}

/// Parses `NAME=VALUE`, splitting on the first `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    if name.trim().is_empty() {
        return Err(format!("missing attribute name in '{raw}'"));
    }
    Ok((name.trim().to_string(), parse_value(value)?))
}

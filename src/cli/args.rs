//! Command-line arguments for the `snmp-query` tool.

use clap::{ArgAction, Parser, ValueEnum};
use std::time::Duration;

use crate::Version;
use crate::query::{DEFAULT_MAX_REPETITIONS, DEFAULT_RETRIES, DEFAULT_TIMEOUT, QueryParams};

/// SNMP version for CLI argument parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SnmpVersion {
    /// SNMPv1
    #[value(name = "1")]
    V1,
    /// SNMPv2c (default)
    #[default]
    #[value(name = "2c")]
    V2c,
}

impl From<SnmpVersion> for Version {
    fn from(v: SnmpVersion) -> Self {
        match v {
            SnmpVersion::V1 => Version::V1,
            SnmpVersion::V2c => Version::V2c,
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Per-entry OID, type, integer and string renderings.
    #[default]
    Dump,
    /// One `.oid = TYPE: value` line per entry, like net-snmp's snmpwalk -On.
    Walk,
    /// JSON document for scripting.
    Json,
}

/// Run one `snmp://` URI query and print the results.
#[derive(Debug, Parser)]
#[command(name = "snmp-query", about)]
pub struct Args {
    /// Query URI, e.g. snmp://public@192.0.2.1//1.3.6.1.2.1.1.*
    #[arg(value_name = "URI")]
    pub uri: String,

    /// SNMP version: 1 or 2c.
    #[arg(long = "version", default_value = "2c")]
    pub snmp_version: SnmpVersion,

    /// Per-attempt timeout in milliseconds.
    #[arg(short = 't', long = "timeout", default_value_t = DEFAULT_TIMEOUT.as_millis() as u64)]
    pub timeout: u64,

    /// Resends after a timeout.
    #[arg(short = 'r', long = "retries", default_value_t = DEFAULT_RETRIES)]
    pub retries: u32,

    /// GETBULK max-repetitions for v2c walks.
    #[arg(long = "max-repetitions", default_value_t = DEFAULT_MAX_REPETITIONS)]
    pub max_repetitions: u32,

    /// Output format: dump, walk, or json.
    #[arg(short = 'O', long = "format", default_value = "dump")]
    pub format: OutputFormat,

    /// More logging: -v for debug, -vv for trace. RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Query parameters for these arguments.
    pub fn params(&self) -> QueryParams {
        QueryParams::new(self.uri.clone())
            .version(self.snmp_version.into())
            .timeout(Duration::from_millis(self.timeout))
            .retries(self.retries)
            .max_repetitions(self.max_repetitions)
    }

    /// Install a stderr tracing subscriber.
    pub fn init_tracing(&self) {
        use tracing_subscriber::EnvFilter;

        let level = match self.verbose {
            0 => "snmp_query=warn",
            1 => "snmp_query=debug",
            _ => "snmp_query=trace",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

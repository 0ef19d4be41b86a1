//! snmp-query: run one `snmp://` URI query.
//!
//! Part of the snmp-query CLI utilities.

use clap::Parser;
use snmp_query::cli::args::Args;
use snmp_query::cli::output::{write_error, write_results};
use snmp_query::{UdpEngine, query};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    args.init_tracing();

    let params = args.params();
    let version = params.get_version();
    let mut engine = UdpEngine::new();

    match query(params, &mut engine) {
        Ok(results) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = write_results(&mut stdout, args.format, &args.uri, version, &results) {
                eprintln!("Error writing output: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            write_error(&e);
            ExitCode::FAILURE
        }
    }
}

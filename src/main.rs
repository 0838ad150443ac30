use clap::Parser;
use serde_json::{json, Value};

use criteria_eval::{parse, serialize};

/// Evaluate a boolean criteria expression against a JSON record.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Criteria expression, e.g. "make == 'Acura' and 15 <= maxprice < 20.1"
    expression: String,
    /// JSON object the criteria evaluates against
    #[arg(default_value = "{}")]
    record: String,
    /// Lenient policy: faults degrade to Unknown instead of Error
    #[arg(long)]
    fuzzy: bool,
    /// Print the canonical serialized form instead of evaluating
    #[arg(long)]
    roundtrip: bool,
}

fn main() {
    // Initialize logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse CLI arguments.
    let args = Args::parse();

    // Compile the expression.
    let criteria = match parse(&args.expression) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    if args.roundtrip {
        println!("{}", serialize(&criteria));
        return;
    }

    // Parse the input record.
    let record: Value = match serde_json::from_str(&args.record) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Invalid JSON record: {e}");
            std::process::exit(1);
        }
    };

    // Evaluate and report the outcome with its cause, if any.
    let outcome = criteria_eval::evaluate(&criteria, &record, args.fuzzy);
    let report = json!({
        "outcome": outcome.truth,
        "cause": outcome.cause.as_ref().map(ToString::to_string),
    });
    println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
}

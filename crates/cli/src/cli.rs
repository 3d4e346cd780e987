use clap::Parser;

/// Batch attribution runner for touchflow.
///
/// Trains the Markov transition model on a journey file, measures
/// removal-effect attribution, and computes Shapley values for comparison.
/// The report is written to stdout as JSON; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "touchflow", version, about)]
pub struct CliArgs {
    /// Path to a JSON file holding an array of journey records, e.g.
    /// `[{"touches": ["search", "social"], "converted": true}, ...]`.
    #[arg(long, env = "TOUCHFLOW_JOURNEYS")]
    pub journeys: String,

    /// Comma-separated channel vocabulary. Derived from the distinct
    /// observed touches when omitted.
    #[arg(long, env = "TOUCHFLOW_CHANNELS", value_delimiter = ',')]
    pub channels: Option<Vec<String>>,

    /// Path to a TOML engine config file (solver tolerances, report size).
    /// Falls back to `TOUCHFLOW_*` env vars when omitted.
    #[arg(long, env = "TOUCHFLOW_CONFIG")]
    pub config: Option<String>,

    /// Pretty-print the JSON report.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

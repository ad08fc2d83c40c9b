#![allow(clippy::print_stdout)]

use clap::Args;
use lbprobe_core::{
    Target, Verdict,
    error::{BoxError, ErrorContext, OpaqueError},
    tabulate, verify,
};
use std::time::Duration;

#[derive(Debug, Args)]
/// sample connections to a load balanced tcp endpoint
/// and report which responders answered
pub struct CliCommandSample {
    /// The endpoint to connect to
    ///
    /// e.g. "10.0.0.7:30080" or "[::1]:3333"
    target: Target,

    #[arg(long, short = 'n', default_value_t = 20)]
    /// the number of connections to open, one after the other
    count: usize,

    #[arg(long, short = 't')]
    /// the timeout in seconds for connecting and reading
    ///
    /// (default: 10s)
    timeout: Option<u64>,

    #[arg(long)]
    /// the exact number of distinct responders expected
    expect: Option<usize>,

    #[arg(long, conflicts_with = "expect")]
    /// the minimum number of distinct responders expected
    at_least: Option<usize>,

    #[arg(long)]
    /// print the result as json instead of plain text
    json: bool,
}

/// Run the sample command
pub async fn run(cfg: CliCommandSample) -> Result<(), BoxError> {
    let target = match cfg.timeout {
        Some(secs) => cfg.target.with_timeout(Duration::from_secs(secs)),
        None => cfg.target,
    };

    let samples = lbprobe_tcp::client::sample(&target, cfg.count)
        .await
        .context("sample connections")?;
    let distribution = tabulate(&samples);

    let verdict = match (cfg.expect, cfg.at_least) {
        (Some(expected), _) => Some(verify(&distribution, expected)),
        (None, Some(k)) => {
            let mut verdict = verify(&distribution, k);
            verdict.pass = verdict.distinct_at_least(k);
            Some(verdict)
        }
        (None, None) => None,
    };

    if cfg.json {
        let responders: serde_json::Map<_, _> = distribution
            .iter()
            .map(|(identity, count)| (identity.to_owned(), count.into()))
            .collect();
        let output = serde_json::json!({
            "target": target.to_string(),
            "total_samples": distribution.total(),
            "distinct_responders": distribution.distinct(),
            "responders": responders,
            "pass": verdict.map(|verdict| verdict.pass),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("serialize sample report")?
        );
    } else {
        println!("{target}: {} sample(s)", distribution.total());
        for (identity, count) in &distribution {
            println!("  {identity}\t{count}");
        }
        if let Some(verdict) = verdict {
            println!("{verdict}");
        }
    }

    match verdict {
        Some(Verdict { pass: false, .. }) => Err(OpaqueError::from_display(
            "load balancing expectation not met",
        )
        .into_boxed()),
        _ => Ok(()),
    }
}

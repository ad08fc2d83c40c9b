use super::{common, utils};

#[test]
fn sample_single_server_meets_expectation() {
    common::init_tracing();
    let server = utils::LbprobeService::serve();

    let output = server.sample(&["-n", "5", "--expect", "1"]);
    let stdout = utils::stdout(&output);

    assert!(output.status.success(), "stderr: {}", utils::stderr(&output));
    assert!(
        stdout.contains(&format!("{}: 5 sample(s)", server.target())),
        "stdout: {stdout}"
    );
    assert!(stdout.contains("pass"), "stdout: {stdout}");
}

#[test]
fn sample_unmet_expectation_exits_with_error() {
    common::init_tracing();
    let server = utils::LbprobeService::serve();

    let output = server.sample(&["-n", "5", "--expect", "2"]);
    let stderr = utils::stderr(&output);

    assert_eq!(output.status.code(), Some(1), "stderr: {stderr}");
    assert!(stderr.contains("🚩 exit with error"), "stderr: {stderr}");
    assert!(
        stderr.contains("load balancing expectation not met"),
        "stderr: {stderr}"
    );
}

#[test]
fn sample_at_least_reports_json() {
    common::init_tracing();
    let server = utils::LbprobeService::serve();

    let output = server.sample(&["-n", "4", "--at-least", "1", "--json"]);
    assert!(output.status.success(), "stderr: {}", utils::stderr(&output));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["target"], server.target());
    assert_eq!(report["total_samples"], 4);
    assert_eq!(report["distinct_responders"], 1);
    assert_eq!(report["pass"], true);

    let responders = report["responders"].as_object().unwrap();
    assert_eq!(responders.len(), 1);
    assert_eq!(responders.values().next().unwrap(), 4);
}

#[test]
fn sample_unreachable_target_exits_with_error() {
    common::init_tracing();
    let target = format!("127.0.0.1:{}", utils::free_port());

    let output = utils::run(&["sample", target.as_str(), "-n", "2", "-t", "2"], None);
    let stderr = utils::stderr(&output);

    assert_eq!(output.status.code(), Some(1), "stderr: {stderr}");
    assert!(stderr.contains("sample connections"), "stderr: {stderr}");
}

use super::{common, utils};

const RENDERED_CONF: &str = r#"
upstream default-coffee-80 {
    zone default-coffee-80 256k;
    random two least_conn;
    server 10.0.0.11:8080 max_fails=1 fail_timeout=10s max_conns=0;
    server 10.0.0.12:8080 max_fails=1 fail_timeout=10s max_conns=0;
}

upstream default-tea-80 {
    server 10.0.0.21:8080;
    server 10.0.0.22:8080;
}
"#;

#[test]
fn upstreams_from_stdin_meets_expectation() {
    common::init_tracing();

    let output = utils::run(&["upstreams", "-", "--expect", "4"], Some(RENDERED_CONF));
    let stdout = utils::stdout(&output);

    assert!(output.status.success(), "stderr: {}", utils::stderr(&output));
    for address in [
        "10.0.0.11:8080",
        "10.0.0.12:8080",
        "10.0.0.21:8080",
        "10.0.0.22:8080",
    ] {
        assert!(stdout.contains(address), "stdout: {stdout}");
    }
    assert!(stdout.contains("4 upstream server(s)"), "stdout: {stdout}");
}

#[test]
fn upstreams_count_mismatch_exits_with_error() {
    common::init_tracing();

    let output = utils::run(&["upstreams", "-", "--expect", "3"], Some(RENDERED_CONF));
    let stderr = utils::stderr(&output);

    assert_eq!(output.status.code(), Some(1), "stderr: {stderr}");
    assert!(
        stderr.contains("expected 3 upstream server(s), found 4"),
        "stderr: {stderr}"
    );
}

#[test]
fn upstreams_missing_file_exits_with_error() {
    common::init_tracing();

    let output = utils::run(&["upstreams", "./does-not-exist.conf"], None);
    let stderr = utils::stderr(&output);

    assert_eq!(output.status.code(), Some(1), "stderr: {stderr}");
    assert!(
        stderr.contains("read config file './does-not-exist.conf'"),
        "stderr: {stderr}"
    );
}

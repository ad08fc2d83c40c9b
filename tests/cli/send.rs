use super::{common, utils};

#[tokio::test]
async fn send_presents_host_as_server_name() {
    common::init_tracing();
    let certificate = common::self_signed_certificate();
    let addr = common::spawn_sni_echo_server(&certificate).await;

    let url = format!("https://{addr}/coffee");
    let output = tokio::process::Command::from(utils::lbprobe())
        .args(["send", url.as_str(), "--host", common::SERVER_NAME, "-k"])
        .output()
        .await
        .unwrap();
    let stdout = utils::stdout(&output);

    assert!(output.status.success(), "stderr: {}", utils::stderr(&output));
    assert!(stdout.contains("200 OK"), "stdout: {stdout}");
    assert!(stdout.contains(common::SERVER_NAME), "stdout: {stdout}");
}

#[tokio::test]
async fn send_non_success_status_exits_with_error() {
    common::init_tracing();
    let certificate = common::self_signed_certificate();
    let addr = common::spawn_https_server(&certificate, "404 Not Found").await;

    let url = format!("https://{addr}/missing");
    let output = tokio::process::Command::from(utils::lbprobe())
        .args(["send", url.as_str(), "--host", common::SERVER_NAME, "-k"])
        .output()
        .await
        .unwrap();
    let stderr = utils::stderr(&output);

    assert_eq!(output.status.code(), Some(1), "stderr: {stderr}");
    assert!(
        stderr.contains("request failed with status 404 Not Found"),
        "stderr: {stderr}"
    );
}

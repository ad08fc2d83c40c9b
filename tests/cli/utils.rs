#![allow(dead_code)]

use std::{
    io::{BufRead, BufReader, Write},
    net::{Ipv4Addr, TcpListener},
    path::{Path, PathBuf},
    process::{Child, Command, Output, Stdio},
    sync::OnceLock,
    thread,
};

/// Build the `lbprobe` binary once and return its path.
fn lbprobe_bin() -> &'static Path {
    static LBPROBE_BIN: OnceLock<PathBuf> = OnceLock::new();
    LBPROBE_BIN.get_or_init(|| {
        escargot::CargoBuild::new()
            .package("lbprobe-cli")
            .bin("lbprobe")
            .target_dir("./target/")
            .run()
            .unwrap()
            .path()
            .to_path_buf()
    })
}

/// A `lbprobe` command with logging configured from the environment.
pub(super) fn lbprobe() -> Command {
    let mut cmd = Command::new(lbprobe_bin());
    cmd.env(
        "RUST_LOG",
        std::env::var("RUST_LOG").unwrap_or("info".into()),
    )
    .env("NO_COLOR", "1");
    cmd
}

/// A loopback port nothing listens on right now.
pub(super) fn free_port() -> u16 {
    TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[derive(Debug)]
/// A wrapper around a `lbprobe serve` process, killed on drop.
pub(super) struct LbprobeService {
    process: Child,
    port: u16,
}

impl LbprobeService {
    /// Start an identity server on a free loopback port,
    /// returning once it is ready to accept connections.
    pub(super) fn serve() -> Self {
        let port = free_port();
        let mut process = lbprobe()
            .stderr(Stdio::piped())
            .arg("serve")
            .arg("-i")
            .arg("127.0.0.1")
            .arg("-p")
            .arg(port.to_string())
            .spawn()
            .unwrap();

        // logs are written to stderr
        let stderr = process.stderr.take().unwrap();
        let mut stderr = BufReader::new(stderr).lines();

        for line in &mut stderr {
            let line = line.unwrap();
            if line.contains("identity server ready") {
                break;
            }
        }

        thread::spawn(move || {
            for line in stderr {
                let line = line.unwrap();
                eprintln!("lbprobe serve >> {line}");
            }
        });

        Self { process, port }
    }

    /// The `host:port` target of this server.
    pub(super) fn target(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Run `lbprobe sample` against this server.
    pub(super) fn sample(&self, args: &[&str]) -> Output {
        lbprobe()
            .arg("sample")
            .arg(self.target())
            .args(args)
            .output()
            .unwrap()
    }
}

impl Drop for LbprobeService {
    fn drop(&mut self) {
        self.process.kill().expect("kill server process");
    }
}

/// Run any lbprobe cmd, feeding `stdin` to it when given.
pub(super) fn run(args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = lbprobe()
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    if let Some(input) = stdin {
        // dropping the handle closes stdin
        let mut pipe = child.stdin.take().unwrap();
        pipe.write_all(input.as_bytes()).unwrap();
    }

    child.wait_with_output().unwrap()
}

pub(super) fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub(super) fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

use std::collections::BTreeMap;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use gitops_console::console::{Console, Dispatcher};

pub struct ServerGuard {
    pub base_url: String,
    pub api_base: String,
    _dir: tempfile::TempDir,
    child: Child,
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Starts the fixture backend on an ephemeral port with the given fixture.
pub fn spawn_server(fixture: &serde_json::Value) -> Result<ServerGuard> {
    let dir = tempfile::tempdir().context("create server tempdir")?;
    let addr_file = dir.path().join("addr.txt");
    let fixture_file = dir.path().join("fixture.json");
    std::fs::write(&fixture_file, serde_json::to_vec_pretty(fixture)?)
        .context("write fixture")?;

    let child = Command::new(env!("CARGO_BIN_EXE_console-fixture-server"))
        .args([
            "--addr",
            "127.0.0.1:0",
            "--addr-file",
            addr_file.to_str().unwrap(),
            "--fixture",
            fixture_file.to_str().unwrap(),
        ])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("spawn console-fixture-server")?;

    let base_url = read_addr_file(&addr_file)?;
    wait_for_healthz(&base_url)?;

    Ok(ServerGuard {
        api_base: format!("{}/api/v1", base_url),
        base_url,
        _dir: dir,
        child,
    })
}

fn read_addr_file(addr_file: &std::path::Path) -> Result<String> {
    let start = Instant::now();
    loop {
        if start.elapsed() > Duration::from_secs(5) {
            anyhow::bail!("addr file not written at {}", addr_file.display());
        }

        if let Ok(s) = std::fs::read_to_string(addr_file) {
            let s = s.trim();
            if !s.is_empty() {
                return Ok(format!("http://{}", s));
            }
        }
        thread::sleep(Duration::from_millis(10));
    }
}

pub fn wait_for_healthz(base_url: &str) -> Result<()> {
    let client = reqwest::blocking::Client::new();
    let start = Instant::now();
    loop {
        if start.elapsed() > Duration::from_secs(5) {
            anyhow::bail!("server did not become healthy at {}/healthz", base_url);
        }
        match client.get(format!("{}/healthz", base_url)).send() {
            Ok(resp) if resp.status().is_success() => return Ok(()),
            _ => {
                thread::sleep(Duration::from_millis(50));
            }
        }
    }
}

/// Per-route request counts recorded by the fixture backend.
#[allow(dead_code)]
pub fn hits(server: &ServerGuard) -> Result<BTreeMap<String, u64>> {
    let hits = reqwest::blocking::Client::new()
        .get(format!("{}/_fixture/hits", server.api_base))
        .send()
        .context("fixture hits")?
        .error_for_status()
        .context("fixture hits status")?
        .json()
        .context("parse fixture hits")?;
    Ok(hits)
}

#[allow(dead_code)]
pub fn hit_count(server: &ServerGuard, route: &str) -> Result<u64> {
    Ok(hits(server)?.get(route).copied().unwrap_or(0))
}

/// Pumps requests and completions until nothing is queued or in flight.
#[allow(dead_code)]
pub fn drive(console: &mut Console, dispatcher: &mut Dispatcher) -> Result<()> {
    let start = Instant::now();
    loop {
        dispatcher.submit_all(console.take_requests());
        if dispatcher.in_flight() == 0 {
            return Ok(());
        }
        if start.elapsed() > Duration::from_secs(10) {
            anyhow::bail!("{} requests still in flight", dispatcher.in_flight());
        }
        if let Some(done) = dispatcher.recv_timeout(Duration::from_millis(100)) {
            console.apply(done);
        }
    }
}

/// Two-group estate. `edge-1` has a slow file and passes its nginx check;
/// `edge-2` fails it.
#[allow(dead_code)]
pub fn estate() -> serde_json::Value {
    let files = serde_json::json!([
        {"path": "nginx.conf", "remote": "worker_processes auto;\n"},
        {
            "path": "conf.d/slow.conf",
            "status": "modified",
            "remote": "listen 80;\n",
            "preview": "listen 8080;\n",
            "prod": "listen 80;\n",
            "delay_ms": 800
        },
        {
            "path": "conf.d/fast.conf",
            "status": "added",
            "remote": "",
            "preview": "gzip on;\n",
            "prod": "gzip on;\n"
        }
    ]);
    serde_json::json!({
        "groups": [
            {
                "name": "edge",
                "hosts": [
                    {
                        "name": "Edge 1",
                        "host": "edge-1",
                        "config_dir_suffix": "edge/edge-1",
                        "prefix": "sites",
                        "files": files.clone(),
                        "nginx_ok": true
                    },
                    {
                        "name": "Edge 2",
                        "host": "edge-2",
                        "config_dir_suffix": "edge/edge-2",
                        "prefix": "sites",
                        "files": files,
                        "nginx_ok": false
                    }
                ]
            }
        ]
    })
}

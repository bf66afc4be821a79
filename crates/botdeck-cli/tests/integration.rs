#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    base: PathBuf,
}

impl Fixture {
    /// Bots under `bots/`, nginx-style configs under `etc/`, and a settings
    /// file pointing at both with sudo and systemd taken out of the loop.
    fn new(server: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let base = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(base.join("bots")).unwrap();
        let settings = format!(
            "bots_root: {bots}\n\
             history_file: {history}\n\
             discovery:\n  python_scripts: [main.py, run.sh]\n\
             runtime:\n  system_python: sh\n  stop_grace_secs: 2\n  restart_pause_ms: 100\n\
             web:\n  server: {server}\n  config_root: {etc}\n  use_sudo: false\n  reload_command: [\"true\"]\n",
            bots = base.join("bots").display(),
            history = base.join("state.json").display(),
            etc = base.join("etc").display(),
        );
        std::fs::write(base.join("botdeck.yaml"), settings).unwrap();
        Self { _dir: dir, base }
    }

    fn bots(&self) -> PathBuf {
        self.base.join("bots")
    }

    fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.base.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    fn nginx_site(&self, file: &str, domain: &str) -> PathBuf {
        let root = self.base.join("www").join(file);
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(self.base.join("etc/nginx/sites-enabled")).unwrap();
        self.write(
            &format!("etc/nginx/sites-available/{file}"),
            &format!("server {{\n    server_name {domain};\n    root {};\n}}\n", root.display()),
        );
        root
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("botdeck").unwrap();
        cmd.current_dir(&self.base)
            .env("BOTDECK_CONFIG", self.base.join("botdeck.yaml"))
            .env_remove("BOTDECK_ROOT")
            .env_remove("RUST_LOG");
        cmd
    }

    fn list(&self) -> Value {
        let out = self.cmd().args(["list", "--json"]).output().unwrap();
        assert!(out.status.success(), "list failed: {}", String::from_utf8_lossy(&out.stderr));
        serde_json::from_slice(&out.stdout).unwrap()
    }
}

// ---------------------------------------------------------------------------
// botdeck list
// ---------------------------------------------------------------------------

#[test]
fn list_finds_bots_and_skips_nested_ones() {
    let fx = Fixture::new("none");
    fx.write("bots/alpha/main.py", "");
    fx.write("bots/alpha/sub/main.py", "");
    fx.write("bots/alpha/venv/bin/python", "");
    fx.write("bots/beta/index.js", "");
    fx.write("bots/beta/package.json", "{}");
    fx.write("bots/gamma/index.js", "");

    let json = fx.list();
    let bots = json["bots"].as_array().unwrap();
    let names: Vec<&str> = bots.iter().map(|b| b["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);
    assert_eq!(bots[0]["kind"], "python");
    assert!(bots[0]["interpreter_override"]
        .as_str()
        .unwrap()
        .ends_with("venv/bin/python"));
    assert_eq!(bots[1]["kind"], "nodejs");
    assert_eq!(bots[0]["liveness"]["state"], "stopped");
    assert_eq!(json["web_server"]["active"], false);
    assert_eq!(json["web_server"]["name"], "Nginx/Apache");
    assert_eq!(json["sites"].as_array().unwrap().len(), 0);
}

#[test]
fn list_reads_legacy_history_document() {
    let fx = Fixture::new("none");
    fx.write("bots/alpha/main.py", "");
    let mut state = serde_json::Map::new();
    state.insert(
        fx.bots().join("alpha").display().to_string(),
        serde_json::json!({ "last_stopped": 1_700_000_000.5 }),
    );
    fx.write("state.json", &Value::Object(state).to_string());

    let json = fx.list();
    let stopped = json["bots"][0]["liveness"]["last_stopped_at"].as_str().unwrap();
    assert!(stopped.starts_with("2023-11-14T22:13:20"));
}

#[test]
fn list_survives_malformed_history() {
    let fx = Fixture::new("none");
    fx.write("bots/alpha/main.py", "");
    fx.write("state.json", "{ not json");

    let json = fx.list();
    assert_eq!(json["bots"][0]["liveness"]["state"], "stopped");
    assert!(json["bots"][0]["liveness"].get("last_stopped_at").is_none());
}

#[test]
fn list_numbers_sites_after_bots() {
    let fx = Fixture::new("nginx");
    fx.write("bots/alpha/main.py", "");
    fx.nginx_site("shop", "shop.example.com www.shop.example.com");
    fx.nginx_site("catchall", "_");

    let json = fx.list();
    let sites = json["sites"].as_array().unwrap();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0]["domain"], "shop.example.com");
    assert_eq!(sites[0]["state"], "disabled");
    assert_eq!(sites[0]["content_kind"], "HTML");
    assert_eq!(
        json["selectables"],
        serde_json::json!([
            { "type": "bot", "index": 0 },
            { "type": "site", "index": 0 },
        ])
    );
}

#[test]
fn list_table_output() {
    let fx = Fixture::new("nginx");
    fx.write("bots/alpha/main.py", "");
    fx.nginx_site("shop", "shop.example.com");

    fx.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha"))
        .stdout(predicate::str::contains("shop.example.com"))
        .stdout(predicate::str::contains("Web server: Nginx (active)"));
}

#[test]
fn missing_bots_root_is_not_fatal() {
    let fx = Fixture::new("none");
    std::fs::remove_dir_all(fx.bots()).unwrap();

    let json = fx.list();
    assert_eq!(json["bots"].as_array().unwrap().len(), 0);
    assert_eq!(json["warnings"].as_array().unwrap().len(), 1);
}

#[test]
fn root_flag_overrides_settings() {
    let fx = Fixture::new("none");
    fx.write("bots/alpha/main.py", "");
    fx.write("other/omega/bot.py", "");

    let out = fx
        .cmd()
        .args(["list", "--json", "--root"])
        .arg(fx.base.join("other"))
        .output()
        .unwrap();
    let json: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["bots"][0]["name"], "omega");
}

// ---------------------------------------------------------------------------
// botdeck site
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn site_enable_then_disable() {
    let fx = Fixture::new("nginx");
    fx.nginx_site("shop", "shop.example.com");
    let link = fx.base.join("etc/nginx/sites-enabled/shop");

    fx.cmd().args(["site", "enable", "shop.example.com"]).assert().success();
    assert!(link.symlink_metadata().is_ok());
    assert_eq!(fx.list()["sites"][0]["state"], "enabled");

    fx.cmd().args(["site", "disable", "1"]).assert().success();
    assert!(link.symlink_metadata().is_err());
    assert_eq!(fx.list()["sites"][0]["state"], "disabled");
}

#[cfg(unix)]
#[test]
fn dangling_enabled_link_counts_as_enabled() {
    let fx = Fixture::new("nginx");
    fx.nginx_site("shop", "shop.example.com");
    std::os::unix::fs::symlink(
        fx.base.join("nowhere"),
        fx.base.join("etc/nginx/sites-enabled/shop"),
    )
    .unwrap();

    assert_eq!(fx.list()["sites"][0]["state"], "enabled");
}

#[test]
fn site_commands_need_a_web_server() {
    let fx = Fixture::new("none");
    fx.cmd()
        .args(["site", "enable", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no active web server"));
}

#[test]
fn unknown_site_is_reported() {
    let fx = Fixture::new("nginx");
    fx.nginx_site("shop", "shop.example.com");
    fx.cmd()
        .args(["site", "enable", "blog.example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("site not found"));
}

#[test]
fn reload_runs_configured_command() {
    let fx = Fixture::new("nginx");
    fx.cmd().arg("reload").assert().success();
}

// ---------------------------------------------------------------------------
// botdeck start / stop
// ---------------------------------------------------------------------------

#[test]
fn invalid_selection_is_an_error() {
    let fx = Fixture::new("none");
    fx.write("bots/alpha/main.py", "");
    fx.cmd()
        .args(["start", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid selection"));
    fx.cmd()
        .args(["stop", "nobody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bot not found"));
}

#[test]
fn stop_of_stopped_bot_is_a_no_op() {
    let fx = Fixture::new("none");
    fx.write("bots/alpha/main.py", "");
    fx.cmd()
        .args(["stop", "alpha"])
        .assert()
        .success()
        .stdout(predicate::str::contains("has no active process"));
    assert!(!fx.base.join("state.json").exists());
}

#[test]
fn restart_all_with_nothing_running() {
    let fx = Fixture::new("none");
    fx.write("bots/alpha/main.py", "");
    fx.cmd()
        .arg("restart-all")
        .assert()
        .success()
        .stdout(predicate::str::contains("no active bots"));
}

#[cfg(target_os = "linux")]
#[test]
fn start_then_stop_round_trip() {
    let fx = Fixture::new("none");
    let bot_dir = fx.bots().join("sleeper");
    fx.write("bots/sleeper/run.sh", "exec sleep 30\n");

    let out = fx
        .cmd()
        .args(["start", "sleeper", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let report: Value = serde_json::from_slice(&out.stdout).unwrap();
    let pid = report["pid"].as_u64().unwrap();
    assert!(bot_dir.join("logs/sleeper.log").exists());

    std::thread::sleep(std::time::Duration::from_millis(300));
    let json = fx.list();
    assert_eq!(json["bots"][0]["liveness"]["state"], "running");
    assert_eq!(json["bots"][0]["liveness"]["pid"].as_u64(), Some(pid));

    fx.cmd()
        .args(["start", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already running"));

    fx.cmd().args(["stop", "1"]).assert().success();

    let json = fx.list();
    assert_eq!(json["bots"][0]["liveness"]["state"], "stopped");
    assert!(json["bots"][0]["liveness"]["last_stopped_at"].is_string());
    let history = std::fs::read_to_string(fx.base.join("state.json")).unwrap();
    assert!(history.contains(&bot_dir.display().to_string()));
}

#[cfg(target_os = "linux")]
#[test]
fn stop_kills_bot_that_ignores_term() {
    let fx = Fixture::new("none");
    let bot_dir = fx.bots().join("stubborn");
    fx.write("bots/stubborn/run.sh", "trap '' TERM\nwhile :; do :; done\n");

    let out = fx
        .cmd()
        .args(["start", "stubborn", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let pid = serde_json::from_slice::<Value>(&out.stdout).unwrap()["pid"]
        .as_u64()
        .unwrap();

    std::thread::sleep(std::time::Duration::from_millis(300));
    assert_eq!(fx.list()["bots"][0]["liveness"]["state"], "running");

    let out = fx.cmd().args(["stop", "1", "--json"]).output().unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let outcome: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(outcome["outcome"], "stopped");
    assert_eq!(outcome["pid"].as_u64(), Some(pid));
    assert_eq!(outcome["forced"], true);

    assert_eq!(fx.list()["bots"][0]["liveness"]["state"], "stopped");
    let history = std::fs::read_to_string(fx.base.join("state.json")).unwrap();
    assert!(history.contains(&bot_dir.display().to_string()));
}

// ---------------------------------------------------------------------------
// botdeck config / menu
// ---------------------------------------------------------------------------

#[test]
fn config_validate_accepts_fixture() {
    let fx = Fixture::new("none");
    fx.cmd()
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No warnings"));
}

#[test]
fn config_validate_rejects_empty_scripts() {
    let fx = Fixture::new("none");
    fx.write(
        "botdeck.yaml",
        "discovery:\n  python_scripts: []\n  node_scripts: []\n",
    );
    fx.cmd()
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"));
}

#[test]
fn config_init_writes_defaults_once() {
    let fx = Fixture::new("none");
    let path = fx.base.join("fresh/botdeck.yaml");
    fx.cmd()
        .env("BOTDECK_CONFIG", &path)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default settings"));
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("python3"));

    fx.cmd()
        .env("BOTDECK_CONFIG", &path)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exist"));
}

#[test]
fn malformed_settings_are_fatal() {
    let fx = Fixture::new("none");
    fx.write("botdeck.yaml", "runtime: [not, a, map]\n");
    fx.cmd()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load settings"));
}

#[test]
fn menu_requires_a_terminal() {
    let fx = Fixture::new("none");
    fx.cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs a terminal"));
}

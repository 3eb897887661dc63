//! End-to-end tests driving the `triskel` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::{TempDir, tempdir};

const SECRETS: [&str; 3] = [
    "TRISKEL_ENCRYPTION_KEY",
    "TRISKEL_NOISE_KEY",
    "TRISKEL_ENTROPY_SALT",
];

const FAST_CONFIG: &str = r#"
[signal]
sample_rate = 8000
base_freq = 111.0
duration = 0.5

[obfuscation]
policy = "noise"
noise_strength = 0.05
"#;

/// Temp dir holding a settings file, so no user config leaks in.
struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new(config: &str) -> Self {
        let dir = tempdir().unwrap();
        let path = dir.path().join("triskel.toml");
        std::fs::write(&path, config).unwrap();
        Self { dir, config: path }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_triskel"));
        cmd.arg("--config").arg(&self.config);
        for var in SECRETS {
            cmd.env_remove(var);
        }
        cmd.env("RUST_LOG", "warn");
        cmd
    }

    fn keyed(&self) -> Command {
        let mut cmd = self.command();
        cmd.env("TRISKEL_ENCRYPTION_KEY", "IX369")
            .env("TRISKEL_NOISE_KEY", "hush");
        cmd
    }

    fn tone(&self, name: &str, freqs: &str, amplitude: &str) -> PathBuf {
        let path = self.path(name);
        let out = self
            .command()
            .args(["generate", "tone"])
            .arg(&path)
            .args(["--freq", freqs, "--amplitude", amplitude])
            .output()
            .unwrap();
        assert_success(&out);
        path
    }
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn assert_success(out: &Output) {
    assert!(
        out.status.success(),
        "command failed\nstdout:\n{}\nstderr:\n{}",
        stdout(out),
        stderr(out)
    );
}

fn run(mut cmd: Command, args: &[&str], paths: &[&Path]) -> Output {
    cmd.args(args);
    for p in paths {
        cmd.arg(p);
    }
    cmd.output().unwrap()
}

#[test]
fn help_lists_commands() {
    let out = Command::new(env!("CARGO_BIN_EXE_triskel"))
        .arg("--help")
        .output()
        .unwrap();
    assert_success(&out);
    let text = stdout(&out);
    for cmd in ["encode", "transmit", "keygen", "generate", "validate", "obfuscate", "listen"] {
        assert!(text.contains(cmd), "help missing {cmd}:\n{text}");
    }
}

#[test]
fn keygen_is_deterministic_for_a_fixed_time() {
    let ws = Workspace::new("");
    let out = run(ws.command(), &["keygen", "--at", "1000"], &[]);
    assert_success(&out);
    let text = stdout(&out);
    assert!(text.contains("Harmonic seed: 65"), "{text}");
    assert!(
        text.contains("Key: 31285c027d5e4a0473bd24c210e5d3505b256a0701d906ab422c0641c0647bd5"),
        "{text}"
    );

    let out = run(
        ws.command(),
        &[
            "keygen",
            "--at",
            "1000.5",
            "--verify",
            "31285c027d5e4a0473bd24c210e5d3505b256a0701d906ab422c0641c0647bd5",
        ],
        &[],
    );
    assert_success(&out);
}

#[test]
fn keygen_rejects_key_from_another_window() {
    let ws = Workspace::new("");
    let out = run(
        ws.command(),
        &[
            "keygen",
            "--at",
            "1001",
            "--verify",
            "31285c027d5e4a0473bd24c210e5d3505b256a0701d906ab422c0641c0647bd5",
        ],
        &[],
    );
    assert!(!out.status.success());
    assert!(stderr(&out).contains("does not match"));
}

#[test]
fn encode_reports_fundamental_as_json() {
    let ws = Workspace::new(FAST_CONFIG);
    let input = ws.tone("voice.wav", "333", "0.5");

    let out = run(ws.command(), &["encode", "--json"], &[&input]);
    assert_success(&out);
    let report: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(report["sample_rate"], 8000);
    let fundamental = report["fundamental_hz"].as_f64().unwrap();
    assert!((fundamental - 333.0).abs() < 1e-6, "{fundamental}");
    assert_eq!(report["harmonics"].as_array().unwrap().len(), 3);
    assert!(report.get("encrypted").is_none());
}

#[test]
fn dry_run_transmit_writes_carrier_after_lock() {
    let ws = Workspace::new(FAST_CONFIG);
    let input = ws.tone("voice.wav", "333,666,999", "0.5");
    let carrier = ws.path("carrier.wav");

    let mut cmd = ws.keyed();
    cmd.arg("transmit")
        .arg(&input)
        .arg("--feedback")
        .arg(&input)
        .arg("--dry-run")
        .arg(&carrier);
    let out = cmd.output().unwrap();
    assert_success(&out);

    let text = stdout(&out);
    assert!(text.contains("Obfuscation: noise"), "{text}");
    assert!(text.contains("state: locked"), "{text}");
    assert!(carrier.exists());

    let written = triskel_io::read_waveform(&carrier).unwrap();
    assert_eq!(written.sample_rate(), 8000);
    assert_eq!(written.len(), 4000);
}

#[test]
fn silent_feedback_aborts_without_emitting() {
    let ws = Workspace::new(FAST_CONFIG);
    let input = ws.tone("voice.wav", "333,666,999", "0.5");
    let silence = ws.tone("silence.wav", "333", "0.0");
    let carrier = ws.path("carrier.wav");

    let mut cmd = ws.keyed();
    cmd.arg("transmit")
        .arg(&input)
        .arg("--feedback")
        .arg(&silence)
        .arg("--dry-run")
        .arg(&carrier);
    let out = cmd.output().unwrap();

    assert!(!out.status.success());
    assert!(stderr(&out).contains("feedback lock rejected"), "{}", stderr(&out));
    assert!(!carrier.exists());
}

#[test]
fn insecure_transmit_without_lock_needs_only_the_encryption_key() {
    let ws = Workspace::new(FAST_CONFIG);
    let input = ws.tone("voice.wav", "333", "0.5");
    let carrier = ws.path("carrier.wav");

    let mut cmd = ws.command();
    cmd.env("TRISKEL_ENCRYPTION_KEY", "IX369")
        .arg("transmit")
        .arg(&input)
        .args(["--insecure", "--no-lock", "--dry-run"])
        .arg(&carrier);
    let out = cmd.output().unwrap();
    assert_success(&out);
    assert!(stdout(&out).contains("Obfuscation: none"));
    assert!(carrier.exists());
}

#[test]
fn missing_encryption_key_names_the_variable() {
    let ws = Workspace::new(FAST_CONFIG);
    let input = ws.tone("voice.wav", "333", "0.5");

    let mut cmd = ws.command();
    cmd.arg("transmit")
        .arg(&input)
        .args(["--no-lock", "--dry-run"])
        .arg(ws.path("carrier.wav"));
    let out = cmd.output().unwrap();

    assert!(!out.status.success());
    assert!(stderr(&out).contains("TRISKEL_ENCRYPTION_KEY"), "{}", stderr(&out));
}

#[test]
fn wrong_sample_rate_is_rejected() {
    let ws = Workspace::new(FAST_CONFIG);
    let input = ws.path("fast.wav");
    let out = run(
        ws.command(),
        &["generate", "tone", "--sample-rate", "16000", "--freq", "333"],
        &[&input],
    );
    assert_success(&out);

    let out = run(ws.command(), &["encode"], &[&input]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("16000"), "{}", stderr(&out));
}

#[test]
fn generated_triple_validates_and_swapped_order_fails() {
    let ws = Workspace::new("");
    let base = ws.path("triple.wav");
    let out = run(
        ws.command(),
        &["generate", "triple", "--harmonics", "3:0.8,6:0.4,9:0.2"],
        &[&base],
    );
    assert_success(&out);

    let (x, y, z) = (
        ws.path("triple_x.wav"),
        ws.path("triple_y.wav"),
        ws.path("triple_z.wav"),
    );
    let out = run(ws.command(), &["validate"], &[&x, &y, &z]);
    assert_success(&out);
    assert!(stdout(&out).contains("VALID"));

    let out = run(ws.command(), &["validate"], &[&x, &z, &y]);
    assert!(!out.status.success());
    assert!(stdout(&out).contains("BROKEN"));
}

#[test]
fn noise_obfuscation_round_trips() {
    let ws = Workspace::new(FAST_CONFIG);
    let input = ws.tone("voice.wav", "333", "0.3");
    let masked = ws.path("masked.wav");
    let restored = ws.path("restored.wav");

    let out = run(ws.keyed(), &["obfuscate", "--policy", "noise"], &[&input, &masked]);
    assert_success(&out);
    let out = run(ws.keyed(), &["deobfuscate", "--policy", "noise"], &[&masked, &restored]);
    assert_success(&out);

    let original = triskel_io::read_waveform(&input).unwrap();
    let masked = triskel_io::read_waveform(&masked).unwrap();
    let restored = triskel_io::read_waveform(&restored).unwrap();

    let max_diff = |a: &[f64], b: &[f64]| {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max)
    };
    assert!(max_diff(original.samples(), masked.samples()) > 0.01);
    assert!(max_diff(original.samples(), restored.samples()) < 1e-4);
}

#[test]
fn smear_deobfuscation_without_seed_fails() {
    let ws = Workspace::new(FAST_CONFIG);
    let input = ws.tone("voice.wav", "333", "0.3");
    let out = run(
        ws.command(),
        &["deobfuscate", "--policy", "smear"],
        &[&input, &ws.path("out.wav")],
    );
    assert!(!out.status.success());
    assert!(stderr(&out).contains("--seed"), "{}", stderr(&out));
}

#[test]
fn listen_locks_on_replayed_harmonics() {
    let ws = Workspace::new(FAST_CONFIG);
    let feedback = ws.tone("feedback.wav", "333,666,999", "0.5");
    let out = run(ws.command(), &["listen", "--sensor", "--feedback"], &[&feedback]);
    assert_success(&out);
    let text = stdout(&out);
    assert!(text.contains("state: locked"), "{text}");
    assert!(text.contains("simulated"), "{text}");
}

#[test]
fn config_show_never_prints_secrets() {
    let ws = Workspace::new("[secrets]\nnoise_key = \"file-secret\"\n");
    let out = run(ws.keyed(), &["config", "show"], &[]);
    assert_success(&out);
    let text = stdout(&out);
    assert!(!text.contains("IX369"));
    assert!(!text.contains("file-secret"));
    assert!(text.contains("encryption_key: set"), "{text}");
    assert!(text.contains("entropy_salt: not set"), "{text}");
}

#[test]
fn config_init_refuses_to_overwrite_without_force() {
    let ws = Workspace::new("");
    let target = ws.path("fresh.toml");

    let out = run(ws.command(), &["config", "init", "--path"], &[&target]);
    assert_success(&out);
    let written = std::fs::read_to_string(&target).unwrap();
    assert!(written.contains("[signal]"));

    let out = run(ws.command(), &["config", "init", "--path"], &[&target]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("--force"));

    let out = run(ws.command(), &["config", "init", "--force", "--path"], &[&target]);
    assert_success(&out);
}

#[test]
fn infinite_repeat_delay_is_an_error_not_a_panic() {
    let ws = Workspace::new(FAST_CONFIG);
    let input = ws.tone("voice.wav", "333", "0.5");
    let out = run(ws.keyed(), &["transmit", "--delay", "inf"], &[&input]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Invalid --delay"), "{}", stderr(&out));
    assert!(!stderr(&out).contains("panicked"));
}

use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub poll_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:1337".into(),
            poll_interval_secs: 5,
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    poll_interval_secs: Option<u64>,
}

/// Defaults, then `dashboard.toml` if present, then the environment.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    apply_file(&mut settings, Path::new(SETTINGS_FILE));
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    match toml::from_str::<FileSettings>(&raw) {
        Ok(file_cfg) => apply_file_settings(settings, file_cfg),
        Err(err) => warn!(path = %path.display(), error = %err, "config: ignoring unreadable settings file"),
    }
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.server_url.filter(|v| !v.trim().is_empty()) {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.poll_interval_secs.filter(|v| *v > 0) {
        settings.poll_interval_secs = v;
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("BENCH_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = var("APP__POLL_INTERVAL_SECS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) if parsed > 0 => settings.poll_interval_secs = parsed,
            _ => warn!(value = %v, "config: ignoring invalid APP__POLL_INTERVAL_SECS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_server() {
        let settings = Settings::default();
        assert_eq!(settings.server_url, "http://127.0.0.1:1337");
        assert_eq!(settings.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn app_prefixed_env_wins_over_plain() {
        let mut settings = Settings::default();
        apply_env(
            &mut settings,
            env_of(&[
                ("BENCH_SERVER_URL", "http://bench:1"),
                ("APP__SERVER_URL", "http://bench:2"),
                ("APP__POLL_INTERVAL_SECS", "30"),
            ]),
        );
        assert_eq!(settings.server_url, "http://bench:2");
        assert_eq!(settings.poll_interval_secs, 30);
    }

    #[test]
    fn invalid_interval_keeps_previous_value() {
        let mut settings = Settings::default();
        apply_env(&mut settings, env_of(&[("APP__POLL_INTERVAL_SECS", "soon")]));
        assert_eq!(settings.poll_interval_secs, 5);
        apply_env(&mut settings, env_of(&[("APP__POLL_INTERVAL_SECS", "0")]));
        assert_eq!(settings.poll_interval_secs, 5);
    }

    #[test]
    fn reads_settings_file_and_skips_garbage() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = env::temp_dir().join(format!("bench_dashboard_config_test_{suffix}"));
        fs::create_dir_all(&dir).expect("temp dir");

        let good = dir.join("good.toml");
        fs::write(&good, "server_url = \"http://bench.lan:1337\"\npoll_interval_secs = 2\n")
            .expect("write");
        let mut settings = Settings::default();
        apply_file(&mut settings, &good);
        assert_eq!(settings.server_url, "http://bench.lan:1337");
        assert_eq!(settings.poll_interval_secs, 2);

        let bad = dir.join("bad.toml");
        fs::write(&bad, "poll_interval_secs = \"often\"").expect("write");
        apply_file(&mut settings, &bad);
        assert_eq!(settings.poll_interval_secs, 2);

        apply_file(&mut settings, &dir.join("missing.toml"));
        assert_eq!(settings.server_url, "http://bench.lan:1337");

        fs::remove_dir_all(dir).expect("cleanup");
    }
}

/// Environment variable overriding the process whose window is reconciled.
pub const TARGET_PID_ENV: &str = "TITLEBAR_TARGET_PID";
/// Environment variable toggling per-rectangle logging (`1`/`true`/`on`).
pub const LOG_REGIONS_ENV: &str = "TITLEBAR_LOG_REGIONS";

/// Runtime configuration of a [`crate::PassthroughHost`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassthroughSettings {
    /// Process owning the application window. `None` uses the process
    /// reported by the platform.
    ///
    /// Backends that install their input source inside the owning process
    /// (the Win32 subclass) cannot reach another process's window, so a
    /// foreign target only makes sense for diagnostics and always ends in
    /// [`crate::SkipReason::InputSourceUnavailable`] there.
    pub process_id: Option<u32>,
    /// Emit per-rectangle events during reconciliation.
    pub log_regions: bool,
}

impl Default for PassthroughSettings {
    fn default() -> Self {
        Self { process_id: None, log_regions: cfg!(debug_assertions) }
    }
}

impl PassthroughSettings {
    /// Defaults overridden by `TITLEBAR_TARGET_PID` and `TITLEBAR_LOG_REGIONS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Self::from_env`] with a custom variable source. Values that do
    /// not parse are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        if let Some(raw) = lookup(TARGET_PID_ENV) {
            match raw.trim().parse::<u32>() {
                Ok(pid) => settings.process_id = Some(pid),
                Err(err) => tracing::debug!(%raw, %err, "ignoring {TARGET_PID_ENV}"),
            }
        }
        if let Some(raw) = lookup(LOG_REGIONS_ENV) {
            match parse_flag(&raw) {
                Some(flag) => settings.log_regions = flag,
                None => tracing::debug!(%raw, "ignoring {LOG_REGIONS_ENV}"),
            }
        }
        settings
    }

    #[must_use]
    pub fn with_process_id(mut self, process_id: u32) -> Self {
        self.process_id = Some(process_id);
        self
    }

    /// Whether the configured target is a process other than `current`.
    pub fn targets_foreign_process(&self, current: u32) -> bool {
        self.process_id.is_some_and(|pid| pid != current)
    }

    #[must_use]
    pub fn with_log_regions(mut self, log_regions: bool) -> Self {
        self.log_regions = log_regions;
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name: &str| vars.iter().find(|(key, _)| *key == name).map(|(_, value)| (*value).to_string())
    }

    #[test]
    fn defaults_follow_build_profile() {
        let settings = PassthroughSettings::default();
        assert_eq!(settings.process_id, None);
        assert_eq!(settings.log_regions, cfg!(debug_assertions));
    }

    #[rstest]
    #[case(&[("TITLEBAR_TARGET_PID", "1234")], Some(1234))]
    #[case(&[("TITLEBAR_TARGET_PID", " 77 ")], Some(77))]
    #[case(&[("TITLEBAR_TARGET_PID", "abc")], None)]
    #[case(&[], None)]
    fn target_pid_from_lookup(#[case] vars: &[(&str, &str)], #[case] expected: Option<u32>) {
        assert_eq!(PassthroughSettings::from_lookup(lookup(vars)).process_id, expected);
    }

    #[rstest]
    #[case("on", Some(true))]
    #[case("FALSE", Some(false))]
    #[case("maybe", None)]
    fn log_regions_flag(#[case] raw: &str, #[case] expected: Option<bool>) {
        let vars = [("TITLEBAR_LOG_REGIONS", raw)];
        let settings = PassthroughSettings::from_lookup(lookup(&vars));
        assert_eq!(settings.log_regions, expected.unwrap_or(cfg!(debug_assertions)));
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some(4242), false)]
    #[case(Some(1), true)]
    fn foreign_target_is_detected(#[case] process_id: Option<u32>, #[case] expected: bool) {
        let settings = PassthroughSettings { process_id, ..PassthroughSettings::default() };
        assert_eq!(settings.targets_foreign_process(4242), expected);
    }

    #[test]
    fn builders_override_fields() {
        let settings = PassthroughSettings::default().with_process_id(9).with_log_regions(true);
        assert_eq!(settings, PassthroughSettings { process_id: Some(9), log_regions: true });
    }
}

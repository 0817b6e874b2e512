use std::path::Path;

use feedback_analytics_core::AnalyticsConfig;

use crate::input::file::read_text;

/// Load `--config` as JSON or YAML, chosen by file extension. Anything that
/// is not `.yaml`/`.yml` is parsed as JSON.
pub fn load(path: &str) -> Result<AnalyticsConfig, Box<dyn std::error::Error>> {
    let (canonical, contents) = read_text(path)?;
    let config = parse(&canonical, &contents)?;
    config.validate()?;
    tracing::debug!(path = %canonical.display(), "loaded analytics config");
    Ok(config)
}

fn parse(path: &Path, contents: &str) -> Result<AnalyticsConfig, Box<dyn std::error::Error>> {
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let config = if is_yaml {
        serde_yaml::from_str(contents)
            .map_err(|e| format!("Failed to parse '{}': {}", path.display(), e))?
    } else {
        serde_json::from_str(contents)
            .map_err(|e| format!("Failed to parse '{}': {}", path.display(), e))?
    };
    Ok(config)
}

/// Fill an operation's config slot from `--config` unless the input
/// already carries its own.
pub fn inject(slot: &mut Option<AnalyticsConfig>, loaded: Option<&AnalyticsConfig>) {
    if slot.is_none() {
        *slot = loaded.cloned();
    }
}

/// Apply a command-line override on top of whatever config the input ended
/// up with, starting from defaults when there is none.
pub fn override_with(
    slot: &mut Option<AnalyticsConfig>,
    apply: impl FnOnce(&mut AnalyticsConfig),
) {
    let mut config = slot.take().unwrap_or_default();
    apply(&mut config);
    *slot = Some(config);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn write_temp(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn yaml_partial_config_keeps_defaults() {
        let file = write_temp(
            ".yaml",
            "alignment_threshold: \"0.5\"\nwindows:\n  month_days: 28\n",
        );
        let config = load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.alignment_threshold, dec!(0.5));
        assert_eq!(config.windows.month_days, 28);
        assert_eq!(config.windows.week_days, 7);
        assert_eq!(config.min_cohort_size, 5);
    }

    #[test]
    fn json_config_by_default() {
        let file = write_temp(".json", r#"{"min_cohort_size": 3}"#);
        let config = load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.min_cohort_size, 3);
        assert_eq!(config.alignment_threshold, dec!(1.0));
    }

    #[test]
    fn invalid_config_rejected() {
        let file = write_temp(".json", r#"{"min_cohort_size": 0}"#);
        assert!(load(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn inject_keeps_input_config() {
        let own = AnalyticsConfig {
            min_cohort_size: 2,
            ..AnalyticsConfig::default()
        };
        let loaded = AnalyticsConfig::default();

        let mut slot = Some(own.clone());
        inject(&mut slot, Some(&loaded));
        assert_eq!(slot, Some(own));

        let mut empty = None;
        inject(&mut empty, Some(&loaded));
        assert_eq!(empty, Some(loaded));
    }

    #[test]
    fn flag_override_beats_input_config() {
        let mut slot = Some(AnalyticsConfig {
            alignment_threshold: dec!(2),
            min_cohort_size: 3,
            ..AnalyticsConfig::default()
        });
        override_with(&mut slot, |c| c.alignment_threshold = dec!(0.5));
        let config = slot.unwrap();
        assert_eq!(config.alignment_threshold, dec!(0.5));
        assert_eq!(config.min_cohort_size, 3);

        let mut empty = None;
        override_with(&mut empty, |c| c.alignment_threshold = dec!(0.25));
        assert_eq!(empty.unwrap().alignment_threshold, dec!(0.25));
    }
}

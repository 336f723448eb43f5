//! Tests for settings validation and loading

#[cfg(test)]
mod tests {
    use crate::observability::api::NoopObservability;
    use crate::queue::api::{
        AutoScalingSettings, CapacityPolicy, EventQueueCore, QueueConfiguration, QueueError,
        QueueSettings,
    };
    use std::io::Write;
    use std::sync::Arc;

    fn assert_invalid(result: Result<QueueConfiguration, QueueError>, needle: &str) {
        match result {
            Err(QueueError::InvalidConfiguration { message }) => {
                assert!(message.contains(needle), "message was: {}", message)
            }
            other => panic!("Expected InvalidConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults() {
        let config = QueueSettings::default().validate().unwrap();

        assert_eq!(config.max_queue_depth(), 1000);
        assert_eq!(config.batch_size(), 100);
        assert!(!config.enable_observability());
        assert!(!config.enable_auto_scaling());
        assert_eq!(config.capacity_policy(), CapacityPolicy::SoftThreshold);
        assert_eq!(config.auto_scaling().pressure_window(), 3);
        assert_eq!(config.auto_scaling().growth_factor(), 1.5);
        assert_eq!(config.auto_scaling().max_scaled_depth(), 4000);
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        assert_invalid(QueueConfiguration::new(0, 10), "max_queue_depth");
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        assert_invalid(QueueConfiguration::new(10, 0), "batch_size");
    }

    #[test]
    fn test_invalid_scaling_tuning_is_rejected() {
        let with_scaling = |auto_scaling: AutoScalingSettings| QueueSettings {
            auto_scaling,
            ..QueueSettings::default()
        };

        assert_invalid(
            with_scaling(AutoScalingSettings {
                growth_factor: 1.0,
                ..AutoScalingSettings::default()
            })
            .validate(),
            "growth_factor",
        );
        assert_invalid(
            with_scaling(AutoScalingSettings {
                pressure_window: 0,
                ..AutoScalingSettings::default()
            })
            .validate(),
            "pressure_window",
        );
        assert_invalid(
            with_scaling(AutoScalingSettings {
                low_watermark: 1.5,
                ..AutoScalingSettings::default()
            })
            .validate(),
            "low_watermark",
        );
        assert_invalid(
            with_scaling(AutoScalingSettings {
                max_scaled_depth: Some(10),
                ..AutoScalingSettings::default()
            })
            .validate(),
            "max_scaled_depth",
        );
    }

    #[test]
    fn test_construction_from_invalid_settings_fails() {
        let settings = QueueSettings {
            batch_size: 0,
            ..QueueSettings::default()
        };
        let result = EventQueueCore::from_settings(Arc::new(NoopObservability), &settings);
        assert!(matches!(
            result,
            Err(QueueError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_from_toml_str_with_partial_table() {
        let settings = QueueSettings::from_toml_str(
            r#"
            max_queue_depth = 5
            enable_auto_scaling = true
            capacity_policy = "hard_reject"

            [auto_scaling]
            pressure_window = 2
            "#,
        )
        .unwrap();

        assert_eq!(settings.max_queue_depth, 5);
        assert_eq!(settings.batch_size, 100);
        assert_eq!(settings.capacity_policy, CapacityPolicy::HardReject);
        assert_eq!(settings.auto_scaling.pressure_window, 2);
        assert_eq!(settings.auto_scaling.idle_window, 5);
    }

    #[test]
    fn test_from_toml_str_rejects_unknown_policy() {
        let result = QueueSettings::from_toml_str(r#"capacity_policy = "drop_oldest""#);
        assert!(matches!(
            result,
            Err(QueueError::InvalidConfiguration { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_queue_depth = 42\nbatch_size = 7").unwrap();

        let config = QueueSettings::load(file.path())
            .await
            .unwrap()
            .validate()
            .unwrap();

        assert_eq!(config.max_queue_depth(), 42);
        assert_eq!(config.batch_size(), 7);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = QueueSettings::load(std::path::Path::new("/nonexistent/eventqueue.toml")).await;
        assert!(matches!(
            result,
            Err(QueueError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_try_from_settings() {
        let config = QueueConfiguration::try_from(QueueSettings {
            max_queue_depth: 3,
            batch_size: 1,
            ..QueueSettings::default()
        })
        .unwrap();
        assert_eq!(config.max_queue_depth(), 3);
    }
}

use super::*;
use serial_test::serial;
use std::env;
use std::time::Duration;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_feedback_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("FEEDBACK_BROKER");
        env::remove_var("FEEDBACK_BROKER_ADDR");
        env::remove_var("FEEDBACK_INPUT_TOPIC");
        env::remove_var("FEEDBACK_QUESTIONS_TOPIC");
        env::remove_var("FEEDBACK_VALIDATED_TOPIC");
        env::remove_var("FEEDBACK_CONSUMER_GROUP");
        env::remove_var("FEEDBACK_SCORE_THRESHOLD");
        env::remove_var("FEEDBACK_MAX_RETRIES");
        env::remove_var("FEEDBACK_CONNECT_RETRY_DELAY_SECS");
        env::remove_var("FEEDBACK_PUBLISH_ATTEMPTS");
        env::remove_var("FEEDBACK_PUBLISH_BACKOFF_MS");
        env::remove_var("FEEDBACK_FLUSH_EVERY");
    }
}

fn memory_config() -> Config {
    Config {
        broker: BrokerKind::Memory,
        ..Default::default()
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.broker, BrokerKind::Kafka);
    assert_eq!(config.broker_addr, "kafka:9092");
    assert_eq!(config.input_topic, "respuestas_exitosas");
    assert_eq!(config.questions_topic, "preguntas");
    assert_eq!(config.validated_topic, "respuestas_validadas");
    assert_eq!(config.consumer_group, "flink-processor-group");
    assert_eq!(config.score_threshold, 0.7);
    assert_eq!(config.max_retries, 2);
    assert_eq!(config.connect_retry_delay, Duration::from_secs(5));
    assert_eq!(config.flush_every, 1);
}

#[test]
fn test_broker_kind_parsing() {
    assert_eq!("kafka".parse::<BrokerKind>(), Ok(BrokerKind::Kafka));
    assert_eq!("KAFKA".parse::<BrokerKind>(), Ok(BrokerKind::Kafka));
    assert_eq!("memory".parse::<BrokerKind>(), Ok(BrokerKind::Memory));
    assert_eq!("local".parse::<BrokerKind>(), Ok(BrokerKind::Memory));
    assert!("rabbit".parse::<BrokerKind>().is_err());
}

#[test]
fn test_routing_policy_view() {
    let config = Config {
        score_threshold: 0.5,
        max_retries: 4,
        ..memory_config()
    };
    let policy = config.routing_policy();
    assert_eq!(policy.score_threshold(), 0.5);
    assert_eq!(policy.max_retries(), 4);
}

#[test]
fn test_controller_settings_view() {
    let config = Config {
        publish_attempts: 5,
        publish_backoff: Duration::from_millis(10),
        flush_every: 8,
        ..memory_config()
    };
    let settings = config.controller_settings();
    assert_eq!(settings.validated_topic, "respuestas_validadas");
    assert_eq!(settings.questions_topic, "preguntas");
    assert_eq!(settings.publish.attempts, 5);
    assert_eq!(settings.publish.backoff, Duration::from_millis(10));
    assert_eq!(settings.flush_every, 8);
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_feedback_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.broker_addr, "kafka:9092");
    assert_eq!(config.max_retries, 2);
    assert_eq!(config.score_threshold, 0.7);
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_feedback_env();

    with_env_vars(
        &[
            ("FEEDBACK_BROKER", "memory"),
            ("FEEDBACK_BROKER_ADDR", "localhost:19092"),
            ("FEEDBACK_INPUT_TOPIC", "answers"),
            ("FEEDBACK_SCORE_THRESHOLD", "0.85"),
            ("FEEDBACK_MAX_RETRIES", "5"),
            ("FEEDBACK_CONNECT_RETRY_DELAY_SECS", "1"),
            ("FEEDBACK_PUBLISH_BACKOFF_MS", "20"),
            ("FEEDBACK_FLUSH_EVERY", "16"),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.broker, BrokerKind::Memory);
            assert_eq!(config.broker_addr, "localhost:19092");
            assert_eq!(config.input_topic, "answers");
            assert_eq!(config.score_threshold, 0.85);
            assert_eq!(config.max_retries, 5);
            assert_eq!(config.connect_retry_delay, Duration::from_secs(1));
            assert_eq!(config.publish_backoff, Duration::from_millis(20));
            assert_eq!(config.flush_every, 16);
        },
    );
}

#[test]
#[serial]
fn test_from_env_blank_topic_keeps_default() {
    clear_feedback_env();

    with_env_vars(&[("FEEDBACK_QUESTIONS_TOPIC", "   ")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.questions_topic, "preguntas");
    });
}

#[test]
#[serial]
fn test_from_env_invalid_threshold() {
    clear_feedback_env();

    with_env_vars(&[("FEEDBACK_SCORE_THRESHOLD", "high")], || {
        let result = Config::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: "FEEDBACK_SCORE_THRESHOLD",
                ..
            })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_negative_retries_rejected() {
    clear_feedback_env();

    with_env_vars(&[("FEEDBACK_MAX_RETRIES", "-1")], || {
        let result = Config::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: "FEEDBACK_MAX_RETRIES",
                ..
            })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_unknown_broker() {
    clear_feedback_env();

    with_env_vars(&[("FEEDBACK_BROKER", "carrier-pigeon")], || {
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("carrier-pigeon"));
    });
}

#[test]
fn test_validate_default_memory_config() {
    assert!(memory_config().validate().is_ok());
}

#[test]
fn test_validate_threshold_out_of_range() {
    for value in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
        let config = Config {
            score_threshold: value,
            ..memory_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreshold { .. })
        ));
    }
}

#[test]
fn test_validate_threshold_bounds_inclusive() {
    for value in [0.0, 1.0] {
        let config = Config {
            score_threshold: value,
            ..memory_config()
        };
        assert!(config.validate().is_ok());
    }
}

#[test]
fn test_validate_zero_counts() {
    let config = Config {
        publish_attempts: 0,
        ..memory_config()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ZeroValue {
            name: "FEEDBACK_PUBLISH_ATTEMPTS"
        })
    ));

    let config = Config {
        flush_every: 0,
        ..memory_config()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ZeroValue {
            name: "FEEDBACK_FLUSH_EVERY"
        })
    ));
}

#[test]
fn test_validate_zero_max_retries_allowed() {
    let config = Config {
        max_retries: 0,
        ..memory_config()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_empty_group() {
    let config = Config {
        consumer_group: String::new(),
        ..memory_config()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::EmptyValue {
            name: "FEEDBACK_CONSUMER_GROUP"
        })
    ));
}

#[test]
fn test_validate_topic_collision() {
    let config = Config {
        validated_topic: "respuestas_exitosas".to_string(),
        ..memory_config()
    };
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::TopicCollision { .. }));
    assert!(err.to_string().contains("respuestas_exitosas"));
}

#[test]
#[cfg(feature = "kafka")]
fn test_default_config_validates() {
    let config = Config::default();
    assert_eq!(config.broker, BrokerKind::Kafka);
    assert!(config.validate().is_ok());
}

#[test]
#[cfg(not(feature = "kafka"))]
fn test_validate_kafka_backend_feature_gate() {
    assert!(matches!(
        Config::default().validate(),
        Err(ConfigError::BackendNotCompiled {
            backend: "kafka",
            feature: "kafka"
        })
    ));
}

use chrono::{Duration, NaiveDate};
use windprofiles_core::quantities::{AngleMeasure, Cardinal, Orientation, UnitSpec, ZeroReference};
use windprofiles_core::{Frequency, IngestConfig, TimeSeriesError};

#[test]
fn frequency_parses_pandas_style_strings() {
    let cases = [
        ("10min", Duration::minutes(10)),
        ("T", Duration::minutes(1)),
        ("5S", Duration::seconds(5)),
        ("30s", Duration::seconds(30)),
        ("1h", Duration::hours(1)),
        ("2H", Duration::hours(2)),
        ("1D", Duration::days(1)),
        ("250ms", Duration::milliseconds(250)),
        ("100L", Duration::milliseconds(100)),
        ("20Hz", Duration::milliseconds(50)),
    ];
    for (text, expected) in cases {
        let frequency: Frequency = text.parse().expect(text);
        assert_eq!(frequency.step(), expected, "{text}");
    }
}

#[test]
fn frequency_rejects_malformed_strings() {
    for text in ["", "10", "0min", "ten minutes", "5 fortnights", "3Hz"] {
        let err = text.parse::<Frequency>().expect_err(text);
        assert!(
            matches!(err, TimeSeriesError::InvalidFrequency { .. }),
            "{text}: {err}"
        );
    }
}

#[test]
fn toml_config_with_explicit_time_column() {
    let config = IngestConfig::from_toml_str(
        r#"
        timezone = "America/Denver"
        datetime_format = "%Y-%m-%d %H:%M:%S"
        drop_duplicate_timestamps = true

        [units]
        t = "F"
        rh = "%"
        p = "mmHg_120asl"
        wd = { measure = "deg", zero = "E", orientation = "CW" }
        "#,
    )
    .expect("parse config");

    assert_eq!(config.time_zone(), chrono_tz::America::Denver);
    assert_eq!(config.datetime_format(), Some("%Y-%m-%d %H:%M:%S"));
    assert!(config.generated_index().is_none());
    assert!(config.drop_duplicate_timestamps());
    assert!(!config.assume_canonical_units());
    assert_eq!(config.unit_for("t"), Some(&UnitSpec::named("F")));
    assert_eq!(config.unit_for("p"), Some(&UnitSpec::named("mmHg_120asl")));
    assert_eq!(
        config.unit_for("wd"),
        Some(&UnitSpec::angle(
            AngleMeasure::Degrees,
            Cardinal::East,
            Orientation::Clockwise
        ))
    );
}

#[test]
fn toml_config_with_generated_index() {
    let config = IngestConfig::from_toml_str(
        r#"
        timezone = "UTC"
        start_time = "2023-07-04 06:00"
        frequency = "10min"

        [units]
        "Wind Speed" = "knots"
        wd = { measure = "rad", zero = 15.0, orientation = "CCW" }
        "#,
    )
    .expect("parse config");

    let generated = config.generated_index().expect("generated index");
    assert_eq!(
        generated.start,
        NaiveDate::from_ymd_opt(2023, 7, 4)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap()
    );
    assert_eq!(generated.frequency.step(), Duration::minutes(10));
    assert_eq!(config.unit_for("wind-speed"), Some(&UnitSpec::named("knots")));
    assert_eq!(
        config.unit_for("wd"),
        Some(&UnitSpec::angle(
            AngleMeasure::Radians,
            ZeroReference::Degrees(15.0),
            Orientation::Counterclockwise
        ))
    );
}

#[test]
fn toml_config_rejects_partial_time_configuration() {
    let err = IngestConfig::from_toml_str(
        r#"
        timezone = "UTC"
        start_time = "2023-07-04 06:00"
        "#,
    )
    .expect_err("frequency missing");
    assert!(matches!(
        err,
        TimeSeriesError::PartialTimeConfiguration {
            present: "start_time",
            missing: "frequency"
        }
    ));
}

#[test]
fn toml_config_rejects_bad_values() {
    let err = IngestConfig::from_toml_str(r#"timezone = "Mars/Olympus_Mons""#)
        .expect_err("unknown zone");
    assert!(matches!(err, TimeSeriesError::InvalidTimezone(_)));

    let err = IngestConfig::from_toml_str(
        r#"
        timezone = "UTC"
        start_time = "yesterday"
        frequency = "1h"
        "#,
    )
    .expect_err("bad start");
    assert!(matches!(err, TimeSeriesError::InvalidStartTime(_)));

    let err = IngestConfig::from_toml_str(
        r#"
        timezone = "UTC"
        start_time = "2023-07-04"
        frequency = "every so often"
        "#,
    )
    .expect_err("bad frequency");
    assert!(matches!(err, TimeSeriesError::Config(_)));

    let err = IngestConfig::from_toml_str(
        r#"
        timezone = "UTC"
        timestamp_column = "when"
        "#,
    )
    .expect_err("unknown field");
    assert!(matches!(err, TimeSeriesError::Config(_)));
}

#[test]
fn toml_config_rejects_unit_keys_that_normalize_alike() {
    let err = IngestConfig::from_toml_str(
        r#"
        timezone = "UTC"

        [units]
        "Wind Speed" = "mph"
        "wind-speed" = "knots"
        "#,
    )
    .expect_err("colliding keys");
    match err {
        TimeSeriesError::ConflictingUnitDeclarations { first, second } => {
            assert_eq!(first, "Wind Speed");
            assert_eq!(second, "wind-speed");
        }
        other => panic!("expected ConflictingUnitDeclarations, got {other:?}"),
    }
}

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::America::New_York;
use polars::prelude::*;
use windprofiles_core::quantities::{
    AngleMeasure, Cardinal, Orientation, QuantityError, Registry, UnitSpec,
};
use windprofiles_core::{
    resolve_column, ColumnBinding, Frequency, IngestConfig, TimeSeries, TimeSeriesError,
    TIME_COLUMN,
};

fn registry() -> Arc<Registry> {
    Arc::new(Registry::standard().expect("standard registry"))
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

fn assert_all_close(actual: &[Option<f64>], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (value, want) in actual.iter().zip(expected) {
        assert_close(value.expect("non-null value"), *want);
    }
}

fn east_clockwise() -> UnitSpec {
    UnitSpec::angle(AngleMeasure::Degrees, Cardinal::East, Orientation::Clockwise)
}

fn station_frame() -> DataFrame {
    df![
        "time" => ["2024-01-01 00:00:00", "2024-01-01 00:10:00", "2024-01-01 00:20:00"],
        "t" => [32.0, 50.0, 212.0],
        "rh" => [50.0, 100.0, 0.0],
        "wd" => [0.0, 90.0, 300.0],
        "logger_battery" => [12.1, 12.0, 11.9],
    ]
    .expect("station frame")
}

fn station_config() -> IngestConfig {
    IngestConfig::new(chrono_tz::UTC)
        .with_unit("t", "F")
        .with_unit("rh", "%")
        .with_unit("wd", east_clockwise())
}

#[test]
fn ingest_converts_every_bound_column_to_canonical_units() {
    let series = TimeSeries::ingest(&registry(), &station_frame(), &station_config())
        .expect("ingest station frame");

    let kelvin: Vec<f64> = [32.0, 50.0, 212.0]
        .iter()
        .map(|f| (f - 32.0) * 5.0 / 9.0 + 273.15)
        .collect();
    assert_all_close(&series.values("t").expect("t"), &kelvin);
    assert_all_close(&series.values("rh").expect("rh"), &[0.5, 1.0, 0.0]);
    assert_all_close(&series.values("wd").expect("wd"), &[90.0, 180.0, 30.0]);

    let names: Vec<&str> = series.bindings().iter().map(|b| b.name()).collect();
    assert_eq!(names, ["t", "rh", "wd"]);
    assert_eq!(series.height(), 3);
}

#[test]
fn ingest_drops_unmapped_columns_with_warning() {
    let series = TimeSeries::ingest(&registry(), &station_frame(), &station_config())
        .expect("ingest station frame");

    assert_eq!(
        series.warnings(),
        ["Dropped column logger_battery (no matching variable found)"]
    );
    assert!(series.canonical().column("logger_battery").is_err());
}

#[test]
fn canonical_frame_leads_with_utc_time_column() {
    let series = TimeSeries::ingest(&registry(), &station_frame(), &station_config())
        .expect("ingest station frame");

    let frame = series.canonical();
    assert_eq!(frame.get_column_names()[0].as_str(), TIME_COLUMN);
    assert_eq!(
        frame.column(TIME_COLUMN).expect("time column").dtype(),
        &DataType::Datetime(TimeUnit::Microseconds, Some(polars::prelude::TimeZone::UTC))
    );
    assert_eq!(
        series.index()[1],
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 10, 0).unwrap()
    );
}

#[test]
fn column_names_resolve_through_variable_aliases() {
    let registry = registry();
    assert_eq!(resolve_column(&registry, "Wind-Direction"), resolve_column(&registry, "wd"));
    assert_eq!(resolve_column(&registry, "DateTime"), ColumnBinding::Timestamp);
    assert_eq!(resolve_column(&registry, "battery"), ColumnBinding::Unmapped);
    assert!(matches!(
        resolve_column(&registry, "Relative Humidity"),
        ColumnBinding::Measurement(_)
    ));
}

#[test]
fn two_columns_for_one_variable_is_ambiguous() {
    let frame = df![
        "time" => ["2024-01-01 00:00:00"],
        "t" => [10.0],
        "temp" => [11.0],
    ]
    .expect("frame");
    let config = IngestConfig::new(chrono_tz::UTC)
        .with_unit("t", "C")
        .with_unit("temp", "C");

    let err = TimeSeries::ingest(&registry(), &frame, &config).expect_err("ambiguous");
    match err {
        TimeSeriesError::AmbiguousBinding {
            column,
            existing,
            variable,
        } => {
            assert_eq!(column, "temp");
            assert_eq!(existing, "t");
            assert_eq!(variable, "Temperature");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn two_time_columns_are_ambiguous() {
    let frame = df![
        "time" => ["2024-01-01 00:00:00"],
        "datetime" => ["2024-01-01 00:00:00"],
    ]
    .expect("frame");
    let config = IngestConfig::new(chrono_tz::UTC);

    let err = TimeSeries::ingest(&registry(), &frame, &config).expect_err("ambiguous");
    assert!(matches!(err, TimeSeriesError::AmbiguousBinding { .. }));
}

#[test]
fn missing_time_source_is_fatal() {
    let frame = df!["t" => [10.0, 11.0]].expect("frame");
    let config = IngestConfig::new(chrono_tz::UTC).with_unit("t", "C");

    let err = TimeSeries::ingest(&registry(), &frame, &config).expect_err("no time source");
    assert!(matches!(err, TimeSeriesError::MissingTimeConfiguration));
}

#[test]
fn undeclared_unit_is_fatal_unless_canonical_is_assumed() {
    let frame = df![
        "time" => ["2024-01-01 00:00:00"],
        "ws" => [3.5],
    ]
    .expect("frame");

    let strict = IngestConfig::new(chrono_tz::UTC);
    let err = TimeSeries::ingest(&registry(), &frame, &strict).expect_err("missing unit");
    assert!(matches!(err, TimeSeriesError::MissingUnit { ref column, .. } if column == "ws"));

    let lenient = IngestConfig::new(chrono_tz::UTC).with_assume_canonical_units(true);
    let series = TimeSeries::ingest(&registry(), &frame, &lenient).expect("assume canonical");
    assert_all_close(&series.values("wind speed").expect("ws"), &[3.5]);
    assert_eq!(series.warnings().len(), 1);
    assert!(series.warnings()[0].contains("m/s"));
    assert!(series.binding("ws").expect("bound").declared().is_none());
}

#[test]
fn declared_unit_from_another_dimension_is_rejected() {
    let frame = df![
        "time" => ["2024-01-01 00:00:00"],
        "t" => [10.0],
    ]
    .expect("frame");
    let config = IngestConfig::new(chrono_tz::UTC).with_unit("t", "kPa");

    let err = TimeSeries::ingest(&registry(), &frame, &config).expect_err("mismatch");
    assert!(matches!(
        err,
        TimeSeriesError::DimensionMismatch { ref found, .. } if found == "Pressure"
    ));
}

#[test]
fn declared_unknown_unit_is_unsupported() {
    let frame = df![
        "time" => ["2024-01-01 00:00:00"],
        "t" => [10.0],
    ]
    .expect("frame");
    let config = IngestConfig::new(chrono_tz::UTC).with_unit("t", "kelvins");

    let err = TimeSeries::ingest(&registry(), &frame, &config).expect_err("unsupported");
    assert!(matches!(err, TimeSeriesError::UnsupportedUnit { ref unit, .. } if unit == "kelvins"));
}

#[test]
fn declared_units_match_normalized_column_names() {
    let frame = df![
        "time" => ["2024-01-01 00:00:00"],
        "Wind Speed" => [10.0],
    ]
    .expect("frame");
    let config = IngestConfig::new(chrono_tz::UTC).with_unit("wind_speed", "knots");

    let series = TimeSeries::ingest(&registry(), &frame, &config).expect("ingest");
    assert_all_close(&series.values("ws").expect("ws"), &[5.14444]);
}

#[test]
fn sea_level_pressure_is_reduced_to_station_pressure() {
    let frame = df![
        "time" => ["2024-01-01 00:00:00"],
        "p" => [1013.25],
    ]
    .expect("frame");
    let config = IngestConfig::new(chrono_tz::UTC).with_unit("p", "hPa_0asl");

    let series = TimeSeries::ingest(&registry(), &frame, &config).expect("ingest");
    assert_all_close(&series.values("pressure").expect("p"), &[101.325]);

    let high = IngestConfig::new(chrono_tz::UTC).with_unit("p", UnitSpec::sea_level("hPa", 1500.0));
    let series = TimeSeries::ingest(&registry(), &frame, &high).expect("ingest");
    let station = series.values("p").expect("p")[0].expect("value");
    assert!(station < 101.325 * 0.9 && station > 101.325 * 0.8, "got {station}");
}

#[test]
fn non_numeric_cells_become_nulls_with_warning() {
    let frame = df![
        "time" => ["2024-01-01 00:00:00", "2024-01-01 00:10:00"],
        "rh" => ["45", "bad"],
    ]
    .expect("frame");
    let config = IngestConfig::new(chrono_tz::UTC).with_unit("rh", "%");

    let series = TimeSeries::ingest(&registry(), &frame, &config).expect("ingest");
    let values = series.values("rh").expect("rh");
    assert_close(values[0].expect("first"), 0.45);
    assert!(values[1].is_none());
    assert!(series.warnings()[0].contains("non-numeric"));
}

#[test]
fn local_timestamps_are_localized_to_the_configured_zone() {
    let frame = df![
        "time" => ["2024-07-01 12:00:00", "2024-01-15 12:00:00"],
        "t" => [20.0, 0.0],
    ]
    .expect("frame");
    let config = IngestConfig::new(New_York).with_unit("t", "C");

    let series = TimeSeries::ingest(&registry(), &frame, &config).expect("ingest");
    let index = series.index();
    assert_eq!(index[0], Utc.with_ymd_and_hms(2024, 7, 1, 16, 0, 0).unwrap());
    assert_eq!(index[1], Utc.with_ymd_and_hms(2024, 1, 15, 17, 0, 0).unwrap());

    let local = series.local_index();
    assert_eq!(local[0].naive_local(), NaiveDate::from_ymd_opt(2024, 7, 1).unwrap().and_hms_opt(12, 0, 0).unwrap());
}

#[test]
fn repeated_local_hour_resolves_to_earlier_instant() {
    let frame = df![
        "time" => ["2024-11-03 01:30:00"],
        "t" => [5.0],
    ]
    .expect("frame");
    let config = IngestConfig::new(New_York).with_unit("t", "C");

    let series = TimeSeries::ingest(&registry(), &frame, &config).expect("ingest");
    assert_eq!(series.index()[0], Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap());
}

#[test]
fn skipped_local_hour_is_an_invalid_timestamp() {
    let frame = df![
        "time" => ["2024-03-10 01:30:00", "2024-03-10 02:30:00"],
        "t" => [5.0, 6.0],
    ]
    .expect("frame");
    let config = IngestConfig::new(New_York).with_unit("t", "C");

    let err = TimeSeries::ingest(&registry(), &frame, &config).expect_err("gap");
    assert!(matches!(err, TimeSeriesError::InvalidTimestamp { row: 1, .. }));
}

#[test]
fn explicit_datetime_format_is_used() {
    let frame = df![
        "Date_Time" => ["01.02.2024 06:00", "01.02.2024 06:30"],
        "ws" => [1.0, 2.0],
    ]
    .expect("frame");
    let config = IngestConfig::new(chrono_tz::UTC)
        .with_datetime_format("%d.%m.%Y %H:%M")
        .with_unit("ws", "m/s");

    let series = TimeSeries::ingest(&registry(), &frame, &config).expect("ingest");
    assert_eq!(series.index()[0], Utc.with_ymd_and_hms(2024, 2, 1, 6, 0, 0).unwrap());
}

#[test]
fn offset_timestamps_keep_their_own_offset() {
    let frame = df![
        "time" => ["2024-07-01T12:00:00-04:00"],
        "ws" => [1.0],
    ]
    .expect("frame");
    let config = IngestConfig::new(chrono_tz::Europe::Berlin).with_unit("ws", "m/s");

    let series = TimeSeries::ingest(&registry(), &frame, &config).expect("ingest");
    assert_eq!(series.index()[0], Utc.with_ymd_and_hms(2024, 7, 1, 16, 0, 0).unwrap());
}

#[test]
fn generated_index_spans_rows_at_fixed_frequency() {
    let frame = df!["ws" => [1.0, 2.0, 3.0]].expect("frame");
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let frequency: Frequency = "10min".parse().expect("frequency");
    let config = IngestConfig::new(chrono_tz::UTC)
        .with_unit("ws", "m/s")
        .with_generated_index(start, frequency);

    let series = TimeSeries::ingest(&registry(), &frame, &config).expect("ingest");
    let micros = series.index_micros();
    assert_eq!(micros.len(), 3);
    assert_eq!(micros[1] - micros[0], 600_000_000);
    assert_eq!(micros[2] - micros[1], 600_000_000);
    assert_eq!(series.index()[0], Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
}

#[test]
fn explicit_time_column_wins_over_generated_index() {
    let frame = df![
        "time" => ["2024-05-05 08:00:00"],
        "ws" => [1.0],
    ]
    .expect("frame");
    let start = NaiveDate::from_ymd_opt(2000, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let config = IngestConfig::new(chrono_tz::UTC)
        .with_unit("ws", "m/s")
        .with_generated_index(start, "1h".parse().expect("frequency"));

    let series = TimeSeries::ingest(&registry(), &frame, &config).expect("ingest");
    assert_eq!(series.index()[0], Utc.with_ymd_and_hms(2024, 5, 5, 8, 0, 0).unwrap());
}

#[test]
fn duplicate_timestamps_keep_first_row_when_enabled() {
    let frame = df![
        "time" => ["2024-01-01 00:00:00", "2024-01-01 00:00:00", "2024-01-01 00:10:00"],
        "ws" => [1.0, 2.0, 3.0],
    ]
    .expect("frame");
    let config = IngestConfig::new(chrono_tz::UTC)
        .with_unit("ws", "m/s")
        .with_drop_duplicate_timestamps(true);

    let series = TimeSeries::ingest(&registry(), &frame, &config).expect("ingest");
    assert_eq!(series.height(), 2);
    assert_eq!(series.index_micros().len(), 2);
    assert_all_close(&series.values("ws").expect("ws"), &[1.0, 3.0]);
    assert_eq!(series.warnings(), ["Dropped 1 rows with duplicate timestamps"]);

    let kept = IngestConfig::new(chrono_tz::UTC).with_unit("ws", "m/s");
    let series = TimeSeries::ingest(&registry(), &frame, &kept).expect("ingest");
    assert_eq!(series.height(), 3);
}

#[test]
fn failed_ingestion_does_not_touch_the_registry() {
    let registry = registry();
    let frame = df!["t" => [10.0]].expect("frame");
    let config = IngestConfig::new(chrono_tz::UTC).with_unit("t", "C");

    let _ = TimeSeries::ingest(&registry, &frame, &config).expect_err("no time source");
    assert_eq!(Arc::strong_count(&registry), 1);
    assert!(registry.variable("t").is_some());
}

#[test]
fn unbound_and_unknown_variables_are_distinguished() {
    let series = TimeSeries::ingest(&registry(), &station_frame(), &station_config())
        .expect("ingest station frame");

    let err = series.series("ws").expect_err("not bound");
    assert!(matches!(err, TimeSeriesError::UnboundVariable(ref name) if name == "Wind Speed"));

    let err = series.series("battery").expect_err("unknown");
    assert!(matches!(
        err,
        TimeSeriesError::Quantity(QuantityError::UnknownVariable(_))
    ));
}

#[test]
fn lookup_by_variable_matches_lookup_by_alias() {
    let registry = registry();
    let series = TimeSeries::ingest(&registry, &station_frame(), &station_config())
        .expect("ingest station frame");

    let variable = registry.require_variable("Wind Direction").expect("variable");
    let by_variable = series.variable_series(variable).expect("by variable");
    let by_alias = series.series("wdir").expect("by alias");
    assert_eq!(by_variable.name(), by_alias.name());
    assert_eq!(by_alias.name().as_str(), "wd");
}

#[test]
fn deduplication_also_sorts_rows_by_time() {
    let frame = df![
        "time" => ["2024-01-01 00:20:00", "2024-01-01 00:00:00", "2024-01-01 00:10:00", "2024-01-01 00:00:00"],
        "ws" => [3.0, 1.0, 2.0, 9.0],
    ]
    .expect("frame");
    let config = IngestConfig::new(chrono_tz::UTC)
        .with_unit("ws", "m/s")
        .with_drop_duplicate_timestamps(true);

    let series = TimeSeries::ingest(&registry(), &frame, &config).expect("ingest");
    assert_all_close(&series.values("ws").expect("ws"), &[1.0, 2.0, 3.0]);
    let micros = series.index_micros();
    assert!(micros.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(series.warnings(), ["Dropped 1 rows with duplicate timestamps"]);
}

#[test]
fn builder_unit_keys_that_normalize_alike_are_rejected() {
    let frame = df![
        "time" => ["2024-01-01 00:00:00"],
        "Wind Speed" => [10.0],
    ]
    .expect("frame");
    let config = IngestConfig::new(chrono_tz::UTC)
        .with_unit("wind_speed", "knots")
        .with_unit("Wind Speed", "mph");

    let err = TimeSeries::ingest(&registry(), &frame, &config).expect_err("colliding keys");
    assert!(matches!(
        err,
        TimeSeriesError::ConflictingUnitDeclarations { ref first, ref second }
            if first == "Wind Speed" && second == "wind_speed"
    ));
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn time_series_can_cross_threads() {
    assert_send_sync::<TimeSeries>();
    assert_send_sync::<IngestConfig>();
}

#[test]
fn concurrent_ingestions_share_one_registry() {
    let registry = registry();
    let config = station_config();

    let results: Vec<Vec<Option<f64>>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let config = &config;
                scope.spawn(move || {
                    let series = TimeSeries::ingest(&registry, &station_frame(), config)
                        .expect("ingest on worker thread");
                    series.values("t").expect("t")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker finished"))
            .collect()
    });

    assert_eq!(results[0], results[1]);
    assert_all_close(&results[0], &[273.15, 283.15, 373.15]);
    assert_eq!(Arc::strong_count(&registry), 1);
}

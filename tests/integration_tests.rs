use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use traffic_modeler::curves::curve::DEFAULT_SAMPLES;
use traffic_modeler::network::SumoNetwork;
use traffic_modeler::output::{read_records, write_records};
use traffic_modeler::parser::DateFilter;
use traffic_modeler::time_slot::TimeSlot;
use traffic_modeler::{ModelError, ModelType, ModelerConfig, TrafficModeler};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn config(date: &str, slot: &str, model: ModelType) -> ModelerConfig {
    ModelerConfig::new(fixture("traffic.csv"), fixture("network.net.xml"))
        .with_date(date.parse::<DateFilter>().unwrap())
        .with_time_slot(slot.parse::<TimeSlot>().unwrap())
        .with_model_type(model)
}

#[test]
fn test_full_pipeline() {
    let modeler =
        TrafficModeler::<SumoNetwork>::from_config(&config("2024-02-01", "08:00-12:00", ModelType::Greenshield))
            .expect("Failed to build model");

    assert_eq!(modeler.len(), 3);
    let e1 = &modeler.records()[0];
    assert_eq!(e1.edge_id, "E1");
    assert_eq!(e1.lane_count, 2);
    assert_eq!(e1.flow, (180 + 190 + 200 + 210).to_string());
    assert!((e1.vehicles_per_second - 780.0 / (4.0 * 3600.0)).abs() < 1e-12);
    assert_eq!(modeler.network().len(), 3);
}

#[test]
fn test_single_hour_scenario() {
    let modeler =
        TrafficModeler::<SumoNetwork>::from_config(&config("2024-02-03", "07:00-08:00", ModelType::Greenshield))
            .unwrap();

    assert_eq!(modeler.len(), 1);
    let r = &modeler.records()[0];
    assert_eq!(r.flow, "360");
    assert!((r.vehicles_per_second - 0.1).abs() < 1e-12);
    assert!((r.max_density - 0.2667).abs() < 1e-4);
    assert!((r.velocity - 13.515).abs() < 1e-3);
    assert!((r.norm_velocity - 0.973).abs() < 1e-3);
}

#[test]
fn test_whole_day_default_slot() {
    let config = ModelerConfig::new(fixture("traffic.csv"), fixture("network.net.xml"))
        .with_date("2024-02-02".parse().unwrap());
    let modeler = TrafficModeler::<SumoNetwork>::from_config(&config).unwrap();

    let expected: u64 = (0..24).map(|h| 200 + h * 10).sum();
    assert_eq!(modeler.records()[0].flow_count(), Some(expected));
    assert_eq!(modeler.time_slot(), TimeSlot::default());
}

#[test]
fn test_save_and_reload() {
    let modeler =
        TrafficModeler::<SumoNetwork>::from_config(&config("2024-02", "07:00-09:00", ModelType::Underwood))
            .unwrap();

    let path = env::temp_dir().join("traffic_modeler_it_records.csv");
    let _ = fs::remove_file(&path);

    write_records(&path, modeler.records(), ',').unwrap();
    let back = read_records(&path, ',').unwrap();

    assert_eq!(back.len(), modeler.len());
    for (a, b) in modeler.records().iter().zip(&back) {
        assert_eq!(a.edge_id, b.edge_id);
        assert_eq!(a.flow, b.flow);
        assert!((a.velocity - b.velocity).abs() <= 0.5e-4 + 1e-12);
        assert!((a.density - b.density).abs() <= 0.5e-4 + 1e-12);
    }

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_curves_grouped_by_speed_limit() {
    let modeler =
        TrafficModeler::<SumoNetwork>::from_config(&config("2024-02-01", "07:00-08:00", ModelType::Greenshield))
            .unwrap();
    let groups = modeler.curves(DEFAULT_SAMPLES);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].record_count, 2);
    assert_eq!(groups[0].mean_lane_count, 1.5);
    assert_eq!(groups[0].curve.v_max_kmh, 50.0);
    assert_eq!(groups[1].curve.v_max_kmh, 30.0);
    assert_eq!(groups[1].curve.points().count(), DEFAULT_SAMPLES);
}

#[test]
fn test_unknown_edge_aborts_without_output() {
    let data = env::temp_dir().join("traffic_modeler_it_unknown_edge.csv");
    let output = env::temp_dir().join("traffic_modeler_it_unknown_edge_out.csv");
    let _ = fs::remove_file(&output);

    fs::write(
        &data,
        "data;edge_id;07:00-08:00\n2024-02-01;E1;10\n2024-02-01;E404;20\n",
    )
    .unwrap();

    let config = ModelerConfig::new(&data, fixture("network.net.xml"))
        .with_time_slot("07:00-08:00".parse().unwrap());
    let result = TrafficModeler::<SumoNetwork>::from_config(&config)
        .and_then(|m| write_records(&output, m.records(), ','));

    assert!(matches!(result, Err(ModelError::Data(_))));
    assert!(!output.exists());

    fs::remove_file(&data).unwrap();
}

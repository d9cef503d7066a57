mod common;

use std::collections::HashSet;

use aoa_core::manifest::{manifest_path, RunManifest};
use aoa_core::model::{ItemCategory, ListId};
use aoa_core::output::OUTPUT_COLUMNS;
use aoa_core::pipeline::{prepare_study, run};
use aoa_core::records::ItemRecord;
use aoa_core::WrangleError;
use common::{ParticipantFixture, PAGES};

fn records_of<'a>(records: &'a [ItemRecord], id: &str) -> Vec<&'a ItemRecord> {
    records.iter().filter(|r| r.participant.id == id).collect()
}

#[test]
fn list_a_participant_yields_one_row_per_item() {
    let study = common::write_study(&[ParticipantFixture::new("101", Some(ListId::A))]);
    let prepared = prepare_study(&study.layout(), &study.config).expect("prepare");
    let (records, counts) = prepared.records().expect("records");

    assert_eq!(records.len(), 10 + 30 + 3 + 25);
    assert_eq!(records.len(), PAGES.rows_per_participant());
    assert_eq!(counts.seen, 1);
    assert_eq!(counts.emitted, 1);

    assert!(records.iter().all(|r| r.participant.id == "101"));
    for record in &records {
        let repeated = record.category == ItemCategory::Repeated;
        assert_eq!(record.repetition == 1, repeated);
    }

    // Block order: familiarization, list, control, repeated.
    let categories: Vec<ItemCategory> = records.iter().map(|r| r.category).collect();
    assert_eq!(categories[0], ItemCategory::Familiarization);
    assert_eq!(categories[10], ItemCategory::List);
    assert_eq!(categories[40], ItemCategory::Control);
    assert_eq!(categories[43], ItemCategory::Repeated);
}

#[test]
fn orders_are_unique_contiguous_and_match_the_rotation() {
    let study = common::write_study(&[
        ParticipantFixture::new("1", Some(ListId::A)),
        ParticipantFixture::new("2", Some(ListId::B)),
        ParticipantFixture::new("3", Some(ListId::C)),
    ]);
    let prepared = prepare_study(&study.layout(), &study.config).expect("prepare");
    let (records, _) = prepared.records().expect("records");

    for (id, list) in [("1", ListId::A), ("2", ListId::B), ("3", ListId::C)] {
        let rows = records_of(&records, id);
        assert_eq!(rows.len(), PAGES.rows_per_participant());

        let orders: Vec<u32> = rows.iter().map(|r| r.order.expect("order")).collect();
        let unique: HashSet<u32> = orders.iter().copied().collect();
        assert_eq!(unique.len(), orders.len(), "participant {id} has duplicate orders");
        let expected: HashSet<u32> = (1..=PAGES.rows_per_participant() as u32).collect();
        assert_eq!(unique, expected, "participant {id} orders are not contiguous");

        // Control item `s1` is page 1 of the list phase.
        let control = rows.iter().find(|r| r.item_number == Some(1)).expect("control row");
        assert_eq!(control.order, Some(common::list_position_of_page(1)));

        // Familiarization page 1 is the umlaut word.
        let fam = rows.iter().find(|r| r.word == common::UMLAUT_WORD).expect("fam row");
        assert_eq!(fam.order, Some(common::familiarization_position_of_page(1)));

        let first_item = common::list_items(list)[0];
        let item_rows: Vec<_> = rows.iter().filter(|r| r.item_number == Some(first_item)).collect();
        assert_eq!(item_rows.len(), 2, "first list item is also repeated");
        assert_ne!(item_rows[0].order, item_rows[1].order);
    }
}

#[test]
fn times_follow_the_page_layout_of_each_list() {
    let study = common::write_study(&[
        ParticipantFixture::new("1", Some(ListId::A)),
        ParticipantFixture::new("2", Some(ListId::B)),
    ]);
    let prepared = prepare_study(&study.layout(), &study.config).expect("prepare");
    let (records, _) = prepared.records().expect("records");

    let time_of = |id: &str, category: ItemCategory, item: u32| {
        records
            .iter()
            .find(|r| {
                r.participant.id == id && r.category == category && r.item_number == Some(item)
            })
            .and_then(|r| r.time)
    };
    // Lists-table TIMEnnn cells hold their own page number.
    assert_eq!(time_of("1", ItemCategory::Control, 2), Some(2.0));
    assert_eq!(time_of("1", ItemCategory::List, 101), Some(4.0));
    assert_eq!(time_of("1", ItemCategory::Repeated, 101), Some(34.0));
    assert_eq!(time_of("2", ItemCategory::Repeated, 201), Some(4.0));
    assert_eq!(time_of("2", ItemCategory::List, 201), Some(29.0));

    let fam = records.iter().find(|r| r.word == common::UMLAUT_WORD).expect("fam");
    assert_eq!(fam.time, Some(6.0));
    assert_eq!(fam.estimate, Some(common::FAMILIARIZATION_RATING));
    assert_eq!(fam.item_number, None);
}

#[test]
fn unlisted_participants_emit_nothing() {
    let study = common::write_study(&[
        ParticipantFixture::new("1", None),
        ParticipantFixture::new("2", Some(ListId::C)),
    ]);
    let prepared = prepare_study(&study.layout(), &study.config).expect("prepare");
    let (records, counts) = prepared.records().expect("records");

    assert!(records_of(&records, "1").is_empty());
    assert_eq!(records_of(&records, "2").len(), PAGES.rows_per_participant());
    assert_eq!(counts.seen, 2);
    assert_eq!(counts.emitted, 1);
    assert_eq!(counts.skipped, 1);
}

#[test]
fn missing_list_phase_record_emits_rows_with_null_ratings() {
    let study = common::write_study(&[
        ParticipantFixture::new("1", Some(ListId::A)).without_lists_record(),
    ]);
    let prepared = prepare_study(&study.layout(), &study.config).expect("prepare");
    let (records, counts) = prepared.records().expect("records");

    assert_eq!(records.len(), PAGES.rows_per_participant());
    assert_eq!(counts.unmatched, 1);
    for record in &records {
        assert_eq!(record.participant.time_sum, common::SURVEY_TIME_SUM);
        assert!(!record.participant.finished);
        assert!(record.participant.violation);
        if record.category == ItemCategory::Familiarization {
            assert!(record.estimate.is_some());
        } else {
            assert_eq!(record.estimate, None);
            assert_eq!(record.time, None);
        }
    }
}

#[test]
fn missing_ratings_stay_missing() {
    let study = common::write_study(&[
        ParticipantFixture::new("1", Some(ListId::A)).blank_lists("W101_01").blank_lists("TIME004"),
    ]);
    let prepared = prepare_study(&study.layout(), &study.config).expect("prepare");
    let (records, _) = prepared.records().expect("records");
    let row = records
        .iter()
        .find(|r| r.category == ItemCategory::List && r.item_number == Some(101))
        .expect("row");
    assert_eq!(row.estimate, None);
    assert_eq!(row.time, None);
}

#[test]
fn partial_rotation_leaves_orders_empty() {
    let column = format!("{}_{:02}", common::rotation_prefix(ListId::A), 1);
    let study = common::write_study(&[
        ParticipantFixture::new("1", Some(ListId::A)).survey(&column, ""),
    ]);
    let prepared = prepare_study(&study.layout(), &study.config).expect("prepare");
    let report = prepared.check().expect("check");
    assert_eq!(report.orders_checked, 1);
    assert_eq!(report.partial_orders, 1);

    let (records, _) = prepared.records().expect("records");
    assert_eq!(records.len(), PAGES.rows_per_participant());
    assert_eq!(records.iter().filter(|r| r.order.is_none()).count(), 1);
}

#[test]
fn run_writes_dataset_and_manifest() {
    let study = common::write_study(&[
        ParticipantFixture::new("1", Some(ListId::A)).with_children(&["4", "7"]),
        ParticipantFixture::new("2", None),
    ]);
    let layout = study.layout();
    let summary = run(&layout, &study.config).expect("run");
    assert_eq!(summary.rows, PAGES.rows_per_participant());
    assert_eq!(summary.output, layout.output);

    let mut reader = csv::Reader::from_path(&layout.output).expect("output");
    let headers: Vec<String> =
        reader.headers().expect("headers").iter().map(str::to_string).collect();
    assert_eq!(headers, OUTPUT_COLUMNS.to_vec());

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.expect("record")).collect();
    assert_eq!(rows.len(), PAGES.rows_per_participant());
    let first = &rows[0];
    let cell = |name: &str| {
        let index = OUTPUT_COLUMNS.iter().position(|c| *c == name).expect("column");
        first.get(index).expect("cell").to_string()
    };
    assert_eq!(cell("ID"), "1");
    assert_eq!(cell("item_number"), "");
    assert_eq!(cell("repetition"), "0");
    assert_eq!(cell("platform"), "Prolific");
    assert_eq!(cell("list"), "A");
    assert_eq!(cell("gender"), "female");
    assert_eq!(cell("country"), "Germany");
    assert_eq!(cell("L1"), "1");
    assert_eq!(cell("monoling"), "1");
    assert_eq!(cell("lang_dis"), "0");
    assert_eq!(cell("sight"), "normal");
    assert_eq!(cell("children"), "1");
    assert_eq!(cell("child_age"), "[4, 7]");
    assert_eq!(cell("time_sum"), "1500");
    assert_eq!(cell("finished"), "1");
    assert_eq!(cell("violation"), "0");

    let manifest_file = manifest_path(&layout.output);
    assert_eq!(summary.manifest.as_ref(), Some(&manifest_file));
    let manifest = RunManifest::read(&manifest_file).expect("manifest");
    assert_eq!(manifest.config_name, "fixture");
    assert_eq!(manifest.rows, PAGES.rows_per_participant());
    assert_eq!(manifest.participants.seen, 2);
    assert_eq!(manifest.participants.skipped, 1);
    assert_eq!(manifest.inputs.len(), 12);
    assert!(manifest.inputs.iter().all(|d| d.sha256.len() == 64));
}

#[test]
fn run_without_listed_participants_writes_only_the_header() {
    let mut study = common::write_study(&[ParticipantFixture::new("1", None)]);
    study.config.output.manifest = false;
    let layout = study.layout();
    let summary = run(&layout, &study.config).expect("run");
    assert_eq!(summary.rows, 0);
    assert_eq!(summary.manifest, None);

    let body = std::fs::read_to_string(&layout.output).expect("output");
    assert_eq!(body.trim_end(), OUTPUT_COLUMNS.join(","));
    assert!(!manifest_path(&layout.output).exists());
}

#[test]
fn missing_input_fails_before_reading() {
    let study = common::write_study(&[ParticipantFixture::new("1", Some(ListId::A))]);
    let layout = study.layout();
    std::fs::remove_file(&layout.legend).expect("remove legend");
    let err = prepare_study(&layout, &study.config).unwrap_err();
    assert!(matches!(err, WrangleError::Io { ref path, .. } if *path == layout.legend));
}

#[test]
fn check_reports_lookup_sizes() {
    let study = common::write_study(&[ParticipantFixture::new("1", Some(ListId::B))]);
    let prepared = prepare_study(&study.layout(), &study.config).expect("prepare");
    let report = prepared.check().expect("check");

    let names: Vec<&str> = report.lookups.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names[0], "familiarization");
    assert_eq!(names[1], "control");
    assert_eq!(report.lookups.len(), 8);
    let control = &report.lookups[1];
    assert_eq!(control.entries, 3);
    assert_eq!(control.first_column.as_deref(), Some("WS01_01"));
    assert_eq!(control.last_column.as_deref(), Some("WS03_01"));
    assert!(report.expected_rows.iter().all(|r| r.rows == PAGES.rows_per_participant()));
    assert_eq!(report.partial_orders, 0);
}

use cardash::{App, AppEvent, LoadOptions, Page};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use polars::prelude::*;
use std::fs::File;
use std::path::PathBuf;
use std::sync::mpsc;
use tempfile::TempDir;

fn write_csv(path: &PathBuf, df: &mut DataFrame) {
    let mut file = File::create(path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();
}

fn sample_frames() -> (DataFrame, DataFrame) {
    let clean = df!(
        "Price" => [5.0_f64, 10.0, 7.0],
        "Company_Name" => ["BrandA", "BrandB", "BrandA"],
        "Kilometers_Driven" => [40000_i64, 52000, 31000],
        "Year" => [2018_i64, 2019, 2020],
        "Power_value" => [88.0_f64, 102.0, 95.0],
        "Fuel_Type" => ["Petrol", "Diesel", "Petrol"],
        "Transmission" => ["Manual", "Automatic", "Manual"],
    )
    .unwrap();
    // The raw file carries extra uncleaned columns; only the preview uses it.
    let raw = df!(
        "Price" => [5.0_f64, 10.0, 7.0],
        "Company_Name" => ["BrandA", "BrandB", "BrandA"],
        "Kilometers_Driven" => [40000_i64, 52000, 31000],
        "Year" => [2018_i64, 2019, 2020],
        "Power_value" => [88.0_f64, 102.0, 95.0],
        "Fuel_Type" => ["Petrol", "Diesel", "Petrol"],
        "Transmission" => ["Manual", "Automatic", "Manual"],
        "Listing_Notes" => ["one owner", "", "serviced"],
    )
    .unwrap();
    (raw, clean)
}

fn loaded_app() -> (TempDir, App) {
    let dir = TempDir::new().unwrap();
    let (mut raw, mut clean) = sample_frames();
    let raw_path = dir.path().join("raw.csv");
    let clean_path = dir.path().join("clean.csv");
    write_csv(&raw_path, &mut raw);
    write_csv(&clean_path, &mut clean);

    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx);
    let follow_up = app.event(&AppEvent::Load(raw_path, clean_path, LoadOptions::default()));
    assert!(follow_up.is_none());
    (dir, app)
}

fn press(app: &mut App, code: KeyCode) -> Option<AppEvent> {
    app.event(&AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

#[test]
fn test_load_then_filter_brand_and_years() {
    let (_dir, mut app) = loaded_app();
    assert_eq!(app.working_rows(), Some(3));

    app.event(&AppEvent::Key(KeyEvent::new(
        KeyCode::Char('2'),
        KeyModifiers::NONE,
    )));
    assert_eq!(app.page(), Page::Analysis);

    // Deselect every brand, then re-select only BrandA (first in the list).
    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.working_rows(), Some(0));
    press(&mut app, KeyCode::Char(' '));
    assert_eq!(app.working_rows(), Some(2));

    // The KPI row reflects the filtered selection: (5.0 + 7.0) / 2.
    let area = ratatui::layout::Rect::new(0, 0, 140, 30);
    let mut buf = ratatui::buffer::Buffer::empty(area);
    ratatui::widgets::Widget::render(&mut app, area, &mut buf);
    let content: String = buf.content().iter().map(|c| c.symbol()).collect();
    assert!(content.contains("6.00"), "mean price tile should show 6.00");
}

#[test]
fn test_missing_required_column_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let mut incomplete = df!(
        "Price" => [5.0_f64],
        "Company_Name" => ["BrandA"],
        "Year" => [2018_i64],
    )
    .unwrap();
    let path = dir.path().join("clean.csv");
    write_csv(&path, &mut incomplete);

    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx);
    let follow_up = app.event(&AppEvent::Load(
        path.clone(),
        path,
        LoadOptions::default(),
    ));
    match follow_up {
        Some(AppEvent::Crash(msg)) => {
            assert!(msg.contains("Kilometers_Driven"), "unexpected message: {msg}");
        }
        _ => panic!("expected a crash event for a schema violation"),
    }
    assert_eq!(app.working_rows(), None);
}

#[test]
fn test_insights_ignore_filters() {
    let (_dir, mut app) = loaded_app();
    press(&mut app, KeyCode::Char('2'));
    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.working_rows(), Some(0));

    // The insights page still renders facts from the full dataset.
    press(&mut app, KeyCode::Char('3'));
    let area = ratatui::layout::Rect::new(0, 0, 120, 30);
    let mut buf = ratatui::buffer::Buffer::empty(area);
    ratatui::widgets::Widget::render(&mut app, area, &mut buf);
    let content: String = buf.content().iter().map(|c| c.symbol()).collect();
    assert!(content.contains("3")); // total records
    assert!(content.contains("BrandB")); // most expensive brand, unfiltered
}

#[test]
fn test_resize_and_unknown_keys_are_inert() {
    let (_dir, mut app) = loaded_app();
    assert!(app.event(&AppEvent::Resize(80, 24)).is_none());
    assert!(press(&mut app, KeyCode::Char('z')).is_none());
    assert_eq!(app.working_rows(), Some(3));
}

#[test]
fn test_quit_from_any_page() {
    let (_dir, mut app) = loaded_app();
    for page_key in [KeyCode::Char('1'), KeyCode::Char('2'), KeyCode::Char('3')] {
        press(&mut app, page_key);
        assert!(matches!(
            press(&mut app, KeyCode::Char('q')),
            Some(AppEvent::Exit)
        ));
    }
}

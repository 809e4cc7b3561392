use pagekit::chunks::process_in_chunks;
use pagekit::debounce::debounce;
use pagekit::dom::memory::{MemoryElement, MemoryViewport};
use pagekit::dom::{Element, Rect};
use pagekit::price::format_price;
use pagekit::prop_scale::{prop_scale, EnvMode};
use pagekit::viewport::{is_element_in_viewport, scrollbar_width};
use pagekit::Config;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[test]
fn test_config_drives_helpers() {
    let config = Config::default().with_overrides(|key| match key {
        "PAGEKIT_LOCALE" => Some("en-US".to_string()),
        "PAGEKIT_ENV" => Some("development".to_string()),
        _ => None,
    });

    let price = format_price(&config.price_options(12345.0).currency_after());
    assert_eq!(price, "12,345.00 CHF");

    let prop = prop_scale(1.0, &[1.0, 2.0, 3.0], &config.env_mode);
    assert!(prop.validate("3"));
    assert!(!prop.validate("4"));

    let element = MemoryElement::new(Rect::new(50.0, 50.0, 150.0, 150.0));
    let element: &dyn Element = &element;
    let visible = is_element_in_viewport(
        Some(element),
        &MemoryViewport::default(),
        &config.viewport_spacing,
        false,
    )
    .unwrap();
    assert!(visible);
}

#[test]
fn test_scrollbar_width_from_viewport() {
    let viewport = MemoryViewport::new(1000.0, 700.0).with_client_width(983.0);
    assert_eq!(scrollbar_width(&viewport), 17.0);
}

#[tokio::test(start_paused = true)]
async fn test_debounced_chunk_flush() {
    let flushed = Arc::new(Mutex::new(Vec::new()));
    let runs = Arc::new(AtomicUsize::new(0));

    let sink = flushed.clone();
    let counter = runs.clone();
    let flush = debounce(
        move |items: Vec<u32>| {
            counter.fetch_add(1, Ordering::SeqCst);
            sink.lock().unwrap().extend(items);
        },
        Duration::from_millis(50),
        false,
    );

    let items: Vec<u32> = (0..10).collect();
    let summary = process_in_chunks(
        &items,
        4,
        |chunk| {
            flush.call(chunk.to_vec());
            async { Ok(()) }
        },
        false,
    )
    .await
    .unwrap();
    assert_eq!(summary.chunks, 3);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(*flushed.lock().unwrap(), vec![8, 9]);
}

#[test]
fn test_env_mode_from_config_file_value() {
    let mode: EnvMode = serde_json::from_str("\"production\"").unwrap();
    assert!(prop_scale(1.0, &[1.0], &mode).validator.is_none());
}

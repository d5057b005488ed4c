use std::env;
use std::error::Error;
use std::time::Instant;

use metricate::{Document, MetricateConfig, convert_text_with, watch_document};
use tracing_subscriber::EnvFilter;

const SAMPLE_SENTENCES: &[&str] = &[
    "The trail is 5 miles long.",
    "Set the oven to 350°F.",
    "She is 5' 10\" tall.",
    "Weight: 2-3 lbs.",
    "The shelf is 10 x 20 x 30 in.",
];

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .json()
        .init();

    let config = match env::args().nth(1) {
        Some(path) => MetricateConfig::from_file(path)?,
        None => MetricateConfig::default(),
    };

    for sentence in SAMPLE_SENTENCES {
        println!("{}", convert_text_with(sentence, &config.convert)?);
    }

    let doc = Document::new();
    let body = doc.body();
    let script = doc.append_element(&body, "script")?;
    doc.append_text(&script, "var distance = '5 miles';")?;
    let input = doc.append_element(&body, "textarea")?;
    doc.append_text(&input, "Typed: 3 feet")?;
    let p = doc.append_element(&body, "p")?;
    doc.append_text(&p, "Drive 65 mph for 120 miles.")?;

    let start = Instant::now();
    let (mut watcher, initial) = watch_document(&doc, body.clone(), &config)?;

    let li = doc.append_element(&body, "li")?;
    doc.append_text(&li, "Add 12 fl oz of water")?;
    let fired = watcher.pump(&doc, start);
    let rescan = watcher.pump(&doc, start + config.annotate.debounce());
    watcher.detach(&doc);

    println!("{}", doc.to_html());
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "initial": initial,
            "early_pump": fired,
            "rescan": rescan,
        }))?
    );

    Ok(())
}

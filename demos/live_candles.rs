//! Live candles in the terminal: seeds the series, then prints the table
//! tail and summary tile as the stream updates it.
//!
//! ```bash
//! cargo run --example live_candles -- BTCUSDT 5m 4h
//! RUST_LOG=binance_candles=debug cargo run --example live_candles
//! ```
//!
//! Press Ctrl-C to stop. A CSV of the final view is written to the
//! working directory.

use std::time::Duration;

use binance_candles::prelude::*;
use tracing_subscriber::EnvFilter;

const TAIL: usize = 5;

fn parse_args() -> Result<Selection, SdkError> {
    let mut args = std::env::args().skip(1);
    let symbol = match args.next() {
        Some(s) => Symbol::new(&s)?,
        None => Symbol::default(),
    };
    let interval = match args.next() {
        Some(s) => s.parse::<Interval>()?,
        None => Interval::default(),
    };
    let range = match args.next() {
        Some(s) => s.parse::<Range>()?,
        None => Range::default(),
    };
    Ok(Selection::new(symbol, interval, range))
}

fn print_view(view: &ViewSnapshot) {
    let summary = view.summary();
    println!(
        "\n{} [{}] last {} {} | 24h high {} low {} vol {} quote {}",
        summary.symbol,
        view.status_label(),
        summary.last,
        summary.change_percent,
        summary.high,
        summary.low,
        summary.volume,
        summary.quote_volume,
    );

    if let Some(error) = &view.error {
        println!("  ! {}", error);
    }
    if view.loading {
        println!("  loading...");
        return;
    }
    if view.shows_placeholder() {
        println!("  No data");
        return;
    }

    let rows = view.rows();
    for row in rows.iter().skip(rows.len().saturating_sub(TAIL)) {
        println!(
            "  {} {:>16} {:>16} {:>16} {:>16} {:>14} {}",
            row.time,
            row.open,
            row.high,
            row.low,
            row.close,
            row.volume,
            row.direction.as_str()
        );
    }
    println!("  {} bars (max {})", rows.len(), view.window.max_bars);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    dotenvy::dotenv().ok();

    let selection = parse_args()?;

    let mut builder = CandlesClient::builder();
    if let Ok(url) = std::env::var("BINANCE_API_URL") {
        builder = builder.base_url(&url);
    }
    if let Ok(url) = std::env::var("BINANCE_WS_URL") {
        builder = builder.ws_url(&url);
    }
    let client = builder.build()?;

    let controller = Controller::spawn(client, selection);
    let mut view = controller.subscribe();
    let mut ticker = tokio::time::interval(Duration::from_secs(2));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = ticker.tick() => {
                let snapshot = view.borrow_and_update().clone();
                print_view(&snapshot);
            }
        }
    }

    let last = controller.snapshot();
    let path = last.csv_file_name();
    std::fs::write(&path, last.csv())?;
    println!("\nWrote {} ({} rows)", path, last.series.len());

    controller.shutdown().await;
    Ok(())
}

//! One-shot history load: prints the bars for a window and its CSV.
//!
//! ```bash
//! cargo run --example history --features http -- ETHUSDT 15m 1d
//! ```

use binance_candles::prelude::*;
use binance_candles::view::table;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let symbol = Symbol::new(&args.next().unwrap_or_else(|| "ETHUSDT".to_string()))?;
    let interval: Interval = args.next().as_deref().unwrap_or("1m").parse()?;
    let range: Range = args.next().as_deref().unwrap_or("1h").parse()?;

    let mut builder = CandlesClient::builder();
    if let Ok(url) = std::env::var("BINANCE_API_URL") {
        builder = builder.base_url(&url);
    }
    let client = builder.build()?;

    let now = chrono::Utc::now().timestamp_millis();
    let window = compute_window(interval, range, now);
    if window.is_narrowed() {
        println!(
            "note: {} of {} bars fit in one request; showing the most recent",
            window.max_bars,
            window.nominal_bars()
        );
    }

    let bars = client.klines().history(&symbol, &window).await?;
    let series = Series::from_history(bars, window.start);

    println!("{}", to_csv(&table::rows(&series)));
    println!("\n{}: {} bars", csv_file_name(&symbol, interval, range), series.len());
    Ok(())
}

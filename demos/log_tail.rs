//! Live tail of a local log service.
//!
//! Connects to `ws://<origin host>:<port>`, keeps the last `--lines` log
//! lines in a widget, and prints the widget whenever it changes.
//!
//! Usage:
//!   cargo run --example log_tail -- --port 8081 --lines 20 [--debug] [--no-wait]

mod common;

use std::time::Duration;

use anyhow::Context;
use tws_monitor::{Element, Monitor, Page, RenderMode, WidgetBinding};

use common::{Args, init_logging, wait_for_exit};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let page = Page::shared();
    let (tail, last_alert, status) = {
        let mut page = page.lock();
        let tail = page.insert_widget(&WidgetBinding::default().max_lines(args.lines));
        let last_alert =
            page.insert_widget(&WidgetBinding::new("log", "alert").mode(RenderMode::Replace));
        let status = page.insert(Element::status().with_text("OFFLINE"));
        (tail, last_alert, status)
    };

    let monitor = Monitor::builder()
        .origin(args.origin.as_str())
        .service_port(args.port)
        .spawn(page.clone())
        .context("failed to start monitor")?;

    println!("[Monitor] origin={} port={}", args.origin, args.port);

    let printer = {
        let page = page.clone();
        tokio::spawn(async move {
            let mut last = String::new();
            let mut ticker = tokio::time::interval(Duration::from_millis(250));
            loop {
                ticker.tick().await;

                let snapshot = {
                    let page = page.lock();
                    format!(
                        "[{}] alert: {}\n{}",
                        page.text_of(status).unwrap_or_default(),
                        page.text_of(last_alert).unwrap_or_default(),
                        page.text_of(tail).unwrap_or_default(),
                    )
                };

                if snapshot != last {
                    println!("\n{snapshot}");
                    last = snapshot;
                }
            }
        })
    };

    wait_for_exit(args.no_wait).await;

    printer.abort();
    monitor.shutdown().await;
    println!("[Monitor] stopped");

    Ok(())
}

//! HTML fixtures and configuration shared by the integration tests.

use konut_scrapers::ScraperConfig;
use std::io;
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;
use wiremock::MockServer;

/// Search results page with one anchor per href and one price per text.
pub fn search_page(hrefs: &[Option<&str>], prices: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| match href {
            Some(href) => format!(r#"<a class="_3qUI9q" href="{}">İlan</a>"#, href),
            None => r#"<a class="_3qUI9q">İlan</a>"#.to_string(),
        })
        .collect();
    let prices: String = prices
        .iter()
        .map(|price| format!(r#"<p class="_2C5UCT"><span>{}</span></p>"#, price))
        .collect();

    format!("<html><body><div>{}</div><div>{}</div></body></html>", anchors, prices)
}

/// Detail page carrying the given label/value rows plus one unlisted attribute.
pub fn detail_page(rows: &[(&str, &str)]) -> String {
    let cells: String = std::iter::once(("İlan Numarası", "123456"))
        .chain(rows.iter().copied())
        .map(|(label, value)| {
            format!(
                r#"<div class="_1bVOdb">{}</div><div class="_1bVOdb">{}</div>"#,
                label, value
            )
        })
        .collect();

    format!("<html><body><section>{}</section></body></html>", cells)
}

pub fn complete_detail_page(net_area: &str, rooms: &str) -> String {
    detail_page(&[
        ("Net Metrekare", net_area),
        ("Bulunduğu Kat", "3. Kat"),
        ("Oda Sayısı", rooms),
        ("Isıtma Tipi", "Kombi (Doğalgaz)"),
        ("Banyo Sayısı", "1"),
        ("Eşya Durumu", "Eşyalı"),
        ("Site İçerisinde", "Evet"),
        ("Balkon Durumu", "Var"),
    ])
}

pub fn test_config(server: &MockServer) -> ScraperConfig {
    ScraperConfig {
        base_url: server.uri(),
        max_retries: 0,
        retry_backoff_ms: 1,
        timeout_secs: 5,
        ..ScraperConfig::default()
    }
}

/// Formatted log lines written by the library crates while a capture is active.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn lines(&self) -> Vec<String> {
        let buffer = self.0.lock().unwrap();
        String::from_utf8_lossy(&buffer)
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Lines logged at `level` ("ERROR", "WARN", ...).
    pub fn count(&self, level: &str) -> usize {
        self.lines()
            .iter()
            .filter(|line| line.trim_start().starts_with(level))
            .count()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Route konut log events on this thread into a buffer until the guard drops.
/// Pair with the default current-thread `#[tokio::test]` runtime.
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("konut_core=trace,konut_scrapers=trace"))
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    (logs, tracing::subscriber::set_default(subscriber))
}

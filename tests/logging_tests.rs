use inspection_report::report::prepare_report;
use inspection_report::request::ReportRequest;
use std::io;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn warnings_while<F: FnOnce()>(f: F) -> String {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let sink = Capture(buf.clone());
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || sink.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = buf.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn missing_recurring_clusters_is_logged_as_warning() {
    let req = ReportRequest::from_json(
        r#"{"observations": [{"category": "Fire", "location": "A"}, {"category": "Slip", "location": "B"}]}"#,
    )
    .unwrap();
    let logs = warnings_while(|| {
        let prepared = prepare_report(&req);
        assert!(prepared.recurring_issues.is_empty());
    });
    assert!(logs.contains("WARN"), "{logs}");
    assert!(logs.contains("no recurring clusters"), "{logs}");
}

#[test]
fn recurring_clusters_produce_no_clustering_warning() {
    let req = ReportRequest::from_json(
        r#"{"observations": [{"category": "Fire", "location": "A"}, {"category": "Fire", "location": "A"}, {"category": "Fire", "location": "A"}]}"#,
    )
    .unwrap();
    let logs = warnings_while(|| {
        prepare_report(&req);
    });
    assert!(!logs.contains("no recurring clusters"), "{logs}");
}

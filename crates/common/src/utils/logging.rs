use tracing_subscriber::{fmt, fmt::MakeWriter, EnvFilter};

const DEFAULT_FILTER: &str = "info,service=info,objects=info,sqlx=warn";

/// Compact, human-readable logs sent to `writer`.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info,service=info,objects=info`
///
/// Binaries that print results on stdout pass `std::io::stderr` here.
pub fn init_logging_default<W>(writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(writer)
        .try_init();
}

/// JSON lines, one object per event, sent to `writer`.
/// - Normalization rejections are logged at debug under `objects::normalize`
pub fn init_logging_json<W>(writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    // 可通过 RUST_LOG 覆盖，例如 RUST_LOG=info,objects::normalize=debug
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_ansi(false)
        .json()
        .with_writer(writer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().map_err(|_| io::Error::other("poisoned"))?.extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    #[test]
    fn events_go_to_the_given_writer() {
        let captured = Captured::default();
        let sink = captured.clone();
        init_logging_json(move || sink.clone());

        tracing::warn!(event = "writer_check", "routed to writer");

        let out = String::from_utf8(captured.0.lock().expect("lock").clone()).expect("utf8");
        let line = out.lines().find(|l| l.contains("routed to writer")).expect("event captured");
        let parsed: serde_json::Value = serde_json::from_str(line).expect("json line");
        assert_eq!(parsed["level"], "WARN");
    }
}

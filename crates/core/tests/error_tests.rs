// ═══════════════════════════════════════════════════════════════════
// Error Tests: CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use portfolio_tracker_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn corrupt_store() {
        let err = CoreError::CorruptStore("unexpected end of input".into());
        assert_eq!(err.to_string(), "Snapshot store is corrupt: unexpected end of input");
    }

    #[test]
    fn invalid_timestamp() {
        let err = CoreError::InvalidTimestamp("yesterday".into());
        assert_eq!(
            err.to_string(),
            "Invalid timestamp 'yesterday': expected YYYY-MM-DD HH:MM[:SS]"
        );
    }

    #[test]
    fn config() {
        let err = CoreError::Config("anchor_day must be between 1 and 31, got 0".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: anchor_day must be between 1 and 31, got 0"
        );
    }

    #[test]
    fn api() {
        let err = CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "API error (Yahoo Finance): rate limited");
    }

    #[test]
    fn no_provider() {
        let err = CoreError::NoProvider("Dividends".into());
        assert_eq!(err.to_string(), "No provider available for: Dividends");
    }

    #[test]
    fn timeout() {
        let err = CoreError::Timeout("Frankfurter rate USD/ILS".into());
        assert_eq!(err.to_string(), "Request to Frankfurter rate USD/ILS timed out");
    }

    #[test]
    fn no_snapshots() {
        assert_eq!(
            CoreError::NoSnapshots.to_string(),
            "No usable snapshot data, no report producible"
        );
    }

    #[test]
    fn invalid_window() {
        let err = CoreError::InvalidWindow { label: "7d".into() };
        assert_eq!(err.to_string(), "Invalid window '7d': start must be before end");
    }

    #[test]
    fn empty_window() {
        let err = CoreError::EmptyWindow {
            label: "12/23 - 01/24".into(),
            reason: "no snapshot at or before window start".into(),
        };
        assert_eq!(
            err.to_string(),
            "Window '12/23 - 01/24' is empty: no snapshot at or before window start"
        );
    }

    #[test]
    fn undefined_return() {
        let err = CoreError::UndefinedReturn {
            context: "cumulative return".into(),
        };
        assert_eq!(
            err.to_string(),
            "Return undefined for cumulative return: base value is zero"
        );
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::FileIO(ref msg) if msg.contains("denied")));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<Vec<u32>>("[1, 2").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn question_mark_propagates_io_error() {
        fn read_missing() -> Result<Vec<u8>, CoreError> {
            Ok(std::fs::read("/definitely/not/a/real/path/stock_history.json")?)
        }
        assert!(matches!(read_missing(), Err(CoreError::FileIO(_))));
    }
}

// ── Trait behaviour ─────────────────────────────────────────────────

mod traits {
    use super::*;

    #[test]
    fn is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&CoreError::NoSnapshots);
    }

    #[test]
    fn is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoreError>();
    }

    #[test]
    fn debug_includes_variant_name() {
        let err = CoreError::UndefinedReturn {
            context: "asset AAPL".into(),
        };
        assert!(format!("{err:?}").contains("UndefinedReturn"));
    }
}

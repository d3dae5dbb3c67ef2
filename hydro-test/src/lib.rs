use std::sync::Once;

pub use hydro_test_macros::test;
pub use tokio;

static INIT: Once = Once::new();

/// Initialize logging and the panic handler, only the first call has any effect.
pub fn setup_test() {
    INIT.call_once(|| {
        color_backtrace::install();

        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Info)
            .filter_module("hydro_service", log::LevelFilter::Trace)
            .parse_default_env()
            .try_init();

        log::debug!("test environment ready");
    });
}

//! Sets up `env_logger`. `setup()`/`setup_with_filter()` may be called
//! multiple times; only the first call takes effect.

use std::sync::Once;

static INIT: Once = Once::new();

pub fn setup_with_filter(filter: &str) {
    INIT.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::new().default_filter_or(filter)).init();
    });
}

pub fn setup() {
    setup_with_filter("error");
}

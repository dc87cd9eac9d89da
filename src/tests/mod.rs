mod batch_tests;

static ONCE: std::sync::Once = std::sync::Once::new();

pub(crate) fn init_logger() {
    ONCE.call_once(|| {
        colog::default_builder()
            .filter_level(log::LevelFilter::Trace)
            .init()
    });
}

/// Keeps only ASCII digits, for comparing formatted forms of one number.
pub(crate) fn ascii_digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Which output format `setup_logging` picks: pretty for development,
/// JSON for production. Binaries decide the value from their own
/// configuration and pass it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-allocate the node store sized for about this many nodes.
    pub store_capacity: usize,
    /// Print a summary line after each compute when enabled.
    pub profile_summary: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_capacity: 4096,
            profile_summary: false,
        }
    }
}

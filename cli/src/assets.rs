/// Product catalog compiled into the binary, used when no catalog file is configured.
pub const CATALOG_SEED: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/catalog.csv"));

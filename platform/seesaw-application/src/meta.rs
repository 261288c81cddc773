pub const ENGINE_NAME: &str = "seesaw";

pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub const XRD: &str = "XDG_RUNTIME_DIR";

const FALLBACK_RUNTIME_DIR: &str = "/tmp";

pub fn xrd() -> String {
    match std::env::var(XRD) {
        Ok(d) if !d.is_empty() => d,
        _ => FALLBACK_RUNTIME_DIR.to_string(),
    }
}

/// Milliseconds since the Unix epoch. Effect expiry, move cooldowns, and
/// round timers all use this clock; tests feed synthetic values instead.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

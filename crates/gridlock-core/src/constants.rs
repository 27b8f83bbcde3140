/// Side length of the shared play grid. All player coordinates live in
/// `[0, GRID_SIZE)` on both axes.
pub const GRID_SIZE: i32 = 20;

/// Simulation tick rate driven by the scheduler.
pub const TICK_RATE_HZ: u32 = 20;

/// Tick period in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 1000 / TICK_RATE_HZ as u64;

/// Anti-flood move throttle for an unmodified player.
pub const BASE_MOVE_COOLDOWN_MS: u64 = 100;

/// Move throttle while a `slow` effect is active.
pub const SLOWED_MOVE_COOLDOWN_MS: u64 = 250;

/// Move throttle for an infected player with sprint active.
pub const SPRINT_MOVE_COOLDOWN_MS: u64 = 50;

/// Room codes are this many base-36 uppercase characters.
pub const ROOM_CODE_LEN: usize = 6;

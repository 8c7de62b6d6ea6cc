// --- File: constants.rs ---
// --- Global Simulation Constants ---
pub const MAP_WIDTH: f32 = 1280.0;
pub const MAP_HEIGHT: f32 = 800.0;

// Simulation time is measured in milliseconds.
pub const FIXED_TIMESTEP_MS: f32 = 1000.0 / 60.0;
pub const MINUTE_MS: f32 = 60_000.0;

// Reject-and-retry budget per spawn candidate.
pub const PLACEMENT_ATTEMPTS: usize = 100;

pub const DEFAULT_SPEEDS: [u32; 3] = [1, 2, 4];
pub const MONTH_TIME_MS: f32 = 5000.0;
pub const START_MONTH: u32 = 3;

// --- Weather ---
pub const RAIN_CHECK_INTERVAL_MS: f32 = 10_000.0;
pub const RAIN_MIN_DURATION_MS: f32 = 6000.0;
pub const RAIN_MAX_DURATION_MS: f32 = 20_000.0;
pub const RAINDROP_COUNT: usize = 150;
pub const RAINDROP_FLOOR_MARGIN: f32 = 100.0;
pub const COLOR_BLEND_RATE: f32 = 0.02;

// Background tints per season, in cycle order.
pub const SEASON_COLORS: [[u8; 3]; 4] = [
    [200, 240, 190], // Spring
    [250, 240, 180], // Summer
    [250, 215, 170], // Autumn
    [205, 225, 245], // Winter
];

// --- Plants ---
// Per-step winter wither chance before the harshness factor.
pub const BASE_WITHER_PROBABILITY: f64 = 0.001;

// --- Herbivore escape steering ---
pub const EDGE_MARGIN: f32 = 60.0;
pub const ESCAPE_WEIGHT: f32 = 1.0;
pub const BOUNDARY_WEIGHT: f32 = 1.2;
pub const MAX_ESCAPE_NOISE: f32 = std::f32::consts::PI / 20.0;
pub const MIN_ESCAPE_NOISE: f32 = std::f32::consts::PI / 30.0;
pub const PREDATOR_WEIGHT_EPSILON: f32 = 1e-3;

// --- Disasters ---
pub const FIRST_DISASTER_INTERVAL_MS: f32 = 20_000.0;
pub const HARSH_WINTER_EXTENSION_MS: f32 = 5000.0;
// Later disasters arrive after a whole number of seconds in this range.
pub const MIN_DISASTER_SECS: u32 = 30;
pub const MAX_DISASTER_SECS: u32 = 50;
pub const NOTICE_FLICKER_MS: f32 = 4000.0;
pub const NOTICE_HOLD_MS: f32 = 3000.0;
pub const NOTICE_FADE_MS: f32 = 1000.0;
pub const NOTICE_FLICKER_CYCLES: f32 = 3.0;

// --- Crafting ---
pub const CRAFT_TIME_MS: f32 = 10_000.0;

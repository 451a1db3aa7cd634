// Rating ranges
pub const RATING_FLOOR: f64 = 1.0;
pub const RATING_CEILING: f64 = 99.0;
pub const MATCH_RATING_FLOOR: f64 = 0.0;
pub const MATCH_RATING_CEILING: f64 = 100.0;

// ITA
pub const SEGMENT_DARTS_PER_STEP: usize = 9;
pub const DOUBLES_MISS_DARTS: f64 = 6.0;
/// (mean darts to first hit, rating)
pub const DOUBLES_BREAKPOINTS: [(f64, f64); 6] =
    [(1.0, 100.0), (2.0, 90.0), (3.0, 70.0), (4.0, 50.0), (5.0, 30.0), (6.0, 0.0)];
/// (mean darts above minimum, rating)
pub const CHECKOUT_BREAKPOINTS: [(f64, f64); 6] =
    [(0.0, 100.0), (1.0, 80.0), (2.0, 60.0), (3.0, 40.0), (4.0, 20.0), (10.0, 0.0)];
/// Checkout targets for steps 1..=5 of the assessment routine
pub const CHECKOUT_TARGETS: [i32; 5] = [61, 40, 32, 16, 8];
/// Minimum darts needed to finish each of [`CHECKOUT_TARGETS`]
pub const CHECKOUT_MIN_DARTS: [i32; 5] = [2, 1, 1, 1, 1];
pub const ITA_SESSION_NAMES: [&str; 2] = ["ita", "initial training assessment"];

// Training progression, lower bounds of each session-percentage bracket
pub const PROGRESSION_BRACKETS: [(f64, i32); 4] = [(300.0, 3), (200.0, 2), (100.0, 1), (50.0, 0)];
pub const PROGRESSION_BELOW_FLOOR: i32 = -1;

// Checkout expectation
pub const CHECKOUT_DOUBLE_THRESHOLD: i32 = 40;
pub const CHECKOUT_LOGISTIC_K: f64 = 3.0;
pub const DEFAULT_CHECKOUT_THROWS: i32 = 9;
pub const DEFAULT_CHECKOUT_ATTEMPTS: i32 = 9;

// Match rating (provisional)
pub const MR_BASE: f64 = 50.0;
pub const MR_LEG_SHARE_SCALE: f64 = 40.0;
pub const MR_WIN_BONUS: f64 = 5.0;
pub const MR_OPPONENT_SCALE: f64 = 0.15;
pub const MR_AVERAGE_SCALE: f64 = 5.0;
pub const MR_DOUBLES_SCALE: f64 = 4.0;
pub const DEFAULT_OPPONENT_STRENGTH: f64 = 50.0;
/// (best of N legs, weight)
pub const FORMAT_WEIGHTS: [(i32, f64); 4] = [(5, 1.0), (7, 1.1), (9, 1.2), (11, 1.3)];
pub const DEFAULT_FORMAT_WEIGHT: f64 = 1.0;
pub const OUT_OF_BAND_FACTOR: f64 = 0.8;
pub const BAND_TOLERANCE: i32 = 10;
pub const MIN_ELIGIBLE_BEST_OF: i32 = 5;

// OMR
pub const OMR_WINDOW: usize = 10;
pub const OMR_TRIM_THRESHOLD: usize = 6;

// PR
pub const PR_TRAINING_WEIGHT: f64 = 1.0;
pub const PR_MATCH_WEIGHT: f64 = 1.0;

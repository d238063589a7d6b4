//! Service-wide defaults and limits.

/// Requests admitted per identity inside one rate-limit window.
pub const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 20;

/// Rate-limit window length in seconds.
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Maximum number of files accepted in a single conversion request.
pub const DEFAULT_MAX_FILES: usize = 20;

/// Per-file upload ceiling (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Aggregate upload ceiling across one batch (50 MiB).
pub const DEFAULT_MAX_TOTAL_SIZE_BYTES: usize = 50 * 1024 * 1024;

/// Content types accepted on the image conversion endpoint.
pub const DEFAULT_ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
];

/// WebP quality bounds exposed to callers.
pub const MIN_QUALITY: u8 = 60;
pub const MAX_QUALITY: u8 = 100;
pub const DEFAULT_QUALITY: u8 = 80;

/// libwebp effort/method setting (0 = fast, 6 = slowest/best).
pub const DEFAULT_WEBP_METHOD: u8 = 6;

/// Header carrying the shared API key.
pub const API_KEY_HEADER: &str = "x-api-key";

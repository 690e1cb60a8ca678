pub mod analytics;
pub mod config;
pub mod error;
pub mod identity;
pub mod login;
pub mod params;
pub mod server;
pub mod storage;
pub mod usecases;

// Test-only printing helper: expands to eprintln! during tests and debug builds.
#[cfg(any(test, debug_assertions))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ( eprintln!($($arg)*) );
}

// In release builds, provide a no-op tprintln! so calls compile without effect.
#[cfg(not(any(test, debug_assertions)))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ({
        if false { let _ = format!($($arg)*); }
    });
}

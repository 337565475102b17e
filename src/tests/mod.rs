//! Randomized tests that drive the engine and containers against
//! `std::collections` models.

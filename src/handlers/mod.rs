// handlers/mod.rs - two tiers: public (no cookie) and protected (`require_auth`)
pub mod protected;
pub mod public;

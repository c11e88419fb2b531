// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (bearer token, any role) → Elevated (admin role)
//
// The role carried by the token is trusted; identity is established upstream.
pub mod public;    // Tier 1: /, /health
pub mod protected; // Tier 2: /api/menu
pub mod elevated;  // Tier 3: /api/menu/items/*

// handlers/elevated/mod.rs - Elevated handlers (admin role required)
//
// Security Level: JWT Authentication + admin role
// Route Prefix: /api/menu/items
// Middleware: jwt_auth_middleware → require_admin_middleware

pub mod menu_items;

pub use menu_items::*;

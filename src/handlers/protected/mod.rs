// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Security Level: JWT Authentication Required (any role)
// Route Prefix: /api/menu
// Middleware: jwt_auth_middleware injects AuthUser

pub mod menu;

pub use menu::visible_menu;

/// Router Module Index
///
/// One module per access area. The modules only register routes; who may reach them is
/// decided by the access table evaluated in the global middleware, so moving a route
/// between modules never changes its protection by accident.

/// Routes reachable by anyone: views, login surface, health.
pub mod public;

/// Routes under the user area prefix. Require the USER role.
pub mod user;

/// Routes under the admin area prefix. Require the ADMIN role.
pub mod admin;

/// JSON API. Requires a login unless the user listing was made public in configuration.
pub mod api;

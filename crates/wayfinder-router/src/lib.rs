//! # Wayfinder Router
//!
//! A route-template table for the Wayfinder harness.
//!
//! [`RouteTable`] implements [`wayfinder_core::Router`], so it can be handed
//! straight to the resolution engine. Templates support literals, named
//! parameters with inline constraints, optional and defaulted parameters, and
//! a trailing catch-all.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use wayfinder_router::RouteTable;
//!
//! let mut table = RouteTable::new();
//! table
//!     .map(Method::GET, "users/{id:int}", "Users", "Get")
//!     .unwrap()
//!     .map_route("default", "{controller=Home}/{action=Index}/{id?}", [("area", "")])
//!     .unwrap();
//!
//! let data = table.match_path(&Method::GET, "/users/5").unwrap();
//! assert_eq!(data.value("action"), Some("Get"));
//!
//! let data = table.match_path(&Method::GET, "/").unwrap();
//! assert_eq!(data.value("controller"), Some("Home"));
//! ```
//!
//! ## Route Priority
//!
//! 1. **Literal segments** (e.g., `users/me`)
//! 2. **Constrained parameters** (e.g., `users/{id:int}`)
//! 3. **Plain parameters** (e.g., `users/{id}`)
//! 4. **Optional or defaulted parameters** (e.g., `{id?}`)
//! 5. **Catch-alls** (e.g., `files/{*path}`)

#![doc(html_root_url = "https://docs.rs/wayfinder-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod constraint;
mod error;
mod table;
mod template;

pub use constraint::RouteConstraint;
pub use error::{RoutingError, TemplateError};
pub use table::{RouteEntry, RouteTable, RoutingOptions};
pub use template::{Parameter, RouteTemplate, Segment};

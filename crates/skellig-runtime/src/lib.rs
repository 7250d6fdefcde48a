//! Host runtime for Node-API native add-ons.
//!
//! Skellig plays the role the Node.js engine plays for a `.node` add-on:
//! it owns every script-side value, implements the `napi_*` function
//! family the add-on links against, and marshals calls across the
//! native/host boundary. The loader hands an add-on's
//! `napi_register_module_v1` the registration context from
//! [`Runtime::registration`]; afterwards the host reaches the exports
//! through [`Runtime::exports`] and [`Runtime::call`].
//!
//! ## Usage
//!
//! ```ignore
//! use skellig_runtime::{Runtime, RuntimeOptions, Value};
//!
//! let mut rt = Runtime::new(RuntimeOptions::default());
//! let env = rt.create_env("my_addon.node");
//! let ctx = rt.registration(env)?;
//! let returned = unsafe { napi_register_module_v1(ctx.env, ctx.exports) };
//! rt.complete_registration(env, returned)?;
//! let add = rt.get_named(env, &rt.exports(env)?, "add")?;
//! let five = rt.call(env, &add, Value::Undefined, &[Value::Number(2.0), Value::Number(3.0)])?;
//! ```
//!
//! Threading: everything except TSFN producers and async-work execute
//! callbacks runs on the thread that created the [`Runtime`].

#![allow(clippy::not_unsafe_ptr_arg_deref)]
#![warn(unsafe_op_in_unsafe_fn)]

pub mod async_work;
pub mod callback;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod error;
pub mod handles;
pub mod napi;
pub mod refs;
pub mod runtime;
pub mod tsfn;
pub mod value;
pub mod workers;

pub use error::{ExceptionKind, HostException, RuntimeError};
pub use runtime::{RegistrationContext, Runtime, RuntimeOptions};
pub use value::Value;

pub use skellig_abi as abi;

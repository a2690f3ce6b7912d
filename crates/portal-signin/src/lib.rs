//! Client-side two-factor sign-in flow.
//!
//! [`state::reduce`] is a pure transition function over [`state::SignInModel`];
//! [`flow::SignInFlow`] runs the effects it emits against an [`api::AuthApi`]
//! and feeds the results back in. [`http::HttpAuthApi`] talks to the portal
//! auth service.

pub mod api;
pub mod flow;
pub mod http;
pub mod state;

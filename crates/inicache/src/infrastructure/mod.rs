//! Infrastructure layer: filesystem access for the configuration store.
//!
//! **Dependency rule**: this layer must not import anything from
//! `application`.

pub mod storage;

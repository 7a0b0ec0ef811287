//! Wire-level representation of the debug protocol
//!
//! The transport moves whole messages; each message is a `(tag, payload)`
//! pair of dynamically typed values. This module defines the value variant,
//! the envelope, and the small geometry types used by camera-override
//! commands. The byte-level encoding of the transport is out of scope.

pub mod message;
pub mod transform;
pub mod value;

pub use message::Message;
pub use transform::{Projection, Transform2D, Transform3D};
pub use value::Value;

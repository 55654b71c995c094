//! Collection types with a size constraint
//!
//! Currently this consists only of [`SeqOf`](lim::SeqOf), the type used for
//! every `SEQUENCE (SIZE(..)) OF` in the schema, including the list of IEs
//! carried by a protocol extension container.

pub mod lim;

pub use lim::SeqOf;

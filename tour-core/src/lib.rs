//! # Tour Core
//!
//! `tour-core` holds everything the `tour` binary needs to talk to the greet and
//! blog services, independent of how arguments are parsed or results printed.
//!
//! ## Key Components
//!
//! * **[`connection`]:** Builds a single `tonic` [`Channel`](tonic::transport::Channel),
//!   optionally secured with a CA certificate loaded from disk.
//! * **[`stream`]:** The paced request sender and the bidirectional stream coordinator
//!   that drives a send task and a receive loop over one duplex call.
//! * **[`GreetClient`](greet::GreetClient) & [`BlogClient`](blog::BlogClient):** Typed wrappers
//!   over the generated stubs, one method per RPC.
//!
//! Both clients are generic over the underlying `GrpcService`, so they can run on a real
//! channel or directly against an in-process server implementation.
//!
//! ## Re-exports
//!
//! This crate re-exports `tonic` and the generated protobuf types so consumers use
//! compatible versions of both.
pub mod blog;
pub mod connection;
pub mod greet;
pub mod stream;

// Re-exports
pub use tonic;
pub use tour_proto as proto;

/// Type alias for the standard boxed error used in generic bounds.
type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

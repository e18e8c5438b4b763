//! # Tour Proto
//!
//! Generated `tonic` stubs for the two services the tour clients talk to.
//!
//! Both client and server halves are generated: the clients are what the
//! `tour` binary uses, the server traits exist so integration tests can
//! stand up in-process implementations.
//!
//! [`FILE_DESCRIPTOR_SET`] carries the encoded descriptors of both contracts, for tooling
//! that needs the schema at runtime.

pub mod greet {
    include!(concat!(env!("OUT_DIR"), "/greet.rs"));
}

pub mod blog {
    include!(concat!(env!("OUT_DIR"), "/blog.rs"));
}

pub use blog::blog_service_client::BlogServiceClient;
pub use blog::blog_service_server::{BlogService, BlogServiceServer};
pub use greet::greet_service_client::GreetServiceClient;
pub use greet::greet_service_server::{GreetService, GreetServiceServer};
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("descriptors");

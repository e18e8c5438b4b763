use std::env::var;
use std::io::Result;

fn main() -> Result<()> {
    let proto_files = &["proto/greet.proto", "proto/blog.proto"];

    let proto_folder = "proto";
    let out_dir = var("OUT_DIR").expect("Missing OUT_DIR environment variable");
    let descriptors_path = format!("{}/descriptors.bin", out_dir);

    // Servers are only generated so the clients can be exercised in-process by tests.
    tonic_prost_build::configure()
        .file_descriptor_set_path(descriptors_path)
        .protoc_arg("--experimental_allow_proto3_optional")
        .build_client(true)
        .build_server(true)
        .compile_protos(proto_files, &[proto_folder])?;

    for file in proto_files {
        println!("cargo:rerun-if-changed={file}");
    }

    Ok(())
}

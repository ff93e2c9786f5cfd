/// Builds the gRPC client and server code for the `orders.proto` definition
/// using `tonic-prost-build`.
///
/// The generated modules land in the crate's `OUT_DIR` together with an encoded
/// file descriptor set, which the server registers with the reflection service.
///
/// # Files and Paths
///
/// - Proto file: `proto/orders.proto`
/// - Includes: `proto/`
/// - Descriptor set: `$OUT_DIR/orders_descriptor.bin`
///
/// # Panics
///
/// This function will `panic!` if code generation fails, which fails the build.
///
/// # Output
///
/// Generated code is included in Rust via:
///
/// ```rust
/// pub mod proto {
///     tonic::include_proto!("orders");
/// }
/// ```
use std::env;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("orders_descriptor.bin");

    println!("cargo:rerun-if-changed=proto/orders.proto");

    let mut config = tonic_prost_build::Config::new();
    config.file_descriptor_set_path(&descriptor_path);

    tonic_prost_build::configure()
        .compile_with_config(config, &["proto/orders.proto"], &["proto"])
        .unwrap();
}

/// Regenerates the checked-in protocol modules from `proto/`.
///
/// Only runs with the `generate` feature:
///     cargo build -p glink-proto --features generate
#[cfg(feature = "generate")]
fn main() {
    use std::path::PathBuf;

    let protoc = protoc_bin_vendored::protoc_bin_path().expect("vendored protoc not found");
    std::env::set_var("PROTOC", protoc);

    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR"));
    let proto_dir = manifest_dir.join("proto");
    let src_dir = manifest_dir.join("src");
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR"));
    println!("cargo:rerun-if-changed={}", proto_dir.display());

    // Message packages, one module per package.
    let packages = ["answer", "concept", "database", "options", "query", "session", "transaction"];
    let messages: Vec<PathBuf> = packages
        .iter()
        .map(|package| proto_dir.join(format!("{}.proto", package)))
        .collect();
    tonic_build::configure()
        .out_dir(&src_dir)
        .build_client(false)
        .build_server(false)
        .compile(&messages, &[&proto_dir])
        .expect("failed to compile message protos");

    // The service refers to the modules above instead of regenerating them.
    let mut service = tonic_build::configure()
        .out_dir(&out_dir)
        .build_client(true)
        .build_server(true);
    for package in packages {
        service = service.extern_path(format!(".{}", package), format!("crate::{}", package));
    }
    service
        .compile(&[proto_dir.join("graphlink.proto")], &[&proto_dir])
        .expect("failed to compile service proto");
    std::fs::copy(
        out_dir.join("graphlink.protocol.rs"),
        src_dir.join("graphlink.protocol.rs"),
    )
    .expect("failed to copy generated service");
}

#[cfg(not(feature = "generate"))]
fn main() {}

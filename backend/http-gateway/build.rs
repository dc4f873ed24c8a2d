fn main() {
    // The gateway is a gRPC client only; backends own the servers

    println!("cargo:rerun-if-changed=../proto/services/user_service.proto");
    println!("cargo:rerun-if-changed=../proto/services/post_service.proto");
    println!("cargo:rerun-if-changed=../proto/google/rpc/status.proto");
    println!("cargo:rerun-if-changed=../proto/google/rpc/error_details.proto");

    // Vendored protoc, no system install needed
    let protoc = protoc_bin_vendored::protoc_bin_path().expect("vendored protoc not available");
    let well_known = protoc_bin_vendored::include_path().expect("vendored protobuf includes");
    std::env::set_var("PROTOC", protoc);

    let json = "#[derive(serde::Serialize, serde::Deserialize)] #[serde(rename_all = \"camelCase\", default)]";
    let skip_none = "#[serde(skip_serializing_if = \"Option::is_none\")]";

    tonic_build::configure()
        .build_server(false)
        .build_client(true)
        .type_attribute(".user", json)
        .type_attribute(".post", json)
        .field_attribute(".user.LoginResponse.user", skip_none)
        .field_attribute(".user.CreateUserResponse.user", skip_none)
        .field_attribute(".user.GetUserResponse.user", skip_none)
        .field_attribute(".user.UpdateUserResponse.user", skip_none)
        .field_attribute(".post.GetPostResponse.post", skip_none)
        .field_attribute(".post.CreatePostResponse.post", skip_none)
        .field_attribute(".post.UpdatePostResponse.post", skip_none)
        .compile(
            &[
                "../proto/google/rpc/status.proto",
                "../proto/google/rpc/error_details.proto",
                "../proto/services/user_service.proto",
                "../proto/services/post_service.proto",
            ],
            &[std::path::Path::new("../proto"), well_known.as_path()],
        )
        .expect("Failed to compile proto files for HTTP Gateway");
}

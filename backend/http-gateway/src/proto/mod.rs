//! Protobuf messages and clients for the backend services, generated by
//! `build.rs` from `backend/proto`

pub mod rpc {
    tonic::include_proto!("google.rpc");

    /// Type URL of `google.rpc.BadRequest` inside `google.protobuf.Any`
    pub const BAD_REQUEST_TYPE_URL: &str = "type.googleapis.com/google.rpc.BadRequest";
}

pub mod user {
    tonic::include_proto!("user");

    /// Wire paths of `user.UserService`, as seen by the auth layer
    pub mod operations {
        pub const LOGIN: &str = "/user.UserService/Login";
        pub const CREATE_USER: &str = "/user.UserService/CreateUser";
        pub const GET_USER: &str = "/user.UserService/GetUser";
        pub const UPDATE_USER: &str = "/user.UserService/UpdateUser";
        pub const DELETE_USER: &str = "/user.UserService/DeleteUser";
    }
}

pub mod post {
    tonic::include_proto!("post");

    /// Wire paths of `post.PostService`, as seen by the auth layer
    pub mod operations {
        pub const GET_POSTS: &str = "/post.PostService/GetPosts";
        pub const GET_POST: &str = "/post.PostService/GetPost";
        pub const CREATE_POST: &str = "/post.PostService/CreatePost";
        pub const UPDATE_POST: &str = "/post.PostService/UpdatePost";
        pub const DELETE_POST: &str = "/post.PostService/DeletePost";
    }
}

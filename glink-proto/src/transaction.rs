/// Transaction stream messages
///
/// A transaction is one bidirectional `transaction` call. The client sends
/// batches of requests (`Client`), the server answers with one `Server`
/// message per response. Every request carries a `req_id`; every response
/// echoes the id of the request it belongs to.

/// A batch of requests written to the stream as one frame
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Client {
    #[prost(message, repeated, tag = "1")]
    pub reqs: ::prost::alloc::vec::Vec<Req>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Server {
    #[prost(oneof = "server::Server", tags = "1, 2")]
    pub server: ::core::option::Option<server::Server>,
}

pub mod server {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Server {
        #[prost(message, tag = "1")]
        Res(super::Res),
        #[prost(message, tag = "2")]
        ResPart(super::ResPart),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Req {
    #[prost(bytes = "vec", tag = "1")]
    pub req_id: ::prost::alloc::vec::Vec<u8>,
    #[prost(map = "string, string", tag = "2")]
    pub metadata: ::std::collections::HashMap<::prost::alloc::string::String, ::prost::alloc::string::String>,
    #[prost(oneof = "req::Req", tags = "3, 4, 5, 6, 7")]
    pub req: ::core::option::Option<req::Req>,
}

pub mod req {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Req {
        #[prost(message, tag = "3")]
        OpenReq(super::open::Req),
        #[prost(message, tag = "4")]
        StreamReq(super::stream::Req),
        #[prost(message, tag = "5")]
        CommitReq(super::commit::Req),
        #[prost(message, tag = "6")]
        RollbackReq(super::rollback::Req),
        #[prost(message, tag = "7")]
        QueryManagerReq(crate::query::Req),
    }
}

/// Terminal response to a single-shot request
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Res {
    #[prost(bytes = "vec", tag = "1")]
    pub req_id: ::prost::alloc::vec::Vec<u8>,
    #[prost(oneof = "res::Res", tags = "2, 3, 4, 5, 6")]
    pub res: ::core::option::Option<res::Res>,
}

pub mod res {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Res {
        #[prost(message, tag = "2")]
        OpenRes(super::open::Res),
        #[prost(message, tag = "3")]
        CommitRes(super::commit::Res),
        #[prost(message, tag = "4")]
        RollbackRes(super::rollback::Res),
        #[prost(message, tag = "5")]
        QueryManagerRes(crate::query::Res),
        #[prost(message, tag = "6")]
        Error(super::Error),
    }
}

/// One part of a streamed response
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResPart {
    #[prost(bytes = "vec", tag = "1")]
    pub req_id: ::prost::alloc::vec::Vec<u8>,
    #[prost(oneof = "res_part::Res", tags = "2, 3, 4")]
    pub res: ::core::option::Option<res_part::Res>,
}

pub mod res_part {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Res {
        #[prost(message, tag = "2")]
        StreamResPart(super::stream::ResPart),
        #[prost(message, tag = "3")]
        QueryManagerResPart(crate::query::ResPart),
        #[prost(message, tag = "4")]
        Error(super::Error),
    }
}

/// A failure reported by the server for one request. The stream stays open.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Error {
    #[prost(string, tag = "1")]
    pub code: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Type {
    Read = 0,
    Write = 1,
}

pub mod open {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Req {
        #[prost(bytes = "vec", tag = "1")]
        pub session_id: ::prost::alloc::vec::Vec<u8>,
        #[prost(enumeration = "super::Type", tag = "2")]
        pub r#type: i32,
        #[prost(message, optional, tag = "3")]
        pub options: ::core::option::Option<crate::options::Options>,
        #[prost(int32, tag = "4")]
        pub network_latency_millis: i32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Res {}
}

pub mod stream {
    /// Asks the server for the next page of a streamed response
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Req {}

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ResPart {
        #[prost(enumeration = "State", tag = "1")]
        pub state: i32,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum State {
        Continue = 0,
        Done = 1,
    }
}

pub mod commit {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Req {}

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Res {}
}

pub mod rollback {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Req {}

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Res {}
}

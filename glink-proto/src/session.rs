/// Session messages (unary RPCs)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Type {
    Data = 0,
    Schema = 1,
}

impl Type {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Type::Data => "DATA",
            Type::Schema => "SCHEMA",
        }
    }
}

pub mod open {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Req {
        #[prost(string, tag = "1")]
        pub database: ::prost::alloc::string::String,
        #[prost(enumeration = "super::Type", tag = "2")]
        pub r#type: i32,
        #[prost(message, optional, tag = "3")]
        pub options: ::core::option::Option<crate::options::Options>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Res {
        #[prost(bytes = "vec", tag = "1")]
        pub session_id: ::prost::alloc::vec::Vec<u8>,
        #[prost(int32, tag = "2")]
        pub server_duration_millis: i32,
    }
}

pub mod pulse {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Req {
        #[prost(bytes = "vec", tag = "1")]
        pub session_id: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Res {
        #[prost(bool, tag = "1")]
        pub alive: bool,
    }
}

pub mod close {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Req {
        #[prost(bytes = "vec", tag = "1")]
        pub session_id: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Res {}
}

/// Query manager messages, carried inside transaction requests
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Req {
    #[prost(message, optional, tag = "1")]
    pub options: ::core::option::Option<crate::options::Options>,
    #[prost(oneof = "req::Req", tags = "2, 3, 4, 5, 6, 7, 8")]
    pub req: ::core::option::Option<req::Req>,
}

pub mod req {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Req {
        #[prost(message, tag = "2")]
        MatchReq(super::r#match::Req),
        #[prost(message, tag = "3")]
        MatchAggregateReq(super::match_aggregate::Req),
        #[prost(message, tag = "4")]
        InsertReq(super::insert::Req),
        #[prost(message, tag = "5")]
        DeleteReq(super::delete::Req),
        #[prost(message, tag = "6")]
        UpdateReq(super::update::Req),
        #[prost(message, tag = "7")]
        DefineReq(super::define::Req),
        #[prost(message, tag = "8")]
        UndefineReq(super::undefine::Req),
    }
}

/// Single-shot query results
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Res {
    #[prost(oneof = "res::Res", tags = "1, 2, 3, 4")]
    pub res: ::core::option::Option<res::Res>,
}

pub mod res {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Res {
        #[prost(message, tag = "1")]
        MatchAggregateRes(super::match_aggregate::Res),
        #[prost(message, tag = "2")]
        DeleteRes(super::delete::Res),
        #[prost(message, tag = "3")]
        DefineRes(super::define::Res),
        #[prost(message, tag = "4")]
        UndefineRes(super::undefine::Res),
    }
}

/// One page of a streamed query result
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResPart {
    #[prost(oneof = "res_part::Res", tags = "1, 2, 3")]
    pub res: ::core::option::Option<res_part::Res>,
}

pub mod res_part {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Res {
        #[prost(message, tag = "1")]
        MatchResPart(super::r#match::ResPart),
        #[prost(message, tag = "2")]
        InsertResPart(super::insert::ResPart),
        #[prost(message, tag = "3")]
        UpdateResPart(super::update::ResPart),
    }
}

pub mod r#match {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Req {
        #[prost(string, tag = "1")]
        pub query: ::prost::alloc::string::String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ResPart {
        #[prost(message, repeated, tag = "1")]
        pub answers: ::prost::alloc::vec::Vec<crate::answer::ConceptMap>,
    }
}

pub mod match_aggregate {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Req {
        #[prost(string, tag = "1")]
        pub query: ::prost::alloc::string::String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Res {
        #[prost(message, optional, tag = "1")]
        pub answer: ::core::option::Option<crate::answer::Numeric>,
    }
}

pub mod insert {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Req {
        #[prost(string, tag = "1")]
        pub query: ::prost::alloc::string::String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ResPart {
        #[prost(message, repeated, tag = "1")]
        pub answers: ::prost::alloc::vec::Vec<crate::answer::ConceptMap>,
    }
}

pub mod delete {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Req {
        #[prost(string, tag = "1")]
        pub query: ::prost::alloc::string::String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Res {}
}

pub mod update {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Req {
        #[prost(string, tag = "1")]
        pub query: ::prost::alloc::string::String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ResPart {
        #[prost(message, repeated, tag = "1")]
        pub answers: ::prost::alloc::vec::Vec<crate::answer::ConceptMap>,
    }
}

pub mod define {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Req {
        #[prost(string, tag = "1")]
        pub query: ::prost::alloc::string::String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Res {}
}

pub mod undefine {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Req {
        #[prost(string, tag = "1")]
        pub query: ::prost::alloc::string::String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Res {}
}
